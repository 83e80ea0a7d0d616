//! Balanced seating and seat-bias correction for tabletop tournaments.
//!
//! This crate provides:
//! - Randomised Latin-square designs so every player sits in every seat once
//!   per block
//! - Expansion of a design into an explicit seating plan
//! - An append-only score ledger
//! - Seat-effect correction (seat centring for a single round, a REML mixed
//!   model with a random player intercept afterwards)
//! - Cumulative corrected totals per player
//!
//! # Usage
//!
//! ```
//! use rand::SeedableRng;
//! use seating_core::{aggregate, build, correct, generate, player_ids, FitOptions, ScoreLedger};
//!
//! let players = player_ids(["A", "B", "C"]);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let plan = build(&generate(players.len(), &mut rng)?, &players)?;
//!
//! let mut ledger = ScoreLedger::new();
//! ledger.append_planned_round(1, 1, plan.round(1), &[10.0, 20.0, 30.0])?;
//! let report = correct(&mut ledger, &FitOptions::default());
//! let table = aggregate(&ledger);
//! assert_eq!(table.points.len(), 3);
//! # let _ = report;
//! # Ok::<(), seating_core::SeatingError>(())
//! ```

mod aggregate;
mod correction;
mod design;
mod error;
mod ledger;
mod mixed_model;
mod plan;
mod types;

pub use aggregate::*;
pub use correction::*;
pub use design::*;
pub use error::*;
pub use ledger::*;
pub use mixed_model::{fit, FitOptions, MixedModelFit, PlayerEffect, SeatEffect};
pub use plan::*;
pub use types::*;

/// Parse a score typed by a human.
///
/// Anything that is not a finite number is a `MalformedScore`.
pub fn parse_score(text: &str) -> SeatingResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SeatingError::MalformedScore(text.to_string())),
    }
}
