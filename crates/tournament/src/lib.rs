//! Tournament runner for seat-balanced tabletop play
//!
//! This crate drives the seating core round by round:
//! - Generating a fresh balanced seating plan for every block
//! - Collecting scores through a pluggable [`ScoreCollector`]
//! - Re-running the seat correction after every round
//! - Reporting corrected standings and the final model
//!
//! # Usage
//!
//! ```bash
//! # Interactive tournament with the default seven players
//! cargo run -p tournament -- play
//!
//! # Named players, reproducible seating, stop after two blocks
//! cargo run -p tournament -- play --players Ann,Bob,Cid,Dee --seed 7 --blocks 2
//!
//! # Just print one block's seating plan
//! cargo run -p tournament -- plan --players Ann,Bob,Cid
//! ```

mod collector;
mod config;
mod error;
pub mod report;
mod session;

pub use collector::*;
pub use config::*;
pub use error::*;
pub use session::*;
