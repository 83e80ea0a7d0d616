//! Seat-bias correction over the whole ledger.
//!
//! With a single round there is nothing to separate player skill from seat,
//! so each score is centred on the mean of its seat. From the second round
//! on, the mixed model is fitted to every observation and the corrected score
//! is the raw score minus the model's fitted value. A failed fit degrades to
//! seat centring instead of aborting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::FitError;
use crate::ledger::{ScoreLedger, ScoreObservation};
use crate::mixed_model::{self, FitOptions, MixedModelFit};

#[cfg(test)]
#[path = "correction_tests.rs"]
mod correction_tests;

/// Which estimator produced the current corrected scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionPolicy {
    /// Nothing recorded yet
    Empty,
    /// One round only: score minus seat mean
    SeatCentering,
    /// Score minus mixed-model fitted value
    MixedModel,
    /// Mixed model failed, seat centring used instead
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub policy: CorrectionPolicy,
    pub rounds: usize,
    pub fit: Option<MixedModelFit>,
    /// Why the mixed model was abandoned, set only when degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FitError>,
}

impl CorrectionReport {
    pub fn is_degraded(&self) -> bool {
        self.policy == CorrectionPolicy::Degraded
    }
}

/// Recompute `corrected` for every row of the ledger.
///
/// Depends only on the ledger contents; running it twice gives the same
/// values.
pub fn correct(ledger: &mut ScoreLedger, options: &FitOptions) -> CorrectionReport {
    let rounds = ledger.distinct_rounds();
    if rounds == 0 {
        return CorrectionReport {
            policy: CorrectionPolicy::Empty,
            rounds,
            fit: None,
            failure: None,
        };
    }

    if rounds == 1 {
        apply(ledger, &seat_centered(ledger.observations()));
        debug!(rows = ledger.len(), "seat-centred single round");
        return CorrectionReport {
            policy: CorrectionPolicy::SeatCentering,
            rounds,
            fit: None,
            failure: None,
        };
    }

    match mixed_model::fit(ledger.observations(), options) {
        Ok(fit) => {
            let corrected: Vec<f64> = ledger
                .observations()
                .iter()
                .zip(&fit.fitted)
                .map(|(obs, fitted)| obs.raw - fitted)
                .collect();
            apply(ledger, &corrected);
            debug!(
                rounds,
                iterations = fit.iterations,
                residual_variance = fit.residual_variance,
                group_variance = fit.group_variance,
                "mixed model fitted"
            );
            CorrectionReport {
                policy: CorrectionPolicy::MixedModel,
                rounds,
                fit: Some(fit),
                failure: None,
            }
        }
        Err(err) => {
            warn!(rounds, error = %err, "mixed model fit failed, falling back to seat centring");
            apply(ledger, &seat_centered(ledger.observations()));
            CorrectionReport {
                policy: CorrectionPolicy::Degraded,
                rounds,
                fit: None,
                failure: Some(err),
            }
        }
    }
}

/// Raw score minus the mean raw score of all rows in the same seat.
pub fn seat_centered(observations: &[ScoreObservation]) -> Vec<f64> {
    let mut sums: HashMap<u32, (f64, usize)> = HashMap::new();
    for obs in observations {
        let entry = sums.entry(obs.seat).or_insert((0.0, 0));
        entry.0 += obs.raw;
        entry.1 += 1;
    }

    observations
        .iter()
        .map(|obs| {
            let (sum, count) = sums[&obs.seat];
            obs.raw - sum / count as f64
        })
        .collect()
}

fn apply(ledger: &mut ScoreLedger, corrected: &[f64]) {
    for (obs, &value) in ledger.observations_mut().iter_mut().zip(corrected) {
        obs.corrected = Some(value);
    }
}
