//! Append-only record of every score collected in the tournament.
//!
//! Rows are only ever appended a whole round at a time. The `corrected`
//! column is the one mutable field: the correction engine overwrites it for
//! every row each time it runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{SeatingError, SeatingResult};
use crate::types::{PlayerId, SeatAssignment};

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod ledger_tests;

/// One player's score in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreObservation {
    pub block: u32,
    /// Round number counted across all blocks, starting at 1
    pub round: u32,
    pub player: PlayerId,
    pub seat: u32,
    pub raw: f64,
    /// Seat-corrected score, `None` until the correction engine has run
    pub corrected: Option<f64>,
}

/// A score as handed over by the collector for one seat of one round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundEntry {
    pub player: PlayerId,
    pub seat: u32,
    pub raw: f64,
}

impl RoundEntry {
    pub fn new(player: impl Into<PlayerId>, seat: u32, raw: f64) -> Self {
        Self {
            player: player.into(),
            seat,
            raw,
        }
    }
}

/// Caller-owned table of all observations so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreLedger {
    observations: Vec<ScoreObservation>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[ScoreObservation] {
        &self.observations
    }

    /// Mutable access for the correction engine. Only `corrected` may change.
    pub(crate) fn observations_mut(&mut self) -> &mut [ScoreObservation] {
        &mut self.observations
    }

    pub fn last_round(&self) -> Option<u32> {
        self.observations.last().map(|o| o.round)
    }

    pub fn last_block(&self) -> Option<u32> {
        self.observations.last().map(|o| o.block)
    }

    /// Number of distinct global rounds recorded.
    pub fn distinct_rounds(&self) -> usize {
        // Rounds are appended in increasing order, so counting changes is enough
        let mut count = 0;
        let mut previous = None;
        for obs in &self.observations {
            if previous != Some(obs.round) {
                count += 1;
                previous = Some(obs.round);
            }
        }
        count
    }

    /// Observations of a single global round.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &ScoreObservation> {
        self.observations.iter().filter(move |o| o.round == round)
    }

    /// Players in order of first appearance.
    pub fn players(&self) -> Vec<PlayerId> {
        let mut seen = HashSet::new();
        let mut players = Vec::new();
        for obs in &self.observations {
            if seen.insert(&obs.player) {
                players.push(obs.player.clone());
            }
        }
        players
    }

    /// Append one complete round.
    ///
    /// Block and round are numbered from 1. The round number must be greater
    /// than every round already recorded and the block must not go backwards.
    /// Within the round no player or seat may appear twice and every score
    /// must be finite. On error the ledger is left untouched.
    pub fn append_round(
        &mut self,
        block: u32,
        round: u32,
        entries: Vec<RoundEntry>,
    ) -> SeatingResult<()> {
        if block == 0 || round == 0 {
            return Err(SeatingError::NumberingOutOfRange { block, round });
        }
        if entries.is_empty() {
            return Err(SeatingError::EmptyRound { round });
        }
        if let Some(last) = self.last_round() {
            if round <= last {
                return Err(SeatingError::RoundOutOfOrder { round, last });
            }
        }
        if let Some(last) = self.last_block() {
            if block < last {
                return Err(SeatingError::BlockOutOfOrder { block, last });
            }
        }

        let mut players = HashSet::with_capacity(entries.len());
        let mut seats = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.seat == 0 {
                return Err(SeatingError::SeatOutOfRange { round });
            }
            if !players.insert(&entry.player) {
                return Err(SeatingError::PlayerScoredTwice {
                    player: entry.player.to_string(),
                    round,
                });
            }
            if !seats.insert(entry.seat) {
                return Err(SeatingError::SeatTakenTwice {
                    seat: entry.seat,
                    round,
                });
            }
            if !entry.raw.is_finite() {
                return Err(SeatingError::NonFiniteScore {
                    player: entry.player.to_string(),
                    round,
                });
            }
        }

        debug!(block, round, entries = entries.len(), "recording round");
        self.observations
            .extend(entries.into_iter().map(|entry| ScoreObservation {
                block,
                round,
                player: entry.player,
                seat: entry.seat,
                raw: entry.raw,
                corrected: None,
            }));
        Ok(())
    }

    /// Append a round whose entries must match `seating` exactly.
    ///
    /// `scores[i]` is the score for `seating[i]`.
    pub fn append_planned_round(
        &mut self,
        block: u32,
        round: u32,
        seating: &[SeatAssignment],
        scores: &[f64],
    ) -> SeatingResult<()> {
        if seating.len() != scores.len() {
            return Err(SeatingError::SeatingMismatch(format!(
                "{} seats but {} scores",
                seating.len(),
                scores.len()
            )));
        }
        let entries = seating
            .iter()
            .zip(scores)
            .map(|(a, &raw)| RoundEntry {
                player: a.player.clone(),
                seat: a.seat,
                raw,
            })
            .collect();
        self.append_round(block, round, entries)
    }
}
