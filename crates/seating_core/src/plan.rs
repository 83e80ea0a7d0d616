//! Expanding a design into explicit (round, seat, player) rows.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::design::Design;
use crate::error::{SeatingError, SeatingResult};
use crate::types::{PlayerId, SeatAssignment};

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;

/// The seating for one block: `n * n` rows sorted by round, then seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingPlan {
    size: usize,
    assignments: Vec<SeatAssignment>,
}

impl SeatingPlan {
    /// Number of rounds (and seats) in the block.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn assignments(&self) -> &[SeatAssignment] {
        &self.assignments
    }

    /// The rows of one round, ordered by seat. `round` is 1-based.
    pub fn round(&self, round: u32) -> &[SeatAssignment] {
        if round == 0 || round as usize > self.size {
            return &[];
        }
        let start = (round as usize - 1) * self.size;
        &self.assignments[start..start + self.size]
    }

    /// All rows for `seat` across the block.
    pub fn seat(&self, seat: u32) -> impl Iterator<Item = &SeatAssignment> {
        self.assignments.iter().filter(move |a| a.seat == seat)
    }
}

/// Map a design's symbol indices onto `players` and flatten it.
///
/// `players[i]` is the player behind symbol `i`. The list must have exactly
/// one entry per design symbol and no repeats.
pub fn build(design: &Design, players: &[PlayerId]) -> SeatingResult<SeatingPlan> {
    let n = design.size();
    if players.len() != n {
        return Err(SeatingError::PlayerCountMismatch {
            expected: n,
            got: players.len(),
        });
    }
    check_unique(players)?;

    let mut assignments = Vec::with_capacity(n * n);
    for (round, seats) in design.rounds().enumerate() {
        for (seat, &symbol) in seats.iter().enumerate() {
            assignments.push(SeatAssignment {
                round: round as u32 + 1,
                seat: seat as u32 + 1,
                player: players[symbol].clone(),
            });
        }
    }

    Ok(SeatingPlan {
        size: n,
        assignments,
    })
}

/// Reject player lists that name someone twice.
pub fn check_unique(players: &[PlayerId]) -> SeatingResult<()> {
    let mut seen = HashSet::with_capacity(players.len());
    for player in players {
        if !seen.insert(player) {
            return Err(SeatingError::DuplicatePlayer(player.to_string()));
        }
    }
    Ok(())
}
