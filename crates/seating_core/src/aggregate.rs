//! Running totals of corrected scores per player.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::ScoreLedger;
use crate::types::PlayerId;

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod aggregate_tests;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub round: u32,
    pub player: PlayerId,
    /// Sum of corrected scores for this player in this round
    pub round_total: f64,
    /// Sum of corrected scores up to and including this round
    pub cumulative: f64,
}

/// Cumulative corrected score for every (round, player) pair.
///
/// Covers every round from the first to the last in the ledger for every
/// player seen at least once, ordered by round and then by first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeTable {
    pub players: Vec<PlayerId>,
    pub points: Vec<CumulativePoint>,
}

impl CumulativeTable {
    /// One player's cumulative series in round order.
    pub fn series(&self, player: &PlayerId) -> Vec<f64> {
        self.points
            .iter()
            .filter(|p| &p.player == player)
            .map(|p| p.cumulative)
            .collect()
    }

    /// Points of the latest round, i.e. everyone's current total.
    pub fn latest(&self) -> &[CumulativePoint] {
        let n = self.players.len();
        &self.points[self.points.len() - n..]
    }

    /// Final totals, best first. Ties keep first-appearance order.
    pub fn standings(&self) -> Vec<(PlayerId, f64)> {
        let mut totals: Vec<(PlayerId, f64)> = self
            .latest()
            .iter()
            .map(|p| (p.player.clone(), p.cumulative))
            .collect();
        totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        totals
    }
}

/// Build the cumulative table from the ledger's corrected scores.
///
/// A round in which a player has no row contributes zero, as does a row whose
/// corrected score has not been computed yet.
pub fn aggregate(ledger: &ScoreLedger) -> CumulativeTable {
    let players = ledger.players();
    let (first, last) = match (ledger.observations().first(), ledger.last_round()) {
        (Some(obs), Some(last)) => (obs.round, last),
        _ => return CumulativeTable::default(),
    };

    let mut per_round: HashMap<(u32, &PlayerId), f64> = HashMap::new();
    for obs in ledger.observations() {
        *per_round.entry((obs.round, &obs.player)).or_insert(0.0) += obs.corrected.unwrap_or(0.0);
    }

    let mut running = vec![0.0; players.len()];
    let mut points = Vec::with_capacity(players.len() * (last - first + 1) as usize);
    for round in first..=last {
        for (i, player) in players.iter().enumerate() {
            let round_total = per_round.get(&(round, player)).copied().unwrap_or(0.0);
            running[i] += round_total;
            points.push(CumulativePoint {
                round,
                player: player.clone(),
                round_total,
                cumulative: running[i],
            });
        }
    }

    CumulativeTable { players, points }
}
