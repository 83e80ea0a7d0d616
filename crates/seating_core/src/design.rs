//! Randomised balanced designs.
//!
//! A design for `n` players is an `n x n` Latin square: row `r` is round `r`,
//! column `s` is seat `s`, and the cell holds the index of the player in that
//! seat. Every row and every column is a permutation of `0..n`, so within one
//! block each player sits exactly once per round and in every seat exactly once.
//!
//! Generation starts from the cyclic square `(r + s) mod n`, relabels the
//! symbols through a random permutation and then reorders the columns through
//! a second, independent permutation. Both steps preserve the Latin property.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SeatingError, SeatingResult};

#[cfg(test)]
#[path = "design_tests.rs"]
mod design_tests;

/// An `n x n` balanced assignment of player indices to (round, seat) cells.
///
/// Serialised as its list of rounds; deserialising goes through
/// [`Design::from_rows`], so a decoded design is always balanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<usize>>", into = "Vec<Vec<usize>>")]
pub struct Design {
    size: usize,
    /// Row-major: `cells[round * size + seat]`
    cells: Vec<usize>,
}

impl Design {
    /// Build a design from explicit rows, rejecting anything that is not a
    /// Latin square.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> SeatingResult<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(SeatingError::NoPlayers);
        }
        if let Some(bad) = rows.iter().position(|row| row.len() != size) {
            return Err(SeatingError::UnbalancedDesign(format!(
                "round {} has {} seats, expected {}",
                bad + 1,
                rows[bad].len(),
                size
            )));
        }

        let design = Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        };
        design.check_balanced()?;
        Ok(design)
    }

    /// Number of players, rounds and seats.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Player index seated at `seat` in `round` (both zero-based).
    #[inline]
    pub fn get(&self, round: usize, seat: usize) -> usize {
        self.cells[round * self.size + seat]
    }

    /// Iterate over the rounds, each a slice indexed by seat.
    pub fn rounds(&self) -> impl Iterator<Item = &[usize]> {
        self.cells.chunks(self.size)
    }

    /// Player indices occupying `seat` across all rounds.
    pub fn seat_column(&self, seat: usize) -> Vec<usize> {
        (0..self.size).map(|round| self.get(round, seat)).collect()
    }

    pub fn is_balanced(&self) -> bool {
        self.check_balanced().is_ok()
    }

    fn check_balanced(&self) -> SeatingResult<()> {
        let n = self.size;
        for round in 0..n {
            let row: Vec<usize> = (0..n).map(|seat| self.get(round, seat)).collect();
            if !is_permutation(&row, n) {
                return Err(SeatingError::UnbalancedDesign(format!(
                    "round {} is not a permutation of the players",
                    round + 1
                )));
            }
        }
        for seat in 0..n {
            if !is_permutation(&self.seat_column(seat), n) {
                return Err(SeatingError::UnbalancedDesign(format!(
                    "seat {} does not see every player exactly once",
                    seat + 1
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<usize>>> for Design {
    type Error = SeatingError;

    fn try_from(rows: Vec<Vec<usize>>) -> SeatingResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<Design> for Vec<Vec<usize>> {
    fn from(design: Design) -> Self {
        design.rounds().map(<[usize]>::to_vec).collect()
    }
}

fn is_permutation(values: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    for &v in values {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    values.len() == n
}

/// Generate a fresh random balanced design for `n` players.
///
/// Each call draws two new permutations from `rng`; nothing is carried over
/// between calls, so consecutive blocks are independent.
pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> SeatingResult<Design> {
    if n == 0 {
        return Err(SeatingError::NoPlayers);
    }

    // `shuffle` is Fisher-Yates, so both permutations are uniform
    let mut symbols: Vec<usize> = (0..n).collect();
    symbols.shuffle(rng);
    let mut columns: Vec<usize> = (0..n).collect();
    columns.shuffle(rng);

    let mut cells = Vec::with_capacity(n * n);
    for round in 0..n {
        for &col in &columns {
            cells.push(symbols[(round + col) % n]);
        }
    }

    Ok(Design { size: n, cells })
}
