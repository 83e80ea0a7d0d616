//! Where scores come from.
//!
//! The session never talks to a terminal itself; it asks a [`ScoreCollector`]
//! for one round of raw entries at a time and for the decision whether to
//! start another block.

use std::io::{BufRead, Write};

use seating_core::SeatAssignment;

use crate::error::TournamentResult;

#[cfg(test)]
#[path = "collector_tests.rs"]
mod collector_tests;

/// Source of raw score entries.
pub trait ScoreCollector {
    /// Collect one raw entry per seat, in the order of `seating`.
    ///
    /// Returns `None` when no more input is available.
    fn collect(
        &mut self,
        block: u32,
        global_round: u32,
        seating: &[SeatAssignment],
    ) -> TournamentResult<Option<Vec<String>>>;

    /// Whether to start another block after `completed_blocks` blocks.
    fn play_another_block(&mut self, completed_blocks: u32) -> TournamentResult<bool>;
}

/// Line-oriented prompts: one line per score, one line per yes/no question.
///
/// Works on stdin/stdout as well as on in-memory buffers.
pub struct LineCollector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineCollector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, text: &str) -> TournamentResult<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

impl<R: BufRead, W: Write> ScoreCollector for LineCollector<R, W> {
    fn collect(
        &mut self,
        _block: u32,
        _global_round: u32,
        seating: &[SeatAssignment],
    ) -> TournamentResult<Option<Vec<String>>> {
        let mut entries = Vec::with_capacity(seating.len());
        for seat in seating {
            let text = format!("Score for player {} (seat {}): ", seat.player, seat.seat);
            match self.prompt(&text)? {
                Some(line) => entries.push(line),
                None => return Ok(None),
            }
        }
        Ok(Some(entries))
    }

    fn play_another_block(&mut self, _completed_blocks: u32) -> TournamentResult<bool> {
        // Only an explicit "no" (or end of input) stops the tournament
        Ok(match self.prompt("Play another block? (y/n): ")? {
            Some(answer) => !matches!(answer.trim().to_lowercase().as_str(), "n" | "no"),
            None => false,
        })
    }
}
