//! Block and round bookkeeping around the seating core.
//!
//! A session owns the ledger and the current block's seating plan. Each block
//! gets a freshly generated design; rounds inside it are numbered from 1 and
//! mapped onto a global round number that keeps counting across blocks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

use seating_core::{
    aggregate, build, check_unique, correct, generate, parse_score, CorrectionPolicy,
    CorrectionReport, CumulativeTable, FitOptions, PlayerId, ScoreLedger, SeatAssignment,
    SeatingError, SeatingPlan,
};

use crate::collector::ScoreCollector;
use crate::config::TournamentConfig;
use crate::error::{TournamentError, TournamentResult};
use crate::report;

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

/// What happened after one round's scores were submitted.
#[derive(Debug, Clone, Serialize)]
pub struct RoundOutcome {
    pub block: u32,
    /// Round within the block, starting at 1
    pub round: u32,
    pub global_round: u32,
    /// Players whose entry could not be read and was counted as zero
    pub malformed: Vec<PlayerId>,
    pub correction: CorrectionReport,
    pub standings: CumulativeTable,
}

impl RoundOutcome {
    pub fn policy(&self) -> CorrectionPolicy {
        self.correction.policy
    }
}

/// State at the end of a tournament.
#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    pub blocks: u32,
    pub rounds: usize,
    pub correction: CorrectionReport,
    pub standings: CumulativeTable,
    pub ledger: ScoreLedger,
}

pub struct TournamentSession<R = StdRng> {
    players: Vec<PlayerId>,
    rng: R,
    options: FitOptions,
    ledger: ScoreLedger,
    plan: Option<SeatingPlan>,
    block: u32,
    rounds_done: u32,
}

impl TournamentSession<StdRng> {
    /// Session seeded from the config, or from OS entropy when no seed is set.
    pub fn from_config(config: &TournamentConfig) -> TournamentResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config.player_ids(), rng, config.model)
    }
}

impl<R: Rng> TournamentSession<R> {
    pub fn new(players: Vec<PlayerId>, rng: R, options: FitOptions) -> TournamentResult<Self> {
        if players.is_empty() {
            return Err(SeatingError::NoPlayers.into());
        }
        check_unique(&players)?;
        Ok(Self {
            players,
            rng,
            options,
            ledger: ScoreLedger::new(),
            plan: None,
            block: 0,
            rounds_done: 0,
        })
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn plan(&self) -> Option<&SeatingPlan> {
        self.plan.as_ref()
    }

    /// Number of the current (or last) block; 0 before the first one.
    pub fn block(&self) -> u32 {
        self.block
    }

    fn size(&self) -> u32 {
        self.players.len() as u32
    }

    pub fn is_block_complete(&self) -> bool {
        self.plan.is_none() || self.rounds_done >= self.size()
    }

    /// Draw a new design and begin the next block.
    pub fn start_block(&mut self) -> TournamentResult<&SeatingPlan> {
        if !self.is_block_complete() {
            return Err(TournamentError::BlockInProgress(self.block));
        }

        let design = generate(self.players.len(), &mut self.rng)?;
        let plan = build(&design, &self.players)?;
        self.block += 1;
        self.rounds_done = 0;
        info!(block = self.block, rounds = self.size(), "starting block");
        Ok(self.plan.insert(plan))
    }

    /// Round within the current block that is waiting for scores.
    pub fn next_round(&self) -> Option<u32> {
        if self.is_block_complete() {
            None
        } else {
            Some(self.rounds_done + 1)
        }
    }

    /// Round number counted across all blocks.
    pub fn global_round(&self, round: u32) -> u32 {
        round + (self.block.saturating_sub(1)) * self.size()
    }

    /// Seating of the round waiting for scores.
    pub fn current_round_assignments(&self) -> Option<&[SeatAssignment]> {
        let round = self.next_round()?;
        self.plan.as_ref().map(|plan| plan.round(round))
    }

    /// Submit raw text entries for the pending round, one per seat.
    ///
    /// Entries that are not numbers count as zero.
    pub fn submit_round(&mut self, raw: &[String]) -> TournamentResult<RoundOutcome> {
        let seating = self
            .current_round_assignments()
            .ok_or(TournamentError::NoPendingRound)?;
        if raw.len() != seating.len() {
            return Err(TournamentError::ScoreCountMismatch {
                expected: seating.len(),
                got: raw.len(),
            });
        }

        let mut malformed = Vec::new();
        let mut scores = Vec::with_capacity(raw.len());
        for (assignment, text) in seating.iter().zip(raw) {
            match parse_score(text) {
                Ok(value) => scores.push(value),
                Err(err) => {
                    warn!(player = %assignment.player, error = %err, "counting unreadable score as 0");
                    malformed.push(assignment.player.clone());
                    scores.push(0.0);
                }
            }
        }

        let mut outcome = self.submit_scores(&scores)?;
        outcome.malformed = malformed;
        Ok(outcome)
    }

    /// Submit numeric scores for the pending round, one per seat.
    pub fn submit_scores(&mut self, scores: &[f64]) -> TournamentResult<RoundOutcome> {
        let round = self.next_round().ok_or(TournamentError::NoPendingRound)?;
        let global_round = self.global_round(round);
        let seating = self
            .plan
            .as_ref()
            .map(|plan| plan.round(round))
            .ok_or(TournamentError::NoPendingRound)?;
        if scores.len() != seating.len() {
            return Err(TournamentError::ScoreCountMismatch {
                expected: seating.len(),
                got: scores.len(),
            });
        }

        self.ledger
            .append_planned_round(self.block, global_round, seating, scores)?;
        self.rounds_done += 1;

        let correction = correct(&mut self.ledger, &self.options);
        if correction.rounds == 2 && correction.policy == CorrectionPolicy::MixedModel {
            info!("second round recorded, switching to the mixed model");
        }

        Ok(RoundOutcome {
            block: self.block,
            round,
            global_round,
            malformed: Vec::new(),
            correction,
            standings: aggregate(&self.ledger),
        })
    }

    /// Final correction over everything played.
    pub fn finish(mut self) -> FinalReport {
        let correction = correct(&mut self.ledger, &self.options);
        FinalReport {
            blocks: self.block,
            rounds: correction.rounds,
            correction,
            standings: aggregate(&self.ledger),
            ledger: self.ledger,
        }
    }
}

/// Play blocks until the collector stops or `max_blocks` is reached.
///
/// Seating, standings and prompts are written to `out`.
pub fn run<R, C, W>(
    mut session: TournamentSession<R>,
    collector: &mut C,
    max_blocks: Option<u32>,
    out: &mut W,
) -> TournamentResult<FinalReport>
where
    R: Rng,
    C: ScoreCollector + ?Sized,
    W: Write,
{
    'blocks: loop {
        session.start_block()?;
        writeln!(
            out,
            "\n=== Block {} ({} rounds) ===",
            session.block(),
            session.players().len()
        )?;

        while let Some(round) = session.next_round() {
            let global_round = session.global_round(round);
            let seating = session
                .current_round_assignments()
                .map(|s| s.to_vec())
                .unwrap_or_default();
            write!(
                out,
                "{}",
                report::format_seating(session.block(), round, global_round, &seating)
            )?;

            let raw = match collector.collect(session.block(), global_round, &seating)? {
                Some(raw) => raw,
                None => {
                    info!(block = session.block(), round, "input ended mid-block");
                    break 'blocks;
                }
            };
            let outcome = session.submit_round(&raw)?;
            write!(out, "{}", report::format_round(&outcome))?;
        }

        if max_blocks.is_some_and(|max| session.block() >= max) {
            break;
        }
        if !collector.play_another_block(session.block())? {
            break;
        }
    }

    Ok(session.finish())
}
