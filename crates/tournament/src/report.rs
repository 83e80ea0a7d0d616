//! Plain-text rendering of seatings, standings and the final analysis.

use std::fmt::Write;

use seating_core::{CorrectionPolicy, CorrectionReport, CumulativeTable, SeatAssignment};

use crate::session::{FinalReport, RoundOutcome};

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;

/// Seating of one round.
pub fn format_seating(
    block: u32,
    round: u32,
    global_round: u32,
    seating: &[SeatAssignment],
) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "\n--- Round {} of block {} (round {} overall) ---",
        round, block, global_round
    );
    for assignment in seating {
        let _ = writeln!(text, "  Player {} -> seat {}", assignment.player, assignment.seat);
    }
    text
}

/// Cumulative corrected totals after a round, best first.
pub fn format_standings(table: &CumulativeTable) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{:<4} {:<20} {:>10} {:>10}", "#", "Player", "Round", "Total");
    let _ = writeln!(text, "{}", "-".repeat(47));

    let latest = table.latest();
    for (rank, (player, total)) in table.standings().iter().enumerate() {
        let round_total = latest
            .iter()
            .find(|p| &p.player == player)
            .map(|p| p.round_total)
            .unwrap_or(0.0);
        let _ = writeln!(
            text,
            "{:<4} {:<20} {:>+10.2} {:>+10.2}",
            rank + 1,
            player,
            round_total,
            total
        );
    }
    text
}

pub fn policy_label(policy: CorrectionPolicy) -> &'static str {
    match policy {
        CorrectionPolicy::Empty => "no scores yet",
        CorrectionPolicy::SeatCentering => "seat centring (single round)",
        CorrectionPolicy::MixedModel => "mixed model",
        CorrectionPolicy::Degraded => "seat centring (mixed model failed)",
    }
}

/// Standings block printed after every round.
pub fn format_round(outcome: &RoundOutcome) -> String {
    let mut text = String::new();
    for player in &outcome.malformed {
        let _ = writeln!(text, "  Could not read score for {}, counted as 0", player);
    }
    let _ = writeln!(
        text,
        "\nCorrected standings after round {} ({})",
        outcome.global_round,
        policy_label(outcome.policy())
    );
    text.push_str(&format_standings(&outcome.standings));
    text
}

/// Fixed effects and variance components of the final fit.
pub fn format_model(correction: &CorrectionReport) -> String {
    let mut text = String::new();
    let fit = match (&correction.fit, correction.policy) {
        (Some(fit), _) => fit,
        (None, CorrectionPolicy::Degraded) => {
            let reason = correction
                .failure
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            let _ = writeln!(text, "Mixed model could not be fitted ({}).", reason);
            let _ = writeln!(text, "Scores are centred on their seat means instead.");
            return text;
        }
        (None, _) => {
            let _ = writeln!(
                text,
                "Fewer than 2 rounds played - no meaningful mixed-effects model."
            );
            return text;
        }
    };

    let _ = writeln!(
        text,
        "Mixed model: score ~ seat, random intercept per player ({} observations, REML)",
        fit.observations
    );
    let _ = writeln!(text, "{:<16} {:>10}", "Term", "Estimate");
    let _ = writeln!(text, "{}", "-".repeat(27));
    let _ = writeln!(text, "{:<16} {:>10.3}", "Intercept", fit.intercept);
    for (i, effect) in fit.seat_effects.iter().enumerate() {
        if i == 0 {
            let _ = writeln!(text, "{:<16} {:>10}", format!("Seat {}", effect.seat), "(ref)");
        } else {
            let _ = writeln!(
                text,
                "{:<16} {:>+10.3}",
                format!("Seat {}", effect.seat),
                effect.effect
            );
        }
    }
    let _ = writeln!(text, "{:<16} {:>10.3}", "Player var", fit.group_variance);
    let _ = writeln!(text, "{:<16} {:>10.3}", "Residual var", fit.residual_variance);
    text
}

/// First `rows` ledger rows with raw and corrected scores.
pub fn format_ledger_preview(report: &FinalReport, rows: usize) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{:>5} {:>5} {:<16} {:>4} {:>8} {:>9}",
        "Block", "Round", "Player", "Seat", "Raw", "Corrected"
    );
    for obs in report.ledger.observations().iter().take(rows) {
        let corrected = obs
            .corrected
            .map(|c| format!("{:+.3}", c))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            text,
            "{:>5} {:>5} {:<16} {:>4} {:>8.2} {:>9}",
            obs.block, obs.round, obs.player, obs.seat, obs.raw, corrected
        );
    }
    text
}

/// Everything printed once the tournament ends.
pub fn format_final(report: &FinalReport, players: usize) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "\n=== Final analysis: {} block(s), {} round(s) ===\n",
        report.blocks, report.rounds
    );
    text.push_str(&format_model(&report.correction));
    if !report.ledger.is_empty() {
        let _ = writeln!(text, "\nFinal standings");
        text.push_str(&format_standings(&report.standings));
        let _ = writeln!(text, "\nLedger excerpt");
        text.push_str(&format_ledger_preview(report, 2 * players));
    }
    text
}
