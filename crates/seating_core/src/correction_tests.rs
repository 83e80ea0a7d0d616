use super::*;
use crate::ledger::RoundEntry;

fn entries(rows: &[(&str, u32, f64)]) -> Vec<RoundEntry> {
    rows.iter()
        .map(|&(p, seat, raw)| RoundEntry::new(p, seat, raw))
        .collect()
}

fn corrected(ledger: &ScoreLedger) -> Vec<f64> {
    ledger
        .observations()
        .iter()
        .map(|o| o.corrected.expect("corrected score missing"))
        .collect()
}

#[test]
fn test_empty_ledger() {
    let mut ledger = ScoreLedger::new();
    let report = correct(&mut ledger, &FitOptions::default());
    assert_eq!(report.policy, CorrectionPolicy::Empty);
    assert!(!report.is_degraded());
}

#[test]
fn test_single_round_centres_each_seat() {
    let mut ledger = ScoreLedger::new();
    ledger
        .append_round(1, 1, entries(&[("A", 1, 10.0), ("B", 2, 20.0), ("C", 3, 30.0)]))
        .unwrap();

    let report = correct(&mut ledger, &FitOptions::default());
    assert_eq!(report.policy, CorrectionPolicy::SeatCentering);
    assert_eq!(corrected(&ledger), vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_two_rounds_switch_to_mixed_model() {
    let mut ledger = ScoreLedger::new();
    ledger
        .append_round(1, 1, entries(&[("A", 1, 6.0), ("B", 2, 2.0), ("C", 3, 3.0)]))
        .unwrap();
    assert_eq!(
        correct(&mut ledger, &FitOptions::default()).policy,
        CorrectionPolicy::SeatCentering
    );

    ledger
        .append_round(1, 2, entries(&[("B", 1, 7.0), ("C", 2, 3.0), ("A", 3, 1.0)]))
        .unwrap();
    let report = correct(&mut ledger, &FitOptions::default());
    assert_eq!(report.policy, CorrectionPolicy::MixedModel);

    let fit = report.fit.expect("fit missing");
    assert!((fit.seat_contrast(1, 2).unwrap() - 5.0).abs() < 1e-3);
    // Seat advantage and player level are both removed
    assert!(corrected(&ledger).iter().all(|c| c.abs() < 1e-3));
}

#[test]
fn test_failed_fit_degrades_to_seat_centring() {
    let mut ledger = ScoreLedger::new();
    ledger
        .append_round(1, 1, entries(&[("A", 1, 4.0), ("B", 2, 4.0)]))
        .unwrap();
    ledger
        .append_round(1, 2, entries(&[("B", 1, 4.0), ("A", 2, 4.0)]))
        .unwrap();

    let report = correct(&mut ledger, &FitOptions::default());
    assert!(report.is_degraded());
    assert_eq!(report.failure, Some(FitError::ZeroVariance));
    assert_eq!(corrected(&ledger), vec![0.0; 4]);
}

#[test]
fn test_degraded_report_keeps_failure_in_json() {
    let mut ledger = ScoreLedger::new();
    ledger
        .append_round(1, 1, entries(&[("A", 1, 4.0), ("B", 2, 4.0)]))
        .unwrap();
    ledger
        .append_round(1, 2, entries(&[("B", 1, 4.0), ("A", 2, 4.0)]))
        .unwrap();

    let report = correct(&mut ledger, &FitOptions::default());
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"failure\":\"ZeroVariance\""), "{}", json);

    let decoded: CorrectionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.failure, Some(FitError::ZeroVariance));
}

#[test]
fn test_successful_report_omits_failure() {
    let mut ledger = ScoreLedger::new();
    ledger
        .append_round(1, 1, entries(&[("A", 1, 10.0), ("B", 2, 20.0)]))
        .unwrap();

    let json = serde_json::to_string(&correct(&mut ledger, &FitOptions::default())).unwrap();
    assert!(!json.contains("failure"));
}

#[test]
fn test_correction_is_idempotent() {
    let mut ledger = ScoreLedger::new();
    ledger
        .append_round(1, 1, entries(&[("A", 1, 12.0), ("B", 2, 7.5), ("C", 3, 9.0)]))
        .unwrap();
    ledger
        .append_round(1, 2, entries(&[("C", 1, 14.0), ("A", 2, 8.0), ("B", 3, 6.5)]))
        .unwrap();
    ledger
        .append_round(1, 3, entries(&[("B", 1, 11.0), ("C", 2, 10.5), ("A", 3, 7.0)]))
        .unwrap();

    correct(&mut ledger, &FitOptions::default());
    let first = corrected(&ledger);
    correct(&mut ledger, &FitOptions::default());
    assert_eq!(first, corrected(&ledger));
}

#[test]
fn test_seat_centered_uses_all_rows_of_a_seat() {
    let rows = vec![
        ScoreObservation {
            block: 1,
            round: 1,
            player: "A".into(),
            seat: 1,
            raw: 4.0,
            corrected: None,
        },
        ScoreObservation {
            block: 1,
            round: 2,
            player: "B".into(),
            seat: 1,
            raw: 8.0,
            corrected: None,
        },
        ScoreObservation {
            block: 1,
            round: 2,
            player: "A".into(),
            seat: 2,
            raw: 3.0,
            corrected: None,
        },
    ];
    assert_eq!(seat_centered(&rows), vec![-2.0, 2.0, 0.0]);
}
