use super::*;
use seating_core::PlayerId;
use std::io::Cursor;

fn seating() -> Vec<SeatAssignment> {
    vec![
        SeatAssignment {
            round: 1,
            seat: 1,
            player: PlayerId::new("Ann"),
        },
        SeatAssignment {
            round: 1,
            seat: 2,
            player: PlayerId::new("Bob"),
        },
    ]
}

#[test]
fn test_collects_one_line_per_seat() {
    let mut collector = LineCollector::new(Cursor::new("12\r\nabc\n"), Vec::new());
    let entries = collector.collect(1, 1, &seating()).unwrap();
    assert_eq!(entries, Some(vec!["12".to_string(), "abc".to_string()]));

    let prompts = String::from_utf8(collector.into_output()).unwrap();
    assert!(prompts.contains("Score for player Ann (seat 1): "));
    assert!(prompts.contains("Score for player Bob (seat 2): "));
}

#[test]
fn test_end_of_input_mid_round() {
    let mut collector = LineCollector::new(Cursor::new("12\n"), Vec::new());
    assert_eq!(collector.collect(1, 1, &seating()).unwrap(), None);
}

#[test]
fn test_another_block_answers() {
    let mut collector = LineCollector::new(Cursor::new("y\n\nN\n"), Vec::new());
    assert!(collector.play_another_block(1).unwrap());
    assert!(collector.play_another_block(2).unwrap());
    assert!(!collector.play_another_block(3).unwrap());
    assert!(!collector.play_another_block(4).unwrap());
}
