use super::*;
use crate::design::generate;
use crate::types::player_ids;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn square() -> Design {
    Design::from_rows(vec![vec![2, 0, 1], vec![0, 1, 2], vec![1, 2, 0]]).unwrap()
}

#[test]
fn test_build_maps_symbols_to_players() {
    let players = player_ids(["A", "B", "C"]);
    let plan = build(&square(), &players).unwrap();

    let first: Vec<&str> = plan.round(1).iter().map(|a| a.player.as_str()).collect();
    assert_eq!(first, vec!["C", "A", "B"]);
    assert_eq!(plan.round(3)[2].player.as_str(), "A");
}

#[test]
fn test_build_orders_by_round_then_seat() {
    let players = player_ids(["A", "B", "C"]);
    let plan = build(&square(), &players).unwrap();

    let keys: Vec<(u32, u32)> = plan.assignments().iter().map(|a| (a.round, a.seat)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(keys.first(), Some(&(1, 1)));
    assert_eq!(keys.last(), Some(&(3, 3)));
}

#[test]
fn test_plan_has_one_row_per_seat_per_round() {
    let mut rng = StdRng::seed_from_u64(3);
    let players = player_ids(["A", "B", "C", "D", "E"]);
    let plan = build(&generate(5, &mut rng).unwrap(), &players).unwrap();

    assert_eq!(plan.assignments().len(), 25);
    for round in 1..=5 {
        let seats: Vec<u32> = plan.round(round).iter().map(|a| a.seat).collect();
        assert_eq!(seats, vec![1, 2, 3, 4, 5]);
    }
    for seat in 1..=5 {
        let mut rounds: Vec<u32> = plan.seat(seat).map(|a| a.round).collect();
        rounds.sort();
        assert_eq!(rounds, vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn test_build_rejects_wrong_player_count() {
    let players = player_ids(["A", "B"]);
    assert_eq!(
        build(&square(), &players),
        Err(SeatingError::PlayerCountMismatch {
            expected: 3,
            got: 2
        })
    );
    assert_eq!(
        build(&square(), &players).unwrap_err().kind(),
        crate::error::ErrorKind::InvalidInput
    );
}

#[test]
fn test_build_rejects_duplicate_players() {
    let players = player_ids(["A", "B", "A"]);
    assert_eq!(
        build(&square(), &players),
        Err(SeatingError::DuplicatePlayer("A".to_string()))
    );
}

#[test]
fn test_round_out_of_range_is_empty() {
    let players = player_ids(["A", "B", "C"]);
    let plan = build(&square(), &players).unwrap();
    assert!(plan.round(0).is_empty());
    assert!(plan.round(4).is_empty());
}
