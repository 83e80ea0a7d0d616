//! Property tests for the balanced design and the seating plan built from it.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seating_core::{build, generate, PlayerId, SeatingError};
use std::collections::BTreeSet;

fn players(n: usize) -> Vec<PlayerId> {
    (0..n).map(|i| PlayerId::new(format!("P{}", i))).collect()
}

proptest! {
    #[test]
    fn rows_and_columns_are_permutations(n in 1usize..12, seed in any::<u64>()) {
        let design = generate(n, &mut StdRng::seed_from_u64(seed)).unwrap();
        let all: BTreeSet<usize> = (0..n).collect();

        for round in design.rounds() {
            prop_assert_eq!(round.iter().copied().collect::<BTreeSet<_>>(), all.clone());
        }
        for seat in 0..n {
            prop_assert_eq!(design.seat_column(seat).into_iter().collect::<BTreeSet<_>>(), all.clone());
        }
    }

    #[test]
    fn plan_covers_every_round_and_seat(n in 1usize..10, seed in any::<u64>()) {
        let design = generate(n, &mut StdRng::seed_from_u64(seed)).unwrap();
        let plan = build(&design, &players(n)).unwrap();
        let numbers: Vec<u32> = (1..=n as u32).collect();

        prop_assert_eq!(plan.assignments().len(), n * n);
        for round in 1..=n as u32 {
            let seats: Vec<u32> = plan.round(round).iter().map(|a| a.seat).collect();
            prop_assert_eq!(&seats, &numbers);
            let seated: BTreeSet<&PlayerId> = plan.round(round).iter().map(|a| &a.player).collect();
            prop_assert_eq!(seated.len(), n);
        }
        for seat in 1..=n as u32 {
            let mut rounds: Vec<u32> = plan.seat(seat).map(|a| a.round).collect();
            rounds.sort_unstable();
            prop_assert_eq!(&rounds, &numbers);
        }
    }

    #[test]
    fn plan_rejects_mismatched_player_list(n in 1usize..8, extra in 1usize..4, seed in any::<u64>()) {
        let design = generate(n, &mut StdRng::seed_from_u64(seed)).unwrap();
        let result = build(&design, &players(n + extra));
        prop_assert_eq!(result, Err(SeatingError::PlayerCountMismatch { expected: n, got: n + extra }));
    }
}
