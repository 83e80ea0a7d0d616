use super::*;

fn obs(round: u32, player: &str, seat: u32, raw: f64) -> ScoreObservation {
    ScoreObservation {
        block: 1,
        round,
        player: PlayerId::new(player),
        seat,
        raw,
        corrected: None,
    }
}

/// One full 4x4 block: skill 10/20/30/40, seat effects 0/+3/-2/+1, small noise.
fn noisy_block() -> Vec<ScoreObservation> {
    let square = [[0, 1, 2, 3], [1, 2, 3, 0], [2, 3, 0, 1], [3, 0, 1, 2]];
    let names = ["A", "B", "C", "D"];
    let skill = [10.0, 20.0, 30.0, 40.0];
    let seat_bonus = [0.0, 3.0, -2.0, 1.0];
    let noise = [
        0.5, -0.3, 0.2, -0.4, 0.1, 0.6, -0.5, -0.2, 0.3, -0.1, 0.4, -0.6, 0.0, 0.2, -0.3, 0.1,
    ];

    let mut rows = Vec::new();
    for (r, seats) in square.iter().enumerate() {
        for (s, &p) in seats.iter().enumerate() {
            rows.push(obs(
                r as u32 + 1,
                names[p],
                s as u32 + 1,
                skill[p] + seat_bonus[s] + noise[r * 4 + s],
            ));
        }
    }
    rows
}

#[test]
fn test_recovers_constant_seat_advantage() {
    // Seat 1 is worth +5 whoever sits there; players differ by skill only
    let rows = vec![
        obs(1, "A", 1, 6.0),
        obs(1, "B", 2, 2.0),
        obs(1, "C", 3, 3.0),
        obs(2, "B", 1, 7.0),
        obs(2, "C", 2, 3.0),
        obs(2, "A", 3, 1.0),
    ];
    let fit = fit(&rows, &FitOptions::default()).unwrap();

    assert!((fit.seat_contrast(1, 2).unwrap() - 5.0).abs() < 1e-3);
    assert!((fit.seat_contrast(1, 3).unwrap() - 5.0).abs() < 1e-3);
    assert_eq!(fit.seat_effect(1), Some(0.0));

    for (row, fitted) in rows.iter().zip(&fit.fitted) {
        assert!((row.raw - fitted).abs() < 1e-3, "residual left for {:?}", row);
    }
}

#[test]
fn test_balanced_block_matches_seat_means() {
    let rows = noisy_block();
    let fit = fit(&rows, &FitOptions::default()).unwrap();

    // In a complete block seat contrasts equal differences of seat means
    assert!((fit.seat_effect(2).unwrap() - 2.875).abs() < 1e-9);
    assert!((fit.seat_effect(3).unwrap() + 2.275).abs() < 1e-9);
    assert!((fit.seat_effect(4).unwrap() - 0.5).abs() < 1e-9);

    assert!(fit.residual_variance > 0.0);
    assert!(fit.group_variance > fit.residual_variance);
}

#[test]
fn test_player_effects_follow_skill() {
    let fit = fit(&noisy_block(), &FitOptions::default()).unwrap();
    let effects: Vec<f64> = ["A", "B", "C", "D"]
        .iter()
        .map(|p| fit.player_effect(&PlayerId::new(*p)).unwrap())
        .collect();

    assert!(effects.windows(2).all(|w| w[0] < w[1]));
    assert!(effects.iter().sum::<f64>().abs() < 1e-6);
}

#[test]
fn test_fit_is_deterministic() {
    let rows = noisy_block();
    let a = fit(&rows, &FitOptions::default()).unwrap();
    let b = fit(&rows, &FitOptions::default()).unwrap();
    assert_eq!(a.seat_effects, b.seat_effects);
    assert_eq!(a.fitted, b.fitted);
}

#[test]
fn test_predict_matches_fitted_values() {
    let rows = noisy_block();
    let fit = fit(&rows, &FitOptions::default()).unwrap();
    for (row, fitted) in rows.iter().zip(&fit.fitted) {
        let predicted = fit.predict(row.seat, &row.player).unwrap();
        assert!((predicted - fitted).abs() < 1e-9);
    }
    assert_eq!(fit.predict(9, &PlayerId::new("A")), None);
}

#[test]
fn test_identical_scores_fail() {
    let rows = vec![
        obs(1, "A", 1, 4.0),
        obs(1, "B", 2, 4.0),
        obs(2, "B", 1, 4.0),
        obs(2, "A", 2, 4.0),
    ];
    assert_eq!(
        fit(&rows, &FitOptions::default()).unwrap_err(),
        FitError::ZeroVariance
    );
}

#[test]
fn test_too_few_observations_fail() {
    let rows = vec![obs(1, "A", 1, 1.0), obs(1, "B", 2, 2.0)];
    assert!(matches!(
        fit(&rows, &FitOptions::default()),
        Err(FitError::InsufficientData { .. })
    ));
}

#[test]
fn test_exact_seat_fit_is_accepted() {
    // Scores depend on seat only, so the fixed effects explain everything
    let rows = vec![
        obs(1, "A", 1, 15.0),
        obs(1, "B", 2, 10.0),
        obs(1, "C", 3, 10.0),
        obs(2, "B", 1, 15.0),
        obs(2, "C", 2, 10.0),
        obs(2, "A", 3, 10.0),
    ];
    let fit = fit(&rows, &FitOptions::default()).unwrap();
    assert!((fit.seat_contrast(1, 2).unwrap() - 5.0).abs() < 1e-9);
    assert_eq!(fit.residual_variance, 0.0);
    assert_eq!(fit.group_variance, 0.0);
}

#[test]
fn test_iteration_cap_reports_no_convergence() {
    let options = FitOptions {
        max_iterations: 3,
        tolerance: 1e-12,
    };
    assert_eq!(
        fit(&noisy_block(), &options).unwrap_err(),
        FitError::NoConvergence { iterations: 3 }
    );
}
