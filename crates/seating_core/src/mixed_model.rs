//! Linear mixed model with a categorical seat effect and a random player
//! intercept, fitted by restricted maximum likelihood.
//!
//! ```text
//! score = intercept + seat[k] + b[player] + e
//! b ~ N(0, sigma_b^2)      e ~ N(0, sigma^2)
//! ```
//!
//! Seats use treatment coding with the lowest seat number as the reference
//! level, so `seat[reference] = 0`.
//!
//! The covariance of one player's scores is `sigma^2 (I + lambda 11')` with
//! `lambda = sigma_b^2 / sigma^2`. For a fixed `lambda` everything the REML
//! criterion needs (the GLS normal equations and both log-determinants) can
//! be assembled from per-player sums, so the only dense algebra is a `p x p`
//! Cholesky solve with `p` = number of seats. `sigma^2` is profiled out and
//! the remaining one-dimensional criterion is maximised over
//! `rho = lambda / (1 + lambda)` by golden-section search.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FitError;
use crate::ledger::ScoreObservation;
use crate::types::PlayerId;

#[cfg(test)]
#[path = "mixed_model_tests.rs"]
mod mixed_model_tests;

/// Upper end of the `rho` search range. `lambda` at this bound is 1e6.
const RHO_MAX: f64 = 1.0 - 1e-6;

/// Golden ratio conjugate, `(sqrt(5) - 1) / 2`
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Knobs for the variance-ratio search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Maximum golden-section iterations before giving up
    pub max_iterations: u32,
    /// Width of the final `rho` bracket
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatEffect {
    pub seat: u32,
    pub effect: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEffect {
    pub player: PlayerId,
    /// Predicted random intercept (BLUP)
    pub effect: f64,
}

/// Estimates from a successful fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedModelFit {
    pub intercept: f64,
    /// One entry per observed seat, ascending; the first is the reference
    pub seat_effects: Vec<SeatEffect>,
    /// One entry per player, in order of first appearance
    pub player_effects: Vec<PlayerEffect>,
    pub group_variance: f64,
    pub residual_variance: f64,
    pub reml_log_likelihood: f64,
    pub iterations: u32,
    pub observations: usize,
    /// Fitted value for each input observation, same order
    #[serde(skip)]
    pub fitted: Vec<f64>,
}

impl MixedModelFit {
    /// Fixed effect of `seat` relative to the reference seat.
    pub fn seat_effect(&self, seat: u32) -> Option<f64> {
        self.seat_effects
            .iter()
            .find(|e| e.seat == seat)
            .map(|e| e.effect)
    }

    /// Expected advantage of sitting in `a` instead of `b`.
    pub fn seat_contrast(&self, a: u32, b: u32) -> Option<f64> {
        Some(self.seat_effect(a)? - self.seat_effect(b)?)
    }

    pub fn player_effect(&self, player: &PlayerId) -> Option<f64> {
        self.player_effects
            .iter()
            .find(|e| &e.player == player)
            .map(|e| e.effect)
    }

    /// Model prediction for `player` in `seat`.
    pub fn predict(&self, seat: u32, player: &PlayerId) -> Option<f64> {
        Some(self.intercept + self.seat_effect(seat)? + self.player_effect(player)?)
    }
}

/// Design data reduced to what the criterion needs.
struct Prepared {
    y: Vec<f64>,
    /// Seat level per observation, 0 is the reference level
    level: Vec<usize>,
    group: Vec<usize>,
    seats: Vec<u32>,
    players: Vec<PlayerId>,
    /// Number of fixed-effect parameters (intercept + non-reference seats)
    p: usize,
    xtx: DMatrix<f64>,
    xty: DVector<f64>,
    yty: f64,
    /// Per player: observation count
    group_n: Vec<f64>,
    /// Per player: column sums of X
    group_x: Vec<DVector<f64>>,
    /// Per player: sum of scores
    group_y: Vec<f64>,
}

impl Prepared {
    fn new(observations: &[ScoreObservation]) -> Self {
        let mut seats: Vec<u32> = observations.iter().map(|o| o.seat).collect();
        seats.sort_unstable();
        seats.dedup();
        let level_of: HashMap<u32, usize> =
            seats.iter().enumerate().map(|(i, &s)| (s, i)).collect();

        let mut players = Vec::new();
        let mut group_of: HashMap<&PlayerId, usize> = HashMap::new();
        for obs in observations {
            if !group_of.contains_key(&obs.player) {
                group_of.insert(&obs.player, players.len());
                players.push(obs.player.clone());
            }
        }

        let p = seats.len();
        let g = players.len();
        let y: Vec<f64> = observations.iter().map(|o| o.raw).collect();
        let level: Vec<usize> = observations.iter().map(|o| level_of[&o.seat]).collect();
        let group: Vec<usize> = observations.iter().map(|o| group_of[&o.player]).collect();

        let mut xtx = DMatrix::zeros(p, p);
        let mut xty = DVector::zeros(p);
        let mut group_n = vec![0.0; g];
        let mut group_x = vec![DVector::zeros(p); g];
        let mut group_y = vec![0.0; g];
        let mut yty = 0.0;

        for i in 0..y.len() {
            let (k, j) = (level[i], group[i]);
            xtx[(0, 0)] += 1.0;
            xty[0] += y[i];
            if k > 0 {
                xtx[(0, k)] += 1.0;
                xtx[(k, 0)] += 1.0;
                xtx[(k, k)] += 1.0;
                xty[k] += y[i];
                group_x[j][k] += 1.0;
            }
            group_x[j][0] += 1.0;
            group_n[j] += 1.0;
            group_y[j] += y[i];
            yty += y[i] * y[i];
        }

        Self {
            y,
            level,
            group,
            seats,
            players,
            p,
            xtx,
            xty,
            yty,
            group_n,
            group_x,
            group_y,
        }
    }

    fn n(&self) -> usize {
        self.y.len()
    }

    /// `x_i' beta` for observation `i`.
    fn linear_predictor(&self, i: usize, beta: &DVector<f64>) -> f64 {
        match self.level[i] {
            0 => beta[0],
            k => beta[0] + beta[k],
        }
    }

    fn residuals(&self, beta: &DVector<f64>) -> Vec<f64> {
        (0..self.n())
            .map(|i| self.y[i] - self.linear_predictor(i, beta))
            .collect()
    }

    /// Shrinkage weight `lambda / (1 + lambda n_j)` for every group.
    fn weights(&self, lambda: f64) -> Vec<f64> {
        self.group_n
            .iter()
            .map(|&n| lambda / (1.0 + lambda * n))
            .collect()
    }

    /// Quadratic form `r' H^-1 r`.
    fn weighted_rss(&self, residuals: &[f64], weights: &[f64]) -> f64 {
        let mut group_r = vec![0.0; weights.len()];
        let mut rss = 0.0;
        for (i, r) in residuals.iter().enumerate() {
            rss += r * r;
            group_r[self.group[i]] += r;
        }
        rss - weights
            .iter()
            .zip(&group_r)
            .map(|(w, s)| w * s * s)
            .sum::<f64>()
    }

    fn evaluate(&self, lambda: f64) -> Result<Evaluation, FitError> {
        let weights = self.weights(lambda);

        let mut a = self.xtx.clone();
        let mut c = self.xty.clone();
        for (j, &w) in weights.iter().enumerate() {
            let sx = &self.group_x[j];
            a -= (sx * sx.transpose()) * w;
            c -= sx * (w * self.group_y[j]);
        }

        let chol = a.cholesky().ok_or(FitError::Singular)?;
        let beta = chol.solve(&c);
        let log_det_a = 2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>();
        let log_det_h: f64 = self.group_n.iter().map(|&n| (lambda * n).ln_1p()).sum();

        let residuals = self.residuals(&beta);
        let rss = self.weighted_rss(&residuals, &weights);
        let dof = (self.n() - self.p) as f64;
        let sigma2 = rss / dof;
        if !(sigma2 > 0.0) || !sigma2.is_finite() {
            return Err(FitError::NonFinite);
        }

        let criterion = -0.5
            * (dof * sigma2.ln()
                + log_det_h
                + log_det_a
                + dof * (1.0 + (2.0 * std::f64::consts::PI).ln()));
        if !criterion.is_finite() {
            return Err(FitError::NonFinite);
        }

        Ok(Evaluation {
            lambda,
            criterion,
            beta,
            residuals,
            weights,
            sigma2,
        })
    }

    fn into_fit(self, eval: Evaluation, iterations: u32) -> MixedModelFit {
        let mut group_r = vec![0.0; self.players.len()];
        for (i, r) in eval.residuals.iter().enumerate() {
            group_r[self.group[i]] += r;
        }
        let blups: Vec<f64> = eval
            .weights
            .iter()
            .zip(&group_r)
            .map(|(w, s)| w * s)
            .collect();

        let fitted = (0..self.n())
            .map(|i| self.linear_predictor(i, &eval.beta) + blups[self.group[i]])
            .collect();

        let seat_effects = self
            .seats
            .iter()
            .enumerate()
            .map(|(k, &seat)| SeatEffect {
                seat,
                effect: if k == 0 { 0.0 } else { eval.beta[k] },
            })
            .collect();

        let observations = self.n();
        let player_effects = self
            .players
            .into_iter()
            .zip(blups)
            .map(|(player, effect)| PlayerEffect { player, effect })
            .collect();

        MixedModelFit {
            intercept: eval.beta[0],
            seat_effects,
            player_effects,
            group_variance: eval.lambda * eval.sigma2,
            residual_variance: eval.sigma2,
            reml_log_likelihood: eval.criterion,
            iterations,
            observations,
            fitted,
        }
    }

    /// Ordinary least squares fit that reproduces the data exactly.
    fn exact_fit(self) -> Result<MixedModelFit, FitError> {
        let chol = self.xtx.clone().cholesky().ok_or(FitError::Singular)?;
        let beta = chol.solve(&self.xty);
        let residuals = self.residuals(&beta);
        let weights = vec![0.0; self.players.len()];
        let eval = Evaluation {
            lambda: 0.0,
            criterion: f64::INFINITY,
            beta,
            residuals,
            weights,
            sigma2: 0.0,
        };
        Ok(self.into_fit(eval, 0))
    }
}

struct Evaluation {
    lambda: f64,
    criterion: f64,
    beta: DVector<f64>,
    residuals: Vec<f64>,
    weights: Vec<f64>,
    sigma2: f64,
}

fn lambda_of(rho: f64) -> f64 {
    rho / (1.0 - rho)
}

/// Fit the model to every observation in `observations`.
///
/// The result depends only on the observations, never on previous fits.
pub fn fit(
    observations: &[ScoreObservation],
    options: &FitOptions,
) -> Result<MixedModelFit, FitError> {
    let data = Prepared::new(observations);
    let n = data.n();
    if n < data.p + 1 {
        return Err(FitError::InsufficientData {
            observations: n,
            parameters: data.p,
        });
    }
    if data.y.iter().any(|y| !y.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let mean = data.y.iter().sum::<f64>() / n as f64;
    let tss: f64 = data.y.iter().map(|y| (y - mean).powi(2)).sum();
    if tss <= f64::EPSILON * data.yty.max(1.0) {
        return Err(FitError::ZeroVariance);
    }

    // Seat alone explains everything: no residual left to split
    let chol = data.xtx.clone().cholesky().ok_or(FitError::Singular)?;
    let ols = chol.solve(&data.xty);
    let ols_rss: f64 = data.residuals(&ols).iter().map(|r| r * r).sum();
    if ols_rss <= 1e-12 * tss {
        return data.exact_fit();
    }

    let (best, iterations) = golden_section(&data, options)?;
    Ok(data.into_fit(best, iterations))
}

/// Maximise the profiled REML criterion over `rho` in `[0, RHO_MAX]`.
fn golden_section(
    data: &Prepared,
    options: &FitOptions,
) -> Result<(Evaluation, u32), FitError> {
    let mut lo = 0.0;
    let mut hi = RHO_MAX;
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let mut f1 = data.evaluate(lambda_of(x1))?.criterion;
    let mut f2 = data.evaluate(lambda_of(x2))?.criterion;

    let mut iterations = 0;
    while hi - lo > options.tolerance {
        if iterations >= options.max_iterations {
            return Err(FitError::NoConvergence { iterations });
        }
        iterations += 1;
        if f1 < f2 {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = data.evaluate(lambda_of(x2))?.criterion;
        } else {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = data.evaluate(lambda_of(x1))?.criterion;
        }
    }

    // The optimum may sit on either boundary
    let mut best = data.evaluate(lambda_of(0.5 * (lo + hi)))?;
    for rho in [0.0, RHO_MAX] {
        let candidate = data.evaluate(lambda_of(rho))?;
        if candidate.criterion > best.criterion {
            best = candidate;
        }
    }
    Ok((best, iterations))
}
