//! # Portfolio Simulation
//!
//! $$
//! V_T=\prod_{t=1}^{T}\left(1+r_t\right),\quad r_t\sim\mathcal N\!\left(\mathbf{w}^\top\mu,\ \mathbf{w}^\top\Sigma\,\mathbf{w}\right)
//! $$
//!
//! Monte Carlo terminal values and random frontier sampling. Paths are
//! i.i.d. draws from a single normal fitted to the historical mean and
//! covariance: return autocorrelation and fat tails are deliberately
//! ignored, so treat the percentiles as a first-order sketch, not a
//! forecast.

use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

use crate::data::ReturnMatrix;
use crate::data::WeightVector;
use crate::risk::quantile_sorted;
use crate::types::FrontierPoint;
use crate::types::MonteCarloSummary;
use crate::types::Result;
use crate::types::RiskError;
use crate::types::TerminalPercentiles;

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}

/// Simulate terminal growth multiples of a weighted portfolio.
///
/// Each path compounds `horizon_periods` independent normal per-period
/// returns; paths are drawn in parallel.
pub fn monte_carlo(
  returns: &ReturnMatrix,
  weights: &WeightVector,
  num_simulations: usize,
  horizon_periods: usize,
) -> Result<MonteCarloSummary> {
  if num_simulations == 0 {
    return Err(RiskError::InvalidParameter(
      "num_simulations must be at least 1".to_string(),
    ));
  }
  if horizon_periods == 0 {
    return Err(RiskError::InvalidParameter(
      "horizon_periods must be at least 1".to_string(),
    ));
  }

  let dense = weights.aligned(returns)?;
  let mu = returns.mean_vector();
  let cov = returns.covariance();

  let period_mean = dot(&dense, &mu);
  let period_std = dot(&dense, &mat_vec_mul(&cov, &dense)).max(0.0).sqrt();

  let per_period = Normal::new(period_mean, period_std).map_err(|_| {
    RiskError::DegenerateInput(format!(
      "portfolio distribution N({period_mean}, {period_std}) is not samplable"
    ))
  })?;

  let final_values: Vec<f64> = (0..num_simulations)
    .into_par_iter()
    .map(|_| {
      let shocks = Array1::random(horizon_periods, per_period);
      shocks.fold(1.0, |acc, &r| acc * (1.0 + r))
    })
    .collect();

  let mut sorted = final_values.clone();
  sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

  let percentiles = TerminalPercentiles {
    p5: quantile_sorted(&sorted, 0.05),
    p50: quantile_sorted(&sorted, 0.50),
    p95: quantile_sorted(&sorted, 0.95),
  };

  Ok(MonteCarloSummary {
    final_values,
    percentiles,
  })
}

/// Sample random long-only portfolios and score each one.
///
/// Weights are uniform draws normalized to the simplex, scored with
/// arithmetic annualization, for plotting a return/volatility cloud.
pub fn efficient_frontier(
  returns: &ReturnMatrix,
  num_portfolios: usize,
  risk_free: f64,
  periods_per_year: f64,
) -> Result<Vec<FrontierPoint>> {
  if num_portfolios == 0 {
    return Err(RiskError::InvalidParameter(
      "num_portfolios must be at least 1".to_string(),
    ));
  }

  let n = returns.n_assets();
  let mu: Vec<f64> = returns
    .mean_vector()
    .iter()
    .map(|m| m * periods_per_year)
    .collect();
  let cov: Vec<Vec<f64>> = returns
    .covariance()
    .iter()
    .map(|row| row.iter().map(|c| c * periods_per_year).collect())
    .collect();

  let mut rng = rand::thread_rng();
  let mut points = Vec::with_capacity(num_portfolios);

  for _ in 0..num_portfolios {
    let mut w: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = w.iter().sum();
    if total < 1e-15 {
      w = vec![1.0 / n as f64; n];
    } else {
      for wi in &mut w {
        *wi /= total;
      }
    }

    let expected_return = dot(&w, &mu);
    let volatility = dot(&w, &mat_vec_mul(&cov, &w)).max(0.0).sqrt();
    let sharpe = if volatility > 1e-15 {
      (expected_return - risk_free) / volatility
    } else {
      0.0
    };

    let entries = returns.assets().iter().cloned().zip(w.into_iter()).collect();
    points.push(FrontierPoint {
      weights: WeightVector::from_raw(entries),
      expected_return,
      volatility,
      sharpe,
    });
  }

  Ok(points)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn matrix() -> ReturnMatrix {
    ReturnMatrix::from_series(vec![
      (
        "AAA".to_string(),
        vec![0.012, -0.008, 0.015, 0.002, -0.004, 0.009],
      ),
      (
        "BBB".to_string(),
        vec![-0.003, 0.006, -0.002, 0.004, 0.007, -0.005],
      ),
    ])
    .unwrap()
  }

  fn half_half() -> WeightVector {
    WeightVector::new(vec![("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]).unwrap()
  }

  #[test]
  fn single_path_collapses_the_percentiles() {
    let summary = monte_carlo(&matrix(), &half_half(), 1, 30).unwrap();

    assert_eq!(summary.final_values.len(), 1);
    let only = summary.final_values[0];
    assert_abs_diff_eq!(summary.percentiles.p5, only, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.percentiles.p50, only, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.percentiles.p95, only, epsilon = 1e-12);
  }

  #[test]
  fn percentiles_are_ordered_and_positive_horizoned() {
    let summary = monte_carlo(&matrix(), &half_half(), 500, 60).unwrap();

    assert_eq!(summary.final_values.len(), 500);
    assert!(summary.percentiles.p5 <= summary.percentiles.p50);
    assert!(summary.percentiles.p50 <= summary.percentiles.p95);
  }

  #[test]
  fn rejects_empty_simulation_requests() {
    let result = monte_carlo(&matrix(), &half_half(), 0, 30);
    assert!(matches!(result, Err(RiskError::InvalidParameter(_))));

    let result = monte_carlo(&matrix(), &half_half(), 10, 0);
    assert!(matches!(result, Err(RiskError::InvalidParameter(_))));
  }

  #[test]
  fn frontier_points_stay_on_the_simplex() {
    let points = efficient_frontier(&matrix(), 50, 0.02, 252.0).unwrap();

    assert_eq!(points.len(), 50);
    for point in &points {
      let sum: f64 = point.weights.entries().iter().map(|(_, w)| w).sum();
      assert!((sum - 1.0).abs() < 1e-9);
      assert!(point.weights.entries().iter().all(|(_, w)| *w >= 0.0));
      assert!(point.volatility >= 0.0);
    }
  }

  #[test]
  fn frontier_rejects_zero_samples() {
    let result = efficient_frontier(&matrix(), 0, 0.02, 252.0);
    assert!(matches!(result, Err(RiskError::InvalidParameter(_))));
  }
}
