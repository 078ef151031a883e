//! # Portfolio Metrics
//!
//! $$
//! R_p(t)=\sum_i w_i\,r_i(t)
//! $$
//!
//! Blended portfolio statistics and benchmark attribution.

use crate::data::ReturnMatrix;
use crate::data::WeightVector;
use crate::risk::max_drawdown;
use crate::types::AttributionReport;
use crate::types::PortfolioMetrics;
use crate::types::Result;
use crate::types::RiskError;

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn sample_variance(xs: &[f64], mean: f64) -> f64 {
  if xs.len() < 2 {
    return 0.0;
  }

  let mut acc = 0.0;
  for &x in xs {
    let d = x - mean;
    acc += d * d;
  }
  acc / (xs.len() - 1) as f64
}

/// Per-period portfolio returns for dense weights in matrix asset order.
pub(crate) fn portfolio_returns(returns: &ReturnMatrix, dense_weights: &[f64]) -> Vec<f64> {
  (0..returns.periods())
    .map(|t| {
      dense_weights
        .iter()
        .enumerate()
        .map(|(i, &w)| w * returns.row(i)[t])
        .sum()
    })
    .collect()
}

/// Full portfolio statistics for one weight vector over one return history.
pub fn portfolio_metrics(
  returns: &ReturnMatrix,
  weights: &WeightVector,
  risk_free: f64,
  periods_per_year: f64,
) -> Result<PortfolioMetrics> {
  let dense = weights.aligned(returns)?;
  let period_returns = portfolio_returns(returns, &dense);

  let total_return = period_returns.iter().fold(1.0, |acc, &r| acc * (1.0 + r)) - 1.0;

  let mean = sample_mean(&period_returns);
  let annualized_return = (1.0 + mean).powf(periods_per_year) - 1.0;

  let volatility = sample_variance(&period_returns, mean).sqrt() * periods_per_year.sqrt();
  if volatility == 0.0 {
    return Err(RiskError::DegenerateInput(
      "portfolio volatility is zero, Sharpe ratio is undefined".to_string(),
    ));
  }

  let sharpe = (annualized_return - risk_free) / volatility;

  Ok(PortfolioMetrics {
    total_return,
    annualized_return,
    volatility,
    sharpe,
    max_drawdown: max_drawdown(&period_returns),
  })
}

/// Benchmark-relative alpha, beta, tracking error and information ratio.
pub fn performance_attribution(
  returns: &ReturnMatrix,
  weights: &WeightVector,
  benchmark: &[f64],
  risk_free: f64,
  periods_per_year: f64,
) -> Result<AttributionReport> {
  if benchmark.len() != returns.periods() {
    return Err(RiskError::DomainMismatch(format!(
      "benchmark has {} periods, return matrix has {}",
      benchmark.len(),
      returns.periods()
    )));
  }

  let dense = weights.aligned(returns)?;
  let period_returns = portfolio_returns(returns, &dense);

  let active: Vec<f64> = period_returns
    .iter()
    .zip(benchmark.iter())
    .map(|(p, b)| p - b)
    .collect();

  let active_mean = sample_mean(&active);
  let tracking_error = sample_variance(&active, active_mean).sqrt() * periods_per_year.sqrt();
  let information_ratio = if tracking_error != 0.0 {
    active_mean * periods_per_year / tracking_error
  } else {
    0.0
  };

  let portfolio_mean = sample_mean(&period_returns);
  let benchmark_mean = sample_mean(benchmark);

  let mut covariance = 0.0;
  for (p, b) in period_returns.iter().zip(benchmark.iter()) {
    covariance += (p - portfolio_mean) * (b - benchmark_mean);
  }
  covariance /= (period_returns.len() - 1) as f64;

  let benchmark_variance = sample_variance(benchmark, benchmark_mean);
  let beta = if benchmark_variance != 0.0 {
    covariance / benchmark_variance
  } else {
    1.0
  };

  let portfolio_annual = portfolio_mean * periods_per_year;
  let benchmark_annual = benchmark_mean * periods_per_year;
  let alpha = portfolio_annual - (risk_free + beta * (benchmark_annual - risk_free));

  Ok(AttributionReport {
    alpha,
    beta,
    tracking_error,
    information_ratio,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;

  use super::*;

  fn two_asset_matrix() -> ReturnMatrix {
    ReturnMatrix::from_series(vec![
      ("AAA".to_string(), vec![0.01, -0.02, 0.03, 0.00]),
      ("BBB".to_string(), vec![-0.01, 0.02, 0.01, 0.01]),
    ])
    .unwrap()
  }

  fn half_half() -> WeightVector {
    WeightVector::new(vec![("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]).unwrap()
  }

  #[test]
  fn blended_total_return_compounds_period_returns() {
    // blended periods: 0.00, 0.00, 0.02, 0.005
    let metrics = portfolio_metrics(&two_asset_matrix(), &half_half(), 0.02, 252.0).unwrap();

    let expected = 1.02_f64 * 1.005 - 1.0;
    assert_abs_diff_eq!(metrics.total_return, expected, epsilon = 1e-12);
    assert!((expected - 0.02510).abs() < 1e-4);
  }

  #[test]
  fn degenerate_weights_reduce_to_the_single_asset() {
    let matrix = two_asset_matrix();
    let solo = ReturnMatrix::from_series(vec![(
      "AAA".to_string(),
      vec![0.01, -0.02, 0.03, 0.00],
    )])
    .unwrap();

    let weights = WeightVector::new(vec![
      ("AAA".to_string(), 1.0),
      ("BBB".to_string(), 0.0),
    ])
    .unwrap();
    let solo_weights = WeightVector::new(vec![("AAA".to_string(), 1.0)]).unwrap();

    let blended = portfolio_metrics(&matrix, &weights, 0.02, 252.0).unwrap();
    let single = portfolio_metrics(&solo, &solo_weights, 0.02, 252.0).unwrap();

    assert_relative_eq!(blended.total_return, single.total_return, epsilon = 1e-12);
    assert_relative_eq!(blended.volatility, single.volatility, epsilon = 1e-12);
    assert_relative_eq!(blended.sharpe, single.sharpe, epsilon = 1e-12);
    assert_relative_eq!(blended.max_drawdown, single.max_drawdown, epsilon = 1e-12);
  }

  #[test]
  fn rejects_weights_off_the_simplex() {
    let weights = WeightVector::new(vec![("AAA".to_string(), 0.45), ("BBB".to_string(), 0.45)]);
    assert!(matches!(weights, Err(RiskError::InvalidWeights(_))));
  }

  #[test]
  fn rejects_zero_volatility_portfolios() {
    let matrix = ReturnMatrix::from_series(vec![("FLAT".to_string(), vec![0.01; 10])]).unwrap();
    let weights = WeightVector::new(vec![("FLAT".to_string(), 1.0)]).unwrap();

    let result = portfolio_metrics(&matrix, &weights, 0.02, 252.0);
    assert!(matches!(result, Err(RiskError::DegenerateInput(_))));
  }

  #[test]
  fn drawdown_is_non_positive() {
    let metrics = portfolio_metrics(&two_asset_matrix(), &half_half(), 0.02, 252.0).unwrap();
    assert!(metrics.max_drawdown <= 0.0);
  }

  #[test]
  fn annualization_respects_the_period_convention() {
    let daily = portfolio_metrics(&two_asset_matrix(), &half_half(), 0.02, 252.0).unwrap();
    let monthly = portfolio_metrics(&two_asset_matrix(), &half_half(), 0.02, 12.0).unwrap();

    assert!(daily.annualized_return > monthly.annualized_return);
    assert!(daily.volatility > monthly.volatility);
  }

  #[test]
  fn self_benchmark_attribution_is_neutral() {
    let matrix = two_asset_matrix();
    let weights = half_half();
    let dense = weights.aligned(&matrix).unwrap();
    let benchmark = portfolio_returns(&matrix, &dense);

    let report =
      performance_attribution(&matrix, &weights, &benchmark, 0.02, 252.0).unwrap();

    assert_abs_diff_eq!(report.beta, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.alpha, 0.0, epsilon = 1e-12);
    assert_eq!(report.tracking_error, 0.0);
    assert_eq!(report.information_ratio, 0.0);
  }

  #[test]
  fn attribution_rejects_misaligned_benchmarks() {
    let result = performance_attribution(
      &two_asset_matrix(),
      &half_half(),
      &[0.01, 0.02],
      0.02,
      252.0,
    );

    assert!(matches!(result, Err(RiskError::DomainMismatch(_))));
  }
}
