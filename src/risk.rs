//! # Historical Risk
//!
//! $$
//! \mathrm{CVaR}_\alpha=\mathbb E\left[r\mid r\le \mathrm{VaR}_\alpha\right]
//! $$
//!
//! Order-statistic VaR/CVaR, drawdown and the bundled risk report. The
//! quantile convention is fixed crate-wide: linear interpolation between
//! order statistics at position `level * (n - 1)`.

use tracing::warn;

use crate::types::Result;
use crate::types::RiskError;
use crate::types::RiskReport;

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

fn sorted_ascending(xs: &[f64]) -> Vec<f64> {
  let mut sorted = xs.to_vec();
  sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
  sorted
}

fn validate_level(confidence_level: f64) -> Result<()> {
  if !confidence_level.is_finite() || confidence_level <= 0.0 || confidence_level >= 1.0 {
    return Err(RiskError::InvalidParameter(format!(
      "confidence level is {confidence_level}, expected a fraction strictly between 0 and 1"
    )));
  }
  Ok(())
}

/// Interpolated quantile of an ascending slice at position `q * (n - 1)`.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
  let pos = q * (sorted.len() - 1) as f64;
  let lo = pos.floor() as usize;
  let frac = pos - lo as f64;

  if lo + 1 >= sorted.len() {
    sorted[sorted.len() - 1]
  } else {
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
  }
}

/// Historical value at risk: the `confidence_level` quantile of the return
/// distribution. Short series still produce an estimate, with a warning.
pub fn value_at_risk(returns: &[f64], confidence_level: f64) -> Result<f64> {
  validate_level(confidence_level)?;

  if returns.is_empty() {
    return Err(RiskError::DegenerateInput(
      "cannot take a quantile of an empty return series".to_string(),
    ));
  }

  let recommended = (1.0 / confidence_level).ceil() as usize;
  if returns.len() < recommended {
    warn!(
      samples = returns.len(),
      recommended, "return series is short for this confidence level, the estimate will be noisy"
    );
  }

  let sorted = sorted_ascending(returns);
  Ok(quantile_sorted(&sorted, confidence_level))
}

/// Conditional value at risk: mean return at or below the VaR threshold.
/// Collapses to VaR itself when the tail holds a single point.
pub fn conditional_value_at_risk(returns: &[f64], confidence_level: f64) -> Result<f64> {
  let var = value_at_risk(returns, confidence_level)?;

  let mut tail_sum = 0.0;
  let mut tail_len = 0usize;
  for &r in returns {
    if r <= var {
      tail_sum += r;
      tail_len += 1;
    }
  }

  if tail_len == 0 {
    return Ok(var);
  }
  Ok(tail_sum / tail_len as f64)
}

/// Largest peak-to-trough decline of the cumulative-return curve. Zero when
/// the curve never decreases.
pub fn max_drawdown(returns: &[f64]) -> f64 {
  let mut cumulative = 1.0;
  let mut peak = f64::NEG_INFINITY;
  let mut worst = 0.0;

  for &r in returns {
    cumulative *= 1.0 + r;
    if cumulative > peak {
      peak = cumulative;
    }
    let drawdown = cumulative / peak - 1.0;
    if drawdown < worst {
      worst = drawdown;
    }
  }

  worst
}

/// Tail-risk summary of one return series at one confidence level.
pub fn risk_report(
  returns: &[f64],
  confidence_level: f64,
  risk_free: f64,
  periods_per_year: f64,
) -> Result<RiskReport> {
  let var = value_at_risk(returns, confidence_level)?;
  let cvar = conditional_value_at_risk(returns, confidence_level)?;

  let mean = sample_mean(returns);
  let volatility = sample_variance(returns, mean).sqrt() * periods_per_year.sqrt();
  if volatility == 0.0 {
    return Err(RiskError::DegenerateInput(
      "series volatility is zero, Sharpe ratio is undefined".to_string(),
    ));
  }

  let annualized_return = (1.0 + mean).powf(periods_per_year) - 1.0;
  let sharpe = (annualized_return - risk_free) / volatility;

  Ok(RiskReport {
    confidence_level,
    var,
    cvar,
    volatility,
    sharpe,
    max_drawdown: max_drawdown(returns),
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;

  const TEN_RETURNS: [f64; 10] = [-0.05, -0.03, -0.01, 0.00, 0.02, 0.04, 0.06, 0.07, 0.08, 0.09];

  #[test]
  fn var_interpolates_between_order_statistics() {
    // position 0.05 * 9 = 0.45 between -0.05 and -0.03
    let var = value_at_risk(&TEN_RETURNS, 0.05).unwrap();
    assert_abs_diff_eq!(var, -0.041, epsilon = 1e-12);
  }

  #[test]
  fn var_rejects_out_of_range_levels() {
    for level in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
      let result = value_at_risk(&TEN_RETURNS, level);
      assert!(matches!(result, Err(RiskError::InvalidParameter(_))));
    }
  }

  #[test]
  fn var_rejects_empty_series() {
    let result = value_at_risk(&[], 0.05);
    assert!(matches!(result, Err(RiskError::DegenerateInput(_))));
  }

  #[traced_test]
  #[test]
  fn var_warns_on_short_series() {
    let var = value_at_risk(&[-0.02, 0.01, 0.03], 0.05).unwrap();

    // position 0.05 * 2 = 0.1 between -0.02 and 0.01
    assert_abs_diff_eq!(var, -0.017, epsilon = 1e-12);
    assert!(logs_contain("short for this confidence level"));
  }

  #[test]
  fn cvar_never_exceeds_var() {
    let var = value_at_risk(&TEN_RETURNS, 0.10).unwrap();
    let cvar = conditional_value_at_risk(&TEN_RETURNS, 0.10).unwrap();

    assert!(cvar <= var);
  }

  #[test]
  fn cvar_collapses_to_var_on_single_point_tail() {
    let returns = [-0.05, 0.10, 0.12, 0.15];
    let var = value_at_risk(&returns, 0.05).unwrap();
    let cvar = conditional_value_at_risk(&returns, 0.05).unwrap();

    // only -0.05 sits at or below the interpolated quantile
    assert_abs_diff_eq!(cvar, -0.05, epsilon = 1e-12);
    assert!(cvar <= var);
  }

  #[test]
  fn drawdown_is_zero_for_non_decreasing_curves() {
    assert_eq!(max_drawdown(&[0.01, 0.0, 0.02, 0.0]), 0.0);
  }

  #[test]
  fn drawdown_tracks_peak_to_trough() {
    // curve: 1.1, 0.88, 0.968 -> trough 0.88 against peak 1.1
    let dd = max_drawdown(&[0.10, -0.20, 0.10]);
    assert_abs_diff_eq!(dd, -0.20, epsilon = 1e-12);
  }

  #[test]
  fn drawdown_is_never_positive() {
    let dd = max_drawdown(&TEN_RETURNS);
    assert!(dd <= 0.0);
  }

  #[test]
  fn report_bundles_consistent_tail_metrics() {
    let report = risk_report(&TEN_RETURNS, 0.10, 0.02, 252.0).unwrap();

    assert!(report.cvar <= report.var);
    assert!(report.volatility > 0.0);
    assert!(report.max_drawdown <= 0.0);
    assert_eq!(report.confidence_level, 0.10);
  }

  #[test]
  fn report_rejects_constant_series() {
    let result = risk_report(&[0.01; 30], 0.05, 0.02, 252.0);
    assert!(matches!(result, Err(RiskError::DegenerateInput(_))));
  }
}
