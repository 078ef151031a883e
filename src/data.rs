//! # Return Data
//!
//! $$
//! \Sigma_{ij}=\operatorname{Cov}(r_i,r_j)
//! $$
//!
//! Return containers, simplex weight vectors and close-price preprocessing
//! helpers for callers sitting between a market-data source and the engine.

use crate::types::Result;
use crate::types::RiskError;

/// Tolerance on the weight-sum simplex constraint.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = sample_mean(x);
  let my = sample_mean(y);

  let mut acc = 0.0;
  for i in 0..n {
    acc += (x[i] - mx) * (y[i] - my);
  }
  acc / (n - 1) as f64
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = sample_mean(x);
  let my = sample_mean(y);

  let mut cov = 0.0;
  let mut sx = 0.0;
  let mut sy = 0.0;

  for i in 0..n {
    let dx = x[i] - mx;
    let dy = y[i] - my;
    cov += dx * dy;
    sx += dx * dx;
    sy += dy * dy;
  }

  let denom = (sx * sy).sqrt();
  if denom < 1e-15 {
    0.0
  } else {
    (cov / denom).clamp(-1.0, 1.0)
  }
}

/// Per-asset historical return series, aligned on a common time index.
///
/// Asset order is insertion order and is preserved in every engine output
/// keyed by asset. Series must already be time-aligned by the caller; only
/// equal lengths are enforced here.
#[derive(Clone, Debug)]
pub struct ReturnMatrix {
  assets: Vec<String>,
  series: Vec<Vec<f64>>,
  periods: usize,
}

impl ReturnMatrix {
  /// Build a matrix from `(asset, returns)` pairs.
  pub fn from_series(series: Vec<(String, Vec<f64>)>) -> Result<Self> {
    if series.is_empty() {
      return Err(RiskError::InvalidParameter(
        "a return matrix needs at least one asset".to_string(),
      ));
    }

    let periods = series[0].1.len();
    if periods < 2 {
      return Err(RiskError::DegenerateInput(format!(
        "return series need at least 2 periods, got {periods}"
      )));
    }

    let mut assets = Vec::with_capacity(series.len());
    let mut rows = Vec::with_capacity(series.len());

    for (asset, returns) in series {
      if assets.contains(&asset) {
        return Err(RiskError::DomainMismatch(format!(
          "duplicate asset identifier {asset}"
        )));
      }
      if returns.len() != periods {
        return Err(RiskError::DomainMismatch(format!(
          "series for {asset} has {} periods, expected {periods}",
          returns.len()
        )));
      }
      assets.push(asset);
      rows.push(returns);
    }

    Ok(Self {
      assets,
      series: rows,
      periods,
    })
  }

  /// Number of assets.
  pub fn n_assets(&self) -> usize {
    self.assets.len()
  }

  /// Number of periods shared by every series.
  pub fn periods(&self) -> usize {
    self.periods
  }

  /// Asset identifiers in insertion order.
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Return series for one asset, if present.
  pub fn series(&self, asset: &str) -> Option<&[f64]> {
    self.index_of(asset).map(|i| self.series[i].as_slice())
  }

  pub(crate) fn index_of(&self, asset: &str) -> Option<usize> {
    self.assets.iter().position(|a| a == asset)
  }

  pub(crate) fn row(&self, idx: usize) -> &[f64] {
    &self.series[idx]
  }

  /// Mean per-period return of each asset, in asset order.
  pub fn mean_vector(&self) -> Vec<f64> {
    self.series.iter().map(|r| sample_mean(r)).collect()
  }

  /// Per-period sample covariance matrix in asset order.
  pub fn covariance(&self) -> Vec<Vec<f64>> {
    let n = self.assets.len();
    let mut cov = vec![vec![0.0; n]; n];

    for i in 0..n {
      for j in i..n {
        let c = sample_covariance(&self.series[i], &self.series[j]);
        cov[i][j] = c;
        cov[j][i] = c;
      }
    }

    cov
  }

  /// Pearson correlation matrix in asset order.
  pub fn correlation(&self) -> Vec<Vec<f64>> {
    correlation_matrix(&self.series)
  }
}

/// Long-only weights over an asset universe.
///
/// Valid vectors are simplex points: every weight in `[0, 1]` and the sum
/// within [`WEIGHT_SUM_TOLERANCE`] of 1.
#[derive(Clone, Debug)]
pub struct WeightVector {
  entries: Vec<(String, f64)>,
}

impl WeightVector {
  /// Build a validated weight vector from `(asset, weight)` pairs.
  pub fn new(entries: Vec<(String, f64)>) -> Result<Self> {
    if entries.is_empty() {
      return Err(RiskError::InvalidWeights(
        "a weight vector needs at least one asset".to_string(),
      ));
    }

    let mut sum = 0.0;
    for (asset, weight) in &entries {
      if entries.iter().filter(|(a, _)| a == asset).count() > 1 {
        return Err(RiskError::InvalidWeights(format!(
          "duplicate asset identifier {asset}"
        )));
      }
      if !(0.0..=1.0).contains(weight) {
        return Err(RiskError::InvalidWeights(format!(
          "weight for {asset} is {weight}, expected a fraction in [0, 1]"
        )));
      }
      sum += weight;
    }

    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(RiskError::InvalidWeights(format!(
        "weights sum to {sum}, expected 1"
      )));
    }

    Ok(Self { entries })
  }

  /// Equal 1/n weights over the given assets.
  pub fn equal(assets: &[String]) -> Self {
    let n = assets.len().max(1);
    let w = 1.0 / n as f64;
    Self {
      entries: assets.iter().map(|a| (a.clone(), w)).collect(),
    }
  }

  /// Internal constructor for weights that are simplex points by
  /// construction (solver and sampler outputs).
  pub(crate) fn from_raw(entries: Vec<(String, f64)>) -> Self {
    Self { entries }
  }

  /// Weight for one asset, if present.
  pub fn get(&self, asset: &str) -> Option<f64> {
    self
      .entries
      .iter()
      .find(|(a, _)| a == asset)
      .map(|(_, w)| *w)
  }

  /// All `(asset, weight)` pairs in insertion order.
  pub fn entries(&self) -> &[(String, f64)] {
    &self.entries
  }

  /// Number of weighted assets.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// True when no assets are weighted.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Dense weights in matrix asset order. Matrix assets missing from the
  /// vector get weight zero; a weighted asset missing from the matrix is a
  /// domain mismatch.
  pub(crate) fn aligned(&self, matrix: &ReturnMatrix) -> Result<Vec<f64>> {
    let mut dense = vec![0.0; matrix.n_assets()];

    for (asset, weight) in &self.entries {
      match matrix.index_of(asset) {
        Some(i) => dense[i] = *weight,
        None => {
          return Err(RiskError::DomainMismatch(format!(
            "weighted asset {asset} has no return series"
          )));
        }
      }
    }

    Ok(dense)
  }
}

/// Convert close prices to simple (fractional) return series.
pub fn simple_returns_series(closes: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
  for i in 1..closes.len() {
    if closes[i - 1] > 0.0 {
      out.push(closes[i] / closes[i - 1] - 1.0);
    }
  }
  out
}

/// Convert close prices to log-return series.
pub fn log_returns_series(closes: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
  for i in 1..closes.len() {
    if closes[i - 1] > 0.0 && closes[i] > 0.0 {
      out.push((closes[i] / closes[i - 1]).ln());
    }
  }
  out
}

/// Align multiple return series to common tail length.
pub fn align_return_series(all_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let min_len = all_returns.iter().map(|r| r.len()).min().unwrap_or(0);
  all_returns
    .iter()
    .map(|r| r[r.len().saturating_sub(min_len)..].to_vec())
    .collect()
}

/// Build a Pearson correlation matrix from aligned return series.
pub fn correlation_matrix(aligned_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let n = aligned_returns.len();
  let mut corr = vec![vec![1.0; n]; n];

  for i in 0..n {
    for j in (i + 1)..n {
      let r = pearson(&aligned_returns[i], &aligned_returns[j]);
      corr[i][j] = r;
      corr[j][i] = r;
    }
  }

  corr
}

#[cfg(test)]
mod tests {
  use super::*;

  fn matrix() -> ReturnMatrix {
    ReturnMatrix::from_series(vec![
      ("AAA".to_string(), vec![0.01, -0.02, 0.03, 0.00]),
      ("BBB".to_string(), vec![-0.01, 0.02, 0.01, 0.01]),
    ])
    .unwrap()
  }

  #[test]
  fn rejects_mismatched_series_lengths() {
    let result = ReturnMatrix::from_series(vec![
      ("AAA".to_string(), vec![0.01, 0.02]),
      ("BBB".to_string(), vec![0.01]),
    ]);

    assert!(matches!(result, Err(RiskError::DomainMismatch(_))));
  }

  #[test]
  fn rejects_single_period_series() {
    let result = ReturnMatrix::from_series(vec![("AAA".to_string(), vec![0.01])]);
    assert!(matches!(result, Err(RiskError::DegenerateInput(_))));
  }

  #[test]
  fn rejects_duplicate_assets() {
    let result = ReturnMatrix::from_series(vec![
      ("AAA".to_string(), vec![0.01, 0.02]),
      ("AAA".to_string(), vec![0.03, 0.04]),
    ]);

    assert!(matches!(result, Err(RiskError::DomainMismatch(_))));
  }

  #[test]
  fn weight_sum_must_hit_one_within_tolerance() {
    let result = WeightVector::new(vec![
      ("AAA".to_string(), 0.5),
      ("BBB".to_string(), 0.4),
    ]);

    assert!(matches!(result, Err(RiskError::InvalidWeights(_))));
  }

  #[test]
  fn weights_must_be_fractions() {
    let result = WeightVector::new(vec![
      ("AAA".to_string(), 1.2),
      ("BBB".to_string(), -0.2),
    ]);

    assert!(matches!(result, Err(RiskError::InvalidWeights(_))));
  }

  #[test]
  fn alignment_zero_fills_unweighted_assets() {
    let weights = WeightVector::new(vec![("BBB".to_string(), 1.0)]).unwrap();
    let dense = weights.aligned(&matrix()).unwrap();

    assert_eq!(dense, vec![0.0, 1.0]);
  }

  #[test]
  fn alignment_rejects_unknown_assets() {
    let weights = WeightVector::new(vec![("ZZZ".to_string(), 1.0)]).unwrap();
    let result = weights.aligned(&matrix());

    assert!(matches!(result, Err(RiskError::DomainMismatch(_))));
  }

  #[test]
  fn equal_weights_form_a_simplex_point() {
    let assets = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
    let weights = WeightVector::equal(&assets);

    let sum: f64 = weights.entries().iter().map(|(_, w)| w).sum();
    assert!((sum - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
  }

  #[test]
  fn simple_returns_match_price_relatives() {
    let returns = simple_returns_series(&[100.0, 101.0, 99.99]);

    assert!((returns[0] - 0.01).abs() < 1e-12);
    assert!((returns[1] - (99.99 / 101.0 - 1.0)).abs() < 1e-12);
  }

  #[test]
  fn log_returns_skip_nonpositive_closes() {
    let returns = log_returns_series(&[100.0, 0.0, 110.0, 121.0]);

    assert_eq!(returns.len(), 1);
    assert!((returns[0] - (121.0_f64 / 110.0).ln()).abs() < 1e-12);
  }

  #[test]
  fn align_truncates_to_common_tail() {
    let aligned = align_return_series(&[vec![0.1, 0.2, 0.3], vec![0.4, 0.5]]);

    assert_eq!(aligned[0], vec![0.2, 0.3]);
    assert_eq!(aligned[1], vec![0.4, 0.5]);
  }

  #[test]
  fn correlation_is_unit_on_diagonal_and_bounded() {
    let corr = matrix().correlation();

    assert_eq!(corr[0][0], 1.0);
    assert_eq!(corr[1][1], 1.0);
    assert!(corr[0][1].abs() <= 1.0);
    assert_eq!(corr[0][1], corr[1][0]);
  }

  #[test]
  fn covariance_diagonal_matches_variance() {
    let m = matrix();
    let cov = m.covariance();

    // var of [0.01, -0.02, 0.03, 0.00] with n-1 normalization
    let mean = 0.005;
    let expected: f64 = [0.01_f64, -0.02, 0.03, 0.00]
      .iter()
      .map(|r| (r - mean) * (r - mean))
      .sum::<f64>()
      / 3.0;

    assert!((cov[0][0] - expected).abs() < 1e-12);
  }
}
