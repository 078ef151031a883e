//! # Risk Engine
//!
//! $$
//! \left(\mu,\Sigma\right)\ \longmapsto\ \left(\text{metrics},\ \text{VaR},\ \mathbf{w}^\*\right)
//! $$
//!
//! High-level facade over the computation modules. Engines are plain
//! caller-owned values with no shared state, so independent instances can
//! run side by side in tests and services.

use crate::data::ReturnMatrix;
use crate::data::WeightVector;
use crate::metrics;
use crate::optimizers;
use crate::risk;
use crate::simulation;
use crate::types::AttributionReport;
use crate::types::FrontierPoint;
use crate::types::MonteCarloSummary;
use crate::types::Objective;
use crate::types::OptimizationResult;
use crate::types::OptimizerMethod;
use crate::types::PortfolioMetrics;
use crate::types::Result;
use crate::types::RiskReport;

/// Runtime configuration for [`PortfolioRiskEngine`].
#[derive(Clone, Copy, Debug)]
pub struct RiskEngineConfig {
  /// Annualized risk-free rate used by Sharpe computations.
  pub risk_free_rate: f64,
  /// Periods per year used for annualization. Daily data wants 252,
  /// monthly data wants 12; leaving this implicit silently corrupts
  /// annualized figures, so it is a visible field.
  pub periods_per_year: f64,
  /// Weight-search method used by [`PortfolioRiskEngine::optimize`].
  pub optimizer: OptimizerMethod,
  /// Determinant threshold below which the covariance matrix is treated
  /// as singular and optimization falls back to equal weights.
  pub covariance_epsilon: f64,
}

impl Default for RiskEngineConfig {
  fn default() -> Self {
    Self {
      risk_free_rate: 0.02,
      periods_per_year: 252.0,
      optimizer: OptimizerMethod::NelderMead,
      covariance_epsilon: 1e-12,
    }
  }
}

/// Single entry-point engine for portfolio risk and allocation workflows.
#[derive(Clone, Debug, Default)]
pub struct PortfolioRiskEngine {
  config: RiskEngineConfig,
}

impl PortfolioRiskEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: RiskEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &RiskEngineConfig {
    &self.config
  }

  /// Blended return/risk statistics for one weight vector.
  pub fn portfolio_metrics(
    &self,
    returns: &ReturnMatrix,
    weights: &WeightVector,
  ) -> Result<PortfolioMetrics> {
    metrics::portfolio_metrics(
      returns,
      weights,
      self.config.risk_free_rate,
      self.config.periods_per_year,
    )
  }

  /// Historical value at risk of a single return series.
  pub fn value_at_risk(&self, returns: &[f64], confidence_level: f64) -> Result<f64> {
    risk::value_at_risk(returns, confidence_level)
  }

  /// Historical conditional value at risk of a single return series.
  pub fn conditional_value_at_risk(
    &self,
    returns: &[f64],
    confidence_level: f64,
  ) -> Result<f64> {
    risk::conditional_value_at_risk(returns, confidence_level)
  }

  /// Bundled tail-risk summary of a single return series.
  pub fn risk_report(&self, returns: &[f64], confidence_level: f64) -> Result<RiskReport> {
    risk::risk_report(
      returns,
      confidence_level,
      self.config.risk_free_rate,
      self.config.periods_per_year,
    )
  }

  /// Search long-only weights for the given objective at the configured
  /// risk-free rate.
  pub fn optimize(&self, returns: &ReturnMatrix, objective: Objective) -> Result<OptimizationResult> {
    self.optimize_with_rate(returns, objective, self.config.risk_free_rate)
  }

  /// Search long-only weights at an explicit risk-free rate.
  pub fn optimize_with_rate(
    &self,
    returns: &ReturnMatrix,
    objective: Objective,
    risk_free: f64,
  ) -> Result<OptimizationResult> {
    optimizers::optimize_with_method(
      self.config.optimizer,
      returns,
      objective,
      risk_free,
      self.config.periods_per_year,
      self.config.covariance_epsilon,
    )
  }

  /// Monte Carlo terminal-value simulation of a weighted portfolio.
  pub fn monte_carlo(
    &self,
    returns: &ReturnMatrix,
    weights: &WeightVector,
    num_simulations: usize,
    horizon_periods: usize,
  ) -> Result<MonteCarloSummary> {
    simulation::monte_carlo(returns, weights, num_simulations, horizon_periods)
  }

  /// Random return/volatility cloud over the long-only simplex.
  pub fn efficient_frontier(
    &self,
    returns: &ReturnMatrix,
    num_portfolios: usize,
  ) -> Result<Vec<FrontierPoint>> {
    simulation::efficient_frontier(
      returns,
      num_portfolios,
      self.config.risk_free_rate,
      self.config.periods_per_year,
    )
  }

  /// Benchmark-relative attribution for one weight vector.
  pub fn performance_attribution(
    &self,
    returns: &ReturnMatrix,
    weights: &WeightVector,
    benchmark: &[f64],
  ) -> Result<AttributionReport> {
    metrics::performance_attribution(
      returns,
      weights,
      benchmark,
      self.config.risk_free_rate,
      self.config.periods_per_year,
    )
  }
}
