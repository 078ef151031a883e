//! # Engine Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}\in\Delta^{n-1}}\frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums, result containers and the error taxonomy of the risk engine.

use std::fmt::Display;

use thiserror::Error;

use crate::data::WeightVector;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RiskError>;

/// Errors raised by the engine. All are synchronous and final: nothing in
/// here is transient, so there are no retries and no internal recovery
/// beyond the signaled optimizer fallback.
#[derive(Error, Debug)]
pub enum RiskError {
  /// A caller-supplied scalar is outside its valid domain.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// A weight vector violates the simplex constraint.
  #[error("invalid weights: {0}")]
  InvalidWeights(String),

  /// Weights and return data disagree on the asset universe, or series
  /// lengths are mismatched where alignment is required.
  #[error("domain mismatch: {0}")]
  DomainMismatch(String),

  /// Mathematically undefined operation on otherwise valid input.
  #[error("degenerate input: {0}")]
  DegenerateInput(String),
}

/// Optimization objective over the long-only simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
  /// Maximize `(annualized return - risk free) / annualized volatility`.
  MaxSharpe,
  /// Minimize annualized portfolio volatility.
  MinVolatility,
}

impl Objective {
  /// Parse a string into an [`Objective`].
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "min-vol" | "min-volatility" | "minvol" => Self::MinVolatility,
      _ => Self::MaxSharpe,
    }
  }
}

impl Display for Objective {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Objective::MaxSharpe => write!(f, "max-sharpe"),
      Objective::MinVolatility => write!(f, "min-volatility"),
    }
  }
}

/// Supported weight-search methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizerMethod {
  /// Softmax-reparameterized Nelder-Mead over the simplex.
  NelderMead,
  /// Dirichlet sampling with annealing-style acceptance. A heuristic with
  /// no convergence guarantee, for callers that opt out of the solver.
  RandomSearch,
}

impl OptimizerMethod {
  /// Parse a string into an [`OptimizerMethod`].
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "random" | "random-search" | "randomsearch" => Self::RandomSearch,
      _ => Self::NelderMead,
    }
  }
}

impl Display for OptimizerMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OptimizerMethod::NelderMead => write!(f, "nelder-mead"),
      OptimizerMethod::RandomSearch => write!(f, "random-search"),
    }
  }
}

/// Blended portfolio statistics over one return history.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortfolioMetrics {
  /// Compound return over the full history.
  pub total_return: f64,
  /// Geometrically annualized return.
  pub annualized_return: f64,
  /// Annualized volatility (sample standard deviation scaled by `sqrt(ppy)`).
  pub volatility: f64,
  /// Sharpe ratio `(annualized_return - risk_free) / volatility`.
  pub sharpe: f64,
  /// Largest peak-to-trough decline of the cumulative curve, `<= 0`.
  pub max_drawdown: f64,
}

/// Tail-risk summary of a single return series at one confidence level.
#[derive(Clone, Copy, Debug)]
pub struct RiskReport {
  /// Tail probability the quantile was taken at, in `(0, 1)`.
  pub confidence_level: f64,
  /// Historical value at risk (a return, typically negative).
  pub var: f64,
  /// Mean return at or below the VaR threshold. Always `<= var`.
  pub cvar: f64,
  /// Annualized volatility of the series.
  pub volatility: f64,
  /// Sharpe ratio of the series.
  pub sharpe: f64,
  /// Maximum drawdown of the series, `<= 0`.
  pub max_drawdown: f64,
}

/// Benchmark-relative performance statistics.
#[derive(Clone, Copy, Debug)]
pub struct AttributionReport {
  /// Annualized excess return not explained by benchmark exposure.
  pub alpha: f64,
  /// Sensitivity of portfolio returns to benchmark returns.
  pub beta: f64,
  /// Annualized standard deviation of active returns.
  pub tracking_error: f64,
  /// Annualized mean active return per unit of tracking error.
  pub information_ratio: f64,
}

/// Output of a weight optimization run.
#[derive(Clone, Debug)]
pub struct OptimizationResult {
  /// Final long-only weights in matrix asset order.
  pub weights: WeightVector,
  /// Objective the weights were searched for.
  pub objective: Objective,
  /// Method that produced the weights.
  pub method: OptimizerMethod,
  /// Achieved objective value: the Sharpe ratio for
  /// [`Objective::MaxSharpe`], the volatility for
  /// [`Objective::MinVolatility`].
  pub objective_value: f64,
  /// Arithmetically annualized expected portfolio return.
  pub expected_return: f64,
  /// Annualized portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio at the supplied risk-free rate.
  pub sharpe: f64,
  /// True when the engine fell back to equal weights instead of the
  /// requested search. Never set silently: every fallback also emits a
  /// `tracing` warning.
  pub used_fallback: bool,
}

/// Terminal-value percentiles of a Monte Carlo run.
#[derive(Clone, Copy, Debug)]
pub struct TerminalPercentiles {
  /// 5th percentile terminal growth multiple.
  pub p5: f64,
  /// Median terminal growth multiple.
  pub p50: f64,
  /// 95th percentile terminal growth multiple.
  pub p95: f64,
}

/// Output of a Monte Carlo portfolio simulation.
#[derive(Clone, Debug)]
pub struct MonteCarloSummary {
  /// Terminal growth multiple of each simulated path.
  pub final_values: Vec<f64>,
  /// Percentiles of `final_values`.
  pub percentiles: TerminalPercentiles,
}

/// One random portfolio on the sampled efficient frontier.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  /// Sampled long-only weights in matrix asset order.
  pub weights: WeightVector,
  /// Arithmetically annualized expected return.
  pub expected_return: f64,
  /// Annualized volatility.
  pub volatility: f64,
  /// Sharpe ratio at the engine risk-free rate.
  pub sharpe: f64,
}
