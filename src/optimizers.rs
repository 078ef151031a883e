//! # Weight Optimizers
//!
//! $$
//! \min_{\mathbf{w}\in\Delta^{n-1}}\ \mathbf{w}^\top\Sigma\,\mathbf{w}
//! $$
//!
//! Long-only weight search. The primary method reparameterizes the simplex
//! through a softmax and minimizes with Nelder-Mead; the alternative is a
//! Dirichlet sampling heuristic with annealing-style acceptance. Degraded
//! answers are always flagged, never silent.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::Dirichlet;
use rand_distr::Distribution;
use tracing::debug;
use tracing::warn;

use crate::data::ReturnMatrix;
use crate::data::WeightVector;
use crate::types::Objective;
use crate::types::OptimizationResult;
use crate::types::OptimizerMethod;
use crate::types::Result;

const SOLVER_MAX_ITERS: u64 = 5000;
const SOLVER_SD_TOLERANCE: f64 = 1e-8;
const RANDOM_SEARCH_ITERATIONS: usize = 1000;
const ACCEPTANCE_TEMPERATURE: f64 = 0.1;

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}

/// Arithmetically annualized mean vector and covariance matrix.
fn annualized_inputs(returns: &ReturnMatrix, periods_per_year: f64) -> (Vec<f64>, Vec<Vec<f64>>) {
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

  (mu, cov)
}

fn portfolio_stats(w: &[f64], mu: &[f64], cov: &[Vec<f64>]) -> (f64, f64) {
  let expected_return = dot(w, mu);
  let sigma_w = mat_vec_mul(cov, w);
  let volatility = dot(w, &sigma_w).max(0.0).sqrt();

  (expected_return, volatility)
}

fn sharpe_of(expected_return: f64, volatility: f64, risk_free: f64) -> f64 {
  if volatility > 1e-15 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  }
}

/// Score to maximize: Sharpe for MaxSharpe, negated volatility otherwise.
fn objective_score(
  objective: Objective,
  w: &[f64],
  mu: &[f64],
  cov: &[Vec<f64>],
  risk_free: f64,
) -> f64 {
  let (expected_return, volatility) = portfolio_stats(w, mu, cov);
  match objective {
    Objective::MaxSharpe => sharpe_of(expected_return, volatility, risk_free),
    Objective::MinVolatility => -volatility,
  }
}

fn finish(
  returns: &ReturnMatrix,
  w: Vec<f64>,
  objective: Objective,
  method: OptimizerMethod,
  risk_free: f64,
  used_fallback: bool,
  mu: &[f64],
  cov: &[Vec<f64>],
) -> OptimizationResult {
  let (expected_return, volatility) = portfolio_stats(&w, mu, cov);
  let sharpe = sharpe_of(expected_return, volatility, risk_free);
  let objective_value = match objective {
    Objective::MaxSharpe => sharpe,
    Objective::MinVolatility => volatility,
  };

  let entries = returns
    .assets()
    .iter()
    .cloned()
    .zip(w.into_iter())
    .collect();

  OptimizationResult {
    weights: WeightVector::from_raw(entries),
    objective,
    method,
    objective_value,
    expected_return,
    volatility,
    sharpe,
    used_fallback,
  }
}

struct SimplexCost {
  mu: Vec<f64>,
  cov: Vec<Vec<f64>>,
  objective: Objective,
  risk_free: f64,
}

impl CostFunction for SimplexCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    let sigma_w = mat_vec_mul(&self.cov, &w);
    let port_var = dot(&w, &sigma_w);

    match self.objective {
      Objective::MinVolatility => Ok(port_var),
      Objective::MaxSharpe => {
        let volatility = port_var.max(0.0).sqrt();
        if volatility < 1e-15 {
          return Ok(1e10);
        }
        let port_ret = dot(&w, &self.mu);
        Ok(-(port_ret - self.risk_free) / volatility)
      }
    }
  }
}

fn solve_nelder_mead(
  objective: Objective,
  mu: &[f64],
  cov: &[Vec<f64>],
  risk_free: f64,
) -> Option<Vec<f64>> {
  let n = mu.len();
  let cost = SimplexCost {
    mu: mu.to_vec(),
    cov: cov.to_vec(),
    objective,
    risk_free,
  };

  // softmax of the zero vertex is the equal-weight portfolio
  let x0 = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] = 1.0;
    simplex.push(point);
  }

  match NelderMead::new(simplex).with_sd_tolerance(SOLVER_SD_TOLERANCE) {
    Ok(solver) => match Executor::new(cost, solver)
      .configure(|state| state.max_iters(SOLVER_MAX_ITERS))
      .run()
    {
      Ok(res) => Some(softmax(&res.state.best_param.unwrap_or(x0))),
      Err(_) => None,
    },
    Err(_) => None,
  }
}

fn optimize_nelder_mead(
  returns: &ReturnMatrix,
  objective: Objective,
  risk_free: f64,
  mu: &[f64],
  cov: &[Vec<f64>],
  covariance_epsilon: f64,
) -> OptimizationResult {
  let n = mu.len();
  let equal = vec![1.0 / n as f64; n];

  let det = DMatrix::from_fn(n, n, |i, j| cov[i][j]).determinant();
  if det.abs() < covariance_epsilon {
    warn!(
      determinant = det,
      "covariance matrix is singular or near-singular, falling back to equal weights"
    );
    return finish(
      returns,
      equal,
      objective,
      OptimizerMethod::NelderMead,
      risk_free,
      true,
      mu,
      cov,
    );
  }

  let Some(solved) = solve_nelder_mead(objective, mu, cov, risk_free) else {
    warn!("solver did not converge, falling back to equal weights");
    return finish(
      returns,
      equal,
      objective,
      OptimizerMethod::NelderMead,
      risk_free,
      true,
      mu,
      cov,
    );
  };

  // the equal-weight vertex competes with the solved point, so a converged
  // run never reports a worse objective than equal weights
  let solved_score = objective_score(objective, &solved, mu, cov, risk_free);
  let equal_score = objective_score(objective, &equal, mu, cov, risk_free);
  let best = if solved_score >= equal_score { solved } else { equal };

  finish(
    returns,
    best,
    objective,
    OptimizerMethod::NelderMead,
    risk_free,
    false,
    mu,
    cov,
  )
}

/// Dirichlet sampling with annealing-style acceptance.
///
/// Proposals are symmetric Dirichlet(1) draws; a worse sample still replaces
/// the incumbent with probability `exp(-(best - fit) / T)` at fixed
/// temperature, and the answer is the last accepted sample. A heuristic with
/// no convergence guarantee, kept for callers without the solver path.
fn optimize_random_search(
  returns: &ReturnMatrix,
  objective: Objective,
  risk_free: f64,
  mu: &[f64],
  cov: &[Vec<f64>],
) -> OptimizationResult {
  let n = mu.len();
  let equal = vec![1.0 / n as f64; n];

  let Ok(proposals) = Dirichlet::new_with_size(1.0, n) else {
    warn!("could not build the Dirichlet proposal distribution, falling back to equal weights");
    return finish(
      returns,
      equal,
      objective,
      OptimizerMethod::RandomSearch,
      risk_free,
      true,
      mu,
      cov,
    );
  };

  let mut rng = rand::thread_rng();
  let mut best_w = equal;
  let mut best_score = f64::NEG_INFINITY;

  for _ in 0..RANDOM_SEARCH_ITERATIONS {
    let w = proposals.sample(&mut rng);
    let fit = objective_score(objective, &w, mu, cov, risk_free);

    let accept = fit > best_score
      || rng.gen::<f64>() < (-(best_score - fit) / ACCEPTANCE_TEMPERATURE).exp();
    if accept {
      best_w = w;
      best_score = fit;
    }
  }

  finish(
    returns,
    best_w,
    objective,
    OptimizerMethod::RandomSearch,
    risk_free,
    false,
    mu,
    cov,
  )
}

/// Dispatch to the selected method with common configuration inputs.
pub fn optimize_with_method(
  method: OptimizerMethod,
  returns: &ReturnMatrix,
  objective: Objective,
  risk_free: f64,
  periods_per_year: f64,
  covariance_epsilon: f64,
) -> Result<OptimizationResult> {
  let (mu, cov) = annualized_inputs(returns, periods_per_year);
  let n = mu.len();

  debug!(%method, %objective, assets = n, "optimizing portfolio weights");

  // the one-asset simplex has a single point
  if n == 1 {
    return Ok(finish(
      returns,
      vec![1.0],
      objective,
      method,
      risk_free,
      false,
      &mu,
      &cov,
    ));
  }

  let result = match method {
    OptimizerMethod::NelderMead => {
      optimize_nelder_mead(returns, objective, risk_free, &mu, &cov, covariance_epsilon)
    }
    OptimizerMethod::RandomSearch => {
      optimize_random_search(returns, objective, risk_free, &mu, &cov)
    }
  };

  Ok(result)
}
