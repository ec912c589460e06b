//! Monte Carlo simulation.
//!
//! # Overview
//!
//! * [`BrownianMotion`]: batched Brownian paths, one RNG stream per batch
//! * [`PathEnsemble`]: path values stored path after path
//! * [`GbmModel`] / [`Discretization`]: asset paths rebuilt from the
//!   Brownian driver, terminal-only, incremental or with a cash dividend
//! * [`MonteCarloModel`]: simulation plus discounted payoff statistics
//! * [`longstaff_schwartz`]: early exercise by regression
//! * [`autocall_probabilities`]: first-touch probabilities of an upper
//!   barrier on an observation schedule

mod autocall;
mod brownian;
mod gbm;
mod lsm;
mod model;

pub use autocall::{autocall_probabilities, AutocallProbabilities};
pub use brownian::{BrownianMotion, PathEnsemble};
pub use gbm::{Discretization, GbmModel};
pub use lsm::longstaff_schwartz;
pub use model::MonteCarloModel;
