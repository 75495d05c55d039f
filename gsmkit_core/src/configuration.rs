//! Global defaults shared by model construction, optimization and the model tests
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Serialize};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug)]
pub struct Configuration {
    /// Lower bound given to reactions which don't specify one
    pub lower_bound: f64,
    /// Upper bound given to reactions which don't specify one
    pub upper_bound: f64,
    /// Absolute tolerance used when comparing fluxes
    pub tolerance: f64,
    /// Feasibility and duality gap tolerance handed to the interior point solver
    pub solver_tolerance: f64,
    /// Objective value below which a knocked out reaction is considered essential
    pub essential_threshold: f64,
    /// Solver used by [`crate::metabolic_model::model::Model::optimize`]
    pub solver: Solver,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-06,
            solver_tolerance: 1e-09,
            essential_threshold: 1e-03,
            solver: Solver::Clarabel,
        }
    }
}

impl Configuration {
    /// Snapshot of the current global configuration
    pub fn current() -> Configuration {
        // A poisoned lock only means another thread panicked mid-write, the values are plain data
        match CONFIGURATION.read() {
            Ok(conf) => conf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Enum used to specify the default solver to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    /// Use the Clarabel interior point solver
    Clarabel,
    /// Use the microlp simplex solver, requires the minilp feature to be enabled
    Microlp,
}
