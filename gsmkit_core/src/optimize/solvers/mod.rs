//! Backends able to solve a [`Problem`]
//!
//! Every backend implements [`LinearSolver`]. Clarabel is always available, microlp needs the
//! `minilp` feature.
use cfg_if::cfg_if;
use thiserror::Error;

use crate::configuration::{Configuration, Solver};
use crate::optimize::problem::Problem;
use crate::optimize::ProblemSolution;

pub mod clarabel;
cfg_if! {
    if #[cfg(feature = "minilp")] {
        pub mod microlp;
    }
}

/// Solves linear problems with continuous variables
pub trait LinearSolver {
    /// Name of the backend, used in log messages
    fn name(&self) -> &'static str;

    /// Solve the problem
    ///
    /// An infeasible or unbounded problem is not an error, it is reported through the
    /// status of the returned [`ProblemSolution`].
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

/// Get the backend for the requested solver, set up from the global configuration
pub fn solver_for(solver: Solver) -> Result<Box<dyn LinearSolver>, SolverError> {
    match solver {
        Solver::Clarabel => Ok(Box::new(self::clarabel::ClarabelSolver::from_configuration(
            &Configuration::current(),
        ))),
        Solver::Microlp => microlp_solver(),
    }
}

cfg_if! {
    if #[cfg(feature = "minilp")] {
        fn microlp_solver() -> Result<Box<dyn LinearSolver>, SolverError> {
            Ok(Box::new(self::microlp::MicrolpSolver))
        }
    } else {
        fn microlp_solver() -> Result<Box<dyn LinearSolver>, SolverError> {
            Err(SolverError::Unavailable("microlp", "minilp"))
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("The {0} solver requires the {1} feature to be enabled")]
    Unavailable(&'static str, &'static str),
    #[error("Unable to configure solver: {0}")]
    Configuration(String),
    #[error("Variable {0} referenced by the problem has no column")]
    MissingVariable(String),
}
