//! Linear programs built from models, and the solvers that optimize them

pub mod constraint;
pub mod fba;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;

use indexmap::IndexMap;

/// Raw outcome of a solver run, keyed by variable id
///
/// Values are only present when the status [`has_solution`](OptimizationStatus::has_solution).
#[derive(Clone, Debug)]
pub struct ProblemSolution {
    pub status: OptimizationStatus,
    pub objective_value: Option<f64>,
    pub variable_values: Option<IndexMap<String, f64>>,
}

impl ProblemSolution {
    pub fn unsolved(status: OptimizationStatus) -> Self {
        ProblemSolution {
            status,
            objective_value: None,
            variable_values: None,
        }
    }
}

/// How a solve ended
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// The solver stopped before starting
    Unoptimized,
    Optimal,
    /// Optimal within the solver's reduced tolerances
    AlmostOptimal,
    Unbounded,
    Infeasible,
    NumericalError,
    /// Iteration or time limit reached, or insufficient progress
    SolverHalted,
}

impl OptimizationStatus {
    /// Whether the solver produced values that can be trusted
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal
        )
    }
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptimizationStatus::Unoptimized => "unoptimized",
            OptimizationStatus::Optimal => "optimal",
            OptimizationStatus::Unbounded => "unbounded",
            OptimizationStatus::Infeasible => "infeasible",
            OptimizationStatus::AlmostOptimal => "almost optimal",
            OptimizationStatus::NumericalError => "numerical error",
            OptimizationStatus::SolverHalted => "solver halted",
        };
        write!(f, "{}", s)
    }
}
