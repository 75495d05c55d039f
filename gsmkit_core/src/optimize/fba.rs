//! Flux balance analysis: turning a [`Model`] into a [`Problem`] and solving it
//!
//! Each reaction becomes one variable bounded by the reaction bounds, and each metabolite
//! becomes a steady state constraint `S·v = 0` built from the rows of the stoichiometric matrix.
use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::configuration::{Configuration, Solver};
use crate::metabolic_model::model::Model;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::{solver_for, LinearSolver, SolverError};
use crate::optimize::OptimizationStatus;

/// Result of optimizing a [`Model`]
#[derive(Clone, Debug)]
pub struct Solution {
    /// Status reported by the solver
    pub status: OptimizationStatus,
    /// Value of the objective, None unless the solver found a solution
    pub objective_value: Option<f64>,
    /// Flux through each reaction keyed by reaction id, empty unless the solver found a solution
    pub fluxes: IndexMap<String, f64>,
}

impl Solution {
    /// Whether the solve produced usable fluxes
    pub fn is_optimal(&self) -> bool {
        self.status.has_solution()
    }

    pub fn is_infeasible(&self) -> bool {
        self.status == OptimizationStatus::Infeasible
    }

    /// Flux through a reaction, None if the solve failed or the reaction is unknown
    pub fn flux(&self, reaction: &str) -> Option<f64> {
        self.fluxes.get(reaction).copied()
    }
}

impl Model {
    /// Build the flux balance problem for the model's current bounds and objective
    pub fn to_problem(&self) -> Result<Problem, ProblemError> {
        let mut problem = Problem::new(self.objective_sense);
        for reaction in self.reactions.values() {
            problem.add_new_variable(
                &reaction.id,
                reaction.name.as_deref(),
                reaction.lower_bound,
                reaction.upper_bound,
            )?;
        }

        let (metabolites, matrix) = self.stoichiometric_matrix();
        let reaction_ids: Vec<&str> = self.reactions.keys().map(|id| id.as_str()).collect();
        for (met, row) in metabolites.iter().zip(matrix.row_iter()) {
            if row.nnz() == 0 {
                continue;
            }
            let variables: Vec<&str> = row.col_indices().iter().map(|c| reaction_ids[*c]).collect();
            problem.add_new_equality_constraint_by_id(met, &variables, row.values(), 0.)?;
        }

        for (id, coef) in &self.objective {
            problem.add_new_linear_objective_term_by_id(id, *coef)?;
        }
        Ok(problem)
    }

    /// Optimize the model with the solver set in the global configuration
    ///
    /// An infeasible model is not an error, check [`Solution::status`].
    pub fn optimize(&self) -> Result<Solution, OptimizeError> {
        self.optimize_with(Configuration::current().solver)
    }

    /// Optimize the model with a specific solver
    pub fn optimize_with(&self, solver: Solver) -> Result<Solution, OptimizeError> {
        let backend = solver_for(solver)?;
        self.optimize_using(backend.as_ref())
    }

    /// Optimize the model with a solver backend
    pub fn optimize_using(&self, solver: &dyn LinearSolver) -> Result<Solution, OptimizeError> {
        let problem = self.to_problem()?;
        debug!(
            "Optimizing model {} ({} reactions) with {}",
            self.id.as_deref().unwrap_or("<unnamed>"),
            self.reactions.len(),
            solver.name()
        );
        let solution = solver.solve(&problem)?;
        let fluxes = solution.variable_values.unwrap_or_default();
        Ok(Solution {
            status: solution.status,
            objective_value: solution.objective_value,
            fluxes,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("Unable to build the optimization problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),
}
