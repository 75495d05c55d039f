//! Implements a solver interface for microlp, a pure rust simplex solver
use ::microlp::{ComparisonOp, Error as MicrolpError, LinearExpr, OptimizationDirection};
use indexmap::IndexMap;
use log::debug;

use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// microlp simplex solver
#[derive(Clone, Copy, Debug, Default)]
pub struct MicrolpSolver;

impl LinearSolver for MicrolpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let direction = match problem.objective().sense() {
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
        };
        let mut lp = ::microlp::Problem::new(direction);
        let coefficients = problem.objective().dense_coefficients(problem.variables());
        let columns: Vec<::microlp::Variable> = problem
            .variables()
            .values()
            .zip(&coefficients)
            .map(|(var, coef)| lp.add_var(*coef, (var.lower_bound, var.upper_bound)))
            .collect();

        for constraint in problem.constraints().values() {
            let expr = || -> Result<LinearExpr, SolverError> {
                let mut expr = LinearExpr::empty();
                for term in constraint.terms() {
                    let idx = problem
                        .variables()
                        .get_index_of(&term.variable)
                        .ok_or_else(|| SolverError::MissingVariable(term.variable.clone()))?;
                    expr.add(columns[idx], term.coefficient);
                }
                Ok(expr)
            };
            match constraint {
                Constraint::Equality { equals, .. } => {
                    lp.add_constraint(expr()?, ComparisonOp::Eq, *equals)
                }
                Constraint::Inequality {
                    lower_bound,
                    upper_bound,
                    ..
                } => {
                    if lower_bound.is_finite() {
                        lp.add_constraint(expr()?, ComparisonOp::Ge, *lower_bound);
                    }
                    if upper_bound.is_finite() {
                        lp.add_constraint(expr()?, ComparisonOp::Le, *upper_bound);
                    }
                }
            }
        }

        debug!(
            "Solving problem with {} variables and {} constraints using microlp",
            problem.num_variables(),
            problem.num_constraints()
        );
        let solution = match lp.solve() {
            Ok(solution) => solution,
            Err(MicrolpError::Infeasible) => {
                return Ok(ProblemSolution::unsolved(OptimizationStatus::Infeasible))
            }
            Err(MicrolpError::Unbounded) => {
                return Ok(ProblemSolution::unsolved(OptimizationStatus::Unbounded))
            }
            #[allow(unreachable_patterns)]
            Err(err) => {
                debug!("microlp failed: {:?}", err);
                return Ok(ProblemSolution::unsolved(OptimizationStatus::SolverHalted));
            }
        };

        let variable_values: IndexMap<String, f64> = problem
            .variables()
            .keys()
            .cloned()
            .zip(columns.iter().map(|col| solution[*col]))
            .collect();
        Ok(ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(solution.objective()),
            variable_values: Some(variable_values),
        })
    }
}
