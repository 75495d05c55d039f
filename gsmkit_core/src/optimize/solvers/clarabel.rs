//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min ½xᵀPx + qᵀx` subject to `Ax + s = b` with `s` in a product of cones.
//! Linear problems only need the zero cone (equalities) and the nonnegative cone
//! (`aᵀx <= b` rows), so every constraint and every finite variable bound is rewritten into
//! one of those two row types.
use ::clarabel::algebra::CscMatrix as ClarabelCsc;
use ::clarabel::solver::*;
use indexmap::IndexMap;
use log::debug;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::configuration::Configuration;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Clarabel interior point solver
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    /// Print Clarabel's iteration log
    pub verbose: bool,
    /// Maximum number of interior point iterations
    pub max_iter: u32,
    /// Feasibility and duality gap tolerance
    pub tolerance: f64,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        ClarabelSolver {
            verbose: false,
            max_iter: 200,
            tolerance: 1e-9,
        }
    }
}

impl ClarabelSolver {
    /// Solver using the tolerance of `conf`
    pub fn from_configuration(conf: &Configuration) -> Self {
        ClarabelSolver {
            tolerance: conf.solver_tolerance,
            ..Default::default()
        }
    }
}

/// A single row `Σ coef * x[idx]` with its right hand side
type Row = (Vec<(usize, f64)>, f64);

/// Problem rewritten into Clarabel's `Ax + s = b` form
struct ConicForm {
    a: ClarabelCsc<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ClarabelSolver {
    fn conic_form(&self, problem: &Problem) -> Result<ConicForm, SolverError> {
        let variables = problem.variables();
        let mut zero_rows: Vec<Row> = Vec::new();
        let mut nonneg_rows: Vec<Row> = Vec::new();

        for constraint in problem.constraints().values() {
            let terms = constraint
                .terms()
                .iter()
                .map(|t| match variables.get_index_of(&t.variable) {
                    Some(idx) => Ok((idx, t.coefficient)),
                    None => Err(SolverError::MissingVariable(t.variable.clone())),
                })
                .collect::<Result<Vec<_>, _>>()?;
            match constraint {
                Constraint::Equality { equals, .. } => zero_rows.push((terms, *equals)),
                Constraint::Inequality {
                    lower_bound,
                    upper_bound,
                    ..
                } => push_interval(
                    &mut zero_rows,
                    &mut nonneg_rows,
                    terms,
                    *lower_bound,
                    *upper_bound,
                ),
            }
        }

        for (idx, var) in variables.values().enumerate() {
            push_interval(
                &mut zero_rows,
                &mut nonneg_rows,
                vec![(idx, 1.)],
                var.lower_bound,
                var.upper_bound,
            );
        }

        let n_zero = zero_rows.len();
        let n_nonneg = nonneg_rows.len();
        let mut coo = CooMatrix::new(n_zero + n_nonneg, variables.len());
        let mut b = Vec::with_capacity(n_zero + n_nonneg);
        for (row_idx, (terms, rhs)) in zero_rows.into_iter().chain(nonneg_rows).enumerate() {
            for (col_idx, coef) in terms {
                coo.push(row_idx, col_idx, coef);
            }
            b.push(rhs);
        }
        let csc = CscMatrix::from(&coo);
        let a = ClarabelCsc::new(
            csc.nrows(),
            csc.ncols(),
            csc.col_offsets().to_vec(),
            csc.row_indices().to_vec(),
            csc.values().to_vec(),
        );

        let mut cones = Vec::new();
        if n_zero > 0 {
            cones.push(SupportedConeT::ZeroConeT(n_zero));
        }
        if n_nonneg > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(n_nonneg));
        }
        Ok(ConicForm { a, b, cones })
    }
}

/// Add `lower <= terms <= upper` as an equality row when the interval is a point, otherwise as
/// one nonnegative cone row per finite side
fn push_interval(
    zero_rows: &mut Vec<Row>,
    nonneg_rows: &mut Vec<Row>,
    terms: Vec<(usize, f64)>,
    lower: f64,
    upper: f64,
) {
    if lower == upper {
        zero_rows.push((terms, lower));
        return;
    }
    if lower.is_finite() {
        let negated = terms.iter().map(|(idx, coef)| (*idx, -coef)).collect();
        nonneg_rows.push((negated, -lower));
    }
    if upper.is_finite() {
        nonneg_rows.push((terms, upper));
    }
}

fn map_status(status: &SolverStatus) -> OptimizationStatus {
    match status {
        SolverStatus::Solved => OptimizationStatus::Optimal,
        SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            OptimizationStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            OptimizationStatus::Unbounded
        }
        SolverStatus::NumericalError => OptimizationStatus::NumericalError,
        SolverStatus::Unsolved => OptimizationStatus::Unoptimized,
        _ => OptimizationStatus::SolverHalted,
    }
}

impl LinearSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let ConicForm { a, b, cones } = self.conic_form(problem)?;
        let n = problem.num_variables();
        debug!(
            "Solving problem with {} variables and {} conic rows using Clarabel",
            n,
            b.len()
        );

        let coefficients = problem.objective().dense_coefficients(problem.variables());
        // Clarabel always minimizes
        let q: Vec<f64> = match problem.objective().sense() {
            ObjectiveSense::Minimize => coefficients.clone(),
            ObjectiveSense::Maximize => coefficients.iter().map(|c| -c).collect(),
        };
        let p = ClarabelCsc::<f64>::zeros((n, n));
        let settings = DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .max_iter(self.max_iter)
            .tol_feas(self.tolerance)
            .tol_gap_abs(self.tolerance)
            .tol_gap_rel(self.tolerance)
            .build()
            .map_err(|err| SolverError::Configuration(err.to_string()))?;

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = map_status(&solver.solution.status);
        debug!("Clarabel finished with status {}", status);
        if !status.has_solution() {
            return Ok(ProblemSolution::unsolved(status));
        }

        let x = &solver.solution.x;
        let objective_value: f64 = coefficients.iter().zip(x).map(|(c, v)| c * v).sum();
        let variable_values: IndexMap<String, f64> = problem
            .variables()
            .keys()
            .cloned()
            .zip(x.iter().copied())
            .collect();
        Ok(ProblemSolution {
            status,
            objective_value: Some(objective_value),
            variable_values: Some(variable_values),
        })
    }
}

#[cfg(test)]
mod clarabel_tests {
    use super::*;

    #[test]
    fn solve_small_lp() {
        // maximize x + y with x + 2y <= 4, x <= 3
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", None, 0., 3.).unwrap();
        problem.add_new_variable("y", None, 0., 10.).unwrap();
        problem
            .add_new_inequality_constraint_by_id(
                "c1",
                &["x", "y"],
                &[1., 2.],
                f64::NEG_INFINITY,
                4.,
            )
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        problem.add_new_linear_objective_term_by_id("y", 1.).unwrap();

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 3.5).abs() < 1e-6);
        let values = solution.variable_values.unwrap();
        assert!((values["x"] - 3.).abs() < 1e-6);
        assert!((values["y"] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tolerance_follows_configuration() {
        let conf = Configuration {
            solver_tolerance: 1e-7,
            ..Default::default()
        };
        let solver = ClarabelSolver::from_configuration(&conf);
        assert_eq!(solver.tolerance, 1e-7);
        assert_eq!(solver.max_iter, ClarabelSolver::default().max_iter);
        assert_eq!(
            ClarabelSolver::from_configuration(&Configuration::default()).tolerance,
            ClarabelSolver::default().tolerance
        );
    }

    #[test]
    fn detect_infeasible() {
        let mut problem = Problem::new(ObjectiveSense::Minimize);
        problem.add_new_variable("x", None, 0., 1.).unwrap();
        problem.add_new_variable("y", None, 0., 1.).unwrap();
        problem
            .add_new_equality_constraint_by_id("sum", &["x", "y"], &[1., 1.], 5.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert!(solution.objective_value.is_none());
    }

    #[test]
    fn fixed_variables_become_equalities() {
        let mut problem = Problem::new(ObjectiveSense::Minimize);
        problem.add_new_variable("x", None, 2., 2.).unwrap();
        problem.add_new_variable("y", None, 0., 10.).unwrap();
        problem
            .add_new_equality_constraint_by_id("link", &["x", "y"], &[1., -1.], 0.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("y", 1.).unwrap();

        let form = ClarabelSolver::default().conic_form(&problem).unwrap();
        // link row, x fixed row, then y's two bounds
        assert_eq!(form.b, vec![0., 2., 0., 10.]);
        assert_eq!(form.cones.len(), 2);

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!((solution.variable_values.unwrap()["y"] - 2.).abs() < 1e-6);
    }
}
