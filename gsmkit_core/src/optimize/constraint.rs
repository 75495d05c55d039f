//! Linear constraints over problem variables
use std::fmt::{Display, Formatter};

/// A linear row of the problem
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `Σ terms = equals`, one per metabolite in a flux balance problem
    Equality {
        terms: Vec<ConstraintTerm>,
        equals: f64,
    },
    /// `lower_bound <= Σ terms <= upper_bound`, either side may be infinite
    Inequality {
        terms: Vec<ConstraintTerm>,
        lower_bound: f64,
        upper_bound: f64,
    },
}

impl Constraint {
    /// Equality over `variables` weighted by `coefficients`
    ///
    /// Extra variables or coefficients beyond the shorter slice are ignored.
    ///
    /// # Examples
    /// ```rust
    /// use gsmkit_core::optimize::constraint::Constraint;
    /// // CO + H2O -> CO2 + H2 balanced on carbon
    /// let carbon = Constraint::new_equality(&["CODH", "EX_CO2"], &[1.0, -1.0], 0.);
    /// assert_eq!(carbon.to_string(), "1*CODH + -1*EX_CO2 = 0");
    /// ```
    pub fn new_equality(variables: &[&str], coefficients: &[f64], equals: f64) -> Self {
        Constraint::Equality {
            terms: ConstraintTerm::pair_up(variables, coefficients),
            equals,
        }
    }

    /// Inequality `lower_bound <= Σ coefficient * variable <= upper_bound`
    pub fn new_inequality(
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        Constraint::Inequality {
            terms: ConstraintTerm::pair_up(variables, coefficients),
            lower_bound,
            upper_bound,
        }
    }

    pub fn terms(&self) -> &[ConstraintTerm] {
        match self {
            Constraint::Equality { terms, .. } | Constraint::Inequality { terms, .. } => terms,
        }
    }

    /// Whether the right hand side admits any value
    pub fn is_satisfiable(&self) -> bool {
        match self {
            Constraint::Equality { equals, .. } => equals.is_finite(),
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => lower_bound <= upper_bound,
        }
    }
}

fn join_terms(terms: &[ConstraintTerm]) -> String {
    terms
        .iter()
        .map(ConstraintTerm::to_string)
        .collect::<Vec<_>>()
        .join(" + ")
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Equality { terms, equals } => write!(f, "{} = {}", join_terms(terms), equals),
            Constraint::Inequality {
                terms,
                lower_bound,
                upper_bound,
            } => write!(f, "{} <= {} <= {}", lower_bound, join_terms(terms), upper_bound),
        }
    }
}

/// `coefficient * variable`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintTerm {
    pub variable: String,
    pub coefficient: f64,
}

impl ConstraintTerm {
    fn pair_up(variables: &[&str], coefficients: &[f64]) -> Vec<ConstraintTerm> {
        variables
            .iter()
            .zip(coefficients)
            .map(|(variable, coefficient)| ConstraintTerm {
                variable: variable.to_string(),
                coefficient: *coefficient,
            })
            .collect()
    }
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.variable)
    }
}

#[cfg(test)]
mod constraint_tests {
    use super::*;

    #[test]
    fn inequality_display_and_bounds() {
        let uptake = Constraint::new_inequality(&["EX_CO"], &[-1.], 0., 30.);
        assert_eq!(uptake.to_string(), "0 <= -1*EX_CO <= 30");
        assert!(uptake.is_satisfiable());
        assert!(!Constraint::new_inequality(&["x"], &[1.], 2., 1.).is_satisfiable());
    }

    #[test]
    fn terms_are_paired() {
        let c = Constraint::new_equality(&["a", "b", "c"], &[1., 2.], 0.);
        assert_eq!(c.terms().len(), 2);
        assert_eq!(c.terms()[1].variable, "b");
    }
}
