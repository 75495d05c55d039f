//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A continuous variable in an optimization problem
///
/// Its column is its position in [`Problem::variables`](crate::optimize::problem::Problem::variables).
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    #[builder(setter(into))]
    pub id: String,
    /// Human readable name
    #[builder(setter(into, strip_option), default = "None")]
    pub name: Option<String>,
    /// Lowest value the variable can take
    #[builder(default = "f64::NEG_INFINITY")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
}

impl VariableBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(lb), Some(ub)) = (self.lower_bound, self.upper_bound) {
            if lb > ub {
                return Err(format!("lower bound {} is above upper bound {}", lb, ub));
            }
        }
        Ok(())
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:[{}, {}]", name, self.lower_bound, self.upper_bound),
            None => write!(f, "{}:[{}, {}]", self.id, self.lower_bound, self.upper_bound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_variable() {
        let var = VariableBuilder::default()
            .id("x")
            .lower_bound(0.)
            .upper_bound(10.)
            .build()
            .unwrap();
        assert_eq!(var.id, "x");
        assert_eq!(format!("{}", var), "x:[0, 10]");
    }

    #[test]
    fn reject_inverted_bounds() {
        let res = VariableBuilder::default()
            .id("x")
            .lower_bound(10.)
            .upper_bound(0.)
            .build();
        assert!(res.is_err());
    }
}
