//! Provides struct for representing an optimization problem's objective
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents the linear objective of an optimization problem
#[derive(Debug, Clone)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Collapse the terms into a dense coefficient vector ordered like `variable_order`
    ///
    /// Repeated terms for the same variable are summed.
    pub fn dense_coefficients<V>(&self, variable_order: &IndexMap<String, V>) -> Vec<f64> {
        let mut coefs = vec![0f64; variable_order.len()];
        for term in &self.terms {
            if let Some(idx) = variable_order.get_index_of(&term.variable) {
                coefs[idx] += term.coefficient;
            }
        }
        coefs
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    /// The objective should be minimized
    #[serde(alias = "min")]
    Minimize,
    /// The objective should be maximized
    #[serde(alias = "max")]
    Maximize,
}

/// A linear term in the objective
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveTerm {
    /// Id of the variable in the term
    pub variable: String,
    /// Coefficient for the term
    pub coefficient: f64,
}

impl ObjectiveTerm {
    /// Create a new linear objective term
    pub fn new(variable: &str, coefficient: f64) -> Self {
        ObjectiveTerm {
            variable: variable.to_string(),
            coefficient,
        }
    }
}
