//! Metabolites taking part in the model's reactions

use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A metabolite, unique by id within a model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    #[builder(setter(into))]
    pub id: String,
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Short compartment id, e.g. `c` or `e`
    #[builder(default = "None")]
    pub compartment: Option<String>,
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical formula such as `C2H3O2`
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Serialised JSON object
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Serialised JSON object
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Whether the metabolite sits in the compartment with short id `compartment`
    pub fn is_in(&self, compartment: &str) -> bool {
        self.compartment.as_deref() == Some(compartment)
    }
}

impl Display for Metabolite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.compartment {
            Some(compartment) => write!(f, "{}[{}]", self.id, compartment),
            None => write!(f, "{}", self.id),
        }
    }
}
