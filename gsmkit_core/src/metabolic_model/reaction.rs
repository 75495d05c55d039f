//! This module provides a struct for representing reactions
use crate::configuration::Configuration;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Suffix given to the reaction carrying the reverse direction of a split reaction
pub const REVERSE_SUFFIX: &str = "_reverse";

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// Used to identify the reaction
    #[builder(setter(into))]
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene reaction rule, e.g. `"b0001 and (b0002 or b0003)"`
    #[builder(default = "None")]
    pub gene_reaction_rule: Option<String>,
    /// Lower flux bound
    #[builder(default = "Configuration::current().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "Configuration::current().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
    /// Id of the opposite direction when this reaction is one half of a split reversible reaction
    #[builder(default = "None")]
    pub reflection: Option<String>,
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(lb), Some(ub)) = (self.lower_bound, self.upper_bound) {
            if lb > ub {
                return Err(format!("lower bound {} is above upper bound {}", lb, ub));
            }
        }
        Ok(())
    }
}

impl Reaction {
    /// Current `(lower_bound, upper_bound)`
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower_bound, self.upper_bound)
    }

    /// Whether flux can run backwards through the reaction
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0.
    }

    /// Whether the reaction exchanges a single metabolite with the outside of the model
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() == 1
    }

    /// Id a reverse reaction created by splitting this reaction gets
    pub fn reverse_id(&self) -> String {
        format!("{}{}", self.id, REVERSE_SUFFIX)
    }

    /// Whether this reaction is the reverse half of a split reaction
    pub fn is_reverse_half(&self) -> bool {
        self.reflection.is_some() && self.id.ends_with(REVERSE_SUFFIX)
    }
}

#[cfg(test)]
mod reaction_tests {
    use super::*;

    #[test]
    fn default_bounds_come_from_configuration() {
        let rxn = ReactionBuilder::default().id("R1").build().unwrap();
        let conf = Configuration::current();
        assert_eq!(rxn.bounds(), (conf.lower_bound, conf.upper_bound));
        assert!(rxn.is_reversible());
    }

    #[test]
    fn builder_rejects_inverted_bounds() {
        let res = ReactionBuilder::default()
            .id("R1")
            .lower_bound(5.)
            .upper_bound(1.)
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn reverse_naming() {
        let mut metabolites = IndexMap::new();
        metabolites.insert("co_e".to_string(), -1.);
        let mut rxn = ReactionBuilder::default()
            .id("EX_co")
            .metabolites(metabolites)
            .build()
            .unwrap();
        assert!(rxn.is_boundary());
        assert_eq!(rxn.reverse_id(), "EX_co_reverse");
        assert!(!rxn.is_reverse_half());

        rxn.id = rxn.reverse_id();
        rxn.reflection = Some("EX_co".to_string());
        assert!(rxn.is_reverse_half());
    }
}
