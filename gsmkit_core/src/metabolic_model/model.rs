//! This module provides the Model struct for representing an entire metabolic model
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::optimize::objective::ObjectiveSense;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use thiserror::Error;

/// Exchange reactions conventionally start with this prefix
pub const EXCHANGE_PREFIX: &str = "EX_";

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reactions
    pub reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Genes
    pub genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to Metabolites
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
    /// Whether the objective is maximized or minimized
    pub objective_sense: ObjectiveSense,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

/// New bounds for a single reaction, see [`Model::with_bounds`]
#[derive(Clone, Debug, PartialEq)]
pub struct BoundsChange {
    pub reaction: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl BoundsChange {
    pub fn new(reaction: &str, lower_bound: f64, upper_bound: f64) -> Self {
        BoundsChange {
            reaction: reaction.to_string(),
            lower_bound,
            upper_bound,
        }
    }

    /// Pin the reaction to a single flux value
    pub fn fixed(reaction: &str, value: f64) -> Self {
        Self::new(reaction, value, value)
    }

    /// Block all flux through the reaction
    pub fn knock_out(reaction: &str) -> Self {
        Self::new(reaction, 0., 0.)
    }
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            genes: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
            objective_sense: ObjectiveSense::Maximize,
            id: None,
            compartments: None,
            version: None,
        }
    }

    // region Adding components
    /// Add a reaction to the model
    ///
    /// # Errors
    /// [`ModelError::DuplicateReaction`] if a reaction with the same id is already present
    ///
    /// # Examples
    /// ```rust
    /// use gsmkit_core::metabolic_model::model::Model;
    /// use gsmkit_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction").build().unwrap();
    /// model.add_reaction(new_reaction).unwrap();
    /// assert!(model.has_reaction("new_reaction"));
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), ModelError> {
        if self.reactions.contains_key(&reaction.id) {
            return Err(ModelError::DuplicateReaction(reaction.id));
        }
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
        Ok(())
    }

    /// Add a metabolite to the model, replacing any metabolite with the same id
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Add a gene to the model, replacing any gene with the same id
    pub fn add_gene(&mut self, gene: Gene) {
        let id = gene.id.clone();
        self.genes.insert(id, gene);
    }
    // endregion Adding components

    /// Ids of the reactions whose gene rule names `gene`
    pub fn gene_reactions(&self, gene: &str) -> Result<Vec<&str>, ModelError> {
        let gene = self
            .genes
            .get(gene)
            .ok_or_else(|| ModelError::GeneNotFound(gene.to_string()))?;
        Ok(self
            .reactions
            .values()
            .filter(|r| r.gene_reaction_rule.as_deref().is_some_and(|rule| gene.in_rule(rule)))
            .map(|r| r.id.as_str())
            .collect())
    }

    // region Reaction lookup
    pub fn has_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    /// Look up a reaction by id
    pub fn reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Look up a reaction by id for modification
    pub fn reaction_mut(&mut self, id: &str) -> Result<&mut Reaction, ModelError> {
        self.reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Ids of every reaction, in model order
    pub fn reaction_ids(&self) -> Vec<String> {
        self.reactions.keys().cloned().collect()
    }
    // endregion Reaction lookup

    // region Bounds
    pub fn bounds(&self, id: &str) -> Result<(f64, f64), ModelError> {
        Ok(self.reaction(id)?.bounds())
    }

    /// Set both bounds of a reaction
    ///
    /// # Errors
    /// - [`ModelError::ReactionNotFound`] if there is no such reaction
    /// - [`ModelError::InvalidBounds`] if `lower_bound > upper_bound`, the reaction is unchanged
    pub fn set_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let reaction = self.reaction_mut(id)?;
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds {
                reaction: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        debug!("Setting bounds of {} to ({}, {})", id, lower_bound, upper_bound);
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(())
    }

    pub fn set_lower_bound(&mut self, id: &str, lower_bound: f64) -> Result<(), ModelError> {
        let upper_bound = self.reaction(id)?.upper_bound;
        self.set_bounds(id, lower_bound, upper_bound)
    }

    pub fn set_upper_bound(&mut self, id: &str, upper_bound: f64) -> Result<(), ModelError> {
        let lower_bound = self.reaction(id)?.lower_bound;
        self.set_bounds(id, lower_bound, upper_bound)
    }

    /// Temporarily apply bound changes while running `f`
    ///
    /// The changes are applied in order, `f` is called, and then the bounds every changed
    /// reaction had before the call are written back, whether `f` succeeded or not. The saved
    /// values are restored exactly, so bounds are bit-identical afterwards. Only bounds named
    /// in `changes` are restored; anything else `f` modifies stays modified.
    ///
    /// If a change can't be applied (missing reaction, inverted bounds) the changes applied so
    /// far are rolled back and `f` is not called.
    ///
    /// # Examples
    /// ```rust
    /// use gsmkit_core::metabolic_model::model::{BoundsChange, Model, ModelError};
    /// use gsmkit_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// model
    ///     .add_reaction(ReactionBuilder::default().id("R1").build().unwrap())
    ///     .unwrap();
    /// let inside = model
    ///     .with_bounds(&[BoundsChange::knock_out("R1")], |m| {
    ///         Ok::<_, ModelError>(m.bounds("R1")?)
    ///     })
    ///     .unwrap();
    /// assert_eq!(inside, (0., 0.));
    /// assert_eq!(model.bounds("R1").unwrap(), (-1000., 1000.));
    /// ```
    pub fn with_bounds<T, E, F>(&mut self, changes: &[BoundsChange], f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Model) -> Result<T, E>,
        E: From<ModelError>,
    {
        let mut saved: Vec<(String, f64, f64)> = Vec::with_capacity(changes.len());
        for change in changes {
            let previous = match self.bounds(&change.reaction) {
                Ok(previous) => previous,
                Err(err) => {
                    self.restore_bounds(&saved);
                    return Err(err.into());
                }
            };
            saved.push((change.reaction.clone(), previous.0, previous.1));
            if let Err(err) =
                self.set_bounds(&change.reaction, change.lower_bound, change.upper_bound)
            {
                self.restore_bounds(&saved);
                return Err(err.into());
            }
        }
        let result = f(self);
        self.restore_bounds(&saved);
        result
    }

    /// Write saved bounds back, latest first so a reaction changed twice ends at its first value
    fn restore_bounds(&mut self, saved: &[(String, f64, f64)]) {
        for (id, lower_bound, upper_bound) in saved.iter().rev() {
            if let Some(reaction) = self.reactions.get_mut(id) {
                reaction.lower_bound = *lower_bound;
                reaction.upper_bound = *upper_bound;
            }
        }
    }
    // endregion Bounds

    // region Objective
    /// Replace the objective
    ///
    /// # Errors
    /// [`ModelError::ReactionNotFound`] if a coefficient names a reaction not in the model,
    /// in which case the objective is unchanged
    pub fn set_objective<I, S>(&mut self, coefficients: I, sense: ObjectiveSense) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut objective = IndexMap::new();
        for (id, coef) in coefficients {
            let id = id.into();
            if !self.reactions.contains_key(&id) {
                return Err(ModelError::ReactionNotFound(id));
            }
            objective.insert(id, coef);
        }
        self.objective = objective;
        self.objective_sense = sense;
        Ok(())
    }
    // endregion Objective

    // region Exchanges and medium
    /// Compartment considered to be outside the cell
    ///
    /// This is `e` if present, otherwise the first compartment whose long name mentions
    /// "extracellular".
    pub fn external_compartment(&self) -> Option<&str> {
        let compartments = self.compartments.as_ref()?;
        if compartments.contains_key("e") {
            return Some("e");
        }
        compartments
            .iter()
            .find(|(_, long)| long.to_lowercase().contains("extracellular"))
            .map(|(short, _)| short.as_str())
    }

    /// Reactions with a single metabolite
    pub fn boundary(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values().filter(|r| r.is_boundary())
    }

    /// Boundary reactions which exchange a metabolite with the environment
    ///
    /// A boundary reaction is an exchange when its id starts with `EX_`, or when its metabolite
    /// is in the external compartment.
    pub fn exchanges(&self) -> impl Iterator<Item = &Reaction> {
        let external = self.external_compartment();
        self.boundary().filter(move |r| {
            if r.id.starts_with(EXCHANGE_PREFIX) {
                return true;
            }
            let Some(external) = external else {
                return false;
            };
            r.metabolites
                .keys()
                .any(|met| self.metabolites.get(met).is_some_and(|m| m.is_in(external)))
        })
    }

    pub fn exchange_ids(&self) -> Vec<String> {
        self.exchanges().map(|r| r.id.clone()).collect()
    }

    /// Exchanges allowing uptake, mapped to the maximum uptake rate (`-lower_bound`)
    pub fn medium(&self) -> IndexMap<String, f64> {
        self.exchanges()
            .filter(|r| r.lower_bound < 0.)
            .map(|r| (r.id.clone(), -r.lower_bound))
            .collect()
    }

    /// Make `medium` the only source of uptake
    ///
    /// Every exchange gets lower bound 0, then each medium entry gets `-uptake`. Upper bounds are
    /// only touched when they would end up below the new lower bound.
    pub fn set_medium(&mut self, medium: &IndexMap<String, f64>) -> Result<(), ModelError> {
        for id in medium.keys() {
            self.reaction(id)?;
        }
        let exchanges: IndexSet<String> = self.exchange_ids().into_iter().collect();
        for id in exchanges.iter().chain(medium.keys().filter(|id| !exchanges.contains(*id))) {
            let lower_bound = medium.get(id).map(|uptake| -uptake).unwrap_or(0.);
            let upper_bound = self.reaction(id)?.upper_bound.max(lower_bound);
            self.set_bounds(id, lower_bound, upper_bound)?;
        }
        Ok(())
    }
    // endregion Exchanges and medium

    /// Sparse stoichiometric matrix, one row per metabolite and one column per reaction
    ///
    /// Rows follow the model's metabolites, followed by any metabolite only referenced by a
    /// reaction. The returned set gives the metabolite id of every row.
    pub fn stoichiometric_matrix(&self) -> (IndexSet<String>, CsrMatrix<f64>) {
        let mut rows: IndexSet<String> = self.metabolites.keys().cloned().collect();
        for reaction in self.reactions.values() {
            for met in reaction.metabolites.keys() {
                rows.insert(met.clone());
            }
        }
        let mut coo = CooMatrix::new(rows.len(), self.reactions.len());
        for (col, reaction) in self.reactions.values().enumerate() {
            for (met, coef) in &reaction.metabolites {
                if let Some(row) = rows.get_index_of(met) {
                    coo.push(row, col, *coef);
                }
            }
        }
        (rows, CsrMatrix::from(&coo))
    }
}

/// Errors raised when querying or modifying a [`Model`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not in the model")]
    ReactionNotFound(String),
    #[error("Reaction {0} is already in the model")]
    DuplicateReaction(String),
    #[error("Gene {0} is not in the model")]
    GeneNotFound(String),
    #[error("Invalid bounds ({lower_bound}, {upper_bound}) for reaction {reaction}, lower bound is above upper bound")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn stoich(entries: &[(&str, f64)]) -> IndexMap<String, f64> {
        entries.iter().map(|(m, c)| (m.to_string(), *c)).collect()
    }

    fn setup_model() -> Model {
        let mut model = Model::new_empty();
        let mut compartments = IndexMap::new();
        compartments.insert("c".to_string(), "cytosol".to_string());
        compartments.insert("ext".to_string(), "Extracellular space".to_string());
        model.compartments = Some(compartments);
        for (id, comp) in [("a_c", "c"), ("b_c", "c"), ("a_ext", "ext")] {
            model.add_metabolite(
                MetaboliteBuilder::default()
                    .id(id)
                    .compartment(Some(comp.to_string()))
                    .build()
                    .unwrap(),
            );
        }
        let reactions = [
            ("EX_a", stoich(&[("a_c", -1.)]), -10., 1000.),
            ("a_tx", stoich(&[("a_ext", -1.)]), -5., 1000.),
            ("sink_b", stoich(&[("b_c", -1.)]), 0., 1000.),
            ("A2B", stoich(&[("a_c", -1.), ("b_c", 1.)]), 0., 1000.),
        ];
        for (id, mets, lb, ub) in reactions {
            model
                .add_reaction(
                    ReactionBuilder::default()
                        .id(id)
                        .metabolites(mets)
                        .lower_bound(lb)
                        .upper_bound(ub)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        model
    }

    #[test]
    fn reaction_lookup() {
        let model = setup_model();
        assert!(model.reaction("A2B").is_ok());
        assert_eq!(
            model.reaction("missing"),
            Err(ModelError::ReactionNotFound("missing".to_string()))
        );
    }

    #[test]
    fn duplicate_reactions_rejected() {
        let mut model = setup_model();
        let dup = ReactionBuilder::default().id("A2B").build().unwrap();
        assert_eq!(
            model.add_reaction(dup),
            Err(ModelError::DuplicateReaction("A2B".to_string()))
        );
    }

    #[test]
    fn set_bounds_validates() {
        let mut model = setup_model();
        model.set_bounds("A2B", 1., 2.).unwrap();
        assert_eq!(model.bounds("A2B").unwrap(), (1., 2.));
        assert!(matches!(
            model.set_upper_bound("A2B", 0.5),
            Err(ModelError::InvalidBounds { .. })
        ));
        // unchanged after the failed update
        assert_eq!(model.bounds("A2B").unwrap(), (1., 2.));
        model.set_lower_bound("A2B", 0.).unwrap();
        assert_eq!(model.bounds("A2B").unwrap(), (0., 2.));
    }

    #[test]
    fn exchanges_and_medium() {
        let model = setup_model();
        assert_eq!(model.external_compartment(), Some("ext"));
        let exchanges = model.exchange_ids();
        assert_eq!(exchanges, vec!["EX_a".to_string(), "a_tx".to_string()]);
        assert_eq!(model.boundary().count(), 3);

        let medium = model.medium();
        assert_eq!(medium.get("EX_a"), Some(&10.));
        assert_eq!(medium.get("a_tx"), Some(&5.));
    }

    #[test]
    fn set_medium_closes_other_exchanges() {
        let mut model = setup_model();
        let mut medium = IndexMap::new();
        medium.insert("a_tx".to_string(), 3.);
        model.set_medium(&medium).unwrap();
        assert_eq!(model.bounds("EX_a").unwrap(), (0., 1000.));
        assert_eq!(model.bounds("a_tx").unwrap(), (-3., 1000.));
        // sink_b isn't an exchange
        assert_eq!(model.bounds("sink_b").unwrap(), (0., 1000.));

        medium.insert("nope".to_string(), 1.);
        assert!(model.set_medium(&medium).is_err());
    }

    #[test]
    fn with_bounds_restores() {
        let mut model = setup_model();
        let before = model.bounds("EX_a").unwrap();
        let changes = [
            BoundsChange::knock_out("EX_a"),
            BoundsChange::fixed("EX_a", 2.),
            BoundsChange::new("A2B", 0.1, 0.2),
        ];
        let seen = model
            .with_bounds(&changes, |m| Ok::<_, ModelError>(m.bounds("EX_a")?))
            .unwrap();
        assert_eq!(seen, (2., 2.));
        assert_eq!(model.bounds("EX_a").unwrap(), before);
        assert_eq!(model.bounds("A2B").unwrap(), (0., 1000.));

        // Errors inside the closure still restore
        let res: Result<(), ModelError> = model.with_bounds(&changes, |_| {
            Err(ModelError::ReactionNotFound("inner".to_string()))
        });
        assert!(res.is_err());
        assert_eq!(model.bounds("EX_a").unwrap(), before);
    }

    #[test]
    fn with_bounds_rolls_back_bad_changes() {
        let mut model = setup_model();
        let changes = [
            BoundsChange::knock_out("EX_a"),
            BoundsChange::knock_out("missing"),
        ];
        let mut called = false;
        let res: Result<(), ModelError> = model.with_bounds(&changes, |_| {
            called = true;
            Ok(())
        });
        assert_eq!(res, Err(ModelError::ReactionNotFound("missing".to_string())));
        assert!(!called);
        assert_eq!(model.bounds("EX_a").unwrap(), (-10., 1000.));
    }

    #[test]
    fn objective_requires_known_reactions() {
        let mut model = setup_model();
        model
            .set_objective([("A2B", 1.)], ObjectiveSense::Minimize)
            .unwrap();
        assert_eq!(model.objective.get("A2B"), Some(&1.));
        assert_eq!(model.objective_sense, ObjectiveSense::Minimize);

        let res = model.set_objective([("A2B", 1.), ("ghost", 1.)], ObjectiveSense::Maximize);
        assert!(res.is_err());
        // unchanged
        assert_eq!(model.objective_sense, ObjectiveSense::Minimize);
    }

    #[test]
    fn stoichiometric_matrix_shape() {
        let model = setup_model();
        let (rows, matrix) = model.stoichiometric_matrix();
        assert_eq!(rows.len(), 3);
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), 4);
        assert_eq!(matrix.nnz(), 5);
    }
}
