//! Splitting reversible reactions into a forward and a reverse half, and joining them again
use log::{debug, warn};

use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;

/// Split every reaction with a negative lower bound into two irreversible reactions
///
/// The reverse half is named `{id}_reverse`, has the negated stoichiometry, bounds
/// `(max(0, -upper_bound), -lower_bound)` and the negated objective coefficient when the
/// original is part of the objective. The original is clamped to
/// `(max(0, lower_bound), max(0, upper_bound))`. Both halves name each other in
/// [`Reaction::reflection`].
///
/// A reaction whose reverse id is already taken stays reversible.
///
/// Returns the ids of the reverse reactions that were added, in the order they were added.
///
/// # Examples
/// ```rust
/// use gsmkit_core::manipulation::irreversible::convert_to_irreversible;
/// use gsmkit_core::metabolic_model::model::Model;
/// use gsmkit_core::metabolic_model::reaction::ReactionBuilder;
/// let mut model = Model::new_empty();
/// model
///     .add_reaction(ReactionBuilder::default().id("R1").lower_bound(-5.).upper_bound(10.).build().unwrap())
///     .unwrap();
/// let added = convert_to_irreversible(&mut model);
/// assert_eq!(added, vec!["R1_reverse".to_string()]);
/// assert_eq!(model.bounds("R1").unwrap(), (0., 10.));
/// assert_eq!(model.bounds("R1_reverse").unwrap(), (0., 5.));
/// ```
pub fn convert_to_irreversible(model: &mut Model) -> Vec<String> {
    let mut reverse_reactions: Vec<Reaction> = Vec::new();
    for reaction in model.reactions.values() {
        if reaction.lower_bound >= 0. {
            continue;
        }
        reverse_reactions.push(Reaction {
            id: reaction.reverse_id(),
            metabolites: reaction
                .metabolites
                .iter()
                .map(|(met, coef)| (met.clone(), -coef))
                .collect(),
            name: reaction.name.as_ref().map(|name| format!("{} (reverse)", name)),
            gene_reaction_rule: reaction.gene_reaction_rule.clone(),
            lower_bound: (-reaction.upper_bound).max(0.),
            upper_bound: -reaction.lower_bound,
            subsystem: reaction.subsystem.clone(),
            notes: None,
            annotation: None,
            reflection: Some(reaction.id.clone()),
        });
    }

    let mut added = Vec::with_capacity(reverse_reactions.len());
    for reverse in reverse_reactions {
        let Some(original_id) = reverse.reflection.clone() else {
            continue;
        };
        if model.has_reaction(&reverse.id) {
            warn!(
                "Not splitting {}, a reaction named {} already exists",
                original_id, reverse.id
            );
            continue;
        }
        if let Some(original) = model.reactions.get_mut(&original_id) {
            original.lower_bound = original.lower_bound.max(0.);
            original.upper_bound = original.upper_bound.max(0.);
            original.reflection = Some(reverse.id.clone());
        }
        if let Some(coef) = model.objective.get(&original_id).copied() {
            model.objective.insert(reverse.id.clone(), -coef);
        }
        added.push(reverse.id.clone());
        model.reactions.insert(reverse.id.clone(), reverse);
    }
    debug!("Split {} reversible reactions", added.len());
    added
}

/// Undo [`convert_to_irreversible`]
///
/// Every `_reverse` reaction whose partner names it as its reflection is removed, and its
/// bounds folded back into the partner. Returns the ids of the removed reactions.
pub fn revert_to_reversible(model: &mut Model) -> Vec<String> {
    let pairs: Vec<(String, String)> = model
        .reactions
        .values()
        .filter(|r| r.is_reverse_half())
        .filter_map(|r| {
            let partner = r.reflection.as_ref()?;
            let partner_reaction = model.reactions.get(partner)?;
            (partner_reaction.reflection.as_deref() == Some(r.id.as_str()))
                .then(|| (r.id.clone(), partner.clone()))
        })
        .collect();

    let mut removed = Vec::with_capacity(pairs.len());
    for (reverse_id, partner_id) in pairs {
        let Some(reverse) = model.reactions.shift_remove(&reverse_id) else {
            continue;
        };
        model.objective.shift_remove(&reverse_id);
        if let Some(partner) = model.reactions.get_mut(&partner_id) {
            partner.lower_bound = -reverse.upper_bound;
            if partner.upper_bound == 0. && reverse.lower_bound > 0. {
                partner.upper_bound = -reverse.lower_bound;
            }
            partner.reflection = None;
        }
        removed.push(reverse_id);
    }
    debug!("Joined {} split reactions", removed.len());
    removed
}

#[cfg(test)]
mod irreversible_tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::objective::ObjectiveSense;
    use indexmap::IndexMap;

    fn reaction(id: &str, mets: &[(&str, f64)], lb: f64, ub: f64) -> Reaction {
        ReactionBuilder::default()
            .id(id)
            .metabolites(
                mets.iter()
                    .map(|(m, c)| (m.to_string(), *c))
                    .collect::<IndexMap<String, f64>>(),
            )
            .gene_reaction_rule(Some("g1 or g2".to_string()))
            .subsystem(Some("Fermentation".to_string()))
            .lower_bound(lb)
            .upper_bound(ub)
            .build()
            .unwrap()
    }

    fn setup_model() -> Model {
        let mut model = Model::new_empty();
        model
            .add_reaction(reaction("R1", &[("a", -1.), ("b", 2.)], -10., 20.))
            .unwrap();
        model
            .add_reaction(reaction("R2", &[("b", -1.)], 0., 1000.))
            .unwrap();
        model
            .add_reaction(reaction("R3", &[("c", -1.)], -8., -2.))
            .unwrap();
        model
            .set_objective([("R1", 1.), ("R2", 0.5)], ObjectiveSense::Maximize)
            .unwrap();
        model
    }

    #[test]
    fn split_bounds_and_stoichiometry() {
        let mut model = setup_model();
        let added = convert_to_irreversible(&mut model);
        assert_eq!(added, vec!["R1_reverse".to_string(), "R3_reverse".to_string()]);

        let forward = model.reaction("R1").unwrap();
        assert_eq!(forward.bounds(), (0., 20.));
        assert_eq!(forward.reflection.as_deref(), Some("R1_reverse"));

        let reverse = model.reaction("R1_reverse").unwrap();
        assert_eq!(reverse.bounds(), (0., 10.));
        assert_eq!(reverse.metabolites["a"], 1.);
        assert_eq!(reverse.metabolites["b"], -2.);
        assert_eq!(reverse.reflection.as_deref(), Some("R1"));
        assert_eq!(reverse.gene_reaction_rule.as_deref(), Some("g1 or g2"));
        assert_eq!(reverse.subsystem.as_deref(), Some("Fermentation"));

        // Forced backwards flux ends up as a forced forward flux in the reverse half
        assert_eq!(model.bounds("R3").unwrap(), (0., 0.));
        assert_eq!(model.bounds("R3_reverse").unwrap(), (2., 8.));

        // Appended after the existing reactions
        assert_eq!(
            model.reaction_ids(),
            vec!["R1", "R2", "R3", "R1_reverse", "R3_reverse"]
        );
        assert!(model.reactions.values().all(|r| r.lower_bound >= 0.));
    }

    #[test]
    fn objective_only_for_objective_reactions() {
        let mut model = setup_model();
        convert_to_irreversible(&mut model);
        assert_eq!(model.objective.get("R1_reverse"), Some(&-1.));
        assert_eq!(model.objective.get("R3_reverse"), None);
        assert_eq!(model.objective.get("R2"), Some(&0.5));
    }

    #[test]
    fn irreversible_model_is_unchanged() {
        let mut model = Model::new_empty();
        model
            .add_reaction(reaction("R2", &[("b", -1.)], 0., 1000.))
            .unwrap();
        let before = model.clone();
        assert!(convert_to_irreversible(&mut model).is_empty());
        assert_eq!(model.reactions, before.reactions);
        assert_eq!(model.objective, before.objective);
    }

    #[test]
    fn existing_reverse_id_is_not_split() {
        let mut model = setup_model();
        model
            .add_reaction(reaction("R1_reverse", &[("z", 1.)], 0., 1.))
            .unwrap();
        let added = convert_to_irreversible(&mut model);
        assert_eq!(added, vec!["R3_reverse".to_string()]);
        assert_eq!(model.bounds("R1").unwrap(), (-10., 20.));
        assert_eq!(model.reaction("R1").unwrap().reflection, None);
        assert_eq!(model.reaction("R1_reverse").unwrap().metabolites["z"], 1.);
    }

    #[test]
    fn revert_restores_bounds() {
        let mut model = setup_model();
        let before = model.clone();
        convert_to_irreversible(&mut model);
        let removed = revert_to_reversible(&mut model);
        assert_eq!(removed.len(), 2);
        assert_eq!(model.reaction_ids(), before.reaction_ids());
        for id in ["R1", "R2", "R3"] {
            assert_eq!(model.bounds(id).unwrap(), before.bounds(id).unwrap(), "{}", id);
            assert_eq!(model.reaction(id).unwrap().reflection, None);
        }
        assert_eq!(model.objective, before.objective);
    }
}
