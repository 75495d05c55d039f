//! Flux minimisation designs
//!
//! The objective becomes the minimisation of the summed flux through enzyme catalysed
//! reactions, with biomass production and maintenance ATP fixed to measured values.
use indexmap::IndexMap;
use log::debug;

use crate::designs::{Design, DesignError};
use crate::manipulation::irreversible::convert_to_irreversible;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::REVERSE_SUFFIX;
use crate::optimize::objective::ObjectiveSense;
use crate::project::Project;

const PREFIX: &str = "fluxm";

/// Reaction ids and constants used by the flux minimisation designs
#[derive(Clone, Debug, PartialEq)]
pub struct FluxMinimisationParams {
    /// Biomass exchange, fixed to `biomass_flux`
    pub biomass_reaction: String,
    pub biomass_flux: f64,
    /// Non growth associated maintenance reaction, fixed to `maintenance_flux`
    pub maintenance_reaction: String,
    pub maintenance_flux: f64,
    /// Project relative file listing the enzyme catalysed reactions to minimise
    pub min_reactions_file: String,
    /// Reactions with this in their id are closed
    pub biomass_transporter_marker: String,
    /// Biomass transporter left open for byproduct secretion, and its bounds
    pub byproduct_transporter: String,
    pub byproduct_bounds: (f64, f64),
    /// Lower bound given to exchanges in the medium
    pub medium_lower_bound: f64,
    /// Exchange closed by the hydrogen restricted design
    pub hydrogen_exchange: String,
}

impl Default for FluxMinimisationParams {
    fn default() -> Self {
        FluxMinimisationParams {
            biomass_reaction: "EX_BIOMASS".to_string(),
            biomass_flux: 0.028,
            maintenance_reaction: "ATPASE-RXN".to_string(),
            maintenance_flux: 2.154,
            min_reactions_file: "reacs_for_min.json".to_string(),
            biomass_transporter_marker: "_bm_tx".to_string(),
            byproduct_transporter: "adenosyl_homocysteine_bm_tx".to_string(),
            byproduct_bounds: (-1000., 0.),
            medium_lower_bound: -1000.,
            hydrogen_exchange: "EX_HYDROGEN-MOLECULE".to_string(),
        }
    }
}

/// The flux minimisation design and its hydrogen restricted child
pub fn designs(params: FluxMinimisationParams) -> Vec<Design> {
    let h2_params = params.clone();
    let parent_id = format!("{}_flux_minimisation", PREFIX);
    vec![
        Design::new(
            PREFIX,
            "flux_minimisation",
            "flux minimisation",
            "Minimise the summed flux through enzyme catalysed reactions",
            None,
            move |model, project| flux_minimisation(model, project, &params),
        ),
        Design::new(
            PREFIX,
            "flux_minimisation_h2_restricted",
            "flux minimisation h2 rest",
            "Flux minimisation without hydrogen secretion",
            Some(&parent_id),
            move |model, _| h2_restricted(model, &h2_params),
        ),
    ]
}

/// Apply the flux minimisation design
///
/// Consumes the model: reversible reactions are split, so the result has more reactions than
/// the input.
pub fn flux_minimisation(
    mut model: Model,
    project: &Project,
    params: &FluxMinimisationParams,
) -> Result<Model, DesignError> {
    model.set_bounds(
        &params.biomass_reaction,
        params.biomass_flux,
        params.biomass_flux,
    )?;
    model.set_bounds(
        &params.maintenance_reaction,
        params.maintenance_flux,
        params.maintenance_flux,
    )?;

    let medium = model.medium();
    convert_to_irreversible(&mut model);

    let listed = project.read_id_list(&params.min_reactions_file)?;
    let objective = minimisation_objective(&model, &listed)?;
    debug!("Minimising flux through {} reactions", objective.len());
    model.set_objective(objective, ObjectiveSense::Minimize)?;

    constrain_exchanges(&mut model, &medium, params.medium_lower_bound)?;

    let closed: Vec<String> = model
        .reactions
        .keys()
        .filter(|id| id.contains(&params.biomass_transporter_marker))
        .cloned()
        .collect();
    for id in closed {
        model.set_bounds(&id, 0., 0.)?;
    }
    let (lower_bound, upper_bound) = params.byproduct_bounds;
    model.set_bounds(&params.byproduct_transporter, lower_bound, upper_bound)?;
    Ok(model)
}

/// Apply the hydrogen restriction on top of a flux minimised model
pub fn h2_restricted(
    mut model: Model,
    params: &FluxMinimisationParams,
) -> Result<Model, DesignError> {
    model.set_bounds(&params.hydrogen_exchange, 0., 0.)?;
    Ok(model)
}

/// Listed reactions plus the reverse halves present in the model, each with coefficient 1
fn minimisation_objective(
    model: &Model,
    listed: &[String],
) -> Result<IndexMap<String, f64>, DesignError> {
    let mut objective: IndexMap<String, f64> = IndexMap::new();
    for id in listed {
        model.reaction(id)?;
        objective.insert(id.clone(), 1.);
    }
    for id in listed {
        let reverse = format!("{}{}", id, REVERSE_SUFFIX);
        if model.has_reaction(&reverse) {
            objective.insert(reverse, 1.);
        }
    }
    Ok(objective)
}

/// Open medium exchanges, close the reverse halves, and stop uptake through everything else
///
/// Exchanges outside the medium keep a positive lower bound, so fixed secretion stays fixed.
fn constrain_exchanges(
    model: &mut Model,
    medium: &IndexMap<String, f64>,
    medium_lower_bound: f64,
) -> Result<(), DesignError> {
    for id in model.exchange_ids() {
        let (reverse_half, lower_bound) = {
            let reaction = model.reaction(&id)?;
            (reaction.is_reverse_half(), reaction.lower_bound)
        };
        if reverse_half {
            model.set_bounds(&id, 0., 0.)?;
        } else if medium.contains_key(&id) {
            model.set_lower_bound(&id, medium_lower_bound)?;
        } else if lower_bound < 0. {
            model.set_lower_bound(&id, 0.)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod fluxm_tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::project::ProjectConfig;

    fn add(model: &mut Model, id: &str, mets: &[(&str, f64)], lb: f64, ub: f64) {
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id(id)
                    .metabolites(mets.iter().map(|(m, c)| (m.to_string(), *c)).collect())
                    .lower_bound(lb)
                    .upper_bound(ub)
                    .build()
                    .unwrap(),
            )
            .unwrap();
    }

    /// Project whose reacs_for_min.json lists `ids`
    fn project_listing(ids: &[&str]) -> (tempfile::TempDir, Project) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("reacs_for_min.json"),
            serde_json::to_string(ids).unwrap(),
        )
        .unwrap();
        let project = Project::new(dir.path(), ProjectConfig::default());
        (dir, project)
    }

    fn small_model() -> Model {
        let mut model = Model::new_empty();
        add(&mut model, "EX_S", &[("s", -1.)], -10., 1000.);
        add(&mut model, "EX_P", &[("p", -1.)], -5., 1000.);
        add(&mut model, "EX_BIOMASS", &[("bm", -1.)], 0., 1000.);
        add(&mut model, "S2P", &[("s", -1.), ("p", 1.)], -1000., 1000.);
        add(&mut model, "GROW", &[("s", -1.), ("bm", 1.)], 0., 1000.);
        add(&mut model, "ATPASE-RXN", &[("s", -1.)], 0., 1000.);
        add(&mut model, "glycogen_bm_tx", &[("gly", 1.)], 0., 1000.);
        add(&mut model, "adenosyl_homocysteine_bm_tx", &[("ahcys", 1.)], -1000., 1000.);
        model
    }

    #[test]
    fn flux_minimisation_edits() {
        let (_dir, project) = project_listing(&["S2P", "GROW"]);
        let model = flux_minimisation(small_model(), &project, &FluxMinimisationParams::default())
            .unwrap();

        assert_eq!(model.bounds("EX_BIOMASS").unwrap(), (0.028, 0.028));
        assert_eq!(model.bounds("ATPASE-RXN").unwrap(), (2.154, 2.154));

        let objective: Vec<&str> = model.objective.keys().map(|id| id.as_str()).collect();
        assert_eq!(objective, vec!["S2P", "GROW", "S2P_reverse"]);
        assert!(model.objective.values().all(|c| *c == 1.));
        assert_eq!(model.objective_sense, ObjectiveSense::Minimize);

        // EX_S and EX_P were in the medium, split, and reopened
        assert_eq!(model.bounds("EX_S").unwrap(), (-1000., 1000.));
        assert_eq!(model.bounds("EX_S_reverse").unwrap(), (0., 0.));
        assert_eq!(model.bounds("EX_P_reverse").unwrap(), (0., 0.));

        assert_eq!(model.bounds("glycogen_bm_tx").unwrap(), (0., 0.));
        assert_eq!(model.bounds("adenosyl_homocysteine_bm_tx_reverse").unwrap(), (0., 0.));
        assert_eq!(model.bounds("adenosyl_homocysteine_bm_tx").unwrap(), (-1000., 0.));
    }

    #[test]
    fn missing_listed_reaction() {
        let (_dir, project) = project_listing(&["S2P", "NOPE"]);
        let res = flux_minimisation(small_model(), &project, &FluxMinimisationParams::default());
        assert!(matches!(res, Err(DesignError::Model(_))));
    }

    #[test]
    fn missing_list_file() {
        let project = Project::new("does/not/exist", ProjectConfig::default());
        let res = flux_minimisation(small_model(), &project, &FluxMinimisationParams::default());
        assert!(matches!(res, Err(DesignError::Input(_))));
    }

    #[test]
    fn hydrogen_restriction() {
        let mut model = Model::new_empty();
        add(&mut model, "EX_HYDROGEN-MOLECULE", &[("h2", -1.)], 0., 1000.);
        let model = h2_restricted(model, &FluxMinimisationParams::default()).unwrap();
        assert_eq!(model.bounds("EX_HYDROGEN-MOLECULE").unwrap(), (0., 0.));
    }
}
