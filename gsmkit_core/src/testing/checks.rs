//! Model tests shipped with the crate
//!
//! Every check leaves the model's bounds as they were on entry.
use log::debug;

use crate::configuration::Configuration;
use crate::metabolic_model::model::{BoundsChange, Model};
use crate::project::Project;
use crate::testing::result_log::ResultLog;
use crate::testing::sweep::{all_zero, is_strictly_increasing, sequences_equal, UptakeSweep};
use crate::testing::TestError;

pub const ATPASE_REACTION: &str = "ATPASE-RXN";
pub const ACETATE_EXCHANGE: &str = "EX_ACET";
pub const ETHANOL_EXCHANGE: &str = "EX_ETOH";
pub const HYDROGEN_EXCHANGE: &str = "EX_HYDROGEN-MOLECULE";
/// Expected acetate secretion range
pub const ACETATE_RANGE: (f64, f64) = (2.0, 2.8);
pub const MIN_REACTIONS_FILE: &str = "reacs_for_min.json";
pub const ESSENTIAL_REACTIONS_FILE: &str = "essential_singles.json";
pub const UNRESTRICTED_DESIGN: &str = "fluxm_flux_minimisation";
pub const H2_RESTRICTED_DESIGN: &str = "fluxm_flux_minimisation_h2_restricted";

/// The model can't make ATP without any uptake
pub fn atpase_validity(
    model: &mut Model,
    _project: &Project,
    log: &mut ResultLog,
) -> Result<(), TestError> {
    let mut changes: Vec<BoundsChange> = model
        .exchanges()
        .map(|r| BoundsChange::new(&r.id, 0., r.upper_bound.max(0.)))
        .collect();
    changes.push(BoundsChange::fixed(ATPASE_REACTION, 1.));
    let solution = model.with_bounds(&changes, |m| Ok::<_, TestError>(m.optimize()?))?;
    log.assertion(
        solution.is_infeasible(),
        "Valid model conditions",
        "Model capable of ATP production from nothing",
        None,
    );
    Ok(())
}

/// Acetate secretion hasn't moved far from the expected range
pub fn acetate_range(
    model: &mut Model,
    _project: &Project,
    log: &mut ResultLog,
) -> Result<(), TestError> {
    model.reaction(ACETATE_EXCHANGE)?;
    let solution = model.optimize()?;
    let Some(acetate) = solution.flux(ACETATE_EXCHANGE) else {
        log.error(
            &format!("Unable to solve the model, status {}", solution.status),
            None,
        );
        return Ok(());
    };
    let (low, high) = ACETATE_RANGE;
    log.warning(
        acetate < low || acetate > high,
        &format!("Acetate production outside expected range, value - {}", acetate),
        None,
    );
    Ok(())
}

/// Every reaction the flux minimisation design minimises is in the model
pub fn min_reactions_present(
    model: &mut Model,
    project: &Project,
    log: &mut ResultLog,
) -> Result<(), TestError> {
    let listed = project.read_id_list(MIN_REACTIONS_FILE)?;
    let missing: Vec<&str> = listed
        .iter()
        .filter(|id| !model.has_reaction(id))
        .map(|id| id.as_str())
        .collect();
    log.assertion(
        missing.is_empty(),
        "All reactions to minimise are in the model",
        &format!("Reactions to minimise missing from the model: {}", missing.join(", ")),
        None,
    );
    Ok(())
}

/// Restricting hydrogen secretion stops hydrogen production without changing acetate or
/// ethanol production
///
/// Expects the unrestricted flux minimisation design; the restricted design is applied on
/// top of a copy of it.
pub fn h2_restriction_sweep(
    model: &mut Model,
    project: &Project,
    log: &mut ResultLog,
) -> Result<(), TestError> {
    let Some(design) = project.designs().get(H2_RESTRICTED_DESIGN) else {
        log.error(&format!("Design {} is not registered", H2_RESTRICTED_DESIGN), None);
        return Ok(());
    };
    let mut restricted = design.apply(model.clone(), project)?;

    let sweep = UptakeSweep::carbon_monoxide(&[
        HYDROGEN_EXCHANGE,
        ACETATE_EXCHANGE,
        ETHANOL_EXCHANGE,
    ]);
    let open = sweep.run(model)?;
    let closed = sweep.run(&mut restricted)?;
    let tolerance = Configuration::current().tolerance;
    debug!("Hydrogen without restriction: {:?}", open.product(HYDROGEN_EXCHANGE));

    log.assertion(
        all_zero(closed.product(HYDROGEN_EXCHANGE), tolerance),
        "No hydrogen produced under restriction",
        "Hydrogen produced despite the restriction",
        Some("restricted design"),
    );
    log.assertion(
        is_strictly_increasing(open.product(HYDROGEN_EXCHANGE), tolerance),
        "Hydrogen production increases with carbon monoxide uptake",
        "Hydrogen production does not increase with carbon monoxide uptake",
        Some("unrestricted design"),
    );
    for product in [ACETATE_EXCHANGE, ETHANOL_EXCHANGE] {
        log.assertion(
            sequences_equal(open.product(product), closed.product(product), tolerance),
            &format!("{} production unchanged by the restriction", product),
            &format!("{} production changed by the restriction", product),
            None,
        );
    }
    Ok(())
}

/// Knocking out each listed reaction, and its reverse half, stops growth
///
/// A reaction is essential when the knocked out model is infeasible or its objective value is
/// below the configured threshold.
pub fn essential_reactions(
    model: &mut Model,
    project: &Project,
    log: &mut ResultLog,
) -> Result<(), TestError> {
    let listed = project.read_id_list(ESSENTIAL_REACTIONS_FILE)?;
    let threshold = Configuration::current().essential_threshold;
    for id in &listed {
        let Ok(reaction) = model.reaction(id) else {
            log.error(&format!("Reaction {} is not in the model", id), None);
            continue;
        };
        let mut changes = vec![BoundsChange::knock_out(id)];
        let reverse = reaction.reverse_id();
        if model.has_reaction(&reverse) {
            changes.push(BoundsChange::knock_out(&reverse));
        }
        let solution = model.with_bounds(&changes, |m| Ok::<_, TestError>(m.optimize()?))?;
        let essential = solution.is_infeasible()
            || solution
                .objective_value
                .is_some_and(|value| value < threshold);
        log.assertion(
            essential,
            &format!("{} is essential", id),
            &format!(
                "{} is not essential, {} with objective {:?}",
                id, solution.status, solution.objective_value
            ),
            None,
        );
    }
    Ok(())
}
