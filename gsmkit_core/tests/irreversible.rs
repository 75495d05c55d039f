//! Integration tests splitting and joining the reactions of the test model
use gsmkit_core::manipulation::irreversible::{convert_to_irreversible, revert_to_reversible};
use gsmkit_core::metabolic_model::model::Model;
use std::path::PathBuf;

fn test_model() -> Model {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join("test_project")
        .join("toy_fermenter.json");
    Model::read_json(path).unwrap()
}

#[test]
fn split_test_model() {
    let mut model = test_model();
    let added = convert_to_irreversible(&mut model);
    assert_eq!(
        added,
        vec![
            "EX_CARBON-MONOXIDE_reverse",
            "ACK_reverse",
            "adenosyl_homocysteine_bm_tx_reverse"
        ]
    );
    let reverse = model.reaction("ACK_reverse").unwrap();
    assert_eq!(reverse.bounds(), (0., 1000.));
    assert_eq!(reverse.metabolites["atp"], -1.);
    assert_eq!(reverse.gene_reaction_rule.as_deref(), Some("ackA"));
    assert_eq!(model.bounds("EX_CARBON-MONOXIDE_reverse").unwrap(), (0., 30.));
    // The objective reaction isn't reversible
    assert_eq!(model.objective.len(), 1);

    // Nothing left to split
    assert!(convert_to_irreversible(&mut model).is_empty());
}

#[test]
fn split_and_join_keeps_optimum() {
    let mut model = test_model();
    let before = model.optimize().unwrap().objective_value.unwrap();

    convert_to_irreversible(&mut model);
    let split = model.optimize().unwrap().objective_value.unwrap();
    assert!((before - split).abs() < 1e-5);

    revert_to_reversible(&mut model);
    assert_eq!(model.reactions.len(), test_model().reactions.len());
    assert_eq!(model.bounds("ACK").unwrap(), (-1000., 1000.));
    let joined = model.optimize().unwrap().objective_value.unwrap();
    assert!((before - joined).abs() < 1e-5);
}
