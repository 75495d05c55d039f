//! Integration tests for the command handlers.
use gsmkit::cli::{
    handle_designs_command, handle_export_command, handle_info_command, handle_test_command,
};
use gsmkit::log::is_logger_initialised;
use gsmkit_core::metabolic_model::model::Model;
use std::path::PathBuf;

fn get_project_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("gsmkit_core")
        .join("test_data")
        .join("test_project")
}

#[test]
fn test_handle_commands() {
    std::env::set_var("GSMKIT_LOG_LEVEL", "off");

    handle_designs_command(&get_project_dir()).unwrap();
    assert!(is_logger_initialised());
    handle_info_command(&get_project_dir(), None).unwrap();
    assert!(handle_info_command(&get_project_dir(), Some("missing")).is_err());
    handle_test_command(&get_project_dir()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("restricted.json");
    handle_export_command(
        &get_project_dir(),
        "fluxm_flux_minimisation_h2_restricted",
        &output,
        None,
    )
    .unwrap();
    let exported = Model::read_json(&output).unwrap();
    assert_eq!(exported.bounds("EX_HYDROGEN-MOLECULE").unwrap(), (0., 0.));
    assert_eq!(
        exported.reaction("ACK_reverse").unwrap().reflection.as_deref(),
        Some("ACK")
    );

    assert!(handle_export_command(&get_project_dir(), "nope", &output, None).is_err());
}
