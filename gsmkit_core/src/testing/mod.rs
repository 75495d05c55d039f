//! Model tests: checks run against models, conditions and designs, recording their outcome in
//! a [`result_log::ResultLog`]
use thiserror::Error;

use crate::designs::DesignError;
use crate::io::json::JsonError;
use crate::metabolic_model::model::ModelError;
use crate::optimize::fba::OptimizeError;
use crate::project::ProjectError;

pub mod checks;
pub mod result_log;
pub mod runner;
pub mod selector;
pub mod sweep;

/// Problems that stop a test from running to completion
#[derive(Error, Debug)]
pub enum TestError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    #[error("Unable to read test input: {0}")]
    Input(#[from] JsonError),
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error(transparent)]
    Project(#[from] ProjectError),
}
