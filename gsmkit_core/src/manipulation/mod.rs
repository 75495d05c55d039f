//! Structural transformations of a Model
pub mod irreversible;
