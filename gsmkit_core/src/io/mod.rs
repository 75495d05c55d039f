//! Module for reading and writing Models and project data files
pub mod json;
