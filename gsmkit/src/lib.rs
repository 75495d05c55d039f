//! Command line interface for gsmkit
pub mod cli;
pub mod log;
