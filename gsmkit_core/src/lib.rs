//! Core of gsmkit, designing and testing genome scale metabolic models with flux balance
//! analysis.
pub mod configuration;
pub mod designs;
pub mod io;
pub mod manipulation;
pub mod metabolic_model;
pub mod optimize;
pub mod project;
pub mod testing;
