//! Designs: named transformations producing model variants from a base model
//!
//! A design takes ownership of a freshly loaded model, edits its bounds and objective, and
//! hands it back. Designs may name a parent design, which is applied first.
use std::fmt::{Debug, Formatter};

use indexmap::{IndexMap, IndexSet};
use log::info;
use thiserror::Error;

use crate::io::json::JsonError;
use crate::metabolic_model::model::{Model, ModelError};
use crate::project::Project;

pub mod fluxm;

/// Function applying a design to a model
pub type DesignFn = Box<dyn Fn(Model, &Project) -> Result<Model, DesignError> + Send + Sync>;

/// A registered design
pub struct Design {
    /// Identifier, `{module prefix}_{function name}`
    pub id: String,
    /// Human readable name
    pub name: String,
    pub description: String,
    /// Design applied before this one
    pub parent: Option<String>,
    apply: DesignFn,
}

impl Design {
    pub fn new<F>(
        prefix: &str,
        function: &str,
        name: &str,
        description: &str,
        parent: Option<&str>,
        apply: F,
    ) -> Self
    where
        F: Fn(Model, &Project) -> Result<Model, DesignError> + Send + Sync + 'static,
    {
        Design {
            id: format!("{}_{}", prefix, function),
            name: name.to_string(),
            description: description.to_string(),
            parent: parent.map(|p| p.to_string()),
            apply: Box::new(apply),
        }
    }

    /// Apply only this design, ignoring the parent
    pub fn apply(&self, model: Model, project: &Project) -> Result<Model, DesignError> {
        info!("Applying design {}", self.id);
        (self.apply)(model, project)
    }
}

impl Debug for Design {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Design")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .finish()
    }
}

/// Collection of designs keyed by id
#[derive(Debug, Default)]
pub struct DesignRegistry {
    designs: IndexMap<String, Design>,
}

impl DesignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the designs shipped with the crate
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for design in fluxm::designs(fluxm::FluxMinimisationParams::default()) {
            registry
                .register(design)
                .expect("builtin design ids are distinct");
        }
        registry
    }

    /// Add a design
    ///
    /// # Errors
    /// [`DesignError::DuplicateDesign`] if the id is taken
    pub fn register(&mut self, design: Design) -> Result<(), DesignError> {
        if self.designs.contains_key(&design.id) {
            return Err(DesignError::DuplicateDesign(design.id));
        }
        self.designs.insert(design.id.clone(), design);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Design> {
        self.designs.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.designs.keys().map(|id| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Design> {
        self.designs.values()
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Designs to apply to obtain `id`, root ancestor first
    ///
    /// # Errors
    /// - [`DesignError::UnknownDesign`] if `id` or one of its ancestors isn't registered
    /// - [`DesignError::Cycle`] if the parents loop back on themselves
    pub fn lineage(&self, id: &str) -> Result<Vec<&Design>, DesignError> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(design_id) = current {
            let design = self
                .get(design_id)
                .ok_or_else(|| DesignError::UnknownDesign(design_id.to_string()))?;
            if !seen.insert(design.id.as_str()) {
                return Err(DesignError::Cycle(design.id.clone()));
            }
            chain.push(design);
            current = design.parent.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }

    /// Apply the design `id`, and its ancestors, to `base`
    pub fn load(&self, id: &str, base: Model, project: &Project) -> Result<Model, DesignError> {
        self.lineage(id)?
            .into_iter()
            .try_fold(base, |model, design| design.apply(model, project))
    }
}

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("No design named {0}")]
    UnknownDesign(String),
    #[error("A design named {0} is already registered")]
    DuplicateDesign(String),
    #[error("Design {0} is its own ancestor")]
    Cycle(String),
    #[error("Unable to apply design: {0}")]
    Model(#[from] ModelError),
    #[error("Unable to read design input: {0}")]
    Input(#[from] JsonError),
}
