//! A project: a directory holding models, the files designs read, and a project file
//!
//! The project file `gsmkit_project.json` lists the models, the growth conditions tests run
//! under, and optional settings overriding the global [`Configuration`].
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::{Configuration, Solver, CONFIGURATION};
use crate::designs::{DesignError, DesignRegistry};
use crate::io::json::{read_json_file, JsonError};
use crate::metabolic_model::model::{Model, ModelError};

/// Name of the project file at the project root
pub const PROJECT_FILE: &str = "gsmkit_project.json";

/// Contents of the project file
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub description: String,
    /// Model files, relative to the project root
    pub models: Vec<String>,
    /// Model used when none is named, the first model if unset
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub conditions: IndexMap<String, Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// A growth condition: the medium and reactions knocked out
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Condition {
    /// Exchange id to maximum uptake rate
    #[serde(default)]
    pub media: IndexMap<String, f64>,
    #[serde(default)]
    pub knock_outs: Vec<String>,
}

impl Condition {
    /// Set the medium and zero the bounds of the knocked out reactions
    pub fn apply(&self, model: &mut Model) -> Result<(), ModelError> {
        model.set_medium(&self.media)?;
        for id in &self.knock_outs {
            model.set_bounds(id, 0., 0.)?;
        }
        Ok(())
    }
}

/// Overrides for the global configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub solver: Option<Solver>,
    pub tolerance: Option<f64>,
    pub solver_tolerance: Option<f64>,
    pub essential_threshold: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    /// Log level for the command line tool
    pub log_level: Option<String>,
}

impl Settings {
    /// Write the overrides into the global configuration
    pub fn apply(&self) {
        let mut conf = match CONFIGURATION.write() {
            Ok(conf) => conf,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.apply_to(&mut conf);
        debug!("Configuration is now {:?}", *conf);
    }

    fn apply_to(&self, conf: &mut Configuration) {
        if let Some(solver) = self.solver {
            conf.solver = solver;
        }
        if let Some(tolerance) = self.tolerance {
            conf.tolerance = tolerance;
        }
        if let Some(solver_tolerance) = self.solver_tolerance {
            conf.solver_tolerance = solver_tolerance;
        }
        if let Some(threshold) = self.essential_threshold {
            conf.essential_threshold = threshold;
        }
        if let Some(lower_bound) = self.lower_bound {
            conf.lower_bound = lower_bound;
        }
        if let Some(upper_bound) = self.upper_bound {
            conf.upper_bound = upper_bound;
        }
    }
}

/// An opened project
#[derive(Debug)]
pub struct Project {
    project_path: PathBuf,
    config: ProjectConfig,
    designs: DesignRegistry,
}

impl Project {
    /// Project rooted at `project_path` with the builtin designs
    pub fn new<P: Into<PathBuf>>(project_path: P, config: ProjectConfig) -> Self {
        Project {
            project_path: project_path.into(),
            config,
            designs: DesignRegistry::builtin(),
        }
    }

    /// Read the project file in `project_path`
    pub fn open<P: AsRef<Path>>(project_path: P) -> Result<Self, ProjectError> {
        let project_path = project_path.as_ref();
        let project_file = project_path.join(PROJECT_FILE);
        if !project_file.is_file() {
            return Err(ProjectError::NotAProject(project_path.display().to_string()));
        }
        let config: ProjectConfig = read_json_file(&project_file)?;
        info!(
            "Opened project {} with {} models",
            project_path.display(),
            config.models.len()
        );
        Ok(Self::new(project_path, config))
    }

    /// Swap the registered designs
    pub fn with_designs(mut self, designs: DesignRegistry) -> Self {
        self.designs = designs;
        self
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Path of a project relative file
    pub fn project_file<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.project_path.join(relative)
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn description(&self) -> &str {
        &self.config.description
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.config.settings.as_ref()
    }

    /// Read a project relative JSON list of ids
    pub fn read_id_list(&self, relative: &str) -> Result<Vec<String>, JsonError> {
        read_json_file(self.project_file(relative))
    }

    // region Models
    /// Names of the models, the file stems of the model paths
    pub fn model_names(&self) -> Vec<String> {
        self.config.models.iter().map(|path| model_name(path)).collect()
    }

    fn model_path(&self, name: Option<&str>) -> Result<&str, ProjectError> {
        let wanted = match name {
            Some(name) => name.to_string(),
            None => match (&self.config.default_model, self.config.models.first()) {
                (Some(default), _) => model_name(default),
                (None, Some(first)) => model_name(first),
                (None, None) => return Err(ProjectError::NoModels),
            },
        };
        self.config
            .models
            .iter()
            .find(|path| model_name(path) == wanted || path.as_str() == wanted)
            .map(|path| path.as_str())
            .ok_or(ProjectError::UnknownModel(wanted))
    }

    /// Load a model by name, or the default model
    pub fn load_model(&self, name: Option<&str>) -> Result<Model, ProjectError> {
        let path = self.project_file(self.model_path(name)?);
        Ok(Model::read_json(path)?)
    }
    // endregion Models

    // region Conditions
    pub fn conditions(&self) -> &IndexMap<String, Condition> {
        &self.config.conditions
    }

    /// Apply a named condition to a model
    pub fn apply_condition(&self, model: &mut Model, name: &str) -> Result<(), ProjectError> {
        let condition = self
            .config
            .conditions
            .get(name)
            .ok_or_else(|| ProjectError::UnknownCondition(name.to_string()))?;
        condition.apply(model)?;
        Ok(())
    }

    /// Load a model and apply a named condition to it
    pub fn load_condition(&self, model: Option<&str>, name: &str) -> Result<Model, ProjectError> {
        let mut loaded = self.load_model(model)?;
        self.apply_condition(&mut loaded, name)?;
        Ok(loaded)
    }
    // endregion Conditions

    // region Designs
    pub fn designs(&self) -> &DesignRegistry {
        &self.designs
    }

    /// Load a model and apply a design, with its parents, to it
    pub fn load_design(&self, id: &str, model: Option<&str>) -> Result<Model, ProjectError> {
        let base = self.load_model(model)?;
        Ok(self.designs.load(id, base, self)?)
    }
    // endregion Designs
}

fn model_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("{0} has no gsmkit_project.json")]
    NotAProject(String),
    #[error("The project lists no models")]
    NoModels,
    #[error("No model named {0} in the project")]
    UnknownModel(String),
    #[error("No condition named {0} in the project")]
    UnknownCondition(String),
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Design(#[from] DesignError),
}

#[cfg(test)]
mod project_tests {
    use super::*;

    const CONFIG: &str = r#"{
        "description": "A test project",
        "models": ["models/first.json", "second.json"],
        "conditions": {
            "anaerobic": {"media": {"EX_glc": 10.0}, "knock_outs": ["PFL"]},
            "bare": {}
        },
        "settings": {"solver": "microlp", "tolerance": 1e-9, "solver_tolerance": 1e-7}
    }"#;

    #[test]
    fn parse_project_file() {
        let config: ProjectConfig = serde_json::from_str(CONFIG).unwrap();
        assert_eq!(config.description, "A test project");
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.default_model, None);
        let anaerobic = &config.conditions["anaerobic"];
        assert_eq!(anaerobic.media.get("EX_glc"), Some(&10.));
        assert_eq!(anaerobic.knock_outs, vec!["PFL".to_string()]);
        assert_eq!(config.conditions["bare"], Condition::default());

        let settings = config.settings.unwrap();
        assert_eq!(settings.solver, Some(Solver::Microlp));
        let mut conf = Configuration::default();
        settings.apply_to(&mut conf);
        assert_eq!(conf.solver, Solver::Microlp);
        assert_eq!(conf.tolerance, 1e-9);
        assert_eq!(conf.solver_tolerance, 1e-7);
        assert_eq!(conf.essential_threshold, Configuration::default().essential_threshold);
    }

    #[test]
    fn model_lookup() {
        let config: ProjectConfig = serde_json::from_str(CONFIG).unwrap();
        let project = Project::new("/tmp/project", config);
        assert_eq!(project.model_names(), vec!["first", "second"]);
        assert_eq!(project.model_path(None).unwrap(), "models/first.json");
        assert_eq!(project.model_path(Some("second")).unwrap(), "second.json");
        assert!(matches!(
            project.model_path(Some("third")),
            Err(ProjectError::UnknownModel(_))
        ));
        assert_eq!(
            project.project_file("reacs_for_min.json"),
            PathBuf::from("/tmp/project/reacs_for_min.json")
        );
    }

    #[test]
    fn empty_project() {
        let project = Project::new(".", ProjectConfig::default());
        assert!(matches!(project.load_model(None), Err(ProjectError::NoModels)));
        assert!(matches!(
            project.apply_condition(&mut Model::new_empty(), "nope"),
            Err(ProjectError::UnknownCondition(_))
        ));
    }

    #[test]
    fn open_requires_project_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::open(dir.path()),
            Err(ProjectError::NotAProject(_))
        ));
        std::fs::write(dir.path().join(PROJECT_FILE), r#"{"models": []}"#).unwrap();
        let project = Project::open(dir.path()).unwrap();
        assert!(project.model_names().is_empty());
        assert_eq!(project.designs().len(), 2);
    }
}
