//! Module providing JSON IO for Models, in the COBRA JSON layout
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionBuilderError};
use crate::optimize::objective::ObjectiveSense;

/// Key of the reaction notes holding the id of the other half of a split reaction
const REFLECTION_NOTE: &str = "reflection";

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    genes: Vec<JsonGene>,
    id: Option<String>,
    compartments: Option<IndexMap<String, String>>,
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: Option<String>,
    charge: Option<i32>,
    formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subsystem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}
// endregion JSON Model

// region Conversions
/* Notes and annotations are kept as JSON strings. The data isn't very structured, so unpacking
it further would mean a lot of maintenance for little benefit. */
fn value_to_string(value: Option<Value>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn string_to_value(s: &Option<String>) -> Option<Value> {
    s.as_ref()
        .map(|s| serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())))
}

impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            notes: value_to_string(g.notes),
            annotation: value_to_string(g.annotation),
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
            notes: value_to_string(m.notes),
            annotation: value_to_string(m.annotation),
        }
    }
}

impl From<&Gene> for JsonGene {
    fn from(g: &Gene) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            notes: string_to_value(&g.notes),
            annotation: string_to_value(&g.annotation),
        }
    }
}

impl From<&Metabolite> for JsonMetabolite {
    fn from(m: &Metabolite) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            compartment: m.compartment.clone(),
            charge: Some(m.charge),
            formula: m.formula.clone(),
            notes: string_to_value(&m.notes),
            annotation: string_to_value(&m.annotation),
        }
    }
}

/// Split reaction notes into the reflection and whatever else is in them
fn take_reflection(notes: Option<Value>) -> (Option<String>, Option<Value>) {
    match notes {
        Some(Value::Object(mut map)) => {
            let reflection = match map.remove(REFLECTION_NOTE) {
                Some(Value::String(s)) => Some(s),
                _ => None,
            };
            let rest = if map.is_empty() {
                None
            } else {
                Some(Value::Object(map))
            };
            (reflection, rest)
        }
        other => (None, other),
    }
}

/// Merge the reflection back into the notes
fn put_reflection(notes: Option<Value>, reflection: &Option<String>) -> Option<Value> {
    let Some(reflection) = reflection else {
        return notes;
    };
    let mut map = match notes {
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("text".to_string(), other);
            map
        }
        None => Map::new(),
    };
    map.insert(
        REFLECTION_NOTE.to_string(),
        Value::String(reflection.clone()),
    );
    Some(Value::Object(map))
}

impl Model {
    /// Read a COBRA JSON model file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let path = path.as_ref();
        debug!("Reading model from {}", path.display());
        let model_str = fs::read_to_string(path)
            .map_err(|err| JsonError::UnableToRead(format!("{}: {}", path.display(), err)))?;
        Model::from_json_str(&model_str)
    }

    /// Parse a COBRA JSON model from a string
    pub fn from_json_str(model_str: &str) -> Result<Model, JsonError> {
        let json_model = serde_json::from_str::<JsonModel>(model_str)
            .map_err(|err| JsonError::UnableToParse(err.to_string()))?;
        Model::from_json(json_model)
    }

    /// Write the model as COBRA JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Serialize the model as a COBRA JSON string
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;
        json_model
            .genes
            .into_iter()
            .for_each(|g| model.add_gene(Gene::from(g)));
        json_model
            .metabolites
            .into_iter()
            .for_each(|m| model.add_metabolite(Metabolite::from(m)));

        let mut objective: IndexMap<String, f64> = IndexMap::new();
        for rxn in json_model.reactions {
            let gene_reaction_rule = if rxn.gene_reaction_rule.trim().is_empty() {
                None
            } else {
                Some(rxn.gene_reaction_rule)
            };
            let (reflection, notes) = take_reflection(rxn.notes);
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id.clone())
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .gene_reaction_rule(gene_reaction_rule)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .notes(value_to_string(notes))
                .annotation(value_to_string(rxn.annotation))
                .reflection(reflection)
                .build()?;
            model.add_reaction(new_reaction)?;
            // Add the reaction to the objective function if desired
            if let Some(coef) = rxn.objective_coefficient {
                if coef != 0. {
                    objective.insert(rxn.id, coef);
                }
            }
        }
        model.set_objective(objective, ObjectiveSense::Maximize)?;
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        let reactions = self
            .reactions
            .values()
            .map(|r| JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.metabolites.clone(),
                lower_bound: r.lower_bound,
                upper_bound: r.upper_bound,
                gene_reaction_rule: r.gene_reaction_rule.clone().unwrap_or_default(),
                objective_coefficient: self.objective.get(&r.id).copied(),
                subsystem: r.subsystem.clone(),
                notes: put_reflection(string_to_value(&r.notes), &r.reflection),
                annotation: string_to_value(&r.annotation),
            })
            .collect();

        JsonModel {
            metabolites: self.metabolites.values().map(JsonMetabolite::from).collect(),
            reactions,
            genes: self.genes.values().map(JsonGene::from).collect(),
            id: self.id.clone(),
            compartments: self.compartments.clone(),
            version: self.version.clone(),
        }
    }
}
// endregion Conversions

/// Read any JSON file into `T`, e.g. a list of reaction ids
pub fn read_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, JsonError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .map_err(|err| JsonError::UnableToRead(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&data)
        .map_err(|err| JsonError::UnableToParse(format!("{}: {}", path.display(), err)))
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Inconsistent model: {0}")]
    InconsistentModel(#[from] ModelError),
    #[error("Serde json error")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
