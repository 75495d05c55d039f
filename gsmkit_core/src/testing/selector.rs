//! Choosing which models, conditions and designs a test runs against
use std::fmt::{Display, Formatter};

use indexmap::IndexSet;

/// Model variant a test runs against
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TestTarget {
    /// The model as loaded
    Base,
    /// The model with a project condition applied
    Condition(String),
    /// The model with a design applied
    Design(String),
}

impl Display for TestTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TestTarget::Base => write!(f, "base"),
            TestTarget::Condition(name) => write!(f, "condition {}", name),
            TestTarget::Design(id) => write!(f, "design {}", id),
        }
    }
}

/// Either every id, or a fixed set of them
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(IndexSet<String>),
}

impl Selection {
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(ids.into_iter().map(Into::into).collect())
    }

    /// Matches nothing
    pub fn none() -> Self {
        Selection::Only(IndexSet::new())
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(ids) => ids.contains(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Which targets a test applies to
///
/// A test restricted to particular designs or conditions doesn't run on the base model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSelector {
    pub models: Selection,
    pub designs: Selection,
    pub conditions: Selection,
}

impl TestSelector {
    /// Every model, design and condition
    pub fn all() -> Self {
        Self::default()
    }

    pub fn models(mut self, models: Selection) -> Self {
        self.models = models;
        self
    }

    pub fn designs(mut self, designs: Selection) -> Self {
        self.designs = designs;
        self
    }

    pub fn conditions(mut self, conditions: Selection) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn selects(&self, model: &str, target: &TestTarget) -> bool {
        if !self.models.matches(model) {
            return false;
        }
        match target {
            TestTarget::Base => self.designs.is_all() && self.conditions.is_all(),
            TestTarget::Condition(name) => self.conditions.matches(name),
            TestTarget::Design(id) => self.designs.matches(id),
        }
    }
}
