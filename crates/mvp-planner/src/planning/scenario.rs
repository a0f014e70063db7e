use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::state::PlanState;

/// Named full copy of the plan state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub state: PlanState,
}

impl Scenario {
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            name: self.name.clone(),
            saved_at: self.saved_at,
            assigned_clinicians: self.state.assignments().len(),
            tracks_with_selections: self.state.all_selections().len(),
        }
    }
}

/// Listing entry for saved scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub assigned_clinicians: usize,
    pub tracks_with_selections: usize,
}

/// Storage abstraction for saved scenarios.
pub trait ScenarioRepository: Send + Sync {
    /// Insert or overwrite the scenario with the same name.
    fn save(&self, scenario: Scenario) -> Result<(), ScenarioError>;
    fn fetch(&self, name: &str) -> Result<Option<Scenario>, ScenarioError>;
    fn list(&self) -> Result<Vec<ScenarioSummary>, ScenarioError>;
    fn remove(&self, name: &str) -> Result<bool, ScenarioError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario name must not be blank")]
    InvalidName,
    #[error("scenario '{0}' not found")]
    NotFound(String),
    #[error("scenario storage unavailable: {0}")]
    Unavailable(String),
}

/// Process-local scenario store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryScenarioRepository {
    scenarios: Arc<Mutex<BTreeMap<String, Scenario>>>,
}

impl InMemoryScenarioRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Scenario>>, ScenarioError> {
        self.scenarios
            .lock()
            .map_err(|_| ScenarioError::Unavailable("scenario mutex poisoned".to_string()))
    }
}

impl ScenarioRepository for InMemoryScenarioRepository {
    fn save(&self, scenario: Scenario) -> Result<(), ScenarioError> {
        self.lock()?.insert(scenario.name.clone(), scenario);
        Ok(())
    }

    fn fetch(&self, name: &str) -> Result<Option<Scenario>, ScenarioError> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<ScenarioSummary>, ScenarioError> {
        Ok(self.lock()?.values().map(Scenario::summary).collect())
    }

    fn remove(&self, name: &str) -> Result<bool, ScenarioError> {
        Ok(self.lock()?.remove(name).is_some())
    }
}

pub(crate) fn validate_name(name: &str) -> Result<String, ScenarioError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ScenarioError::InvalidName)
    } else {
        Ok(trimmed.to_string())
    }
}
