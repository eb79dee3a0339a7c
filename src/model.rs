//! In-memory Service/SLO model produced by the builder

use crate::diagnostics::SourceLocation;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Measurement definition of an SLO
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sli {
    pub error_query: Option<String>,
    pub total_query: Option<String>,
    pub raw_error_ratio_query: Option<String>,
}

impl Sli {
    pub fn events(error_query: impl Into<String>, total_query: impl Into<String>) -> Self {
        Self {
            error_query: Some(error_query.into()),
            total_query: Some(total_query.into()),
            raw_error_ratio_query: None,
        }
    }

    pub fn raw(error_ratio_query: impl Into<String>) -> Self {
        Self {
            raw_error_ratio_query: Some(error_ratio_query.into()),
            ..Default::default()
        }
    }

    /// `(error_query, total_query)` when both halves of the events form are set
    pub fn events_form(&self) -> Option<(&str, &str)> {
        match (&self.error_query, &self.total_query) {
            (Some(error), Some(total)) => Some((error.as_str(), total.as_str())),
            _ => None,
        }
    }

    pub fn raw_form(&self) -> Option<&str> {
        self.raw_error_ratio_query.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.events_form().is_some() || self.raw_form().is_some()
    }

    /// Both forms declared; neither takes precedence
    pub fn is_ambiguous(&self) -> bool {
        self.events_form().is_some() && self.raw_form().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alerting {
    pub name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl Alerting {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.labels.is_empty() && self.annotations.is_empty()
    }
}

/// One validated objective
#[derive(Debug, Clone, PartialEq)]
pub struct SloBlock {
    pub name: String,
    /// Percentage in `0.0..=100.0`
    pub objective: f64,
    pub description: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub sli: Sli,
    pub alerting: Option<Alerting>,
    pub source: Option<SourceLocation>,
}

impl SloBlock {
    pub fn new(name: impl Into<String>, objective: f64, sli: Sli) -> Self {
        Self {
            name: name.into(),
            objective,
            description: None,
            labels: BTreeMap::new(),
            sli,
            alerting: None,
            source: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_alerting(mut self, alerting: Alerting) -> Self {
        self.alerting = Some(alerting);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("service '{0}' has no SLOs")]
    NoSlos(String),

    #[error("service name cannot be empty")]
    EmptyServiceName,

    #[error("SLO name '{0}' is declared more than once")]
    DuplicateSloName(String),
}

/// Top-level aggregate: a named service with at least one SLO, names unique
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    name: String,
    slos: Vec<SloBlock>,
}

impl Service {
    pub fn new(name: impl Into<String>, slos: Vec<SloBlock>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyServiceName);
        }
        if slos.is_empty() {
            return Err(ModelError::NoSlos(name));
        }

        let mut seen = HashSet::new();
        for slo in &slos {
            if !seen.insert(slo.name.as_str()) {
                return Err(ModelError::DuplicateSloName(slo.name.clone()));
            }
        }

        Ok(Self { name, slos })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slos(&self) -> &[SloBlock] {
        &self.slos
    }

    pub fn slo(&self, name: &str) -> Option<&SloBlock> {
        self.slos.iter().find(|slo| slo.name == name)
    }
}
