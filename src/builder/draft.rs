use crate::diagnostics::{DiagnosticKind, Diagnostics, SourceLocation};
use crate::grammar::{TagDeclaration, TagKey};
use crate::model::{Alerting, Sli, SloBlock};
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// An open block collecting declarations until the next `name` tag
#[derive(Debug, Clone, PartialEq)]
pub struct SloDraft {
    pub index: usize,
    pub name: String,
    pub location: SourceLocation,
    /// Every `objective` value seen; a valid block has exactly one
    pub objectives: Vec<String>,
    pub description: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub sli: Sli,
    pub alerting: Alerting,
}

impl SloDraft {
    pub fn open(index: usize, name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            index,
            name: name.into(),
            location,
            objectives: Vec::new(),
            description: None,
            labels: BTreeMap::new(),
            sli: Sli::default(),
            alerting: Alerting::default(),
        }
    }

    pub fn apply(&mut self, declaration: TagDeclaration, diagnostics: &mut Diagnostics) {
        let TagDeclaration {
            key,
            value,
            location,
            ..
        } = declaration;

        let slot = match key {
            TagKey::Objective => {
                self.objectives.push(value);
                return;
            }
            TagKey::Labels => {
                parse_pairs(&value, true, &location, &mut self.labels, diagnostics);
                return;
            }
            TagKey::AlertingLabels => {
                parse_pairs(&value, true, &location, &mut self.alerting.labels, diagnostics);
                return;
            }
            TagKey::AlertingAnnotations => {
                parse_pairs(
                    &value,
                    false,
                    &location,
                    &mut self.alerting.annotations,
                    diagnostics,
                );
                return;
            }
            TagKey::Description => &mut self.description,
            TagKey::SliErrorQuery => &mut self.sli.error_query,
            TagKey::SliTotalQuery => &mut self.sli.total_query,
            TagKey::SliRawQuery => &mut self.sli.raw_error_ratio_query,
            TagKey::AlertingName => &mut self.alerting.name,
            // Routed by the builder, never attached to a block
            TagKey::Service | TagKey::Name => return,
        };

        if slot.is_some() {
            diagnostics.warn(
                DiagnosticKind::DuplicateKey,
                Some(location),
                format!(
                    "'{}' declared again in SLO '{}', using the last value",
                    key, self.name
                ),
            );
        }
        *slot = Some(value);
    }

    pub fn parse_objective(&self) -> Result<f64> {
        let raw = self
            .objectives
            .first()
            .context("objective is missing")?;
        let number = raw.strip_suffix('%').unwrap_or(raw).trim();
        number
            .parse::<f64>()
            .with_context(|| format!("objective '{}' is not a number", raw))
    }

    pub fn into_block(self) -> Result<SloBlock> {
        let objective = self.parse_objective()?;
        let alerting = if self.alerting.is_empty() {
            None
        } else {
            Some(self.alerting)
        };

        Ok(SloBlock {
            name: self.name,
            objective,
            description: self.description,
            labels: self.labels,
            sli: self.sli,
            alerting,
            source: Some(self.location),
        })
    }
}

/// Parses `k=v` pairs; with `split_list` a value may hold several
/// comma-separated pairs. Later keys overwrite earlier ones.
fn parse_pairs(
    value: &str,
    split_list: bool,
    location: &SourceLocation,
    target: &mut BTreeMap<String, String>,
    diagnostics: &mut Diagnostics,
) {
    let parts: Vec<&str> = if split_list {
        value.split(',').collect()
    } else {
        vec![value]
    };

    for part in parts.into_iter().map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                target.insert(k.trim().to_string(), v.trim().to_string());
            }
            _ => diagnostics.warn(
                DiagnosticKind::InvalidLabel,
                Some(location.clone()),
                format!("expected 'key=value', got '{}'", part),
            ),
        }
    }
}
