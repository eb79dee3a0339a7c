//! Tag vocabulary and classification of raw tag tokens
//!
//! The vocabulary is fixed: flat keys (`service`, `name`, `objective`,
//! `description`, `labels`) and two-part keys under the `sli` and `alerting`
//! namespaces. Values pass through verbatim apart from whitespace trimming, so
//! query placeholders like `{{.window}}` survive untouched.

use crate::diagnostics::SourceLocation;
use crate::languages::RawTag;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Reserved top-level identifier naming the service
    Service,
    Name,
    Objective,
    Description,
    Labels,
    SliErrorQuery,
    SliTotalQuery,
    SliRawQuery,
    AlertingName,
    AlertingLabels,
    AlertingAnnotations,
}

impl TagKey {
    pub fn from_raw(key: &str) -> Option<Self> {
        let key = match key.split_once('.') {
            None => match key {
                "service" => TagKey::Service,
                "name" => TagKey::Name,
                "objective" => TagKey::Objective,
                "description" => TagKey::Description,
                "labels" => TagKey::Labels,
                _ => return None,
            },
            Some(("sli", field)) => match field {
                "error_query" => TagKey::SliErrorQuery,
                "total_query" => TagKey::SliTotalQuery,
                "raw_query" | "error_ratio_query" => TagKey::SliRawQuery,
                _ => return None,
            },
            Some(("alerting", field)) => match field {
                "name" => TagKey::AlertingName,
                "labels" => TagKey::AlertingLabels,
                "annotations" => TagKey::AlertingAnnotations,
                _ => return None,
            },
            Some(_) => return None,
        };
        Some(key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TagKey::Service => "service",
            TagKey::Name => "name",
            TagKey::Objective => "objective",
            TagKey::Description => "description",
            TagKey::Labels => "labels",
            TagKey::SliErrorQuery => "sli.error_query",
            TagKey::SliTotalQuery => "sli.total_query",
            TagKey::SliRawQuery => "sli.raw_query",
            TagKey::AlertingName => "alerting.name",
            TagKey::AlertingLabels => "alerting.labels",
            TagKey::AlertingAnnotations => "alerting.annotations",
        }
    }

    /// Keys that accumulate (`k=v` maps) rather than hold a single value
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self,
            TagKey::Labels | TagKey::AlertingLabels | TagKey::AlertingAnnotations
        )
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized annotation instance
#[derive(Debug, Clone, PartialEq)]
pub struct TagDeclaration {
    pub key: TagKey,
    pub value: String,
    pub location: SourceLocation,
    /// Block this declaration belongs to; assigned by the builder, `None`
    /// before the first `name` tag.
    pub block_index: Option<usize>,
}

impl TagDeclaration {
    pub fn new(key: TagKey, value: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            key,
            value: value.into().trim().to_string(),
            location,
            block_index: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("unknown tag key '{key}'")]
    UnknownKey {
        key: String,
        location: SourceLocation,
    },

    #[error("tag '{key}' has an empty value")]
    EmptyValue {
        key: String,
        location: SourceLocation,
    },
}

impl GrammarError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            GrammarError::UnknownKey { location, .. } | GrammarError::EmptyValue { location, .. } => {
                location
            }
        }
    }
}

/// Classifies one raw token found in `file`
pub fn parse_tag(raw: RawTag, file: &Path) -> Result<TagDeclaration, GrammarError> {
    let location = SourceLocation::new(file, raw.line);

    let Some(key) = TagKey::from_raw(&raw.key) else {
        return Err(GrammarError::UnknownKey {
            key: raw.key,
            location,
        });
    };

    let value = raw.value.trim();
    if value.is_empty() {
        return Err(GrammarError::EmptyValue {
            key: raw.key,
            location,
        });
    }

    Ok(TagDeclaration::new(key, value, location))
}
