//! Service model builder
//!
//! Groups the ordered declaration list into SLO blocks and validates them.
//! Each `name` tag opens a block; the block closes at the next `name` or at the
//! end of input, where it is validated and either kept or dropped:
//!
//! ```text
//! OPEN (collecting) -> VALIDATING (next name / EOF) -> CLOSED-VALID | DROPPED-INVALID
//! ```
//!
//! The grouping is an explicit fold over the declarations carrying a
//! [`BuildState`] accumulator. Invalid blocks are reported and skipped; the
//! build only fails when nothing valid remains.

mod draft;

pub use draft::SloDraft;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{TagDeclaration, TagKey};
use crate::model::{ModelError, Service, SloBlock};
use crate::validation::Validator;
use thiserror::Error;
use tracing::{debug, info};

/// Name used when neither a `service` tag nor a caller default is available
pub const FALLBACK_SERVICE_NAME: &str = "service";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no valid SLOs found ({dropped} invalid block(s) dropped)")]
    NoValidSlos { dropped: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Accumulator threaded through the fold
#[derive(Debug, Default)]
pub struct BuildState {
    pub pending_service_name: Option<String>,
    pub current: Option<SloDraft>,
    pub completed: Vec<SloBlock>,
    pub dropped: usize,
}

/// Assigns each declaration the index of the block it belongs to. `service`
/// tags and anything before the first `name` keep `None`.
pub fn assign_blocks(declarations: &mut [TagDeclaration]) {
    let mut current = None;
    let mut next = 0;
    for declaration in declarations.iter_mut() {
        if declaration.key == TagKey::Name {
            current = Some(next);
            next += 1;
        }
        declaration.block_index = match declaration.key {
            TagKey::Service => None,
            _ => current,
        };
    }
}

pub struct ServiceBuilder {
    default_service_name: String,
    validator: Validator,
}

impl ServiceBuilder {
    pub fn new(default_service_name: impl Into<String>) -> Self {
        Self {
            default_service_name: default_service_name.into(),
            validator: Validator::default(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn build(
        &self,
        mut declarations: Vec<TagDeclaration>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Service, BuildError> {
        assign_blocks(&mut declarations);
        debug!(declarations = declarations.len(), "Building service model");

        let mut state = declarations
            .into_iter()
            .fold(BuildState::default(), |state, declaration| {
                self.step(state, declaration, diagnostics)
            });

        if let Some(draft) = state.current.take() {
            self.close(&mut state, draft, diagnostics);
        }

        if state.completed.is_empty() {
            return Err(BuildError::NoValidSlos {
                dropped: state.dropped,
            });
        }

        let name = state
            .pending_service_name
            .unwrap_or_else(|| self.default_service_name());

        info!(
            service = %name,
            slos = state.completed.len(),
            dropped = state.dropped,
            "Service model built"
        );

        Ok(Service::new(name, state.completed)?)
    }

    fn default_service_name(&self) -> String {
        let name = self.default_service_name.trim();
        if name.is_empty() {
            FALLBACK_SERVICE_NAME.to_string()
        } else {
            name.to_string()
        }
    }

    fn step(
        &self,
        mut state: BuildState,
        declaration: TagDeclaration,
        diagnostics: &mut Diagnostics,
    ) -> BuildState {
        match declaration.key {
            TagKey::Service => match &state.pending_service_name {
                None => state.pending_service_name = Some(declaration.value),
                Some(existing) if *existing == declaration.value => {}
                Some(existing) => diagnostics.warn(
                    DiagnosticKind::ConflictingServiceName,
                    Some(declaration.location),
                    format!(
                        "service '{}' ignored, already named '{}'",
                        declaration.value, existing
                    ),
                ),
            },
            TagKey::Name => {
                if let Some(previous) = state.current.take() {
                    self.close(&mut state, previous, diagnostics);
                }
                let index = declaration
                    .block_index
                    .unwrap_or(state.completed.len() + state.dropped);
                state.current = Some(SloDraft::open(
                    index,
                    declaration.value,
                    declaration.location,
                ));
            }
            key => match (declaration.block_index, state.current.as_mut()) {
                (Some(_), Some(draft)) => draft.apply(declaration, diagnostics),
                _ => diagnostics.warn(
                    DiagnosticKind::OrphanDeclaration,
                    Some(declaration.location),
                    format!("'{}' appears before any 'name' tag and was ignored", key),
                ),
            },
        }
        state
    }

    fn close(&self, state: &mut BuildState, draft: SloDraft, diagnostics: &mut Diagnostics) {
        if let Err(e) = self.validator.validate(&draft) {
            state.dropped += 1;
            diagnostics.warn(
                DiagnosticKind::InvalidBlock,
                Some(draft.location),
                format!("SLO '{}' dropped: {}", draft.name, e),
            );
            return;
        }

        if state.completed.iter().any(|slo| slo.name == draft.name) {
            state.dropped += 1;
            diagnostics.warn(
                DiagnosticKind::DuplicateSloName,
                Some(draft.location),
                format!(
                    "SLO '{}' already declared, keeping the first declaration",
                    draft.name
                ),
            );
            return;
        }

        if draft.sli.is_ambiguous() {
            diagnostics.warn(
                DiagnosticKind::AmbiguousSli,
                Some(draft.location.clone()),
                format!(
                    "SLO '{}' declares both sli.raw_query and sli.error_query/sli.total_query; both are rendered",
                    draft.name
                ),
            );
        }

        let location = draft.location.clone();
        let name = draft.name.clone();
        match draft.into_block() {
            Ok(block) => {
                debug!(slo = %block.name, index = state.completed.len(), "SLO block accepted");
                state.completed.push(block);
            }
            Err(e) => {
                state.dropped += 1;
                diagnostics.warn(
                    DiagnosticKind::InvalidBlock,
                    Some(location),
                    format!("SLO '{}' dropped: {}", name, e),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SourceLocation;

    fn tag(key: TagKey, value: &str) -> TagDeclaration {
        TagDeclaration::new(key, value, SourceLocation::new("main.go", 1))
    }

    fn valid_block(name: &str) -> Vec<TagDeclaration> {
        vec![
            tag(TagKey::Name, name),
            tag(TagKey::Objective, "99"),
            tag(TagKey::SliErrorQuery, "errors"),
            tag(TagKey::SliTotalQuery, "total"),
        ]
    }

    #[test]
    fn test_assign_blocks() {
        let mut declarations = vec![
            tag(TagKey::Description, "orphan"),
            tag(TagKey::Service, "svc"),
            tag(TagKey::Name, "a"),
            tag(TagKey::Objective, "99"),
            tag(TagKey::Service, "svc"),
            tag(TagKey::Name, "b"),
            tag(TagKey::Objective, "95"),
        ];
        assign_blocks(&mut declarations);

        let indices: Vec<Option<usize>> = declarations.iter().map(|d| d.block_index).collect();
        assert_eq!(
            indices,
            vec![None, None, Some(0), Some(0), None, Some(1), Some(1)]
        );
    }

    #[test]
    fn test_build_single_block() {
        let mut diagnostics = Diagnostics::new();
        let mut declarations = vec![tag(TagKey::Service, "chatgpt")];
        declarations.extend(valid_block("availability"));

        let service = ServiceBuilder::new("fallback")
            .build(declarations, &mut diagnostics)
            .unwrap();

        assert_eq!(service.name(), "chatgpt");
        assert_eq!(service.slos().len(), 1);
        assert_eq!(service.slos()[0].objective, 99.0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_default_service_name() {
        let mut diagnostics = Diagnostics::new();
        let service = ServiceBuilder::new("my-repo")
            .build(valid_block("a"), &mut diagnostics)
            .unwrap();
        assert_eq!(service.name(), "my-repo");

        let service = ServiceBuilder::new("  ")
            .build(valid_block("a"), &mut diagnostics)
            .unwrap();
        assert_eq!(service.name(), FALLBACK_SERVICE_NAME);
    }

    #[test]
    fn test_invalid_block_dropped_siblings_kept() {
        let mut diagnostics = Diagnostics::new();
        let mut declarations = valid_block("first");
        declarations.extend(vec![
            tag(TagKey::Name, "no-objective"),
            tag(TagKey::SliRawQuery, "ratio"),
        ]);
        declarations.extend(valid_block("last"));

        let service = ServiceBuilder::new("svc")
            .build(declarations, &mut diagnostics)
            .unwrap();

        let names: Vec<&str> = service.slos().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "last"]);
        assert_eq!(diagnostics.count(DiagnosticKind::InvalidBlock), 1);
    }

    #[test]
    fn test_no_declarations_is_fatal() {
        let mut diagnostics = Diagnostics::new();
        let err = ServiceBuilder::new("svc")
            .build(vec![], &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, BuildError::NoValidSlos { dropped: 0 }));
        assert!(err.to_string().starts_with("no valid SLOs found"));
    }

    #[test]
    fn test_only_invalid_block_is_fatal() {
        let mut diagnostics = Diagnostics::new();
        let declarations = vec![
            tag(TagKey::Name, "too-high"),
            tag(TagKey::Objective, "150"),
            tag(TagKey::SliRawQuery, "ratio"),
        ];
        let err = ServiceBuilder::new("svc")
            .build(declarations, &mut diagnostics)
            .unwrap_err();

        assert!(matches!(err, BuildError::NoValidSlos { dropped: 1 }));
        assert_eq!(diagnostics.count(DiagnosticKind::InvalidBlock), 1);
    }

    #[test]
    fn test_duplicate_name_first_wins() {
        let mut diagnostics = Diagnostics::new();
        let mut declarations = valid_block("availability");
        declarations.extend(vec![
            tag(TagKey::Name, "availability"),
            tag(TagKey::Objective, "50"),
            tag(TagKey::SliRawQuery, "ratio"),
        ]);

        let service = ServiceBuilder::new("svc")
            .build(declarations, &mut diagnostics)
            .unwrap();

        assert_eq!(service.slos().len(), 1);
        assert_eq!(service.slos()[0].objective, 99.0);
        assert_eq!(diagnostics.count(DiagnosticKind::DuplicateSloName), 1);
    }

    #[test]
    fn test_orphans_and_conflicting_service_names() {
        let mut diagnostics = Diagnostics::new();
        let mut declarations = vec![
            tag(TagKey::Objective, "99"),
            tag(TagKey::Service, "first"),
            tag(TagKey::Service, "second"),
        ];
        declarations.extend(valid_block("a"));

        let service = ServiceBuilder::new("svc")
            .build(declarations, &mut diagnostics)
            .unwrap();

        assert_eq!(service.name(), "first");
        assert_eq!(diagnostics.count(DiagnosticKind::OrphanDeclaration), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::ConflictingServiceName), 1);
    }

    #[test]
    fn test_ambiguous_sli_kept_with_warning() {
        let mut diagnostics = Diagnostics::new();
        let mut declarations = valid_block("a");
        declarations.push(tag(TagKey::SliRawQuery, "ratio"));

        let service = ServiceBuilder::new("svc")
            .build(declarations, &mut diagnostics)
            .unwrap();

        let sli = &service.slos()[0].sli;
        assert_eq!(sli.raw_form(), Some("ratio"));
        assert_eq!(sli.events_form(), Some(("errors", "total")));
        assert_eq!(diagnostics.count(DiagnosticKind::AmbiguousSli), 1);
    }

    #[test]
    fn test_repeated_objective_drops_block() {
        let mut diagnostics = Diagnostics::new();
        let mut declarations = valid_block("a");
        declarations.push(tag(TagKey::Objective, "95"));

        let err = ServiceBuilder::new("svc")
            .build(declarations, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, BuildError::NoValidSlos { dropped: 1 }));
    }
}
