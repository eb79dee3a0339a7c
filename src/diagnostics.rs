//! Recoverable problems collected while compiling annotations
//!
//! Every component receives a `&mut Diagnostics` instead of reaching for a
//! global logger. Each entry is emitted through `tracing` as it is recorded and
//! kept so callers can inspect what was skipped after a successful run.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where a tag was found
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-indexed line number
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Comment starts with the sentinel but has no parseable key/value
    MalformedTag,
    /// Key outside the known vocabulary
    UnknownKey,
    /// File could not be read (permissions, broken symlink, not UTF-8)
    UnreadableFile,
    /// Include root that does not exist
    MissingIncludePath,
    /// Block-level key seen before any `name` tag
    OrphanDeclaration,
    /// Single-valued key repeated within one block
    DuplicateKey,
    /// Block failed validation and was dropped
    InvalidBlock,
    /// SLO name already used by an earlier block
    DuplicateSloName,
    /// Block declares both the raw and the events SLI form
    AmbiguousSli,
    /// `key=value` pair that could not be parsed
    InvalidLabel,
    /// Second `service` tag with a different value
    ConflictingServiceName,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedTag => "malformed-tag",
            DiagnosticKind::UnknownKey => "unknown-key",
            DiagnosticKind::UnreadableFile => "unreadable-file",
            DiagnosticKind::MissingIncludePath => "missing-include-path",
            DiagnosticKind::OrphanDeclaration => "orphan-declaration",
            DiagnosticKind::DuplicateKey => "duplicate-key",
            DiagnosticKind::InvalidBlock => "invalid-block",
            DiagnosticKind::DuplicateSloName => "duplicate-slo-name",
            DiagnosticKind::AmbiguousSli => "ambiguous-sli",
            DiagnosticKind::InvalidLabel => "invalid-label",
            DiagnosticKind::ConflictingServiceName => "conflicting-service-name",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} [{}] {}", location, self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Ordered sink for non-fatal diagnostics
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            message: message.into(),
            location,
        };

        match &diagnostic.location {
            Some(location) => warn!(
                kind = %diagnostic.kind,
                location = %location,
                "{}",
                diagnostic.message
            ),
            None => warn!(kind = %diagnostic.kind, "{}", diagnostic.message),
        }

        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
