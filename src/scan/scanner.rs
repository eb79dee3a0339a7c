use super::CancellationFlag;
use crate::diagnostics::{DiagnosticKind, Diagnostics, SourceLocation};
use crate::grammar::{self, GrammarError, TagDeclaration};
use crate::languages::CommentStrategy;
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("none of the include paths exist: {}", display_paths(.0))]
    NoIncludePaths(Vec<PathBuf>),

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    #[error("scan cancelled after {files_scanned} file(s)")]
    Cancelled { files_scanned: usize },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// `None` walks without a depth limit
    pub max_depth: Option<usize>,
    /// Gitignore-style globs excluded from the walk
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            exclude: Vec::new(),
            respect_gitignore: true,
            follow_links: false,
        }
    }
}

/// Everything the scan produced, in lexical file order
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub declarations: Vec<TagDeclaration>,
    pub files_scanned: usize,
    pub roots: Vec<PathBuf>,
}

pub struct SourceScanner {
    include_paths: Vec<PathBuf>,
    strategy: Arc<dyn CommentStrategy>,
    config: ScanConfig,
    cancellation: CancellationFlag,
}

impl SourceScanner {
    pub fn new(include_paths: Vec<PathBuf>, strategy: Arc<dyn CommentStrategy>) -> Self {
        Self {
            include_paths,
            strategy,
            config: ScanConfig::default(),
            cancellation: CancellationFlag::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn scan(&self, diagnostics: &mut Diagnostics) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let roots = self.existing_roots(diagnostics)?;

        info!(
            language = %self.strategy.language(),
            roots = roots.len(),
            "Starting annotation scan"
        );

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for root in &roots {
            for file in self.collect_files(root, diagnostics)? {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }

        let mut declarations = Vec::new();
        let mut files_scanned = 0;
        for file in &files {
            if self.cancellation.is_cancelled() {
                warn!(files_scanned, "Scan cancelled");
                return Err(ScanError::Cancelled { files_scanned });
            }
            files_scanned += 1;
            self.scan_file(file, &mut declarations, diagnostics);
        }

        info!(
            files_scanned,
            declarations = declarations.len(),
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Annotation scan completed"
        );

        Ok(ScanOutcome {
            declarations,
            files_scanned,
            roots,
        })
    }

    /// An empty include set is allowed; a non-empty set where nothing exists is not.
    fn existing_roots(&self, diagnostics: &mut Diagnostics) -> Result<Vec<PathBuf>, ScanError> {
        let mut roots = Vec::new();
        for path in &self.include_paths {
            if path.exists() {
                roots.push(path.clone());
            } else {
                diagnostics.warn(
                    DiagnosticKind::MissingIncludePath,
                    None,
                    format!("include path does not exist: {}", path.display()),
                );
            }
        }

        if roots.is_empty() && !self.include_paths.is_empty() {
            return Err(ScanError::NoIncludePaths(self.include_paths.clone()));
        }
        Ok(roots)
    }

    fn collect_files(
        &self,
        root: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<PathBuf>, ScanError> {
        if root.is_file() {
            return Ok(if self.strategy.handles(root) {
                vec![root.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let mut override_builder = OverrideBuilder::new(root);
        for excluded in self.strategy.excluded_dirs() {
            override_builder
                .add(&format!("!{}/", excluded))
                .map_err(|source| ScanError::InvalidExclude {
                    pattern: excluded.to_string(),
                    source,
                })?;
        }
        for pattern in &self.config.exclude {
            override_builder
                .add(&format!("!{}", pattern))
                .map_err(|source| ScanError::InvalidExclude {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        let overrides = override_builder
            .build()
            .map_err(|source| ScanError::InvalidExclude {
                pattern: self.config.exclude.join(", "),
                source,
            })?;

        let mut files = Vec::new();
        for result in WalkBuilder::new(root)
            .max_depth(self.config.max_depth)
            .hidden(true)
            .git_ignore(self.config.respect_gitignore)
            .require_git(false)
            .follow_links(self.config.follow_links)
            .overrides(overrides)
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    let location = error_path(&err).map(|path| SourceLocation::new(path, 0));
                    diagnostics.warn(
                        DiagnosticKind::UnreadableFile,
                        location,
                        format!("failed to walk {}: {}", root.display(), err),
                    );
                    continue;
                }
            };

            let path = entry.path();
            // Symlinks are kept so a broken one surfaces as an unreadable file
            let is_candidate = entry
                .file_type()
                .map(|t| t.is_file() || t.is_symlink())
                .unwrap_or(false);
            if is_candidate && self.strategy.handles(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        debug!(root = %root.display(), files = files.len(), "Collected source files");
        Ok(files)
    }

    fn scan_file(
        &self,
        file: &Path,
        declarations: &mut Vec<TagDeclaration>,
        diagnostics: &mut Diagnostics,
    ) {
        let bytes = match std::fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                diagnostics.warn(
                    DiagnosticKind::UnreadableFile,
                    Some(SourceLocation::new(file, 0)),
                    format!("failed to read {}: {}", file.display(), e),
                );
                return;
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = content {
            debug!(file = %file.display(), "Replaced invalid UTF-8 sequences");
        }

        let before = declarations.len();
        for token in self.strategy.extract(&content) {
            match token {
                Ok(raw) => match grammar::parse_tag(raw, file) {
                    Ok(declaration) => declarations.push(declaration),
                    Err(e @ GrammarError::UnknownKey { .. }) => diagnostics.warn(
                        DiagnosticKind::UnknownKey,
                        Some(e.location().clone()),
                        e.to_string(),
                    ),
                    Err(e) => diagnostics.warn(
                        DiagnosticKind::MalformedTag,
                        Some(e.location().clone()),
                        e.to_string(),
                    ),
                },
                Err(malformed) => diagnostics.warn(
                    DiagnosticKind::MalformedTag,
                    Some(SourceLocation::new(file, malformed.line)),
                    format!("{}: '{}'", malformed.reason, malformed.text),
                ),
            }
        }

        let found = declarations.len() - before;
        if found > 0 {
            debug!(file = %file.display(), declarations = found, "Found annotations");
        }
    }
}

/// Path an ignore walk error refers to, if it carries one
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
