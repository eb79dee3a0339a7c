//! End-to-end annotation pipeline
//!
//! Scan -> parse -> build -> render -> write, run synchronously in one pass.
//! Warnings accumulate in a [`Diagnostics`] sink; fatal conditions surface as
//! [`PipelineError`].

use crate::builder::{BuildError, ServiceBuilder};
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostics;
use crate::languages::{CommentStrategy, SourceLanguage, StrategyRegistry};
use crate::model::Service;
use crate::output::{GenerateError, OutputTarget, SpecFormat, SpecGenerator};
use crate::scan::{CancellationFlag, ScanConfig, ScanError, SourceScanner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no comment strategy registered for language '{0}'")]
    UnsupportedLanguage(SourceLanguage),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("generation cancelled before output was written")]
    Cancelled,
}

/// Result of a successful compile: the service plus every warning raised
#[derive(Debug)]
pub struct CompileOutput {
    pub service: Service,
    pub diagnostics: Diagnostics,
    pub files_scanned: usize,
}

#[derive(Debug)]
pub struct GenerateOutcome {
    pub output: CompileOutput,
    /// Files written; empty when writing to standard output
    pub written: Vec<PathBuf>,
}

pub struct AnnotationPipeline {
    strategy: Arc<dyn CommentStrategy>,
    include_paths: Vec<PathBuf>,
    scan_config: ScanConfig,
    service_name: Option<String>,
    cancellation: CancellationFlag,
}

impl AnnotationPipeline {
    pub fn new(include_paths: Vec<PathBuf>, strategy: Arc<dyn CommentStrategy>) -> Self {
        Self {
            strategy,
            include_paths,
            scan_config: ScanConfig::default(),
            service_name: None,
            cancellation: CancellationFlag::default(),
        }
    }

    /// Resolves the strategy for the configured language and sentinel
    pub fn from_config(
        config: &GeneratorConfig,
        include_paths: Vec<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let registry = StrategyRegistry::with_sentinel(&config.sentinel);
        let strategy = registry
            .get(config.language)
            .ok_or(PipelineError::UnsupportedLanguage(config.language))?;

        let scan_config = ScanConfig {
            max_depth: config.max_depth,
            exclude: config.exclude.clone(),
            ..Default::default()
        };

        Ok(Self::new(include_paths, strategy).with_scan_config(scan_config))
    }

    pub fn with_scan_config(mut self, scan_config: ScanConfig) -> Self {
        self.scan_config = scan_config;
        self
    }

    /// Overrides the default service name; a `service` tag still wins
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn compile(&self) -> Result<CompileOutput, PipelineError> {
        let start = Instant::now();
        let mut diagnostics = Diagnostics::new();

        let scan = SourceScanner::new(self.include_paths.clone(), Arc::clone(&self.strategy))
            .with_config(self.scan_config.clone())
            .with_cancellation(self.cancellation.clone())
            .scan(&mut diagnostics)?;

        let default_name = self
            .service_name
            .clone()
            .unwrap_or_else(|| default_service_name(&scan.roots));
        debug!(default_service = %default_name, "Resolved default service name");

        let service = ServiceBuilder::new(default_name).build(scan.declarations, &mut diagnostics)?;

        info!(
            service = %service.name(),
            slos = service.slos().len(),
            warnings = diagnostics.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Compiled annotations"
        );

        Ok(CompileOutput {
            service,
            diagnostics,
            files_scanned: scan.files_scanned,
        })
    }

    /// Compiles, renders every format and writes them to `target`
    pub fn run(
        &self,
        formats: &[SpecFormat],
        target: &OutputTarget,
    ) -> Result<GenerateOutcome, PipelineError> {
        let output = self.compile()?;

        if self.cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let written = SpecGenerator::new().write(&output.service, formats, target)?;
        Ok(GenerateOutcome { output, written })
    }
}

/// Directory name of the first include root; files use their parent
/// directory. Empty when nothing usable exists, leaving the builder fallback.
pub fn default_service_name(roots: &[PathBuf]) -> String {
    roots
        .first()
        .and_then(|root| {
            let resolved = root.canonicalize().unwrap_or_else(|_| root.clone());
            let dir: &Path = if resolved.is_file() {
                resolved.parent()?
            } else {
                &resolved
            };
            dir.file_name().map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::languages::GoStrategy;
    use std::fs;
    use tempfile::TempDir;

    fn create_service_tree(name: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("main.go"),
            r#"package main

// @sloth name availability
// @sloth objective 99.5
// @sloth.sli error_query sum(rate(http_requests_total{code=~"5.."}[{{.window}}]))
// @sloth.sli total_query sum(rate(http_requests_total[{{.window}}]))
func main() {}
"#,
        )
        .unwrap();
        (dir, root)
    }

    #[test]
    fn test_compile_uses_root_dir_name() {
        let (_dir, root) = create_service_tree("checkout");
        let output = AnnotationPipeline::new(vec![root], Arc::new(GoStrategy::default()))
            .compile()
            .unwrap();

        assert_eq!(output.service.name(), "checkout");
        assert_eq!(output.service.slos().len(), 1);
        assert_eq!(output.files_scanned, 1);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_service_name_override() {
        let (_dir, root) = create_service_tree("checkout");
        let output = AnnotationPipeline::new(vec![root], Arc::new(GoStrategy::default()))
            .with_service_name("payments")
            .compile()
            .unwrap();

        assert_eq!(output.service.name(), "payments");
    }

    #[test]
    fn test_from_config_uses_sentinel() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.go"),
            "// @slo name latency\n// @slo objective 99\n// @slo.sli raw_query ratio\n",
        )
        .unwrap();

        let config = GeneratorConfig {
            sentinel: "slo".to_string(),
            ..Default::default()
        };
        let output = AnnotationPipeline::from_config(&config, vec![dir.path().to_path_buf()])
            .unwrap()
            .compile()
            .unwrap();

        assert!(output.service.slo("latency").is_some());
    }

    #[test]
    fn test_run_writes_all_formats() {
        let (dir, root) = create_service_tree("checkout");
        let out = dir.path().join("out");

        let outcome = AnnotationPipeline::new(vec![root], Arc::new(GoStrategy::default()))
            .run(SpecFormat::all(), &OutputTarget::Directory(out.clone()))
            .unwrap();

        assert_eq!(outcome.written.len(), 2);
        assert!(out.join("checkout.prometheus.yaml").exists());
        assert!(out.join("checkout.kubernetes.yaml").exists());
    }

    #[test]
    fn test_no_valid_slos_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.go"), "// @sloth name broken\n").unwrap();
        let out = dir.path().join("out");

        let err = AnnotationPipeline::new(
            vec![dir.path().to_path_buf()],
            Arc::new(GoStrategy::default()),
        )
        .run(SpecFormat::all(), &OutputTarget::Directory(out.clone()))
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Build(BuildError::NoValidSlos { dropped: 1 })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_cancelled_pipeline_fails() {
        let (_dir, root) = create_service_tree("checkout");
        let cancellation = CancellationFlag::new();
        cancellation.cancel();

        let err = AnnotationPipeline::new(vec![root], Arc::new(GoStrategy::default()))
            .with_cancellation(cancellation)
            .compile()
            .unwrap_err();
        assert!(matches!(err, PipelineError::Scan(ScanError::Cancelled { .. })));
    }

    #[test]
    fn test_missing_root_warns_but_compiles() {
        let (dir, root) = create_service_tree("checkout");
        let output = AnnotationPipeline::new(
            vec![dir.path().join("missing"), root],
            Arc::new(GoStrategy::default()),
        )
        .compile()
        .unwrap();

        assert_eq!(output.diagnostics.count(DiagnosticKind::MissingIncludePath), 1);
        assert_eq!(output.service.name(), "checkout");
    }

    #[test]
    fn test_default_service_name() {
        let (_dir, root) = create_service_tree("billing");
        assert_eq!(default_service_name(&[root.clone()]), "billing");
        assert_eq!(default_service_name(&[root.join("main.go")]), "billing");
        assert_eq!(default_service_name(&[]), "");
    }
}
