//! sloth-comments - Sloth SLO specifications from source code comments
//!
//! Service owners annotate code with `@sloth` comment tags; this crate scans a
//! source tree, groups the tags into SLO blocks, validates them and renders
//! Sloth specification documents.
//!
//! ```text
//! // @sloth service checkout
//! // @sloth name availability
//! // @sloth objective 99.9
//! // @sloth.sli error_query sum(rate(http_requests_total{code=~"5.."}[{{.window}}]))
//! // @sloth.sli total_query sum(rate(http_requests_total[{{.window}}]))
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use sloth_comments::{AnnotationPipeline, GeneratorConfig, OutputTarget, SpecFormat};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig::default();
//! let pipeline = AnnotationPipeline::from_config(&config, vec![PathBuf::from("./cmd")])?;
//! let outcome = pipeline.run(&[SpecFormat::PrometheusV1], &OutputTarget::Stdout)?;
//!
//! for diagnostic in outcome.output.diagnostics.entries() {
//!     eprintln!("warning: {}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`languages`]: comment strategies extracting raw tags per language
//! - [`grammar`]: tag vocabulary and declaration parsing
//! - [`scan`]: source tree walking
//! - [`builder`]: grouping declarations into validated SLO blocks
//! - [`output`]: Sloth document schemas and rendering
//! - [`pipeline`]: the end-to-end run

pub mod builder;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod grammar;
pub mod languages;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod util;
pub mod validation;

pub use builder::{BuildError, ServiceBuilder};
pub use config::{ConfigError, GeneratorConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, SourceLocation};
pub use grammar::{GrammarError, TagDeclaration, TagKey};
pub use languages::{CommentStrategy, SourceLanguage, StrategyRegistry};
pub use model::{Alerting, Service, Sli, SloBlock};
pub use output::{GenerateError, OutputTarget, RenderedSpec, SpecFormat, SpecGenerator};
pub use pipeline::{AnnotationPipeline, CompileOutput, GenerateOutcome, PipelineError};
pub use scan::{CancellationFlag, ScanConfig, ScanError, SourceScanner};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
