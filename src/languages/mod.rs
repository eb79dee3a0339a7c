//! Comment extraction strategies, one per source language
//!
//! A [`CommentStrategy`] turns a file's content into a lazy stream of raw
//! `@sloth` tag tokens. Strategies know nothing about the tag vocabulary; that
//! belongs to [`crate::grammar`]. Adding a language means adding a strategy and
//! registering it in [`StrategyRegistry`].

mod comments;
mod go;
mod python;
mod registry;
mod rust;
mod wasm;

pub use go::GoStrategy;
pub use python::PythonStrategy;
pub use registry::StrategyRegistry;
pub use rust::RustStrategy;
pub use wasm::WasmStrategy;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Sentinel word used when none is configured
pub const DEFAULT_SENTINEL: &str = "sloth";

/// Source languages with a comment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Go,
    Rust,
    Python,
    Wasm,
}

impl SourceLanguage {
    pub fn all() -> &'static [SourceLanguage] {
        &[
            SourceLanguage::Go,
            SourceLanguage::Rust,
            SourceLanguage::Python,
            SourceLanguage::Wasm,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::Go => "go",
            SourceLanguage::Rust => "rust",
            SourceLanguage::Python => "python",
            SourceLanguage::Wasm => "wasm",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "go" | "golang" => Ok(SourceLanguage::Go),
            "rust" | "rs" => Ok(SourceLanguage::Rust),
            "python" | "py" => Ok(SourceLanguage::Python),
            "wasm" | "wat" => Ok(SourceLanguage::Wasm),
            other => Err(format!(
                "Unsupported language: {}. Valid options: go, rust, python, wasm",
                other
            )),
        }
    }
}

/// A tag token as found in a comment, before the vocabulary is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    /// Dotted key, e.g. `name` or `sli.error_query`
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// A comment that starts with the sentinel but has no parseable key/value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTag {
    pub line: usize,
    pub text: String,
    pub reason: &'static str,
}

pub type TagTokens<'a> = Box<dyn Iterator<Item = Result<RawTag, MalformedTag>> + 'a>;

/// Extracts raw tag tokens from the comments of one source language
pub trait CommentStrategy: Send + Sync {
    fn language(&self) -> SourceLanguage;

    /// File extensions this strategy reads
    fn extensions(&self) -> &[&str];

    /// Directories never worth descending into for this language
    fn excluded_dirs(&self) -> &[&str] {
        &[]
    }

    /// Lazily tokenizes tags in `content`. Calling it again on the same
    /// content yields the same sequence.
    fn extract<'a>(&'a self, content: &'a str) -> TagTokens<'a>;

    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions().contains(&ext))
            .unwrap_or(false)
    }
}
