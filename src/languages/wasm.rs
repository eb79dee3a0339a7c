//! WebAssembly text format strategy (`;;` line and `(; ;)` block comments)

use super::comments::{extract_tags, CommentSyntax, StringSyntax, TagMatcher};
use super::{CommentStrategy, SourceLanguage, TagTokens, DEFAULT_SENTINEL};

const SYNTAX: CommentSyntax = CommentSyntax {
    line_leaders: &[";;"],
    block: Some(("(;", ";)")),
    decoration: &[';'],
    strings: &[StringSyntax::quoted("\"")],
};

pub struct WasmStrategy {
    matcher: TagMatcher,
}

impl WasmStrategy {
    pub fn new(sentinel: &str) -> Self {
        Self {
            matcher: TagMatcher::new(sentinel),
        }
    }
}

impl Default for WasmStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl CommentStrategy for WasmStrategy {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Wasm
    }

    fn extensions(&self) -> &[&str] {
        &["wat", "wast"]
    }

    fn extract<'a>(&'a self, content: &'a str) -> TagTokens<'a> {
        extract_tags(&SYNTAX, &self.matcher, content)
    }
}
