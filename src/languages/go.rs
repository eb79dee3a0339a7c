//! Go comment strategy

use super::comments::{extract_tags, CommentSyntax, StringSyntax, TagMatcher};
use super::{CommentStrategy, SourceLanguage, TagTokens, DEFAULT_SENTINEL};

const SYNTAX: CommentSyntax = CommentSyntax {
    line_leaders: &["//"],
    block: Some(("/*", "*/")),
    decoration: &['/', '*'],
    strings: &[
        StringSyntax::quoted("\""),
        StringSyntax::quoted("'"),
        StringSyntax::raw("`", "`"),
    ],
};

pub struct GoStrategy {
    matcher: TagMatcher,
}

impl GoStrategy {
    pub fn new(sentinel: &str) -> Self {
        Self {
            matcher: TagMatcher::new(sentinel),
        }
    }
}

impl Default for GoStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl CommentStrategy for GoStrategy {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Go
    }

    fn extensions(&self) -> &[&str] {
        &["go"]
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["vendor", "testdata"]
    }

    fn extract<'a>(&'a self, content: &'a str) -> TagTokens<'a> {
        extract_tags(&SYNTAX, &self.matcher, content)
    }
}
