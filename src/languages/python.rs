//! Python comment strategy

use super::comments::{extract_tags, CommentSyntax, StringSyntax, TagMatcher};
use super::{CommentStrategy, SourceLanguage, TagTokens, DEFAULT_SENTINEL};

const SYNTAX: CommentSyntax = CommentSyntax {
    line_leaders: &["#"],
    block: None,
    decoration: &['#'],
    strings: &[
        StringSyntax::quoted("\"\"\"").multiline(),
        StringSyntax::quoted("'''").multiline(),
        StringSyntax::quoted("\""),
        StringSyntax::quoted("'"),
    ],
};

pub struct PythonStrategy {
    matcher: TagMatcher,
}

impl PythonStrategy {
    pub fn new(sentinel: &str) -> Self {
        Self {
            matcher: TagMatcher::new(sentinel),
        }
    }
}

impl Default for PythonStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl CommentStrategy for PythonStrategy {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Python
    }

    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["__pycache__", "venv", ".venv", "site-packages"]
    }

    fn extract<'a>(&'a self, content: &'a str) -> TagTokens<'a> {
        extract_tags(&SYNTAX, &self.matcher, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_comments() {
        let source = "#!/usr/bin/env python\n# @sloth name ingest-freshness\n## @sloth objective 99\ndef ingest():\n    pass  # @sloth description trailing comment\n";
        let tags: Vec<_> = PythonStrategy::default()
            .extract(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let keys: Vec<&str> = tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "objective", "description"]);
        assert_eq!(tags[2].value, "trailing comment");
    }

    #[test]
    fn test_hash_inside_strings() {
        let source = "u = \"a#b\"  # @sloth name foo\nv = '#'  # @sloth objective 99\n\"\"\"\n# @sloth description docstring text\n\"\"\"\n";
        let tags: Vec<_> = PythonStrategy::default()
            .extract(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let keys: Vec<&str> = tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "objective"]);
        assert_eq!(tags[0].value, "foo");
    }

    #[test]
    fn test_slash_comments_are_ignored() {
        assert_eq!(
            PythonStrategy::default()
                .extract("// @sloth name x\n")
                .count(),
            0
        );
    }
}
