//! Rust comment strategy (`//`, `///`, `//!` and `/* */`)

use super::comments::{extract_tags, CommentSyntax, StringSyntax, TagMatcher};
use super::{CommentStrategy, SourceLanguage, TagTokens, DEFAULT_SENTINEL};

const SYNTAX: CommentSyntax = CommentSyntax {
    line_leaders: &["//"],
    block: Some(("/*", "*/")),
    decoration: &['/', '!', '*'],
    // `'` also opens lifetimes, so only a quote char literal is treated as a string
    strings: &[
        StringSyntax::raw("'\"'", ""),
        StringSyntax::raw("'\\\"'", ""),
        StringSyntax::raw("r##\"", "\"##"),
        StringSyntax::raw("r#\"", "\"#"),
        StringSyntax::raw("r\"", "\""),
        StringSyntax::quoted("\"").multiline(),
    ],
};

pub struct RustStrategy {
    matcher: TagMatcher,
}

impl RustStrategy {
    pub fn new(sentinel: &str) -> Self {
        Self {
            matcher: TagMatcher::new(sentinel),
        }
    }
}

impl Default for RustStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl CommentStrategy for RustStrategy {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Rust
    }

    fn extensions(&self) -> &[&str] {
        &["rs"]
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["target"]
    }

    fn extract<'a>(&'a self, content: &'a str) -> TagTokens<'a> {
        extract_tags(&SYNTAX, &self.matcher, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_and_inner_comments() {
        let source = "//! @sloth service payments\n\n/// @sloth name checkout-latency\n/// @sloth objective 99.5\nfn checkout() {}\n";
        let tags: Vec<_> = RustStrategy::default()
            .extract(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].key, "service");
        assert_eq!(tags[0].value, "payments");
        assert_eq!(tags[2].key, "objective");
        assert_eq!(tags[2].value, "99.5");
        assert_eq!(tags[2].line, 4);
    }

    #[test]
    fn test_malformed_tag_is_reported() {
        let source = "// @sloth.sli raw_query\n";
        let tokens: Vec<_> = RustStrategy::default().extract(source).collect();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_err());
    }

    #[test]
    fn test_block_doc_comment() {
        let source = "/**\n * @sloth.sli raw_query sum(rate(errors[{{.window}}]))\n */\n";
        let tags: Vec<_> = RustStrategy::default()
            .extract(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "sli.raw_query");
    }

    #[test]
    fn test_string_and_char_literals_hide_leaders() {
        let source = r###"const URL: &str = "http://a/*b"; // @sloth name literal-safe
let quote = '"'; // @sloth objective 99
let escaped = '\"'; let raw = r#"// "quoted" //"#; // @sloth service rusty
fn f<'a>(x: &'a str) {} // @sloth description lifetimes are not strings
"###;
        let tags: Vec<_> = RustStrategy::default()
            .extract(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let keys: Vec<&str> = tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "objective", "service", "description"]);
        assert_eq!(tags[0].value, "literal-safe");
        assert_eq!(tags[2].line, 3);
    }
}
