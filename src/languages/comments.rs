//! Comment tokenizing shared by every strategy
//!
//! A strategy only describes its comment syntax; walking lines, tracking block
//! comments, skipping string literals and recognizing `@<sentinel>` tags
//! happens here.

use super::{MalformedTag, RawTag, TagTokens};
use regex::Regex;
use std::collections::VecDeque;
use std::iter::Enumerate;
use std::str::Lines;

/// Comment syntax of one source language
#[derive(Debug)]
pub(crate) struct CommentSyntax {
    pub line_leaders: &'static [&'static str],
    pub block: Option<(&'static str, &'static str)>,
    /// Characters stripped from the start of comment text (`///`, ` * `, `;;;`)
    pub decoration: &'static [char],
    /// Literals whose contents never start a comment; longer openers first
    pub strings: &'static [StringSyntax],
}

/// One string literal form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringSyntax {
    pub open: &'static str,
    pub close: &'static str,
    /// Backslash escapes the next character
    pub escapes: bool,
    /// Stays open across line breaks
    pub multiline: bool,
}

impl StringSyntax {
    pub const fn quoted(quote: &'static str) -> Self {
        Self {
            open: quote,
            close: quote,
            escapes: true,
            multiline: false,
        }
    }

    pub const fn multiline(self) -> Self {
        Self {
            multiline: true,
            ..self
        }
    }

    pub const fn raw(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close,
            escapes: false,
            multiline: true,
        }
    }

    /// Byte offset just past the closing delimiter
    fn close_in(&self, text: &str) -> Option<usize> {
        if self.close.is_empty() {
            return Some(0);
        }
        let mut chars = text.char_indices();
        while let Some((pos, c)) = chars.next() {
            if text[pos..].starts_with(self.close) {
                return Some(pos + self.close.len());
            }
            if self.escapes && c == '\\' {
                chars.next();
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    Block,
    Str(StringSyntax),
}

/// Yields `(line_number, comment_text)` for every comment; a line may carry
/// several (`/* a */ x // b`).
pub(crate) struct CommentLines<'a> {
    syntax: &'a CommentSyntax,
    lines: Enumerate<Lines<'a>>,
    state: LexState,
    pending: VecDeque<(usize, &'a str)>,
}

impl<'a> CommentLines<'a> {
    pub fn new(syntax: &'a CommentSyntax, content: &'a str) -> Self {
        Self {
            syntax,
            lines: content.lines().enumerate(),
            state: LexState::Code,
            pending: VecDeque::new(),
        }
    }

    fn strip_decoration(&self, text: &'a str) -> &'a str {
        text.trim_start_matches(|c: char| c.is_whitespace() || self.syntax.decoration.contains(&c))
            .trim_end()
    }

    fn scan_line(&mut self, number: usize, line: &'a str) {
        let syntax = self.syntax;
        let mut pos = 0;
        while pos < line.len() {
            let rest = &line[pos..];
            match self.state {
                LexState::Block => {
                    let close = syntax.block.map_or("", |(_, close)| close);
                    match rest.find(close) {
                        Some(end) => {
                            self.push(number, &rest[..end]);
                            pos += end + close.len();
                            self.state = LexState::Code;
                        }
                        None => {
                            self.push(number, rest);
                            pos = line.len();
                        }
                    }
                }
                LexState::Str(string) => match string.close_in(rest) {
                    Some(end) => {
                        pos += end;
                        self.state = LexState::Code;
                    }
                    None => pos = line.len(),
                },
                LexState::Code => {
                    if let Some(leader) = syntax.line_leaders.iter().find(|l| rest.starts_with(**l)) {
                        self.push(number, &rest[leader.len()..]);
                        pos = line.len();
                    } else if let Some((open, _)) = syntax.block.filter(|(open, _)| rest.starts_with(*open)) {
                        pos += open.len();
                        self.state = LexState::Block;
                    } else if let Some(string) = syntax.strings.iter().find(|s| rest.starts_with(s.open)) {
                        pos += string.open.len();
                        self.state = LexState::Str(*string);
                    } else {
                        pos += rest.chars().next().map_or(1, char::len_utf8);
                    }
                }
            }
        }

        if let LexState::Str(string) = self.state {
            if !string.multiline {
                self.state = LexState::Code;
            }
        }
    }

    fn push(&mut self, number: usize, text: &'a str) {
        let text = self.strip_decoration(text);
        if !text.is_empty() {
            self.pending.push_back((number, text));
        }
    }
}

impl<'a> Iterator for CommentLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(comment) = self.pending.pop_front() {
                return Some(comment);
            }
            let (index, line) = self.lines.next()?;
            self.scan_line(index + 1, line);
        }
    }
}

/// Recognizes `@<sentinel>[.<namespace>] <key> <value>` in comment text;
/// `@<sentinel> <namespace>.<key> <value>` is the same tag.
#[derive(Debug, Clone)]
pub(crate) struct TagMatcher {
    sentinel: Regex,
    tag: Regex,
}

impl TagMatcher {
    pub fn new(sentinel: &str) -> Self {
        let escaped = regex::escape(sentinel);
        let sentinel = Regex::new(&format!(r"^@{}(?:[.\s]|$)", escaped))
            .expect("escaped sentinel regex is valid");
        let tag = Regex::new(&format!(
            r"^@{}(?:\.(?P<ns>[A-Za-z_][A-Za-z0-9_]*))?\s+(?P<field>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?)\s+(?P<value>\S.*)$",
            escaped
        ))
        .expect("escaped tag regex is valid");

        Self { sentinel, tag }
    }

    /// `None` when the text is not a tag at all, `Some(Err)` when it starts
    /// with the sentinel but cannot be tokenized.
    pub fn match_text(&self, text: &str, line: usize) -> Option<Result<RawTag, MalformedTag>> {
        if !self.sentinel.is_match(text) {
            return None;
        }

        let Some(caps) = self.tag.captures(text) else {
            return Some(Err(MalformedTag {
                line,
                text: text.to_string(),
                reason: "expected '<key> <value>' after the sentinel",
            }));
        };

        let field = &caps["field"];
        let key = match caps.name("ns") {
            Some(ns) => format!("{}.{}", ns.as_str(), field),
            None => field.to_string(),
        };

        Some(Ok(RawTag {
            key,
            value: caps["value"].trim().to_string(),
            line,
        }))
    }
}

pub(crate) fn extract_tags<'a>(
    syntax: &'a CommentSyntax,
    matcher: &'a TagMatcher,
    content: &'a str,
) -> TagTokens<'a> {
    Box::new(
        CommentLines::new(syntax, content)
            .filter_map(move |(line, text)| matcher.match_text(text, line)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLASHES: CommentSyntax = CommentSyntax {
        line_leaders: &["//"],
        block: Some(("/*", "*/")),
        decoration: &['/', '!', '*'],
        strings: &[StringSyntax::quoted("\""), StringSyntax::raw("`", "`")],
    };

    const HASHES: CommentSyntax = CommentSyntax {
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

    fn comments(content: &str) -> Vec<(usize, &str)> {
        CommentLines::new(&SLASHES, content).collect()
    }

    #[test]
    fn test_line_comments() {
        let found = comments("package main\n// hello\nx := 1 // trailing\n");
        assert_eq!(found, vec![(2, "hello"), (3, "trailing")]);
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let found = comments("/*\n * first\n * second */\ncode()\n");
        assert_eq!(found, vec![(2, "first"), (3, "second")]);
    }

    #[test]
    fn test_single_line_block_comment() {
        let found = comments("/* @sloth name x */ func()");
        assert_eq!(found, vec![(1, "@sloth name x")]);
    }

    #[test]
    fn test_doc_comment_decoration() {
        let found = comments("/// @sloth objective 99\n//! @sloth name inner\n");
        assert_eq!(found, vec![(1, "@sloth objective 99"), (2, "@sloth name inner")]);
    }

    #[test]
    fn test_text_after_block_close_is_scanned() {
        let found = comments("/* note */ // @sloth name foo\n/* a */ x /* b */\n");
        assert_eq!(
            found,
            vec![(1, "note"), (1, "@sloth name foo"), (2, "a"), (2, "b")]
        );
    }

    #[test]
    fn test_leaders_inside_strings_are_not_comments() {
        let found = comments(
            "x := \"http://a\" // @sloth name foo\ny := \"/* no */\" + `//raw` // tail\nz := \"esc \\\" // still string\" // real\n",
        );
        assert_eq!(found, vec![(1, "@sloth name foo"), (2, "tail"), (3, "real")]);
    }

    #[test]
    fn test_raw_string_spans_lines() {
        let found = comments("q := `\n// not a comment\n` // after\n");
        assert_eq!(found, vec![(3, "after")]);
    }

    #[test]
    fn test_unterminated_quote_ends_with_line() {
        let found = comments("s := \"open\n// next line\n");
        assert_eq!(found, vec![(2, "next line")]);
    }

    #[test]
    fn test_hash_inside_python_strings() {
        let found: Vec<_> = CommentLines::new(
            &HASHES,
            "u = \"a#b\"  # @sloth name foo\nv = 'c#d' # second\ndoc = \"\"\"\n# inside docstring\n\"\"\"  # after\n",
        )
        .collect();
        assert_eq!(found, vec![(1, "@sloth name foo"), (2, "second"), (5, "after")]);
    }

    #[test]
    fn test_extract_tags_after_string_literal() {
        let matcher = TagMatcher::new("sloth");
        let tags: Vec<_> = extract_tags(&SLASHES, &matcher, "x := \"http://a\" // @sloth name foo\n")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "name");
        assert_eq!(tags[0].value, "foo");
    }

    #[test]
    fn test_matcher_flat_and_namespaced_keys() {
        let matcher = TagMatcher::new("sloth");

        let flat = matcher.match_text("@sloth name chat-gpt", 4).unwrap().unwrap();
        assert_eq!(flat.key, "name");
        assert_eq!(flat.value, "chat-gpt");
        assert_eq!(flat.line, 4);

        let nested = matcher
            .match_text("@sloth.sli error_query sum(rate(x[{{.window}}]))  ", 5)
            .unwrap()
            .unwrap();
        assert_eq!(nested.key, "sli.error_query");
        assert_eq!(nested.value, "sum(rate(x[{{.window}}]))");
    }

    #[test]
    fn test_matcher_accepts_dotted_key() {
        let matcher = TagMatcher::new("sloth");

        let dotted = matcher
            .match_text("@sloth sli.error_query sum(rate(x[{{.window}}]))", 3)
            .unwrap()
            .unwrap();
        assert_eq!(dotted.key, "sli.error_query");
        assert_eq!(dotted.value, "sum(rate(x[{{.window}}]))");

        let alerting = matcher
            .match_text("@sloth alerting.name HighErrorRate", 4)
            .unwrap()
            .unwrap();
        assert_eq!(alerting.key, "alerting.name");
    }

    #[test]
    fn test_matcher_ignores_other_words() {
        let matcher = TagMatcher::new("sloth");
        assert!(matcher.match_text("@slothful name x", 1).is_none());
        assert!(matcher.match_text("just a comment", 1).is_none());
        assert!(matcher.match_text("@aloe name x", 1).is_none());
    }

    #[test]
    fn test_matcher_reports_malformed_tags() {
        let matcher = TagMatcher::new("sloth");
        for text in ["@sloth", "@sloth name", "@sloth.sli", "@sloth. name x", "@sloth sli. x"] {
            let result = matcher.match_text(text, 9).unwrap();
            let malformed = result.unwrap_err();
            assert_eq!(malformed.line, 9);
            assert_eq!(malformed.text, text);
        }
    }

    #[test]
    fn test_custom_sentinel_is_escaped() {
        let matcher = TagMatcher::new("slo.v2");
        assert!(matcher.match_text("@slo.v2 name x", 1).is_some());
        assert!(matcher.match_text("@sloXv2 name x", 1).is_none());
    }
}
