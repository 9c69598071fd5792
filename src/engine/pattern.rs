//! Structural patterns.
//!
//! A [`Pattern`] is a regex-compatible string made of literal separators and
//! placeholders:
//!
//! | placeholder    | matches            | human form |
//! |----------------|--------------------|------------|
//! | `(\p{L}+)`     | a letter run       | `L`        |
//! | `([a-zA-Z]+)`  | an ASCII letter run| `L`        |
//! | `([0-9]+)`     | a digit run        | `D`        |
//! | `(.*)`         | any tail           | `...`      |
//!
//! Patterns produced by the inducer always use `(\p{L}+)`; the ASCII spelling
//! is accepted because external rule services may emit it.
//!
//! Besides the string itself, this module knows how to:
//!
//! - parse a pattern into [`PatternPart`]s,
//! - render its human form (`L_D_L_D...`),
//! - build the *expanded* variant in which every literal character is its own
//!   capture group, so that executing it yields every run of the value,
//!   separators included.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LETTERS: &str = r"(\p{L}+)";
pub const ASCII_LETTERS: &str = "([a-zA-Z]+)";
pub const DIGITS: &str = "([0-9]+)";
pub const REST: &str = "(.*)";

/// Characters that must be escaped to stand for themselves outside a class.
const META: &[char] = &['\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$'];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Pattern(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> ParsedPattern {
        ParsedPattern::parse(&self.0)
    }

    /// Number of capture positions.
    pub fn capture_count(&self) -> usize {
        self.parse().capture_count()
    }

    pub fn is_truncated(&self) -> bool {
        self.parse().parts.iter().any(|p| matches!(p, PatternPart::Capture(Placeholder::Rest)))
    }

    /// Compile the pattern and its expanded variant.
    pub fn compile(&self) -> Result<CompiledPattern> {
        let parsed = self.parse();
        let regex = Regex::new(&self.0).map_err(|source| Error::Pattern { pattern: self.0.clone(), source })?;
        let expanded_src = parsed.expanded();
        let expanded =
            Regex::new(&expanded_src).map_err(|source| Error::Pattern { pattern: expanded_src.clone(), source })?;
        Ok(CompiledPattern { parsed, regex, expanded })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Letters,
    AsciiLetters,
    Digits,
    Rest,
}

impl Placeholder {
    pub fn source(self) -> &'static str {
        match self {
            Placeholder::Letters => LETTERS,
            Placeholder::AsciiLetters => ASCII_LETTERS,
            Placeholder::Digits => DIGITS,
            Placeholder::Rest => REST,
        }
    }

    pub fn human(self) -> &'static str {
        match self {
            Placeholder::Letters | Placeholder::AsciiLetters => "L",
            Placeholder::Digits => "D",
            Placeholder::Rest => "...",
        }
    }

    /// Text that this placeholder matches in the human form.
    ///
    /// `D` is not a digit, so digit placeholders are stood in for by `0` and
    /// mapped back with [`Placeholder::from_sample`].
    fn sample(self) -> &'static str {
        match self {
            Placeholder::Digits => "0",
            other => other.human(),
        }
    }

    fn from_sample(group: &str) -> &str {
        if group == "0" { "D" } else { group }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternPart {
    Capture(Placeholder),
    Literal(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPattern {
    pub anchored_start: bool,
    pub anchored_end: bool,
    pub parts: Vec<PatternPart>,
}

impl ParsedPattern {
    pub fn parse(src: &str) -> Self {
        let lexer = crate::regex!(r"\(\\p\{L\}\+\)|\(\[a-zA-Z\]\+\)|\(\[0-9\]\+\)|\(\.\*\)|\\(?s:.)|(?s:.)");

        let mut out = ParsedPattern::default();
        let lexemes: Vec<regex::Match<'_>> = lexer.find_iter(src).collect();
        let last = lexemes.len().saturating_sub(1);

        for (idx, m) in lexemes.iter().enumerate() {
            let part = match m.as_str() {
                "^" if idx == 0 => {
                    out.anchored_start = true;
                    continue;
                }
                "$" if idx == last => {
                    out.anchored_end = true;
                    continue;
                }
                LETTERS => PatternPart::Capture(Placeholder::Letters),
                ASCII_LETTERS => PatternPart::Capture(Placeholder::AsciiLetters),
                DIGITS => PatternPart::Capture(Placeholder::Digits),
                REST => PatternPart::Capture(Placeholder::Rest),
                lexeme => {
                    let mut chars = lexeme.chars();
                    let first = chars.next().unwrap_or_default();
                    match (first, chars.next()) {
                        ('\\', Some(escaped)) => PatternPart::Literal(escaped),
                        _ => PatternPart::Literal(first),
                    }
                }
            };
            out.parts.push(part);
        }

        out
    }

    pub fn capture_count(&self) -> usize {
        self.parts.iter().filter(|p| matches!(p, PatternPart::Capture(_))).count()
    }

    /// `L_D_L_D...`
    pub fn human_form(&self) -> String {
        self.render(Placeholder::human)
    }

    fn sample_text(&self) -> String {
        self.render(Placeholder::sample)
    }

    fn render(&self, placeholder: fn(Placeholder) -> &'static str) -> String {
        let mut s = String::new();
        for part in &self.parts {
            match part {
                PatternPart::Capture(p) => s.push_str(placeholder(*p)),
                PatternPart::Literal(c) => s.push(*c),
            }
        }
        s
    }

    /// Same pattern with every literal character wrapped in its own group.
    pub fn expanded(&self) -> String {
        let mut s = String::new();
        if self.anchored_start {
            s.push('^');
        }
        for part in &self.parts {
            match part {
                PatternPart::Capture(p) => s.push_str(p.source()),
                PatternPart::Literal(c) => {
                    s.push('(');
                    push_escaped(&mut s, *c);
                    s.push(')');
                }
            }
        }
        if self.anchored_end {
            s.push('$');
        }
        s
    }
}

/// A pattern compiled together with its expanded variant.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    parsed: ParsedPattern,
    regex: Regex,
    expanded: Regex,
}

impl CompiledPattern {
    pub fn parsed(&self) -> &ParsedPattern {
        &self.parsed
    }

    /// Captured groups of the pattern itself, without the whole-match group.
    ///
    /// `None` when the text does not match.
    pub fn groups(&self, text: &str) -> Option<Vec<String>> {
        captured(&self.regex, text)
    }

    /// Captured groups of the expanded variant: every run, separators included.
    pub fn expanded_groups(&self, text: &str) -> Option<Vec<String>> {
        captured(&self.expanded, text)
    }

    /// Human form used for display of the pattern itself.
    pub fn human_form(&self) -> String {
        self.parsed.human_form()
    }

    /// Groups of the human form, e.g. `["L", "D", "L", "D", "..."]`.
    pub fn human_groups(&self) -> Option<Vec<String>> {
        let sample = self.parsed.sample_text();
        self.groups(&sample).map(from_sample)
    }

    /// Expanded groups of the human form, e.g. `["L", "_", "D", "_", ...]`.
    pub fn human_expanded_groups(&self) -> Option<Vec<String>> {
        let sample = self.parsed.sample_text();
        self.expanded_groups(&sample).map(from_sample)
    }
}

fn from_sample(groups: Vec<String>) -> Vec<String> {
    groups.iter().map(|g| Placeholder::from_sample(g).to_string()).collect()
}

fn captured(re: &Regex, text: &str) -> Option<Vec<String>> {
    let caps = re.captures(text)?;
    Some(caps.iter().skip(1).map(|g| g.map(|m| m.as_str().to_string()).unwrap_or_default()).collect())
}

/// Append `literal` to a pattern under construction, escaping regex metacharacters.
pub fn push_literal(out: &mut String, literal: &str) {
    for c in literal.chars() {
        push_escaped(out, c);
    }
}

fn push_escaped(out: &mut String, c: char) {
    if META.contains(&c) {
        out.push('\\');
    }
    out.push(c);
}
