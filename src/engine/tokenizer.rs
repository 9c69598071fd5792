//! Identifier tokenization.
//!
//! Splits a value into maximal runs of letters, digits and everything else
//! ("separators"). The runs are borrowed slices of the input, so joining them
//! back always reproduces the value exactly:
//!
//! ```text
//! "23-XF-12345"
//!  ├┘│├┘│└───┘
//!  D S L S  D
//! ```
//!
//! Classification uses the Unicode-aware `char::is_alphabetic` and
//! `char::is_numeric`, so non-ASCII letters are ordinary `Letter` runs.

use serde::{Deserialize, Serialize};

/// Character class of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    Letter,
    Digit,
    Separator,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        if c.is_alphabetic() {
            CharClass::Letter
        } else if c.is_numeric() {
            CharClass::Digit
        } else {
            CharClass::Separator
        }
    }

    /// Letters and digits can take part in a correspondence; separators cannot.
    pub fn is_meaningful(self) -> bool {
        !matches!(self, CharClass::Separator)
    }

    fn flag(self) -> ClassSet {
        match self {
            CharClass::Letter => ClassSet::LETTER,
            CharClass::Digit => ClassSet::DIGIT,
            CharClass::Separator => ClassSet::SEPARATOR,
        }
    }
}

bitflags::bitflags! {
    /// Classes present somewhere in a value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassSet: u8 {
        const LETTER    = 1 << 0;
        const DIGIT     = 1 << 1;
        const SEPARATOR = 1 << 2;
    }
}

impl ClassSet {
    pub const MEANINGFUL: ClassSet = ClassSet::LETTER.union(ClassSet::DIGIT);
}

/// One run of same-class characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub class: CharClass,
}

/// Ordered runs of a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedValue<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenizedValue<'a> {
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn groups(&self) -> Vec<&'a str> {
        self.tokens.iter().map(|t| t.text).collect()
    }

    pub fn classes(&self) -> Vec<CharClass> {
        self.tokens.iter().map(|t| t.class).collect()
    }

    pub fn class_set(&self) -> ClassSet {
        self.tokens.iter().fold(ClassSet::empty(), |acc, t| acc | t.class.flag())
    }

    /// Letter and digit runs, in order.
    pub fn meaningful(&self) -> impl Iterator<Item = &Token<'a>> {
        self.tokens.iter().filter(|t| t.class.is_meaningful())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a TokenizedValue<'a> {
    type Item = &'a Token<'a>;
    type IntoIter = std::slice::Iter<'a, Token<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Split `value` into maximal same-class runs.
pub fn tokenize(value: &str) -> TokenizedValue<'_> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (idx, c) in value.char_indices() {
        let class = CharClass::of(c);
        match current {
            Some(prev) if prev == class => {}
            Some(prev) => {
                tokens.push(Token { text: &value[start..idx], class: prev });
                start = idx;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }

    if let Some(class) = current {
        tokens.push(Token { text: &value[start..], class });
    }

    TokenizedValue { tokens }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_mixed_identifier() {
        let tv = tokenize("23-XF-12345");
        assert_eq!(tv.groups(), vec!["23", "-", "XF", "-", "12345"]);
        assert_eq!(
            tv.classes(),
            vec![CharClass::Digit, CharClass::Separator, CharClass::Letter, CharClass::Separator, CharClass::Digit]
        );
    }

    #[test]
    fn empty_value_has_no_tokens() {
        let tv = tokenize("");
        assert!(tv.is_empty());
        assert!(tv.groups().is_empty());
        assert!(tv.classes().is_empty());
        assert_eq!(tv.class_set(), ClassSet::empty());
    }

    #[test]
    fn unicode_letters_are_letters() {
        let tv = tokenize("Ærø_7");
        assert_eq!(tv.groups(), vec!["Ærø", "_", "7"]);
        assert_eq!(tv.classes()[0], CharClass::Letter);
    }

    #[test]
    fn separator_runs_merge() {
        let tv = tokenize("A::.B");
        assert_eq!(tv.groups(), vec!["A", "::.", "B"]);
        assert_eq!(tv.class_set(), ClassSet::LETTER | ClassSet::SEPARATOR);
        assert!(!tv.class_set().contains(ClassSet::DIGIT));
    }

    #[test]
    fn meaningful_skips_separators() {
        let tv = tokenize("VAL_23:x");
        let texts: Vec<&str> = tv.meaningful().map(|t| t.text).collect();
        assert_eq!(texts, vec!["VAL", "23", "x"]);
    }

    proptest! {
        #[test]
        fn groups_reproduce_value(s in "\\PC{0,40}") {
            let tv = tokenize(&s);
            prop_assert_eq!(tv.groups().concat(), s.clone());
            prop_assert_eq!(tv.groups().len(), tv.classes().len());
        }

        #[test]
        fn adjacent_groups_differ_in_class(s in "[a-zA-Z0-9_ .:/-]{0,40}") {
            let tv = tokenize(&s);
            for pair in tv.tokens().windows(2) {
                prop_assert_ne!(pair[0].class, pair[1].class);
            }
        }
    }
}
