//! Rule induction from a single matched pair.
//!
//! The inducer looks for letter/digit runs whose literal text occurs in both
//! values and turns each of them into an `equals` condition between the
//! source and target capture positions:
//!
//! ```text
//! source: VAL _ 23 _ XF _ 12345 :foo.bar
//!          0    1    2    3     (don't care)
//! target: 23 - XF - 12345
//!          0    1    2
//!
//! pattern(source) = ^(\p{L}+)_([0-9]+)_(\p{L}+)_([0-9]+)(.*)$
//! pattern(target) = ^([0-9]+)-(\p{L}+)-([0-9]+)$
//! conditions      = [0:1 = 1:0], [0:2 = 1:1], [0:3 = 1:2]
//! ```
//!
//! The source pattern is truncated with `(.*)` as soon as every shared run has
//! been seen, so values that only differ in their tail induce the same rule.
//!
//! The target side of a condition is the run's index in the correspondence
//! index (shared runs only, numbered in target order), not its capture
//! position. The two agree whenever every target run is shared.
//!
//! Only the first occurrence of a repeated run is tracked on either side.

use super::pattern::{DIGITS, LETTERS, Pattern, REST, push_literal};
use super::tokenizer::{CharClass, ClassSet, TokenizedValue, tokenize};
use crate::{Condition, EntitySet, Extractor, Rule};
use std::collections::{HashMap, HashSet};

/// Induce the rule explaining why `source_value` matched `target_value`.
pub fn induce_rule(source_field: &str, source_value: &str, target_field: &str, target_value: &str) -> Rule {
    let source = tokenize(source_value);
    let target = tokenize(target_value);

    let shared = shared_runs(&source, &target);
    let (source_pattern, links) = source_pattern(&source, &shared);
    let target_pattern = full_pattern(&target);

    let mut conditions: Vec<Condition> =
        links.into_iter().map(|(source_pos, target_pos)| Condition::equals(source_pos, target_pos)).collect();
    conditions.sort_by_key(Condition::source_position);

    tracing::trace!(
        source = source_value,
        target = target_value,
        %source_pattern,
        %target_pattern,
        conditions = conditions.len(),
        "induced rule"
    );

    Rule {
        priority: 0,
        conditions,
        extractors: [
            Extractor::new(EntitySet::Sources, source_field, source_pattern),
            Extractor::new(EntitySet::Targets, target_field, target_pattern),
        ],
    }
}

/// Correspondence index: target runs whose text also occurs in the source,
/// numbered 0, 1, 2, ... in order of first appearance in the target.
///
/// The number counts qualifying runs only, so it is not the target capture
/// position when an unshared run comes first (`AREA-7` numbers `7` as 0).
fn shared_runs<'a>(source: &TokenizedValue<'a>, target: &TokenizedValue<'a>) -> HashMap<&'a str, usize> {
    let mut shared = HashMap::new();
    if !source.class_set().intersects(ClassSet::MEANINGFUL) || !target.class_set().intersects(ClassSet::MEANINGFUL) {
        return shared;
    }

    let source_texts: HashSet<&str> = source.meaningful().map(|t| t.text).collect();

    for token in target.meaningful() {
        if source_texts.contains(token.text) && !shared.contains_key(token.text) {
            let next = shared.len();
            shared.insert(token.text, next);
        }
    }

    shared
}

/// Source pattern plus `(source_pos, target_pos)` links in discovery order.
fn source_pattern(source: &TokenizedValue<'_>, shared: &HashMap<&str, usize>) -> (Pattern, Vec<(usize, usize)>) {
    let mut pattern = String::from("^");
    let mut links: Vec<(usize, usize)> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut capture_pos = 0;
    let mut truncated = false;

    for token in source {
        match token.class {
            CharClass::Separator => {
                push_literal(&mut pattern, token.text);
                continue;
            }
            CharClass::Letter => pattern.push_str(LETTERS),
            CharClass::Digit => pattern.push_str(DIGITS),
        }

        if let Some(&target_pos) = shared.get(token.text) {
            if seen.insert(token.text) {
                links.push((capture_pos, target_pos));
            }
        }
        capture_pos += 1;

        if !shared.is_empty() && seen.len() == shared.len() {
            pattern.push_str(REST);
            truncated = true;
            break;
        }
    }

    tracing::trace!(truncated, captures = capture_pos, "source pattern built");
    pattern.push('$');
    (Pattern::new(pattern), links)
}

fn full_pattern(value: &TokenizedValue<'_>) -> Pattern {
    let mut pattern = String::from("^");
    for token in value {
        match token.class {
            CharClass::Separator => push_literal(&mut pattern, token.text),
            CharClass::Letter => pattern.push_str(LETTERS),
            CharClass::Digit => pattern.push_str(DIGITS),
        }
    }
    pattern.push('$');
    Pattern::new(pattern)
}
