//! Rule induction and explanation engine.
//!
//! The engine answers one question for an entity-matching UI: *why did these
//! two records match?* It works on plain values and patterns, with no I/O, and
//! is split into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! predictions ──┐
//! field mapping ┴─ generate_applied_rules      (aggregate.rs)
//!                    - induce_rule per mapped pair  (inducer.rs)
//!                        - tokenize both values     (tokenizer.rs)
//!                        - shared runs -> conditions
//!                        - build source/target patterns (pattern.rs)
//!                    - group identical rules
//!                               │
//!                               v
//!                       Vec<AppliedRule>
//!                               │
//!                  color_rule / color_applied_rule (highlight.rs)
//!                    - compile each extractor once
//!                    - split values and patterns into groups
//!                    - tag linked groups with a colour index
//!                    - reinsert separators           (align.rs)
//!                               │
//!                               v
//!                         ColoredRule
//! ```
//!
//! Rules coming from external services skip the first half and go straight to
//! the colouring step; they must only use the placeholders `pattern.rs`
//! understands.
//!
//! ## Responsibilities by module
//!
//! - `tokenizer.rs`: splits a value into maximal letter, digit and separator runs.
//! - `pattern.rs`: the pattern language, its human form and expanded variant.
//! - `inducer.rs`: builds a [`crate::Rule`] from one matched pair.
//! - `aggregate.rs`: groups predictions under their induced rules.
//! - `align.rs`: puts processed groups back among all runs of a value.
//! - `highlight.rs`: produces coloured fragments for patterns and matches.
//! - `palette.rs`: maps colour indices onto display swatches.
//!
//! ## Debugging
//!
//! Every degradation (non-matching value, broken pattern, out-of-range
//! condition) is logged at `debug`; per-group decisions at `trace`. Run the
//! binary with `RUST_LOG=rulelink=trace` to see them.

#[path = "engine/aggregate.rs"]
mod aggregate;
#[path = "engine/align.rs"]
mod align;
#[path = "engine/highlight.rs"]
mod highlight;
#[path = "engine/inducer.rs"]
mod inducer;
#[path = "engine/palette.rs"]
mod palette;
#[path = "engine/pattern.rs"]
mod pattern;
#[path = "engine/tokenizer.rs"]
mod tokenizer;

pub(crate) use aggregate::{generate_applied_rules, sort_by_match_count};
pub use highlight::{ColoredExtractor, ColoredMatch, ColoredRecord, ColoredRule, FieldDisplay};
pub(crate) use highlight::{color_applied_rule, color_rule};
pub(crate) use inducer::induce_rule;
pub use palette::{Palette, Swatch};
pub use pattern::{CompiledPattern, ParsedPattern, Pattern, PatternPart, Placeholder};
pub use tokenizer::{CharClass, ClassSet, Token, TokenizedValue, tokenize};
