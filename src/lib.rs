extern crate self as rulelink;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;

pub use api::{
    applied_rules_from_json, color_applied_rule, color_applied_rules, color_rule,
    generate_applied_rules, induce_rule, predictions_from_json, sort_by_match_count, to_json_pretty,
};
pub use engine::{
    CharClass, ClassSet, ColoredExtractor, ColoredMatch, ColoredRecord, ColoredRule, CompiledPattern, FieldDisplay,
    Palette, ParsedPattern, Pattern, PatternPart, Placeholder, Swatch, Token, TokenizedValue, tokenize,
};
pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// --- Contract types ---------------------------------------------------------
//
// These mirror the JSON shapes exchanged with the matching service and the
// external rule services; field names are camelCase on the wire.

/// Which collection an extractor reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitySet {
    Sources,
    Targets,
}

impl fmt::Display for EntitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntitySet::Sources => "sources",
            EntitySet::Targets => "targets",
        })
    }
}

/// Pulls `field` out of one side of a match and shapes it with `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extractor {
    pub entity_set: EntitySet,
    pub field: String,
    pub pattern: Pattern,
    /// Only ever `"regex"`; carried through when an external service sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor_type: Option<String>,
}

impl Extractor {
    pub fn new(entity_set: EntitySet, field: impl Into<String>, pattern: Pattern) -> Self {
        Extractor { entity_set, field: field.into(), pattern, extractor_type: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Equals,
    Other(String),
}

impl From<String> for ConditionKind {
    fn from(s: String) -> Self {
        if s == "equals" { ConditionKind::Equals } else { ConditionKind::Other(s) }
    }
}

impl Serialize for ConditionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ConditionKind::Equals => serializer.serialize_str("equals"),
            ConditionKind::Other(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for ConditionKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(ConditionKind::from)
    }
}

/// `[extractor_index, capture_position]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionArgument(pub usize, pub usize);

impl ConditionArgument {
    /// Index into the rule's extractor list (not the entity set).
    pub fn extractor(self) -> usize {
        self.0
    }

    pub fn position(self) -> usize {
        self.1
    }
}

/// Correspondence between capture positions of the rule's extractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(alias = "conditionType")]
    pub kind: ConditionKind,
    pub arguments: Vec<ConditionArgument>,
}

impl Condition {
    pub fn equals(source_position: usize, target_position: usize) -> Self {
        Condition {
            kind: ConditionKind::Equals,
            arguments: vec![ConditionArgument(0, source_position), ConditionArgument(1, target_position)],
        }
    }

    pub fn is_equals(&self) -> bool {
        self.kind == ConditionKind::Equals
    }

    pub fn position_for(&self, extractor: usize) -> Option<usize> {
        self.arguments.iter().find(|a| a.extractor() == extractor).map(|a| a.position())
    }

    pub fn source_position(&self) -> usize {
        self.position_for(0).unwrap_or_default()
    }

    pub fn target_position(&self) -> usize {
        self.position_for(1).unwrap_or_default()
    }
}

/// A source extractor, a target extractor, and the conditions linking them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub extractors: [Extractor; 2],
}

impl Rule {
    pub fn extractor(&self, entity_set: EntitySet) -> Option<&Extractor> {
        self.extractors.iter().find(|e| e.entity_set == entity_set)
    }

    pub fn source(&self) -> &Extractor {
        self.extractor(EntitySet::Sources).unwrap_or(&self.extractors[0])
    }

    pub fn target(&self) -> &Extractor {
        self.extractor(EntitySet::Targets).unwrap_or(&self.extractors[1])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// One record (asset, time series, ...) with arbitrary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Record { id: id.into(), fields: Map::new() }
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// The field as text, if present and a string.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// One scored prediction from the matching service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub score: f64,
    pub source: Record,
    pub target: Record,
}

impl Match {
    pub fn new(score: f64, source: Record, target: Record) -> Self {
        Match { score, source, target }
    }

    pub fn record(&self, entity_set: EntitySet) -> &Record {
        match entity_set {
            EntitySet::Sources => &self.source,
            EntitySet::Targets => &self.target,
        }
    }
}

/// A rule with every match grouped under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    pub rule: Rule,
    pub matches: Vec<Match>,
    pub number_of_matches: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

/// Which source field is compared with which target field.
///
/// Mappings missing either side are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        FieldMapping { source: Some(source.into()), target: Some(target.into()) }
    }

    /// `(source, target)` when both sides are set.
    pub fn fields(&self) -> Option<(&str, &str)> {
        Some((self.source.as_deref()?, self.target.as_deref()?))
    }
}

// --- Display fragments ------------------------------------------------------

/// A piece of rendered text: plain, or linked to a condition by colour index.
///
/// On the wire a plain fragment is a bare string and a linked one is
/// `{"colorIndex": n, "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    Plain(String),
    Linked {
        #[serde(rename = "colorIndex")]
        color_index: usize,
        text: String,
    },
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Fragment::Plain(text.into())
    }

    pub fn linked(color_index: usize, text: impl Into<String>) -> Self {
        Fragment::Linked { color_index, text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Fragment::Plain(text) | Fragment::Linked { text, .. } => text,
        }
    }

    pub fn color_index(&self) -> Option<usize> {
        match self {
            Fragment::Plain(_) => None,
            Fragment::Linked { color_index, .. } => Some(*color_index),
        }
    }

    /// Join fragments back into the literal text.
    pub fn concat(fragments: &[Fragment]) -> String {
        fragments.iter().map(Fragment::text).collect()
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::plain(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Plain(text)
    }
}

impl From<(usize, &str)> for Fragment {
    fn from((color_index, text): (usize, &str)) -> Self {
        Fragment::linked(color_index, text)
    }
}
