//! Highlight reconstruction.
//!
//! Turns a [`Rule`] (induced here or supplied by an external service) and its
//! matches into display fragments. Every `equals` condition gets a colour
//! index, its ordinal among the rule's `equals` conditions, and the runs it
//! links on both sides are tagged with that index:
//!
//! ```text
//! condition 0: [0:1 = 1:0]   condition 1: [0:2 = 1:1]
//!
//! pattern  L _ D⁰ _ L¹ _ D ...      D⁰ - L¹ - D
//! match    VAL _ 23⁰ _ XF¹ _ 12345 :foo.bar
//!                                   23⁰ - XF¹ - 12345
//! ```
//!
//! Two paths share the alignment step in `align.rs`:
//!
//! - **patterns**: the human form of each extractor's pattern is split into
//!   groups and coloured;
//! - **matches**: each field value is split by its extractor's pattern, the
//!   linked groups are coloured through an accumulator keyed by
//!   `(entity set, field)`, and separators are reinserted once per field.
//!
//! Nothing here fails. A missing or non-string value, a pattern that does not
//! compile or match, or a condition pointing past the last group leaves the
//! value as its plain literal. A condition naming a missing extractor is
//! skipped.

use super::align::reinsert;
use super::pattern::CompiledPattern;
use crate::{AppliedRule, Condition, EntitySet, Extractor, Fragment, Match, Record, RecordId, Rule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// --- Output shapes ----------------------------------------------------------

/// An extractor whose pattern is rendered as fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoredExtractor {
    pub entity_set: EntitySet,
    pub field: String,
    pub pattern: Vec<Fragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor_type: Option<String>,
}

/// A record field after reconstruction: fragments when decorated, the original value otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDisplay {
    Fragments(Vec<Fragment>),
    Value(Value),
}

impl FieldDisplay {
    pub fn fragments(&self) -> Option<&[Fragment]> {
        match self {
            FieldDisplay::Fragments(fragments) => Some(fragments),
            FieldDisplay::Value(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldDisplay>,
}

impl ColoredRecord {
    fn plain(record: &Record) -> Self {
        ColoredRecord {
            id: record.id.clone(),
            fields: record.fields.iter().map(|(k, v)| (k.clone(), FieldDisplay::Value(v.clone()))).collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDisplay> {
        self.fields.get(name)
    }

    /// Fragments of a decorated field.
    pub fn fragments(&self, name: &str) -> Option<&[Fragment]> {
        self.field(name).and_then(FieldDisplay::fragments)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredMatch {
    pub score: f64,
    pub source: ColoredRecord,
    pub target: ColoredRecord,
}

impl ColoredMatch {
    pub fn record(&self, entity_set: EntitySet) -> &ColoredRecord {
        match entity_set {
            EntitySet::Sources => &self.source,
            EntitySet::Targets => &self.target,
        }
    }

    fn record_mut(&mut self, entity_set: EntitySet) -> &mut ColoredRecord {
        match entity_set {
            EntitySet::Sources => &mut self.source,
            EntitySet::Targets => &mut self.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoredRule {
    pub priority: i64,
    pub conditions: Vec<Condition>,
    pub extractors: Vec<ColoredExtractor>,
    pub matches: Vec<ColoredMatch>,
    pub number_of_matches: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

// --- Reconstruction ---------------------------------------------------------

/// One side of an `equals` condition, tagged with the condition's colour.
#[derive(Debug, Clone, Copy)]
struct Link {
    color_index: usize,
    extractor: usize,
    position: usize,
}

fn links(rule: &Rule) -> Vec<Link> {
    rule.conditions
        .iter()
        .filter(|c| c.is_equals())
        .enumerate()
        .flat_map(|(color_index, condition)| {
            condition.arguments.iter().map(move |arg| Link {
                color_index,
                extractor: arg.extractor(),
                position: arg.position(),
            })
        })
        .collect()
}

/// Colour a rule's patterns and every given match.
pub fn color_rule(rule: &Rule, matches: &[Match]) -> ColoredRule {
    let span = tracing::debug_span!("color_rule", conditions = rule.conditions.len(), matches = matches.len());
    let _guard = span.enter();

    let links = links(rule);
    let compiled: Vec<Option<CompiledPattern>> = rule.extractors.iter().map(compile).collect();

    ColoredRule {
        priority: rule.priority,
        conditions: rule.conditions.clone(),
        extractors: color_patterns(rule, &compiled, &links),
        matches: matches.iter().map(|m| color_groups(rule, &compiled, &links, m)).collect(),
        number_of_matches: matches.len(),
        average_score: None,
    }
}

/// Colour an applied rule, keeping its match count and average score.
pub fn color_applied_rule(applied: &AppliedRule) -> ColoredRule {
    ColoredRule {
        number_of_matches: applied.number_of_matches,
        average_score: applied.average_score,
        ..color_rule(&applied.rule, &applied.matches)
    }
}

fn compile(extractor: &Extractor) -> Option<CompiledPattern> {
    match extractor.pattern.compile() {
        Ok(compiled) => Some(compiled),
        Err(err) => {
            tracing::debug!(field = %extractor.field, %err, "pattern left unhighlighted");
            None
        }
    }
}

/// Split groups whose entries are tagged by the links that point at them.
#[derive(Debug, Clone)]
struct Decomposition {
    texts: Vec<String>,
    fragments: Vec<Fragment>,
    expanded: Vec<String>,
}

impl Decomposition {
    fn new(texts: Vec<String>, expanded: Vec<String>) -> Self {
        let fragments = texts.iter().map(|t| Fragment::plain(t.as_str())).collect();
        Decomposition { texts, fragments, expanded }
    }

    /// `false` when `position` is not a group of this value.
    fn link(&mut self, position: usize, color_index: usize) -> bool {
        match self.fragments.get(position) {
            Some(Fragment::Plain(_)) => {
                self.fragments[position] = Fragment::linked(color_index, self.texts[position].as_str());
            }
            Some(Fragment::Linked { .. }) => {
                tracing::trace!(position, color_index, "group already linked");
            }
            None => {
                tracing::debug!(position, groups = self.fragments.len(), "condition position out of range");
                return false;
            }
        }
        true
    }

    fn finish(self) -> Vec<Fragment> {
        reinsert(&self.texts, &self.fragments, &self.expanded)
    }
}

/// Pattern-level reconstruction for every extractor.
fn color_patterns(rule: &Rule, compiled: &[Option<CompiledPattern>], links: &[Link]) -> Vec<ColoredExtractor> {
    rule.extractors
        .iter()
        .enumerate()
        .map(|(idx, extractor)| {
            let human = extractor.pattern.parse().human_form();
            let decomposition = compiled[idx]
                .as_ref()
                .and_then(|c| Some(Decomposition::new(c.human_groups()?, c.human_expanded_groups()?)));

            let linked = decomposition.and_then(|mut decomposition| {
                links
                    .iter()
                    .filter(|l| l.extractor == idx)
                    .all(|l| decomposition.link(l.position, l.color_index))
                    .then_some(decomposition)
            });

            let pattern = match linked {
                Some(decomposition) => decomposition.finish(),
                None if human.is_empty() => Vec::new(),
                None => {
                    tracing::debug!(field = %extractor.field, pattern = %extractor.pattern, "pattern shown unlinked");
                    vec![Fragment::Plain(human)]
                }
            };

            ColoredExtractor {
                entity_set: extractor.entity_set,
                field: extractor.field.clone(),
                pattern,
                extractor_type: extractor.extractor_type.clone(),
            }
        })
        .collect()
}

/// Match-level reconstruction for a single match.
fn color_groups(rule: &Rule, compiled: &[Option<CompiledPattern>], links: &[Link], m: &Match) -> ColoredMatch {
    let accumulated: BTreeMap<(EntitySet, String), Option<Decomposition>> =
        links.iter().fold(BTreeMap::new(), |mut acc, link| {
            let Some(extractor) = rule.extractors.get(link.extractor) else {
                tracing::debug!(extractor = link.extractor, "condition references a missing extractor");
                return acc;
            };
            let key = (extractor.entity_set, extractor.field.clone());
            let entry = acc.entry(key).or_insert_with(|| split_field(m, extractor, compiled[link.extractor].as_ref()));
            if entry.as_mut().is_some_and(|d| !d.link(link.position, link.color_index)) {
                *entry = None;
            }
            acc
        });

    let mut colored =
        ColoredMatch { score: m.score, source: ColoredRecord::plain(&m.source), target: ColoredRecord::plain(&m.target) };

    for ((entity_set, field), decomposition) in accumulated {
        if let Some(decomposition) = decomposition {
            colored.record_mut(entity_set).fields.insert(field, FieldDisplay::Fragments(decomposition.finish()));
        }
    }

    colored
}

fn split_field(m: &Match, extractor: &Extractor, compiled: Option<&CompiledPattern>) -> Option<Decomposition> {
    let Some(text) = m.record(extractor.entity_set).text(&extractor.field) else {
        tracing::debug!(field = %extractor.field, "field missing or not a string");
        return None;
    };
    let compiled = compiled?;
    match (compiled.groups(text), compiled.expanded_groups(text)) {
        (Some(groups), Some(expanded)) => Some(Decomposition::new(groups, expanded)),
        _ => {
            tracing::debug!(field = %extractor.field, value = text, pattern = %extractor.pattern, "value does not match pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::inducer::induce_rule;
    use crate::{ConditionArgument, ConditionKind, Pattern};

    fn pair(source: &str, target: &str) -> Match {
        Match::new(
            0.9,
            Record::new(1).with_field("name", source).with_field("unit", "bar"),
            Record::new("asset-2").with_field("name", target),
        )
    }

    #[test]
    fn colors_induced_rule_patterns() {
        let rule = induce_rule("name", "VAL_23_XF_12345:foo.bar", "name", "23-XF-12345");
        let colored = color_rule(&rule, &[]);

        assert_eq!(colored.extractors.len(), 2);
        assert_eq!(
            colored.extractors[0].pattern,
            fragments!["L", "_", (0, "D"), "_", (1, "L"), "_", (2, "D"), "..."]
        );
        assert_eq!(colored.extractors[1].pattern, fragments![(0, "D"), "-", (1, "L"), "-", (2, "D")]);
        assert_eq!(colored.extractors[0].entity_set, EntitySet::Sources);
        assert_eq!(colored.number_of_matches, 0);
    }

    #[test]
    fn colors_match_fields_with_shared_indices() {
        let rule = induce_rule("name", "VAL_23_XF_12345:foo.bar", "name", "23-XF-12345");
        let m = pair("VAL_23_XF_12345:foo.bar", "23-XF-12345");
        let colored = color_rule(&rule, std::slice::from_ref(&m));

        let source = colored.matches[0].source.fragments("name").unwrap();
        let target = colored.matches[0].target.fragments("name").unwrap();
        assert_eq!(source, fragments!["VAL", "_", (0, "23"), "_", (1, "XF"), "_", (2, "12345"), ":foo.bar"]);
        assert_eq!(target, fragments![(0, "23"), "-", (1, "XF"), "-", (2, "12345")]);
        assert_eq!(Fragment::concat(source), "VAL_23_XF_12345:foo.bar");
        assert_eq!(Fragment::concat(target), "23-XF-12345");
    }

    #[test]
    fn reordered_groups_keep_condition_colors() {
        let rule = induce_rule("name", "XF_12345:foo23.bar", "name", "23-XF-12345");
        let colored = color_rule(&rule, &[pair("XF_12345:foo23.bar", "23-XF-12345")]);

        let source = colored.matches[0].source.fragments("name").unwrap();
        let target = colored.matches[0].target.fragments("name").unwrap();
        assert_eq!(source, fragments![(0, "XF"), "_", (1, "12345"), ":", "foo", (2, "23"), ".bar"]);
        assert_eq!(target, fragments![(2, "23"), "-", (0, "XF"), "-", (1, "12345")]);
    }

    #[test]
    fn untouched_fields_keep_original_values() {
        let rule = induce_rule("name", "A_1", "name", "A-1");
        let colored = color_rule(&rule, &[pair("A_1", "A-1")]);
        let source = &colored.matches[0].source;

        assert_eq!(source.id, RecordId::Int(1));
        assert_eq!(source.field("unit"), Some(&FieldDisplay::Value(Value::from("bar"))));
        assert_eq!(colored.matches[0].target.id, RecordId::Text("asset-2".into()));
    }

    #[test]
    fn mismatched_value_degrades_to_literal() {
        let rule = induce_rule("name", "VAL_23_XF_12345", "name", "23-XF-12345");
        let colored = color_rule(&rule, &[pair("no-digits", "23-XF-12345")]);

        let source = &colored.matches[0].source;
        assert_eq!(source.field("name"), Some(&FieldDisplay::Value(Value::from("no-digits"))));
        assert!(colored.matches[0].target.fragments("name").is_some());
    }

    #[test]
    fn non_string_and_missing_values_degrade() {
        let rule = induce_rule("name", "A_1", "name", "A-1");
        let m = Match::new(1.0, Record::new(1).with_field("name", 17), Record::new(2));
        let colored = color_rule(&rule, &[m]);

        assert_eq!(colored.matches[0].source.field("name"), Some(&FieldDisplay::Value(Value::from(17))));
        assert_eq!(colored.matches[0].target.field("name"), None);
    }

    #[test]
    fn out_of_range_position_degrades_that_field() {
        let mut rule = induce_rule("name", "A_1", "name", "A-1");
        rule.conditions.push(Condition {
            kind: ConditionKind::Equals,
            arguments: vec![ConditionArgument(0, 9), ConditionArgument(7, 0)],
        });
        let colored = color_rule(&rule, &[pair("A_1", "A-1")]);

        assert_eq!(colored.extractors[0].pattern, fragments!["L_D..."]);
        assert_eq!(colored.extractors[1].pattern, fragments![(0, "L"), "-", (1, "D")]);
        assert_eq!(colored.matches[0].source.field("name"), Some(&FieldDisplay::Value(Value::from("A_1"))));
        assert_eq!(colored.matches[0].target.fragments("name").unwrap(), fragments![(0, "A"), "-", (1, "1")]);
    }

    #[test]
    fn non_equals_conditions_take_no_color() {
        let mut rule = induce_rule("name", "A_1", "name", "A-1");
        rule.conditions.insert(0, Condition { kind: ConditionKind::Other("contains".into()), arguments: vec![] });
        let colored = color_rule(&rule, &[pair("A_1", "A-1")]);

        let target = colored.matches[0].target.fragments("name").unwrap();
        assert_eq!(target, fragments![(0, "A"), "-", (1, "1")]);
        assert_eq!(colored.conditions.len(), 3);
    }

    #[test]
    fn external_ascii_letter_pattern_is_accepted() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "priority": 1,
            "conditions": [{"conditionType": "equals", "arguments": [[0, 1], [1, 0]]}],
            "extractors": [
                {"entitySet": "sources", "extractorType": "regex", "field": "name", "pattern": "^([a-zA-Z]+)\\.([0-9]+)(.*)$"},
                {"entitySet": "targets", "extractorType": "regex", "field": "name", "pattern": "^([0-9]+)$"}
            ]
        }))
        .unwrap();
        let colored = color_rule(&rule, &[pair("TT.42 kPa", "42")]);

        assert_eq!(colored.extractors[0].pattern, fragments!["L", ".", (0, "D"), "..."]);
        assert_eq!(colored.extractors[0].extractor_type.as_deref(), Some("regex"));
        assert_eq!(colored.matches[0].source.fragments("name").unwrap(), fragments!["TT", ".", (0, "42"), " kPa"]);
        assert_eq!(colored.matches[0].target.fragments("name").unwrap(), fragments![(0, "42")]);
    }

    #[test]
    fn broken_pattern_degrades_everywhere() {
        let mut rule = induce_rule("name", "A_1", "name", "A-1");
        rule.extractors[0].pattern = Pattern::new("^(([0-9]+)$");
        let colored = color_rule(&rule, &[pair("A_1", "A-1")]);

        assert_eq!(colored.extractors[0].pattern, fragments!["(D"]);
        assert_eq!(colored.matches[0].source.field("name"), Some(&FieldDisplay::Value(Value::from("A_1"))));
        assert!(colored.matches[0].target.fragments("name").is_some());
    }

    #[test]
    fn conditions_on_one_field_accumulate() {
        let rule = Rule {
            priority: 0,
            conditions: vec![Condition::equals(0, 0), Condition::equals(1, 1), Condition::equals(2, 2)],
            extractors: [
                Extractor::new(EntitySet::Sources, "name", Pattern::new(r"^(\p{L}+)-([0-9]+)-(\p{L}+)$")),
                Extractor::new(EntitySet::Targets, "name", Pattern::new(r"^(\p{L}+) ([0-9]+) (\p{L}+)$")),
            ],
        };
        let colored = color_rule(&rule, &[pair("AB-12-CD", "AB 12 CD")]);

        let source = colored.matches[0].source.fragments("name").unwrap();
        assert_eq!(source, fragments![(0, "AB"), "-", (1, "12"), "-", (2, "CD")]);
    }

    #[test]
    fn applied_rule_keeps_counts() {
        let rule = induce_rule("name", "A_1", "name", "A-1");
        let applied = AppliedRule {
            rule,
            matches: vec![pair("A_1", "A-1"), pair("B_2", "B-2")],
            number_of_matches: 2,
            average_score: Some(0.9),
        };
        let colored = color_applied_rule(&applied);

        assert_eq!(colored.number_of_matches, 2);
        assert_eq!(colored.average_score, Some(0.9));
        assert_eq!(colored.matches.len(), 2);
        assert_eq!(colored.matches[1].target.fragments("name").unwrap(), fragments![(0, "B"), "-", (1, "2")]);
    }

    #[test]
    fn colored_rule_serializes_fragments() {
        let rule = induce_rule("name", "A_1", "name", "A-1");
        let colored = color_rule(&rule, &[pair("A_1", "A-1")]);
        let value = serde_json::to_value(&colored).unwrap();

        assert_eq!(value["extractors"][1]["pattern"], serde_json::json!([{"colorIndex": 0, "text": "L"}, "-", {"colorIndex": 1, "text": "D"}]));
        assert_eq!(value["matches"][0]["source"]["unit"], "bar");
        assert_eq!(value["numberOfMatches"], 1);
    }
}
