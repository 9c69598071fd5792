use crate::engine;
use crate::{AppliedRule, ColoredRule, FieldMapping, Match, Result, Rule};
use serde::Serialize;

/// Induce the rule explaining a single matched pair.
///
/// Every letter or digit run of the target that also occurs literally in the
/// source becomes an `equals` condition.
///
/// # Example
/// ```
/// use rulelink::induce_rule;
///
/// let rule = induce_rule("name", "VAL_23_XF_12345:foo.bar", "name", "23-XF-12345");
/// assert_eq!(rule.source().pattern.as_str(), r"^(\p{L}+)_([0-9]+)_(\p{L}+)_([0-9]+)(.*)$");
/// assert_eq!(rule.target().pattern.as_str(), r"^([0-9]+)-(\p{L}+)-([0-9]+)$");
/// assert_eq!(rule.conditions.len(), 3);
/// ```
pub fn induce_rule(source_field: &str, source_value: &str, target_field: &str, target_value: &str) -> Rule {
    engine::induce_rule(source_field, source_value, target_field, target_value)
}

/// Group `predictions` under the rules induced for each complete field mapping.
///
/// Groups come out in order of first appearance; see [`sort_by_match_count`].
pub fn generate_applied_rules(field_mappings: &[FieldMapping], predictions: &[Match]) -> Vec<AppliedRule> {
    engine::generate_applied_rules(field_mappings, predictions)
}

/// Sort applied rules by descending match count, keeping ties in place.
pub fn sort_by_match_count(rules: &mut [AppliedRule]) {
    engine::sort_by_match_count(rules)
}

/// Colour a rule's extractor patterns and the fields of `matches`.
///
/// Never fails: anything that cannot be decomposed is shown as its plain value.
///
/// # Example
/// ```
/// use rulelink::{Match, Record, color_rule, fragments, induce_rule};
///
/// let rule = induce_rule("name", "PUMP_7", "name", "PUMP-7");
/// let m = Match::new(
///     1.0,
///     Record::new(1).with_field("name", "PUMP_7"),
///     Record::new(2).with_field("name", "PUMP-7"),
/// );
/// let colored = color_rule(&rule, &[m]);
///
/// assert_eq!(colored.extractors[1].pattern, fragments![(0, "L"), "-", (1, "D")]);
/// assert_eq!(colored.matches[0].target.fragments("name").unwrap(), fragments![(0, "PUMP"), "-", (1, "7")]);
/// ```
pub fn color_rule(rule: &Rule, matches: &[Match]) -> ColoredRule {
    engine::color_rule(rule, matches)
}

/// Colour an applied rule, carrying over its match count and average score.
pub fn color_applied_rule(applied: &AppliedRule) -> ColoredRule {
    engine::color_applied_rule(applied)
}

pub fn color_applied_rules(applied: &[AppliedRule]) -> Vec<ColoredRule> {
    applied.iter().map(engine::color_applied_rule).collect()
}

/// Decode a JSON array of predictions.
pub fn predictions_from_json(json: &str) -> Result<Vec<Match>> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a JSON array of applied rules, e.g. from an external rule service.
pub fn applied_rules_from_json(json: &str) -> Result<Vec<AppliedRule>> {
    Ok(serde_json::from_str(json)?)
}

pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
