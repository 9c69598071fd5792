//! Batch aggregation of induced rules.
//!
//! Every prediction is run through the inducer once per usable field mapping.
//! Predictions whose induced patterns are textually identical (same fields,
//! same source pattern, same target pattern) end up in one [`AppliedRule`].
//! Conditions are not part of the key: the rule stored for a group is the
//! one induced from its first member.
//!
//! Near-identical patterns are never merged.

use super::inducer::induce_rule;
use crate::{AppliedRule, FieldMapping, Match};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    source_field: String,
    source_pattern: String,
    target_field: String,
    target_pattern: String,
}

/// Group `predictions` by induced rule, in order of first appearance.
pub fn generate_applied_rules(field_mappings: &[FieldMapping], predictions: &[Match]) -> Vec<AppliedRule> {
    let span = tracing::debug_span!("aggregate", predictions = predictions.len(), mappings = field_mappings.len());
    let _guard = span.enter();

    let mappings: Vec<(&str, &str)> = field_mappings.iter().filter_map(FieldMapping::fields).collect();
    if mappings.len() < field_mappings.len() {
        tracing::debug!(skipped = field_mappings.len() - mappings.len(), "ignoring incomplete field mappings");
    }

    let mut groups: Vec<AppliedRule> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for prediction in predictions {
        for &(source_field, target_field) in &mappings {
            let source_value = prediction.source.text(source_field).unwrap_or_default();
            let target_value = prediction.target.text(target_field).unwrap_or_default();
            let rule = induce_rule(source_field, source_value, target_field, target_value);

            let key = GroupKey {
                source_field: source_field.to_string(),
                source_pattern: rule.extractors[0].pattern.as_str().to_string(),
                target_field: target_field.to_string(),
                target_pattern: rule.extractors[1].pattern.as_str().to_string(),
            };

            let slot = *index.entry(key).or_insert_with(|| {
                groups.push(AppliedRule { rule, matches: Vec::new(), number_of_matches: 0, average_score: None });
                groups.len() - 1
            });
            groups[slot].matches.push(prediction.clone());
        }
    }

    for group in &mut groups {
        group.number_of_matches = group.matches.len();
        group.average_score = average_score(&group.matches);
    }

    tracing::debug!(rules = groups.len(), "aggregated predictions");
    groups
}

fn average_score(matches: &[Match]) -> Option<f64> {
    if matches.is_empty() {
        return None;
    }
    Some(matches.iter().map(|m| m.score).sum::<f64>() / matches.len() as f64)
}

/// Most matches first; ties keep their current order.
pub fn sort_by_match_count(rules: &mut [AppliedRule]) {
    rules.sort_by(|a, b| b.number_of_matches.cmp(&a.number_of_matches));
}
