//! Keyword classification of provider weather labels
//!
//! Providers describe weather in free text ("Thunderstorm", "light rain",
//! "overcast clouds"). The rules below are evaluated top to bottom and the
//! first rule with a matching keyword decides the [`Condition`].

use super::Condition;

/// One classification rule: any keyword match yields `condition`
#[derive(Debug, Clone, Copy)]
pub struct ConditionRule {
    pub keywords: &'static [&'static str],
    pub condition: Condition,
}

/// Ordered rule table. Storm must precede rain: "thunderstorm with rain"
/// is a storm.
pub const CONDITION_RULES: &[ConditionRule] = &[
    ConditionRule {
        keywords: &["thunder", "storm", "squall", "tornado"],
        condition: Condition::Storm,
    },
    ConditionRule {
        keywords: &["rain", "drizzle", "shower", "snow", "sleet"],
        condition: Condition::Rain,
    },
    ConditionRule {
        keywords: &["cloud", "overcast", "mist", "fog", "haze"],
        condition: Condition::Cloudy,
    },
];

/// Condition used when no rule matches
pub const DEFAULT_CONDITION: Condition = Condition::Sunny;

/// Classify a provider label, case-insensitively
pub fn classify_condition(label: &str) -> Condition {
    classify_with(CONDITION_RULES, label)
}

/// Classify against an arbitrary rule table
pub fn classify_with(rules: &[ConditionRule], label: &str) -> Condition {
    let label = label.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| label.contains(k)))
        .map(|rule| rule.condition)
        .unwrap_or(DEFAULT_CONDITION)
}
