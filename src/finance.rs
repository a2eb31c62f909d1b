//! Keyword-based transaction categorization
//!
//! A free-text description ("Bought 2 bags of fertilizer", "Sold maize at
//! market") is sorted into income or expense and then into a category. Both
//! steps are plain substring checks against the tables below, first match
//! wins.

use serde::{Deserialize, Serialize};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

/// Result of categorizing one description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorization {
    pub kind: TransactionKind,
    pub category: &'static str,
}

/// Category used when no rule matches
pub const DEFAULT_CATEGORY: &str = "general";

/// Any of these marks a description as income
pub const INCOME_KEYWORDS: &[&str] = &["sold", "sale", "income", "received"];

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

pub const EXPENSE_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "inputs",
        keywords: &["fertilizer", "seed", "pesticide", "herbicide", "manure", "feed", "medicine", "vaccine"],
    },
    CategoryRule {
        category: "labor",
        keywords: &["wages", "salary", "casual", "worker", "harvesting", "planting", "weeding"],
    },
    CategoryRule {
        category: "equipment",
        keywords: &["tractor", "plough", "repair", "fuel", "diesel", "petrol", "maintenance", "tools"],
    },
    CategoryRule {
        category: "utilities",
        keywords: &["water", "electricity", "internet", "airtime"],
    },
    CategoryRule {
        category: "transport",
        keywords: &["bus", "truck", "delivery", "transport"],
    },
];

pub const INCOME_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "sales",
        keywords: &["sold", "sale", "market", "selling"],
    },
    CategoryRule {
        category: "services",
        keywords: &["ploughing service", "transport service"],
    },
];

/// Categorize a transaction description, case-insensitively
pub fn categorize(description: &str) -> Categorization {
    let lower = description.to_lowercase();

    let kind = if INCOME_KEYWORDS.iter().any(|k| lower.contains(k)) {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };

    let rules = match kind {
        TransactionKind::Income => INCOME_RULES,
        TransactionKind::Expense => EXPENSE_RULES,
    };

    let category = rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| rule.category)
        .unwrap_or(DEFAULT_CATEGORY);

    Categorization { kind, category }
}
