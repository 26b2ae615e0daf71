use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionType {
    Budget,
    Spike,
    Overview,
    Subscription,
    Hygiene,
    GetStarted,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionModel {
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// Between 0 and 1; suggestions are ranked by it
    pub confidence: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_monthly_savings: Option<Decimal>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Decimal>,
}

impl SuggestionModel {
    pub fn new(suggestion_type: SuggestionType, title: impl Into<String>, message: impl Into<String>, confidence: Decimal) -> Self {
        Self {
            suggestion_type,
            title: title.into(),
            message: message.into(),
            category_name: None,
            confidence,
            potential_monthly_savings: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category_name: &str) -> Self {
        self.category_name = Some(category_name.to_string());
        self
    }

    pub fn with_savings(mut self, savings: Decimal) -> Self {
        self.potential_monthly_savings = Some(savings);
        self
    }

    pub fn with_metric(mut self, name: &str, value: impl Into<Decimal>) -> Self {
        self.metrics.insert(name.to_string(), value.into());
        self
    }
}
