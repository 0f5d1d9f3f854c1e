//! Closed payload-filter algebra: AND of field-equality, field-in-set,
//! and numeric-range conditions.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FilterCondition {
    Equals { key: String, value: Value },
    InSet { key: String, values: Vec<Value> },
    Range { key: String, gte: Option<f64>, lte: Option<f64> },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Filter {
    pub conditions: Vec<FilterCondition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equals(mut self, key: impl Into<String>, value: Value) -> Self {
        self.conditions.push(FilterCondition::Equals { key: key.into(), value });
        self
    }

    pub fn with_in_set(mut self, key: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push(FilterCondition::InSet { key: key.into(), values });
        self
    }

    pub fn with_range(mut self, key: impl Into<String>, gte: Option<f64>, lte: Option<f64>) -> Self {
        self.conditions.push(FilterCondition::Range { key: key.into(), gte, lte });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render to Qdrant's `must` filter wire shape.
    pub fn to_qdrant_json(&self) -> Option<Value> {
        if self.conditions.is_empty() {
            return None;
        }
        let must: Vec<Value> = self
            .conditions
            .iter()
            .map(|c| match c {
                FilterCondition::Equals { key, value } => serde_json::json!({
                    "key": key,
                    "match": { "value": value },
                }),
                FilterCondition::InSet { key, values } => serde_json::json!({
                    "key": key,
                    "match": { "any": values },
                }),
                FilterCondition::Range { key, gte, lte } => {
                    let mut range = serde_json::Map::new();
                    if let Some(g) = gte {
                        range.insert("gte".into(), serde_json::json!(g));
                    }
                    if let Some(l) = lte {
                        range.insert("lte".into(), serde_json::json!(l));
                    }
                    serde_json::json!({ "key": key, "range": range })
                }
            })
            .collect();
        Some(serde_json::json!({ "must": must }))
    }
}
