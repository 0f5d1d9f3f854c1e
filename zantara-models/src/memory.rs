//! User memory / conversation session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const MAX_PROFILE_FACTS: usize = 10;
pub const MAX_SUMMARY_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MemoryCounters {
    pub conversations: i64,
    pub searches: i64,
    pub tasks: i64,
}

/// Per-user memory row. `profile_facts` and `summary` carry their own
/// invariants: facts deduplicated case-insensitively and capped at 10,
/// summary truncated at 500 chars with a trailing `…`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMemory {
    pub user_id: Uuid,
    pub profile_facts: Vec<String>,
    pub summary: String,
    pub counters: MemoryCounters,
    pub updated_at: DateTime<Utc>,
}

impl UserMemory {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            profile_facts: Vec::new(),
            summary: String::new(),
            counters: MemoryCounters::default(),
            updated_at: Utc::now(),
        }
    }

    /// Insert a fact, deduplicating case-insensitively and capping at
    /// `MAX_PROFILE_FACTS` (oldest dropped first).
    pub fn add_fact(&mut self, fact: String) {
        let fact_lower = fact.to_lowercase();
        if self
            .profile_facts
            .iter()
            .any(|f| f.to_lowercase() == fact_lower)
        {
            return;
        }
        self.profile_facts.push(fact);
        if self.profile_facts.len() > MAX_PROFILE_FACTS {
            self.profile_facts.remove(0);
        }
    }

    /// Set the summary, truncating to `MAX_SUMMARY_CHARS` with an ellipsis
    /// if it overflows.
    pub fn set_summary(&mut self, summary: &str) {
        if summary.chars().count() <= MAX_SUMMARY_CHARS {
            self.summary = summary.to_string();
            return;
        }
        let truncated: String = summary.chars().take(MAX_SUMMARY_CHARS.saturating_sub(1)).collect();
        self.summary = format!("{truncated}…");
    }
}

/// An in-flight conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub metadata: Value,
}

/// A single turn's message, as stored in the TTL-bounded session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Feedback categories accepted on a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Positive,
    Negative,
    Issue,
}

/// A per-turn analytics row, written at the end of query processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalyticsRecord {
    pub session_id: Uuid,
    pub user_id: Option<Uuid>,
    pub query: String,
    pub mode: String,
    pub model_used: String,
    pub latency_ms: u64,
    pub degraded_subsystems: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// `rating` is a 1–5 score; validated at the store boundary before insert
/// rather than at construction, since rows read back from the database
/// also flow through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRating {
    pub rating_id: Uuid,
    pub session_id: Uuid,
    pub user_id: Option<Uuid>,
    pub rating: u8,
    pub feedback_type: Option<FeedbackType>,
    pub feedback_text: Option<String>,
    pub turn_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_is_case_insensitive() {
        let mut mem = UserMemory::empty(Uuid::new_v4());
        mem.add_fact("Works at Bali Zero".into());
        mem.add_fact("works at bali zero".into());
        assert_eq!(mem.profile_facts.len(), 1);
    }

    #[test]
    fn facts_capped_at_ten() {
        let mut mem = UserMemory::empty(Uuid::new_v4());
        for i in 0..15 {
            mem.add_fact(format!("fact {i}"));
        }
        assert_eq!(mem.profile_facts.len(), MAX_PROFILE_FACTS);
        assert_eq!(mem.profile_facts.last().unwrap(), "fact 14");
    }

    #[test]
    fn summary_truncates_with_ellipsis() {
        let mut mem = UserMemory::empty(Uuid::new_v4());
        mem.set_summary(&"a".repeat(600));
        assert_eq!(mem.summary.chars().count(), MAX_SUMMARY_CHARS);
        assert!(mem.summary.ends_with('…'));
    }
}
