//! Memory & Context Assembler: read-only assembly of a `MemoryContext`
//! from the user-memory row, related knowledge-graph entities, and recent
//! conversation history.

pub mod session;

use async_trait::async_trait;
use uuid::Uuid;
use zantara_errors::CoreError;
use zantara_models::{KgEntity, SessionMessage, UserMemory};
use zantara_store::RelationalStoreGateway;

pub use session::SessionStore;

/// Minimum word length considered when matching query terms against KG
/// entity names for the "related to query" enrichment stage.
const MIN_QUERY_TERM_LEN: usize = 4;
/// Cap on KG entities rendered in the "Related Concepts" prompt section.
const MAX_RELATED_CONCEPTS: usize = 5;

/// User-profile fields the Memory Assembler reads but does not own: role
/// and preferred language live in the surrounding auth/user layer, not in
/// this core's relational schema, mirroring how
/// `CoreError::AuthRequired`/`Forbidden` originate outside the core.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub role: String,
    pub preferred_language: String,
}

#[async_trait]
pub trait UserProfileProvider: Send + Sync {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError>;
}

#[derive(Debug, Clone)]
pub struct RelatedConcept {
    pub entity_type: String,
    pub name: String,
}

/// Assembled context for a single turn. `is_empty`/`to_system_prompt` are
/// the two views the answer orchestrator consumes.
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    pub user_profile: Option<UserProfile>,
    pub profile_facts: Vec<String>,
    pub summary: String,
    pub related_concepts: Vec<RelatedConcept>,
    pub recent_history: Vec<SessionMessage>,
}

impl MemoryContext {
    pub fn is_empty(&self) -> bool {
        self.user_profile.is_none()
            && self.profile_facts.is_empty()
            && self.summary.is_empty()
            && self.related_concepts.is_empty()
            && self.recent_history.is_empty()
    }

    pub fn to_system_prompt(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut sections = Vec::new();

        if let Some(profile) = &self.user_profile {
            sections.push(format!(
                "## User Profile\nRole: {}\nPreferred language: {}",
                profile.role, profile.preferred_language
            ));
        }

        if !self.profile_facts.is_empty() {
            let facts = self.profile_facts.iter().map(|f| format!("- {f}")).collect::<Vec<_>>().join("\n");
            sections.push(format!("## What I Know About You\n{facts}"));
        }

        if !self.summary.is_empty() {
            sections.push(format!("## Summary\n{}", self.summary));
        }

        if !self.recent_history.is_empty() {
            let timeline = self
                .recent_history
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("## Recent Conversation\n{timeline}"));
        }

        if !self.related_concepts.is_empty() {
            let concepts = self
                .related_concepts
                .iter()
                .take(MAX_RELATED_CONCEPTS)
                .map(|c| format!("- {}: {}", c.entity_type, c.name))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("## Related Concepts\n{concepts}"));
        }

        sections.join("\n\n")
    }
}

pub struct MemoryAssembler<'a> {
    store: &'a RelationalStoreGateway,
    profile_provider: &'a dyn UserProfileProvider,
    session_store: &'a SessionStore,
}

impl<'a> MemoryAssembler<'a> {
    pub fn new(
        store: &'a RelationalStoreGateway,
        profile_provider: &'a dyn UserProfileProvider,
        session_store: &'a SessionStore,
    ) -> Self {
        Self { store, profile_provider, session_store }
    }

    /// Assemble the context for a turn. `query` is `None` on cold-start
    /// (no message yet), which skips all KG enrichment. Every read degrades
    /// gracefully rather than failing the whole assembly.
    pub async fn assemble(
        &self,
        user_id: Uuid,
        query: Option<&str>,
        session_id: Option<Uuid>,
    ) -> MemoryContext {
        let user_profile = match self.profile_provider.fetch(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "user profile fetch failed, continuing without it");
                None
            }
        };

        let memory = match self.store.find_user_memory(user_id).await {
            Ok(m) => m.unwrap_or_else(|| UserMemory::empty(user_id)),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "user memory fetch failed, continuing without it");
                UserMemory::empty(user_id)
            }
        };

        let related_concepts = match query {
            Some(q) if !q.trim().is_empty() => self.fetch_related_concepts(q).await,
            _ => Vec::new(),
        };

        let recent_history = match session_id {
            Some(sid) => self.session_store.recent_messages(sid, 10).await,
            None => Vec::new(),
        };

        MemoryContext {
            user_profile,
            profile_facts: memory.profile_facts,
            summary: memory.summary,
            related_concepts,
            recent_history,
        }
    }

    async fn fetch_related_concepts(&self, query: &str) -> Vec<RelatedConcept> {
        let mut entities: Vec<KgEntity> = Vec::new();

        for term in query.split_whitespace().filter(|w| w.len() >= MIN_QUERY_TERM_LEN) {
            match self.store.find_entities_by_name_like(term, 2).await {
                Ok(found) => entities.extend(found),
                Err(e) => {
                    tracing::warn!(term, error = %e, "kg entity lookup by query term failed");
                }
            }
            if entities.len() >= MAX_RELATED_CONCEPTS {
                break;
            }
        }

        if entities.len() < MAX_RELATED_CONCEPTS {
            if let Ok(by_degree) = self.store.find_entities_by_relationship_degree(MAX_RELATED_CONCEPTS as i64).await {
                entities.extend(by_degree);
            }
        }

        let mut seen = std::collections::HashSet::new();
        entities
            .into_iter()
            .filter(|e| seen.insert(e.id.clone()))
            .take(MAX_RELATED_CONCEPTS)
            .map(|e| RelatedConcept { entity_type: e.entity_type, name: e.name })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_is_empty() {
        assert!(MemoryContext::default().is_empty());
    }

    #[test]
    fn to_system_prompt_includes_all_populated_sections() {
        let ctx = MemoryContext {
            user_profile: Some(UserProfile { id: Uuid::nil(), role: "client".into(), preferred_language: "id".into() }),
            profile_facts: vec!["Works at Bali Zero".into()],
            summary: "Discussed KITAS renewal.".into(),
            related_concepts: vec![RelatedConcept { entity_type: "permit".into(), name: "KITAS".into() }],
            recent_history: vec![],
        };
        let prompt = ctx.to_system_prompt();
        assert!(prompt.contains("## User Profile"));
        assert!(prompt.contains("## What I Know About You"));
        assert!(prompt.contains("## Summary"));
        assert!(prompt.contains("## Related Concepts"));
        assert!(prompt.contains("permit: KITAS"));
    }

    #[test]
    fn to_system_prompt_is_blank_when_empty() {
        assert_eq!(MemoryContext::default().to_system_prompt(), "");
    }
}
