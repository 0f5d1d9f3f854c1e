//! Query Router & Intent Classifier: a pure function over the user's
//! message that walks a fixed decision order over trilingual (IT/EN/ID)
//! keyword lists down to a complexity sub-classification.

mod keywords;

use keywords::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentCategory {
    Greeting,
    Identity,
    TeamQuery,
    SessionState,
    Casual,
    Emotional,
    BusinessSimple,
    BusinessComplex,
    BusinessStrategic,
    DevCode,
    Unknown,
}

impl IntentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Greeting => "greeting",
            IntentCategory::Identity => "identity",
            IntentCategory::TeamQuery => "team-query",
            IntentCategory::SessionState => "session-state",
            IntentCategory::Casual => "casual",
            IntentCategory::Emotional => "emotional",
            IntentCategory::BusinessSimple => "business-simple",
            IntentCategory::BusinessComplex => "business-complex",
            IntentCategory::BusinessStrategic => "business-strategic",
            IntentCategory::DevCode => "dev-code",
            IntentCategory::Unknown => "unknown",
        }
    }

    fn is_business(&self) -> bool {
        matches!(
            self,
            IntentCategory::BusinessSimple | IntentCategory::BusinessComplex | IntentCategory::BusinessStrategic
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Fast,
    Pro,
    DeepThink,
    Dev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Greeting,
    SmallTalk,
    IdentityResponse,
    Technical,
    ProcedureGuide,
    RiskExplainer,
    LegalDeep,
    LegalBrief,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Greeting => "greeting",
            Mode::SmallTalk => "small_talk",
            Mode::IdentityResponse => "identity_response",
            Mode::Technical => "technical",
            Mode::ProcedureGuide => "procedure_guide",
            Mode::RiskExplainer => "risk_explainer",
            Mode::LegalDeep => "legal_deep",
            Mode::LegalBrief => "legal_brief",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub category: IntentCategory,
    pub confidence: f32,
    pub suggested_model_tier: ModelTier,
    pub require_memory: bool,
    pub requires_team_context: bool,
    pub requires_rag_collection: Option<String>,
    pub mode: Mode,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a user message by walking the fixed decision order. Pure
/// function: no I/O, no allocation beyond the returned struct.
pub fn classify(message: &str) -> Classification {
    let lower = message.to_lowercase();
    let trimmed = lower.trim();

    if SIMPLE_GREETINGS.contains(&trimmed) {
        return finish(IntentCategory::Greeting, 1.0, ModelTier::Fast, true, false, None, trimmed);
    }

    if contains_any(trimmed, IDENTITY_KEYWORDS) {
        return finish(IntentCategory::Identity, 0.95, ModelTier::Fast, false, true, None, trimmed);
    }

    if contains_any(trimmed, TEAM_QUERY_KEYWORDS) {
        return finish(
            IntentCategory::TeamQuery,
            0.9,
            ModelTier::Fast,
            false,
            false,
            Some("bali_zero_team".to_string()),
            trimmed,
        );
    }

    if contains_any(trimmed, SESSION_PATTERNS) {
        return finish(IntentCategory::SessionState, 1.0, ModelTier::Fast, true, false, None, trimmed);
    }

    if contains_any(trimmed, CASUAL_PATTERNS) {
        return finish(IntentCategory::Casual, 1.0, ModelTier::Fast, false, false, None, trimmed);
    }

    if contains_any(trimmed, EMOTIONAL_PATTERNS) {
        return finish(IntentCategory::Emotional, 1.0, ModelTier::Fast, false, false, None, trimmed);
    }

    let has_business_term = contains_any(trimmed, BUSINESS_KEYWORDS);
    if has_business_term {
        let has_deep_think = contains_any(trimmed, DEEP_THINK_KEYWORDS);
        let has_pro = contains_any(trimmed, PRO_KEYWORDS);
        let has_complex = contains_any(trimmed, COMPLEX_INDICATORS);
        let is_simple_question = contains_any(trimmed, SIMPLE_PATTERNS);

        let (category, confidence, tier) = if has_deep_think {
            (IntentCategory::BusinessStrategic, 0.95, ModelTier::DeepThink)
        } else if has_pro || has_complex || message.len() > 100 {
            (IntentCategory::BusinessComplex, 0.9, ModelTier::Pro)
        } else if is_simple_question && message.len() < 50 {
            (IntentCategory::BusinessSimple, 0.9, ModelTier::Fast)
        } else {
            (IntentCategory::BusinessSimple, 0.8, ModelTier::Pro)
        };

        return finish(category, confidence, tier, false, false, None, trimmed);
    }

    if contains_any(trimmed, DEVAI_KEYWORDS) {
        return finish(IntentCategory::DevCode, 0.9, ModelTier::Dev, false, false, None, trimmed);
    }

    // Fallback: short + no business keyword → casual; else business-simple.
    if message.len() < 50 && !has_business_term {
        finish(IntentCategory::Casual, 0.7, ModelTier::Fast, false, false, None, trimmed)
    } else {
        finish(IntentCategory::BusinessSimple, 0.7, ModelTier::Fast, false, false, None, trimmed)
    }
}

fn finish(
    category: IntentCategory,
    confidence: f32,
    suggested_model_tier: ModelTier,
    require_memory: bool,
    requires_team_context: bool,
    requires_rag_collection: Option<String>,
    message_lower: &str,
) -> Classification {
    let mode = derive_mode(category, message_lower);
    Classification { category, confidence, suggested_model_tier, require_memory, requires_team_context, requires_rag_collection, mode }
}

/// Derive a communication-mode label from category + content.
fn derive_mode(category: IntentCategory, message_lower: &str) -> Mode {
    match category {
        IntentCategory::Greeting => return Mode::Greeting,
        IntentCategory::Casual | IntentCategory::SessionState | IntentCategory::Emotional => return Mode::SmallTalk,
        IntentCategory::Identity => return Mode::IdentityResponse,
        IntentCategory::DevCode => return Mode::Technical,
        _ => {}
    }

    if category.is_business() {
        if contains_any(message_lower, &["how to", "come si", "step", "procedura", "process", "guide"]) {
            return Mode::ProcedureGuide;
        }
        if contains_any(message_lower, &["risk", "rischio", "penalty", "sanzione", "illegal", "compliance"]) {
            return Mode::RiskExplainer;
        }
        if category == IntentCategory::BusinessComplex || message_lower.len() > 100 {
            return Mode::LegalDeep;
        }
        return Mode::LegalBrief;
    }

    Mode::SmallTalk
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub collection_name: String,
    pub collections: Vec<String>,
    pub confidence: f32,
    pub is_pricing: bool,
}

/// Combine category + explicit override + pricing-pattern detection into a
/// collection routing decision. Pricing takes precedence over everything
/// else.
pub fn route(message: &str, classification: &Classification, collection_override: Option<&str>) -> RoutingDecision {
    let lower = message.to_lowercase();
    let is_pricing = contains_any(&lower, PRICING_QUERY_MARKERS);

    if is_pricing {
        return RoutingDecision {
            collection_name: "pricing".to_string(),
            collections: vec!["pricing".to_string()],
            confidence: 0.95,
            is_pricing: true,
        };
    }

    if let Some(collection) = &classification.requires_rag_collection {
        return RoutingDecision {
            collection_name: collection.clone(),
            collections: vec![collection.clone()],
            confidence: classification.confidence,
            is_pricing: false,
        };
    }

    if let Some(name) = collection_override {
        return RoutingDecision {
            collection_name: name.to_string(),
            collections: vec![name.to_string()],
            confidence: 1.0,
            is_pricing: false,
        };
    }

    RoutingDecision {
        collection_name: "legal-unified".to_string(),
        collections: vec!["legal-unified".to_string()],
        confidence: classification.confidence,
        is_pricing: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_greeting_matches() {
        let c = classify("Hello");
        assert_eq!(c.category, IntentCategory::Greeting);
        assert_eq!(c.mode, Mode::Greeting);
    }

    #[test]
    fn identity_outranks_session_state() {
        let c = classify("do you know me, can you login");
        assert_eq!(c.category, IntentCategory::Identity);
    }

    #[test]
    fn team_query_detected() {
        let c = classify("tell me about the team");
        assert_eq!(c.category, IntentCategory::TeamQuery);
        assert_eq!(c.requires_rag_collection.as_deref(), Some("bali_zero_team"));
    }

    #[test]
    fn casual_emotional_becomes_emotional_category() {
        let c = classify("aku sedih hari ini");
        assert_eq!(c.category, IntentCategory::Emotional);
        assert_eq!(c.mode, Mode::SmallTalk);
    }

    #[test]
    fn deep_think_keyword_wins_business_strategic() {
        let c = classify("what's the best strategy for company investment comparison?");
        assert_eq!(c.category, IntentCategory::BusinessStrategic);
        assert_eq!(c.suggested_model_tier, ModelTier::DeepThink);
    }

    #[test]
    fn pro_keyword_yields_business_complex() {
        let c = classify("what are the requirements and costs for a KITAS?");
        assert_eq!(c.category, IntentCategory::BusinessComplex);
    }

    #[test]
    fn short_simple_business_question_is_fast() {
        let c = classify("what is a kitas?");
        assert_eq!(c.category, IntentCategory::BusinessSimple);
        assert_eq!(c.suggested_model_tier, ModelTier::Fast);
    }

    #[test]
    fn fallback_short_no_business_keyword_is_casual() {
        let c = classify("tell me something fun");
        assert_eq!(c.category, IntentCategory::Casual);
    }

    #[test]
    fn fallback_long_defaults_business_simple() {
        let long_msg = "x".repeat(60);
        let c = classify(&long_msg);
        assert_eq!(c.category, IntentCategory::BusinessSimple);
    }

    #[test]
    fn pricing_pattern_takes_precedence_over_category() {
        let classification = classify("what is the price of a KITAS?");
        let decision = route("what is the price of a KITAS?", &classification, None);
        assert!(decision.is_pricing);
        assert_eq!(decision.collection_name, "pricing");
    }

    #[test]
    fn explicit_override_used_when_no_pricing_or_team_hint() {
        let classification = classify("what is a kitas?");
        let decision = route("what is a kitas?", &classification, Some("visa"));
        assert_eq!(decision.collection_name, "visa");
    }
}
