pub mod chunk;
pub mod document;
pub mod golden;
pub mod kg;
pub mod memory;
pub mod tier;
pub mod wire;

pub use chunk::{HierarchicalChunk, HierarchyLevel, CHUNK_NAMESPACE};
pub use document::{DocumentStatus, DocumentType, ParentDocument};
pub use golden::{GoldenAnswer, GoldenRoute, QueryCluster};
pub use kg::{ExtractedGraph, KgEntity, KgRelationship};
pub use memory::{ConversationRating, ConversationSession, FeedbackType, QueryAnalyticsRecord, SessionMessage, UserMemory};
pub use tier::{Tier, TierPolicy};
