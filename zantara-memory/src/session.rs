//! TTL-bounded conversation-history store backed by Redis: graceful
//! degrade-to-disabled on connect failure, never fails a caller on a cache
//! error.

use chrono::Utc;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::warn;
use uuid::Uuid;
use zantara_models::SessionMessage;

const DEFAULT_TTL_SECONDS: u64 = 60 * 60 * 24 * 7;
const DEFAULT_HISTORY_CAP: isize = 50;

pub struct SessionStore {
    conn: Option<ConnectionManager>,
    ttl_seconds: u64,
}

impl SessionStore {
    pub async fn new(redis_url: &str) -> Self {
        match Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => Self { conn: Some(conn), ttl_seconds: DEFAULT_TTL_SECONDS },
                Err(e) => {
                    warn!(error = %e, "redis connection failed, session history disabled");
                    Self { conn: None, ttl_seconds: DEFAULT_TTL_SECONDS }
                }
            },
            Err(e) => {
                warn!(error = %e, "redis client creation failed, session history disabled");
                Self { conn: None, ttl_seconds: DEFAULT_TTL_SECONDS }
            }
        }
    }

    fn key(session_id: Uuid) -> String {
        format!("session:{session_id}:messages")
    }

    /// Most recent `limit` messages, oldest first. Never errors to the
    /// caller: a disabled or unreachable store just yields no history.
    pub async fn recent_messages(&self, session_id: Uuid, limit: usize) -> Vec<SessionMessage> {
        let Some(conn) = &self.conn else { return Vec::new() };
        let mut conn = conn.clone();
        let key = Self::key(session_id);

        match conn.lrange::<_, Vec<String>>(&key, -(limit as isize), -1).await {
            Ok(raw) => raw.iter().filter_map(|s| serde_json::from_str(s).ok()).collect(),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to read session history");
                Vec::new()
            }
        }
    }

    /// Append a turn's message, bounded to `DEFAULT_HISTORY_CAP` entries,
    /// refreshing the TTL. Invoked by the answer orchestrator's persistence
    /// phase, not by the read-only assembler.
    pub async fn append_message(&self, session_id: Uuid, role: &str, content: &str) {
        let Some(conn) = &self.conn else { return };
        let mut conn = conn.clone();
        let key = Self::key(session_id);
        let message = SessionMessage { role: role.to_string(), content: content.to_string(), at: Utc::now() };
        let Ok(encoded) = serde_json::to_string(&message) else { return };

        if let Err(e) = conn.rpush::<_, _, ()>(&key, encoded).await {
            warn!(session_id = %session_id, error = %e, "failed to append session message");
            return;
        }
        let _: Result<(), _> = conn.ltrim(&key, -DEFAULT_HISTORY_CAP, -1).await;
        let _: Result<(), _> = conn.expire(&key, self.ttl_seconds as i64).await;
    }
}
