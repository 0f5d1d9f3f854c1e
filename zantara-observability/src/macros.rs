//! Convenience macros for common logging patterns across the zantara crates.

/// Log a database operation.
#[macro_export]
macro_rules! log_db {
    ($operation:expr, $table:expr) => {
        tracing::debug!(target: "database", operation = $operation, table = $table, "db operation");
    };
    ($operation:expr, $table:expr, $id:expr) => {
        tracing::debug!(target: "database", operation = $operation, table = $table, id = ?$id, "db operation");
    };
    ($operation:expr, $table:expr, $id:expr, $duration_ms:expr) => {
        tracing::debug!(target: "database", operation = $operation, table = $table, id = ?$id, duration_ms = $duration_ms, "db operation");
    };
}

/// Log an external service call (embedding provider, LLM provider, vector store).
#[macro_export]
macro_rules! log_external_call {
    ($service:expr, $endpoint:expr) => {
        tracing::debug!(target: "external", service = $service, endpoint = $endpoint, "calling external service");
    };
    ($service:expr, $endpoint:expr, $duration_ms:expr, $status:expr) => {
        tracing::info!(target: "external", service = $service, endpoint = $endpoint, duration_ms = $duration_ms, status = $status, "external call completed");
    };
}

/// Log a cache operation (golden-answer cache, memory TTL cache).
#[macro_export]
macro_rules! log_cache {
    (hit, $key:expr) => {
        tracing::debug!(target: "cache", operation = "hit", key = $key, "cache hit");
    };
    (miss, $key:expr) => {
        tracing::debug!(target: "cache", operation = "miss", key = $key, "cache miss");
    };
    (set, $key:expr) => {
        tracing::debug!(target: "cache", operation = "set", key = $key, "cache set");
    };
    (evict, $key:expr) => {
        tracing::debug!(target: "cache", operation = "evict", key = $key, "cache evict");
    };
}

/// Log a retry attempt.
#[macro_export]
macro_rules! log_retry {
    ($operation:expr, $attempt:expr, $max_attempts:expr) => {
        tracing::warn!(target: "retry", operation = $operation, attempt = $attempt, max_attempts = $max_attempts, "retrying operation");
    };
    ($operation:expr, $attempt:expr, $max_attempts:expr, $error:expr) => {
        tracing::warn!(target: "retry", operation = $operation, attempt = $attempt, max_attempts = $max_attempts, error = %$error, "retrying after error");
    };
}

/// Log a security-relevant event (tier violation, auth surface handoff).
#[macro_export]
macro_rules! log_security {
    ($event:expr) => {
        tracing::warn!(target: "security", event = $event, "security event");
    };
    ($event:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::warn!(target: "security", event = $event, $($key = ?$value),*, "security event");
    };
}

/// Log an LLM fallback-ladder tier advance (permanent for the process).
#[macro_export]
macro_rules! log_llm_fallback {
    ($from_tier:expr, $to_tier:expr, $reason:expr) => {
        tracing::warn!(target: "llm_fallback", from_tier = $from_tier, to_tier = $to_tier, reason = $reason, "advancing fallback tier");
    };
}

/// Log an ingestion job lifecycle event.
#[macro_export]
macro_rules! log_ingest {
    ($stage:expr, $file:expr) => {
        tracing::info!(target: "ingest", stage = $stage, file = $file, "ingestion stage");
    };
    ($stage:expr, $file:expr, $count:expr) => {
        tracing::info!(target: "ingest", stage = $stage, file = $file, count = $count, "ingestion stage");
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_compile() {
        log_db!("SELECT", "parent_documents");
        log_db!("UPDATE", "golden_routes", "route_42");

        log_cache!(hit, "cluster:abc123");
        log_cache!(miss, "cluster:def456");

        log_retry!("embed_text", 2, 3);
        log_security!("tier_violation", user_level = 2u8, tier = "S");

        log_llm_fallback!("flash", "flash-lite", "quota_exhausted");
        log_ingest!("chunk", "uu_6_2023.pdf", 42);
    }
}
