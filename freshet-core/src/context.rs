//! Per-invocation request context.

use uuid::Uuid;

/// Correlation context for one loader invocation.
///
/// Carries an opaque id used only for diagnostics: it is attached to every
/// log line of an invocation so concurrent loads can be told apart. It has
/// no effect on behavior, is created when an invocation starts, and is
/// dropped when it ends, never persisted.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: String,
}

impl RequestContext {
    /// Create a fresh context with a UUIDv7-backed correlation id.
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
        }
    }

    /// Create a context with a caller-supplied correlation id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The full correlation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shortened id for log lines.
    pub fn brief(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
