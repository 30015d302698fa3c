//! Per-call context for tool invocations
//!
//! A [`CallContext`] carries a cancellation flag, an optional deadline and a
//! small key-value store. Callables that declare `&CallContext` as their first
//! parameter receive it automatically; the invocation engine passes it through
//! untouched and never waits on it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Well-known context keys
pub mod keys {
    /// Identifier of the model request that produced the call
    pub const REQUEST_ID: &str = "request_id";
    /// Session ID for tracking
    pub const SESSION_ID: &str = "session_id";
    /// User ID for personalization
    pub const USER_ID: &str = "user_id";
}

/// Context handed to callables during a tool call
///
/// Clones share the same cancellation flag, so cancelling any clone cancels
/// them all. The key-value data is copied on clone.
///
/// # Example
///
/// ```
/// use fncall_core::CallContext;
/// use std::time::Duration;
///
/// let ctx = CallContext::new()
///     .with_session_id("session-123")
///     .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert!(!ctx.is_cancelled());
///
/// let handle = ctx.clone();
/// handle.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
    data: HashMap<String, serde_json::Value>,
}

impl CallContext {
    /// Create a new context with no deadline and no data
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set the request ID
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.insert(keys::REQUEST_ID, serde_json::json!(request_id.into()));
        self
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the user ID
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.insert(keys::USER_ID, serde_json::json!(user_id.into()));
        self
    }

    // =========== Cancellation ===========

    /// Signal cancellation to every clone of this context
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        tracing::debug!("call context cancelled");
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Whether the call should stop: cancelled or past its deadline
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// Derive a context sharing this one's cancellation flag and data,
    /// with a deadline no later than `timeout` from now
    pub fn child(&self, timeout: Duration) -> Self {
        let proposed = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(current) if current < proposed => current,
            _ => proposed,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
            data: self.data.clone(),
        }
    }

    // =========== Common Accessors ===========

    /// Get the request ID
    pub fn request_id(&self) -> Option<&str> {
        self.get(keys::REQUEST_ID).and_then(|v| v.as_str())
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Get the user ID
    pub fn user_id(&self) -> Option<&str> {
        self.get(keys::USER_ID).and_then(|v| v.as_str())
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value, serialized to JSON
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value, deserialized from JSON
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Number of key-value entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the key-value store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Trace {
        hops: u32,
        origin: String,
    }

    #[test]
    fn test_clones_share_cancellation() {
        let ctx = CallContext::new();
        let clone = ctx.clone();
        assert!(!clone.is_cancelled());

        ctx.cancel();
        assert!(clone.is_cancelled());
        assert!(clone.is_done());
    }

    #[test]
    fn test_deadline() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(60));
        assert!(!ctx.is_expired());
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(60));

        let past = CallContext::new().with_deadline(Instant::now());
        std::thread::sleep(Duration::from_millis(2));
        assert!(past.is_expired());
        assert_eq!(past.remaining(), Some(Duration::ZERO));

        assert!(CallContext::background().remaining().is_none());
    }

    #[test]
    fn test_child_keeps_earlier_deadline() {
        let parent = CallContext::new().with_timeout(Duration::from_secs(1));
        let child = parent.child(Duration::from_secs(120));
        assert_eq!(child.deadline(), parent.deadline());

        let short = parent.child(Duration::from_millis(10));
        assert!(short.deadline() < parent.deadline());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_typed_insert_get() {
        let mut ctx = CallContext::new();
        let trace = Trace {
            hops: 3,
            origin: "planner".to_string(),
        };

        ctx.insert_typed("trace", &trace).unwrap();

        let retrieved: Trace = ctx.get_typed("trace").unwrap().unwrap();
        assert_eq!(retrieved, trace);

        let missing: Option<Trace> = ctx.get_typed("missing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let ctx = CallContext::new()
            .with_request_id("req-1")
            .with_session_id("sess-1")
            .with_user_id("user-1");

        assert_eq!(ctx.request_id(), Some("req-1"));
        assert_eq!(ctx.session_id(), Some("sess-1"));
        assert_eq!(ctx.user_id(), Some("user-1"));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_get_typed_wrong_shape() {
        let mut ctx = CallContext::new();
        ctx.insert("trace", serde_json::json!("not an object"));
        let result: crate::Result<Option<Trace>> = ctx.get_typed("trace");
        assert!(result.is_err());
    }
}
