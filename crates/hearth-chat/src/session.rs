//! Conversation session store.
//!
//! Bounded, ordered message history per logical session, with a trimming
//! policy and at-most-one-in-flight-turn enforcement. Different sessions
//! are fully independent; there is no global lock across sessions beyond
//! the brief map access.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use hearth_core::types::{Message, Role, ToolCall};

use crate::error::ChatError;

/// One conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// The remote tool call awaiting a client-executed result, if any.
    /// At most one may be outstanding per session.
    pub pending_tool: Option<ToolCall>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            messages: Vec::new(),
            created_at: Utc::now(),
            pending_tool: None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    session: Session,
    in_flight: bool,
}

/// History bounds enforced by `trim`.
#[derive(Debug, Clone)]
pub struct SessionLimits {
    pub max_messages: usize,
    pub max_bytes: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_messages: 60,
            max_bytes: 96 * 1024,
        }
    }
}

/// Store of all active sessions.
///
/// Session mutation is serialized per entity through the store's narrow
/// interface; the turn guard additionally rejects a second concurrent
/// `respond` on the same session.
pub struct SessionStore {
    slots: Mutex<HashMap<Uuid, Slot>>,
    limits: SessionLimits,
}

/// RAII marker for an in-flight turn. Releases the session on drop.
pub struct TurnGuard<'a> {
    store: &'a SessionStore,
    session_id: Uuid,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut slots) = self.store.slots.lock() {
            if let Some(slot) = slots.get_mut(&self.session_id) {
                slot.in_flight = false;
            }
        }
    }
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            limits,
        }
    }

    fn with_slot<F, T>(&self, session_id: Uuid, f: F) -> Result<T, ChatError>
    where
        F: FnOnce(&mut Slot) -> T,
    {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock poisoned: {}", e)))?;
        let slot = slots
            .entry(session_id)
            .or_insert_with(|| Slot {
                session: Session::new(session_id),
                in_flight: false,
            });
        Ok(f(slot))
    }

    /// Mark a turn in flight for the session, creating it if absent.
    ///
    /// Fails with `SessionBusy` if another turn is already in flight.
    pub fn begin_turn(&self, session_id: Uuid) -> Result<TurnGuard<'_>, ChatError> {
        let acquired = self.with_slot(session_id, |slot| {
            if slot.in_flight {
                false
            } else {
                slot.in_flight = true;
                true
            }
        })?;
        if !acquired {
            return Err(ChatError::SessionBusy(session_id));
        }
        Ok(TurnGuard {
            store: self,
            session_id,
        })
    }

    /// Append a message to the session, creating it if absent.
    pub fn append(&self, session_id: Uuid, message: Message) -> Result<(), ChatError> {
        self.with_slot(session_id, |slot| slot.session.messages.push(message))
    }

    /// Ordered history snapshot. Empty for unknown sessions.
    pub fn history(&self, session_id: Uuid) -> Result<Vec<Message>, ChatError> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock poisoned: {}", e)))?;
        Ok(slots
            .get(&session_id)
            .map(|slot| slot.session.messages.clone())
            .unwrap_or_default())
    }

    /// Clear history and any pending tool. Idempotent.
    pub fn clear(&self, session_id: Uuid) -> Result<(), ChatError> {
        self.with_slot(session_id, |slot| {
            slot.session.messages.clear();
            slot.session.pending_tool = None;
        })?;
        debug!(session = %session_id, "Session cleared");
        Ok(())
    }

    /// Seed an empty session with client-supplied history.
    ///
    /// A no-op if the session already has messages.
    pub fn seed(&self, session_id: Uuid, messages: Vec<Message>) -> Result<(), ChatError> {
        self.with_slot(session_id, |slot| {
            if slot.session.messages.is_empty() {
                slot.session.messages = messages;
            }
        })
    }

    /// The pending remote tool call, if any.
    pub fn pending(&self, session_id: Uuid) -> Result<Option<ToolCall>, ChatError> {
        self.with_slot(session_id, |slot| slot.session.pending_tool.clone())
    }

    /// Record a remote tool call awaiting a client result.
    pub fn set_pending(&self, session_id: Uuid, call: ToolCall) -> Result<(), ChatError> {
        self.with_slot(session_id, |slot| slot.session.pending_tool = Some(call))
    }

    /// Drop the pending remote tool call, returning it if there was one.
    pub fn take_pending(&self, session_id: Uuid) -> Result<Option<ToolCall>, ChatError> {
        self.with_slot(session_id, |slot| slot.session.pending_tool.take())
    }

    /// Enforce history bounds by dropping oldest messages first.
    ///
    /// A tool-call message and its matching result are always removed as a
    /// pair so the replayed history never shows a dangling reference.
    pub fn trim(&self, session_id: Uuid) -> Result<(), ChatError> {
        let limits = self.limits.clone();
        self.with_slot(session_id, |slot| {
            let messages = &mut slot.session.messages;
            while messages.len() > limits.max_messages
                || serialized_size(messages) > limits.max_bytes
            {
                if !drop_oldest(messages) {
                    break;
                }
            }
        })
    }
}

fn serialized_size(messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|m| serde_json::to_string(m).map(|s| s.len()).unwrap_or(0))
        .sum()
}

/// Drop the oldest message; if it carries a tool call, drop its matching
/// result too. Returns false when there is nothing left to drop.
fn drop_oldest(messages: &mut Vec<Message>) -> bool {
    if messages.is_empty() {
        return false;
    }
    let first = messages.remove(0);
    if let Some(call) = first.tool_call {
        if let Some(pos) = messages
            .iter()
            .position(|m| m.role == Role::Tool && m.tool_call_id.as_deref() == Some(call.call_id.as_str()))
        {
            messages.remove(pos);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::types::{ToolResult, ToolStatus};

    fn store() -> SessionStore {
        SessionStore::new(SessionLimits::default())
    }

    fn call(id: &str) -> ToolCall {
        ToolCall {
            tool_name: "get_time".to_string(),
            parameters: serde_json::json!({}),
            call_id: id.to_string(),
        }
    }

    fn result(id: &str) -> ToolResult {
        ToolResult {
            call_id: id.to_string(),
            tool_name: "get_time".to_string(),
            status: ToolStatus::Success,
            data: serde_json::json!({"time": "noon"}),
        }
    }

    // ---- Append / history ----

    #[test]
    fn test_append_creates_session() {
        let store = store();
        let sid = Uuid::new_v4();
        store.append(sid, Message::user("hello")).unwrap();
        let history = store.history(sid).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "hello");
    }

    #[test]
    fn test_history_unknown_session_empty() {
        let store = store();
        assert!(store.history(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_history_preserves_order() {
        let store = store();
        let sid = Uuid::new_v4();
        store.append(sid, Message::user("one")).unwrap();
        store.append(sid, Message::assistant("two")).unwrap();
        store.append(sid, Message::user("three")).unwrap();
        let history = store.history(sid).unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    // ---- Clear ----

    #[test]
    fn test_clear_removes_messages_and_pending() {
        let store = store();
        let sid = Uuid::new_v4();
        store.append(sid, Message::user("hello")).unwrap();
        store.set_pending(sid, call("c1")).unwrap();
        store.clear(sid).unwrap();
        assert!(store.history(sid).unwrap().is_empty());
        assert!(store.pending(sid).unwrap().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = store();
        let sid = Uuid::new_v4();
        store.append(sid, Message::user("hello")).unwrap();
        store.clear(sid).unwrap();
        store.clear(sid).unwrap();
        assert!(store.history(sid).unwrap().is_empty());
    }

    #[test]
    fn test_clear_unknown_session_ok() {
        let store = store();
        store.clear(Uuid::new_v4()).unwrap();
    }

    // ---- Turn guard ----

    #[test]
    fn test_begin_turn_rejects_second() {
        let store = store();
        let sid = Uuid::new_v4();
        let _guard = store.begin_turn(sid).unwrap();
        let second = store.begin_turn(sid);
        assert!(matches!(second, Err(ChatError::SessionBusy(_))));
    }

    #[test]
    fn test_turn_guard_releases_on_drop() {
        let store = store();
        let sid = Uuid::new_v4();
        {
            let _guard = store.begin_turn(sid).unwrap();
        }
        assert!(store.begin_turn(sid).is_ok());
    }

    #[test]
    fn test_different_sessions_independent() {
        let store = store();
        let _a = store.begin_turn(Uuid::new_v4()).unwrap();
        let _b = store.begin_turn(Uuid::new_v4()).unwrap();
    }

    // ---- Pending tool ----

    #[test]
    fn test_set_and_take_pending() {
        let store = store();
        let sid = Uuid::new_v4();
        store.set_pending(sid, call("c1")).unwrap();
        assert_eq!(store.pending(sid).unwrap().unwrap().call_id, "c1");
        assert_eq!(store.take_pending(sid).unwrap().unwrap().call_id, "c1");
        assert!(store.pending(sid).unwrap().is_none());
    }

    // ---- Seeding ----

    #[test]
    fn test_seed_empty_session() {
        let store = store();
        let sid = Uuid::new_v4();
        store
            .seed(sid, vec![Message::user("hi"), Message::assistant("hello")])
            .unwrap();
        assert_eq!(store.history(sid).unwrap().len(), 2);
    }

    #[test]
    fn test_seed_does_not_overwrite() {
        let store = store();
        let sid = Uuid::new_v4();
        store.append(sid, Message::user("existing")).unwrap();
        store.seed(sid, vec![Message::user("seeded")]).unwrap();
        let history = store.history(sid).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "existing");
    }

    // ---- Trimming ----

    #[test]
    fn test_trim_drops_oldest_first() {
        let store = SessionStore::new(SessionLimits {
            max_messages: 4,
            max_bytes: usize::MAX,
        });
        let sid = Uuid::new_v4();
        for i in 0..6 {
            store.append(sid, Message::user(format!("msg {}", i))).unwrap();
        }
        store.trim(sid).unwrap();
        let history = store.history(sid).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "msg 2");
    }

    #[test]
    fn test_trim_removes_tool_pairs_together() {
        let store = SessionStore::new(SessionLimits {
            max_messages: 3,
            max_bytes: usize::MAX,
        });
        let sid = Uuid::new_v4();
        // Oldest: a tool call + its result, then a normal exchange.
        store
            .append(sid, Message::assistant_tool_call("", call("c1")))
            .unwrap();
        store.append(sid, Message::tool_result(&result("c1"))).unwrap();
        store.append(sid, Message::user("later question")).unwrap();
        store.append(sid, Message::assistant("later answer")).unwrap();

        store.trim(sid).unwrap();
        let history = store.history(sid).unwrap();
        // Dropping the tool call also dropped its paired result.
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.tool_call.is_none()));
        assert!(history.iter().all(|m| m.tool_call_id.is_none()));
    }

    #[test]
    fn test_trim_respects_byte_budget() {
        let store = SessionStore::new(SessionLimits {
            max_messages: usize::MAX,
            max_bytes: 2048,
        });
        let sid = Uuid::new_v4();
        for _ in 0..10 {
            store
                .append(sid, Message::user("x".repeat(400)))
                .unwrap();
        }
        store.trim(sid).unwrap();
        let history = store.history(sid).unwrap();
        assert!(serialized_size(&history) <= 2048);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_trim_noop_within_limits() {
        let store = store();
        let sid = Uuid::new_v4();
        store.append(sid, Message::user("hello")).unwrap();
        store.trim(sid).unwrap();
        assert_eq!(store.history(sid).unwrap().len(), 1);
    }

    // ---- drop_oldest ----

    #[test]
    fn test_drop_oldest_empty() {
        let mut messages = Vec::new();
        assert!(!drop_oldest(&mut messages));
    }

    #[test]
    fn test_drop_oldest_plain_message() {
        let mut messages = vec![Message::user("a"), Message::user("b")];
        assert!(drop_oldest(&mut messages));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "b");
    }
}
