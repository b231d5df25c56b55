//! Guest session registry.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use tracing::debug;

/// Identifier of one connected guest session.
///
/// Allocated by [`ClientRegistry::connect`] and carried, already resolved,
/// by every transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u32);

impl SessionId {
    /// The numeric value of this session id.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks connected guest sessions.
///
/// Sessions are independent; any number may be connected at once. The
/// registry only tracks membership - per-session message state lives in the
/// [`HostMessageQueue`](crate::clipboard::queue::HostMessageQueue).
#[derive(Debug)]
pub struct ClientRegistry {
    next_id: AtomicU32,
    sessions: Mutex<HashSet<SessionId>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            sessions: Mutex::new(HashSet::new()),
        }
    }

    /// Allocate a new session id and record it as connected.
    pub fn connect(&self) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sessions.lock().insert(id);
        debug!(session = %id, "session connected");
        id
    }

    /// Remove a session. Returns false (without side effects) if the
    /// session was never connected or already removed.
    pub fn disconnect(&self, session: SessionId) -> bool {
        let removed = self.sessions.lock().remove(&session);
        if removed {
            debug!(session = %session, "session disconnected");
        }
        removed
    }

    /// Whether the session is currently connected.
    pub fn contains(&self, session: SessionId) -> bool {
        self.sessions.lock().contains(&session)
    }

    /// Number of currently connected sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no sessions are connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_allocates_distinct_ids() {
        let registry = ClientRegistry::new();
        let a = registry.connect();
        let b = registry.connect();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_disconnect_unknown_is_silent() {
        let registry = ClientRegistry::new();
        let a = registry.connect();
        assert!(registry.disconnect(a));
        assert!(!registry.disconnect(a));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_contains() {
        let registry = ClientRegistry::new();
        let a = registry.connect();
        assert!(registry.contains(a));
        registry.disconnect(a);
        assert!(!registry.contains(a));
    }
}
