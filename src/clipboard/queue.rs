//! Per-session host notification queues with blocking delivery.
//!
//! Each connected session owns a strict FIFO of pending [`HostMessage`]s.
//! The guest drains it through [`HostMessageQueue::wait_next`], the only
//! blocking operation in the service: the caller's task is suspended on a
//! oneshot channel until a message arrives, the session disconnects, or the
//! service shuts down. No polling anywhere.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::clipboard::error::{ClipboardError, Result};
use crate::clipboard::formats::{ClipboardFormat, FormatSet};
use crate::clipboard::registry::SessionId;

/// A notification from the host side, consumed exactly once by exactly one
/// session dequeue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    /// The service is shutting down
    Quit,

    /// The host wants the guest clipboard content in the given format
    ReadDataRequest(ClipboardFormat),

    /// New host clipboard content is available in the given formats
    FormatsAvailable(FormatSet),
}

/// Resolution of a [`HostMessageQueue::wait_next`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A message became available
    Message(HostMessage),

    /// The session was disconnected while waiting
    Disconnected,
}

#[derive(Debug, Default)]
struct SessionQueue {
    messages: VecDeque<HostMessage>,
    waiter: Option<oneshot::Sender<WaitOutcome>>,
}

impl SessionQueue {
    /// Hand the message to a live waiter if one is parked, otherwise queue
    /// it. A waiter whose receiving future was dropped counts as absent.
    fn deliver(&mut self, message: HostMessage) {
        if let Some(tx) = self.waiter.take() {
            if let Err(WaitOutcome::Message(returned)) = tx.send(WaitOutcome::Message(message)) {
                self.messages.push_back(returned);
            }
        } else {
            self.messages.push_back(message);
        }
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    sessions: HashMap<SessionId, SessionQueue>,
    shut_down: bool,
}

/// The host-notification queues of all connected sessions.
#[derive(Debug, Default)]
pub struct HostMessageQueue {
    inner: Mutex<QueueInner>,
}

impl HostMessageQueue {
    /// Create an empty queue set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the (empty) queue for a newly connected session.
    pub(crate) fn attach(&self, session: SessionId) {
        self.inner.lock().sessions.insert(session, SessionQueue::default());
    }

    /// Drop a session's queue, resolving its pending wait with
    /// [`WaitOutcome::Disconnected`]. Undelivered messages are discarded
    /// with the queue.
    pub(crate) fn detach(&self, session: SessionId) {
        let waiter = {
            let mut inner = self.inner.lock();
            inner.sessions.remove(&session).and_then(|q| q.waiter)
        };
        if let Some(tx) = waiter {
            let _ = tx.send(WaitOutcome::Disconnected);
        }
    }

    /// Append `message` to every currently connected session's queue.
    ///
    /// All insertions happen in a single pass under the lock, so a session
    /// connecting concurrently either sees the message or is not part of
    /// the broadcast at all; it never observes a partial state.
    pub fn broadcast(&self, message: HostMessage) {
        let mut inner = self.inner.lock();
        if inner.shut_down {
            return;
        }
        debug!(?message, sessions = inner.sessions.len(), "broadcasting host message");
        for queue in inner.sessions.values_mut() {
            queue.deliver(message.clone());
        }
    }

    /// Append `message` to one session's queue.
    pub fn enqueue_to(&self, session: SessionId, message: HostMessage) -> Result<()> {
        let mut inner = self.inner.lock();
        let queue = inner
            .sessions
            .get_mut(&session)
            .ok_or(ClipboardError::NoSuchSession(session))?;
        debug!(session = %session, ?message, "enqueueing host message");
        queue.deliver(message);
        Ok(())
    }

    /// Block until a message is available for `session`.
    ///
    /// Resolves with the oldest queued message, with
    /// [`WaitOutcome::Disconnected`] if the session is torn down first, or
    /// with [`HostMessage::Quit`] immediately once the service has shut
    /// down. At most one wait per session may be pending; a concurrent
    /// second wait is a caller error.
    pub async fn wait_next(&self, session: SessionId) -> Result<WaitOutcome> {
        let rx = {
            let mut inner = self.inner.lock();
            if inner.shut_down {
                return Ok(WaitOutcome::Message(HostMessage::Quit));
            }
            let queue = inner
                .sessions
                .get_mut(&session)
                .ok_or(ClipboardError::NoSuchSession(session))?;

            if let Some(message) = queue.messages.pop_front() {
                return Ok(WaitOutcome::Message(message));
            }

            if let Some(tx) = &queue.waiter {
                // A sender whose receiver was dropped is a leftover from an
                // abandoned wait, not a live caller.
                if !tx.is_closed() {
                    warn!(session = %session, "rejecting concurrent message wait");
                    return Err(ClipboardError::AlreadyWaiting(session));
                }
            }

            let (tx, rx) = oneshot::channel();
            queue.waiter = Some(tx);
            rx
        };

        Ok(rx.await.unwrap_or(WaitOutcome::Disconnected))
    }

    /// Broadcast [`HostMessage::Quit`] and make every subsequent
    /// [`wait_next`](Self::wait_next) - for current and future sessions -
    /// resolve with `Quit` immediately.
    pub fn shutdown(&self) {
        let waiters: Vec<oneshot::Sender<WaitOutcome>> = {
            let mut inner = self.inner.lock();
            inner.shut_down = true;
            inner
                .sessions
                .values_mut()
                .filter_map(|q| q.waiter.take())
                .collect()
        };
        debug!(woken = waiters.len(), "message queue shut down");
        for tx in waiters {
            let _ = tx.send(WaitOutcome::Message(HostMessage::Quit));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::registry::ClientRegistry;
    use proptest::prelude::*;

    fn session(queue: &HostMessageQueue, registry: &ClientRegistry) -> SessionId {
        let id = registry.connect();
        queue.attach(id);
        id
    }

    #[tokio::test]
    async fn test_queued_message_returned_immediately() {
        let registry = ClientRegistry::new();
        let queue = HostMessageQueue::new();
        let s = session(&queue, &registry);

        queue
            .enqueue_to(s, HostMessage::ReadDataRequest(ClipboardFormat::Html))
            .unwrap();

        let outcome = queue.wait_next(s).await.unwrap();
        assert_eq!(
            outcome,
            WaitOutcome::Message(HostMessage::ReadDataRequest(ClipboardFormat::Html))
        );
    }

    #[tokio::test]
    async fn test_wait_resumes_on_enqueue() {
        let registry = ClientRegistry::new();
        let queue = std::sync::Arc::new(HostMessageQueue::new());
        let s = session(&queue, &registry);

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_next(s).await })
        };
        tokio::task::yield_now().await;

        queue
            .enqueue_to(s, HostMessage::FormatsAvailable(ClipboardFormat::Bitmap.into()))
            .unwrap();

        let outcome = waiter.await.unwrap().unwrap();
        assert_eq!(
            outcome,
            WaitOutcome::Message(HostMessage::FormatsAvailable(
                ClipboardFormat::Bitmap.into()
            ))
        );
    }

    #[tokio::test]
    async fn test_concurrent_wait_rejected() {
        let registry = ClientRegistry::new();
        let queue = std::sync::Arc::new(HostMessageQueue::new());
        let s = session(&queue, &registry);

        let _first = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_next(s).await })
        };
        // Let the first wait park itself before issuing the second.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let err = queue.wait_next(s).await.unwrap_err();
        assert!(matches!(err, ClipboardError::AlreadyWaiting(id) if id == s));
    }

    #[tokio::test]
    async fn test_detach_cancels_wait() {
        let registry = ClientRegistry::new();
        let queue = std::sync::Arc::new(HostMessageQueue::new());
        let s = session(&queue, &registry);

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_next(s).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        queue.detach(s);

        let outcome = waiter.await.unwrap().unwrap();
        assert_eq!(outcome, WaitOutcome::Disconnected);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_connected_sessions() {
        let registry = ClientRegistry::new();
        let queue = HostMessageQueue::new();
        let a = session(&queue, &registry);

        queue.broadcast(HostMessage::FormatsAvailable(
            ClipboardFormat::UnicodeText.into(),
        ));

        // Connected after the broadcast: must not see it.
        let b = session(&queue, &registry);

        let got = queue.wait_next(a).await.unwrap();
        assert!(matches!(got, WaitOutcome::Message(HostMessage::FormatsAvailable(_))));

        queue.enqueue_to(b, HostMessage::Quit).unwrap();
        let got = queue.wait_next(b).await.unwrap();
        assert_eq!(got, WaitOutcome::Message(HostMessage::Quit));
    }

    #[tokio::test]
    async fn test_shutdown_is_sticky() {
        let registry = ClientRegistry::new();
        let queue = HostMessageQueue::new();
        let a = session(&queue, &registry);

        queue
            .enqueue_to(a, HostMessage::ReadDataRequest(ClipboardFormat::Html))
            .unwrap();
        queue.shutdown();

        // Quit wins over anything still queued.
        let got = queue.wait_next(a).await.unwrap();
        assert_eq!(got, WaitOutcome::Message(HostMessage::Quit));

        // Sessions attached after shutdown get Quit as well.
        let b = session(&queue, &registry);
        let got = queue.wait_next(b).await.unwrap();
        assert_eq!(got, WaitOutcome::Message(HostMessage::Quit));
    }

    fn arb_message() -> impl Strategy<Value = HostMessage> {
        prop_oneof![
            Just(HostMessage::ReadDataRequest(ClipboardFormat::UnicodeText)),
            Just(HostMessage::ReadDataRequest(ClipboardFormat::Bitmap)),
            Just(HostMessage::FormatsAvailable(ClipboardFormat::Html.into())),
            Just(HostMessage::FormatsAvailable(
                ClipboardFormat::UnicodeText | ClipboardFormat::Bitmap
            )),
        ]
    }

    proptest! {
        /// FIFO order holds for any enqueue sequence.
        #[test]
        fn prop_queue_preserves_fifo(messages in proptest::collection::vec(arb_message(), 0..24)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let registry = ClientRegistry::new();
                let queue = HostMessageQueue::new();
                let s = session(&queue, &registry);

                for message in &messages {
                    queue.enqueue_to(s, message.clone()).unwrap();
                }
                for expected in &messages {
                    let got = queue.wait_next(s).await.unwrap();
                    prop_assert_eq!(got, WaitOutcome::Message(expected.clone()));
                }
                Ok(())
            })?;
        }
    }
}
