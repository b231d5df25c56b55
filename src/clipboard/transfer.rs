//! Data-transfer bookkeeping for the read/write handshake.
//!
//! Two pieces of state live here:
//!
//! - the host's outstanding guest-data request (at most one; the newest
//!   request displaces an older one that was never answered), and
//! - the read-in-flight gate that defers host format announcements while a
//!   guest read is being served, so a guest never has the offer swapped out
//!   from under a read it already started.

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::clipboard::error::{ClipboardError, Result};
use crate::clipboard::formats::{ClipboardFormat, FormatSet};
use crate::clipboard::registry::SessionId;

/// Outcome of a guest-initiated host clipboard read.
///
/// A read never partially copies: either the full payload is returned, or
/// nothing is and the caller learns the required capacity. The undersized
/// case is a protocol step, not an error - the caller re-issues the read
/// with a buffer of at least `required` bytes. Retries are idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRead {
    /// The payload fit; all bytes are here.
    Complete(Vec<u8>),

    /// The caller's capacity was below the payload size; zero bytes copied.
    BufferTooSmall {
        /// Payload size the next attempt must accommodate
        required: usize,
    },
}

#[derive(Debug)]
struct PendingGuestRead {
    session: SessionId,
    format: ClipboardFormat,
    reply: oneshot::Sender<Vec<u8>>,
}

/// The host collaborator's outstanding request for guest clipboard data.
#[derive(Debug, Default)]
pub(crate) struct GuestDataRequests {
    slot: Mutex<Option<PendingGuestRead>>,
}

impl GuestDataRequests {
    /// Register a request targeting `session`, returning the receiver the
    /// host collaborator awaits. A previous unanswered request is dropped,
    /// which wakes its waiter with a cancellation.
    pub(crate) fn open(
        &self,
        session: SessionId,
        format: ClipboardFormat,
    ) -> oneshot::Receiver<Vec<u8>> {
        let (reply, rx) = oneshot::channel();
        let previous = self.slot.lock().replace(PendingGuestRead {
            session,
            format,
            reply,
        });
        if previous.is_some() {
            debug!(session = %session, ?format, "displacing unanswered guest data request");
        }
        rx
    }

    /// Resolve the outstanding request with the guest's payload.
    ///
    /// Rejected as stale when there is no outstanding request, when it
    /// targets a different session, or when the format does not match.
    pub(crate) fn complete(
        &self,
        session: SessionId,
        format: ClipboardFormat,
        data: Vec<u8>,
    ) -> Result<()> {
        let mut slot = self.slot.lock();
        let matches = slot
            .as_ref()
            .is_some_and(|p| p.session == session && p.format == format);
        if !matches {
            return Err(ClipboardError::StaleRequest);
        }
        if let Some(pending) = slot.take() {
            // Receiver gone means the collaborator stopped waiting; the
            // write itself still succeeded from the guest's view.
            let _ = pending.reply.send(data);
        }
        Ok(())
    }

    /// Drop the outstanding request if it targets `session`, waking the
    /// host collaborator with a cancellation. Returns true if one was
    /// dropped.
    pub(crate) fn cancel_if_target(&self, session: SessionId) -> bool {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|p| p.session == session) {
            *slot = None;
            true
        } else {
            false
        }
    }
}

/// Defers host format announcements while guest reads are in flight.
///
/// The latest deferred offer wins; it is published by the read that drops
/// the in-flight count back to zero.
#[derive(Debug, Default)]
pub(crate) struct ReadGate {
    inner: Mutex<ReadGateInner>,
}

#[derive(Debug, Default)]
struct ReadGateInner {
    reads_in_flight: u32,
    deferred: Option<FormatSet>,
}

impl ReadGate {
    /// Mark a guest read as started.
    pub(crate) fn begin(&self) {
        self.inner.lock().reads_in_flight += 1;
    }

    /// Mark a guest read as finished. Returns the deferred offer to
    /// publish, if this was the last in-flight read and one was held back.
    pub(crate) fn finish(&self) -> Option<FormatSet> {
        let mut inner = self.inner.lock();
        inner.reads_in_flight = inner.reads_in_flight.saturating_sub(1);
        if inner.reads_in_flight == 0 {
            inner.deferred.take()
        } else {
            None
        }
    }

    /// Hold back `formats` if a read is in flight. Returns true when the
    /// announcement was deferred and must not be published yet.
    pub(crate) fn defer(&self, formats: FormatSet) -> bool {
        let mut inner = self.inner.lock();
        if inner.reads_in_flight > 0 {
            debug!(?formats, "deferring host offer until in-flight read completes");
            inner.deferred = Some(formats);
            true
        } else {
            false
        }
    }
}
