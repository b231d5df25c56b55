//! The shared clipboard host service.
//!
//! Ties the policy store, session registry, format negotiator, message
//! queues, and transfer bookkeeping together behind the call surface the
//! transport layer exposes to guests and the host frontend.
//!
//! # Data flow
//!
//! ```text
//! Host clipboard watcher          Service                    Guest session
//! ━━━━━━━━━━━━━━━━━━━━━          ━━━━━━━                    ━━━━━━━━━━━━━
//!
//! set_host_formats ──────> host offer + broadcast ──> next_host_message
//!                                                       └─> read_data ──> read_clipboard()
//!
//!                          guest offer + owner <──────── announce_guest_formats
//! request_guest_data ────> enqueue to owner ─────────> next_host_message
//!          ^                                            └─> write_data
//!          └───────────────── payload ──────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clipboard::backend::HostClipboard;
use crate::clipboard::error::{ClipboardError, Result};
use crate::clipboard::formats::{ClipboardFormat, FormatSet};
use crate::clipboard::negotiator::FormatNegotiator;
use crate::clipboard::policy::{PolicyStore, SharingMode};
use crate::clipboard::queue::{HostMessage, HostMessageQueue, WaitOutcome};
use crate::clipboard::registry::{ClientRegistry, SessionId};
use crate::clipboard::transfer::{DataRead, GuestDataRequests, ReadGate};

/// Service construction parameters.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Sharing mode at startup
    pub initial_mode: SharingMode,

    /// Whether the host collaborator should leave the real clipboard alone
    pub headless: bool,

    /// Maximum accepted guest payload size in bytes
    pub max_data_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            initial_mode: SharingMode::Off,
            headless: false,
            max_data_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// The shared clipboard host service.
///
/// One instance exists per virtual machine. All methods take `&self`; the
/// only operation that suspends the caller beyond its own bookkeeping (plus
/// at most one collaborator call) is [`next_host_message`](Self::next_host_message).
pub struct SharedClipboardService {
    policy: PolicyStore,
    registry: ClientRegistry,
    queue: HostMessageQueue,
    negotiator: FormatNegotiator,
    requests: GuestDataRequests,
    read_gate: ReadGate,
    backend: Arc<dyn HostClipboard>,
    max_data_size: usize,
}

impl SharedClipboardService {
    /// Create a service talking to the given host clipboard collaborator.
    pub fn new(config: ServiceConfig, backend: Arc<dyn HostClipboard>) -> Self {
        info!(
            mode = ?config.initial_mode,
            headless = config.headless,
            "shared clipboard service initialized"
        );
        Self {
            policy: PolicyStore::new(config.initial_mode, config.headless),
            registry: ClientRegistry::new(),
            queue: HostMessageQueue::new(),
            negotiator: FormatNegotiator::new(),
            requests: GuestDataRequests::default(),
            read_gate: ReadGate::default(),
            backend,
            max_data_size: config.max_data_size,
        }
    }

    // -------------------------------------------------------------------------
    // Host-privileged configuration calls
    // -------------------------------------------------------------------------

    /// Replace the sharing mode. Applies to operations issued after this
    /// call returns; already queued notifications stay queued.
    pub fn set_mode(&self, mode: SharingMode) {
        self.policy.set_mode(mode);
    }

    /// [`set_mode`](Self::set_mode) from a wire value; undefined values are
    /// rejected and the current mode is retained.
    pub fn set_mode_raw(&self, raw: u32) -> Result<()> {
        self.policy.set_mode_raw(raw)
    }

    /// The sharing mode current at this instant.
    pub fn mode(&self) -> SharingMode {
        self.policy.mode()
    }

    /// Store the headless flag for the host collaborator to consume.
    pub fn set_headless(&self, headless: bool) {
        self.policy.set_headless(headless);
    }

    /// The headless flag current at this instant.
    pub fn headless(&self) -> bool {
        self.policy.headless()
    }

    // -------------------------------------------------------------------------
    // Session lifecycle
    // -------------------------------------------------------------------------

    /// Register a new guest session with an empty message queue.
    pub fn connect(&self) -> SessionId {
        let session = self.registry.connect();
        self.queue.attach(session);
        session
    }

    /// Tear down a session: cancel its pending message wait, drop its
    /// queue, release guest-offer ownership it may hold, and fail any
    /// outstanding host request targeting it. Unknown sessions are ignored.
    pub fn disconnect(&self, session: SessionId) {
        if !self.registry.disconnect(session) {
            return;
        }
        self.queue.detach(session);
        self.negotiator.release_owner_if(session);
        if self.requests.cancel_if_target(session) {
            debug!(session = %session, "cancelled guest data request for disconnected session");
        }
    }

    /// Number of currently connected sessions.
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    // -------------------------------------------------------------------------
    // Guest-issued operations
    // -------------------------------------------------------------------------

    /// Block until a host notification is available for `session`.
    ///
    /// See [`HostMessageQueue::wait_next`] for the resolution rules. This
    /// call functions in every mode - shutdown and disconnect must reach a
    /// guest even when transfers are off.
    pub async fn next_host_message(&self, session: SessionId) -> Result<WaitOutcome> {
        self.queue.wait_next(session).await
    }

    /// The guest announces the formats available in its clipboard, taking
    /// guest-offer ownership for `session`.
    pub fn announce_guest_formats(&self, session: SessionId, formats: FormatSet) -> Result<()> {
        if !self.registry.contains(session) {
            return Err(ClipboardError::NoSuchSession(session));
        }
        if !self.policy.mode().allows_guest_to_host() {
            warn!(session = %session, "guest format announcement rejected by sharing mode");
            return Err(ClipboardError::ModeViolation);
        }
        self.negotiator.set_guest_offer(session, formats);
        Ok(())
    }

    /// The guest pulls host clipboard content in `format`, with a buffer of
    /// `capacity` bytes on its side.
    ///
    /// Returns [`DataRead::BufferTooSmall`] - copying nothing - when the
    /// payload exceeds `capacity`; the guest re-issues the call with a
    /// larger buffer. The offer may have changed since the notification
    /// that prompted this call was queued, in which case the read fails
    /// with `FormatUnavailable`.
    pub async fn read_data(
        &self,
        session: SessionId,
        format: ClipboardFormat,
        capacity: usize,
    ) -> Result<DataRead> {
        if !self.registry.contains(session) {
            return Err(ClipboardError::NoSuchSession(session));
        }
        if !self.policy.mode().allows_host_to_guest() {
            warn!(session = %session, ?format, "guest read rejected by sharing mode");
            return Err(ClipboardError::ModeViolation);
        }
        if !self.negotiator.host_offer().contains(format) {
            return Err(ClipboardError::FormatUnavailable(format));
        }

        // Host offer announcements arriving while the collaborator serves
        // this read are held back and published once the read completes.
        self.read_gate.begin();
        let outcome = self.backend.read_clipboard(format).await;
        if let Some(deferred) = self.read_gate.finish() {
            self.publish_host_offer(deferred);
        }

        let data = outcome?.ok_or(ClipboardError::FormatUnavailable(format))?;
        if data.len() > capacity {
            debug!(
                session = %session,
                ?format,
                required = data.len(),
                capacity,
                "guest buffer too small, reporting required size"
            );
            return Ok(DataRead::BufferTooSmall {
                required: data.len(),
            });
        }
        debug!(session = %session, ?format, size = data.len(), "host clipboard read complete");
        Ok(DataRead::Complete(data))
    }

    /// The guest answers an outstanding [`HostMessage::ReadDataRequest`]
    /// with its clipboard content.
    ///
    /// The payload resolves the host collaborator's pending request and is
    /// forwarded to the host clipboard. Rejected as stale when `session`
    /// no longer owns the guest offer or the outstanding request does not
    /// match `format`.
    pub async fn write_data(
        &self,
        session: SessionId,
        format: ClipboardFormat,
        data: Vec<u8>,
    ) -> Result<()> {
        if !self.policy.mode().allows_guest_to_host() {
            warn!(session = %session, ?format, "guest write rejected by sharing mode");
            return Err(ClipboardError::ModeViolation);
        }
        if data.len() > self.max_data_size {
            return Err(ClipboardError::PayloadTooLarge {
                actual: data.len(),
                max: self.max_data_size,
            });
        }
        if self.negotiator.owner() != Some(session) {
            warn!(session = %session, "guest write from displaced offer owner");
            return Err(ClipboardError::StaleRequest);
        }

        self.requests.complete(session, format, data.clone())?;
        debug!(session = %session, ?format, size = data.len(), "guest clipboard data received");
        self.backend.write_clipboard(format, data).await
    }

    // -------------------------------------------------------------------------
    // Host collaborator entry points
    // -------------------------------------------------------------------------

    /// The host clipboard changed; record the new offer and notify every
    /// connected session.
    ///
    /// If a guest read is in flight the announcement is deferred until the
    /// read completes, so the read's view of the offer stays coherent.
    pub fn set_host_formats(&self, formats: FormatSet) -> Result<()> {
        if !self.policy.mode().allows_host_to_guest() {
            return Err(ClipboardError::ModeViolation);
        }
        if self.read_gate.defer(formats) {
            return Ok(());
        }
        self.publish_host_offer(formats);
        Ok(())
    }

    /// The host wants the guest clipboard content in `format` (a paste on
    /// the host side).
    ///
    /// Sends a [`HostMessage::ReadDataRequest`] to the session owning the
    /// guest offer and suspends until that session answers via
    /// [`write_data`](Self::write_data). Fails with `NoOffer` when no
    /// owner exists or the owner disconnects before answering.
    pub async fn request_guest_data(&self, format: ClipboardFormat) -> Result<Vec<u8>> {
        if !self.policy.mode().allows_guest_to_host() {
            return Err(ClipboardError::ModeViolation);
        }
        let owner = self.negotiator.owner().ok_or(ClipboardError::NoOffer)?;

        let rx = self.requests.open(owner, format);
        if let Err(err) = self
            .queue
            .enqueue_to(owner, HostMessage::ReadDataRequest(format))
        {
            // Owner raced a disconnect; from the host's view there is no
            // offer anymore.
            debug!(owner = %owner, %err, "guest offer owner vanished before delivery");
            self.requests.cancel_if_target(owner);
            return Err(ClipboardError::NoOffer);
        }

        rx.await.map_err(|_| {
            debug!(owner = %owner, ?format, "guest data request cancelled before an answer");
            ClipboardError::NoOffer
        })
    }

    /// Broadcast [`HostMessage::Quit`] and make every later message wait
    /// resolve with `Quit` immediately. Terminal until the service is
    /// recreated.
    pub fn shutdown(&self) {
        info!("shared clipboard service shutting down");
        self.queue.shutdown();
    }

    fn publish_host_offer(&self, formats: FormatSet) {
        self.negotiator.set_host_offer(formats);
        self.queue.broadcast(HostMessage::FormatsAvailable(formats));
    }
}

impl std::fmt::Debug for SharedClipboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedClipboardService")
            .field("mode", &self.policy.mode())
            .field("sessions", &self.registry.len())
            .finish_non_exhaustive()
    }
}
