//! Transfer policy: directional sharing mode and the headless flag.
//!
//! Both values are process-wide, mutated only by privileged host calls, and
//! consulted by every directional operation at call time. Changing the mode
//! never invalidates notifications that are already queued.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clipboard::error::{ClipboardError, Result};

/// Direction policy for clipboard transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SharingMode {
    /// No transfers in either direction
    Off,
    /// Host clipboard may be read by the guest
    HostToGuest,
    /// Guest clipboard may be read by the host
    GuestToHost,
    /// Transfers allowed both ways
    Bidirectional,
}

impl SharingMode {
    /// Decode a mode from its wire value.
    ///
    /// Values outside the defined range are rejected and leave any stored
    /// mode untouched; they are never coerced to `Off`.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Off),
            1 => Ok(Self::HostToGuest),
            2 => Ok(Self::GuestToHost),
            3 => Ok(Self::Bidirectional),
            other => Err(ClipboardError::InvalidMode(other)),
        }
    }

    /// The wire value of this mode.
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Off => 0,
            Self::HostToGuest => 1,
            Self::GuestToHost => 2,
            Self::Bidirectional => 3,
        }
    }

    /// Whether host clipboard content may flow to the guest.
    pub const fn allows_host_to_guest(self) -> bool {
        matches!(self, Self::HostToGuest | Self::Bidirectional)
    }

    /// Whether guest clipboard content may flow to the host.
    pub const fn allows_guest_to_host(self) -> bool {
        matches!(self, Self::GuestToHost | Self::Bidirectional)
    }
}

impl Default for SharingMode {
    fn default() -> Self {
        Self::Off
    }
}

/// Process-wide policy store.
#[derive(Debug)]
pub struct PolicyStore {
    inner: RwLock<PolicyInner>,
}

#[derive(Debug)]
struct PolicyInner {
    mode: SharingMode,
    headless: bool,
}

impl PolicyStore {
    /// Create a policy store with the given initial settings.
    pub fn new(mode: SharingMode, headless: bool) -> Self {
        Self {
            inner: RwLock::new(PolicyInner { mode, headless }),
        }
    }

    /// Replace the stored mode. Takes effect for all operations issued
    /// after this call returns.
    pub fn set_mode(&self, mode: SharingMode) {
        self.inner.write().mode = mode;
        debug!(?mode, "sharing mode updated");
    }

    /// Replace the stored mode from a wire value, rejecting undefined
    /// values without touching the current mode.
    pub fn set_mode_raw(&self, raw: u32) -> Result<()> {
        let mode = SharingMode::from_raw(raw)?;
        self.set_mode(mode);
        Ok(())
    }

    /// The mode current at this instant.
    pub fn mode(&self) -> SharingMode {
        self.inner.read().mode
    }

    /// Store the headless flag. The flag is consumed by the host-side
    /// clipboard collaborator, not enforced here.
    pub fn set_headless(&self, headless: bool) {
        self.inner.write().headless = headless;
        debug!(headless, "headless flag updated");
    }

    /// The headless flag current at this instant.
    pub fn headless(&self) -> bool {
        self.inner.read().headless
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(SharingMode::Off, false)
    }
}
