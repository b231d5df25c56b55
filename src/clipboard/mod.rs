//! Shared Clipboard Host Service
//!
//! Mediates clipboard content between guest sessions inside a virtual
//! machine and the host operating system. Both sides own an independent
//! clipboard; the service keeps them loosely consistent under a
//! configurable directional policy without assuming either side is
//! listening.
//!
//! # Architecture
//!
//! - [`PolicyStore`] - directional mode and headless flag (privileged calls)
//! - [`ClientRegistry`] - connected guest sessions
//! - [`FormatNegotiator`] - host/guest offers and guest-offer ownership
//! - [`HostMessageQueue`] - per-session FIFO with blocking delivery
//! - [`SharedClipboardService`] - the call surface wiring it all together
//!
//! The real OS clipboards live behind the [`HostClipboard`] collaborator
//! trait on the host side and behind the guest-side process wrapping each
//! session; neither is part of this crate's core.

pub mod backend;
pub mod error;
pub mod formats;
pub mod negotiator;
pub mod policy;
pub mod queue;
pub mod registry;
pub mod service;
pub mod transfer;

pub use backend::{HostClipboard, NullClipboard};
pub use error::{ClipboardError, Result};
pub use formats::{format_set_from_raw, format_set_to_raw, ClipboardFormat, FormatSet};
pub use negotiator::FormatNegotiator;
pub use policy::{PolicyStore, SharingMode};
pub use queue::{HostMessage, HostMessageQueue, WaitOutcome};
pub use registry::{ClientRegistry, SessionId};
pub use service::{ServiceConfig, SharedClipboardService};
pub use transfer::DataRead;
