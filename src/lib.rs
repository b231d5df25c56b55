//! # vmclipd
//!
//! Shared clipboard host service for virtual machine guests.
//!
//! The service mediates clipboard content between guest sessions and the
//! host operating system across a narrow synchronous call/response
//! transport. Guests poll for host notifications through a per-session
//! blocking queue; data moves through an explicit read/write handshake
//! whose payload size is only known on the second round trip.
//!
//! # Architecture
//!
//! ```text
//! vmclipd
//!   ├─> Policy Store (sharing mode + headless flag)
//!   ├─> Client Registry (guest sessions)
//!   ├─> Format Negotiator (host/guest offers, guest-offer owner)
//!   ├─> Host Message Queue (per-session FIFO, blocking dequeue)
//!   └─> Shared Clipboard Service (transfer handshake, call surface)
//! ```
//!
//! The transport layer and the real OS clipboard bindings on both sides
//! are external collaborators: the transport delivers resolved calls, the
//! host clipboard sits behind the [`clipboard::HostClipboard`] trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Service configuration
pub mod config;

/// Clipboard service core
pub mod clipboard;

pub use clipboard::{
    ClipboardError, ClipboardFormat, DataRead, FormatSet, HostClipboard, HostMessage,
    NullClipboard, Result, ServiceConfig, SessionId, SharedClipboardService, SharingMode,
    WaitOutcome,
};
