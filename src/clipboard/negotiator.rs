//! Format negotiation state: the host offer, the guest offer, and the
//! session that owns the guest offer.
//!
//! All three fields are last-writer-wins and live behind a single lock;
//! no operation spans more than one of the service's shared fields.

use parking_lot::RwLock;
use tracing::debug;

use crate::clipboard::formats::FormatSet;
use crate::clipboard::registry::SessionId;

/// Tracks which formats each side currently offers and which session
/// answers guest-side data requests.
#[derive(Debug, Default)]
pub struct FormatNegotiator {
    inner: RwLock<NegotiatorInner>,
}

#[derive(Debug, Default)]
struct NegotiatorInner {
    host_offer: FormatSet,
    guest_offer: FormatSet,
    owner: Option<SessionId>,
}

impl FormatNegotiator {
    /// Create a negotiator with empty offers and no owner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a guest format announcement, making `session` the owner.
    /// The most recent successful announcement wins; any previous owner is
    /// displaced.
    pub fn set_guest_offer(&self, session: SessionId, formats: FormatSet) {
        let mut inner = self.inner.write();
        let displaced = inner.owner.filter(|&prev| prev != session);
        inner.guest_offer = formats;
        inner.owner = Some(session);
        match displaced {
            Some(prev) => {
                debug!(session = %session, previous = %prev, ?formats, "guest offer ownership moved")
            }
            None => debug!(session = %session, ?formats, "guest offer recorded"),
        }
    }

    /// Replace the host offer.
    pub fn set_host_offer(&self, formats: FormatSet) {
        self.inner.write().host_offer = formats;
        debug!(?formats, "host offer recorded");
    }

    /// The formats the host currently offers.
    pub fn host_offer(&self) -> FormatSet {
        self.inner.read().host_offer
    }

    /// The formats the guest currently offers.
    pub fn guest_offer(&self) -> FormatSet {
        self.inner.read().guest_offer
    }

    /// The session answering guest-side data requests, if any.
    pub fn owner(&self) -> Option<SessionId> {
        self.inner.read().owner
    }

    /// Release ownership if `session` holds it, clearing the guest offer.
    /// Returns true if ownership was released.
    pub fn release_owner_if(&self, session: SessionId) -> bool {
        let mut inner = self.inner.write();
        if inner.owner == Some(session) {
            inner.owner = None;
            inner.guest_offer = FormatSet::empty();
            debug!(session = %session, "guest offer ownership released");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::formats::ClipboardFormat;
    use crate::clipboard::registry::ClientRegistry;

    #[test]
    fn test_latest_announcement_wins_ownership() {
        let registry = ClientRegistry::new();
        let negotiator = FormatNegotiator::new();
        let a = registry.connect();
        let b = registry.connect();

        negotiator.set_guest_offer(a, ClipboardFormat::UnicodeText.into());
        assert_eq!(negotiator.owner(), Some(a));

        negotiator.set_guest_offer(b, ClipboardFormat::Html.into());
        assert_eq!(negotiator.owner(), Some(b));
        assert_eq!(negotiator.guest_offer(), ClipboardFormat::Html);
    }

    #[test]
    fn test_release_only_for_current_owner() {
        let registry = ClientRegistry::new();
        let negotiator = FormatNegotiator::new();
        let a = registry.connect();
        let b = registry.connect();

        negotiator.set_guest_offer(a, ClipboardFormat::Bitmap.into());
        negotiator.set_guest_offer(b, ClipboardFormat::Bitmap.into());

        assert!(!negotiator.release_owner_if(a));
        assert_eq!(negotiator.owner(), Some(b));

        assert!(negotiator.release_owner_if(b));
        assert_eq!(negotiator.owner(), None);
        assert!(negotiator.guest_offer().is_empty());
    }

    #[test]
    fn test_host_offer_last_writer_wins() {
        let negotiator = FormatNegotiator::new();
        negotiator.set_host_offer(ClipboardFormat::UnicodeText | ClipboardFormat::Bitmap);
        negotiator.set_host_offer(ClipboardFormat::Html.into());
        assert_eq!(negotiator.host_offer(), ClipboardFormat::Html);
    }
}
