//! Host-side clipboard collaborator boundary.
//!
//! The service never touches the real OS clipboard; it talks to an
//! implementation of [`HostClipboard`] provided by the embedder. The
//! collaborator is expected to apply its own timeouts - the service calls
//! into it at most once per transfer operation and defines none itself.

use async_trait::async_trait;

use crate::clipboard::error::Result;
use crate::clipboard::formats::ClipboardFormat;

/// Access to the host operating system clipboard.
///
/// Implementations watch the real clipboard and feed changes back through
/// [`SharedClipboardService::set_host_formats`](crate::clipboard::service::SharedClipboardService::set_host_formats);
/// they pull guest content through
/// [`request_guest_data`](crate::clipboard::service::SharedClipboardService::request_guest_data).
#[async_trait]
pub trait HostClipboard: Send + Sync {
    /// Read the host clipboard content in `format`.
    ///
    /// Returns `None` when the clipboard no longer holds data in that
    /// format (the content may have changed since it was announced).
    async fn read_clipboard(&self, format: ClipboardFormat) -> Result<Option<Vec<u8>>>;

    /// Write guest clipboard content into the host clipboard.
    async fn write_clipboard(&self, format: ClipboardFormat, data: Vec<u8>) -> Result<()>;
}

/// Backend for headless operation: offers nothing and discards writes.
#[derive(Debug, Default)]
pub struct NullClipboard;

#[async_trait]
impl HostClipboard for NullClipboard {
    async fn read_clipboard(&self, _format: ClipboardFormat) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn write_clipboard(&self, _format: ClipboardFormat, _data: Vec<u8>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_clipboard_has_no_data() {
        let backend = NullClipboard;
        assert_eq!(
            backend.read_clipboard(ClipboardFormat::UnicodeText).await.unwrap(),
            None
        );
        backend
            .write_clipboard(ClipboardFormat::Html, b"<b>x</b>".to_vec())
            .await
            .unwrap();
    }
}
