//! Clipboard format identification.
//!
//! The guest protocol describes clipboard content as a bitmask of well-known
//! formats. The bit values are part of the guest protocol and must not change.

use enumflags2::{bitflags, BitFlags};

use crate::clipboard::error::{ClipboardError, Result};

/// A single clipboard format understood by the service.
///
/// The discriminants are the wire bit values exchanged with the guest.
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardFormat {
    /// UTF-16LE text
    UnicodeText = 0x01,

    /// Device-independent bitmap
    Bitmap = 0x02,

    /// HTML fragment
    Html = 0x04,
}

/// A set of clipboard formats, as announced by either side.
pub type FormatSet = BitFlags<ClipboardFormat>;

impl ClipboardFormat {
    /// Decode a single format from its wire value.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0x01 => Ok(Self::UnicodeText),
            0x02 => Ok(Self::Bitmap),
            0x04 => Ok(Self::Html),
            _ => Err(ClipboardError::UnknownFormat(raw)),
        }
    }

    /// The wire bit value of this format.
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

/// Decode a format bitmask from its wire value, ignoring unknown bits.
///
/// Guests may announce formats this service does not handle (RTF, file
/// lists); those bits are dropped rather than rejected so that the known
/// part of the offer stays usable.
pub fn format_set_from_raw(raw: u32) -> FormatSet {
    BitFlags::from_bits_truncate(raw)
}

/// Encode a format set to its wire bitmask.
pub fn format_set_to_raw(formats: FormatSet) -> u32 {
    formats.bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(ClipboardFormat::UnicodeText.as_raw(), 0x01);
        assert_eq!(ClipboardFormat::Bitmap.as_raw(), 0x02);
        assert_eq!(ClipboardFormat::Html.as_raw(), 0x04);
    }

    #[test]
    fn test_single_format_from_raw() {
        assert_eq!(
            ClipboardFormat::from_raw(0x02).unwrap(),
            ClipboardFormat::Bitmap
        );
        assert!(matches!(
            ClipboardFormat::from_raw(0x08),
            Err(ClipboardError::UnknownFormat(0x08))
        ));
    }

    #[test]
    fn test_format_set_roundtrip() {
        let set = ClipboardFormat::UnicodeText | ClipboardFormat::Html;
        assert_eq!(format_set_to_raw(set), 0x05);
        assert_eq!(format_set_from_raw(0x05), set);
    }

    #[test]
    fn test_unknown_bits_are_dropped() {
        let set = format_set_from_raw(0xF1);
        assert_eq!(set, FormatSet::from(ClipboardFormat::UnicodeText));
    }
}
