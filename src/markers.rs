//! JPEG marker identification.
//!
//! Every marker is introduced by a `0xFF` byte followed by a non-zero
//! marker byte (runs of `0xFF` fill bytes before the marker byte are legal
//! and are skipped by the caller). This module only identifies markers; the
//! parsing of the segment that follows lives in `headers.rs`.

/// A JPEG marker.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Marker {
    /// Start of image, 0xD8.
    SOI,
    /// End of image, 0xD9.
    EOI,
    /// Start of frame, baseline sequential DCT, Huffman coding, 0xC0.
    SOF0,
    /// Start of frame, progressive DCT, Huffman coding, 0xC2.
    SOF2,
    /// A start-of-frame variant this decoder does not support
    /// (extended sequential, lossless, arithmetic coding, 12-bit, ...).
    UnsupportedSOF(u8),
    /// Define Huffman table(s), 0xC4.
    DHT,
    /// Define quantization table(s), 0xDB.
    DQT,
    /// Start of scan, 0xDA.
    SOS,
    /// Define restart interval — not supported, see `UnsupportedMarker`.
    DRI,
    /// Restart marker 0-7 — not supported since restart intervals are not.
    RST(u8),
    /// Application-specific segment, 0xE0-0xEF.
    APP(u8),
    /// Comment, 0xFE.
    COM,
    /// Define arithmetic conditioning — arithmetic coding is not supported.
    DAC,
    /// Define number of lines — not supported.
    DNL,
    /// Any other marker; carries the raw byte so the caller can decide
    /// whether to skip its length-prefixed payload or error out.
    Other(u8),
}

impl Marker {
    /// Map a marker byte (the byte following `0xFF`) to a `Marker`.
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC0 => Some(Marker::SOF0),
            0xC2 => Some(Marker::SOF2),
            0xC1 | 0xC3 | 0xC5..=0xC7 | 0xC9..=0xCF => Some(Marker::UnsupportedSOF(byte)),
            0xC4 => Some(Marker::DHT),
            0xDB => Some(Marker::DQT),
            0xDA => Some(Marker::SOS),
            0xDD => Some(Marker::DRI),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            0xCC => Some(Marker::DAC),
            0xDC => Some(Marker::DNL),
            0x00 => None,
            _ => Some(Marker::Other(byte)),
        }
    }

    /// Whether this marker's segment carries no length-prefixed payload.
    pub fn has_no_payload(self) -> bool {
        matches!(self, Marker::SOI | Marker::EOI | Marker::RST(_))
    }
}
