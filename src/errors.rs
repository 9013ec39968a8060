//! Contains most common errors that may be encountered in decoding a JPEG image
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Location of a failure inside the entropy-coded stream or container.
///
/// Carried by variants that can occur mid-scan so a caller can locate the
/// failure without re-deriving it from a message string.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub offset: Option<usize>,
    pub component_id: Option<u8>,
    pub mcu: Option<(usize, usize)>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Context {
        self.offset = Some(offset);
        self
    }
    #[must_use]
    pub fn with_component(mut self, id: u8) -> Context {
        self.component_id = Some(id);
        self
    }
    #[must_use]
    pub fn with_mcu(mut self, row: usize, col: usize) -> Context {
        self.mcu = Some((row, col));
        self
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut wrote_any = false;
        if let Some(offset) = self.offset {
            write!(f, "offset={}", offset)?;
            wrote_any = true;
        }
        if let Some(id) = self.component_id {
            write!(f, "{}component={}", if wrote_any { ", " } else { "" }, id)?;
            wrote_any = true;
        }
        if let Some((row, col)) = self.mcu {
            write!(f, "{}mcu=({},{})", if wrote_any { ", " } else { "" }, row, col)?;
        }
        Ok(())
    }
}

/// Common decode errors.
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// Missing or malformed SOI/EOI framing.
    BadMagic(u16),
    /// Buffer ran out while a segment or header was still being read.
    UnexpectedEndOfInput(Context),
    /// Entropy-coded bits ran out before a data unit was finished.
    UnexpectedEndOfScan(Context),
    /// A marker this decoder deliberately does not support (hierarchical,
    /// arithmetic, restart intervals, extended precision, ...).
    UnsupportedMarker(String),
    /// Problems building or walking a Huffman table.
    MalformedHuffmanTable(String),
    /// A codeword failed to resolve to a symbol within 16 bits.
    InvalidHuffmanCode(Context),
    /// Problems with a DQT segment.
    MalformedQuantizationTable(String),
    /// Sample precision is not the 8 bits this decoder supports.
    UnsupportedPrecision(u8),
    /// Too many components in a frame, or too many data units in one MCU.
    TooManyComponents(usize),
    /// Ss/Se/Ah/Al combination is not legal for the scan's mode.
    IllegalSpectralSelection(String),
    /// A component scan referenced a table identifier that was never
    /// installed by a DQT/DHT segment.
    MissingHuffmanTable(u8),
    MissingQuantizationTable(u8),
    /// An AC coefficient position ran past 63.
    InvalidBlockOverflow(Context),
    /// `S > 1` in an AC successive-approximation refinement scan.
    InvalidAcRefineSymbol(Context),
    /// Start of frame errors not covered by a more specific variant above.
    SofError(String),
    /// Start of scan errors not covered by a more specific variant above.
    SosError(String),
    /// Image has zero width or height.
    ZeroSizeError,
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMagic(bytes) => {
                write!(f, "Error parsing image. Illegal start bytes: {:#x}", bytes)
            }
            Self::UnexpectedEndOfInput(ctx) => write!(f, "Unexpected end of input ({})", ctx),
            Self::UnexpectedEndOfScan(ctx) => {
                write!(f, "Unexpected end of entropy-coded scan ({})", ctx)
            }
            Self::UnsupportedMarker(reason) => {
                write!(f, "Unsupported JPEG feature. Reason: {}", reason)
            }
            Self::MalformedHuffmanTable(reason) => {
                write!(f, "Error decoding Huffman tables. Reason: {}", reason)
            }
            Self::InvalidHuffmanCode(ctx) => {
                write!(f, "Huffman code did not resolve within 16 bits ({})", ctx)
            }
            Self::MalformedQuantizationTable(reason) => {
                write!(f, "Error parsing DQT segment. Reason: {}", reason)
            }
            Self::UnsupportedPrecision(bits) => {
                write!(f, "Unsupported sample precision: {} bits", bits)
            }
            Self::TooManyComponents(got) => write!(f, "Too many components/data units: {}", got),
            Self::IllegalSpectralSelection(reason) => {
                write!(f, "Illegal spectral selection. Reason: {}", reason)
            }
            Self::MissingHuffmanTable(id) => {
                write!(f, "No Huffman table installed for identifier {}", id)
            }
            Self::MissingQuantizationTable(id) => {
                write!(f, "No quantization table installed for identifier {}", id)
            }
            Self::InvalidBlockOverflow(ctx) => {
                write!(f, "AC coefficient position exceeded 63 ({})", ctx)
            }
            Self::InvalidAcRefineSymbol(ctx) => {
                write!(f, "Illegal symbol in AC refinement scan ({})", ctx)
            }
            Self::SofError(reason) => write!(f, "Error parsing SOF segment. Reason: {}", reason),
            Self::SosError(reason) => write!(f, "Error parsing SOS segment. Reason: {}", reason),
            Self::ZeroSizeError => {
                write!(f, "Image width or height is set to zero, cannot continue")
            }
        }
    }
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Error for DecodeErrors {}

impl DecodeErrors {
    /// Merge scan-location info into this error's `Context`, preserving
    /// its variant and any offset already recorded. Errors whose variant
    /// doesn't carry a `Context` (a missing table, a malformed header) are
    /// returned unchanged — the variant itself already identifies the
    /// failure without needing an MCU coordinate.
    #[must_use]
    pub fn with_scan_location(self, component_id: u8, mcu_row: usize, mcu_col: usize) -> DecodeErrors {
        let patch = |ctx: Context| ctx.with_component(component_id).with_mcu(mcu_row, mcu_col);
        match self {
            DecodeErrors::UnexpectedEndOfInput(ctx) => DecodeErrors::UnexpectedEndOfInput(patch(ctx)),
            DecodeErrors::UnexpectedEndOfScan(ctx) => DecodeErrors::UnexpectedEndOfScan(patch(ctx)),
            DecodeErrors::InvalidHuffmanCode(ctx) => DecodeErrors::InvalidHuffmanCode(patch(ctx)),
            DecodeErrors::InvalidBlockOverflow(ctx) => DecodeErrors::InvalidBlockOverflow(patch(ctx)),
            DecodeErrors::InvalidAcRefineSymbol(ctx) => DecodeErrors::InvalidAcRefineSymbol(patch(ctx)),
            other => other,
        }
    }
}
