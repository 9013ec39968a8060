//! Canonical Huffman table construction and decoding.
//!
//! Tables are built from a `(BITS, HUFFVAL)` pair per T.81 Annex C, and
//! decoded one bit at a time using the `mincode`/`maxcode`/`valptr`
//! indirection of Annex F.12 rather than a combined fast-path lookup: the
//! successive-approximation scans this decoder supports read individual
//! bits at a handful of call sites, not whole symbols at sustained
//! throughput, so a single bit-at-a-time path is all that's needed.

use crate::errors::{Context, DecodeErrors};

#[allow(clippy::module_name_repetitions)]
pub struct HuffmanTable {
    /// values in code-length order, as read from HUFFVAL
    values: Vec<u8>,
    /// smallest code of each length, 1..=16 (index 0 unused)
    mincode: [i32; 17],
    /// largest code of each length, or -1 if no code of that length exists
    maxcode: [i32; 17],
    /// index into `values` of the first symbol of each length
    valptr: [i32; 17],
}

impl HuffmanTable {
    /// Build a table from the 16-entry `BITS` count array and the
    /// `HUFFVAL` symbol list, per T.81 Annex C (Figure C.1 / C.2).
    pub fn new(bits: &[u8; 16], values: Vec<u8>) -> Result<HuffmanTable, DecodeErrors> {
        let total: usize = bits.iter().map(|&b| b as usize).sum();
        if total != values.len() {
            return Err(DecodeErrors::MalformedHuffmanTable(format!(
                "BITS declares {} symbols but HUFFVAL carries {}",
                total,
                values.len()
            )));
        }
        if total > 256 {
            return Err(DecodeErrors::MalformedHuffmanTable(
                "more than 256 symbols in a single table".to_string(),
            ));
        }

        let mut mincode = [0i32; 17];
        let mut maxcode = [-1i32; 17];
        let mut valptr = [0i32; 17];

        let mut code = 0i32;
        let mut k = 0i32;
        for len in 1..=16usize {
            let count = bits[len - 1] as i32;
            if count == 0 {
                maxcode[len] = -1;
                code <<= 1;
                continue;
            }
            valptr[len] = k;
            mincode[len] = code;
            code += count;
            k += count;
            maxcode[len] = code - 1;
            code <<= 1;
        }

        Ok(HuffmanTable {
            values,
            mincode,
            maxcode,
            valptr,
        })
    }

    /// Decode one symbol, pulling bits one at a time from `next_bit`.
    ///
    /// `next_bit` returns the next bit of the entropy-coded stream; it is
    /// expected to be a closure over a `BitStream`.
    pub fn decode<F>(&self, mut next_bit: F) -> Result<u8, DecodeErrors>
    where
        F: FnMut() -> Result<u32, DecodeErrors>,
    {
        let mut code = next_bit()? as i32;
        for len in 1..=16usize {
            if self.maxcode[len] >= 0 && code <= self.maxcode[len] {
                let index = (self.valptr[len] + (code - self.mincode[len])) as usize;
                return self.values.get(index).copied().ok_or_else(|| {
                    DecodeErrors::MalformedHuffmanTable(
                        "decoded symbol index out of range".to_string(),
                    )
                });
            }
            code = (code << 1) | (next_bit()? as i32);
        }
        Err(DecodeErrors::InvalidHuffmanCode(Context::new()))
    }
}
