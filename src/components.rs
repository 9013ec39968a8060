//! This module exports a single struct to store information about
//! JPEG image components
//!
//! The data is extracted from a SOF header.

use crate::errors::DecodeErrors;

pub const MAX_COMPONENTS: usize = 4;

/// Component data read from a start-of-frame segment, plus the coefficient
/// storage and scan-local state it accumulates while the image decodes.
pub struct Component {
    /// Component identifier as it appears in the stream (not assumed to be
    /// Y/Cb/Cr — the container does not require that layout).
    pub id: u8,
    /// Horizontal sampling factor, 1..=4.
    pub horizontal_sample: usize,
    /// Vertical sampling factor, 1..=4.
    pub vertical_sample: usize,
    /// Which of the four quantization table slots this component binds to.
    pub quantization_table_number: u8,
    /// DC Huffman table slot bound by the most recent SOS for this component.
    pub dc_huff_table: usize,
    /// AC Huffman table slot bound by the most recent SOS for this component.
    pub ac_huff_table: usize,
    /// DC predictor, reset to zero at the start of every scan.
    pub dc_pred: i32,
    /// Number of 8x8 blocks per MCU row for this component.
    pub blocks_per_mcu_width: usize,
    /// Number of 8x8 blocks per MCU column for this component.
    pub blocks_per_mcu_height: usize,
    /// Component plane width, in 8x8 blocks (covers the full stuffed width).
    pub blocks_per_line: usize,
    /// Component plane height, in 8x8 blocks (covers the full stuffed height).
    pub blocks_per_column: usize,
    /// Coefficient storage: `blocks_per_line * blocks_per_column` blocks of
    /// 64 zig-zag-ordered coefficients each, flattened row-major.
    pub coefficients: Vec<i32>,
}

impl Component {
    /// Build a component from the 3 raw SOF bytes `(id, hv, tq)`.
    pub fn parse(raw: [u8; 3], max_components_seen: usize) -> Result<Component, DecodeErrors> {
        let id = raw[0];
        let horizontal_sample = (raw[1] >> 4) as usize;
        let vertical_sample = (raw[1] & 0x0F) as usize;
        let quantization_table_number = raw[2];

        if !(1..=4).contains(&horizontal_sample) || !(1..=4).contains(&vertical_sample) {
            return Err(DecodeErrors::SofError(format!(
                "component {} has sampling factors outside 1..=4: H={}, V={}",
                id, horizontal_sample, vertical_sample
            )));
        }
        if usize::from(quantization_table_number) >= MAX_COMPONENTS {
            return Err(DecodeErrors::SofError(format!(
                "component {} references quantization table {}, must be 0..4",
                id, quantization_table_number
            )));
        }
        if max_components_seen > MAX_COMPONENTS {
            return Err(DecodeErrors::TooManyComponents(max_components_seen));
        }

        log::debug!(
            "component id={} H={} V={} Tq={}",
            id,
            horizontal_sample,
            vertical_sample,
            quantization_table_number
        );

        Ok(Component {
            id,
            horizontal_sample,
            vertical_sample,
            quantization_table_number,
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            blocks_per_mcu_width: horizontal_sample,
            blocks_per_mcu_height: vertical_sample,
            blocks_per_line: 0,
            blocks_per_column: 0,
            coefficients: Vec::new(),
        })
    }

    /// Allocate (or re-allocate) the zero-initialized coefficient plane,
    /// once the frame's MCU grid is known.
    pub fn allocate_coefficients(&mut self, num_mcus_x: usize, num_mcus_y: usize) {
        self.blocks_per_line = num_mcus_x * self.blocks_per_mcu_width;
        self.blocks_per_column = num_mcus_y * self.blocks_per_mcu_height;
        self.coefficients = vec![0i32; self.blocks_per_line * self.blocks_per_column * 64];
    }

    #[inline]
    pub fn block_mut(&mut self, block_row: usize, block_col: usize) -> &mut [i32] {
        let index = (block_row * self.blocks_per_line + block_col) * 64;
        &mut self.coefficients[index..index + 64]
    }

    #[inline]
    pub fn block(&self, block_row: usize, block_col: usize) -> &[i32] {
        let index = (block_row * self.blocks_per_line + block_col) * 64;
        &self.coefficients[index..index + 64]
    }
}
