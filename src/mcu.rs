//! Baseline sequential scan decoding and the shared MCU traversal helpers
//! that progressive interleaved (DC) scans reuse.

use crate::bitstream::BitStream;
use crate::components::Component;
use crate::errors::{Context, DecodeErrors};
use crate::headers::ScanHeader;
use crate::huffman::HuffmanTable;

/// Decode one data unit's worth of sequential coefficients (Ss=0, Se=63,
/// Ah=Al=0) into zig-zag order, updating `prev_dc` in place.
pub fn decode_data_unit_sequential(
    stream: &mut BitStream,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    prev_dc: &mut i32,
) -> Result<[i32; 64], DecodeErrors> {
    let mut block = [0i32; 64];

    let dc_symbol = stream.decode_huffman(dc_table)?;
    let diff = stream.take_extended(dc_symbol)?;
    *prev_dc += diff;
    block[0] = *prev_dc;

    let mut k = 1usize;
    while k < 64 {
        let rs = stream.decode_huffman(ac_table)?;
        let run = rs >> 4;
        let size = rs & 0x0F;

        if rs == 0x00 {
            // EOB: remainder of block is zero
            break;
        }
        if rs == 0xF0 {
            // ZRL: 16 zero coefficients. k == 64 exactly means the run
            // landed on the end of the block, which is not an overflow.
            k += 16;
            if k > 64 {
                return Err(DecodeErrors::InvalidBlockOverflow(Context::new()));
            }
            continue;
        }

        k += run as usize;
        if k >= 64 {
            return Err(DecodeErrors::InvalidBlockOverflow(Context::new()));
        }
        block[k] = stream.take_extended(size)?;
        k += 1;
    }

    Ok(block)
}

/// Decode a full baseline-sequential scan, visiting MCUs in raster order
/// and, within each, components in scan order and each component's
/// `Vi x Hi` data units in raster order.
pub fn decode_sequential_scan(
    components: &mut [Component],
    scan: &ScanHeader,
    dc_tables: &[Option<HuffmanTable>; 4],
    ac_tables: &[Option<HuffmanTable>; 4],
    num_mcus_x: usize,
    num_mcus_y: usize,
    stream: &mut BitStream,
) -> Result<(), DecodeErrors> {
    for component in components.iter_mut() {
        component.dc_pred = 0;
    }

    for mcu_row in 0..num_mcus_y {
        for mcu_col in 0..num_mcus_x {
            for scan_component in &scan.components {
                let comp_index = components
                    .iter()
                    .position(|c| c.id == scan_component.id)
                    .ok_or_else(|| {
                        DecodeErrors::SosError(format!(
                            "scan references unknown component id {}",
                            scan_component.id
                        ))
                    })?;

                let dc_table = dc_tables[scan_component.dc_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::MissingHuffmanTable(scan_component.dc_table))?;
                let ac_table = ac_tables[scan_component.ac_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::MissingHuffmanTable(scan_component.ac_table))?;

                let component = &mut components[comp_index];
                let (bw, bh) = (component.blocks_per_mcu_width, component.blocks_per_mcu_height);
                let mut prev_dc = component.dc_pred;

                for v in 0..bh {
                    for h in 0..bw {
                        let block_row = mcu_row * bh + v;
                        let block_col = mcu_col * bw + h;
                        let block =
                            decode_data_unit_sequential(stream, dc_table, ac_table, &mut prev_dc)
                                .map_err(|e| e.with_scan_location(scan_component.id, mcu_row, mcu_col))?;
                        component
                            .block_mut(block_row, block_col)
                            .copy_from_slice(&block);
                    }
                }
                component.dc_pred = prev_dc;
            }
        }
    }

    Ok(())
}
