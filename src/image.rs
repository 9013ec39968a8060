//! The public decoder facade.
//!
//! Ties together marker parsing (`headers.rs`), the entropy decoders
//! (`mcu.rs`, `mcu_prog.rs`), and the reconstruction pipeline (`idct.rs`,
//! `upsampler.rs`) behind a small `Decoder` type.

use std::fs::read;
use std::path::Path;

use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::frame::FrameState;
use crate::headers::{
    parse_dqt, parse_huffman, parse_sos, parse_start_of_frame, skip_segment, validate_data_units_per_mcu,
};
use crate::huffman::HuffmanTable;
use crate::idct::idct_8x8;
use crate::markers::Marker;
use crate::mcu::decode_sequential_scan;
use crate::mcu_prog::{decode_progressive_ac_scan, decode_progressive_dc_scan};
use crate::misc::{dequantize_and_unzigzag, ByteReader, FrameMode};
use crate::upsampler::{crop_to_size, merge_planes, upsample_nearest_neighbor};

/// Options controlling a decode. The defaults decode every component at
/// full fidelity using one reconstruction thread per CPU.
pub struct DecoderOptions {
    /// Skip allocating/reconstructing chroma planes; only the first
    /// (luma) component is decoded to pixels.
    pub grayscale_only: bool,
    /// Override the reconstruction thread-pool size. `None` defaults to
    /// `num_cpus::get()`.
    pub thread_count: Option<usize>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            grayscale_only: false,
            thread_count: None,
        }
    }
}

/// A decoded image: raw, pre-colour-conversion per-component sample
/// planes, interleaved component-minor.
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub num_components: usize,
    pub pixels: Vec<u8>,
}

/// The JPEG decoder facade.
pub struct Decoder {
    options: DecoderOptions,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    pub fn new() -> Decoder {
        Decoder {
            options: DecoderOptions::default(),
        }
    }

    pub fn with_options(options: DecoderOptions) -> Decoder {
        Decoder { options }
    }

    /// Decode a complete JPEG file from a byte buffer.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedImage, DecodeErrors> {
        let mut reader = ByteReader::new(data);

        let soi = reader.read_u16_be()?;
        if soi != 0xFFD8 {
            return Err(DecodeErrors::BadMagic(soi));
        }

        let mut qt_tables: [Option<[u16; 64]>; 4] = [None, None, None, None];
        let mut dc_tables: [Option<HuffmanTable>; 4] = [None, None, None, None];
        let mut ac_tables: [Option<HuffmanTable>; 4] = [None, None, None, None];
        let mut frame: Option<FrameState> = None;

        loop {
            let marker = self.next_marker(&mut reader)?;
            log::trace!("marker: {:?} at offset {}", marker, reader.position());

            match marker {
                Marker::SOI => continue,
                Marker::EOI => break,
                Marker::DQT => {
                    let tables = parse_dqt(&mut reader)?;
                    for (slot, new_table) in qt_tables.iter_mut().zip(tables.into_iter()) {
                        if new_table.is_some() {
                            *slot = new_table;
                        }
                    }
                }
                Marker::DHT => {
                    let (dc, ac) = parse_huffman(&mut reader)?;
                    for (slot, new_table) in dc_tables.iter_mut().zip(dc.into_iter()) {
                        if new_table.is_some() {
                            *slot = new_table;
                        }
                    }
                    for (slot, new_table) in ac_tables.iter_mut().zip(ac.into_iter()) {
                        if new_table.is_some() {
                            *slot = new_table;
                        }
                    }
                }
                Marker::SOF0 | Marker::SOF2 => {
                    let mode = if marker == Marker::SOF0 {
                        FrameMode::Sequential
                    } else {
                        FrameMode::Progressive
                    };
                    let (precision, height, width, components) =
                        parse_start_of_frame(&mut reader)?;
                    log::debug!(
                        "frame: mode={:?} {}x{} {} component(s)",
                        mode,
                        width,
                        height,
                        components.len()
                    );
                    frame = Some(FrameState::new(mode, precision, height, width, components)?);
                }
                Marker::UnsupportedSOF(byte) => {
                    return Err(DecodeErrors::UnsupportedMarker(format!(
                        "start-of-frame variant {:#x} is not a supported encoding",
                        byte
                    )));
                }
                Marker::SOS => {
                    let frame_state = frame
                        .as_mut()
                        .ok_or_else(|| DecodeErrors::SosError("SOS before SOF".to_string()))?;
                    let scan = parse_sos(&mut reader, frame_state.mode)?;
                    validate_data_units_per_mcu(&scan, &frame_state.components)?;
                    let raw_entropy = reader.read_entropy_segment();
                    let mut stream = crate::bitstream::BitStream::new(raw_entropy);

                    log::debug!(
                        "scan: Ss={} Se={} Ah={} Al={} components={}",
                        scan.ss,
                        scan.se,
                        scan.ah,
                        scan.al,
                        scan.components.len()
                    );

                    match frame_state.mode {
                        FrameMode::Sequential => {
                            decode_sequential_scan(
                                &mut frame_state.components,
                                &scan,
                                &dc_tables,
                                &ac_tables,
                                frame_state.num_mcus_x,
                                frame_state.num_mcus_y,
                                &mut stream,
                            )?;
                        }
                        FrameMode::Progressive => {
                            if scan.ss == 0 {
                                decode_progressive_dc_scan(
                                    &mut frame_state.components,
                                    &scan,
                                    &dc_tables,
                                    frame_state.num_mcus_x,
                                    frame_state.num_mcus_y,
                                    scan.al,
                                    scan.ah > 0,
                                    &mut stream,
                                )?;
                            } else {
                                let scan_component = &scan.components[0];
                                let comp_index = frame_state
                                    .component_index(scan_component.id)
                                    .ok_or_else(|| {
                                        DecodeErrors::SosError(format!(
                                            "scan references unknown component id {}",
                                            scan_component.id
                                        ))
                                    })?;
                                let ac_table = ac_tables[scan_component.ac_table as usize]
                                    .as_ref()
                                    .ok_or(DecodeErrors::MissingHuffmanTable(
                                        scan_component.ac_table,
                                    ))?;
                                decode_progressive_ac_scan(
                                    &mut frame_state.components[comp_index],
                                    ac_table,
                                    scan.ss,
                                    scan.se,
                                    scan.al,
                                    scan.ah > 0,
                                    &mut stream,
                                )?;
                            }
                        }
                    }
                }
                Marker::DRI | Marker::DAC | Marker::DNL => {
                    return Err(DecodeErrors::UnsupportedMarker(format!(
                        "{:?} is not supported by this decoder",
                        marker
                    )));
                }
                Marker::RST(n) => {
                    return Err(DecodeErrors::UnsupportedMarker(format!(
                        "restart marker RST{} encountered, but restart intervals are not supported",
                        n
                    )));
                }
                Marker::APP(_) | Marker::COM | Marker::Other(_) => {
                    log::warn!("skipping segment for marker {:?}", marker);
                    skip_segment(&mut reader)?;
                }
            }
        }

        let frame = frame.ok_or_else(|| DecodeErrors::SofError("no SOF segment found".to_string()))?;
        self.reconstruct(frame, &qt_tables)
    }

    /// Convenience wrapper: read a file from disk and decode it.
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<DecodedImage, DecodeErrors> {
        let data = read(path).map_err(|e| {
            log::error!("failed to read file: {}", e);
            DecodeErrors::UnexpectedEndOfInput(crate::errors::Context::new())
        })?;
        self.decode(&data)
    }

    /// Advance past `0xFF` fill bytes and identify the next marker.
    fn next_marker(&self, reader: &mut ByteReader) -> Result<Marker, DecodeErrors> {
        loop {
            let mut byte = reader.read_u8()?;
            if byte != 0xFF {
                return Err(DecodeErrors::BadMagic(u16::from(byte)));
            }
            // 0xFF fill bytes may precede the real marker byte
            while byte == 0xFF {
                byte = reader.read_u8()?;
            }
            if let Some(marker) = Marker::from_u8(byte) {
                return Ok(marker);
            }
        }
    }

    /// Dequantize, inverse-DCT, upsample and interleave every component's
    /// coefficient plane into the final pixel buffer.
    fn reconstruct(
        &self,
        frame: FrameState,
        qt_tables: &[Option<[u16; 64]>; 4],
    ) -> Result<DecodedImage, DecodeErrors> {
        let stuffed_width = frame.stuffed_width();
        let stuffed_height = frame.stuffed_height();
        let h_max = frame.h_max;
        let v_max = frame.v_max;

        let components_to_decode: Vec<usize> = if self.options.grayscale_only {
            vec![0]
        } else {
            (0..frame.components.len()).collect()
        };

        let components = &frame.components;

        // Validate every referenced quantization table exists before
        // handing out references to the scoped closures below.
        for &index in &components_to_decode {
            let component = &components[index];
            if qt_tables[component.quantization_table_number as usize].is_none() {
                return Err(DecodeErrors::MissingQuantizationTable(
                    component.quantization_table_number,
                ));
            }
        }

        let thread_count = self.options.thread_count.unwrap_or_else(num_cpus::get).max(1);
        let mut pool = scoped_threadpool::Pool::new(thread_count as u32);

        let mut planes: Vec<Option<Vec<u8>>> = components_to_decode.iter().map(|_| None).collect();

        pool.scoped(|scope| {
            for (slot, &index) in planes.iter_mut().zip(components_to_decode.iter()) {
                let component = &components[index];
                let quant_table = qt_tables[component.quantization_table_number as usize]
                    .as_ref()
                    .expect("presence validated above");
                let h_scale = h_max / component.horizontal_sample;
                let v_scale = v_max / component.vertical_sample;
                scope.execute(move || {
                    *slot = Some(reconstruct_component(component, quant_table, h_scale, v_scale));
                });
            }
        });

        let resolved_planes: Vec<Vec<u8>> = planes
            .into_iter()
            .map(|plane| plane.expect("every requested component was reconstructed"))
            .collect();

        let num_components = resolved_planes.len();
        let merged = merge_planes(&resolved_planes, stuffed_width, stuffed_height);
        let cropped = crop_to_size(&merged, stuffed_width, frame.width, frame.height, num_components);

        Ok(DecodedImage {
            width: frame.width,
            height: frame.height,
            num_components,
            pixels: cropped,
        })
    }
}

/// Dequantize, IDCT and nearest-neighbour upsample a single component's
/// coefficient plane into a full-stuffed-resolution sample plane.
fn reconstruct_component(
    component: &Component,
    quant_table: &[u16; 64],
    h_scale: usize,
    v_scale: usize,
) -> Vec<u8> {
    let plane_width = component.blocks_per_line * 8;
    let plane_height = component.blocks_per_column * 8;
    let mut plane = vec![0u8; plane_width * plane_height];

    for block_row in 0..component.blocks_per_column {
        for block_col in 0..component.blocks_per_line {
            let coeffs = component.block(block_row, block_col);
            let coeffs: [i32; 64] = coeffs.try_into().expect("block is always 64 coefficients");
            let mut natural = [0i32; 64];
            dequantize_and_unzigzag(&coeffs, quant_table, &mut natural);
            idct_8x8(&mut natural);

            let base_row = block_row * 8;
            let base_col = block_col * 8;
            for y in 0..8 {
                for x in 0..8 {
                    plane[(base_row + y) * plane_width + (base_col + x)] = natural[y * 8 + x] as u8;
                }
            }
        }
    }

    upsample_nearest_neighbor(&plane, plane_width, plane_height, h_scale, v_scale)
}
