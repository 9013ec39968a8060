//! Decode JPEG segment headers.
//!
//! This file deals with decoding header information: quantization tables,
//! Huffman tables, the frame header, and scan headers.
//!
//! A good guide on markers can be found at
//! <http://vip.sugovica.hu/Sardi/kepnezo/JPEG%20File%20Layout%20and%20Format.htm>

use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::{ByteReader, FrameMode};

/// Per-component entry of a parsed `SOS` header.
pub struct ScanComponent {
    pub id: u8,
    pub dc_table: u8,
    pub ac_table: u8,
}

/// Parsed `SOS` header: which components participate, in what order, and
/// the spectral-selection / successive-approximation parameters that pick
/// a scan's mode.
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub ss: u8,
    pub se: u8,
    pub ah: u8,
    pub al: u8,
}

/// **B.2.4.1 Quantization table-specification syntax.**
///
/// A single DQT segment may carry more than one table; tables are kept in
/// zig-zag order here, as read — dequantization happens at reconstruction
/// time, not at parse time.
pub fn parse_dqt(reader: &mut ByteReader) -> Result<[Option<[u16; 64]>; 4], DecodeErrors> {
    let mut tables: [Option<[u16; 64]>; 4] = [None, None, None, None];

    let length = reader.read_u16_be()?;
    let mut consumed = 2u16;

    while consumed < length {
        let info = reader.read_u8()?;
        let precision = info >> 4;
        let table_id = (info & 0x0F) as usize;
        if table_id >= 4 {
            return Err(DecodeErrors::MalformedQuantizationTable(format!(
                "table identifier {} is outside 0..4",
                table_id
            )));
        }

        let mut values = [0u16; 64];
        match precision {
            0 => {
                for slot in values.iter_mut() {
                    *slot = u16::from(reader.read_u8()?);
                }
                consumed += 1 + 64;
            }
            1 => {
                for slot in values.iter_mut() {
                    *slot = reader.read_u16_be()?;
                }
                consumed += 1 + 128;
            }
            _ => {
                return Err(DecodeErrors::MalformedQuantizationTable(format!(
                    "expected precision of 0 or 1, found {}",
                    precision
                )));
            }
        }

        tables[table_id] = Some(values);
    }

    Ok(tables)
}

/// **B.2.4.2 Huffman table-specification syntax.**
///
/// A single DHT segment may carry more than one table.
pub fn parse_huffman(
    reader: &mut ByteReader,
) -> Result<([Option<HuffmanTable>; 4], [Option<HuffmanTable>; 4]), DecodeErrors> {
    let mut dc_tables: [Option<HuffmanTable>; 4] = [None, None, None, None];
    let mut ac_tables: [Option<HuffmanTable>; 4] = [None, None, None, None];

    let length = reader.read_u16_be()?;
    let mut consumed = 2u16;

    while consumed < length {
        let info = reader.read_u8()?;
        let is_ac = (info >> 4) & 0x01 != 0;
        let index = (info & 0x0F) as usize;
        if index >= 4 {
            return Err(DecodeErrors::MalformedHuffmanTable(format!(
                "table identifier {} is outside 0..4",
                index
            )));
        }

        let mut bits = [0u8; 16];
        for slot in bits.iter_mut() {
            *slot = reader.read_u8()?;
        }
        let symbol_count: u16 = bits.iter().map(|&b| u16::from(b)).sum();
        let values = reader.read_slice(symbol_count as usize)?.to_vec();

        consumed += 1 + 16 + symbol_count;

        let table = HuffmanTable::new(&bits, values)?;
        if is_ac {
            ac_tables[index] = Some(table);
        } else {
            dc_tables[index] = Some(table);
        }
    }

    Ok((dc_tables, ac_tables))
}

/// **B.2.2 Frame header syntax.** Returns the decoded precision/height/
/// width/components; MCU geometry and table binding are the caller's job
/// once the quantization tables parsed so far are known.
pub fn parse_start_of_frame(
    reader: &mut ByteReader,
) -> Result<(u8, usize, usize, Vec<Component>), DecodeErrors> {
    let length = reader.read_u16_be()?;

    let precision = reader.read_u8()?;
    if precision != 8 {
        return Err(DecodeErrors::UnsupportedPrecision(precision));
    }

    let height = usize::from(reader.read_u16_be()?);
    let width = usize::from(reader.read_u16_be()?);

    let num_components = reader.read_u8()?;
    let expected_length = 8 + 3 * u16::from(num_components);
    if length != expected_length {
        return Err(DecodeErrors::SofError(format!(
            "length of start of frame differs from expected {}, value is {}",
            expected_length, length
        )));
    }

    let mut components = Vec::with_capacity(num_components as usize);
    for _ in 0..num_components {
        let raw = reader.read_slice(3)?;
        let raw: [u8; 3] = [raw[0], raw[1], raw[2]];
        components.push(Component::parse(raw, components.len() + 1)?);
    }

    Ok((precision, height, width, components))
}

/// Parse a start-of-scan header. Returns the scan header; binding the
/// referenced Huffman tables onto the frame's components is done by the
/// caller since it needs both the frame and this header.
pub fn parse_sos(reader: &mut ByteReader, mode: FrameMode) -> Result<ScanHeader, DecodeErrors> {
    let length = reader.read_u16_be()?;
    let ns = reader.read_u8()?;
    if !(1..=4).contains(&ns) {
        return Err(DecodeErrors::SosError(format!(
            "number of components in start of scan should be 1..=4, found {}",
            ns
        )));
    }
    let expected_length = 6 + 2 * u16::from(ns);
    if length != expected_length {
        return Err(DecodeErrors::SosError(format!(
            "bad SOS length: expected {}, found {}",
            expected_length, length
        )));
    }

    let mut components = Vec::with_capacity(ns as usize);
    for _ in 0..ns {
        let cs = reader.read_u8()?;
        let td_ta = reader.read_u8()?;
        components.push(ScanComponent {
            id: cs,
            dc_table: (td_ta >> 4) & 0x0F,
            ac_table: td_ta & 0x0F,
        });
    }

    let ss = reader.read_u8()?;
    let se = reader.read_u8()?;
    let ah_al = reader.read_u8()?;
    let ah = ah_al >> 4;
    let al = ah_al & 0x0F;

    if mode == FrameMode::Sequential && (ss != 0 || se != 63) {
        return Err(DecodeErrors::IllegalSpectralSelection(
            "sequential scans must cover the full spectral range 0..63".to_string(),
        ));
    }
    if se > 63 || ss > se {
        return Err(DecodeErrors::IllegalSpectralSelection(format!(
            "Ss={} Se={} is not a legal spectral range",
            ss, se
        )));
    }
    if mode == FrameMode::Progressive && ss > 0 && components.len() != 1 {
        return Err(DecodeErrors::IllegalSpectralSelection(
            "progressive AC scans must be non-interleaved (one component)".to_string(),
        ));
    }

    Ok(ScanHeader {
        components,
        ss,
        se,
        ah,
        al,
    })
}

/// **B.2.3**: in an interleaved scan, the sum of `Hi * Vi` over the scan's
/// components (the number of data units per MCU) must not exceed 10.
pub fn validate_data_units_per_mcu(
    scan: &ScanHeader,
    components: &[Component],
) -> Result<(), DecodeErrors> {
    if scan.components.len() <= 1 {
        // a non-interleaved scan has exactly one data unit per MCU
        return Ok(());
    }

    let mut data_units_per_mcu = 0usize;
    for scan_component in &scan.components {
        let component = components
            .iter()
            .find(|c| c.id == scan_component.id)
            .ok_or_else(|| {
                DecodeErrors::SosError(format!(
                    "scan references unknown component id {}",
                    scan_component.id
                ))
            })?;
        data_units_per_mcu += component.horizontal_sample * component.vertical_sample;
    }

    if data_units_per_mcu > 10 {
        return Err(DecodeErrors::TooManyComponents(data_units_per_mcu));
    }

    Ok(())
}

/// Skip an APPn or COM segment: these carry no structural information this
/// decoder needs, so their length-prefixed payload is simply consumed.
pub fn skip_segment(reader: &mut ByteReader) -> Result<(), DecodeErrors> {
    let length = reader.read_u16_be()?;
    reader.skip(usize::from(length).saturating_sub(2))
}
