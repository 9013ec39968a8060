//! End-to-end decodes against small, hand-built JPEG byte streams.
//!
//! Each test assembles a minimal stream (SOI, DQT, DHT, SOF, SOS, entropy
//! data, EOI) byte by byte rather than reading a fixture file, so the exact
//! bits under test are visible at the call site.

use jround_jpeg::Decoder;

/// A single DQT segment: one 8-bit-precision table, identity quantization
/// (every step is 1), in zig-zag order.
fn dqt_identity(table_id: u8) -> Vec<u8> {
    let mut seg = vec![0xFF, 0xDB];
    let length: u16 = 2 + 1 + 64;
    seg.extend_from_slice(&length.to_be_bytes());
    seg.push(table_id); // Pq=0, Tq=table_id
    seg.extend(std::iter::repeat(1u8).take(64));
    seg
}

/// A DHT segment for one table: `class` is 0 for DC, 1 for AC.
fn dht_single_symbol(class: u8, id: u8, symbol: u8) -> Vec<u8> {
    let mut seg = vec![0xFF, 0xC4];
    let length: u16 = 2 + 1 + 16 + 1;
    seg.extend_from_slice(&length.to_be_bytes());
    seg.push((class << 4) | id);
    let mut bits = [0u8; 16];
    bits[0] = 1;
    seg.extend_from_slice(&bits);
    seg.push(symbol);
    seg
}

fn sof0(width: u16, height: u16, components: &[(u8, u8, u8, u8)]) -> Vec<u8> {
    sof_with_marker(0xC0, width, height, components)
}

/// Same layout as `sof0`, but tagged SOF2 (progressive DCT).
fn sof2(width: u16, height: u16, components: &[(u8, u8, u8, u8)]) -> Vec<u8> {
    sof_with_marker(0xC2, width, height, components)
}

fn sof_with_marker(marker: u8, width: u16, height: u16, components: &[(u8, u8, u8, u8)]) -> Vec<u8> {
    let mut seg = vec![0xFF, marker];
    let length: u16 = 8 + 3 * components.len() as u16;
    seg.extend_from_slice(&length.to_be_bytes());
    seg.push(8); // precision
    seg.extend_from_slice(&height.to_be_bytes());
    seg.extend_from_slice(&width.to_be_bytes());
    seg.push(components.len() as u8);
    for &(id, h, v, tq) in components {
        seg.push(id);
        seg.push((h << 4) | v);
        seg.push(tq);
    }
    seg
}

/// A DHT segment for one table carrying two length-1 codes: `0` decodes to
/// `sym_a`, `1` decodes to `sym_b`.
fn dht_two_symbols(class: u8, id: u8, sym_a: u8, sym_b: u8) -> Vec<u8> {
    let mut seg = vec![0xFF, 0xC4];
    let length: u16 = 2 + 1 + 16 + 2;
    seg.extend_from_slice(&length.to_be_bytes());
    seg.push((class << 4) | id);
    let mut bits = [0u8; 16];
    bits[0] = 2;
    seg.extend_from_slice(&bits);
    seg.push(sym_a);
    seg.push(sym_b);
    seg
}

fn sos(components: &[(u8, u8, u8)], ss: u8, se: u8, ah_al: u8) -> Vec<u8> {
    let mut seg = vec![0xFF, 0xDA];
    let length: u16 = 6 + 2 * components.len() as u16;
    seg.extend_from_slice(&length.to_be_bytes());
    seg.push(components.len() as u8);
    for &(id, td, ta) in components {
        seg.push(id);
        seg.push((td << 4) | ta);
    }
    seg.push(ss);
    seg.push(se);
    seg.push(ah_al);
    seg
}

/// Pack a big-endian bit sequence into bytes, padding the final byte with
/// ones (the JPEG convention for stuffing bits past the logical end).
fn pack_bits(bits: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut byte = 0u8;
    let mut n = 0u8;
    for &b in bits {
        byte = (byte << 1) | b;
        n += 1;
        if n == 8 {
            out.push(byte);
            byte = 0;
            n = 0;
        }
    }
    if n > 0 {
        byte <<= 8 - n;
        byte |= (1 << (8 - n)) - 1;
        out.push(byte);
    }
    out
}

/// Escape any `0xFF` byte in entropy-coded data with a trailing `0x00`.
fn stuff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        out.push(b);
        if b == 0xFF {
            out.push(0x00);
        }
    }
    out
}

#[test]
fn grayscale_dc_only_block() {
    // one 8x8 luma component, quantization table 0, DC symbol 3 (3-bit
    // magnitude = 5), AC table's single code is EOB (0x00).
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_single_symbol(0, 0, 3));
    data.extend(dht_single_symbol(1, 0, 0x00));
    data.extend(sof0(8, 8, &[(1, 1, 1, 0)]));
    data.extend(sos(&[(1, 0, 0)], 0, 63, 0));
    // DC codeword `0`, 3 extended bits `101` (=5), AC codeword `0` (EOB)
    let entropy = pack_bits(&[0, 1, 0, 1, 0]);
    data.extend(stuff(&entropy));
    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    let image = decoder.decode(&data).unwrap();
    assert_eq!(image.width, 8);
    assert_eq!(image.height, 8);
    assert_eq!(image.num_components, 1);
    assert_eq!(image.pixels.len(), 64);
    // DC-only block, dequantized to 5, is flat at round(128 + 5/8) = 129
    for &pixel in &image.pixels {
        assert_eq!(pixel, 129);
    }
}

#[test]
fn rejects_restart_markers() {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_single_symbol(0, 0, 0));
    data.extend(dht_single_symbol(1, 0, 0x00));
    data.extend(sof0(8, 8, &[(1, 1, 1, 0)]));
    // Define Restart Interval: length=4, Ri=1
    data.extend(vec![0xFF, 0xDD, 0x00, 0x04, 0x00, 0x01]);
    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    assert!(decoder.decode(&data).is_err());
}

#[test]
fn rejects_unsupported_sof_variant() {
    // SOF1 (extended sequential) is not a supported encoding
    let mut data = vec![0xFF, 0xD8];
    data.extend(vec![0xFF, 0xC1, 0x00, 0x0B, 8, 0, 8, 0, 8, 1, 1, 1, 1, 0]);
    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    assert!(decoder.decode(&data).is_err());
}

#[test]
fn errors_on_bad_magic() {
    let decoder = Decoder::new();
    assert!(decoder.decode(&[0x00, 0x01, 0x02]).is_err());
}

#[test]
fn yuv420_upsamples_chroma_to_luma_resolution() {
    // 16x16, Y at 2x2 sampling (four 8x8 blocks), Cb/Cr at 1x1 (one block
    // each, nearest-neighbour replicated 2x2 to match Y's resolution).
    // Every coefficient decodes to zero, so every component plane is flat
    // at the level-shift midpoint; this test is about geometry, not values.
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_single_symbol(0, 0, 0)); // DC: diff = 0
    data.extend(dht_single_symbol(1, 0, 0x00)); // AC: EOB
    data.extend(sof0(
        16,
        16,
        &[(1, 2, 2, 0), (2, 1, 1, 0), (3, 1, 1, 0)],
    ));
    data.extend(sos(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)], 0, 63, 0));
    // 6 data units total (4 luma + 1 Cb + 1 Cr), each a DC codeword `0`
    // followed by an AC EOB codeword `0`.
    let entropy = pack_bits(&[0u8; 12]);
    data.extend(stuff(&entropy));
    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    let image = decoder.decode(&data).unwrap();
    assert_eq!(image.width, 16);
    assert_eq!(image.height, 16);
    assert_eq!(image.num_components, 3);
    assert_eq!(image.pixels.len(), 16 * 16 * 3);
    assert!(image.pixels.iter().all(|&p| p == 128));
}

#[test]
fn progressive_dc_first_then_refine_end_to_end() {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_single_symbol(0, 0, 3)); // DC: 3-bit magnitude
    data.extend(sof2(8, 8, &[(1, 1, 1, 0)]));

    // scan 1: DC first, Ah=0 Al=2. Codeword `0`, then 3 extended bits
    // `111` (=7, positive since top bit set) -> prev_dc = 7, block[0] = 28.
    data.extend(sos(&[(1, 0, 0)], 0, 0, 0x02));
    data.extend(stuff(&pack_bits(&[0, 1, 1, 1])));

    // scan 2: DC refine, Ah=2 Al=1. One refinement bit `1` -> block[0] |=
    // 1<<1, giving 30.
    data.extend(sos(&[(1, 0, 0)], 0, 0, 0x21));
    data.extend(stuff(&pack_bits(&[1])));

    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    let image = decoder.decode(&data).unwrap();
    assert_eq!(image.pixels.len(), 64);
    // pure-DC block, coefficient 30: every pixel is round(128 + 30/8) = 132
    assert!(image.pixels.iter().all(|&p| p == 132));
}

#[test]
fn progressive_ac_first_eob_run_spans_blocks_end_to_end() {
    // 16x8, one component, no chroma subsampling -> two 8x8 blocks.
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_single_symbol(0, 0, 0)); // DC: diff = 0
    data.extend(dht_single_symbol(1, 0, 0x10)); // AC: R=1 S=0 (EOB1)
    data.extend(sof2(16, 8, &[(1, 1, 1, 0)]));

    // scan 1: DC first over both blocks, diff 0 each time.
    data.extend(sos(&[(1, 0, 0)], 0, 0, 0x00));
    data.extend(stuff(&pack_bits(&[0, 0])));

    // scan 2: AC first, Ss=1 Se=63. Block 1: codeword `0` (symbol 0x10),
    // then a 1-bit extra field `0` -> eob_run = (1<<1) + 0 - 1 = 1, which
    // the second block consumes without reading any further bits.
    data.extend(sos(&[(1, 0, 0)], 1, 63, 0x00));
    data.extend(stuff(&pack_bits(&[0, 0])));

    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    let image = decoder.decode(&data).unwrap();
    assert_eq!(image.pixels.len(), 16 * 8);
    // both blocks end up all-zero coefficients -> flat at the level-shift
    assert!(image.pixels.iter().all(|&p| p == 128));
}

#[test]
fn progressive_ac_refine_with_intervening_nonzero_end_to_end() {
    // Single 8x8 block, spectral range narrowed to Ss=1..Se=4 so a single
    // RS event exactly fills it (mirrors the decode_ac_refine unit test).
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_two_symbols(1, 0, 0x00, 0x23)); // AC-first: EOB, R=2 S=3
    data.extend(sof2(8, 8, &[(1, 1, 1, 0)]));

    // scan 1: AC first, Ss=1 Se=4, Al=0. Codeword `1` selects 0x23 (R=2
    // S=3), skipping to position 3 and storing a 3-bit magnitude `101`
    // (=5). Codeword `0` then selects EOB, closing the block.
    data.extend(sos(&[(1, 0, 0)], 1, 4, 0x00));
    data.extend(stuff(&pack_bits(&[1, 1, 0, 1, 0])));

    // scan 2: AC refine, Ah=1 Al=0, reusing the exact bit pattern verified
    // in decode_ac_refine's unit test: codeword `0` (0x21: R=2 S=1), sign
    // bit `1`, refinement bit `1` for the non-zero position the run
    // crosses.
    data.extend(dht_single_symbol(1, 0, 0x21));
    data.extend(sos(&[(1, 0, 0)], 1, 4, 0x10));
    data.extend(stuff(&pack_bits(&[0, 1, 1])));

    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    let image = decoder.decode(&data).unwrap();
    assert_eq!(image.pixels.len(), 64);
    // the refine scan moved real energy into the block; it must no longer
    // be the flat all-zero-coefficient image (every pixel at 128).
    assert!(image.pixels.iter().any(|&p| p != 128));
}

#[test]
fn byte_unstuffing_end_to_end() {
    // Pick codewords that pack the whole entropy segment into a single
    // 0xFF byte, forcing the encoder to emit the `FF 00` stuffing this
    // decoder must undo before the terminating `FF D9`.
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_identity(0));
    data.extend(dht_two_symbols(0, 0, 0x07, 0)); // DC: code `1` -> diff = 0
    data.extend(dht_two_symbols(1, 0, 0x07, 0x00)); // AC: code `1` -> EOB
    data.extend(sof0(8, 8, &[(1, 1, 1, 0)]));
    data.extend(sos(&[(1, 0, 0)], 0, 63, 0));
    // DC codeword `1`, AC codeword `1` -> packs to a single 0xFF byte.
    let entropy = pack_bits(&[1, 1]);
    assert_eq!(entropy, vec![0xFF]);
    data.extend(stuff(&entropy)); // [0xFF, 0x00]
    data.extend(vec![0xFF, 0xD9]);

    let decoder = Decoder::new();
    let image = decoder.decode(&data).unwrap();
    assert_eq!(image.pixels.len(), 64);
    assert!(image.pixels.iter().all(|&p| p == 128));
}
