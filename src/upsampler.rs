//! Up-sampling and plane-merge routines.
//!
//! Each component's reconstructed samples are produced at their native
//! (sub-sampled) resolution. This module replicates them up to the
//! frame's full MCU resolution by nearest-neighbour and interleaves the
//! per-component planes into a single pixel buffer.

/// Nearest-neighbour replicate a component plane from its native
/// `(plane_width, plane_height)` up to `(plane_width * h_scale,
/// plane_height * v_scale)`.
pub fn upsample_nearest_neighbor(
    input: &[u8],
    plane_width: usize,
    plane_height: usize,
    h_scale: usize,
    v_scale: usize,
) -> Vec<u8> {
    if h_scale == 1 && v_scale == 1 {
        return input.to_vec();
    }
    let out_width = plane_width * h_scale;
    let out_height = plane_height * v_scale;
    let mut out = vec![0u8; out_width * out_height];

    for y in 0..out_height {
        let src_row = y / v_scale;
        for x in 0..out_width {
            let src_col = x / h_scale;
            out[y * out_width + x] = input[src_row * plane_width + src_col];
        }
    }
    out
}

/// Interleave per-component full-resolution planes into one
/// `width * height * num_components` buffer, component-minor
/// (`[p0c0, p0c1, ..., p0cN, p1c0, ...]`).
pub fn merge_planes(planes: &[Vec<u8>], width: usize, height: usize) -> Vec<u8> {
    let num_components = planes.len();
    let mut out = vec![0u8; width * height * num_components];
    for (c, plane) in planes.iter().enumerate() {
        for pixel in 0..width * height {
            out[pixel * num_components + c] = plane[pixel];
        }
    }
    out
}

/// Crop a `stuffed_width * stuffed_height * num_components` buffer down to
/// `width * height * num_components`, row by row.
pub fn crop_to_size(
    buffer: &[u8],
    stuffed_width: usize,
    width: usize,
    height: usize,
    num_components: usize,
) -> Vec<u8> {
    if stuffed_width == width {
        return buffer[..width * height * num_components].to_vec();
    }
    let row_bytes = width * num_components;
    let stuffed_row_bytes = stuffed_width * num_components;
    let mut out = vec![0u8; row_bytes * height];
    for row in 0..height {
        let src = &buffer[row * stuffed_row_bytes..row * stuffed_row_bytes + row_bytes];
        out[row * row_bytes..(row + 1) * row_bytes].copy_from_slice(src);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replicates_2x2() {
        let input = [1u8, 2, 3, 4]; // 2x2 plane
        let out = upsample_nearest_neighbor(&input, 2, 2, 2, 2);
        assert_eq!(
            out,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
    }

    #[test]
    fn no_op_scale_returns_input() {
        let input = [5u8, 6, 7, 8];
        assert_eq!(upsample_nearest_neighbor(&input, 2, 2, 1, 1), input);
    }

    #[test]
    fn merge_interleaves_component_minor() {
        let y = vec![1u8, 2, 3, 4];
        let cb = vec![10u8, 20, 30, 40];
        let cr = vec![100u8, 200, 210, 220];
        let out = merge_planes(&[y, cb, cr], 2, 2);
        assert_eq!(out, vec![1, 10, 100, 2, 20, 200, 3, 30, 210, 4, 40, 220]);
    }

    #[test]
    fn crop_keeps_only_real_rows_and_cols() {
        // stuffed 4x2, crop to 3x2
        let buf = vec![1u8, 2, 3, 9, 4, 5, 6, 9];
        let out = crop_to_size(&buf, 4, 3, 2, 1);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6]);
    }
}
