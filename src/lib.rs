#![allow(clippy::needless_return, clippy::similar_names, clippy::inline_always)]
#![warn(clippy::correctness, clippy::perf, clippy::pedantic)]

//! A baseline and progressive JPEG (ITU-T T.81) still-image decoder.
//!
//! Supports SOF0 (baseline sequential) and SOF2 (progressive) frames,
//! Huffman entropy coding, and 8-bit sample precision. Decoded images are
//! returned as raw, un-colour-converted per-component sample planes,
//! interleaved component-minor — turning those into RGB is left to the
//! caller.

#[macro_use]
extern crate log;

pub use crate::errors::DecodeErrors;
pub use crate::image::{Decoder, DecodedImage, DecoderOptions};

pub mod bitstream;
mod components;
pub mod errors;
mod frame;
mod headers;
mod huffman;
mod idct;
pub mod image;
mod markers;
mod mcu;
mod mcu_prog;
mod misc;
mod upsampler;
