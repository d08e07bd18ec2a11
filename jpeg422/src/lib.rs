// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Lossy block-transform codec for packed 4:2:2 (`U Y0 V Y1`) frames.
//!
//! A frame is split into four independently entropy-coded passes (left luma half,
//! right luma half, U, V). Each pass is coded as a sequence of 8x8 blocks: DCT,
//! quantization, DC prediction, zig-zag run-length and fixed Huffman coding. Passes
//! can be decoded concurrently by a persistent worker pool owned by [`Codec`].
//!
//! ```
//! # use jpeg422::{Codec, CodecOptions};
//! let codec = Codec::new(32, 16, CodecOptions::default())?;
//! let plane = vec![128u8; codec.plane_len()];
//! let compressed = codec.compress(&plane)?;
//! assert_eq!(codec.decompress(&compressed)?, plane);
//! # Ok::<(), jpeg422::error::Error>(())
//! ```

#![deny(unsafe_code)]
pub mod api;
pub mod bit_reader;
pub mod bit_writer;
pub mod entropy_coding;
pub mod error;
pub mod frame;
pub mod quantizer;
pub mod thread_pool;
pub mod util;

pub use api::{Codec, CodecOptions, TransformKind};
pub use jpeg422_transforms::{BLOCK_DIM, BLOCK_SIZE, Block, Coefficients};
