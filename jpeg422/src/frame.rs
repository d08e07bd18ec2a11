// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Frame layout and the per-pass block pipeline shared by encoder and decoder.
//!
//! A packed 4:2:2 frame stores each row as `U Y0 V Y1` quads, `2 * width` bytes per
//! row. It is coded as four passes, each a `width / 2` by `height` grid of samples:
//!
//! | pass | samples            | byte offset in row | byte step |
//! |------|--------------------|--------------------|-----------|
//! | 0    | left half of luma  | 1                  | 2         |
//! | 1    | right half of luma | 1 + width          | 2         |
//! | 2    | U                  | 0                  | 4         |
//! | 3    | V                  | 2                  | 4         |
//!
//! The compressed frame starts with a 16-byte header of four little-endian `u32`s,
//! the absolute bit position at which each pass ends. Pass `i` starts where pass
//! `i - 1` ends, and pass 0 starts right after the header.

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};
use jpeg422_transforms::{dct, dct_slow};

use crate::api::{CodecOptions, TransformKind};
use crate::bit_writer::BitWriter;
use crate::entropy_coding::huffman::HuffmanCodec;
use crate::error::{Error, Result};
use crate::quantizer::Quantizer;
use crate::util::tracing_wrappers::*;
use crate::{BLOCK_DIM, BLOCK_SIZE, Block, Coefficients};

pub mod decode;
pub mod encode;

pub const NUM_PASSES: usize = 4;
pub const HEADER_SIZE: usize = NUM_PASSES * 4;
const HEADER_BITS: usize = HEADER_SIZE * 8;

/// Frame width must be a multiple of this, so that each half of the luma plane and
/// each chroma plane is a whole number of blocks wide.
pub const WIDTH_ALIGNMENT: usize = 2 * BLOCK_DIM;
pub const HEIGHT_ALIGNMENT: usize = BLOCK_DIM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    LumaLeft,
    LumaRight,
    ChromaU,
    ChromaV,
}

/// Where the samples of one pass live inside the packed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassGeometry {
    pub kind: PassKind,
    /// Samples per row of the pass.
    pub width: usize,
    pub height: usize,
    /// Bytes per row of the packed frame.
    pub row_stride: usize,
    pub offset: usize,
    /// Sample `x` of a row sits at byte `(x << step_shift) + offset`.
    pub step_shift: u32,
}

impl PassGeometry {
    #[inline]
    pub fn byte_index(&self, x: usize, y: usize) -> usize {
        y * self.row_stride + (x << self.step_shift) + self.offset
    }

    pub fn blocks_wide(&self) -> usize {
        self.width / BLOCK_DIM
    }

    pub fn blocks_high(&self) -> usize {
        self.height / BLOCK_DIM
    }

    pub fn num_samples(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub width: usize,
    pub height: usize,
    pub passes: [PassGeometry; NUM_PASSES],
}

impl FrameLayout {
    pub fn new(width: usize, height: usize) -> Result<FrameLayout> {
        if width == 0
            || height == 0
            || width % WIDTH_ALIGNMENT != 0
            || height % HEIGHT_ALIGNMENT != 0
        {
            return Err(Error::InvalidFrameSize(width, height));
        }
        width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(2))
            .ok_or(Error::SizeOverflow)?;
        let pass = |kind, offset, step_shift| PassGeometry {
            kind,
            width: width / 2,
            height,
            row_stride: 2 * width,
            offset,
            step_shift,
        };
        Ok(FrameLayout {
            width,
            height,
            passes: [
                pass(PassKind::LumaLeft, 1, 1),
                pass(PassKind::LumaRight, 1 + width, 1),
                pass(PassKind::ChromaU, 0, 2),
                pass(PassKind::ChromaV, 2, 2),
            ],
        })
    }

    /// Size in bytes of an uncompressed packed frame.
    pub fn plane_len(&self) -> usize {
        self.width * self.height * 2
    }
}

/// End bit of each pass, stored at the start of a compressed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameHeader {
    pub pass_end_bits: [u32; NUM_PASSES],
}

impl FrameHeader {
    /// Parses and validates the header of a compressed frame of `data.len()` bytes.
    pub fn read(data: &[u8]) -> Result<FrameHeader> {
        if data.len() < HEADER_SIZE {
            return Err(Error::TruncatedHeader(data.len()));
        }
        let mut pass_end_bits = [0u32; NUM_PASSES];
        LittleEndian::read_u32_into(&data[..HEADER_SIZE], &mut pass_end_bits);
        let header = FrameHeader { pass_end_bits };
        let mut start = HEADER_BITS;
        for &end in pass_end_bits.iter() {
            let end = end as usize;
            if end <= start || end > data.len() * 8 {
                return Err(Error::InvalidPassOffsets(pass_end_bits));
            }
            start = end;
        }
        trace!(?header);
        Ok(header)
    }

    /// Records the end of pass `pass` at the current position of `bw`.
    pub fn mark_pass_end(&mut self, pass: usize, bw: &BitWriter) -> Result<()> {
        self.pass_end_bits[pass] =
            u32::try_from(bw.bits_written()).map_err(|_| Error::SizeOverflow)?;
        Ok(())
    }

    /// Fills the reserved header bytes of `bw`.
    pub fn write(&self, bw: &mut BitWriter) -> Result<()> {
        for (pass, &end) in self.pass_end_bits.iter().enumerate() {
            bw.patch_u32_le(pass * 4, end)?;
        }
        Ok(())
    }

    /// Bit range of each pass.
    pub fn pass_ranges(&self) -> [Range<usize>; NUM_PASSES] {
        std::array::from_fn(|pass| {
            let start = match pass {
                0 => HEADER_BITS,
                _ => self.pass_end_bits[pass - 1] as usize,
            };
            start..self.pass_end_bits[pass] as usize
        })
    }
}

/// Per-thread working memory for coding one block at a time.
#[derive(Debug, Clone)]
pub struct BlockScratch {
    pub block: Block,
    pub coefficients: Coefficients,
    pub transform: Coefficients,
}

impl Default for BlockScratch {
    fn default() -> Self {
        Self {
            block: [0; BLOCK_SIZE],
            coefficients: Coefficients::default(),
            transform: Coefficients::default(),
        }
    }
}

/// Everything needed to code the blocks of a frame of one fixed size. Immutable once
/// built, so it is shared freely between threads.
#[derive(Debug)]
pub struct FrameCodec {
    layout: FrameLayout,
    huffman: HuffmanCodec,
    quantizer: Quantizer,
    transform: TransformKind,
}

impl FrameCodec {
    pub fn new(layout: FrameLayout, options: &CodecOptions) -> Result<FrameCodec> {
        Ok(FrameCodec {
            layout,
            huffman: HuffmanCodec::new()?,
            quantizer: Quantizer::new(options.dc_bias),
            transform: options.transform,
        })
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// `scratch.block` (samples) to `scratch.coefficients`.
    fn forward_transform(&self, scratch: &mut BlockScratch) {
        match self.transform {
            TransformKind::Fast => dct::fdct2(
                &scratch.block,
                &mut scratch.transform,
                &mut scratch.coefficients,
            ),
            TransformKind::Reference => dct_slow::dct(&scratch.block, &mut scratch.coefficients),
        }
    }

    /// `scratch.block` (dequantized coefficients) to `scratch.coefficients`.
    fn inverse_transform(&self, scratch: &mut BlockScratch) {
        match self.transform {
            TransformKind::Fast => dct::ifdct2(
                &scratch.block,
                &mut scratch.transform,
                &mut scratch.coefficients,
            ),
            TransformKind::Reference => dct_slow::idct(&scratch.block, &mut scratch.coefficients),
        }
    }
}
