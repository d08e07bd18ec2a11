// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::ops::Range;

use super::{BlockScratch, FrameCodec, FrameHeader, PassGeometry};
use crate::BLOCK_DIM;
use crate::bit_reader::BitReader;
use crate::entropy_coding::scan;
use crate::error::{Error, Result};
use crate::util::try_filled_vec;
use crate::util::tracing_wrappers::*;

/// Decoding state of one pass: the block grid being walked, the DC of the previous
/// block and the input stream.
pub struct PassDecoder<'a, 'b> {
    codec: &'a FrameCodec,
    geometry: &'a PassGeometry,
    dc_predictor: i16,
    reader: BitReader<'b>,
}

impl<'a, 'b> PassDecoder<'a, 'b> {
    pub fn new(
        codec: &'a FrameCodec,
        geometry: &'a PassGeometry,
        reader: BitReader<'b>,
    ) -> PassDecoder<'a, 'b> {
        PassDecoder {
            codec,
            geometry,
            dc_predictor: 0,
            reader,
        }
    }

    pub fn dc_predictor(&self) -> i16 {
        self.dc_predictor
    }

    pub fn reader(&self) -> &BitReader<'b> {
        &self.reader
    }

    /// Reads, dequantizes and inverse transforms the next block, storing it at
    /// `(block_x, block_y)` of `samples`, a `geometry.width` wide pass-local raster.
    pub fn decode_block(
        &mut self,
        block_x: usize,
        block_y: usize,
        scratch: &mut BlockScratch,
        samples: &mut [u8],
    ) -> Result<()> {
        scan::read_block(&self.codec.huffman, &mut self.reader, &mut scratch.block)?;
        let dc = self.dc_predictor.wrapping_add(scratch.block[0]);
        scratch.block[0] = dc;
        self.dc_predictor = dc;

        self.codec.quantizer.dequantize(&mut scratch.block);
        self.codec.inverse_transform(scratch);

        let width = self.geometry.width;
        for (i, row) in scratch.coefficients.iter().enumerate() {
            let start = (block_y * BLOCK_DIM + i) * width + block_x * BLOCK_DIM;
            for (out, &value) in samples[start..start + BLOCK_DIM].iter_mut().zip(row) {
                *out = value.round().clamp(0.0, 255.0) as u8;
            }
        }
        Ok(())
    }
}

impl FrameCodec {
    /// Decodes the pass stored in `bits` of `stream` into a pass-local raster of
    /// `geometry.width * geometry.height` samples. The pass must end exactly at
    /// `bits.end`.
    pub fn decode_pass(
        &self,
        geometry: &PassGeometry,
        stream: &[u8],
        bits: Range<usize>,
        scratch: &mut BlockScratch,
    ) -> Result<Vec<u8>> {
        let reader = BitReader::with_range(stream, bits.start, bits.end)?;
        let mut samples = try_filled_vec(geometry.num_samples(), 0u8)?;
        let mut pass = PassDecoder::new(self, geometry, reader);
        for block_y in 0..geometry.blocks_high() {
            for block_x in 0..geometry.blocks_wide() {
                pass.decode_block(block_x, block_y, scratch, &mut samples)?;
            }
        }
        let actual = pass.reader().total_bits_read();
        if actual != bits.end {
            return Err(Error::PassLengthMismatch {
                pass: geometry.kind as usize,
                expected: bits.end,
                actual,
            });
        }
        trace!(kind = ?geometry.kind, bits = bits.len(), "decoded pass");
        Ok(samples)
    }

    /// Decodes every pass on the calling thread, writing the packed frame to `dest`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn decode_frame(&self, stream: &[u8], dest: &mut [u8]) -> Result<()> {
        let header = FrameHeader::read(stream)?;
        let mut scratch = BlockScratch::default();
        for (geometry, bits) in self.layout.passes.iter().zip(header.pass_ranges()) {
            let samples = self.decode_pass(geometry, stream, bits, &mut scratch)?;
            scatter_pass(geometry, &samples, dest);
        }
        Ok(())
    }
}

/// Copies a decoded pass-local raster into its interleaved positions in `dest`.
pub fn scatter_pass(geometry: &PassGeometry, samples: &[u8], dest: &mut [u8]) {
    for (y, row) in samples.chunks_exact(geometry.width).enumerate() {
        for (x, &sample) in row.iter().enumerate() {
            dest[geometry.byte_index(x, y)] = sample;
        }
    }
}
