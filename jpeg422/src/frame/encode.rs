// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{BlockScratch, FrameCodec, FrameHeader, HEADER_SIZE, PassGeometry};
use crate::bit_writer::BitWriter;
use crate::entropy_coding::scan;
use crate::error::{Error, Result};
use crate::BLOCK_DIM;
use crate::util::tracing_wrappers::*;

/// Encoding state of one pass: the block grid being walked, the DC of the previous
/// block and the output stream.
pub struct PassEncoder<'a> {
    codec: &'a FrameCodec,
    geometry: &'a PassGeometry,
    dc_predictor: i16,
    writer: &'a mut BitWriter,
}

impl<'a> PassEncoder<'a> {
    pub fn new(
        codec: &'a FrameCodec,
        geometry: &'a PassGeometry,
        writer: &'a mut BitWriter,
    ) -> PassEncoder<'a> {
        PassEncoder {
            codec,
            geometry,
            dc_predictor: 0,
            writer,
        }
    }

    pub fn dc_predictor(&self) -> i16 {
        self.dc_predictor
    }

    /// Gathers block `(block_x, block_y)` from `plane`, transforms, quantizes and
    /// writes it.
    pub fn encode_block(
        &mut self,
        plane: &[u8],
        block_x: usize,
        block_y: usize,
        scratch: &mut BlockScratch,
    ) -> Result<()> {
        for (i, sample) in scratch.block.iter_mut().enumerate() {
            let x = block_x * BLOCK_DIM + i % BLOCK_DIM;
            let y = block_y * BLOCK_DIM + i / BLOCK_DIM;
            *sample = plane[self.geometry.byte_index(x, y)] as i16;
        }
        self.codec.forward_transform(scratch);
        self.codec
            .quantizer
            .quantize(&scratch.coefficients, &mut scratch.block);

        let dc = scratch.block[0];
        scratch.block[0] = dc.wrapping_sub(self.dc_predictor);
        self.dc_predictor = dc;
        scan::write_block(&self.codec.huffman, &scratch.block, self.writer)
    }
}

impl FrameCodec {
    /// Appends every block of one pass to `bw`, in raster order.
    pub fn encode_pass(
        &self,
        geometry: &PassGeometry,
        plane: &[u8],
        scratch: &mut BlockScratch,
        bw: &mut BitWriter,
    ) -> Result<()> {
        let mut pass = PassEncoder::new(self, geometry, bw);
        for block_y in 0..geometry.blocks_high() {
            for block_x in 0..geometry.blocks_wide() {
                pass.encode_block(plane, block_x, block_y, scratch)?;
            }
        }
        trace!(kind = ?geometry.kind, end_bit = bw.bits_written(), "encoded pass");
        Ok(())
    }

    fn encode_pass_to_writer(&self, geometry: &PassGeometry, plane: &[u8]) -> Result<BitWriter> {
        // Most blocks of natural content need well under two bits per sample.
        let mut bw = BitWriter::with_capacity(geometry.num_samples() / 4)?;
        self.encode_pass(geometry, plane, &mut BlockScratch::default(), &mut bw)?;
        Ok(bw)
    }

    /// Compresses a whole packed frame. `plane` must hold exactly
    /// [`super::FrameLayout::plane_len`] bytes.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn encode_frame(&self, plane: &[u8], parallel: bool) -> Result<Vec<u8>> {
        let expected = self.layout.plane_len();
        if plane.len() != expected {
            return Err(Error::InvalidPlaneSize {
                expected,
                actual: plane.len(),
            });
        }
        let passes = &self.layout.passes;
        let mut bw = BitWriter::with_header(HEADER_SIZE, HEADER_SIZE + plane.len() / 2)?;
        let mut header = FrameHeader::default();

        #[cfg(feature = "parallel")]
        if parallel {
            let streams = passes
                .par_iter()
                .map(|geometry| self.encode_pass_to_writer(geometry, plane))
                .collect::<Result<Vec<_>>>()?;
            for (pass, stream) in streams.iter().enumerate() {
                bw.append(stream);
                header.mark_pass_end(pass, &bw)?;
            }
            header.write(&mut bw)?;
            debug!(bytes = bw.as_bytes().len(), "encoded frame in parallel");
            return Ok(bw.into_bytes());
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        let mut scratch = BlockScratch::default();
        for (pass, geometry) in passes.iter().enumerate() {
            self.encode_pass(geometry, plane, &mut scratch, &mut bw)?;
            header.mark_pass_end(pass, &bw)?;
        }
        header.write(&mut bw)?;
        debug!(bytes = bw.as_bytes().len(), "encoded frame");
        Ok(bw.into_bytes())
    }
}
