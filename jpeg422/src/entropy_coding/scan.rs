// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Zig-zag run-length coding of one quantized block.

use super::huffman::HuffmanCodec;
use super::tables::{MAX_RUN, ZRL_RUN};
use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};
use crate::{BLOCK_SIZE, Block};

/// `ZIGZAG[k]` is the row-major index of the `k`-th coefficient in scan order.
pub const ZIGZAG: [usize; BLOCK_SIZE] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Writes `block`, whose DC slot already holds the predicted difference.
pub fn write_block(huffman: &HuffmanCodec, block: &Block, bw: &mut BitWriter) -> Result<()> {
    huffman.write_dc(block[0], bw)?;
    let mut run = 0usize;
    for &index in &ZIGZAG[1..] {
        let amplitude = block[index];
        if amplitude == 0 {
            run += 1;
            continue;
        }
        while run >= ZRL_RUN {
            huffman.write_ac(0, MAX_RUN, bw)?;
            run -= ZRL_RUN;
        }
        huffman.write_ac(amplitude, run as u8, bw)?;
        run = 0;
    }
    huffman.write_eob(bw);
    Ok(())
}

/// Reads one block written by [`write_block`]. Slot 0 receives the DC difference.
pub fn read_block(huffman: &HuffmanCodec, br: &mut BitReader, block: &mut Block) -> Result<()> {
    block.fill(0);
    block[0] = huffman.read_dc(br)?;
    let mut k = 1;
    loop {
        let (run, amplitude) = huffman.read_ac(br)?;
        if amplitude == 0 {
            if run == 0 {
                return Ok(());
            }
            // ZRL must be followed by a nonzero coefficient inside the block.
            k += ZRL_RUN;
            if k >= BLOCK_SIZE {
                return Err(Error::CoefficientOverflow(k));
            }
            continue;
        }
        k += run as usize;
        if k >= BLOCK_SIZE {
            return Err(Error::CoefficientOverflow(k));
        }
        block[ZIGZAG[k]] = amplitude;
        k += 1;
    }
}
