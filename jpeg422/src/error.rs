// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Failed to spawn decode worker: {0}")]
    ThreadSpawn(#[source] std::io::Error),
    #[error("Worker pool is shut down")]
    WorkerPoolClosed,
    #[error("Decode worker panicked on pass {0}")]
    WorkerPanicked(usize),
    #[error("Huffman code {code:#x} of length {length} for symbol {symbol:#04x} collides with another code")]
    HuffmanCollision { symbol: u8, code: u16, length: u8 },
    #[error("No Huffman code for run {run} and size {size}")]
    NoHuffmanCode { run: u8, size: u8 },
    #[error("Amplitude {amplitude} needs {size} bits, max is {max}")]
    AmplitudeOutOfRange { amplitude: i16, size: u8, max: u8 },
    #[error("Read out of bounds")]
    OutOfBounds,
    #[error("Read of {0} bits exceeds the per-call maximum")]
    ReadTooLarge(usize),
    #[error("Invalid bit range {start}..{end} for a stream of {len} bytes")]
    InvalidBitRange { start: usize, end: usize, len: usize },
    #[error("Stream of {0} bytes is too short for the frame header")]
    TruncatedHeader(usize),
    #[error("Invalid pass offsets in frame header: {0:?}")]
    InvalidPassOffsets([u32; 4]),
    #[error("Invalid Huffman code in stream")]
    InvalidHuffmanCode,
    #[error("Coefficient index {0} is past the end of the block")]
    CoefficientOverflow(usize),
    #[error("Pass {pass} ended at bit {actual}, header says {expected}")]
    PassLengthMismatch {
        pass: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid frame size {0}x{1}: width must be a multiple of 16, height of 8")]
    InvalidFrameSize(usize, usize),
    #[error("Plane has {actual} bytes, expected {expected}")]
    InvalidPlaneSize { expected: usize, actual: usize },
    #[error("Overflow when computing a frame size")]
    SizeOverflow,
}

impl Error {
    /// Whether this error reports malformed compressed input.
    pub fn is_corrupt_stream(&self) -> bool {
        matches!(
            self,
            Error::OutOfBounds
                | Error::InvalidBitRange { .. }
                | Error::TruncatedHeader(_)
                | Error::InvalidPassOffsets(_)
                | Error::InvalidHuffmanCode
                | Error::CoefficientOverflow(_)
                | Error::PassLengthMismatch { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
