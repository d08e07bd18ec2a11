// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{BLOCK_DIM, Block, Coefficients};

/// Divisors for a roughly 95% quality setting, indexed `[v][u]`.
pub const QUANTIZATION_MATRIX: [[u16; BLOCK_DIM]; BLOCK_DIM] = [
    [8, 5, 5, 8, 12, 20, 25, 30],
    [6, 6, 7, 9, 13, 29, 30, 27],
    [7, 6, 8, 12, 20, 28, 34, 28],
    [7, 8, 11, 14, 25, 43, 40, 31],
    [9, 11, 18, 28, 34, 54, 51, 38],
    [12, 17, 27, 32, 40, 52, 56, 46],
    [24, 32, 39, 43, 51, 60, 60, 50],
    [36, 46, 47, 45, 56, 50, 51, 49],
];

/// Offset removed from the DC coefficient before quantization. It is 8x the sample
/// midpoint, so a mid-grey block quantizes to a DC of 0.
pub const DC_BIAS: i16 = 1024;

/// Quantized values are saturated to this magnitude.
pub const MAX_QUANTIZED: i16 = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    dc_bias: i16,
}

impl Quantizer {
    pub fn new(with_dc_bias: bool) -> Quantizer {
        Quantizer {
            dc_bias: if with_dc_bias { DC_BIAS } else { 0 },
        }
    }

    /// Divides each coefficient by its divisor and rounds to the nearest integer.
    pub fn quantize(&self, coefficients: &Coefficients, out: &mut Block) {
        let limit = MAX_QUANTIZED as f32;
        let rows = coefficients.iter().zip(QUANTIZATION_MATRIX.iter());
        for (v, (row, divisors)) in rows.enumerate() {
            for (u, (&coefficient, &divisor)) in row.iter().zip(divisors).enumerate() {
                let value = if v == 0 && u == 0 {
                    coefficient - self.dc_bias as f32
                } else {
                    coefficient
                };
                let quantized = (value / divisor as f32).round().clamp(-limit, limit);
                out[v * BLOCK_DIM + u] = quantized as i16;
            }
        }
    }

    /// Multiplies each coefficient by its divisor in place and restores the DC bias.
    pub fn dequantize(&self, block: &mut Block) {
        for (value, &divisor) in block.iter_mut().zip(QUANTIZATION_MATRIX.iter().flatten()) {
            *value = value.saturating_mul(divisor as i16);
        }
        block[0] = block[0].saturating_add(self.dc_bias);
    }
}
