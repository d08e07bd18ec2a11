// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::f64::consts::FRAC_1_SQRT_2;
use std::f64::consts::PI;

use crate::{BLOCK_DIM, Block, Coefficients};

#[inline(always)]
fn alpha(u: usize) -> f64 {
    if u == 0 { FRAC_1_SQRT_2 } else { 1.0 }
}

/// `basis[u][x] = C(u) * cos((2x + 1) * u * pi / 16)`.
fn basis() -> [[f64; BLOCK_DIM]; BLOCK_DIM] {
    let mut matrix = [[0.0f64; BLOCK_DIM]; BLOCK_DIM];
    for (u, row) in matrix.iter_mut().enumerate() {
        let alpha_u = alpha(u);
        for (x, element) in row.iter_mut().enumerate() {
            *element = alpha_u * ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos();
        }
    }
    matrix
}

/// Forward DCT-II of an 8x8 sample block, evaluated directly from the definition:
///
/// `F(v, u) = 1/4 C(u) C(v) sum_{x,y} f(y, x) cos((2x+1)u pi/16) cos((2y+1)v pi/16)`
///
/// A constant block of value `k` yields `F(0, 0) = 8k` and zeros elsewhere.
pub fn dct(block: &Block, out: &mut Coefficients) {
    let matrix = basis();
    for v in 0..BLOCK_DIM {
        for u in 0..BLOCK_DIM {
            let mut sum = 0.0;
            for y in 0..BLOCK_DIM {
                for x in 0..BLOCK_DIM {
                    sum += block[y * BLOCK_DIM + x] as f64 * matrix[v][y] * matrix[u][x];
                }
            }
            out[v][u] = (0.25 * sum) as f32;
        }
    }
}

/// Inverse of [`dct`], evaluated directly from the definition. The output is not
/// rounded or clamped.
pub fn idct(coefficients: &Block, out: &mut Coefficients) {
    let matrix = basis();
    for y in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            let mut sum = 0.0;
            for v in 0..BLOCK_DIM {
                for u in 0..BLOCK_DIM {
                    sum += coefficients[v * BLOCK_DIM + u] as f64 * matrix[v][y] * matrix[u][x];
                }
            }
            out[y][x] = (0.25 * sum) as f32;
        }
    }
}
