// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Fast separable 8x8 DCT based on the Feig-Winograd factorization.
//!
//! The one-dimensional transform is written as the product `P K B1 B2 B3`, where the
//! `B` matrices are butterflies, `K` holds all of the multiplications and `P` is a
//! signed permutation. The inverse runs the transposed stages in reverse order.
//! Each 2D transform is a column pass into `scratch` followed by a row pass.

use crate::{BLOCK_DIM, Block, Coefficients};

// Gk = cos(k * pi / 16).
#[allow(clippy::excessive_precision)]
mod consts {
    pub const GA4: f32 = 0.7071067811865476;
    pub const GA4_HALF: f32 = 0.3535533905932738;
    pub const INV_GA6_QUARTER: f32 = 0.6532814824381882;
    pub const INV_GA2_QUARTER: f32 = 0.2705980500730985;
    pub const INV_GA6_HALF: f32 = 1.3065629648763764;
    pub const INV_GA2_HALF: f32 = 0.541196100146197;
    pub const INV_GA5_QUARTER: f32 = 0.4499881115682078;
    pub const INV_GA1_QUARTER: f32 = 0.2548977895520796;
    pub const INV_GA3_QUARTER: f32 = 0.30067244346752264;
    pub const INV_GA7_QUARTER: f32 = 1.2814577238707527;
    pub const INV_GA5: f32 = 1.7999524462728311;
    pub const INV_GA1: f32 = 1.0195911582083184;
    pub const INV_GA3: f32 = 1.2026897738700906;
    pub const INV_GA7: f32 = 5.125830895483011;
}
use consts::*;

/// First butterfly stage, folded into the gather of each input vector.
#[inline(always)]
fn butterfly_b3(v: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    [
        v[0] + v[7],
        v[1] + v[6],
        v[2] + v[5],
        v[3] + v[4],
        v[0] - v[7],
        v[1] - v[6],
        v[2] - v[5],
        v[3] - v[4],
    ]
}

/// Undoes the `P` stage on the way into the inverse transform.
#[inline(always)]
fn permute_inverse_input(p: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    [p[0], p[4], p[2], p[6], -p[1], -p[3], p[7], -p[5]]
}

/// `P K B1 B2` applied to a vector that already went through [`butterfly_b3`].
#[inline(always)]
fn fdct1d(r: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    // B2
    let s0 = r[0] + r[3];
    let s1 = r[1] + r[2];
    let s2 = r[0] - r[3];
    let s3 = r[1] - r[2];

    // B1
    let d0 = s0 + s1;
    let d1 = s0 - s1;
    let d2 = s3;
    let d3 = s2;
    let d4 = -r[6];
    let d5 = r[7];
    let d6 = -r[5];
    let d7 = -r[4];

    // K, even half: two scaled G1 blocks and one G2 block.
    let e0 = GA4_HALF * d0;
    let e1 = GA4_HALF * d1;
    let t = GA4 * (d3 - d2);
    let e2 = INV_GA6_QUARTER * (d2 + t);
    let e3 = INV_GA2_QUARTER * (t - d2);

    // K, odd half: H42, then G2, then H41 and the diagonal D4^-1 / 4.
    let h4 = d4;
    let h5 = (d5 + d7) * GA4;
    let h6 = d4 - d7;
    let h7 = d5 - d6;
    let t = GA4 * (h7 - h6);
    let g6 = INV_GA6_HALF * (h6 + t);
    let g7 = INV_GA2_HALF * (t - h6);
    let o4 = INV_GA5_QUARTER * (h4 + h5 - g6);
    let o5 = INV_GA1_QUARTER * (h5 + g7 - h4);
    let o6 = INV_GA3_QUARTER * (-h4 - h5 - g6);
    let o7 = INV_GA7_QUARTER * (h4 - h5 + g7);

    // P
    [e0, -o4, e2, -o5, e1, -o7, e3, o6]
}

/// Transposed stages of [`fdct1d`] in reverse order, including `B3`. Expects its input
/// to have gone through [`permute_inverse_input`].
#[inline(always)]
fn idct1d(r: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    let d0 = r[0] * GA4_HALF;
    let d1 = r[1] * GA4_HALF;
    let a1 = INV_GA6_QUARTER * r[2];
    let a2 = INV_GA2_QUARTER * r[3];
    let a3 = GA4 * (a1 + a2);
    let d2 = a1 - a2 - a3;
    let d3 = a3;

    let s4 = r[4] * INV_GA5;
    let s5 = r[5] * INV_GA1;
    let s6 = r[6] * INV_GA3;
    let s7 = r[7] * INV_GA7;

    let a1 = s4 - s5 - s6 + s7;
    let a2 = (s4 + s5 - s6 - s7) * GA4;
    let a3 = -s4 - s6;
    let a4 = s5 + s7;
    let a5 = INV_GA6_HALF * a3;
    let a6 = INV_GA2_HALF * a4;
    let a7 = GA4 * (a5 + a6);
    let a8 = a5 - a6 - a7;
    let d4 = 0.25 * (a1 + a8);
    let d5 = 0.25 * (a2 + a7);
    let d6 = -0.25 * a7;
    let d7 = 0.25 * (a2 - a8);

    // B1
    let b = [d0 + d1, d0 - d1, d3, d2, -d7, -d6, -d4, d5];
    // B2
    let c = [b[0] + b[2], b[1] + b[3], b[1] - b[3], b[0] - b[2]];
    // B3
    [
        c[0] + b[4],
        c[1] + b[5],
        c[2] + b[6],
        c[3] + b[7],
        c[3] - b[7],
        c[2] - b[6],
        c[1] - b[5],
        c[0] - b[4],
    ]
}

/// Fast forward 2D DCT. `scratch` receives the column pass (indexed `[x][v]`); `out`
/// receives coefficients indexed `[v][u]`, matching [`crate::dct_slow::dct`].
pub fn fdct2(block: &Block, scratch: &mut Coefficients, out: &mut Coefficients) {
    for (x, column) in scratch.iter_mut().enumerate() {
        let input = std::array::from_fn(|y| block[y * BLOCK_DIM + x] as f32);
        *column = fdct1d(butterfly_b3(input));
    }
    for (v, row) in out.iter_mut().enumerate() {
        let input = std::array::from_fn(|x| scratch[x][v]);
        *row = fdct1d(butterfly_b3(input));
    }
}

/// Fast inverse 2D DCT of a dequantized block, matching [`crate::dct_slow::idct`].
/// The output is not rounded or clamped.
pub fn ifdct2(coefficients: &Block, scratch: &mut Coefficients, out: &mut Coefficients) {
    for (u, column) in scratch.iter_mut().enumerate() {
        let input = std::array::from_fn(|v| coefficients[v * BLOCK_DIM + u] as f32);
        *column = idct1d(permute_inverse_input(input));
    }
    for (y, row) in out.iter_mut().enumerate() {
        let input = std::array::from_fn(|u| scratch[u][y]);
        *row = idct1d(permute_inverse_input(input));
    }
}
