// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Two-dimensional 8x8 discrete cosine transforms.
//!
//! [`dct_slow`] holds the direct O(N^4) evaluation of the transform pair, used as a
//! reference. [`dct`] holds the separable fast factorization used by the codec, which
//! produces the same coefficients up to floating point rounding.

pub mod dct;
pub mod dct_slow;

pub const BLOCK_DIM: usize = 8;
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// 64 integer samples or quantized coefficients in row-major order.
pub type Block = [i16; BLOCK_SIZE];

/// Real-valued 8x8 matrix, indexed as `[row][column]`.
///
/// Holds DCT coefficients (`[v][u]`, vertical frequency first) after a forward
/// transform and spatial samples (`[y][x]`) after an inverse one.
pub type Coefficients = [[f32; BLOCK_DIM]; BLOCK_DIM];
