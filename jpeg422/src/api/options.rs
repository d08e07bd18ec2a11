// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Number of decode workers a [`super::Codec`] starts by default, one per pass.
pub const DEFAULT_DECODE_THREADS: usize = 4;

/// Which implementation of the 8x8 DCT pair to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransformKind {
    /// Separable Feig-Winograd factorization.
    #[default]
    Fast,
    /// Direct evaluation of the definition. Much slower; produces the same output up to
    /// rounding.
    Reference,
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CodecOptions {
    /// Decode worker threads. `0` decodes every pass on the calling thread.
    pub threads: usize,
    pub transform: TransformKind,
    /// Subtract the mid-grey offset from DC before quantization.
    pub dc_bias: bool,
    /// Encode the passes of a frame concurrently. Needs the `parallel` feature; the
    /// output is identical either way.
    pub parallel_encode: bool,
}

impl CodecOptions {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_transform(mut self, transform: TransformKind) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_dc_bias(mut self, dc_bias: bool) -> Self {
        self.dc_bias = dc_bias;
        self
    }

    pub fn with_parallel_encode(mut self, parallel_encode: bool) -> Self {
        self.parallel_encode = parallel_encode;
        self
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            threads: DEFAULT_DECODE_THREADS,
            transform: TransformKind::Fast,
            dc_bias: true,
            parallel_encode: true,
        }
    }
}
