// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::Result;

pub trait TryWithCapacity {
    type Output;
    fn try_with_capacity(capacity: usize) -> Result<Self::Output>;
}

impl<T> TryWithCapacity for Vec<T> {
    type Output = Vec<T>;

    fn try_with_capacity(capacity: usize) -> Result<Self::Output> {
        let mut vec = Vec::new();
        vec.try_reserve(capacity)?;
        Ok(vec)
    }
}

/// Allocates `len` copies of `value`, reporting allocation failure instead of aborting.
pub fn try_filled_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut vec = Vec::try_with_capacity(len)?;
    vec.resize(len, value);
    Ok(vec)
}
