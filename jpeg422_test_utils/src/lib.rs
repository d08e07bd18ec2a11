// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

/// Element-wise [`assert_almost_eq!`] over two indexable sequences of equal length.
#[macro_export]
macro_rules! assert_all_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if left_val.len() != right_val.len() {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n left.len(): `{}`,\n right.len(): `{}`",
                        left_val.len(),
                        right_val.len()
                    );
                }
                for index in 0..left_val.len() {
                    let (l, r) = (left_val[index], right_val[index]);
                    let diff = if l > r { l - r } else { r - l };
                    if !(diff <= $max_error) {
                        panic!(
                            "assertion failed: `(left ≈ right)`\n left[{}]: `{:?}`,\n right[{}]: `{:?}`,\n max_error: `{:?}`",
                            index, l, index, r, $max_error
                        );
                    }
                }
            }
        }
    };
}
