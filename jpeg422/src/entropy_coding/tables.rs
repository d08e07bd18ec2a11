// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Fixed luminance Huffman tables from the baseline JPEG standard (ITU T.81, K.3).

/// A prefix code: the low `length` bits of `bits`, most significant first.
/// `length == 0` marks a symbol without a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanCode {
    pub length: u8,
    pub bits: u16,
}

const fn hc(length: u8, bits: u16) -> HuffmanCode {
    HuffmanCode { length, bits }
}

const ABSENT: HuffmanCode = hc(0, 0);

/// Largest magnitude category of a DC difference.
pub const MAX_DC_SIZE: u8 = 11;
/// Largest magnitude category of an AC coefficient.
pub const MAX_AC_SIZE: u8 = 10;
/// Longest run of zeros that a single AC symbol can carry.
pub const MAX_RUN: u8 = 15;

/// End of block: all remaining coefficients are zero.
pub const EOB_SYMBOL: u8 = 0x00;
/// Sixteen zero coefficients.
pub const ZRL_SYMBOL: u8 = 0xf0;
pub const ZRL_RUN: usize = 16;

/// DC codes indexed by magnitude category.
pub const DC_CODES: [HuffmanCode; MAX_DC_SIZE as usize + 1] = [
    hc(2, 0x0),
    hc(3, 0x2),
    hc(3, 0x3),
    hc(3, 0x4),
    hc(3, 0x5),
    hc(3, 0x6),
    hc(4, 0xE),
    hc(5, 0x1E),
    hc(6, 0x3E),
    hc(7, 0x7E),
    hc(8, 0xFE),
    hc(9, 0x1FE),
];

/// AC codes indexed by `[run][size]`. `[0][0]` is EOB and `[15][0]` is ZRL; the other
/// zero-size entries have no code.
pub const AC_CODES: [[HuffmanCode; MAX_AC_SIZE as usize + 1]; MAX_RUN as usize + 1] = [
    [
        hc(4, 0xA), hc(2, 0x0), hc(2, 0x1), hc(3, 0x4),
        hc(4, 0xB), hc(5, 0x1A), hc(7, 0x78), hc(8, 0xF8),
        hc(10, 0x3F6), hc(16, 0xFF82), hc(16, 0xFF83),
    ],
    [
        ABSENT, hc(4, 0xC), hc(5, 0x1B), hc(7, 0x79),
        hc(9, 0x1F6), hc(11, 0x7F6), hc(16, 0xFF84), hc(16, 0xFF85),
        hc(16, 0xFF86), hc(16, 0xFF87), hc(16, 0xFF88),
    ],
    [
        ABSENT, hc(5, 0x1C), hc(8, 0xF9), hc(10, 0x3F7),
        hc(12, 0xFF4), hc(16, 0xFF89), hc(16, 0xFF8A), hc(16, 0xFF8B),
        hc(16, 0xFF8C), hc(16, 0xFF8D), hc(16, 0xFF8E),
    ],
    [
        ABSENT, hc(6, 0x3A), hc(9, 0x1F7), hc(12, 0xFF5),
        hc(16, 0xFF8F), hc(16, 0xFF90), hc(16, 0xFF91), hc(16, 0xFF92),
        hc(16, 0xFF93), hc(16, 0xFF94), hc(16, 0xFF95),
    ],
    [
        ABSENT, hc(6, 0x3B), hc(10, 0x3F8), hc(16, 0xFF96),
        hc(16, 0xFF97), hc(16, 0xFF98), hc(16, 0xFF99), hc(16, 0xFF9A),
        hc(16, 0xFF9B), hc(16, 0xFF9C), hc(16, 0xFF9D),
    ],
    [
        ABSENT, hc(7, 0x7A), hc(11, 0x7F7), hc(16, 0xFF9E),
        hc(16, 0xFF9F), hc(16, 0xFFA0), hc(16, 0xFFA1), hc(16, 0xFFA2),
        hc(16, 0xFFA3), hc(16, 0xFFA4), hc(16, 0xFFA5),
    ],
    [
        ABSENT, hc(7, 0x7B), hc(12, 0xFF6), hc(16, 0xFFA6),
        hc(16, 0xFFA7), hc(16, 0xFFA8), hc(16, 0xFFA9), hc(16, 0xFFAA),
        hc(16, 0xFFAB), hc(16, 0xFFAC), hc(16, 0xFFAD),
    ],
    [
        ABSENT, hc(8, 0xFA), hc(12, 0xFF7), hc(16, 0xFFAE),
        hc(16, 0xFFAF), hc(16, 0xFFB0), hc(16, 0xFFB1), hc(16, 0xFFB2),
        hc(16, 0xFFB3), hc(16, 0xFFB4), hc(16, 0xFFB5),
    ],
    [
        ABSENT, hc(9, 0x1F8), hc(15, 0x7FC0), hc(16, 0xFFB6),
        hc(16, 0xFFB7), hc(16, 0xFFB8), hc(16, 0xFFB9), hc(16, 0xFFBA),
        hc(16, 0xFFBB), hc(16, 0xFFBC), hc(16, 0xFFBD),
    ],
    [
        ABSENT, hc(9, 0x1F9), hc(16, 0xFFBE), hc(16, 0xFFBF),
        hc(16, 0xFFC0), hc(16, 0xFFC1), hc(16, 0xFFC2), hc(16, 0xFFC3),
        hc(16, 0xFFC4), hc(16, 0xFFC5), hc(16, 0xFFC6),
    ],
    [
        ABSENT, hc(9, 0x1FA), hc(16, 0xFFC7), hc(16, 0xFFC8),
        hc(16, 0xFFC9), hc(16, 0xFFCA), hc(16, 0xFFCB), hc(16, 0xFFCC),
        hc(16, 0xFFCD), hc(16, 0xFFCE), hc(16, 0xFFCF),
    ],
    [
        ABSENT, hc(10, 0x3F9), hc(16, 0xFFD0), hc(16, 0xFFD1),
        hc(16, 0xFFD2), hc(16, 0xFFD3), hc(16, 0xFFD4), hc(16, 0xFFD5),
        hc(16, 0xFFD6), hc(16, 0xFFD7), hc(16, 0xFFD8),
    ],
    [
        ABSENT, hc(10, 0x3FA), hc(16, 0xFFD9), hc(16, 0xFFDA),
        hc(16, 0xFFDB), hc(16, 0xFFDC), hc(16, 0xFFDD), hc(16, 0xFFDE),
        hc(16, 0xFFDF), hc(16, 0xFFE0), hc(16, 0xFFE1),
    ],
    [
        ABSENT, hc(11, 0x7F8), hc(16, 0xFFE2), hc(16, 0xFFE3),
        hc(16, 0xFFE4), hc(16, 0xFFE5), hc(16, 0xFFE6), hc(16, 0xFFE7),
        hc(16, 0xFFE8), hc(16, 0xFFE9), hc(16, 0xFFEA),
    ],
    [
        ABSENT, hc(16, 0xFFEB), hc(16, 0xFFEC), hc(16, 0xFFED),
        hc(16, 0xFFEE), hc(16, 0xFFEF), hc(16, 0xFFF0), hc(16, 0xFFF1),
        hc(16, 0xFFF2), hc(16, 0xFFF3), hc(16, 0xFFF4),
    ],
    [
        hc(11, 0x7F9), hc(16, 0xFFF5), hc(16, 0xFFF6), hc(16, 0xFFF7),
        hc(16, 0xFFF8), hc(16, 0xFFF9), hc(16, 0xFFFA), hc(16, 0xFFFB),
        hc(16, 0xFFFC), hc(16, 0xFFFD), hc(16, 0xFFFE),
    ],
];

/// AC symbol byte: run length in the high nibble, magnitude category in the low one.
#[inline]
pub fn ac_symbol(run: u8, size: u8) -> u8 {
    (run << 4) | size
}
