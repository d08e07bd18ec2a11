// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    error::{Error, Result},
    util::TryWithCapacity,
};

/// Appends MSB-first bit fields to a growable byte buffer.
///
/// Bits are packed from the most significant bit of each byte down. The unused low
/// bits of the last byte are always zero, so `data.len() == bits_written.div_ceil(8)`.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    data: Vec<u8>,
    bits_written: usize,
}

pub const MAX_BITS_PER_CALL: usize = 16;

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Empty writer with room for `bytes` bytes of output.
    pub fn with_capacity(bytes: usize) -> Result<BitWriter> {
        Ok(BitWriter {
            data: Vec::try_with_capacity(bytes)?,
            bits_written: 0,
        })
    }

    /// Writer whose first `header_bytes` bytes are zeroed and reserved, with the cursor
    /// placed right after them.
    pub fn with_header(header_bytes: usize, capacity: usize) -> Result<BitWriter> {
        let mut data = Vec::try_with_capacity(capacity.max(header_bytes))?;
        data.resize(header_bytes, 0);
        Ok(BitWriter {
            data,
            bits_written: header_bytes * 8,
        })
    }

    pub fn bits_written(&self) -> usize {
        self.bits_written
    }

    /// Writes the low `width` bits of `value`, most significant first. Returns the
    /// number of bits written.
    /// ```
    /// # use jpeg422::bit_writer::BitWriter;
    /// let mut bw = BitWriter::new();
    /// bw.write(0b101, 3);
    /// assert_eq!(bw.write(0xfff, 12), 12);
    /// assert_eq!(bw.bits_written(), 15);
    /// assert_eq!(bw.as_bytes(), &[0b1011_1111, 0b1111_1110]);
    /// ```
    pub fn write(&mut self, value: u16, width: usize) -> usize {
        debug_assert!(width <= MAX_BITS_PER_CALL);
        if width > 8 {
            self.write_byte_field((value >> 8) as u8, width - 8)
                + self.write_byte_field(value as u8, 8)
        } else {
            self.write_byte_field(value as u8, width)
        }
    }

    fn write_byte_field(&mut self, value: u8, width: usize) -> usize {
        let mut remaining = width;
        let mut value = value & low_mask(width);
        while remaining > 0 {
            let used = self.bits_written % 8;
            if used == 0 {
                self.data.push(0);
            }
            let free = 8 - used;
            let last = self.data.len() - 1;
            if remaining <= free {
                self.data[last] |= value << (free - remaining);
                self.bits_written += remaining;
                remaining = 0;
            } else {
                self.data[last] |= value >> (remaining - free);
                self.bits_written += free;
                remaining -= free;
                value &= low_mask(remaining);
            }
        }
        width
    }

    /// Appends every bit written to `other`.
    pub fn append(&mut self, other: &BitWriter) {
        if self.bits_written % 8 == 0 {
            self.data.extend_from_slice(&other.data);
            self.bits_written += other.bits_written;
            return;
        }
        let full_bytes = other.bits_written / 8;
        for &byte in &other.data[..full_bytes] {
            self.write_byte_field(byte, 8);
        }
        let tail = other.bits_written % 8;
        if tail > 0 {
            self.write_byte_field(other.data[full_bytes] >> (8 - tail), tail);
        }
    }

    /// Overwrites four already-written bytes at `byte_offset` with `value`, little-endian.
    pub fn patch_u32_le(&mut self, byte_offset: usize, value: u32) -> Result<()> {
        let field = self
            .data
            .get_mut(byte_offset..byte_offset + 4)
            .ok_or(Error::OutOfBounds)?;
        LittleEndian::write_u32(field, value);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[inline(always)]
fn low_mask(width: usize) -> u8 {
    ((1u16 << width) - 1) as u8
}
