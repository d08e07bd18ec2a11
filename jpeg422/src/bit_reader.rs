// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Reads MSB-first bit fields from a byte slice, bounded to a bit range.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Unconsumed bits, left-aligned.
    bit_buf: u64,
    bits_in_buf: usize,
    total_bits_read: usize,
    end_bit: usize,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} bytes], bit_buf: {:0width$b}, total_bits_read: {}, end_bit: {} }}",
            self.data.len(),
            self.bit_buf >> (64 - self.bits_in_buf.max(1)),
            self.total_bits_read,
            self.end_bit,
            width = self.bits_in_buf
        )
    }
}

pub const MAX_BITS_PER_CALL: usize = 16;

impl<'a> BitReader<'a> {
    /// Constructs a BitReader over all of `data`.
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            data,
            bit_buf: 0,
            bits_in_buf: 0,
            total_bits_read: 0,
            end_bit: data.len() * 8,
        }
    }

    /// Constructs a BitReader positioned at bit `start_bit` of `data` that refuses to
    /// read at or past `end_bit`. Bit positions count from the start of `data`.
    /// ```
    /// # use jpeg422::bit_reader::BitReader;
    /// let mut br = BitReader::with_range(&[0b1010_1100, 0xff], 4, 10)?;
    /// assert_eq!(br.read(4)?, 0b1100);
    /// assert_eq!(br.read(2)?, 0b11);
    /// assert!(br.read(1).is_err());
    /// # Ok::<(), jpeg422::error::Error>(())
    /// ```
    pub fn with_range(data: &'a [u8], start_bit: usize, end_bit: usize) -> Result<BitReader<'a>> {
        if start_bit > end_bit || end_bit > data.len() * 8 {
            return Err(Error::InvalidBitRange {
                start: start_bit,
                end: end_bit,
                len: data.len(),
            });
        }
        let first_byte = start_bit / 8;
        let mut br = BitReader {
            data: &data[first_byte..end_bit.div_ceil(8)],
            bit_buf: 0,
            bits_in_buf: 0,
            total_bits_read: first_byte * 8,
            end_bit,
        };
        let skip = start_bit % 8;
        if skip > 0 {
            br.read(skip)?;
        }
        Ok(br)
    }

    /// Reads `num` bits from the buffer without consuming them.
    pub fn peek(&mut self, num: usize) -> Result<u16> {
        if num > MAX_BITS_PER_CALL {
            return Err(Error::ReadTooLarge(num));
        }
        if num > self.bits_remaining() {
            return Err(Error::OutOfBounds);
        }
        if num == 0 {
            return Ok(0);
        }
        if self.bits_in_buf < num {
            self.refill();
        }
        Ok((self.bit_buf >> (64 - num)) as u16)
    }

    /// Advances by `num` bits. The bits must already be in the buffer, i.e. a
    /// successful `peek(num)` must precede this call.
    pub fn consume(&mut self, num: usize) -> Result<()> {
        if self.bits_in_buf < num {
            return Err(Error::OutOfBounds);
        }
        self.bit_buf <<= num;
        self.bits_in_buf -= num;
        self.total_bits_read += num;
        Ok(())
    }

    /// Reads `num` bits, most significant bit first.
    /// ```
    /// # use jpeg422::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0, 0x80]);
    /// assert_eq!(br.read(8)?, 0);
    /// assert_eq!(br.read(4)?, 8);
    /// assert_eq!(br.read(4)?, 0);
    /// assert_eq!(br.total_bits_read(), 16);
    /// assert!(br.read(1).is_err());
    /// # Ok::<(), jpeg422::error::Error>(())
    /// ```
    pub fn read(&mut self, num: usize) -> Result<u16> {
        let ret = self.peek(num)?;
        self.consume(num)?;
        Ok(ret)
    }

    #[inline]
    pub fn read_bit(&mut self) -> Result<usize> {
        Ok(self.read(1)? as usize)
    }

    /// Returns the absolute position of the next bit to be read.
    pub fn total_bits_read(&self) -> usize {
        self.total_bits_read
    }

    pub fn bits_remaining(&self) -> usize {
        self.end_bit - self.total_bits_read
    }

    fn refill(&mut self) {
        if self.data.len() >= 8 {
            let bits = BigEndian::read_u64(self.data);
            self.bit_buf |= bits >> self.bits_in_buf;
            let read_bytes = (63 - self.bits_in_buf) >> 3;
            self.bits_in_buf |= 56;
            self.data = &self.data[read_bytes..];
        } else {
            self.refill_slow()
        }
    }

    #[inline(never)]
    fn refill_slow(&mut self) {
        while self.bits_in_buf < 56 {
            let Some((&byte, rest)) = self.data.split_first() else {
                break;
            };
            self.bit_buf |= (byte as u64) << (56 - self.bits_in_buf);
            self.bits_in_buf += 8;
            self.data = rest;
        }
    }
}
