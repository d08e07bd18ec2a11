// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::tables::{
    AC_CODES, DC_CODES, EOB_SYMBOL, HuffmanCode, MAX_AC_SIZE, MAX_DC_SIZE, MAX_RUN, ac_symbol,
};
use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// Children for a 0 bit and a 1 bit, as indices into the arena.
    Internal([Option<u32>; 2]),
    Leaf(u8),
}

/// Binary decoding tree over a fixed prefix code, stored as an arena rooted at index 0.
#[derive(Debug)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
}

impl HuffmanTree {
    /// Builds the tree from `(symbol, code)` pairs. Codes of length zero are skipped.
    /// Fails with [`Error::HuffmanCollision`] if a code equals or extends another one.
    pub fn build(codes: impl IntoIterator<Item = (u8, HuffmanCode)>) -> Result<HuffmanTree> {
        let mut nodes = vec![Node::Internal([None; 2])];
        for (symbol, code) in codes {
            if code.length == 0 {
                continue;
            }
            let collision = Error::HuffmanCollision {
                symbol,
                code: code.bits,
                length: code.length,
            };
            let mut current = 0usize;
            for depth in (0..code.length).rev() {
                let bit = ((code.bits >> depth) & 1) as usize;
                let Node::Internal(children) = nodes[current] else {
                    return Err(collision);
                };
                let is_last = depth == 0;
                current = match children[bit] {
                    Some(_) if is_last => return Err(collision),
                    Some(child) => child as usize,
                    None => {
                        let child = nodes.len();
                        nodes.push(if is_last {
                            Node::Leaf(symbol)
                        } else {
                            Node::Internal([None; 2])
                        });
                        if let Node::Internal(children) = &mut nodes[current] {
                            children[bit] = Some(child as u32);
                        }
                        child
                    }
                };
            }
        }
        Ok(HuffmanTree { nodes })
    }

    /// Walks the tree one bit at a time until a leaf is reached.
    pub fn read(&self, br: &mut BitReader) -> Result<u8> {
        let mut current = 0usize;
        loop {
            match self.nodes[current] {
                Node::Leaf(symbol) => return Ok(symbol),
                Node::Internal(children) => {
                    let bit = br.read_bit()?;
                    current = children[bit].ok_or(Error::InvalidHuffmanCode)? as usize;
                }
            }
        }
    }

    pub fn num_symbols(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }
}

/// Magnitude category of `amplitude` and the bits that encode it. Negative values are
/// stored as `amplitude - 1` truncated to `size` bits, so their leading bit is 0.
pub fn magnitude_bits(amplitude: i16) -> (u8, u16) {
    if amplitude == 0 {
        return (0, 0);
    }
    let size = (16 - amplitude.unsigned_abs().leading_zeros()) as u8;
    let bits = if amplitude > 0 {
        amplitude as u16
    } else {
        ((amplitude as i32 - 1) as u16) & ((1u32 << size) - 1) as u16
    };
    (size, bits)
}

/// Inverse of [`magnitude_bits`].
pub fn extend_sign(bits: u16, size: u8) -> i16 {
    if size == 0 {
        return 0;
    }
    let bits = bits as i32;
    if bits < 1 << (size - 1) {
        (bits - (1 << size) + 1) as i16
    } else {
        bits as i16
    }
}

/// Encoder tables and decoding trees for DC and AC symbols.
#[derive(Debug)]
pub struct HuffmanCodec {
    dc_tree: HuffmanTree,
    ac_tree: HuffmanTree,
}

impl HuffmanCodec {
    pub fn new() -> Result<HuffmanCodec> {
        let dc_tree = HuffmanTree::build(
            DC_CODES
                .iter()
                .enumerate()
                .map(|(size, &code)| (size as u8, code)),
        )?;
        let ac_tree = HuffmanTree::build(AC_CODES.iter().enumerate().flat_map(|(run, row)| {
            row.iter()
                .enumerate()
                .map(move |(size, &code)| (ac_symbol(run as u8, size as u8), code))
        }))?;
        debug!(
            dc_symbols = dc_tree.num_symbols(),
            ac_symbols = ac_tree.num_symbols(),
            "built Huffman trees"
        );
        Ok(HuffmanCodec { dc_tree, ac_tree })
    }

    /// Writes a DC difference: its category code followed by the magnitude bits.
    pub fn write_dc(&self, amplitude: i16, bw: &mut BitWriter) -> Result<()> {
        let (size, bits) = magnitude_bits(amplitude);
        if size > MAX_DC_SIZE {
            return Err(Error::AmplitudeOutOfRange {
                amplitude,
                size,
                max: MAX_DC_SIZE,
            });
        }
        let code = DC_CODES[size as usize];
        bw.write(code.bits, code.length as usize);
        bw.write(bits, size as usize);
        Ok(())
    }

    /// Writes an AC coefficient preceded by `run` zeros. An amplitude of 0 writes EOB
    /// for run 0 and ZRL for run 15.
    pub fn write_ac(&self, amplitude: i16, run: u8, bw: &mut BitWriter) -> Result<()> {
        let (size, bits) = magnitude_bits(amplitude);
        if size > MAX_AC_SIZE {
            return Err(Error::AmplitudeOutOfRange {
                amplitude,
                size,
                max: MAX_AC_SIZE,
            });
        }
        if run > MAX_RUN {
            return Err(Error::NoHuffmanCode { run, size });
        }
        let code = AC_CODES[run as usize][size as usize];
        if code.length == 0 {
            return Err(Error::NoHuffmanCode { run, size });
        }
        bw.write(code.bits, code.length as usize);
        bw.write(bits, size as usize);
        Ok(())
    }

    pub fn write_eob(&self, bw: &mut BitWriter) {
        let code = AC_CODES[0][EOB_SYMBOL as usize];
        bw.write(code.bits, code.length as usize);
    }

    /// Reads a DC difference.
    pub fn read_dc(&self, br: &mut BitReader) -> Result<i16> {
        let size = self.dc_tree.read(br)?;
        let bits = br.read(size as usize)?;
        Ok(extend_sign(bits, size))
    }

    /// Reads an AC symbol, returning `(run, amplitude)`. EOB comes back as `(0, 0)` and
    /// ZRL as `(15, 0)`.
    pub fn read_ac(&self, br: &mut BitReader) -> Result<(u8, i16)> {
        let symbol = self.ac_tree.read(br)?;
        let run = symbol >> 4;
        let size = symbol & 0xf;
        let bits = br.read(size as usize)?;
        Ok((run, extend_sign(bits, size)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entropy_coding::tables::ZRL_SYMBOL;
    use test_log::test;

    fn write_code(code: HuffmanCode) -> Vec<u8> {
        let mut bw = BitWriter::new();
        bw.write(code.bits, code.length as usize);
        bw.into_bytes()
    }

    #[test]
    fn every_dc_code_decodes_to_its_category() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        for (size, &code) in DC_CODES.iter().enumerate() {
            let bytes = write_code(code);
            let mut br = BitReader::with_range(&bytes, 0, code.length as usize)?;
            assert_eq!(codec.dc_tree.read(&mut br)?, size as u8);
            assert_eq!(br.bits_remaining(), 0);
        }
        Ok(())
    }

    #[test]
    fn every_ac_code_decodes_to_its_symbol() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        assert_eq!(codec.ac_tree.num_symbols(), 162);
        for (run, row) in AC_CODES.iter().enumerate() {
            for (size, &code) in row.iter().enumerate().filter(|(_, c)| c.length > 0) {
                let bytes = write_code(code);
                let mut br = BitReader::with_range(&bytes, 0, code.length as usize)?;
                assert_eq!(
                    codec.ac_tree.read(&mut br)?,
                    ac_symbol(run as u8, size as u8)
                );
            }
        }
        Ok(())
    }

    #[test]
    fn collisions_are_rejected() {
        let same = [(1, HuffmanCode { length: 2, bits: 0b10 }), (2, HuffmanCode { length: 2, bits: 0b10 })];
        assert!(matches!(
            HuffmanTree::build(same),
            Err(Error::HuffmanCollision { symbol: 2, .. })
        ));
        let prefix_first = [(1, HuffmanCode { length: 1, bits: 0b1 }), (2, HuffmanCode { length: 3, bits: 0b101 })];
        assert!(matches!(
            HuffmanTree::build(prefix_first),
            Err(Error::HuffmanCollision { symbol: 2, .. })
        ));
        let prefix_last = [(1, HuffmanCode { length: 3, bits: 0b101 }), (2, HuffmanCode { length: 1, bits: 0b1 })];
        assert!(matches!(
            HuffmanTree::build(prefix_last),
            Err(Error::HuffmanCollision { symbol: 2, .. })
        ));
    }

    #[test]
    fn unassigned_paths_are_corrupt() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        let ones = [0xffu8; 4];
        assert!(matches!(
            codec.read_dc(&mut BitReader::new(&ones)),
            Err(Error::InvalidHuffmanCode)
        ));
        assert!(matches!(
            codec.read_ac(&mut BitReader::new(&ones)),
            Err(Error::InvalidHuffmanCode)
        ));
        Ok(())
    }

    #[test]
    fn truncated_code_is_out_of_bounds() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        // First 5 bits of the 9-bit DC category 11 code.
        let bytes = [0xf8u8];
        let mut br = BitReader::with_range(&bytes, 0, 5)?;
        assert!(matches!(codec.read_dc(&mut br), Err(Error::OutOfBounds)));
        Ok(())
    }

    #[test]
    fn magnitude_categories() {
        assert_eq!(magnitude_bits(0), (0, 0));
        assert_eq!(magnitude_bits(1), (1, 0b1));
        assert_eq!(magnitude_bits(-1), (1, 0b0));
        assert_eq!(magnitude_bits(5), (3, 0b101));
        assert_eq!(magnitude_bits(-5), (3, 0b010));
        assert_eq!(magnitude_bits(1023), (10, 0x3ff));
        assert_eq!(magnitude_bits(-1024), (11, 0x3ff));
        assert_eq!(magnitude_bits(2047).0, 11);
        for amplitude in -2047..=2047 {
            let (size, bits) = magnitude_bits(amplitude);
            assert_eq!(extend_sign(bits, size), amplitude);
        }
    }

    #[test]
    fn eob_and_zrl_use_reserved_codes() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        let mut bw = BitWriter::new();
        codec.write_ac(0, 0, &mut bw)?;
        assert_eq!(bw.bits_written(), 4);
        codec.write_ac(0, 15, &mut bw)?;
        assert_eq!(bw.bits_written(), 15);
        codec.write_eob(&mut bw);
        let bytes = bw.into_bytes();
        let mut br = BitReader::new(&bytes);
        assert_eq!(codec.ac_tree.read(&mut br)?, EOB_SYMBOL);
        assert_eq!(codec.ac_tree.read(&mut br)?, ZRL_SYMBOL);
        assert_eq!(codec.read_ac(&mut br)?, (0, 0));
        Ok(())
    }

    #[test]
    fn out_of_range_amplitudes() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        let mut bw = BitWriter::new();
        assert!(matches!(
            codec.write_dc(2048, &mut bw),
            Err(Error::AmplitudeOutOfRange { size: 12, .. })
        ));
        assert!(matches!(
            codec.write_ac(-1024, 0, &mut bw),
            Err(Error::AmplitudeOutOfRange { size: 11, .. })
        ));
        assert!(matches!(
            codec.write_ac(0, 3, &mut bw),
            Err(Error::NoHuffmanCode { run: 3, size: 0 })
        ));
        assert!(matches!(
            codec.write_ac(1, 16, &mut bw),
            Err(Error::NoHuffmanCode { run: 16, .. })
        ));
        assert_eq!(bw.bits_written(), 0);
        Ok(())
    }

    #[test]
    fn signed_values_round_trip() -> Result<()> {
        let codec = HuffmanCodec::new()?;
        let mut bw = BitWriter::new();
        for amplitude in [-2047i16, -1024, -3, -1, 0, 1, 2, 700, 2047] {
            codec.write_dc(amplitude, &mut bw)?;
        }
        for (run, amplitude) in [(0u8, 1i16), (15, -1), (3, 1023), (1, -1023), (7, 42)] {
            codec.write_ac(amplitude, run, &mut bw)?;
        }
        let bytes = bw.into_bytes();
        let mut br = BitReader::new(&bytes);
        for amplitude in [-2047i16, -1024, -3, -1, 0, 1, 2, 700, 2047] {
            assert_eq!(codec.read_dc(&mut br)?, amplitude);
        }
        for (run, amplitude) in [(0u8, 1i16), (15, -1), (3, 1023), (1, -1023), (7, 42)] {
            assert_eq!(codec.read_ac(&mut br)?, (run, amplitude));
        }
        Ok(())
    }
}
