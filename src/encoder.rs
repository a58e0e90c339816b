// rrzip is a compressed coverage library for influence maximization systems
// Copyright (C) 2022 Jacob Konrad
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Per-set encoding against a shared read-only codebook.
//!
//! Encoding is embarrassingly parallel over RR sets: the codebook is never
//! written during encoding and every output buffer belongs to exactly one
//! set, so callers fan sets out across workers without synchronization.

use crate::{bits::BitWriter, config::Mode, huffman::Codebook, Vertex};

/// One RR set in compressed form.
pub struct CompressedSet
{
    /// Packed codewords, big-endian, MSB-first, no framing between them.
    pub bytes: Vec<u8>,
    /// How many symbols are packed into `bytes`. Decoding cannot detect
    /// the end of the stream on its own.
    pub code_count: u32,
    /// Entries with no usable codeword, kept raw in encoder order. Empty
    /// in lossy mode.
    pub copy: Vec<Vertex>,
}

impl CompressedSet
{
    /// Heap bytes held by this set's buffers.
    pub fn nbytes(&self) -> usize
    {
        std::mem::size_of_val(&self.bytes[..]) + std::mem::size_of_val(&self.copy[..])
    }
}

/// Compress one RR set.
///
/// If `max_vertex` occurs in the set it is swapped to the front first, so
/// it becomes the first symbol a decoder sees; the selection loop probes
/// for the max-frequency vertex far more often than any other, and this
/// lets that probe terminate after one codeword.
///
/// Vertices whose code is longer than `inline_bits` (or that have no code
/// at all) spill to the copy array, or are dropped under [`Mode::Lossy`].
pub fn encode(
    book: &Codebook,
    set: &mut [Vertex],
    max_vertex: Vertex,
    mode: Mode,
    inline_bits: u8,
) -> CompressedSet
{
    if let Some(pos) = set.iter().position(|&v| v == max_vertex) {
        set.swap(0, pos);
    }

    let mut writer = BitWriter::with_capacity(set.len());
    let mut copy = Vec::new();
    let mut code_count = 0u32;

    for &v in set.iter() {
        match book.code(v) {
            Some(code) if code.len <= inline_bits => {
                writer.append(code.hi, code.lo, code.len as u32);
                code_count += 1;
            }
            _ => {
                if mode == Mode::Lossless {
                    copy.push(v);
                }
            }
        }
    }

    CompressedSet {
        bytes: writer.into_bytes(),
        code_count,
        copy,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::decoder;

    #[test]
    fn splits_entries_between_stream_and_copy()
    {
        // Lengths: 0 -> 1 bit, 1 and 2 -> 2 bits.
        let book = Codebook::from_frequencies(&[10, 1, 1]).unwrap();
        let mut set = vec![0, 1, 2];
        let compressed = encode(&book, &mut set, 0, Mode::Lossless, 1);
        assert_eq!(1, compressed.code_count);
        assert_eq!(vec![1, 2], compressed.copy);
    }

    #[test]
    fn lossless_keeps_every_entry()
    {
        let book = Codebook::from_frequencies(&[10, 1, 1]).unwrap();
        let mut set = vec![0, 1, 2];
        let compressed = encode(&book, &mut set, 0, Mode::Lossless, 32);
        assert_eq!(3, compressed.code_count + compressed.copy.len() as u32);
    }

    #[test]
    fn lossy_drops_uncodeable_entries()
    {
        let book = Codebook::from_frequencies(&[10, 1, 1]).unwrap();
        let mut set = vec![1];
        let compressed = encode(&book, &mut set, 0, Mode::Lossy, 1);
        assert_eq!(0, compressed.code_count);
        assert!(compressed.bytes.is_empty());
        assert!(compressed.copy.is_empty());
    }

    #[test]
    fn max_vertex_is_encoded_first()
    {
        let book = Codebook::from_frequencies(&[5, 4, 3, 2]).unwrap();
        let mut set = vec![0, 1, 3];
        let compressed = encode(&book, &mut set, 3, Mode::Lossless, 32);
        let mut out = Vec::new();
        decoder::decode(&book, &compressed.bytes, compressed.code_count, &mut out);
        assert_eq!(3, out[0]);
        assert_eq!(3, compressed.code_count);
    }

    #[test]
    fn empty_set_encodes_to_nothing()
    {
        let book = Codebook::from_frequencies(&[1]).unwrap();
        let mut set = Vec::new();
        let compressed = encode(&book, &mut set, 0, Mode::Lossless, 32);
        assert!(compressed.bytes.is_empty());
        assert_eq!(0, compressed.code_count);
        assert!(compressed.copy.is_empty());
    }
}
