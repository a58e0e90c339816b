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

//! Bit-walk decoding of a compressed RR set, with an optional probe that
//! short-circuits as soon as a target vertex is decoded.

use crate::{huffman::Codebook, Vertex};

/// Outcome of a probing walk.
#[derive(Debug, PartialEq, Eq)]
pub enum Probe
{
    /// The target was decoded; the output holds the symbols decoded up to
    /// and including the match and must not be consumed past it.
    Found,
    /// The target was not seen. Carries the number of symbols emitted,
    /// which falls short of `code_count` only for a truncated stream.
    Decoded(usize),
}

/// Decode `code_count` symbols from `bytes` into `out`.
///
/// Bits are consumed MSB-first; each leaf emits a symbol and resets the
/// walk to the root. A root that is itself a leaf emits its symbol
/// `code_count` times without consuming bits. Returns the number of
/// symbols emitted: a result short of `code_count` means the stream ended
/// with symbols still owed, and `out` holds only what was decoded.
pub fn decode(book: &Codebook, bytes: &[u8], code_count: u32, out: &mut Vec<Vertex>) -> usize
{
    match walk(book, bytes, code_count, None, out) {
        Probe::Decoded(emitted) => emitted,
        Probe::Found => unreachable!(),
    }
}

/// Decode while watching for `target`, stopping at the first match.
pub fn probe(
    book: &Codebook,
    bytes: &[u8],
    code_count: u32,
    target: Vertex,
    out: &mut Vec<Vertex>,
) -> Probe
{
    walk(book, bytes, code_count, Some(target), out)
}

fn walk(
    book: &Codebook,
    bytes: &[u8],
    code_count: u32,
    target: Option<Vertex>,
    out: &mut Vec<Vertex>,
) -> Probe
{
    let root = book.root();

    if book.node(root).leaf {
        // Constant collection: one distinct symbol, no bits to read.
        let symbol = book.node(root).symbol;
        if target == Some(symbol) && code_count > 0 {
            out.push(symbol);
            return Probe::Found;
        }
        for _ in 0..code_count {
            out.push(symbol);
        }
        return Probe::Decoded(code_count as usize);
    }

    let total_bits = bytes.len() * 8;
    let mut n = root;
    let mut count = 0usize;
    let mut i = 0usize;

    while count < code_count as usize {
        if i == total_bits {
            break;
        }
        let bit = (bytes[i >> 3] >> (7 - (i & 7))) & 1;
        let node = book.node(n);
        n = if bit == 0 { node.left } else { node.right };
        i += 1;

        let node = book.node(n);
        if node.leaf {
            out.push(node.symbol);
            if target == Some(node.symbol) {
                return Probe::Found;
            }
            n = root;
            count += 1;
        }
    }

    Probe::Decoded(count)
}
