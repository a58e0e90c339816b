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

// Based on:
//
// A Method for the Construction of Minimum-Redundancy Codes
//
// by David A. Huffman
//
// Proceedings of the IRE, 1952.

//! Vertex-frequency collection and the Huffman codebook built from it.
//!
//! Influence graphs show a heavy frequency skew across reverse-reachable
//! sets, so the handful of hub vertices that dominate the collection get
//! codes of a few bits while the long tail spills to per-set copy arrays.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{RRSet, Vertex};

/// A codeword of up to 128 bits, left-aligned across two words.
///
/// Bits 0..64 live in `hi`, bits 64..128 in `lo`; everything past `len` is
/// zero. `len == 0` marks a vertex with no usable code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code
{
    pub hi: u64,
    pub lo: u64,
    pub len: u8,
}

const NIL: u32 = u32::MAX;

pub(crate) struct Node
{
    pub(crate) left: u32,
    pub(crate) right: u32,
    pub(crate) freq: u64,
    pub(crate) symbol: Vertex,
    pub(crate) leaf: bool,
}

/// Count vertex occurrences across a collection of RR sets.
///
/// Returns the dense frequency table and the maximum-frequency vertex,
/// ties going to the highest vertex id. Vertex ids must lie in
/// `[0, num_vertices)`.
pub fn count_frequencies(sets: &[RRSet], num_vertices: usize) -> (Vec<u64>, Vertex)
{
    let mut freq = vec![0u64; num_vertices];
    for set in sets {
        for &v in set {
            freq[v as usize] += 1;
        }
    }
    let mut max_vertex = 0;
    let mut max_freq = 0;
    for (v, &f) in freq.iter().enumerate() {
        if f > 0 && f >= max_freq {
            max_freq = f;
            max_vertex = v as Vertex;
        }
    }
    (freq, max_vertex)
}

/// A Huffman tree over vertex ids plus the per-vertex code table.
///
/// Nodes live in a contiguous arena indexed by `u32`, so the tree is a
/// single allocation and child links stay valid for the codebook's whole
/// lifetime. Construction is deterministic: the build heap orders equal
/// frequencies by insertion sequence, making the codebook a pure function
/// of the frequency table.
pub struct Codebook
{
    nodes: Vec<Node>,
    root: u32,
    codes: Vec<Code>,
}

impl Codebook
{
    /// Build the codebook for a frequency table.
    ///
    /// Returns `None` when no vertex has a nonzero frequency.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrzip::huffman::Codebook;
    ///
    /// let book = Codebook::from_frequencies(&[5, 1, 1]).unwrap();
    /// assert_eq!(Some(1), book.bit_len(0));
    /// assert_eq!(Some(2), book.bit_len(1));
    /// assert_eq!(Some(2), book.bit_len(2));
    /// ```
    pub fn from_frequencies(freq: &[u64]) -> Option<Self>
    {
        let num_symbols = freq.iter().filter(|&&f| f > 0).count();
        if num_symbols == 0 {
            return None;
        }

        let mut nodes = Vec::with_capacity(2 * num_symbols);
        let mut heap = BinaryHeap::with_capacity(num_symbols);
        for (v, &f) in freq.iter().enumerate() {
            if f > 0 {
                let id = nodes.len() as u32;
                nodes.push(Node {
                    left: NIL,
                    right: NIL,
                    freq: f,
                    symbol: v as Vertex,
                    leaf: true,
                });
                heap.push(Reverse((f, id)));
            }
        }

        while heap.len() > 1 {
            let Reverse((fa, a)) = heap.pop().unwrap();
            let Reverse((fb, b)) = heap.pop().unwrap();
            let id = nodes.len() as u32;
            nodes.push(Node {
                left: a,
                right: b,
                freq: fa + fb,
                symbol: 0,
                leaf: false,
            });
            heap.push(Reverse((fa + fb, id)));
        }

        let root = (nodes.len() - 1) as u32;
        let codes = emit_codes(&nodes, root, freq.len());

        log::debug!(
            "codebook built: {} symbols, {} nodes",
            num_symbols,
            nodes.len()
        );

        Some(Self { nodes, root, codes })
    }

    /// The codeword of a vertex, if it has a usable one.
    pub fn code(&self, v: Vertex) -> Option<Code>
    {
        self.codes
            .get(v as usize)
            .filter(|code| code.len > 0)
            .copied()
    }

    /// The code length of a vertex, in bits.
    pub fn bit_len(&self, v: Vertex) -> Option<u8>
    {
        self.code(v).map(|code| code.len)
    }

    /// The number of vertices with a code in the tree.
    pub fn num_symbols(&self) -> usize
    {
        (self.nodes.len() + 1) / 2
    }

    pub(crate) fn root(&self) -> u32
    {
        self.root
    }

    pub(crate) fn node(&self, i: u32) -> &Node
    {
        &self.nodes[i as usize]
    }
}

// Depth-first walk appending 0 on left descent and 1 on right descent.
// An explicit stack keeps arbitrarily deep trees off the call stack.
fn emit_codes(nodes: &[Node], root: u32, table_len: usize) -> Vec<Code>
{
    let mut codes = vec![Code::default(); table_len];

    if nodes[root as usize].leaf {
        // A single-symbol tree still hands out a 1-bit code; the decoder
        // recognises the leaf root and never consumes the bit.
        codes[nodes[root as usize].symbol as usize] = Code { hi: 0, lo: 0, len: 1 };
        return codes;
    }

    let mut stack = vec![(root, 0u32, 0u64, 0u64)];
    while let Some((i, len, hi, lo)) = stack.pop() {
        let node = &nodes[i as usize];
        if node.leaf {
            // Codes past 128 bits cannot be packed; the vertex keeps
            // len == 0 and spills to the copy array instead.
            if len <= 128 {
                codes[node.symbol as usize] = if len <= 64 {
                    Code {
                        hi: hi << (64 - len),
                        lo: 0,
                        len: len as u8,
                    }
                }
                else {
                    Code {
                        hi,
                        lo: lo << (128 - len),
                        len: len as u8,
                    }
                };
            }
        }
        else {
            let (left_hi, left_lo, right_hi, right_lo) = if len < 64 {
                (hi << 1, lo, (hi << 1) | 1, lo)
            }
            else {
                (hi, lo << 1, hi, (lo << 1) | 1)
            };
            stack.push((node.right, len + 1, right_hi, right_lo));
            stack.push((node.left, len + 1, left_hi, left_lo));
        }
    }
    codes
}
