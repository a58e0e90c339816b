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
// Maximizing Social Influence in Nearly Optimal Time
//
// by Christian Borgs, Michael Brautbar, Jennifer Chayes and Brendan Lucier
//
// https://arxiv.org/abs/1212.0884

//! The compressed greedy coverage loop.
//!
//! The collection of RR sets is held Huffman-coded; each greedy iteration
//! decodes the still-active sets in parallel, retires those containing the
//! current pick, and counts the rest to produce the next pick. The
//! uncompressed collection is never materialized.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    config::{Config, Release},
    decoder::{self, Probe},
    encoder::{self, CompressedSet},
    error::Result,
    huffman::{self, Codebook},
    select, RRSet, Vertex,
};

struct Slot
{
    covered: bool,
    set: CompressedSet,
}

/// A Huffman-coded RR collection with its selection state.
///
/// Built once from the raw sets, then drained by [`select`]: each call
/// consumes coverage, so a fresh build is needed for a fresh selection.
///
/// [`select`]: CompressedSets::select
pub struct CompressedSets
{
    book: Codebook,
    slots: Vec<Slot>,
    num_vertices: usize,
    first_pick: Vertex,
    uncovered: usize,
    release: Release,
}

impl CompressedSets
{
    /// Compress a collection of RR sets.
    ///
    /// Each raw set is released as soon as it has been encoded, bounding
    /// peak memory to roughly one collection. Sets that were empty on
    /// arrival are born retired and contribute nothing to selection.
    /// Returns `None` when every set is empty.
    pub fn build(sets: &mut Vec<RRSet>, num_vertices: usize, config: &Config) -> Option<Self>
    {
        let (freq, first_pick) = huffman::count_frequencies(sets, num_vertices);
        let book = Codebook::from_frequencies(&freq)?;
        drop(freq);

        let mode = config.mode;
        let inline_bits = config.inline_bits;
        let slots: Vec<Slot> = sets
            .par_iter_mut()
            .map(|set| {
                let empty = set.is_empty();
                let compressed = encoder::encode(&book, set, first_pick, mode, inline_bits);
                set.clear();
                set.shrink_to_fit();
                Slot {
                    covered: empty,
                    set: compressed,
                }
            })
            .collect();

        let uncovered = slots.iter().filter(|slot| !slot.covered).count();

        Some(Self {
            book,
            slots,
            num_vertices,
            first_pick,
            uncovered,
            release: config.release,
        })
    }

    /// Greedily pick up to `k` seeds.
    ///
    /// Returns the covered fraction and the picks in selection order. The
    /// loop ends early when every set is covered or when no remaining
    /// vertex covers anything new.
    pub fn select(&mut self, k: usize) -> (f64, Vec<Vertex>)
    {
        let n = self.slots.len();
        let mut seeds = Vec::with_capacity(k);
        if n == 0 {
            return (0.0, seeds);
        }

        let mut pick = self.first_pick;
        while seeds.len() < k && self.uncovered > 0 {
            seeds.push(pick);
            let (hits, next, best) = self.decomp_and_find(pick);
            self.uncovered -= hits;
            if best == 0 {
                break;
            }
            pick = next;
        }

        let f = (n - self.uncovered) as f64 / n as f64;
        (f, seeds)
    }

    /// The number of RR sets in the collection.
    pub fn len(&self) -> usize
    {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.slots.is_empty()
    }

    /// The number of sets retired so far.
    pub fn covered_count(&self) -> usize
    {
        self.slots.iter().filter(|slot| slot.covered).count()
    }

    /// Heap bytes currently held by the per-set buffers. Shrinks as sets
    /// retire under [`Release::Eager`].
    pub fn nbytes(&self) -> usize
    {
        let mut bytes = std::mem::size_of_val(self);
        for slot in &self.slots {
            bytes += slot.set.nbytes();
        }
        bytes
    }

    // One greedy iteration: probe every active set for `pick`, retire the
    // hits, count everything else, and report the next best vertex.
    //
    // Counting goes through one counter vector per fold accumulator,
    // summed in the reduction; the shared array is never written
    // concurrently. Integer sums make the result independent of the
    // worker count.
    fn decomp_and_find(&mut self, pick: Vertex) -> (usize, Vertex, u32)
    {
        let book = &self.book;
        let num_vertices = self.num_vertices;
        let eager = self.release == Release::Eager;

        let (hits, counts) = self
            .slots
            .par_iter_mut()
            .with_min_len(64)
            .fold(
                || (0usize, Vec::new()),
                |(mut hits, mut counts), slot| {
                    if slot.covered {
                        return (hits, counts);
                    }

                    let mut found = false;
                    let mut decoded = Vec::with_capacity(slot.set.code_count as usize);
                    if slot.set.code_count > 0 {
                        match decoder::probe(
                            book,
                            &slot.set.bytes,
                            slot.set.code_count,
                            pick,
                            &mut decoded,
                        ) {
                            Probe::Found => found = true,
                            Probe::Decoded(emitted) => {
                                if emitted < slot.set.code_count as usize {
                                    log::warn!(
                                        "malformed compressed set: {} of {} symbols decoded, \
                                         skipping it this round",
                                        emitted,
                                        slot.set.code_count
                                    );
                                    return (hits, counts);
                                }
                            }
                        }
                    }
                    if !found && slot.set.copy.contains(&pick) {
                        found = true;
                    }

                    if found {
                        hits += 1;
                        slot.covered = true;
                        if eager {
                            slot.set.bytes = Vec::new();
                            slot.set.copy = Vec::new();
                        }
                    }
                    else {
                        if counts.is_empty() {
                            counts = vec![0u32; num_vertices];
                        }
                        for &w in &decoded {
                            counts[w as usize] += 1;
                        }
                        for &w in &slot.set.copy {
                            counts[w as usize] += 1;
                        }
                    }
                    (hits, counts)
                },
            )
            .reduce(
                || (0usize, Vec::new()),
                |(left_hits, left_counts), (right_hits, right_counts)| {
                    (left_hits + right_hits, merge_counts(left_counts, right_counts))
                },
            );

        let mut next = 0;
        let mut best = 0u32;
        for (v, &c) in counts.iter().enumerate() {
            if c > best {
                best = c;
                next = v as Vertex;
            }
        }
        (hits, next, best)
    }
}

fn merge_counts(mut left: Vec<u32>, right: Vec<u32>) -> Vec<u32>
{
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }
    for (a, b) in left.iter_mut().zip(right) {
        *a += b;
    }
    left
}

/// Seed selection over a collection of RR sets.
///
/// The engine validates its configuration up front and owns the optional
/// dedicated worker pool; selection itself never fails.
///
/// # Examples
///
/// ```
/// use rrzip::{Config, Engine};
///
/// let mut sets = vec![vec![0, 1], vec![0, 2], vec![1, 2]];
/// let engine = Engine::new(3, Config { k: 1, ..Config::default() }).unwrap();
/// let (f, seeds) = engine.select(&mut sets);
/// assert_eq!(vec![2], seeds);
/// assert!((f - 2.0 / 3.0).abs() < 1e-9);
/// ```
pub struct Engine
{
    num_vertices: usize,
    config: Config,
    pool: Option<ThreadPool>,
}

impl Engine
{
    /// Build an engine for a graph with `num_vertices` vertices.
    ///
    /// Vertex ids in every RR set must lie in `[0, num_vertices)`.
    /// Rejects `k` larger than the vertex count, `inline_bits` outside
    /// `1..=128` and a zero worker count.
    pub fn new(num_vertices: usize, config: Config) -> Result<Self>
    {
        config.validate(num_vertices)?;
        let pool = match config.parallelism {
            Some(workers) => Some(ThreadPoolBuilder::new().num_threads(workers).build()?),
            None => None,
        };
        Ok(Self {
            num_vertices,
            config,
            pool,
        })
    }

    /// Select seeds through the compressed path.
    ///
    /// The raw sets are consumed: each one is released as soon as it has
    /// been encoded.
    pub fn select(&self, sets: &mut Vec<RRSet>) -> (f64, Vec<Vertex>)
    {
        if self.config.k == 0 {
            return (0.0, Vec::new());
        }
        let num_vertices = self.num_vertices;
        let config = &self.config;
        let k = self.config.k;
        self.install(|| match CompressedSets::build(sets, num_vertices, config) {
            Some(mut compressed) => compressed.select(k),
            None => (if sets.is_empty() { 0.0 } else { 1.0 }, Vec::new()),
        })
    }

    /// Select seeds through the uncompressed fallback path.
    ///
    /// Reorders `sets` in place while it partitions covered sets to the
    /// tail of the working range. A worker count of one picks the
    /// sequential implementation, anything else the parallel one.
    pub fn select_uncompressed(&self, sets: &mut [RRSet]) -> (f64, Vec<Vertex>)
    {
        if self.config.k == 0 {
            return (0.0, Vec::new());
        }
        let num_vertices = self.num_vertices;
        let k = self.config.k;
        if self.config.parallelism == Some(1) {
            return select::seq::find_most_influential(sets, num_vertices, k);
        }
        self.install(|| select::par::find_most_influential(sets, num_vertices, k))
    }

    fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
