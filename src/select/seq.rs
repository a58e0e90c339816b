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

use std::collections::BinaryHeap;

use super::{partition_in_place, HeapEntry};
use crate::{RRSet, Vertex};

/// Greedily pick up to `k` seeds, single threaded.
///
/// Reorders `sets` while partitioning covered sets out of the working
/// range. Returns the covered fraction and the picks in order.
pub fn find_most_influential(sets: &mut [RRSet], num_vertices: usize, k: usize) -> (f64, Vec<Vertex>)
{
    let n = sets.len();

    let mut coverage = vec![0u32; num_vertices];
    for set in sets.iter() {
        for &v in set {
            coverage[v as usize] += 1;
        }
    }

    let mut heap = BinaryHeap::with_capacity(num_vertices);
    for (v, &c) in coverage.iter().enumerate() {
        heap.push(HeapEntry {
            vertex: v as Vertex,
            coverage: c,
        });
    }

    let mut seeds = Vec::with_capacity(k);
    let mut uncovered = n;
    let mut end = n;

    while seeds.len() < k && uncovered > 0 {
        let entry = match heap.pop() {
            Some(entry) => entry,
            None => break,
        };

        // A cached coverage above the live one is stale: refresh and
        // reinsert instead of selecting.
        if entry.coverage > coverage[entry.vertex as usize] {
            heap.push(HeapEntry {
                vertex: entry.vertex,
                coverage: coverage[entry.vertex as usize],
            });
            continue;
        }

        if entry.coverage == 0 {
            break;
        }

        let v = entry.vertex;
        uncovered -= entry.coverage as usize;

        let pivot = partition_in_place(&mut sets[..end], &|set: &RRSet| {
            set.binary_search(&v).is_err()
        });

        if end - pivot < pivot {
            for set in &sets[pivot..end] {
                for &w in set {
                    coverage[w as usize] -= 1;
                }
            }
        }
        else {
            for c in coverage.iter_mut() {
                *c = 0;
            }
            for set in &sets[..pivot] {
                for &w in set {
                    coverage[w as usize] += 1;
                }
            }
        }

        end = pivot;
        seeds.push(v);
    }

    let f = if n == 0 {
        0.0
    }
    else {
        (n - uncovered) as f64 / n as f64
    };
    (f, seeds)
}
