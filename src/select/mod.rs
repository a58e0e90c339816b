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

//! Greedy max-coverage over the uncompressed RR collection.
//!
//! A per-vertex coverage counter feeds a lazy max-heap; after every pick
//! the covered sets are partitioned to the tail of the working range and
//! the counters are repaired from whichever side is cheaper. The
//! sequential and parallel implementations share one contract and are
//! chosen by configuration.

pub mod par;
pub mod seq;

use std::cmp::Ordering;

use crate::Vertex;

/// Heap entry pairing a vertex with its coverage at push time.
///
/// Larger coverage wins; equal coverage goes to the smaller vertex id,
/// matching the compressed path's argmax tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeapEntry
{
    pub(crate) vertex: Vertex,
    pub(crate) coverage: u32,
}

impl Ord for HeapEntry
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        self.coverage
            .cmp(&other.coverage)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for HeapEntry
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

/// Reorder `xs` so elements satisfying `pred` precede the rest; returns
/// the index of the first non-satisfying element.
pub(crate) fn partition_in_place<T, P>(xs: &mut [T], pred: &P) -> usize
where
    P: Fn(&T) -> bool,
{
    let mut pivot = 0;
    for i in 0..xs.len() {
        if pred(&xs[i]) {
            xs.swap(pivot, i);
            pivot += 1;
        }
    }
    pivot
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn heap_entries_order_by_coverage_then_smaller_vertex()
    {
        let low = HeapEntry { vertex: 0, coverage: 1 };
        let high = HeapEntry { vertex: 9, coverage: 5 };
        assert!(high > low);

        let a = HeapEntry { vertex: 3, coverage: 5 };
        let b = HeapEntry { vertex: 7, coverage: 5 };
        assert!(a > b);
    }

    #[test]
    fn partition_moves_matching_elements_to_the_front()
    {
        let mut xs = vec![4, 1, 8, 3, 6, 2];
        let pivot = partition_in_place(&mut xs, &|&x: &i32| x % 2 == 0);
        assert_eq!(4, pivot);
        assert!(xs[..pivot].iter().all(|&x| x % 2 == 0));
        assert!(xs[pivot..].iter().all(|&x| x % 2 != 0));
    }
}
