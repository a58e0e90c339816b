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

use rayon::prelude::*;

use super::{partition_in_place, HeapEntry};
use crate::{RRSet, Vertex};

// Counting splits the VERTEX range, not the set range: each worker owns a
// contiguous slice of the counter vector and locates its slice of every
// sorted set by binary search, so no counter is ever shared.
pub(crate) fn count_occurrences(sets: &[RRSet], coverage: &mut [u32])
{
    let workers = rayon::current_num_threads();
    let chunk = ((coverage.len() + workers - 1) / workers).max(1);
    coverage
        .par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(t, counts)| {
            let low = (t * chunk) as Vertex;
            let high = t * chunk + counts.len();
            for set in sets {
                let begin = set.partition_point(|&v| v < low);
                let end = set.partition_point(|&v| (v as usize) < high);
                for &v in &set[begin..end] {
                    counts[(v - low) as usize] += 1;
                }
            }
        });
}

pub(crate) fn update_counters(covered: &[RRSet], coverage: &mut [u32])
{
    let workers = rayon::current_num_threads();
    let chunk = ((coverage.len() + workers - 1) / workers).max(1);
    coverage
        .par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(t, counts)| {
            let low = (t * chunk) as Vertex;
            let high = t * chunk + counts.len();
            for set in covered {
                let begin = set.partition_point(|&v| v < low);
                let end = set.partition_point(|&v| (v as usize) < high);
                for &v in &set[begin..end] {
                    counts[(v - low) as usize] -= 1;
                }
            }
        });
}

fn swap_ranges<T: Send>(xs: &mut [T], left: usize, right: usize, len: usize)
{
    debug_assert!(left + len <= right);
    let (a, b) = xs.split_at_mut(right);
    a[left..left + len]
        .par_iter_mut()
        .zip(b[..len].par_iter_mut())
        .for_each(|(x, y)| std::mem::swap(x, y));
}

// Join two partitioned spans (begin, pivot, end) into one, moving the
// cheaper side. Every element satisfying the predicate still precedes
// every element that does not.
fn join<T: Send>(xs: &mut [T], a: (usize, usize, usize), b: (usize, usize, usize))
    -> (usize, usize, usize)
{
    if a.1 == a.0 && b.1 == b.0 {
        return (a.0, a.1, b.2);
    }
    if a.1 == a.2 {
        return (a.0, b.1, b.2);
    }

    let false_tail = a.2 - a.1;
    let true_head = b.1 - b.0;
    if false_tail < true_head {
        swap_ranges(xs, a.1, b.1 - false_tail, false_tail);
        (a.0, b.1 - false_tail, b.2)
    }
    else {
        swap_ranges(xs, a.1, b.0, true_head);
        (a.0, a.1 + true_head, b.2)
    }
}

/// Two-phase parallel partition: every worker partitions its contiguous
/// chunk in place, then the per-chunk pivots are merged pairwise.
pub(crate) fn partition<T, P>(xs: &mut [T], pred: P) -> usize
where
    T: Send,
    P: Fn(&T) -> bool + Sync,
{
    let n = xs.len();
    if n == 0 {
        return 0;
    }

    let workers = rayon::current_num_threads();
    let chunk = ((n + workers - 1) / workers).max(1);
    let mut parts: Vec<(usize, usize, usize)> = xs
        .par_chunks_mut(chunk)
        .enumerate()
        .map(|(t, piece)| {
            let begin = t * chunk;
            let pivot = begin + partition_in_place(piece, &pred);
            (begin, pivot, begin + piece.len())
        })
        .collect();

    let mut stride = 1;
    while stride < parts.len() {
        let mut i = 0;
        while i + stride < parts.len() {
            parts[i] = join(xs, parts[i], parts[i + stride]);
            i += 2 * stride;
        }
        stride *= 2;
    }

    parts[0].1
}

/// Greedily pick up to `k` seeds on the current worker pool.
///
/// The contract matches [`seq::find_most_influential`]; only the
/// scheduling differs.
///
/// [`seq::find_most_influential`]: crate::select::seq::find_most_influential
pub fn find_most_influential(sets: &mut [RRSet], num_vertices: usize, k: usize) -> (f64, Vec<Vertex>)
{
    let n = sets.len();

    let mut coverage = vec![0u32; num_vertices];
    count_occurrences(sets, &mut coverage);

    let storage: Vec<HeapEntry> = coverage
        .par_iter()
        .enumerate()
        .map(|(v, &c)| HeapEntry {
            vertex: v as Vertex,
            coverage: c,
        })
        .collect();
    let mut heap = BinaryHeap::from(storage);

    let mut seeds = Vec::with_capacity(k);
    let mut uncovered = n;
    let mut end = n;

    while seeds.len() < k && uncovered > 0 {
        let entry = match heap.pop() {
            Some(entry) => entry,
            None => break,
        };

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

        let pivot = partition(&mut sets[..end], |set: &RRSet| {
            set.binary_search(&v).is_err()
        });

        if end - pivot < pivot {
            update_counters(&sets[pivot..end], &mut coverage);
        }
        else {
            coverage.par_iter_mut().for_each(|c| *c = 0);
            count_occurrences(&sets[..pivot], &mut coverage);
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

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::select::seq;

    #[test]
    fn partition_splits_on_the_predicate()
    {
        let mut xs: Vec<u32> = (0..1000).rev().collect();
        let pivot = partition(&mut xs, |&x| x % 3 == 0);
        assert_eq!(334, pivot);
        assert!(xs[..pivot].iter().all(|&x| x % 3 == 0));
        assert!(xs[pivot..].iter().all(|&x| x % 3 != 0));
    }

    #[test]
    fn partition_handles_all_true_and_all_false()
    {
        let mut xs: Vec<u32> = (0..100).collect();
        assert_eq!(100, partition(&mut xs, |_| true));
        assert_eq!(0, partition(&mut xs, |_| false));
    }

    #[test]
    fn counting_matches_a_direct_tally()
    {
        let sets: Vec<Vec<u32>> = vec![vec![0, 3, 9], vec![3, 4], vec![1, 3, 8, 9], vec![9]];
        let mut expected = vec![0u32; 10];
        for set in &sets {
            for &v in set {
                expected[v as usize] += 1;
            }
        }
        let mut coverage = vec![0u32; 10];
        count_occurrences(&sets, &mut coverage);
        assert_eq!(expected, coverage);

        update_counters(&sets[1..2], &mut coverage);
        expected[3] -= 1;
        expected[4] -= 1;
        assert_eq!(expected, coverage);
    }

    #[test]
    fn agrees_with_the_sequential_implementation()
    {
        let make = || {
            vec![
                vec![0, 1, 5],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2, 4],
                vec![2, 5],
                vec![4],
                vec![3, 5],
                vec![0],
            ]
        };
        let mut a = make();
        let mut b = make();
        let (f_seq, s_seq) = seq::find_most_influential(&mut a, 6, 4);
        let (f_par, s_par) = find_most_influential(&mut b, 6, 4);
        assert_eq!(s_seq, s_par);
        assert!((f_seq - f_par).abs() < 1e-9);
    }
}
