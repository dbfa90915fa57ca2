//! Integer partitions and compositions, as lazy cursors.
//!
//! Partitions are emitted with parts in non-increasing order. These feed the
//! structure enumerators (cycle types, attachment sizes) and De Bruijn's
//! counting formula, so they stay deterministic and allocation-light.
use itertools::Itertools;

/// Iterator over every partition of n, parts descending, starting from `[n]`
/// and ending with all ones.
///
/// # Examples
///
/// ```
/// use funcstructs::partitions::Partitions;
/// let parts: Vec<_> = Partitions::new(4).collect();
/// assert_eq!(parts, vec![
///     vec![4],
///     vec![3, 1],
///     vec![2, 2],
///     vec![2, 1, 1],
///     vec![1, 1, 1, 1],
/// ]);
/// // The empty sum is the single partition of zero.
/// assert_eq!(Partitions::new(0).count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Partitions {
    current: Option<Vec<usize>>,
}

impl Partitions {
    /// Partitions of n.
    #[must_use]
    pub fn new(n: usize) -> Self {
        let first = if n == 0 { Vec::new() } else { vec![n] };
        Self {
            current: Some(first),
        }
    }
}

impl Iterator for Partitions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        // Successor: strip the trailing ones, lower the rightmost part > 1 by
        // one, and repack the freed units greedily under the new bound.
        let ones = current.iter().rev().take_while(|&&x| x == 1).count();
        if ones < current.len() {
            let k = current.len() - ones - 1;
            let bound = current[k] - 1;
            let freed = current[k] + ones;
            let mut next = current[..k].to_vec();
            next.extend(std::iter::repeat_n(bound, freed / bound));
            if freed % bound > 0 {
                next.push(freed % bound);
            }
            self.current = Some(next);
        }
        Some(current)
    }
}

fn min_part(n: usize, w: usize) -> (Vec<usize>, usize) {
    let binsize = n / w;
    let overstuffed = n - w * binsize;
    let regular = w - overstuffed;
    let ones = if binsize == 1 { regular } else { 0 };
    let mut part = vec![binsize + 1; overstuffed];
    part.extend(std::iter::repeat_n(binsize, regular));
    (part, ones)
}

/// Iterator over the partitions of n into exactly w positive parts, parts
/// descending, in increasing lexicographic order.
///
/// # Examples
///
/// ```
/// use funcstructs::partitions::FixedLengthPartitions;
/// let parts: Vec<_> = FixedLengthPartitions::new(7, 3).collect();
/// assert_eq!(parts, vec![
///     vec![3, 2, 2],
///     vec![3, 3, 1],
///     vec![4, 2, 1],
///     vec![5, 1, 1],
/// ]);
/// assert_eq!(FixedLengthPartitions::new(2, 3).count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct FixedLengthPartitions {
    w: usize,
    partition: Vec<usize>,
    trailing_ones: usize,
    live: bool,
}

impl FixedLengthPartitions {
    /// Partitions of n into exactly w parts; empty when n < w.
    #[must_use]
    pub fn new(n: usize, w: usize) -> Self {
        // Degenerate widths collapse to at most one partition.
        let (partition, trailing_ones, live) = match w {
            0 => (Vec::new(), 0, n == 0),
            1 => (vec![n], 0, n > 0),
            _ if n < w => (Vec::new(), 0, false),
            _ => {
                let (partition, ones) = min_part(n, w);
                (partition, ones, true)
            }
        };
        Self {
            w,
            partition,
            trailing_ones,
            live,
        }
    }

    fn advance(&mut self) -> bool {
        // Successor rule: widen the block of equal parts just left of the
        // trailing ones, bump the part before it, and refill the remainder
        // with the smallest partition of matching width.
        let (w, j) = (self.w, self.trailing_ones);
        if w < 2 || j + 2 > w {
            return false;
        }
        let mut k = 2;
        let mut s = j + self.partition[w - j - 1] - 1;
        while j + k < w && self.partition[w - j - k - 1] == self.partition[w - j - 2] {
            s += self.partition[w - j - 2];
            k += 1;
        }
        if j + k > w {
            return false;
        }
        k -= 1;
        self.partition[w - j - k - 1] += 1;
        let (tail, ones) = min_part(s, j + k);
        self.partition.truncate(w - j - k);
        self.partition.extend(tail);
        self.trailing_ones = ones;
        true
    }
}

impl Iterator for FixedLengthPartitions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.live {
            return None;
        }
        let out = self.partition.clone();
        self.live = self.advance();
        Some(out)
    }
}

/// All length-k sequences of non-negative integers summing to n, i.e. the
/// weak compositions of n. Realized as bar placements: each composition is a
/// choice of k-1 separator positions among n+k-1 slots.
///
/// # Examples
///
/// ```
/// use funcstructs::partitions::weak_compositions;
/// assert_eq!(weak_compositions(2, 2).collect::<Vec<_>>(), vec![
///     vec![0, 2],
///     vec![1, 1],
///     vec![2, 0],
/// ]);
/// assert_eq!(weak_compositions(0, 0).count(), 1);
/// assert_eq!(weak_compositions(3, 0).count(), 0);
/// ```
pub fn weak_compositions(n: usize, k: usize) -> Box<dyn Iterator<Item = Vec<usize>>> {
    if k == 0 {
        return if n == 0 {
            Box::new(std::iter::once(Vec::new()))
        } else {
            Box::new(std::iter::empty())
        };
    }
    Box::new((0..n + k - 1).combinations(k - 1).map(move |bars| {
        let mut parts = Vec::with_capacity(k);
        let mut prev = 0;
        for &b in &bars {
            parts.push(b - prev);
            prev = b + 1;
        }
        parts.push(n + k - 1 - prev);
        parts
    }))
}

/// The exponent vector of a partition of n: entry i is the number of parts
/// equal to i, indices 0..=n.
#[must_use]
pub fn counts_vec(n: usize, partition: &[usize]) -> Vec<usize> {
    let mut counts = vec![0; n + 1];
    for &p in partition {
        counts[p] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Partition numbers p(0)..p(11) (OEIS A000041).
    const PARTITION_COUNTS: [usize; 12] = [1, 1, 2, 3, 5, 7, 11, 15, 22, 30, 42, 56];

    #[test]
    fn partition_counts() {
        for (n, &expected) in PARTITION_COUNTS.iter().enumerate() {
            assert_eq!(Partitions::new(n).count(), expected);
        }
    }

    #[test]
    fn partitions_are_sorted_and_sum() {
        for n in 0..12 {
            for p in Partitions::new(n) {
                assert_eq!(p.iter().sum::<usize>(), n);
                assert!(p.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn fixed_length_refines_partitions() {
        // Summing the fixed-width families recovers every partition of n.
        for n in 1..12 {
            let total: usize = (1..=n)
                .map(|w| FixedLengthPartitions::new(n, w).count())
                .sum();
            assert_eq!(total, Partitions::new(n).count());
        }
    }

    #[test]
    fn fixed_length_shapes() {
        for n in 1..12 {
            for w in 1..=n {
                for p in FixedLengthPartitions::new(n, w) {
                    assert_eq!(p.len(), w);
                    assert_eq!(p.iter().sum::<usize>(), n);
                    assert!(p.iter().all(|&x| x > 0));
                    assert!(p.windows(2).all(|pair| pair[0] >= pair[1]));
                }
            }
        }
    }

    #[test]
    fn fixed_length_edge_widths() {
        assert_eq!(FixedLengthPartitions::new(0, 0).collect::<Vec<_>>(), vec![
            Vec::<usize>::new()
        ]);
        assert_eq!(FixedLengthPartitions::new(5, 1).collect::<Vec<_>>(), vec![
            vec![5]
        ]);
        assert_eq!(FixedLengthPartitions::new(0, 1).count(), 0);
        assert_eq!(FixedLengthPartitions::new(5, 5).collect::<Vec<_>>(), vec![
            vec![1, 1, 1, 1, 1]
        ]);
    }

    #[test]
    fn weak_composition_counts() {
        // C(n+k-1, k-1) compositions of n into k parts.
        assert_eq!(weak_compositions(4, 3).count(), 15);
        assert_eq!(weak_compositions(0, 3).count(), 1);
        for comp in weak_compositions(4, 3) {
            assert_eq!(comp.len(), 3);
            assert_eq!(comp.iter().sum::<usize>(), 4);
        }
    }

    #[test]
    fn counts_vec_roundtrip() {
        for n in 0..10 {
            for p in Partitions::new(n) {
                let b = counts_vec(n, &p);
                let total: usize = b.iter().enumerate().map(|(i, &c)| i * c).sum();
                assert_eq!(total, n);
            }
        }
    }
}
