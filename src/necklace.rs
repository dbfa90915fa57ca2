//! Necklaces: equivalence classes of finite sequences under cyclic rotation,
//! with direct enumeration of the necklaces carrying a prescribed bead
//! multiset and exact counting by period.
use crate::combinat::multinomial;
use crate::factorization::DivisorCache;
use crate::multiset::{split_top_level, Multiset};
use itertools::Itertools;
use num::{BigUint, Zero};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The number of distinct cyclic rotations of a word, i.e. the length of its
/// fundamental period.
///
/// Grows a candidate seed and tests whether the word is exactly the seed
/// repeated; a mismatch extends the seed past the mismatch point. Runs in
/// O(len) overall.
///
/// # Examples
///
/// ```
/// use funcstructs::necklace::periodicity;
/// assert_eq!(periodicity(&[1, 2, 1, 2, 1, 2]), 2);
/// assert_eq!(periodicity(&[1, 2, 3]), 3);
/// assert_eq!(periodicity(&['a']), 1);
/// ```
#[must_use]
pub fn periodicity<T: Eq>(word: &[T]) -> usize {
    let n = word.len();
    if n <= 1 {
        return n;
    }
    let mut seed_len = 0;
    let mut l = 1;
    let mut p = 1;
    while p != n {
        while n % l != 0 {
            l += 1;
        }
        p = l;
        seed_len = p;
        let mut stop = false;
        let mut rep = p;
        while rep < n && !stop {
            for i in 0..seed_len {
                l += 1;
                if word[i] != word[rep + i] {
                    stop = true;
                    break;
                }
            }
            rep += p;
        }
        if !stop {
            break;
        }
    }
    seed_len
}

/// Booth's least-rotation algorithm: the index at which the lexicographically
/// smallest rotation of the word begins.
fn least_rotation<T: Ord>(word: &[T]) -> usize {
    let n = word.len();
    if n == 0 {
        return 0;
    }
    let at = |i: usize| &word[i % n];
    let mut fail: Vec<isize> = vec![-1; 2 * n];
    let mut k = 0;
    for j in 1..2 * n {
        let mut i = fail[j - k - 1];
        while i != -1 && at(j) != at(k + i as usize + 1) {
            if at(j) < at(k + i as usize + 1) {
                k = j - i as usize - 1;
            }
            i = fail[i as usize];
        }
        if i == -1 && at(j) != at(k) {
            if at(j) < at(k) {
                k = j;
            }
            fail[j - k] = -1;
        } else {
            fail[j - k] = i + 1;
        }
    }
    k
}

/// The canonical representative of a cyclic-rotation equivalence class: the
/// lexicographically smallest rotation of the word, with its period computed
/// at construction.
///
/// # Examples
///
/// ```
/// use funcstructs::necklace::Necklace;
/// let n = Necklace::new([2, 0, 1]);
/// assert_eq!(n, Necklace::new([1, 2, 0]));
/// assert_eq!(n.as_slice(), &[0, 1, 2]);
/// assert_eq!(n.period(), 3);
///
/// let striped = Necklace::new(["b", "a", "b", "a"]);
/// assert_eq!(striped.period(), 2);
/// assert_eq!(striped.degeneracy(), 2);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Necklace<T> {
    word: Vec<T>,
    period: usize,
}

impl<T: Ord> Necklace<T> {
    /// Canonicalize any finite word.
    #[must_use]
    pub fn new(word: impl IntoIterator<Item = T>) -> Self {
        let mut word: Vec<T> = word.into_iter().collect();
        let start = least_rotation(&word);
        word.rotate_left(start);
        Self::from_canonical(word)
    }

    /// Wrap a word already in least-rotation form; only the period is
    /// computed. Fixed-content generation emits such words directly.
    pub(crate) fn from_canonical(word: Vec<T>) -> Self {
        let period = periodicity(&word);
        Self { word, period }
    }
}

impl<T> Necklace<T> {
    /// Number of beads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.word.len()
    }

    /// Whether the necklace has no beads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// The canonical word.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.word
    }

    /// The beads of the canonical word, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.word.iter()
    }

    /// The number of distinct rotations of the word.
    #[must_use]
    pub const fn period(&self) -> usize {
        self.period
    }

    /// The cyclic symmetry count: length divided by period, the number of
    /// rotations fixing the word. The empty necklace has degeneracy 1.
    #[must_use]
    pub fn degeneracy(&self) -> usize {
        if self.word.is_empty() {
            1
        } else {
            self.word.len() / self.period
        }
    }
}

impl<'a, T> IntoIterator for &'a Necklace<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Display> Display for Necklace<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Necklace([{}])", self.word.iter().join(", "))
    }
}

impl<T: Display> Debug for Necklace<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<T: Ord + FromStr> FromStr for Necklace<T> {
    type Err = Error;

    /// Parse the `Necklace([...])` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let inner = s
            .trim()
            .strip_prefix("Necklace(")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|rest| rest.trim().strip_prefix('['))
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| Error::Parse {
                text: s.to_string(),
            })?;
        let mut beads = Vec::new();
        for piece in split_top_level(inner) {
            beads.push(piece.parse().map_err(|_| Error::Parse {
                text: piece.to_string(),
            })?);
        }
        Ok(Self::new(beads))
    }
}

/// Enumerator and counter of the necklaces with a prescribed bead multiset.
///
/// Generation follows Sawada's fixed-content algorithm: a partial word is
/// extended one position at a time, each position trying only the bead values
/// at least as large as the value one period earlier, and a completed word is
/// emitted whenever its length is a multiple of the tracked period. Every
/// emitted word is already in canonical form, so no duplicate filtering ever
/// happens, and the work per necklace is amortized constant.
///
/// # Examples
///
/// ```
/// use funcstructs::multiset::Multiset;
/// use funcstructs::necklace::FixedContentNecklaces;
/// use num::BigUint;
/// let beads = Multiset::new([0, 0, 0, 1, 1, 1, 2, 2]);
/// let necklaces = FixedContentNecklaces::new(beads).unwrap();
/// assert_eq!(necklaces.iter().count(), 70);
/// assert_eq!(necklaces.cardinality(), BigUint::from(70u32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedContentNecklaces<T> {
    content: Vec<T>,
    multiplicities: Vec<usize>,
}

impl<T: Ord + Clone> FixedContentNecklaces<T> {
    /// Necklaces whose beads form exactly the given multiset.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContent`] when the multiset is empty.
    pub fn new(beads: Multiset<T>) -> Result<Self, Error> {
        if beads.is_empty() {
            return Err(Error::EmptyContent);
        }
        Ok(Self::new_unchecked(beads))
    }

    pub(crate) fn new_unchecked(beads: Multiset<T>) -> Self {
        let (content, multiplicities) = beads.split();
        Self {
            content: content.into_iter().cloned().collect(),
            multiplicities,
        }
    }

    /// Total number of beads.
    #[must_use]
    pub fn bead_count(&self) -> usize {
        self.multiplicities.iter().sum()
    }

    /// A fresh enumeration cursor.
    #[must_use]
    pub fn iter(&self) -> NecklaceIter<T> {
        NecklaceIter::new(self.content.clone(), self.multiplicities.clone())
    }

    /// The exact number of necklaces with fundamental period p, for every
    /// achievable p, without enumeration.
    ///
    /// Achievable periods are n/w · k for the divisors k of w, where w is the
    /// gcd of the multiplicities. For each, the permutations repeating with
    /// that period are counted by a multinomial coefficient, permutations of
    /// strictly smaller period are subtracted out (inclusion–exclusion over
    /// sub-divisors), and the remainder is divided by the period to count
    /// rotation classes once each.
    #[must_use]
    pub fn count_by_period(&self) -> BTreeMap<usize, BigUint> {
        self.count_by_period_with(&mut DivisorCache::new())
    }

    /// [`count_by_period`](Self::count_by_period) against a caller-owned
    /// divisor cache.
    pub fn count_by_period_with(&self, cache: &mut DivisorCache) -> BTreeMap<usize, BigUint> {
        let n = self.bead_count();
        let w = self
            .multiplicities
            .iter()
            .fold(0, |acc, &m| num::integer::gcd(acc, m));
        let base_period = n / w;
        let mut by_factor: BTreeMap<usize, BigUint> = BTreeMap::new();
        for factor in cache.divisors(w).to_vec() {
            let mut count = multinomial(
                self.multiplicities.iter().map(|&m| m * factor / w),
            );
            for sub in cache.divisors(factor).to_vec() {
                if sub != factor {
                    count -= BigUint::from(sub * base_period) * &by_factor[&sub];
                }
            }
            count /= BigUint::from(base_period * factor);
            by_factor.insert(factor, count);
        }
        by_factor
            .into_iter()
            .map(|(factor, count)| (base_period * factor, count))
            .collect()
    }

    /// The total number of necklaces, without enumeration: the sum of
    /// [`count_by_period`](Self::count_by_period). Tractable far past any
    /// enumerable size.
    #[must_use]
    pub fn cardinality(&self) -> BigUint {
        self.cardinality_with(&mut DivisorCache::new())
    }

    /// [`cardinality`](Self::cardinality) against a caller-owned divisor cache.
    pub fn cardinality_with(&self, cache: &mut DivisorCache) -> BigUint {
        self.count_by_period_with(cache)
            .values()
            .fold(BigUint::zero(), |acc, c| acc + c)
    }
}

impl<T: Ord + Clone> IntoIterator for &FixedContentNecklaces<T> {
    type Item = Necklace<T>;
    type IntoIter = NecklaceIter<T>;

    fn into_iter(self) -> NecklaceIter<T> {
        self.iter()
    }
}

/// One backtracking frame: the word position being filled, the period of the
/// prefix before it, and the next bead index to try there.
#[derive(Debug, Clone)]
struct Frame {
    pos: usize,
    period: usize,
    next: usize,
    placed: bool,
}

/// Lazy cursor over the necklaces of a [`FixedContentNecklaces`].
///
/// The recursive fixed-content generator, unrolled onto an explicit frame
/// stack so enumeration is pull-based.
#[derive(Debug, Clone)]
pub struct NecklaceIter<T> {
    content: Vec<T>,
    remaining: Vec<usize>,
    word: Vec<usize>,
    stack: Vec<Frame>,
    singleton: bool,
}

impl<T: Ord + Clone> NecklaceIter<T> {
    fn new(content: Vec<T>, multiplicities: Vec<usize>) -> Self {
        let n: usize = multiplicities.iter().sum();
        let mut remaining = multiplicities;
        // The first position always holds the smallest bead.
        remaining[0] -= 1;
        let stack = if n > 1 {
            vec![Frame {
                pos: 1,
                period: 1,
                next: 0,
                placed: false,
            }]
        } else {
            Vec::new()
        };
        Self {
            content,
            remaining,
            word: vec![0; n],
            stack,
            singleton: n == 1,
        }
    }

    fn emit(&self) -> Necklace<T> {
        Necklace::from_canonical(
            self.word.iter().map(|&i| self.content[i].clone()).collect(),
        )
    }
}

impl<T: Ord + Clone> Iterator for NecklaceIter<T> {
    type Item = Necklace<T>;

    fn next(&mut self) -> Option<Necklace<T>> {
        if self.singleton {
            self.singleton = false;
            return Some(self.emit());
        }
        let n = self.word.len();
        let k = self.content.len();
        while let Some(top) = self.stack.last_mut() {
            let (pos, period) = (top.pos, top.period);
            if top.placed {
                self.remaining[self.word[pos]] += 1;
                top.placed = false;
            }
            // The bead one period back bounds the candidates from below.
            let mut advanced = false;
            while top.next < k {
                let bead = top.next;
                top.next += 1;
                if self.remaining[bead] == 0 {
                    continue;
                }
                self.word[pos] = bead;
                self.remaining[bead] -= 1;
                top.placed = true;
                let next_period = if bead == self.word[pos - period] {
                    period
                } else {
                    pos + 1
                };
                if pos + 1 == n {
                    if n % next_period == 0 {
                        return Some(self.emit());
                    }
                    // Dead end: restore and keep trying beads here.
                    self.remaining[bead] += 1;
                    top.placed = false;
                } else {
                    let start = self.word[pos + 1 - next_period];
                    self.stack.push(Frame {
                        pos: pos + 1,
                        period: next_period,
                        next: start,
                        placed: false,
                    });
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                self.stack.pop();
            }
        }
        None
    }
}

/// Errors from necklace enumeration or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Fixed-content enumeration needs at least one bead.
    #[error("empty content: necklaces need at least one bead")]
    EmptyContent,
    /// The text {`text`} is not a rendered necklace.
    #[error("cannot parse {text:?} as a necklace")]
    Parse {
        /// The text that failed to parse.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;
    use proptest::prelude::*;

    #[test]
    fn periodicity_fixtures() {
        assert_eq!(periodicity::<u8>(&[]), 0);
        assert_eq!(periodicity(&[7]), 1);
        assert_eq!(periodicity(&[1, 1, 1, 1]), 1);
        assert_eq!(periodicity(&[0, 1, 0, 1, 0, 1]), 2);
        assert_eq!(periodicity(&[0, 1, 1, 0, 1, 1]), 3);
        assert_eq!(periodicity(&[0, 1, 1, 0, 1, 0]), 6);
    }

    #[test]
    fn canonical_form_is_smallest_rotation() {
        let neck = Necklace::new([2, 1, 3, 1]);
        assert_eq!(neck.as_slice(), &[1, 2, 1, 3]);
        assert_eq!(Necklace::new([3, 1, 2, 1]).as_slice(), &[1, 2, 1, 3]);
    }

    #[test]
    fn empty_necklace() {
        let neck = Necklace::<u8>::new([]);
        assert_eq!(neck.len(), 0);
        assert_eq!(neck.period(), 0);
        assert_eq!(neck.degeneracy(), 1);
    }

    #[test]
    fn fixed_content_rejects_empty() {
        assert_eq!(
            FixedContentNecklaces::new(Multiset::<u8>::new([])).unwrap_err(),
            Error::EmptyContent
        );
    }

    #[test]
    fn enumeration_332_content() {
        let beads = Multiset::new([0, 0, 0, 1, 1, 1, 2, 2]);
        let necklaces = FixedContentNecklaces::new(beads.clone()).unwrap();
        let all: Vec<_> = necklaces.iter().collect();
        assert_eq!(all.len(), 70);
        // Canonical, distinct, and carrying exactly the requested content.
        for neck in &all {
            assert_eq!(Multiset::new(neck.iter().copied()), beads);
            assert_eq!(Necklace::new(neck.iter().copied()), *neck);
        }
        let distinct = Multiset::new(all);
        assert_eq!(distinct.distinct_len(), 70);
    }

    #[test]
    fn enumeration_agrees_with_counting() {
        let contents: [&[usize]; 5] = [
            &[0, 0, 1, 1],
            &[0, 0, 0, 0, 1, 1],
            &[0, 1, 2],
            &[0, 0, 1, 1, 2, 2],
            &[0; 7],
        ];
        for content in contents {
            let beads = Multiset::new(content.iter().copied());
            let necklaces = FixedContentNecklaces::new(beads).unwrap();
            let enumerated = necklaces.iter().count();
            assert_eq!(BigUint::from(enumerated), necklaces.cardinality());
        }
    }

    #[test]
    fn count_by_period_partitions_the_count() {
        // Two colors, two beads each: one necklace of period 2 (abab) and
        // one of period 4 (aabb).
        let necklaces = FixedContentNecklaces::new(Multiset::new([0, 0, 1, 1])).unwrap();
        let by_period = necklaces.count_by_period();
        assert_eq!(by_period[&2], BigUint::from(1u32));
        assert_eq!(by_period[&4], BigUint::from(1u32));
        for neck in necklaces.iter() {
            assert!(by_period.contains_key(&neck.period()));
        }
    }

    #[test]
    fn counts_beyond_enumeration() {
        use crate::combinat::factorial;
        // Eighteen distinct beads: (18-1)! necklaces, far past 10^14.
        let beads = Multiset::new(0..18usize);
        let necklaces = FixedContentNecklaces::new(beads).unwrap();
        assert_eq!(necklaces.cardinality(), factorial(17));
    }

    #[test]
    fn display_roundtrip() {
        let neck = Necklace::new([3usize, 1, 2]);
        assert_eq!(neck.to_string(), "Necklace([1, 2, 3])");
        assert_eq!(neck.to_string().parse::<Necklace<usize>>().unwrap(), neck);
        assert!("Necklace([x])".parse::<Necklace<usize>>().is_err());
    }

    macro_rules! properties {
        ($name:ident, $T:ty, $bead:expr) => {
            paste! {
                mod [<$name _properties>] {
                    use super::*;

                    fn words() -> impl Strategy<Value = Vec<$T>> {
                        proptest::collection::vec($bead, 1..14)
                    }

                    proptest! {
                        #[test]
                        fn rotation_invariant(word in words(), k in 0usize..16) {
                            let mut rotated = word.clone();
                            let len = rotated.len();
                            rotated.rotate_left(k % len);
                            prop_assert_eq!(
                                Necklace::new(word),
                                Necklace::new(rotated)
                            );
                        }

                        #[test]
                        fn canonical_is_minimal(word in words()) {
                            let neck = Necklace::new(word.clone());
                            let len = word.len();
                            for k in 0..len {
                                let mut rotated = word.clone();
                                rotated.rotate_left(k);
                                prop_assert!(neck.as_slice() <= rotated.as_slice());
                            }
                        }

                        #[test]
                        fn period_divides_length(word in words()) {
                            let neck = Necklace::new(word);
                            let (len, period) = (neck.len(), neck.period());
                            prop_assert_eq!(len % period, 0);
                            // Rotating by the period is the identity, and no
                            // smaller positive rotation is.
                            for k in 1..=period {
                                let mut rotated = neck.as_slice().to_vec();
                                rotated.rotate_left(k);
                                prop_assert_eq!(
                                    rotated.as_slice() == neck.as_slice(),
                                    k == period
                                );
                            }
                        }
                    }
                }
            }
        };
    }

    properties!(int, usize, 0usize..4);
    properties!(char, char, proptest::char::range('a', 'd'));
}
