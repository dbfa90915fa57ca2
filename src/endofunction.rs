//! Labelled self-maps of a finite set, their cycle decompositions, and the
//! rooted trees hanging off their cycles.
//!
//! An endofunction on n elements is a table mapping {0..n} into itself.
//! Iterating it settles every element onto one of finitely many disjoint
//! cycles (the limit set); the elements draining into a fixed cyclic node
//! form a rooted tree. These decompositions are the bridge from labelled
//! functions to the unlabelled structures in [`crate::funcstruct`].
use crate::macros::impl_compose;
use crate::rooted_tree::LevelSequence;
use itertools::Itertools;
use ndarray::Array1;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Index, Shr};

/// A self-map of {0..n}, stored as its value table.
///
/// # Examples
///
/// ```
/// use funcstructs::endofunction::Endofunction;
/// let f = Endofunction::new(vec![1, 2, 0, 0]).unwrap();
/// assert_eq!(f[3], 0);
/// assert_eq!(f.cycles(), vec![vec![0, 1, 2]]);
/// assert!(Endofunction::new(vec![1, 4]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endofunction {
    table: Vec<usize>,
}

impl Endofunction {
    /// Validate a value table as a self-map.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if any value falls outside {0..n}.
    pub fn new(table: Vec<usize>) -> Result<Self, Error> {
        let size = table.len();
        for (input, &value) in table.iter().enumerate() {
            if value >= size {
                return Err(Error::OutOfRange { value, input, size });
            }
        }
        Ok(Self { table })
    }

    pub(crate) fn from_verified(table: Vec<usize>) -> Self {
        Self { table }
    }

    /// The identity map on n elements.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            table: (0..n).collect(),
        }
    }

    /// The endofunction of a tree: every node maps to its parent and the
    /// root to itself, making the root the unique cyclic element.
    #[must_use]
    pub fn from_tree(seq: &LevelSequence) -> Self {
        Self {
            table: seq.parents(),
        }
    }

    /// Size of the domain (and codomain).
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the domain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The value table.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.table
    }

    /// Apply this function, then the other.
    ///
    /// Also available as the `>>` operator, to suggest serial composition.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] when the two maps live on different sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcstructs::endofunction::Endofunction;
    /// let f = Endofunction::new(vec![1, 2, 0]).unwrap();
    /// let g = Endofunction::new(vec![0, 0, 1]).unwrap();
    /// assert_eq!((&f >> &g).unwrap().as_slice(), &[0, 1, 0]);
    /// ```
    pub fn compose(&self, other: &Self) -> Result<Self, Error> {
        if self.len() != other.len() {
            return Err(Error::SizeMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(self.compose_unchecked(other))
    }

    /// Composition when the sizes are known to agree.
    fn compose_unchecked(&self, other: &Self) -> Self {
        Self {
            table: self.table.iter().map(|&y| other.table[y]).collect(),
        }
    }

    /// The k-th iterate, by repeated squaring; `iterate(0)` is the identity.
    #[must_use]
    pub fn iterate(&self, mut k: usize) -> Self {
        let mut result = Self::identity(self.len());
        let mut power = self.clone();
        while k > 0 {
            if k & 1 == 1 {
                result = result.compose_unchecked(&power);
            }
            power = power.compose_unchecked(&power);
            k >>= 1;
        }
        result
    }

    /// Number of distinct values in the image.
    #[must_use]
    pub fn image_size(&self) -> usize {
        let mut seen = vec![false; self.table.len()];
        let mut count = 0;
        for &y in &self.table {
            if !seen[y] {
                seen[y] = true;
                count += 1;
            }
        }
        count
    }

    /// The preimage of every element, each in increasing order.
    #[must_use]
    pub fn preimage(&self) -> Vec<Vec<usize>> {
        let mut preim = vec![Vec::new(); self.table.len()];
        for (x, &y) in self.table.iter().enumerate() {
            preim[y].push(x);
        }
        preim
    }

    /// Image sizes of the iterates f, f², f³, … — n-1 entries (one entry for
    /// n < 2), with the tail filled in as soon as the sizes stabilize.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcstructs::endofunction::Endofunction;
    /// let f = Endofunction::new(vec![0, 0, 1, 2, 3]).unwrap();
    /// assert_eq!(f.imagepath().to_vec(), vec![4, 3, 2, 1]);
    /// ```
    #[must_use]
    pub fn imagepath(&self) -> Array1<usize> {
        let n = self.len();
        let mut cards = vec![self.image_size()];
        let mut previous = n;
        let mut f = self.clone();
        for it in 1..n.saturating_sub(1) {
            f = self.compose_unchecked(&f);
            let card = f.image_size();
            cards.push(card);
            if card == previous {
                cards.extend(std::iter::repeat_n(card, n - 2 - it));
                break;
            }
            previous = card;
        }
        Array1::from_vec(cards)
    }

    /// The cycle decomposition, in O(n): every element is walked forward at
    /// most twice. Cycles are listed by smallest unvisited starting point and
    /// each cycle follows functional order.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        const SETTLED: u8 = 2;
        let n = self.table.len();
        let mut state = vec![0u8; n];
        let mut position = vec![0; n];
        let mut cycles = Vec::new();
        for start in 0..n {
            if state[start] != 0 {
                continue;
            }
            let mut path = Vec::new();
            let mut x = start;
            while state[x] == 0 {
                state[x] = 1;
                position[x] = path.len();
                path.push(x);
                x = self.table[x];
            }
            // Walking stopped on the current path: its tail is a new cycle.
            if state[x] == 1 {
                cycles.push(path[position[x]..].to_vec());
            }
            for &y in &path {
                state[y] = SETTLED;
            }
        }
        cycles
    }

    /// The elements lying on a cycle, in increasing order — the maximal
    /// subset on which the map is invertible.
    #[must_use]
    pub fn limit_set(&self) -> Vec<usize> {
        let mut limit: Vec<usize> = self.cycles().into_iter().flatten().collect();
        limit.sort_unstable();
        limit
    }

    /// Per element, its non-cyclic preimages in increasing order: the nodes
    /// attached directly below it in its tree.
    #[must_use]
    pub fn acyclic_ancestors(&self) -> Vec<Vec<usize>> {
        let mut cyclic = vec![false; self.table.len()];
        for cycle in self.cycles() {
            for x in cycle {
                cyclic[x] = true;
            }
        }
        let mut ancestors = vec![Vec::new(); self.table.len()];
        for (x, &y) in self.table.iter().enumerate() {
            if !cyclic[x] {
                ancestors[y].push(x);
            }
        }
        ancestors
    }

    /// The level sequence of the tree of elements draining into `node`,
    /// rooted at `node` itself. Meaningful when `node` is cyclic.
    #[must_use]
    pub fn attached_tree(&self, node: usize) -> LevelSequence {
        self.attached_tree_in(node, &self.acyclic_ancestors())
    }

    /// [`attached_tree`](Self::attached_tree) against precomputed ancestors,
    /// so a caller extracting every tree pays for the preimages once.
    pub(crate) fn attached_tree_in(
        &self,
        node: usize,
        ancestors: &[Vec<usize>],
    ) -> LevelSequence {
        let mut levels = Vec::new();
        let mut stack = vec![(node, 0)];
        while let Some((x, level)) = stack.pop() {
            levels.push(level);
            for &y in &ancestors[x] {
                stack.push((y, level + 1));
            }
        }
        LevelSequence::from_verified(levels)
    }

    /// The whole function viewed as a tree: requires the limit set to be a
    /// single fixed point.
    ///
    /// # Errors
    ///
    /// [`Error::NotATree`] when the cycle decomposition is anything else.
    pub fn tree_sequence(&self) -> Result<LevelSequence, Error> {
        let cycles = self.cycles();
        let limit_size = cycles.iter().map(Vec::len).sum();
        if limit_size != 1 {
            return Err(Error::NotATree { limit_size });
        }
        Ok(self.attached_tree(cycles[0][0]))
    }
}

impl Index<usize> for Endofunction {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        self.table.index(i)
    }
}

impl Display for Endofunction {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let n = self.table.len();
        write!(f, "[{}]: {n} → {n}", self.table.iter().join(", "))
    }
}

impl Debug for Endofunction {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl_compose!(Endofunction);

/// An invertible endofunction.
///
/// # Examples
///
/// ```
/// use funcstructs::endofunction::{Endofunction, Permutation};
/// let s = Permutation::new(Endofunction::new(vec![2, 0, 1]).unwrap()).unwrap();
/// let both = (s.as_func() >> s.inverse().as_func()).unwrap();
/// assert_eq!(both, Endofunction::identity(3));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permutation {
    func: Endofunction,
}

impl Permutation {
    /// Validate an endofunction as invertible.
    ///
    /// # Errors
    ///
    /// [`Error::NotInvertible`] when the image is smaller than the domain.
    pub fn new(func: Endofunction) -> Result<Self, Error> {
        let image = func.image_size();
        if image != func.len() {
            return Err(Error::NotInvertible {
                size: func.len(),
                image,
            });
        }
        Ok(Self { func })
    }

    pub(crate) fn from_verified(table: Vec<usize>) -> Self {
        Self {
            func: Endofunction::from_verified(table),
        }
    }

    /// The identity permutation on n elements.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            func: Endofunction::identity(n),
        }
    }

    /// Size of the permuted set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.func.len()
    }

    /// Whether the permuted set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.func.is_empty()
    }

    /// The permutation as a plain endofunction.
    #[must_use]
    pub fn as_func(&self) -> &Endofunction {
        &self.func
    }

    /// Give up the invertibility knowledge.
    #[must_use]
    pub fn into_func(self) -> Endofunction {
        self.func
    }

    /// The inverse permutation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.func.len()];
        for (x, &y) in self.func.as_slice().iter().enumerate() {
            inv[y] = x;
        }
        Self {
            func: Endofunction::from_verified(inv),
        }
    }

    /// Conjugate f by this permutation s: the map x ↦ s(f(s⁻¹(x))), i.e. f
    /// with every element relabelled through s. Conjugation preserves cycle
    /// and tree structure exactly.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] when f lives on a different set.
    pub fn conjugate(&self, f: &Endofunction) -> Result<Endofunction, Error> {
        if self.len() != f.len() {
            return Err(Error::SizeMismatch {
                left: self.len(),
                right: f.len(),
            });
        }
        let s = self.func.as_slice();
        let mut g = vec![0; f.len()];
        for (x, &sx) in s.iter().enumerate() {
            g[sx] = s[f[x]];
        }
        Ok(Endofunction::from_verified(g))
    }
}

impl Display for Permutation {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(&self.func, f)
    }
}

impl Debug for Permutation {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Errors from endofunction construction or combination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The value {`value`} at input {`input`} escapes the domain.
    #[error("the value {value} at input {input} is outside the domain 0..{size}")]
    OutOfRange {
        /// The offending value.
        value: usize,
        /// The input it was assigned to.
        input: usize,
        /// The domain size.
        size: usize,
    },
    /// The two maps live on different sets.
    #[error("cannot combine a map on {left} elements with one on {right}")]
    SizeMismatch {
        /// Domain size of the first map.
        left: usize,
        /// Domain size of the second map.
        right: usize,
    },
    /// The function folds distinct elements together, so it has no inverse.
    #[error("the map is not invertible: {size} elements but only {image} image values")]
    NotInvertible {
        /// The domain size.
        size: usize,
        /// The image size.
        image: usize,
    },
    /// A cycle decomposition with {`limit_size`} cyclic elements was treated
    /// as a tree; a tree has exactly one, its root.
    #[error("the map is not a rooted tree: its limit set has {limit_size} elements")]
    NotATree {
        /// Number of cyclic elements found.
        limit_size: usize,
    },
}

#[cfg(test)]
pub(crate) mod strategies {
    use super::*;
    use proptest::prelude::*;

    /// Arbitrary endofunctions on exactly n elements.
    pub fn endofunctions_of(n: usize) -> impl Strategy<Value = Endofunction> {
        proptest::collection::vec(0..n, n).prop_map(Endofunction::from_verified)
    }

    /// Arbitrary endofunctions on 1..=max elements.
    pub fn endofunctions(max: usize) -> impl Strategy<Value = Endofunction> {
        (1..=max).prop_flat_map(endofunctions_of)
    }

    /// Uniformly shuffled permutations on exactly n elements.
    pub fn permutations_of(n: usize) -> impl Strategy<Value = Permutation> {
        Just((0..n).collect::<Vec<_>>())
            .prop_shuffle()
            .prop_map(Permutation::from_verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn construction_validates_range() {
        assert!(Endofunction::new(vec![]).is_ok());
        assert!(Endofunction::new(vec![0, 1, 2]).is_ok());
        assert_eq!(
            Endofunction::new(vec![0, 3, 1]),
            Err(Error::OutOfRange {
                value: 3,
                input: 1,
                size: 3
            })
        );
    }

    #[test]
    fn composition_and_operator() {
        let f = Endofunction::new(vec![1, 2, 0]).unwrap();
        let id = Endofunction::identity(3);
        assert_eq!((&f >> &id).unwrap(), f);
        assert_eq!((&id >> &f).unwrap(), f);
        let small = Endofunction::identity(2);
        assert_eq!(
            f.compose(&small),
            Err(Error::SizeMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn iterates() {
        let f = Endofunction::new(vec![1, 2, 3, 0]).unwrap();
        assert_eq!(f.iterate(0), Endofunction::identity(4));
        assert_eq!(f.iterate(1), f);
        assert_eq!(f.iterate(2).as_slice(), &[2, 3, 0, 1]);
        assert_eq!(f.iterate(4), Endofunction::identity(4));
    }

    #[test]
    fn cycle_decomposition() {
        let f = Endofunction::new(vec![1, 2, 0, 0, 3]).unwrap();
        assert_eq!(f.cycles(), vec![vec![0, 1, 2]]);
        assert_eq!(f.limit_set(), vec![0, 1, 2]);
        let swap = Endofunction::new(vec![1, 0, 3, 2]).unwrap();
        assert_eq!(swap.cycles(), vec![vec![0, 1], vec![2, 3]]);
        assert!(Endofunction::new(vec![]).unwrap().cycles().is_empty());
    }

    #[test]
    fn ancestors_exclude_cyclic_elements() {
        let f = Endofunction::new(vec![0, 0, 1, 1, 6, 6, 4]).unwrap();
        assert_eq!(f.limit_set(), vec![0, 4, 6]);
        let anc = f.acyclic_ancestors();
        assert_eq!(anc[0], vec![1]);
        assert_eq!(anc[1], vec![2, 3]);
        assert_eq!(anc[6], vec![5]);
        assert!(anc[4].is_empty());
    }

    #[test]
    fn attached_trees() {
        let f = Endofunction::new(vec![0, 0, 1, 1, 6, 6, 4]).unwrap();
        assert_eq!(f.attached_tree(0).as_slice(), &[0, 1, 2, 2]);
        assert_eq!(f.attached_tree(6).as_slice(), &[0, 1]);
        assert_eq!(f.attached_tree(4).as_slice(), &[0]);
    }

    #[test]
    fn tree_conversion() {
        let seq = LevelSequence::new(vec![0, 1, 2, 2, 1]).unwrap();
        let f = Endofunction::from_tree(&seq);
        assert_eq!(f.as_slice(), &[0, 0, 1, 1, 0]);
        // The traversal order may differ, but the unlabelled tree survives.
        use crate::rooted_tree::DominantSequence;
        let back = f.tree_sequence().unwrap();
        assert_eq!(DominantSequence::new(&back), DominantSequence::new(&seq));

        let two_cycles = Endofunction::new(vec![1, 0]).unwrap();
        assert_eq!(
            two_cycles.tree_sequence(),
            Err(Error::NotATree { limit_size: 2 })
        );
    }

    #[test]
    fn imagepath_fixtures() {
        let constant = Endofunction::new(vec![0; 5]).unwrap();
        assert_eq!(constant.imagepath().to_vec(), vec![1, 1, 1, 1]);
        let rotation = Endofunction::new(vec![1, 2, 3, 4, 0]).unwrap();
        assert_eq!(rotation.imagepath().to_vec(), vec![5, 5, 5, 5]);
        let chain = Endofunction::new(vec![0, 0, 1, 2, 3]).unwrap();
        assert_eq!(chain.imagepath().to_vec(), vec![4, 3, 2, 1]);
        let lone = Endofunction::new(vec![0]).unwrap();
        assert_eq!(lone.imagepath().to_vec(), vec![1]);
    }

    #[test]
    fn permutation_validation_and_inverse() {
        let s = Permutation::new(Endofunction::new(vec![2, 0, 1]).unwrap()).unwrap();
        assert_eq!(s.inverse().as_func().as_slice(), &[1, 2, 0]);
        assert_eq!(
            Permutation::new(Endofunction::new(vec![0, 0]).unwrap()),
            Err(Error::NotInvertible { size: 2, image: 1 })
        );
    }

    #[test]
    fn conjugation_relabels() {
        // Swap labels 0 and 2 in a map fixing 2 with a tail 0 → 1 → 2.
        let f = Endofunction::new(vec![1, 2, 2]).unwrap();
        let s = Permutation::new(Endofunction::new(vec![2, 1, 0]).unwrap()).unwrap();
        let g = s.conjugate(&f).unwrap();
        assert_eq!(g.as_slice(), &[0, 0, 1]);
        assert_eq!(g.limit_set(), vec![0]);
    }

    proptest! {
        #[test]
        fn iterate_adds(f in strategies::endofunctions(24), a in 0usize..8, b in 0usize..8) {
            let lhs = f.iterate(a + b);
            let rhs = f.iterate(a).compose(&f.iterate(b)).unwrap();
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn imagepath_is_nonincreasing(f in strategies::endofunctions(24)) {
            let path = f.imagepath().to_vec();
            prop_assert_eq!(path.len(), f.len().max(2) - 1);
            prop_assert!(path.windows(2).all(|w| w[0] >= w[1]));
            prop_assert_eq!(path[0], f.image_size());
        }

        #[test]
        fn cycles_partition_the_limit_set(f in strategies::endofunctions(24)) {
            let cycles = f.cycles();
            for cycle in &cycles {
                // Functional order: each element maps to the next around.
                for (i, &x) in cycle.iter().enumerate() {
                    prop_assert_eq!(f[x], cycle[(i + 1) % cycle.len()]);
                }
            }
            let total: usize = cycles.iter().map(Vec::len).sum();
            prop_assert_eq!(total, f.limit_set().len());
        }

    }

    proptest! {
        #[test]
        fn permutation_inverse_roundtrip(
            s in (1usize..16).prop_flat_map(strategies::permutations_of)
        ) {
            let n = s.len();
            let id = Endofunction::identity(n);
            prop_assert_eq!((s.as_func() >> s.inverse().as_func()).unwrap(), id.clone());
            prop_assert_eq!((s.inverse().as_func() >> s.as_func()).unwrap(), id);
        }
    }
}
