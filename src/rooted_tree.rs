//! Unlabelled rooted trees: level sequences, canonical (dominant) forms, the
//! recursive unordered representation, and enumerators over trees and forests.
//!
//! A level sequence lists each node's height above the root in depth-first
//! order. Among all depth-first orderings of the same unordered tree, the
//! lexicographically largest is the *dominant* sequence — the canonical
//! representative this crate hands out and compares.
use crate::combinat::multichoose;
use crate::factorization::DivisorCache;
use crate::multiset::{split_count, split_top_level, unordered_product, Multiset};
use itertools::Itertools;
use num::traits::Pow;
use num::{BigUint, One, Zero};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// An ordered rooted tree as the sequence of node heights in depth-first
/// traversal order.
///
/// The shape invariant is checked once at construction: the sequence is
/// non-empty, starts at height 0, and never climbs by more than one level at
/// a time. Everything downstream assumes it.
///
/// # Examples
///
/// ```
/// use funcstructs::rooted_tree::LevelSequence;
/// let t = LevelSequence::new(vec![0, 1, 2, 2, 1]).unwrap();
/// assert_eq!(t.node_count(), 5);
/// assert_eq!(t.to_string(), "[0, 1, 2, 2, 1]");
/// assert!(LevelSequence::new(vec![0, 2]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelSequence {
    levels: Vec<usize>,
}

impl LevelSequence {
    /// Validate a sequence of heights as a depth-first tree traversal.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] on empty input, [`Error::NonZeroRoot`] when the
    /// first height is not 0, and [`Error::HeightJump`] when a height exceeds
    /// its predecessor by more than one or returns to 0.
    pub fn new(levels: Vec<usize>) -> Result<Self, Error> {
        let Some((&root, rest)) = levels.split_first() else {
            return Err(Error::EmptyTree);
        };
        if root != 0 {
            return Err(Error::NonZeroRoot { root });
        }
        let mut previous = 0;
        for (i, &height) in rest.iter().enumerate() {
            if height == 0 || height > previous + 1 {
                return Err(Error::HeightJump {
                    position: i + 1,
                    height,
                    previous,
                });
            }
            previous = height;
        }
        Ok(Self { levels })
    }

    pub(crate) fn from_verified(levels: Vec<usize>) -> Self {
        Self { levels }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.levels.len()
    }

    /// The raw height sequence.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.levels
    }

    /// The child subtrees of the root, in traversal order.
    ///
    /// The tail of the sequence splits into maximal runs beginning wherever
    /// the height returns to 1; decrementing a run by one yields the level
    /// sequence of one child. This is the decomposition primitive the whole
    /// tree layer is built from.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcstructs::rooted_tree::LevelSequence;
    /// let t = LevelSequence::new(vec![0, 1, 2, 2, 1]).unwrap();
    /// let branches: Vec<_> = t.branches().collect();
    /// assert_eq!(branches[0], LevelSequence::new(vec![0, 1, 1]).unwrap());
    /// assert_eq!(branches[1], LevelSequence::new(vec![0]).unwrap());
    /// ```
    #[must_use]
    pub fn branches(&self) -> Branches<'_> {
        Branches {
            tail: &self.levels[1..],
        }
    }

    /// The parent of every node, viewing the level sequence as an implicit
    /// map from each node to the most recent shallower node. The root is its
    /// own parent, so the result is a self-map with exactly one fixed cycle.
    #[must_use]
    pub fn parents(&self) -> Vec<usize> {
        let mut grafting_point = vec![0; self.levels.len()];
        let mut parents = Vec::with_capacity(self.levels.len());
        for (node, &height) in self.levels.iter().enumerate() {
            parents.push(if height == 0 { 0 } else { grafting_point[height - 1] });
            grafting_point[height] = node;
        }
        parents
    }

    /// Nodes grouped by height, breadth-first within each group.
    pub(crate) fn height_groups(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (node, &height) in self.levels.iter().enumerate() {
            if height == groups.len() {
                groups.push(Vec::new());
            }
            groups[height].push(node);
        }
        groups
    }
}

impl Display for LevelSequence {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}]", self.levels.iter().join(", "))
    }
}

impl Debug for LevelSequence {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for LevelSequence {
    type Err = Error;

    /// Parse the `[0, 1, 1]` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| Error::Parse {
                text: s.to_string(),
            })?;
        let mut levels = Vec::new();
        if !inner.trim().is_empty() {
            for piece in inner.split(',') {
                levels.push(piece.trim().parse().map_err(|_| Error::Parse {
                    text: s.to_string(),
                })?);
            }
        }
        Self::new(levels)
    }
}

/// Iterator over the root's child subtrees of a [`LevelSequence`].
#[derive(Debug, Clone)]
pub struct Branches<'a> {
    tail: &'a [usize],
}

impl Iterator for Branches<'_> {
    type Item = LevelSequence;

    fn next(&mut self) -> Option<LevelSequence> {
        if self.tail.is_empty() {
            return None;
        }
        let end = self.tail[1..]
            .iter()
            .position(|&h| h == 1)
            .map_or(self.tail.len(), |p| p + 1);
        let (branch, rest) = self.tail.split_at(end);
        self.tail = rest;
        Some(LevelSequence {
            levels: branch.iter().map(|&h| h - 1).collect(),
        })
    }
}

/// Strategy for reducing a level sequence to dominant form.
///
/// Both strategies produce identical output; `Ranked` avoids repeated deep
/// lexicographic subtree comparisons and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canonicalize {
    /// Bottom-up integer ranking: nodes with identical rooted-subtree shape
    /// share a rank, and each level is sorted by its children's rank lists.
    Ranked,
    /// Recursively canonicalize each branch, then sort branches in
    /// descending lexicographic order.
    Lexicographic,
}

fn canonicalize_ranked(seq: &LevelSequence) -> Vec<usize> {
    let n = seq.node_count();
    let parents = seq.parents();
    let mut keys = vec![0usize; n];
    let mut child_keys: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut groups = seq.height_groups();
    let mut deeper: Vec<usize> = Vec::new();
    let mut rank = n;
    for level in groups.iter_mut().rev() {
        // Connect the already-ranked deeper level upward. Its nodes arrive
        // sorted, so each parent's key list is built in sorted order.
        for &x in &deeper {
            let key = keys[x];
            child_keys[parents[x]].push(key);
        }
        level.sort_by(|&a, &b| child_keys[b].cmp(&child_keys[a]));
        let mut i = 0;
        while i < level.len() {
            let mut j = i + 1;
            while j < level.len() && child_keys[level[j]] == child_keys[level[i]] {
                j += 1;
            }
            rank -= 1;
            for &x in &level[i..j] {
                keys[x] = rank;
            }
            i = j;
        }
        deeper = level.clone();
    }
    // Rebuild the traversal with every node's children in dominance order.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (node, &p) in parents.iter().enumerate().skip(1) {
        children[p].push(node);
    }
    for list in &mut children {
        list.sort_by_key(|&c| keys[c]);
    }
    let mut out = Vec::with_capacity(n);
    let mut stack = vec![(0usize, 0usize)];
    while let Some((node, height)) = stack.pop() {
        out.push(height);
        for &c in &children[node] {
            stack.push((c, height + 1));
        }
    }
    out
}

fn canonicalize_lex(seq: &LevelSequence) -> Vec<usize> {
    let mut branches: Vec<Vec<usize>> = seq.branches().map(|b| canonicalize_lex(&b)).collect();
    branches.sort_unstable_by(|a, b| b.cmp(a));
    let mut out = vec![0];
    for branch in branches {
        out.extend(branch.into_iter().map(|h| h + 1));
    }
    out
}

/// The canonical ordered form of an unordered rooted tree: the
/// lexicographically largest level sequence, with every subtree recursively
/// in the same form. Two level sequences describe the same unlabelled tree
/// exactly when their dominant sequences are identical.
///
/// # Examples
///
/// ```
/// use funcstructs::rooted_tree::{DominantSequence, LevelSequence};
/// let a = LevelSequence::new(vec![0, 1, 1, 2]).unwrap();
/// let b = LevelSequence::new(vec![0, 1, 2, 1]).unwrap();
/// assert_eq!(DominantSequence::new(&a), DominantSequence::new(&b));
/// assert_eq!(DominantSequence::new(&a).to_string(), "[0, 1, 2, 1]");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DominantSequence(LevelSequence);

impl DominantSequence {
    /// Canonicalize a level sequence with the default (ranked) strategy.
    #[must_use]
    pub fn new(seq: &LevelSequence) -> Self {
        Self::with_strategy(seq, Canonicalize::Ranked)
    }

    /// Canonicalize with an explicit strategy.
    #[must_use]
    pub fn with_strategy(seq: &LevelSequence, strategy: Canonicalize) -> Self {
        let levels = match strategy {
            Canonicalize::Ranked => canonicalize_ranked(seq),
            Canonicalize::Lexicographic => canonicalize_lex(seq),
        };
        Self(LevelSequence { levels })
    }

    /// Validate raw heights and canonicalize in one step.
    ///
    /// # Errors
    ///
    /// As for [`LevelSequence::new`].
    pub fn from_levels(levels: Vec<usize>) -> Result<Self, Error> {
        Ok(Self::new(&LevelSequence::new(levels)?))
    }

    /// Wrap a sequence already known to be dominant. Branches of a dominant
    /// sequence and Beyer–Hedetniemi successors qualify.
    pub(crate) fn from_canonical(levels: Vec<usize>) -> Self {
        Self(LevelSequence { levels })
    }

    /// The underlying ordered representation.
    #[must_use]
    pub fn as_level_sequence(&self) -> &LevelSequence {
        &self.0
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.0.node_count()
    }

    /// The raw height sequence.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    /// The parent of every node; see [`LevelSequence::parents`].
    #[must_use]
    pub fn parents(&self) -> Vec<usize> {
        self.0.parents()
    }

    /// The root's child subtrees. Subtrees of a dominant sequence are
    /// dominant, so no re-canonicalization happens.
    pub fn branches(&self) -> impl Iterator<Item = DominantSequence> {
        self.0.branches().map(DominantSequence)
    }

    /// The multiset of the root's child subtrees.
    #[must_use]
    pub fn chop(&self) -> Multiset<DominantSequence> {
        self.branches().collect()
    }

    /// The order of the tree's automorphism group: interchangeable identical
    /// child subtrees contribute the factorial of their multiplicity, and
    /// each distinct child contributes its own degeneracy, recursively.
    ///
    /// For any tree t on n nodes, n!/t.degeneracy() is the number of distinct
    /// labelled trees of that shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcstructs::rooted_tree::DominantSequence;
    /// use num::BigUint;
    /// // A star: the three leaves are fully interchangeable.
    /// let star = DominantSequence::from_levels(vec![0, 1, 1, 1]).unwrap();
    /// assert_eq!(star.degeneracy(), BigUint::from(6u32));
    /// // A path has no symmetry at all.
    /// let path = DominantSequence::from_levels(vec![0, 1, 2, 3]).unwrap();
    /// assert_eq!(path.degeneracy(), BigUint::from(1u32));
    /// ```
    #[must_use]
    pub fn degeneracy(&self) -> BigUint {
        let branches = self.chop();
        let mut deg = branches.degeneracy();
        for (subtree, mult) in branches.counts() {
            deg *= subtree.degeneracy().pow(mult);
        }
        deg
    }

    /// The unordered dual of this sequence.
    #[must_use]
    pub fn unordered_form(&self) -> RootedTree {
        RootedTree::from_sequence(self)
    }
}

impl Display for DominantSequence {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for DominantSequence {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for DominantSequence {
    type Err = Error;

    /// Parse a level sequence and canonicalize it.
    fn from_str(s: &str) -> Result<Self, Error> {
        Ok(Self::new(&s.parse::<LevelSequence>()?))
    }
}

/// An unlabelled, unordered rooted tree: the multiset of its child subtrees.
/// The empty multiset is a single node.
///
/// This is the recursive dual of [`DominantSequence`]; conversion in both
/// directions is lossless.
///
/// # Examples
///
/// ```
/// use funcstructs::rooted_tree::{DominantSequence, RootedTree};
/// let seq = DominantSequence::from_levels(vec![0, 1, 2, 1]).unwrap();
/// let tree = seq.unordered_form();
/// assert_eq!(tree.node_count(), 4);
/// assert_eq!(tree.ordered_form(), seq);
/// assert_eq!(tree.to_string(), "RootedTree({{}, {{}}})");
/// ```
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootedTree {
    subtrees: Multiset<RootedTree>,
}

impl RootedTree {
    /// A tree with the given child subtrees.
    #[must_use]
    pub fn new(subtrees: Multiset<RootedTree>) -> Self {
        Self { subtrees }
    }

    /// The single-node tree.
    #[must_use]
    pub fn leaf() -> Self {
        Self::default()
    }

    /// The unordered form of any ordered tree.
    #[must_use]
    pub fn from_levels(seq: &LevelSequence) -> Self {
        Self {
            subtrees: seq.branches().map(|b| Self::from_levels(&b)).collect(),
        }
    }

    /// The unordered form of a canonical sequence.
    #[must_use]
    pub fn from_sequence(seq: &DominantSequence) -> Self {
        Self::from_levels(seq.as_level_sequence())
    }

    /// The multiset of child subtrees.
    #[must_use]
    pub fn subtrees(&self) -> &Multiset<RootedTree> {
        &self.subtrees
    }

    /// Number of nodes, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .subtrees
            .counts()
            .map(|(t, m)| t.node_count() * m)
            .sum::<usize>()
    }

    /// The automorphism-group order; agrees with
    /// [`DominantSequence::degeneracy`] on the ordered form.
    #[must_use]
    pub fn degeneracy(&self) -> BigUint {
        let mut deg = self.subtrees.degeneracy();
        for (subtree, mult) in self.subtrees.counts() {
            deg *= subtree.degeneracy().pow(mult);
        }
        deg
    }

    fn push_levels(&self, height: usize, out: &mut Vec<usize>) {
        out.push(height);
        for (subtree, mult) in self.subtrees.counts() {
            for _ in 0..mult {
                subtree.push_levels(height + 1, out);
            }
        }
    }

    /// The canonical ordered representative of this tree.
    #[must_use]
    pub fn ordered_form(&self) -> DominantSequence {
        let mut levels = Vec::with_capacity(self.node_count());
        self.push_levels(0, &mut levels);
        DominantSequence::new(&LevelSequence { levels })
    }

    fn fmt_inner(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for (subtree, mult) in self.subtrees.counts() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            subtree.fmt_inner(f)?;
            if mult > 1 {
                write!(f, "^{mult}")?;
            }
        }
        f.write_str("}")
    }

    fn parse_inner(s: &str) -> Result<Self, Error> {
        let parse_err = || Error::Parse {
            text: s.to_string(),
        };
        let inner = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(parse_err)?;
        let mut pairs = Vec::new();
        for piece in split_top_level(inner) {
            let (elem, count) = split_count(piece);
            let count = match count {
                Some(c) => c.parse().map_err(|_| parse_err())?,
                None => 1,
            };
            pairs.push((Self::parse_inner(elem.trim())?, count));
        }
        let subtrees = Multiset::from_counts(pairs).map_err(|_| parse_err())?;
        Ok(Self { subtrees })
    }
}

impl Display for RootedTree {
    /// Subtrees rendered in braces, with `^count` marking multiplicity.
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("RootedTree(")?;
        self.fmt_inner(f)?;
        f.write_str(")")
    }
}

impl Debug for RootedTree {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for RootedTree {
    type Err = Error;

    /// Parse the `RootedTree({...})` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let inner = s
            .trim()
            .strip_prefix("RootedTree(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| Error::Parse {
                text: s.to_string(),
            })?;
        Self::parse_inner(inner.trim())
    }
}

/// Enumerator of every unlabelled rooted tree on a fixed number of nodes.
///
/// Trees are emitted as dominant sequences in decreasing lexicographic order,
/// from the path `[0, 1, …, n-1]` down to the broom `[0, 1, 1, …]`, each
/// exactly once, by the Beyer–Hedetniemi successor rule in amortized constant
/// time per tree.
///
/// # Examples
///
/// ```
/// use funcstructs::rooted_tree::TreeEnumerator;
/// let trees: Vec<_> = TreeEnumerator::new(4).unwrap().iter().collect();
/// let rendered: Vec<_> = trees.iter().map(|t| t.to_string()).collect();
/// assert_eq!(rendered, vec![
///     "[0, 1, 2, 3]",
///     "[0, 1, 2, 2]",
///     "[0, 1, 2, 1]",
///     "[0, 1, 1, 1]",
/// ]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEnumerator {
    n: usize,
}

impl TreeEnumerator {
    /// Trees on n nodes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSize`] when n is 0; there is no tree without a root.
    pub fn new(n: usize) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::InvalidSize { nodes: 0 });
        }
        Ok(Self { n })
    }

    pub(crate) fn new_unchecked(n: usize) -> Self {
        Self { n }
    }

    /// The node count every emitted tree has.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// A fresh enumeration cursor.
    #[must_use]
    pub fn iter(&self) -> TreeIter {
        TreeIter {
            levels: (0..self.n).collect(),
            fresh: true,
            done: false,
        }
    }

    /// The number of trees, without enumerating them (OEIS A000081).
    ///
    /// Uses the divisor-sum recurrence
    /// T[n] = (Σ_{i<n} (Σ_{d|i} d·T[d]) · T[n-i]) / (n-1).
    #[must_use]
    pub fn cardinality(&self) -> BigUint {
        self.cardinality_with(&mut DivisorCache::new())
    }

    /// [`cardinality`](Self::cardinality) against a caller-owned divisor cache.
    pub fn cardinality_with(&self, cache: &mut DivisorCache) -> BigUint {
        let n = self.n;
        let mut t = vec![BigUint::zero(); n + 1];
        t[1] = BigUint::one();
        for m in 2..=n {
            let mut total = BigUint::zero();
            for i in 1..m {
                let s: BigUint = cache
                    .divisors(i)
                    .iter()
                    .map(|&d| BigUint::from(d) * &t[d])
                    .sum();
                total += s * &t[m - i];
            }
            t[m] = total / BigUint::from(m - 1);
        }
        t.pop().unwrap_or_default()
    }
}

impl IntoIterator for &TreeEnumerator {
    type Item = DominantSequence;
    type IntoIter = TreeIter;

    fn into_iter(self) -> TreeIter {
        self.iter()
    }
}

/// Lazy cursor over the trees of a [`TreeEnumerator`].
#[derive(Debug, Clone)]
pub struct TreeIter {
    levels: Vec<usize>,
    fresh: bool,
    done: bool,
}

impl Iterator for TreeIter {
    type Item = DominantSequence;

    fn next(&mut self) -> Option<DominantSequence> {
        if self.done {
            return None;
        }
        if self.fresh {
            self.fresh = false;
            return Some(DominantSequence::from_canonical(self.levels.clone()));
        }
        let n = self.levels.len();
        if n < 3 || self.levels[1] == self.levels[2] {
            self.done = true;
            return None;
        }
        // Beyer–Hedetniemi: find the rightmost node p still above the first
        // branch level, the nearest shallower node q before it, and tile the
        // suffix with copies of the window (q, p].
        let mut p = n - 1;
        while self.levels[p] == self.levels[1] {
            p -= 1;
        }
        let mut q = p - 1;
        while self.levels[q] >= self.levels[p] {
            q -= 1;
        }
        for i in p..n {
            self.levels[i] = self.levels[i - (p - q)];
        }
        Some(DominantSequence::from_canonical(self.levels.clone()))
    }
}

/// Enumerator of every forest (multiset of rooted trees) on a fixed number
/// of nodes.
///
/// A forest on n nodes is exactly a tree on n+1 nodes with the root removed,
/// so the cursor enumerates `TreeEnumerator(n+1)` and chops each tree at its
/// base. Zero nodes yield the single empty forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestEnumerator {
    n: usize,
}

impl ForestEnumerator {
    /// Forests on n nodes.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// The total node count of every emitted forest.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// A fresh enumeration cursor.
    #[must_use]
    pub fn iter(&self) -> ForestIter {
        ForestIter {
            trees: TreeEnumerator::new_unchecked(self.n + 1).iter(),
        }
    }

    /// The number of forests, without enumerating them.
    #[must_use]
    pub fn cardinality(&self) -> BigUint {
        self.cardinality_with(&mut DivisorCache::new())
    }

    /// [`cardinality`](Self::cardinality) against a caller-owned divisor cache.
    pub fn cardinality_with(&self, cache: &mut DivisorCache) -> BigUint {
        TreeEnumerator::new_unchecked(self.n + 1).cardinality_with(cache)
    }
}

impl IntoIterator for &ForestEnumerator {
    type Item = Multiset<DominantSequence>;
    type IntoIter = ForestIter;

    fn into_iter(self) -> ForestIter {
        self.iter()
    }
}

/// Lazy cursor over the forests of a [`ForestEnumerator`].
#[derive(Debug, Clone)]
pub struct ForestIter {
    trees: TreeIter,
}

impl Iterator for ForestIter {
    type Item = Multiset<DominantSequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.trees.next().map(|t| t.chop())
    }
}

/// Enumerator of forests whose tree sizes are prescribed by a multiset.
///
/// For each distinct size, an unordered combination with repetition is drawn
/// from the trees of that size, one per required multiplicity; the draws are
/// combined across sizes.
///
/// # Examples
///
/// ```
/// use funcstructs::multiset::Multiset;
/// use funcstructs::rooted_tree::PartitionForests;
/// // Two trees of size 2 (only one shape) and one of size 3 (two shapes).
/// let forests = PartitionForests::new(Multiset::new([2, 2, 3])).unwrap();
/// assert_eq!(forests.iter().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionForests {
    sizes: Multiset<usize>,
}

impl PartitionForests {
    /// Forests with the given tree sizes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSize`] if any prescribed size is 0.
    pub fn new(sizes: Multiset<usize>) -> Result<Self, Error> {
        if sizes.count(&0) > 0 {
            return Err(Error::InvalidSize { nodes: 0 });
        }
        Ok(Self { sizes })
    }

    pub(crate) fn new_unchecked(sizes: Multiset<usize>) -> Self {
        Self { sizes }
    }

    /// A fresh enumeration cursor.
    #[must_use]
    pub fn iter(&self) -> Box<dyn Iterator<Item = Multiset<DominantSequence>>> {
        Box::new(unordered_product(self.sizes.clone(), |&size| {
            TreeEnumerator::new_unchecked(size).iter()
        }))
    }

    /// The number of forests, without enumerating them: the product over
    /// distinct sizes of multichoose(trees of that size, multiplicity).
    #[must_use]
    pub fn cardinality(&self) -> BigUint {
        self.cardinality_with(&mut DivisorCache::new())
    }

    /// [`cardinality`](Self::cardinality) against a caller-owned divisor cache.
    pub fn cardinality_with(&self, cache: &mut DivisorCache) -> BigUint {
        let mut total = BigUint::one();
        for (&size, mult) in self.sizes.counts() {
            let trees = TreeEnumerator::new_unchecked(size).cardinality_with(cache);
            total *= multichoose(&trees, mult);
        }
        total
    }
}

/// Errors from tree construction, enumeration, or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The level sequence was empty; every tree has at least a root.
    #[error("invalid tree shape: a tree needs at least a root node")]
    EmptyTree,
    /// The first height was {`root`} instead of 0.
    #[error("invalid tree shape: the root must have height 0, found {root}")]
    NonZeroRoot {
        /// The offending first height.
        root: usize,
    },
    /// A height climbed by more than one level, or fell back to the root.
    #[error(
        "invalid tree shape: height {height} at position {position} cannot follow height {previous}"
    )]
    HeightJump {
        /// Index of the offending node.
        position: usize,
        /// Its height.
        height: usize,
        /// The height before it.
        previous: usize,
    },
    /// An enumerator was asked for trees on {`nodes`} nodes.
    #[error("invalid size: cannot enumerate trees on {nodes} nodes")]
    InvalidSize {
        /// The offending node count.
        nodes: usize,
    },
    /// The text {`text`} is not a rendered tree.
    #[error("cannot parse {text:?} as a tree")]
    Parse {
        /// The text that failed to parse.
        text: String,
    },
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinat::factorial;
    use proptest::prelude::*;

    /// OEIS A000081: rooted trees on n nodes, n = 1...
    const A000081: [u64; 12] = [1, 1, 2, 4, 9, 20, 48, 115, 286, 719, 1842, 4766];

    #[test]
    fn shape_validation() {
        assert_eq!(LevelSequence::new(vec![]), Err(Error::EmptyTree));
        assert_eq!(
            LevelSequence::new(vec![1, 2]),
            Err(Error::NonZeroRoot { root: 1 })
        );
        assert_eq!(
            LevelSequence::new(vec![0, 1, 3]),
            Err(Error::HeightJump {
                position: 2,
                height: 3,
                previous: 1
            })
        );
        assert_eq!(
            LevelSequence::new(vec![0, 1, 0]),
            Err(Error::HeightJump {
                position: 2,
                height: 0,
                previous: 1
            })
        );
        assert!(LevelSequence::new(vec![0, 1, 2, 2, 1, 1]).is_ok());
    }

    #[test]
    fn branches_decompose() {
        let t = LevelSequence::new(vec![0, 1, 2, 3, 2, 1, 2]).unwrap();
        let branches: Vec<_> = t.branches().collect();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].as_slice(), &[0, 1, 2, 1]);
        assert_eq!(branches[1].as_slice(), &[0, 1]);
        // A lone root has no branches.
        let root = LevelSequence::new(vec![0]).unwrap();
        assert_eq!(root.branches().count(), 0);
    }

    #[test]
    fn parents_graft_correctly() {
        let t = LevelSequence::new(vec![0, 1, 2, 2, 1]).unwrap();
        assert_eq!(t.parents(), vec![0, 0, 1, 1, 0]);
    }

    #[test]
    fn canonical_strategies_agree() {
        for n in 1..=8 {
            for tree in TreeEnumerator::new(n).unwrap().iter() {
                let seq = tree.as_level_sequence();
                let ranked = DominantSequence::with_strategy(seq, Canonicalize::Ranked);
                let lex = DominantSequence::with_strategy(seq, Canonicalize::Lexicographic);
                // Enumerated trees are already canonical: both strategies
                // must be the identity on them.
                assert_eq!(ranked, tree);
                assert_eq!(lex, tree);
            }
        }
    }

    #[test]
    fn canonical_form_identifies_reorderings() {
        let a = LevelSequence::new(vec![0, 1, 1, 2, 3, 2]).unwrap();
        let b = LevelSequence::new(vec![0, 1, 2, 2, 3, 1]).unwrap();
        assert_ne!(a, b);
        assert_eq!(DominantSequence::new(&a), DominantSequence::new(&b));
    }

    #[test]
    fn enumeration_matches_a000081() {
        for (n, &expected) in (1..=9).zip(A000081.iter()) {
            let trees = TreeEnumerator::new(n).unwrap();
            assert_eq!(trees.iter().count() as u64, expected, "n = {n}");
        }
    }

    #[test]
    fn cardinality_matches_a000081() {
        let mut cache = DivisorCache::new();
        for (n, &expected) in (1..=12).zip(A000081.iter()) {
            let trees = TreeEnumerator::new(n).unwrap();
            assert_eq!(trees.cardinality_with(&mut cache), BigUint::from(expected));
        }
    }

    #[test]
    fn enumeration_is_strictly_decreasing() {
        for n in 1..=8 {
            let all: Vec<_> = TreeEnumerator::new(n).unwrap().iter().collect();
            assert!(all.windows(2).all(|w| w[0].as_slice() > w[1].as_slice()));
            assert_eq!(all[0].as_slice(), (0..n).collect::<Vec<_>>().as_slice());
        }
    }

    #[test]
    fn labelled_trees_by_orbit_stabilizer() {
        // Cayley: n^(n-1) labelled rooted trees on n nodes.
        for n in 1..=8usize {
            let total: BigUint = TreeEnumerator::new(n)
                .unwrap()
                .iter()
                .map(|t| factorial(n) / t.degeneracy())
                .sum();
            assert_eq!(total, BigUint::from(n.pow(n as u32 - 1)), "n = {n}");
        }
    }

    #[test]
    fn rooted_tree_roundtrip() {
        for n in 1..=7 {
            for seq in TreeEnumerator::new(n).unwrap().iter() {
                let tree = seq.unordered_form();
                assert_eq!(tree.node_count(), n);
                assert_eq!(tree.ordered_form(), seq);
                assert_eq!(tree.degeneracy(), seq.degeneracy());
            }
        }
    }

    #[test]
    fn invalid_sizes() {
        assert_eq!(TreeEnumerator::new(0), Err(Error::InvalidSize { nodes: 0 }));
        assert!(PartitionForests::new(Multiset::new([2, 0])).is_err());
    }

    #[test]
    fn forests_chop_trees() {
        // Forests on 3 nodes = trees on 4 nodes.
        let forests = ForestEnumerator::new(3);
        let all: Vec<_> = forests.iter().collect();
        assert_eq!(all.len() as u64, A000081[3]);
        assert_eq!(forests.cardinality(), BigUint::from(A000081[3]));
        assert!(all.iter().all(|f| f.iter().map(DominantSequence::node_count).sum::<usize>() == 3));
        // The empty forest is the only forest on no nodes.
        assert_eq!(ForestEnumerator::new(0).iter().count(), 1);
    }

    #[test]
    fn partition_forests_count() {
        let forests = PartitionForests::new(Multiset::new([2, 2, 3])).unwrap();
        let all: Vec<_> = forests.iter().collect();
        assert_eq!(BigUint::from(all.len()), forests.cardinality());
        // multichoose(1, 2) * multichoose(2, 1) = 2.
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn display_roundtrips() {
        let seq = DominantSequence::from_levels(vec![0, 1, 2, 2, 1]).unwrap();
        assert_eq!(seq.to_string().parse::<DominantSequence>().unwrap(), seq);
        let tree = seq.unordered_form();
        assert_eq!(tree.to_string().parse::<RootedTree>().unwrap(), tree);
        assert_eq!(
            RootedTree::leaf().to_string().parse::<RootedTree>().unwrap(),
            RootedTree::leaf()
        );
        assert!("RootedTree({)".parse::<RootedTree>().is_err());
    }

    proptest! {
        #[test]
        fn strategies_agree_on_random_trees(seq in strategies::level_sequences(40)) {
            let ranked = DominantSequence::with_strategy(&seq, Canonicalize::Ranked);
            let lex = DominantSequence::with_strategy(&seq, Canonicalize::Lexicographic);
            prop_assert_eq!(ranked, lex);
        }

        #[test]
        fn canonicalization_is_idempotent(seq in strategies::level_sequences(30)) {
            let canonical = DominantSequence::new(&seq);
            let again = DominantSequence::new(canonical.as_level_sequence());
            prop_assert_eq!(&again, &canonical);
        }

        #[test]
        fn unordered_roundtrip_random(seq in strategies::level_sequences(25)) {
            let canonical = DominantSequence::new(&seq);
            let tree = RootedTree::from_levels(&seq);
            prop_assert_eq!(tree.ordered_form(), canonical);
        }

        #[test]
        fn parse_is_display_inverse(seq in strategies::level_sequences(20)) {
            let canonical = DominantSequence::new(&seq);
            let parsed: DominantSequence = canonical.to_string().parse().unwrap();
            prop_assert_eq!(parsed, canonical);
        }
    }
}
