//! Endofunction structures: conjugacy classes of self-maps, represented as
//! multisets of necklaces of canonical rooted trees, with direct enumeration
//! and closed-form counting.
//!
//! A self-map decomposes into cycles plus a rooted tree of transient elements
//! draining into each cyclic node. Forgetting the labels leaves, per cycle, a
//! cyclic arrangement of trees — a necklace of dominant sequences — and the
//! multiset of those necklaces. Two maps are conjugate exactly when these
//! multisets coincide.
use crate::combinat::factorial;
use crate::endofunction::Endofunction;
use crate::factorization::DivisorCache;
use crate::multiset::{unordered_product, Multiset};
use crate::necklace::{FixedContentNecklaces, Necklace};
use crate::partitions::{counts_vec, weak_compositions, FixedLengthPartitions, Partitions};
use crate::rooted_tree::{DominantSequence, PartitionForests};
use itertools::{Either, Itertools};
use ndarray::{Array1, Axis};
use num::traits::Pow;
use num::{BigRational, BigUint, One, Zero};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The canonical, fully unlabelled form of one conjugacy class of
/// endofunctions: a multiset of necklaces whose beads are dominant tree
/// sequences, one necklace per cycle.
///
/// # Examples
///
/// ```
/// use funcstructs::endofunction::{Endofunction, Permutation};
/// use funcstructs::funcstruct::Funcstruct;
/// let f = Endofunction::new(vec![2, 2, 3, 3]).unwrap();
/// // Relabel through any permutation: the structure is unchanged.
/// let s = Permutation::new(Endofunction::new(vec![3, 0, 2, 1]).unwrap()).unwrap();
/// let g = s.conjugate(&f).unwrap();
/// assert_eq!(Funcstruct::from_func(&f), Funcstruct::from_func(&g));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Funcstruct {
    cycles: Multiset<Necklace<DominantSequence>>,
    n: usize,
}

impl Funcstruct {
    /// A structure from pre-built cycles; the node count is tallied from the
    /// trees.
    #[must_use]
    pub fn new(cycles: Multiset<Necklace<DominantSequence>>) -> Self {
        let n = cycles
            .counts()
            .map(|(neck, mult)| {
                neck.iter().map(DominantSequence::node_count).sum::<usize>() * mult
            })
            .sum();
        Self { cycles, n }
    }

    pub(crate) fn with_node_count(cycles: Multiset<Necklace<DominantSequence>>, n: usize) -> Self {
        Self { cycles, n }
    }

    /// The structure of a labelled self-map: per cycle, the canonical tree
    /// attached to each cyclic element, in cyclic order. The necklace
    /// canonicalization absorbs the arbitrary choice of first cyclic
    /// element, so conjugate maps always produce equal structures.
    #[must_use]
    pub fn from_func(f: &Endofunction) -> Self {
        let ancestors = f.acyclic_ancestors();
        let cycles = f
            .cycles()
            .into_iter()
            .map(|cycle| {
                Necklace::new(cycle.into_iter().map(|x| {
                    DominantSequence::new(&f.attached_tree_in(x, &ancestors))
                }))
            })
            .collect();
        Self { cycles, n: f.len() }
    }

    /// Number of nodes across all cycles and trees.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// The cycles: one necklace of attached trees per cycle.
    #[must_use]
    pub fn cycles(&self) -> &Multiset<Necklace<DominantSequence>> {
        &self.cycles
    }

    /// The automorphism-group order of the structure: identical cycles are
    /// interchangeable, each cycle may be rotated onto itself, and each
    /// attached tree carries its own symmetry.
    #[must_use]
    pub fn degeneracy(&self) -> BigUint {
        let mut deg = self.cycles.degeneracy();
        for (neck, mult) in self.cycles.counts() {
            let mut cycle_deg = BigUint::from(neck.degeneracy());
            for tree in neck.iter() {
                cycle_deg *= tree.degeneracy();
            }
            deg *= cycle_deg.pow(mult);
        }
        deg
    }

    /// The number of labelled self-maps in this conjugacy class, by
    /// orbit–stabilizer: n!/degeneracy. No labelled map is ever built.
    #[must_use]
    pub fn labelled_count(&self) -> BigUint {
        factorial(self.n) / self.degeneracy()
    }

    /// One concrete labelled representative on {0..n}: trees are labelled
    /// depth-first into contiguous ranges, and each cycle is closed by
    /// bending every tree root to the root of the next tree around.
    ///
    /// `Funcstruct::from_func(&s.func_form())` always reproduces s.
    #[must_use]
    pub fn func_form(&self) -> Endofunction {
        let mut func: Vec<usize> = Vec::with_capacity(self.n);
        let mut root = 0;
        let mut end = 0;
        for neck in self.cycles.iter() {
            if neck.is_empty() {
                continue;
            }
            let cycle_start = func.len();
            let mut last_size = 0;
            for tree in neck.iter() {
                last_size = tree.node_count();
                end += last_size;
                for parent in tree.parents() {
                    func.push(parent + root);
                }
                // Each tree root points at the next cyclic element for now.
                func[root] = end;
                root = end;
            }
            // Close the cycle: the last root bends back to the first.
            func[root - last_size] = cycle_start;
        }
        Endofunction::from_verified(func)
    }

    /// Image sizes of the iterates of any map with this structure, computed
    /// from the tree shapes alone: a node at depth d vanishes from the image
    /// of the d-th iterate, and the strictly increasing height runs of a
    /// dominant sequence locate those depths.
    #[must_use]
    pub fn imagepath(&self) -> Array1<usize> {
        let n = self.n;
        let mut deltas = vec![0i64; n.max(2)];
        deltas[0] = n as i64;
        for (neck, mult) in self.cycles.counts() {
            let m = mult as i64;
            for tree in neck.iter() {
                for run in tree.as_slice()[1..].chunk_by(|a, b| a < b) {
                    let last = run[run.len() - 1];
                    for &height in &run[..run.len() - 1] {
                        deltas[last - height + 1] -= m;
                    }
                    deltas[1] -= m;
                }
            }
        }
        let mut totals = Array1::from_vec(deltas);
        totals.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
        totals.iter().skip(1).map(|&c| c as usize).collect()
    }
}

impl Display for Funcstruct {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Funcstruct({})", self.cycles)
    }
}

impl Debug for Funcstruct {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Funcstruct {
    type Err = Error;

    /// Parse the `Funcstruct({Necklace([[0, 1]]), ...})` form produced by
    /// `Display`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let inner = s
            .trim()
            .strip_prefix("Funcstruct(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| Error::Parse {
                text: s.to_string(),
            })?;
        let cycles = inner.parse().map_err(|_| Error::Parse {
            text: s.to_string(),
        })?;
        Ok(Self::new(cycles))
    }
}

/// Every cyclic arrangement of rooted trees built from `free` transient
/// nodes attached to one cycle of the given length.
fn attachment_forests(
    free: usize,
    length: usize,
) -> Box<dyn Iterator<Item = Necklace<DominantSequence>>> {
    Box::new(
        FixedLengthPartitions::new(free + length, length).flat_map(move |sizes| {
            PartitionForests::new_unchecked(Multiset::new(sizes))
                .iter()
                .flat_map(|forest| FixedContentNecklaces::new_unchecked(forest).iter())
        }),
    )
}

/// Every way to dress a group of `copies` cycles of one length with `free`
/// transient nodes: unordered, since equal-length cycles are interchangeable.
fn component_groups(
    free: usize,
    length: usize,
    copies: usize,
) -> Box<dyn Iterator<Item = Multiset<Necklace<DominantSequence>>>> {
    Box::new(
        FixedLengthPartitions::new(free + copies, copies).flat_map(move |sharing| {
            unordered_product(Multiset::new(sharing), move |&nodes| {
                attachment_forests(nodes - 1, length)
            })
        }),
    )
}

/// Every structure on n nodes whose cycle lengths form exactly `cycle_type`.
/// A cycle type needing more than n nodes yields nothing.
fn cycle_type_structs(
    n: usize,
    cycle_type: Multiset<usize>,
) -> Box<dyn Iterator<Item = Funcstruct>> {
    let cyclic: usize = cycle_type.iter().sum();
    if cyclic > n {
        return Box::new(std::iter::empty());
    }
    let free = n - cyclic;
    let (lengths, counts) = cycle_type.split();
    let lengths: Vec<usize> = lengths.into_iter().copied().collect();
    Box::new(
        weak_compositions(free, lengths.len()).flat_map(move |allocation| {
            let pools: Vec<Vec<Multiset<Necklace<DominantSequence>>>> = allocation
                .iter()
                .zip(&lengths)
                .zip(&counts)
                .map(|((&f, &l), &m)| component_groups(f, l, m).collect())
                .collect();
            if pools.is_empty() {
                // No cycles at all: only the empty structure, on zero nodes.
                return Either::Left(std::iter::once(Funcstruct::with_node_count(
                    Multiset::default(),
                    n,
                )));
            }
            Either::Right(
                pools
                    .into_iter()
                    .map(IntoIterator::into_iter)
                    .multi_cartesian_product()
                    .map(move |bundle| {
                        let cycles = bundle.into_iter().flat_map(Multiset::into_iter).collect();
                        Funcstruct::with_node_count(cycles, n)
                    }),
            )
        }),
    )
}

/// Enumerator and counter of every endofunction structure on n nodes,
/// optionally restricted to a fixed multiset of cycle lengths.
///
/// The enumeration composes the layers below it: integer partitions choose
/// the cycle type, weak compositions allocate tree nodes across cycle
/// lengths, partition forests build the attached trees, and fixed-content
/// necklace generation arranges them around each cycle. Every structure
/// appears exactly once; nothing is generated and filtered.
///
/// # Examples
///
/// ```
/// use funcstructs::funcstruct::EndofunctionStructures;
/// use num::BigUint;
/// let structs = EndofunctionStructures::new(4);
/// assert_eq!(structs.iter().count(), 19);
/// assert_eq!(structs.cardinality(), BigUint::from(19u32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndofunctionStructures {
    n: usize,
    cycle_type: Option<Multiset<usize>>,
}

impl EndofunctionStructures {
    /// All structures on n nodes.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cycle_type: None,
        }
    }

    /// Only the structures whose cycle lengths form exactly `cycle_type`.
    /// A cycle type whose sum exceeds n gives an empty enumeration.
    #[must_use]
    pub fn with_cycle_type(n: usize, cycle_type: Multiset<usize>) -> Self {
        Self {
            n,
            cycle_type: Some(cycle_type),
        }
    }

    /// The node count of every emitted structure.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// A fresh enumeration cursor.
    #[must_use]
    pub fn iter(&self) -> Box<dyn Iterator<Item = Funcstruct>> {
        let n = self.n;
        match &self.cycle_type {
            Some(cycle_type) => cycle_type_structs(n, cycle_type.clone()),
            None if n == 0 => Box::new(std::iter::once(Funcstruct::with_node_count(
                Multiset::default(),
                0,
            ))),
            None => Box::new((1..=n).flat_map(move |cyclic| {
                Partitions::new(cyclic)
                    .flat_map(move |partition| cycle_type_structs(n, Multiset::new(partition)))
            })),
        }
    }

    /// The exact number of structures on n nodes (OEIS A001372), by De
    /// Bruijn's closed form: a sum over the exponent vectors of the integer
    /// partitions of n combining divisor sums with exact rational
    /// arithmetic. Enumeration is infeasible long before this is.
    ///
    /// The count always covers every structure on n nodes; a cycle-type
    /// restriction does not narrow it.
    #[must_use]
    pub fn cardinality(&self) -> BigUint {
        self.cardinality_with(&mut DivisorCache::new())
    }

    /// [`cardinality`](Self::cardinality) against a caller-owned divisor cache.
    pub fn cardinality_with(&self, cache: &mut DivisorCache) -> BigUint {
        let n = self.n;
        let mut total = BigRational::zero();
        for partition in Partitions::new(n) {
            let b = counts_vec(n, &partition);
            let mut term = BigRational::one();
            for i in 1..=n {
                let weight: usize = cache.divisors(i).iter().map(|&d| d * b[d]).sum();
                let numer = BigUint::from(weight).pow(b[i]);
                let denom = BigUint::from(i).pow(b[i]) * factorial(b[i]);
                term *= BigRational::new(numer.into(), denom.into());
            }
            total += term;
        }
        (total.numer() / total.denom()).to_biguint().unwrap_or_default()
    }
}

impl IntoIterator for &EndofunctionStructures {
    type Item = Funcstruct;
    type IntoIter = Box<dyn Iterator<Item = Funcstruct>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Errors from parsing a rendered structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The text {`text`} is not a rendered structure.
    #[error("cannot parse {text:?} as a funcstruct")]
    Parse {
        /// The text that failed to parse.
        text: String,
    },
}
