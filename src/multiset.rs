//! Multisets: immutable element → positive-count mappings.
//!
//! The shared currency type of the crate. Trees are multisets of trees,
//! structures are multisets of necklaces of trees, and every degeneracy
//! computation bottoms out in the factorial product over multiplicities.
use crate::combinat::factorial_prod;
use itertools::Itertools;
use num::BigUint;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// An immutable multiset, stored as element → multiplicity pairs sorted by
/// element.
///
/// Equality, ordering, and hashing are purely structural and independent of
/// the order elements were supplied in. Elements only need [`Ord`], which
/// every value type in this crate has, so multisets nest freely: a rooted
/// tree is a multiset of rooted trees.
///
/// # Examples
///
/// ```
/// use funcstructs::multiset::Multiset;
/// let a = Multiset::new(["x", "y", "x"]);
/// let b = Multiset::new(["y", "x", "x"]);
/// assert_eq!(a, b);
/// assert_eq!(a.count(&"x"), 2);
/// assert_eq!(a.len(), 3);
/// assert_eq!(a.to_string(), "{x^2, y}");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Multiset<T> {
    elems: Vec<(T, usize)>,
}

/// The empty multiset, for any element type.
impl<T> Default for Multiset<T> {
    fn default() -> Self {
        Self { elems: Vec::new() }
    }
}

impl<T: Ord> Multiset<T> {
    /// Collect a sequence into a multiset; repeats accumulate multiplicity.
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let mut counts = BTreeMap::new();
        for item in items {
            *counts.entry(item).or_insert(0) += 1;
        }
        Self {
            elems: counts.into_iter().collect(),
        }
    }

    /// Build a multiset from explicit element → count pairs. Counts for equal
    /// elements accumulate.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCount`] if any supplied count is zero; a multiset
    /// member has multiplicity at least one by definition.
    pub fn from_counts(pairs: impl IntoIterator<Item = (T, usize)>) -> Result<Self, Error> {
        let mut counts = BTreeMap::new();
        for (item, count) in pairs {
            if count == 0 {
                return Err(Error::InvalidCount { count: 0 });
            }
            *counts.entry(item).or_insert(0) += count;
        }
        Ok(Self {
            elems: counts.into_iter().collect(),
        })
    }

    /// The multiplicity of x, or 0 when absent.
    #[must_use]
    pub fn count(&self, x: &T) -> usize {
        self.elems
            .binary_search_by(|(e, _)| e.cmp(x))
            .map_or(0, |i| self.elems[i].1)
    }
}

impl<T> Multiset<T> {
    /// Total number of elements, multiplicities included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elems.iter().map(|(_, c)| c).sum()
    }

    /// Whether the multiset has no elements at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Number of distinct elements.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        self.elems.len()
    }

    /// Every element in order, repeated per its multiplicity.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elems
            .iter()
            .flat_map(|(e, c)| std::iter::repeat_n(e, *c))
    }

    /// The distinct elements with their multiplicities, in element order.
    pub fn counts(&self) -> impl Iterator<Item = (&T, usize)> {
        self.elems.iter().map(|(e, c)| (e, *c))
    }

    /// Parallel views of the distinct elements and their multiplicities.
    #[must_use]
    pub fn split(&self) -> (Vec<&T>, Vec<usize>) {
        self.elems.iter().map(|(e, c)| (e, *c)).unzip()
    }

    /// The number of distinct orderings that collapse to this multiset per
    /// choice of positions: the product of the factorials of the
    /// multiplicities. This is the elementary automorphism count every
    /// degeneracy formula in the crate builds on.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcstructs::multiset::Multiset;
    /// use num::BigUint;
    /// let m = Multiset::new([1, 1, 1, 2, 2, 3]);
    /// assert_eq!(m.degeneracy(), BigUint::from(12u32));
    /// ```
    #[must_use]
    pub fn degeneracy(&self) -> BigUint {
        factorial_prod(self.elems.iter().map(|(_, c)| *c))
    }
}

impl<T: Ord> FromIterator<T> for Multiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Flattening owned iteration: each element cloned out per its multiplicity.
impl<T: Clone> IntoIterator for Multiset<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            pairs: self.elems.into_iter(),
            current: None,
        }
    }
}

/// Owned flattening iterator for [`Multiset`].
#[derive(Debug, Clone)]
pub struct IntoIter<T> {
    pairs: std::vec::IntoIter<(T, usize)>,
    current: Option<(T, usize)>,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            match self.current.take() {
                Some((item, 1)) => return Some(item),
                Some((item, left)) => {
                    self.current = Some((item.clone(), left - 1));
                    return Some(item);
                }
                None => {
                    let (item, count) = self.pairs.next()?;
                    self.current = Some((item, count));
                }
            }
        }
    }
}

impl<T: Display> Display for Multiset<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let inner = self
            .elems
            .iter()
            .map(|(e, c)| {
                if *c > 1 {
                    format!("{e}^{c}")
                } else {
                    format!("{e}")
                }
            })
            .join(", ");
        write!(f, "{{{inner}}}")
    }
}

impl<T: Display> Debug for Multiset<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Split s at top-level commas, ignoring separators nested inside any kind of
/// bracket. The building block for re-parsing the textual forms.
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = s[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

/// Split a rendered element into its text and its `^count` suffix, honoring
/// bracket nesting. A missing suffix means multiplicity one.
pub(crate) fn split_count(s: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let mut carat = None;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '^' if depth == 0 => carat = Some(i),
            _ => {}
        }
    }
    match carat {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    }
}

impl<T: Ord + FromStr> FromStr for Multiset<T> {
    type Err = Error;

    /// Parse the `{a, b^2}` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let inner = s
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| Error::Parse {
                text: s.to_string(),
            })?;
        let mut pairs = Vec::new();
        for piece in split_top_level(inner) {
            let (elem, count) = split_count(piece);
            let count = match count {
                Some(c) => c.parse().map_err(|_| Error::Parse {
                    text: piece.to_string(),
                })?,
                None => 1,
            };
            let elem = elem.trim().parse().map_err(|_| Error::Parse {
                text: piece.to_string(),
            })?;
            pairs.push((elem, count));
        }
        Self::from_counts(pairs)
    }
}

/// Take, for every distinct element of a multiset, an unordered selection
/// with repetition from `f(element)` of size equal to its multiplicity, and
/// combine the selections across elements in every possible way.
///
/// Assumes `f` yields distinct values per element and disjoint values across
/// distinct elements, so each combined multiset appears exactly once.
///
/// # Examples
///
/// ```
/// use funcstructs::multiset::{unordered_product, Multiset};
/// // Two draws from {0, 1} and one from {2, 3}: 3 × 2 combinations.
/// let sizes = Multiset::new(['a', 'a', 'b']);
/// let combos: Vec<_> = unordered_product(sizes, |&c| {
///     if c == 'a' { vec![0, 1] } else { vec![2, 3] }
/// })
/// .collect();
/// assert_eq!(combos.len(), 6);
/// assert_eq!(combos[0], Multiset::new([0, 0, 2]));
/// ```
pub fn unordered_product<K, V, I, F>(
    mset: Multiset<K>,
    mut f: F,
) -> impl Iterator<Item = Multiset<V>>
where
    K: Ord,
    V: Ord + Clone,
    I: IntoIterator<Item = V>,
    F: FnMut(&K) -> I,
{
    let strands: Vec<Vec<Vec<V>>> = mset
        .counts()
        .map(|(k, count)| {
            let pool: Vec<V> = f(k).into_iter().collect();
            pool.into_iter().combinations_with_replacement(count).collect()
        })
        .collect();
    if strands.is_empty() {
        itertools::Either::Left(std::iter::once(Multiset::default()))
    } else {
        itertools::Either::Right(
            strands
                .into_iter()
                .map(IntoIterator::into_iter)
                .multi_cartesian_product()
                .map(|bundle| bundle.into_iter().flatten().collect()),
        )
    }
}

/// Errors from multiset construction or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An explicit multiplicity of {`count`} was supplied; counts must be positive.
    #[error("invalid count: multiplicity {count} supplied, counts must be positive")]
    InvalidCount {
        /// The offending multiplicity.
        count: usize,
    },
    /// The text {`text`} is not a rendered multiset.
    #[error("cannot parse {text:?} as a multiset element")]
    Parse {
        /// The text that failed to parse.
        text: String,
    },
}
