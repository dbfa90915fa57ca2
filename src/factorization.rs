//! Prime factorizations, divisor enumeration, and an explicit divisor cache.
use crate::multiset::Multiset;
use std::collections::BTreeMap;

/// The prime factorization of n as a multiset of primes.
///
/// Trial division; n must be at least 1 (1 factors into the empty multiset).
///
/// # Examples
///
/// ```
/// use funcstructs::factorization::prime_factorization;
/// use funcstructs::multiset::Multiset;
/// assert_eq!(prime_factorization(12), Multiset::new([2, 2, 3]));
/// assert_eq!(prime_factorization(1), Multiset::<usize>::new([]));
/// ```
#[must_use]
pub fn prime_factorization(mut n: usize) -> Multiset<usize> {
    let mut primes = Vec::new();
    let mut d = 2;
    while d * d <= n {
        while n % d == 0 {
            primes.push(d);
            n /= d;
        }
        d += 1;
    }
    if n > 1 {
        primes.push(n);
    }
    Multiset::new(primes)
}

/// Every positive divisor of n, in increasing order.
///
/// Each divisor is a choice of exponent per prime factor, so the list is built
/// by extending a running product table one prime at a time.
///
/// # Examples
///
/// ```
/// use funcstructs::factorization::divisors;
/// assert_eq!(divisors(12), vec![1, 2, 3, 4, 6, 12]);
/// assert_eq!(divisors(1), vec![1]);
/// ```
#[must_use]
pub fn divisors(n: usize) -> Vec<usize> {
    let mut divs = vec![1];
    for (&p, e) in prime_factorization(n).counts() {
        let base = divs.clone();
        let mut power = 1;
        for _ in 0..e {
            power *= p;
            divs.extend(base.iter().map(|d| d * power));
        }
    }
    divs.sort_unstable();
    divs
}

/// Memo table for [`divisors`] with an explicit owner.
///
/// The counting routines hit the same small divisor lists over and over. Each
/// `cardinality` entry point builds its own cache for the duration of the
/// call; callers doing many counts can hold one `DivisorCache` and pass it to
/// the `_with` variants to reuse the table across calls.
#[derive(Debug, Default, Clone)]
pub struct DivisorCache {
    memo: BTreeMap<usize, Vec<usize>>,
}

impl DivisorCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The divisors of n, computed at most once per cache.
    pub fn divisors(&mut self, n: usize) -> &[usize] {
        self.memo.entry(n).or_insert_with(|| divisors(n))
    }
}
