//! Exact combinatorial counting primitives.
//!
//! Everything here returns [`BigUint`]: degeneracies are products of factorials
//! and the counting layers multiply them far past machine range.
use num::{BigUint, One, Zero};

/// n! as an exact integer.
///
/// # Examples
///
/// ```
/// use funcstructs::combinat::factorial;
/// use num::BigUint;
/// assert_eq!(factorial(0), BigUint::from(1u32));
/// assert_eq!(factorial(10), BigUint::from(3628800u32));
/// ```
#[must_use]
pub fn factorial(n: usize) -> BigUint {
    (1..=n).fold(BigUint::one(), |acc, i| acc * BigUint::from(i))
}

/// Product of the factorials of a sequence of counts.
#[must_use]
pub fn factorial_prod(counts: impl IntoIterator<Item = usize>) -> BigUint {
    counts
        .into_iter()
        .fold(BigUint::one(), |acc, c| acc * factorial(c))
}

/// n choose k, exact for any size of n.
///
/// The running product is divided stepwise; every partial product is itself a
/// binomial coefficient, so the divisions are exact.
///
/// # Examples
///
/// ```
/// use funcstructs::combinat::binomial;
/// use num::BigUint;
/// assert_eq!(binomial(8, 3), BigUint::from(56u32));
/// assert_eq!(binomial(3, 8), BigUint::from(0u32));
/// ```
#[must_use]
pub fn binomial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    let k = k.min(n - k);
    let mut val = BigUint::one();
    for i in 1..=k {
        val *= BigUint::from(n - k + i);
        val /= BigUint::from(i);
    }
    val
}

/// The multinomial coefficient (Σpᵢ)! / Π pᵢ!.
///
/// # Examples
///
/// ```
/// use funcstructs::combinat::multinomial;
/// use num::BigUint;
/// assert_eq!(multinomial([3, 3, 2]), BigUint::from(560u32));
/// ```
#[must_use]
pub fn multinomial(parts: impl IntoIterator<Item = usize>) -> BigUint {
    let mut total = 0usize;
    let mut denom = BigUint::one();
    for p in parts {
        total += p;
        denom *= factorial(p);
    }
    factorial(total) / denom
}

/// Combinations with repetition: the number of multisets of size r drawn from
/// n distinct items, i.e. C(n+r-1, r). Takes n as a big integer since it is
/// usually itself a cardinality.
///
/// # Examples
///
/// ```
/// use funcstructs::combinat::multichoose;
/// use num::BigUint;
/// assert_eq!(multichoose(&BigUint::from(4u32), 2), BigUint::from(10u32));
/// assert_eq!(multichoose(&BigUint::from(9u32), 0), BigUint::from(1u32));
/// ```
#[must_use]
pub fn multichoose(n: &BigUint, r: usize) -> BigUint {
    let mut val = BigUint::one();
    for i in 1..=r {
        val *= n + BigUint::from(r - i);
        val /= BigUint::from(i);
    }
    val
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_small_values() {
        let expected = [1u64, 1, 2, 6, 24, 120, 720, 5040];
        for (n, &e) in expected.iter().enumerate() {
            assert_eq!(factorial(n), BigUint::from(e));
        }
    }

    #[test]
    fn factorial_prod_ok() {
        assert_eq!(factorial_prod([2, 3, 1]), BigUint::from(12u32));
        assert_eq!(factorial_prod([]), BigUint::from(1u32));
    }

    #[test]
    fn binomial_row_sums() {
        // Row n of Pascal's triangle sums to 2^n.
        for n in 0..12 {
            let row: BigUint = (0..=n).map(|k| binomial(n, k)).sum();
            assert_eq!(row, BigUint::from(1u64 << n));
        }
    }

    #[test]
    fn multinomial_matches_binomial() {
        for n in 0..10 {
            for k in 0..=n {
                assert_eq!(multinomial([k, n - k]), binomial(n, k));
            }
        }
    }

    #[test]
    fn multichoose_matches_binomial() {
        for n in 1usize..8 {
            for r in 0..8 {
                assert_eq!(
                    multichoose(&BigUint::from(n), r),
                    binomial(n + r - 1, r),
                );
            }
        }
    }
}
