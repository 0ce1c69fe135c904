//! Structural equality for document content.
//!
//! Identifiers are assignment artifacts, so equality here is about content:
//! references compare by what they point at and nested lists compare as
//! multisets. Hashes are consistent with `value_eq` so they can bucket
//! candidates before the full comparison.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::arena::Arenas;
use crate::catalog::CvId;

/// Starting value for folded hashes.
pub const SEED: u64 = 17;

/// Fixed multiplicative mixer for combining child hashes.
pub const MIXER: u64 = 0x0000_0100_0000_01b3;

/// Folds `value` into `hash`.
pub fn mix(hash: u64, value: u64) -> u64 {
    hash.wrapping_mul(MIXER).wrapping_add(value)
}

/// Structural equality and hashing over document content.
///
/// `arenas` is the owning document's storage; it is how handles and
/// references reach the content they compare by. Both sides must belong to
/// the same document.
pub trait ValueEq {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool;

    /// Hash consistent with `value_eq`: equal values hash equal.
    fn value_hash(&self, arenas: &Arenas) -> u64;
}

fn std_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

macro_rules! impl_value_eq_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl ValueEq for $t {
                fn value_eq(&self, other: &Self, _arenas: &Arenas) -> bool {
                    self == other
                }

                fn value_hash(&self, _arenas: &Arenas) -> u64 {
                    std_hash(self)
                }
            }
        )*
    };
}

impl_value_eq_scalar!(bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, str, String, CvId);

macro_rules! impl_value_eq_float {
    ($($t:ty),*) => {
        $(
            impl ValueEq for $t {
                // NaN equals NaN so every value equals itself.
                fn value_eq(&self, other: &Self, _arenas: &Arenas) -> bool {
                    self == other || (self.is_nan() && other.is_nan())
                }

                fn value_hash(&self, _arenas: &Arenas) -> u64 {
                    // 0.0 and -0.0 compare equal, so they must hash equal.
                    if *self == 0.0 {
                        0
                    } else if self.is_nan() {
                        1
                    } else {
                        std_hash(&self.to_bits())
                    }
                }
            }
        )*
    };
}

impl_value_eq_float!(f32, f64);

impl<T: ValueEq> ValueEq for Option<T> {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.value_eq(b, arenas),
            _ => false,
        }
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        match self {
            None => mix(SEED, 0),
            Some(inner) => mix(mix(SEED, 1), inner.value_hash(arenas)),
        }
    }
}

impl<T: ValueEq + ?Sized> ValueEq for Box<T> {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool {
        (**self).value_eq(other, arenas)
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        (**self).value_hash(arenas)
    }
}

/// Lists compare as multisets: same length, and every element of one side
/// pairs off with a distinct equal element of the other.
impl<T: ValueEq> ValueEq for Vec<T> {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool {
        let lhs: Vec<&T> = self.iter().collect();
        let rhs: Vec<&T> = other.iter().collect();
        multiset_eq(&lhs, &rhs, arenas)
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        multiset_hash(self.iter().map(|item| item.value_hash(arenas)))
    }
}

/// Order-independent equality of two element lists.
pub fn multiset_eq<T: ValueEq + ?Sized>(lhs: &[&T], rhs: &[&T], arenas: &Arenas) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }
    let mut matched = vec![false; rhs.len()];
    for left in lhs {
        let mut found = None;
        for (i, right) in rhs.iter().enumerate() {
            if !matched[i] && left.value_eq(right, arenas) {
                found = Some(i);
                break;
            }
        }
        match found {
            Some(i) => matched[i] = true,
            None => return false,
        }
    }
    true
}

/// Order-independent combination of element hashes.
pub fn multiset_hash(hashes: impl Iterator<Item = u64>) -> u64 {
    let (sum, len) = hashes.fold((0u64, 0u64), |(sum, len), h| (sum.wrapping_add(h), len + 1));
    mix(mix(SEED, len), sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn permutation_is_equal() {
        let arenas = Arenas::default();
        let a = strings(&["PEPTIDE", "SEQUENCE", "K"]);
        let b = strings(&["K", "PEPTIDE", "SEQUENCE"]);
        assert!(a.value_eq(&b, &arenas));
        assert_eq!(a.value_hash(&arenas), b.value_hash(&arenas));
    }

    #[test]
    fn changed_element_is_not_equal() {
        let arenas = Arenas::default();
        let a = strings(&["PEPTIDE", "SEQUENCE"]);
        let b = strings(&["PEPTIDE", "SEQUENCF"]);
        assert!(!a.value_eq(&b, &arenas));
    }

    #[test]
    fn multiplicity_matters() {
        let arenas = Arenas::default();
        let a = strings(&["A", "A", "B"]);
        let b = strings(&["A", "B", "B"]);
        assert!(!a.value_eq(&b, &arenas));
        assert!(!a.value_eq(&strings(&["A", "B"]), &arenas));
    }

    #[test]
    fn option_compares_presence() {
        let arenas = Arenas::default();
        assert!(Some(3u32).value_eq(&Some(3), &arenas));
        assert!(!Some(3u32).value_eq(&None, &arenas));
        assert!(None::<u32>.value_eq(&None, &arenas));
        assert_ne!(Some(0u32).value_hash(&arenas), None::<u32>.value_hash(&arenas));
    }

    #[test]
    fn signed_zero_hashes_equal() {
        let arenas = Arenas::default();
        assert!(0.0f64.value_eq(&-0.0, &arenas));
        assert_eq!(0.0f64.value_hash(&arenas), (-0.0f64).value_hash(&arenas));
    }

    #[test]
    fn mix_is_order_sensitive() {
        assert_ne!(mix(mix(SEED, 1), 2), mix(mix(SEED, 2), 1));
    }

    #[test]
    fn nan_equals_nan() {
        let arenas = Arenas::default();
        let quiet = f64::NAN;
        let negative = -f64::NAN;
        assert!(quiet.value_eq(&quiet, &arenas));
        assert!(quiet.value_eq(&negative, &arenas));
        assert_eq!(quiet.value_hash(&arenas), negative.value_hash(&arenas));
        assert!(!quiet.value_eq(&1.0, &arenas));
        assert!(Some(f32::NAN).value_eq(&Some(f32::NAN), &arenas));
    }
}
