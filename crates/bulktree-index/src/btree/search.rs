//! Binary search variants used for descent and leaf probing.
//!
//! All functions take a slice that is sorted ascending by key and may
//! contain runs of equal keys. They differ in which position they report
//! for such a run:
//!
//! | Function                 | Hit inside a run of `key`  | Miss                    |
//! |--------------------------|----------------------------|-------------------------|
//! | `exact_search`           | `Ok(midpoint that matched)`| `Err(#elements < key)`  |
//! | `first_greater_than`     | one past the run           | first element `> key`   |
//! | `first_greater_or_equal` | start of the run           | first element `> key`   |
//!
//! Positions equal to `len()` mean "past the end".

use std::cmp::Ordering;

/// Midpoint binary search with early termination.
///
/// Returns `Ok(i)` for the first probed index whose key equals `key`, which
/// is not necessarily the first element of a run. On a miss returns
/// `Err(p)`, where `p` counts the elements smaller than `key`; `p - 1` is
/// the last element known to be smaller (none when `p == 0`).
#[inline]
pub fn exact_search<K: Ord>(keys: &[K], key: &K) -> Result<usize, usize> {
    exact_search_by_key(keys, key, |k| k)
}

/// [`exact_search`] over items whose key is extracted by `key_of`.
#[inline]
pub fn exact_search_by_key<T, K, F>(items: &[T], key: &K, key_of: F) -> Result<usize, usize>
where
    K: Ord,
    F: Fn(&T) -> &K,
{
    let mut lo = 0usize;
    // Exclusive upper bound; the probe is the midpoint of the inclusive
    // range [lo, hi - 1].
    let mut hi = items.len();

    while lo < hi {
        let mid = lo + (hi - 1 - lo) / 2;
        match key_of(&items[mid]).cmp(key) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return Ok(mid),
        }
    }

    Err(lo)
}

/// Returns the first index whose key is strictly greater than `key`.
///
/// Equal keys are indistinguishable for descent, so a hit skips the whole
/// run. Inner nodes use this to choose the child to follow.
#[inline]
pub fn first_greater_than<K: Ord>(keys: &[K], key: &K) -> usize {
    match exact_search(keys, key) {
        Ok(mut pos) => {
            pos += 1;
            while pos < keys.len() && keys[pos] == *key {
                pos += 1;
            }
            pos
        }
        Err(pos) => pos,
    }
}

/// Returns the first index whose key is greater than or equal to `key`,
/// or `keys.len()` when there is none.
#[inline]
pub fn first_greater_or_equal<K: Ord>(keys: &[K], key: &K) -> usize {
    first_greater_or_equal_by_key(keys, key, |k| k)
}

/// [`first_greater_or_equal`] over items whose key is extracted by `key_of`.
#[inline]
pub fn first_greater_or_equal_by_key<T, K, F>(items: &[T], key: &K, key_of: F) -> usize
where
    K: Ord,
    F: Fn(&T) -> &K,
{
    let mut lo = 0usize;
    let mut hi = items.len();

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if key_of(&items[mid]) < key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    lo
}
