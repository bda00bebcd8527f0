//! SimHash fingerprints for near-duplicate detection.
//!
//! A result's title and description are lowercased and split on whitespace.
//! Each token is hashed to 64 bits; every bit position accumulates +1 when
//! the token's bit is set and -1 otherwise. The fingerprint bit is set when
//! the total is positive. Texts sharing most of their vocabulary end up a
//! few bits apart, unrelated texts land about 32 bits apart.

use serde::{Deserialize, Serialize};

use crate::types::SearchResultItem;

/// Width of a fingerprint in bits.
pub const FINGERPRINT_BITS: u32 = u64::BITS;

/// A 64-bit SimHash fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Fingerprint used for text with no tokens.
    pub const EMPTY: Self = Self(0);

    /// Fingerprint a result from its title and description.
    ///
    /// Missing fields are treated as empty strings.
    pub fn of_item(item: &SearchResultItem) -> Self {
        fingerprint(item.title_str(), item.description_str())
    }

    /// Number of differing bit positions, `0..=64`.
    pub fn distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// `true` if `other` is within `threshold` bits of `self`.
    pub fn is_near_duplicate(self, other: Self, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }
}

/// Compute the fingerprint of `title` + `description`.
///
/// # Examples
///
/// ```
/// use scout_search::orchestrator::fingerprint::fingerprint;
///
/// let a = fingerprint("AWS expands capacity", "large buildout");
/// let b = fingerprint("aws  EXPANDS capacity", "large\tbuildout");
/// assert_eq!(a, b);
/// ```
pub fn fingerprint(title: &str, description: &str) -> Fingerprint {
    let text = format!("{title} {description}").to_lowercase();
    fingerprint_tokens(text.split_whitespace())
}

/// Compute a SimHash over an already tokenised multiset.
///
/// Repeated tokens contribute once per occurrence. Token order does not
/// affect the result.
pub fn fingerprint_tokens<'a, I>(tokens: I) -> Fingerprint
where
    I: IntoIterator<Item = &'a str>,
{
    let mut acc = [0i64; FINGERPRINT_BITS as usize];
    let mut any = false;

    for token in tokens {
        any = true;
        let hash = token_hash(token);
        for (bit, slot) in acc.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *slot += 1;
            } else {
                *slot -= 1;
            }
        }
    }

    if !any {
        return Fingerprint::EMPTY;
    }

    let value = acc
        .iter()
        .enumerate()
        .filter(|(_, sum)| **sum > 0)
        .fold(0u64, |out, (bit, _)| out | (1u64 << bit));
    Fingerprint(value)
}

/// Stable 64-bit token hash: the first eight bytes of the BLAKE3 digest.
pub fn token_hash(token: &str) -> u64 {
    let digest = blake3::hash(token.as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(word)
}

/// Hamming distance between two fingerprints.
pub fn hamming_distance(a: Fingerprint, b: Fingerprint) -> u32 {
    a.distance(b)
}

/// `true` iff `hamming_distance(a, b) <= threshold`.
pub fn is_near_duplicate(a: Fingerprint, b: Fingerprint, threshold: u32) -> bool {
    a.is_near_duplicate(b, threshold)
}
