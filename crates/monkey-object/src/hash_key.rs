//! Type-tagged hash keys for scalar objects.
//!
//! Keys are pure functions of the value: equal scalars of the same kind give
//! equal keys, and the kind tag keeps `1`, `true` and `"1"` apart. Strings use
//! 64-bit FNV-1a, so keys are also stable across runs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Boolean, Integer, ObjectType, Str};

/// Key used to index hash objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HashKey {
    /// Kind of the scalar the key was derived from.
    pub kind: ObjectType,
    /// 64-bit hash of the value.
    pub value: u64,
}

/// Scalars usable as hash keys.
pub trait Hashable {
    /// Derives the key. Pure and deterministic.
    fn hash_key(&self) -> HashKey;
}

impl Hashable for Integer {
    fn hash_key(&self) -> HashKey {
        // two's-complement bits, so distinct integers keep distinct keys
        HashKey { kind: ObjectType::Integer, value: self.value as u64 }
    }
}

impl Hashable for Boolean {
    fn hash_key(&self) -> HashKey {
        HashKey { kind: ObjectType::Boolean, value: u64::from(self.value) }
    }
}

impl Hashable for Str {
    fn hash_key(&self) -> HashKey {
        let mut h = Fnv1a64::new();
        h.update(self.value.as_bytes());
        HashKey { kind: ObjectType::String, value: h.finish() }
    }
}

#[derive(Copy, Clone, Debug)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    const fn new() -> Self {
        Self(Self::OFFSET)
    }

    fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    const fn finish(self) -> u64 {
        self.0
    }
}
