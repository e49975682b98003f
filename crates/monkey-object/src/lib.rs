//! monkey-object — runtime values seen by the Monkey VM
//!
//! - `Integer`, `Boolean`, `Str` : hashable scalars (see [`Hashable`])
//! - `HashKey` : `{ kind, value }`, the key type of hash objects
//! - `Object` : dynamic value (scalars, `Null`, `Hash`)
//! - `HashObject` : insertion-ordered `HashKey -> HashPair` map
//!
//! Only scalars can be keys; `Object::hash_key` reports anything else as
//! `ObjectError::Unhashable`.

#![deny(missing_docs)]

use core::fmt;

use indexmap::IndexMap;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hash-key derivation.
pub mod hash_key;

pub use hash_key::{HashKey, Hashable};

/* --------------------------- Kinds --------------------------- */

/// Kind tag of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectType {
    /// 64-bit signed integer.
    Integer,
    /// Boolean.
    Boolean,
    /// UTF-8 string.
    String,
    /// Absence of value.
    Null,
    /// Hash map.
    Hash,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::Hash => "HASH",
        })
    }
}

/* --------------------------- Scalars --------------------------- */

/// Integer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer {
    /// Value.
    pub value: i64,
}

impl Integer {
    /// Wraps a value.
    pub const fn new(value: i64) -> Self { Self { value } }
}

/// Boolean object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boolean {
    /// Value.
    pub value: bool,
}

impl Boolean {
    /// Wraps a value.
    pub const fn new(value: bool) -> Self { Self { value } }
}

/// String object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    /// Value.
    pub value: String,
}

impl Str {
    /// Wraps a value.
    pub fn new(value: impl Into<String>) -> Self { Self { value: value.into() } }
}

/* --------------------------- Errors --------------------------- */

/// Object-model errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// Value cannot be used as a hash key.
    #[error("unusable as hash key: {kind}")]
    Unhashable {
        /// Kind of the rejected value.
        kind: ObjectType,
    },
}

/* --------------------------- Object --------------------------- */

/// Dynamic runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Integer.
    Integer(Integer),
    /// Boolean.
    Boolean(Boolean),
    /// String.
    String(Str),
    /// Null.
    Null,
    /// Hash map.
    Hash(HashObject),
}

impl Object {
    /// Kind tag.
    pub fn kind(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::Hash(_) => ObjectType::Hash,
        }
    }

    /// Hash key of a scalar.
    ///
    /// # Errors
    /// `Unhashable` for `Null` and `Hash`.
    pub fn hash_key(&self) -> Result<HashKey, ObjectError> {
        match self {
            Object::Integer(i) => Ok(i.hash_key()),
            Object::Boolean(b) => Ok(b.hash_key()),
            Object::String(s) => Ok(s.hash_key()),
            other => Err(ObjectError::Unhashable { kind: other.kind() }),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(i) => write!(f, "{}", i.value),
            Object::Boolean(b) => write!(f, "{}", b.value),
            Object::String(s) => f.write_str(&s.value),
            Object::Null => f.write_str("null"),
            Object::Hash(h) => write!(f, "{h}"),
        }
    }
}

impl From<i64> for Object { fn from(v: i64) -> Self { Object::Integer(Integer::new(v)) } }
impl From<bool> for Object { fn from(v: bool) -> Self { Object::Boolean(Boolean::new(v)) } }
impl From<&str> for Object { fn from(v: &str) -> Self { Object::String(Str::new(v)) } }
impl From<String> for Object { fn from(v: String) -> Self { Object::String(Str::new(v)) } }
impl From<HashObject> for Object { fn from(v: HashObject) -> Self { Object::Hash(v) } }

/* --------------------------- Hash --------------------------- */

/// Original key and its value, stored under the key's `HashKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    /// Key as written by the program.
    pub key: Object,
    /// Associated value.
    pub value: Object,
}

/// Hash object. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashObject {
    pairs: IndexMap<HashKey, HashPair>,
}

impl HashObject {
    /// Empty hash.
    pub fn new() -> Self { Self { pairs: IndexMap::new() } }

    /// Number of pairs.
    pub fn len(&self) -> usize { self.pairs.len() }

    /// True if empty.
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    /// Inserts or replaces; returns the previous pair for an equal key.
    ///
    /// # Errors
    /// `Unhashable` if `key` is not a scalar.
    pub fn insert(&mut self, key: Object, value: Object) -> Result<Option<HashPair>, ObjectError> {
        let hk = key.hash_key()?;
        Ok(self.pairs.insert(hk, HashPair { key, value }))
    }

    /// Looks up the value stored under `key`.
    ///
    /// # Errors
    /// `Unhashable` if `key` is not a scalar.
    pub fn get(&self, key: &Object) -> Result<Option<&Object>, ObjectError> {
        let hk = key.hash_key()?;
        Ok(self.pairs.get(&hk).map(|pair| &pair.value))
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&HashKey, &HashPair)> { self.pairs.iter() }
}

impl fmt::Display for HashObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (ix, pair) in self.pairs.values().enumerate() {
            if ix > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", pair.key, pair.value)?;
        }
        f.write_str("}")
    }
}

/* --------------------------- Tests --------------------------- */
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn object_keys_follow_scalars() -> Result<(), ObjectError> {
        assert_eq!(Object::from(1_i64).hash_key()?, Integer::new(1).hash_key());
        assert_eq!(Object::from("k").hash_key()?, Str::new("k").hash_key());
        assert_eq!(Object::from(false).hash_key()?, Boolean::new(false).hash_key());
        Ok(())
    }

    #[test]
    fn null_and_hash_are_unhashable() {
        assert_eq!(Object::Null.hash_key(), Err(ObjectError::Unhashable { kind: ObjectType::Null }));
        assert_eq!(
            Object::from(HashObject::new()).hash_key(),
            Err(ObjectError::Unhashable { kind: ObjectType::Hash })
        );
        assert_eq!(
            ObjectError::Unhashable { kind: ObjectType::Hash }.to_string(),
            "unusable as hash key: HASH"
        );
    }

    #[test]
    fn hash_lookup_uses_structural_keys() -> Result<(), ObjectError> {
        let mut h = HashObject::new();
        h.insert(Object::from("one"), Object::from(1_i64))?;
        h.insert(Object::from(2_i64), Object::from("two"))?;
        h.insert(Object::from(true), Object::Null)?;

        assert_eq!(h.get(&Object::from(String::from("one")))?, Some(&Object::from(1_i64)));
        assert_eq!(h.get(&Object::from(2_i64))?, Some(&Object::from("two")));
        assert_eq!(h.get(&Object::from(true))?, Some(&Object::Null));
        assert_eq!(h.get(&Object::from(3_i64))?, None);
        assert!(h.get(&Object::Null).is_err());
        Ok(())
    }

    #[test]
    fn insert_replaces_equal_keys() -> Result<(), ObjectError> {
        let mut h = HashObject::new();
        assert_eq!(h.insert(Object::from(1_i64), Object::from("a"))?, None);
        let prev = h.insert(Object::from(1_i64), Object::from("b"))?;
        assert_eq!(prev.map(|p| p.value), Some(Object::from("a")));
        assert_eq!(h.len(), 1);
        Ok(())
    }

    #[test]
    fn display_follows_insertion_order() -> Result<(), ObjectError> {
        let mut h = HashObject::new();
        h.insert(Object::from("b"), Object::from(2_i64))?;
        h.insert(Object::from("a"), Object::from(true))?;
        assert_eq!(Object::from(h).to_string(), "{b: 2, a: true}");
        assert_eq!(Object::Null.to_string(), "null");
        assert_eq!(Object::from(-5_i64).to_string(), "-5");
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn hash_key_serializes() {
        let json = serde_json::to_string(&Boolean::new(true).hash_key()).expect("serializable");
        assert_eq!(json, r#"{"kind":"Boolean","value":1}"#);
    }
}
