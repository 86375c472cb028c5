//! Hash policy: resolves which hash function a map uses and compresses raw
//! hashes into bin indices.
//!
//! A hash function can come from two places:
//! - the map's type-level policy `T: TypeHash<K>` (its associated `HASH`), or
//! - the instance configuration (`MapConfig::with_hash` / `with_hash_closure`).
//!
//! Exactly one distinct function must result. Resolution happens once, at
//! construction; afterwards the map only calls `HashPolicy::hash`.

use crate::error::MapError;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use std::rc::Rc;

/// Plain hash function over keys. Negative outputs are allowed.
pub type HashFn<K> = fn(&K) -> i64;

/// Type-level hash policy, the map's third type parameter.
///
/// ```
/// use chained_hashmap::{HashFn, TypeHash};
///
/// fn by_len(s: &String) -> i64 {
///     s.len() as i64
/// }
///
/// struct ByLen;
/// impl TypeHash<String> for ByLen {
///     const HASH: Option<HashFn<String>> = Some(by_len);
/// }
/// ```
pub trait TypeHash<K> {
    const HASH: Option<HashFn<K>>;
}

/// The default type-level policy: supplies no function, so the instance
/// configuration must.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTypeHash;

impl<K> TypeHash<K> for NoTypeHash {
    const HASH: Option<HashFn<K>> = None;
}

/// Hash function supplied per map instance.
pub enum InstanceHash<K> {
    Function(HashFn<K>),
    /// Arbitrary closure. Never considered equal to a type-level function.
    Closure(Rc<dyn Fn(&K) -> i64>),
}

impl<K> InstanceHash<K> {
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&K) -> i64 + 'static,
    {
        InstanceHash::Closure(Rc::new(f))
    }
}

impl<K> Clone for InstanceHash<K> {
    fn clone(&self) -> Self {
        match self {
            InstanceHash::Function(f) => InstanceHash::Function(*f),
            InstanceHash::Closure(f) => InstanceHash::Closure(Rc::clone(f)),
        }
    }
}

impl<K> fmt::Debug for InstanceHash<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceHash::Function(func) => f
                .debug_tuple("Function")
                .field(&(*func as *const ()))
                .finish(),
            InstanceHash::Closure(_) => f.write_str("Closure(..)"),
        }
    }
}

/// The resolved hash function of one map.
pub struct HashPolicy<K> {
    hash: InstanceHash<K>,
}

impl<K> Clone for HashPolicy<K> {
    fn clone(&self) -> Self {
        Self {
            hash: self.hash.clone(),
        }
    }
}

impl<K> HashPolicy<K> {
    pub fn resolve(
        type_hash: Option<HashFn<K>>,
        instance: Option<InstanceHash<K>>,
    ) -> Result<Self, MapError> {
        let hash = match (type_hash, instance) {
            (None, None) => return Err(MapError::MissingHashFunction),
            (Some(t), None) => InstanceHash::Function(t),
            (None, Some(i)) => i,
            (Some(t), Some(InstanceHash::Function(c))) => {
                if !core::ptr::fn_addr_eq(t, c) {
                    return Err(MapError::ConflictingHashFunctions);
                }
                InstanceHash::Function(t)
            }
            (Some(_), Some(InstanceHash::Closure(_))) => {
                return Err(MapError::ConflictingHashFunctions)
            }
        };
        Ok(Self { hash })
    }

    /// Policy backed by hashbrown's default `BuildHasher`, for keys that
    /// implement `Hash`.
    pub fn seeded() -> Self
    where
        K: Hash + 'static,
    {
        let builder = DefaultHashBuilder::default();
        Self {
            hash: InstanceHash::closure(move |k: &K| builder.hash_one(k) as i64),
        }
    }

    #[inline]
    pub fn hash(&self, key: &K) -> i64 {
        match &self.hash {
            InstanceHash::Function(f) => f(key),
            InstanceHash::Closure(f) => f(key),
        }
    }
}

impl<K> fmt::Debug for HashPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashPolicy").field("hash", &self.hash).finish()
    }
}

/// Map a raw hash into `[0, bins)`. `bins` must be non-zero.
#[inline]
pub fn compress(hash: i64, bins: usize) -> usize {
    debug_assert!(bins > 0, "compress with zero bins");
    (hash.unsigned_abs() % bins as u64) as usize
}
