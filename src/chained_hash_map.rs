//! ChainedHashMap: the public map. Wires a resolved `HashPolicy` to a
//! `BucketTable`, owns the modification counter, and hands out cursors.

use crate::bucket_table::{BucketTable, Entry, EntryKey};
use crate::config::{MapConfig, DEFAULT_INITIAL_BINS, DEFAULT_LOAD_THRESHOLD};
use crate::cursor::Cursor;
use crate::error::MapError;
use crate::hash_policy::{HashFn, HashPolicy, NoTypeHash, TypeHash};
use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use core::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one map instance. Clones get a fresh identity; moves keep it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct MapId(u64);

impl MapId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        MapId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Separate-chaining hash map with a pluggable hash function.
///
/// `T` is the type-level hash policy; with the default `NoTypeHash` the hash
/// function must come from the [`MapConfig`].
pub struct ChainedHashMap<K, V, T = NoTypeHash> {
    id: MapId,
    policy: HashPolicy<K>,
    table: BucketTable<K, V>,
    mod_count: u64,
    _type_hash: PhantomData<fn() -> T>,
}

impl<K, V, T> ChainedHashMap<K, V, T>
where
    T: TypeHash<K>,
{
    /// Map hashed by `T::HASH` alone, with one bin and a load threshold of 1.0.
    pub fn try_new() -> Result<Self, MapError> {
        Self::with_config(MapConfig::new())
    }

    pub fn with_hash(hash: HashFn<K>) -> Result<Self, MapError> {
        Self::with_config(MapConfig::new().with_hash(hash))
    }

    pub fn with_config(config: MapConfig<K>) -> Result<Self, MapError> {
        config.validate()?;
        let policy = HashPolicy::resolve(T::HASH, config.hash)?;
        Ok(Self::from_parts(
            policy,
            config.initial_bins,
            config.load_threshold,
        ))
    }

    /// Build a map and drain `entries` into it.
    pub fn from_entries<I>(config: MapConfig<K>, entries: I) -> Result<Self, MapError>
    where
        K: PartialEq,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_config(config)?;
        map.put_all(entries);
        Ok(map)
    }
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Hash + 'static,
{
    /// Map hashed with hashbrown's default `BuildHasher`.
    pub fn with_default_hasher() -> Self {
        Self::from_parts(
            HashPolicy::seeded(),
            DEFAULT_INITIAL_BINS,
            DEFAULT_LOAD_THRESHOLD,
        )
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Hash + 'static,
{
    fn default() -> Self {
        Self::with_default_hasher()
    }
}

impl<K, V, T> ChainedHashMap<K, V, T> {
    fn from_parts(policy: HashPolicy<K>, bins: usize, load_threshold: f64) -> Self {
        Self {
            id: MapId::fresh(),
            policy,
            table: BucketTable::with_bins(bins, load_threshold),
            mod_count: 0,
            _type_hash: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bins(&self) -> usize {
        self.table.bins()
    }

    pub fn load_threshold(&self) -> f64 {
        self.table.load_threshold()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Number of structural changes so far: new keys, removals, clears and
    /// rehashes. Replacing the value of an existing key does not count.
    pub fn mod_count(&self) -> u64 {
        self.mod_count
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.mod_count += 1;
    }

    /// Fail-fast cursor at the first entry in bin order.
    pub fn cursor(&self) -> Cursor {
        Cursor::begin(self)
    }

    pub fn cursor_end(&self) -> Cursor {
        Cursor::end(self)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { it: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { it: self.iter() }
    }

    /// Bin-by-bin rendering of the table, for debugging.
    pub fn layout(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut out = String::from("ChainedHashMap[\n");
        for (bin, chain) in self.table.chains().iter().enumerate() {
            out.push_str(&format!("  bin[{bin}]:"));
            for e in chain.iter().filter_map(|&ek| self.table.entry(ek)) {
                out.push_str(&format!(" {}->{} ->", e.key, e.value));
            }
            out.push_str(" #\n");
        }
        out.push_str(&format!(
            "](bins={},used={},load_threshold={},mod_count={})",
            self.bins(),
            self.len(),
            self.load_threshold(),
            self.mod_count
        ));
        out
    }

    pub(crate) fn id(&self) -> MapId {
        self.id
    }

    pub(crate) fn table(&self) -> &BucketTable<K, V> {
        &self.table
    }

    pub(crate) fn value_at_mut(&mut self, bin: usize, pos: usize) -> Option<&mut V> {
        self.table.entry_at_mut(bin, pos).map(|e| &mut e.value)
    }

    /// Positional erase on behalf of a cursor; a structural change like any other.
    pub(crate) fn erase_at(&mut self, bin: usize, pos: usize) -> Option<(K, V)> {
        let removed = self.table.remove_at(bin, pos)?;
        self.mod_count += 1;
        Some(removed)
    }

    /// Prepend a key known to be absent, then grow if the load bound broke.
    fn insert_absent(&mut self, hash: i64, key: K, value: V) -> EntryKey {
        let ek = self.table.insert_new(hash, key, value);
        self.mod_count += 1;
        if self.table.grow() {
            self.mod_count += 1;
        }
        ek
    }
}

impl<K, V, T> ChainedHashMap<K, V, T>
where
    K: PartialEq,
{
    pub fn has_key(&self, key: &K) -> bool {
        self.table.find(self.policy.hash(key), key).is_some()
    }

    /// Linear in the number of entries.
    pub fn has_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.contains_value(value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let ek = self.table.find(self.policy.hash(key), key)?;
        self.table.entry(ek).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let ek = self.table.find(self.policy.hash(key), key)?;
        self.table.entry_mut(ek).map(|e| &mut e.value)
    }

    /// Insert or overwrite. Returns the previous value, or `None` if `key`
    /// was not present. Overwriting is not a structural change.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.policy.hash(&key);
        if let Some(entry) = self
            .table
            .find(hash, &key)
            .and_then(|ek| self.table.entry_mut(ek))
        {
            return Some(core::mem::replace(&mut entry.value, value));
        }
        self.insert_absent(hash, key, value);
        None
    }

    /// `put` every pair; returns how many pairs were consumed.
    pub fn put_all<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut count = 0;
        for (key, value) in entries {
            self.put(key, value);
            count += 1;
        }
        count
    }

    /// Mutable access to `key`'s value, inserting `V::default()` first when
    /// the key is missing (which may trigger a rehash).
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let hash = self.policy.hash(&key);
        let ek = match self.table.find(hash, &key) {
            Some(ek) => ek,
            None => self.insert_absent(hash, key, V::default()),
        };
        &mut self
            .table
            .entry_mut(ek)
            .expect("entry key must stay valid across rehash")
            .value
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let removed = self.table.remove(self.policy.hash(key), key)?;
        self.mod_count += 1;
        Some(removed)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Like `remove`, but a missing key is an error naming the key.
    pub fn erase(&mut self, key: &K) -> Result<V, MapError>
    where
        K: fmt::Debug,
    {
        self.remove(key)
            .ok_or_else(|| MapError::KeyNotFound(format!("{key:?}")))
    }
}

impl<K, V, T> Clone for ChainedHashMap<K, V, T>
where
    K: Clone,
    V: Clone,
{
    /// Copies bins and entries as they are, without rehashing. The copy is a
    /// separate instance: cursors of the source map do not work on it.
    fn clone(&self) -> Self {
        Self {
            id: MapId::fresh(),
            policy: self.policy.clone(),
            table: self.table.clone(),
            mod_count: 0,
            _type_hash: PhantomData,
        }
    }
}

/// Equal when both hold the same keys with equal values, regardless of bin
/// counts or hash functions.
impl<K, V, T> PartialEq for ChainedHashMap<K, V, T>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, T> Eq for ChainedHashMap<K, V, T>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V, T> Index<&K> for ChainedHashMap<K, V, T>
where
    K: PartialEq,
{
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not present in ChainedHashMap")
    }
}

impl<K, V, T> Extend<(K, V)> for ChainedHashMap<K, V, T>
where
    K: PartialEq,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: Hash + PartialEq + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_default_hasher();
        map.put_all(iter);
        map
    }
}

/// `map[k1->v1,k2->v2]`, in iteration order.
impl<K, V, T> fmt::Display for ChainedHashMap<K, V, T>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("map[")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}->{v}")?;
        }
        f.write_str("]")
    }
}

impl<K, V, T> fmt::Debug for ChainedHashMap<K, V, T>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)`. Order is unspecified.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, EntryKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, EntryKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct IntoIter<K, V> {
    it: slotmap::basic::IntoIter<EntryKey, Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Keys<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }
}

pub struct Values<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }
}

impl<'a, K, V, T> IntoIterator for &'a ChainedHashMap<K, V, T> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, T> IntoIterator for &'a mut ChainedHashMap<K, V, T> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, T> IntoIterator for ChainedHashMap<K, V, T> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.table.into_entries(),
        }
    }
}
