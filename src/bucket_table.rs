//! BucketTable: separate-chaining structure with slotmap-backed storage.
//!
//! Entries live in a `SlotMap` and never move once inserted; each bin holds a
//! chain of `EntryKey`s. The table is handed precomputed hashes by its
//! owner and never calls a hash function itself: every entry keeps the raw
//! hash it was inserted with, and `rebuild` recompresses that stored value.
//!
//! Invariant: every entry key appears in exactly one chain, the one at
//! `compress(entry.hash, bins)`. Only `rebuild` breaks this, and it restores
//! it before returning.

use crate::hash_policy::compress;
use crate::reentrancy::ReentrancyCheck;
use slotmap::SlotMap;
use std::collections::VecDeque;

slotmap::new_key_type! {
    /// Generational key of one entry in the table's storage.
    pub struct EntryKey;
}

#[derive(Clone, Debug)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
    hash: i64,
}

impl<K, V> Entry<K, V> {
    /// The raw hash this entry was inserted with.
    pub fn hash(&self) -> i64 {
        self.hash
    }
}

/// Entry keys sharing one bin, most recently inserted first.
pub type Chain = VecDeque<EntryKey>;

#[derive(Clone, Debug)]
pub struct BucketTable<K, V> {
    slots: SlotMap<EntryKey, Entry<K, V>>,
    chains: Vec<Chain>,
    load_threshold: f64,
    reentrancy: ReentrancyCheck,
}

fn empty_chains(bins: usize) -> Vec<Chain> {
    std::iter::repeat_with(Chain::new).take(bins).collect()
}

impl<K, V> BucketTable<K, V> {
    /// `bins` must be at least 1 and `load_threshold` positive; the map's
    /// configuration validates both.
    pub fn with_bins(bins: usize, load_threshold: f64) -> Self {
        debug_assert!(bins > 0, "BucketTable needs at least one bin");
        Self {
            slots: SlotMap::with_key(),
            chains: empty_chains(bins),
            load_threshold,
            reentrancy: ReentrancyCheck::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.chains.len()
    }

    pub fn load_threshold(&self) -> f64 {
        self.load_threshold
    }

    pub fn load_factor(&self) -> f64 {
        self.slots.len() as f64 / self.chains.len() as f64
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn entry(&self, key: EntryKey) -> Option<&Entry<K, V>> {
        self.slots.get(key)
    }

    pub fn entry_mut(&mut self, key: EntryKey) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(key)
    }

    pub fn entry_at(&self, bin: usize, pos: usize) -> Option<&Entry<K, V>> {
        let key = *self.chains.get(bin)?.get(pos)?;
        self.slots.get(key)
    }

    pub fn entry_at_mut(&mut self, bin: usize, pos: usize) -> Option<&mut Entry<K, V>> {
        let key = *self.chains.get(bin)?.get(pos)?;
        self.slots.get_mut(key)
    }

    /// First occupied position at or after `(bin, pos)`, scanning the rest of
    /// `bin`'s chain and then later bins in ascending order.
    pub fn seek(&self, bin: usize, pos: usize) -> Option<(usize, usize)> {
        let chain = self.chains.get(bin)?;
        if pos < chain.len() {
            return Some((bin, pos));
        }
        self.chains
            .iter()
            .enumerate()
            .skip(bin + 1)
            .find(|(_, c)| !c.is_empty())
            .map(|(b, _)| (b, 0))
    }

    pub fn find(&self, hash: i64, key: &K) -> Option<EntryKey>
    where
        K: PartialEq,
    {
        let _s = self.reentrancy.enter("find");
        let bin = compress(hash, self.chains.len());
        self.chains[bin]
            .iter()
            .copied()
            .find(|&ek| self.slots.get(ek).is_some_and(|e| e.key == *key))
    }

    /// Prepend a new entry to its bin. The caller has already checked that
    /// `key` is absent.
    pub fn insert_new(&mut self, hash: i64, key: K, value: V) -> EntryKey {
        let _s = self.reentrancy.enter("insert_new");
        let bin = compress(hash, self.chains.len());
        let ek = self.slots.insert(Entry { key, value, hash });
        self.chains[bin].push_front(ek);
        ek
    }

    pub fn remove(&mut self, hash: i64, key: &K) -> Option<(K, V)>
    where
        K: PartialEq,
    {
        let _s = self.reentrancy.enter("remove");
        let bin = compress(hash, self.chains.len());
        let pos = self.chains[bin]
            .iter()
            .position(|&ek| self.slots.get(ek).is_some_and(|e| e.key == *key))?;
        let ek = self.chains[bin].remove(pos)?;
        self.slots.remove(ek).map(|e| (e.key, e.value))
    }

    /// Unlink the entry at chain position `pos` of `bin`.
    pub fn remove_at(&mut self, bin: usize, pos: usize) -> Option<(K, V)> {
        let _s = self.reentrancy.enter("remove_at");
        let ek = self.chains.get_mut(bin)?.remove(pos)?;
        self.slots.remove(ek).map(|e| (e.key, e.value))
    }

    /// Linear scan of every chain in every bin.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _s = self.reentrancy.enter("contains_value");
        self.chains
            .iter()
            .flatten()
            .any(|&ek| self.slots.get(ek).is_some_and(|e| e.value == *value))
    }

    /// Remove every entry; the bin count is kept.
    pub fn clear(&mut self) {
        for chain in &mut self.chains {
            chain.clear();
        }
        // Entries drop after the structure is already empty.
        let old = std::mem::take(&mut self.slots);
        log::trace!("clear: dropping {} entries, keeping {} bins", old.len(), self.chains.len());
        drop(old);
    }

    pub fn over_threshold(&self) -> bool {
        self.load_factor() > self.load_threshold
    }

    /// Double the bin count until `len / bins <= load_threshold`, relocating
    /// entries in a single rebuild. Returns whether the table was rebuilt.
    pub fn grow(&mut self) -> bool {
        if !self.over_threshold() {
            return false;
        }
        let mut bins = self.chains.len();
        while self.slots.len() as f64 / bins as f64 > self.load_threshold {
            bins = bins.checked_mul(2).expect("bin count overflow while growing");
        }
        self.rebuild(bins);
        true
    }

    /// Redistribute every entry into `new_bins` fresh chains. Only entry
    /// keys move; the entries themselves stay where they are in storage.
    pub fn rebuild(&mut self, new_bins: usize) {
        let _s = self.reentrancy.enter("rebuild");
        debug_assert!(new_bins > 0, "rebuild with zero bins");
        let old_bins = self.chains.len();
        let mut chains = empty_chains(new_bins);
        for ek in self.chains.drain(..).flatten() {
            let bin = compress(self.slots[ek].hash(), new_bins);
            chains[bin].push_front(ek);
        }
        self.chains = chains;
        log::debug!(
            "rehash: {} entries from {} to {} bins",
            self.slots.len(),
            old_bins,
            new_bins
        );
    }

    pub fn iter(&self) -> slotmap::basic::Iter<'_, EntryKey, Entry<K, V>> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> slotmap::basic::IterMut<'_, EntryKey, Entry<K, V>> {
        self.slots.iter_mut()
    }

    pub fn into_entries(self) -> slotmap::basic::IntoIter<EntryKey, Entry<K, V>> {
        self.slots.into_iter()
    }

    /// Panics unless every entry is chained exactly once, in the bin its
    /// stored hash compresses to.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        use std::collections::HashSet;

        let bins = self.chains.len();
        assert!(bins >= 1, "table has no bins");
        let mut seen: HashSet<EntryKey> = HashSet::new();
        for (bin, chain) in self.chains.iter().enumerate() {
            for &ek in chain {
                let e = self.slots.get(ek).expect("chain references a live entry");
                assert_eq!(compress(e.hash, bins), bin, "entry chained in the wrong bin");
                assert!(seen.insert(ek), "entry chained twice");
            }
        }
        assert_eq!(seen.len(), self.slots.len(), "unchained entries in storage");
    }
}
