//! Construction parameters for `ChainedHashMap`.

use crate::error::MapError;
use crate::hash_policy::{HashFn, InstanceHash};

pub const DEFAULT_INITIAL_BINS: usize = 1;
pub const DEFAULT_LOAD_THRESHOLD: f64 = 1.0;

/// Builder for a map's bin count, load threshold and per-instance hash.
///
/// ```
/// use chained_hashmap::{ChainedHashMap, MapConfig};
///
/// fn h(k: &u32) -> i64 {
///     *k as i64
/// }
///
/// let map: ChainedHashMap<u32, &str> = ChainedHashMap::with_config(
///     MapConfig::new().with_initial_bins(8).with_load_threshold(0.75).with_hash(h),
/// )
/// .unwrap();
/// assert_eq!(map.bins(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct MapConfig<K> {
    pub(crate) initial_bins: usize,
    pub(crate) load_threshold: f64,
    pub(crate) hash: Option<InstanceHash<K>>,
}

impl<K> Default for MapConfig<K> {
    fn default() -> Self {
        Self {
            initial_bins: DEFAULT_INITIAL_BINS,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
            hash: None,
        }
    }
}

impl<K> MapConfig<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_bins(mut self, bins: usize) -> Self {
        self.initial_bins = bins;
        self
    }

    /// Maximum `len / bins` ratio tolerated after an insertion.
    pub fn with_load_threshold(mut self, threshold: f64) -> Self {
        self.load_threshold = threshold;
        self
    }

    pub fn with_hash(mut self, hash: HashFn<K>) -> Self {
        self.hash = Some(InstanceHash::Function(hash));
        self
    }

    pub fn with_hash_closure<F>(mut self, hash: F) -> Self
    where
        F: Fn(&K) -> i64 + 'static,
    {
        self.hash = Some(InstanceHash::closure(hash));
        self
    }

    pub fn initial_bins(&self) -> usize {
        self.initial_bins
    }

    pub fn load_threshold(&self) -> f64 {
        self.load_threshold
    }

    /// Check the numeric parameters; hash resolution happens separately.
    pub(crate) fn validate(&self) -> Result<(), MapError> {
        if self.initial_bins == 0 {
            return Err(MapError::InvalidBinCount(self.initial_bins));
        }
        if !self.load_threshold.is_finite() || self.load_threshold <= 0.0 {
            return Err(MapError::InvalidLoadThreshold(self.load_threshold));
        }
        Ok(())
    }
}
