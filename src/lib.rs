//! chained-hashmap: a single-threaded, separate-chaining hash map with a
//! pluggable hash function, deterministic growth, and fail-fast cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a chained map whose rehash, load bound and cursor semantics are
//!   each small enough to check in isolation.
//! - Layers:
//!   - HashPolicy<K>: resolves the hash function once, from the type-level
//!     policy `T: TypeHash<K>` and/or the instance `MapConfig`, and maps
//!     raw hashes into bins (`|h| mod bins`).
//!   - BucketTable<K, V>: entries in a `SlotMap`, one chain of entry keys
//!     per bin; find/insert/remove/clear and the doubling rebuild.
//!   - ChainedHashMap<K, V, T>: public API; owns the policy, the table and
//!     the modification counter.
//!   - Cursor: detached position + counter snapshot; reports stale use
//!     instead of reading a changed table.
//!
//! Constraints
//! - Single-threaded: the map is `!Send`/`!Sync`.
//! - `bins >= 1` always; after every insertion `len / bins <= load_threshold`.
//! - Bins double on growth and never shrink; `clear()` keeps the bin count.
//! - Each entry stores the raw hash it was inserted with; rehashing
//!   recompresses stored hashes and never calls the hash function.
//!
//! Modification counter
//! - Bumped once per new key, removal, clear and rehash. A rehash triggered
//!   by an insertion counts separately from the insertion itself.
//! - Overwriting a value (via `put`, `get_mut`, `iter_mut` or
//!   `Cursor::value_mut`) is not structural.
//!
//! Iteration
//! - `iter`/`iter_mut`/`keys`/`values`/`into_iter` borrow the map, so the
//!   borrow checker already rules out mutation during iteration.
//! - `Cursor` does not borrow; it supports erase-while-iterating and
//!   multiple outstanding cursors, and checks owner identity and the counter
//!   snapshot on every call.
//!
//! Reentrancy policy
//! - BucketTable calls user `PartialEq` while scanning chains. A debug-only
//!   guard panics if that code re-enters the same table; release builds
//!   compile the guard away.
//!
//! Notes and non-goals
//! - No concurrent map, no open addressing, no serialization.
//! - `put` returns the previous value (`None` when the key was new).

#[cfg(feature = "bench_internal")]
pub mod bucket_table;
#[cfg(not(feature = "bench_internal"))]
mod bucket_table;
mod chained_hash_map;
#[cfg(test)]
mod chained_hash_map_proptest;
pub mod config;
mod cursor;
mod error;
pub mod hash_policy;
mod reentrancy;

// Public surface
pub use chained_hash_map::{ChainedHashMap, IntoIter, Iter, IterMut, Keys, Values};
pub use config::MapConfig;
pub use cursor::Cursor;
pub use error::{CursorFault, ErrorKind, MapError};
pub use hash_policy::{HashFn, InstanceHash, NoTypeHash, TypeHash};
