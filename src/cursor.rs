//! Cursor: fail-fast, erase-capable position within a `ChainedHashMap`.
//!
//! A cursor does not borrow its map. It records which map created it, a
//! `(bin, pos)` position in bin-then-chain order, and the map's `mod_count`
//! at the time it last synchronized. Every operation receives the map
//! explicitly and checks, in order:
//! 1. the map is the one that created the cursor (`IncompatibleCursors`);
//! 2. the map has not changed structurally behind the cursor's back
//!    (`ConcurrentModification`).
//!
//! Erasing through the cursor re-synchronizes it, so a cursor can drain the
//! entries it visits. Any other structural change, including an erase through
//! another cursor, makes it stale.

use crate::chained_hash_map::{ChainedHashMap, MapId};
use crate::error::{CursorFault, MapError};
use core::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Position {
    At { bin: usize, pos: usize },
    /// The entry at `(bin, pos)` was erased through this cursor. Whatever
    /// followed it in traversal order is what `advance` moves to next.
    Erased { bin: usize, pos: usize },
    End,
}

#[derive(Clone, Debug)]
pub struct Cursor {
    owner: MapId,
    position: Position,
    expected_mod_count: u64,
}

impl Cursor {
    pub(crate) fn begin<K, V, T>(map: &ChainedHashMap<K, V, T>) -> Self {
        let position = match map.table().seek(0, 0) {
            Some((bin, pos)) => Position::At { bin, pos },
            None => Position::End,
        };
        Self {
            owner: map.id(),
            position,
            expected_mod_count: map.mod_count(),
        }
    }

    pub(crate) fn end<K, V, T>(map: &ChainedHashMap<K, V, T>) -> Self {
        Self {
            owner: map.id(),
            position: Position::End,
            expected_mod_count: map.mod_count(),
        }
    }

    fn check<K, V, T>(&self, map: &ChainedHashMap<K, V, T>) -> Result<(), MapError> {
        if map.id() != self.owner {
            return Err(MapError::IncompatibleCursors);
        }
        if map.mod_count() != self.expected_mod_count {
            return Err(MapError::ConcurrentModification {
                expected: self.expected_mod_count,
                found: map.mod_count(),
            });
        }
        Ok(())
    }

    /// Current `(bin, pos)`, or why there is no current entry.
    fn current(&self) -> Result<(usize, usize), MapError> {
        match self.position {
            Position::At { bin, pos } => Ok((bin, pos)),
            Position::Erased { .. } => Err(MapError::InvalidCursor(CursorFault::AlreadyErased)),
            Position::End => Err(MapError::InvalidCursor(CursorFault::Exhausted)),
        }
    }

    /// True once the cursor has moved past the last entry.
    pub fn is_end(&self) -> bool {
        self.position == Position::End
    }

    /// Move to the next entry. After an erase this lands on the entry that
    /// followed the erased one; at the end it stays put.
    pub fn advance<K, V, T>(&mut self, map: &ChainedHashMap<K, V, T>) -> Result<(), MapError> {
        self.check(map)?;
        let next = match self.position {
            Position::End => None,
            Position::At { bin, pos } => map.table().seek(bin, pos + 1),
            Position::Erased { bin, pos } => map.table().seek(bin, pos),
        };
        self.position = match next {
            Some((bin, pos)) => Position::At { bin, pos },
            None => Position::End,
        };
        Ok(())
    }

    pub fn entry<'m, K, V, T>(
        &self,
        map: &'m ChainedHashMap<K, V, T>,
    ) -> Result<(&'m K, &'m V), MapError> {
        self.check(map)?;
        let (bin, pos) = self.current()?;
        map.table()
            .entry_at(bin, pos)
            .map(|e| (&e.key, &e.value))
            .ok_or(MapError::InvalidCursor(CursorFault::Exhausted))
    }

    pub fn key<'m, K, V, T>(&self, map: &'m ChainedHashMap<K, V, T>) -> Result<&'m K, MapError> {
        self.entry(map).map(|(k, _)| k)
    }

    pub fn value<'m, K, V, T>(&self, map: &'m ChainedHashMap<K, V, T>) -> Result<&'m V, MapError> {
        self.entry(map).map(|(_, v)| v)
    }

    /// Mutable access to the current value. Not a structural change.
    pub fn value_mut<'m, K, V, T>(
        &self,
        map: &'m mut ChainedHashMap<K, V, T>,
    ) -> Result<&'m mut V, MapError> {
        self.check(map)?;
        let (bin, pos) = self.current()?;
        map.value_at_mut(bin, pos)
            .ok_or(MapError::InvalidCursor(CursorFault::Exhausted))
    }

    /// Remove the current entry and return it. The cursor stays valid and
    /// the next `advance` moves to the entry after the removed one.
    pub fn erase<K, V, T>(&mut self, map: &mut ChainedHashMap<K, V, T>) -> Result<(K, V), MapError> {
        self.check(map)?;
        let (bin, pos) = self.current()?;
        let removed = map
            .erase_at(bin, pos)
            .ok_or(MapError::InvalidCursor(CursorFault::Exhausted))?;
        self.expected_mod_count = map.mod_count();
        self.position = Position::Erased { bin, pos };
        Ok(removed)
    }

    /// Position equality. Cursors from different maps are not comparable.
    pub fn try_eq(&self, other: &Cursor) -> Result<bool, MapError> {
        if self.owner != other.owner {
            return Err(MapError::IncompatibleCursors);
        }
        Ok(self.position == other.position)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Position::At { bin, pos } => write!(f, "Cursor(bin={bin},pos={pos}")?,
            Position::Erased { bin, pos } => write!(f, "Cursor(erased,bin={bin},pos={pos}")?,
            Position::End => f.write_str("Cursor(end")?,
        }
        write!(f, ",expected_mod_count={})", self.expected_mod_count)
    }
}
