//! Error type shared by the map, its configuration and its cursors.

use core::fmt;

/// Why a cursor cannot be dereferenced or erased through.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CursorFault {
    /// The cursor is past the last entry.
    Exhausted,
    /// The entry under the cursor was already erased through it.
    AlreadyErased,
}

/// Coarse classification of a [`MapError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Configuration,
    NotFound,
    InvalidCursor,
    ConcurrentModification,
    IncompatibleIterator,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MapError {
    /// Neither the key type's policy nor the configuration supplied a hash function.
    MissingHashFunction,
    /// Both supplied a hash function and they are not the same function.
    ConflictingHashFunctions,
    /// The initial bin count must be at least one.
    InvalidBinCount(usize),
    /// The load threshold must be finite and positive.
    InvalidLoadThreshold(f64),
    /// The key (rendered with `Debug`) is not in the map.
    KeyNotFound(String),
    InvalidCursor(CursorFault),
    /// The map changed structurally since the cursor last synchronized with it.
    ConcurrentModification { expected: u64, found: u64 },
    /// The cursor belongs to a different map instance.
    IncompatibleCursors,
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::MissingHashFunction
            | MapError::ConflictingHashFunctions
            | MapError::InvalidBinCount(_)
            | MapError::InvalidLoadThreshold(_) => ErrorKind::Configuration,
            MapError::KeyNotFound(_) => ErrorKind::NotFound,
            MapError::InvalidCursor(_) => ErrorKind::InvalidCursor,
            MapError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            MapError::IncompatibleCursors => ErrorKind::IncompatibleIterator,
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MissingHashFunction => f.write_str("no hash function specified"),
            MapError::ConflictingHashFunctions => f.write_str("conflicting hash functions"),
            MapError::InvalidBinCount(bins) => {
                write!(f, "initial bin count must be at least 1, got {bins}")
            }
            MapError::InvalidLoadThreshold(t) => {
                write!(f, "load threshold must be finite and positive, got {t}")
            }
            MapError::KeyNotFound(key) => write!(f, "key({key}) not in map"),
            MapError::InvalidCursor(CursorFault::Exhausted) => {
                f.write_str("cursor is past the last entry")
            }
            MapError::InvalidCursor(CursorFault::AlreadyErased) => {
                f.write_str("cursor entry already erased")
            }
            MapError::ConcurrentModification { expected, found } => write!(
                f,
                "map modified outside this cursor (expected mod_count {expected}, found {found})"
            ),
            MapError::IncompatibleCursors => {
                f.write_str("cursor used with a map it was not created from")
            }
        }
    }
}

impl std::error::Error for MapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_every_variant() {
        let cases = [
            (MapError::MissingHashFunction, ErrorKind::Configuration),
            (MapError::ConflictingHashFunctions, ErrorKind::Configuration),
            (MapError::InvalidBinCount(0), ErrorKind::Configuration),
            (MapError::InvalidLoadThreshold(-1.0), ErrorKind::Configuration),
            (MapError::KeyNotFound("\"k\"".into()), ErrorKind::NotFound),
            (
                MapError::InvalidCursor(CursorFault::Exhausted),
                ErrorKind::InvalidCursor,
            ),
            (
                MapError::ConcurrentModification {
                    expected: 1,
                    found: 2,
                },
                ErrorKind::ConcurrentModification,
            ),
            (MapError::IncompatibleCursors, ErrorKind::IncompatibleIterator),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn display_names_the_missing_key() {
        let err = MapError::KeyNotFound("\"zebra\"".to_string());
        assert_eq!(err.to_string(), "key(\"zebra\") not in map");
    }
}
