//! Arena indices and ranges.
//!
//! The AST and the lowered IR are both flat: nodes refer to children by
//! `u32` index into their arena, and lists are `(start, len)` windows into a
//! shared flattened vector. The two index spaces are distinct types so a
//! source `ExprId` can never be used to index the lowered arena.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for an absent child (no initializer, no else branch, implicit receiver).
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            /// `None` for the sentinel.
            #[inline]
            pub const fn valid(self) -> Option<Self> {
                if self.is_valid() {
                    Some(self)
                } else {
                    None
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    write!(f, concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
        pub struct $name {
            pub start: u32,
            pub len: u16,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u16) -> Self {
                $name { start, len }
            }

            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            /// Window into the flattened list storage.
            #[inline]
            pub fn window(&self) -> std::ops::Range<usize> {
                let start = self.start as usize;
                start..start + self.len()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}..{})"),
                    self.start,
                    self.start + u32::from(self.len)
                )
            }
        }
    };
}

define_id!(
    /// Index into the source expression arena.
    ExprId
);
define_id!(
    /// Index into the source statement arena.
    StmtId
);
define_id!(
    /// Index into the lowered expression arena.
    LowId
);
define_id!(
    /// Index into the lowered statement arena.
    LowStmtId
);

define_range!(
    /// Range of source expressions (call arguments, array dimensions).
    ExprRange
);
define_range!(
    /// Range of source statements (block bodies).
    StmtRange
);
define_range!(
    /// Range of lowered expressions.
    LowRange
);
define_range!(
    /// Range of lowered statements.
    LowStmtRange
);

/// Convert a length to `u32`, panicking with context on overflow.
///
/// Arenas beyond 4 billion nodes are not a supported configuration.
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len}"))
}

/// Convert a list length to `u16`, panicking with context on overflow.
pub(crate) fn to_u16(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("{what} too long: {len} items"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_valid() {
        let id = ExprId::new(42);
        assert!(id.is_valid());
        assert_eq!(id.index(), 42);
        assert_eq!(id.valid(), Some(id));
    }

    #[test]
    fn test_id_invalid() {
        assert!(!LowId::INVALID.is_valid());
        assert!(!LowId::default().is_valid());
        assert_eq!(StmtId::INVALID.valid(), None);
        assert_eq!(format!("{:?}", ExprId::INVALID), "ExprId::INVALID");
    }

    #[test]
    fn test_range_window() {
        let range = ExprRange::new(10, 3);
        assert_eq!(range.window(), 10..13);
        assert_eq!(range.len(), 3);
        assert!(LowRange::EMPTY.is_empty());
    }
}
