//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// A plain index into the [`StringInterner`](crate::StringInterner) string
/// table. Equality and hashing are O(1) integer operations.
///
/// The first few indices are reserved for names every pass needs; the
/// interner pre-interns them in exactly this order (see
/// [`Name::PREINTERNED`]).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string. Also the "no parent" sentinel of the root class.
    pub const EMPTY: Name = Name(0);
    /// The root of every inheritance chain.
    pub const OBJECT: Name = Name(1);
    /// The built-in string class.
    pub const STRING: Name = Name(2);
    /// The built-in runtime class-identity class.
    pub const CLASS: Name = Name(3);
    /// The program entry point. Never mangled.
    pub const MAIN: Name = Name(4);
    /// `array.length`.
    pub const LENGTH: Name = Name(5);
    /// `System` in `System.out.println(..)`.
    pub const SYSTEM: Name = Name(6);
    /// `out` in `System.out.println(..)`.
    pub const OUT: Name = Name(7);
    pub const PRINTLN: Name = Name(8);
    pub const PRINT: Name = Name(9);
    /// The explicit receiver parameter threaded into every instance routine.
    pub const SELF_PARAM: Name = Name(10);
    /// Name of the two-phase initialization routine.
    pub const INIT: Name = Name(11);

    /// Strings backing the reserved names, indexed by `Name::raw()`.
    pub const PREINTERNED: [&'static str; 12] = [
        "", "Object", "String", "Class", "main", "length", "System", "out", "println", "print",
        "__this", "__init",
    ];

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` for the empty-string sentinel.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::PREINTERNED.get(self.index()) {
            Some(s) => write!(f, "Name({s:?})"),
            None => write!(f, "Name({})", self.0),
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_empty() {
        assert!(Name::EMPTY.is_empty());
        assert!(!Name::OBJECT.is_empty());
        assert_eq!(Name::default(), Name::EMPTY);
    }

    #[test]
    fn test_reserved_names_line_up() {
        assert_eq!(Name::PREINTERNED[Name::OBJECT.index()], "Object");
        assert_eq!(Name::PREINTERNED[Name::MAIN.index()], "main");
        assert_eq!(Name::PREINTERNED[Name::SELF_PARAM.index()], "__this");
        assert_eq!(Name::PREINTERNED[Name::INIT.index()], "__init");
    }

    #[test]
    fn test_name_debug_shows_reserved_text() {
        assert_eq!(format!("{:?}", Name::STRING), "Name(\"String\")");
        assert_eq!(format!("{:?}", Name::from_raw(500)), "Name(500)");
    }
}
