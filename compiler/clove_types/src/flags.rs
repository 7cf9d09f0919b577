//! Method property flags.
//!
//! Computed once when the class table is built so dispatch classification
//! and vtable construction never re-derive them from modifiers.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodFlags: u8 {
        const STATIC = 1 << 0;
        /// Occupies a vtable slot: not static, not private, not a constructor.
        const VIRTUAL = 1 << 1;
        /// Rebinds a slot introduced by an ancestor.
        const OVERRIDE = 1 << 2;
        const CONSTRUCTOR = 1 << 3;
        const PRIVATE = 1 << 4;
        const FINAL = 1 << 5;
        /// Static `main`: the program entry point.
        const ENTRY = 1 << 6;
    }
}

impl MethodFlags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    #[inline]
    pub fn is_virtual(self) -> bool {
        self.contains(Self::VIRTUAL)
    }

    #[inline]
    pub fn is_constructor(self) -> bool {
        self.contains(Self::CONSTRUCTOR)
    }

    #[inline]
    pub fn is_entry(self) -> bool {
        self.contains(Self::ENTRY)
    }
}
