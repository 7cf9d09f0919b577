//! Source-level types.
//!
//! The language has no generics, so a type is a primitive, a class name, or
//! an array of another type. `Null` is the type of the `null` literal only.

use crate::Name;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// A class type, by simple name.
    Class(Name),
    /// Array of the element type.
    Array(Box<Ty>),
    /// Type of the `null` literal; assignable to every reference type.
    Null,
}

impl Ty {
    /// The `String` class type.
    pub const STRING: Ty = Ty::Class(Name::STRING);
    /// The `Object` class type.
    pub const OBJECT: Ty = Ty::Class(Name::OBJECT);

    /// Wrap `elem` in `dims` levels of array.
    pub fn array_of(elem: Ty, dims: usize) -> Ty {
        (0..dims).fold(elem, |ty, _| Ty::Array(Box::new(ty)))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Ty::Boolean
                | Ty::Byte
                | Ty::Char
                | Ty::Short
                | Ty::Int
                | Ty::Long
                | Ty::Float
                | Ty::Double
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Reference types hold a pointer at runtime.
    pub fn is_reference(&self) -> bool {
        matches!(self, Ty::Class(_) | Ty::Array(_) | Ty::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array(_))
    }

    pub fn class_name(&self) -> Option<Name> {
        match self {
            Ty::Class(name) => Some(*name),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&Ty> {
        match self {
            Ty::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Number of array dimensions (0 for non-arrays).
    pub fn dims(&self) -> usize {
        match self {
            Ty::Array(elem) => 1 + elem.dims(),
            _ => 0,
        }
    }

    /// Innermost non-array type.
    pub fn base(&self) -> &Ty {
        match self {
            Ty::Array(elem) => elem.base(),
            other => other,
        }
    }

    /// Position on the primitive widening ladder.
    ///
    /// `byte < short < int < long < float < double`; `char` widens to `int`
    /// and above but not to `short`, which is handled in
    /// [`widens_to`](Ty::widens_to).
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            Ty::Byte => Some(0),
            Ty::Short | Ty::Char => Some(1),
            Ty::Int => Some(2),
            Ty::Long => Some(3),
            Ty::Float => Some(4),
            Ty::Double => Some(5),
            _ => None,
        }
    }

    /// Identity or primitive widening conversion.
    pub fn widens_to(&self, target: &Ty) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            (Ty::Char, Ty::Short) | (Ty::Byte | Ty::Short, Ty::Char) => false,
            _ => match (self.numeric_rank(), target.numeric_rank()) {
                (Some(from), Some(to)) => from < to,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_and_dims() {
        let ty = Ty::array_of(Ty::Int, 2);
        assert_eq!(ty.dims(), 2);
        assert_eq!(ty.base(), &Ty::Int);
        assert_eq!(ty.element(), Some(&Ty::Array(Box::new(Ty::Int))));
    }

    #[test]
    fn test_widening() {
        assert!(Ty::Int.widens_to(&Ty::Long));
        assert!(Ty::Char.widens_to(&Ty::Int));
        assert!(!Ty::Char.widens_to(&Ty::Short));
        assert!(!Ty::Byte.widens_to(&Ty::Char));
        assert!(!Ty::Long.widens_to(&Ty::Int));
        assert!(!Ty::Boolean.widens_to(&Ty::Int));
    }

    #[test]
    fn test_reference_classification() {
        assert!(Ty::STRING.is_reference());
        assert!(Ty::Null.is_reference());
        assert!(!Ty::Int.is_reference());
        assert!(Ty::array_of(Ty::Int, 1).is_reference());
    }
}
