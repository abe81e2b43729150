//! Access flags and visibility levels for classes, fields and methods.
//!
//! The JVM encodes visibility in three mutually exclusive bits (`ACC_PUBLIC`, `ACC_PRIVATE`,
//! `ACC_PROTECTED`); the absence of all three is package-private ("default") access.
//! [`Visibility`] lifts that encoding into an ordered enum so that widening rules can be
//! written as plain comparisons.

use bitflags::bitflags;
use strum::{Display, EnumIter};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Access flags as stored in class, field and method structures.
    ///
    /// Several bits are overloaded depending on where they appear (e.g. `0x0020` is
    /// `ACC_SUPER` on a class and `ACC_SYNCHRONIZED` on a method); the member-specific aliases
    /// are provided as associated constants.
    pub struct AccessFlags: u16 {
        /// Declared public; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared private; accessible only within the defining class.
        const PRIVATE = 0x0002;
        /// Declared protected; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared static.
        const STATIC = 0x0008;
        /// Declared final; no subclasses, overrides or assignment after initialization.
        const FINAL = 0x0010;
        /// Class: treat superclass methods specially when invoked by `invokespecial`.
        const SUPER = 0x0020;
        /// Field: declared volatile. Method: bridge method.
        const VOLATILE = 0x0040;
        /// Field: declared transient. Method: declared with variable arity.
        const TRANSIENT = 0x0080;
        /// Method: declared native.
        const NATIVE = 0x0100;
        /// Class: is an interface.
        const INTERFACE = 0x0200;
        /// Declared abstract.
        const ABSTRACT = 0x0400;
        /// Method: floating-point mode is FP-strict.
        const STRICT = 0x0800;
        /// Not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Class: declared as an annotation interface.
        const ANNOTATION = 0x2000;
        /// Declared as an enum class or enum constant.
        const ENUM = 0x4000;
        /// Class: is a module, not a class or interface.
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Method alias of [`AccessFlags::SUPER`].
    pub const SYNCHRONIZED: AccessFlags = AccessFlags::SUPER;
    /// Method alias of [`AccessFlags::VOLATILE`].
    pub const BRIDGE: AccessFlags = AccessFlags::VOLATILE;
    /// Method alias of [`AccessFlags::TRANSIENT`].
    pub const VARARGS: AccessFlags = AccessFlags::TRANSIENT;

    /// The three visibility bits.
    pub const VISIBILITY_MASK: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::PRIVATE)
        .union(AccessFlags::PROTECTED);

    /// The bits access reconciliation compares and edits.
    pub const RECONCILED_MASK: AccessFlags = AccessFlags::VISIBILITY_MASK.union(AccessFlags::FINAL);

    /// Returns the visibility encoded in these flags.
    #[must_use]
    pub fn visibility(self) -> Visibility {
        Visibility::from_access_flags(self)
    }

    /// Returns these flags with the visibility bits replaced by `visibility`.
    #[must_use]
    pub fn with_visibility(self, visibility: Visibility) -> AccessFlags {
        self.difference(AccessFlags::VISIBILITY_MASK)
            .union(visibility.to_access_flags())
    }

    /// Returns `true` if the `ACC_STATIC` bit is set.
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    /// Returns `true` if the `ACC_FINAL` bit is set.
    #[must_use]
    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }
}

/// Visibility level of a type or member, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Visibility {
    /// `ACC_PRIVATE`
    #[strum(serialize = "private")]
    Private,
    /// No visibility bit: package-private
    #[strum(serialize = "default")]
    Default,
    /// `ACC_PROTECTED`
    #[strum(serialize = "protected")]
    Protected,
    /// `ACC_PUBLIC`
    #[strum(serialize = "public")]
    Public,
}

impl Visibility {
    /// Extracts the visibility from raw access flags.
    ///
    /// Class files with more than one visibility bit are invalid; the widest bit present wins.
    #[must_use]
    pub fn from_access_flags(flags: AccessFlags) -> Visibility {
        if flags.contains(AccessFlags::PUBLIC) {
            Visibility::Public
        } else if flags.contains(AccessFlags::PROTECTED) {
            Visibility::Protected
        } else if flags.contains(AccessFlags::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::Default
        }
    }

    /// Returns the single access flag bit encoding this visibility (empty for default).
    #[must_use]
    pub fn to_access_flags(self) -> AccessFlags {
        match self {
            Visibility::Private => AccessFlags::PRIVATE,
            Visibility::Default => AccessFlags::empty(),
            Visibility::Protected => AccessFlags::PROTECTED,
            Visibility::Public => AccessFlags::PUBLIC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn visibility_order() {
        let ordered: Vec<Visibility> = Visibility::iter().collect();
        assert!(ordered.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(Visibility::Private.max(Visibility::Protected), Visibility::Protected);
    }

    #[test]
    fn visibility_round_trip_on_flags() {
        let flags = AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::FINAL;
        assert_eq!(flags.visibility(), Visibility::Private);

        let widened = flags.with_visibility(Visibility::Public);
        assert_eq!(
            widened,
            AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL
        );

        let package = widened.with_visibility(Visibility::Default);
        assert_eq!(package.visibility(), Visibility::Default);
        assert!(!package.intersects(AccessFlags::VISIBILITY_MASK));
    }

    #[test]
    fn aliases_and_masks() {
        assert_eq!(AccessFlags::SYNCHRONIZED.bits(), 0x0020);
        assert_eq!(AccessFlags::RECONCILED_MASK.bits(), 0x0017);
        assert!(AccessFlags::from_bits_truncate(0x0018).is_static());
        assert!(AccessFlags::from_bits_truncate(0x0018).is_final());
    }

    #[test]
    fn display() {
        assert_eq!(Visibility::Protected.to_string(), "protected");
    }
}
