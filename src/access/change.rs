use std::fmt;

use strum::{Display, EnumString};

use crate::{
    mapping::MemberKey,
    model::{AccessFlags, Visibility},
};

/// What an [`AccessChange`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
pub enum ChangeTarget {
    /// The type itself
    #[strum(serialize = "type")]
    Type,
    /// A field, keyed by name and descriptor
    #[strum(serialize = "field")]
    Field,
    /// A method, keyed by name and descriptor
    #[strum(serialize = "method")]
    Method,
}

/// Edit of the `ACC_FINAL` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FinalityEdit {
    /// Leave the bit as it is
    #[default]
    NoChange,
    /// Clear the bit
    Clear,
    /// Set the bit
    Set,
}

impl FinalityEdit {
    /// The edit turning `from` into `to`.
    #[must_use]
    pub fn between(from: AccessFlags, to: AccessFlags) -> FinalityEdit {
        match (from.is_final(), to.is_final()) {
            (true, false) => FinalityEdit::Clear,
            (false, true) => FinalityEdit::Set,
            _ => FinalityEdit::NoChange,
        }
    }

    /// Applies the edit to `flags`.
    #[must_use]
    pub fn apply(self, flags: AccessFlags) -> AccessFlags {
        match self {
            FinalityEdit::NoChange => flags,
            FinalityEdit::Clear => flags.difference(AccessFlags::FINAL),
            FinalityEdit::Set => flags.union(AccessFlags::FINAL),
        }
    }
}

/// One visibility/finality edit to a type or one of its members.
///
/// Displayed as `method run(I)V -> public` or `field count:I -> protected, final cleared`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessChange {
    /// What the change applies to
    pub target: ChangeTarget,
    /// Name and descriptor of the member; the type name with no descriptor for types
    pub key: MemberKey,
    /// Static-ness the edited member must have
    pub is_static: bool,
    /// Requested visibility
    pub new_visibility: Visibility,
    /// Requested finality edit
    pub finality: FinalityEdit,
}

impl AccessChange {
    /// The change turning `from` into `to`.
    pub fn between(target: ChangeTarget, key: MemberKey, from: AccessFlags, to: AccessFlags) -> Self {
        AccessChange {
            target,
            key,
            is_static: from.is_static(),
            new_visibility: to.visibility(),
            finality: FinalityEdit::between(from, to),
        }
    }

    /// Applies the change to `flags`.
    ///
    /// A member whose static-ness differs is left untouched. Visibility is only ever
    /// widened: the result is the wider of the current and the requested visibility.
    #[must_use]
    pub fn apply(&self, flags: AccessFlags) -> AccessFlags {
        if flags.is_static() != self.is_static {
            return flags;
        }

        let visibility = flags.visibility().max(self.new_visibility);
        self.finality.apply(flags.with_visibility(visibility))
    }
}

impl fmt::Display for AccessChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.target)?;
        match (self.target, &self.key.descriptor) {
            (ChangeTarget::Method, Some(descriptor)) => write!(f, "{}{}", self.key.name, descriptor)?,
            _ => write!(f, "{}", self.key)?,
        }
        write!(f, " -> {}", self.new_visibility)?;
        match self.finality {
            FinalityEdit::NoChange => Ok(()),
            FinalityEdit::Clear => write!(f, ", final cleared"),
            FinalityEdit::Set => write!(f, ", final set"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_only() {
        let change = AccessChange::between(
            ChangeTarget::Method,
            MemberKey::new("run", Some("(I)V")),
            AccessFlags::PRIVATE,
            AccessFlags::PROTECTED,
        );

        assert_eq!(change.apply(AccessFlags::PRIVATE), AccessFlags::PROTECTED);
        assert_eq!(change.apply(AccessFlags::empty()), AccessFlags::PROTECTED);
        assert_eq!(change.apply(AccessFlags::PROTECTED), AccessFlags::PROTECTED);
        assert_eq!(change.apply(AccessFlags::PUBLIC), AccessFlags::PUBLIC);
        // static mismatch
        assert_eq!(
            change.apply(AccessFlags::PRIVATE | AccessFlags::STATIC),
            AccessFlags::PRIVATE | AccessFlags::STATIC
        );
    }

    #[test]
    fn finality() {
        assert_eq!(
            FinalityEdit::between(AccessFlags::FINAL, AccessFlags::empty()),
            FinalityEdit::Clear
        );
        assert_eq!(
            FinalityEdit::between(AccessFlags::empty(), AccessFlags::FINAL),
            FinalityEdit::Set
        );
        assert_eq!(
            FinalityEdit::between(AccessFlags::FINAL, AccessFlags::FINAL),
            FinalityEdit::NoChange
        );

        let change = AccessChange::between(
            ChangeTarget::Field,
            MemberKey::new("count", Some("I")),
            AccessFlags::PRIVATE | AccessFlags::FINAL,
            AccessFlags::PRIVATE,
        );
        assert_eq!(
            change.apply(AccessFlags::PUBLIC | AccessFlags::FINAL),
            AccessFlags::PUBLIC
        );
    }

    #[test]
    fn display() {
        let method = AccessChange::between(
            ChangeTarget::Method,
            MemberKey::new("run", Some("(I)V")),
            AccessFlags::PRIVATE | AccessFlags::STATIC,
            AccessFlags::PUBLIC | AccessFlags::STATIC,
        );
        assert_eq!(method.to_string(), "method run(I)V -> public");

        let field = AccessChange::between(
            ChangeTarget::Field,
            MemberKey::new("count", Some("I")),
            AccessFlags::FINAL,
            AccessFlags::PROTECTED,
        );
        assert_eq!(field.to_string(), "field count:I -> protected, final cleared");

        let class = AccessChange::between(
            ChangeTarget::Type,
            MemberKey::new("net/Widget", None),
            AccessFlags::empty(),
            AccessFlags::PUBLIC,
        );
        assert_eq!(class.to_string(), "type net/Widget -> public");
    }
}
