//! Member rename overrides applied before table lookups.
//!
//! Patched binaries occasionally add a member whose name collides with an inherited one once
//! both sides are deobfuscated. An override renames such a member (e.g. `getSprite` →
//! `getSprite_OF`) before the regular mapping runs, keeping the two apart.

/// Matches a member owner by internal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerPattern {
    /// Any owner
    Any,
    /// Exactly this internal name
    Exact(String),
    /// Internal names starting with this prefix
    Prefix(String),
}

impl OwnerPattern {
    /// Returns `true` if `owner` matches.
    #[must_use]
    pub fn matches(&self, owner: &str) -> bool {
        match self {
            OwnerPattern::Any => true,
            OwnerPattern::Exact(name) => owner == name,
            OwnerPattern::Prefix(prefix) => owner.starts_with(prefix.as_str()),
        }
    }
}

/// One override: members named `name` on a matching owner are renamed to `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRule {
    /// Owners the rule applies to; any match suffices
    pub owners: Vec<OwnerPattern>,
    /// Member name to match
    pub name: String,
    /// Descriptor to match, any descriptor when absent
    pub descriptor: Option<String>,
    /// Name used instead of `name`
    pub replacement: String,
}

impl MemberRule {
    /// Creates a rule for a single exact owner.
    pub fn new(owner: &str, name: &str, replacement: &str) -> Self {
        MemberRule {
            owners: vec![OwnerPattern::Exact(owner.to_string())],
            name: name.to_string(),
            descriptor: None,
            replacement: replacement.to_string(),
        }
    }

    /// Adds another owner pattern.
    #[must_use]
    pub fn or_owner(mut self, pattern: OwnerPattern) -> Self {
        self.owners.push(pattern);
        self
    }

    /// Restricts the rule to one descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: &str) -> Self {
        self.descriptor = Some(descriptor.to_string());
        self
    }

    fn matches(&self, owner: &str, name: &str, descriptor: Option<&str>) -> bool {
        self.name == name
            && (self.descriptor.is_none() || self.descriptor.as_deref() == descriptor)
            && self.owners.iter().any(|pattern| pattern.matches(owner))
    }
}

/// Ordered field and method override rules; the first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberOverrides {
    fields: Vec<MemberRule>,
    methods: Vec<MemberRule>,
}

impl MemberOverrides {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        MemberOverrides::default()
    }

    /// The rules needed to keep known patched members apart from the members they shadow.
    #[must_use]
    pub fn conflict_resolution() -> Self {
        MemberOverrides::new()
            .with_method(MemberRule::new(
                "net/minecraft/client/world/ClientWorld",
                "onEntityRemoved",
                "onEntityRemoved_OF",
            ))
            .with_method(MemberRule::new(
                "net/minecraft/client/renderer/model/BakedQuad",
                "getSprite",
                "getSprite_OF",
            ))
            .with_method(MemberRule::new(
                "net/minecraft/client/model/geom/ModelPart",
                "getChild",
                "getChild_OF",
            ))
            .with_method(
                MemberRule::new("net/minecraft/client/OptionInstance$Enum", "codec", "codec_OF")
                    .or_owner(OwnerPattern::Exact(
                        "net/minecraft/client/OptionInstance$AltEnum".to_string(),
                    ))
                    .or_owner(OwnerPattern::Exact(
                        "net/minecraft/client/OptionInstance$LazyEnum".to_string(),
                    )),
            )
            .with_method(MemberRule::new(
                "net/minecraft/client/OptionInstance$AltEnum",
                "valueSetter",
                "valueSetter_OF",
            ))
            .with_method(MemberRule::new(
                "net/minecraft/client/resources/model/ModelBakery",
                "loadBlockModel",
                "loadBlockModel_OF",
            ))
            .with_field(
                MemberRule::new(
                    "net/minecraft/client/gui/GuiVideoSettings",
                    "fontRendererObj",
                    "fontRendererObj_OF",
                )
                .or_owner(OwnerPattern::Exact("bef".to_string()))
                .or_owner(OwnerPattern::Prefix("optifine".to_string()))
                .or_owner(OwnerPattern::Prefix("shadersmod".to_string())),
            )
    }

    /// Appends a field rule.
    #[must_use]
    pub fn with_field(mut self, rule: MemberRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Appends a method rule.
    #[must_use]
    pub fn with_method(mut self, rule: MemberRule) -> Self {
        self.methods.push(rule);
        self
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }

    /// Replacement for a field name, if a rule matches.
    #[must_use]
    pub fn field(&self, owner: &str, name: &str, descriptor: Option<&str>) -> Option<&str> {
        self.fields
            .iter()
            .find(|rule| rule.matches(owner, name, descriptor))
            .map(|rule| rule.replacement.as_str())
    }

    /// Replacement for a method name, if a rule matches.
    #[must_use]
    pub fn method(&self, owner: &str, name: &str, descriptor: &str) -> Option<&str> {
        self.methods
            .iter()
            .find(|rule| rule.matches(owner, name, Some(descriptor)))
            .map(|rule| rule.replacement.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_patterns() {
        assert!(OwnerPattern::Any.matches("a"));
        assert!(OwnerPattern::Exact("a".to_string()).matches("a"));
        assert!(!OwnerPattern::Exact("a".to_string()).matches("ab"));
        assert!(OwnerPattern::Prefix("optifine".to_string()).matches("optifine/Config"));
    }

    #[test]
    fn conflict_resolution_rules() {
        let overrides = MemberOverrides::conflict_resolution();

        assert_eq!(
            overrides.method(
                "net/minecraft/client/renderer/model/BakedQuad",
                "getSprite",
                "()Lnet/minecraft/client/renderer/texture/TextureAtlasSprite;"
            ),
            Some("getSprite_OF")
        );
        assert_eq!(
            overrides.method("net/minecraft/client/OptionInstance$LazyEnum", "codec", "()V"),
            Some("codec_OF")
        );
        assert_eq!(overrides.method("net/minecraft/client/Other", "getSprite", "()V"), None);
        assert_eq!(
            overrides.field("optifine/GuiDetails", "fontRendererObj", Some("Lbjn;")),
            Some("fontRendererObj_OF")
        );
        assert_eq!(overrides.field("bef", "fontRendererObj", None), Some("fontRendererObj_OF"));
        assert_eq!(overrides.field("bee", "fontRendererObj", None), None);
    }

    #[test]
    fn descriptor_restriction_and_order() {
        let overrides = MemberOverrides::new()
            .with_method(MemberRule::new("a", "b", "first").with_descriptor("()V"))
            .with_method(MemberRule::new("a", "b", "second"));

        assert_eq!(overrides.method("a", "b", "()V"), Some("first"));
        assert_eq!(overrides.method("a", "b", "(I)V"), Some("second"));
        assert!(MemberOverrides::new().is_empty());
    }
}
