//! Composition of two rename stages into one.
//!
//! Given `first: X → Y` and `second: Y → Z`, [`compose`] produces `X → Z`. Every entry of the
//! result is the join of one entry from each side; entries of `first` whose `Y` side has no
//! counterpart in `second` are dropped rather than guessed. Member lookups in `second` use
//! the owner and descriptor of the `first` entry translated through `first`'s type table,
//! since `second` keys its tables in the `Y` namespace.

use crate::mapping::{descriptor::map_descriptor, stage::MappingStage};

/// Composes `first: X → Y` with `second: Y → Z`.
#[must_use]
pub fn compose(first: &MappingStage, second: &MappingStage) -> MappingStage {
    let mut composed = MappingStage::new();
    let mut dropped = 0_usize;

    for (from, via) in first.types().iter() {
        match second.types().lookup(via) {
            Some(to) => {
                // both sides are injective, so their join is as well
                if let Err(error) = composed.types_mut().insert(from, to) {
                    tracing::warn!(%error, "dropping conflicting composed type");
                    dropped += 1;
                }
            }
            None => dropped += 1,
        }
    }

    let to_via = |name: &str| first.types().map(name);

    for (owner, raw) in first.members() {
        let via_owner = first.types().map(owner);
        let Some(second_raw) = second.raw(&via_owner) else {
            dropped += raw.fields.len() + raw.methods.len();
            continue;
        };

        for (name, descriptor, via_name) in raw.fields.iter() {
            let via_descriptor = descriptor.map(|descriptor| map_descriptor(descriptor, to_via));
            match second_raw.field(via_name, via_descriptor.as_deref()) {
                Some(to) => {
                    let to = to.to_string();
                    composed.raw_mut(owner).fields.insert(name, descriptor, to);
                }
                None => dropped += 1,
            }
        }

        for (name, descriptor, via_name) in raw.methods.iter() {
            let Some(descriptor) = descriptor else {
                dropped += 1;
                continue;
            };
            let via_descriptor = map_descriptor(descriptor, to_via);
            match second_raw.method(via_name, &via_descriptor) {
                Some(to) => {
                    let to = to.to_string();
                    composed
                        .raw_mut(owner)
                        .methods
                        .insert(name, Some(descriptor), to);
                }
                None => dropped += 1,
            }
        }
    }

    tracing::debug!(
        types = composed.types().len(),
        owners = composed.members().len(),
        dropped,
        "composed mapping stages"
    );

    composed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notch_to_srg() -> MappingStage {
        MappingStage::from_lines([
            "CL: a net/minecraft/world/Widget",
            "CL: q net/minecraft/world/Orphan",
            "FD: a/b net/minecraft/world/Widget/field_1_b",
            "MD: a/c (La;)V net/minecraft/world/Widget/func_2_c (Lnet/minecraft/world/Widget;)V",
            "MD: a/d ()V net/minecraft/world/Widget/func_3_d ()V",
        ])
        .unwrap()
    }

    fn srg_to_mcp() -> MappingStage {
        MappingStage::from_lines([
            "CL: net/minecraft/world/Widget net/minecraft/world/Widget",
            "FD: net/minecraft/world/Widget/field_1_b net/minecraft/world/Widget/size",
            "MD: net/minecraft/world/Widget/func_2_c (Lnet/minecraft/world/Widget;)V net/minecraft/world/Widget/attach (Lnet/minecraft/world/Widget;)V",
        ])
        .unwrap()
    }

    #[test]
    fn joins_types_and_members() {
        let composed = compose(&notch_to_srg(), &srg_to_mcp());

        assert_eq!(composed.types().map("a"), "net/minecraft/world/Widget");
        let raw = composed.raw("a").unwrap();
        assert_eq!(raw.field("b", None), Some("size"));
        // descriptor translated through the first stage before the lookup
        assert_eq!(raw.method("c", "(La;)V"), Some("attach"));
    }

    #[test]
    fn unjoinable_entries_are_dropped() {
        let composed = compose(&notch_to_srg(), &srg_to_mcp());

        assert_eq!(composed.types().get("q"), None);
        assert_eq!(composed.raw("a").unwrap().method("d", "()V"), None);
        assert_eq!(composed.types().len(), 1);
    }

    #[test]
    fn field_descriptor_falls_back() {
        let first = MappingStage::from_lines(["CL: a Foo", "FD: a/b La; Foo/x LFoo;"]).unwrap();
        let second = MappingStage::from_lines(["CL: Foo Bar", "FD: Foo/x Bar/y"]).unwrap();

        let composed = compose(&first, &second);
        let raw = composed.raw("a").unwrap();
        assert_eq!(raw.fields.get("b", Some("La;")), Some("y"));
        assert_eq!(raw.fields.get("b", None), Some("y"));
    }

    #[test]
    fn empty_sides() {
        assert!(compose(&MappingStage::new(), &srg_to_mcp()).is_empty());
        assert!(compose(&notch_to_srg(), &MappingStage::new()).is_empty());
    }
}
