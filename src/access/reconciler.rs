use std::collections::{HashMap, HashSet};

use crate::{
    access::change::{AccessChange, ChangeTarget},
    mapping::MemberKey,
    model::{opcodes, AccessFlags, ClassNode, Operand},
};

/// Outcome of [`apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Changes that found their target
    pub applied: usize,
    /// Changes whose target was absent or differed in static-ness
    pub skipped: usize,
    /// `invokespecial` instructions rewritten to virtual dispatch
    pub dispatch_rewrites: usize,
}

/// Computes the access edits that turn `reference` into `patched`.
///
/// The type itself is compared, then every field and method of `reference` that `patched`
/// declares with the same name and descriptor. Only the visibility and final bits are
/// compared. Members whose static-ness differs between the two are skipped, since they are
/// most likely unrelated overloads rather than the same member.
#[must_use]
pub fn diff(reference: &ClassNode, patched: &ClassNode) -> HashSet<AccessChange> {
    let mut changes = HashSet::new();

    if relevant(reference.access) != relevant(patched.access) {
        changes.insert(AccessChange::between(
            ChangeTarget::Type,
            MemberKey::new(reference.name.as_str(), None),
            reference.access,
            patched.access,
        ));
    }

    let patched_fields: HashMap<(&str, &str), AccessFlags> = patched
        .fields
        .iter()
        .map(|field| ((field.name.as_str(), field.descriptor.as_str()), field.access))
        .collect();
    for field in &reference.fields {
        let Some(&access) = patched_fields.get(&(field.name.as_str(), field.descriptor.as_str()))
        else {
            continue;
        };
        if let Some(change) = member_change(
            ChangeTarget::Field,
            &field.name,
            &field.descriptor,
            field.access,
            access,
        ) {
            changes.insert(change);
        }
    }

    let patched_methods: HashMap<(&str, &str), AccessFlags> = patched
        .methods
        .iter()
        .map(|method| ((method.name.as_str(), method.descriptor.as_str()), method.access))
        .collect();
    for method in &reference.methods {
        let Some(&access) =
            patched_methods.get(&(method.name.as_str(), method.descriptor.as_str()))
        else {
            continue;
        };
        if let Some(change) = member_change(
            ChangeTarget::Method,
            &method.name,
            &method.descriptor,
            method.access,
            access,
        ) {
            changes.insert(change);
        }
    }

    tracing::debug!(class = %reference.name, changes = changes.len(), "computed access changes");
    changes
}

/// Applies `changes` to `target`.
///
/// Each change is matched to the member with the same name and descriptor; changes whose
/// member is missing, or whose static-ness does not match, are skipped. Visibility is
/// widened to the requested level and never narrowed.
///
/// Methods other than constructors that stop being private become overridable, so every
/// `invokespecial` in `target` calling them on `target` itself is rewritten to
/// `invokevirtual` (`invokeinterface` inside an interface).
pub fn apply<'a, I>(changes: I, target: &mut ClassNode) -> ApplyReport
where
    I: IntoIterator<Item = &'a AccessChange>,
{
    let mut report = ApplyReport::default();
    let mut overridable: HashSet<(String, String)> = HashSet::new();

    for change in changes {
        let slot = match (change.target, change.key.descriptor.as_deref()) {
            (ChangeTarget::Type, _) => Some(&mut target.access),
            (ChangeTarget::Field, Some(descriptor)) => target
                .field_mut(&change.key.name, descriptor)
                .map(|field| &mut field.access),
            (ChangeTarget::Method, Some(descriptor)) => target
                .method_mut(&change.key.name, descriptor)
                .map(|method| &mut method.access),
            _ => None,
        };

        let Some(access) = slot else {
            tracing::debug!(class = %target.name, %change, "no matching member, skipping");
            report.skipped += 1;
            continue;
        };
        if access.is_static() != change.is_static {
            tracing::debug!(class = %target.name, %change, "static mismatch, skipping");
            report.skipped += 1;
            continue;
        }

        let before = *access;
        *access = change.apply(before);
        report.applied += 1;

        if change.target == ChangeTarget::Method
            && change.key.name != "<init>"
            && before.contains(AccessFlags::PRIVATE)
            && !access.contains(AccessFlags::PRIVATE)
        {
            if let Some(descriptor) = &change.key.descriptor {
                overridable.insert((change.key.name.clone(), descriptor.clone()));
            }
        }
    }

    if !overridable.is_empty() {
        report.dispatch_rewrites = repair_dispatch(target, &overridable);
    }
    report
}

/// Diffs `reference` against `patched` and applies the result to `target`.
pub fn reconcile(reference: &ClassNode, patched: &ClassNode, target: &mut ClassNode) -> ApplyReport {
    let changes = diff(reference, patched);
    apply(&changes, target)
}

fn relevant(access: AccessFlags) -> AccessFlags {
    access.intersection(AccessFlags::RECONCILED_MASK)
}

fn member_change(
    target: ChangeTarget,
    name: &str,
    descriptor: &str,
    from: AccessFlags,
    to: AccessFlags,
) -> Option<AccessChange> {
    if from.is_static() != to.is_static() || relevant(from) == relevant(to) {
        return None;
    }
    Some(AccessChange::between(
        target,
        MemberKey::new(name, Some(descriptor)),
        from,
        to,
    ))
}

fn repair_dispatch(class: &mut ClassNode, overridable: &HashSet<(String, String)>) -> usize {
    let interface = class.is_interface();
    let owner = class.name.clone();
    let mut rewrites = 0;

    for method in &mut class.methods {
        for instruction in method.instructions_mut() {
            if instruction.opcode != opcodes::INVOKESPECIAL {
                continue;
            }
            let Operand::Method(member) = &mut instruction.operand else {
                continue;
            };
            if member.owner != owner
                || !overridable.contains(&(member.name.clone(), member.descriptor.clone()))
            {
                continue;
            }

            if interface {
                instruction.opcode = opcodes::INVOKEINTERFACE;
                member.interface = true;
            } else {
                instruction.opcode = opcodes::INVOKEVIRTUAL;
            }
            rewrites += 1;
        }
    }

    tracing::debug!(class = %owner, rewrites, "repaired private dispatch");
    rewrites
}
