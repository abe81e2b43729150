//! Access flag reconciliation between two versions of a type.
//!
//! A binary patched against the obfuscated version of a type may rely on access that the
//! developer-facing version grants differently (a widened method, a field that lost its
//! `final`). Reconciliation compares a *reference* snapshot with a *patched* snapshot of the
//! same type, collects the visibility and finality differences as [`AccessChange`]s, and
//! applies them to a third snapshot.
//!
//! The process is a pure batch over [`ClassNode`](crate::model::ClassNode)s: nothing is
//! retained between types.
//!
//! # Key Components
//!
//! - [`diff`] - Computes the change set between two snapshots
//! - [`apply`] - Applies a change set, widening only and repairing private dispatch
//! - [`reconcile`] - Both in one call
//!
//! # Examples
//!
//! ```rust
//! use jremap::{
//!     access::reconcile,
//!     model::{AccessFlags, ClassNode, MethodNode},
//! };
//!
//! let mut reference = ClassNode::new("net/Widget", Some("java/lang/Object"));
//! reference.methods.push(MethodNode::new(AccessFlags::PRIVATE, "tick", "()V"));
//!
//! let mut patched = reference.clone();
//! patched.methods[0].access = AccessFlags::PUBLIC;
//!
//! let mut target = reference.clone();
//! let report = reconcile(&reference, &patched, &mut target);
//! assert_eq!(report.applied, 1);
//! assert_eq!(target.methods[0].access, AccessFlags::PUBLIC);
//! ```

mod change;
mod reconciler;

pub use change::{AccessChange, ChangeTarget, FinalityEdit};
pub use reconciler::{apply, diff, reconcile, ApplyReport};
