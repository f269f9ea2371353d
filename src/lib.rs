//! Child-list reconciliation for a fiber-based UI tree.
//!
//! Given a parent fiber and a description of what its children should
//! become, the functions in [`reconciler`] build a new sibling chain,
//! reusing existing fibers where possible and tagging the ones the
//! committer must place or delete.
//!
//! - [`fiber::Arena`] owns every [`fiber::Fiber`] in one reconciliation
//!   universe, addressed by [`fiber::FiberId`] handles.
//! - [`child`] describes what a parent's children should become:
//!   [`child::NewChildren`] and [`child::ChildItem`].
//! - [`reconciler::reconcile_child_fibers`],
//!   [`reconciler::reconcile_child_fibers_in_place`], and
//!   [`reconciler::mount_child_fibers_in_place`] are the three
//!   reconciliation entry points.
//! - [`clone_siblings::clone_child_fibers`] is the independent
//!   sibling-cloning entry point.
//!
//! A host renderer plugs in its own element/props/instance types by
//! implementing [`config::Config`].

pub mod child;
pub mod clone_siblings;
pub mod config;
pub mod error;
pub mod fiber;
pub mod priority;
pub mod reconciler;
pub mod ref_coercion;
pub mod reified_yield;

#[cfg(test)]
mod scenario_tests;
#[cfg(test)]
mod test_support;

pub use child::{ChildItem, NewChildren};
pub use config::Config;
pub use error::{Error, Result};
pub use fiber::{Arena, Fiber, FiberId, FiberKind};
pub use priority::Priority;
pub use reconciler::{mount_child_fibers_in_place, reconcile_child_fibers, reconcile_child_fibers_in_place};
