//! Sibling cloning (§4.10): a reconciliation entry point independent
//! of [`crate::reconciler`], used when a parent's work-in-progress
//! fiber still shares its child pointer with the current fiber.

use crate::config::Config;
use crate::fiber::{Arena, FiberId};

/// If `work_in_progress.child` still aliases `current.child`, clones
/// the whole sibling chain (preserving each child's priority) and
/// relinks the clones under `work_in_progress`. If `work_in_progress`
/// already has its own chain, no cloning happens, but every child's
/// `return_` is still repointed at `work_in_progress` so traversal
/// can descend into it.
pub fn clone_child_fibers<C: Config>(arena: &mut Arena<C>, current: FiberId, work_in_progress: FiberId) {
    let current_child = arena.get(current).child;
    let wip_child = arena.get(work_in_progress).child;

    if wip_child != current_child {
        let mut child = wip_child;
        while let Some(id) = child {
            arena.get_mut(id).return_ = Some(work_in_progress);
            child = arena.get(id).sibling;
        }
        return;
    }

    let mut new_first: Option<FiberId> = None;
    let mut new_last: Option<FiberId> = None;
    let mut source = current_child;
    while let Some(id) = source {
        let priority = arena.get(id).pending_work_priority;
        let next_source = arena.get(id).sibling;
        let clone_id = arena.clone_fiber(id, priority);
        let clone = arena.get_mut(clone_id);
        clone.return_ = Some(work_in_progress);
        clone.sibling = None;
        match new_last {
            None => new_first = Some(clone_id),
            Some(last_id) => arena.get_mut(last_id).sibling = Some(clone_id),
        }
        new_last = Some(clone_id);
        source = next_source;
    }
    arena.get_mut(work_in_progress).child = new_first;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::Priority;
    use crate::test_support::TestConfig;

    #[test]
    fn clones_aliased_chain_and_relinks_return_pointers() {
        let mut arena = Arena::<TestConfig>::new();
        let current_parent = arena.create_from_text("parent".to_string(), Priority::default());
        let a = arena.create_from_text("a".to_string(), Priority::default());
        let b = arena.create_from_text("b".to_string(), Priority::default());
        arena.get_mut(a).sibling = Some(b);
        arena.get_mut(a).return_ = Some(current_parent);
        arena.get_mut(b).return_ = Some(current_parent);
        arena.get_mut(current_parent).child = Some(a);

        let wip_parent = arena.clone_fiber(current_parent, Priority::default());
        // clone_fiber copies the `child` pointer verbatim, so it still
        // aliases the current parent's first child.
        assert_eq!(arena.get(wip_parent).child, Some(a));

        clone_child_fibers(&mut arena, current_parent, wip_parent);

        let new_a = arena.get(wip_parent).child.unwrap();
        assert_ne!(new_a, a);
        assert_eq!(arena.get(new_a).alternate, Some(a));
        assert_eq!(arena.get(new_a).return_, Some(wip_parent));

        let new_b = arena.get(new_a).sibling.unwrap();
        assert_ne!(new_b, b);
        assert_eq!(arena.get(new_b).alternate, Some(b));
        assert_eq!(arena.get(new_b).return_, Some(wip_parent));
        assert!(arena.get(new_b).sibling.is_none());
    }

    #[test]
    fn leaves_already_owned_chain_untouched_but_repoints_return() {
        let mut arena = Arena::<TestConfig>::new();
        let current_parent = arena.create_from_text("parent".to_string(), Priority::default());
        let wip_parent = arena.create_from_text("parent".to_string(), Priority::default());
        let own_child = arena.create_from_text("child".to_string(), Priority::default());
        arena.get_mut(wip_parent).child = Some(own_child);

        clone_child_fibers(&mut arena, current_parent, wip_parent);

        assert_eq!(arena.get(wip_parent).child, Some(own_child));
        assert_eq!(arena.get(own_child).return_, Some(wip_parent));
    }
}
