//! Child-list reconciliation: dispatches a parent's new children to a
//! single- or multi-child reconciler and produces the resulting
//! sibling chain (§4 of `SPEC_FULL.md`).

pub mod mode;
mod multi;

use crate::child::{
    ChildItem, CoroutineDescriptor, ElementDescriptor, FragmentDescriptor, NewChildren,
    PortalDescriptor, YieldDescriptor,
};
use crate::config::Config;
use crate::error::Result;
use crate::fiber::{Arena, EffectTag, Fiber, FiberId, FiberKind, PendingProps, StateNode, TypeTag};
use crate::priority::Priority;
use crate::ref_coercion::coerce_ref;
use crate::reified_yield::{create_reified_yield, create_updated_reified_yield};

pub use mode::{Mode, MOUNT_CHILD_FIBERS_IN_PLACE, RECONCILE_CHILD_FIBERS, RECONCILE_CHILD_FIBERS_IN_PLACE};

fn matches_text<C: Config>(fiber: &Fiber<C>) -> bool {
    fiber.kind == FiberKind::HostText
}

fn matches_element<C: Config>(fiber: &Fiber<C>, element_type: &C::ElementType) -> bool {
    matches!(&fiber.type_tag, Some(TypeTag::Element(t)) if t == element_type)
}

fn matches_coroutine<C: Config>(fiber: &Fiber<C>) -> bool {
    fiber.kind == FiberKind::CoroutineComponent
}

fn matches_yield<C: Config>(fiber: &Fiber<C>) -> bool {
    fiber.kind == FiberKind::YieldComponent
}

fn matches_portal<C: Config>(
    fiber: &Fiber<C>,
    container_info: &C::ContainerInfo,
    implementation: &C::PortalImpl,
) -> bool {
    fiber.kind == FiberKind::HostPortal
        && matches!(
            &fiber.state_node,
            Some(StateNode::Portal { container_info: ci, implementation: imp })
                if ci == container_info && imp == implementation
        )
}

fn matches_fragment<C: Config>(fiber: &Fiber<C>) -> bool {
    fiber.kind == FiberKind::Fragment
}

/// Walks the existing sibling chain starting at `current_first_child`
/// looking for a single key+shape match (§4.6). Deletes every fiber
/// it passes over: either one-by-one (key mismatch) or, once a key
/// match is found, either the tail after it (shape matched, reuse) or
/// itself and the tail (shape mismatched).
fn find_single_child_match<C: Config>(
    rec: &mut ChildReconciler<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    key: Option<&str>,
    matches: impl Fn(&Fiber<C>) -> bool,
) -> Option<FiberId> {
    let mut child = current_first_child;
    while let Some(id) = child {
        let (child_key, child_sibling, is_match) = {
            let fiber = rec.arena.get(id);
            (fiber.key.clone(), fiber.sibling, matches(fiber))
        };
        if child_key.as_deref() == key {
            if is_match {
                rec.delete_remaining_children(parent, child_sibling);
                return Some(id);
            }
            rec.delete_remaining_children(parent, Some(id));
            return None;
        }
        rec.delete_child(parent, id);
        child = child_sibling;
    }
    None
}

/// Builds a child sibling chain for one parent fiber under a fixed
/// [`Mode`].
pub struct ChildReconciler<'a, C: Config> {
    arena: &'a mut Arena<C>,
    mode: Mode,
}

impl<'a, C: Config> ChildReconciler<'a, C> {
    pub fn new(arena: &'a mut Arena<C>, mode: Mode) -> Self {
        ChildReconciler { arena, mode }
    }

    /// Top-level dispatcher (§4.8): routes to the single- or
    /// multi-child reconciler depending on the shape of `new_child`.
    pub fn reconcile(
        &mut self,
        parent: FiberId,
        current_first_child: Option<FiberId>,
        new_child: NewChildren<C>,
        priority: Priority,
    ) -> Result<Option<FiberId>> {
        match new_child {
            NewChildren::Single(item) => self.reconcile_single(parent, current_first_child, item, priority),
            NewChildren::Array(items) => {
                multi::reconcile_array(self, parent, current_first_child, items, priority)
            }
            NewChildren::Iterable(it) => {
                multi::reconcile_iterable(self, parent, current_first_child, it, priority)
            }
        }
    }

    fn reconcile_single(
        &mut self,
        parent: FiberId,
        current_first_child: Option<FiberId>,
        item: ChildItem<C>,
        priority: Priority,
    ) -> Result<Option<FiberId>> {
        let fiber_id = match item {
            ChildItem::Empty => {
                self.delete_remaining_children(parent, current_first_child);
                return Ok(None);
            }
            ChildItem::Text(text) => self.reconcile_single_text(parent, current_first_child, text, priority),
            ChildItem::Element(desc) => {
                let candidate = find_single_child_match(self, parent, current_first_child, desc.key.as_deref(), |f| {
                    matches_element(f, &desc.element_type)
                });
                self.update_element(parent, candidate, desc, priority)?
            }
            ChildItem::Coroutine(desc) => {
                let candidate =
                    find_single_child_match(self, parent, current_first_child, desc.key.as_deref(), matches_coroutine);
                self.update_coroutine(parent, candidate, desc, priority)
            }
            ChildItem::Yield(desc) => {
                let candidate =
                    find_single_child_match(self, parent, current_first_child, desc.key.as_deref(), matches_yield);
                self.update_yield(parent, candidate, desc, priority)
            }
            ChildItem::Portal(desc) => {
                let candidate = find_single_child_match(self, parent, current_first_child, desc.key.as_deref(), |f| {
                    matches_portal(f, &desc.container_info, &desc.implementation)
                });
                self.update_portal(parent, candidate, desc, priority)
            }
            ChildItem::Fragment(desc) => {
                let candidate =
                    find_single_child_match(self, parent, current_first_child, desc.key.as_deref(), matches_fragment);
                self.update_fragment(parent, candidate, desc, priority)
            }
        };
        Ok(Some(self.place_single_child(fiber_id)))
    }

    fn reconcile_single_text(
        &mut self,
        parent: FiberId,
        current_first_child: Option<FiberId>,
        text: String,
        priority: Priority,
    ) -> FiberId {
        let is_text = current_first_child.map_or(false, |id| matches_text(self.arena.get(id)));
        let fiber_id = if is_text {
            let id = current_first_child.unwrap();
            let sibling = self.arena.get(id).sibling;
            self.delete_remaining_children(parent, sibling);
            self.use_fiber(id, priority)
        } else {
            self.delete_remaining_children(parent, current_first_child);
            self.arena.create_from_text(text.clone(), priority)
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Text(text);
        fiber.return_ = Some(parent);
        fiber_id
    }

    /// Generic text reuse-or-create, used wherever a single matching
    /// candidate (already found, not necessarily compatible) is on
    /// hand: the one-child dispatcher's walked candidate, or a
    /// multi-child slot/map candidate.
    fn update_text(&mut self, parent: FiberId, candidate: Option<FiberId>, text: String, priority: Priority) -> FiberId {
        let reuse = candidate.map_or(false, |id| matches_text(self.arena.get(id)));
        let fiber_id = if reuse {
            self.use_fiber(candidate.unwrap(), priority)
        } else {
            self.arena.create_from_text(text.clone(), priority)
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Text(text);
        fiber.return_ = Some(parent);
        fiber_id
    }

    fn update_element(
        &mut self,
        parent: FiberId,
        candidate: Option<FiberId>,
        desc: ElementDescriptor<C>,
        priority: Priority,
    ) -> Result<FiberId> {
        let reuse = candidate.map_or(false, |id| matches_element(self.arena.get(id), &desc.element_type));
        let fiber_id = if reuse {
            self.use_fiber(candidate.unwrap(), priority)
        } else {
            self.arena
                .create_from_element(desc.element_type.clone(), desc.key.clone(), desc.props.clone(), None, priority)
        };
        let coerced = {
            let current_ref = self.arena.get(fiber_id);
            coerce_ref(self.arena, Some(current_ref), desc.ref_, desc.owner)?
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Props(desc.props);
        fiber.ref_ = coerced;
        fiber.return_ = Some(parent);
        Ok(fiber_id)
    }

    fn update_coroutine(
        &mut self,
        parent: FiberId,
        candidate: Option<FiberId>,
        desc: CoroutineDescriptor<C>,
        priority: Priority,
    ) -> FiberId {
        let reuse = candidate.map_or(false, |id| matches_coroutine(self.arena.get(id)));
        let fiber_id = if reuse {
            self.use_fiber(candidate.unwrap(), priority)
        } else {
            self.arena
                .create_from_coroutine(desc.handler.clone(), desc.key.clone(), desc.props.clone(), priority)
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Props(desc.props);
        fiber.return_ = Some(parent);
        fiber_id
    }

    fn update_yield(
        &mut self,
        parent: FiberId,
        candidate: Option<FiberId>,
        desc: YieldDescriptor<C>,
        priority: Priority,
    ) -> FiberId {
        let reuse = candidate.map_or(false, |id| matches_yield(self.arena.get(id)));
        let fiber_id = if reuse {
            let id = candidate.unwrap();
            let previous = match &self.arena.get(id).type_tag {
                Some(TypeTag::Yield(y)) => y.clone(),
                _ => unreachable!("YieldComponent fiber without a Yield type tag"),
            };
            let updated = create_updated_reified_yield(&previous, &desc);
            let new_id = self.use_fiber(id, priority);
            self.arena.get_mut(new_id).type_tag = Some(TypeTag::Yield(updated));
            new_id
        } else {
            let reified = create_reified_yield(&desc);
            self.arena
                .create_from_yield(reified, desc.key.clone(), desc.value.clone(), priority)
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Yield(desc.value);
        fiber.return_ = Some(parent);
        fiber_id
    }

    fn update_portal(
        &mut self,
        parent: FiberId,
        candidate: Option<FiberId>,
        desc: PortalDescriptor<C>,
        priority: Priority,
    ) -> FiberId {
        let reuse = candidate.map_or(false, |id| {
            matches_portal(self.arena.get(id), &desc.container_info, &desc.implementation)
        });
        let fiber_id = if reuse {
            self.use_fiber(candidate.unwrap(), priority)
        } else {
            // `desc.children` is moved into `pending_props` below; the
            // fresh fiber's initial children are never read before then.
            self.arena.create_from_portal(
                desc.container_info.clone(),
                desc.implementation.clone(),
                desc.key.clone(),
                Box::new(NewChildren::Array(Vec::new())),
                priority,
            )
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Children(desc.children);
        fiber.return_ = Some(parent);
        fiber_id
    }

    fn update_fragment(
        &mut self,
        parent: FiberId,
        candidate: Option<FiberId>,
        desc: FragmentDescriptor<C>,
        priority: Priority,
    ) -> FiberId {
        let reuse = candidate.map_or(false, |id| matches_fragment(self.arena.get(id)));
        let fiber_id = if reuse {
            self.use_fiber(candidate.unwrap(), priority)
        } else {
            // `desc.children` is moved into `pending_props` below.
            self.arena
                .create_from_fragment(desc.key.clone(), Box::new(NewChildren::Array(Vec::new())), priority)
        };
        let fiber = self.arena.get_mut(fiber_id);
        fiber.pending_props = PendingProps::Children(desc.children);
        fiber.return_ = Some(parent);
        fiber_id
    }

    /// §4.2: produces the fiber to install in the work-in-progress
    /// chain for a reused old fiber.
    fn use_fiber(&mut self, id: FiberId, priority: Priority) -> FiberId {
        if self.mode.should_clone {
            let clone_id = self.arena.clone_fiber(id, priority);
            let clone = self.arena.get_mut(clone_id);
            clone.index = 0;
            clone.sibling = None;
            clone_id
        } else {
            let fiber = self.arena.get_mut(id);
            fiber.pending_work_priority = priority;
            fiber.effect_tag = EffectTag::NONE;
            fiber.index = 0;
            fiber.sibling = None;
            id
        }
    }

    /// §4.3: assigns `index` and tags `PLACEMENT` when the fiber has
    /// moved (or is new), returning the updated `last_placed_index`.
    fn place_child(&mut self, fiber_id: FiberId, new_index: usize, last_placed_index: usize) -> usize {
        if !self.mode.should_track_side_effects {
            self.arena.get_mut(fiber_id).index = new_index;
            return last_placed_index;
        }
        let alternate = self.arena.get(fiber_id).alternate;
        let result = match alternate {
            None => {
                self.arena.get_mut(fiber_id).effect_tag |= EffectTag::PLACEMENT;
                last_placed_index
            }
            Some(alt_id) => {
                let old_index = self.arena.get(alt_id).index;
                if old_index < last_placed_index {
                    self.arena.get_mut(fiber_id).effect_tag |= EffectTag::PLACEMENT;
                    last_placed_index
                } else {
                    old_index
                }
            }
        };
        self.arena.get_mut(fiber_id).index = new_index;
        result
    }

    /// Placement for the single-child path: only new fibers are
    /// tagged (there is no "moved relative to others" concept with a
    /// single child).
    fn place_single_child(&mut self, fiber_id: FiberId) -> FiberId {
        if self.mode.should_track_side_effects && self.arena.get(fiber_id).alternate.is_none() {
            self.arena.get_mut(fiber_id).effect_tag |= EffectTag::PLACEMENT;
        }
        fiber_id
    }

    /// §4.4: queues `child` on `parent`'s deletion chain.
    fn delete_child(&mut self, parent: FiberId, child: FiberId) {
        if !self.mode.should_track_side_effects {
            return;
        }
        if !self.mode.should_clone && self.arena.get(child).alternate.is_none() {
            return;
        }
        self.arena.get_mut(child).effect_tag |= EffectTag::DELETION;
        let last = self.arena.get(parent).progressed_last_deletion;
        match last {
            None => {
                let p = self.arena.get_mut(parent);
                p.progressed_first_deletion = Some(child);
                p.progressed_last_deletion = Some(child);
            }
            Some(last_id) => {
                self.arena.get_mut(last_id).next_effect = Some(child);
                self.arena.get_mut(parent).progressed_last_deletion = Some(child);
            }
        }
    }

    fn delete_remaining_children(&mut self, parent: FiberId, first: Option<FiberId>) {
        if !self.mode.should_track_side_effects {
            return;
        }
        let mut current = first;
        while let Some(id) = current {
            let next = self.arena.get(id).sibling;
            self.delete_child(parent, id);
            current = next;
        }
    }
}

/// Clone+track reconciliation of an existing work-in-progress parent's
/// children against a new description. The usual case for updates.
pub fn reconcile_child_fibers<C: Config>(
    arena: &mut Arena<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    new_child: NewChildren<C>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    ChildReconciler::new(arena, RECONCILE_CHILD_FIBERS).reconcile(parent, current_first_child, new_child, priority)
}

/// In-place+track reconciliation: `parent` is already a
/// work-in-progress fiber, so existing children are mutated directly
/// rather than cloned.
pub fn reconcile_child_fibers_in_place<C: Config>(
    arena: &mut Arena<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    new_child: NewChildren<C>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    ChildReconciler::new(arena, RECONCILE_CHILD_FIBERS_IN_PLACE)
        .reconcile(parent, current_first_child, new_child, priority)
}

/// In-place+no-track reconciliation: used for the initial mount of a
/// subtree, where the committer places everything unconditionally.
pub fn mount_child_fibers_in_place<C: Config>(
    arena: &mut Arena<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    new_child: NewChildren<C>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    ChildReconciler::new(arena, MOUNT_CHILD_FIBERS_IN_PLACE)
        .reconcile(parent, current_first_child, new_child, priority)
}
