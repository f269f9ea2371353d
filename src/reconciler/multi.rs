//! Multi-child reconciliation (§4.7): forward scan, then either a
//! fast insertion tail or a keyed-lookup tail, shared by the indexed
//! and lazy entry points.

use std::collections::HashMap;

use super::ChildReconciler;
use crate::child::{ChildIterable, ChildItem};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fiber::FiberId;
use crate::priority::Priority;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MapKey {
    Key(String),
    Index(usize),
}

fn map_key_of<C: Config>(item: &ChildItem<C>, index: usize) -> MapKey {
    match item.key() {
        Some(k) => MapKey::Key(k.to_string()),
        None => MapKey::Index(index),
    }
}

enum SlotOutcome<C: Config> {
    Matched(FiberId),
    Mismatch(ChildItem<C>),
}

/// §4.7 phase 1 step: compares `old_fiber`'s key against `new_child`'s
/// key. Equal keys (including both absent) dispatch to the per-kind
/// update, which may still create a fresh fiber if the shape doesn't
/// match; unequal keys end the forward scan without touching either
/// side.
fn update_slot<C: Config>(
    rec: &mut ChildReconciler<C>,
    parent: FiberId,
    old_fiber: Option<FiberId>,
    new_child: ChildItem<C>,
    priority: Priority,
) -> Result<SlotOutcome<C>> {
    if matches!(new_child, ChildItem::Empty) {
        return Ok(SlotOutcome::Mismatch(new_child));
    }

    let old_key = old_fiber.and_then(|id| rec.arena.get(id).key.clone());
    let new_key = new_child.key().map(|s| s.to_string());
    if old_key != new_key {
        return Ok(SlotOutcome::Mismatch(new_child));
    }

    let fiber_id = apply_update(rec, parent, old_fiber, new_child, priority)?;
    Ok(SlotOutcome::Matched(fiber_id))
}

/// Reuse-or-create dispatch shared by `update_slot` (phase 1) and the
/// keyed map lookup (phase 3); `candidate` need not be structurally
/// compatible; each per-kind updater checks that itself.
fn apply_update<C: Config>(
    rec: &mut ChildReconciler<C>,
    parent: FiberId,
    candidate: Option<FiberId>,
    child: ChildItem<C>,
    priority: Priority,
) -> Result<FiberId> {
    Ok(match child {
        ChildItem::Empty => unreachable!("Empty never reaches apply_update"),
        ChildItem::Text(text) => rec.update_text(parent, candidate, text, priority),
        ChildItem::Element(desc) => rec.update_element(parent, candidate, desc, priority)?,
        ChildItem::Coroutine(desc) => rec.update_coroutine(parent, candidate, desc, priority),
        ChildItem::Yield(desc) => rec.update_yield(parent, candidate, desc, priority),
        ChildItem::Portal(desc) => rec.update_portal(parent, candidate, desc, priority),
        ChildItem::Fragment(desc) => rec.update_fragment(parent, candidate, desc, priority),
    })
}

fn append_fiber<C: Config>(
    rec: &mut ChildReconciler<C>,
    id: FiberId,
    result_first: &mut Option<FiberId>,
    result_last: &mut Option<FiberId>,
) {
    match *result_last {
        None => *result_first = Some(id),
        Some(last_id) => rec.arena.get_mut(last_id).sibling = Some(id),
    }
    *result_last = Some(id);
}

fn build_existing_children_map<C: Config>(rec: &ChildReconciler<C>, first: Option<FiberId>) -> HashMap<MapKey, FiberId> {
    let mut map = HashMap::new();
    let mut current = first;
    while let Some(id) = current {
        let fiber = rec.arena.get(id);
        let key = match &fiber.key {
            Some(k) => MapKey::Key(k.clone()),
            None => MapKey::Index(fiber.index),
        };
        map.insert(key, id);
        current = fiber.sibling;
    }
    map
}

/// §4.7 phase 3 step: looks `new_child` up in the remaining-old-fiber
/// map by key (or by position, for unkeyed items) and reuses or
/// creates accordingly, removing the entry from the map on reuse so
/// phase 4 doesn't delete it.
fn update_from_map<C: Config>(
    rec: &mut ChildReconciler<C>,
    map: &mut HashMap<MapKey, FiberId>,
    parent: FiberId,
    new_idx: usize,
    new_child: ChildItem<C>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    if matches!(new_child, ChildItem::Empty) {
        return Ok(None);
    }
    let lookup_key = map_key_of(&new_child, new_idx);
    let candidate = map.get(&lookup_key).copied();
    let fiber_id = apply_update(rec, parent, candidate, new_child, priority)?;
    if let Some(candidate_id) = candidate {
        let reused =
            fiber_id == candidate_id || rec.arena.get(fiber_id).alternate == Some(candidate_id);
        if reused {
            map.remove(&lookup_key);
        }
    }
    Ok(Some(fiber_id))
}

/// The shared 4-phase algorithm (§4.7), generic over how new children
/// are pulled.
fn reconcile_multi<C: Config>(
    rec: &mut ChildReconciler<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    mut new_children: impl Iterator<Item = ChildItem<C>>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    let mut result_first: Option<FiberId> = None;
    let mut result_last: Option<FiberId> = None;
    let mut last_placed_index: usize = 0;
    let mut new_idx: usize = 0;
    let mut old_fiber = current_first_child;
    let mut pending_mismatch: Option<ChildItem<C>> = None;

    // Phase 1: forward scan, gated on the old chain still having
    // fibers left (mirrors the upstream algorithm's loop condition).
    while old_fiber.is_some() {
        let new_child = match new_children.next() {
            Some(c) => c,
            None => {
                // New children exhausted while old fibers remain.
                rec.delete_remaining_children(parent, old_fiber);
                return Ok(result_first);
            }
        };

        let id = old_fiber.unwrap();
        let (candidate, next_old_fiber) = if rec.arena.get(id).index > new_idx {
            (None, old_fiber)
        } else {
            (old_fiber, rec.arena.get(id).sibling)
        };

        match update_slot(rec, parent, candidate, new_child, priority)? {
            SlotOutcome::Mismatch(child) => {
                pending_mismatch = Some(child);
                break;
            }
            SlotOutcome::Matched(new_fiber_id) => {
                if rec.mode.should_track_side_effects {
                    if let Some(old_id) = candidate {
                        let reused = new_fiber_id == old_id || rec.arena.get(new_fiber_id).alternate == Some(old_id);
                        if !reused {
                            rec.delete_child(parent, old_id);
                        }
                    }
                }
                last_placed_index = rec.place_child(new_fiber_id, new_idx, last_placed_index);
                append_fiber(rec, new_fiber_id, &mut result_first, &mut result_last);
                old_fiber = next_old_fiber;
                new_idx += 1;
            }
        }
    }

    match pending_mismatch {
        None => {
            // Phase 2: old chain exhausted naturally; every remaining
            // new child is a pure insertion.
            for child in new_children {
                if matches!(child, ChildItem::Empty) {
                    new_idx += 1;
                    continue;
                }
                let fiber_id = apply_update(rec, parent, None, child, priority)?;
                last_placed_index = rec.place_child(fiber_id, new_idx, last_placed_index);
                append_fiber(rec, fiber_id, &mut result_first, &mut result_last);
                new_idx += 1;
            }
            Ok(result_first)
        }
        Some(first_mismatch) => {
            // Phase 3: keyed tail over whatever old fibers remain.
            let mut map = build_existing_children_map(rec, old_fiber);
            let mut carried = Some(first_mismatch);
            loop {
                let child = match carried.take() {
                    Some(c) => c,
                    None => match new_children.next() {
                        Some(c) => c,
                        None => break,
                    },
                };
                if let Some(fiber_id) = update_from_map(rec, &mut map, parent, new_idx, child, priority)? {
                    last_placed_index = rec.place_child(fiber_id, new_idx, last_placed_index);
                    append_fiber(rec, fiber_id, &mut result_first, &mut result_last);
                }
                new_idx += 1;
            }
            // Phase 4: whatever is left in the map never matched.
            if rec.mode.should_track_side_effects {
                for id in map.into_values() {
                    rec.delete_child(parent, id);
                }
            }
            Ok(result_first)
        }
    }
}

#[cfg(debug_assertions)]
fn warn_duplicate_keys_in_slice<C: Config>(items: &[ChildItem<C>]) {
    crate::child::warn_duplicate_keys(items.iter().filter_map(|item| item.key()));
}

pub(super) fn reconcile_array<C: Config>(
    rec: &mut ChildReconciler<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    items: Vec<ChildItem<C>>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    #[cfg(debug_assertions)]
    warn_duplicate_keys_in_slice(&items);

    reconcile_multi(rec, parent, current_first_child, items.into_iter(), priority)
}

pub(super) fn reconcile_iterable<C: Config>(
    rec: &mut ChildReconciler<C>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    iterable: Box<dyn ChildIterable<C>>,
    priority: Priority,
) -> Result<Option<FiberId>> {
    #[cfg(debug_assertions)]
    {
        if let Some(items) = iterable.make_iterator() {
            let keys: Vec<Option<String>> = items.map(|item| item.key().map(|s| s.to_string())).collect();
            crate::child::warn_duplicate_keys(keys.iter().filter_map(|k| k.as_deref()));
        }
    }

    let iterator = iterable.make_iterator().ok_or(Error::NotIterable)?;
    reconcile_multi(rec, parent, current_first_child, iterator, priority)
}
