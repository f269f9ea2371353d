//! End-to-end reconciliation scenarios, matching the six walkthroughs
//! in `SPEC_FULL.md` §8, plus the invariants listed alongside them.

use pretty_assertions::assert_eq;

use crate::child::{ChildItem, ElementDescriptor, NewChildren};
use crate::fiber::{Arena, EffectTag, FiberId};
use crate::priority::Priority;
use crate::reconciler::{mount_child_fibers_in_place, reconcile_child_fibers};
use crate::test_support::TestConfig;

fn element(key: &str, element_type: &str) -> ChildItem<TestConfig> {
    ChildItem::Element(ElementDescriptor {
        element_type: element_type.to_string(),
        key: Some(key.to_string()),
        props: String::new(),
        ref_: None,
        owner: None,
    })
}

fn unkeyed_element(element_type: &str) -> ChildItem<TestConfig> {
    ChildItem::Element(ElementDescriptor {
        element_type: element_type.to_string(),
        key: None,
        props: String::new(),
        ref_: None,
        owner: None,
    })
}

fn sibling_chain(arena: &Arena<TestConfig>, mut first: Option<FiberId>) -> Vec<FiberId> {
    let mut out = Vec::new();
    while let Some(id) = first {
        out.push(id);
        first = arena.get(id).sibling;
    }
    out
}

fn mount(arena: &mut Arena<TestConfig>, parent: FiberId, items: Vec<ChildItem<TestConfig>>) -> Option<FiberId> {
    mount_child_fibers_in_place(arena, parent, None, NewChildren::Array(items), Priority::default()).unwrap()
}

fn update(
    arena: &mut Arena<TestConfig>,
    parent: FiberId,
    current_first_child: Option<FiberId>,
    items: Vec<ChildItem<TestConfig>>,
) -> Option<FiberId> {
    reconcile_child_fibers(arena, parent, current_first_child, NewChildren::Array(items), Priority::default()).unwrap()
}

/// S1: fresh mount produces a fiber per child, none tagged (mount
/// mode never tracks effects), indices 0..n.
#[test]
fn s1_fresh_mount() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());

    let first = mount(&mut arena, parent, vec![element("a", "div"), element("b", "div")]);
    let chain = sibling_chain(&arena, first);

    assert_eq!(chain.len(), 2);
    for (i, id) in chain.iter().enumerate() {
        let fiber = arena.get(*id);
        assert_eq!(fiber.index, i);
        assert_eq!(fiber.effect_tag, EffectTag::NONE);
        assert!(fiber.alternate.is_none());
    }
}

/// S2: an update with identical keys, types, and order reuses every
/// fiber and tags nothing.
#[test]
fn s2_in_order_update_reuses_everything() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(&mut arena, parent, vec![element("a", "div"), element("b", "div")]);

    let updated = update(&mut arena, parent, first, vec![element("a", "div"), element("b", "div")]);
    let chain = sibling_chain(&arena, updated);

    assert_eq!(chain.len(), 2);
    for (i, id) in chain.iter().enumerate() {
        let fiber = arena.get(*id);
        assert_eq!(fiber.index, i);
        assert!(fiber.effect_tag.is_empty());
        assert!(fiber.alternate.is_some());
    }
}

/// S3: swapping two keyed children causes exactly one of them (the
/// one whose old index now falls behind the high-water mark) to be
/// tagged `PLACEMENT`; the other is left alone.
#[test]
fn s3_swap_tags_exactly_one_move() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(&mut arena, parent, vec![element("a", "div"), element("b", "div")]);

    let updated = update(&mut arena, parent, first, vec![element("b", "div"), element("a", "div")]);
    let chain = sibling_chain(&arena, updated);
    assert_eq!(chain.len(), 2);

    let b_fiber = arena.get(chain[0]);
    assert_eq!(b_fiber.key.as_deref(), Some("b"));
    assert!(b_fiber.effect_tag.is_empty());

    let a_fiber = arena.get(chain[1]);
    assert_eq!(a_fiber.key.as_deref(), Some("a"));
    assert!(a_fiber.effect_tag.contains(EffectTag::PLACEMENT));
}

/// S4: inserting a keyed child in the middle creates one new fiber
/// (tagged `PLACEMENT`) and leaves its neighbors reused and untagged.
#[test]
fn s4_insert_in_middle() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(&mut arena, parent, vec![element("a", "div"), element("b", "div")]);

    let updated = update(
        &mut arena,
        parent,
        first,
        vec![element("a", "div"), element("x", "div"), element("b", "div")],
    );
    let chain = sibling_chain(&arena, updated);
    assert_eq!(chain.len(), 3);

    let a = arena.get(chain[0]);
    assert_eq!(a.key.as_deref(), Some("a"));
    assert!(a.alternate.is_some());
    assert!(a.effect_tag.is_empty());

    let x = arena.get(chain[1]);
    assert_eq!(x.key.as_deref(), Some("x"));
    assert!(x.alternate.is_none());
    assert!(x.effect_tag.contains(EffectTag::PLACEMENT));

    let b = arena.get(chain[2]);
    assert_eq!(b.key.as_deref(), Some("b"));
    assert!(b.alternate.is_some());
    assert!(b.effect_tag.is_empty());
}

/// S5: dropping the tail of the list queues the dropped fiber for
/// deletion and leaves the survivors alone.
#[test]
fn s5_delete_tail() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(
        &mut arena,
        parent,
        vec![element("a", "div"), element("b", "div"), element("c", "div")],
    );
    let old_c = sibling_chain(&arena, first)[2];

    let updated = update(&mut arena, parent, first, vec![element("a", "div"), element("b", "div")]);
    let chain = sibling_chain(&arena, updated);

    assert_eq!(chain.len(), 2);
    assert_eq!(arena.get(parent).progressed_first_deletion, Some(old_c));
    assert!(arena.get(old_c).effect_tag.contains(EffectTag::DELETION));
}

/// S6: replacing an unkeyed child with an incompatible type deletes
/// the old fiber and mounts a fresh one in its place.
#[test]
fn s6_replace_by_type() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(&mut arena, parent, vec![unkeyed_element("div")]);
    let old_div = first.unwrap();

    let updated = update(&mut arena, parent, first, vec![unkeyed_element("span")]);
    let chain = sibling_chain(&arena, updated);

    assert_eq!(chain.len(), 1);
    let span = arena.get(chain[0]);
    assert!(span.alternate.is_none());
    assert!(span.effect_tag.contains(EffectTag::PLACEMENT));
    assert!(arena.get(old_div).effect_tag.contains(EffectTag::DELETION));
}

/// Invariant 1: after reconciliation every child's `index` matches
/// its position and `return_` points at the parent.
#[test]
fn invariant_index_and_return_are_consistent() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(
        &mut arena,
        parent,
        vec![element("a", "div"), element("b", "div"), element("c", "div")],
    );
    for (i, id) in sibling_chain(&arena, first).into_iter().enumerate() {
        let fiber = arena.get(id);
        assert_eq!(fiber.index, i);
        assert_eq!(fiber.return_, Some(parent));
    }
}

/// Invariant 5: mounting never tags placement or deletion and never
/// appends to the parent's deletion chain.
#[test]
fn invariant_mount_never_tags_effects() {
    let mut arena = Arena::<TestConfig>::new();
    let parent = arena.create_from_text("root".to_string(), Priority::default());
    let first = mount(&mut arena, parent, vec![element("a", "div"), element("b", "div")]);

    for id in sibling_chain(&arena, first) {
        assert!(arena.get(id).effect_tag.is_empty());
    }
    assert!(arena.get(parent).progressed_first_deletion.is_none());
}
