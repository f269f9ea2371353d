//! Fiber storage: the tree the reconciler builds and mutates.
//!
//! Fibers form a doubly-linked tree with a cross-tree `alternate`
//! pointer, which is awkward to express safely with owned references
//! or `Rc<RefCell<_>>` once cycles are involved. Instead every fiber
//! lives in an [`Arena`] and is addressed by the stable [`FiberId`]
//! handle; `return_`/`sibling`/`child`/`alternate`/`next_effect` are
//! plain `Option<FiberId>` values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

use bitflags::bitflags;

use crate::child::NewChildren;
use crate::config::Config;
use crate::priority::Priority;
use crate::reified_yield::ReifiedYield;

/// A stable handle into an [`Arena`]. Never reused within the
/// lifetime of the arena that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId(u32);

bitflags! {
    /// What the committer must do with a fiber's host output.
    #[derive(Default)]
    pub struct EffectTag: u8 {
        const NONE = 0;
        const PLACEMENT = 0b01;
        const DELETION = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiberKind {
    Element,
    HostText,
    HostPortal,
    CoroutineComponent,
    YieldComponent,
    Fragment,
}

/// Kind-specific descriptor carried by element, coroutine, and yield
/// fibers. Absent for text, portal, and fragment fibers.
pub enum TypeTag<C: Config> {
    Element(C::ElementType),
    Coroutine(C::CoroutineHandler),
    Yield(ReifiedYield<C>),
}

impl<C: Config> Clone for TypeTag<C> {
    fn clone(&self) -> Self {
        match self {
            TypeTag::Element(t) => TypeTag::Element(t.clone()),
            TypeTag::Coroutine(h) => TypeTag::Coroutine(h.clone()),
            TypeTag::Yield(y) => TypeTag::Yield(y.clone()),
        }
    }
}

impl<C: Config> Debug for TypeTag<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::Element(t) => f.debug_tuple("Element").field(t).finish(),
            TypeTag::Coroutine(h) => f.debug_tuple("Coroutine").field(h).finish(),
            TypeTag::Yield(y) => f.debug_tuple("Yield").field(y).finish(),
        }
    }
}

impl<C: Config> PartialEq for TypeTag<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeTag::Element(a), TypeTag::Element(b)) => a == b,
            _ => false,
        }
    }
}

/// Kind-specific backing handle.
pub enum StateNode<C: Config> {
    Portal {
        container_info: C::ContainerInfo,
        implementation: C::PortalImpl,
    },
    Instance(C::Instance),
}

impl<C: Config> Clone for StateNode<C> {
    fn clone(&self) -> Self {
        match self {
            StateNode::Portal {
                container_info,
                implementation,
            } => StateNode::Portal {
                container_info: container_info.clone(),
                implementation: implementation.clone(),
            },
            StateNode::Instance(i) => StateNode::Instance(i.clone()),
        }
    }
}

impl<C: Config> Debug for StateNode<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateNode::Portal {
                container_info,
                implementation,
            } => f
                .debug_struct("Portal")
                .field("container_info", container_info)
                .field("implementation", implementation)
                .finish(),
            StateNode::Instance(i) => f.debug_tuple("Instance").field(i).finish(),
        }
    }
}

/// The next input a fiber's work will be applied against.
pub enum PendingProps<C: Config> {
    Text(String),
    Props(C::Props),
    Yield(C::YieldValue),
    /// The nested child description for a fragment or portal fiber.
    /// Not reconciled by the call that creates this fiber; it is
    /// consumed the next time this fiber itself is treated as a
    /// parent.
    Children(Box<NewChildren<C>>),
}

impl<C: Config> Clone for PendingProps<C> {
    fn clone(&self) -> Self {
        match self {
            PendingProps::Text(s) => PendingProps::Text(s.clone()),
            PendingProps::Props(p) => PendingProps::Props(p.clone()),
            PendingProps::Yield(y) => PendingProps::Yield(y.clone()),
            PendingProps::Children(c) => PendingProps::Children(Box::new((**c).clone())),
        }
    }
}

impl<C: Config> Debug for PendingProps<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingProps::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PendingProps::Props(p) => f.debug_tuple("Props").field(p).finish(),
            PendingProps::Yield(y) => f.debug_tuple("Yield").field(y).finish(),
            PendingProps::Children(_) => f.write_str("Children(..)"),
        }
    }
}

/// A ref that has been coerced to callable form. Carries the
/// originating string key, if any, so a later reconciliation can tell
/// whether an incoming string ref still refers to the same binding.
pub struct RefCallback<C: Config> {
    pub tag: Option<String>,
    callback: Rc<dyn Fn(Option<C::Instance>)>,
}

impl<C: Config> RefCallback<C> {
    /// Wraps an already-callable ref supplied directly by the caller.
    pub fn new(callback: Rc<dyn Fn(Option<C::Instance>)>) -> Self {
        RefCallback { tag: None, callback }
    }

    /// Synthesizes a callback that writes into `owner_refs[key]`,
    /// tagged with `key` for identity comparisons on future renders.
    pub fn from_owner(key: String, owner_refs: Rc<RefCell<HashMap<String, C::Instance>>>) -> Self {
        let bound_key = key.clone();
        let callback: Rc<dyn Fn(Option<C::Instance>)> = Rc::new(move |value| match value {
            Some(instance) => {
                owner_refs.borrow_mut().insert(bound_key.clone(), instance);
            }
            None => {
                owner_refs.borrow_mut().remove(&bound_key);
            }
        });
        RefCallback {
            tag: Some(key),
            callback,
        }
    }

    pub fn call(&self, value: Option<C::Instance>) {
        (self.callback)(value)
    }
}

impl<C: Config> Clone for RefCallback<C> {
    fn clone(&self) -> Self {
        RefCallback {
            tag: self.tag.clone(),
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<C: Config> Debug for RefCallback<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefCallback").field("tag", &self.tag).finish()
    }
}

/// A node in the fiber tree. See the module documentation for why
/// this is arena-indexed rather than reference-counted.
pub struct Fiber<C: Config> {
    pub kind: FiberKind,
    pub key: Option<String>,
    pub index: usize,
    pub type_tag: Option<TypeTag<C>>,
    pub pending_props: PendingProps<C>,
    pub state_node: Option<StateNode<C>>,
    pub ref_: Option<RefCallback<C>>,
    pub return_: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub child: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub effect_tag: EffectTag,
    pub next_effect: Option<FiberId>,
    pub pending_work_priority: Priority,
    pub progressed_first_deletion: Option<FiberId>,
    pub progressed_last_deletion: Option<FiberId>,
    pub refs: Rc<RefCell<HashMap<String, C::Instance>>>,
}

impl<C: Config> Fiber<C> {
    fn blank(kind: FiberKind, key: Option<String>, pending_props: PendingProps<C>) -> Self {
        Fiber {
            kind,
            key,
            index: 0,
            type_tag: None,
            pending_props,
            state_node: None,
            ref_: None,
            return_: None,
            sibling: None,
            child: None,
            alternate: None,
            effect_tag: EffectTag::NONE,
            next_effect: None,
            pending_work_priority: Priority::default(),
            progressed_first_deletion: None,
            progressed_last_deletion: None,
            refs: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

/// Owns every fiber that participates in one reconciliation universe
/// (both the current and work-in-progress trees share one arena, so
/// that `alternate` links are plain index comparisons).
pub struct Arena<C: Config> {
    fibers: Vec<Fiber<C>>,
}

impl<C: Config> Default for Arena<C> {
    fn default() -> Self {
        Arena { fibers: Vec::new() }
    }
}

impl<C: Config> Arena<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FiberId) -> &Fiber<C> {
        &self.fibers[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: FiberId) -> &mut Fiber<C> {
        &mut self.fibers[id.0 as usize]
    }

    fn insert(&mut self, fiber: Fiber<C>) -> FiberId {
        let id = FiberId(self.fibers.len() as u32);
        self.fibers.push(fiber);
        id
    }

    pub fn create_from_text(&mut self, text: String, priority: Priority) -> FiberId {
        let mut fiber = Fiber::blank(FiberKind::HostText, None, PendingProps::Text(text));
        fiber.pending_work_priority = priority;
        self.insert(fiber)
    }

    pub fn create_from_element(
        &mut self,
        element_type: C::ElementType,
        key: Option<String>,
        props: C::Props,
        ref_: Option<RefCallback<C>>,
        priority: Priority,
    ) -> FiberId {
        let mut fiber = Fiber::blank(FiberKind::Element, key, PendingProps::Props(props));
        fiber.type_tag = Some(TypeTag::Element(element_type));
        fiber.ref_ = ref_;
        fiber.pending_work_priority = priority;
        self.insert(fiber)
    }

    pub fn create_from_coroutine(
        &mut self,
        handler: C::CoroutineHandler,
        key: Option<String>,
        props: C::Props,
        priority: Priority,
    ) -> FiberId {
        let mut fiber = Fiber::blank(
            FiberKind::CoroutineComponent,
            key,
            PendingProps::Props(props),
        );
        fiber.type_tag = Some(TypeTag::Coroutine(handler));
        fiber.pending_work_priority = priority;
        self.insert(fiber)
    }

    pub fn create_from_yield(
        &mut self,
        reified: ReifiedYield<C>,
        key: Option<String>,
        value: C::YieldValue,
        priority: Priority,
    ) -> FiberId {
        let mut fiber =
            Fiber::blank(FiberKind::YieldComponent, key, PendingProps::Yield(value));
        fiber.type_tag = Some(TypeTag::Yield(reified));
        fiber.pending_work_priority = priority;
        self.insert(fiber)
    }

    pub fn create_from_portal(
        &mut self,
        container_info: C::ContainerInfo,
        implementation: C::PortalImpl,
        key: Option<String>,
        children: Box<NewChildren<C>>,
        priority: Priority,
    ) -> FiberId {
        let mut fiber = Fiber::blank(
            FiberKind::HostPortal,
            key,
            PendingProps::Children(children),
        );
        fiber.state_node = Some(StateNode::Portal {
            container_info,
            implementation,
        });
        fiber.pending_work_priority = priority;
        self.insert(fiber)
    }

    pub fn create_from_fragment(
        &mut self,
        key: Option<String>,
        children: Box<NewChildren<C>>,
        priority: Priority,
    ) -> FiberId {
        let mut fiber =
            Fiber::blank(FiberKind::Fragment, key, PendingProps::Children(children));
        fiber.pending_work_priority = priority;
        self.insert(fiber)
    }

    /// Produces the work-in-progress counterpart of `id`: a new fiber
    /// sharing `id`'s content, cross-linked via `alternate` in both
    /// directions. `id`'s own content is never mutated.
    pub fn clone_fiber(&mut self, id: FiberId, priority: Priority) -> FiberId {
        let source = self.get(id);
        let clone = Fiber {
            kind: source.kind,
            key: source.key.clone(),
            index: source.index,
            type_tag: source.type_tag.clone(),
            pending_props: source.pending_props.clone(),
            state_node: source.state_node.clone(),
            ref_: source.ref_.clone(),
            return_: source.return_,
            sibling: source.sibling,
            child: source.child,
            alternate: Some(id),
            effect_tag: EffectTag::NONE,
            next_effect: None,
            pending_work_priority: priority,
            progressed_first_deletion: None,
            progressed_last_deletion: None,
            refs: Rc::clone(&source.refs),
        };
        let new_id = self.insert(clone);
        self.get_mut(id).alternate = Some(new_id);
        new_id
    }
}
