//! Child description types: the input side of reconciliation.
//!
//! A parent supplies a [`NewChildren`] value describing what its
//! children should become. [`ChildItem`] is the same closed set of
//! shapes, used both as `NewChildren::Single` and as the element type
//! of an array or iterable.

use std::fmt::Debug;

use crate::config::Config;
use crate::fiber::{FiberId, RefCallback};

/// A ref attached to an element before coercion: either already a
/// callback, or a string that must be resolved against the element's
/// owner (see [`crate::ref_coercion::coerce_ref`]).
pub enum ElementRef<C: Config> {
    Str(String),
    Callback(RefCallback<C>),
}

impl<C: Config> Clone for ElementRef<C> {
    fn clone(&self) -> Self {
        match self {
            ElementRef::Str(s) => ElementRef::Str(s.clone()),
            ElementRef::Callback(cb) => ElementRef::Callback(cb.clone()),
        }
    }
}

impl<C: Config> Debug for ElementRef<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementRef::Str(s) => f.debug_tuple("Str").field(s).finish(),
            ElementRef::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

pub struct ElementDescriptor<C: Config> {
    pub element_type: C::ElementType,
    pub key: Option<String>,
    pub props: C::Props,
    pub ref_: Option<ElementRef<C>>,
    /// The fiber of the component that authored this element, used to
    /// resolve a string ref to a callback (§4.1). `None` if the
    /// element was not created during a component render.
    pub owner: Option<FiberId>,
}

impl<C: Config> Clone for ElementDescriptor<C> {
    fn clone(&self) -> Self {
        ElementDescriptor {
            element_type: self.element_type.clone(),
            key: self.key.clone(),
            props: self.props.clone(),
            ref_: self.ref_.clone(),
            owner: self.owner,
        }
    }
}

impl<C: Config> Debug for ElementDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementDescriptor")
            .field("element_type", &self.element_type)
            .field("key", &self.key)
            .field("props", &self.props)
            .field("ref_", &self.ref_)
            .field("owner", &self.owner)
            .finish()
    }
}

pub struct CoroutineDescriptor<C: Config> {
    pub key: Option<String>,
    pub handler: C::CoroutineHandler,
    pub props: C::Props,
}

impl<C: Config> Clone for CoroutineDescriptor<C> {
    fn clone(&self) -> Self {
        CoroutineDescriptor {
            key: self.key.clone(),
            handler: self.handler.clone(),
            props: self.props.clone(),
        }
    }
}

impl<C: Config> Debug for CoroutineDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoroutineDescriptor")
            .field("key", &self.key)
            .field("handler", &self.handler)
            .field("props", &self.props)
            .finish()
    }
}

pub struct YieldDescriptor<C: Config> {
    pub key: Option<String>,
    pub continuation: C::Continuation,
    pub value: C::YieldValue,
}

impl<C: Config> Clone for YieldDescriptor<C> {
    fn clone(&self) -> Self {
        YieldDescriptor {
            key: self.key.clone(),
            continuation: self.continuation.clone(),
            value: self.value.clone(),
        }
    }
}

impl<C: Config> Debug for YieldDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YieldDescriptor")
            .field("key", &self.key)
            .field("continuation", &self.continuation)
            .field("value", &self.value)
            .finish()
    }
}

pub struct PortalDescriptor<C: Config> {
    pub key: Option<String>,
    pub container_info: C::ContainerInfo,
    pub implementation: C::PortalImpl,
    pub children: Box<NewChildren<C>>,
}

impl<C: Config> Clone for PortalDescriptor<C> {
    fn clone(&self) -> Self {
        PortalDescriptor {
            key: self.key.clone(),
            container_info: self.container_info.clone(),
            implementation: self.implementation.clone(),
            children: self.children.clone(),
        }
    }
}

impl<C: Config> Debug for PortalDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalDescriptor")
            .field("key", &self.key)
            .field("container_info", &self.container_info)
            .field("implementation", &self.implementation)
            .finish()
    }
}

pub struct FragmentDescriptor<C: Config> {
    pub key: Option<String>,
    pub children: Box<NewChildren<C>>,
}

impl<C: Config> Clone for FragmentDescriptor<C> {
    fn clone(&self) -> Self {
        FragmentDescriptor {
            key: self.key.clone(),
            children: self.children.clone(),
        }
    }
}

impl<C: Config> Debug for FragmentDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentDescriptor")
            .field("key", &self.key)
            .finish()
    }
}

/// One child description: text, one of the four "leaf" kinds, a
/// nested fragment, or the explicit absence of a child.
pub enum ChildItem<C: Config> {
    Text(String),
    Element(ElementDescriptor<C>),
    Coroutine(CoroutineDescriptor<C>),
    Yield(YieldDescriptor<C>),
    Portal(PortalDescriptor<C>),
    Fragment(FragmentDescriptor<C>),
    Empty,
}

impl<C: Config> Clone for ChildItem<C> {
    fn clone(&self) -> Self {
        match self {
            ChildItem::Text(s) => ChildItem::Text(s.clone()),
            ChildItem::Element(e) => ChildItem::Element(e.clone()),
            ChildItem::Coroutine(c) => ChildItem::Coroutine(c.clone()),
            ChildItem::Yield(y) => ChildItem::Yield(y.clone()),
            ChildItem::Portal(p) => ChildItem::Portal(p.clone()),
            ChildItem::Fragment(f) => ChildItem::Fragment(f.clone()),
            ChildItem::Empty => ChildItem::Empty,
        }
    }
}

impl<C: Config> Debug for ChildItem<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildItem::Text(s) => f.debug_tuple("Text").field(s).finish(),
            ChildItem::Element(e) => f.debug_tuple("Element").field(e).finish(),
            ChildItem::Coroutine(c) => f.debug_tuple("Coroutine").field(c).finish(),
            ChildItem::Yield(y) => f.debug_tuple("Yield").field(y).finish(),
            ChildItem::Portal(p) => f.debug_tuple("Portal").field(p).finish(),
            ChildItem::Fragment(fr) => f.debug_tuple("Fragment").field(fr).finish(),
            ChildItem::Empty => f.write_str("Empty"),
        }
    }
}

impl<C: Config> ChildItem<C> {
    /// The explicit key carried by this item, if any. Text and empty
    /// children never carry a key.
    pub fn key(&self) -> Option<&str> {
        match self {
            ChildItem::Text(_) | ChildItem::Empty => None,
            ChildItem::Element(e) => e.key.as_deref(),
            ChildItem::Coroutine(c) => c.key.as_deref(),
            ChildItem::Yield(y) => y.key.as_deref(),
            ChildItem::Portal(p) => p.key.as_deref(),
            ChildItem::Fragment(fr) => fr.key.as_deref(),
        }
    }
}

/// A value that can be pulled from lazily, once per call to
/// [`ChildIterable::make_iterator`]. Implemented by anything that may
/// appear as a top-level lazy sequence or as a nested fragment's lazy
/// sequence.
pub trait ChildIterable<C: Config> {
    /// Returns a fresh iterator over this value's items, or `None` if
    /// the value turned out not to be iterable after all (surfaced by
    /// the caller as [`crate::error::Error::NotIterable`]).
    fn make_iterator(&self) -> Option<Box<dyn Iterator<Item = ChildItem<C>> + '_>>;

    /// Duplicates the underlying sequence description so a fiber
    /// holding it as pending props can be cloned into a new fiber
    /// (clone-mode reconciliation never mutates a current-tree
    /// fiber's content, so cloning must not consume the original).
    fn clone_iterable(&self) -> Box<dyn ChildIterable<C>>;
}

/// The top-level shape of "what should this parent's children be".
pub enum NewChildren<C: Config> {
    Single(ChildItem<C>),
    Array(Vec<ChildItem<C>>),
    Iterable(Box<dyn ChildIterable<C>>),
}

impl<C: Config> Clone for NewChildren<C> {
    fn clone(&self) -> Self {
        match self {
            NewChildren::Single(item) => NewChildren::Single(item.clone()),
            NewChildren::Array(items) => NewChildren::Array(items.clone()),
            NewChildren::Iterable(it) => NewChildren::Iterable(it.clone_iterable()),
        }
    }
}

impl<C: Config> Debug for NewChildren<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NewChildren::Single(item) => f.debug_tuple("Single").field(item).finish(),
            NewChildren::Array(items) => f.debug_tuple("Array").field(items).finish(),
            NewChildren::Iterable(_) => f.write_str("Iterable(..)"),
        }
    }
}

/// Scans new children once (debug builds only) and warns on the
/// second occurrence of any key. Does not deduplicate; the algorithm
/// itself treats the first match as the reuse candidate and later
/// duplicates as plain insertions.
#[cfg(debug_assertions)]
pub fn warn_duplicate_keys<'a, I>(items: I)
where
    I: IntoIterator<Item = &'a str>,
{
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    for key in items {
        if !seen.insert(key) {
            log::warn!("encountered two children with the same key, \"{}\"", key);
        }
    }
}

#[cfg(not(debug_assertions))]
pub fn warn_duplicate_keys<'a, I>(_items: I)
where
    I: IntoIterator<Item = &'a str>,
{
}
