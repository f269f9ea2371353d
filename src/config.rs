//! Host-configuration seam.
//!
//! The reconciler is generic over a single [`Config`] type so that it
//! stays renderer-agnostic: a host renderer supplies its own concrete
//! element type, props, instance handle, and so on by implementing
//! this trait, the way `react-reconciler` takes a host config object
//! at the JavaScript level. Here it is a trait instead of a
//! runtime-provided value, since the host language gives us static
//! dispatch for free.

use std::fmt::Debug;

/// Bundles the types a concrete host renderer plugs into the
/// reconciler.
pub trait Config: Sized + 'static {
    /// Identifies what kind of host element an `Element` child
    /// describes (e.g. a tag name). Compared for equality when
    /// deciding whether an element fiber can be reused.
    type ElementType: Clone + PartialEq + Debug;

    /// Props carried by an element or coroutine child, applied to the
    /// fiber's `pending_props` on creation or update.
    type Props: Clone + Debug;

    /// The backing instance a ref can point at.
    type Instance: Clone + Debug;

    /// Identifies the host container a portal targets.
    type ContainerInfo: Clone + PartialEq + Debug;

    /// Identifies which host implementation a portal renders through.
    type PortalImpl: Clone + PartialEq + Debug;

    /// Coroutine handler identity. Compared by kind only when deciding
    /// reuse (see design notes); stored verbatim otherwise.
    type CoroutineHandler: Clone + Debug;

    /// An opaque continuation value produced for a coroutine yield.
    type Continuation: Clone + Debug;

    /// The value carried by a yield child.
    type YieldValue: Clone + Debug;
}
