//! Opaque scheduling priority token.

/// A scheduling priority the reconciler treats as an opaque ordered
/// value: it is copied onto new fibers and overwritten on reused ones,
/// never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(pub u64);

impl From<u64> for Priority {
    fn from(value: u64) -> Self {
        Priority(value)
    }
}
