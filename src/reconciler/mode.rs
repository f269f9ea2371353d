//! The three fixed `(should_clone, should_track_side_effects)`
//! configurations a [`super::ChildReconciler`] can run under.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub should_clone: bool,
    pub should_track_side_effects: bool,
}

/// Clones current-tree fibers into new work-in-progress copies and
/// tracks placement/deletion effects. Used for ordinary updates.
pub const RECONCILE_CHILD_FIBERS: Mode = Mode {
    should_clone: true,
    should_track_side_effects: true,
};

/// Mutates fibers in place (the caller guarantees they already belong
/// to the work-in-progress tree) and tracks effects. Used when a
/// parent's own work-in-progress fiber is being reused.
pub const RECONCILE_CHILD_FIBERS_IN_PLACE: Mode = Mode {
    should_clone: false,
    should_track_side_effects: true,
};

/// Mutates in place without tracking effects at all. Used for initial
/// mount, where the committer places the whole subtree unconditionally.
pub const MOUNT_CHILD_FIBERS_IN_PLACE: Mode = Mode {
    should_clone: false,
    should_track_side_effects: false,
};
