//! Visibility module: applies visible-sets to the host's objects.
//!
//! The culler only computes sets. `VisibilityApplier` turns them into
//! show/hide calls on a host-provided `VisibilitySink`, touching only the
//! objects whose state changes.

mod applier;
mod sink;

pub use applier::{ApplyMode, ApplyStats, VisibilityApplier};
pub use sink::VisibilitySink;
