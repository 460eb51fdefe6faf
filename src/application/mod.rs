//! Application layer containing the order lifecycle orchestration.
//!
//! This module defines the `OrderLifecycleManager`, the entry point for
//! placing orders and moving them through their statuses, the subscriber
//! registry it uses to push tenant snapshots to observers, and the
//! `CommandProcessor` that replays command files against it.

pub mod batch;
pub mod lifecycle;
pub mod subscribers;
