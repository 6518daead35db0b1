//! Status-transition policy seam.
//!
//! The shipped behavior is deliberately permissive: any status may overwrite
//! any other, including backward moves like completed -> pending. That
//! matches what the dashboards rely on today. [`ForwardOnly`] is the
//! tightening that a deployment can swap in at repository construction
//! without changing any repository code.

use wrg_schemas::OrderStatus;

/// Decides whether a stored order may move from `current` to `requested`.
///
/// Implementations must be pure with respect to the two statuses; the
/// repository has already established that the record exists and handles
/// persistence either way.
pub trait TransitionPolicy: Send + Sync {
    fn allows(&self, current: OrderStatus, requested: OrderStatus) -> bool;
}

/// Accepts every transition, including same-status writes and backward
/// moves. The default, for compatibility with existing dashboards.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl TransitionPolicy for Permissive {
    fn allows(&self, _current: OrderStatus, _requested: OrderStatus) -> bool {
        true
    }
}

/// Only allows pending -> cooking -> ready -> completed, plus same-status
/// writes (so a retried update stays idempotent).
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardOnly;

impl ForwardOnly {
    fn rank(status: OrderStatus) -> u8 {
        match status {
            OrderStatus::Pending => 0,
            OrderStatus::Cooking => 1,
            OrderStatus::Ready => 2,
            OrderStatus::Completed => 3,
        }
    }
}

impl TransitionPolicy for ForwardOnly {
    fn allows(&self, current: OrderStatus, requested: OrderStatus) -> bool {
        let (from, to) = (Self::rank(current), Self::rank(requested));
        to == from || to == from + 1
    }
}
