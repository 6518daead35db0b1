//! Order records, their ordering index, and the lifecycle policy seam.
//!
//! [`OrderRepository`] is the single choke-point for every write to the
//! `order:` / `orders:list` key namespace; nothing else in the workspace
//! touches those keys. Status-transition rules live behind the
//! [`TransitionPolicy`] trait so they can be tightened without touching the
//! repository.

mod lifecycle;
mod repository;

pub use lifecycle::{ForwardOnly, Permissive, TransitionPolicy};
pub use repository::{OrderError, OrderRepository, INDEX_KEY, ORDER_KEY_PREFIX};
