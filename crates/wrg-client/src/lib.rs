//! Client-side core for the order dashboards.
//!
//! [`SyncClient`] keeps a local view of all orders approximately fresh by
//! polling, suspending the poll around its own mutations so a stale response
//! cannot tear through an in-flight update. The HTTP wire protocol lives
//! behind the [`OrderTransport`] trait so the sync logic is testable against
//! an in-memory fake.

mod cart;
mod sync;
mod transport;
mod view;

pub use cart::Cart;
pub use sync::{SyncClient, SyncPhase};
pub use transport::{ApiError, HttpTransport, LoginReply, OrderTransport};
pub use view::{active, by_status, completed_revenue, for_waiter, status_counts, StatusCounts};
