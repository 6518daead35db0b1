//! Pure selection helpers the role dashboards apply to a view snapshot.
//! The server always lists newest-first; these keep that relative order.

use wrg_schemas::{Order, OrderStatus};

/// Orders currently in `status`, newest first.
pub fn by_status(orders: &[Order], status: OrderStatus) -> Vec<&Order> {
    orders.iter().filter(|o| o.status == status).collect()
}

/// Everything not yet completed: the cashier's working set.
pub fn active(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| o.status != OrderStatus::Completed)
        .collect()
}

/// Orders attributed to one waiter, newest first.
pub fn for_waiter<'a>(orders: &'a [Order], waiter_name: &str) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|o| o.waiter_name == waiter_name)
        .collect()
}

/// Sum of `total` over completed orders (admin revenue figure).
pub fn completed_revenue(orders: &[Order]) -> u64 {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.total)
        .sum()
}

/// Per-status order counts for the admin overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub cooking: usize,
    pub ready: usize,
    pub completed: usize,
}

pub fn status_counts(orders: &[Order]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for order in orders {
        match order.status {
            OrderStatus::Pending => counts.pending += 1,
            OrderStatus::Cooking => counts.cooking += 1,
            OrderStatus::Ready => counts.ready += 1,
            OrderStatus::Completed => counts.completed += 1,
        }
    }
    counts
}
