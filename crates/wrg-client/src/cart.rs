//! Ephemeral cart a waiter or cashier builds before submitting an order.
//! Never persisted; it only ever becomes an [`OrderDraft`].

use wrg_schemas::{OrderDraft, OrderItem, OrderStatus};

/// Line items keyed by name, in first-added order. Adding an item that is
/// already present bumps its quantity instead of duplicating the line.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<OrderItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, price: u64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.name == name) {
            item.quantity += 1;
        } else {
            self.items.push(OrderItem {
                name: name.to_string(),
                quantity: 1,
                price,
            });
        }
    }

    /// Drop a line entirely, whatever its quantity.
    pub fn remove(&mut self, name: &str) {
        self.items.retain(|i| i.name != name);
    }

    /// Set a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, name: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(name);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.name == name) {
            item.quantity = quantity;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> u128 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Turn the cart into a pending-order draft. `None` when the cart is
    /// empty, the table number is blank, or the total does not fit an
    /// order's `u64`; nothing submittable exists yet.
    pub fn into_draft(self, table_number: &str, waiter_name: &str) -> Option<OrderDraft> {
        let table_number = table_number.trim();
        if self.items.is_empty() || table_number.is_empty() {
            return None;
        }
        let total = u64::try_from(self.total()).ok()?;
        Some(OrderDraft {
            table_number: table_number.to_string(),
            total,
            items: self.items,
            status: Some(OrderStatus::Pending),
            waiter_name: waiter_name.to_string(),
        })
    }
}
