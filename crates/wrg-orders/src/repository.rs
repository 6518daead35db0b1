//! The order repository: CRUD over `order:<id>` records plus the
//! `orders:list` ordering index.
//!
//! # Consistency rules
//!
//! - A record is written **before** the index references it. A crash between
//!   the two steps leaves an unindexed orphan (invisible until indexed),
//!   never an index entry that resolves to nothing.
//! - Readers still tolerate dangling index entries: `list` drops any id whose
//!   record is missing instead of failing the whole listing.
//! - The index's prepend order is only a hint. The externally observed order
//!   is a stable re-sort by `timestamp` descending on every read, which keeps
//!   listings correct even if concurrent creates interleave index prepends
//!   out of timestamp order.
//! - Every index read-modify-write runs under `index_writer`, a single-writer
//!   lock. The [`KvStore`](wrg_store::KvStore) contract offers no cross-call
//!   atomicity, so without this two concurrent creates can lose one id
//!   (read index, prepend, write index: last writer wins).

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use wrg_schemas::{Order, OrderDraft, OrderStatus};
use wrg_store::{KvStore, StoreError};

use crate::lifecycle::{Permissive, TransitionPolicy};

/// Key prefix for individual order records.
pub const ORDER_KEY_PREFIX: &str = "order:";

/// Singleton key holding the newest-first sequence of order ids.
pub const INDEX_KEY: &str = "orders:list";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum OrderError {
    /// The draft failed a creation-time check (missing fields, zero
    /// quantities, total not matching the item sum).
    Validation(String),
    /// No record exists for the given order id.
    NotFound(String),
    /// The configured [`TransitionPolicy`] rejected the requested move.
    TransitionRefused {
        from: OrderStatus,
        to: OrderStatus,
    },
    Store(StoreError),
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::Validation(msg) => write!(f, "invalid order draft: {msg}"),
            OrderError::NotFound(id) => write!(f, "order not found: {id}"),
            OrderError::TransitionRefused { from, to } => {
                write!(f, "transition refused: {from} -> {to}")
            }
            OrderError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OrderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        OrderError::Store(e)
    }
}

// ---------------------------------------------------------------------------
// OrderRepository
// ---------------------------------------------------------------------------

/// Owns the `order:` / `orders:list` namespace. Constructed once per process
/// and shared by handle; cloning shares the same store and index lock.
#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn KvStore>,
    policy: Arc<dyn TransitionPolicy>,
    /// Serializes every read-modify-write of [`INDEX_KEY`]. Index *reads*
    /// do not take this lock.
    index_writer: Arc<Mutex<()>>,
}

impl OrderRepository {
    /// Repository with the permissive transition policy (any status
    /// overwrites any other).
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_policy(store, Arc::new(Permissive))
    }

    pub fn with_policy(store: Arc<dyn KvStore>, policy: Arc<dyn TransitionPolicy>) -> Self {
        Self {
            store,
            policy,
            index_writer: Arc::new(Mutex::new(())),
        }
    }

    /// Validate the draft, persist a new record, and prepend its id to the
    /// ordering index. Returns the record with generated `id`, `timestamp`,
    /// and resolved `status`.
    pub async fn create(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        validate_draft(&draft)?;

        let order = Order {
            id: format!("order_{}", Uuid::new_v4()),
            table_number: draft.table_number,
            items: draft.items,
            total: draft.total,
            status: draft.status.unwrap_or(OrderStatus::Pending),
            waiter_name: draft.waiter_name,
            timestamp: Utc::now(),
        };

        // Record first, index second (see module docs).
        self.write_order(&order).await?;

        {
            let _guard = self.index_writer.lock().await;
            let mut index = self.read_index().await?;
            index.insert(0, order.id.clone());
            self.write_index(&index).await?;
        }

        info!(order_id = %order.id, table = %order.table_number, "order created");
        Ok(order)
    }

    pub async fn get(&self, id: &str) -> Result<Order, OrderError> {
        match self.store.get(&order_key(id)).await? {
            Some(value) => decode_order(value),
            None => Err(OrderError::NotFound(id.to_string())),
        }
    }

    /// All live orders, newest first by `timestamp`. Equal timestamps keep
    /// index (prepend) order thanks to the stable sort.
    pub async fn list(&self) -> Result<Vec<Order>, OrderError> {
        let index = self.read_index().await?;
        let keys: Vec<String> = index.iter().map(|id| order_key(id)).collect();

        let mut orders = Vec::with_capacity(keys.len());
        for value in self.store.mget(&keys).await?.into_iter().flatten() {
            orders.push(decode_order(value)?);
        }

        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(orders)
    }

    /// Replace the stored record's status, leaving every other field
    /// verbatim. Fails `NotFound` for unknown ids and `TransitionRefused`
    /// when the configured policy rejects the move (never, under the
    /// default permissive policy).
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let mut order = self.get(id).await?;

        if !self.policy.allows(order.status, status) {
            return Err(OrderError::TransitionRefused {
                from: order.status,
                to: status,
            });
        }

        order.status = status;
        self.write_order(&order).await?;

        info!(order_id = %id, status = %status, "order status updated");
        Ok(order)
    }

    /// Remove the record, then remove its id from the index by value. The
    /// existence check runs before anything is touched, so an unknown id
    /// fails `NotFound` with no side effects.
    pub async fn delete(&self, id: &str) -> Result<(), OrderError> {
        self.get(id).await?;

        self.store.del(&order_key(id)).await?;

        {
            let _guard = self.index_writer.lock().await;
            let mut index = self.read_index().await?;
            // By value, not by position: also clears accidental duplicates.
            index.retain(|entry| entry != id);
            self.write_index(&index).await?;
        }

        info!(order_id = %id, "order deleted");
        Ok(())
    }

    async fn write_order(&self, order: &Order) -> Result<(), OrderError> {
        let value = serde_json::to_value(order)
            .map_err(|e| StoreError::Codec(e.to_string()))?;
        self.store.set(&order_key(&order.id), value).await?;
        Ok(())
    }

    async fn read_index(&self) -> Result<Vec<String>, OrderError> {
        match self.store.get(INDEX_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| OrderError::Store(StoreError::Codec(e.to_string()))),
            None => Ok(Vec::new()),
        }
    }

    async fn write_index(&self, index: &[String]) -> Result<(), OrderError> {
        let value = serde_json::to_value(index)
            .map_err(|e| StoreError::Codec(e.to_string()))?;
        self.store.set(INDEX_KEY, value).await?;
        Ok(())
    }
}

fn order_key(id: &str) -> String {
    format!("{ORDER_KEY_PREFIX}{id}")
}

fn decode_order(value: serde_json::Value) -> Result<Order, OrderError> {
    serde_json::from_value(value)
        .map_err(|e| OrderError::Store(StoreError::Codec(e.to_string())))
}

fn validate_draft(draft: &OrderDraft) -> Result<(), OrderError> {
    if draft.table_number.trim().is_empty() {
        return Err(OrderError::Validation("tableNumber is required".into()));
    }
    if draft.waiter_name.trim().is_empty() {
        return Err(OrderError::Validation("waiterName is required".into()));
    }
    if draft.items.is_empty() {
        return Err(OrderError::Validation("items must not be empty".into()));
    }
    if draft.items.iter().any(|item| item.quantity == 0) {
        return Err(OrderError::Validation(
            "item quantities must be at least 1".into(),
        ));
    }
    // The sum is accumulated in u128, so an overflowing draft can never
    // produce a matching total; it fails here instead of wrapping.
    let expected = draft.items_total();
    if u128::from(draft.total) != expected {
        return Err(OrderError::Validation(format!(
            "total {} does not match item sum {expected}",
            draft.total
        )));
    }
    Ok(())
}
