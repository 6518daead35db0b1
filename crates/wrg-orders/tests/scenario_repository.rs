//! Repository CRUD scenarios against the in-process store.

use std::sync::Arc;

use wrg_orders::{OrderError, OrderRepository};
use wrg_schemas::{OrderDraft, OrderItem, OrderStatus};
use wrg_store::MemoryKvStore;

fn repo() -> OrderRepository {
    OrderRepository::new(Arc::new(MemoryKvStore::new()))
}

/// Table 5, two Kopi Susu at 15_000: the canonical waiter order.
fn kopi_draft() -> OrderDraft {
    OrderDraft {
        table_number: "5".to_string(),
        items: vec![OrderItem {
            name: "Kopi Susu".to_string(),
            quantity: 2,
            price: 15_000,
        }],
        total: 30_000,
        status: Some(OrderStatus::Pending),
        waiter_name: "Andi".to_string(),
    }
}

fn draft_for_table(table: &str) -> OrderDraft {
    OrderDraft {
        table_number: table.to_string(),
        ..kopi_draft()
    }
}

// ---------------------------------------------------------------------------
// create / get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_returns_identical_record() {
    let repo = repo();

    let created = repo.create(kopi_draft()).await.unwrap();
    let fetched = repo.get(&created.id).await.unwrap();

    assert_eq!(created, fetched);
}

#[tokio::test]
async fn create_generates_id_timestamp_and_lists_first() {
    let repo = repo();

    let order = repo.create(kopi_draft()).await.unwrap();
    assert!(order.id.starts_with("order_"), "opaque generated id: {}", order.id);
    assert_eq!(order.table_number, "5");
    assert_eq!(order.total, 30_000);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.waiter_name, "Andi");

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.first().map(|o| o.id.as_str()), Some(order.id.as_str()));
}

#[tokio::test]
async fn create_defaults_missing_status_to_pending() {
    let repo = repo();

    let mut draft = kopi_draft();
    draft.status = None;

    let order = repo.create(draft).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn create_rejects_invalid_drafts() {
    let repo = repo();

    let mut blank_table = kopi_draft();
    blank_table.table_number = "  ".to_string();
    assert!(matches!(
        repo.create(blank_table).await,
        Err(OrderError::Validation(_))
    ));

    let mut no_items = kopi_draft();
    no_items.items.clear();
    assert!(matches!(
        repo.create(no_items).await,
        Err(OrderError::Validation(_))
    ));

    let mut zero_qty = kopi_draft();
    zero_qty.items[0].quantity = 0;
    assert!(matches!(
        repo.create(zero_qty).await,
        Err(OrderError::Validation(_))
    ));

    let mut bad_total = kopi_draft();
    bad_total.total = 25_000;
    assert!(matches!(
        repo.create(bad_total).await,
        Err(OrderError::Validation(_))
    ));

    // Nothing was persisted by any of the rejected drafts.
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_overflowing_totals_without_panicking() {
    let repo = repo();

    // price * quantity wraps in u64; the wrapped value must not be accepted
    // as a matching total.
    let mut huge = kopi_draft();
    huge.items = vec![OrderItem {
        name: "Kopi Susu".to_string(),
        quantity: 2,
        price: u64::MAX,
    }];
    huge.total = u64::MAX.wrapping_mul(2);

    assert!(matches!(
        repo.create(huge).await,
        Err(OrderError::Validation(_))
    ));
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let repo = repo();
    assert!(matches!(
        repo.get("order_nonexistent").await,
        Err(OrderError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_survivors_newest_first_after_interleaved_deletes() {
    let repo = repo();

    let mut ids = Vec::new();
    for table in ["1", "2", "3", "4", "5"] {
        ids.push(repo.create(draft_for_table(table)).await.unwrap().id);
    }
    repo.delete(&ids[1]).await.unwrap();
    repo.delete(&ids[3]).await.unwrap();

    let listed = repo.list().await.unwrap();
    let listed_ids: Vec<&str> = listed.iter().map(|o| o.id.as_str()).collect();

    // Survivors only, most recent creation first.
    assert_eq!(listed_ids, vec![&ids[4], &ids[2], &ids[0]]);
    for pair in listed.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
}

// ---------------------------------------------------------------------------
// update_status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_walk_preserves_all_other_fields() {
    let repo = repo();
    let created = repo.create(kopi_draft()).await.unwrap();

    repo.update_status(&created.id, OrderStatus::Cooking)
        .await
        .unwrap();
    let updated = repo
        .update_status(&created.id, OrderStatus::Ready)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Ready);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.items, created.items);
    assert_eq!(updated.total, created.total);
    assert_eq!(updated.waiter_name, created.waiter_name);
    assert_eq!(updated.timestamp, created.timestamp);
}

#[tokio::test]
async fn repeated_same_status_update_is_stored_value_idempotent() {
    let repo = repo();
    let created = repo.create(kopi_draft()).await.unwrap();

    let first = repo
        .update_status(&created.id, OrderStatus::Cooking)
        .await
        .unwrap();
    let second = repo
        .update_status(&created.id, OrderStatus::Cooking)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.get(&created.id).await.unwrap(), second);
}

#[tokio::test]
async fn permissive_policy_allows_backward_moves() {
    let repo = repo();
    let created = repo.create(kopi_draft()).await.unwrap();

    repo.update_status(&created.id, OrderStatus::Completed)
        .await
        .unwrap();
    let back = repo
        .update_status(&created.id, OrderStatus::Pending)
        .await
        .unwrap();

    assert_eq!(back.status, OrderStatus::Pending);
}

#[tokio::test]
async fn update_status_on_unknown_id_creates_nothing() {
    let repo = repo();

    let result = repo.update_status("nonexistent", OrderStatus::Ready).await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
    assert!(repo.list().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_record_and_index_entry() {
    let repo = repo();
    let keep = repo.create(draft_for_table("1")).await.unwrap();
    let gone = repo.create(draft_for_table("2")).await.unwrap();

    repo.delete(&gone.id).await.unwrap();

    assert!(matches!(
        repo.get(&gone.id).await,
        Err(OrderError::NotFound(_))
    ));
    let listed = repo.list().await.unwrap();
    assert!(listed.iter().all(|o| o.id != gone.id));
    assert!(listed.iter().any(|o| o.id == keep.id));
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let repo = repo();
    assert!(matches!(
        repo.delete("order_nonexistent").await,
        Err(OrderError::NotFound(_))
    ));
}
