//! The JSON wire format is load-bearing: dashboards and the daemon agree on
//! camelCase field names, lowercase enum values, and RFC 3339 timestamps.

use serde_json::json;
use wrg_schemas::{Order, OrderDraft, OrderStatus, Role, Session};

#[test]
fn order_round_trips_camel_case_fields() {
    let wire = json!({
        "id": "order_1",
        "tableNumber": "5",
        "items": [{"name": "Kopi Susu", "quantity": 2, "price": 15000}],
        "total": 30000,
        "status": "pending",
        "waiterName": "Andi",
        "timestamp": "2026-08-28T09:30:00Z"
    });

    let order: Order = serde_json::from_value(wire.clone()).unwrap();
    assert_eq!(order.table_number, "5");
    assert_eq!(order.waiter_name, "Andi");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items[0].line_total(), 30_000);

    assert_eq!(serde_json::to_value(&order).unwrap(), wire);
}

#[test]
fn draft_tolerates_missing_status() {
    let wire = json!({
        "tableNumber": "5",
        "items": [{"name": "Es Teh", "quantity": 1, "price": 8000}],
        "total": 8000,
        "waiterName": "Sari"
    });

    let draft: OrderDraft = serde_json::from_value(wire).unwrap();
    assert_eq!(draft.status, None);
    assert_eq!(draft.items_total(), 8_000);
}

#[test]
fn status_and_role_serialize_lowercase() {
    assert_eq!(
        serde_json::to_value(OrderStatus::Cooking).unwrap(),
        json!("cooking")
    );
    assert_eq!(serde_json::to_value(Role::Kitchen).unwrap(), json!("kitchen"));
}

#[test]
fn status_and_role_parse_from_wire_strings() {
    assert_eq!("ready".parse::<OrderStatus>().unwrap(), OrderStatus::Ready);
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);

    let err = "burning".parse::<OrderStatus>().unwrap_err();
    assert!(err.to_string().contains("unknown status"));
    assert!("chef".parse::<Role>().is_err());
}

#[test]
fn session_round_trips_camel_case_fields() {
    let wire = json!({
        "sessionId": "session_abc",
        "name": "Andi",
        "role": "waiter",
        "createdAt": "2026-08-28T09:00:00Z"
    });

    let session: Session = serde_json::from_value(wire.clone()).unwrap();
    assert_eq!(session.session_id, "session_abc");
    assert_eq!(session.role, Role::Waiter);
    assert_eq!(serde_json::to_value(&session).unwrap(), wire);
}
