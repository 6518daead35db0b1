//! Axum router and all HTTP handlers for wrg-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.
//!
//! Status mapping: validation failures are 400, unknown ids 404, a policy
//! refusal 409 (well-formed request, conflicting resource state), store
//! failures 500 with the diagnostic attached under `details`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{error, info};

use wrg_orders::OrderError;
use wrg_schemas::{OrderDraft, OrderStatus, Role};
use wrg_sessions::SessionError;

use crate::{
    api_types::{
        CreateOrderRequest, DeleteResponse, ErrorBody, HealthResponse, LoginRequest,
        LoginResponse, OrderResponse, OrdersResponse, SessionQuery, SessionResponse,
        UpdateStatusRequest,
    },
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/session", get(session))
        .route("/v1/orders", post(create_order).get(list_orders))
        .route("/v1/orders/:id/status", put(update_status))
        .route("/v1/orders/:id", delete(delete_order))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            service: st.build.service,
            version: st.build.version,
            timestamp: chrono::Utc::now(),
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/auth/login
// ---------------------------------------------------------------------------

pub(crate) async fn login(
    State(st): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Response {
    let (name, role) = match (non_empty(req.name), non_empty(req.role)) {
        (Some(name), Some(role)) => (name, role),
        _ => return bad_request("Name and role are required"),
    };

    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(e) => return bad_request(&e.to_string()),
    };

    match st.sessions.login(&name, role).await {
        Ok(user) => {
            info!(session_id = %user.session_id, "auth/login");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    session_id: user.session_id.clone(),
                    user,
                }),
            )
                .into_response()
        }
        Err(e) => session_error_response("Login failed", e),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/auth/session?sessionId=
// ---------------------------------------------------------------------------

pub(crate) async fn session(
    State(st): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
) -> Response {
    let Some(session_id) = non_empty(q.session_id) else {
        return bad_request("Session ID required");
    };

    match st.sessions.lookup(&session_id).await {
        Ok(user) => (
            StatusCode::OK,
            Json(SessionResponse {
                success: true,
                user,
            }),
        )
            .into_response(),
        Err(e) => session_error_response("Failed to get session", e),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Response {
    let (table_number, items, total, waiter_name) = match (
        non_empty(req.table_number),
        req.items,
        req.total,
        non_empty(req.waiter_name),
    ) {
        (Some(t), Some(i), Some(tot), Some(w)) => (t, i, tot, w),
        _ => return bad_request("Missing required fields"),
    };

    let status = match req.status.as_deref() {
        Some(s) => match s.parse::<OrderStatus>() {
            Ok(status) => Some(status),
            Err(e) => return bad_request(&e.to_string()),
        },
        None => None,
    };

    let draft = OrderDraft {
        table_number,
        items,
        total,
        status,
        waiter_name,
    };

    match st.repo.create(draft).await {
        Ok(order) => {
            info!(order_id = %order.id, "orders/create");
            (
                StatusCode::OK,
                Json(OrderResponse {
                    success: true,
                    order,
                }),
            )
                .into_response()
        }
        Err(e) => order_error_response("Failed to create order", e),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/orders
// ---------------------------------------------------------------------------

pub(crate) async fn list_orders(State(st): State<Arc<AppState>>) -> Response {
    match st.repo.list().await {
        Ok(orders) => (
            StatusCode::OK,
            Json(OrdersResponse {
                success: true,
                orders,
            }),
        )
            .into_response(),
        Err(e) => order_error_response("Failed to get orders", e),
    }
}

// ---------------------------------------------------------------------------
// PUT /v1/orders/:id/status
// ---------------------------------------------------------------------------

pub(crate) async fn update_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Response {
    let Some(status) = non_empty(req.status) else {
        return bad_request("Status is required");
    };

    let status: OrderStatus = match status.parse() {
        Ok(status) => status,
        Err(e) => return bad_request(&e.to_string()),
    };

    match st.repo.update_status(&id, status).await {
        Ok(order) => {
            info!(order_id = %id, status = %status, "orders/update_status");
            (
                StatusCode::OK,
                Json(OrderResponse {
                    success: true,
                    order,
                }),
            )
                .into_response()
        }
        Err(e) => order_error_response("Failed to update order status", e),
    }
}

// ---------------------------------------------------------------------------
// DELETE /v1/orders/:id
// ---------------------------------------------------------------------------

pub(crate) async fn delete_order(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match st.repo.delete(&id).await {
        Ok(()) => {
            info!(order_id = %id, "orders/delete");
            (StatusCode::OK, Json(DeleteResponse { success: true })).into_response()
        }
        Err(e) => order_error_response("Failed to delete order", e),
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn bad_request(msg: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: msg.to_string(),
            details: None,
        }),
    )
        .into_response()
}

fn order_error_response(context: &str, e: OrderError) -> Response {
    match e {
        OrderError::Validation(msg) => bad_request(&msg),
        OrderError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "Order not found".to_string(),
                details: None,
            }),
        )
            .into_response(),
        OrderError::TransitionRefused { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorBody {
                error: e.to_string(),
                details: None,
            }),
        )
            .into_response(),
        OrderError::Store(store_err) => {
            error!(error = %store_err, "{context}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: context.to_string(),
                    details: Some(store_err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

fn session_error_response(context: &str, e: SessionError) -> Response {
    match e {
        SessionError::Validation(msg) => bad_request(&msg),
        SessionError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "Session not found".to_string(),
                details: None,
            }),
        )
            .into_response(),
        SessionError::Store(store_err) => {
            error!(error = %store_err, "{context}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: context.to_string(),
                    details: Some(store_err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
