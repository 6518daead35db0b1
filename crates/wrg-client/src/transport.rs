//! Wire protocol boundary for the daemon's REST surface.
//!
//! [`OrderTransport`] is the seam the sync core is written against;
//! [`HttpTransport`] is the reqwest implementation. The base URL and bearer
//! credential are injected at construction so tests can point the transport
//! at a mock server.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use wrg_schemas::{Order, OrderDraft, OrderStatus, Role, Session};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors an [`OrderTransport`] implementation may return.
#[derive(Debug)]
pub enum ApiError {
    /// Network or transport failure (connection refused, timeout).
    Transport(String),
    /// The daemon answered with a non-2xx status.
    Status { code: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Status { code, message } => write!(f, "api error {code}: {message}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

// ---------------------------------------------------------------------------
// OrderTransport trait
// ---------------------------------------------------------------------------

/// Result of a successful login: the opaque session id plus the identity
/// record the server stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReply {
    pub session_id: String,
    pub user: Session,
}

#[async_trait]
pub trait OrderTransport: Send + Sync + 'static {
    async fn login(&self, name: &str, role: Role) -> Result<LoginReply, ApiError>;

    async fn session(&self, session_id: &str) -> Result<Session, ApiError>;

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError>;

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, ApiError>;

    async fn delete_order(&self, id: &str) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginEnvelope {
    session_id: String,
    user: Session,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    user: Session,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    bearer: String,
}

impl HttpTransport {
    /// `bearer` is the opaque credential expected by the deployment's auth
    /// boundary; it is attached verbatim to every request and never
    /// interpreted client-side.
    pub fn new(base_url: impl Into<String>, bearer: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer: bearer.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Map a non-2xx response to [`ApiError::Status`], preferring the
    /// body's `error` message when one is present.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope
                .error
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Err(ApiError::Status {
            code: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl OrderTransport for HttpTransport {
    async fn login(&self, name: &str, role: Role) -> Result<LoginReply, ApiError> {
        let resp = self
            .http
            .post(self.url("/v1/auth/login"))
            .bearer_auth(&self.bearer)
            .json(&serde_json::json!({ "name": name, "role": role }))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: LoginEnvelope = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(LoginReply {
            session_id: envelope.session_id,
            user: envelope.user,
        })
    }

    async fn session(&self, session_id: &str) -> Result<Session, ApiError> {
        let resp = self
            .http
            .get(self.url("/v1/auth/session"))
            .bearer_auth(&self.bearer)
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: SessionEnvelope = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.user)
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        let resp = self
            .http
            .post(self.url("/v1/orders"))
            .bearer_auth(&self.bearer)
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: OrderEnvelope = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let resp = self
            .http
            .get(self.url("/v1/orders"))
            .bearer_auth(&self.bearer)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: OrdersEnvelope = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.orders)
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/v1/orders/{id}/status")))
            .bearer_auth(&self.bearer)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: OrderEnvelope = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.order)
    }

    async fn delete_order(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/v1/orders/{id}")))
            .bearer_auth(&self.bearer)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::check(resp).await?;
        Ok(())
    }
}
