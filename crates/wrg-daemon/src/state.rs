//! Shared runtime state for wrg-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The repository and
//! session store are constructed once here against a single shared
//! [`KvStore`] and injected everywhere else (no module-global store).

use std::sync::Arc;

use wrg_orders::{OrderRepository, TransitionPolicy};
use wrg_sessions::SessionStore;
use wrg_store::{KvStore, MemoryKvStore};

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Copy, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub build: BuildInfo,
    pub repo: OrderRepository,
    pub sessions: SessionStore,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// In-memory store, permissive transition policy. What the binary runs
    /// and what route tests compose.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryKvStore::new()))
    }

    /// Same wiring against an externally supplied store.
    pub fn with_store(store: Arc<dyn KvStore>) -> Self {
        Self {
            build: BuildInfo {
                service: "wrg-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            repo: OrderRepository::new(store.clone()),
            sessions: SessionStore::new(store),
        }
    }

    /// In-memory store with a non-default transition policy. Used by the
    /// policy scenario tests and by deployments that tighten the lifecycle.
    pub fn with_policy(policy: Arc<dyn TransitionPolicy>) -> Self {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        Self {
            build: BuildInfo {
                service: "wrg-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            repo: OrderRepository::with_policy(store.clone(), policy),
            sessions: SessionStore::new(store),
        }
    }
}
