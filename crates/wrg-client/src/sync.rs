//! The polling/view-merge core.
//!
//! # Phase machine
//!
//! ```text
//!            activate                 mutation-start
//!   Idle ───────────────▶ Polling ─────────────────▶ Suspended
//!    ▲                       │  ▲                        │
//!    │      deactivate       │  └── mutation-end ────────┘
//!    └───────────────────────┘      (success or failure)
//! ```
//!
//! While `Polling`, a background task fetches the full order list every
//! [`POLL_INTERVAL`]. While `Suspended`, ticks are skipped. Each fetch is
//! tagged with a generation that mutations and deactivation invalidate, so a
//! listing captured before a mutation began can never land afterward and
//! overwrite the authoritative record the mutation merged. `deactivate`
//! aborts the task and discards the view; a poll in flight at that moment is
//! dropped, never applied. The task holds only a [`Weak`] reference, so
//! dropping the last client handle ends polling on the next tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use wrg_schemas::{Order, OrderDraft, OrderStatus, Role};

use crate::transport::{ApiError, LoginReply, OrderTransport};

/// Reference poll cadence: dashboards see changes within ~2s.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Not activated: no background task, no view state.
    Idle,
    /// Background task refreshes the view on every tick.
    Polling,
    /// A local mutation is in flight; poll ticks are skipped.
    Suspended,
}

pub struct SyncClient<T: OrderTransport> {
    inner: Arc<SyncInner<T>>,
}

impl<T: OrderTransport> Clone for SyncClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SyncInner<T> {
    transport: T,
    poll_interval: Duration,
    view: Mutex<Vec<Order>>,
    phase: Mutex<SyncPhase>,
    /// Bumped by `begin_mutation` and `deactivate`; a fetch whose captured
    /// generation no longer matches is stale and must not apply.
    generation: AtomicU64,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> SyncInner<T> {
    fn phase(&self) -> SyncPhase {
        *self.phase.lock().expect("phase lock")
    }

    fn set_phase(&self, next: SyncPhase) {
        *self.phase.lock().expect("phase lock") = next;
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Polling -> Suspended, invalidating any fetch already in flight (its
    /// listing predates this mutation). The phase move is a no-op when Idle:
    /// a mutation issued while logged out has no poll to pause.
    fn begin_mutation(&self) {
        let mut phase = self.phase.lock().expect("phase lock");
        self.generation.fetch_add(1, Ordering::SeqCst);
        if *phase == SyncPhase::Polling {
            *phase = SyncPhase::Suspended;
        }
    }

    /// Suspended -> Polling, regardless of the mutation's outcome. If the
    /// client deactivated mid-mutation the phase is Idle and stays there.
    fn end_mutation(&self) {
        let mut phase = self.phase.lock().expect("phase lock");
        if *phase == SyncPhase::Suspended {
            *phase = SyncPhase::Polling;
        }
    }

    /// Apply an authoritative server record to the local view. Dropped when
    /// Idle: after logout there is no view to keep fresh.
    fn merge(&self, apply: impl FnOnce(&mut Vec<Order>)) {
        if self.phase() == SyncPhase::Idle {
            return;
        }
        apply(&mut self.view.lock().expect("view lock"));
    }
}

impl<T: OrderTransport> SyncClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_interval(transport, POLL_INTERVAL)
    }

    /// Non-default cadence; the phase-machine tests stretch this so merges
    /// are observable between ticks.
    pub fn with_interval(transport: T, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                transport,
                poll_interval,
                view: Mutex::new(Vec::new()),
                phase: Mutex::new(SyncPhase::Idle),
                generation: AtomicU64::new(0),
                poll_task: Mutex::new(None),
            }),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.inner.phase()
    }

    /// Snapshot of the local view, newest first as the server listed it.
    pub fn view(&self) -> Vec<Order> {
        self.inner.view.lock().expect("view lock").clone()
    }

    /// Start polling. The first fetch fires immediately (the interval's
    /// initial tick), then every `poll_interval`. Idempotent while active.
    pub fn activate(&self) {
        {
            let mut phase = self.inner.phase.lock().expect("phase lock");
            if *phase != SyncPhase::Idle {
                return;
            }
            *phase = SyncPhase::Polling;
        }

        // The task takes only a weak handle: once the last SyncClient is
        // gone there is nothing left to refresh and the loop must end.
        let weak: Weak<SyncInner<T>> = Arc::downgrade(&self.inner);
        let poll_interval = self.inner.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                if inner.phase() != SyncPhase::Polling {
                    continue;
                }
                let generation = inner.generation();
                match inner.transport.list_orders().await {
                    Ok(orders) => {
                        // Discard a response that predates a mutation,
                        // suspension, or deactivation that began mid-fetch.
                        if inner.phase() == SyncPhase::Polling
                            && inner.generation() == generation
                        {
                            *inner.view.lock().expect("view lock") = orders;
                        }
                    }
                    Err(e) => warn!(error = %e, "order poll failed"),
                }
            }
        });
        *self.inner.poll_task.lock().expect("poll task lock") = Some(handle);
    }

    /// Stop polling and discard local order state. An in-flight poll is
    /// dropped with the task.
    pub fn deactivate(&self) {
        self.inner.set_phase(SyncPhase::Idle);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self
            .inner
            .poll_task
            .lock()
            .expect("poll task lock")
            .take()
        {
            handle.abort();
        }
        self.inner.view.lock().expect("view lock").clear();
    }

    // -- pass-through auth calls (no view interaction) ----------------------

    pub async fn login(&self, name: &str, role: Role) -> Result<LoginReply, ApiError> {
        self.inner.transport.login(name, role).await
    }

    pub async fn session(&self, session_id: &str) -> Result<wrg_schemas::Session, ApiError> {
        self.inner.transport.session(session_id).await
    }

    // -- mutations (suspend polling, merge the authoritative record) --------

    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        self.inner.begin_mutation();
        let result = self.inner.transport.create_order(draft).await;
        if let Ok(order) = &result {
            let order = order.clone();
            self.inner.merge(move |view| view.insert(0, order));
        }
        self.inner.end_mutation();
        result
    }

    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.inner.begin_mutation();
        let result = self.inner.transport.update_status(id, status).await;
        if let Ok(order) = &result {
            let order = order.clone();
            self.inner.merge(move |view| {
                if let Some(slot) = view.iter_mut().find(|o| o.id == order.id) {
                    *slot = order;
                }
            });
        }
        self.inner.end_mutation();
        result
    }

    pub async fn delete_order(&self, id: &str) -> Result<(), ApiError> {
        self.inner.begin_mutation();
        let result = self.inner.transport.delete_order(id).await;
        if result.is_ok() {
            self.inner.merge(|view| view.retain(|o| o.id != id));
        }
        self.inner.end_mutation();
        result
    }
}

impl<T: OrderTransport> Drop for SyncClient<T> {
    fn drop(&mut self) {
        // Last handle going away must not leak the poll task.
        if Arc::strong_count(&self.inner) == 1 {
            if let Some(handle) = self
                .inner
                .poll_task
                .lock()
                .expect("poll task lock")
                .take()
            {
                handle.abort();
            }
        }
    }
}
