//! Notification trigger - invoked after a status transition commits
//!
//! Delivery belongs to whatever sits behind [`NotificationTrigger`]. The
//! status service calls it after commit and only logs failures.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::core::entity::OrderStatus;

/// Which QC gate an approval request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QcPhase {
    PreQc,
    FinalQc,
}

impl QcPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            QcPhase::PreQc => "PRE_QC",
            QcPhase::FinalQc => "FINAL_QC",
        }
    }

    /// QC phase that entering `status` requires, if any
    pub fn for_status(status: OrderStatus) -> Option<QcPhase> {
        match status {
            OrderStatus::ReadyForPreQc => Some(QcPhase::PreQc),
            OrderStatus::ReadyForFinalQc => Some(QcPhase::FinalQc),
            _ => None,
        }
    }
}

impl std::fmt::Display for QcPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Notification worker could not start: {0}")]
    Worker(#[from] std::io::Error),
}

/// Side-effect sink for workflow events
pub trait NotificationTrigger: Send + Sync {
    fn trigger_order_status_change(
        &self,
        order_id: &str,
        old_status: OrderStatus,
        new_status: OrderStatus,
        acting_user_id: &str,
        notify_all: bool,
    ) -> Result<(), NotifyError>;

    fn trigger_qc_approval_required(&self, order_id: &str, phase: QcPhase) -> Result<(), NotifyError>;
}

impl<N: NotificationTrigger + ?Sized> NotificationTrigger for Arc<N> {
    fn trigger_order_status_change(
        &self,
        order_id: &str,
        old_status: OrderStatus,
        new_status: OrderStatus,
        acting_user_id: &str,
        notify_all: bool,
    ) -> Result<(), NotifyError> {
        (**self).trigger_order_status_change(order_id, old_status, new_status, acting_user_id, notify_all)
    }

    fn trigger_qc_approval_required(&self, order_id: &str, phase: QcPhase) -> Result<(), NotifyError> {
        (**self).trigger_qc_approval_required(order_id, phase)
    }
}

/// Emits each notification as a structured `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationTrigger for LogNotifier {
    fn trigger_order_status_change(
        &self,
        order_id: &str,
        old_status: OrderStatus,
        new_status: OrderStatus,
        acting_user_id: &str,
        notify_all: bool,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            target: "cleanstation::notify",
            order = order_id,
            old = %old_status,
            new = %new_status,
            user = acting_user_id,
            notify_all,
            "order status changed"
        );
        Ok(())
    }

    fn trigger_qc_approval_required(&self, order_id: &str, phase: QcPhase) -> Result<(), NotifyError> {
        tracing::info!(
            target: "cleanstation::notify",
            order = order_id,
            phase = %phase,
            "QC approval required"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationTrigger for NoopNotifier {
    fn trigger_order_status_change(
        &self,
        _order_id: &str,
        _old_status: OrderStatus,
        _new_status: OrderStatus,
        _acting_user_id: &str,
        _notify_all: bool,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    fn trigger_qc_approval_required(&self, _order_id: &str, _phase: QcPhase) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Runs each call of the wrapped trigger on its own detached thread
///
/// The caller only sees thread-spawn failures; delivery failures are logged
/// from the worker thread.
pub struct ThreadedNotifier<N> {
    inner: Arc<N>,
}

impl<N: NotificationTrigger + 'static> ThreadedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    fn spawn<F>(&self, job: F) -> Result<(), NotifyError>
    where
        F: FnOnce(&N) -> Result<(), NotifyError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        std::thread::Builder::new()
            .name("notify".to_string())
            .spawn(move || {
                if let Err(e) = job(&inner) {
                    tracing::warn!(error = %e, "background notification failed");
                }
            })?;
        Ok(())
    }
}

impl<N: NotificationTrigger + 'static> NotificationTrigger for ThreadedNotifier<N> {
    fn trigger_order_status_change(
        &self,
        order_id: &str,
        old_status: OrderStatus,
        new_status: OrderStatus,
        acting_user_id: &str,
        notify_all: bool,
    ) -> Result<(), NotifyError> {
        let order_id = order_id.to_string();
        let acting_user_id = acting_user_id.to_string();
        self.spawn(move |n| {
            n.trigger_order_status_change(&order_id, old_status, new_status, &acting_user_id, notify_all)
        })
    }

    fn trigger_qc_approval_required(&self, order_id: &str, phase: QcPhase) -> Result<(), NotifyError> {
        let order_id = order_id.to_string();
        self.spawn(move |n| n.trigger_qc_approval_required(&order_id, phase))
    }
}

/// A notification as captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    StatusChange {
        order_id: String,
        old_status: OrderStatus,
        new_status: OrderStatus,
        acting_user_id: String,
        notify_all: bool,
    },
    QcApprovalRequired {
        order_id: String,
        phase: QcPhase,
    },
}

/// Keeps every call in memory; used by tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls received so far
    pub fn calls(&self) -> Vec<Notification> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, n: Notification) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?
            .push(n);
        Ok(())
    }
}

impl NotificationTrigger for RecordingNotifier {
    fn trigger_order_status_change(
        &self,
        order_id: &str,
        old_status: OrderStatus,
        new_status: OrderStatus,
        acting_user_id: &str,
        notify_all: bool,
    ) -> Result<(), NotifyError> {
        self.record(Notification::StatusChange {
            order_id: order_id.to_string(),
            old_status,
            new_status,
            acting_user_id: acting_user_id.to_string(),
            notify_all,
        })
    }

    fn trigger_qc_approval_required(&self, order_id: &str, phase: QcPhase) -> Result<(), NotifyError> {
        self.record(Notification::QcApprovalRequired {
            order_id: order_id.to_string(),
            phase,
        })
    }
}
