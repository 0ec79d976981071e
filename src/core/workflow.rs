//! Order status workflow - role-gated transitions with audit history
//!
//! [`TRANSITIONS`] is the only copy of the handoff table. Enforcement
//! ([`validate_transition`]) and UI hints ([`suggested_transitions`]) both
//! read it.

use chrono::{SubsecRound, Utc};
use thiserror::Error;

use crate::core::entity::OrderStatus;
use crate::core::notify::{NotificationTrigger, QcPhase};
use crate::core::store::{OrderStore, StoreError};
use crate::core::team::{ActingUser, Role};
use crate::entities::{HistoryEntry, Order};

use OrderStatus::*;

/// `(current status, role) -> allowed targets` for roles bound by the graph
///
/// Coordinator rows are hints only; that role bypasses the check. Every
/// status but `SHIPPED` has one.
pub const TRANSITIONS: &[(OrderStatus, Role, &[OrderStatus])] = &[
    (OrderCreated, Role::ProcurementSpecialist, &[PartsSentWaitingArrival]),
    (OrderCreated, Role::ProductionCoordinator, &[PartsSentWaitingArrival, ReadyForPreQc]),
    (PartsSentWaitingArrival, Role::ProcurementSpecialist, &[ReadyForPreQc]),
    (PartsSentWaitingArrival, Role::ProductionCoordinator, &[ReadyForPreQc, ReadyForProduction]),
    (ReadyForPreQc, Role::QcPerson, &[ReadyForProduction]),
    (ReadyForPreQc, Role::ProductionCoordinator, &[ReadyForProduction]),
    (ReadyForProduction, Role::Assembler, &[AssemblyInProgress]),
    (ReadyForProduction, Role::ProductionCoordinator, &[AssemblyInProgress]),
    (AssemblyInProgress, Role::Assembler, &[ReadyForEolTesting]),
    (AssemblyInProgress, Role::ProductionCoordinator, &[ReadyForEolTesting]),
    (ReadyForEolTesting, Role::Assembler, &[EolTestingInProgress]),
    (ReadyForEolTesting, Role::ProductionCoordinator, &[EolTestingInProgress]),
    (EolTestingInProgress, Role::Assembler, &[TestingComplete]),
    (EolTestingInProgress, Role::ProductionCoordinator, &[TestingComplete]),
    (TestingComplete, Role::Assembler, &[PackagingInProgress]),
    (TestingComplete, Role::ProductionCoordinator, &[PackagingInProgress, ReadyForFinalQc]),
    (PackagingInProgress, Role::Assembler, &[PackagingComplete]),
    (PackagingInProgress, Role::ProductionCoordinator, &[PackagingComplete, ReadyForFinalQc]),
    (PackagingComplete, Role::Assembler, &[ReadyForFinalQc]),
    (PackagingComplete, Role::QcPerson, &[ReadyForFinalQc]),
    (PackagingComplete, Role::ProductionCoordinator, &[ReadyForFinalQc]),
    (ReadyForFinalQc, Role::QcPerson, &[ReadyForShip]),
    (ReadyForFinalQc, Role::ProductionCoordinator, &[ReadyForShip]),
    (ReadyForShip, Role::ProductionCoordinator, &[Shipped]),
];

/// Errors returned by the transition entry point
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("{role} {user} may not access order {order_id}")]
    Forbidden {
        user: String,
        role: Role,
        order_id: String,
    },

    #[error("{role} cannot transition from {from} to {to}")]
    InvalidTransition {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Invalid transition request: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TransitionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderNotFound(id) => TransitionError::NotFound(id),
            other => TransitionError::Store(other),
        }
    }
}

/// Targets `role` may request from `current` per the table
///
/// Empty when the pair is absent. Does not account for bypass roles.
pub fn allowed_targets(current: OrderStatus, role: Role) -> &'static [OrderStatus] {
    TRANSITIONS
        .iter()
        .find(|(status, r, _)| *status == current && *r == role)
        .map(|(_, _, targets)| *targets)
        .unwrap_or(&[])
}

/// Check whether `role` may move an order from `current` to `requested`
pub fn validate_transition(
    current: OrderStatus,
    requested: OrderStatus,
    role: Role,
) -> Result<(), TransitionError> {
    if role.bypasses_transition_graph() || allowed_targets(current, role).contains(&requested) {
        return Ok(());
    }
    Err(TransitionError::InvalidTransition {
        role,
        from: current,
        to: requested,
    })
}

pub fn is_valid_transition(current: OrderStatus, requested: OrderStatus, role: Role) -> bool {
    validate_transition(current, requested, role).is_ok()
}

/// Next statuses to offer `role` in a UI
///
/// Bypass roles get every table target for `current` across all roles, in
/// happy-path order.
pub fn suggested_transitions(current: OrderStatus, role: Role) -> Vec<OrderStatus> {
    if !role.bypasses_transition_graph() {
        return allowed_targets(current, role).to_vec();
    }
    let mut targets: Vec<OrderStatus> = TRANSITIONS
        .iter()
        .filter(|(status, _, _)| *status == current)
        .flat_map(|(_, _, t)| t.iter().copied())
        .collect();
    targets.sort();
    targets.dedup();
    targets
}

/// Whether `user` may see and act on `order`
pub fn can_access_order(user: &ActingUser, order: &Order) -> bool {
    if user.role.bypasses_transition_graph() || order.created_by == user.id {
        return true;
    }
    match user.role {
        Role::Assembler => {
            order.current_assignee.as_deref() == Some(user.id.as_str())
                || matches!(order.order_status, ReadyForProduction | TestingComplete)
        }
        Role::QcPerson => matches!(order.order_status, ReadyForPreQc | ReadyForFinalQc),
        Role::ProcurementSpecialist => {
            matches!(order.order_status, OrderCreated | PartsSentWaitingArrival)
        }
        _ => false,
    }
}

/// Caller input for a status change
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub order_id: String,
    pub new_status: OrderStatus,
    pub notes: Option<String>,
    /// Broadcast the status change to every user instead of stakeholders only
    pub notify_all: bool,
}

impl TransitionRequest {
    pub fn new(order_id: impl Into<String>, new_status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            new_status,
            notes: None,
            notify_all: false,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn notify_all(mut self, notify_all: bool) -> Self {
        self.notify_all = notify_all;
        self
    }
}

/// Successful transition result
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub order: Order,
    pub history: HistoryEntry,
    pub previous_status: OrderStatus,
}

/// Applies status transitions against a store and fires notifications
pub struct StatusService<S, N> {
    store: S,
    notifier: N,
}

impl<S: OrderStore, N: NotificationTrigger> StatusService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and apply a transition
    ///
    /// Legality is checked before access so a rejection always names the
    /// role and both statuses. Notifications run only after commit; their
    /// failures are logged and never returned.
    pub fn transition(
        &self,
        user: &ActingUser,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, TransitionError> {
        if request.order_id.trim().is_empty() {
            return Err(TransitionError::Validation("order id is required".to_string()));
        }
        if user.id.trim().is_empty() {
            return Err(TransitionError::Validation("acting user id is required".to_string()));
        }

        let (order, history) = self
            .store
            .commit_transition::<TransitionError, _>(&request.order_id, |order| {
                validate_transition(order.order_status, request.new_status, user.role)?;
                if !can_access_order(user, order) {
                    return Err(TransitionError::Forbidden {
                        user: user.id.clone(),
                        role: user.role,
                        order_id: order.id.clone(),
                    });
                }
                Ok(HistoryEntry::status_update(
                    &order.id,
                    &user.id,
                    order.order_status,
                    request.new_status,
                    request.notes.as_deref(),
                    Utc::now().trunc_subsecs(6),
                ))
            })?;

        let previous_status = history.old_status.unwrap_or(order.order_status);
        tracing::info!(
            order = %order.id,
            from = %previous_status,
            to = %order.order_status,
            user = %user.id,
            role = %user.role,
            "order status updated"
        );

        self.notify(user, &order, previous_status, request.notify_all);

        Ok(TransitionOutcome {
            order,
            history,
            previous_status,
        })
    }

    fn notify(&self, user: &ActingUser, order: &Order, previous: OrderStatus, notify_all: bool) {
        if let Err(e) = self.notifier.trigger_order_status_change(
            &order.id,
            previous,
            order.order_status,
            &user.id,
            notify_all,
        ) {
            tracing::warn!(order = %order.id, error = %e, "status change notification failed");
        }

        if let Some(phase) = QcPhase::for_status(order.order_status) {
            if let Err(e) = self.notifier.trigger_qc_approval_required(&order.id, phase) {
                tracing::warn!(
                    order = %order.id,
                    phase = %phase,
                    error = %e,
                    "QC approval notification failed"
                );
            }
        }
    }
}
