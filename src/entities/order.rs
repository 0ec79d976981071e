//! Order record and its append-only status history

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::OrderStatus;

/// History action recorded for status transitions
pub const ACTION_STATUS_UPDATED: &str = "STATUS_UPDATED";

/// History action recorded when an order is first persisted
pub const ACTION_ORDER_CREATED: &str = "ORDER_CREATED";

/// An order as held by the order store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub po_number: String,
    pub customer_name: String,
    pub order_status: OrderStatus,
    /// User id of the creator
    pub created_by: String,
    /// User id currently assigned to work the order, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in `ORDER_CREATED`
    pub fn new(
        id: impl Into<String>,
        po_number: impl Into<String>,
        customer_name: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        // Stored timestamps keep microseconds
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: id.into(),
            po_number: po_number.into(),
            customer_name: customer_name.into(),
            order_status: OrderStatus::OrderCreated,
            created_by: created_by.into(),
            current_assignee: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One immutable row of an order's audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_status: Option<OrderStatus>,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build the history row for a status transition
    ///
    /// Blank notes fall back to `Status updated from <old> to <new>`.
    pub fn status_update(
        order_id: &str,
        user_id: &str,
        old_status: OrderStatus,
        new_status: OrderStatus,
        notes: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status updated from {} to {}", old_status, new_status));

        Self {
            id: ulid::Ulid::new().to_string(),
            order_id: order_id.to_string(),
            user_id: user_id.to_string(),
            action: ACTION_STATUS_UPDATED.to_string(),
            old_status: Some(old_status),
            new_status: Some(new_status),
            notes,
            timestamp,
        }
    }

    /// Build the history row written alongside a new order
    pub fn order_created(order: &Order) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            order_id: order.id.clone(),
            user_id: order.created_by.clone(),
            action: ACTION_ORDER_CREATED.to_string(),
            old_status: None,
            new_status: Some(order.order_status),
            notes: format!("Order created for PO {}", order.po_number),
            timestamp: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_starts_created() {
        let order = Order::new("ORD-1", "PO-1001", "Acme Hospital", "u-1");
        assert_eq!(order.order_status, OrderStatus::OrderCreated);
        assert_eq!(order.created_at, order.updated_at);
        assert!(order.current_assignee.is_none());
    }

    #[test]
    fn test_status_update_default_notes() {
        let entry = HistoryEntry::status_update(
            "ORD-1",
            "u-1",
            OrderStatus::OrderCreated,
            OrderStatus::PartsSentWaitingArrival,
            None,
            Utc::now(),
        );
        assert_eq!(entry.action, ACTION_STATUS_UPDATED);
        assert_eq!(
            entry.notes,
            "Status updated from ORDER_CREATED to PARTS_SENT_WAITING_ARRIVAL"
        );
    }

    #[test]
    fn test_status_update_keeps_caller_notes() {
        let entry = HistoryEntry::status_update(
            "ORD-1",
            "u-1",
            OrderStatus::OrderCreated,
            OrderStatus::PartsSentWaitingArrival,
            Some("Shipped via FedEx"),
            Utc::now(),
        );
        assert_eq!(entry.notes, "Shipped via FedEx");

        let blank = HistoryEntry::status_update(
            "ORD-1",
            "u-1",
            OrderStatus::OrderCreated,
            OrderStatus::PartsSentWaitingArrival,
            Some("   "),
            Utc::now(),
        );
        assert!(blank.notes.starts_with("Status updated from"));
    }
}
