//! Unit tests for the order store

use super::*;
use crate::core::entity::OrderStatus;
use crate::entities::order::{ACTION_ORDER_CREATED, ACTION_STATUS_UPDATED};
use crate::core::team::Role;
use crate::core::workflow::{validate_transition, TransitionError};
use chrono::{Duration, SubsecRound, Utc};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::tempdir;

fn store_with_order(id: &str) -> SqliteOrderStore {
    let store = SqliteOrderStore::open_in_memory().unwrap();
    store
        .insert_order(&Order::new(id, "PO-1001", "Acme Hospital", "u-admin"))
        .unwrap();
    store
}

fn entry_for(order: &Order, new_status: OrderStatus) -> HistoryEntry {
    HistoryEntry::status_update(
        &order.id,
        "u-pc",
        order.order_status,
        new_status,
        None,
        Utc::now().trunc_subsecs(6),
    )
}

#[test]
fn test_insert_and_get_order() {
    let store = store_with_order("ORD-1");
    let order = store.get_order("ORD-1").unwrap().unwrap();
    assert_eq!(order.po_number, "PO-1001");
    assert_eq!(order.order_status, OrderStatus::OrderCreated);
    assert!(store.get_order("ORD-404").unwrap().is_none());
}

#[test]
fn test_insert_writes_creation_history() {
    let store = store_with_order("ORD-1");
    let history = store.history("ORD-1").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, ACTION_ORDER_CREATED);
    assert_eq!(history[0].old_status, None);
    assert_eq!(history[0].new_status, Some(OrderStatus::OrderCreated));
}

#[test]
fn test_duplicate_order_rejected() {
    let store = store_with_order("ORD-1");
    let err = store
        .insert_order(&Order::new("ORD-1", "PO-2", "Other", "u-2"))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateOrder(_)));
    assert_eq!(store.history("ORD-1").unwrap().len(), 1);
}

#[test]
fn test_commit_transition_updates_status_and_appends_history() {
    let store = store_with_order("ORD-1");

    let (order, entry) = store
        .commit_transition::<StoreError, _>("ORD-1", |o| {
            Ok(entry_for(o, OrderStatus::PartsSentWaitingArrival))
        })
        .unwrap();

    assert_eq!(order.order_status, OrderStatus::PartsSentWaitingArrival);
    assert_eq!(order.updated_at, entry.timestamp);
    assert_eq!(entry.action, ACTION_STATUS_UPDATED);

    let stored = store.get_order("ORD-1").unwrap().unwrap();
    assert_eq!(stored.order_status, OrderStatus::PartsSentWaitingArrival);
    assert_eq!(stored.updated_at, entry.timestamp);

    let history = store.history("ORD-1").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1], entry);
}

#[test]
fn test_check_sees_fresh_status() {
    let store = store_with_order("ORD-1");
    store
        .commit_transition::<StoreError, _>("ORD-1", |o| Ok(entry_for(o, OrderStatus::ReadyForPreQc)))
        .unwrap();

    let mut seen = None;
    store
        .commit_transition::<StoreError, _>("ORD-1", |o| {
            seen = Some(o.order_status);
            Ok(entry_for(o, OrderStatus::ReadyForProduction))
        })
        .unwrap();
    assert_eq!(seen, Some(OrderStatus::ReadyForPreQc));
}

#[test]
fn test_rejected_check_leaves_no_trace() {
    let store = store_with_order("ORD-1");

    let result = store.commit_transition::<StoreError, _>("ORD-1", |_| {
        Err(StoreError::Lock("rejected by check".to_string()))
    });
    assert!(result.is_err());

    let order = store.get_order("ORD-1").unwrap().unwrap();
    assert_eq!(order.order_status, OrderStatus::OrderCreated);
    assert_eq!(store.history("ORD-1").unwrap().len(), 1);
}

#[test]
fn test_failed_history_append_rolls_back_status() {
    let store = store_with_order("ORD-1");
    {
        let conn = store.get_conn().unwrap();
        conn.execute_batch("DROP TABLE order_history;").unwrap();
    }

    let result = store.commit_transition::<StoreError, _>("ORD-1", |o| {
        Ok(entry_for(o, OrderStatus::Shipped))
    });
    assert!(matches!(result, Err(StoreError::Database(_))));

    let order = store.get_order("ORD-1").unwrap().unwrap();
    assert_eq!(order.order_status, OrderStatus::OrderCreated);
}

#[test]
fn test_commit_transition_missing_order() {
    let store = SqliteOrderStore::open_in_memory().unwrap();
    let result = store.commit_transition::<StoreError, _>("ORD-404", |o| {
        Ok(entry_for(o, OrderStatus::Shipped))
    });
    assert!(matches!(result, Err(StoreError::OrderNotFound(id)) if id == "ORD-404"));
}

#[test]
fn test_history_ordered_by_timestamp() {
    let store = store_with_order("ORD-1");
    let base = Utc::now().trunc_subsecs(6);

    // Written out of time order on purpose
    for (offset, status) in [(20, OrderStatus::ReadyForProduction), (10, OrderStatus::ReadyForPreQc)] {
        store
            .commit_transition::<StoreError, _>("ORD-1", |o| {
                Ok(HistoryEntry::status_update(
                    &o.id,
                    "u-pc",
                    o.order_status,
                    status,
                    None,
                    base + Duration::seconds(offset),
                ))
            })
            .unwrap();
    }

    let history = store.history("ORD-1").unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].new_status, Some(OrderStatus::ReadyForPreQc));
    assert_eq!(history[2].new_status, Some(OrderStatus::ReadyForProduction));
}

#[test]
fn test_set_assignee() {
    let store = store_with_order("ORD-1");
    let order = store.set_assignee("ORD-1", Some("u-asm")).unwrap();
    assert_eq!(order.current_assignee.as_deref(), Some("u-asm"));

    let cleared = store.set_assignee("ORD-1", None).unwrap();
    assert!(cleared.current_assignee.is_none());

    assert!(matches!(
        store.set_assignee("ORD-404", Some("x")),
        Err(StoreError::OrderNotFound(_))
    ));
}

#[test]
fn test_open_on_disk_persists() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("data/orders.db");
    {
        let store = SqliteOrderStore::open(&path).unwrap();
        store
            .insert_order(&Order::new("ORD-7", "PO-7", "Clinic", "u-1"))
            .unwrap();
    }
    let reopened = SqliteOrderStore::open(&path).unwrap();
    assert_eq!(reopened.list_orders().unwrap().len(), 1);
}

#[test]
fn test_concurrent_transitions_from_same_status_serialize() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("orders.db");
    SqliteOrderStore::open(&path)
        .unwrap()
        .insert_order(&Order::new("ORD-1", "PO-1001", "Acme Hospital", "u-admin"))
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["u-proc-1", "u-proc-2"]
        .into_iter()
        .map(|user| {
            let store = SqliteOrderStore::open(&path).unwrap();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.commit_transition::<TransitionError, _>("ORD-1", |o| {
                    validate_transition(
                        o.order_status,
                        OrderStatus::PartsSentWaitingArrival,
                        Role::ProcurementSpecialist,
                    )?;
                    Ok(HistoryEntry::status_update(
                        &o.id,
                        user,
                        o.order_status,
                        OrderStatus::PartsSentWaitingArrival,
                        None,
                        Utc::now().trunc_subsecs(6),
                    ))
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(TransitionError::InvalidTransition { .. }))));

    let store = SqliteOrderStore::open(&path).unwrap();
    assert_eq!(store.history("ORD-1").unwrap().len(), 2);
    assert_eq!(
        store.get_order("ORD-1").unwrap().unwrap().order_status,
        OrderStatus::PartsSentWaitingArrival
    );
}
