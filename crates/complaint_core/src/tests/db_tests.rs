//! Tests for the SQLite document store.

use super::create_test_complaint;
use crate::ComplaintError;
use crate::db::SqliteStore;
use crate::protocol::next_protocol;
use crate::schema::{Category, StaffUpdate, Status};
use serde_json::Value;
use crate::store::ComplaintStore;

#[test]
fn test_empty_store_returns_empty_snapshot() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn test_append_then_get_all_round_trips_document() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let complaint = create_test_complaint("20241", Category::Arboviroses);

    let key = store.append(&complaint).unwrap();
    let snapshot = store.get_all().unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get(&key), Some(&complaint));
    assert_ne!(key, complaint.protocol);
}

#[test]
fn test_append_generates_distinct_keys() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let first = store
        .append(&create_test_complaint("20241", Category::Rats))
        .unwrap();
    let second = store
        .append(&create_test_complaint("20242", Category::Rats))
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(store.get_all().unwrap().len(), 2);
}

#[test]
fn test_update_fields_merges_only_staff_fields() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let complaint = create_test_complaint("20241", Category::Snails);
    let key = store.append(&complaint).unwrap();

    store
        .update_fields(
            &key,
            &StaffUpdate {
                attended_at: String::from("2024-03-15"),
                status: Status::InfractionNotice,
                report: String::from("owner notified"),
            },
        )
        .unwrap();

    let stored = store.get_all().unwrap().remove(&key).unwrap();
    assert_eq!(stored.attended_at, "2024-03-15");
    assert_eq!(stored.status, Status::InfractionNotice);
    assert_eq!(stored.report, "owner notified");

    let mut expected = complaint;
    expected.attended_at = stored.attended_at.clone();
    expected.status = stored.status.clone();
    expected.report = stored.report.clone();
    assert_eq!(stored, expected);
}

#[test]
fn test_update_fields_unknown_key_is_not_found() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let result = store.update_fields("missing", &StaffUpdate::default());
    assert!(matches!(result, Err(ComplaintError::NotFound(_))));
}

#[test]
fn test_odd_documents_do_not_block_the_scan() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store
        .insert_raw("a", r#"{"protocol": "20241", "status": ""}"#)
        .unwrap();
    store
        .insert_raw("b", r#"{"protocol": 20242, "category": "Rats", "status": "archived"}"#)
        .unwrap();
    store
        .append(&create_test_complaint("20243", Category::Snails))
        .unwrap();

    let snapshot = store.get_all().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot["a"].category, Category::Other(String::new()));
    assert_eq!(snapshot["b"].protocol, "20242");
    assert_eq!(snapshot["b"].status, Status::Archived);
    assert_eq!(next_protocol(2024, snapshot.values()), "20244");
}

#[test]
fn test_update_fields_keeps_fields_the_model_does_not_know() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store
        .insert_raw("a", r#"{"protocol": "20241", "legacy_note": "keep me"}"#)
        .unwrap();

    store
        .update_fields(
            "a",
            &StaffUpdate {
                attended_at: String::from("2024-04-01"),
                status: Status::Archived,
                report: String::from("done"),
            },
        )
        .unwrap();

    let doc_json: String = store
        .conn_for_tests()
        .query_row("SELECT doc_json FROM complaints WHERE key = 'a'", [], |row| {
            row.get(0)
        })
        .unwrap();
    let doc: Value = serde_json::from_str(&doc_json).unwrap();
    assert_eq!(doc["legacy_note"], "keep me");
    assert_eq!(doc["protocol"], "20241");
    assert_eq!(doc["status"], "Archived");
    assert_eq!(doc["attended_at"], "2024-04-01");
}
