//! Tests for year-scoped protocol allocation.

use super::create_test_complaint;
use crate::protocol::{format_protocol, next_protocol};
use crate::schema::{Category, Complaint};

#[test]
fn test_first_protocol_of_empty_store() {
    let stored: Vec<Complaint> = Vec::new();
    assert_eq!(next_protocol(2024, &stored), "20241");
}

#[test]
fn test_first_protocol_when_only_other_years_exist() {
    let stored = vec![
        create_test_complaint("20231", Category::Rats),
        create_test_complaint("20232", Category::Snails),
    ];
    assert_eq!(next_protocol(2024, &stored), "20241");
}

#[test]
fn test_serial_is_count_of_year_plus_one() {
    for n in 0..25usize {
        let stored: Vec<Complaint> = (1..=n)
            .map(|serial| create_test_complaint(&format_protocol(2024, serial), Category::Rats))
            .collect();
        assert_eq!(next_protocol(2024, &stored), format!("2024{}", n + 1));
    }
}

#[test]
fn test_serial_is_not_zero_padded() {
    let stored: Vec<Complaint> = (1..=9)
        .map(|serial| create_test_complaint(&format_protocol(2025, serial), Category::TallGrass))
        .collect();
    assert_eq!(next_protocol(2025, &stored), "202510");
}

#[test]
fn test_other_years_do_not_count() {
    let stored = vec![
        create_test_complaint("20231", Category::Rats),
        create_test_complaint("20241", Category::Rats),
        create_test_complaint("20232", Category::Scorpion),
        create_test_complaint("20242", Category::Snails),
        create_test_complaint("", Category::Snails),
    ];
    assert_eq!(next_protocol(2024, &stored), "20243");
    assert_eq!(next_protocol(2023, &stored), "20233");
}

#[test]
fn test_serialized_allocations_never_reuse_a_protocol() {
    let mut stored: Vec<Complaint> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..50 {
        let protocol = next_protocol(2024, &stored);
        assert!(seen.insert(protocol.clone()), "reused {protocol}");
        stored.push(create_test_complaint(&protocol, Category::Arboviroses));
    }
    assert_eq!(next_protocol(2024, &stored), "202451");
}
