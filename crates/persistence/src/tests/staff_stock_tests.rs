// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use d1_store_domain::{Staff, StaffRole};

use super::{SHIRT_EAN, SHIRT_NAME, policy, seed_shirts, seed_staff, shirt_request, t0};
use crate::{Persistence, PersistenceError};

#[test]
fn test_store_names_are_unique_after_normalization() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.create_store("Central").unwrap();

    let result = persistence.create_store("  CENTRAL ");

    assert_eq!(
        result,
        Err(PersistenceError::UniqueViolation {
            column: String::from("stores.name_key")
        })
    );
}

#[test]
fn test_staff_round_trips_role_and_limit() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let store_id: i64 = persistence.create_store("Central").unwrap();
    let staff_id: i64 = persistence
        .create_staff("  Dana Lee ", StaffRole::Manager, store_id, Some(4))
        .unwrap();

    let member: Staff = persistence.get_staff(staff_id).unwrap().unwrap();

    assert_eq!(member.display_name, "Dana Lee");
    assert_eq!(member.role, StaffRole::Manager);
    assert_eq!(member.uniform_limit, Some(4));
    assert_eq!(persistence.count_staff().unwrap(), 1);
}

#[test]
fn test_set_uniform_limit_updates_and_clears() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);

    let limited: Staff = persistence.set_uniform_limit(staff_id, Some(3)).unwrap();
    assert_eq!(limited.uniform_limit, Some(3));

    let cleared: Staff = persistence.set_uniform_limit(staff_id, None).unwrap();
    assert_eq!(cleared.uniform_limit, None);
}

#[test]
fn test_set_uniform_limit_unknown_staff() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        persistence.set_uniform_limit(12, Some(1)),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_stock_pair_is_unique() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_shirts(&mut persistence, 3);

    let result = persistence.create_stock_item(SHIRT_EAN, SHIRT_NAME, 1);

    assert!(matches!(result, Err(PersistenceError::UniqueViolation { .. })));
}

#[test]
fn test_negative_stock_is_rejected_by_schema() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(persistence.create_stock_item("1", "Broken", -1).is_err());
}

#[test]
fn test_delete_unreferenced_stock() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_shirts(&mut persistence, 3);

    persistence.delete_stock_item(SHIRT_EAN, SHIRT_NAME).unwrap();

    assert!(persistence.list_stock().unwrap().is_empty());
}

#[test]
fn test_delete_referenced_stock_is_refused() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 3);
    persistence
        .create_uniform_request(&shirt_request(staff_id, 1), t0(), &policy())
        .unwrap();

    let result = persistence.delete_stock_item(SHIRT_EAN, SHIRT_NAME);

    assert_eq!(
        result,
        Err(PersistenceError::StockItemReferenced {
            ean: SHIRT_EAN.to_string(),
            name: SHIRT_NAME.to_string()
        })
    );
    assert_eq!(persistence.list_stock().unwrap().len(), 1);
}

#[test]
fn test_delete_missing_stock_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        persistence.delete_stock_item("1", "Nothing"),
        Err(PersistenceError::NotFound(_))
    ));
}
