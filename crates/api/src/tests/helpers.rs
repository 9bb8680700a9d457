// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use d1_store_domain::{ActorKind, RequestPolicy, StaffRole, TransitionPolicy};
use d1_store_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{AuthenticatedActor, CreateRequestRequest, ImportCsvRequest, OperatorDirectory};

/// Lowest cost bcrypt accepts, to keep tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub const ADMIN_LOGIN: &str = "admin@d1.example";
pub const ADMIN_PASSWORD: &str = "correct-horse";
pub const DISPATCH_LOGIN: &str = "dispatch@d1.example";
pub const DISPATCH_PASSWORD: &str = "battery-staple";

pub const SHIRT_EAN: &str = "5012345678900";
pub const SHIRT_NAME: &str = "Polo Shirt";

pub fn t0() -> OffsetDateTime {
    datetime!(2026-01-07 09:00 UTC)
}

pub fn setup_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(
        String::from(ADMIN_LOGIN),
        String::from("Store Admin"),
        ActorKind::Admin,
        datetime!(2026-01-07 17:00 UTC),
    )
}

pub fn create_test_dispatcher() -> AuthenticatedActor {
    AuthenticatedActor::new(
        String::from(DISPATCH_LOGIN),
        String::from("Warehouse"),
        ActorKind::DispatchAdmin,
        datetime!(2026-01-07 17:00 UTC),
    )
}

pub fn create_test_directory() -> OperatorDirectory {
    let mut directory: OperatorDirectory = OperatorDirectory::new(TEST_BCRYPT_COST);
    directory
        .add(ADMIN_LOGIN, "Store Admin", ActorKind::Admin, ADMIN_PASSWORD)
        .unwrap();
    directory
        .add(
            DISPATCH_LOGIN,
            "Warehouse",
            ActorKind::DispatchAdmin,
            DISPATCH_PASSWORD,
        )
        .unwrap();
    directory
}

pub fn policy() -> RequestPolicy {
    RequestPolicy::default()
}

pub fn transitions() -> TransitionPolicy {
    TransitionPolicy::default()
}

pub fn upload(file_name: &str, csv_content: &str) -> ImportCsvRequest {
    ImportCsvRequest {
        file_name: Some(file_name.to_string()),
        csv_content: csv_content.to_string(),
    }
}

/// Creates a store and a staff member in it.
pub fn seed_staff(persistence: &mut Persistence, name: &str, uniform_limit: Option<u32>) -> i64 {
    let store_id: i64 = persistence.create_store(&format!("{name} Store")).unwrap();
    persistence
        .create_staff(name, StaffRole::Staff, store_id, uniform_limit)
        .unwrap()
}

pub fn seed_shirts(persistence: &mut Persistence, qty: i64) -> i64 {
    persistence
        .create_stock_item(SHIRT_EAN, SHIRT_NAME, qty)
        .unwrap()
}

pub fn shirt_order(quantity: i64) -> CreateRequestRequest {
    CreateRequestRequest {
        ean: String::from(SHIRT_EAN),
        name: String::from(SHIRT_NAME),
        quantity,
        notes: None,
    }
}

pub fn shirt_stock(persistence: &mut Persistence) -> i64 {
    persistence
        .find_stock_item(SHIRT_EAN, SHIRT_NAME)
        .unwrap()
        .unwrap()
        .qty
}
