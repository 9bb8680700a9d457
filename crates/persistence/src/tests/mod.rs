// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod request_property_tests;
mod request_tests;
mod session_tests;
mod staff_stock_tests;

use d1_store_domain::{NewUniformRequest, RequestPolicy, StaffRole};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::Persistence;

pub const SHIRT_EAN: &str = "5012345678900";
pub const SHIRT_NAME: &str = "Polo Shirt";

pub fn t0() -> OffsetDateTime {
    datetime!(2026-01-07 09:00 UTC)
}

pub fn policy() -> RequestPolicy {
    RequestPolicy::default()
}

/// Creates a store and one staff member in it.
pub fn seed_staff(persistence: &mut Persistence, name: &str, uniform_limit: Option<u32>) -> i64 {
    let store_id: i64 = persistence
        .list_stores()
        .unwrap()
        .first()
        .map(|store| store.id)
        .unwrap_or_else(|| persistence.create_store("Central").unwrap());
    persistence
        .create_staff(name, StaffRole::Staff, store_id, uniform_limit)
        .unwrap()
}

pub fn seed_shirts(persistence: &mut Persistence, qty: i64) -> i64 {
    persistence
        .create_stock_item(SHIRT_EAN, SHIRT_NAME, qty)
        .unwrap()
}

pub fn shirt_request(staff_id: i64, quantity: i64) -> NewUniformRequest {
    NewUniformRequest::new(staff_id, SHIRT_EAN, SHIRT_NAME, quantity, None).unwrap()
}

pub fn shirt_stock(persistence: &mut Persistence) -> i64 {
    persistence
        .find_stock_item(SHIRT_EAN, SHIRT_NAME)
        .unwrap()
        .unwrap()
        .qty
}
