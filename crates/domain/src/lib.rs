// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod eligibility;
mod error;
mod normalize;
mod policy;
mod request;
mod request_status;
mod tracking;
mod transition_policy;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use eligibility::{AllowanceExceeded, CooldownActive, Eligibility, check_allowance, check_cooldown};
pub use error::DomainError;
pub use normalize::{normalize_key, normalize_value};
pub use policy::{
    DEFAULT_COOLDOWN_HOURS, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TRACKING_PREFIX,
    MAX_TRACKING_ATTEMPTS, RequestPolicy, STAFF_NAME_SCOPE, STOCK_DUPLICATE_KEY, StaffNameScope,
    StockDuplicateKey,
};
pub use request::{NewUniformRequest, ReorderDraft, UniformRequest};
pub use request_status::RequestStatus;
pub use tracking::{TRACKING_ALPHABET, TRACKING_SUFFIX_LEN, TrackingIdGenerator};
pub use transition_policy::{ActorKind, TransitionPolicy, TransitionRule};
pub use types::{Ean, Staff, StaffRole, StockItem, Store};
pub use validation::{validate_display_name, validate_item_name, validate_quantity, validate_uniform_limit};
