// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tunable request rules and dedup key choices.

use time::Duration;

/// Hours a staff member must wait between request submissions.
pub const DEFAULT_COOLDOWN_HOURS: u32 = 24;

/// Quantity at or below which a stock item is flagged as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Prefix of generated tracking identifiers.
pub const DEFAULT_TRACKING_PREFIX: &str = "D1";

/// Attempts at inserting a request before giving up on tracking-id collisions.
pub const MAX_TRACKING_ATTEMPTS: u32 = 5;

/// Scope within which staff display names must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffNameScope {
    /// One display name across the whole organisation.
    Global,
    /// One display name per store.
    PerStore,
}

/// Active staff name scope for imports.
pub const STAFF_NAME_SCOPE: StaffNameScope = StaffNameScope::Global;

/// Which part of an incoming stock row marks it as a duplicate.
///
/// In both modes an EAN already held by a differently named item is
/// renumbered rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDuplicateKey {
    /// A matching name is a duplicate regardless of EAN.
    Name,
    /// Only an identical `(EAN, name)` pair is a duplicate.
    EanAndName,
}

/// Active stock duplicate key for imports.
pub const STOCK_DUPLICATE_KEY: StockDuplicateKey = StockDuplicateKey::Name;

/// Runtime request rules, built from server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPolicy {
    pub cooldown_hours: u32,
    pub low_stock_threshold: i64,
    pub tracking_prefix: String,
    pub max_tracking_attempts: u32,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            cooldown_hours: DEFAULT_COOLDOWN_HOURS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            tracking_prefix: DEFAULT_TRACKING_PREFIX.to_string(),
            max_tracking_attempts: MAX_TRACKING_ATTEMPTS,
        }
    }
}

impl RequestPolicy {
    /// Returns the cooldown window as a duration.
    #[must_use]
    pub fn cooldown_window(&self) -> Duration {
        Duration::hours(i64::from(self.cooldown_hours))
    }

    /// Returns whether `qty` is at or below the low-stock threshold.
    #[must_use]
    pub const fn is_low_stock(&self, qty: i64) -> bool {
        qty <= self.low_stock_threshold
    }
}
