// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allowance and cooldown rules for request submission.
//!
//! These functions are pure. The persistence layer feeds them values read
//! inside the submission transaction so the checks and the write see the
//! same snapshot.

use time::{Duration, OffsetDateTime};

/// The request would take the staff member past their allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceExceeded {
    pub uniform_limit: u32,
    pub total_ordered: i64,
    pub requested: i64,
}

/// The staff member submitted too recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownActive {
    pub last_requested_at: OffsetDateTime,
    pub next_allowed_at: OffsetDateTime,
}

/// Checks a requested quantity against the remaining allowance.
///
/// # Arguments
///
/// * `uniform_limit` - The staff member's limit, `None` for unlimited
/// * `total_ordered` - Sum of quantities over non-cancelled requests
/// * `requested` - The quantity being requested
///
/// # Errors
///
/// Returns `AllowanceExceeded` if `requested > limit - total_ordered`.
pub fn check_allowance(
    uniform_limit: Option<u32>,
    total_ordered: i64,
    requested: i64,
) -> Result<(), AllowanceExceeded> {
    let Some(limit) = uniform_limit else {
        return Ok(());
    };

    if requested > i64::from(limit) - total_ordered {
        return Err(AllowanceExceeded {
            uniform_limit: limit,
            total_ordered,
            requested,
        });
    }
    Ok(())
}

/// Checks that the cooldown window since the last submission has elapsed.
///
/// The window is half-open: a submission exactly at
/// `last + window` is allowed.
///
/// # Errors
///
/// Returns `CooldownActive` if `now < last + window`.
pub fn check_cooldown(
    last_requested_at: Option<OffsetDateTime>,
    now: OffsetDateTime,
    window: Duration,
) -> Result<(), CooldownActive> {
    let Some(last) = last_requested_at else {
        return Ok(());
    };

    let next_allowed_at: OffsetDateTime = last.saturating_add(window);
    if now < next_allowed_at {
        return Err(CooldownActive {
            last_requested_at: last,
            next_allowed_at,
        });
    }
    Ok(())
}

/// Snapshot of whether a staff member may submit right now.
///
/// `can_request` reflects the cooldown only; `remaining` reports the
/// allowance separately because the quantity is not known yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub can_request: bool,
    pub cooldown_hours: u32,
    pub last_requested_at: Option<OffsetDateTime>,
    /// Set only while the cooldown is active.
    pub next_allowed_at: Option<OffsetDateTime>,
    pub uniform_limit: Option<u32>,
    pub total_ordered: i64,
    pub total_requests: i64,
    /// `None` when the limit is unlimited.
    pub remaining: Option<i64>,
}

impl Eligibility {
    /// Evaluates eligibility from a staff member's request history.
    ///
    /// # Arguments
    ///
    /// * `uniform_limit` - The staff member's limit
    /// * `total_ordered` - Sum of quantities over non-cancelled requests
    /// * `total_requests` - Number of non-cancelled requests
    /// * `last_requested_at` - Creation time of the latest request of any status
    /// * `now` - The evaluation instant
    /// * `cooldown_hours` - The cooldown window in hours
    #[must_use]
    pub fn evaluate(
        uniform_limit: Option<u32>,
        total_ordered: i64,
        total_requests: i64,
        last_requested_at: Option<OffsetDateTime>,
        now: OffsetDateTime,
        cooldown_hours: u32,
    ) -> Self {
        let window: Duration = Duration::hours(i64::from(cooldown_hours));
        let next_allowed_at: Option<OffsetDateTime> = check_cooldown(last_requested_at, now, window)
            .err()
            .map(|active| active.next_allowed_at);
        let remaining: Option<i64> =
            uniform_limit.map(|limit| (i64::from(limit) - total_ordered).max(0));

        Self {
            can_request: next_allowed_at.is_none(),
            cooldown_hours,
            last_requested_at,
            next_allowed_at,
            uniform_limit,
            total_ordered,
            total_requests,
            remaining,
        }
    }
}
