// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tracking identifier generation.
//!
//! Identifiers look like `D1-20260117-S42-7QXA`. They are not guaranteed
//! unique; the database constraint is authoritative and callers retry with
//! a fresh identifier on collision.

use time::Date;

/// Symbols used for the random suffix.
pub const TRACKING_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random symbols at the end of every identifier.
pub const TRACKING_SUFFIX_LEN: usize = 4;

/// Builds `PREFIX-YYYYMMDD-S<staff>-<suffix>` identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingIdGenerator {
    prefix: String,
}

impl TrackingIdGenerator {
    /// Creates a generator for the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generates an identifier drawing suffix symbols from `pick`.
    ///
    /// `pick` receives the alphabet length and returns an index; values out
    /// of range wrap around.
    ///
    /// # Arguments
    ///
    /// * `date` - The creation date
    /// * `staff_id` - The requesting staff member
    /// * `pick` - Source of suffix indices
    #[must_use]
    pub fn generate_with<F>(&self, date: Date, staff_id: i64, mut pick: F) -> String
    where
        F: FnMut(usize) -> usize,
    {
        let suffix: String = (0..TRACKING_SUFFIX_LEN)
            .map(|_| {
                let index: usize = pick(TRACKING_ALPHABET.len()) % TRACKING_ALPHABET.len();
                char::from(TRACKING_ALPHABET[index])
            })
            .collect();

        format!(
            "{}-{:04}{:02}{:02}-S{staff_id}-{suffix}",
            self.prefix,
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }

    /// Generates an identifier with a random suffix.
    #[must_use]
    pub fn generate(&self, date: Date, staff_id: i64) -> String {
        self.generate_with(date, staff_id, |len| usize::from(rand::random::<u16>()) % len)
    }
}
