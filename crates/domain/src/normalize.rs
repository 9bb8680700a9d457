// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity normalization for dedup comparisons.
//!
//! Every comparison of staff names, store names, stock names and EANs goes
//! through [`normalize_key`] so that casing, Unicode compatibility forms and
//! stray whitespace never produce two entities for the same thing.

use unicode_normalization::UnicodeNormalization;

/// Normalizes a value for identity comparison.
///
/// Applies NFKC composition, collapses whitespace runs to a single space,
/// trims, and lowercases.
///
/// # Arguments
///
/// * `value` - The raw value
#[must_use]
pub fn normalize_key(value: &str) -> String {
    let composed: String = value.nfkc().collect();
    composed
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizes a raw field value for storage: surrounding whitespace is removed.
#[must_use]
pub fn normalize_value(value: &str) -> &str {
    value.trim()
}
