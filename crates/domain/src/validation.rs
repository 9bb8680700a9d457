// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Validates a staff display name.
///
/// # Errors
///
/// Returns an error if the name is empty after trimming.
pub fn validate_display_name(display_name: &str) -> Result<&str, DomainError> {
    let trimmed: &str = display_name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDisplayName(String::from(
            "Display name cannot be empty",
        )));
    }
    Ok(trimmed)
}

/// Validates a stock item name.
///
/// # Errors
///
/// Returns an error if the name is empty after trimming.
pub fn validate_item_name(name: &str) -> Result<&str, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidItemName(String::from(
            "Item name cannot be empty",
        )));
    }
    Ok(trimmed)
}

/// Validates a requested quantity.
///
/// # Errors
///
/// Returns an error unless the quantity is at least 1.
pub const fn validate_quantity(quantity: i64) -> Result<i64, DomainError> {
    if quantity < 1 {
        return Err(DomainError::InvalidQuantity { quantity });
    }
    Ok(quantity)
}

/// Validates an administrative uniform limit.
///
/// # Errors
///
/// Returns an error unless the limit is a positive integer that fits in `u32`.
pub fn validate_uniform_limit(limit: i64) -> Result<u32, DomainError> {
    match u32::try_from(limit) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(DomainError::InvalidUniformLimit { limit }),
    }
}
