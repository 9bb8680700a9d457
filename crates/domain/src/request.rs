// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::request_status::RequestStatus;
use crate::validation::{validate_item_name, validate_quantity};
use time::OffsetDateTime;

/// A persisted uniform request.
///
/// `ean` and `item_name` are copied from the stock item at creation so the
/// request keeps its meaning even if the item is later renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformRequest {
    pub id: i64,
    pub tracking_id: String,
    pub staff_id: i64,
    pub stock_item_id: i64,
    pub ean: String,
    pub item_name: String,
    pub quantity: i64,
    pub status: RequestStatus,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated input for creating a uniform request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUniformRequest {
    pub staff_id: i64,
    pub ean: String,
    pub item_name: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl NewUniformRequest {
    /// Validates and builds a request input.
    ///
    /// Blank notes are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the EAN or item name is empty or the quantity is
    /// not positive.
    pub fn new(
        staff_id: i64,
        ean: &str,
        item_name: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> Result<Self, DomainError> {
        let ean: &str = ean.trim();
        if ean.is_empty() {
            return Err(DomainError::InvalidEan(ean.to_string()));
        }
        let item_name: &str = validate_item_name(item_name)?;
        let quantity: i64 = validate_quantity(quantity)?;
        let notes: Option<String> = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            staff_id,
            ean: ean.to_string(),
            item_name: item_name.to_string(),
            quantity,
            notes,
        })
    }
}

/// Pre-filled input for a new request based on a collected one.
///
/// Building a draft never touches the source request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderDraft {
    pub source_tracking_id: String,
    pub staff_id: i64,
    pub ean: String,
    pub item_name: String,
    pub quantity: i64,
    pub notes: String,
}

impl ReorderDraft {
    /// Builds a re-order draft from a collected request.
    ///
    /// # Arguments
    ///
    /// * `source` - The collected request
    /// * `reason` - Why the item is being re-ordered
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReorderNotAllowed` if the source is not
    /// `COLLECTED`, or `DomainError::MissingReorderReason` if the reason is blank.
    pub fn from_collected(source: &UniformRequest, reason: &str) -> Result<Self, DomainError> {
        if source.status != RequestStatus::Collected {
            return Err(DomainError::ReorderNotAllowed {
                status: source.status.as_str().to_string(),
            });
        }

        let reason: &str = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::MissingReorderReason);
        }

        Ok(Self {
            source_tracking_id: source.tracking_id.clone(),
            staff_id: source.staff_id,
            ean: source.ean.clone(),
            item_name: source.item_name.clone(),
            quantity: source.quantity,
            notes: format!("Re-order of {}: {reason}", source.tracking_id),
        })
    }
}
