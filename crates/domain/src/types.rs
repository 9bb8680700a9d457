// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Employment role of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Staff,
    Manager,
    Casual,
}

impl StaffRole {
    /// Returns the stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "STAFF",
            Self::Manager => "MANAGER",
            Self::Casual => "CASUAL",
        }
    }

    /// Parses a role as it appears in an uploaded file.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStaffRole` if the value is not
    /// staff, manager, or casual.
    pub fn parse_import(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "staff" => Ok(Self::Staff),
            "manager" => Ok(Self::Manager),
            "casual" => Ok(Self::Casual),
            _ => Err(DomainError::InvalidStaffRole(value.to_string())),
        }
    }
}

impl FromStr for StaffRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_import(s)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A store that staff belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: i64,
    pub name: String,
}

/// A staff member eligible to request uniforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staff {
    pub id: i64,
    pub display_name: String,
    pub role: StaffRole,
    pub store_id: i64,
    /// Maximum cumulative quantity across non-cancelled requests.
    /// `None` means unlimited.
    pub uniform_limit: Option<u32>,
}

/// A stock line, identified by its EAN and name together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    pub id: i64,
    pub ean: String,
    pub name: String,
    pub qty: i64,
}

/// A digits-only barcode identifier.
///
/// Leading zeros are significant and preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ean(String);

impl Ean {
    /// Creates a validated EAN.
    ///
    /// # Arguments
    ///
    /// * `value` - The raw value; surrounding whitespace is ignored
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEan` if the value is empty or contains
    /// anything other than ASCII digits.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidEan(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the EAN digits.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Returns the next EAN in numeric order.
    ///
    /// The digit width is kept (`"0099"` becomes `"0100"`) unless every
    /// digit is a nine, in which case one digit is added (`"999"` becomes
    /// `"1000"`).
    #[must_use]
    pub fn successor(&self) -> Self {
        let mut digits: Vec<u8> = self.0.bytes().collect();
        let mut carry: bool = true;

        for digit in digits.iter_mut().rev() {
            if !carry {
                break;
            }
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
            }
        }

        if carry {
            digits.insert(0, b'1');
        }

        Self(digits.into_iter().map(char::from).collect())
    }
}

impl std::fmt::Display for Ean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
