// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use d1_store_domain::UniformRequest;

/// Result of a successful request submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRequest {
    pub request: UniformRequest,
    pub requested_quantity: i64,
    /// Stock left on the item after the decrement.
    pub remaining_stock: i64,
    pub is_low_stock: bool,
}

/// A cancelled request and the stock level after the quantity was returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledRequest {
    pub request: UniformRequest,
    pub restored_quantity: i64,
    pub stock_after: i64,
}

/// Stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_token: String,
    pub role: String,
    pub login_email: String,
    pub display_name: String,
    pub created_at: String,
    pub expires_at: String,
}
