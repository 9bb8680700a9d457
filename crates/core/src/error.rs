// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that reject an import before any row is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The upload is missing or is not a CSV file.
    InvalidUpload(String),
    /// The content could not be tokenized with either delimiter.
    UnparsableCsv(String),
    /// An internal error occurred.
    Internal(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUpload(msg) => write!(f, "{msg}"),
            Self::UnparsableCsv(msg) => write!(f, "Unable to parse CSV: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}
