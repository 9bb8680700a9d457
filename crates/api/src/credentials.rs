// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator accounts configured at startup.
//!
//! Only administrators and dispatch operators sign in. Their credentials
//! come from server configuration and are hashed with bcrypt once, when the
//! directory is built; plaintext passwords are never kept.

use d1_store_domain::ActorKind;
use thiserror::Error;

/// Minimum length of a configured operator password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors raised while building the operator directory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// The login email is blank.
    #[error("Operator login email must not be empty")]
    MissingLogin,

    /// The password is too short.
    #[error("Password for {login_email} must be at least {min_length} characters long")]
    PasswordTooShort {
        login_email: String,
        min_length: usize,
    },

    /// The same login was configured twice.
    #[error("Operator {login_email} is configured more than once")]
    DuplicateLogin { login_email: String },

    /// Staff members do not sign in.
    #[error("Operators must be admin or dispatch_admin, not {role}")]
    UnsupportedRole { role: String },

    /// Hashing failed.
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// One configured operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorAccount {
    /// Lowercased, trimmed login email.
    pub login_email: String,
    pub display_name: String,
    pub role: ActorKind,
    password_hash: String,
}

impl OperatorAccount {
    /// Checks a password against the stored hash.
    ///
    /// A malformed hash counts as a mismatch.
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// The set of operators allowed to sign in.
#[derive(Debug, Clone)]
pub struct OperatorDirectory {
    accounts: Vec<OperatorAccount>,
    cost: u32,
}

impl Default for OperatorDirectory {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl OperatorDirectory {
    /// Creates an empty directory hashing at the given bcrypt cost.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self {
            accounts: Vec::new(),
            cost,
        }
    }

    /// Adds an operator, hashing their password.
    ///
    /// # Arguments
    ///
    /// * `login_email` - The login, matched case-insensitively
    /// * `display_name` - Name shown in the UI; defaults to the login when blank
    /// * `role` - `Admin` or `DispatchAdmin`
    /// * `password` - The plaintext password
    ///
    /// # Errors
    ///
    /// Returns an error if the login is blank or already present, the role is
    /// `Staff`, the password is too short, or hashing fails.
    pub fn add(
        &mut self,
        login_email: &str,
        display_name: &str,
        role: ActorKind,
        password: &str,
    ) -> Result<(), CredentialError> {
        let login_email: String = login_email.trim().to_lowercase();
        if login_email.is_empty() {
            return Err(CredentialError::MissingLogin);
        }
        if role == ActorKind::Staff {
            return Err(CredentialError::UnsupportedRole {
                role: role.as_str().to_string(),
            });
        }
        if self.find(&login_email).is_some() {
            return Err(CredentialError::DuplicateLogin { login_email });
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialError::PasswordTooShort {
                login_email,
                min_length: MIN_PASSWORD_LENGTH,
            });
        }

        let password_hash: String = bcrypt::hash(password, self.cost)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        let display_name: &str = display_name.trim();
        let display_name: String = if display_name.is_empty() {
            login_email.clone()
        } else {
            display_name.to_string()
        };

        self.accounts.push(OperatorAccount {
            login_email,
            display_name,
            role,
            password_hash,
        });
        Ok(())
    }

    /// Looks up an operator by login, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn find(&self, login_email: &str) -> Option<&OperatorAccount> {
        let login_email: String = login_email.trim().to_lowercase();
        self.accounts
            .iter()
            .find(|account| account.login_email == login_email)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
