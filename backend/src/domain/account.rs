//! Staff account aggregate and the admin-facing command payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

/// Numeric account identifier assigned by the upstream records API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Staff account as returned by the upstream directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Stable identifier; referenced weakly by requests as creator/agent.
    pub id: AccountId,
    /// Login name, unique upstream.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// The single role granted to this account.
    pub role: Role,
}

/// Validation errors for account command payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    UsernameTooShort { min: usize },
    InvalidEmail,
    EmptyPassword,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::InvalidEmail => write!(f, "email must contain an @ separator"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Minimum allowed username length.
pub const USERNAME_MIN: usize = 3;

fn validate_identity(username: &str, email: &str) -> Result<(), AccountValidationError> {
    if username.trim().chars().count() < USERNAME_MIN {
        return Err(AccountValidationError::UsernameTooShort { min: USERNAME_MIN });
    }
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AccountValidationError::InvalidEmail);
    }
    Ok(())
}

/// Payload for provisioning a new staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    /// Initial credential, forwarded verbatim to the upstream issuer.
    pub password: String,
    pub role: Role,
}

impl NewAccount {
    /// Check invariants before any network call is issued.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        validate_identity(&self.username, &self.email)?;
        if self.password.is_empty() {
            return Err(AccountValidationError::EmptyPassword);
        }
        Ok(())
    }
}

/// Payload for updating an existing staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl AccountUpdate {
    /// Check invariants before any network call is issued.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        validate_identity(&self.username, &self.email)
    }
}
