//! Attestation type catalog: manager-administered labels and their derived
//! machine codes.
//!
//! The derived code, not the numeric id, is the foreign key stored on an
//! attestation, so the label-to-code mapping must stay deterministic.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Numeric catalog entry identifier assigned upstream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct TypeId(pub i64);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum allowed label length, counted after trimming.
pub const TYPE_LABEL_MIN: usize = 3;

/// Validation errors returned by [`TypeLabel::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLabelValidationError {
    Empty,
    TooShort { min: usize },
}

impl fmt::Display for TypeLabelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "type label must not be blank"),
            Self::TooShort { min } => {
                write!(f, "type label must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for TypeLabelValidationError {}

/// Human-facing attestation type label.
///
/// ## Invariants
/// - Non-blank once trimmed.
/// - At least [`TYPE_LABEL_MIN`] characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct TypeLabel(String);

impl TypeLabel {
    /// Validate and construct a label; surrounding whitespace is trimmed.
    pub fn new(label: impl Into<String>) -> Result<Self, TypeLabelValidationError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(TypeLabelValidationError::Empty);
        }
        if trimmed.chars().count() < TYPE_LABEL_MIN {
            return Err(TypeLabelValidationError::TooShort {
                min: TYPE_LABEL_MIN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the label text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Derive the machine code stored on attestations.
    ///
    /// Lower-cases the label and replaces every non-alphanumeric character
    /// with an underscore.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::TypeLabel;
    ///
    /// let label = TypeLabel::new("Revenu Global").expect("valid label");
    /// assert_eq!(label.derived_code(), "revenu_global");
    /// ```
    pub fn derived_code(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_lowercase().collect::<String>()
                } else {
                    "_".to_owned()
                }
            })
            .collect()
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for TypeLabel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<TypeLabel> for String {
    fn from(value: TypeLabel) -> Self {
        value.0
    }
}

impl TryFrom<String> for TypeLabel {
    type Error = TypeLabelValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Catalog entry as returned by the upstream records API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeCatalogEntry {
    pub id: TypeId,
    pub label: TypeLabel,
    pub created_at: DateTime<Utc>,
}

impl TypeCatalogEntry {
    /// Machine code used as the attestation foreign key.
    pub fn code(&self) -> String {
        self.label.derived_code()
    }
}
