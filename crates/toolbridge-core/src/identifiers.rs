//! Validated identifier types used throughout Toolbridge.
//!
//! All identifiers follow the parse-don't-validate pattern: construction goes
//! through `parse()` and returns a `Result`, so a `ServiceId` or `ToolName`
//! in hand is always well-formed. Each identifier is a distinct newtype, which
//! prevents passing a tool name where a service id is expected.
//!
//! # Validation Rules
//!
//! - Non-empty, maximum 64 characters
//! - No leading or trailing whitespace
//! - Only alphanumeric characters, hyphens (`-`), and underscores (`_`)
//!
//! Dots are reserved as the separator of the qualified `service.tool` form
//! and are therefore not valid inside a bare identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for service ids and tool names.
pub const MAX_ID_LENGTH: usize = 64;

/// Error type for identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier cannot be empty")]
    Empty,
    #[error("identifier cannot have leading or trailing whitespace")]
    SurroundingWhitespace,
    #[error("identifier too long ({length} chars, max {max})")]
    TooLong { length: usize, max: usize },
    #[error(
        "identifier can only contain alphanumeric characters, hyphens, and underscores"
    )]
    InvalidCharacters,
    #[error("qualified name must have the form 'service.tool'")]
    MissingQualifier,
}

fn validate(id: &str) -> Result<&str, IdError> {
    if id.is_empty() {
        return Err(IdError::Empty);
    }
    if id != id.trim() {
        return Err(IdError::SurroundingWhitespace);
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong {
            length: id.len(),
            max: MAX_ID_LENGTH,
        });
    }
    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(IdError::InvalidCharacters);
    }
    Ok(id)
}

macro_rules! identifier_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier from a string.
            pub fn parse(id: impl AsRef<str>) -> Result<Self, IdError> {
                validate(id.as_ref()).map(|s| Self(s.to_string()))
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Create an identifier without validation (for testing only).
            #[doc(hidden)]
            pub fn new_unchecked(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }
    };
}

identifier_type! {
    /// Unique identifier for a registered backend service.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toolbridge_core::identifiers::ServiceId;
    ///
    /// let github = ServiceId::parse("github").unwrap();
    /// assert_eq!(github.as_str(), "github");
    ///
    /// assert!(ServiceId::parse("").is_err());
    /// assert!(ServiceId::parse("svc with spaces").is_err());
    /// ```
    ServiceId
}

identifier_type! {
    /// Name of a single invocable tool contributed by a service.
    ///
    /// Tool names are intended to be unique across the whole registry; the
    /// registry enforces that at registration time.
    ToolName
}

/// A tool name qualified by its owning service, `service.tool`.
///
/// Registry entries are keyed by qualified names internally; the bare
/// [`ToolName`] index exists for backward-compatible name-only resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedToolName {
    service: ServiceId,
    tool: ToolName,
}

impl QualifiedToolName {
    pub fn new(service: ServiceId, tool: ToolName) -> Self {
        Self { service, tool }
    }

    /// Parse the canonical `service.tool` text form.
    pub fn parse(qualified: &str) -> Result<Self, IdError> {
        let (service, tool) = qualified
            .split_once('.')
            .ok_or(IdError::MissingQualifier)?;
        Ok(Self {
            service: ServiceId::parse(service)?,
            tool: ToolName::parse(tool)?,
        })
    }

    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    pub fn tool(&self) -> &ToolName {
        &self.tool
    }
}

impl fmt::Display for QualifiedToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.tool)
    }
}

/// Opaque reference id attached to suppressed internal errors.
///
/// The id is returned to the caller and logged server-side, so an operator
/// can correlate a client report with the full error detail in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh random correlation id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
