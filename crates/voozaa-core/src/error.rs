//! Domain errors
//!
//! Store operations fail with a [`TrackerError`], which wraps the three
//! domain error kinds: rejected mutations ([`ValidationError`]), malformed
//! snapshots or tabular data ([`ParseError`]) and broken cross-collection
//! references ([`IntegrityViolation`]).

use thiserror::Error;

/// A mutation was rejected; the store is unchanged
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field is blank after trimming
    #[error("{entity} name must not be blank")]
    BlankName { entity: &'static str },

    /// Lead stage is not one of the configured stage names
    #[error("Unknown lead stage '{0}'")]
    UnknownStage(String),

    /// Customer tag is not part of the configured tag vocabulary
    #[error("Unknown customer tag '{0}'")]
    UnknownTag(String),

    /// A location reference names no existing location
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),

    /// Monetary amounts must be finite and non-negative
    #[error("Invalid {field}: {value} (must be a non-negative number)")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Input text could not be decoded
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text is not valid JSON or does not match the snapshot schema
    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but the top-level value is not an object
    #[error("Invalid snapshot: expected a JSON object at the top level, found {found}")]
    NotAnObject { found: &'static str },

    /// A quoted tabular field was never closed
    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    /// Text follows a closing quote inside a tabular field
    #[error("Unexpected character '{found}' after closing quote on line {line}")]
    TrailingAfterQuote { line: usize, found: char },
}

/// A lead or customer references a location that does not exist
///
/// Unreachable through the public mutation API; observing one is a bug.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity} '{id}' references missing location '{location_id}'")]
pub struct IntegrityViolation {
    pub entity: &'static str,
    pub id: String,
    pub location_id: String,
}

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Integrity(#[from] IntegrityViolation),

    /// Reading caller-supplied import input failed
    #[error("Failed to read import input: {0}")]
    Read(#[from] std::io::Error),
}

impl TrackerError {
    /// Check if this error rejected a mutation without touching the store
    pub fn is_validation(&self) -> bool {
        matches!(self, TrackerError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ValidationError::BlankName { entity: "Lead" };
        assert_eq!(err.to_string(), "Lead name must not be blank");

        let err = ValidationError::InvalidAmount {
            field: "value",
            value: -5.0,
        };
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_tracker_error_wraps_validation() {
        let err: TrackerError = ValidationError::UnknownStage("Foo".to_string()).into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Unknown lead stage 'Foo'");
    }

    #[test]
    fn test_parse_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ParseError = json_err.into();
        assert!(err.to_string().starts_with("Invalid snapshot"));
    }

    #[test]
    fn test_integrity_violation_display() {
        let err = IntegrityViolation {
            entity: "Customer",
            id: "cust_1".to_string(),
            location_id: "loc_9".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cust_1"));
        assert!(msg.contains("loc_9"));
    }
}
