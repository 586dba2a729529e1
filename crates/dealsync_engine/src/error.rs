//! Error types for the reconciliation engine.

use thiserror::Error;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a reconciliation pass.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The batch destination read failed. Fatal to the pass.
    #[error("destination read failed: {0}")]
    DestinationRead(String),

    /// A destination write failed. Isolated to one record.
    #[error("destination write failed for '{id}': {message}")]
    DestinationWrite {
        /// Identity of the record being written.
        id: String,
        /// Error message from the destination.
        message: String,
    },

    /// A record is missing required fields. Isolated to one record.
    #[error("missing required fields: {}", missing.join(", "))]
    MissingFields {
        /// The required fields that were absent or null.
        missing: Vec<String>,
    },

    /// A record has no usable identity. Isolated to one record.
    #[error("record has no usable identity in field '{0}'")]
    MissingIdentity(String),
}

impl SyncError {
    /// Creates a destination read error.
    pub fn destination_read(message: impl Into<String>) -> Self {
        Self::DestinationRead(message.into())
    }

    /// Creates a destination write error.
    pub fn destination_write(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DestinationWrite {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Returns true if the failure is isolated to a single record.
    ///
    /// Record-scoped errors are caught, counted, and never abort the
    /// pass; anything else does.
    pub fn is_record_scoped(&self) -> bool {
        !matches!(self, SyncError::DestinationRead(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_scoping() {
        assert!(!SyncError::destination_read("listing timed out").is_record_scoped());
        assert!(SyncError::destination_write("deal-1", "rate limited").is_record_scoped());
        assert!(SyncError::MissingIdentity("id".to_string()).is_record_scoped());
    }

    #[test]
    fn error_display() {
        let err = SyncError::MissingFields {
            missing: vec!["id".to_string(), "name".to_string()],
        };
        assert_eq!(err.to_string(), "missing required fields: id, name");

        let err = SyncError::destination_write("deal-1", "boom");
        assert_eq!(err.to_string(), "destination write failed for 'deal-1': boom");
    }
}
