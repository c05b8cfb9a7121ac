//! Store-level failures, classified by category

use thiserror::Error;

/// Failure reported by a [`RecordStore`](crate::RecordStore)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The identifier is not a well-formed store id
    #[error("Malformed identifier: {0}")]
    MalformedId(String),

    /// A value could not be converted to the type the store expects
    #[error("Cast error: {0}")]
    Cast(String),

    /// The store refused a document as invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connectivity, server or any other unclassified failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Coarse category the service layer maps onto its error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCategory {
    MalformedId,
    Cast,
    Validation,
    Other,
}

impl StoreError {
    #[must_use]
    pub fn category(&self) -> StoreErrorCategory {
        match self {
            Self::MalformedId(_) => StoreErrorCategory::MalformedId,
            Self::Cast(_) => StoreErrorCategory::Cast,
            Self::Validation(_) => StoreErrorCategory::Validation,
            Self::Backend(_) => StoreErrorCategory::Other,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        // Server codes: 2 BadValue, 14 TypeMismatch, 121 DocumentValidationFailure,
        // 16755 geo key extraction (coordinates outside the 2dsphere domain).
        match err.kind.as_ref() {
            // Decoding only happens on stored documents, never on caller input
            ErrorKind::BsonDeserialization(_) => Self::Backend(err.to_string()),
            ErrorKind::BsonSerialization(_) => Self::Cast(err.to_string()),
            ErrorKind::InvalidArgument { message, .. } => Self::Cast(message.clone()),
            ErrorKind::Command(command) if matches!(command.code, 2 | 14) => {
                Self::Cast(command.message.clone())
            }
            ErrorKind::Command(command) if matches!(command.code, 121 | 16755) => {
                Self::Validation(command.message.clone())
            }
            ErrorKind::Write(WriteFailure::WriteError(write)) if matches!(write.code, 121 | 16755) => {
                Self::Validation(write.message.clone())
            }
            ErrorKind::Write(WriteFailure::WriteError(write)) if matches!(write.code, 2 | 14) => {
                Self::Cast(write.message.clone())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

impl From<bson::oid::Error> for StoreError {
    fn from(err: bson::oid::Error) -> Self {
        Self::MalformedId(err.to_string())
    }
}
