use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Server code for a unique index violation.
pub const DUPLICATE_KEY: i32 = 11000;

/// Server code for a write rejected by a collection validator.
pub const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("document does not match the {collection} schema: {}", .violations.join("; "))]
    SchemaViolation {
        collection: String,
        violations: Vec<String>,
    },
    #[error("duplicate key in {collection}: {message}")]
    DuplicateKey { collection: String, message: String },
    #[error("document rejected by the {collection} validator: {message}")]
    DocumentValidation { collection: String, message: String },
    #[error("unexpected server reply: {0}")]
    Reply(String),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("bson serialization failed")]
    BsonSer(#[from] mongodb::bson::ser::Error),
    #[error("bson deserialization failed")]
    BsonDe(#[from] mongodb::bson::de::Error),
}

impl Error {
    /// Classify a driver error raised while writing to `collection`.
    ///
    /// Duplicate keys and validator rejections get their own variants, every
    /// other failure is kept as the raw driver error.
    #[must_use]
    pub fn from_write(collection: &str, err: mongodb::error::Error) -> Self {
        match server_code(&err) {
            Some(DUPLICATE_KEY) => Self::DuplicateKey {
                collection: collection.to_string(),
                message: server_message(&err),
            },
            Some(DOCUMENT_VALIDATION_FAILURE) => Self::DocumentValidation {
                collection: collection.to_string(),
                message: server_message(&err),
            },
            _ => Self::Mongo(err),
        }
    }

    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::DocumentValidation { .. } | Self::SchemaViolation { .. }
        )
    }
}

/// Server error code carried by a write or command failure, if any.
#[must_use]
pub fn server_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern_error)) => {
            Some(concern_error.code)
        }
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

fn server_message(err: &mongodb::error::Error) -> String {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.message.clone(),
        ErrorKind::Command(command_error) => command_error.message.clone(),
        _ => err.to_string(),
    }
}
