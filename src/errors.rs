//! Unified error type for the journal.
//!
//! Every fallible operation in the crate returns [`Result`]. Storage and
//! serialization failures convert automatically; domain failures carry the
//! offending id or value so callers can report them.

use thiserror::Error;

/// All errors produced by the journal.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Storage backend failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The aggregate could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system failure (import/export, database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record with this id already exists in its collection.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Collection the id collided in ("plant", "activity", "product")
        kind: &'static str,
        /// The colliding id
        id: String,
    },

    /// A measurement or dose is negative, NaN or infinite.
    #[error("Invalid value for {field}: {value}")]
    InvalidMeasurement {
        /// Field name as persisted (e.g. `ecIn`)
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// An imported aggregate failed structural validation.
    #[error("Invalid import: {message}")]
    InvalidImport {
        /// Why the aggregate was rejected
        message: String,
    },

    /// A label did not match any variant of a closed enum.
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Enum being parsed ("growth phase", "activity type")
        kind: &'static str,
        /// The unmatched input
        value: String,
    },

    /// No plant with this id exists.
    #[error("Plant not found: {id}")]
    PlantNotFound {
        /// The requested id
        id: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
