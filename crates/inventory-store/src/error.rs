use thiserror::Error;

/// Errors that can occur when interacting with the inventory store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same id already exists.
    #[error("Duplicate {table} id: {id}")]
    DuplicateId { table: &'static str, id: String },

    /// A stored record could not be mapped back into the domain model.
    #[error("Corrupt {table} record {id}: {reason}")]
    CorruptRecord {
        table: &'static str,
        id: String,
        reason: String,
    },

    /// The backing store refused or failed the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for inventory store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
