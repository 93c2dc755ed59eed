use thiserror::Error;

use crate::types::Command;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("insert or update violates foreign key constraint")]
    ForeignKeyViolation,

    #[error("null value in column \"{column}\" violates not-null constraint")]
    NotNullViolation { column: String },

    #[error("new row violates row-level security policy for table \"{table}\" ({command})")]
    PolicyViolation { table: String, command: Command },

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
