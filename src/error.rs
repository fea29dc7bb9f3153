//! Error types for cache operations

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxoCacheError {
    #[error("Label already mapped to ordinal {existing}, refusing to remap to {requested}")]
    OrdinalConflict { existing: i32, requested: i32 },

    #[error("Lock acquisition timed out after {0:?}")]
    LockTimeout(Duration),

    #[error("Cache has been closed")]
    Closed,

    #[error("Label has {0} components, maximum is 65535")]
    TooManyComponents(usize),

    #[error("Label component is {0} UTF-16 units long, maximum is 65535")]
    ComponentTooLong(usize),

    #[error("Corrupt cache stream: {0}")]
    CorruptStream(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaxoCacheError>;
