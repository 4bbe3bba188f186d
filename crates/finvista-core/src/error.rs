//! Error types for finvista-core

use finvista_parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Statement error: {0}")]
    Parse(#[from] ParseError),

    #[error("Statement contains no valid transactions")]
    EmptyStatement,
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
