//! Error types for finvista-parser

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type: {path}")]
    UnsupportedFile { path: String },
}
