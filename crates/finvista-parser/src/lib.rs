//! Bank statement parser
//!
//! Parses `;`-delimited bank statement exports into normalized records.

use async_trait::async_trait;
use std::path::PathBuf;

pub mod error;
pub mod parser;
pub mod record;

pub use error::ParseError;
pub use parser::StatementParser;
pub use record::{IngestStats, ParseOutcome, StatementRecord, DEFAULT_CATEGORY};

/// Default statement size limit enforced before parsing
pub const MAX_STATEMENT_BYTES: u64 = 5 * 1024 * 1024;

/// Trait for statement sources
#[async_trait]
pub trait StatementSource: Send + Sync {
    /// Parse raw statement text
    async fn parse(&self, content: &str) -> Result<ParseOutcome, ParseError>;

    /// Read and parse a statement file, enforcing the ingest boundary
    /// (`.csv` suffix, size limit) before any bytes reach the parser
    async fn parse_file(&self, path: PathBuf) -> Result<ParseOutcome, ParseError>;
}

/// Default source implementation
#[derive(Debug, Clone)]
pub struct DefaultStatementSource {
    max_file_bytes: u64,
}

impl DefaultStatementSource {
    pub fn new(max_file_bytes: u64) -> Self {
        Self { max_file_bytes }
    }
}

impl Default for DefaultStatementSource {
    fn default() -> Self {
        Self::new(MAX_STATEMENT_BYTES)
    }
}

#[async_trait]
impl StatementSource for DefaultStatementSource {
    async fn parse(&self, content: &str) -> Result<ParseOutcome, ParseError> {
        StatementParser::parse(content)
    }

    async fn parse_file(&self, path: PathBuf) -> Result<ParseOutcome, ParseError> {
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ParseError::UnsupportedFile {
                path: path.to_string_lossy().to_string(),
            });
        }

        let meta = tokio::fs::metadata(&path).await?;
        if meta.len() > self.max_file_bytes {
            return Err(ParseError::FileTooLarge {
                size: meta.len(),
                limit: self.max_file_bytes,
            });
        }

        let content = tokio::fs::read_to_string(&path).await?;
        StatementParser::parse(&content)
    }
}
