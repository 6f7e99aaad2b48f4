//! Error taxonomy for the assistant pipeline.
//!
//! Each pipeline stage has its own error type; the propagation policy is
//! that per-query failures are absorbed close to where they happen.
//! Extraction failures become placeholder strings, embedding failures
//! degrade retrieval to an empty result, and generation failures are
//! rendered as a marked answer string. Only startup-time errors
//! (configuration, history database) abort the process.

use thiserror::Error;

/// Failure while turning an uploaded document into text.
///
/// Never crosses the pipeline boundary as an error; the extractor
/// converts it into a descriptive placeholder string.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl ExtractError {
    pub fn parse<E: std::fmt::Display>(err: E) -> Self {
        ExtractError::Parse(err.to_string())
    }
}

/// Failure while computing an embedding vector.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding provider error: {0}")]
    Provider(String),
    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for EmbedError {
    fn from(err: reqwest::Error) -> Self {
        EmbedError::Request(err.to_string())
    }
}

/// Failure in the vector index.
///
/// An empty result set is not an error. The only per-query failure is a
/// query vector whose dimensionality does not match the stored vectors;
/// the remaining variants cover index persistence.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("query dimension {got} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("index build error: {0}")]
    Build(String),
    #[error("index artifact error: {0}")]
    Persist(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure from the external text-generation capability.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation provider error: {0}")]
    Provider(String),
    #[error("malformed generation response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

/// Startup-time configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

/// History database failure.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history db error: {0}")]
    Db(String),
}

impl HistoryError {
    pub fn db<E: std::fmt::Display>(err: E) -> Self {
        HistoryError::Db(err.to_string())
    }
}
