//! Error types for S3M module parsing

use std::io;

use thiserror::Error;

/// Errors that can occur when parsing S3M modules
#[derive(Debug, Error)]
pub enum S3mError {
    /// File is too small to be a valid S3M module
    #[error("File too small to be valid S3M module")]
    TooSmall,
    /// Invalid header magic (0x1A marker or "SCRM" signature)
    #[error("Invalid header magic (expected 0x1A marker and 'SCRM')")]
    InvalidMagic,
    /// Instrument record offset is out of bounds
    #[error("Instrument offset out of bounds: 0x{0:08X}")]
    InvalidInstrumentOffset(u32),
    /// Pattern stream offset is out of bounds
    #[error("Pattern offset out of bounds: 0x{0:08X}")]
    InvalidPatternOffset(u32),
    /// Sample data offset is out of bounds
    #[error("Sample data offset out of bounds: 0x{0:08X}")]
    InvalidSampleOffset(u32),
    /// Unexpected end of file
    #[error("Unexpected end of file")]
    UnexpectedEof,
    /// IO error during parsing
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
