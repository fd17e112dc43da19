//! Error types for the focuser host.
//!
//! Highlight computation itself never fails; these cover terminal I/O,
//! configuration and screen bookkeeping.

use thiserror::Error;

use crate::types::ViewId;

/// Result type alias for fallible focuser operations.
pub type Result<T> = std::result::Result<T, FocuserError>;

#[derive(Error, Debug)]
pub enum FocuserError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid span: {0}")]
    InvalidSpan(String),

    #[error("no such view: {0}")]
    InvalidView(ViewId),

    #[error("layout error: {0}")]
    Layout(String),
}

impl From<taffy::TaffyError> for FocuserError {
    fn from(e: taffy::TaffyError) -> Self {
        FocuserError::Layout(format!("{e:?}"))
    }
}
