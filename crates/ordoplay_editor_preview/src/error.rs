// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the preview crate.
//!
//! Timeline operations themselves never fail: degenerate numbers are clamped
//! to safe defaults. Only configuration can be rejected.

use thiserror::Error;

/// Preview errors
#[derive(Debug, Error)]
pub enum PreviewError {
    /// A configuration value is out of its usable range
    #[error("Invalid preview config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration text could not be parsed
    #[error("Failed to parse preview config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

/// Result type for preview operations
pub type Result<T> = std::result::Result<T, PreviewError>;
