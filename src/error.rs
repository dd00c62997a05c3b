// Copyright (c) 2026 The bloomer developers
//
// Licensed under the MIT license.

//! Error types for filter construction, merging and persistence.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by filter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not a filter in the supported binary format.
    #[error("invalid filter format: {0}")]
    Format(String),

    /// Two filters being joined were built with different dimensions.
    #[error("cannot join filters: {field} differs ({ours} vs {theirs})")]
    DimensionMismatch {
        /// Name of the first differing field.
        field: &'static str,
        /// Value in the receiving filter.
        ours: String,
        /// Value in the joined filter.
        theirs: String,
    },

    /// Joining would overflow the element counter.
    #[error("cannot join filters: element count {ours} + {theirs} overflows")]
    CountOverflow {
        /// Element count of the receiving filter.
        ours: u64,
        /// Element count of the joined filter.
        theirs: u64,
    },
}

impl Error {
    pub(crate) fn mismatch(
        field: &'static str,
        ours: impl ToString,
        theirs: impl ToString,
    ) -> Self {
        Self::DimensionMismatch {
            field,
            ours: ours.to_string(),
            theirs: theirs.to_string(),
        }
    }

    pub(crate) fn truncated(field: &str) -> Self {
        Self::Format(format!("unexpected end of input while reading {field}"))
    }
}
