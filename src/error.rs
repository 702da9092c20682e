use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur when building members or moving them to and from storage.
///
/// Looking up or removing an absent id and inserting a duplicate id are not errors. Those
/// outcomes are reported through `Option` and [`crate::Inserted`].
#[derive(Error, Debug)]
pub enum Error {
    /// Memory for a duplicated name could not be reserved.
    #[error("Failed to allocate member name: {0}")]
    Allocation(#[from] TryReserveError),

    /// The backing file could not be opened, written, or flushed.
    #[error("Storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited writer failed while serializing a member.
    #[error("Failed to write member record: {0}")]
    Csv(#[from] csv::Error),

    /// The configured log filter could not be parsed.
    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    /// A line could not be decoded into a member.
    #[error("Malformed member record {line:?}: {reason}")]
    Malformed {
        /// The offending line, without its terminator.
        line: String,
        /// Why decoding failed.
        reason: String,
    },
}

/// A result whose error defaults to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
