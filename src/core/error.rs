//! Error types for wigtools
//!
//! Defines all error types used throughout the library.

use std::fmt;
use thiserror::Error;

use crate::core::Region;

/// Which side of a merge-join an element came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// The blocks of the track being intersected
    Track,
    /// The caller-supplied query regions
    Query,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Track => write!(f, "wiggle track"),
            Stream::Query => write!(f, "query regions"),
        }
    }
}

/// Main error type for wigtools operations
#[derive(Debug, Error)]
pub enum WiggleError {
    /// A data line does not have the column count its block expects
    #[error("Invalid data line: {0}")]
    InvalidDataLine(String),

    /// A meta line (fixedStep/variableStep) could not be parsed
    #[error("Invalid meta line: {0}")]
    InvalidMetaLine(String),

    /// Serialization requested in a format other than wiggle/bedgraph
    #[error("Unsupported stringify format: '{0}' (expected 'wiggle' or 'bedgraph')")]
    UnsupportedFormat(String),

    /// Either merge-join input is not ascending
    #[error("{stream} not sorted: {current} appears after {previous}")]
    UnsortedFile {
        stream: Stream,
        previous: String,
        current: String,
    },

    /// Blocks of different spans would be merged into one reshaped block
    #[error("Cannot merge blocks with different spans ({expected}, {found}) that intersect with region {query}")]
    Reshape {
        expected: i64,
        found: i64,
        query: Region,
    },

    /// Malformed line in a region (BED) file
    #[error("Invalid region at line {line}: {message}")]
    InvalidRegionLine { line: usize, message: String },

    /// Unknown statistic name
    #[error("Unknown statistic '{0}' (expected one of min, max, mean, median, sum, count, bp)")]
    UnknownStatistic(String),

    /// Unknown partial-overlap policy
    #[error("Unknown partial policy '{0}' (expected 'fraction' or 'whole')")]
    UnknownPartialPolicy(String),

    /// Coordinate base other than 0 or 1
    #[error("Invalid coordinate base '{0}' (expected 0 or 1)")]
    InvalidBase(String),

    /// An error raised while parsing a specific input line
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<WiggleError>,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WiggleError {
    /// Attach a 1-based input line number to this error
    pub fn at_line(self, line: usize) -> Self {
        WiggleError::AtLine {
            line,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any line context removed
    pub fn root(&self) -> &WiggleError {
        match self {
            WiggleError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for wigtools operations
pub type Result<T> = std::result::Result<T, WiggleError>;
