//! Core track primitives
//!
//! This module contains the chromosome ordering, region relations,
//! summary statistics, error types and I/O plumbing shared by the
//! format adapters.

mod chrom;
mod error;
pub mod io;
mod region;
mod stats;

pub use chrom::{chrom_to_sortable, HASH_MODULUS};
pub use error::{Result, Stream, WiggleError};
pub use io::{
    detect_compression, open_input, open_output, CompressionFormat, IoStrategy, LineIterator,
    OutputWriter, SmartReader, DEFAULT_BUFFER_SIZE, LARGE_BUFFER_SIZE, MMAP_THRESHOLD,
};
pub use region::{compare_regions, regions_overlap, CoordBase, Region};
pub use stats::{format_value, summarize, Stat, StatValue};
