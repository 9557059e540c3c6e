//! wigtools - manipulate wiggle track files
//!
//! Parses fixedStep/variableStep wiggle files into ordered tracks and
//! operates on them: coordinate-base switching, sorting, per-block
//! statistics, and intersection with sorted region lists, either keeping
//! whole blocks (`query`) or re-tiling the data into new windows
//! (`reshape`).
//!
//! # Features
//!
//! - Linear-time sorted merge-join with order validation on both inputs
//! - Fractional redistribution of values over partially covered windows
//! - Wiggle and bedGraph output in 0- or 1-based coordinates
//! - Transparent gzip/bzip2 input and memory-mapped large files
//!
//! # Example
//!
//! ```
//! use wigtools::{CoordBase, OutputFormat, PartialPolicy, Region, Track};
//!
//! let track = Track::parse_str(
//!     "fixedStep chrom=chr1 start=1 step=1\n1\n2\n3\n4\n",
//!     CoordBase::One,
//! )?;
//! let windows = vec![Region::new("chr1", 2, 3)];
//! let reshaped = track.reshape(windows, None, PartialPolicy::Fraction)?;
//! assert_eq!(
//!     reshaped.stringify(OutputFormat::BedGraph, None)?,
//!     "chr1\t2\t2\t2.0\nchr1\t3\t3\t3.0\n"
//! );
//! # Ok::<(), wigtools::WiggleError>(())
//! ```

pub mod core;
pub mod formats;
pub mod tools;

// Re-export commonly used types
pub use core::{
    chrom_to_sortable, compare_regions, regions_overlap, CoordBase, Region, Result, Stat,
    StatValue, WiggleError,
};
pub use formats::{
    IntersectMode, OutputFormat, PartialPolicy, RegionReader, Track, WigBlock, WigDeclaration,
    WigFormat,
};
