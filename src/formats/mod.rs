//! File format adapters
//!
//! Wiggle blocks and tracks, and the region files used to query them.

pub mod region;
pub mod track;
pub mod wig;

pub use region::{parse_region_line, read_regions, RegionReader};
pub use track::{IntersectMode, Track};
pub use wig::{
    is_header_line, is_meta_line, OutputFormat, PartialPolicy, WigBlock, WigDeclaration,
    WigFormat,
};
