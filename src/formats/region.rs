//! Region (BED-like) file reader
//!
//! Query regions come from a tab-delimited file whose first three columns
//! are `chrom`, `start` and `end`. Extra columns are ignored. Sortedness
//! is not checked here; the merge-join in [`Track`](crate::formats::Track)
//! does that as it consumes the regions.

use std::io::BufRead;
use std::path::Path;

use crate::core::{open_input, LineIterator, Region, Result, WiggleError};

/// Streaming reader over the regions of a BED-like file
pub struct RegionReader<R: BufRead> {
    lines: LineIterator<R>,
    line_no: usize,
}

impl<R: BufRead> RegionReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineIterator::new(reader),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for RegionReader<R> {
    type Item = Result<Region>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next_line()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if is_skipped(line) {
                continue;
            }
            return Some(parse_region_line(line, self.line_no));
        }
    }
}

#[inline]
fn is_skipped(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

/// Parse one region line; `line_no` is only used for error messages
pub fn parse_region_line(line: &str, line_no: usize) -> Result<Region> {
    let invalid = |message: String| WiggleError::InvalidRegionLine {
        line: line_no,
        message,
    };

    let fields: Vec<&str> = line.split('\t').take(3).collect();
    if fields.len() < 3 {
        return Err(invalid(format!(
            "expected at least 3 tab-separated columns, got {}",
            fields.len()
        )));
    }

    let start: i64 = fields[1]
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid start '{}'", fields[1])))?;
    let end: i64 = fields[2]
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid end '{}'", fields[2])))?;

    Ok(Region::new(fields[0], start, end))
}

/// Read all regions of a file (plain or compressed)
pub fn read_regions<P: AsRef<Path>>(path: P) -> Result<Vec<Region>> {
    RegionReader::new(open_input(Some(path.as_ref()))?).collect()
}
