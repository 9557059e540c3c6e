//! Genomic regions and the two region relations used by the merge-join
//!
//! A region's start is expressed in its own coordinate base, its end is
//! base-independent: `[start, end)` in 0-based and `[start, end]` in
//! 1-based coordinates name the same last position. Starts therefore must
//! be normalized before comparison, ends never are.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::chrom_to_sortable;
use crate::core::error::WiggleError;

/// Coordinate base of a track or a region list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CoordBase {
    /// 0-based, half-open
    Zero,
    /// 1-based, closed
    #[default]
    One,
}

impl CoordBase {
    /// Numeric value of the base (0 or 1)
    #[inline]
    pub fn value(self) -> i64 {
        match self {
            CoordBase::Zero => 0,
            CoordBase::One => 1,
        }
    }

    /// The other base
    pub fn flipped(self) -> Self {
        match self {
            CoordBase::Zero => CoordBase::One,
            CoordBase::One => CoordBase::Zero,
        }
    }

    /// Re-express a start coordinate given in `self` in `target`
    #[inline]
    pub fn convert(self, start: i64, target: CoordBase) -> i64 {
        start + target.value() - self.value()
    }
}

impl TryFrom<i64> for CoordBase {
    type Error = WiggleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CoordBase::Zero),
            1 => Ok(CoordBase::One),
            other => Err(WiggleError::InvalidBase(other.to_string())),
        }
    }
}

impl FromStr for CoordBase {
    type Err = WiggleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(CoordBase::Zero),
            "1" => Ok(CoordBase::One),
            other => Err(WiggleError::InvalidBase(other.to_string())),
        }
    }
}

impl fmt::Display for CoordBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A chromosome interval `(chrom, start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl Region {
    /// Create a new region
    pub fn new(chrom: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// Key used by [`compare_regions`]; the start is deliberately absent
    #[inline]
    pub fn order_key(&self) -> (u64, i64) {
        (chrom_to_sortable(&self.chrom), self.end)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl<S: Into<String>> From<(S, i64, i64)> for Region {
    fn from((chrom, start, end): (S, i64, i64)) -> Self {
        Region::new(chrom, start, end)
    }
}

/// Order two regions by `(sortable chrom, end)`
///
/// Ends need no base adjustment (see the module docs), so the comparison
/// is base-free.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use wigtools::core::{compare_regions, Region};
///
/// let a = Region::new("chr1", 1, 2);
/// let b = Region::new("1", 0, 2);
/// assert_eq!(compare_regions(&a, &b), Ordering::Equal);
/// ```
pub fn compare_regions(a: &Region, b: &Region) -> Ordering {
    a.order_key().cmp(&b.order_key())
}

/// Test whether two regions overlap
///
/// Starts are converted to 1-based using their own base (`None` leaves a
/// start untouched), then closed-interval overlap is tested. Regions on
/// chromosomes with different sortable keys never overlap.
pub fn regions_overlap(
    a: &Region,
    b: &Region,
    base_a: Option<CoordBase>,
    base_b: Option<CoordBase>,
) -> bool {
    if chrom_to_sortable(&a.chrom) != chrom_to_sortable(&b.chrom) {
        return false;
    }
    let start_a = base_a.map_or(a.start, |base| base.convert(a.start, CoordBase::One));
    let start_b = base_b.map_or(b.start, |base| base.convert(b.start, CoordBase::One));
    start_a <= b.end && start_b <= a.end
}
