//! Wiggle tracks
//!
//! A [`Track`] is the ordered collection of blocks of one wiggle file.
//! Besides parsing and serialization it implements the sorted merge-join
//! behind [`Track::query`] and [`Track::reshape`]: the track's blocks and
//! a list of query regions are walked by two cursors, both streams must
//! ascend by `(chrom, end)`, and the join stops as soon as either stream
//! runs out.

use indexmap::IndexMap;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::core::{
    compare_regions, open_input, regions_overlap, CoordBase, LineIterator, Region, Result,
    Stream, WiggleError,
};
use crate::formats::wig::{
    is_header_line, is_meta_line, OutputFormat, PartialPolicy, WigBlock, WigDeclaration,
};

/// Lines between parse progress messages
const PROGRESS_INTERVAL: usize = 10_000;

/// What an intersection produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectMode {
    /// Keep whole source blocks that overlap any query region
    Query,
    /// Build one new block per query region from the overlapping data
    Reshape(PartialPolicy),
}

/// An ordered set of wiggle blocks keyed by `chrom:start`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    base: CoordBase,
    blocks: IndexMap<String, WigBlock>,
}

impl Track {
    /// An empty track
    pub fn new(base: CoordBase) -> Self {
        Self {
            base,
            blocks: IndexMap::new(),
        }
    }

    /// Parse a wiggle file; `-` reads stdin, compressed files are decoded
    pub fn from_path<P: AsRef<Path>>(path: P, base: CoordBase) -> Result<Self> {
        let reader = open_input(Some(path.as_ref()))?;
        Self::from_reader(reader, base)
    }

    /// Parse wiggle text held in memory
    pub fn parse_str(text: &str, base: CoordBase) -> Result<Self> {
        Self::from_reader(text.as_bytes(), base)
    }

    /// Parse wiggle text from any buffered reader
    ///
    /// Header lines, blank lines and anything before the first declaration
    /// are skipped. Errors carry the 1-based line number.
    pub fn from_reader<R: BufRead>(reader: R, base: CoordBase) -> Result<Self> {
        let mut track = Track::new(base);
        let mut lines = LineIterator::new(reader);
        let mut current: Option<WigBlock> = None;
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line() {
            let line = line?;
            line_no += 1;
            if line_no % PROGRESS_INTERVAL == 0 {
                debug!("{} lines read", line_no);
            }

            let line = line.trim();
            if line.is_empty() || is_header_line(line) {
                continue;
            }

            if is_meta_line(line) {
                if let Some(block) = current.take() {
                    track.push(block);
                }
                let decl = WigDeclaration::parse(line).map_err(|e| e.at_line(line_no))?;
                current = Some(WigBlock::from_declaration(&decl, base));
            } else if let Some(block) = current.as_mut() {
                block.ingest(line).map_err(|e| e.at_line(line_no))?;
            }
        }
        if let Some(block) = current.take() {
            track.push(block);
        }

        info!(
            "Parsed {} blocks ({} data points) from {} lines",
            track.len(),
            track.data_points(),
            line_no
        );
        Ok(track)
    }

    pub fn base(&self) -> CoordBase {
        self.base
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of data points over all blocks
    pub fn data_points(&self) -> usize {
        self.blocks.values().map(WigBlock::len).sum()
    }

    /// Blocks in track order
    pub fn blocks(&self) -> impl Iterator<Item = &WigBlock> {
        self.blocks.values()
    }

    /// Block identities in track order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// `(identity, block)` pairs in track order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WigBlock)> {
        self.blocks.iter().map(|(id, block)| (id.as_str(), block))
    }

    pub fn get(&self, id: &str) -> Option<&WigBlock> {
        self.blocks.get(id)
    }

    /// Append a block unless it is empty or its identity is taken
    ///
    /// Returns whether the block was added.
    pub fn push(&mut self, block: WigBlock) -> bool {
        let Some(id) = block.id().filter(|_| !block.is_empty()) else {
            debug!("Skipping empty block {}", block);
            return false;
        };
        if self.blocks.contains_key(&id) {
            warn!("Duplicate block {}, keeping the first one", id);
            return false;
        }
        self.blocks.insert(id, block);
        true
    }

    /// Order blocks by sortable chromosome, then start
    pub fn sort(&mut self) {
        self.blocks
            .sort_by(|_, a, _, b| a.sort_key().cmp(&b.sort_key()));
        info!("Sorted {} blocks", self.blocks.len());
    }

    /// Write every block in track order
    ///
    /// `base` defaults to the track's own base.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        format: OutputFormat,
        base: Option<CoordBase>,
    ) -> Result<()> {
        let base = base.unwrap_or(self.base);
        for block in self.blocks.values() {
            block.write_to(writer, format, Some(base))?;
        }
        Ok(())
    }

    /// Serialize the whole track to a string
    pub fn stringify(&self, format: OutputFormat, base: Option<CoordBase>) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, format, base)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Source blocks overlapping any of `regions`
    pub fn query<I>(&self, regions: I, qbase: Option<CoordBase>) -> Result<Track>
    where
        I: IntoIterator<Item = Region>,
    {
        self.intersect(regions, qbase, IntersectMode::Query)
    }

    /// Re-tile the track's data into the windows given by `regions`
    pub fn reshape<I>(
        &self,
        regions: I,
        qbase: Option<CoordBase>,
        partial: PartialPolicy,
    ) -> Result<Track>
    where
        I: IntoIterator<Item = Region>,
    {
        self.intersect(regions, qbase, IntersectMode::Reshape(partial))
    }

    /// Merge-join the track against ascending query regions
    pub fn intersect<I>(
        &self,
        regions: I,
        qbase: Option<CoordBase>,
        mode: IntersectMode,
    ) -> Result<Track>
    where
        I: IntoIterator<Item = Region>,
    {
        self.intersect_from(regions.into_iter().map(Ok), qbase, mode)
    }

    /// Like [`intersect`](Self::intersect) over a fallible region stream,
    /// such as a [`RegionReader`](crate::formats::RegionReader)
    ///
    /// `qbase` defaults to the track's base. Both the blocks and the
    /// regions must ascend by `(chrom, end)`; the first pair out of order
    /// fails with [`WiggleError::UnsortedFile`].
    pub fn intersect_from<I>(
        &self,
        regions: I,
        qbase: Option<CoordBase>,
        mode: IntersectMode,
    ) -> Result<Track>
    where
        I: IntoIterator<Item = Result<Region>>,
    {
        let qbase = qbase.unwrap_or(self.base);
        let mut result = Track::new(self.base);

        let blocks = self.blocks.iter().filter_map(|(id, block)| {
            block.region().map(|region| {
                Ok::<_, WiggleError>(BlockRef {
                    id: id.as_str(),
                    block,
                    region,
                })
            })
        });
        let mut blocks = SortedCursor::new(Stream::Track, blocks);
        let mut queries = SortedCursor::new(Stream::Query, regions.into_iter());
        let mut open: Option<ReshapeBlock> = None;

        loop {
            if queries.fill()? {
                if let (IntersectMode::Reshape(_), Some(query)) = (mode, queries.current()) {
                    if let Some(finished) = open.take() {
                        finished.finish_into(&mut result, self.base);
                    }
                    open = Some(ReshapeBlock::new(query));
                }
            }
            let Some(query) = queries.current() else {
                break;
            };
            blocks.fill()?;
            let Some(current) = blocks.current() else {
                break;
            };

            if regions_overlap(&current.region, query, Some(self.base), Some(qbase)) {
                match (mode, open.as_mut()) {
                    (IntersectMode::Reshape(partial), Some(pending)) => {
                        let subset = current.block.subset(query, Some(qbase), partial);
                        pending.absorb(subset, query)?;
                    }
                    _ => {
                        result
                            .blocks
                            .insert(current.id.to_string(), current.block.clone());
                    }
                }
            }

            if compare_regions(&current.region, query) != Ordering::Greater {
                blocks.consume();
            } else {
                queries.consume();
            }
        }

        if let Some(finished) = open.take() {
            finished.finish_into(&mut result, self.base);
        }

        info!(
            "{} kept {} of {} blocks",
            match mode {
                IntersectMode::Query => "Query",
                IntersectMode::Reshape(_) => "Reshape",
            },
            result.len(),
            self.len()
        );
        Ok(result)
    }
}

/// Something the merge-join can order
trait Located {
    fn region(&self) -> &Region;
    fn describe(&self) -> String;
}

impl Located for Region {
    fn region(&self) -> &Region {
        self
    }

    fn describe(&self) -> String {
        format!("region {}", self)
    }
}

/// A source block as seen by the merge-join
struct BlockRef<'a> {
    id: &'a str,
    block: &'a WigBlock,
    region: Region,
}

impl Located for BlockRef<'_> {
    fn region(&self) -> &Region {
        &self.region
    }

    fn describe(&self) -> String {
        format!("block {} ({})", self.id, self.region)
    }
}

enum Cursor<T> {
    /// Nothing pulled yet, or the last element was consumed
    Pending,
    Ready(T),
    Exhausted,
}

/// One side of the merge-join, checking ascending order as it goes
struct SortedCursor<T, I> {
    stream: Stream,
    iter: I,
    state: Cursor<T>,
    previous: Option<T>,
}

impl<T, I> SortedCursor<T, I>
where
    T: Located,
    I: Iterator<Item = Result<T>>,
{
    fn new(stream: Stream, iter: I) -> Self {
        Self {
            stream,
            iter,
            state: Cursor::Pending,
            previous: None,
        }
    }

    /// Pull the next element if the cursor is pending
    ///
    /// Returns true when a new element was taken.
    fn fill(&mut self) -> Result<bool> {
        if !matches!(self.state, Cursor::Pending) {
            return Ok(false);
        }
        let Some(item) = self.iter.next() else {
            self.state = Cursor::Exhausted;
            return Ok(false);
        };
        let item = item?;
        if let Some(previous) = &self.previous {
            if compare_regions(previous.region(), item.region()) == Ordering::Greater {
                return Err(WiggleError::UnsortedFile {
                    stream: self.stream,
                    previous: previous.describe(),
                    current: item.describe(),
                });
            }
        }
        self.state = Cursor::Ready(item);
        Ok(true)
    }

    fn current(&self) -> Option<&T> {
        match &self.state {
            Cursor::Ready(item) => Some(item),
            _ => None,
        }
    }

    /// Move the current element into `previous`
    fn consume(&mut self) {
        if let Cursor::Ready(item) = std::mem::replace(&mut self.state, Cursor::Pending) {
            self.previous = Some(item);
        }
    }
}

/// Output block of a reshape while its query region is current
struct ReshapeBlock {
    key: String,
    chrom: String,
    span: Option<i64>,
    positions: Vec<i64>,
    data: Vec<f64>,
}

impl ReshapeBlock {
    fn new(query: &Region) -> Self {
        Self {
            key: format!("{}:{}", query.chrom, query.start),
            chrom: query.chrom.clone(),
            span: None,
            positions: Vec::new(),
            data: Vec::new(),
        }
    }

    fn absorb(&mut self, subset: WigBlock, query: &Region) -> Result<()> {
        match self.span {
            Some(span) if span != subset.span() => {
                return Err(WiggleError::Reshape {
                    expected: span,
                    found: subset.span(),
                    query: query.clone(),
                })
            }
            _ => self.span = Some(subset.span()),
        }
        self.positions.extend(subset.regions());
        self.data.extend_from_slice(subset.data());
        Ok(())
    }

    /// Add the block to `track` unless nothing overlapped its window
    fn finish_into(self, track: &mut Track, base: CoordBase) {
        let Some(span) = self.span.filter(|_| !self.data.is_empty()) else {
            debug!("No data in reshape window {}", self.key);
            return;
        };
        let mut block = WigBlock::variable(self.chrom, span, base);
        for (position, value) in self.positions.into_iter().zip(self.data) {
            block.push(position, value);
        }
        track.blocks.insert(self.key, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_WIG: &str = "\
track type=wiggle_0
fixedStep chrom=chr start=1 step=1
1
2
5
6
5
3
3
5
5
5
6
6
0
2
3
3
10
4
4
2
2
2
1
variableStep chrom=chr
28\t2
29\t3
30\t4
31\t6
32\t6
33\t4
34\t4
35\t4
36\t2
";

    const SPAN_WIG: &str = "\
variableStep chrom=chr span=100
100\t100.0
300 200.0
600\t300.0
variableStep chrom=chr span=100
800\t400.0
1200\t500.0
1600\t600.0
2000\t700.0
fixedStep chrom=chr start=3000 step=100 span=200
1.0
2.0
";

    fn regions(list: &[(i64, i64)]) -> Vec<Region> {
        list.iter().map(|&(s, e)| Region::new("chr", s, e)).collect()
    }

    fn main_track() -> Track {
        Track::parse_str(MAIN_WIG, CoordBase::One).unwrap()
    }

    fn assert_block(track: &Track, id: &str, positions: &[i64], data: &[f64]) {
        let block = track.get(id).unwrap_or_else(|| panic!("missing block {}", id));
        assert_eq!(block.regions(), positions, "positions of {}", id);
        assert_eq!(block.len(), data.len());
        for (a, e) in block.data().iter().zip(data) {
            assert!((a - e).abs() < 1e-10, "{}: {} != {}", id, a, e);
        }
    }

    #[test]
    fn test_parse() {
        let track = main_track();
        assert_eq!(track.len(), 2);
        assert_eq!(track.ids().collect::<Vec<_>>(), vec!["chr:1", "chr:28"]);
        let first = track.get("chr:1").unwrap();
        assert!(first.is_fixed());
        assert_eq!(first.len(), 23);
        assert_eq!(first.end(), Some(23));
        let second = track.get("chr:28").unwrap();
        assert_eq!(second.regions(), (28..=36).collect::<Vec<_>>());
        assert_eq!(track.data_points(), 32);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = Track::parse_str("fixedStep chrom=chr start=1\n1\n1 2\n", CoordBase::One)
            .unwrap_err();
        assert!(matches!(err, WiggleError::AtLine { line: 3, .. }));
        assert!(matches!(err.root(), WiggleError::InvalidDataLine(_)));

        let err = Track::parse_str("variableStep chrom=chr span\n", CoordBase::One).unwrap_err();
        assert!(matches!(err.root(), WiggleError::InvalidMetaLine(_)));
    }

    #[test]
    fn test_parse_rejects_positions_out_of_range() {
        let text = "variableStep chrom=chr1 span=1\n9223372036854775807\t1.0\n";
        let err = Track::parse_str(text, CoordBase::One).unwrap_err();
        assert!(matches!(err, WiggleError::AtLine { line: 2, .. }));
        assert!(matches!(err.root(), WiggleError::InvalidDataLine(_)));

        let text = "variableStep chrom=chr1 span=1\n9223372036854775806\t1.0\n";
        let track = Track::parse_str(text, CoordBase::One).unwrap();
        let result = track
            .query(vec![Region::new("chr1", 1, i64::MAX - 1)], None)
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_parse_skips_orphans_and_duplicates() {
        let text = "\
1.0
variableStep chrom=chr
variableStep chrom=chr
5\t1.0
variableStep chrom=chr

5\t2.0
6\t3.0
";
        let track = Track::parse_str(text, CoordBase::One).unwrap();
        assert_eq!(track.len(), 1);
        assert_block(&track, "chr:5", &[5], &[1.0]);
    }

    #[test]
    fn test_round_trip() {
        let text = "variableStep chrom=chr span=1\n1\t1.0\n2\t2.0\n\
                    variableStep chrom=chr span=1\n3\t3.0\n4\t4.0\n";
        let track = Track::parse_str(text, CoordBase::One).unwrap();
        assert_eq!(track.stringify(OutputFormat::Wiggle, None).unwrap(), text);
    }

    #[test]
    fn test_switch_base() {
        let track =
            Track::parse_str("variableStep chrom=chr span=1\n1\t1\n2\t2\n", CoordBase::One)
                .unwrap();
        assert_eq!(
            track.stringify(OutputFormat::Wiggle, Some(CoordBase::Zero)).unwrap(),
            "variableStep chrom=chr span=1\n0\t1.0\n1\t2.0\n"
        );
    }

    #[test]
    fn test_sort() {
        let text = "\
variableStep chrom=chr2
5\t1
variableStep chrom=chr10
1\t1
variableStep chrom=chr2
1\t1
variableStep chrom=chrX
1\t1
";
        let mut track = Track::parse_str(text, CoordBase::One).unwrap();
        track.sort();
        let order: Vec<_> = track.ids().map(str::to_string).collect();
        assert_eq!(order, vec!["chr2:1", "chr2:5", "chr10:1", "chrX:1"]);

        track.sort();
        let again: Vec<_> = track.ids().map(str::to_string).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        // chr23 and chrX share sortable key 23
        let text = "\
variableStep chrom=chrX
5\t1
variableStep chrom=chr23
5\t2
variableStep chrom=chr1
5\t3
";
        let mut track = Track::parse_str(text, CoordBase::One).unwrap();
        track.sort();
        let order: Vec<_> = track.ids().map(str::to_string).collect();
        assert_eq!(order, vec!["chr1:5", "chrX:5", "chr23:5"]);

        let text = "\
variableStep chrom=chr23
5\t2
variableStep chrom=chrX
5\t1
";
        let mut track = Track::parse_str(text, CoordBase::One).unwrap();
        track.sort();
        let order: Vec<_> = track.ids().map(str::to_string).collect();
        assert_eq!(order, vec!["chr23:5", "chrX:5"]);
        assert_eq!(track.blocks().next().unwrap().data(), &[2.0]);
    }

    #[test]
    fn test_query() {
        let track = main_track();
        let result = track.query(regions(&[(1, 2)]), None).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("chr:1"), track.get("chr:1"));

        let result = track.query(regions(&[(2, 3), (20, 30)]), None).unwrap();
        assert_eq!(result.ids().collect::<Vec<_>>(), vec!["chr:1", "chr:28"]);

        let result = track.query(regions(&[(24, 27)]), None).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_reshape() {
        let track = main_track();
        let result = track
            .reshape(regions(&[(2, 5), (10, 12), (35, 36)]), None, PartialPolicy::Fraction)
            .unwrap();
        assert_eq!(result.len(), 3);
        assert_block(&result, "chr:2", &[2, 3, 4, 5], &[2.0, 5.0, 6.0, 5.0]);
        assert_block(&result, "chr:10", &[10, 11, 12], &[5.0, 6.0, 6.0]);
        assert_block(&result, "chr:35", &[35, 36], &[4.0, 2.0]);
        for block in result.blocks() {
            assert!(!block.is_fixed());
        }
    }

    #[test]
    fn test_reshape_partial_windows() {
        let track = main_track();
        let result = track
            .reshape(regions(&[(20, 25), (26, 30)]), None, PartialPolicy::Fraction)
            .unwrap();
        assert_block(&result, "chr:20", &[20, 21, 22, 23], &[2.0, 2.0, 2.0, 1.0]);
        assert_eq!(result.get("chr:20").unwrap().end(), Some(23));
        assert_block(&result, "chr:26", &[28, 29, 30], &[2.0, 3.0, 4.0]);
        assert_eq!(result.get("chr:26").unwrap().start(), Some(28));
    }

    #[test]
    fn test_reshape_fractions_across_blocks() {
        let track = Track::parse_str(SPAN_WIG, CoordBase::One).unwrap();
        let result = track
            .reshape(regions(&[(200, 1000), (1650, 2049)]), None, PartialPolicy::Fraction)
            .unwrap();

        assert_block(&result, "chr:200", &[300, 600, 800], &[200.0, 300.0, 400.0]);
        let first = result.get("chr:200").unwrap();
        assert_eq!(first.start(), Some(300));
        assert_eq!(first.end(), Some(899));

        assert_block(&result, "chr:1650", &[1650, 2000], &[300.0, 350.0]);
        assert_eq!(result.get("chr:1650").unwrap().end(), Some(2099));
    }

    #[test]
    fn test_reshape_span_mismatch() {
        let track = Track::parse_str(SPAN_WIG, CoordBase::One).unwrap();
        let err = track
            .reshape(regions(&[(1000, 4000)]), None, PartialPolicy::Fraction)
            .unwrap_err();
        assert!(matches!(
            err,
            WiggleError::Reshape {
                expected: 100,
                found: 200,
                ..
            }
        ));
    }

    #[test]
    fn test_reshape_omits_empty_windows() {
        let track = main_track();
        let result = track
            .reshape(regions(&[(2, 3), (24, 27), (30, 31)]), None, PartialPolicy::Whole)
            .unwrap();
        assert_eq!(result.ids().collect::<Vec<_>>(), vec!["chr:2", "chr:30"]);
    }

    #[test]
    fn test_unsorted_queries() {
        let track = main_track();
        let err = track.query(regions(&[(3, 4), (1, 2)]), None).unwrap_err();
        assert!(matches!(
            err,
            WiggleError::UnsortedFile {
                stream: Stream::Query,
                ..
            }
        ));
    }

    #[test]
    fn test_unsorted_blocks() {
        let text = "\
variableStep chrom=chr
28\t2
36\t2
fixedStep chrom=chr start=1 step=1
1
";
        let track = Track::parse_str(text, CoordBase::One).unwrap();
        let err = track.query(regions(&[(130, 134)]), None).unwrap_err();
        assert!(matches!(
            err,
            WiggleError::UnsortedFile {
                stream: Stream::Track,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_based_queries() {
        let track = main_track();
        // 0-based [1, 5) is 1-based [2, 5]
        let result = track
            .reshape(regions(&[(1, 5)]), Some(CoordBase::Zero), PartialPolicy::Fraction)
            .unwrap();
        assert_block(&result, "chr:1", &[2, 3, 4, 5], &[2.0, 5.0, 6.0, 5.0]);
    }

    #[test]
    fn test_intersect_from_propagates_region_errors() {
        let track = main_track();
        let stream = vec![
            Ok(Region::new("chr", 1, 2)),
            Err(WiggleError::InvalidRegionLine {
                line: 2,
                message: "bad".to_string(),
            }),
        ];
        let err = track
            .intersect_from(stream, None, IntersectMode::Query)
            .unwrap_err();
        assert!(matches!(err, WiggleError::InvalidRegionLine { line: 2, .. }));
    }
}
