//! File-level wiggle commands
//!
//! Each function reads a whole track, applies one operation and writes
//! the result. `None` (or `-`) as input/output means stdin/stdout.

use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::{open_input, open_output, CoordBase, Result, Stat};
use crate::formats::{IntersectMode, OutputFormat, PartialPolicy, RegionReader, Track};

/// Counts reported after a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSummary {
    /// Blocks read from the input
    pub blocks_in: usize,
    /// Blocks (or rows, or files) written
    pub blocks_out: usize,
    /// Data points written
    pub data_points: usize,
}

impl ToolSummary {
    fn new(input: &Track, output: &Track) -> Self {
        Self {
            blocks_in: input.len(),
            blocks_out: output.len(),
            data_points: output.data_points(),
        }
    }
}

fn read_track(input: Option<&Path>, base: CoordBase) -> Result<Track> {
    Track::from_reader(open_input(input)?, base)
}

fn write_track(
    track: &Track,
    output: Option<&Path>,
    format: OutputFormat,
    base: CoordBase,
) -> Result<()> {
    let mut writer = open_output(output)?;
    track.write_to(&mut writer, format, Some(base))?;
    writer.finish()?;
    Ok(())
}

/// Rewrite a track in the other coordinate base
///
/// The input is taken to be in base `1 - to`.
pub fn switch_base(
    input: Option<&Path>,
    output: Option<&Path>,
    to: CoordBase,
    format: OutputFormat,
) -> Result<ToolSummary> {
    let track = read_track(input, to.flipped())?;
    write_track(&track, output, format, to)?;
    Ok(ToolSummary::new(&track, &track))
}

/// Sort blocks by chromosome, then start
pub fn sort(
    input: Option<&Path>,
    output: Option<&Path>,
    base: CoordBase,
    format: OutputFormat,
) -> Result<ToolSummary> {
    let mut track = read_track(input, base)?;
    track.sort();
    write_track(&track, output, format, base)?;
    Ok(ToolSummary::new(&track, &track))
}

/// One row of statistics per block
///
/// An empty `stats` selects all of them.
pub fn stats(
    input: Option<&Path>,
    output: Option<&Path>,
    base: CoordBase,
    stats: &[Stat],
    header: bool,
) -> Result<ToolSummary> {
    let stats = if stats.is_empty() { &Stat::ALL[..] } else { stats };
    let track = read_track(input, base)?;
    let mut writer = open_output(output)?;

    if header {
        let names: Vec<&str> = stats.iter().map(Stat::as_str).collect();
        writeln!(writer, "Chrom\tStart\tEnd\t{}", names.join("\t"))?;
    }

    let mut rows = 0;
    for block in track.blocks() {
        let Some(region) = block.region() else {
            continue;
        };
        let values = block.stats(stats);
        let row: Vec<String> = stats.iter().map(|stat| values[stat].to_string()).collect();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            region.chrom,
            region.start,
            region.end,
            row.join("\t")
        )?;
        rows += 1;
    }
    writer.finish()?;

    Ok(ToolSummary {
        blocks_in: track.len(),
        blocks_out: rows,
        data_points: track.data_points(),
    })
}

fn intersect_file(
    input: Option<&Path>,
    output: Option<&Path>,
    base: CoordBase,
    qfile: &Path,
    qbase: Option<CoordBase>,
    mode: IntersectMode,
    format: OutputFormat,
) -> Result<ToolSummary> {
    let track = read_track(input, base)?;
    let regions = RegionReader::new(open_input(Some(qfile))?);
    let result = track.intersect_from(regions, qbase.or(Some(base)), mode)?;
    write_track(&result, output, format, base)?;
    Ok(ToolSummary::new(&track, &result))
}

/// Keep the blocks overlapping the regions of `qfile`
pub fn query(
    input: Option<&Path>,
    output: Option<&Path>,
    base: CoordBase,
    qfile: &Path,
    qbase: Option<CoordBase>,
    format: OutputFormat,
) -> Result<ToolSummary> {
    intersect_file(input, output, base, qfile, qbase, IntersectMode::Query, format)
}

/// Re-tile the track into the regions of `qfile`
#[allow(clippy::too_many_arguments)]
pub fn reshape(
    input: Option<&Path>,
    output: Option<&Path>,
    base: CoordBase,
    qfile: &Path,
    qbase: Option<CoordBase>,
    partial: PartialPolicy,
    format: OutputFormat,
) -> Result<ToolSummary> {
    intersect_file(
        input,
        output,
        base,
        qfile,
        qbase,
        IntersectMode::Reshape(partial),
        format,
    )
}

/// Path of the file [`split`] writes a block to
pub fn split_path(prefix: &str, id: &str, end: i64) -> PathBuf {
    PathBuf::from(format!("{}_{}_{}.wig", prefix, id.replace(':', "_"), end))
}

/// Write every block to its own wiggle file
///
/// Files are named `{prefix}_{chrom}_{start}_{end}.wig`; the prefix's
/// directory is created when missing.
pub fn split(input: Option<&Path>, prefix: &str, base: CoordBase) -> Result<ToolSummary> {
    if let Some(parent) = Path::new(prefix)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let track = read_track(input, base)?;
    let mut files = 0;
    for (id, block) in track.iter() {
        let Some(end) = block.end() else {
            continue;
        };
        let path = split_path(prefix, id, end);
        let mut writer = open_output(Some(&path))?;
        block.write_to(&mut writer, OutputFormat::Wiggle, Some(base))?;
        writer.finish()?;
        info!("Wrote block {} to {}", id, path.display());
        files += 1;
    }

    Ok(ToolSummary {
        blocks_in: track.len(),
        blocks_out: files,
        data_points: track.data_points(),
    })
}
