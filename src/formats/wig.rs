//! Wiggle blocks
//!
//! A wiggle file is a sequence of `fixedStep`/`variableStep` declaration
//! lines, each followed by data lines. [`WigBlock`] holds one such
//! section: its declaration, its values and, for variableStep, the
//! explicit positions. Fixed-step positions are derived from
//! `start + i * step` and never stored.

use indexmap::IndexMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::core::{
    format_value, regions_overlap, summarize, CoordBase, Region, Result, Stat, StatValue,
    WiggleError,
};

const FIXED_STEP: &str = "fixedStep";
const VARIABLE_STEP: &str = "variableStep";

/// Wiggle format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WigFormat {
    VariableStep,
    FixedStep,
}

impl WigFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WigFormat::VariableStep => VARIABLE_STEP,
            WigFormat::FixedStep => FIXED_STEP,
        }
    }
}

/// Check whether a line declares a new block
#[inline]
pub fn is_meta_line(line: &str) -> bool {
    line.starts_with(FIXED_STEP) || line.starts_with(VARIABLE_STEP)
}

/// Check whether a line is a track/browser header or a comment
#[inline]
pub fn is_header_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Wiggle declaration line parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WigDeclaration {
    pub format: WigFormat,
    pub chrom: String,
    pub span: i64,
    pub start: Option<i64>,
    pub step: Option<i64>,
    /// Any other `key=value` attributes, kept but unused
    pub attributes: Vec<(String, String)>,
}

impl WigDeclaration {
    /// Parse a declaration line (variableStep or fixedStep)
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();

        let format = match parts.next() {
            Some(FIXED_STEP) => WigFormat::FixedStep,
            Some(VARIABLE_STEP) => WigFormat::VariableStep,
            other => {
                return Err(WiggleError::InvalidMetaLine(format!(
                    "expected fixedStep or variableStep, got '{}'",
                    other.unwrap_or("")
                )))
            }
        };

        let mut chrom = None;
        let mut span = 1i64;
        let mut start = None;
        let mut step = None;
        let mut attributes = Vec::new();

        for part in parts {
            let items: Vec<&str> = part.split('=').collect();
            if items.len() != 2 {
                return Err(WiggleError::InvalidMetaLine(format!(
                    "invalid value assignment '{}'",
                    part
                )));
            }
            let (key, value) = (items[0], items[1]);
            match key {
                "chrom" => chrom = Some(value.to_string()),
                "span" => span = parse_meta_int(key, value)?,
                "start" => start = Some(parse_meta_int(key, value)?),
                "step" => step = Some(parse_meta_int(key, value)?),
                _ => attributes.push((key.to_string(), value.to_string())),
            }
        }

        let chrom = chrom
            .ok_or_else(|| WiggleError::InvalidMetaLine("missing chrom parameter".to_string()))?;

        if format == WigFormat::FixedStep && start.is_none() {
            return Err(WiggleError::InvalidMetaLine(
                "fixedStep requires a start parameter".to_string(),
            ));
        }

        Ok(Self {
            format,
            chrom,
            span,
            start,
            step,
            attributes,
        })
    }
}

fn parse_meta_int(key: &str, value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| WiggleError::InvalidMetaLine(format!("{}: '{}' is not an integer", key, value)))
}

/// Text format for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Wiggle,
    BedGraph,
}

impl FromStr for OutputFormat {
    type Err = WiggleError;

    /// `wiggle` must match exactly, `bedgraph` in any case
    fn from_str(s: &str) -> Result<Self> {
        if s == "wiggle" {
            Ok(OutputFormat::Wiggle)
        } else if s.eq_ignore_ascii_case("bedgraph") {
            Ok(OutputFormat::BedGraph)
        } else {
            Err(WiggleError::UnsupportedFormat(s.to_string()))
        }
    }
}

/// How to assign a data point's value when it only partly overlaps a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialPolicy {
    /// Scale by the overlapping fraction of the span
    #[default]
    Fraction,
    /// Keep the whole value
    Whole,
}

impl FromStr for PartialPolicy {
    type Err = WiggleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fraction" => Ok(PartialPolicy::Fraction),
            "whole" => Ok(PartialPolicy::Whole),
            other => Err(WiggleError::UnknownPartialPolicy(other.to_string())),
        }
    }
}

/// One fixedStep or variableStep block
#[derive(Debug, Clone, PartialEq)]
pub struct WigBlock {
    format: WigFormat,
    chrom: String,
    base: CoordBase,
    start: Option<i64>,
    step: Option<i64>,
    span: i64,
    data: Vec<f64>,
    /// Explicit positions; variableStep only
    positions: Vec<i64>,
}

impl WigBlock {
    /// An empty fixedStep block
    pub fn fixed(chrom: impl Into<String>, start: i64, step: i64, span: i64, base: CoordBase) -> Self {
        Self {
            format: WigFormat::FixedStep,
            chrom: chrom.into(),
            base,
            start: Some(start),
            step: Some(step),
            span,
            data: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// An empty variableStep block; its start comes from the first data point
    pub fn variable(chrom: impl Into<String>, span: i64, base: CoordBase) -> Self {
        Self {
            format: WigFormat::VariableStep,
            chrom: chrom.into(),
            base,
            start: None,
            step: None,
            span,
            data: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// An empty block as declared by a meta line
    ///
    /// A fixedStep declaration without `step` steps by its span.
    pub fn from_declaration(decl: &WigDeclaration, base: CoordBase) -> Self {
        match decl.format {
            WigFormat::FixedStep => Self::fixed(
                decl.chrom.clone(),
                decl.start.unwrap_or(base.value()),
                decl.step.unwrap_or(decl.span),
                decl.span,
                base,
            ),
            WigFormat::VariableStep => Self::variable(decl.chrom.clone(), decl.span, base),
        }
    }

    pub fn format(&self) -> WigFormat {
        self.format
    }

    pub fn is_fixed(&self) -> bool {
        self.format == WigFormat::FixedStep
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn base(&self) -> CoordBase {
        self.base
    }

    pub fn start(&self) -> Option<i64> {
        self.start
    }

    pub fn step(&self) -> Option<i64> {
        self.step
    }

    pub fn span(&self) -> i64 {
        self.span
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Identity of the block within a track, `chrom:start`
    ///
    /// `None` for a variableStep block that has not seen data yet.
    pub fn id(&self) -> Option<String> {
        self.start.map(|start| format!("{}:{}", self.chrom, start))
    }

    /// Start position of the `i`-th data point, in the block's base
    #[inline]
    pub fn region_at(&self, i: usize) -> i64 {
        match self.format {
            WigFormat::FixedStep => {
                self.start.unwrap_or(0) + i as i64 * self.step.unwrap_or(self.span)
            }
            WigFormat::VariableStep => self.positions[i],
        }
    }

    /// Start positions of all data points, index-aligned with [`data`](Self::data)
    pub fn regions(&self) -> Vec<i64> {
        (0..self.data.len()).map(|i| self.region_at(i)).collect()
    }

    /// Base-independent end of the last data point
    pub fn end(&self) -> Option<i64> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.region_at(self.data.len() - 1) + self.span - self.base.value())
    }

    /// The block as a `(chrom, start, end)` region; `None` while empty
    pub fn region(&self) -> Option<Region> {
        Some(Region::new(self.chrom.clone(), self.start?, self.end()?))
    }

    /// Key for [`Track::sort`](crate::formats::Track::sort)
    pub fn sort_key(&self) -> (u64, i64) {
        (
            crate::core::chrom_to_sortable(&self.chrom),
            self.start.unwrap_or(i64::MIN),
        )
    }

    /// Append a variableStep data point; the first one fixes the start
    pub fn push(&mut self, position: i64, value: f64) {
        if self.start.is_none() {
            self.start = Some(position);
        }
        self.positions.push(position);
        self.data.push(value);
    }

    /// A data point at `position` must leave room for its span and for a
    /// base switch in either direction
    fn check_position(&self, position: i64) -> Result<()> {
        let fits = position.checked_sub(1).is_some()
            && position.checked_add(1).is_some()
            && position
                .checked_add(self.span)
                .and_then(|end| end.checked_sub(self.base.value()))
                .is_some();
        if !fits {
            return Err(WiggleError::InvalidDataLine(format!(
                "position {} out of range for span {}",
                position, self.span
            )));
        }
        Ok(())
    }

    /// Take in a data line
    pub fn ingest(&mut self, line: &str) -> Result<()> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        match self.format {
            WigFormat::FixedStep => {
                if parts.len() != 1 {
                    return Err(WiggleError::InvalidDataLine(format!(
                        "expected 1 column for a fixedStep block, got {}",
                        parts.len()
                    )));
                }
                let value = parse_value(parts[0])?;
                let position = (self.data.len() as i64)
                    .checked_mul(self.step.unwrap_or(self.span))
                    .and_then(|offset| offset.checked_add(self.start.unwrap_or(0)))
                    .ok_or_else(|| {
                        WiggleError::InvalidDataLine(format!(
                            "data point {} lies beyond the coordinate range",
                            self.data.len() + 1
                        ))
                    })?;
                self.check_position(position)?;
                self.data.push(value);
            }
            WigFormat::VariableStep => {
                if parts.len() != 2 {
                    return Err(WiggleError::InvalidDataLine(format!(
                        "expected 2 columns for a variableStep block, got {}",
                        parts.len()
                    )));
                }
                let position: i64 = parts[0].parse().map_err(|_| {
                    WiggleError::InvalidDataLine(format!("invalid position '{}'", parts[0]))
                })?;
                let value = parse_value(parts[1])?;
                self.check_position(position)?;
                self.push(position, value);
            }
        }
        Ok(())
    }

    /// Write the block to a sink line by line
    ///
    /// `base` re-expresses starts (defaults to the block's own base);
    /// values are never touched.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        format: OutputFormat,
        base: Option<CoordBase>,
    ) -> Result<()> {
        let base = base.unwrap_or(self.base);
        match format {
            OutputFormat::Wiggle => self.write_wiggle(writer, base),
            OutputFormat::BedGraph => self.write_bedgraph(writer, base),
        }
    }

    /// Serialize the block to a string
    pub fn stringify(&self, format: OutputFormat, base: Option<CoordBase>) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, format, base)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn write_wiggle<W: Write + ?Sized>(&self, writer: &mut W, base: CoordBase) -> Result<()> {
        write!(
            writer,
            "{} chrom={} span={}",
            self.format.as_str(),
            self.chrom,
            self.span
        )?;
        if let (WigFormat::FixedStep, Some(start)) = (self.format, self.start) {
            write!(
                writer,
                " start={} step={}",
                self.base.convert(start, base),
                self.step.unwrap_or(self.span)
            )?;
        }
        writeln!(writer)?;

        for (i, &value) in self.data.iter().enumerate() {
            match self.format {
                WigFormat::FixedStep => writeln!(writer, "{}", format_value(value))?,
                WigFormat::VariableStep => writeln!(
                    writer,
                    "{}\t{}",
                    self.base.convert(self.positions[i], base),
                    format_value(value)
                )?,
            }
        }
        Ok(())
    }

    fn write_bedgraph<W: Write + ?Sized>(&self, writer: &mut W, base: CoordBase) -> Result<()> {
        for (i, &value) in self.data.iter().enumerate() {
            let position = self.region_at(i);
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                self.chrom,
                self.base.convert(position, base),
                position + self.span - self.base.value(),
                format_value(value)
            )?;
        }
        Ok(())
    }

    /// Cut out the part of this block that overlaps `query`
    ///
    /// Always returns a new variableStep block in this block's base. Each
    /// overlapping data point starts at its intersection with the query;
    /// with [`PartialPolicy::Fraction`] its value is scaled by the
    /// overlapping share of the span.
    pub fn subset(
        &self,
        query: &Region,
        qbase: Option<CoordBase>,
        partial: PartialPolicy,
    ) -> WigBlock {
        let qbase = qbase.unwrap_or(self.base);
        let own = self.base.value();
        let query_start = qbase.convert(query.start, self.base);
        let mut result = WigBlock::variable(self.chrom.clone(), self.span, self.base);

        for (i, &value) in self.data.iter().enumerate() {
            let position = self.region_at(i);
            let point_end = position + self.span - own;
            let point = Region::new(self.chrom.clone(), position, point_end);
            if !regions_overlap(&point, query, Some(self.base), Some(qbase)) {
                continue;
            }

            let overlap_start = query_start.max(position);
            let overlap_end = query.end.min(point_end);
            let value = match partial {
                PartialPolicy::Fraction => {
                    value * (overlap_end - overlap_start + own) as f64 / self.span as f64
                }
                PartialPolicy::Whole => value,
            };
            result.push(overlap_start, value);
        }
        result
    }

    /// Summary statistics over the block's values
    pub fn stats(&self, stats: &[Stat]) -> IndexMap<Stat, StatValue> {
        summarize(&self.data, self.span, stats)
    }
}

impl fmt::Display for WigBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region() {
            Some(region) => write!(f, "{} {}", self.format.as_str(), region),
            None => write!(f, "{} {} (empty)", self.format.as_str(), self.chrom),
        }
    }
}

fn parse_value(field: &str) -> Result<f64> {
    field
        .parse()
        .map_err(|_| WiggleError::InvalidDataLine(format!("invalid value '{}'", field)))
}
