//! wigtools CLI entry point
//!
//! A set of tools for wiggle files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use wigtools::core::Stat;
use wigtools::tools::{self, ToolSummary};
use wigtools::{CoordBase, OutputFormat, PartialPolicy};

#[derive(Parser)]
#[command(name = "wigtools")]
#[command(about = "A set of tools for wiggle files")]
#[command(version)]
#[command(author = "wigtools Contributors")]
struct Cli {
    /// Do not print the summary to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Coordinate base (CLI enum)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum BaseArg {
    /// 0-based, half-open
    #[value(name = "0")]
    Zero,
    /// 1-based, closed
    #[value(name = "1")]
    One,
}

impl From<BaseArg> for CoordBase {
    fn from(arg: BaseArg) -> Self {
        match arg {
            BaseArg::Zero => CoordBase::Zero,
            BaseArg::One => CoordBase::One,
        }
    }
}

/// Value assignment for partially overlapping data (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum PartialArg {
    /// Proportional to the overlapping length
    #[default]
    #[value(name = "fraction")]
    Fraction,
    /// The whole value
    #[value(name = "whole")]
    Whole,
}

impl From<PartialArg> for PartialPolicy {
    fn from(arg: PartialArg) -> Self {
        match arg {
            PartialArg::Fraction => PartialPolicy::Fraction,
            PartialArg::Whole => PartialPolicy::Whole,
        }
    }
}

#[derive(Args)]
struct IoArgs {
    /// Input wiggle file, plain or compressed (stdin if omitted or '-')
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output file, gzipped if it ends in .gz (stdout if omitted or '-')
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct FormatArg {
    /// Output format: wiggle or bedgraph
    #[arg(short, long, default_value = "wiggle")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch the coordinate base of a wiggle file
    SwitchBase {
        #[command(flatten)]
        io: IoArgs,
        /// Target base; the input is taken to be in the other one
        #[arg(long)]
        to: BaseArg,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Sort the blocks in a wiggle file by chrom and start
    Sort {
        #[command(flatten)]
        io: IoArgs,
        /// Coordinate base of the input and output
        #[arg(long, default_value = "1")]
        base: BaseArg,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Statistics for the data of each block
    Stats {
        #[command(flatten)]
        io: IoArgs,
        /// Coordinate base of the input and output
        #[arg(long, default_value = "1")]
        base: BaseArg,
        /// Comma-separated statistics (default: min,max,mean,median,sum,count,bp)
        #[arg(long, value_delimiter = ',')]
        stats: Vec<Stat>,
        /// Don't write a header line
        #[arg(long = "no-header")]
        no_header: bool,
    },
    /// Find the blocks that intersect with the query regions
    Query {
        #[command(flatten)]
        io: IoArgs,
        /// Coordinate base of the input and output
        #[arg(long, default_value = "1")]
        base: BaseArg,
        /// Query regions in BED format, sorted by chrom and end
        #[arg(long)]
        qfile: PathBuf,
        /// Coordinate base of the query file (default: --base)
        #[arg(long)]
        qbase: Option<BaseArg>,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Reshape the blocks to the query regions
    Reshape {
        #[command(flatten)]
        io: IoArgs,
        /// Coordinate base of the input and output
        #[arg(long, default_value = "1")]
        base: BaseArg,
        /// Query regions in BED format, sorted by chrom and end
        #[arg(long)]
        qfile: PathBuf,
        /// Coordinate base of the query file (default: --base)
        #[arg(long)]
        qbase: Option<BaseArg>,
        /// How to assign the data of partially overlapping positions
        #[arg(long, default_value = "fraction")]
        partial: PartialArg,
        #[command(flatten)]
        format: FormatArg,
    },
    /// Split the blocks into separate wiggle files
    Split {
        /// Input wiggle file (stdin if omitted or '-')
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output prefix; files are named <prefix>_<chrom>_<start>_<end>.wig
        #[arg(short, long)]
        prefix: String,
        /// Coordinate base of the input and output
        #[arg(long, default_value = "1")]
        base: BaseArg,
    },
}

fn print_summary(title: &str, summary: &ToolSummary, start: Instant) {
    eprintln!("\n=== {} Statistics ===", title);
    eprintln!("Blocks read:     {}", summary.blocks_in);
    eprintln!("Blocks written:  {}", summary.blocks_out);
    eprintln!("Data points:     {}", summary.data_points);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();

    let (title, summary) = match cli.command {
        Commands::SwitchBase { io, to, format } => {
            let format: OutputFormat = format.format.parse()?;
            let summary = tools::switch_base(
                io.input.as_deref(),
                io.output.as_deref(),
                to.into(),
                format,
            )?;
            ("Switch Base", summary)
        }
        Commands::Sort { io, base, format } => {
            let format: OutputFormat = format.format.parse()?;
            let summary = tools::sort(
                io.input.as_deref(),
                io.output.as_deref(),
                base.into(),
                format,
            )?;
            ("Sort", summary)
        }
        Commands::Stats {
            io,
            base,
            stats,
            no_header,
        } => {
            let summary = tools::stats(
                io.input.as_deref(),
                io.output.as_deref(),
                base.into(),
                &stats,
                !no_header,
            )?;
            ("Block", summary)
        }
        Commands::Query {
            io,
            base,
            qfile,
            qbase,
            format,
        } => {
            let format: OutputFormat = format.format.parse()?;
            let summary = tools::query(
                io.input.as_deref(),
                io.output.as_deref(),
                base.into(),
                &qfile,
                qbase.map(CoordBase::from),
                format,
            )?;
            ("Query", summary)
        }
        Commands::Reshape {
            io,
            base,
            qfile,
            qbase,
            partial,
            format,
        } => {
            let format: OutputFormat = format.format.parse()?;
            let summary = tools::reshape(
                io.input.as_deref(),
                io.output.as_deref(),
                base.into(),
                &qfile,
                qbase.map(CoordBase::from),
                partial.into(),
                format,
            )?;
            ("Reshape", summary)
        }
        Commands::Split {
            input,
            prefix,
            base,
        } => {
            let summary = tools::split(input.as_deref(), &prefix, base.into())?;
            ("Split", summary)
        }
    };

    if !cli.quiet {
        print_summary(title, &summary, start);
    }

    Ok(())
}
