use clap::Parser;
use nanosv::commands::breakpoints::run_breakpoints;
use nanosv::commands::stats::run_stats;
use nanosv::config::Config;
use nanosv::sam::DEFAULT_FIELD_CAPACITY;
use std::io;

/// Common options shared between all commands
#[derive(Parser, Debug)]
struct CommonOpts {
    /// Alignment input: .sam, .sam.gz (BGZF), .bam, or '-' for SAM on stdin
    #[clap(short = 'i', long, value_parser)]
    input: String,

    /// Number of threads handed to the BAM converter
    #[clap(short = 't', long, value_parser, default_value_t = 1)]
    max_threads: u16,

    /// Maximum number of segments per read; reads with this many or more are skipped
    #[clap(short = 's', long = "split", value_parser, default_value_t = 10)]
    max_split: u32,

    /// Minimum mapping quality of a segment
    #[clap(short = 'm', long = "min-mapq", value_parser, default_value_t = 80)]
    min_map_quality: u16,

    /// Minimum percentage identity to the reference (fraction of the segment in the first '=' run)
    #[clap(short = 'p', long = "min-pid", value_parser, default_value_t = 0.80)]
    min_identity: f32,

    /// Bytes kept per SAM field; longer fields are truncated
    #[clap(long, value_parser, default_value_t = DEFAULT_FIELD_CAPACITY)]
    max_field_length: usize,

    /// Program used to convert BAM to SAM text
    #[clap(long, value_parser, default_value = "sambamba")]
    converter: String,

    /// Verbosity level (0 = error, 1 = info, 2 = debug)
    #[clap(short, long, default_value = "0")]
    verbose: u8,
}

impl CommonOpts {
    fn config(&self) -> Config {
        Config {
            max_threads: self.max_threads,
            max_split: self.max_split,
            min_map_quality: self.min_map_quality,
            min_identity: self.min_identity,
            max_field_length: self.max_field_length,
            converter: self.converter.clone(),
        }
    }
}

/// Command-line tool for detecting structural variant breakpoints from split reads.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_subcommand = true)]
enum Args {
    /// Detect breakpoints and write them as a tab-separated table
    Breakpoints {
        #[clap(flatten)]
        common: CommonOpts,

        /// Output file (standard output if not given)
        #[clap(short = 'o', long, value_parser)]
        output: Option<String>,
    },
    /// Print segment, read and breakpoint statistics
    Stats {
        #[clap(flatten)]
        common: CommonOpts,
    },
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    match args {
        Args::Breakpoints { common, output } => {
            let config = initialize(&common);
            run_breakpoints(&common.input, output.as_deref(), &config)?;
        }
        Args::Stats { common } => {
            let config = initialize(&common);
            run_stats(&common.input, &config)?;
        }
    }

    Ok(())
}

/// Initialize logging and build the run configuration
fn initialize(common: &CommonOpts) -> Config {
    env_logger::Builder::new()
        .filter_level(match common.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    common.config()
}
