//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use url::Url;

use bibfetch_core::download::{DEFAULT_COOL_DOWN, DEFAULT_MAX_ATTEMPTS};
use bibfetch_core::scrape::DEFAULT_PATH_SEPARATOR;

/// Fetch the PDFs behind a BibTeX bibliography.
///
/// Every entry's `url` field is opened, the link to the PDF is located on the
/// landing page, and the PDF is downloaded. Entries are sorted into one
/// directory per outcome.
#[derive(Parser, Debug, Clone)]
#[command(name = "bibfetch")]
#[command(author, version, about)]
pub struct Args {
    /// BibTeX file to process
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// Output directory (created if missing)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Entries to process: N, N-M or N-INF (1-based, inclusive)
    #[arg(short = 'r', long)]
    pub range: Option<String>,

    /// Link discovery mode: AUTO, ANCHOR_PATH or FRAME_SOURCE
    #[arg(short = 'm', long, default_value = "AUTO")]
    pub mode: String,

    /// Path expressions (CSS selectors), separated by the split string
    #[arg(short = 'x', long = "path", value_name = "EXPRESSIONS")]
    pub path_expressions: Option<String>,

    /// Separator between path expressions
    #[arg(short = 's', long = "split", default_value = DEFAULT_PATH_SEPARATOR)]
    pub split: String,

    /// Identifier scheme: ORDINAL, ENCODED_KEY or ORDINAL_AND_KEY
    #[arg(short = 'i', long = "id", default_value = "ORDINAL_AND_KEY")]
    pub id_scheme: String,

    /// Number given to the first entry of the file
    #[arg(short = 'n', long = "number", default_value_t = 1)]
    pub first_number: usize,

    /// Browser profile: BEST_SUPPORTED, CHROME, EDGE, FIREFOX or IE
    #[arg(short = 'b', long, default_value = "CHROME")]
    pub browser: String,

    /// Download attempts per entry (1-10)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// Seconds to wait before each download retry (0-600)
    #[arg(long = "cool-down", value_name = "SECS", default_value_t = DEFAULT_COOL_DOWN.as_secs(), value_parser = clap::value_parser!(u64).range(0..=600))]
    pub cool_down: u64,

    /// Rendering service used by the scripting fetcher, called as URL?url=PAGE
    #[arg(long, value_name = "URL")]
    pub render_endpoint: Option<Url>,

    /// Config file (default: $XDG_CONFIG_HOME/bibfetch/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Which settings were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CliValueSources {
    pub mode: bool,
    pub split: bool,
    pub id_scheme: bool,
    pub first_number: bool,
    pub browser: bool,
    pub max_attempts: bool,
    pub cool_down: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl CliValueSources {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            mode: is_commandline_value(matches, "mode"),
            split: is_commandline_value(matches, "split"),
            id_scheme: is_commandline_value(matches, "id_scheme"),
            first_number: is_commandline_value(matches, "first_number"),
            browser: is_commandline_value(matches, "browser"),
            max_attempts: is_commandline_value(matches, "max_attempts"),
            cool_down: is_commandline_value(matches, "cool_down"),
            verbose: is_commandline_value(matches, "verbose"),
            quiet: is_commandline_value(matches, "quiet"),
        }
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Parses the process arguments, exiting with usage on error.
pub fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    (args, CliValueSources::from_matches(&matches))
}
