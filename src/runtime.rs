//! Settings resolution and the run itself.
//!
//! Precedence for every setting: explicit CLI flag, then config file, then
//! the built-in default.

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use bibfetch_core::bibtex;
use bibfetch_core::page::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use bibfetch_core::scrape::split_path_expressions;
use bibfetch_core::{
    Browser, DiscoveryContext, EntryRange, FetcherOptions, HttpPageFetcher, IdScheme,
    InterruptibleSleep, Interrupts, OutputLayout, RetryPolicy, RunReport, ScrapeSettings,
    Scraper, SourceRegistry, Strategy,
};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::{Args, CliValueSources};

/// Everything a run needs, with all sources merged.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) input: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) browser: Browser,
    pub(crate) settings: ScrapeSettings,
    pub(crate) fetcher: FetcherOptions,
}

impl ResolvedConfig {
    pub(crate) fn log(&self) {
        info!(path = %self.input.display(), "input file");
        info!(path = %self.output_dir.display(), "output directory");
        info!(browser = %self.browser, "browser profile");
        if let Some(endpoint) = &self.fetcher.render_endpoint {
            info!(endpoint = %endpoint, "render endpoint");
        }
        self.settings.log();
    }
}

/// Merges CLI arguments over the config file.
pub(crate) fn resolve_config(
    args: &Args,
    sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<ResolvedConfig> {
    let file = file_config.cloned().unwrap_or_default();

    let Some(output_dir) = args.output_dir.clone().or_else(|| file.output_dir.clone()) else {
        bail!("No output directory given\n  Suggestion: pass -o <DIR> or set `output_dir` in the config file");
    };

    let mode = pick(&args.mode, sources.mode, file.strategy.as_ref());
    let strategy: Strategy = parse_or_default(mode, "mode");
    let id_scheme: IdScheme = parse_or_default(
        pick::<String>(&args.id_scheme, sources.id_scheme, file.id_scheme.as_ref()),
        "ID scheme",
    );
    let browser: Browser = parse_or_default(
        pick::<String>(&args.browser, sources.browser, file.browser.as_ref()),
        "browser",
    );

    let separator = pick(&args.split, sources.split, file.path_separator.as_ref());
    let path_expressions = args
        .path_expressions
        .as_deref()
        .map(|text| split_path_expressions(text, separator))
        .unwrap_or_default();
    if strategy == Strategy::Auto && !path_expressions.is_empty() {
        warn!("path expressions are ignored in AUTO mode");
    }

    let first_number = pick(&args.first_number, sources.first_number, file.first_number.as_ref());
    let max_attempts = pick(&args.max_attempts, sources.max_attempts, file.max_attempts.as_ref());
    let cool_down = pick(&args.cool_down, sources.cool_down, file.cool_down_secs.as_ref());

    let settings = ScrapeSettings {
        range: args
            .range
            .as_deref()
            .map_or_else(EntryRange::unbounded, EntryRange::parse),
        id_scheme,
        first_number: *first_number,
        strategy,
        path_expressions,
        retry: RetryPolicy::new(*max_attempts, Duration::from_secs(*cool_down)),
    };
    settings.validate()?;

    let fetcher = FetcherOptions {
        user_agent: browser.user_agent(),
        connect_timeout: Duration::from_secs(
            file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
        ),
        read_timeout: Duration::from_secs(file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS)),
        render_endpoint: args
            .render_endpoint
            .clone()
            .or_else(|| file.render_endpoint_url()),
    };

    Ok(ResolvedConfig {
        input: args.file.clone(),
        output_dir,
        browser,
        settings,
        fetcher,
    })
}

/// The CLI value when given explicitly, else the file value, else the CLI
/// default.
fn pick<'a, T: ?Sized>(cli: &'a T, cli_given: bool, file: Option<&'a T>) -> &'a T {
    if cli_given {
        return cli;
    }
    file.unwrap_or(cli)
}

fn parse_or_default<T>(value: &str, what: &str) -> T
where
    T: FromStr<Err = String> + Default + Display,
{
    value.parse().unwrap_or_else(|error: String| {
        let fallback = T::default();
        warn!(what, error = error.as_str(), fallback = %fallback, "unknown name; using default");
        fallback
    })
}

/// Default log level when `RUST_LOG` is not set.
///
/// Priority: quiet flag > verbose flag > config verbosity > info.
pub(crate) fn resolve_default_log_level(
    args: &Args,
    file_config: Option<&FileConfig>,
) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => {}
        1 => return "debug",
        _ => return "trace",
    }
    match file_config.and_then(|cfg| cfg.verbosity) {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose) => "debug",
        Some(VerbositySetting::Debug) => "trace",
        Some(VerbositySetting::Default) | None => "info",
    }
}

/// How the process ends after a run.
#[derive(Debug)]
pub(crate) enum ProcessExit {
    Completed(RunReport),
    /// SIGINT outside a cool-down.
    Interrupted,
}

impl ProcessExit {
    /// Shell convention for death by SIGINT.
    pub(crate) const INTERRUPTED_CODE: u8 = 130;

    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Completed(_) => ExitCode::SUCCESS,
            Self::Interrupted => ExitCode::from(Self::INTERRUPTED_CODE),
        }
    }
}

/// Reads the bibliography and processes it.
///
/// SIGINT is handled for the whole run: during a cool-down it only wakes the
/// wait, anywhere else it stops the run.
pub(crate) async fn run(resolved: &ResolvedConfig) -> Result<ProcessExit> {
    if !resolved.input.exists() {
        bail!("Input file does not exist: {}", resolved.input.display());
    }
    let records = bibtex::read_file(&resolved.input)
        .await
        .with_context(|| format!("Failed to parse the BibTeX file '{}'", resolved.input.display()))?;

    let plain = HttpPageFetcher::plain(&resolved.fetcher).context("Failed to start the web client")?;
    let scripting =
        HttpPageFetcher::scripting(&resolved.fetcher).context("Failed to start the web client")?;
    let registry = SourceRegistry::builtin();
    let discovery = DiscoveryContext::new(&registry, &plain, &scripting);
    let layout = OutputLayout::new(&resolved.output_dir, &resolved.input);

    let interrupts = Arc::new(Interrupts::new());
    let listener = interrupts
        .listen()
        .context("Failed to listen for interrupts")?;
    let cool_down = InterruptibleSleep::new(Arc::clone(&interrupts));
    let scraper = Scraper::new(&resolved.settings, discovery, &cool_down, layout);

    let outcome = tokio::select! {
        result = scraper.run(records) => Some(result),
        () = interrupts.aborted() => None,
    };
    listener.abort();

    let Some(result) = outcome else {
        error!("run interrupted by the operator; stopping");
        return Ok(ProcessExit::Interrupted);
    };
    let report = result?;
    report.log_summary();
    Ok(ProcessExit::Completed(report))
}
