//! mongoglotd - MongoDB status projection daemon.
//!
//! Reads MongoDB status snapshots every interval, projects them into flat
//! metric records and writes them to stdout as JSON lines or line protocol.
//! Logs go to stderr.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use mongoglot_core::Collector;
use mongoglot_core::collector::HOSTNAME_TAG;
use mongoglot_core::model::Tags;
use mongoglot_core::record::DEFAULT_SERVICE;
use mongoglot_core::sink::{JsonSink, LineSink, Sink};
use mongoglot_core::source::mock::SCENARIOS;
use mongoglot_core::source::{FileSource, MockSource, StatusSource};

/// Output format for emitted records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per record.
    Json,
    /// InfluxDB line protocol.
    Line,
}

/// MongoDB status projection daemon.
#[derive(Parser)]
#[command(name = "mongoglotd", about = "MongoDB status projection daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// JSON file with the latest status snapshot, reread every cycle.
    /// Without it, a built-in scenario is replayed.
    #[arg(long, env = "MONGOGLOT_INPUT")]
    input: Option<PathBuf>,

    /// Built-in scenario to replay when no input file is given.
    #[arg(long, default_value = "wired-tiger-primary")]
    scenario: String,

    /// Measurement name prefix.
    #[arg(long, default_value = DEFAULT_SERVICE)]
    service: String,

    /// Value for the hostname tag. Overrides the snapshot host and any
    /// --tag hostname=... given.
    #[arg(long)]
    host: Option<String>,

    /// Extra tag added to every record (repeatable), e.g. --tag env=prod.
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    tags: Vec<(String, String)>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Parses a `key=value` tag argument.
fn parse_tag(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid tag '{}': expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid tag '{}': empty key", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Initializes the tracing subscriber on stderr with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["mongoglotd", "mongoglot_core"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Tags added to every record: the --tag pairs, then --host.
fn base_tags(args: &Args) -> Tags {
    let mut tags: Tags = args.tags.iter().cloned().collect();
    if let Some(host) = &args.host {
        tags.insert(HOSTNAME_TAG.to_string(), host.clone());
    }
    tags
}

fn build_source(args: &Args) -> Result<Box<dyn StatusSource>, String> {
    if let Some(path) = &args.input {
        info!("Source: {}", path.display());
        return Ok(Box::new(FileSource::new(path)));
    }
    match MockSource::from_scenario(&args.scenario) {
        Some(source) => {
            info!("Source: built-in scenario {}", args.scenario);
            Ok(Box::new(source))
        }
        None => Err(format!(
            "unknown scenario '{}' (available: {})",
            args.scenario,
            SCENARIOS.join(", ")
        )),
    }
}

fn build_sink(format: Format) -> Box<dyn Sink> {
    match format {
        Format::Json => Box::new(JsonSink::new(io::stdout())),
        Format::Line => Box::new(LineSink::new(io::stdout())),
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("mongoglotd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, service={}, format={:?}, host={}, tags={}",
        args.interval,
        args.service,
        args.format,
        args.host.as_deref().unwrap_or("<from snapshot>"),
        args.tags.len()
    );

    let source = match build_source(&args) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let tags = base_tags(&args);
    let mut collector = Collector::new(source)
        .with_service(&args.service)
        .with_tags(tags);
    let mut sink = build_sink(args.format);

    if args.once {
        match collector.collect(sink.as_mut()) {
            Ok(summary) => {
                info!(
                    "Cycle: host={}, {} fields, {} databases",
                    summary.host, summary.fields, summary.databases
                );
                return;
            }
            Err(e) => {
                error!("Collection failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting collection loop");
    let mut cycle_count: u64 = 0;
    let mut failures: u64 = 0;

    while running.load(Ordering::SeqCst) {
        cycle_count += 1;

        match collector.collect(sink.as_mut()) {
            Ok(summary) => {
                info!(
                    "Cycle #{}: host={}, {} fields, {} databases",
                    cycle_count, summary.host, summary.fields, summary.databases
                );
                debug!("Cycle #{} took {:?}", cycle_count, summary.elapsed);
            }
            Err(e) => {
                failures += 1;
                error!("Cycle #{} failed: {}", cycle_count, e);
            }
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!(
        "Shutdown complete after {} cycles ({} failed)",
        cycle_count, failures
    );
}
