mod app;
mod headless;
mod source;
mod util;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use word_drift::{CloudConfig, CloudSession};

use crate::headless::HeadlessRun;
use crate::source::MessageSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Read messages from this file, one per line. Defaults to stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Pause between input lines, to replay a file like a live stream.
    #[arg(long, default_value_t = 0)]
    line_delay_ms: u64,

    /// Replay the input file forever.
    #[arg(long)]
    loop_input: bool,

    /// Print snapshots as JSON lines instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode.
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Emit every K-th headless snapshot.
    #[arg(long, default_value_t = 1)]
    emit_every: u64,

    #[arg(long)]
    max_words: Option<usize>,

    #[arg(long)]
    max_recent: Option<usize>,

    /// Messages between two decay passes.
    #[arg(long)]
    saturation_interval: Option<u64>,

    #[arg(long)]
    drain_per_tick: Option<usize>,

    #[arg(long)]
    queue_capacity: Option<usize>,

    #[arg(long)]
    damping: Option<f64>,

    #[arg(long)]
    spring_length: Option<f64>,

    #[arg(long)]
    repulsion: Option<f64>,

    #[arg(long)]
    attraction: Option<f64>,

    #[arg(long)]
    max_speed: Option<f64>,

    #[arg(long)]
    tick_hz: Option<f64>,

    /// Only show words counted more often than this.
    #[arg(long)]
    count_threshold: Option<u32>,

    /// Use a fixed seed for layout randomness.
    #[arg(long)]
    deterministic: bool,

    /// Log filter, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn cloud_config(&self) -> CloudConfig {
        let defaults = CloudConfig::default();
        CloudConfig {
            max_words: self.max_words.unwrap_or(defaults.max_words),
            max_recent: self.max_recent.unwrap_or(defaults.max_recent),
            saturation_interval: self
                .saturation_interval
                .unwrap_or(defaults.saturation_interval),
            drain_per_tick: self.drain_per_tick.unwrap_or(defaults.drain_per_tick),
            queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
            damping: self.damping.unwrap_or(defaults.damping),
            spring_length: self.spring_length.unwrap_or(defaults.spring_length),
            repulsion: self.repulsion.unwrap_or(defaults.repulsion),
            attraction: self.attraction.unwrap_or(defaults.attraction),
            max_speed: self.max_speed.unwrap_or(defaults.max_speed),
            tick_hz: self.tick_hz.unwrap_or(defaults.tick_hz),
            deterministic: self.deterministic,
            count_threshold: self.count_threshold.unwrap_or(defaults.count_threshold),
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install logger: {error}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = args.cloud_config();
    config.validate().context("invalid configuration")?;

    if args.print_config {
        let json = serde_json::to_string_pretty(&config).context("failed to encode configuration")?;
        println!("{json}");
        return Ok(());
    }

    let source = MessageSource::from_args(args.input.clone(), args.loop_input)?;
    let source_label = source.describe();

    let session = Arc::new(CloudSession::new(config));
    // the reader is detached: stdin may never reach EOF
    let _reader = source::spawn_reader(
        source,
        session.queue(),
        Duration::from_millis(args.line_delay_ms),
    );

    if args.headless {
        return headless::run(
            &session,
            HeadlessRun {
                ticks: args.ticks,
                emit_every: args.emit_every,
            },
        );
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "word-drift",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::WordCloudApp::new(cc, session, source_label)))
        }),
    )
    .map_err(|error| anyhow!("failed to run the word cloud window: {error}"))
}
