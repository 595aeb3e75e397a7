//! Feed handler binary.
//!
//! Usage:
//!   feed-handler --pcap-file capture.pcap --stats
//!   feed-handler --itch-file 01302019.NASDAQ_ITCH50 --stats
//!   feed-handler --listen-port 26477 --producer-core 1 --consumer-core 2

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use feed_handler::{FeedConfig, FeedHandler};

#[derive(Parser, Debug)]
#[command(name = "feed-handler")]
#[command(about = "NASDAQ TotalView-ITCH 5.0 / MoldUDP64 feed handler")]
#[command(version)]
struct Args {
    /// Replay a pcap capture (Ethernet/IPv4/UDP frames)
    #[arg(short = 'p', long, value_name = "FILE")]
    pcap_file: Option<PathBuf>,

    /// Replay a raw ITCH capture (2-byte big-endian length framing)
    #[arg(short = 'i', long, value_name = "FILE")]
    itch_file: Option<PathBuf>,

    /// Listen for live MoldUDP64 datagrams on this UDP port
    #[arg(short = 'P', long, value_name = "PORT")]
    listen_port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CPU core for packet reception and decoding
    #[arg(long, value_name = "N")]
    producer_core: Option<usize>,

    /// CPU core for event consumption
    #[arg(long, value_name = "N")]
    consumer_core: Option<usize>,

    /// Disable CPU core pinning
    #[arg(short = 'n', long)]
    no_pin: bool,

    /// Print statistics after processing
    #[arg(short, long)]
    stats: bool,

    /// Print statistics as JSON
    #[arg(long)]
    json_stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone)]
enum Mode {
    Pcap(PathBuf),
    Itch(PathBuf),
    Live(u16),
}

fn resolve_mode(args: &Args) -> Result<Mode> {
    match (&args.pcap_file, &args.itch_file, args.listen_port) {
        (Some(path), None, None) => Ok(Mode::Pcap(path.clone())),
        (None, Some(path), None) => Ok(Mode::Itch(path.clone())),
        (None, None, Some(port)) => Ok(Mode::Live(port)),
        (None, None, None) => {
            bail!("one of --pcap-file, --itch-file or --listen-port is required")
        }
        _ => bail!("--pcap-file, --itch-file and --listen-port are mutually exclusive"),
    }
}

fn load_config(args: &Args) -> Result<FeedConfig> {
    let mut config = match &args.config {
        Some(path) => FeedConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FeedConfig::default(),
    };

    if let Some(core) = args.producer_core {
        config.cores.producer = core;
    }
    if let Some(core) = args.consumer_core {
        config.cores.consumer = core;
    }
    if args.no_pin {
        config.cores.pin = false;
    }
    if let Some(port) = args.listen_port {
        config.feed.listen_port = port;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let mode = resolve_mode(&args)?;
    let config = load_config(&args)?;

    let mut handler = FeedHandler::new(config);
    let running = handler.running_flag();
    handler.start_consumer();

    let start = Instant::now();

    let mut task = tokio::task::spawn_blocking(move || -> Result<(FeedHandler, u64)> {
        let count = match mode {
            Mode::Pcap(path) => {
                info!(path = %path.display(), "processing pcap file");
                handler.process_pcap_file(&path)?
            }
            Mode::Itch(path) => {
                info!(path = %path.display(), "processing raw ITCH file");
                handler.process_itch_file(&path)?
            }
            Mode::Live(port) => {
                info!(port, "starting live capture");
                handler.run_live()?
            }
        };
        Ok((handler, count))
    });

    let (mut handler, count) = tokio::select! {
        res = &mut task => res??,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            running.store(false, Ordering::Release);
            (&mut task).await??
        }
    };

    let report = handler.stop();
    let elapsed = start.elapsed();

    info!(
        processed = count,
        events_consumed = report.events_consumed,
        elapsed_ms = elapsed.as_millis() as u64,
        "run complete"
    );
    if count > 0 && !elapsed.is_zero() {
        let stats = handler.stats();
        let rate = stats.decoder.total_messages as f64 / elapsed.as_secs_f64();
        info!(messages_per_sec = format!("{rate:.0}"), "throughput");
    }

    if args.json_stats {
        println!("{}", serde_json::to_string_pretty(&handler.stats())?);
    } else if args.stats {
        println!("{}", handler.stats());
    }

    Ok(())
}
