use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use voltesim_mmed::{handler, MmeContext};
use volte_core::{transport, EntityConfig};

#[derive(Parser, Debug)]
#[command(name = "voltesim-mmed", version, about = "VoLTE simulator MME daemon")]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = "/etc/voltesim/mme.yaml")]
    config: String,
    /// Log level filter (error/warn/info/debug/trace)
    #[arg(short = 'e', long, default_value = "info")]
    log_level: String,
    /// Append logs to this file instead of stderr
    #[arg(short = 'l', long)]
    log_file: Option<String>,
    /// Disable colored log output
    #[arg(short = 'm', long)]
    no_color: bool,
}

const CHANNEL_DEPTH: usize = 1024;

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&args.log_level);
    builder.format_timestamp_millis();
    if args.no_color {
        builder.write_style(env_logger::WriteStyle::Never);
    }
    if let Some(ref path) = args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {path}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let cfg = EntityConfig::load(&args.config)
        .with_context(|| format!("loading configuration {}", args.config))?;
    log::info!("voltesim-mmed v{} listening on {}", env!("CARGO_PKG_VERSION"), cfg.listen);

    let sock = Arc::new(UdpSocket::bind(cfg.listen).await.context("binding listen socket")?);
    let (in_tx, mut in_rx) = mpsc::channel(CHANNEL_DEPTH);
    let (up_tx, up_rx) = mpsc::channel(CHANNEL_DEPTH);
    let (down_tx, down_rx) = mpsc::channel(CHANNEL_DEPTH);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            log::info!("shutdown signal received");
            cancel.cancel();
        })
        .context("installing signal handler")?;
    }

    tokio::spawn(transport::listener_loop("MME", sock.clone(), in_tx, cancel.clone()));
    tokio::spawn(transport::drain_loop(
        "MME",
        "up",
        sock.clone(),
        up_rx,
        cfg.points.clone(),
        cancel.clone(),
    ));
    tokio::spawn(transport::drain_loop(
        "MME",
        "down",
        sock.clone(),
        down_rx,
        cfg.points.clone(),
        cancel.clone(),
    ));

    let mut ctx = MmeContext::new(&cfg);
    let router = handler::routes();
    volte_core::run_loop("MME", &mut ctx, &router, &mut in_rx, &up_tx, &down_tx, cancel, |_, _, _| {})
        .await;

    log::info!("voltesim-mmed stopped");
    Ok(())
}
