use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use snipmark::Config;
use snipmark::config::MAX_CHUNK_SIZE;
use snipmark::transfer::loopback::{LoopbackTransport, fetch};
use snipmark::transfer::transport::TARGETS;
use snipmark::transfer::{ProtocolAction, TransferEngine, WindowId};
use std::path::PathBuf;
use std::sync::Arc;

/// Window id used for the simulated requestor of `--transfer`.
const LOOPBACK_REQUESTOR: WindowId = WindowId(0x0020_0001);

#[derive(Parser, Debug)]
#[command(name = "snipmark")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SNIPMARK_GIT_HASH"), ")"),
    about = "Screenshot annotation and clipboard transfer engine"
)]
struct Cli {
    /// Read configuration from FILE instead of ~/.config/snipmark/config.toml
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long, action = ArgAction::SetTrue)]
    dump_config: bool,

    /// Serve FILE through the selection transfer engine to a loopback requestor
    #[arg(long, short = 't', value_name = "FILE")]
    transfer: Option<PathBuf>,

    /// Override the transfer chunk size in bytes
    #[arg(long, value_name = "BYTES", requires = "transfer")]
    chunk_size: Option<usize>,

    /// Target to request (defaults to the configured payload type; TARGETS lists them)
    #[arg(long, value_name = "NAME", requires = "transfer")]
    target: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(chunk_size) = cli.chunk_size {
        if !(1..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            log::warn!("Chunk size {chunk_size} out of range, clamping to 1-{MAX_CHUNK_SIZE}");
        }
        config.transfer.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
    }

    if cli.dump_config {
        print!("{}", config.to_toml()?);
    } else if let Some(path) = &cli.transfer {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read payload from {}", path.display()))?;
        let target = cli
            .target
            .clone()
            .unwrap_or_else(|| config.transfer.payload_type.clone());
        run_loopback_transfer(&config, data, &target)?;
    } else {
        // No flags: show usage
        println!("snipmark: Screenshot annotation and clipboard transfer engine");
        println!();
        println!("Usage:");
        println!("  snipmark --dump-config                 Print the effective configuration");
        println!("  snipmark --transfer FILE               Serve FILE to a loopback requestor");
        println!("  snipmark --transfer FILE --chunk-size N");
        println!("  snipmark --help                        Show help");
        println!();
        println!("Configuration:");
        println!("  ~/.config/snipmark/config.toml");
        println!("  Schema: dump_config_schema > snipmark.schema.json");
    }

    Ok(())
}

/// Runs one complete selection conversation in memory and checks the
/// requestor got back exactly what was served.
fn run_loopback_transfer(config: &Config, data: Vec<u8>, target: &str) -> anyhow::Result<()> {
    let payload: Arc<[u8]> = Arc::from(data);
    let mut engine = TransferEngine::new(config.transfer.clone());
    let mut transport = LoopbackTransport::new();

    log::info!(
        "Serving {} bytes as '{}' with {} byte chunks",
        payload.len(),
        target,
        engine.chunk_size()
    );

    let transcript = fetch(
        &mut engine,
        &mut transport,
        &payload,
        LOOPBACK_REQUESTOR,
        target,
    )?;

    let mut chunks = 0;
    for action in &transcript.actions {
        match action {
            ProtocolAction::WriteTargets(atoms) => {
                println!("targets: {} atom(s)", atoms.len());
            }
            ProtocolAction::WriteProperty { bytes } => {
                println!("single write: {bytes} bytes");
            }
            ProtocolAction::BeginChunked { total } => {
                println!("incr: announced {total} bytes");
            }
            ProtocolAction::WriteChunk { range } => {
                chunks += 1;
                println!("chunk {chunks}: bytes {}..{}", range.start, range.end);
            }
            ProtocolAction::WriteTerminal => println!("terminal: zero-length write"),
            ProtocolAction::Retry(err) => println!("retry: {err}"),
            other => println!("{other:?}"),
        }
    }

    if target == TARGETS {
        return Ok(());
    }
    if transcript.received.as_slice() != &payload[..] {
        bail!(
            "Reassembled {} bytes, expected {}",
            transcript.received.len(),
            payload.len()
        );
    }
    println!(
        "Transferred {} bytes in {} chunk(s); reassembly verified",
        payload.len(),
        chunks
    );
    Ok(())
}
