//! Passport Gate CLI
//!
//! Usage:
//!   passport-gate --replay session.jsonl         # Replay a timed detection script
//!   passport-gate --interactive                  # Detection events as JSON lines on stdin
//!   passport-gate --serve                        # HTTP API server
//!   passport-gate --replay s.jsonl --json        # JSON snapshots

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use passport_gate::core::{run_server, ShutterReleased, ValidationSession};
use passport_gate::script::parse_script;
use passport_gate::types::{DetectionEvent, ValidationSnapshot};
use passport_gate::{Config, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "passport-gate",
    version = VERSION,
    about = "Passport Gate - validate a live face against passport photo rules",
    long_about = "Passport Gate fuses face geometry, capture quality and smile\n\
                  observations into one capture signal.\n\n\
                  A face is valid when pose, size, position and quality all pass.\n\
                  After it stays valid for the grace period a smile releases the shutter.\n\n\
                  Modes:\n  \
                  --replay       Replay a JSON-lines detection script in real time\n  \
                  --interactive  Read detection events from stdin\n  \
                  --serve        HTTP API server"
)]
struct Args {
    /// Replay a JSON-lines script of {"at_ms", "event"} steps
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Interactive mode - read one detection event (JSON) per line from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (overrides config)
    #[arg(long)]
    addr: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }

    if args.serve {
        run_server(config).await.context("API server failed")?;
    } else if let Some(path) = &args.replay {
        run_replay(path, &config, &args).await?;
    } else {
        run_interactive(&config, &args).await?;
    }
    Ok(())
}

/// Replay a script against a fresh session, honouring each step's offset
async fn run_replay(path: &Path, config: &Config, args: &Args) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let steps = parse_script(&content)?;

    print_header("Replay", args.json);
    let session = ValidationSession::from_config(config);
    let printer = spawn_printer(&session, args.json);
    let handle = session.handle();

    let start = Instant::now();
    for step in steps {
        tokio::time::sleep_until(start + step.offset()).await;
        handle.dispatch(step.event.into()).await?;
    }
    // Drain the queue before teardown
    handle.snapshot().await?;

    session.shutdown().await;
    printer.await?;
    Ok(())
}

/// Read detection events from stdin until EOF or "quit"
async fn run_interactive(config: &Config, args: &Args) -> anyhow::Result<()> {
    print_header("Interactive", args.json);
    if !args.json {
        println!("One detection event per line, e.g.:");
        println!("  {{\"type\":\"geometry\",\"bounding_box\":{{\"x\":0,\"y\":0,\"width\":200,\"height\":300}},\"roll\":1.4,\"pitch\":0,\"yaw\":0}}");
        println!("  {{\"type\":\"quality\",\"score\":0.5}}");
        println!("  {{\"type\":\"smile\",\"detected\":true}}");
        println!("Type 'quit' to exit.");
        println!();
    }

    let session = ValidationSession::from_config(config);
    let printer = spawn_printer(&session, args.json);
    let handle = session.handle();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<DetectionEvent>(line) {
            Ok(event) => handle.dispatch(event.into()).await?,
            Err(e) => eprintln!("⚠ invalid event: {}", e),
        }
    }

    session.shutdown().await;
    printer.await?;
    Ok(())
}

/// Print every state change and shutter release until the session closes
fn spawn_printer(session: &ValidationSession, json: bool) -> JoinHandle<()> {
    let mut snapshots = session.subscribe();
    let mut shutter = session.subscribe_shutter();

    tokio::spawn(async move {
        let mut shutter_open = true;
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        // Session gone; releases may still be queued
                        for event in drain_shutter(&mut shutter) {
                            print_shutter(&event, json);
                        }
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    print_snapshot(&snapshot, json);
                }
                released = shutter.recv(), if shutter_open => match released {
                    Ok(event) => print_shutter(&event, json),
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => shutter_open = false,
                },
            }
        }
    })
}

/// Take every release already queued on `shutter` without waiting
fn drain_shutter(shutter: &mut broadcast::Receiver<ShutterReleased>) -> Vec<ShutterReleased> {
    let mut events = Vec::new();
    loop {
        match shutter.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    events
}

fn print_shutter(event: &ShutterReleased, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "shutter_released": event }));
    } else {
        println!("  ✓ SHUTTER RELEASED (update #{})", event.sequence);
    }
}

fn print_snapshot(snapshot: &ValidationSnapshot, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("⚠ failed to encode snapshot: {}", e),
        }
        return;
    }

    println!("{}", snapshot.to_terminal_string());
    println!("  └─ {}", snapshot.instruction.description());
    if snapshot.debug_enabled {
        for line in snapshot.debug_lines() {
            println!("     {}", line);
        }
    }
}

/// Print header
fn print_header(mode: &str, json: bool) {
    if json {
        return;
    }
    println!("========================================");
    println!("  Passport Gate v{} - {}", VERSION, mode);
    println!("========================================");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use passport_gate::core::FaceValidator;
    use passport_gate::types::Rect;

    #[tokio::test(start_paused = true)]
    async fn test_drain_keeps_release_queued_before_teardown() {
        let session = ValidationSession::spawn(FaceValidator::default(), 8);
        let mut shutter = session.subscribe_shutter();
        let h = session.handle();
        h.on_geometry(Rect::new(0.0, 0.0, 200.0, 300.0), 1.4, 0.0, 0.0).await.unwrap();
        h.on_quality(0.5).await.unwrap();
        h.on_smile(true).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(passport_gate::GRACE_PERIOD_MS + 1)).await;
        h.snapshot().await.unwrap();
        session.shutdown().await;

        let events = drain_shutter(&mut shutter);
        assert_eq!(events.len(), 1);
        assert!(drain_shutter(&mut shutter).is_empty());
    }
}
