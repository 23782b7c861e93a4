//! Count the legal-move tree from a position.
//!
//! Usage:
//!   cargo run --release --bin perft -- 3
//!   cargo run --release --bin perft -- 2 --fen "<fen>" --divide

use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use commander_core::{Game, STANDARD_FEN};
use commander_perft::init_logging;
use commander_perft::perft::{Perft, PerftArgs};
use commander_perft::stats::format_elapsed;
use tracing::{error, info, warn};

const LOG_INTERVAL_SECS: u64 = 5;

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match PerftArgs::parse(&args) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let fen = args.fen.as_deref().unwrap_or(STANDARD_FEN);
    let game = match Game::from_fen(fen) {
        Ok(game) => game,
        Err(e) => {
            error!(%e, fen, "invalid position");
            return ExitCode::FAILURE;
        }
    };

    // Set up SIGINT handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        warn!(%e, "Ctrl-C handler unavailable");
    }

    info!(depth = args.depth, fen, "counting");
    let mut perft = Perft::new(running).with_progress(LOG_INTERVAL_SECS);
    let start = std::time::Instant::now();
    let report = match perft.run(&game, args.depth, args.divide) {
        Ok(report) => report,
        Err(e) => {
            error!(%e, "count failed");
            return ExitCode::FAILURE;
        }
    };

    for (san, nodes) in &report.divide {
        println!("{san}: {nodes}");
    }
    println!();
    println!("Nodes: {}", report.nodes);
    println!("Unique positions: {}", report.unique);
    println!("Time: {}", format_elapsed(start.elapsed().as_secs()));
    if report.interrupted {
        warn!("interrupted, counts are partial");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
