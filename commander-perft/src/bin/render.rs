//! Render a position to SVG.
//!
//! Usage:
//!   cargo run --release --bin render -- --fen "<fen>" -o board.svg
//!   cargo run --release --bin render -- --fen "<fen>" --highlight f4,f5 --scale 2

use std::env;
use std::fs;
use std::process::ExitCode;

use commander_core::{Game, Square, STANDARD_FEN};
use commander_perft::init_logging;
use commander_perft::svg::{render_svg, RenderOptions};
use tracing::{error, info};

fn print_usage() {
    eprintln!("usage: render [--fen <fen>] [-o <file>] [--highlight <sq,sq,..>] [--scale <n>] [--no-coords]");
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let mut fen = STANDARD_FEN.to_string();
    let mut output: Option<String> = None;
    let mut opts = RenderOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--fen" => {
                i += 1;
                fen = args.get(i).cloned().unwrap_or_default();
            }
            "-o" | "--output" => {
                i += 1;
                output = args.get(i).cloned();
            }
            "--highlight" => {
                i += 1;
                opts.highlight = args
                    .get(i)
                    .map(|list| list.split(',').filter_map(Square::parse).collect())
                    .unwrap_or_default();
            }
            "--scale" => {
                i += 1;
                opts.scale = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(1.0);
            }
            "--no-coords" => opts.coordinates = false,
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("unknown argument: {other}");
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let game = match Game::from_fen(&fen) {
        Ok(game) => game,
        Err(e) => {
            error!(%e, fen, "invalid position");
            return ExitCode::FAILURE;
        }
    };
    let svg = render_svg(&game.state().effective_board(), &opts);

    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, svg) {
                error!(%e, %path, "could not write SVG");
                return ExitCode::FAILURE;
            }
            info!(%path, "wrote SVG");
        }
        None => print!("{svg}"),
    }
    ExitCode::SUCCESS
}
