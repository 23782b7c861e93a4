//! Legal-move tree counting.
//!
//! Every legal move is one ply, including each step of a deploy session, so
//! splitting a three-unit stack takes up to three plies. Leaves are hashed
//! with xxh64 over their FEN to report how many distinct positions the tree
//! reaches.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use commander_core::{Game, GameResult};
use xxhash_rust::xxh64::xxh64;

use crate::stats::Stats;

/// Result of a count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerftReport {
    pub nodes: u64,
    pub unique: usize,
    /// Per root move (SAN, leaf count), filled when dividing.
    pub divide: Vec<(String, u64)>,
    /// Stopped by the interrupt flag; counts are partial.
    pub interrupted: bool,
}

/// Depth-first counter with an external stop flag.
pub struct Perft {
    running: Arc<AtomicBool>,
    seen: HashSet<u64>,
    nodes: u64,
    stats: Option<Stats>,
}

impl Perft {
    /// `running` is cleared (for instance by a Ctrl-C handler) to stop early.
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self {
            running,
            seen: HashSet::new(),
            nodes: 0,
            stats: None,
        }
    }

    /// Log progress every `secs` seconds.
    pub fn with_progress(mut self, secs: u64) -> Self {
        self.stats = Some(Stats::new(secs));
        self
    }

    fn stopped(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }

    /// Count leaves at `depth` below `game`, optionally split by root move.
    pub fn run(&mut self, game: &Game, depth: u32, divide: bool) -> GameResult<PerftReport> {
        self.seen.clear();
        self.nodes = 0;

        let mut report = PerftReport::default();
        if divide && depth > 0 {
            for mv in game.legal_moves(None) {
                if self.stopped() {
                    break;
                }
                let san = game.san(&mv);
                let mut child = game.clone();
                child.make_move(mv)?;
                let count = self.count(&child, depth - 1)?;
                report.divide.push((san, count));
            }
        } else {
            self.count(game, depth)?;
        }

        report.nodes = self.nodes;
        report.unique = self.seen.len();
        report.interrupted = self.stopped();
        Ok(report)
    }

    fn count(&mut self, game: &Game, depth: u32) -> GameResult<u64> {
        if depth == 0 {
            self.nodes += 1;
            self.seen.insert(xxh64(game.fen().as_bytes(), 0));
            if let Some(stats) = self.stats.as_mut() {
                stats.maybe_log(self.nodes, self.seen.len());
            }
            return Ok(1);
        }

        let mut leaves = 0;
        for mv in game.legal_moves(None) {
            if self.stopped() {
                break;
            }
            let mut child = game.clone();
            child.make_move(mv)?;
            leaves += self.count(&child, depth - 1)?;
        }
        Ok(leaves)
    }
}

/// Command-line options of the `perft` binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerftArgs {
    pub depth: u32,
    pub fen: Option<String>,
    pub divide: bool,
}

pub const PERFT_USAGE: &str = "usage: perft <depth> [--fen <fen>] [--divide]";

impl PerftArgs {
    /// Parse arguments (without the program name).
    pub fn parse(args: &[String]) -> Result<PerftArgs, String> {
        let mut depth = None;
        let mut fen = None;
        let mut divide = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--fen" => {
                    let value = iter.next().ok_or("--fen needs a value")?;
                    fen = Some(value.clone());
                }
                "--divide" => divide = true,
                other if depth.is_none() => {
                    depth = Some(other.parse().map_err(|_| format!("invalid depth: {other}"))?);
                }
                other => return Err(format!("unexpected argument: {other}")),
            }
        }

        Ok(PerftArgs {
            depth: depth.ok_or(PERFT_USAGE)?,
            fen,
            divide,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn perft(fen: &str, depth: u32) -> PerftReport {
        let game = Game::from_fen(fen).unwrap();
        Perft::new(Arc::new(AtomicBool::new(true)))
            .run(&game, depth, false)
            .unwrap()
    }

    #[test]
    fn test_depth_zero_and_one() {
        let game = Game::new();
        let expected = game.legal_moves(None).len() as u64;
        assert_eq!(perft(commander_core::STANDARD_FEN, 0).nodes, 1);
        let report = perft(commander_core::STANDARD_FEN, 1);
        assert_eq!(report.nodes, expected);
        assert_eq!(report.unique as u64, expected);
    }

    #[test]
    fn test_deploy_steps_count_as_plies() {
        let fen = "6c4/11/11/11/11/11/11/11/5(TM)5/11/11/5C5 r - - 0 1";
        let game = Game::from_fen(fen).unwrap();
        let report = Perft::new(Arc::new(AtomicBool::new(true)))
            .run(&game, 2, true)
            .unwrap();
        assert_eq!(report.divide.len(), game.legal_moves(None).len());
        assert_eq!(report.nodes, report.divide.iter().map(|(_, n)| n).sum::<u64>());

        // After a first deploy step Red is still to move.
        let (_, after_step) = report
            .divide
            .iter()
            .find(|(san, _)| san == "M>f5")
            .unwrap();
        let mut child = game.clone();
        child.make_move("M>f5").unwrap();
        assert_eq!(*after_step, child.legal_moves(None).len() as u64);
        assert!(child.legal_moves(None).iter().all(|m| m.is_deploy()));
    }

    #[test]
    fn test_interrupted() {
        let game = Game::new();
        let report = Perft::new(Arc::new(AtomicBool::new(false)))
            .run(&game, 3, false)
            .unwrap();
        assert!(report.interrupted);
        assert_eq!(report.nodes, 0);
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(
            PerftArgs::parse(&args(&["3", "--divide"])),
            Ok(PerftArgs {
                depth: 3,
                fen: None,
                divide: true
            })
        );
        let parsed = PerftArgs::parse(&args(&["--fen", "11/11 r - - 0 1", "2"])).unwrap();
        assert_eq!(parsed.fen.as_deref(), Some("11/11 r - - 0 1"));
        assert_eq!(parsed.depth, 2);
        assert!(PerftArgs::parse(&args(&[])).is_err());
        assert!(PerftArgs::parse(&args(&["x"])).is_err());
        assert!(PerftArgs::parse(&args(&["2", "--fen"])).is_err());
    }
}
