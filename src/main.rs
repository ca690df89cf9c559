use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use lucena_core::{Board, STARTING_FEN, perft};
use lucena_engine::{SearchLimits, TranspositionTable, format_score, search};

/// Default transposition table budget.
const TT_MEGABYTES: usize = 64;

struct Args {
    fen: String,
    depth: Option<u8>,
    move_time: Option<u64>,
    perft_depth: Option<usize>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        fen: STARTING_FEN.to_string(),
        depth: None,
        move_time: None,
        perft_depth: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .with_context(|| format!("{name} requires a value"))
        };
        match flag.as_str() {
            "--fen" => args.fen = value("--fen")?,
            "--depth" => args.depth = Some(value("--depth")?.parse().context("bad depth")?),
            "--movetime" => {
                args.move_time = Some(value("--movetime")?.parse().context("bad movetime")?)
            }
            "--perft" => {
                args.perft_depth = Some(value("--perft")?.parse().context("bad perft depth")?)
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = parse_args()?;
    let mut board: Board = args.fen.parse().context("invalid FEN")?;

    if let Some(depth) = args.perft_depth {
        let start = std::time::Instant::now();
        for (mv, nodes) in perft::divide(&mut board, depth) {
            println!("{mv}: {nodes}");
        }
        let total = perft::perft(&mut board, depth);
        info!(depth, total, elapsed_ms = start.elapsed().as_millis() as u64, "perft done");
        println!("total: {total}");
        return Ok(());
    }

    let mut limits = SearchLimits::default();
    if let Some(depth) = args.depth {
        limits.max_depth = depth;
    }
    if let Some(millis) = args.move_time {
        limits.max_time = Some(Duration::from_millis(millis));
    }
    if args.depth.is_none() && args.move_time.is_none() {
        // Keep the default invocation bounded.
        limits.max_time = Some(Duration::from_millis(5000));
    }

    info!(fen = %board, "searching");

    let mut tt = TranspositionTable::with_megabytes(TT_MEGABYTES);
    let stop = Arc::new(AtomicBool::new(false));
    let report = search(&mut board, &mut tt, &limits, stop);

    info!(
        depth = report.depth,
        score = %format_score(report.score),
        nodes = report.nodes,
        nps = report.nps(),
        "search finished"
    );

    match report.best_move {
        Some(mv) => println!("bestmove {}", mv.to_uci()),
        None => println!("bestmove 0000"),
    }
    Ok(())
}
