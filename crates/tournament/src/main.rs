//! Tournament CLI
//!
//! Run a seat-balanced tournament and print seat-corrected standings.

use anyhow::{bail, Context};
use std::io::{self, Write};
use std::path::PathBuf;
use tournament::{report, run, LineCollector, TournamentConfig, TournamentSession};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("Seat-balanced Tournament Runner");
    println!();
    println!("Usage:");
    println!("  tournament play [--config FILE] [--players A,B,C] [--seed N] [--blocks N] [--json]");
    println!("  tournament plan [--config FILE] [--players A,B,C] [--seed N]");
    println!();
    println!("Options:");
    println!("  --config, -c   TOML file with players, seed, max_blocks and [model]");
    println!("  --players, -p  Comma-separated player names (overrides the config)");
    println!("  --seed, -s     Seed for reproducible seating plans");
    println!("  --blocks, -b   Stop after this many blocks");
    println!("  --json         Print the final ledger and standings as JSON");
    println!();
    println!("Examples:");
    println!("  tournament play --players Ann,Bob,Cid,Dee --blocks 1");
    println!("  tournament plan --players Ann,Bob,Cid --seed 7");
}

struct Options {
    config: TournamentConfig,
    json: bool,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut config_path: Option<PathBuf> = None;
    let mut players: Option<Vec<String>> = None;
    let mut seed: Option<u64> = None;
    let mut blocks: Option<u32> = None;
    let mut json = false;

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" | "-c" => {
                config_path = Some(value.context("--config needs a file")?.into());
                i += 1;
            }
            "--players" | "-p" => {
                let list = value.context("--players needs a list")?;
                players = Some(list.split(',').map(|s| s.trim().to_string()).collect());
                i += 1;
            }
            "--seed" | "-s" => {
                seed = Some(value.context("--seed needs a number")?.parse()?);
                i += 1;
            }
            "--blocks" | "-b" => {
                blocks = Some(value.context("--blocks needs a number")?.parse()?);
                i += 1;
            }
            "--json" => json = true,
            other => bail!("unknown option: {}", other),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => TournamentConfig::load(&path)?,
        None => TournamentConfig::default(),
    };
    if let Some(players) = players {
        config.players = players;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if blocks.is_some() {
        config.max_blocks = blocks;
    }
    config.validate()?;

    Ok(Options { config, json })
}

fn play(args: &[String]) -> anyhow::Result<()> {
    let options = parse_options(args)?;
    let session = TournamentSession::from_config(&options.config)?;
    let players = session.players().len();

    let stdin = io::stdin();
    let mut collector = LineCollector::new(stdin.lock(), io::stdout());
    let mut out = io::stdout();
    let final_report = run(session, &mut collector, options.config.max_blocks, &mut out)?;

    print!("{}", report::format_final(&final_report, players));
    if options.json {
        println!("{}", serde_json::to_string_pretty(&final_report)?);
    }
    out.flush()?;
    Ok(())
}

fn plan(args: &[String]) -> anyhow::Result<()> {
    let options = parse_options(args)?;
    let mut session = TournamentSession::from_config(&options.config)?;
    let plan = session.start_block()?;

    for round in 1..=plan.size() as u32 {
        print!("{}", report::format_seating(1, round, round, plan.round(round)));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tournament=info,seating_core=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "play" => play(&args[2..]),
        "plan" => plan(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            Ok(())
        }
    }
}
