//! Magic bitboard table generator
//!
//! Usage: cargo run --release -- generate --seed 42 --out-dir ./tables
//!        cargo run --release -- verify --out-dir ./tables
//!        cargo run --release -- mask rook a1

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;

use slider_magics::bitboard::render;
use slider_magics::blockers::BlockerMask;
use slider_magics::config::{parse_seed, GeneratorConfig, OutputPaths};
use slider_magics::emit::{write_artifacts, Artifacts};
use slider_magics::lookup::SliderLookup;
use slider_magics::table::build_tables;
use slider_magics::types::{PieceType, Square};

#[derive(Parser, Debug)]
#[command(name = "slider_magics")]
#[command(about = "Generate and check magic bitboard tables for bishops and rooks")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search magics for all squares and write the artifacts
    Generate {
        /// Directory for magics.json, attacks.json, blockers.json and manifest.json
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// RNG seed, decimal or 0x-prefixed hex
        #[arg(long, value_parser = parse_seed_arg)]
        seed: Option<u64>,

        /// Candidates tried per square before giving up
        #[arg(long)]
        attempts: Option<u64>,

        /// Bishop index width (512-slot tables)
        #[arg(long, default_value_t = 9)]
        bishop_bits: u8,

        /// Rook index width (4096-slot tables)
        #[arg(long, default_value_t = 12)]
        rook_bits: u8,

        /// Worker threads
        #[arg(short, long)]
        threads: Option<usize>,

        /// Skip the run manifest
        #[arg(long)]
        no_manifest: bool,

        /// Check the written tables against ray-walked attacks
        #[arg(long)]
        verify: bool,
    },

    /// Load written artifacts and check every lookup
    Verify {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the blocker mask of a piece on a square
    Mask {
        piece: PieceType,
        /// Square index 0-63 or algebraic name such as e4
        square: String,
    },
}

fn parse_seed_arg(s: &str) -> Result<u64, String> {
    parse_seed(s).ok_or_else(|| format!("`{s}` is not a decimal or 0x-prefixed hex seed"))
}

fn parse_square(s: &str) -> Result<Square> {
    if let Ok(sq) = s.parse::<u8>() {
        return if sq < 64 { Ok(sq) } else { Err(eyre!("square {sq} is off the board")) };
    }
    let bytes = s.as_bytes();
    if bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1]) {
        return Ok((bytes[1] - b'1') * 8 + (bytes[0] - b'a'));
    }
    Err(eyre!("`{s}` is not a square"))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slider_magics=info".into()),
        )
        .init();

    match Args::parse().command {
        Command::Generate {
            out_dir,
            seed,
            attempts,
            bishop_bits,
            rook_bits,
            threads,
            no_manifest,
            verify,
        } => {
            let env = GeneratorConfig::from_env();
            let mut output = out_dir.map(OutputPaths::in_dir).unwrap_or(env.output);
            if no_manifest {
                output.manifest = None;
            }
            let config = GeneratorConfig {
                attempt_budget: attempts.unwrap_or(env.attempt_budget),
                seed: seed.or(env.seed),
                bishop_bits,
                rook_bits,
                threads: threads.or(env.threads),
                output,
            };

            let tables = build_tables(&config).wrap_err("magic generation failed, nothing was written")?;
            let artifacts = Artifacts::from_tables(&tables);
            write_artifacts(&artifacts, &config.output).wrap_err("could not write artifacts")?;
            info!(seed = tables.seed, total_attempts = tables.total_attempts(), "done");

            if verify {
                SliderLookup::load(&config.output)?.verify()?;
            }
        }
        Command::Verify { out_dir } => {
            let paths = OutputPaths::in_dir(&out_dir);
            let lookup = SliderLookup::load(&paths)
                .wrap_err_with(|| format!("could not load tables from {}", out_dir.display()))?;
            let checked = lookup.verify()?;
            println!("OK: {checked} lookups match");
        }
        Command::Mask { piece, square } => {
            let sq = parse_square(&square)?;
            let mask = BlockerMask::new(piece, sq);
            println!("{piece} on {square}: {} relevant squares, mask {:#018x}", mask.len(), mask.bits);
            print!("{}", render(mask.bits));
        }
    }
    Ok(())
}
