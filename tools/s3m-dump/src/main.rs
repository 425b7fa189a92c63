//! S3M Module Dump Tool
//!
//! A CLI tool for inspecting S3M tracker modules: header summary, instrument
//! listing, play order, and rendered pattern grids.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use nether_s3m::{NUM_CHANNELS, ROWS_PER_PATTERN, S3mPattern, cell_to_text, parse_s3m};

#[derive(Parser)]
#[command(name = "s3m-dump")]
#[command(about = "Inspect S3M tracker module files")]
struct Cli {
    /// Path to the S3M file
    file: PathBuf,

    /// Dump a single pattern as a cell grid
    #[arg(long, short)]
    pattern: Option<u16>,

    /// List the pattern play order
    #[arg(long)]
    orders: bool,

    /// Limit pattern dumps to the first N channels
    #[arg(long, default_value_t = 8)]
    channels: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data = fs::read(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let module = parse_s3m(&data)
        .with_context(|| format!("failed to parse {}", cli.file.display()))?;

    println!("Title:       {}", module.title);
    println!("Orders:      {}", module.num_orders);
    println!("Instruments: {}", module.num_instruments);
    println!("Patterns:    {}", module.num_patterns);
    println!(
        "Tempo:       {} BPM @ speed {} ({} ns/row)",
        module.initial_tempo,
        module.initial_speed,
        module.row_interval_ns()
    );

    if !module.instruments.is_empty() {
        println!();
        for (i, instr) in module.instruments.iter().enumerate() {
            println!(
                "  {:2}. {:28} {:5} frames @ {} Hz, vol {}",
                i + 1,
                instr.title,
                instr.sample_length(),
                instr.c5_freq,
                instr.default_volume
            );
        }
    }

    if cli.orders {
        println!();
        let order: Vec<String> = module.play_order().map(|o| o.to_string()).collect();
        println!("Play order:  {}", order.join(" "));
    }

    if let Some(index) = cli.pattern {
        let Some(slot) = module.patterns.get(index as usize) else {
            bail!("pattern {} out of range (module has {})", index, module.num_patterns);
        };
        let Some(pattern) = slot else {
            bail!("pattern {} is absent (zero parapointer)", index);
        };
        println!();
        dump_pattern(index, pattern, cli.channels.min(NUM_CHANNELS));
    }

    Ok(())
}

fn dump_pattern(index: u16, pattern: &S3mPattern, channels: usize) {
    for row in 0..ROWS_PER_PATTERN {
        let cells: Vec<String> = pattern.row(row)[..channels]
            .iter()
            .map(cell_to_text)
            .collect();
        println!("{:2}.{:2} | {}", index, row, cells.join(" | "));
    }
}
