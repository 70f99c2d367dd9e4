// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::{Parser, Subcommand};
use redstone_nbt::region::Region;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mc-inspect")]
#[command(about = "Inspect region files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every occupied slot in a region file
    Region {
        /// Path to the region file
        path: PathBuf,
    },
    /// Dump a single chunk's parsed tag tree
    Chunk {
        /// Path to the region file
        path: PathBuf,
        /// Chunk X coordinate (0..32)
        x: u8,
        /// Chunk Z coordinate (0..32)
        z: u8,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        let msg = format!("{:?}", e).to_lowercase();
        if msg.contains("broken pipe") || msg.contains("os error 32") {
            std::process::exit(0);
        }
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Commands::Region { path } => {
            let region = Region::open(&path, false)?;
            for z in 0..32u8 {
                for x in 0..32u8 {
                    if !region.contains(x, z) {
                        continue;
                    }
                    let length = region.length(x, z)?.unwrap_or(0);
                    let codec = region.compression(x, z)?;
                    writeln!(
                        handle,
                        "({x:>2}, {z:>2}) timestamp={} length={length} codec={codec:?}",
                        region.timestamp(x, z),
                    )?;
                }
            }
        }
        Commands::Chunk { path, x, z } => {
            let region = Region::open(&path, false)?;
            match redstone_nbt::tag::named::NamedNbt::parse_from_region(&region, x, z)? {
                Some(named) => {
                    writeln!(handle, "Chunk ({x}, {z}) root tag name: '{}'", named.name())?;
                    writeln!(handle, "{:#?}", named.root())?;
                }
                None => {
                    writeln!(handle, "Chunk ({x}, {z}) is not present in this region.")?;
                }
            }
        }
    }
    Ok(())
}
