// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::{Parser, ValueEnum};
use redstone_nbt::tag::codec;
use redstone_nbt::tag::named::NamedNbt;
use std::io::Write;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Re-encoded wire bytes, written to stdout verbatim
    Raw,
    /// `{:#?}` debug dump of the parsed tag tree
    Debug,
}

#[derive(Parser)]
#[command(name = "nbt-dump")]
#[command(about = "Extract a standalone NBT file", long_about = None)]
struct Cli {
    /// Path to the (gzip- or zlib-compressed, or raw) NBT file
    path: PathBuf,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Debug)]
    format: Format,
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
    let named = NamedNbt::parse_from_file(&cli.path)?;

    match cli.format {
        Format::Raw => {
            let wire = codec::write_named(named.name(), named.root());
            std::io::stdout().write_all(&wire)?;
        }
        Format::Debug => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "Root tag name: '{}'", named.name())?;
            writeln!(handle, "{:#?}", named.root())?;
        }
    }
    Ok(())
}
