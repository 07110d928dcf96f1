//! seqls: list the file sequences detected in a directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use seqdir::{ScanOptions, Sequence};

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Target: ",
    std::env::consts::ARCH,
    "-",
    std::env::consts::OS
);

/// File sequence lister
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
struct Args {
    /// Directory to scan
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Explicit pattern with one numeric placeholder (name.####.ext or %04d)
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
    pattern: Option<String>,

    /// Allow signed (negative) frame numbers
    #[arg(long = "signed")]
    signed: bool,

    /// Override the first frame of every detected group
    #[arg(long = "start", value_name = "N")]
    start: Option<i64>,

    /// Override the step of every detected group
    #[arg(long = "step", value_name = "N")]
    step: Option<i64>,

    /// Emit groups as JSON
    #[arg(long = "json")]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let opts = ScanOptions {
        signed: args.signed,
        start: args.start,
        step: args.step,
    };
    let seq = Sequence::scan_with(&args.dir, args.pattern.as_deref(), &opts)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(seq.groups())?);
        return Ok(());
    }

    if seq.num_groups() == 0 {
        println!("No sequences in {}", args.dir.display());
    }
    for g in seq.groups() {
        let field = if g.num_fill > 0 {
            "#".repeat(g.num_fill)
        } else {
            "#".to_string()
        };
        println!(
            "{}{}{}  {}-{} step{}  ({} files, {} holes)",
            g.prefix,
            field,
            g.postfix,
            g.first,
            g.last,
            g.step,
            g.len(),
            g.holes().len()
        );
    }
    for c in seq.conflicts() {
        eprintln!("conflict: {}", c);
    }

    Ok(())
}
