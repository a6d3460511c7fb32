//! Latency summary over a recv-tap event log.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tap_server::report::summarize;

#[derive(Parser)]
#[clap(name = "tap-report")]
#[clap(about = "Pair start/end markers in a recv-tap event log and summarize latency")]
struct Cli {
    /// Event log to read
    #[clap(default_value = "./zmq_recv_timestamp.log")]
    log: PathBuf,

    /// Print every completed span
    #[clap(short, long)]
    spans: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = File::open(&cli.log)
        .with_context(|| format!("cannot open {}", cli.log.display()))?;
    let report = summarize(BufReader::new(file))
        .with_context(|| format!("cannot read {}", cli.log.display()))?;

    if cli.spans {
        println!("key request push sender receiver latency_us");
        for span in &report.spans {
            println!(
                "{} {} {} {} {} {}",
                span.correlation_key,
                span.is_request as u8,
                span.is_push as u8,
                span.sender,
                span.receiver,
                span.latency_us()
            );
        }
        println!();
    }

    println!("events:           {}", report.events);
    println!("skipped lines:    {}", report.skipped_lines);
    println!("spans:            {}", report.spans.len());
    println!("unmatched starts: {}", report.unmatched_starts);
    println!("orphan ends:      {}", report.orphan_ends);
    println!("duplicate starts: {}", report.duplicate_starts);

    match report.stats() {
        Some(stats) => {
            println!("latency (us):");
            println!("  min  {}", stats.min);
            println!("  mean {:.1}", stats.mean);
            println!("  p50  {}", stats.p50);
            println!("  p99  {}", stats.p99);
            println!("  max  {}", stats.max);
        }
        None => println!("latency: no completed spans"),
    }

    Ok(())
}
