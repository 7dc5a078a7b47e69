//! FIFO paging simulator - command-line entry point
//!
//! Usage: fifo-paging-sim [OPTIONS] <INPUT>
//!
//! Reads a workload (pipe-separated text, or `.json`), replays it under FIFO
//! page replacement and prints a report to stdout or `--output`.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use fifo_paging_sim::{Report, Simulator, TraceModel, Workload};
use fifo_paging_sim::io::write_report;

/// Simulate FIFO page replacement under local or global frame allocation
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Workload file: config line, device lines, process lines
    input: PathBuf,

    /// How process accesses are interleaved in time
    #[arg(short, long, value_enum, default_value_t = TraceArg::RoundRobin)]
    trace: TraceArg,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include every access and its outcome in the report
    #[arg(long)]
    timeline: bool,

    /// Log setup and per-access decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TraceArg {
    RoundRobin,
    Sequential,
}

impl From<TraceArg> for TraceModel {
    fn from(arg: TraceArg) -> Self {
        match arg {
            TraceArg::RoundRobin => TraceModel::RoundRobin,
            TraceArg::Sequential => TraceModel::Sequential,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    /// `<evictions>|x|x|x|FIFO`
    Batch,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Main logic separated from main() for cleaner error handling
fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Step 1: Load the workload
    let workload = Workload::from_file(&cli.input)?;
    info!(
        "loaded {}: {} processes, {} devices (devices are not simulated)",
        cli.input.display(),
        workload.processes.len(),
        workload.devices.len()
    );

    // Step 2: Build the trace
    let model = TraceModel::from(cli.trace);
    let trace = model.source().generate(&workload.config, &workload.processes);

    // Step 3: Replay it
    let result = Simulator::new(&workload.config, &workload.processes)?
        .record_timeline(cli.timeline)
        .run(&trace);

    // Step 4: Render and emit
    let model_name = model.to_string();
    let report = Report::new(&workload.config, &model_name, &result);
    let rendered = match cli.format {
        OutputFormat::Text => report.to_text(),
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Batch => report.batch_line(),
    };

    match &cli.output {
        Some(path) => {
            write_report(path, &rendered)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", rendered.trim_end()),
    }

    Ok(())
}
