//! Viroscope - Viral Genome Analysis Assistant
//!
//! A terminal assistant for a single viral genome.
//!
//! ## Usage
//!
//! ```bash
//! viroscope                          # start empty, :open <file> inside
//! viroscope genome.fasta             # preload a genome
//! viroscope genome.gb -o -           # batch statistics report to stdout
//! viroscope genome.fasta -o out.txt -a "Mutation Analysis"
//! ```
//!
//! ## Supported Formats
//!
//! - FASTA (.fasta, .fa, .fna)
//! - GenBank (.gb, .gbk)
//! - Plain text (.txt)

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::info;

use viroscope::config::{GatewayConfig, UiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use viroscope::controller::run_app;
use viroscope::formats::load_upload;
use viroscope::gateway::{invoke, OllamaClient};
use viroscope::model::AppState;
use viroscope::prompt::{build_analysis_prompt, AnalysisCategory};
use viroscope::report::{write_analysis, write_stats_report};
use viroscope::ui::glyphs;

/// Viroscope - chart a viral genome and ask a local LLM about it
///
/// When run without -o/--output, opens the interactive assistant.
/// With -o/--output, writes a statistics report (plus any -a analyses) to a
/// file, or to stdout with "-".
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genome file to load (.fasta, .txt or .gb)
    file: Option<PathBuf>,

    /// Text-generation endpoint
    #[arg(long = "endpoint", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Model identifier sent with every prompt
    #[arg(short = 'm', long = "model", default_value = DEFAULT_MODEL)]
    model: String,

    /// Request timeout in seconds (default: no client-side limit)
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Draw with plain ASCII instead of Unicode symbols
    #[arg(long = "ascii")]
    ascii: bool,

    /// Log file for the interactive session (default: a file in the temp dir)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Output file (enables batch mode). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// K-mer size (2-6)
    #[arg(short = 'k', long = "kmer-size", default_value = "3",
          value_parser = clap::value_parser!(u8).range(2..=6))]
    kmer_size: u8,

    /// Analysis to run, e.g. "Mutation Analysis" (repeatable)
    #[arg(short = 'a', long = "analysis")]
    analyses: Vec<AnalysisCategory>,
}

/// Log file name used when `--log-file` is not given.
fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("viroscope-{:08x}.log", rand::random::<u32>()))
}

/// Sends log records to stderr, or to a file while the TUI owns the terminal.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_target(false);

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Runs batch mode: statistics report, then each requested analysis.
fn run_batch_mode(
    file_path: &Path,
    output: &str,
    kmer_size: usize,
    analyses: &[AnalysisCategory],
    gateway: GatewayConfig,
) -> Result<()> {
    let upload = load_upload(file_path)
        .with_context(|| format!("Could not load {}", file_path.display()))?;

    let mut out: Box<dyn Write> = if output == "-" {
        Box::new(io::stdout().lock())
    } else {
        Box::new(
            File::create(output).with_context(|| format!("Failed to create {}", output))?,
        )
    };

    write_stats_report(&mut out, &upload, kmer_size)?;

    if !analyses.is_empty() {
        let client = OllamaClient::new(gateway)?;
        for &category in analyses {
            info!("Requesting {}", category);
            let reply = invoke(&client, &build_analysis_prompt(category, &upload.raw));
            write_analysis(&mut out, category, &reply)?;
        }
    }
    out.flush()?;

    if output != "-" {
        eprintln!("Wrote report for {} to {}", upload.file_name(), output);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let gateway = GatewayConfig {
        endpoint: args.endpoint,
        model: args.model,
        timeout: args.timeout_secs.map(Duration::from_secs),
    };
    let ui_config = UiConfig {
        fancy_glyphs: !args.ascii,
        kmer_size: args.kmer_size as usize,
    };

    // Batch mode: output to file/stdout
    if let Some(output) = args.output {
        init_logging(args.log_file.as_deref())?;
        let Some(file_path) = args.file else {
            anyhow::bail!("Batch mode (-o) needs a genome FILE");
        };
        return run_batch_mode(&file_path, &output, ui_config.kmer_size, &args.analyses, gateway);
    }

    let log_path = args.log_file.unwrap_or_else(default_log_path);
    init_logging(Some(&log_path))?;

    let mut state = AppState::new(&ui_config);
    for &category in &args.analyses {
        state.analyses.select(category);
    }
    if let Some(file_path) = &args.file {
        state.open_file(file_path);
    }

    let client = OllamaClient::new(gateway)?;
    info!(
        "Using {} with model {}",
        client.config().endpoint,
        client.config().model
    );
    run_app(state, Box::new(client), glyphs::select(ui_config.fancy_glyphs))
}
