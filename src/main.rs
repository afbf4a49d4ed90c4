use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use stream_assembler_rs::config::{AppConfig, AssemblerConfig};
use stream_assembler_rs::logging::{self, LoggingConfig};
use stream_assembler_rs::{ChatChunk, ChatGenerationResult, DirtyJsonParser, MarkerPair};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stream-assembler")]
#[command(about = "Split streamed model output into reasoning and response, and recover JSON from it")]
#[command(long_about = r#"
Split streamed model output into reasoning and response, and recover JSON from it

Examples:
  # Replay a captured stream in 4-character deltas
  stream-assembler assemble --input capture.txt --chunk-size 4

  # Custom reasoning markers
  echo '[[plan]]answer' | stream-assembler assemble --open-marker '[[' --close-marker ']]'

  # Recover a tool call from a messy reply
  echo "Sure! {'tool_name': 'response',}" | stream-assembler extract
"#)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    /// Also write daily-rotated log files to this directory
    #[arg(long, global = true)]
    log_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed the input through the reasoning assembler as a simulated stream
    Assemble(AssembleArgs),
    /// Extract a JSON value from the input
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Input file (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Characters per simulated delta
    #[arg(long, default_value_t = 1)]
    chunk_size: usize,

    /// Opening reasoning marker, overrides the config file
    #[arg(long, requires = "close_marker")]
    open_marker: Option<String>,

    /// Closing reasoning marker, overrides the config file
    #[arg(long, requires = "open_marker")]
    close_marker: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Input file (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::from_json_file(path)?),
        None => Ok(AppConfig::default()),
    }
}

/// Split `text` into deltas of at most `size` characters.
fn split_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

fn print_event(chunk: &ChatChunk) -> Result<()> {
    if !chunk.is_empty() {
        println!("{}", serde_json::to_string(chunk)?);
    }
    Ok(())
}

fn run_assemble(args: AssembleArgs) -> Result<()> {
    if args.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let mut assembler_config: AssemblerConfig = load_config(args.config.as_deref())?.assembler;
    if let (Some(open), Some(close)) = (args.open_marker, args.close_marker) {
        assembler_config.markers = vec![MarkerPair::new(open, close)];
    }

    let mut result = ChatGenerationResult::with_config(assembler_config)?;
    let text = read_input(args.input.as_deref())?;
    let deltas = split_chars(&text, args.chunk_size);
    info!(deltas = deltas.len(), "Replaying stream");

    for delta in &deltas {
        print_event(&result.add_chunk(&ChatChunk::response(delta.as_str())))?;
    }
    print_event(&result.finalize())?;

    let summary = json!({
        "response": result.response_text(),
        "reasoning": result.reasoning_text(),
    });
    println!("{}", summary);
    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let parser = DirtyJsonParser::with_config(config.extractor)?;
    let text = read_input(args.input.as_deref())?;

    match parser.parse_with_step(&text) {
        Some((value, step)) => {
            info!(step = step.name(), "Extracted value");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        None => {
            let fallback = parser.parse(&text).unwrap_or(serde_json::Value::Null);
            println!("{}", serde_json::to_string_pretty(&fallback)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = CliArgs::parse();

    let level = logging::parse_level(&cli.log_level)
        .with_context(|| format!("Invalid log level '{}'", cli.log_level))?;
    let _log_guard = logging::init_logging(LoggingConfig {
        level,
        json_format: cli.log_json,
        log_dir: cli.log_dir,
        ..Default::default()
    });

    match cli.command {
        Command::Assemble(args) => run_assemble(args),
        Command::Extract(args) => run_extract(args),
    }
}
