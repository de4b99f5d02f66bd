#![forbid(unsafe_code)]

//! GML graph reader CLI.
//!
//! # Commands
//!
//! - `parse`: Output parsed graphs (or a count summary) as JSON
//! - `validate`: Check input and report the first error with its location

use std::io::{self, Read};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gml_core::{GmlError, GmlGraph, ParseOptions};
use gml_parser::{parse_evidence_json, parse_with_options};
use serde::Serialize;
use tracing::{debug, info};

/// GML graph reader CLI - parse and validate GML graph files.
#[derive(Debug, Parser)]
#[command(
    name = "gml",
    version,
    about = "GML graph reader - parse and validate GML graph files",
    long_about = "Reads flat GML documents (graph/node/edge blocks with integer, \
        decimal and string attributes).\n\n\
        A single input may hold several graph blocks back to back."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON file with parse options (e.g. {"max_input_bytes": 1048576})
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse GML input and print the graphs as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output full graphs (default is a count summary)
        #[arg(long)]
        full: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate GML input and report the first error.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,
    },
}

/// Result of validating an input.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    graph_count: usize,
    vertex_count: usize,
    edge_count: usize,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
    line: Option<usize>,
    column: Option<usize>,
}

impl From<&GmlError> for ValidationError {
    fn from(err: &GmlError) -> Self {
        let located = !matches!(err, GmlError::InputTooLarge { .. } | GmlError::Io { .. });
        let span = err.span();
        Self {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
            line: located.then_some(span.start.line),
            column: located.then_some(span.start.col),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);
    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Command::Parse {
            input,
            full,
            pretty,
        } => cmd_parse(&input, &options, full, pretty),

        Command::Validate { input, json } => cmd_validate(&input, &options, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_options(config: Option<&str>) -> Result<ParseOptions> {
    let Some(path) = config else {
        return Ok(ParseOptions::default());
    };
    let raw = std::fs::read_to_string(path).context(format!("Failed to read config: {path}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).context(format!("Config is not valid JSON: {path}"))?;
    let options = ParseOptions::from_json_value(value)
        .context(format!("Invalid parse options in: {path}"))?;
    debug!("Loaded parse options: {options:?}");
    Ok(options)
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline GML text
        Ok(input.to_string())
    }
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, options: &ParseOptions, full: bool, pretty: bool) -> Result<()> {
    let source = load_input(input)?;

    let start = Instant::now();
    let graphs = parse_with_options(&source, options)?;
    info!(
        "Parsed {} graphs in {:.2}ms",
        graphs.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let output = if full {
        if pretty {
            serde_json::to_string_pretty(&graphs)?
        } else {
            serde_json::to_string(&graphs)?
        }
    } else if pretty {
        let value: serde_json::Value = serde_json::from_str(&parse_evidence_json(&graphs))?;
        serde_json::to_string_pretty(&value)?
    } else {
        parse_evidence_json(&graphs)
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, options: &ParseOptions, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_with_options(&source, options);

    let (graphs, errors): (Vec<GmlGraph>, Vec<ValidationError>) = match parsed {
        Ok(graphs) => (graphs, Vec::new()),
        Err(err) => (Vec::new(), vec![ValidationError::from(&err)]),
    };

    let result = ValidateResult {
        valid: errors.is_empty(),
        graph_count: graphs.len(),
        vertex_count: graphs.iter().map(GmlGraph::vertex_count).sum(),
        edge_count: graphs.iter().map(GmlGraph::edge_count).sum(),
        errors,
    };

    if json_output {
        let output = serde_json::to_string_pretty(&result)?;
        println!("{output}");
    } else {
        if result.valid {
            println!("✓ Valid GML ({} graphs)", result.graph_count);
            println!("  Vertices: {}", result.vertex_count);
            println!("  Edges:    {}", result.edge_count);
        } else {
            println!("✗ Invalid GML");
        }

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for err in &result.errors {
                let location = match (err.line, err.column) {
                    (Some(l), Some(c)) => format!(" (line {l}, col {c})"),
                    (Some(l), None) => format!(" (line {l})"),
                    _ => String::new(),
                };
                println!("  [{}] {}{}", err.code, err.message, location);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}
