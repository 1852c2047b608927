//! ffstage - staged media operations on top of ffmpeg
//!
//! Command line front end: reads a local file, runs one tool against it,
//! prints the tool's messages and writes any produced file to the output
//! directory.

use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ffstage::cli::{Args, Commands};
use ffstage::config::Config;
use ffstage::pipeline::{MediaBlob, PipelineRunnerFactory};
use ffstage::tools::{run_tool, ToolFactory, ToolKind, ToolMessage, ToolOutput, ToolRequest};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load ffstage.toml from current directory first
            if Path::new("ffstage.toml").exists() {
                info!("Found ffstage.toml in current directory, loading...");
                Config::from_file("ffstage.toml")?
            } else {
                Config::default()
            }
        }
    };

    if let Some(output_dir) = &args.output_dir {
        config.output.directory = output_dir.clone();
    }

    let runner = PipelineRunnerFactory::create_runner(config.engine.clone());

    let (kind, input, parameters) = match args.command {
        Commands::Check => {
            runner.check_availability().await?;
            println!("{}", runner.version_info().await?);
            return Ok(());
        }
        Commands::InitConfig { path } => {
            config.save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
            return Ok(());
        }
        Commands::ExtractAudio { input, format } => {
            (ToolKind::ExtractAudio, input, vec![("audio_format", format)])
        }
        Commands::Compress { input, level } => {
            (ToolKind::Compress, input, vec![("compression_level", level)])
        }
        Commands::Convert { input, target_format } => {
            (ToolKind::Convert, input, vec![("target_format", target_format)])
        }
        Commands::Trim { input, start, end } => (
            ToolKind::Trim,
            input,
            vec![("start_time", start), ("end_time", end)],
        ),
        Commands::Info { input } => (ToolKind::Info, input, Vec::new()),
    };

    info!("Running {} on {}", kind, input.display());

    let blob = MediaBlob::from_path(&input).await?;
    let request = parameters
        .into_iter()
        .fold(ToolRequest::new(Some(blob)), |request, (key, value)| {
            request.with_param(key, value)
        });

    let tool = ToolFactory::create_tool(kind, &config.engine);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("{} {}", kind, input.display()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let output = run_tool(tool.as_ref(), runner.as_ref(), &request).await;
    spinner.finish_and_clear();

    let succeeded = emit(&output, &input, &config.output.directory, args.json).await?;
    if !succeeded {
        bail!("{} failed", kind);
    }

    info!("{} completed successfully", kind);
    Ok(())
}

/// Print text, optionally print status records, and write attachments.
/// Returns whether the final status record reports success.
async fn emit(output: &ToolOutput, input: &Path, output_dir: &Path, json: bool) -> Result<bool> {
    for message in output.messages() {
        match message {
            ToolMessage::Text(text) => println!("{}", text),
            ToolMessage::Json(record) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(record)?);
                }
            }
            ToolMessage::Blob(attachment) => {
                tokio::fs::create_dir_all(output_dir).await?;
                let path = output_dir.join(&attachment.filename);
                if same_file(&path, input) {
                    bail!("Refusing to overwrite the input file {}", input.display());
                }

                tokio::fs::write(&path, &attachment.bytes).await?;
                info!(
                    "Wrote {} ({}, {} bytes)",
                    path.display(),
                    attachment.mime_type,
                    attachment.bytes.len()
                );
            }
        }
    }

    Ok(output.status().is_some_and(|status| status.is_success()))
}

fn same_file(a: &Path, b: &Path) -> bool {
    let canonical = |p: &Path| -> Option<PathBuf> { p.canonicalize().ok() };
    match (canonical(a), canonical(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".ffstage").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "ffstage.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Logs go to stderr; stdout carries tool output
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("ffstage.log").display()
    );

    Ok(())
}
