// crates/veridoc-cli/src/main.rs
// ============================================================================
// Module: Veridoc CLI Entry Point
// Description: Command dispatcher for the analysis server and offline analysis.
// Purpose: Provide a safe, localized CLI for serving and one-shot analysis.
// Dependencies: clap, veridoc-config, veridoc-core, veridoc-providers, veridoc-server, tokio
// ============================================================================

//! ## Overview
//! The Veridoc CLI starts the analysis HTTP server, runs one-shot document
//! analysis against a local file, and manages configuration files. Security
//! posture: file inputs are untrusted and size-capped before reading;
//! document bytes never appear in diagnostics.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use veridoc_config::DEFAULT_CONFIG_NAME;
use veridoc_config::VeridocConfig;
use veridoc_config::config_toml_example;
use veridoc_core::AnalysisPipeline;
use veridoc_core::ContentExtractor;
use veridoc_core::Verdict;
use veridoc_providers::ForensicsPromptBuilder;
use veridoc_providers::GenerativeLanguageClient;
use veridoc_providers::MetadataExtractor;
use veridoc_providers::ReasoningClientConfig;
use veridoc_providers::SidecarTextExtractor;
use veridoc_server::AnalyzeServer;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a sidecar text file.
const MAX_SIDECAR_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "veridoc", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Veridoc analysis HTTP server.
    Serve(ServeCommand),
    /// Analyze one document file and print the verdict JSON.
    Analyze(AnalyzeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to veridoc.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration for the `analyze` command.
#[derive(Args, Debug)]
struct AnalyzeCommand {
    /// Path to the document file to analyze.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Declared media type of the document (application/pdf or image/*).
    #[arg(long = "media-type", value_name = "TYPE")]
    media_type: String,
    /// Optional path to pre-extracted document text.
    #[arg(long = "sidecar-text", value_name = "PATH")]
    sidecar_text: Option<PathBuf>,
    /// Optional config file path (defaults to veridoc.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a documented starter configuration file.
    Init(ConfigInitCommand),
    /// Validate a Veridoc configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config init`.
#[derive(Args, Debug)]
struct ConfigInitCommand {
    /// Output path for the starter configuration.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_NAME)]
    out: PathBuf,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to veridoc.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
///
/// The entry point stays synchronous: the reasoning client is a blocking
/// HTTP client that must be constructed and driven outside any async
/// executor, so an async runtime is started only where the server needs
/// one.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("veridoc {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command),
        Commands::Analyze(command) => command_analyze(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
///
/// The server (and its blocking reasoning client) is constructed before
/// the async runtime starts; the runtime only drives the listener.
fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = VeridocConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = AnalyzeServer::from_config(&config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    write_stderr_line(&format!("veridoc listening on {}", config.server.bind))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(format!("runtime init failed: {err}")))?;
    runtime
        .block_on(server.serve())
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Analyze Command
// ============================================================================

/// Executes the `analyze` command.
fn command_analyze(command: &AnalyzeCommand) -> CliResult<ExitCode> {
    let config = VeridocConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let max_document_bytes = u64::try_from(config.server.max_body_bytes).unwrap_or(u64::MAX);
    let bytes = read_bounded_file(&command.file, max_document_bytes)?;

    let verdict = match &command.sidecar_text {
        Some(path) => {
            let raw = read_bounded_file(path, MAX_SIDECAR_BYTES)?;
            let text = String::from_utf8(raw).map_err(|_| {
                CliError::new(format!("sidecar text is not valid UTF-8: {}", path.display()))
            })?;
            run_pipeline(SidecarTextExtractor::new(text), &config, &bytes, &command.media_type)?
        }
        None => run_pipeline(MetadataExtractor, &config, &bytes, &command.media_type)?,
    };

    let rendered = serde_json::to_string_pretty(&verdict)
        .map_err(|err| CliError::new(format!("verdict serialization failed: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the pipeline around `extractor` and analyzes one document.
fn run_pipeline<E: ContentExtractor>(
    extractor: E,
    config: &VeridocConfig,
    bytes: &[u8],
    media_type: &str,
) -> CliResult<Verdict> {
    let api_key = std::env::var(&config.reasoning.api_key_env)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            CliError::new(format!(
                "api key environment variable {} is unset",
                config.reasoning.api_key_env
            ))
        })?;
    let client = GenerativeLanguageClient::new(ReasoningClientConfig {
        base_url: config.reasoning.base_url.clone(),
        model: config.reasoning.model.clone(),
        api_key,
        timeout_ms: config.reasoning.timeout_ms,
        max_response_bytes: config.reasoning.max_response_bytes,
        temperature: config.reasoning.temperature,
        ..ReasoningClientConfig::default()
    })
    .map_err(|err| CliError::new(format!("reasoning client init failed: {err}")))?;
    let pipeline = AnalysisPipeline::new(
        extractor,
        ForensicsPromptBuilder::from_override(config.reasoning.prompt.as_deref()),
        client,
        config.reconcile_policy(),
        config.side_channel_checks(),
    );
    pipeline
        .analyze(bytes, media_type)
        .map_err(|err| CliError::new(format!("analysis failed: {err}")))
}

/// Reads a file after checking its size against `max_bytes`.
fn read_bounded_file(path: &Path, max_bytes: u64) -> CliResult<Vec<u8>> {
    let metadata = fs::metadata(path)
        .map_err(|err| CliError::new(format!("cannot read {}: {err}", path.display())))?;
    if metadata.len() > max_bytes {
        return Err(CliError::new(format!(
            "{} exceeds the {max_bytes} byte limit",
            path.display()
        )));
    }
    fs::read(path).map_err(|err| CliError::new(format!("cannot read {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Init(command) => command_config_init(command),
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes `config init`.
fn command_config_init(command: &ConfigInitCommand) -> CliResult<ExitCode> {
    if command.out.exists() {
        return Err(CliError::new(format!("{} already exists", command.out.display())));
    }
    fs::write(&command.out, config_toml_example())
        .map_err(|err| CliError::new(format!("cannot write {}: {err}", command.out.display())))?;
    write_stdout_line(&format!("wrote {}", command.out.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = VeridocConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("configuration OK")
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
