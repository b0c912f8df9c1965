//! VR/VA benefit engine CLI.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, error, info, warn};

use vr_engine::api::{AppState, create_router};
use vr_engine::assistant::{DocumentAssistant, LocalDocumentAssistant, run_session};
use vr_engine::config::ConfigLoader;
use vr_engine::error::{EngineError, EngineResult};
use vr_engine::logging::{LogConfig, LogFormat, init_logging};
use vr_engine::pipeline::run_pipeline;
use vr_engine::report::{print_summary, render_summary};
use vr_engine::sources::SourceLoader;

#[derive(Parser)]
#[command(
    name = "vr-engine",
    version,
    about = "Monthly meal/food voucher (VR/VA) benefit engine",
    long_about = "Consolidates the monthly HR spreadsheets, selects eligible employees,\n\
                  computes voucher amounts per union and writes the payout report."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration directory holding settings.yaml, or the settings file itself.
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Directory with the input spreadsheets (overrides settings).
    #[arg(long = "input-dir", value_name = "DIR", global = true)]
    input_dir: Option<PathBuf>,

    /// Directory the report is written to (overrides settings).
    #[arg(long = "output-dir", value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Log level.
    #[arg(long = "log-level", value_enum, default_value = "info", global = true)]
    log_level: LogLevelArg,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatArg,
}

#[derive(Subcommand)]
enum Command {
    /// Process the input spreadsheets and write the payout report.
    Run,

    /// Ask questions about the benefit policy document interactively.
    Ask,

    /// Serve the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long = "addr", default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Command::Run => run(&config),
        Command::Ask => ask(&config),
        Command::Serve { addr } => serve(config, &addr),
    };
    std::process::exit(exit_code);
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = match cli.log_level {
        LogLevelArg::Error => Level::ERROR,
        LogLevelArg::Warn => Level::WARN,
        LogLevelArg::Info => Level::INFO,
        LogLevelArg::Debug => Level::DEBUG,
        LogLevelArg::Trace => Level::TRACE,
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    LogConfig::default()
        .with_level(level)
        .with_format(format)
        .with_ansi(io::stderr().is_terminal())
}

fn load_config(cli: &Cli) -> EngineResult<ConfigLoader> {
    let mut loader = match &cli.config {
        Some(path) if path.is_dir() => ConfigLoader::load(path)?,
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::default(),
    }
    .with_env_overrides();

    if let Some(dir) = &cli.input_dir {
        loader.config_mut().input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        loader.config_mut().output_dir = dir.clone();
    }
    Ok(loader)
}

fn run(config: &ConfigLoader) -> i32 {
    match run_pipeline(config) {
        Ok(report) => {
            print_summary(&report.summary, &report.records);
            0
        }
        Err(err) => {
            error!(error = %err, "Run failed");
            eprintln!("error: {err}");
            if let EngineError::NoEligibleEmployees { diagnostics, .. } = &err {
                for diagnostic in diagnostics {
                    eprintln!("  {}: {}", diagnostic.subject, diagnostic.message);
                }
            }
            1
        }
    }
}

fn setup_assistant(config: &ConfigLoader) -> Option<LocalDocumentAssistant> {
    let prompt = SourceLoader::new(BTreeMap::new())
        .with_prompt_path(config.prompt_path())
        .load();

    match LocalDocumentAssistant::setup(config.config().assistant.clone(), prompt.prompt_template()) {
        Ok(assistant) => Some(assistant),
        Err(err) => {
            warn!(error = %err, "Document assistant unavailable");
            None
        }
    }
}

fn ask(config: &ConfigLoader) -> i32 {
    let assistant = setup_assistant(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut exit_code = 0;

    let outcome = run_session(
        stdin.lock(),
        &mut stdout,
        assistant.as_ref().map(|a| a as &dyn DocumentAssistant),
        |out| {
            match run_pipeline(config) {
                Ok(report) => writeln!(out, "{}", render_summary(&report.summary, &report.records))?,
                Err(err) => {
                    error!(error = %err, "Run failed");
                    writeln!(out, "error: {err}")?;
                    exit_code = 1;
                }
            }
            out.flush()
        },
    );

    match outcome {
        Ok(_) => exit_code,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn serve(config: ConfigLoader, addr: &str) -> i32 {
    let mut state = AppState::new(config.clone());
    if let Some(assistant) = setup_assistant(&config) {
        state = state.with_assistant(assistant);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start runtime: {err}");
            return 1;
        }
    };

    let result: io::Result<()> = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %addr, "Listening");
        axum::serve(listener, create_router(state)).await
    });

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
