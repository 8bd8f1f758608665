//! CLI entry point for `mailbrief`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use mailbrief::config::{self, Config};
use mailbrief::extract::ocr::TesseractCli;
use mailbrief::extract::AttachmentPipeline;
use mailbrief::model::mail::email_id;
use mailbrief::parser::eml::EmlEnvelope;
use mailbrief::process::batch::list_sources;
use mailbrief::process::{BatchRunner, MessageOutcome, MessageProcessor};
use mailbrief::store::ResultStore;
use mailbrief::summarize::OpenAiSummarizer;

#[derive(Parser)]
#[command(
    name = "mailbrief",
    version,
    about = "Extract attachment text from .eml files and summarize each message"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every .eml file in the input directory
    Run {
        /// Directory of .eml files [default: from config]
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory for JSON results [default: from config]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Process a single message and print its record
    Process {
        /// Path to an .eml file, or the id of one in the input directory
        message: String,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available messages and whether each has a result
    List {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print a stored result
    Show {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check the summarization backend and OCR engine
    Check,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path {
        /// Print the log file location instead
        #[arg(long)]
        log: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let (config, config_source) = config::load_config();

    // Configure logging: stderr + log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);
    config_source.log();

    let result = match cli.command {
        Commands::Run { input, output } => cmd_run(&config, input, output),
        Commands::Process {
            message,
            input,
            output,
        } => cmd_process(&config, &message, input, output),
        Commands::List {
            input,
            output,
            json,
        } => cmd_list(&config, input, output, json),
        Commands::Show { id, output } => cmd_show(&config, &id, output),
        Commands::Check => cmd_check(&config),
        Commands::Config { action } => cmd_config(&config, action),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{e:#}"), "Fatal error");
        std::process::exit(1);
    }
}

/// Set up tracing with stderr output and file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, config::LOG_FILE_NAME);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Wire the envelope reader, attachment pipeline, summarizer and result
/// store. Fails when the summarizer cannot be configured.
fn build_processor(config: &Config, output_dir: &Path) -> anyhow::Result<MessageProcessor> {
    let summarizer = OpenAiSummarizer::from_config(&config.summarizer)?;
    let store = ResultStore::create(output_dir)?;
    Ok(MessageProcessor::new(
        Box::new(EmlEnvelope),
        AttachmentPipeline::from_config(&config.ocr),
        Box::new(summarizer),
        store,
    ))
}

fn cmd_run(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.batch.input_dir.clone());
    let output = output.unwrap_or_else(|| config.batch.output_dir.clone());

    if !input.is_dir() {
        anyhow::bail!("Input directory not found: {}", input.display());
    }

    let runner = BatchRunner::new(build_processor(config, &output)?, config.batch.min_interval());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Processing [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let report = runner.run(
        &input,
        Some(&|current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }),
    )?;
    pb.finish_and_clear();

    println!();
    println!("  Batch complete:");
    println!("  {:<25} {}", "Messages found", report.discovered);
    println!("  {:<25} {}", "Processed", report.processed);
    println!("  {:<25} {}", "Skipped (unparseable)", report.skipped);
    println!("  {:<25} {}", "Failed", report.failed);
    println!(
        "  {:<25} {:.2}s ({:.2}s/message)",
        "Elapsed",
        report.elapsed.as_secs_f64(),
        report.avg_secs_per_message()
    );
    println!("  {:<25} {}", "Output", output.display());
    println!();
    Ok(())
}

/// Resolve `message` as a path, else as an id inside `input_dir`.
fn resolve_message(message: &str, input_dir: &Path) -> anyhow::Result<PathBuf> {
    let as_path = PathBuf::from(message);
    if as_path.is_file() {
        return Ok(as_path);
    }
    let by_id = input_dir.join(format!("{message}.eml"));
    if by_id.is_file() {
        return Ok(by_id);
    }
    anyhow::bail!("Message not found: {message}")
}

fn cmd_process(
    config: &Config,
    message: &str,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.batch.input_dir.clone());
    let output = output.unwrap_or_else(|| config.batch.output_dir.clone());
    let path = resolve_message(message, &input)?;

    let processor = build_processor(config, &output)?;
    match processor.process_file(&path) {
        MessageOutcome::Processed { record, output } => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            if !record.summary.is_success() {
                eprintln!("  Summary failed; the record keeps status \"failed\"");
            }
            match output {
                Some(saved) => eprintln!("  Saved to {}", saved.display()),
                None => eprintln!("  Result could not be saved (see log)"),
            }
            Ok(())
        }
        MessageOutcome::Skipped { reason } => {
            anyhow::bail!("Failed to process {}: {reason}", path.display())
        }
    }
}

#[derive(Serialize)]
struct ListedMessage {
    id: String,
    filename: String,
    size: u64,
    modified: Option<chrono::DateTime<chrono::Local>>,
    processed: bool,
}

fn cmd_list(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.batch.input_dir.clone());
    let output = output.unwrap_or_else(|| config.batch.output_dir.clone());
    let store = ResultStore::open(output);

    let mut messages: Vec<ListedMessage> = list_sources(&input)?
        .into_iter()
        .map(|path| {
            let meta = std::fs::metadata(&path).ok();
            let id = email_id(&path);
            ListedMessage {
                processed: store.exists(&id),
                id,
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                size: meta.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: meta
                    .and_then(|m| m.modified().ok())
                    .map(chrono::DateTime::<chrono::Local>::from),
            }
        })
        .collect();
    messages.sort_by(|a, b| a.filename.cmp(&b.filename));

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    use humansize::{format_size, BINARY};

    println!(
        "  {:<30} {:>10}  {:<19}  {}",
        "ID", "SIZE", "MODIFIED", "RESULT"
    );
    for m in &messages {
        println!(
            "  {:<30} {:>10}  {:<19}  {}",
            m.id,
            format_size(m.size, BINARY),
            m.modified
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            if m.processed { "yes" } else { "-" }
        );
    }
    println!();
    println!("  {} message(s) in {}", messages.len(), input.display());
    Ok(())
}

fn cmd_show(config: &Config, id: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| config.batch.output_dir.clone());
    let record = ResultStore::open(output).load(id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let summarizer = OpenAiSummarizer::from_config(&config.summarizer)?;
    let models = summarizer.list_models()?;
    let available = models.iter().any(|m| m == summarizer.model());

    println!("  {:<25} {}", "API base", config.summarizer.api_base);
    println!("  {:<25} {}", "Models available", models.len());
    println!(
        "  {:<25} {} ({})",
        "Configured model",
        summarizer.model(),
        if available { "available" } else { "not listed" }
    );

    if config.ocr.enabled {
        match TesseractCli::from_config(&config.ocr).version() {
            Ok(version) => println!("  {:<25} {}", "OCR engine", version),
            Err(e) => println!("  {:<25} unavailable: {e}", "OCR engine"),
        }
    } else {
        println!("  {:<25} disabled", "OCR engine");
    }
    Ok(())
}

fn cmd_config(config: &Config, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Path { log: true } => {
            println!("{}", config::log_file_path(config).display());
        }
        ConfigAction::Path { log: false } => {
            let path = config::config_file_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            if let Some(path) = config::config_file_path() {
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
            }
            let written = config::save_config(&Config::default())?;
            println!("  Wrote {}", written.display());
        }
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailbrief", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
