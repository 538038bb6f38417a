//
// bingen command line front end.
//
//! CLI supporting `generate` and `compare`, or an interactive menu when no
//! subcommand is given.
//!
//! Examples:
//! ```bash
//! bingen generate -s 1024                  # 1 GiB into test.bin beside the binary
//! bingen -o sample -e dat generate -s 10   # sample.dat
//! bingen compare a.bin "b copy.bin"        # differences.txt if they differ
//! bingen                                   # interactive menu
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use log::{info, warn};

use bingen::{
    check_platform, compare_files, generate_file,
    BinGenError, CancellationToken, Config, EarlyEof, GenerationRequest, MenuChoice, Prompter,
};
use bingen::input::{parse_existing_file, parse_size_mb};
use bingen::progress::GenerationProgress;

/// ANSI "clear screen, cursor home"
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

// -- Commands

#[derive(Parser)]
#[command(author, version, about = "Generates binary files and compares them byte by byte")]
struct Cli {
    #[arg(short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,

    /// Output file name, without extension (default "test")
    #[arg(short = 'o', long = "output", global = true)]
    output: Option<String>,

    /// Output file extension (default "bin")
    #[arg(short = 'e', long = "extension", global = true)]
    extension: Option<String>,

    /// Directory for the generated file and the difference log (default: beside the binary)
    #[arg(long = "dir", global = true)]
    dir: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(long = "no-progress", global = true)]
    no_progress: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a file of incrementing bytes with every fourth byte randomized.
    Generate {
        /// Amount of data to generate, in MB (1 MB = 1,048,576 bytes)
        #[arg(short = 's', long = "size-mb", value_parser = parse_size_arg)]
        size_mb: u64,

        /// Chunk size in bytes (default 512 MiB)
        #[arg(long = "chunk-size")]
        chunk_size: Option<u64>,
    },
    /// Compare two files byte by byte, logging every differing offset.
    Compare {
        /// First file
        file_a: String,

        /// Second file
        file_b: String,

        /// Where to write the difference log (default: differences.txt in --dir)
        #[arg(long = "log")]
        log: Option<PathBuf>,
    },
}

fn parse_size_arg(s: &str) -> std::result::Result<u64, String> {
    parse_size_mb(s).map_err(|e| e.to_string())
}

/// What the interactive menu decided to do
enum Action {
    Generate { size_mb: u64 },
    Compare { file_a: PathBuf, file_b: PathBuf },
    Exit,
}

// -----------------------------------------------------------------------------
// Command implementations
// -----------------------------------------------------------------------------

/// Generate command: write `size_mb` MB to the configured output path.
async fn generate_cmd(cfg: &Config, size_mb: u64, token: CancellationToken, show_progress: bool) -> Result<()> {
    let request = GenerationRequest::from_megabytes(size_mb)
        .map_err(BinGenError::from)?
        .with_chunk_size(cfg.chunk_size);
    let path = cfg.output_path();

    safe_println!("");
    safe_println!("* Generated file would be named '{}'", cfg.output_file_name());
    safe_println!("  - Starting address is 0{}", request.start_value);
    safe_println!("  - Generating and writing binary data ...");

    let job_path = path.clone();
    let report = tokio::task::spawn_blocking(move || {
        let progress = GenerationProgress::new(request.total_len, show_progress);
        let mut rng = rand::rng();
        let result = generate_file(&job_path, &request, &mut rng, &token, |n| progress.update(n));
        match &result {
            Ok(r) => progress.finish(r.bytes_written, r.elapsed),
            Err(_) => progress.abandon(),
        }
        result
    })
    .await
    .context("generation task failed")?
    .with_context(|| format!("failed to generate {}", path.display()))?;

    safe_println!("  - Data written in {:.5} second(s)", report.elapsed.as_secs_f64());
    safe_println!("* Done");
    Ok(())
}

/// Compare command: byte-compare two files, report and keep a log only on differences.
async fn compare_cmd(file_a: PathBuf, file_b: PathBuf, log_path: PathBuf, token: CancellationToken) -> Result<()> {
    safe_println!("* Comparing files ...");

    let (a, b) = (file_a.clone(), file_b.clone());
    let summary = tokio::task::spawn_blocking(move || compare_files(&a, &b, &log_path, &token))
        .await
        .context("comparison task failed")?
        .with_context(|| format!("failed to compare {} with {}", file_a.display(), file_b.display()))?;

    match summary.early_eof {
        EarlyEof::FirstFile => safe_println!("{} ended.", display_name(&file_a)),
        EarlyEof::SecondFile => safe_println!("{} ended.", display_name(&file_b)),
        EarlyEof::Neither => {}
    }

    if summary.identical() {
        safe_println!("- Files are identical");
    } else {
        safe_println!("- Files are not identical");
        if let Some(ref log) = summary.log_path {
            safe_println!("  - {} difference(s) written to {}", summary.difference_count, log.display());
        }
    }
    safe_println!("* Read complete");
    Ok(())
}

/// Final path component, as shown in the "ended." message
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Menu and prompts; blocking, runs on a worker thread.
fn interactive_prompt(max_attempts: usize) -> bingen::Result<Action> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout(), max_attempts);

    write!(prompter.output(), "{CLEAR_SCREEN}")?;
    writeln!(prompter.output(), "\tChoose an option:\n")?;
    writeln!(prompter.output(), "1. Generate")?;
    writeln!(prompter.output(), "2. Compare")?;
    writeln!(prompter.output(), "\nX. Exit")?;

    let choice = prompter.ask("\nEnter here: ", |s| s.parse::<MenuChoice>())?;

    match choice {
        MenuChoice::Exit => Ok(Action::Exit),
        MenuChoice::Generate => {
            write!(prompter.output(), "{CLEAR_SCREEN}")?;
            writeln!(prompter.output(), "Press CTRL + C to exit\n")?;
            let size_mb = prompter.ask("How much data (MB) do you want to generate? ", parse_size_mb)?;
            Ok(Action::Generate { size_mb })
        }
        MenuChoice::Compare => {
            write!(prompter.output(), "{CLEAR_SCREEN}")?;
            writeln!(prompter.output(), "Press CTRL + C to exit\n")?;
            let file_a = prompter.ask("Input path to the first file: ", parse_existing_file)?;
            let file_b = prompter.ask("Input path to the second file: ", parse_existing_file)?;
            writeln!(prompter.output())?;
            Ok(Action::Compare { file_a, file_b })
        }
    }
}

/// Interactive session: prompt, then dispatch like the subcommands do.
async fn interactive_cmd(cfg: &Config, token: CancellationToken, show_progress: bool) -> Result<()> {
    let max_attempts = cfg.max_attempts;
    let prompt = tokio::task::spawn_blocking(move || interactive_prompt(max_attempts));

    // A blocked stdin read cannot observe the token, so Ctrl-C here exits directly.
    let action = tokio::select! {
        res = prompt => res.context("prompt task failed")??,
        _ = token.cancelled() => {
            eprintln!("\n{}", BinGenError::Cancelled);
            std::process::exit(BinGenError::Cancelled.exit_code());
        }
    };

    match action {
        Action::Exit => {
            safe_println!("Exiting");
            Ok(())
        }
        Action::Generate { size_mb } => generate_cmd(cfg, size_mb, token, show_progress).await,
        Action::Compare { file_a, file_b } => compare_cmd(file_a, file_b, cfg.diff_log_path(), token).await,
    }
}

/// Merge environment config with command line overrides
fn build_config(cli: &Cli) -> Result<Config> {
    let mut cfg = Config::from_env().context("invalid BINGEN_* environment configuration")?;
    if let Some(ref name) = cli.output {
        cfg = cfg.with_output_name(name.clone());
    }
    if let Some(ref ext) = cli.extension {
        cfg = cfg.with_output_extension(ext.clone());
    }
    if let Some(ref dir) = cli.dir {
        cfg = cfg.with_output_dir(dir.clone());
    }
    if let Some(Command::Generate { chunk_size: Some(n), .. }) = &cli.cmd {
        cfg = cfg.with_chunk_size(*n);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn root_cause(err: &anyhow::Error) -> Option<&BinGenError> {
    err.chain().find_map(|c| c.downcast_ref::<BinGenError>())
}

/// Process exit status for a failed run: 130 when interrupted, 1 otherwise.
fn failure_code(err: &anyhow::Error) -> u8 {
    root_cause(err)
        .map_or(1, BinGenError::exit_code)
        .try_into()
        .unwrap_or(1)
}

/// One-line diagnostic and exit status for a failed run
fn report_failure(err: &anyhow::Error) -> ExitCode {
    match root_cause(err) {
        Some(BinGenError::Cancelled) => eprintln!("\n{}", BinGenError::Cancelled),
        _ => eprintln!("\nERROR! {err:#}"),
    }
    ExitCode::from(failure_code(err))
}

/// Main CLI function
#[tokio::main]
async fn main() -> ExitCode {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",        // no -v: WARN level
        1 => "info",        // -v: INFO level
        _ => "debug",       // -vv or more: DEBUG level
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

async fn run(cli: Cli) -> Result<()> {
    check_platform()?;
    let cfg = build_config(&cli)?;
    info!("output directory: {}", cfg.output_dir.display());

    // Ctrl-C raises the token; running jobs check it between chunks / bytes.
    let token = CancellationToken::new();
    let watcher = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            watcher.cancel();
        }
    });

    let show_progress = !cli.no_progress;

    match cli.cmd {
        Some(Command::Generate { size_mb, .. }) => {
            safe_println!("Press CTRL + C to exit");
            generate_cmd(&cfg, size_mb, token, show_progress).await?;
        }
        Some(Command::Compare { ref file_a, ref file_b, ref log }) => {
            let a = parse_existing_file(file_a).map_err(BinGenError::from)?;
            let b = parse_existing_file(file_b).map_err(BinGenError::from)?;
            let log_path = log.clone().unwrap_or_else(|| cfg.diff_log_path());
            compare_cmd(a, b, log_path, token).await?;
        }
        None => interactive_cmd(&cfg, token, show_progress).await?,
    }

    Ok(())
}
