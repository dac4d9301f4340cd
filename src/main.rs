use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use format_sql::mode::Mode;
use format_sql::report::{FileStatus, Report};

/// format-sql - Makes your SQL readable.
/// Formats .sql files and SQL queries embedded in Python sources.
#[derive(Parser, Debug)]
#[command(name = "format-sql", version, about)]
struct Cli {
    /// Files or directories to format. Use "-" to read SQL from stdin.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// File types to process, comma-separated or repeated [default: py].
    #[arg(long, value_delimiter = ',')]
    types: Option<Vec<String>>,

    /// Process files found in subdirectories.
    #[arg(short, long)]
    recursive: bool,

    /// Print a diff instead of writing files.
    #[arg(long)]
    dry_run: bool,

    /// Also detect embedded queries without a trailing semicolon.
    #[arg(long)]
    no_semicolon: bool,

    /// Skip the stability check.
    #[arg(long)]
    fast: bool,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to config file (pyproject.toml or format-sql.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags win over the config file.
    fn apply(self, base: Mode) -> (Vec<PathBuf>, Mode) {
        let mode = Mode {
            types: self.types.unwrap_or(base.types),
            recursive: self.recursive || base.recursive,
            dry_run: self.dry_run,
            no_semicolon: self.no_semicolon || base.no_semicolon,
            fast: self.fast,
            exclude: if self.exclude.is_empty() {
                base.exclude
            } else {
                self.exclude
            },
            verbose: self.verbose,
            quiet: self.quiet,
        };
        (self.paths, mode)
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    // Prefer RUST_LOG from env, otherwise use the flag-derived level.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn format_stdin() -> anyhow::Result<()> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("reading stdin")?;
    let formatted = format_sql::format_sql_text(&source).context("formatting stdin")?;
    print!("{formatted}");
    Ok(())
}

fn print_verbose_results(report: &Report) {
    for result in &report.results {
        match &result.status {
            FileStatus::Changed => eprintln!("reformatted {}", result.path.display()),
            FileStatus::Unchanged => eprintln!("unchanged {}", result.path.display()),
            FileStatus::Error(_) => {}
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let is_stdin = cli.paths.len() == 1 && cli.paths[0].as_os_str() == "-";
    if is_stdin {
        return match format_stdin() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::from(2)
            }
        };
    }

    let base = match format_sql::load_config(&cli.paths, cli.config.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let (paths, mode) = cli.apply(base);

    let report = format_sql::run(&paths, &mode);
    if mode.verbose {
        print_verbose_results(&report);
    }
    if !mode.quiet {
        eprintln!("{}", report.summary(mode.dry_run));
    }
    report.print_errors();

    ExitCode::from(report.exit_code(mode.dry_run) as u8)
}
