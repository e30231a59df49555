//! pkgdiff CLI - report files that differ from the installed packages

use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use pkgdiff::{ops, Config, Finding, FsTree, Md5Hasher, PackageDb, ScanReport, DEFAULT_IGNORES};

#[derive(Parser)]
#[command(name = "pkgdiff")]
#[command(about = "compare installed pacman packages against the filesystem")]
#[command(version)]
struct Cli {
    /// installation root to check [default: /]
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,

    /// pacman database directory [default: /var/lib/pacman/]
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// leave paths matching PATTERN out of the untracked report (repeatable)
    #[arg(long, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// do not compare file contents
    #[arg(long)]
    ignore_md5: bool,

    /// do not compare permission bits
    #[arg(long)]
    ignore_mode: bool,

    /// do not compare owners
    #[arg(long)]
    ignore_uid: bool,

    /// do not compare groups
    #[arg(long)]
    ignore_gid: bool,

    /// do not use the built-in ignore patterns
    #[arg(long)]
    no_default_ignores: bool,

    /// never color the report
    #[arg(long)]
    no_color: bool,

    /// read settings from a TOML file
    #[arg(short, long, value_name = "FILE", env = "PKGDIFF_CONFIG")]
    config: Option<PathBuf>,

    /// more log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// parse arguments, with the built-in ignore list appended to --help
    fn parse_with_ignores() -> Self {
        let mut help = String::from("Default ignore patterns:\n");
        for pattern in DEFAULT_IGNORES {
            help.push_str("  ");
            help.push_str(pattern);
            help.push('\n');
        }

        let matches = Cli::command().after_help(help).get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// the config file (if any) with command line flags applied on top
    fn config(&self) -> pkgdiff::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if self.no_default_ignores {
            config.default_ignores = false;
        }
        config.ignore.extend(self.ignore.iter().cloned());

        let checks = &mut config.checks;
        checks.skip_md5 |= self.ignore_md5;
        checks.skip_mode |= self.ignore_mode;
        checks.skip_uid |= self.ignore_uid;
        checks.skip_gid |= self.ignore_gid;

        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_with_ignores();
    init_logging(cli.verbose);

    let color = !cli.no_color && io::stdout().is_terminal();
    colored::control::set_override(color);

    let report = match run(&cli) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match print_report(&report) {
        Ok(()) => ExitCode::SUCCESS,
        // reader went away (`pkgdiff | head`)
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> pkgdiff::Result<ScanReport> {
    let config = cli.config()?;
    let ignores = config.ignore_set()?;
    let db = PackageDb::open(&config.db_path)?;
    let mut tree = FsTree::open(&config.root);

    ops::scan(&db, &mut tree, &config.checks, &ignores, &Md5Hasher)
}

fn print_report(report: &ScanReport) -> io::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());

    for finding in &report.findings {
        let tag = format!("{:<11}", finding.tag());
        let tag = match finding {
            Finding::Missing { .. } => tag.red(),
            Finding::Modified { .. } => tag.yellow(),
            Finding::Untracked { .. } => tag.green(),
        };
        writeln!(out, "{} {}", tag, finding.detail())?;
    }

    writeln!(out, "{:>8} tracked", report.tracked)?;
    writeln!(out, "{:>8} untracked", report.untracked)?;
    writeln!(out, "{:>8} missing", report.missing)?;
    writeln!(out, "{:>8} modified", report.modified)?;
    out.flush()
}
