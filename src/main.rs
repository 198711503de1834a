//! CLI entry point for fileset

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use fileset::scanner::MaxSizeSelector;
use fileset::{
    copy_included_files, print_json, DirectoryScanner, Disposition, OutputConfig, Scan,
    ScanError, ScannerConfig, TextFormatter,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Which buckets to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Show {
    Included,
    NotIncluded,
    Excluded,
    Deselected,
    All,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fileset")]
#[command(about = "List the files below a directory that match Ant-style include/exclude patterns")]
#[command(version)]
struct Args {
    /// Base directories to scan
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Include pattern (can be used multiple times; default: **)
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    include: Vec<String>,

    /// Exclude pattern (can be used multiple times)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Also exclude version-control and editor metadata (.git, .svn, *~, ...)
    #[arg(short = 'd', long = "default-excludes")]
    default_excludes: bool,

    /// Descend into symbolically linked directories
    #[arg(short = 'L', long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Match patterns case-insensitively
    #[arg(long = "ignore-case")]
    ignore_case: bool,

    /// Deselect files larger than SIZE. Use suffixes: K, M, G (e.g., 5M for 5MB)
    #[arg(long = "max-size", value_name = "SIZE")]
    max_size: Option<String>,

    /// Buckets to list (can be used multiple times)
    #[arg(short = 's', long = "show", value_name = "BUCKET", default_value = "included")]
    show: Vec<Show>,

    /// List directories as well as files
    #[arg(long = "dirs")]
    dirs: bool,

    /// Omit the summary line
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Output in JSON format (all buckets)
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Copy included files into DIR, keeping their relative paths
    #[arg(long = "copy-to", value_name = "DIR")]
    copy_to: Option<PathBuf>,

    /// Log scan progress to stderr (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier).ok_or_else(|| format!("size too large: {}", s))
}

fn shown_buckets(show: &[Show]) -> Vec<Disposition> {
    if show.contains(&Show::All) {
        return Disposition::ALL.to_vec();
    }
    let mut buckets = Vec::new();
    for s in show {
        let disposition = match s {
            Show::Included => Disposition::Included,
            Show::NotIncluded => Disposition::NotIncluded,
            Show::Excluded => Disposition::Excluded,
            Show::Deselected => Disposition::Deselected,
            Show::All => continue,
        };
        if !buckets.contains(&disposition) {
            buckets.push(disposition);
        }
    }
    buckets
}

fn init_logging(verbose: bool) {
    let default = if verbose { "fileset=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(path: &std::path::Path, e: &ScanError) -> ! {
    eprintln!("fileset: {}: {}", path.display(), e);
    process::exit(e.kind().exit_code());
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let max_size = args.max_size.as_ref().map(|size_str| {
        parse_file_size(size_str).unwrap_or_else(|e| {
            eprintln!("fileset: invalid --max-size '{}': {}", size_str, e);
            process::exit(1);
        })
    });

    let output_config = OutputConfig {
        use_color: should_use_color(args.color),
        show: shown_buckets(&args.show),
        directories: args.dirs,
        summary: !args.quiet,
    };
    let complete = args.json || output_config.needs_slow_scan();

    let scanners: Vec<DirectoryScanner> = args
        .paths
        .iter()
        .map(|path| {
            let config = ScannerConfig {
                includes: (!args.include.is_empty()).then(|| args.include.clone()),
                excludes: args.exclude.clone(),
                default_excludes: args.default_excludes,
                follow_symlinks: args.follow_symlinks,
                case_sensitive: !args.ignore_case,
                ..ScannerConfig::new(path)
            };
            let mut scanner = DirectoryScanner::from_config(config).sorted();
            if let Some(limit) = max_size {
                scanner.set_selector(MaxSizeSelector(limit));
            }
            scanner
        })
        .collect();

    // One scanner per base directory, run concurrently; output keeps argument order
    let results: Vec<Result<Scan, ScanError>> = scanners
        .par_iter()
        .map(|scanner| {
            let mut scan = scanner.scan()?;
            if complete {
                scan.slow_scan();
            }
            Ok(scan)
        })
        .collect();

    let mut scans = Vec::with_capacity(results.len());
    for (path, result) in args.paths.iter().zip(results) {
        match result {
            Ok(scan) => scans.push(scan),
            Err(e) => fail(path, &e),
        }
    }

    if let Some(dest) = &args.copy_to {
        for scan in &scans {
            if let Err(e) = copy_included_files(scan, dest) {
                fail(scan.basedir(), &e);
            }
        }
    }

    let result = if args.json {
        let reports: Vec<_> = scans.into_iter().map(Scan::into_report).collect();
        print_json(&reports)
    } else {
        let mut formatter = TextFormatter::stdout(output_config);
        let with_header = scans.len() > 1;
        scans
            .iter()
            .try_for_each(|scan| formatter.write_scan(scan, with_header))
    };

    if let Err(e) = result {
        eprintln!("fileset: error writing output: {}", e);
        process::exit(1);
    }
}
