//! crawlfiles - Classify crawl output files and manage per-date WARC file sets.
//!
//! Usage:
//!   crawlfiles classify <LISTING>                  Classify every entry of a listing
//!   crawlfiles group <LISTING> --stream S          Write per-date snapshots
//!   crawlfiles resolve --stream S --date D         Pick the authoritative snapshot
//!   crawlfiles filesets <LISTING> --stream S       List a stream's compressed WARCs
//!   crawlfiles track <LISTING>                     Export tracking records
//!   crawlfiles walk <MOUNT>                        Produce a listing from a mount
//!   crawlfiles --help                              Show help

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use rayon::prelude::*;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crawlfiles_analyze::{
    FilesetGrouper, ListSerializer, SnapshotSelector, TrackingExport, warc_fileset_paths,
};
use crawlfiles_classify::PathClassifier;
use crawlfiles_core::{ArtifactKind, ClassifiedArtifact, CrawlStream, FilesetConfig, Resolution};
use crawlfiles_scan::{Listing, ListingReader, MountWalker, write_csv};

#[derive(Parser)]
#[command(
    name = "crawlfiles",
    version,
    about = "Classify crawl output files and manage per-date WARC file sets",
    long_about = "crawlfiles reads listings of crawler output, works out which crawl \
                  stream each file belongs to, and keeps a directory of per-date \
                  snapshots from which the most complete WARC file set for any day \
                  can be resolved."
)]
struct Cli {
    /// TOML file with file set settings
    #[arg(long, global = true, env = "CRAWLFILES_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding per-date snapshots
    #[arg(long, global = true, env = "CRAWLFILES_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every entry of a listing
    Classify {
        /// Listing CSV (optionally gzipped)
        listing: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Group a stream's artifacts by date and write snapshots
    Group {
        /// Listing CSV (optionally gzipped)
        listing: PathBuf,

        /// Crawl stream to keep
        #[arg(short, long)]
        stream: CrawlStream,

        /// Artifact kind to keep
        #[arg(short, long, default_value = "warcs")]
        kind: ArtifactKind,
    },

    /// Resolve the most complete snapshot for a date
    Resolve {
        /// Crawl stream
        #[arg(short, long)]
        stream: CrawlStream,

        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: NaiveDate,

        /// Artifact kind
        #[arg(short, long, default_value = "warcs")]
        kind: ArtifactKind,

        /// Print the snapshot's paths instead of the resolution
        #[arg(short, long)]
        entries: bool,
    },

    /// List a stream's compressed WARCs as space-separated text
    Filesets {
        /// Listing CSV (optionally gzipped)
        listing: PathBuf,

        /// Crawl stream
        #[arg(short, long)]
        stream: CrawlStream,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export per-file tracking records as JSON lines
    Track {
        /// Listing CSV (optionally gzipped)
        listing: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Walk a mounted filesystem and write a listing CSV
    Walk {
        /// Mount point; paths below it become absolute namespace paths
        mount: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .context("Failed to start worker threads")?;
    }

    match cli.command {
        Command::Classify { listing, format } => run_classify(&listing, format),
        Command::Group {
            listing,
            stream,
            kind,
        } => run_group(config, &listing, stream, kind),
        Command::Resolve {
            stream,
            date,
            kind,
            entries,
        } => run_resolve(&config, stream, kind, date, entries),
        Command::Filesets {
            listing,
            stream,
            output,
        } => run_filesets(&config, &listing, stream, output),
        Command::Track { listing, output } => run_track(&listing, output),
        Command::Walk { mount, output } => run_walk(&config, &mount, output),
    }
}

/// Log to stderr, filtered by `CRAWLFILES_LOG`, then `RUST_LOG`, then `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CRAWLFILES_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the file set config from `--config`, then apply flag overrides.
fn load_config(cli: &Cli) -> Result<FilesetConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => FilesetConfig::default(),
    };

    if let Some(dir) = &cli.snapshot_dir {
        config.snapshot_dir = dir.clone();
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    config
        .validate()
        .map_err(|message| eyre!("Invalid configuration: {message}"))?;
    Ok(config)
}

fn read_listing(path: &Path) -> Result<Listing> {
    let listing = ListingReader::new()
        .read(path)
        .with_context(|| format!("Failed to read listing {}", path.display()))?;

    if listing.is_empty() {
        warn!(listing = %path.display(), "listing has no entries");
    }
    Ok(listing)
}

fn classify_listing(listing: &Listing) -> Vec<ClassifiedArtifact> {
    let classifier = PathClassifier::new();
    listing
        .entries
        .par_iter()
        .map(|entry| classifier.classify(entry))
        .collect()
}

/// Classify a listing and print one line (or object) per entry.
fn run_classify(path: &Path, format: OutputFormat) -> Result<()> {
    let listing = read_listing(path)?;
    let artifacts = classify_listing(&listing);

    let mut out = BufWriter::new(std::io::stdout().lock());
    match format {
        OutputFormat::Text => {
            for a in &artifacts {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    a.stream.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    a.kind,
                    a.job.as_deref().unwrap_or("-"),
                    a.timestamp().as_deref().unwrap_or("-"),
                    a.path
                )?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &artifacts)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    let recognised = artifacts.iter().filter(|a| a.recognised).count();
    eprintln!(
        "{} entries, {} recognised, {} unrecognised",
        artifacts.len(),
        recognised,
        artifacts.len() - recognised
    );
    Ok(())
}

/// Group a listing into per-date snapshots.
fn run_group(config: FilesetConfig, path: &Path, stream: CrawlStream, kind: ArtifactKind) -> Result<()> {
    let listing = read_listing(path)?;
    let snapshot_dir = config.snapshot_dir.clone();

    let report = FilesetGrouper::new(config)
        .group(&listing.entries, stream, kind)
        .context("Grouping failed")?;

    println!();
    println!("{}", "─".repeat(70));
    println!(" {stream} {kind} -> {}", snapshot_dir.display());
    println!(
        " {} of {} entries matched, {} dates, {} new snapshots",
        report.matched,
        report.input,
        report.snapshots.len(),
        report.created_count()
    );
    println!("{}", "─".repeat(70));
    println!();

    for (date, snapshot) in &report.snapshots {
        println!(
            "   {date}  {:>8} entries  {}",
            snapshot.name.count,
            if snapshot.created { "written" } else { "already present" }
        );
    }

    Ok(())
}

/// Resolve a date's snapshot and print it, or its paths.
fn run_resolve(
    config: &FilesetConfig,
    stream: CrawlStream,
    kind: ArtifactKind,
    date: NaiveDate,
    entries: bool,
) -> Result<()> {
    let resolution = SnapshotSelector::from_config(config)
        .resolve_kind(stream, kind, date)
        .with_context(|| {
            format!(
                "Failed to scan snapshots in {}",
                config.snapshot_dir.display()
            )
        })?;

    if !entries {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    match &resolution {
        Resolution::Resolved(snapshot) => {
            let loaded = snapshot.load()?;
            let text = ListSerializer::with_line_chunk(config.line_chunk)
                .serialize(loaded.iter().map(|e| e.filename.as_str()))?;
            println!("{text}");
        }
        Resolution::NoneForDate { .. } => {
            warn!(%stream, %kind, %date, "no snapshot for date");
        }
    }
    Ok(())
}

/// List the compressed WARCs of one stream.
fn run_filesets(
    config: &FilesetConfig,
    path: &Path,
    stream: CrawlStream,
    output: Option<PathBuf>,
) -> Result<()> {
    let listing = read_listing(path)?;
    let artifacts = classify_listing(&listing);
    let paths = warc_fileset_paths(&artifacts, stream);

    let text = ListSerializer::with_line_chunk(config.line_chunk)
        .serialize(&paths)
        .with_context(|| format!("No {stream} WARCs in {}", path.display()))?;

    let mut out = open_output(output.as_deref())?;
    writeln!(out, "{text}")?;
    out.flush()?;
    Ok(())
}

/// Export tracking records for every compressed WARC.
fn run_track(path: &Path, output: Option<PathBuf>) -> Result<()> {
    let listing = read_listing(path)?;
    let artifacts = classify_listing(&listing);

    let export = TrackingExport::collect(&artifacts, Utc::now().naive_utc())?;
    let out = open_output(output.as_deref())?;
    export.write_jsonl(out)?;

    eprintln!("Exported {} tracking records", export.len());
    Ok(())
}

/// Walk a mount and write its listing as CSV.
fn run_walk(config: &FilesetConfig, mount: &Path, output: Option<PathBuf>) -> Result<()> {
    let mount = mount.canonicalize().context("Invalid mount point")?;

    eprintln!("Walking {}...", mount.display());

    let listing = MountWalker::new(&mount)
        .with_threads(config.threads)
        .walk()
        .context("Walk failed")?;

    for warning in &listing.warnings {
        warn!(location = %warning.location, "{}", warning.message);
    }

    let mut out = open_output(output.as_deref())?;
    write_csv(&listing.entries, &mut out)?;
    out.flush()?;

    eprintln!(
        "Listed {} files, {}",
        listing.len(),
        format_size(listing.total_size())
    );
    Ok(())
}

/// Open the output file, or stdout when none is given.
fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout())),
    })
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
