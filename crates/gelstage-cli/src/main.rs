//! `gelstage`: stage interpreter scripts from the command line.
//!
//! ```text
//! gelstage split script.gel            # numbered one-line listing
//! gelstage split notes.lit --full      # literate source, statements verbatim
//! gelstage split script.gel --grep '^proc '
//! gelstage filter notes.lit --chunk 16 # code lines only
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gelstage::{
    BString, History, LiterateOptions, LiterateReader, Scanner, Termination, foreshorten,
    has_literate_extension,
};
use regex::bytes::Regex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `GELSTAGE_LOG=debug`.
const LOG_ENV: &str = "GELSTAGE_LOG";

#[derive(Parser, Debug)]
#[command(name = "gelstage", version, about = "Statement staging for interpreter scripts")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). Overrides GELSTAGE_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a script into statements and list them.
    Split {
        /// Script to read.
        file: PathBuf,

        /// Treat the file as a literate source even without a `.lit` extension.
        #[arg(long)]
        literate: bool,

        /// Print each statement verbatim instead of a one-line summary.
        #[arg(long)]
        full: bool,

        /// Only list statements matching this regular expression.
        #[arg(long, value_name = "REGEX")]
        grep: Option<Regex>,

        /// Write the statements to this file, loadable again as a script.
        #[arg(long, value_name = "PATH")]
        save_history: Option<PathBuf>,
    },
    /// Print the code lines of a literate source.
    Filter {
        /// Literate source to read.
        file: PathBuf,

        /// Byte marking a code line.
        #[arg(long, default_value_t = '>', value_parser = parse_marker)]
        marker: char,

        /// Bytes to pull from the filter at a time.
        #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u32).range(1..))]
        chunk: u32,
    },
}

fn parse_marker(arg: &str) -> Result<char, String> {
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("marker must be a single ASCII character, got {arg:?}")),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Split {
            file,
            literate,
            full,
            grep,
            save_history,
        } => split(&file, literate, full, grep.as_ref(), save_history.as_deref()),
        Command::Filter {
            file,
            marker,
            chunk,
        } => filter(&file, marker, chunk as usize),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn stage(mut source: impl Read, path: &Path) -> Result<Vec<BString>> {
    let mut scanner = Scanner::new();
    io::copy(&mut source, &mut scanner)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let statements = scanner
        .finish()
        .with_context(|| format!("{} ends inside a statement", path.display()))?;
    Ok(statements)
}

fn split(
    path: &Path,
    literate: bool,
    full: bool,
    grep: Option<&Regex>,
    save_history: Option<&Path>,
) -> Result<()> {
    let literate = literate || has_literate_extension(path);
    tracing::info!(path = %path.display(), literate, "splitting");

    let source = open(path)?;
    let statements = if literate {
        stage(LiterateReader::new(source), path)?
    } else {
        stage(source, path)?
    };

    let mut history = History::new();
    history.extend(statements);
    tracing::info!(statements = history.len(), "staged");

    let selected: Vec<(usize, &[u8])> = match grep {
        Some(pattern) => history
            .search(pattern)
            .into_iter()
            .map(|(i, entry)| (i, &**entry))
            .collect(),
        None => history
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, entry.as_slice()))
            .collect(),
    };

    let mut out = io::stdout().lock();
    for (i, entry) in selected {
        if full {
            out.write_all(entry)?;
            if !entry.ends_with(b"\n") {
                out.write_all(b"\n")?;
            }
        } else {
            writeln!(out, "{i} -> {}", foreshorten(entry))?;
        }
    }
    out.flush()?;

    if let Some(dest) = save_history {
        let file = File::create(dest)
            .with_context(|| format!("cannot create {}", dest.display()))?;
        history
            .save(io::BufWriter::new(file))
            .with_context(|| format!("cannot write {}", dest.display()))?;
        tracing::info!(path = %dest.display(), entries = history.len(), "history saved");
    }
    Ok(())
}

fn filter(path: &Path, marker: char, chunk: usize) -> Result<()> {
    let Ok(marker) = u8::try_from(marker) else {
        bail!("marker {marker:?} is not a single byte");
    };
    let mut reader = LiterateReader::with_options(
        open(path)?,
        LiterateOptions {
            marker,
            ..Default::default()
        },
    );

    let mut out = io::stdout().lock();
    loop {
        let pull = reader.pull(chunk);
        out.write_all(&pull.bytes)?;
        if !pull.more {
            break;
        }
    }
    out.flush()?;

    if let Some(Termination::Failed(err)) = reader.termination() {
        return Err(err.clone()).with_context(|| format!("cannot read {}", path.display()));
    }
    Ok(())
}
