//! `strbuf-probe` drives ea-strbuf operations against runtime-sized buffers.
//!
//! Fatal variants abort the process exactly as library callers would see it;
//! `--checked` switches to the result-returning variants and exits with an
//! ordinary error instead.

use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ea_strbuf::{
    checked_append, checked_append_with_capacity, checked_concat, checked_copy, checked_length,
    copy_buf, fatal_abort, fatal_assert, ncat_buf, safe_append, safe_append_with_capacity,
    safe_concat, safe_copy, safe_length, Capacity, Sentinel, Terminated,
};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Probe command line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase output verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Append diagnostic hook invocations to this file before aborting.
    #[arg(long, env = "STRBUF_HOOK_LOG", value_name = "FILE")]
    hook_log: Option<PathBuf>,
    /// Use the result-returning variants instead of aborting.
    #[arg(long)]
    checked: bool,
    /// Install a hook that panics instead of returning.
    #[arg(long)]
    hook_panics: bool,
    /// Subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Operations exposed by the probe.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Measure a buffer.
    Len {
        #[command(flatten)]
        dest: DestArgs,
    },
    /// Overwrite the destination with the source.
    Copy {
        #[command(flatten)]
        dest: DestArgs,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Append at most `--max` bytes of the source.
    Append {
        #[command(flatten)]
        dest: DestArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Byte limit on the appended source.
        #[arg(long)]
        max: usize,
    },
    /// Append the whole source.
    Concat {
        #[command(flatten)]
        dest: DestArgs,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Append the whole source into a destination of caller-declared capacity.
    Lcat {
        #[command(flatten)]
        dest: DestArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Capacity to enforce instead of the buffer's own size.
        #[arg(long)]
        explicit: usize,
    },
    /// Append with one operand absent.
    Null {
        /// Which operand to leave out.
        #[arg(long, value_enum)]
        missing: Missing,
    },
    /// Copy, or append at most `--max` bytes, through the naming macros.
    Named {
        /// Destination size in bytes.
        #[arg(long)]
        capacity: usize,
        #[command(flatten)]
        source: SourceArgs,
        /// Append at most this many bytes instead of copying.
        #[arg(long)]
        max: Option<usize>,
    },
    /// Abort unconditionally with `reason`.
    Abort {
        /// Description to report.
        #[arg(long)]
        reason: String,
    },
    /// Assert `value < limit`.
    Check {
        /// Left-hand side.
        #[arg(long)]
        value: usize,
        /// Right-hand side.
        #[arg(long)]
        limit: usize,
    },
}

/// Destination buffer shape.
#[derive(Args, Debug, Clone)]
struct DestArgs {
    /// Destination size in bytes.
    #[arg(long)]
    capacity: usize,
    /// Raw initial content; left unterminated when it fills the capacity.
    #[arg(long, default_value = "")]
    initial: String,
}

/// Source sequence shape.
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Source text.
    #[arg(long)]
    source: String,
    /// Declare the source a fixed buffer of this size instead of a C string.
    #[arg(long)]
    source_capacity: Option<usize>,
}

/// Operand left absent by `null`.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Missing {
    Source,
    Destination,
}

/// Source operand built from the command line.
enum Source {
    Text(CString),
    Fixed(Vec<u8>),
}

impl Source {
    fn from_args(args: &SourceArgs) -> anyhow::Result<Self> {
        match args.source_capacity {
            Some(capacity) => Ok(Source::Fixed(raw_fill(capacity, &args.source)?)),
            None => Ok(Source::Text(
                CString::new(args.source.as_str()).context("source contains NUL")?,
            )),
        }
    }
}

impl Terminated for Source {
    fn capacity(&self) -> Capacity {
        match self {
            Source::Text(text) => text.as_c_str().capacity(),
            Source::Fixed(bytes) => bytes.as_slice().capacity(),
        }
    }

    fn storage(&self) -> Option<&[u8]> {
        match self {
            Source::Text(text) => text.as_c_str().storage(),
            Source::Fixed(bytes) => bytes.as_slice().storage(),
        }
    }
}

/// `capacity` bytes holding `content`, terminated only if room remains.
fn raw_fill(capacity: usize, content: &str) -> anyhow::Result<Vec<u8>> {
    if content.len() > capacity {
        bail!(
            "initial content is {} bytes, buffer holds {capacity}",
            content.len()
        );
    }
    let mut bytes = vec![0u8; capacity];
    bytes[..content.len()].copy_from_slice(content.as_bytes());
    Ok(bytes)
}

fn build_sentinel(hook_log: Option<PathBuf>, hook_panics: bool) -> Sentinel {
    if hook_panics {
        return Sentinel::builder()
            .hook(|description, _, _| panic!("hook panicked on {description}"))
            .build();
    }
    let Some(path) = hook_log else {
        return Sentinel::new();
    };
    Sentinel::builder()
        .hook(move |description, file, line| {
            if let Ok(mut log) = OpenOptions::new().create(true).append(true).open(&path) {
                let _ = writeln!(log, "hook: {description} at {file}:{line}");
            }
        })
        .build()
}

fn report(bytes: &[u8]) -> anyhow::Result<()> {
    let len = checked_length(bytes)?;
    println!("{} len={len}", String::from_utf8_lossy(&bytes[..len]));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if ea_strbuf::install(build_sentinel(cli.hook_log, cli.hook_panics)).is_err() {
        bail!("sentinel already installed");
    }
    debug!(checked = cli.checked, "sentinel installed");

    match cli.command {
        Commands::Len { dest } => {
            let bytes = raw_fill(dest.capacity, &dest.initial)?;
            let len = if cli.checked {
                checked_length(bytes.as_slice())?
            } else {
                safe_length(bytes.as_slice())
            };
            println!("len={len}");
        }
        Commands::Copy { dest, source } => {
            let mut bytes = raw_fill(dest.capacity, &dest.initial)?;
            let src = Source::from_args(&source)?;
            if cli.checked {
                checked_copy(bytes.as_mut_slice(), &src)?;
            } else {
                safe_copy(bytes.as_mut_slice(), &src);
            }
            report(&bytes)?;
        }
        Commands::Append { dest, source, max } => {
            let mut bytes = raw_fill(dest.capacity, &dest.initial)?;
            let src = Source::from_args(&source)?;
            if cli.checked {
                checked_append(bytes.as_mut_slice(), &src, max)?;
            } else {
                safe_append(bytes.as_mut_slice(), &src, max);
            }
            report(&bytes)?;
        }
        Commands::Concat { dest, source } => {
            let mut bytes = raw_fill(dest.capacity, &dest.initial)?;
            let src = Source::from_args(&source)?;
            if cli.checked {
                checked_concat(bytes.as_mut_slice(), &src)?;
            } else {
                safe_concat(bytes.as_mut_slice(), &src);
            }
            report(&bytes)?;
        }
        Commands::Lcat {
            dest,
            source,
            explicit,
        } => {
            let mut bytes = raw_fill(dest.capacity, &dest.initial)?;
            let src = Source::from_args(&source)?;
            if cli.checked {
                checked_append_with_capacity(bytes.as_mut_slice(), explicit, &src)?;
            } else {
                safe_append_with_capacity(bytes.as_mut_slice(), explicit, &src);
            }
            report(&bytes)?;
        }
        Commands::Null { missing } => {
            let mut backing = vec![0u8; 16];
            let mut dest = match missing {
                Missing::Destination => None,
                Missing::Source => Some(backing.as_mut_slice()),
            };
            let text = c"probe";
            let src = match missing {
                Missing::Source => None,
                Missing::Destination => Some(text),
            };
            if cli.checked {
                checked_concat(&mut dest, &src)?;
            } else {
                safe_concat(&mut dest, &src);
            }
            report(&backing)?;
        }
        Commands::Named {
            capacity,
            source,
            max,
        } => {
            let mut backing = vec![0u8; capacity];
            let mut dest_buf = backing.as_mut_slice();
            let source_text = Source::from_args(&source)?;
            match max {
                Some(max) => {
                    ncat_buf!(dest_buf, source_text, max);
                }
                None => {
                    copy_buf!(dest_buf, source_text);
                }
            }
            report(&backing)?;
        }
        Commands::Abort { reason } => fatal_abort!(&reason),
        Commands::Check { value, limit } => {
            fatal_assert!(value < limit);
            println!("ok");
        }
    }
    info!("done");
    Ok(())
}
