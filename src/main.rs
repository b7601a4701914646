// Command-line entry point for revcg.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use revcg::application::{self, AssembleUsecase, ConvertUsecase, StoreUsecase};
use revcg::infrastructure::concurrency;
use revcg::infrastructure::settings::Settings;
use revcg::infrastructure::store::DiskRevisionStore;
use revcg::infrastructure::{DotExporter, JsonExporter};
use revcg::ports::{OutputExporter, RevisionSummary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, convert and store revision call graphs", long_about = None)]
struct Cli {
    /// Settings file (default: ./revcg.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "revcg=trace"; RUST_LOG wins
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode revision files and print a summary of each
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Decode revision files and check their edges
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Re-encode a revision file
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        output: String,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        pretty: bool,
    },
    /// Build a revision file from an analyzer facts document
    Assemble {
        facts: PathBuf,
        #[arg(short, long)]
        output: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Manage the on-disk revision store
    Store {
        /// Store directory (overrides store_path from settings)
        #[arg(long)]
        store: Option<PathBuf>,
        #[command(subcommand)]
        op: StoreOp,
    },
}

#[derive(Subcommand, Debug)]
enum StoreOp {
    /// Store revision files, keyed by their revision URI
    Put {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write a stored revision to a file
    Get {
        uri: String,
        #[arg(short, long)]
        output: String,
        #[arg(long)]
        pretty: bool,
    },
    /// List stored revisions
    List,
    /// Delete a stored revision
    Remove { uri: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Dot,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::resolve(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(2);
        }
    };
    init_tracing(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    match execute(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Inspect { files } => {
            concurrency::init_thread_pool(settings.workers)?;
            let mut failed = 0;
            for (path, result) in application::load_many(&files) {
                match result {
                    Ok(rcg) => println!("{}: {}", path.display(), RevisionSummary::from(&rcg)),
                    Err(e) => {
                        failed += 1;
                        tracing::error!("{:#}", e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} files could not be decoded", failed, files.len());
            }
            Ok(())
        }
        Command::Validate { files } => {
            let mut failed = 0;
            for path in &files {
                match application::validate_file(path) {
                    Ok(summary) => println!("ok: {} ({})", path.display(), summary.uri),
                    Err(e) => {
                        failed += 1;
                        println!("FAILED: {}: {:#}", path.display(), e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} files failed validation", failed, files.len());
            }
            Ok(())
        }
        Command::Convert {
            input,
            output,
            format,
            pretty,
        } => {
            let json = JsonExporter {
                pretty: pretty || settings.pretty,
            };
            let exporter: &dyn OutputExporter = match format {
                Format::Json => &json,
                Format::Dot => &DotExporter,
            };
            ConvertUsecase { exporter }.run(&input, &output)?;
            println!("Output written to {}", output);
            Ok(())
        }
        Command::Assemble {
            facts,
            output,
            pretty,
        } => {
            let exporter = JsonExporter {
                pretty: pretty || settings.pretty,
            };
            let summary = AssembleUsecase { exporter: &exporter }.run(&facts, &output)?;
            println!("{}", summary);
            Ok(())
        }
        Command::Store { store, op } => {
            let path = match store.or_else(|| settings.store_path.clone()) {
                Some(path) => path,
                None => bail!("No store directory: pass --store or set store_path"),
            };
            let path = path
                .to_str()
                .with_context(|| format!("Store path is not UTF-8: {}", path.display()))?
                .to_string();
            let disk = DiskRevisionStore::open(&path)?;
            let usecase = StoreUsecase { store: &disk };

            match op {
                StoreOp::Put { files } => {
                    concurrency::init_thread_pool(settings.workers)?;
                    for key in usecase.put_files(&files)? {
                        println!("{}", key);
                    }
                }
                StoreOp::Get { uri, output, pretty } => {
                    let exporter = JsonExporter {
                        pretty: pretty || settings.pretty,
                    };
                    if !usecase.export(&uri, &exporter, &output)? {
                        bail!("Not in store: {}", uri);
                    }
                    println!("Output written to {}", output);
                }
                StoreOp::List => {
                    for summary in usecase.list()? {
                        println!("{}", summary);
                    }
                }
                StoreOp::Remove { uri } => {
                    if !usecase.remove(&uri)? {
                        bail!("Not in store: {}", uri);
                    }
                }
            }
            disk.flush()
        }
    }
}
