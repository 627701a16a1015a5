//! Lingxi - module metadata CLI

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lingxi::metadata::module::{read_module, ModuleHandle};
use lingxi::metadata::{GateState, Version};
use lingxi::util::config::{self, LingxiConfig};
use lingxi::util::diagnostic::{EmitterConfig, JsonEmitter, TextEmitter};
use lingxi::util::logger::{self, LogLevel};
use lingxi::{NAME, VERSION};

/// Inspect compiled module metadata and its version requirements
#[derive(Parser, Debug)]
#[command(name = "lingxi")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./lingxi.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every record of a module file with its requirements
    Dump {
        /// Module metadata file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Evaluate every requirement against a language version
    Gate {
        /// Module metadata file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Language version of the consumer (e.g. 1.1)
        #[arg(long, value_name = "X.Y")]
        language_version: Option<Version>,

        /// API version of the consumer; enables API version checks
        #[arg(long, value_name = "X.Y")]
        api_version: Option<Version>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Find exactly one declaration by its dotted name
    Lookup {
        /// Module metadata file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dotted name, `<init>` for constructors (e.g. test.A.<init>)
        #[arg(value_name = "FQ_NAME")]
        fq_name: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn open_module(file: &Path) -> Result<ModuleHandle> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read: {}", file.display()))?;
    let metadata = read_module(&bytes)
        .with_context(|| format!("Malformed module metadata: {}", file.display()))?;
    Ok(ModuleHandle::new(file.display().to_string(), metadata))
}

fn load_config(path: Option<&Path>) -> Result<LingxiConfig> {
    match path {
        Some(path) => config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => config::load_or_default(Path::new(".")).context("Failed to load lingxi.toml"),
    }
}

fn dump(module: &ModuleHandle) -> Result<()> {
    println!("{} ({} records)", module.location(), module.records().len());
    for record in module.records() {
        println!(
            "{} {} {}",
            record.visibility,
            record.kind.describe(),
            record.path
        );
        for requirement in record.decode_requirements()? {
            println!("    {}", requirement);
        }
    }
    Ok(())
}

fn gate(
    module: &ModuleHandle,
    config: &LingxiConfig,
    format: Format,
) -> Result<()> {
    let settings = config.language_settings();
    let report = module
        .enforce(&settings)
        .with_context(|| format!("Failed to evaluate: {}", module.location()))?;

    match format {
        Format::Text => {
            for entry in &report.entries {
                println!("{:<9} {} {}", entry.state.as_str(), entry.kind.describe(), entry.path);
            }
            let emitter = if std::io::stdout().is_terminal() {
                TextEmitter::new()
            } else {
                TextEmitter::with_config(EmitterConfig::plain())
            };
            print!("{}", emitter.render_all(&report.diagnostics, None));
        }
        Format::Json => {
            let entries: Vec<_> = report
                .entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "path": entry.path.to_string(),
                        "kind": entry.kind.describe(),
                        "state": entry.state.as_str(),
                    })
                })
                .collect();
            let diagnostics: Vec<_> = report
                .diagnostics
                .iter()
                .map(JsonEmitter::to_lsp_diagnostic)
                .collect();
            let output = serde_json::json!({
                "languageVersion": settings.language_version.to_string(),
                "entries": entries,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    let rejected = report.count(GateState::Rejected);
    if rejected > 0 {
        bail!("{} declaration(s) rejected", rejected);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logger::init_with_level(LogLevel::Debug);
    } else {
        logger::init_with_level(LogLevel::Warn);
    }

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Dump { file } => {
            dump(&open_module(&file)?)?;
        }
        Commands::Gate {
            file,
            language_version,
            api_version,
            format,
        } => {
            if let Some(version) = language_version {
                config.language.version = version;
            }
            if api_version.is_some() {
                config.language.api_version = api_version;
            }
            gate(&open_module(&file)?, &config, format)?;
        }
        Commands::Lookup { file, fq_name } => {
            let module = open_module(&file)?;
            let record = module
                .find_unambiguous(&fq_name)
                .with_context(|| format!("Lookup failed in {}", module.location()))?;
            println!(
                "{} {} {}",
                record.visibility,
                record.kind.describe(),
                record.path
            );
            for requirement in record.decode_requirements()? {
                println!("    {}", requirement);
            }
        }
    }

    Ok(())
}
