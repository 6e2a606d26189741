mod config;

use anyhow::Context;
use architect_core::adapters::{FileSchemaStore, FsBackupPort, FsWritePort};
use architect_core::pipeline::{ImportError, run_export, run_import, write_import_artifacts};
use architect_core::settings::{DocumentFormat, ExportSettings, ImportSettings};
use architect_core::ProcessorRegistry;
use architect_types::report::ToolInfo;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, OutputFormat};
use fs_err as fs;
use std::io::Read;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Exit code when the import ran to completion but some items failed.
const EXIT_ITEM_FAILURES: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "architect",
    version,
    about = "Import and export content schemas as declarative documents."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply a declarative document to the schema store.
    Import(ImportArgs),
    /// Write the schema store out as a declarative document.
    Export(ExportArgs),
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum InputFormat {
    Auto,
    Json,
    Yaml,
}

impl From<InputFormat> for DocumentFormat {
    fn from(f: InputFormat) -> Self {
        match f {
            InputFormat::Auto => DocumentFormat::Auto,
            InputFormat::Json => DocumentFormat::Json,
            InputFormat::Yaml => DocumentFormat::Yaml,
        }
    }
}

impl From<OutputFormat> for DocumentFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => DocumentFormat::Json,
            OutputFormat::Yaml => DocumentFormat::Yaml,
        }
    }
}

#[derive(Debug, Parser)]
struct ImportArgs {
    /// Document to import (`-` reads stdin).
    document: Utf8PathBuf,

    /// Working root holding architect.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Schema store file (default: <root>/schema.json).
    #[arg(long)]
    store: Option<Utf8PathBuf>,

    /// Directory for restore points (default: <root>/.architect/backups).
    #[arg(long)]
    backups_dir: Option<Utf8PathBuf>,

    /// Output directory for results (default: <root>/artifacts/architect).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Skip the restore point.
    #[arg(long, default_value_t = false)]
    no_backup: bool,

    /// Document format.
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,
}

#[derive(Debug, Parser)]
struct ExportArgs {
    /// Working root holding architect.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Schema store file (default: <root>/schema.json).
    #[arg(long)]
    store: Option<Utf8PathBuf>,

    /// Output format (default from architect.toml, else json).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write to a file instead of stdout.
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Import(args) => cmd_import(args),
        Command::Export(args) => cmd_export(args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("error: {:#}", e);
            let import_error = e.downcast_ref::<ImportError>();
            if let Some(point) = import_error.and_then(ImportError::restore_point) {
                println!("restore point retained: {}", point.location);
            }
            let code = import_error.map_or(1, ImportError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "architect".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}

fn read_document(path: &Utf8Path) -> anyhow::Result<String> {
    if path.as_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read document from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("read document {}", path))
    }
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<ExitCode> {
    let file_config = config::load_or_default(&args.root).context("load architect.toml config")?;
    let merged = ConfigMerger::new(file_config, &args.root).merge_import_args(
        args.store.as_deref(),
        args.backups_dir.as_deref(),
        args.out_dir.as_deref(),
        args.no_backup,
    );
    debug!(?merged, "merged config");

    let document = read_document(&args.document)?;
    let mut store = FileSchemaStore::open(merged.store.clone())
        .with_context(|| format!("open store {}", merged.store))?;
    let backup = FsBackupPort::new(merged.store.clone(), merged.backups_dir.clone());

    let settings = ImportSettings {
        format: args.format.into(),
        out_dir: merged.out_dir.clone(),
        backup_enabled: merged.backups_enabled,
    };
    let outcome = run_import(
        &settings,
        &document,
        &ProcessorRegistry::new(),
        &mut store,
        &backup,
        tool(),
    )?;

    write_import_artifacts(&outcome, &settings.out_dir, &FsWritePort)
        .context("write import artifacts")?;

    let summary = &outcome.report.summary;
    info!(
        attempted = summary.attempted,
        failed = summary.failed,
        pruned = summary.pruned,
        "import finished"
    );
    println!(
        "imported {} item(s): {} succeeded, {} failed, {} entry type(s) pruned",
        summary.attempted, summary.succeeded, summary.failed, summary.pruned
    );
    println!("results: {}", settings.out_dir.join("results.json"));

    if let Some(point) = &outcome.retained_restore_point {
        println!("restore point retained: {}", point.location);
    }
    if outcome.report.no_errors {
        return Ok(ExitCode::SUCCESS);
    }
    Ok(ExitCode::from(EXIT_ITEM_FAILURES))
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<ExitCode> {
    let file_config = config::load_or_default(&args.root).context("load architect.toml config")?;
    let merged = ConfigMerger::new(file_config, &args.root)
        .merge_export_args(args.store.as_deref(), args.format);

    let store = FileSchemaStore::open(merged.store.clone())
        .with_context(|| format!("open store {}", merged.store))?;
    let format = DocumentFormat::from(merged.format);
    let settings = ExportSettings {
        format,
        ..ExportSettings::default()
    };
    let outcome = run_export(&settings, &ProcessorRegistry::new(), &store)?;
    let text = outcome.render(settings.format)?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, text.as_bytes())?;
            info!(path = %out, "export written");
        }
        None => print!("{}", text),
    }
    Ok(ExitCode::SUCCESS)
}
