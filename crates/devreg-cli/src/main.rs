//! Device registry CLI
//!
//! Merges every pending device CSV file into the device tree and reports
//! what changed.

use clap::Parser;
use devreg_core::{run_with, CatalogSource, FileReport, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devreg")]
#[command(about = "Merge contributed device data into the device registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository root holding devices/, to_process/ and template/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Settings file (JSON); replaces the layout derived from --root
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root of the device tree
    #[arg(long)]
    devices_dir: Option<PathBuf>,

    /// Directory with pending CSV files
    #[arg(long)]
    process_dir: Option<PathBuf>,

    /// Template copied for new devices
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Integration catalog URL
    #[arg(long, conflicts_with_all = ["catalog_file", "integration"])]
    catalog_url: Option<String>,

    /// Saved copy of the integration catalog
    #[arg(long, conflicts_with = "integration")]
    catalog_file: Option<PathBuf>,

    /// Approve an integration directly instead of using the catalog
    #[arg(short, long)]
    integration: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn settings(&self) -> devreg_core::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::from_root(&self.root),
        };

        if let Some(dir) = &self.devices_dir {
            settings.devices_dir = dir.clone();
        }
        if let Some(dir) = &self.process_dir {
            settings.process_dir = dir.clone();
        }
        if let Some(dir) = &self.template_dir {
            settings.template_dir = dir.clone();
        }

        if let Some(url) = &self.catalog_url {
            settings.catalog = CatalogSource::Remote { url: url.clone() };
        } else if let Some(path) = &self.catalog_file {
            settings.catalog = CatalogSource::File { path: path.clone() };
        } else if !self.integration.is_empty() {
            settings.catalog = CatalogSource::Inline {
                domains: self.integration.clone(),
            };
        }

        Ok(settings)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> devreg_core::Result<()> {
    let settings = cli.settings()?;
    let merger = settings.merger()?;

    let summary = run_with(&merger, &settings.process_dir, print_report)?;

    println!();
    println!("Processed: {}", summary.total);

    // Per-file failures are reported above and do not change the exit status
    let failed = summary.failed_count();
    if failed > 0 {
        tracing::warn!(failed, "some files could not be processed");
    }

    Ok(())
}

fn print_report(report: &FileReport) {
    match &report.result {
        Ok(_) => println!("{}: Done", report.path.display()),
        Err(e) => println!("{}: Error; {}", report.path.display(), e),
    }
}
