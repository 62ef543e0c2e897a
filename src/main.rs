//! `vitrine` command-line showcase.
//!
//! Opens one window per selected catalog model:
//!
//! ```text
//! vitrine --assets public --id 3
//! vitrine --catalog shop.toml --options studio.toml --all
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use vitrine::catalog::identity_from_param;
use vitrine::{Catalog, Options, Showcase, VitrineError};

#[derive(Parser)]
#[command(name = "vitrine", version, about = "Multi-viewer 3D model showcase")]
struct Cli {
    /// Catalog file (.toml or .json). Defaults to the built-in catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Options preset (TOML).
    #[arg(long)]
    options: Option<PathBuf>,

    /// Directory asset paths are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Identity of the model to show, as a route parameter would carry it.
    #[arg(long, conflicts_with = "all")]
    id: Option<String>,

    /// Show every catalog model side by side.
    #[arg(long)]
    all: bool,

    /// Print the options JSON schema and exit.
    #[arg(long)]
    schema: bool,
}

fn run(cli: Cli) -> Result<(), VitrineError> {
    if cli.schema {
        let schema = serde_json::to_string_pretty(&Options::json_schema())
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
        writeln!(std::io::stdout().lock(), "{schema}")?;
        return Ok(());
    }

    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let options = match &cli.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };

    let descriptors = if cli.all {
        catalog.subset(|_| true)
    } else {
        catalog.select(identity_from_param(cli.id.as_deref()))
    };
    log::info!(
        "{} of {} catalog models selected",
        descriptors.len(),
        catalog.len()
    );

    Showcase::builder()
        .with_descriptors(descriptors)
        .with_options(options)
        .with_asset_root(cli.assets)
        .build()
        .run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
