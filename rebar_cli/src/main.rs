//! # Rebar CLI
//!
//! Command-line front end for rebar_core:
//!
//! - `rebar propose` - diameter for a single required area
//! - `rebar table` - diameters for every area cell of a CSV export
//! - `rebar init-config` - write default settings to a JSON file

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rebar_core::file_io::{export_diameter_table, load_settings, read_area_table, save_settings};
use rebar_core::proposal::closest_layout;
use rebar_core::settings::ProposalSettings;
use rebar_core::{AreaUnit, FailurePolicy};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rebar")]
#[command(about = "Propose rebar diameters from required reinforcement areas")]
struct Cli {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Propose(ProposeArgs),
    Table(TableArgs),
    InitConfig(InitConfigArgs),
}

#[derive(Args)]
struct CatalogArgs {
    /// Candidate diameters in mm, e.g. 12,16,20
    #[arg(long, value_delimiter = ',')]
    diameters: Option<Vec<f64>>,

    /// Candidate spacings in mm, e.g. 100,150,200
    #[arg(long, value_delimiter = ',')]
    spacings: Option<Vec<f64>>,
}

#[derive(Args)]
struct ProposeArgs {
    /// Required area per meter width
    #[arg(long)]
    area: f64,

    /// Area unit: cm2/m, mm2/m or a numeric scale factor
    #[arg(long)]
    unit: Option<String>,

    #[command(flatten)]
    catalog: CatalogArgs,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TableArgs {
    /// CSV with an id column and AS<tag> [<unit>] area columns
    #[arg(long = "in")]
    input: PathBuf,

    /// CSV to write the phi_<tag> diameter columns to
    #[arg(long)]
    out: PathBuf,

    /// Keep going past failing cells and report all of them
    #[arg(long)]
    collect_errors: bool,

    #[command(flatten)]
    catalog: CatalogArgs,
}

#[derive(Args)]
struct InitConfigArgs {
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Propose(args) => propose(cli.config.as_deref(), args),
        Command::Table(args) => table(cli.config.as_deref(), args),
        Command::InitConfig(args) => init_config(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(config: Option<&Path>, catalog: CatalogArgs) -> Result<ProposalSettings> {
    let mut settings = match config {
        Some(path) => load_settings(path).with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => ProposalSettings::default(),
    };

    if let Some(diameters) = catalog.diameters {
        settings.catalog = settings.catalog.with_diameters(diameters).context("invalid --diameters")?;
    }
    if let Some(spacings) = catalog.spacings {
        settings.catalog = settings.catalog.with_spacings(spacings).context("invalid --spacings")?;
    }
    Ok(settings)
}

fn propose(config: Option<&Path>, args: ProposeArgs) -> Result<()> {
    let mut settings = load(config, args.catalog)?;
    if let Some(token) = &args.unit {
        settings.area_unit = AreaUnit::from_token(token).context("invalid --unit")?;
    }

    let best = closest_layout(args.area, &settings.catalog, settings.area_unit)
        .context("diameter proposal failed")?;
    let diameter = best.layout.diameter.0;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&best)?);
        return Ok(());
    }

    println!("Required:  {} {}", args.area, settings.area_unit);
    println!("Diameter:  Ø{}", diameter);
    println!(
        "Nearest:   {} = {:.3} {} (|Δ| = {:.3})",
        best.layout, best.implied_area, settings.area_unit, best.error
    );
    if let Some(advisory) = settings.area_unit.advisory() {
        println!("Note:      {}", advisory);
    }
    Ok(())
}

fn table(config: Option<&Path>, args: TableArgs) -> Result<()> {
    let mut settings = load(config, args.catalog)?;
    if args.collect_errors {
        settings.failure_policy = FailurePolicy::CollectAll;
    }

    info!(
        diameters = ?settings.catalog.diameters(),
        spacings = ?settings.catalog.spacings(),
        "Finding closest match"
    );

    let areas = read_area_table(&args.input, &settings)
        .with_context(|| format!("failed to read area table {}", args.input.display()))?;
    let outcome = settings.propose_table(&areas).context("table proposal failed")?;

    for advisory in &outcome.advisories {
        warn!("{}", advisory);
    }

    export_diameter_table(&outcome.table, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    println!(
        "Proposed diameters for {} rows x {} layers -> {}",
        outcome.table.len(),
        outcome.table.diameter_columns.len(),
        args.out.display()
    );

    if !outcome.is_complete() {
        for failure in &outcome.failures {
            eprintln!(
                "  row {} (element '{}'), column '{}': {}",
                failure.row, failure.element_id, failure.column, failure.error
            );
        }
        bail!("{} cell(s) could not be resolved", outcome.failures.len());
    }
    Ok(())
}

fn init_config(args: InitConfigArgs) -> Result<()> {
    save_settings(&ProposalSettings::default(), &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    info!(path = %args.out.display(), "Wrote default settings");
    Ok(())
}
