use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rselev::collect::earth_engine::auth::Authenticator;
use rselev::collect::earth_engine::ee_collect::EeCollect;
use rselev::collect::global_variables::PROJECT_ENV_VAR;
use rselev::geometric::join::MissingPolicy;
use rselev::output::store_for_path;
use rselev::{Elevation, ElevationConfig};

/// Sample DEM elevations at the points of a CSV file and write them to a point feature class
#[derive(Parser, Debug)]
#[command(name = "rselev", version, about)]
struct Args {
    /// TOML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory of the CSV and the output subfolder
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// CSV file with the point coordinates
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Output name, .shp or .geojson
    #[arg(long)]
    output: Option<String>,

    #[arg(long)]
    subfolder: Option<PathBuf>,

    /// X coordinate column
    #[arg(short = 'x', long)]
    x_name: Option<String>,

    /// Y coordinate column
    #[arg(short = 'y', long)]
    y_name: Option<String>,

    /// EPSG code of the coordinates
    #[arg(long)]
    epsg: Option<u32>,

    /// Sampling scale in metres
    #[arg(long)]
    scale: Option<f64>,

    /// Earth Engine cloud project
    #[arg(long, env = PROJECT_ENV_VAR)]
    project: Option<String>,

    /// Replace an existing output
    #[arg(long)]
    overwrite: bool,

    /// Leave out points the DEM has no value for instead of failing
    #[arg(long)]
    skip_missing: bool,

    /// Never prompt for an access token
    #[arg(long)]
    no_interactive: bool,
}

impl Args {
    fn into_config(self) -> Result<ElevationConfig> {
        let mut config = match &self.config {
            Some(path) => ElevationConfig::from_toml_file(path)?,
            None => ElevationConfig::default(),
        };

        if let Some(v) = self.workspace {
            config.workspace = v;
        }
        if let Some(v) = self.csv {
            config.csv_file = v;
        }
        if let Some(v) = self.output {
            config.output_name = v;
        }
        if let Some(v) = self.subfolder {
            config.output_subfolder = v;
        }
        if let Some(v) = self.x_name {
            config.x_name = v;
        }
        if let Some(v) = self.y_name {
            config.y_name = v;
        }
        if let Some(v) = self.epsg {
            config.spatial_reference = v;
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if self.project.is_some() {
            config.project = self.project;
        }
        if self.overwrite {
            config.overwrite = true;
        }
        if self.skip_missing {
            config.missing_policy = MissingPolicy::Skip;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(args: Args) -> Result<()> {
    let allow_interactive = !args.no_interactive;
    let config = args.into_config()?;

    let project = config
        .project
        .clone()
        .context(format!("No Earth Engine project given (use --project or {})", PROJECT_ENV_VAR))?;

    let authenticator = Authenticator::new(config.token_file.clone());
    let stdin = std::io::stdin();
    let credentials =
        authenticator.authenticate(allow_interactive, &mut stdin.lock(), &mut std::io::stderr())?;

    let mut sampler = EeCollect::with_options(
        &config.api_base,
        &project,
        credentials,
        &config.asset_id,
        &config.band,
        config.timeout_secs,
    )?;
    let store = store_for_path(&config.output_path())?;

    let elevation = Elevation::new(config);
    let report = elevation.run(&mut sampler, store.as_ref())?;
    tracing::info!(
        "done: {} of {} points sampled from {} written to {:?}",
        report.written,
        report.input_rows,
        elevation.config().asset_id,
        report.output_path
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
