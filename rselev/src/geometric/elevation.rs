use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::collect::ElevationSampler;
use crate::commons::coordinate_table::{CoordinateTable, TableOptions};
use crate::config::ElevationConfig;
use crate::errors::ElevJoinError;
use crate::geometric::join::join_by_point_id;
use crate::output::FeatureClassStore;

/// Summary of one elevation join run
#[derive(Debug, Clone, PartialEq)]
pub struct JoinReport {
    pub input_rows: usize,
    pub written: usize,
    /// Point ids left out for lack of an elevation
    pub skipped: Vec<u64>,
    pub output_path: PathBuf,
}

/// Samples a DEM at every point of a CSV table and writes the points with their
/// elevation to a new point feature class.
///
/// ```no_run
/// use rselev::config::ElevationConfig;
/// use rselev::geometric::elevation::Elevation;
/// # fn demo(sampler: &mut impl rselev::collect::ElevationSampler) -> anyhow::Result<()> {
/// let config = ElevationConfig { overwrite: true, ..Default::default() };
/// let store = rselev::output::store_for_path(&config.output_path())?;
/// let report = Elevation::new(config).run(sampler, store.as_ref())?;
/// println!("{} points written", report.written);
/// # Ok(())
/// # }
/// ```
pub struct Elevation {
    config: ElevationConfig,
}

impl Elevation {
    pub fn new(config: ElevationConfig) -> Self {
        Elevation { config }
    }

    pub fn config(&self) -> &ElevationConfig {
        &self.config
    }

    /// Load the CSV, sample, join by point id and write the output
    pub fn run(
        &self,
        sampler: &mut dyn ElevationSampler,
        store: &dyn FeatureClassStore,
    ) -> Result<JoinReport> {
        let config = &self.config;
        config.validate()?;
        let geo_core = config.geo_core();
        let output_path = config.output_path();

        let csv_path = config.csv_path();
        let options = TableOptions {
            x_name: &config.x_name,
            y_name: &config.y_name,
            delimiter: config.delimiter_byte()?,
            encoding: &config.encoding,
        };
        let table = CoordinateTable::from_path(&csv_path, &options)?;
        tracing::info!("{} rows read from {:?}", table.len(), csv_path);

        // refuse early, before any request is spent
        let exists = store.exists(&output_path)?;
        if exists && !config.overwrite {
            return Err(ElevJoinError::OutputExists(output_path).into());
        }

        let points = table.to_points();
        let sampled = if points.is_empty() {
            Vec::new()
        } else {
            tracing::info!(
                "sampling {} points from {} at {} m",
                points.len(),
                config.asset_id,
                config.scale
            );
            sampler
                .sample(&points, &geo_core, config.scale)
                .context("Failed to sample elevations")?
        };

        let outcome = join_by_point_id(&points, &sampled, config.missing_policy)?;
        if !outcome.skipped.is_empty() {
            tracing::warn!(
                "{} point(s) without elevation left out: {:?}",
                outcome.skipped.len(),
                outcome.skipped
            );
        }

        if exists {
            tracing::info!("replacing existing output {:?}", output_path);
            store.delete(&output_path)?;
        }

        let output_dir = config.output_dir();
        std::fs::create_dir_all(&output_dir)
            .context(format!("Failed to create directory: {:?}", output_dir))?;

        let written = store.write_points(&output_path, &geo_core, &outcome.features)?;
        tracing::info!("{} points written to {:?}", written, output_path);

        Ok(JoinReport {
            input_rows: table.len(),
            written,
            skipped: outcome.skipped,
            output_path,
        })
    }
}
