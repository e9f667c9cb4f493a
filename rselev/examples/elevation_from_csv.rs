use anyhow::{Context, Result};
use std::path::PathBuf;

use rselev::collect::earth_engine::auth::Authenticator;
use rselev::collect::earth_engine::ee_collect::EeCollect;
use rselev::output::store_for_path;
use rselev::{Elevation, ElevationConfig};

/// Example: sampling the USGS 3DEP DEM at two points near Baton Rouge
/// Needs EARTHENGINE_PROJECT and an access token (EARTHENGINE_TOKEN or a cached one)
fn main() -> Result<()> {
    println!("=== Example: Elevation at CSV points from Earth Engine ===\n");

    let workspace = PathBuf::from("./output/elevation_example");
    std::fs::create_dir_all(&workspace)?;
    std::fs::write(
        workspace.join("boundary.csv"),
        "X,Y\n-91.0,30.5\n-91.2,30.7\n",
    )?;

    let config = ElevationConfig {
        workspace,
        output_name: "point_elev.geojson".to_string(),
        output_subfolder: PathBuf::from("output"),
        overwrite: true,
        project: std::env::var("EARTHENGINE_PROJECT").ok(),
        ..Default::default()
    };

    println!("Input:  {:?}", config.csv_path());
    println!("Output: {:?}", config.output_path());
    println!("DEM:    {} at {} m\n", config.asset_id, config.scale);

    let project = config.project.clone().context("EARTHENGINE_PROJECT is not set")?;
    let credentials = Authenticator::new(None).authenticate(
        true,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout(),
    )?;
    let mut sampler = EeCollect::new(&project, credentials, &config.asset_id, &config.band)?;
    let store = store_for_path(&config.output_path())?;

    let report = Elevation::new(config).run(&mut sampler, store.as_ref())?;

    println!("Points written: {}/{}", report.written, report.input_rows);
    println!("  - File: {:?}", report.output_path);

    Ok(())
}
