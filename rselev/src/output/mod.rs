pub mod geojson_store;
#[cfg(feature = "gdal")]
pub mod shapefile;

use anyhow::Result;
use std::path::Path;

use crate::errors::ElevJoinError;
use crate::geo_core::GeoCore;
use crate::geometric::join::ElevationFeature;

pub use geojson_store::GeoJsonStore;
#[cfg(feature = "gdal")]
pub use shapefile::ShapefileStore;

/// Destination for the output point feature class
pub trait FeatureClassStore {
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Remove the feature class and everything belonging to it
    fn delete(&self, path: &Path) -> Result<()>;

    /// Create a point feature class in `geo_core`'s CRS with a float `Elevation` field
    /// and insert one row per feature. Returns the number of rows written.
    fn write_points(
        &self,
        path: &Path,
        geo_core: &GeoCore,
        features: &[ElevationFeature],
    ) -> Result<usize>;
}

/// Pick a store from the output file extension
pub fn store_for_path(path: &Path) -> Result<Box<dyn FeatureClassStore>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        #[cfg(feature = "gdal")]
        Some("shp") => Ok(Box::new(ShapefileStore::new())),
        Some("geojson") | Some("json") => Ok(Box::new(GeoJsonStore)),
        _ => Err(ElevJoinError::UnsupportedOutputFormat(path.to_path_buf()).into()),
    }
}
