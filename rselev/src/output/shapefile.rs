use anyhow::{Context, Result};
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{
    FieldValue, Geometry as GdalGeometry, LayerAccess, LayerOptions, OGRFieldType,
    OGRwkbGeometryType,
};
use gdal::{Driver, DriverManager};
use std::path::Path;

use crate::collect::global_variables::ELEVATION_FIELD;
use crate::geo_core::GeoCore;
use crate::geometric::join::ElevationFeature;
use crate::output::FeatureClassStore;

const DRIVER_NAME: &str = "ESRI Shapefile";

/// Point shapefile written through GDAL/OGR
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileStore;

impl ShapefileStore {
    pub fn new() -> Self {
        ShapefileStore
    }

    fn driver() -> Result<Driver> {
        DriverManager::get_driver_by_name(DRIVER_NAME)
            .context(format!("{} driver not available", DRIVER_NAME))
    }

    /// Layer name is the file stem, as OGR names it when reopening the file
    fn layer_name(path: &Path) -> Result<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .context(format!("Invalid shapefile name: {:?}", path))
    }
}

impl FeatureClassStore for ShapefileStore {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.exists())
    }

    /// Removes the .shp together with its .shx/.dbf/.prj sidecars
    fn delete(&self, path: &Path) -> Result<()> {
        Self::driver()?
            .delete(path)
            .context(format!("Failed to delete shapefile: {:?}", path))
    }

    fn write_points(
        &self,
        path: &Path,
        geo_core: &GeoCore,
        features: &[ElevationFeature],
    ) -> Result<usize> {
        let layer_name = Self::layer_name(path)?;
        let srs = SpatialRef::from_epsg(geo_core.get_epsg())
            .context(format!("Failed to create spatial reference {}", geo_core.crs_string()))?;

        let mut dataset = Self::driver()?
            .create_vector_only(path)
            .context(format!("Failed to create shapefile: {:?}", path))?;

        let mut layer = dataset
            .create_layer(LayerOptions {
                name: &layer_name,
                srs: Some(&srs),
                ty: OGRwkbGeometryType::wkbPoint,
                options: None,
            })
            .context("Failed to create point layer")?;

        layer
            .create_defn_fields(&[(ELEVATION_FIELD, OGRFieldType::OFTReal)])
            .context(format!("Failed to add {} field", ELEVATION_FIELD))?;

        for f in features {
            let wkt = format!("POINT ({} {})", f.point.x(), f.point.y());
            let geometry =
                GdalGeometry::from_wkt(&wkt).context("Failed to create GDAL geometry from WKT")?;
            layer
                .create_feature_fields(
                    geometry,
                    &[ELEVATION_FIELD],
                    &[FieldValue::RealValue(f64::from(f.elevation))],
                )
                .context(format!("Failed to insert point {}", f.point.point_id))?;
        }

        tracing::debug!("{} points written to {:?}", features.len(), path);
        Ok(features.len())
    }
}
