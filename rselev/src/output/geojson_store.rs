use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;
use std::path::Path;

use crate::collect::global_variables::ELEVATION_FIELD;
use crate::geo_core::{BoundingBox, GeoCore};
use crate::geometric::join::ElevationFeature;
use crate::output::FeatureClassStore;

/// Writes the points as a GeoJSON FeatureCollection.
/// The EPSG code goes into an `epsg` foreign member since RFC 7946 has no CRS member.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonStore;

impl GeoJsonStore {
    pub fn to_feature_collection(
        geo_core: &GeoCore,
        features: &[ElevationFeature],
    ) -> FeatureCollection {
        let bbox = BoundingBox::from_points(features.iter().map(|f| &f.point.point))
            .map(|b| b.to_vec());

        let features = features
            .iter()
            .map(|f| {
                let mut properties = JsonObject::new();
                properties.insert(ELEVATION_FIELD.to_string(), json!(f.elevation));
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![f.point.x(), f.point.y()]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("epsg".to_string(), json!(geo_core.get_epsg()));

        FeatureCollection {
            bbox,
            features,
            foreign_members: Some(foreign_members),
        }
    }
}

impl FeatureClassStore for GeoJsonStore {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.exists())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).context(format!("Failed to remove existing file: {:?}", path))
    }

    fn write_points(
        &self,
        path: &Path,
        geo_core: &GeoCore,
        features: &[ElevationFeature],
    ) -> Result<usize> {
        let collection = Self::to_feature_collection(geo_core, features);
        std::fs::write(path, GeoJson::from(collection).to_string())
            .context(format!("Failed to write GeoJSON file: {:?}", path))?;
        Ok(features.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_core::KeyedPoint;

    fn features() -> Vec<ElevationFeature> {
        vec![
            ElevationFeature {
                point: KeyedPoint::new(0, -91.0, 30.5),
                elevation: 8.5,
            },
            ElevationFeature {
                point: KeyedPoint::new(1, -91.2, 30.7),
                elevation: 12.25,
            },
        ]
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.geojson");
        let store = GeoJsonStore;

        assert!(!store.exists(&path).unwrap());
        let written = store.write_points(&path, &GeoCore::new(4326), &features()).unwrap();
        assert_eq!(written, 2);
        assert!(store.exists(&path).unwrap());

        let text = std::fs::read_to_string(&path).unwrap();
        let fc = match text.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            other => panic!("unexpected GeoJSON: {:?}", other),
        };
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.bbox, Some(vec![-91.2, 30.5, -91.0, 30.7]));
        assert_eq!(
            fc.foreign_members.as_ref().unwrap()["epsg"],
            serde_json::json!(4326)
        );

        let second = &fc.features[1];
        assert_eq!(
            second.geometry.as_ref().unwrap().value,
            Value::Point(vec![-91.2, 30.7])
        );
        assert_eq!(
            second.properties.as_ref().unwrap()["Elevation"].as_f64(),
            Some(12.25)
        );
    }

    #[test]
    fn test_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.geojson");
        assert_eq!(GeoJsonStore.write_points(&path, &GeoCore::default(), &[]).unwrap(), 0);
        let fc = GeoJsonStore::to_feature_collection(&GeoCore::default(), &[]);
        assert!(fc.features.is_empty());
        assert!(fc.bbox.is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.geojson");
        GeoJsonStore.write_points(&path, &GeoCore::default(), &features()).unwrap();
        GeoJsonStore.delete(&path).unwrap();
        assert!(!GeoJsonStore.exists(&path).unwrap());
    }
}
