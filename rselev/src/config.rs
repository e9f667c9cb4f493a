use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::collect::global_variables::{
    DEFAULT_OUTPUT_NAME, DEFAULT_SCALE, DEFAULT_TIMEOUT_SECS, DEM_ASSET_ID, EE_API_BASE,
    ELEVATION_BAND,
};
use crate::geo_core::{GeoCore, DEFAULT_EPSG};
use crate::geometric::join::MissingPolicy;

/// Everything the elevation join needs to know about its inputs and outputs.
///
/// Every field has a default so a TOML file only has to name what differs, e.g.
///
/// ```toml
/// workspace = "/data/P2"
/// csv_file = "boundary.csv"
/// output_subfolder = "output"
/// spatial_reference = 32119
/// project = "my-ee-project"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElevationConfig {
    /// Base directory for the CSV and the output subfolder
    pub workspace: PathBuf,
    /// CSV file, relative to `workspace` unless absolute
    pub csv_file: PathBuf,
    /// Output feature class name; its extension selects the store
    pub output_name: String,
    /// Subfolder of `workspace` receiving the output (empty for the workspace itself)
    pub output_subfolder: PathBuf,
    pub x_name: String,
    pub y_name: String,
    /// EPSG code of the input coordinates, also used for the output layer
    pub spatial_reference: u32,
    /// Sampling scale in metres
    pub scale: f64,
    pub asset_id: String,
    pub band: String,
    /// Replace an existing output instead of failing
    pub overwrite: bool,
    pub missing_policy: MissingPolicy,
    pub delimiter: char,
    /// Text encoding label of the CSV (any label known to encoding_rs)
    pub encoding: String,
    /// Cloud project the Earth Engine request runs under
    pub project: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
    /// Cached access token location, defaults to the user's config directory
    pub token_file: Option<PathBuf>,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        ElevationConfig {
            workspace: PathBuf::from("."),
            csv_file: PathBuf::from("boundary.csv"),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_subfolder: PathBuf::new(),
            x_name: "X".to_string(),
            y_name: "Y".to_string(),
            spatial_reference: DEFAULT_EPSG,
            scale: DEFAULT_SCALE,
            asset_id: DEM_ASSET_ID.to_string(),
            band: ELEVATION_BAND.to_string(),
            overwrite: false,
            missing_policy: MissingPolicy::default(),
            delimiter: ',',
            encoding: "utf-8".to_string(),
            project: None,
            api_base: EE_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_file: None,
        }
    }
}

impl ElevationConfig {
    /// Load a configuration from a TOML file, unspecified fields keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ElevationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            anyhow::bail!("scale must be a positive number, got {}", self.scale);
        }
        if self.output_name.is_empty() {
            anyhow::bail!("output_name must not be empty");
        }
        self.delimiter_byte()?;
        Ok(())
    }

    pub fn geo_core(&self) -> GeoCore {
        GeoCore::new(self.spatial_reference)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.workspace.join(&self.csv_file)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.workspace.join(&self.output_subfolder)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(&self.output_name)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            anyhow::bail!("CSV delimiter must be a single ASCII character, got '{}'", self.delimiter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ElevationConfig::default();
        assert_eq!(config.x_name, "X");
        assert_eq!(config.y_name, "Y");
        assert_eq!(config.spatial_reference, 4326);
        assert_eq!(config.scale, 10.0);
        assert_eq!(config.asset_id, "USGS/3DEP/10m");
        assert!(!config.overwrite);
        assert_eq!(config.missing_policy, MissingPolicy::Fail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_paths() {
        let config = ElevationConfig {
            workspace: PathBuf::from("/data/P2"),
            output_subfolder: PathBuf::from("output"),
            ..Default::default()
        };
        assert_eq!(config.csv_path(), PathBuf::from("/data/P2/boundary.csv"));
        assert_eq!(config.output_dir(), PathBuf::from("/data/P2/output"));
        assert_eq!(
            config.output_path(),
            PathBuf::from("/data/P2/output/point_elev.shp")
        );
    }

    #[test]
    fn test_empty_subfolder_writes_into_workspace() {
        let config = ElevationConfig {
            workspace: PathBuf::from("/data"),
            output_name: "pts.geojson".to_string(),
            ..Default::default()
        };
        assert_eq!(config.output_path(), PathBuf::from("/data/pts.geojson"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ElevationConfig::from_toml_str(
            r#"
            workspace = "/data/P2"
            output_subfolder = "output"
            spatial_reference = 32119
            overwrite = true
            missing_policy = "skip"
            delimiter = ";"
            "#,
        )
        .unwrap();
        assert_eq!(config.spatial_reference, 32119);
        assert!(config.overwrite);
        assert_eq!(config.missing_policy, MissingPolicy::Skip);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.x_name, "X");
        assert_eq!(config.output_name, "point_elev.shp");
    }

    #[test]
    fn test_from_toml_rejects_unknown_field() {
        assert!(ElevationConfig::from_toml_str("elevation_field = \"Z\"").is_err());
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(ElevationConfig::from_toml_str("scale = 0.0").is_err());
        assert!(ElevationConfig::from_toml_str("scale = -5.0").is_err());
    }
}
