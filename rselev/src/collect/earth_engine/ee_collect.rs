use anyhow::{Context, Result};
use geojson::{FeatureCollection, Value as GeoValue};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::collect::earth_engine::auth::Credentials;
use crate::collect::earth_engine::expression::sample_regions_expression;
use crate::collect::global_variables::{DEFAULT_TIMEOUT_SECS, EE_API_BASE, POINT_ID_PROPERTY};
use crate::collect::ElevationSampler;
use crate::errors::ElevJoinError;
use crate::geo_core::{GeoCore, KeyedPoint};
use crate::geometric::join::SampledPoint;

/// Earth Engine REST client for point sampling of an image asset.
/// Sends `value:compute` requests and keeps the last raw response in `content`.
pub struct EeCollect {
    client: Client,
    api_base: Url,
    project: String,
    credentials: Credentials,
    pub asset_id: String,
    pub band: String,
    pub content: Option<Vec<u8>>,
}

impl EeCollect {
    pub fn new(
        project: &str,
        credentials: Credentials,
        asset_id: &str,
        band: &str,
    ) -> Result<Self> {
        Self::with_options(
            EE_API_BASE,
            project,
            credentials,
            asset_id,
            band,
            DEFAULT_TIMEOUT_SECS,
        )
    }

    pub fn with_options(
        api_base: &str,
        project: &str,
        credentials: Credentials,
        asset_id: &str,
        band: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        if project.trim().is_empty() {
            anyhow::bail!("An Earth Engine cloud project is required");
        }
        let mut api_base =
            Url::parse(api_base).context(format!("Invalid Earth Engine API base URL: {}", api_base))?;
        // Url::join replaces the last segment of a base without a trailing slash
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(EeCollect {
            client,
            api_base,
            project: project.to_string(),
            credentials,
            asset_id: asset_id.to_string(),
            band: band.to_string(),
            content: None,
        })
    }

    /// `<api_base>/v1/projects/<project>/value:compute`
    pub fn compute_url(&self) -> Result<Url> {
        self.api_base
            .join(&format!("v1/projects/{}/value:compute", self.project))
            .context("Failed to build value:compute URL")
    }

    /// Request body sampling `points` at `scale` metres
    pub fn compute_body(&self, points: &[KeyedPoint], geo_core: &GeoCore, scale: f64) -> Value {
        json!({ "expression": sample_regions_expression(&self.asset_id, points, geo_core, scale) })
    }

    /// Execute the sampling request, one round trip for all points
    pub fn execute_sample(
        &mut self,
        points: &[KeyedPoint],
        geo_core: &GeoCore,
        scale: f64,
    ) -> Result<Vec<SampledPoint>> {
        let url = self.compute_url()?;
        let body = self.compute_body(points, geo_core, scale);

        tracing::debug!("Request URL Earth Engine: {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.credentials.access_token)
            .json(&body)
            .send()
            .context("Failed to send sampling request to Earth Engine API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ElevJoinError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let content_bytes = response
            .bytes()
            .context("Failed to read response body")?
            .to_vec();
        let sampled = parse_compute_response(&content_bytes, &self.band)?;
        self.content = Some(content_bytes);
        Ok(sampled)
    }

    /// Get the content as a string (for debugging)
    pub fn content_as_string(&self) -> Result<String> {
        let content = self.content.as_ref().context("No content available")?;
        String::from_utf8(content.clone()).context("Content is not valid UTF-8")
    }
}

impl ElevationSampler for EeCollect {
    fn sample(
        &mut self,
        points: &[KeyedPoint],
        geo_core: &GeoCore,
        scale: f64,
    ) -> Result<Vec<SampledPoint>> {
        self.execute_sample(points, geo_core, scale)
    }
}

/// Parse a `value:compute` response holding a FeatureCollection under `result`
pub fn parse_compute_response(bytes: &[u8], band: &str) -> Result<Vec<SampledPoint>> {
    let mut root: Value = serde_json::from_slice(bytes)
        .map_err(|e| ElevJoinError::MalformedResponse(format!("not JSON: {}", e)))?;
    let result = root
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ElevJoinError::MalformedResponse("missing 'result'".to_string()))?;
    let collection: FeatureCollection = serde_json::from_value(result).map_err(|e| {
        ElevJoinError::MalformedResponse(format!("'result' is not a FeatureCollection: {}", e))
    })?;

    collection
        .features
        .iter()
        .enumerate()
        .map(|(idx, feature)| -> Result<SampledPoint> {
            let properties = feature.properties.as_ref();
            let point_id = properties
                .and_then(|p| p.get(POINT_ID_PROPERTY))
                .and_then(point_id_from_json)
                .ok_or_else(|| {
                    ElevJoinError::MalformedResponse(format!(
                        "feature {} has no usable '{}' property",
                        idx, POINT_ID_PROPERTY
                    ))
                })?;
            let elevation = properties
                .and_then(|p| p.get(band))
                .and_then(Value::as_f64);
            let coordinates = feature.geometry.as_ref().and_then(|g| match &g.value {
                GeoValue::Point(c) if c.len() >= 2 => Some((c[0], c[1])),
                _ => None,
            });
            Ok(SampledPoint {
                point_id,
                elevation,
                coordinates,
            })
        })
        .collect()
}

/// Earth Engine may hand integers back as floats
fn point_id_from_json(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}
