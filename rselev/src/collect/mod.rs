pub mod earth_engine;
pub mod global_variables;

use anyhow::Result;

use crate::geo_core::{GeoCore, KeyedPoint};
use crate::geometric::join::SampledPoint;

/// A remote service returning raster values at point locations
pub trait ElevationSampler {
    /// Sample every point at `scale` metres in a single request.
    /// Each returned feature carries the `point_id` it was submitted with.
    fn sample(
        &mut self,
        points: &[KeyedPoint],
        geo_core: &GeoCore,
        scale: f64,
    ) -> Result<Vec<SampledPoint>>;
}
