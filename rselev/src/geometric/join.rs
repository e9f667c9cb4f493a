use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::ElevJoinError;
use crate::geo_core::KeyedPoint;

/// A feature returned by the sampling service, reduced to what the join needs
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPoint {
    pub point_id: u64,
    /// `None` when the band value is absent or null (masked pixel)
    pub elevation: Option<f64>,
    /// Geometry echoed by the service, if any
    pub coordinates: Option<(f64, f64)>,
}

/// What to do with submitted points that come back without an elevation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Abort the run, listing every missing point
    #[default]
    Fail,
    /// Leave those points out of the output
    Skip,
}

/// An input point with its joined elevation, ready to be written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationFeature {
    pub point: KeyedPoint,
    pub elevation: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOutcome {
    /// Joined features in input order
    pub features: Vec<ElevationFeature>,
    /// Ids left out under `MissingPolicy::Skip`
    pub skipped: Vec<u64>,
}

/// Join sampled features to the submitted points by `point_id`.
///
/// The response order is irrelevant. Duplicate or unknown ids in the response are errors,
/// submitted points without an elevation are handled according to `policy`.
pub fn join_by_point_id(
    points: &[KeyedPoint],
    sampled: &[SampledPoint],
    policy: MissingPolicy,
) -> Result<JoinOutcome> {
    let submitted: HashMap<u64, &KeyedPoint> = points.iter().map(|p| (p.point_id, p)).collect();

    let mut by_id: HashMap<u64, Option<f64>> = HashMap::with_capacity(sampled.len());
    for s in sampled {
        if !submitted.contains_key(&s.point_id) {
            return Err(ElevJoinError::UnexpectedPointId(s.point_id).into());
        }
        if by_id.insert(s.point_id, s.elevation).is_some() {
            return Err(ElevJoinError::DuplicatePointId(s.point_id).into());
        }
    }

    let mut outcome = JoinOutcome::default();
    for p in points {
        match by_id.get(&p.point_id).copied().flatten() {
            Some(elevation) => outcome.features.push(ElevationFeature {
                point: *p,
                elevation: elevation as f32,
            }),
            None => outcome.skipped.push(p.point_id),
        }
    }

    if !outcome.skipped.is_empty() && policy == MissingPolicy::Fail {
        return Err(ElevJoinError::MissingElevation {
            ids: outcome.skipped,
        }
        .into());
    }

    Ok(outcome)
}
