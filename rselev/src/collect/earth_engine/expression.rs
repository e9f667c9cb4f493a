//! Earth Engine expression graphs, as accepted by the `value:compute` REST method.
//!
//! Only the handful of functions needed for point sampling are modelled, built as
//! `serde_json::Value`s in the encoding the official clients produce.

use serde_json::{json, Value};

use crate::collect::global_variables::POINT_ID_PROPERTY;
use crate::geo_core::{GeoCore, KeyedPoint};

fn constant(value: Value) -> Value {
    json!({ "constantValue": value })
}

fn invocation(function_name: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function_name,
            "arguments": arguments,
        }
    })
}

/// `ee.Image(asset_id)`
pub fn image_load(asset_id: &str) -> Value {
    invocation("Image.load", json!({ "id": constant(json!(asset_id)) }))
}

/// `ee.Geometry.Point([x, y], "EPSG:<code>")`
pub fn point_geometry(point: &KeyedPoint, geo_core: &GeoCore) -> Value {
    invocation(
        "GeometryConstructors.Point",
        json!({
            "coordinates": constant(json!([point.x(), point.y()])),
            "crs": invocation("Projection", json!({ "crs": constant(json!(geo_core.crs_string())) })),
        }),
    )
}

/// `ee.Feature(point, {point_id: id})`
pub fn keyed_feature(point: &KeyedPoint, geo_core: &GeoCore) -> Value {
    invocation(
        "Feature",
        json!({
            "geometry": point_geometry(point, geo_core),
            "metadata": constant(json!({ POINT_ID_PROPERTY: point.point_id })),
        }),
    )
}

/// `ee.FeatureCollection([...])`
pub fn feature_collection(points: &[KeyedPoint], geo_core: &GeoCore) -> Value {
    let features: Vec<Value> = points.iter().map(|p| keyed_feature(p, geo_core)).collect();
    invocation(
        "Collection",
        json!({ "features": { "arrayValue": { "values": features } } }),
    )
}

/// `ee.Image(asset_id).sampleRegions(collection, scale=scale, geometries=True)`,
/// wrapped as the `expression` of a compute request
pub fn sample_regions_expression(
    asset_id: &str,
    points: &[KeyedPoint],
    geo_core: &GeoCore,
    scale: f64,
) -> Value {
    let sample = invocation(
        "Image.sampleRegions",
        json!({
            "image": image_load(asset_id),
            "collection": feature_collection(points, geo_core),
            "scale": constant(json!(scale)),
            "geometries": constant(json!(true)),
        }),
    );
    json!({
        "result": "0",
        "values": { "0": sample },
    })
}
