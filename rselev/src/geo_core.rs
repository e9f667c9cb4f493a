use geo::Point;
use serde::{Deserialize, Serialize};

/// Default EPSG code for input coordinates (WGS 84 longitude/latitude)
pub const DEFAULT_EPSG: u32 = 4326;

/// Coordinate reference system handling shared by the collectors and the stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCore {
    /// EPSG code
    pub epsg: u32,
}

impl GeoCore {
    pub fn new(epsg: u32) -> Self {
        GeoCore { epsg }
    }

    pub fn get_epsg(&self) -> u32 {
        self.epsg
    }

    pub fn set_epsg(&mut self, epsg: u32) {
        self.epsg = epsg;
    }

    /// CRS identifier in the "EPSG:<code>" form expected by Earth Engine
    pub fn crs_string(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl Default for GeoCore {
    fn default() -> Self {
        GeoCore::new(DEFAULT_EPSG)
    }
}

/// A point carrying the identifier used to join it with its sampled counterpart.
/// The identifier is the zero-based row index of the input table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedPoint {
    pub point_id: u64,
    pub point: Point<f64>,
}

impl KeyedPoint {
    pub fn new(point_id: u64, x: f64, y: f64) -> Self {
        KeyedPoint {
            point_id,
            point: Point::new(x, y),
        }
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box covering all points, `None` for an empty slice
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox::new(first.x(), first.y(), first.x(), first.y());
        for p in iter {
            bbox.min_x = bbox.min_x.min(p.x());
            bbox.min_y = bbox.min_y.min(p.y());
            bbox.max_x = bbox.max_x.max(p.x());
            bbox.max_y = bbox.max_y.max(p.y());
        }
        Some(bbox)
    }

    /// GeoJSON ordering: [min_x, min_y, max_x, max_y]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.min_x, self.min_y, self.max_x, self.max_y]
    }
}
