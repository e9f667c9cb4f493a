/// Earth Engine catalog id of the USGS 3DEP 1/3 arc-second (~10 m) DEM
pub const DEM_ASSET_ID: &str = "USGS/3DEP/10m";

/// Band holding the terrain height in metres
pub const ELEVATION_BAND: &str = "elevation";

/// Nominal sampling scale in metres
pub const DEFAULT_SCALE: f64 = 10.0;

pub const EE_API_BASE: &str = "https://earthengine.googleapis.com";

/// Feature property carrying the input row index through the sampling call
pub const POINT_ID_PROPERTY: &str = "point_id";

/// Attribute name of the output float field
pub const ELEVATION_FIELD: &str = "Elevation";

pub const DEFAULT_OUTPUT_NAME: &str = "point_elev.shp";

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable checked first for an OAuth access token
pub const TOKEN_ENV_VAR: &str = "EARTHENGINE_TOKEN";

/// Environment variable naming the Cloud project used for billing the request
pub const PROJECT_ENV_VAR: &str = "EARTHENGINE_PROJECT";
