pub mod collect;
pub mod commons;
pub mod config;
pub mod errors;
pub mod geo_core;
pub mod geometric;
pub mod output;

pub use config::ElevationConfig;
pub use errors::ElevJoinError;
pub use geometric::elevation::{Elevation, JoinReport};
