pub mod elevation;
pub mod join;
