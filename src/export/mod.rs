pub mod campaign;
pub mod exporter;
pub mod host;
pub mod platform;
pub mod share;
pub mod stats;
