pub mod config;
pub mod constants;
pub mod geo;
pub mod projection;
pub mod scale;
pub mod transform;
