pub mod adjust;
pub mod config;
pub mod coupon;
pub mod engine;
pub mod error;
pub mod model;
pub mod persist;
pub mod poisson;
pub mod simulate;
pub mod validate;
pub mod weighting;
