mod common;
pub mod config;
pub mod evaluate;
pub mod export;

pub use config::{Config, TransformConfig};
pub use evaluate::{evaluate_bicubic, Report};
pub use export::export_pairs;
