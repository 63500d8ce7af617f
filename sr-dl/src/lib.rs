//! Data preparation building blocks for super-resolution training.
//!
//! The crate turns directories of photographs into aligned low-resolution and
//! high-resolution tensor pairs. Model definitions and the training loop live
//! outside of this crate and consume [SamplePair]s by index.

mod common;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod geometry;
pub mod indexer;
pub mod meter;
pub mod metric;
pub mod record;
pub mod tensor;
pub mod transform;

pub use encoding::PixelEncoding;
pub use error::{Error, Result};
pub use geometry::{CropGeometry, ScalingFactor};
pub use indexer::{DataLists, SampleIndexer};
pub use meter::AverageMeter;
pub use record::ImageRecord;
pub use transform::{ImagePair, PairTransform, PairTransformInit, SamplePair, Split};
