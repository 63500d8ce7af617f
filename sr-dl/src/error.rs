//! The error type of the crate.

use crate::{encoding::PixelEncoding, geometry::CropGeometry};
use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image '{}'", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to read the dimensions of image '{}': {reason}", path.display())]
    Measure { path: PathBuf, reason: String },
    #[error("malformed JSON file '{}'", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed CSV file '{}'", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("the crop {crop} exceeds the image bounds {width}x{height}")]
    InvalidCrop {
        crop: CropGeometry,
        width: u32,
        height: u32,
    },
    #[error("the size {size} is not a multiple of the scaling factor {scaling_factor}")]
    Misaligned { size: u32, scaling_factor: u32 },
    #[error("the scaling factor must be at least 2, but get {0}")]
    InvalidScalingFactor(u32),
    #[error("unsupported pixel encoding '{0}'")]
    UnsupportedEncoding(String),
    #[error("pixel encoding '{0}' cannot be used as a conversion source")]
    IrreversibleEncoding(PixelEncoding),
    #[error("invalid tensor shape {shape:?}, expect {expect}")]
    InvalidShape { shape: Vec<i64>, expect: &'static str },
    #[error("'{}' has {hr_count} high-res files but '{}' has {lr_count} low-res files", hr_dir.display(), lr_dir.display())]
    PairCountMismatch {
        hr_dir: PathBuf,
        lr_dir: PathBuf,
        hr_count: usize,
        lr_count: usize,
    },
    #[error("index {index} is out of range for a dataset of {len} records")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Tch(#[from] tch::TchError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
