use crate::common::*;
use sr_dl::{PairTransform, PairTransformInit, PixelEncoding, ScalingFactor, Split};

/// Configuration of the `export-pairs` and `evaluate-bicubic` commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The directory containing `train_images.json` and `test_images.json`.
    pub data_dir: PathBuf,
    #[serde(default = "default_split")]
    pub split: Split,
    pub transform: TransformConfig,
    pub output_dir: PathBuf,
    /// The device where the image tensors are placed.
    #[serde(with = "tch_serde::serde_device")]
    pub device: Device,
    /// Seed of per-image random crops. Crops are not reproducible if unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Process at most this many images of the list.
    #[serde(default)]
    pub max_samples: Option<usize>,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    pub fn list_file(&self) -> PathBuf {
        self.data_dir.join(self.split.list_file_name())
    }

    pub fn build_transform(&self) -> Result<PairTransform> {
        let TransformConfig {
            crop_size,
            scaling_factor,
            lr_encoding,
            hr_encoding,
        } = self.transform;

        let transform = PairTransformInit {
            split: self.split,
            crop_size,
            scaling_factor,
            lr_encoding,
            hr_encoding,
        }
        .build(self.device)?;
        Ok(transform)
    }

    /// The random generator of the image at `index`.
    pub fn rng(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Pair construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// The side length of high-res training crops.
    pub crop_size: u32,
    pub scaling_factor: ScalingFactor,
    #[serde(default = "default_lr_encoding")]
    pub lr_encoding: PixelEncoding,
    #[serde(default = "default_hr_encoding")]
    pub hr_encoding: PixelEncoding,
}

fn default_split() -> Split {
    Split::Test
}

fn default_lr_encoding() -> PixelEncoding {
    PixelEncoding::ImagenetNorm
}

fn default_hr_encoding() -> PixelEncoding {
    PixelEncoding::Signed
}
