//! The paired low-res/high-res sample constructor.

use crate::{
    common::*,
    encoding::PixelEncoding,
    geometry::{CropGeometry, ScalingFactor},
    tensor::image_to_tensor,
};
use image::imageops;

/// The dataset split, which also selects the cropping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Random fixed-size crops.
    Train,
    /// The largest centered crop aligned to the scaling factor.
    Test,
}

impl Split {
    /// The file name of the image list of this split.
    pub fn list_file_name(&self) -> &'static str {
        match self {
            Self::Train => "train_images.json",
            Self::Test => "test_images.json",
        }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// The high-res crop and its downsampled counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePair {
    pub lr: RgbImage,
    pub hr: RgbImage,
    /// Where the high-res crop was taken in the source image.
    pub crop: CropGeometry,
}

/// The low-res and high-res tensors of one sample.
#[derive(Debug, TensorLike)]
pub struct SamplePair {
    pub lr: Tensor,
    pub hr: Tensor,
}

/// The [PairTransform] builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTransformInit {
    pub split: Split,
    /// The side length of high-res training crops. Ignored by the test split.
    pub crop_size: u32,
    pub scaling_factor: ScalingFactor,
    pub lr_encoding: PixelEncoding,
    pub hr_encoding: PixelEncoding,
}

impl PairTransformInit {
    pub fn build(self, device: Device) -> Result<PairTransform> {
        let Self {
            split,
            crop_size,
            scaling_factor,
            lr_encoding,
            hr_encoding,
        } = self;

        if split == Split::Train {
            if crop_size == 0 {
                return Err(Error::InvalidCrop {
                    crop: CropGeometry::new(0, 0, crop_size, crop_size),
                    width: 0,
                    height: 0,
                });
            }
            scaling_factor.ensure_divides(crop_size)?;
        }

        Ok(PairTransform {
            split,
            crop_size,
            scaling_factor,
            lr_encoding,
            hr_encoding,
            device,
        })
    }
}

/// Produce aligned low-res/high-res pairs from single images.
///
/// The transform holds no mutable state and can be shared among worker threads.
#[derive(Debug, Clone)]
pub struct PairTransform {
    split: Split,
    crop_size: u32,
    scaling_factor: ScalingFactor,
    lr_encoding: PixelEncoding,
    hr_encoding: PixelEncoding,
    device: Device,
}

impl PairTransform {
    pub fn split(&self) -> Split {
        self.split
    }

    pub fn scaling_factor(&self) -> ScalingFactor {
        self.scaling_factor
    }

    pub fn lr_encoding(&self) -> PixelEncoding {
        self.lr_encoding
    }

    pub fn hr_encoding(&self) -> PixelEncoding {
        self.hr_encoding
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Choose the high-res crop for an image of the given size.
    pub fn crop_geometry<R>(&self, width: u32, height: u32, rng: &mut R) -> Result<CropGeometry>
    where
        R: Rng + ?Sized,
    {
        match self.split {
            Split::Train => {
                CropGeometry::random(width, height, self.crop_size, self.crop_size, rng)
            }
            Split::Test => CropGeometry::center_aligned(width, height, self.scaling_factor),
        }
    }

    /// Crop the high-res image and downsample it with a bicubic filter.
    pub fn crop_pair<R>(&self, image: &RgbImage, rng: &mut R) -> Result<ImagePair>
    where
        R: Rng + ?Sized,
    {
        let (width, height) = image.dimensions();
        let crop = self.crop_geometry(width, height, rng)?;
        let s = self.scaling_factor.get();
        ensure_aligned(crop, self.scaling_factor)?;

        let hr = imageops::crop_imm(image, crop.left, crop.top, crop.width, crop.height).to_image();
        let lr = imageops::resize(&hr, crop.width / s, crop.height / s, FilterType::CatmullRom);

        assert!(
            hr.width() == lr.width() * s && hr.height() == lr.height() * s,
            "high-res size {:?} is not {} times the low-res size {:?}",
            hr.dimensions(),
            s,
            lr.dimensions()
        );

        Ok(ImagePair { lr, hr, crop })
    }

    /// Build the encoded tensor pair from an image.
    pub fn forward<R>(&self, image: &RgbImage, rng: &mut R) -> Result<SamplePair>
    where
        R: Rng + ?Sized,
    {
        let pair = self.crop_pair(image, rng)?;
        self.encode_pair(&pair)
    }

    /// Convert an image pair into tensors in the configured encodings.
    pub fn encode_pair(&self, pair: &ImagePair) -> Result<SamplePair> {
        let lr = image_to_tensor(&pair.lr, self.lr_encoding, self.device)?;
        let hr = image_to_tensor(&pair.hr, self.hr_encoding, self.device)?;
        Ok(SamplePair { lr, hr })
    }
}

fn ensure_aligned(crop: CropGeometry, factor: ScalingFactor) -> Result<()> {
    factor.ensure_divides(crop.width)?;
    factor.ensure_divides(crop.height)?;
    Ok(())
}
