//! Pixel value encodings and conversions among them.
//!
//! Every conversion decodes the source into the unit `[0, 1]` range first and
//! then encodes the unit values into the target. Tensors are either a single
//! image `[3, H, W]` or a batch `[N, 3, H, W]`.

use crate::common::*;

/// Per-channel mean of the ImageNet training set.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation of the ImageNet training set.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// RGB to luma weights applied on `[0, 255]` values.
pub const RGB_TO_Y_WEIGHTS: [f32; 3] = [65.481, 128.553, 24.966];

/// Number of pixels cropped from every side before computing luminance.
pub const LUMINANCE_BORDER: i64 = 4;

/// The pixel value encoding of an image tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelEncoding {
    /// Values in `[0, 255]`.
    #[serde(rename = "[0, 255]")]
    Raw255,
    /// Values in `[0, 1]`.
    #[serde(rename = "[0, 1]")]
    Unit,
    /// Values in `[-1, 1]`.
    #[serde(rename = "[-1, 1]")]
    Signed,
    /// Unit values standardized by the ImageNet mean and standard deviation.
    #[serde(rename = "imagenet-norm")]
    ImagenetNorm,
    /// The Y channel of YCbCr with the image border cropped.
    ///
    /// Only valid as a conversion target.
    #[serde(rename = "y-channel")]
    Luminance,
}

impl PixelEncoding {
    pub const ALL: [PixelEncoding; 5] = [
        Self::Raw255,
        Self::Unit,
        Self::Signed,
        Self::ImagenetNorm,
        Self::Luminance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw255 => "[0, 255]",
            Self::Unit => "[0, 1]",
            Self::Signed => "[-1, 1]",
            Self::ImagenetNorm => "imagenet-norm",
            Self::Luminance => "y-channel",
        }
    }

    /// Whether values in this encoding can be decoded back to unit RGB values.
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Luminance)
    }

    /// Convert `value` from this encoding to `target`.
    pub fn convert_to(&self, value: &Tensor, target: PixelEncoding) -> Result<Tensor> {
        convert(value, *self, target)
    }

    /// Decode values in this encoding into unit `[0, 1]` values.
    pub fn decode(&self, value: &Tensor) -> Result<Tensor> {
        let unit = match self {
            Self::Raw255 => value.to_kind(Kind::Float) / 255.0,
            Self::Unit => value.to_kind(Kind::Float),
            Self::Signed => (value.to_kind(Kind::Float) + 1.0) / 2.0,
            Self::ImagenetNorm => {
                let (mean, std) = imagenet_stats(value)?;
                value.to_kind(Kind::Float) * std + mean
            }
            Self::Luminance => return Err(Error::IrreversibleEncoding(*self)),
        };
        Ok(unit)
    }

    /// Encode unit `[0, 1]` values into this encoding.
    pub fn encode(&self, unit: &Tensor) -> Result<Tensor> {
        let value = match self {
            Self::Raw255 => unit * 255.0,
            Self::Unit => unit.shallow_clone(),
            Self::Signed => unit * 2.0 - 1.0,
            Self::ImagenetNorm => {
                let (mean, std) = imagenet_stats(unit)?;
                (unit - mean) / std
            }
            Self::Luminance => luminance(unit)?,
        };
        Ok(value)
    }
}

impl Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelEncoding {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|encoding| encoding.as_str() == text.trim())
            .ok_or_else(|| Error::UnsupportedEncoding(text.to_owned()))
    }
}

/// Convert a tensor from the `source` encoding to the `target` encoding.
pub fn convert(value: &Tensor, source: PixelEncoding, target: PixelEncoding) -> Result<Tensor> {
    let unit = source.decode(value)?;
    target.encode(&unit)
}

/// Build mean and std tensors that broadcast over the channel dimension of `value`.
fn imagenet_stats(value: &Tensor) -> Result<(Tensor, Tensor)> {
    let shape: &[i64] = if ensure_rgb(value)?.len() == 3 {
        &[3, 1, 1]
    } else {
        &[1, 3, 1, 1]
    };
    let device = value.device();
    let mean = Tensor::of_slice(&IMAGENET_MEAN).view(shape).to_device(device);
    let std = Tensor::of_slice(&IMAGENET_STD).view(shape).to_device(device);
    Ok((mean, std))
}

/// Compute the Y channel of unit RGB values after cropping the border.
fn luminance(unit: &Tensor) -> Result<Tensor> {
    let shape = ensure_rgb(unit)?;
    let batched = match shape.len() {
        3 => unit.unsqueeze(0),
        _ => unit.shallow_clone(),
    };
    let (_, _, height, width) = batched.size4()?;
    let border = LUMINANCE_BORDER;
    if height <= border * 2 || width <= border * 2 {
        return Err(Error::InvalidShape {
            shape,
            expect: "height and width larger than twice the luminance border",
        });
    }

    let weights = Tensor::of_slice(&RGB_TO_Y_WEIGHTS).to_device(unit.device());
    let y = (batched * 255.0)
        .permute(&[0, 2, 3, 1])
        .narrow(1, border, height - border * 2)
        .narrow(2, border, width - border * 2)
        .matmul(&weights)
        / 255.0
        + 16.0;

    let y = match shape.len() {
        3 => y.select(0, 0),
        _ => y,
    };
    Ok(y)
}

fn ensure_rgb(value: &Tensor) -> Result<Vec<i64>> {
    let shape = value.size();
    let is_rgb = match shape.len() {
        3 => shape[0] == 3,
        4 => shape[1] == 3,
        _ => false,
    };
    if !is_rgb {
        return Err(Error::InvalidShape {
            shape,
            expect: "[3, H, W] or [N, 3, H, W]",
        });
    }
    Ok(shape)
}
