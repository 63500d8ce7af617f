//! Crop rectangles and the integer scaling factor.

use crate::common::*;

/// The integer ratio between high-res and low-res image sizes.
///
/// The value is at least 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ScalingFactor(u32);

impl ScalingFactor {
    pub fn new(value: u32) -> Result<Self> {
        if value < 2 {
            return Err(Error::InvalidScalingFactor(value));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Check that `size` is an exact multiple of the factor.
    pub fn ensure_divides(&self, size: u32) -> Result<()> {
        if size % self.0 != 0 {
            return Err(Error::Misaligned {
                size,
                scaling_factor: self.0,
            });
        }
        Ok(())
    }
}

impl TryFrom<u32> for ScalingFactor {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScalingFactor> for u32 {
    fn from(factor: ScalingFactor) -> Self {
        factor.0
    }
}

impl Display for ScalingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

impl Serialize for ScalingFactor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScalingFactor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).map_err(D::Error::custom)
    }
}

/// A crop rectangle in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropGeometry {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropGeometry {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Check whether the rectangle is non-empty and lies in a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }

    pub fn ensure_fits_within(&self, width: u32, height: u32) -> Result<()> {
        if !self.fits_within(width, height) {
            return Err(Error::InvalidCrop {
                crop: *self,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Map every coordinate to the image space that is `factor` times larger.
    pub fn scale_up(&self, factor: ScalingFactor) -> Self {
        let s = factor.get();
        Self {
            left: self.left * s,
            top: self.top * s,
            width: self.width * s,
            height: self.height * s,
        }
    }

    /// Choose a `crop_w` x `crop_h` rectangle uniformly at random inside the image.
    pub fn random<R>(
        image_width: u32,
        image_height: u32,
        crop_w: u32,
        crop_h: u32,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let crop = Self::new(0, 0, crop_w, crop_h);
        crop.ensure_fits_within(image_width, image_height)?;

        let left = rng.gen_range(0..=(image_width - crop_w));
        let top = rng.gen_range(0..=(image_height - crop_h));
        Ok(Self::new(left, top, crop_w, crop_h))
    }

    /// The largest centered rectangle whose sides are multiples of the factor.
    ///
    /// The remainder is trimmed on both sides, `remainder / 2` on the top and
    /// left sides and the rest on the bottom and right sides.
    pub fn center_aligned(image_width: u32, image_height: u32, factor: ScalingFactor) -> Result<Self> {
        let s = factor.get();
        let x_rem = image_width % s;
        let y_rem = image_height % s;
        let crop = Self::new(x_rem / 2, y_rem / 2, image_width - x_rem, image_height - y_rem);
        crop.ensure_fits_within(image_width, image_height)?;
        Ok(crop)
    }
}

impl Display for CropGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.left, self.top
        )
    }
}
