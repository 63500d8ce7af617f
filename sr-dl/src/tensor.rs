//! Conversions between decoded images and tensors.

use crate::{common::*, encoding::PixelEncoding};

pub trait IntoTensor {
    /// Convert into a `[3, H, W]` float tensor of unit `[0, 1]` values.
    fn into_unit_tensor(self, device: Device) -> Tensor;
}

impl IntoTensor for &RgbImage {
    fn into_unit_tensor(self, device: Device) -> Tensor {
        let (width, height) = self.dimensions();
        Tensor::of_slice(self.as_raw())
            .view([height as i64, width as i64, 3])
            .permute(&[2, 0, 1])
            .to_device(device)
            .to_kind(Kind::Float)
            / 255.0
    }
}

/// Convert an image into a tensor in the given pixel encoding.
pub fn image_to_tensor(image: &RgbImage, encoding: PixelEncoding, device: Device) -> Result<Tensor> {
    let unit = image.into_unit_tensor(device);
    encoding.encode(&unit)
}

/// Convert a `[3, H, W]` tensor in the given pixel encoding into an image.
///
/// Values are clamped to the valid range and rounded to the nearest level.
pub fn tensor_to_image(tensor: &Tensor, encoding: PixelEncoding) -> Result<RgbImage> {
    let (channels, height, width) = tensor.size3()?;
    if channels != 3 {
        return Err(Error::InvalidShape {
            shape: tensor.size(),
            expect: "[3, H, W]",
        });
    }

    let unit = encoding.decode(tensor)?;
    let pixels = (unit.clamp(0.0, 1.0) * 255.0)
        .round()
        .to_kind(Kind::Uint8)
        .permute(&[1, 2, 0])
        .contiguous()
        .to_device(Device::Cpu)
        .view([-1]);
    let bytes = Vec::<u8>::from(&pixels);

    RgbImage::from_raw(width as u32, height as u32, bytes).ok_or_else(|| Error::InvalidShape {
        shape: tensor.size(),
        expect: "a tensor matching the image buffer size",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn image_tensor_layout() {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(3, 1, Rgb([255, 0, 51]));

        let tensor = image.into_unit_tensor(Device::Cpu);
        assert_eq!(tensor.size(), vec![3, 2, 4]);
        assert_eq!(tensor.double_value(&[0, 1, 3]), 1.0);
        assert_eq!(tensor.double_value(&[1, 1, 3]), 0.0);
        assert!((tensor.double_value(&[2, 1, 3]) - 0.2).abs() < 1e-6);
        assert_eq!(tensor.double_value(&[0, 0, 0]), 0.0);
    }

    #[test]
    fn image_round_trip() {
        let image = RgbImage::from_fn(7, 5, |x, y| Rgb([(x * 30) as u8, (y * 50) as u8, 128]));

        for encoding in PixelEncoding::ALL.iter().copied().filter(PixelEncoding::is_reversible) {
            let tensor = image_to_tensor(&image, encoding, Device::Cpu).unwrap();
            let restored = tensor_to_image(&tensor, encoding).unwrap();
            assert_eq!(restored, image, "round trip through '{}' failed", encoding);
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let tensor = Tensor::of_slice(&[-0.5f32, 2.0, 0.5]).view([3, 1, 1]);
        let image = tensor_to_image(&tensor, PixelEncoding::Unit).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 255, 128]));
    }
}
