//! Image quality metrics.

use crate::{common::*, encoding::PixelEncoding};

/// The peak value of the luminance channel.
const PEAK: f64 = 255.0;

/// Compute the PSNR in decibels between two images on the luminance channel.
///
/// Both tensors are in the `encoding` pixel encoding. Identical images yield
/// positive infinity.
pub fn psnr_y(prediction: &Tensor, target: &Tensor, encoding: PixelEncoding) -> Result<f64> {
    if prediction.size() != target.size() {
        return Err(Error::InvalidShape {
            shape: prediction.size(),
            expect: "the same shape as the target",
        });
    }

    let prediction = encoding.convert_to(prediction, PixelEncoding::Luminance)?;
    let target = encoding.convert_to(target, PixelEncoding::Luminance)?;
    let mse = prediction
        .mse_loss(&target, Reduction::Mean)
        .double_value(&[]);

    Ok(10.0 * (PEAK * PEAK / mse).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn identical_images() {
        let image = Tensor::rand(&[3, 16, 16], FLOAT_CPU);
        let psnr = psnr_y(&image, &image, PixelEncoding::Unit).unwrap();
        assert!(psnr.is_infinite() && psnr > 0.0);
    }

    #[test]
    fn constant_offset() {
        let black = Tensor::zeros(&[3, 16, 16], FLOAT_CPU);
        let white = Tensor::ones(&[3, 16, 16], FLOAT_CPU);

        // the luminance of black and white differs by 219
        let expect = 10.0 * (255.0f64.powi(2) / 219.0f64.powi(2)).log10();
        let psnr = psnr_y(&black, &white, PixelEncoding::Unit).unwrap();
        assert_abs_diff_eq!(psnr, expect, epsilon = 1e-3);

        let psnr = psnr_y(&(black - 1.0), &white, PixelEncoding::Signed).unwrap();
        assert_abs_diff_eq!(psnr, expect, epsilon = 1e-3);
    }

    #[test]
    fn shape_mismatch() {
        let lhs = Tensor::zeros(&[3, 16, 16], FLOAT_CPU);
        let rhs = Tensor::zeros(&[3, 16, 20], FLOAT_CPU);
        assert!(matches!(
            psnr_y(&lhs, &rhs, PixelEncoding::Unit),
            Err(Error::InvalidShape { .. })
        ));
    }
}
