use crate::{common::*, config::Config};
use image::imageops;
use sr_dl::{
    indexer::load_image_list, metric::psnr_y, tensor::image_to_tensor, AverageMeter, ImagePair,
    ImageRecord, PairTransform,
};

/// The name of the report written by [evaluate_bicubic].
pub const REPORT_NAME: &str = "bicubic_psnr.json";

/// The PSNR summary of the bicubic upscaling baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub scaling_factor: u32,
    pub psnr: AverageMeter,
    /// Per-image PSNR in list order.
    pub images: Vec<(PathBuf, f64)>,
}

/// Measure the luminance PSNR of bicubic upscaling on the listed images.
///
/// Each low-res image is upscaled back to its high-res size and compared
/// with the high-res image in the configured high-res encoding.
pub async fn evaluate_bicubic(config: Arc<Config>) -> Result<Report> {
    let transform = Arc::new(config.build_transform()?);
    let list_file = config.list_file();
    let images = load_image_list(&list_file)
        .with_context(|| format!("failed to load image list '{}'", list_file.display()))?;
    let num_images = config.max_samples.unwrap_or(images.len()).min(images.len());
    let scaling_factor = transform.scaling_factor().get();
    info!(
        "evaluating bicubic x{} on {} {} images",
        scaling_factor, num_images, config.split
    );

    let output_dir = config.output_dir.clone();

    let images: Vec<(PathBuf, f64)> = stream::iter(images.into_iter().take(num_images).enumerate())
        .par_map(None, move |(index, image_file)| {
            let config = config.clone();
            let transform = transform.clone();

            move || {
                bicubic_psnr(&config, &transform, index, &image_file)
                    .with_context(|| format!("failed to evaluate '{}'", image_file.display()))
                    .map(|psnr| (image_file, psnr))
            }
        })
        .filter_map(|result| async move {
            result
                .map_err(|err| warn!("skip a failed image: {:#}", err))
                .ok()
        })
        .collect()
        .await;

    let mut psnr = AverageMeter::new();
    images.iter().for_each(|&(_, value)| psnr.update(value));
    if psnr.is_accumulating() {
        info!("bicubic PSNR(Y) {:.4} dB over {} images", psnr.avg(), psnr.count());
    } else {
        warn!("no image was evaluated");
    }

    let report = Report {
        scaling_factor,
        psnr,
        images,
    };
    save_report(&output_dir, &report).await?;

    Ok(report)
}

fn bicubic_psnr(
    config: &Config,
    transform: &PairTransform,
    index: usize,
    image_file: &Path,
) -> Result<f64> {
    let mut rng = config.rng(index);
    let image = ImageRecord::new(image_file).into_pixels()?;
    let pair = transform.crop_pair(&image, &mut rng)?;
    let ImagePair { lr, hr, .. } = &pair;

    let encoding = transform.hr_encoding();
    let (hr_w, hr_h) = hr.dimensions();
    let upscaled = imageops::resize(lr, hr_w, hr_h, FilterType::CatmullRom);
    let prediction = image_to_tensor(&upscaled, encoding, transform.device())?;
    let target = transform.encode_pair(&pair)?.hr;
    let psnr = psnr_y(&prediction, &target, encoding)?;
    debug!("'{}': {:.4} dB", image_file.display(), psnr);

    Ok(psnr)
}

async fn save_report(output_dir: &Path, report: &Report) -> Result<()> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create directory '{}'", output_dir.display()))?;
    let report_file = output_dir.join(REPORT_NAME);
    let text = serde_json::to_string_pretty(report)?;
    tokio::fs::write(&report_file, text)
        .await
        .with_context(|| format!("failed to write '{}'", report_file.display()))?;
    info!("wrote report to '{}'", report_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use sr_dl::DataLists;

    fn smooth_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        })
    }

    #[tokio::test]
    async fn bicubic_report() {
        let dir = tempfile::tempdir().unwrap();
        let image_dir = dir.path().join("images");
        fs::create_dir_all(&image_dir).unwrap();
        for (index, &(width, height)) in [(150, 120), (123, 131)].iter().enumerate() {
            smooth_image(width, height)
                .save(image_dir.join(format!("{}.png", index)))
                .unwrap();
        }
        let data_dir = dir.path().join("data");
        DataLists::create([&image_dir], [&image_dir], 100)
            .unwrap()
            .save(&data_dir)
            .unwrap();

        let text = format!(
            r#"{{
                data_dir: {:?},
                transform: {{ crop_size: 96, scaling_factor: 2, hr_encoding: "[0, 1]" }},
                output_dir: {:?},
                device: "cpu",
            }}"#,
            data_dir,
            dir.path().join("output"),
        );
        let config: Config = json5::from_str(&text).unwrap();
        let report_file = config.output_dir.join(REPORT_NAME);

        let report = evaluate_bicubic(Arc::new(config)).await.unwrap();
        assert_eq!(report.scaling_factor, 2);
        assert_eq!(report.psnr.count(), 2);
        assert_eq!(report.images.len(), 2);
        assert_eq!(report.images[0].0, image_dir.join("0.png"));
        assert!(report.psnr.avg() > 25.0, "PSNR {} is too low", report.psnr.avg());

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_file).unwrap()).unwrap();
        assert_eq!(saved["psnr"]["count"], 2);
    }
}
