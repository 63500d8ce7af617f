use crate::{common::*, config::Config};
use sr_dl::{
    dataset::{write_pair_csv, PairRecord},
    indexer::load_image_list,
    ImagePair, ImageRecord, PairTransform,
};

/// The name of the index file written by [export_pairs].
pub const PAIRS_CSV_NAME: &str = "pairs.csv";

/// Construct the pair of every listed image and save them as PNG files.
///
/// Low-res and high-res images are written to `lr/` and `hr/` under the
/// output directory, and the pairs are indexed in a CSV file readable
/// by [PairedCsvDataset](sr_dl::dataset::PairedCsvDataset).
pub async fn export_pairs(config: Arc<Config>) -> Result<Vec<PairRecord>> {
    let transform = Arc::new(config.build_transform()?);
    let list_file = config.list_file();
    let images = load_image_list(&list_file)
        .with_context(|| format!("failed to load image list '{}'", list_file.display()))?;
    let num_images = config.max_samples.unwrap_or(images.len()).min(images.len());
    info!(
        "exporting {} {} pairs to '{}'",
        num_images,
        config.split,
        config.output_dir.display()
    );

    let csv_file = config.output_dir.join(PAIRS_CSV_NAME);
    let lr_dir = Arc::new(config.output_dir.join("lr"));
    let hr_dir = Arc::new(config.output_dir.join("hr"));
    for dir in [&*lr_dir, &*hr_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
    }

    let pairs: Vec<PairRecord> = stream::iter(images.into_iter().take(num_images).enumerate())
        .par_map(None, move |(index, image_file)| {
            let config = config.clone();
            let transform = transform.clone();
            let lr_dir = lr_dir.clone();
            let hr_dir = hr_dir.clone();

            move || {
                export_pair(&config, &transform, index, &image_file, &lr_dir, &hr_dir)
                    .with_context(|| format!("failed to export '{}'", image_file.display()))
            }
        })
        .filter_map(|result| async move {
            result
                .map_err(|err| warn!("skip a failed image: {:#}", err))
                .ok()
        })
        .collect()
        .await;

    write_pair_csv(&csv_file, &pairs)?;
    info!("wrote {} pairs to '{}'", pairs.len(), csv_file.display());

    Ok(pairs)
}

fn export_pair(
    config: &Config,
    transform: &PairTransform,
    index: usize,
    image_file: &Path,
    lr_dir: &Path,
    hr_dir: &Path,
) -> Result<PairRecord> {
    let mut rng = config.rng(index);
    let image = ImageRecord::new(image_file).into_pixels()?;
    let ImagePair { lr, hr, crop } = transform.crop_pair(&image, &mut rng)?;
    debug!("crop {} from '{}'", crop, image_file.display());

    let file_name = format!("{:06}.png", index);
    let low_res = lr_dir.join(&file_name);
    let high_res = hr_dir.join(&file_name);
    lr.save(&low_res)
        .with_context(|| format!("failed to save '{}'", low_res.display()))?;
    hr.save(&high_res)
        .with_context(|| format!("failed to save '{}'", high_res.display()))?;

    Ok(PairRecord { low_res, high_res })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use sr_dl::{
        dataset::{PairedCsvDataset, RandomAccessDataset},
        DataLists, ScalingFactor,
    };

    fn write_dataset(dir: &Path, sizes: &[(u32, u32)]) -> PathBuf {
        let image_dir = dir.join("images");
        let data_dir = dir.join("data");
        fs::create_dir_all(&image_dir).unwrap();

        for (index, &(width, height)) in sizes.iter().enumerate() {
            RgbImage::from_fn(width, height, |x, y| {
                Rgb([(x * 2 % 256) as u8, (y * 2 % 256) as u8, 100])
            })
            .save(image_dir.join(format!("{}.png", index)))
            .unwrap();
        }

        DataLists::create([&image_dir], [&image_dir], 64)
            .unwrap()
            .save(&data_dir)
            .unwrap();
        data_dir
    }

    fn config(dir: &Path, data_dir: PathBuf, split: &str) -> Config {
        let text = format!(
            r#"{{
                data_dir: {:?},
                split: "{}",
                transform: {{ crop_size: 64, scaling_factor: 4 }},
                output_dir: {:?},
                device: "cpu",
                seed: 1,
            }}"#,
            data_dir,
            split,
            dir.join("output"),
        );
        json5::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn export_train_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = write_dataset(dir.path(), &[(100, 80), (64, 64), (30, 30), (128, 90)]);
        let config = Arc::new(config(dir.path(), data_dir, "train"));

        let pairs = export_pairs(config.clone()).await.unwrap();
        assert_eq!(pairs.len(), 3);
        for pair in &pairs {
            assert_eq!(image::image_dimensions(&pair.low_res).unwrap(), (16, 16));
            assert_eq!(image::image_dimensions(&pair.high_res).unwrap(), (64, 64));
        }

        let csv_file = config.output_dir.join(PAIRS_CSV_NAME);
        let dataset =
            PairedCsvDataset::open(&csv_file, (16, 16), ScalingFactor::new(4).unwrap(), Device::Cpu)
                .unwrap();
        assert_eq!(dataset.pairs(), pairs.as_slice());
        let sample = dataset.nth(1).unwrap();
        assert_eq!(sample.hr.size(), vec![3, 64, 64]);
    }

    #[tokio::test]
    async fn max_samples_limits_the_export() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = write_dataset(dir.path(), &[(103, 98), (96, 96), (70, 90)]);
        let mut config = config(dir.path(), data_dir, "test");
        config.max_samples = Some(2);

        let pairs = export_pairs(Arc::new(config)).await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(image::image_dimensions(&pairs[0].low_res).unwrap(), (25, 24));
        assert_eq!(image::image_dimensions(&pairs[0].high_res).unwrap(), (100, 96));
    }

    #[tokio::test]
    async fn failed_images_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = write_dataset(dir.path(), &[(96, 96)]);
        let list_file = data_dir.join("test_images.json");
        let mut images = load_image_list(&list_file).unwrap();
        images.insert(0, dir.path().join("missing.png"));
        sr_dl::indexer::save_image_list(&list_file, &images).unwrap();

        let pairs = export_pairs(Arc::new(config(dir.path(), data_dir, "test")))
            .await
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].low_res.ends_with("lr/000001.png"));
    }
}
