use super::{dataset_::ensure_index, RandomAccessDataset};
use crate::{
    common::*,
    geometry::{CropGeometry, ScalingFactor},
    record,
    tensor::IntoTensor as _,
    transform::SamplePair,
};
use image::imageops;

/// A row of the paired image CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairRecord {
    pub low_res: PathBuf,
    pub high_res: PathBuf,
}

/// The dataset of precomputed low-res/high-res image pairs listed in a CSV file.
///
/// Each access takes an aligned random crop of both images and resizes the
/// crops to a uniform size. Tensors are in unit `[0, 1]` encoding.
#[derive(Debug, Clone)]
pub struct PairedCsvDataset {
    pairs: Vec<PairRecord>,
    /// Low-res crop size in (height, width).
    crop_size: (u32, u32),
    scaling_factor: ScalingFactor,
    device: Device,
}

impl PairedCsvDataset {
    pub fn open(
        csv_file: impl AsRef<Path>,
        crop_size: (u32, u32),
        scaling_factor: ScalingFactor,
        device: Device,
    ) -> Result<Self> {
        let csv_file = csv_file.as_ref();
        let pairs = load_pair_csv(csv_file)?;
        info!(
            "loaded {} image pairs from '{}'",
            pairs.len(),
            csv_file.display()
        );
        Self::new(pairs, crop_size, scaling_factor, device)
    }

    pub fn new(
        pairs: Vec<PairRecord>,
        crop_size: (u32, u32),
        scaling_factor: ScalingFactor,
        device: Device,
    ) -> Result<Self> {
        let (crop_h, crop_w) = crop_size;
        if crop_h == 0 || crop_w == 0 {
            return Err(Error::InvalidCrop {
                crop: CropGeometry::new(0, 0, crop_w, crop_h),
                width: 0,
                height: 0,
            });
        }

        Ok(Self {
            pairs,
            crop_size,
            scaling_factor,
            device,
        })
    }

    pub fn pairs(&self) -> &[PairRecord] {
        &self.pairs
    }
}

impl RandomAccessDataset for PairedCsvDataset {
    fn num_records(&self) -> usize {
        self.pairs.len()
    }

    fn nth_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<SamplePair> {
        ensure_index(index, self.pairs.len())?;
        let PairRecord { low_res, high_res } = &self.pairs[index];
        let (crop_h, crop_w) = self.crop_size;
        let s = self.scaling_factor.get();

        let lr_image = record::decode(low_res)?;
        let hr_image = record::decode(high_res)?;
        let (lr_w, lr_h) = lr_image.dimensions();
        let (hr_w, hr_h) = hr_image.dimensions();

        // shrink the crop for images smaller than the crop size
        let lr_crop = CropGeometry::random(lr_w, lr_h, crop_w.min(lr_w), crop_h.min(lr_h), rng)?;
        let hr_crop = lr_crop.scale_up(self.scaling_factor);
        hr_crop.ensure_fits_within(hr_w, hr_h)?;

        let lr = imageops::crop_imm(
            &lr_image,
            lr_crop.left,
            lr_crop.top,
            lr_crop.width,
            lr_crop.height,
        )
        .to_image();
        let hr = imageops::crop_imm(
            &hr_image,
            hr_crop.left,
            hr_crop.top,
            hr_crop.width,
            hr_crop.height,
        )
        .to_image();

        let lr = if lr.dimensions() != (crop_w, crop_h) {
            imageops::resize(&lr, crop_w, crop_h, FilterType::Triangle)
        } else {
            lr
        };
        let hr = if hr.dimensions() != (crop_w * s, crop_h * s) {
            imageops::resize(&hr, crop_w * s, crop_h * s, FilterType::Triangle)
        } else {
            hr
        };

        Ok(SamplePair {
            lr: lr.into_unit_tensor(self.device),
            hr: hr.into_unit_tensor(self.device),
        })
    }
}

/// Read the pair list. Rows have no header and `#` starts a comment line.
pub fn load_pair_csv(csv_file: impl AsRef<Path>) -> Result<Vec<PairRecord>> {
    let csv_file = csv_file.as_ref();
    let csv_error = |source| Error::Csv {
        path: csv_file.to_owned(),
        source,
    };

    let pairs: Vec<PairRecord> = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .from_path(csv_file)
        .map_err(csv_error)?
        .deserialize()
        .collect::<Result<_, _>>()
        .map_err(csv_error)?;

    // check existence of image files
    for path in pairs.iter().flat_map(|pair| [&pair.low_res, &pair.high_res]) {
        if !path.is_file() {
            return Err(Error::Io {
                path: path.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "the image file does not exist"),
            });
        }
    }

    Ok(pairs)
}

/// Write the pair list in the format read by [load_pair_csv].
pub fn write_pair_csv(csv_file: impl AsRef<Path>, pairs: &[PairRecord]) -> Result<()> {
    let csv_file = csv_file.as_ref();
    let csv_error = |source| Error::Csv {
        path: csv_file.to_owned(),
        source,
    };

    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(csv_file)
        .map_err(csv_error)?;
    for pair in pairs {
        writer.serialize(pair).map_err(csv_error)?;
    }
    writer.flush().map_err(Error::io(csv_file))?;
    Ok(())
}

/// Pair the sorted file listings of a high-res and a low-res directory.
pub fn create_data_csv(
    hr_dir: impl AsRef<Path>,
    lr_dir: impl AsRef<Path>,
    csv_file: impl AsRef<Path>,
) -> Result<Vec<PairRecord>> {
    let hr_dir = hr_dir.as_ref();
    let lr_dir = lr_dir.as_ref();
    let hr_files = list_files(hr_dir)?;
    let lr_files = list_files(lr_dir)?;

    if hr_files.len() != lr_files.len() {
        return Err(Error::PairCountMismatch {
            hr_dir: hr_dir.to_owned(),
            lr_dir: lr_dir.to_owned(),
            hr_count: hr_files.len(),
            lr_count: lr_files.len(),
        });
    }

    let pairs: Vec<_> = hr_files
        .into_iter()
        .zip(lr_files)
        .map(|(high_res, low_res)| PairRecord { low_res, high_res })
        .collect();
    write_pair_csv(csv_file, &pairs)?;

    Ok(pairs)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir).map_err(Error::io(dir))? {
        let path = entry.map_err(Error::io(dir))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn write_image(path: &Path, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 64]))
            .save(path)
            .unwrap();
    }

    fn make_pairs(dir: &Path, count: usize, lr_size: (u32, u32), s: u32) -> (PathBuf, PathBuf) {
        let hr_dir = dir.join("hr");
        let lr_dir = dir.join("lr");
        fs::create_dir_all(&hr_dir).unwrap();
        fs::create_dir_all(&lr_dir).unwrap();
        let (w, h) = lr_size;
        for index in 0..count {
            write_image(&hr_dir.join(format!("{:04}.png", index)), w * s, h * s);
            write_image(&lr_dir.join(format!("{:04}x{}.png", index, s)), w, h);
        }
        (hr_dir, lr_dir)
    }

    #[test]
    fn create_and_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let (hr_dir, lr_dir) = make_pairs(dir.path(), 3, (20, 16), 2);
        let csv_file = dir.path().join("pairs.csv");

        let pairs = create_data_csv(&hr_dir, &lr_dir, &csv_file).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1].high_res, hr_dir.join("0001.png"));
        assert_eq!(pairs[1].low_res, lr_dir.join("0001x2.png"));

        let text = fs::read_to_string(&csv_file).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().ends_with("0000.png"));

        assert_eq!(load_pair_csv(&csv_file).unwrap(), pairs);
    }

    #[test]
    fn mismatched_directories() {
        let dir = tempfile::tempdir().unwrap();
        let (hr_dir, lr_dir) = make_pairs(dir.path(), 2, (8, 8), 2);
        write_image(&hr_dir.join("extra.png"), 16, 16);

        let err = create_data_csv(&hr_dir, &lr_dir, dir.path().join("pairs.csv")).unwrap_err();
        assert!(matches!(
            err,
            Error::PairCountMismatch {
                hr_count: 3,
                lr_count: 2,
                ..
            }
        ));
    }

    #[test]
    fn missing_image_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = dir.path().join("pairs.csv");
        let pairs = [PairRecord {
            low_res: dir.path().join("lr.png"),
            high_res: dir.path().join("hr.png"),
        }];
        write_pair_csv(&csv_file, &pairs).unwrap();

        match load_pair_csv(&csv_file) {
            Err(Error::Io { path, .. }) => assert_eq!(path, dir.path().join("lr.png")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn aligned_crops() {
        let dir = tempfile::tempdir().unwrap();
        let (hr_dir, lr_dir) = make_pairs(dir.path(), 2, (40, 30), 4);
        let csv_file = dir.path().join("pairs.csv");
        create_data_csv(&hr_dir, &lr_dir, &csv_file).unwrap();

        let factor = ScalingFactor::new(4).unwrap();
        let dataset = PairedCsvDataset::open(&csv_file, (16, 24), factor, Device::Cpu).unwrap();
        assert_eq!(dataset.num_records(), 2);

        let mut rng = StdRng::seed_from_u64(9);
        let SamplePair { lr, hr } = dataset.nth_with_rng(0, &mut rng).unwrap();
        assert_eq!(lr.size(), vec![3, 16, 24]);
        assert_eq!(hr.size(), vec![3, 64, 96]);

        assert!(matches!(
            dataset.nth(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn small_images_are_resized_to_the_crop_size() {
        let dir = tempfile::tempdir().unwrap();
        let (hr_dir, lr_dir) = make_pairs(dir.path(), 1, (10, 12), 2);
        let csv_file = dir.path().join("pairs.csv");
        create_data_csv(&hr_dir, &lr_dir, &csv_file).unwrap();

        let factor = ScalingFactor::new(2).unwrap();
        let dataset = PairedCsvDataset::open(&csv_file, (32, 32), factor, Device::Cpu).unwrap();
        let SamplePair { lr, hr } = dataset.nth(0).unwrap();
        assert_eq!(lr.size(), vec![3, 32, 32]);
        assert_eq!(hr.size(), vec![3, 64, 64]);
    }

    #[test]
    fn undersized_high_res_image() {
        let dir = tempfile::tempdir().unwrap();
        let lr_path = dir.path().join("lr.png");
        let hr_path = dir.path().join("hr.png");
        write_image(&lr_path, 16, 16);
        write_image(&hr_path, 12, 12);

        let pairs = vec![PairRecord {
            low_res: lr_path,
            high_res: hr_path,
        }];
        let factor = ScalingFactor::new(2).unwrap();
        let dataset = PairedCsvDataset::new(pairs, (8, 8), factor, Device::Cpu).unwrap();
        assert!(matches!(dataset.nth(0), Err(Error::InvalidCrop { .. })));
    }
}
