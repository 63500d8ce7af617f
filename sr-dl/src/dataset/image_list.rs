use super::{dataset_::ensure_index, RandomAccessDataset};
use crate::{
    common::*,
    indexer::load_image_list,
    record::ImageRecord,
    transform::{PairTransform, SamplePair},
};

/// The dataset built from an image list and a [PairTransform].
///
/// The pair is constructed from the source image on every access, so
/// training crops differ between epochs.
#[derive(Debug, Clone)]
pub struct ImageListDataset {
    images: Vec<PathBuf>,
    transform: PairTransform,
}

impl ImageListDataset {
    /// Load the image list of the transform's split from `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>, transform: PairTransform) -> Result<Self> {
        let list_file = data_dir
            .as_ref()
            .join(transform.split().list_file_name());
        let images = load_image_list(&list_file)?;
        info!(
            "loaded {} {} images from '{}'",
            images.len(),
            transform.split(),
            list_file.display()
        );
        Ok(Self::new(images, transform))
    }

    pub fn new(images: Vec<PathBuf>, transform: PairTransform) -> Self {
        Self { images, transform }
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn transform(&self) -> &PairTransform {
        &self.transform
    }

    pub fn record(&self, index: usize) -> Result<ImageRecord> {
        ensure_index(index, self.images.len())?;
        Ok(ImageRecord::new(&self.images[index]))
    }
}

impl RandomAccessDataset for ImageListDataset {
    fn num_records(&self) -> usize {
        self.images.len()
    }

    fn nth_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<SamplePair> {
        let record = self.record(index)?;
        let image = record.load()?;
        self.transform.forward(image, rng)
    }
}
