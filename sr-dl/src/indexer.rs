//! Image list construction and persistence.

use crate::{common::*, record, transform::Split};

/// Collect the images that are large enough to be cropped for training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleIndexer {
    min_size: u32,
}

impl SampleIndexer {
    /// Create an indexer keeping images whose width and height are at least `min_size`.
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }

    pub fn min_size(&self) -> u32 {
        self.min_size
    }

    pub fn is_eligible(&self, path: impl AsRef<Path>) -> Result<bool> {
        let (width, height) = record::measure(path.as_ref())?;
        Ok(width >= self.min_size && height >= self.min_size)
    }

    /// List eligible images in a directory in file name order.
    ///
    /// Sub-directories are skipped. A file that cannot be measured is an error.
    pub fn index_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut paths = vec![];

        for entry in fs::read_dir(dir).map_err(Error::io(dir))? {
            let entry = entry.map_err(Error::io(dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(Error::io(&path))?;
            if file_type.is_dir() {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut eligible = Vec::with_capacity(paths.len());
        for path in paths {
            if self.is_eligible(&path)? {
                eligible.push(path);
            } else {
                debug!("exclude '{}' smaller than {}px", path.display(), self.min_size);
            }
        }

        info!(
            "indexed {} eligible images in '{}'",
            eligible.len(),
            dir.display()
        );
        Ok(eligible)
    }

    /// List eligible images in every directory, concatenated in directory order.
    pub fn index_dirs<P>(&self, dirs: impl IntoIterator<Item = P>) -> Result<Vec<PathBuf>>
    where
        P: AsRef<Path>,
    {
        let mut paths = vec![];
        for dir in dirs {
            paths.extend(self.index_dir(dir)?);
        }
        Ok(paths)
    }
}

/// The image lists of the train and test splits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataLists {
    pub train: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

impl DataLists {
    /// Index the train and test directories.
    pub fn create<P, Q>(
        train_dirs: impl IntoIterator<Item = P>,
        test_dirs: impl IntoIterator<Item = Q>,
        min_size: u32,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let indexer = SampleIndexer::new(min_size);
        let train = indexer.index_dirs(train_dirs)?;
        let test = indexer.index_dirs(test_dirs)?;
        Ok(Self { train, test })
    }

    pub fn get(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }

    /// Write `train_images.json` and `test_images.json` into `output_dir`.
    pub fn save(&self, output_dir: impl AsRef<Path>) -> Result<()> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir).map_err(Error::io(output_dir))?;
        for split in [Split::Train, Split::Test] {
            save_image_list(output_dir.join(split.list_file_name()), self.get(split))?;
        }
        Ok(())
    }

    /// Read both image lists from `data_dir`.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        Ok(Self {
            train: load_image_list(data_dir.join(Split::Train.list_file_name()))?,
            test: load_image_list(data_dir.join(Split::Test.list_file_name()))?,
        })
    }
}

/// Write an image list as a JSON array of paths.
pub fn save_image_list(path: impl AsRef<Path>, images: &[PathBuf]) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string(images).map_err(|source| Error::Json {
        path: path.to_owned(),
        source,
    })?;
    fs::write(path, text).map_err(Error::io(path))?;
    Ok(())
}

/// Read an image list written by [save_image_list].
pub fn load_image_list(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(Error::io(path))?;
    let images = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_owned(),
        source,
    })?;
    Ok(images)
}
