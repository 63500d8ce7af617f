use crate::common::*;

/// An image file whose pixels are decoded on first access.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    path: PathBuf,
    pixels: OnceCell<RgbImage>,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pixels: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the pixels are already decoded.
    pub fn is_loaded(&self) -> bool {
        self.pixels.get().is_some()
    }

    /// Measure the image from its header without decoding the pixels.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        if let Some(pixels) = self.pixels.get() {
            return Ok(pixels.dimensions());
        }
        measure(&self.path)
    }

    /// Decode the image as 8-bit RGB.
    pub fn load(&self) -> Result<&RgbImage> {
        self.pixels.get_or_try_init(|| decode(&self.path))
    }

    pub fn into_pixels(self) -> Result<RgbImage> {
        match self.pixels.into_inner() {
            Some(pixels) => Ok(pixels),
            None => decode(&self.path),
        }
    }
}

/// Decode an image file of any supported format as 8-bit RGB.
pub fn decode(path: &Path) -> Result<RgbImage> {
    let image = image::io::Reader::open(path)
        .map_err(Error::io(path))?
        .with_guessed_format()
        .map_err(Error::io(path))?
        .decode()
        .map_err(|source| Error::Decode {
            path: path.to_owned(),
            source,
        })?;
    Ok(image.to_rgb8())
}

/// Read the width and height of an image file from its header.
pub fn measure(path: &Path) -> Result<(u32, u32)> {
    let imagesize::ImageSize { width, height } =
        imagesize::size(path).map_err(|err| Error::Measure {
            path: path.to_owned(),
            reason: format!("{:?}", err),
        })?;
    Ok((width as u32, height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn lazy_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(30, 20, Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let record = ImageRecord::new(&path);
        assert!(!record.is_loaded());
        assert_eq!(record.dimensions().unwrap(), (30, 20));
        assert!(!record.is_loaded());

        let pixels = record.load().unwrap();
        assert_eq!(pixels.dimensions(), (30, 20));
        assert_eq!(pixels.get_pixel(4, 4), &Rgb([255, 0, 0]));
        assert!(record.is_loaded());
        assert!(record.clone().is_loaded());
    }

    #[test]
    fn missing_file_reports_path() {
        let record = ImageRecord::new("/nonexistent/image.png");
        match record.load() {
            Err(Error::Io { path, .. }) => assert_eq!(path, Path::new("/nonexistent/image.png")),
            other => panic!("unexpected result {:?}", other.map(|image| image.dimensions())),
        }
    }

    #[test]
    fn corrupt_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(
            ImageRecord::new(&path).load(),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(measure(&path), Err(Error::Measure { .. })));
    }
}
