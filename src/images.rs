//! Finding and decoding the images of an image batch.

use std::path::{Path, PathBuf};

use crate::charset::identifier;
use crate::error::{Error, Result};
use crate::raster::PixelGrid;

/// Extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// A decoded image and the array name it will be emitted under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedImage {
    /// Lower-cased file stem, made into an identifier.
    pub name: String,
    /// Where it came from.
    pub path: PathBuf,
    /// Pixels at native size, alpha dropped.
    pub grid: PixelGrid,
}

/// What a directory scan turned up.
#[derive(Debug, Default)]
pub struct Scan {
    /// Decoded images, sorted by file name.
    pub images: Vec<NamedImage>,
    /// Files that looked like images but didn't decode.
    pub skipped: Vec<Error>,
}

/// Whether the file name carries one of [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|v| v.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Decode one image file.
pub fn load(path: &Path) -> Result<NamedImage> {
    let decoded = image::open(path).map_err(|e| Error::UnsupportedImageFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let stem = path
        .file_stem()
        .map(|v| v.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    Ok(NamedImage {
        name: identifier(&stem),
        path: path.to_path_buf(),
        grid: PixelGrid::from(&decoded.to_rgb8()),
    })
}

/// Decode every image directly inside `dir`. Files that fail to decode are logged and
/// collected in [`Scan::skipped`]; only failing to list the directory is an error.
pub fn scan_dir(dir: &Path) -> Result<Scan> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut scan = Scan::default();
    for path in paths {
        match load(&path) {
            Ok(image) => {
                tracing::debug!(path = %path.display(), name = %image.name, "decoded image");
                scan.images.push(image);
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping image");
                scan.skipped.push(e);
            }
        }
    }
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(is_image(Path::new("Logo.PNG")));
        assert!(is_image(Path::new("a/b/photo.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("png")));
    }

    #[test]
    fn scan_decodes_good_files_and_skips_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = image::RgbImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.save(dir.path().join("Torino_Logo.png")).unwrap();
        std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();

        let scan = scan_dir(dir.path()).unwrap();
        assert_eq!(scan.images.len(), 1);
        let logo = &scan.images[0];
        assert_eq!(logo.name, "torino_logo");
        assert_eq!((logo.grid.width(), logo.grid.height()), (4, 2));
        assert_eq!(logo.grid.get(0, 0), [255, 0, 0]);

        assert_eq!(scan.skipped.len(), 1);
        assert!(matches!(scan.skipped[0], Error::UnsupportedImageFormat { .. }));
    }

    #[test]
    fn alpha_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba([10, 20, 30, 0]));
        let path = dir.path().join("ghost.png");
        img.save(&path).unwrap();
        assert_eq!(load(&path).unwrap().grid.get(0, 0), [10, 20, 30]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(matches!(
            scan_dir(Path::new("/nonexistent/glyphpack")),
            Err(Error::Io { .. })
        ));
    }
}
