//! Image decoding

use std::path::Path;

use super::AssetError;

/// Decoded RGBA8 image, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Single opaque white texel, bound when an object has no texture
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Decode a PNG file into RGBA8
pub fn decode_png(path: &Path) -> Result<TextureData, AssetError> {
    let resource = path.display().to_string();
    let image = image::open(path).map_err(|e| AssetError::load(&resource, e))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(AssetError::load(resource, "image has zero size"));
    }
    log::debug!("Decoded {resource} ({width}x{height})");
    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check.png");
        let img = image::RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
        img.save(&path).unwrap();

        let data = decode_png(&path).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.pixels.len(), 3 * 2 * 4);
        assert_eq!(data.bytes_per_row(), 12);
        // Pixel (2, 1): second row, third column
        let offset = (3 + 2) * 4;
        assert_eq!(&data.pixels[offset..offset + 4], &[2, 1, 7, 255]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        let err = decode_png(&path).unwrap_err();
        assert!(matches!(err, AssetError::AssetLoad { .. }));
        assert!(err.resource().ends_with("nope.png"));
    }

    #[test]
    fn test_shipped_assets_decode() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        for name in ["sky.png", "aircraft.png", "start.png", "clear.png"] {
            let data = decode_png(&dir.join(name)).unwrap();
            assert_eq!(data.pixels.len() as u32, data.bytes_per_row() * data.height);
        }
    }

    #[test]
    fn test_garbage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(decode_png(&path).is_err());
    }
}
