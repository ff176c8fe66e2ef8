use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, SoundjamError};

/// Animation frames stacked vertically in one image, each frame as tall as
/// the image is wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl SpriteSheet {
    /// Reads the image header at `path`. A missing or undecodable file is an
    /// error here rather than at draw time.
    pub fn load(path: &Path) -> Result<Self> {
        let (width, height) = image::image_dimensions(path)?;
        let sheet = Self {
            path: Some(path.to_path_buf()),
            width,
            height,
        };
        sheet.validate()?;
        tracing::debug!(?path, width, height, frames = sheet.frame_count(), "loaded sprite sheet");
        Ok(sheet)
    }

    /// Describes a sheet that is already in memory.
    pub fn from_dimensions(width: u32, height: u32) -> Result<Self> {
        let sheet = Self {
            path: None,
            width,
            height,
        };
        sheet.validate()?;
        Ok(sheet)
    }

    /// Edge length of one square frame.
    pub fn frame_size(&self) -> u32 {
        self.width
    }

    /// `floor(height / width)`.
    pub fn frame_count(&self) -> u32 {
        if self.width == 0 {
            0
        } else {
            self.height / self.width
        }
    }

    /// Vertical offset of `frame` inside the sheet.
    pub fn frame_offset(&self, frame: u32) -> u32 {
        frame.saturating_mul(self.frame_size())
    }

    fn validate(&self) -> Result<()> {
        if self.frame_count() == 0 {
            return Err(SoundjamError::InvalidSprite {
                path: self.path.clone().unwrap_or_default(),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgba};

    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        ImageBuffer::from_pixel(width, height, Rgba([0u8, 0, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn loads_frames_from_image_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "poof.png", 16, 84);

        let sheet = SpriteSheet::load(&path).unwrap();
        assert_eq!(sheet.frame_size(), 16);
        assert_eq!(sheet.frame_count(), 5);
        assert_eq!(sheet.frame_offset(3), 48);
    }

    #[test]
    fn loads_other_raster_formats_but_not_svg() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = dir.path().join("poof.jpg");
        ImageBuffer::from_pixel(8, 24, image::Rgb([200u8, 200, 200]))
            .save(&jpeg)
            .unwrap();
        assert_eq!(SpriteSheet::load(&jpeg).unwrap().frame_count(), 3);

        let svg = dir.path().join("poof.svg");
        std::fs::write(&svg, br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="24"/>"#).unwrap();
        assert!(matches!(SpriteSheet::load(&svg), Err(SoundjamError::Image(_))));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpriteSheet::load(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, SoundjamError::Image(_)));
    }

    #[test]
    fn garbage_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poof.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(SpriteSheet::load(&path).is_err());
    }

    #[test]
    fn rejects_sheets_without_a_full_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 32, 16);
        let err = SpriteSheet::load(&path).unwrap_err();
        assert!(err.to_string().contains("32x16"));

        assert!(SpriteSheet::from_dimensions(0, 10).is_err());
        assert_eq!(SpriteSheet::from_dimensions(10, 10).unwrap().frame_count(), 1);
    }
}
