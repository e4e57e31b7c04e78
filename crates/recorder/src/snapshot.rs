//! PNG output of a single rendered frame.
//!
//! Feature-gated behind `png` (default on) so GIF-only builds skip the PNG
//! codec.

use crate::error::RecordError;
use flowfield_core::FrameBuffer;
use std::path::Path;

/// Writes the current contents of `frame` as a PNG at `path`.
///
/// Returns `RecordError::TooLarge` if the dimensions overflow `u32`, or
/// `RecordError::Encode` on write failure.
pub fn write_png(frame: &FrameBuffer, path: &Path) -> Result<(), RecordError> {
    let too_large = || RecordError::TooLarge {
        width: frame.width(),
        height: frame.height(),
    };
    let w = u32::try_from(frame.width()).map_err(|_| too_large())?;
    let h = u32::try_from(frame.height()).map_err(|_| too_large())?;
    let img = image::RgbaImage::from_raw(w, h, frame.pixels().to_vec()).ok_or_else(too_large)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfield_core::Srgb;

    #[test]
    fn write_png_round_trip() {
        let frame = FrameBuffer::new(16, 8, Srgb::from_hex("#9a7197").unwrap()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&frame, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (16, 8));
        assert_eq!(img.get_pixel(15, 7).0, [0x9a, 0x71, 0x97, 255]);
    }

    #[test]
    fn write_png_to_missing_directory_fails() {
        let frame = FrameBuffer::new(2, 2, Srgb::BLACK).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(write_png(&frame, &path).is_err());
    }
}
