use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single frame to an image file using the `image` crate.
///
/// JPEG paths honour the requested quality; other formats are chosen by
/// extension and ignore it.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        quality: Option<u8>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        match quality {
            Some(q) if is_jpeg(path) => {
                let mut out = BufWriter::new(File::create(path)?);
                JpegEncoder::new_with_quality(&mut out, q.clamp(1, 100)).encode_image(&img)?;
            }
            _ => img.save(path)?,
        }
        Ok(())
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.push(r);
            data.push(g);
            data.push(b);
        }
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_write_png_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &make_frame(50, 50, 50, 100, 200), None)
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!((img.width(), img.height()), (50, 50));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = Vec::new();
        for i in 0..(64 * 64) {
            data.extend_from_slice(&[(i * 7 % 256) as u8, (i * 13 % 256) as u8, (i % 256) as u8]);
        }
        let frame = Frame::new(data, 64, 64, 3, 0);

        let low = dir.path().join("low.jpg");
        let high = dir.path().join("high.jpg");
        let writer = ImageFileWriter::new();
        writer.write(&low, &frame, Some(30)).unwrap();
        writer.write(&high, &frame, Some(100)).unwrap();

        let size = |p: &Path| std::fs::metadata(p).unwrap().len();
        assert!(size(&high) > size(&low));
        assert_eq!(image::open(&high).unwrap().width(), 64);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.jpg");
        ImageFileWriter::new()
            .write(&path, &make_frame(10, 10, 1, 2, 3), Some(95))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_jpeg_extension_detection() {
        assert!(is_jpeg(Path::new("a.jpg")));
        assert!(is_jpeg(Path::new("a.JPEG")));
        assert!(!is_jpeg(Path::new("a.png")));
        assert!(!is_jpeg(Path::new("noext")));
    }
}
