use std::path::Path;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::video::domain::image_reader::ImageReader;

use super::ffmpeg_frame_source::extract_rgb_pixels;

/// Still-image decoding through ffmpeg's image demuxers.
///
/// Any pixel layout ffmpeg understands (gray, palette, RGBA, YUV JPEG) is
/// converted to packed RGB24.
#[derive(Default)]
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        let mut ictx = ffmpeg_next::format::input(path)?;
        let (stream_index, parameters) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or_else(|| format!("{} contains no image", path.display()))?;
            (stream.index(), stream.parameters())
        };
        let mut decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .video()?;

        let decoded = first_picture(&mut ictx, &mut decoder, stream_index)?
            .ok_or_else(|| format!("cannot decode image {}", path.display()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let mut rgb = Video::empty();
        scaling::Context::get(
            decoded.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )?
        .run(&decoded, &mut rgb)?;

        Ok(Frame::new(extract_rgb_pixels(&rgb, width, height), width, height, 3, 0))
    }
}

/// Feeds packets until the decoder yields a picture, draining it at the
/// end for codecs that hold the only frame back.
fn first_picture(
    ictx: &mut ffmpeg_next::format::context::Input,
    decoder: &mut ffmpeg_next::decoder::Video,
    stream_index: usize,
) -> Result<Option<Video>, ffmpeg_next::Error> {
    let mut picture = Video::empty();
    for (stream, packet) in ictx.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        if decoder.receive_frame(&mut picture).is_ok() {
            return Ok(Some(picture));
        }
    }

    let _ = decoder.send_eof();
    Ok(decoder.receive_frame(&mut picture).ok().map(|_| picture))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_png_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slide.png");
        image::RgbImage::from_pixel(100, 80, image::Rgb([50, 100, 200]))
            .save(&path)
            .unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!((frame.width(), frame.height(), frame.channels()), (100, 80, 3));
        assert_eq!(frame.index(), 0);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_grayscale_png_is_expanded_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(32, 16, image::Luma([90])).save(&path).unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data().len(), 32 * 16 * 3);
        assert!(frame.data()[..3].iter().all(|&v| v.abs_diff(90) <= 2));
    }

    #[test]
    fn test_reads_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.jpg");
        image::RgbImage::from_pixel(64, 48, image::Rgb([120, 120, 120]))
            .save(&path)
            .unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (64, 48));
        assert!(frame.data()[..3].iter().all(|&v| (110..=130).contains(&v)));
    }

    #[test]
    fn test_nonexistent_path_fails() {
        assert!(ImageFileReader::new()
            .read(Path::new("/nonexistent/test.png"))
            .is_err());
    }
}
