use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Playable length in seconds, `total_frames / fps` (0 when fps is unknown).
    pub fn duration_seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }

    /// Frame index shown at `timestamp_seconds` (truncating).
    pub fn frame_index_at(&self, timestamp_seconds: f64) -> usize {
        if self.fps <= 0.0 || timestamp_seconds <= 0.0 {
            return 0;
        }
        (timestamp_seconds * self.fps) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metadata(fps: f64, total_frames: usize) -> VideoMetadata {
        VideoMetadata {
            width: 1920,
            height: 1080,
            fps,
            total_frames,
            codec: "h264".to_string(),
            source_path: Some(PathBuf::from("/tmp/test.mp4")),
        }
    }

    #[test]
    fn test_duration_from_frame_count() {
        assert_relative_eq!(metadata(30.0, 6000).duration_seconds(), 200.0);
    }

    #[test]
    fn test_duration_zero_without_fps() {
        assert_relative_eq!(metadata(0.0, 100).duration_seconds(), 0.0);
    }

    #[test]
    fn test_frame_index_truncates() {
        let meta = metadata(29.97, 6000);
        assert_eq!(meta.frame_index_at(45.5), 1363);
        assert_eq!(meta.frame_index_at(0.0), 0);
        assert_eq!(meta.frame_index_at(-1.0), 0);
    }

    #[test]
    fn test_clone_is_equal() {
        let meta = metadata(24.0, 100);
        assert_eq!(meta.clone(), meta);
    }
}
