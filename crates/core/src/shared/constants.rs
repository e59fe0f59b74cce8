/// SeetaFace frontal cascade used by the default detector backend.
pub const CASCADE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const CASCADE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Detector multi-scale search grid.
pub const DEFAULT_SCALE_STEP: f64 = 1.1;
pub const DEFAULT_MIN_WINDOW_SCORE: f64 = 2.0;
pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;

/// Smallest accepted face, as a fraction of frame area (0.2%).
///
/// Permissive on purpose so wide and establishing shots still pass.
pub const DEFAULT_MIN_FACE_RATIO: f64 = 0.002;

/// Smallest accepted variance of the Laplacian over the main face.
pub const DEFAULT_MIN_BLUR_SCORE: f64 = 40.0;

/// Time offsets (seconds) tried around a requested timestamp, in order.
pub const SEARCH_OFFSETS: &[f64] = &[0.0, 0.5, 1.0, 1.5, 2.0, -0.5, -1.0];

pub const QUOTE_JPEG_QUALITY: u8 = 95;
pub const RANGE_JPEG_QUALITY: u8 = 100;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
