use std::path::Path;

use serde::Serialize;

use speaker_frame_core::pipeline::frame_result::{FrameOutcome, FrameResult, RangeFrameResult, SkipReport};
use speaker_frame_core::pipeline::frame_selector::{SelectedCrop, Selection};
use speaker_frame_core::pipeline::inspect_image_use_case::InspectionReport;
use speaker_frame_core::shared::constants::{QUOTE_JPEG_QUALITY, RANGE_JPEG_QUALITY};
use speaker_frame_core::shared::face_box::FaceBox;
use speaker_frame_core::shared::timestamp::format_timestamp;
use speaker_frame_core::validation::domain::frame_quality::FrameQuality;
use speaker_frame_core::validation::domain::validation_result::RejectDetail;
use speaker_frame_core::video::domain::image_writer::ImageWriter;

type BoxedError = Box<dyn std::error::Error>;

/// Writes one JSON document to stdout. Logs go to stderr, so stdout stays
/// machine-readable.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Cannot serialize output: {e}"),
    }
}

#[derive(Serialize)]
pub struct FailureEnvelope {
    success: bool,
    error: String,
}

impl FailureEnvelope {
    pub fn new(error: String) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    success: bool,
    mode: &'static str,
    video_id: String,
    total_requested: usize,
    valid_count: usize,
    skip_count: usize,
    frames: Vec<FrameRecord>,
}

impl QuoteEnvelope {
    /// Persists every valid crop and builds the response.
    pub fn build(
        video_id: &str,
        results: &[FrameResult],
        output_dir: &Path,
        writer: &dyn ImageWriter,
    ) -> Result<Self, BoxedError> {
        let frames = results
            .iter()
            .map(|result| {
                let filename = result
                    .resolved_timestamp
                    .map(|t| format!("{video_id}_quote_{:04}.jpg", t.floor() as i64));
                FrameRecord::build(result, filename, output_dir, QUOTE_JPEG_QUALITY, writer)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let valid_count = frames.iter().filter(|f| f.is_valid()).count();
        Ok(Self {
            success: true,
            mode: "quote",
            video_id: video_id.to_string(),
            total_requested: results.len(),
            valid_count,
            skip_count: results.len() - valid_count,
            frames,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeEnvelope {
    success: bool,
    mode: &'static str,
    video_id: String,
    frames: Vec<RangeRecord>,
}

impl RangeEnvelope {
    pub fn build(
        video_id: &str,
        results: &[RangeFrameResult],
        output_dir: &Path,
        writer: &dyn ImageWriter,
    ) -> Result<Self, BoxedError> {
        let frames = results
            .iter()
            .map(|r| {
                let filename = format!(
                    "{video_id}_slide_{}_{:04}.jpg",
                    r.range.index,
                    r.median().floor() as i64
                );
                Ok(RangeRecord {
                    slide_index: r.range.index,
                    start_time: r.range.start,
                    end_time: r.range.end,
                    median_time: r.median(),
                    frame: FrameRecord::build(&r.result, Some(filename), output_dir, RANGE_JPEG_QUALITY, writer)?,
                })
            })
            .collect::<Result<Vec<_>, BoxedError>>()?;

        Ok(Self {
            success: true,
            mode: "range",
            video_id: video_id.to_string(),
            frames,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeRecord {
    slide_index: usize,
    start_time: f64,
    end_time: f64,
    median_time: f64,
    #[serde(flatten)]
    frame: FrameRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameRecord {
    timestamp_formatted: String,
    /// Resolved timestamp when valid, requested otherwise.
    timestamp: f64,
    original_timestamp: f64,
    status: &'static str,
    #[serde(flatten)]
    outcome: RecordOutcome,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RecordOutcome {
    Valid(ValidRecord),
    Skipped(SkippedRecord),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidRecord {
    filename: String,
    path: String,
    confidence: f64,
    face_box: FaceBoxRecord,
    blur_score: f64,
    mode: &'static str,
    offset: f64,
}

#[derive(Serialize)]
struct SkippedRecord {
    reason: &'static str,
    details: SkipDetails,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct SkipDetails {
    blur_score: Option<f64>,
    face_ratio: Option<f64>,
}

impl From<&SkipReport> for SkippedRecord {
    fn from(report: &SkipReport) -> Self {
        let details = match report.detail {
            Some(RejectDetail::Sharpness(s)) => SkipDetails {
                blur_score: Some(s),
                ..Default::default()
            },
            Some(RejectDetail::AreaRatio(r)) => SkipDetails {
                face_ratio: Some(r),
                ..Default::default()
            },
            None => SkipDetails::default(),
        };
        Self {
            reason: report.reason.as_str(),
            details,
        }
    }
}

#[derive(Serialize)]
struct FaceBoxRecord {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl From<FaceBox> for FaceBoxRecord {
    fn from(b: FaceBox) -> Self {
        Self {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

impl FrameRecord {
    fn build(
        result: &FrameResult,
        filename: Option<String>,
        output_dir: &Path,
        quality: u8,
        writer: &dyn ImageWriter,
    ) -> Result<Self, BoxedError> {
        let timestamp = result.resolved_timestamp.unwrap_or(result.requested_timestamp);
        let outcome = match (&result.outcome, filename) {
            (FrameOutcome::Valid { crop, offset }, Some(filename)) => {
                let path = output_dir.join(&filename);
                writer.write(&path, &crop.image, Some(quality))?;
                RecordOutcome::Valid(ValidRecord::new(crop, filename, &path, *offset))
            }
            (FrameOutcome::Valid { .. }, None) => {
                return Err("valid frame without an output file name".into());
            }
            (FrameOutcome::Skipped(report), _) => RecordOutcome::Skipped(report.into()),
        };

        Ok(Self {
            timestamp_formatted: format_timestamp(timestamp),
            timestamp,
            original_timestamp: result.requested_timestamp,
            status: result.status().as_str(),
            outcome,
        })
    }

    fn is_valid(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Valid(_))
    }
}

impl ValidRecord {
    fn new(crop: &SelectedCrop, filename: String, path: &Path, offset: f64) -> Self {
        Self {
            filename,
            path: path.display().to_string(),
            confidence: crop.acceptance.confidence,
            face_box: crop.acceptance.crop_region.into(),
            blur_score: crop.acceptance.sharpness,
            mode: crop.acceptance.mode.as_str(),
            offset,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectEnvelope {
    success: bool,
    mode: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    face_box: Option<FaceBoxRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    composition: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    quality: QualityRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QualityRecord {
    brightness: f64,
    contrast: f64,
    sharpness: f64,
    issues: Vec<&'static str>,
    is_quality_ok: bool,
}

impl From<&FrameQuality> for QualityRecord {
    fn from(q: &FrameQuality) -> Self {
        let flags = [
            (q.issues.too_dark, "TOO_DARK"),
            (q.issues.too_bright, "TOO_BRIGHT"),
            (q.issues.low_contrast, "LOW_CONTRAST"),
            (q.issues.blurry, "BLURRY"),
        ];
        Self {
            brightness: q.brightness,
            contrast: q.contrast,
            sharpness: q.sharpness,
            issues: flags.iter().filter(|(set, _)| *set).map(|&(_, name)| name).collect(),
            is_quality_ok: q.is_quality_ok,
        }
    }
}

impl InspectEnvelope {
    pub fn build(report: &InspectionReport, path: Option<&Path>) -> Self {
        let mut envelope = Self {
            success: true,
            mode: "inspect",
            status: "VALID",
            path: path.map(|p| p.display().to_string()),
            confidence: None,
            face_box: None,
            composition: None,
            reason: None,
            quality: (&report.quality).into(),
        };
        match &report.selection {
            Selection::Accepted(crop) => {
                envelope.confidence = Some(crop.acceptance.confidence);
                envelope.face_box = Some(crop.acceptance.crop_region.into());
                envelope.composition = Some(crop.acceptance.mode.as_str());
            }
            Selection::Rejected(rejection) => {
                envelope.status = "SKIP_FRAME";
                envelope.reason = Some(rejection.reason.as_str());
            }
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    use speaker_frame_core::pipeline::frame_result::{FrameRange, SkipReason};
    use speaker_frame_core::shared::frame::Frame;
    use speaker_frame_core::validation::domain::validation_result::{Acceptance, CompositionMode};

    #[derive(Default)]
    struct RecordingWriter {
        written: RefCell<Vec<(PathBuf, Option<u8>)>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&self, path: &Path, _frame: &Frame, quality: Option<u8>) -> Result<(), BoxedError> {
            self.written.borrow_mut().push((path.to_path_buf(), quality));
            Ok(())
        }
    }

    fn valid(requested: f64, offset: f64) -> FrameResult {
        FrameResult::valid(
            requested,
            offset,
            SelectedCrop {
                image: Frame::new(vec![0; 12], 2, 2, 3, 0),
                crop_region: FaceBox::new(0, 0, 2, 2),
                acceptance: Acceptance {
                    mode: CompositionMode::Single,
                    crop_region: FaceBox::new(10, 20, 30, 40),
                    sharpness: 180.0,
                    confidence: 0.9,
                    face_count: 1,
                    area_ratio: 0.05,
                },
            },
        )
    }

    fn blurry(requested: f64) -> FrameResult {
        FrameResult::skipped(
            requested,
            SkipReport {
                reason: SkipReason::FaceBlurry,
                detail: Some(RejectDetail::Sharpness(12.5)),
            },
        )
    }

    #[test]
    fn test_quote_envelope_shape() {
        let writer = RecordingWriter::default();
        let envelope =
            QuoteEnvelope::build("vid", &[valid(45.0, 0.5), blurry(120.0)], Path::new("out"), &writer).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["mode"], "quote");
        assert_eq!(json["videoId"], "vid");
        assert_eq!(json["totalRequested"], 2);
        assert_eq!(json["validCount"], 1);
        assert_eq!(json["skipCount"], 1);

        let first = &json["frames"][0];
        assert_eq!(first["status"], "VALID");
        assert_eq!(first["filename"], "vid_quote_0045.jpg");
        assert_eq!(first["timestamp"], 45.5);
        assert_eq!(first["originalTimestamp"], 45.0);
        assert_eq!(first["timestampFormatted"], "00:45");
        assert_eq!(first["faceBox"]["width"], 30);
        assert_eq!(first["mode"], "single");
        assert_eq!(first["blurScore"], 180.0);

        let second = &json["frames"][1];
        assert_eq!(second["status"], "SKIP_FRAME");
        assert_eq!(second["reason"], "FACE_BLURRY");
        assert_eq!(second["timestamp"], 120.0);
        assert_eq!(second["details"]["blurScore"], 12.5);
        assert!(second["details"]["faceRatio"].is_null());
        assert!(second.get("filename").is_none());

        let written = writer.written.borrow();
        assert_eq!(*written, vec![(PathBuf::from("out/vid_quote_0045.jpg"), Some(95))]);
    }

    #[test]
    fn test_range_envelope_shape() {
        let writer = RecordingWriter::default();
        let results = [
            RangeFrameResult {
                range: FrameRange {
                    index: 2,
                    start: 10.0,
                    end: 21.0,
                },
                result: valid(15.5, 0.0),
            },
            RangeFrameResult {
                range: FrameRange {
                    index: 3,
                    start: 30.0,
                    end: 40.0,
                },
                result: FrameResult::skipped(35.0, SkipReport::new(SkipReason::TimestampOutOfBounds)),
            },
        ];

        let envelope = RangeEnvelope::build("vid", &results, Path::new("out"), &writer).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["mode"], "range");
        let first = &json["frames"][0];
        assert_eq!(first["slideIndex"], 2);
        assert_eq!(first["medianTime"], 15.5);
        assert_eq!(first["filename"], "vid_slide_2_0015.jpg");
        let second = &json["frames"][1];
        assert_eq!(second["reason"], "TIMESTAMP_OUT_OF_BOUNDS");
        assert_eq!(second["startTime"], 30.0);

        assert_eq!(writer.written.borrow()[0].1, Some(100));
        assert_eq!(writer.written.borrow().len(), 1);
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(FailureEnvelope::new("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}
