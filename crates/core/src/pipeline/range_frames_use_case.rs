use std::path::Path;

use crate::video::domain::frame_source::{FrameSource, FrameSourceError, FrameSourceGuard};

use super::batch_logger::BatchLogger;
use super::frame_result::{FrameRange, FrameResult, RangeFrameResult, SkipReason, SkipReport};
use super::frame_selector::FrameSelector;
use super::temporal_search::TemporalSearch;

/// Resolves one slide frame per time range, searching around each
/// range's midpoint.
///
/// Midpoints past the end of the video are skipped without decoding.
/// When the exact midpoint cannot be decoded at all, the range is skipped
/// as `FRAME_READ_FAILED` rather than searched.
pub struct RangeFramesUseCase {
    source: Box<dyn FrameSource>,
    selector: FrameSelector,
    search: TemporalSearch,
    logger: Box<dyn BatchLogger>,
}

impl RangeFramesUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        selector: FrameSelector,
        search: TemporalSearch,
        logger: Box<dyn BatchLogger>,
    ) -> Self {
        Self {
            source,
            selector,
            search,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        video_path: &Path,
        ranges: &[FrameRange],
    ) -> Result<Vec<RangeFrameResult>, FrameSourceError> {
        let mut source = FrameSourceGuard::new(self.source.as_mut());
        let metadata = source.open(video_path)?;
        let duration = metadata.duration_seconds();
        self.logger.info(&format!(
            "Opened {}: {} ranges over {duration:.1}s",
            video_path.display(),
            ranges.len()
        ));

        let total = ranges.len();
        let mut results = Vec::with_capacity(total);
        for (i, range) in ranges.iter().enumerate() {
            let median = range.median();
            let result = if median > duration {
                log::debug!("Range {}: median {median:.2}s past end {duration:.2}s", range.index);
                FrameResult::skipped(median, SkipReport::new(SkipReason::TimestampOutOfBounds))
            } else {
                match source.read_at(median) {
                    Ok(exact) => self.search.find_frame_from(
                        median,
                        Some(exact),
                        &mut *source,
                        duration,
                        &mut self.selector,
                    ),
                    Err(e) => {
                        log::warn!("Range {}: cannot read {median:.2}s: {e}", range.index);
                        FrameResult::skipped(median, SkipReport::new(SkipReason::FrameReadFailed))
                    }
                }
            };

            self.logger.record(&result);
            self.logger.progress(i + 1, total);
            results.push(RangeFrameResult {
                range: *range,
                result,
            });
        }

        self.logger.summary();
        Ok(results)
    }
}
