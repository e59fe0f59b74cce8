use std::path::Path;

use crate::video::domain::frame_source::{FrameSource, FrameSourceError, FrameSourceGuard};

use super::batch_logger::BatchLogger;
use super::frame_result::FrameResult;
use super::frame_selector::FrameSelector;
use super::temporal_search::TemporalSearch;

/// Resolves one speaker frame per requested timestamp.
///
/// The video is opened once per batch and closed on every exit path.
/// Only a failure to open it aborts the batch; every timestamp otherwise
/// yields exactly one result, in input order.
pub struct QuoteFramesUseCase {
    source: Box<dyn FrameSource>,
    selector: FrameSelector,
    search: TemporalSearch,
    logger: Box<dyn BatchLogger>,
}

impl QuoteFramesUseCase {
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
        timestamps: &[f64],
    ) -> Result<Vec<FrameResult>, FrameSourceError> {
        let mut source = FrameSourceGuard::new(self.source.as_mut());
        let metadata = source.open(video_path)?;
        let duration = metadata.duration_seconds();
        self.logger.info(&format!(
            "Opened {}: {}x{} @ {:.2} fps, {duration:.1}s",
            video_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps
        ));

        let total = timestamps.len();
        let mut results = Vec::with_capacity(total);
        for (i, &timestamp) in timestamps.iter().enumerate() {
            let result = self
                .search
                .find_frame(timestamp, &mut *source, duration, &mut self.selector);
            self.logger.record(&result);
            self.logger.progress(i + 1, total);
            results.push(result);
        }

        self.logger.summary();
        Ok(results)
    }
}
