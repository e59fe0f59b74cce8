use std::collections::HashMap;
use std::time::Instant;

use super::frame_result::{FrameResult, FrameStatus, SkipReason};

/// Observer for batch progress and per-target outcomes.
///
/// Keeps use cases independent of where progress ends up (log crate,
/// JSON envelope, nowhere).
pub trait BatchLogger: Send {
    /// A target has been processed (`current` of `total`, 1-based).
    fn progress(&mut self, current: usize, total: usize);

    fn info(&mut self, message: &str);

    /// Records the final result for one target.
    fn record(&mut self, result: &FrameResult);

    /// End-of-batch report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and library callers.
pub struct NullBatchLogger;

impl BatchLogger for NullBatchLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn info(&mut self, _message: &str) {}
    fn record(&mut self, _result: &FrameResult) {}
}

/// Forwards to the `log` facade and tallies outcomes for a summary line.
pub struct LogBatchLogger {
    start_time: Instant,
    valid: usize,
    skipped: HashMap<SkipReason, usize>,
}

impl LogBatchLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            valid: 0,
            skipped: HashMap::new(),
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.values().sum()
    }

    /// `None` until at least one result has been recorded.
    pub fn summary_string(&self) -> Option<String> {
        let skipped = self.skipped_count();
        if self.valid + skipped == 0 {
            return None;
        }

        let mut line = format!("{} valid, {skipped} skipped", self.valid);
        if skipped > 0 {
            let mut reasons: Vec<_> = self.skipped.iter().collect();
            reasons.sort_by_key(|(reason, _)| reason.as_str());
            let parts: Vec<String> = reasons
                .into_iter()
                .map(|(reason, n)| format!("{}: {n}", reason.as_str()))
                .collect();
            line.push_str(&format!(" ({})", parts.join(", ")));
        }
        line.push_str(&format!(
            " in {:.1}s",
            self.start_time.elapsed().as_secs_f64()
        ));
        Some(line)
    }
}

impl Default for LogBatchLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchLogger for LogBatchLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if total > 0 {
            log::info!("Processing: {current}/{total}");
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn record(&mut self, result: &FrameResult) {
        match result.status() {
            FrameStatus::Valid => {
                self.valid += 1;
                log::info!(
                    "{:.2}s -> {:.2}s",
                    result.requested_timestamp,
                    result.resolved_timestamp.unwrap_or(result.requested_timestamp)
                );
            }
            FrameStatus::SkipFrame => {
                let reason = result
                    .skip_report()
                    .map_or(SkipReason::Unknown, |r| r.reason);
                *self.skipped.entry(reason).or_default() += 1;
                log::info!(
                    "{:.2}s skipped: {}",
                    result.requested_timestamp,
                    reason.as_str()
                );
            }
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
