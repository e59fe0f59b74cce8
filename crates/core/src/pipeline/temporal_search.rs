use crate::shared::constants::SEARCH_OFFSETS;
use crate::shared::frame::Frame;
use crate::validation::domain::validation_result::ValidationResult;
use crate::video::domain::frame_source::FrameSource;

use super::frame_result::{FrameResult, SkipReason, SkipReport};
use super::frame_selector::{FrameSelector, Selection};

/// Offsets (seconds) tried around a target, in order.
///
/// Exact moment first, then forward (speech usually continues after a
/// quote starts), then backward.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPolicy {
    pub offsets: Vec<f64>,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            offsets: SEARCH_OFFSETS.to_vec(),
        }
    }
}

/// One evaluated candidate, kept only for diagnostics.
#[derive(Debug)]
struct CandidateAttempt<'a> {
    offset: f64,
    timestamp: f64,
    outcome: &'a ValidationResult,
}

/// Finds a usable frame near a target timestamp.
///
/// Candidates outside `[0, duration]`, undecodable ones and detector
/// failures are skipped silently. Only the rejection at offset `0.0` is
/// kept as the skip reason; rejections at other offsets are discarded.
pub struct TemporalSearch {
    policy: SearchPolicy,
}

impl Default for TemporalSearch {
    fn default() -> Self {
        Self::new(SearchPolicy::default())
    }
}

impl TemporalSearch {
    pub fn new(policy: SearchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn find_frame(
        &self,
        target: f64,
        source: &mut dyn FrameSource,
        duration: f64,
        selector: &mut FrameSelector,
    ) -> FrameResult {
        self.find_frame_from(target, None, source, duration, selector)
    }

    /// Same as [`find_frame`](Self::find_frame), reusing `exact` as the
    /// offset-0 frame when the caller has already decoded it.
    pub fn find_frame_from(
        &self,
        target: f64,
        mut exact: Option<Frame>,
        source: &mut dyn FrameSource,
        duration: f64,
        selector: &mut FrameSelector,
    ) -> FrameResult {
        let mut best_fail: Option<SkipReport> = None;

        for &offset in &self.policy.offsets {
            let timestamp = target + offset;
            if !(0.0..=duration).contains(&timestamp) {
                log::debug!("Offset {offset:+.1}s: {timestamp:.2}s outside [0, {duration:.2}]");
                continue;
            }

            let pre_decoded = if offset == 0.0 { exact.take() } else { None };
            let frame = match pre_decoded {
                Some(frame) => frame,
                None => match source.read_at(timestamp) {
                    Ok(frame) => frame,
                    Err(e) => {
                        log::debug!("Offset {offset:+.1}s: {e}");
                        continue;
                    }
                },
            };

            let selection = match selector.select(&frame) {
                Ok(selection) => selection,
                Err(e) => {
                    log::warn!("Face detection failed at {timestamp:.2}s: {e}");
                    continue;
                }
            };

            let validation = selection.validation();
            log::debug!(
                "{:?}",
                CandidateAttempt {
                    offset,
                    timestamp,
                    outcome: &validation,
                }
            );

            match selection {
                Selection::Accepted(crop) => return FrameResult::valid(target, offset, crop),
                Selection::Rejected(rejection) => {
                    if offset == 0.0 {
                        best_fail = Some(rejection.into());
                    }
                }
            }
        }

        FrameResult::skipped(
            target,
            best_fail.unwrap_or_else(|| SkipReport::new(SkipReason::Unknown)),
        )
    }
}
