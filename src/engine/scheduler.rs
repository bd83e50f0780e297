//! Detection attempt gating and match/miss bookkeeping.
//!
//! The state machine is deliberately pure: it is fed monotonic milliseconds
//! and matcher outcomes, and never looks at a clock or an image itself.

use super::matcher::MatchScan;

/// Per-instance detection memory.
///
/// Conceptually the `{AwaitingDetection, Matched, Unmatched}` states,
/// collapsed into the `valid` flag plus the timestamp gate. Created invalid
/// with no attempt on record, so the very first frame is always due.
#[derive(Debug, Clone, Default)]
pub struct DetectionState {
    last_attempt_ms: Option<u64>,
    last_x: i32,
    last_y: i32,
    last_score: f32,
    valid: bool,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new search is due when gating is disabled, when no attempt has run
    /// yet, or when the configured interval has elapsed (inclusive).
    pub fn is_due(&self, now_ms: u64, interval_ms: u32) -> bool {
        if interval_ms == 0 {
            return true;
        }
        match self.last_attempt_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(interval_ms),
        }
    }

    /// Fold one matcher run into the state.
    ///
    /// The score is recorded even on a miss so near-misses stay observable;
    /// a failed-closed scan records 0.0. A miss clears validity only when
    /// `only_when_matched` is set; otherwise the last hit's location persists
    /// until a future success or a configuration reset. The attempt timestamp
    /// advances unconditionally.
    pub fn record_attempt(
        &mut self,
        now_ms: u64,
        scan: Option<MatchScan>,
        threshold: f32,
        only_when_matched: bool,
    ) {
        match scan {
            Some(scan) if scan.score >= threshold => {
                self.last_x = scan.x as i32;
                self.last_y = scan.y as i32;
                self.last_score = scan.score;
                self.valid = true;
            }
            Some(scan) => {
                self.last_score = scan.score;
                if only_when_matched {
                    self.valid = false;
                }
            }
            None => {
                self.last_score = 0.0;
                if only_when_matched {
                    self.valid = false;
                }
            }
        }
        self.last_attempt_ms = Some(now_ms);
    }

    /// The location to draw at, while the last result is still considered
    /// valid.
    pub fn draw_position(&self) -> Option<(i32, i32)> {
        self.valid.then_some((self.last_x, self.last_y))
    }

    /// Score of the most recent attempt, hit or miss.
    pub fn last_score(&self) -> f32 {
        self.last_score
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Force re-detection before the next draw. Called on configuration
    /// replacement; the timestamp gate is left untouched.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}
