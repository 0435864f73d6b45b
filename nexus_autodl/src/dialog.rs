use {
    crate::{detector::Detection, template::ButtonRole},
    std::{cmp::Reverse, time::Instant},
    tracing::debug,
};

/// Where the scanner currently stands relative to a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Idle,
    /// An opening step was clicked; only its follow-up may be actioned
    /// until the dialog resolves.
    AwaitingSecondStep(ButtonRole),
}

/// Mutable scan-loop state. Advanced only through [`ScanState::commit`],
/// which callers invoke after a click dispatches successfully. A failed
/// click leaves the state untouched so the next cycle retries.
#[derive(Debug)]
pub struct ScanState {
    mode: ScanMode,
    last_action_at: Option<Instant>,
    clicks: u64,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            mode: ScanMode::Idle,
            last_action_at: None,
            clicks: 0,
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    pub fn last_action_at(&self) -> Option<Instant> {
        self.last_action_at
    }

    /// Picks the detection to click this cycle, if any, as an index into
    /// `detections`. Detections that are not actionable in the current mode
    /// are skipped. Candidates rank by confidence, then role priority, then
    /// template id.
    pub fn select_action(&self, detections: &[Detection]) -> Option<usize> {
        for detection in detections {
            if !self.is_actionable(detection.role) {
                debug!("ignoring {} while in {:?}", detection.role, self.mode);
            }
        }
        detections
            .iter()
            .enumerate()
            .filter(|(_, detection)| self.is_actionable(detection.role))
            .min_by_key(|(_, detection)| {
                (
                    Reverse(detection.match_count),
                    detection.role.priority(),
                    detection.template_id,
                )
            })
            .map(|(index, _)| index)
    }

    fn is_actionable(&self, role: ButtonRole) -> bool {
        match self.mode {
            // A follow-up step must never fire before its opening step.
            ScanMode::Idle => !role.is_follow_up_step(),
            ScanMode::AwaitingSecondStep(first) => Some(role) == first.confirmation_follow_up(),
        }
    }

    /// Records a successfully dispatched click on `role` and advances the
    /// dialog accordingly.
    pub fn commit(&mut self, role: ButtonRole, now: Instant) {
        self.clicks += 1;
        self.last_action_at = Some(now);
        self.mode = match self.mode {
            ScanMode::Idle if role.confirmation_follow_up().is_some() => {
                debug!("dialog opened by {}, awaiting follow-up", role);
                ScanMode::AwaitingSecondStep(role)
            }
            ScanMode::AwaitingSecondStep(first) if Some(role) == first.confirmation_follow_up() => {
                debug!("dialog resolved by {}", role);
                ScanMode::Idle
            }
            mode => mode,
        };
    }
}
