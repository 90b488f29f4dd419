/// Delay between automation actions when nothing else was chosen.
pub const DEFAULT_DELAY_SECS: f64 = 3.0;

/// Client view of the server-owned run. Never persisted; polls are the
/// authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobRunState {
    #[default]
    Idle,
    /// Start command issued, no answer yet.
    Starting,
    Running,
    /// Stop command issued; waiting for a poll to report the job finished.
    Stopping,
}

impl JobRunState {
    pub fn is_active(self) -> bool {
        !matches!(self, JobRunState::Idle)
    }
}

/// Which run controls are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub resume: bool,
    pub stop: bool,
}

impl Controls {
    pub fn for_state(state: JobRunState) -> Self {
        let active = state.is_active();
        Self {
            start: !active,
            pause: active,
            resume: active,
            stop: active,
        }
    }
}

/// Activation bookkeeping for the progress poller.
///
/// Each activation gets a fresh generation id; results tagged with any other
/// generation, or arriving while inactive, are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollerState {
    active: bool,
    generation: u64,
}

impl PollerState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn accepts(&self, generation: u64) -> bool {
        self.active && generation == self.generation
    }

    /// Returns the new generation, or `None` if already active.
    pub(crate) fn activate(&mut self) -> Option<u64> {
        if self.active {
            return None;
        }
        self.generation += 1;
        self.active = true;
        Some(self.generation)
    }

    /// Returns the generation that was stopped, or `None` if inactive.
    pub(crate) fn deactivate(&mut self) -> Option<u64> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.generation)
    }
}
