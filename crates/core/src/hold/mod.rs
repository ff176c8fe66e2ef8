use std::time::Duration;

use crate::{
    config::HoldConfig,
    timeline::{TimerId, TimerQueue},
};

/// How long a press must last before it counts as a hold.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(750);

/// What a button release turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Released before the threshold: an ordinary click.
    Click,
    /// The hold already fired (or there was no press); the click is swallowed.
    Suppressed,
}

/// Press-and-hold detector for a button.
///
/// A press arms a one-shot timer. Releasing while it is pending cancels it
/// and yields a click. If the timer fires first the button reports a hold
/// and the click that follows is suppressed.
#[derive(Debug, Clone)]
pub struct HoldButton {
    threshold: Duration,
    pending: Option<TimerId>,
}

impl Default for HoldButton {
    fn default() -> Self {
        Self::new(HOLD_THRESHOLD)
    }
}

impl HoldButton {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pending: None,
        }
    }

    pub fn from_config(config: &HoldConfig) -> Self {
        Self::new(config.threshold())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn press<T>(&mut self, timers: &mut TimerQueue<T>, now_micros: u64, payload: T) -> TimerId {
        if let Some(previous) = self.pending.take() {
            timers.remove(previous);
        }
        let id = timers.add_timeout(now_micros, self.threshold, payload);
        self.pending = Some(id);
        id
    }

    pub fn release<T>(&mut self, timers: &mut TimerQueue<T>) -> Release {
        match self.pending.take() {
            Some(id) => {
                timers.remove(id);
                Release::Click
            }
            None => Release::Suppressed,
        }
    }

    /// Timer callback; the hold is one-shot so the host should drop the timer.
    pub fn on_timeout(&mut self) {
        tracing::debug!(threshold_ms = self.threshold.as_millis() as u64, "button held");
        self.pending = None;
    }
}
