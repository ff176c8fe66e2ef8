//! Time-driven sprite animation.
//!
//! [`AnimationClock`] maps elapsed monotonic time onto a frame index for a
//! fixed-length run. [`PoofAnimation`] drives one run of a sprite sheet from a
//! periodic timer and hides itself once the run is over.

use std::time::Duration;

use crate::{
    assets::SpriteSheet,
    config::AnimationConfig,
    timeline::{ControlFlow, TimerId, TimerQueue},
};

/// Length of one poof run in microseconds.
pub const RUN_LENGTH_MICROS: u64 = 300_000;
/// Redraw cadence while a run is active.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Result of sampling the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Still running; draw this frame.
    Show(u32),
    /// The run is over.
    Finished,
}

/// Maps elapsed time to a frame of a fixed-length run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationClock {
    frame_count: u32,
    run_length_micros: u64,
    start_time: u64,
    current_time: u64,
}

impl AnimationClock {
    pub fn new(frame_count: u32, run_length_micros: u64) -> Self {
        Self {
            frame_count,
            run_length_micros: run_length_micros.max(1),
            start_time: 0,
            current_time: 0,
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn run_length_micros(&self) -> u64 {
        self.run_length_micros
    }

    pub fn restart(&mut self, now_micros: u64) {
        self.start_time = now_micros;
        self.current_time = now_micros;
    }

    pub fn advance(&mut self, now_micros: u64) {
        self.current_time = now_micros.max(self.start_time);
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.current_time - self.start_time
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_micros() > self.run_length_micros
    }

    /// Fraction of the run completed, `0.0..=1.0` while running.
    pub fn progress(&self) -> f64 {
        self.elapsed_micros() as f64 / self.run_length_micros as f64
    }

    pub fn frame(&self) -> Frame {
        if self.is_finished() {
            Frame::Finished
        } else {
            Frame::Show(frame_index(self.frame_count, self.elapsed_micros(), self.run_length_micros))
        }
    }
}

/// `floor(frame_count * elapsed / run_length)`, capped to the last frame so
/// the `elapsed == run_length` boundary still names a slice of the sheet.
pub fn frame_index(frame_count: u32, elapsed_micros: u64, run_length_micros: u64) -> u32 {
    if frame_count == 0 {
        return 0;
    }
    let raw = u128::from(frame_count) * u128::from(elapsed_micros) / u128::from(run_length_micros.max(1));
    let last = u128::from(frame_count - 1);
    raw.min(last) as u32
}

/// Where to blit the sheet so the current frame lands in the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    pub frame: u32,
    /// Source y offset of the frame inside the sheet.
    pub source_y: u32,
    pub size: u32,
}

/// Fade-out puff played where a removed tile used to be.
#[derive(Debug, Clone)]
pub struct PoofAnimation {
    sheet: SpriteSheet,
    clock: AnimationClock,
    interval: Duration,
    timer: Option<TimerId>,
    visible: bool,
    redraw_queued: bool,
}

impl PoofAnimation {
    pub fn new(sheet: SpriteSheet) -> Self {
        Self::with_timing(sheet, FRAME_INTERVAL, RUN_LENGTH_MICROS)
    }

    pub fn from_config(sheet: SpriteSheet, config: &AnimationConfig) -> Self {
        Self::with_timing(sheet, config.tick(), config.run_length_micros())
    }

    pub fn with_timing(sheet: SpriteSheet, interval: Duration, run_length_micros: u64) -> Self {
        let clock = AnimationClock::new(sheet.frame_count(), run_length_micros);
        Self {
            sheet,
            clock,
            interval,
            timer: None,
            visible: false,
            redraw_queued: false,
        }
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Starts a run at `now`. A run already in flight has its timer cancelled
    /// before the start time is reset.
    pub fn show<T>(&mut self, timers: &mut TimerQueue<T>, now_micros: u64, payload: T) -> TimerId {
        if let Some(pending) = self.timer.take() {
            timers.remove(pending);
        }

        self.clock.restart(now_micros);
        self.visible = true;
        self.redraw_queued = true;

        let id = timers.add_timeout(now_micros, self.interval, payload);
        self.timer = Some(id);
        id
    }

    /// Timer callback. Queues a redraw while the run lasts, then hides the
    /// element and stops the timer.
    pub fn animate(&mut self, now_micros: u64) -> ControlFlow {
        self.clock.advance(now_micros);

        if !self.clock.is_finished() {
            self.redraw_queued = true;
            return ControlFlow::Continue;
        }

        tracing::trace!(elapsed = self.clock.elapsed_micros(), "poof finished");
        self.timer = None;
        self.visible = false;
        ControlFlow::Break
    }

    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_queued)
    }

    /// Sheet slice for the current frame, `None` once hidden.
    pub fn blit(&self) -> Option<Blit> {
        if !self.visible {
            return None;
        }
        match self.clock.frame() {
            Frame::Show(frame) => Some(Blit {
                frame,
                source_y: self.sheet.frame_offset(frame),
                size: self.sheet.frame_size(),
            }),
            Frame::Finished => None,
        }
    }
}
