//! Circular progress dial.
//!
//! [`ProgressState`] holds the dial's properties and enforces their ranges at
//! assignment time. [`geometry::compute`] turns a state and the allocated
//! bounds into drawing primitives. [`CircularProgressBar`] ties the two
//! together the way a widget would: every property change notifies the
//! registered observers and queues a redraw.

pub mod geometry;

use std::fmt;

use crate::{color::Rgba, config::ProgressConfig};

pub use geometry::{ArcSweep, Bounds, DrawCommand, LineCap, ProgressGeometry};

const DEFAULT_CENTER_FILL: Rgba = Rgba::new(173.0 / 255.0, 173.0 / 255.0, 173.0 / 255.0, 1.0);
const DEFAULT_RADIUS_FILL: Rgba = Rgba::new(211.0 / 255.0, 211.0 / 255.0, 211.0 / 255.0, 1.0);
const DEFAULT_PROGRESS_FILL: Rgba = Rgba::new(74.0 / 255.0, 144.0 / 255.0, 217.0 / 255.0, 1.0);

/// Properties of a progress dial. Setters clamp instead of rejecting.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    percentage: f64,
    line_width: i32,
    line_cap: LineCap,
    center_fill_color: Rgba,
    radius_fill_color: Rgba,
    progress_fill_color: Rgba,
    center_filled: bool,
    radius_filled: bool,
    font: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            line_width: 1,
            line_cap: LineCap::Butt,
            center_fill_color: DEFAULT_CENTER_FILL,
            radius_fill_color: DEFAULT_RADIUS_FILL,
            progress_fill_color: DEFAULT_PROGRESS_FILL,
            center_filled: false,
            radius_filled: false,
            font: "Inter".to_string(),
        }
    }
}

impl ProgressState {
    /// Builds a state from config, skipping colours that fail to parse.
    pub fn from_config(config: &ProgressConfig) -> Self {
        let mut state = Self::default();
        state.set_line_width(config.line_width);
        state.set_line_cap(config.line_cap);
        state.set_center_filled(config.center_filled);
        state.set_radius_filled(config.radius_filled);
        state.set_font(config.font.clone());

        for (name, value, accepted) in [
            ("center", &config.center_fill_color, state.set_center_fill_color(&config.center_fill_color)),
            ("radius", &config.radius_fill_color, state.set_radius_fill_color(&config.radius_fill_color)),
            ("progress", &config.progress_fill_color, state.set_progress_fill_color(&config.progress_fill_color)),
        ] {
            if !accepted {
                tracing::warn!(name, value = %value, "ignoring invalid fill colour");
            }
        }

        state
    }

    /// Fraction complete in `[0.0, 1.0]`.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn set_percentage(&mut self, value: f64) {
        self.percentage = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    }

    pub fn line_width(&self) -> i32 {
        self.line_width
    }

    pub fn set_line_width(&mut self, value: i32) {
        self.line_width = value.max(0);
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
    }

    pub fn center_fill_color(&self) -> Rgba {
        self.center_fill_color
    }

    /// Returns false and keeps the previous colour when `value` does not parse.
    pub fn set_center_fill_color(&mut self, value: &str) -> bool {
        assign_color(&mut self.center_fill_color, value)
    }

    pub fn radius_fill_color(&self) -> Rgba {
        self.radius_fill_color
    }

    pub fn set_radius_fill_color(&mut self, value: &str) -> bool {
        assign_color(&mut self.radius_fill_color, value)
    }

    pub fn progress_fill_color(&self) -> Rgba {
        self.progress_fill_color
    }

    pub fn set_progress_fill_color(&mut self, value: &str) -> bool {
        assign_color(&mut self.progress_fill_color, value)
    }

    pub fn center_filled(&self) -> bool {
        self.center_filled
    }

    pub fn set_center_filled(&mut self, filled: bool) {
        self.center_filled = filled;
    }

    pub fn radius_filled(&self) -> bool {
        self.radius_filled
    }

    pub fn set_radius_filled(&mut self, filled: bool) {
        self.radius_filled = filled;
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.font = font.into();
    }
}

fn assign_color(slot: &mut Rgba, value: &str) -> bool {
    match value.parse() {
        Ok(color) => {
            *slot = color;
            true
        }
        Err(_) => false,
    }
}

/// Names a dial property in change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Percentage,
    LineWidth,
    LineCap,
    CenterFillColor,
    RadiusFillColor,
    ProgressFillColor,
    CenterFilled,
    RadiusFilled,
    Font,
}

type Observer = Box<dyn FnMut(Property)>;

/// Progress dial widget state with change notification.
pub struct CircularProgressBar {
    state: ProgressState,
    observers: Vec<Observer>,
    redraw_queued: bool,
}

impl Default for CircularProgressBar {
    fn default() -> Self {
        Self::new(ProgressState::default())
    }
}

impl CircularProgressBar {
    pub fn new(state: ProgressState) -> Self {
        Self {
            state,
            observers: Vec::new(),
            redraw_queued: true,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Registers a callback invoked after every property change.
    pub fn connect_notify(&mut self, observer: impl FnMut(Property) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Returns whether a redraw was requested since the last call and clears
    /// the request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_queued)
    }

    pub fn set_percentage(&mut self, value: f64) {
        self.state.set_percentage(value);
        self.notify(Property::Percentage);
    }

    pub fn set_line_width(&mut self, value: i32) {
        self.state.set_line_width(value);
        self.notify(Property::LineWidth);
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.set_line_cap(cap);
        self.notify(Property::LineCap);
    }

    /// Flips between butt and round caps.
    pub fn toggle_line_cap(&mut self) {
        let next = match self.state.line_cap() {
            LineCap::Round => LineCap::Butt,
            LineCap::Butt => LineCap::Round,
        };
        self.set_line_cap(next);
    }

    pub fn set_center_fill_color(&mut self, value: &str) -> bool {
        let accepted = self.state.set_center_fill_color(value);
        if accepted {
            self.notify(Property::CenterFillColor);
        }
        accepted
    }

    pub fn set_radius_fill_color(&mut self, value: &str) -> bool {
        let accepted = self.state.set_radius_fill_color(value);
        if accepted {
            self.notify(Property::RadiusFillColor);
        }
        accepted
    }

    pub fn set_progress_fill_color(&mut self, value: &str) -> bool {
        let accepted = self.state.set_progress_fill_color(value);
        if accepted {
            self.notify(Property::ProgressFillColor);
        }
        accepted
    }

    pub fn set_center_filled(&mut self, filled: bool) {
        self.state.set_center_filled(filled);
        self.notify(Property::CenterFilled);
    }

    pub fn set_radius_filled(&mut self, filled: bool) {
        self.state.set_radius_filled(filled);
        self.notify(Property::RadiusFilled);
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.state.set_font(font);
        self.notify(Property::Font);
    }

    /// Lays the dial out for `bounds`. A line width wider than the radius is
    /// written back into the state, which notifies like any other change.
    pub fn draw(&mut self, bounds: Bounds) -> ProgressGeometry {
        let geometry = geometry::compute(&self.state, bounds);
        if !geometry.is_empty() && geometry.line_width != self.state.line_width() {
            tracing::debug!(
                requested = self.state.line_width(),
                clamped = geometry.line_width,
                "line width exceeds radius"
            );
            self.set_line_width(geometry.line_width);
        }
        geometry
    }

    fn notify(&mut self, property: Property) {
        self.redraw_queued = true;
        for observer in &mut self.observers {
            observer(property);
        }
    }
}

impl fmt::Debug for CircularProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularProgressBar")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .field("redraw_queued", &self.redraw_queued)
            .finish()
    }
}
