use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

use super::ProgressState;

/// Smallest diameter the dial asks its host for.
pub const MIN_DIAMETER: i32 = 80;
/// Label drawn underneath the numeric value.
pub const UNITS_LABEL: &str = "PERCENT";

const VALUE_FONT_SIZE: u32 = 24;
const UNITS_FONT_SIZE: u32 = 8;
const VALUE_OFFSET_Y: f64 = -27.0;
const UNITS_OFFSET_Y: f64 = 13.0;

/// Stroke end style for the ring and the progress arc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Allocated size of the drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// `floor(min(width, height) / 2) - 1`; negative for degenerate bounds.
    pub fn radius(&self) -> i32 {
        self.width.min(self.height).div_euclid(2) - 1
    }

    pub fn diameter(&self) -> i32 {
        2 * self.radius()
    }

    /// Minimum and natural edge length requested from the host layout.
    pub fn preferred_size(&self) -> (i32, i32) {
        (MIN_DIAMETER, self.diameter().max(MIN_DIAMETER))
    }
}

/// Angular span of the progress arc in radians, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSweep {
    pub start: f64,
    pub end: f64,
}

impl ArcSweep {
    pub fn for_percentage(percentage: f64) -> Self {
        Self {
            start: 1.5 * PI,
            end: (1.5 + 2.0 * percentage) * PI,
        }
    }

    pub fn start_degrees(&self) -> f64 {
        self.start.to_degrees()
    }

    pub fn end_degrees(&self) -> f64 {
        self.end.to_degrees()
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// One immediate-mode drawing primitive, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        line_width: i32,
        cap: LineCap,
        color: Rgba,
    },
    /// Wedge from the centre out to `radius` covering `sweep`.
    FillPie {
        cx: f64,
        cy: f64,
        radius: f64,
        sweep: ArcSweep,
        color: Rgba,
    },
    StrokeArc {
        cx: f64,
        cy: f64,
        radius: f64,
        sweep: ArcSweep,
        line_width: i32,
        cap: LineCap,
        color: Rgba,
    },
    /// Text horizontally centred on `x` with its top edge at `y`.
    Text {
        x: f64,
        y: f64,
        text: String,
        font: String,
        size: u32,
    },
}

/// Everything needed to paint one frame of the dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressGeometry {
    pub bounds: Bounds,
    pub center: (f64, f64),
    pub radius: i32,
    /// Radius the strokes are centred on.
    pub delta: f64,
    /// Line width after clamping it to the radius.
    pub line_width: i32,
    pub sweep: Option<ArcSweep>,
    pub commands: Vec<DrawCommand>,
}

impl ProgressGeometry {
    /// True when the bounds were too small to draw anything.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Computes the dial layout for `state` inside `bounds`.
pub fn compute(state: &ProgressState, bounds: Bounds) -> ProgressGeometry {
    let center = bounds.center();
    let radius = bounds.radius();

    if radius < 0 {
        return ProgressGeometry {
            bounds,
            center,
            radius,
            delta: 0.0,
            line_width: state.line_width(),
            sweep: None,
            commands: Vec::new(),
        };
    }

    let (line_width, delta) = inset(radius, state.line_width());
    let (cx, cy) = center;
    let cap = state.line_cap();
    let mut commands = Vec::new();

    if state.center_filled() {
        commands.push(DrawCommand::FillCircle {
            cx,
            cy,
            radius: delta,
            color: state.center_fill_color(),
        });
    }

    if state.radius_filled() {
        commands.push(DrawCommand::StrokeCircle {
            cx,
            cy,
            radius: delta,
            line_width,
            cap,
            color: state.radius_fill_color(),
        });
    }

    let sweep = (state.percentage() > 0.0).then(|| ArcSweep::for_percentage(state.percentage()));
    if let Some(sweep) = sweep {
        let color = state.progress_fill_color();
        if line_width == 0 {
            commands.push(DrawCommand::FillPie {
                cx,
                cy,
                radius: delta + 1.0,
                sweep,
                color,
            });
        } else {
            commands.push(DrawCommand::StrokeArc {
                cx,
                cy,
                radius: delta,
                sweep,
                line_width,
                cap,
                color,
            });
        }
    }

    commands.push(DrawCommand::Text {
        x: cx,
        y: cy + VALUE_OFFSET_Y,
        text: percent_label(state.percentage()),
        font: state.font().to_string(),
        size: VALUE_FONT_SIZE,
    });
    commands.push(DrawCommand::Text {
        x: cx,
        y: cy + UNITS_OFFSET_Y,
        text: UNITS_LABEL.to_string(),
        font: state.font().to_string(),
        size: UNITS_FONT_SIZE,
    });

    ProgressGeometry {
        bounds,
        center,
        radius,
        delta,
        line_width,
        sweep,
        commands,
    }
}

/// Clamps the line width to the radius and returns it with the stroke inset.
pub fn inset(radius: i32, line_width: i32) -> (i32, f64) {
    if line_width > radius {
        (radius, 0.0)
    } else {
        (line_width, f64::from(radius) - f64::from(line_width) / 2.0)
    }
}

/// Whole percent, truncated.
pub fn percent_label(percentage: f64) -> String {
    format!("{}", (percentage * 100.0) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(percentage: f64, line_width: i32) -> ProgressState {
        let mut state = ProgressState::default();
        state.set_percentage(percentage);
        state.set_line_width(line_width);
        state
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quarter_dial_in_square_box() {
        let geometry = compute(&state(0.25, 4), Bounds::new(300, 300));

        assert_eq!(geometry.radius, 149);
        assert_eq!(geometry.delta, 147.0);
        assert_eq!(geometry.line_width, 4);
        assert_eq!(geometry.center, (150.0, 150.0));

        let sweep = geometry.sweep.unwrap();
        assert!(close(sweep.start_degrees(), 270.0));
        assert!(close(sweep.end_degrees(), 360.0));
    }

    #[test]
    fn oversized_line_width_clamps_to_radius() {
        let geometry = compute(&state(0.5, 200), Bounds::new(100, 100));

        assert_eq!(geometry.radius, 49);
        assert_eq!(geometry.line_width, 49);
        assert_eq!(geometry.delta, 0.0);
    }

    #[test]
    fn line_width_equal_to_radius_is_not_clamped() {
        assert_eq!(inset(49, 49), (49, 24.5));
        assert_eq!(inset(49, 50), (49, 0.0));
    }

    #[test]
    fn radius_uses_shorter_edge() {
        assert_eq!(Bounds::new(640, 201).radius(), 99);
        assert_eq!(Bounds::new(201, 640).radius(), 99);
    }

    #[test]
    fn sweep_is_linear_in_percentage() {
        let half = ArcSweep::for_percentage(0.5);
        assert!(close(half.start, 1.5 * PI));
        assert!(close(half.end, 2.5 * PI));

        for step in 0..=10 {
            let p = f64::from(step) / 10.0;
            assert!(close(ArcSweep::for_percentage(p).span(), 2.0 * PI * p));
        }
    }

    #[test]
    fn zero_percentage_draws_no_arc() {
        let geometry = compute(&state(0.0, 4), Bounds::new(200, 200));
        assert!(geometry.sweep.is_none());
        assert!(geometry.commands.iter().all(|command| !matches!(
            command,
            DrawCommand::StrokeArc { .. } | DrawCommand::FillPie { .. }
        )));
    }

    #[test]
    fn zero_line_width_fills_a_pie_slice() {
        let geometry = compute(&state(0.3, 0), Bounds::new(200, 200));
        let pie = geometry
            .commands
            .iter()
            .find_map(|command| match command {
                DrawCommand::FillPie { radius, .. } => Some(*radius),
                _ => None,
            })
            .expect("pie slice");
        assert_eq!(pie, geometry.delta + 1.0);
        assert_eq!(geometry.delta, 99.0);
    }

    #[test]
    fn fills_follow_flags_in_paint_order() {
        let mut dial = state(0.75, 10);
        dial.set_center_filled(true);
        dial.set_radius_filled(true);
        dial.set_line_cap(LineCap::Round);

        let geometry = compute(&dial, Bounds::new(120, 120));
        assert!(matches!(geometry.commands[0], DrawCommand::FillCircle { radius, .. } if radius == 54.0));
        assert!(matches!(
            geometry.commands[1],
            DrawCommand::StrokeCircle { line_width: 10, cap: LineCap::Round, .. }
        ));
        assert!(matches!(geometry.commands[2], DrawCommand::StrokeArc { .. }));
        assert_eq!(geometry.commands.len(), 5);
    }

    #[test]
    fn text_shows_truncated_percent_and_units() {
        let geometry = compute(&state(0.999, 1), Bounds::new(100, 100));
        let texts: Vec<(&str, f64)> = geometry
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, y, .. } => Some((text.as_str(), *y)),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![("99", 23.0), ("PERCENT", 63.0)]);
    }

    #[test]
    fn degenerate_bounds_draw_nothing() {
        let geometry = compute(&state(0.5, 4), Bounds::new(0, 0));
        assert_eq!(geometry.radius, -1);
        assert!(geometry.is_empty());

        let geometry = compute(&state(0.5, 4), Bounds::new(1, 300));
        assert!(geometry.is_empty());
    }

    #[test]
    fn preferred_size_never_drops_below_minimum() {
        assert_eq!(Bounds::new(50, 50).preferred_size(), (80, 80));
        assert_eq!(Bounds::new(300, 200).preferred_size(), (80, 198));
    }
}
