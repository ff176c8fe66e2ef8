use std::{f64::consts::PI, fmt::Write as _};

use crate::{
    color::Rgba,
    progress::{ArcSweep, DrawCommand, LineCap, ProgressGeometry},
};

/// Drawing backend the dial paints through. Angles are radians measured
/// clockwise from 3 o'clock with y pointing down.
pub trait Canvas {
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, cap: LineCap, color: Rgba);

    fn fill_pie(&mut self, cx: f64, cy: f64, radius: f64, sweep: ArcSweep, color: Rgba);

    fn stroke_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        sweep: ArcSweep,
        line_width: f64,
        cap: LineCap,
        color: Rgba,
    );

    /// Text horizontally centred on `x`, top edge at `y`.
    fn text(&mut self, x: f64, y: f64, text: &str, font: &str, size: u32);
}

/// Replays draw commands onto `canvas` in order.
pub fn paint<C: Canvas + ?Sized>(canvas: &mut C, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::FillCircle { cx, cy, radius, color } => canvas.fill_circle(*cx, *cy, *radius, *color),
            DrawCommand::StrokeCircle {
                cx,
                cy,
                radius,
                line_width,
                cap,
                color,
            } => canvas.stroke_circle(*cx, *cy, *radius, f64::from(*line_width), *cap, *color),
            DrawCommand::FillPie {
                cx,
                cy,
                radius,
                sweep,
                color,
            } => canvas.fill_pie(*cx, *cy, *radius, *sweep, *color),
            DrawCommand::StrokeArc {
                cx,
                cy,
                radius,
                sweep,
                line_width,
                cap,
                color,
            } => canvas.stroke_arc(*cx, *cy, *radius, *sweep, f64::from(*line_width), *cap, *color),
            DrawCommand::Text {
                x,
                y,
                text,
                font,
                size,
            } => canvas.text(*x, *y, text, font, *size),
        }
    }
}

/// Canvas that writes an SVG document.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: i32,
    height: i32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// Paints a whole dial and returns the document.
    pub fn render(geometry: &ProgressGeometry) -> String {
        let mut canvas = Self::new(geometry.bounds.width, geometry.bounds.height);
        paint(&mut canvas, &geometry.commands);
        canvas.finish()
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width.max(0),
            h = self.height.max(0),
            body = self.body
        )
    }
}

fn fill_attrs(color: Rgba) -> String {
    format!("fill=\"{}\" fill-opacity=\"{}\"", color.to_hex(), color.alpha)
}

fn stroke_attrs(color: Rgba, line_width: f64, cap: LineCap) -> String {
    let cap = match cap {
        LineCap::Butt => "butt",
        LineCap::Round => "round",
    };
    format!(
        "fill=\"none\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{line_width}\" stroke-linecap=\"{cap}\"",
        color.to_hex(),
        color.alpha
    )
}

fn point(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// SVG arc segment for `sweep`. A full turn is split in two because a
/// single arc command cannot start and end at the same point.
fn arc_path(cx: f64, cy: f64, radius: f64, sweep: ArcSweep, from_center: bool) -> String {
    let span = sweep.span().min(2.0 * PI);
    let (sx, sy) = point(cx, cy, radius, sweep.start);
    let mut path = String::new();

    if from_center {
        let _ = write!(path, "M {cx:.3} {cy:.3} L {sx:.3} {sy:.3}");
    } else {
        let _ = write!(path, "M {sx:.3} {sy:.3}");
    }

    let mut start = sweep.start;
    let mut remaining = span;
    while remaining > 0.0 {
        let step = remaining.min(PI);
        let end = start + step;
        let (ex, ey) = point(cx, cy, radius, end);
        let _ = write!(path, " A {radius:.3} {radius:.3} 0 0 1 {ex:.3} {ey:.3}");
        start = end;
        remaining -= step;
    }

    if from_center {
        path.push_str(" Z");
    }
    path
}

impl Canvas for SvgCanvas {
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        let _ = writeln!(
            self.body,
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\" {}/>",
            fill_attrs(color)
        );
    }

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, cap: LineCap, color: Rgba) {
        let _ = writeln!(
            self.body,
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\" {}/>",
            stroke_attrs(color, line_width, cap)
        );
    }

    fn fill_pie(&mut self, cx: f64, cy: f64, radius: f64, sweep: ArcSweep, color: Rgba) {
        let _ = writeln!(
            self.body,
            "  <path d=\"{}\" {}/>",
            arc_path(cx, cy, radius, sweep, true),
            fill_attrs(color)
        );
    }

    fn stroke_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        sweep: ArcSweep,
        line_width: f64,
        cap: LineCap,
        color: Rgba,
    ) {
        let _ = writeln!(
            self.body,
            "  <path d=\"{}\" {}/>",
            arc_path(cx, cy, radius, sweep, false),
            stroke_attrs(color, line_width, cap)
        );
    }

    fn text(&mut self, x: f64, y: f64, text: &str, font: &str, size: u32) {
        let _ = writeln!(
            self.body,
            "  <text x=\"{x}\" y=\"{y}\" font-family=\"{}\" font-size=\"{size}pt\" text-anchor=\"middle\" dominant-baseline=\"hanging\" fill=\"currentColor\">{}</text>",
            escape(font),
            escape(text)
        );
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
