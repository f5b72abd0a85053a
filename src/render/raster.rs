//! Software rasterizer for [`Figure`]s.
//!
//! Sizes in the scene are in points (1/72 inch) and are converted with the
//! resolution implied by the target pixel size.

use std::cmp::Ordering;

use nalgebra::Vector3;
use palette::Srgb;

use crate::render::canvas::Canvas;
use crate::render::font::{self, TextStyle};
use crate::render::projection::{PlotArea, Projection};
use crate::scene::{Axes3D, Figure, HAlign, Label, LineStyle, MarkerShape, Paint, Primitive, ScatterPoint, VAlign};
use crate::Position;

const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);
const INK: Srgb<u8> = Srgb::new(0, 0, 0);
const GRID: Srgb<u8> = Srgb::new(128, 128, 128);

const TITLE_SIZE: f64 = 14.0;
const AXIS_LABEL_SIZE: f64 = 10.0;
const TICK_SIZE: f64 = 8.0;
/// Outer margin in points
const MARGIN: f64 = 10.0;
const TICK_TARGET: f64 = 6.0;
/// Axes whose projected length is below this share of the plot are drawn
/// edge-on and get a note instead of tick labels.
const MIN_AXIS_EXTENT: f64 = 0.2;

/// Point-to-pixel conversion for one rendering.
#[derive(Clone, Copy, Debug)]
struct Units {
    px_per_pt: f64,
}

impl Units {
    fn px(&self, points: f64) -> f64 {
        points * self.px_per_pt
    }

    fn text_scale(&self, size: f64) -> u32 {
        font::scale_for(self.px(size))
    }

    /// Radius of a marker whose area is given in pt².
    fn marker_radius(&self, area: f64) -> f64 {
        self.px(area.max(0.0).sqrt() / 2.0)
    }
}

/// Renders at the figure's own size for the given resolution.
pub fn rasterize(figure: &Figure, dpi: f64) -> Canvas {
    let (width, height) = figure.pixel_size(dpi);
    rasterize_sized(figure, width, height)
}

/// Renders into an arbitrary pixel size, e.g. a resized window.
pub fn rasterize_sized(figure: &Figure, width: u32, height: u32) -> Canvas {
    let units = units_for(figure, width, height);
    let area = plot_area(figure, width, height);
    let projection = Projection::new(&figure.axes, area);
    let mut canvas = Canvas::new(width, height, WHITE);

    draw_axes(&mut canvas, &figure.axes, &projection, units);
    for layer in figure.layers() {
        for primitive in &layer.primitives {
            draw_primitive(&mut canvas, primitive, &projection, units);
        }
    }
    draw_title(&mut canvas, &figure.axes.title, units);
    canvas
}

fn units_for(figure: &Figure, width: u32, height: u32) -> Units {
    let dpi = (width as f64 / figure.size.0).min(height as f64 / figure.size.1);
    Units { px_per_pt: dpi / 72.0 }
}

/// Pixel rectangle left for the axes once the title band is reserved.
pub(crate) fn plot_area(figure: &Figure, width: u32, height: u32) -> PlotArea {
    let units = units_for(figure, width, height);
    let margin = units.px(MARGIN);
    let (_, title_h) = font::measure(&figure.axes.title, units.text_scale(TITLE_SIZE));
    let top = 2.0 * margin + title_h as f64;
    PlotArea {
        x: margin,
        y: top,
        width: (width as f64 - 2.0 * margin).max(1.0),
        height: (height as f64 - top - margin).max(1.0),
    }
}

fn draw_title(canvas: &mut Canvas, title: &str, units: Units) {
    let style = TextStyle {
        scale: units.text_scale(TITLE_SIZE),
        paint: Paint::solid(INK),
        bold: true,
    };
    let (w, _) = font::measure(title, style.scale);
    let x = (canvas.width() as i64 - w as i64) / 2;
    font::draw_line(canvas, x, units.px(MARGIN).round() as i64, title, &style);
}

fn draw_primitive(canvas: &mut Canvas, primitive: &Primitive, projection: &Projection, units: Units) {
    match primitive {
        Primitive::Marker {
            at,
            shape,
            size,
            paint,
            edge,
        } => {
            let (x, y) = projection.project(at);
            let r = units.marker_radius(*size);
            match shape {
                MarkerShape::Circle => {
                    canvas.fill_circle(x, y, r, *paint);
                    if let Some((edge_paint, width)) = edge {
                        canvas.stroke_circle(x, y, r, units.px(*width), *edge_paint);
                    }
                }
                MarkerShape::Cross => canvas.draw_cross(x, y, r, units.px(2.0), *paint),
            }
        }
        Primitive::Segment {
            from,
            to,
            paint,
            width,
            style,
        } => canvas.draw_line(
            projection.project(from),
            projection.project(to),
            units.px(*width),
            *paint,
            *style,
        ),
        Primitive::Scatter { color, points } => {
            // far points first so nearer ones land on top
            let mut ordered: Vec<&ScatterPoint> = points.iter().collect();
            ordered.sort_by(|a, b| projection.depth(&a.at).total_cmp(&projection.depth(&b.at)));
            for point in ordered {
                let (x, y) = projection.project(&point.at);
                let paint = Paint::with_alpha(*color, point.alpha);
                canvas.fill_circle(x, y, units.marker_radius(point.size), paint);
            }
        }
        Primitive::Text { at, label } => draw_label(canvas, label, projection.project(at), units),
        Primitive::Overlay { at, label } => {
            draw_label(canvas, label, projection.area().relative(*at), units)
        }
    }
}

fn draw_label(canvas: &mut Canvas, label: &Label, anchor: (f64, f64), units: Units) {
    let style = TextStyle {
        scale: units.text_scale(label.size),
        paint: label.paint,
        bold: label.bold,
    };
    let (w, h) = font::measure(&label.text, style.scale);
    let (w, h) = (w as f64, h as f64);
    let left = match label.h_align {
        HAlign::Left => anchor.0,
        HAlign::Center => anchor.0 - w / 2.0,
    };
    let top = match label.v_align {
        VAlign::Top => anchor.1,
        VAlign::Center => anchor.1 - h / 2.0,
        VAlign::Bottom => anchor.1 - h,
    };

    if let Some(background) = label.background {
        let pad = units.px(background.pad);
        canvas.fill_rect(
            (left - pad).round() as i64,
            (top - pad).round() as i64,
            (w + 2.0 * pad).round() as i64,
            (h + 2.0 * pad).round() as i64,
            background.fill,
        );
    }
    font::draw_block(
        canvas,
        left.round() as i64,
        top.round() as i64,
        &label.text,
        &style,
        label.h_align == HAlign::Center,
    );
}

/// Round tick spacing (1, 2 or 5 times a power of ten) for a span.
fn nice_step(span: f64) -> f64 {
    let raw = span / TICK_TARGET;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn ticks((lo, hi): (f64, f64)) -> Vec<f64> {
    let step = nice_step(hi - lo);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn tick_text(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn unit(axis: usize) -> Vector3<f64> {
    let mut e = Vector3::zeros();
    e[axis] = 1.0;
    e
}

fn others(axis: usize) -> (usize, usize) {
    ((axis + 1) % 3, (axis + 2) % 3)
}

/// The four box edges parallel to `axis`, as (start, end) at the axis limits.
fn parallel_edges(limits: &[(f64, f64); 3], axis: usize) -> Vec<(Position, Position)> {
    let (i, j) = others(axis);
    let mut edges = Vec::with_capacity(4);
    for a in [limits[i].0, limits[i].1] {
        for b in [limits[j].0, limits[j].1] {
            let mut start = Position::zeros();
            start[i] = a;
            start[j] = b;
            start[axis] = limits[axis].0;
            let mut end = start;
            end[axis] = limits[axis].1;
            edges.push((start, end));
        }
    }
    edges
}

fn draw_axes(canvas: &mut Canvas, axes: &Axes3D, projection: &Projection, units: Units) {
    let limits = axes.limits.axes();
    let tick_values = limits.map(ticks);
    let grid = Paint::with_alpha(GRID, axes.grid_alpha);
    let line = units.px(0.8);

    // grid on the three back panes
    for normal in 0..3 {
        let far = if projection.recedes(&unit(normal)) {
            limits[normal].1
        } else {
            limits[normal].0
        };
        let (i, j) = others(normal);
        for (along, across) in [(i, j), (j, i)] {
            for &t in &tick_values[along] {
                let mut from = Position::zeros();
                from[normal] = far;
                from[along] = t;
                from[across] = limits[across].0;
                let mut to = from;
                to[across] = limits[across].1;
                canvas.draw_line(projection.project(&from), projection.project(&to), line, grid, LineStyle::Solid);
            }
        }
    }

    for axis in 0..3 {
        for (from, to) in parallel_edges(&limits, axis) {
            canvas.draw_line(projection.project(&from), projection.project(&to), line, grid, LineStyle::Solid);
        }
    }

    let area = *projection.area();
    let center = area.center();
    let tick_style = TextStyle {
        scale: units.text_scale(TICK_SIZE),
        paint: Paint::solid(INK),
        bold: false,
    };
    let label_style = TextStyle {
        scale: units.text_scale(AXIS_LABEL_SIZE),
        ..tick_style
    };
    let gap = units.px(6.0);
    let mut edge_on = Vec::new();

    for axis in 0..3 {
        let outer = parallel_edges(&limits, axis)
            .into_iter()
            .map(|(a, b)| (a, b, projection.project(&a), projection.project(&b)))
            .max_by(|x, y| outer_edge_order(center, (x.2, x.3), (y.2, y.3)));
        let Some((start, _, pa, pb)) = outer else {
            continue;
        };
        let extent = ((pb.0 - pa.0).powi(2) + (pb.1 - pa.1).powi(2)).sqrt();
        if extent < MIN_AXIS_EXTENT * area.width.min(area.height) {
            edge_on.push(axis);
            continue;
        }

        let mid = ((pa.0 + pb.0) / 2.0, (pa.1 + pb.1) / 2.0);
        let outward = direction(center, mid);
        let horizontal = outward.0.abs() > outward.1.abs();

        let mut reach: f64 = 0.0;
        for &t in &tick_values[axis] {
            let mut at = start;
            at[axis] = t;
            let (x, y) = projection.project(&at);
            let text = tick_text(t);
            let (w, h) = font::measure(&text, tick_style.scale);
            let depth = if horizontal { w } else { h };
            reach = reach.max(depth as f64);
            let (left, top) = beside((x, y), outward, gap, (w as f64, h as f64));
            font::draw_line(canvas, left, top, &text, &tick_style);
        }

        let text = &axes.labels[axis];
        let (w, h) = font::measure(text, label_style.scale);
        let offset = gap + reach + gap;
        if horizontal {
            // reads bottom to top, so the rotated box is h wide and w tall
            let (left, top) = beside(mid, outward, offset, (h as f64, w as f64));
            font::draw_rotated(canvas, left, top, text, &label_style);
        } else {
            let (left, top) = beside(mid, outward, offset, (w as f64, h as f64));
            font::draw_line(canvas, left, top, text, &label_style);
        }
    }

    // axes seen end-on: say which way they point
    let (_, line_h) = font::measure("", label_style.scale);
    for (row, axis) in edge_on.iter().rev().enumerate() {
        let heading = if projection.recedes(&unit(*axis)) {
            "into the screen"
        } else {
            "out of the screen"
        };
        let text = format!("{} points {heading}", axes.labels[*axis]);
        let y = area.y + area.height - ((row as f64 + 1.0) * (line_h as f64 + gap));
        font::draw_line(canvas, area.x.round() as i64, y.round() as i64, &text, &label_style);
    }
}

/// Prefers the edge farthest from the plot centre, then the lowest, then the
/// leftmost on screen.
fn outer_edge_order(center: (f64, f64), a: ((f64, f64), (f64, f64)), b: ((f64, f64), (f64, f64))) -> Ordering {
    let key = |(p, q): ((f64, f64), (f64, f64))| {
        let mid = ((p.0 + q.0) / 2.0, (p.1 + q.1) / 2.0);
        let dist = ((mid.0 - center.0).powi(2) + (mid.1 - center.1).powi(2)).sqrt();
        ((dist * 2.0).round(), mid.1, -mid.0)
    };
    let (ka, kb) = (key(a), key(b));
    ka.0.total_cmp(&kb.0)
        .then(ka.1.total_cmp(&kb.1))
        .then(ka.2.total_cmp(&kb.2))
}

fn direction(from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        (0.0, 1.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Top-left corner for a box of `size` placed `gap` pixels from `anchor`
/// along the dominant component of `outward`.
fn beside(anchor: (f64, f64), outward: (f64, f64), gap: f64, size: (f64, f64)) -> (i64, i64) {
    let (w, h) = size;
    let (left, top) = if outward.0.abs() > outward.1.abs() {
        let left = if outward.0 < 0.0 { anchor.0 - gap - w } else { anchor.0 + gap };
        (left, anchor.1 - h / 2.0)
    } else {
        let top = if outward.1 > 0.0 { anchor.1 + gap } else { anchor.1 - gap - h };
        (anchor.0 - w / 2.0, top)
    };
    (left.round() as i64, top.round() as i64)
}
