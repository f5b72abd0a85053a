use image::{Pixel, Rgba, RgbaImage};
use palette::Srgb;

use crate::scene::{LineStyle, Paint};

/// RGBA framebuffer with alpha-blended drawing primitives.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Srgb<u8>) -> Self {
        let fill = Rgba([background.red, background.green, background.blue, 0xFF]);
        Canvas {
            image: RgbaImage::from_pixel(width, height, fill),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn blend(&mut self, x: i64, y: i64, paint: Paint) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let alpha = (paint.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        if alpha == 0 {
            return;
        }
        let c = paint.color;
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        pixel.blend(&Rgba([c.red, c.green, c.blue, alpha]));
        // the background is opaque; keep it that way despite rounding
        pixel.0[3] = 0xFF;
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, paint: Paint) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width() as i64);
        let y1 = (y + h).min(self.height() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, paint);
            }
        }
    }

    /// Fills the pixels whose centres fall inside the circle. Circles smaller
    /// than a pixel still cover the pixel under their centre.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, paint: Paint) {
        if r < 0.5 {
            self.blend(cx.floor() as i64, cy.floor() as i64, paint);
            return;
        }
        self.ring(cx, cy, 0.0, r, paint);
    }

    pub fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64, width: f64, paint: Paint) {
        let half = (width / 2.0).max(0.5);
        self.ring(cx, cy, (r - half).max(0.0), r + half, paint);
    }

    fn ring(&mut self, cx: f64, cy: f64, inner: f64, outer: f64, paint: Paint) {
        let x0 = ((cx - outer).floor() as i64).max(0);
        let x1 = ((cx + outer).ceil() as i64).min(self.width() as i64 - 1);
        let y0 = ((cy - outer).floor() as i64).max(0);
        let y1 = ((cy + outer).ceil() as i64).min(self.height() as i64 - 1);
        let (inner2, outer2) = (inner * inner, outer * outer);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 <= outer2 && (inner2 == 0.0 || d2 >= inner2) {
                    self.blend(px, py, paint);
                }
            }
        }
    }

    /// Plus-shaped marker of half-size `r`.
    pub fn draw_cross(&mut self, cx: f64, cy: f64, r: f64, width: f64, paint: Paint) {
        let w = width.round().max(1.0) as i64;
        let (x, y) = (cx.round() as i64, cy.round() as i64);
        let r = r.round() as i64;
        let half = w / 2;
        self.fill_rect(x - r, y - half, 2 * r + 1, w, paint);
        // vertical bar, skipping the pixels the horizontal bar already covered
        self.fill_rect(x - half, y - r, w, r - half, paint);
        self.fill_rect(x - half, y - half + w, w, r + half - w + 1, paint);
    }

    /// Straight line of `width` pixels, optionally dashed or dotted. The
    /// segment is clipped to the canvas first, so off-screen length is free.
    pub fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, paint: Paint, style: LineStyle) {
        let thickness = width.round().max(1.0) as i64;
        let margin = thickness as f64;
        let bounds = (
            -margin,
            -margin,
            self.width() as f64 + margin,
            self.height() as f64 + margin,
        );
        let Some((start, end)) = clip_segment(from, to, bounds) else {
            return;
        };
        let (on, off) = dash_pattern(style, width);
        // keep the dash phase anchored at the unclipped start
        let phase = ((start.0 - from.0).powi(2) + (start.1 - from.1).powi(2)).sqrt();

        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let x_major = dx.abs() >= dy.abs();
        let (major, minor, d_major, d_minor) = if x_major {
            (start.0, start.1, dx, dy)
        } else {
            (start.1, start.0, dy, dx)
        };
        let slope = if d_major == 0.0 { 0.0 } else { d_minor / d_major };
        let arc_per_step = (1.0 + slope * slope).sqrt();
        let first = major.floor() as i64;
        let last = (major + d_major).floor() as i64;
        let step = if last >= first { 1 } else { -1 };

        for i in 0..=(last - first).abs() {
            let m = first + i * step;
            let along = m as f64 + 0.5 - major;
            if let Some((on, off)) = on.zip(off) {
                let arc = phase + (along * step as f64).max(0.0) * arc_per_step;
                if arc % (on + off) >= on {
                    continue;
                }
            }
            let n = (minor + along * slope).floor() as i64;
            for k in 0..thickness {
                let offset = k - thickness / 2;
                if x_major {
                    self.blend(m, n + offset, paint);
                } else {
                    self.blend(n + offset, m, paint);
                }
            }
        }
    }
}

/// Liang-Barsky clip of a segment to `(x_min, y_min, x_max, y_max)`.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    (x_min, y_min, x_max, y_max): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, from.0 - x_min),
        (dx, x_max - from.0),
        (-dy, from.1 - y_min),
        (dy, y_max - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (from.0 + t0 * dx, from.1 + t0 * dy),
        (from.0 + t1 * dx, from.1 + t1 * dy),
    ))
}

/// On/off run lengths in pixels, scaled by line width like matplotlib's.
fn dash_pattern(style: LineStyle, width: f64) -> (Option<f64>, Option<f64>) {
    let w = width.max(1.0);
    match style {
        LineStyle::Solid => (None, None),
        LineStyle::Dashed => (Some(3.7 * w), Some(1.6 * w)),
        LineStyle::Dotted => (Some(w), Some((1.65 * w).max(2.0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);
    const RED: Srgb<u8> = Srgb::new(255, 0, 0);

    fn count_non_white(canvas: &Canvas) -> usize {
        canvas
            .as_raw()
            .chunks_exact(4)
            .filter(|px| px[..3] != [255, 255, 255])
            .count()
    }

    #[test]
    fn opaque_blend_replaces_pixel() {
        let mut canvas = Canvas::new(4, 4, WHITE);
        canvas.blend(1, 2, Paint::solid(RED));
        assert_eq!(canvas.pixel(1, 2), [255, 0, 0, 255]);
        // out of bounds is ignored
        canvas.blend(-1, 7, Paint::solid(RED));
        assert_eq!(count_non_white(&canvas), 1);
    }

    #[test]
    fn translucent_blend_mixes() {
        let mut canvas = Canvas::new(1, 1, WHITE);
        canvas.blend(0, 0, Paint::with_alpha(RED, 0.5));
        let [r, g, b, a] = canvas.pixel(0, 0);
        assert_eq!((r, a), (255, 255));
        assert!(g > 100 && g < 155 && g == b);
    }

    #[test]
    fn circle_covers_expected_area() {
        let mut canvas = Canvas::new(40, 40, WHITE);
        canvas.fill_circle(20.0, 20.0, 10.0, Paint::solid(RED));
        let area = count_non_white(&canvas) as f64;
        let expected = std::f64::consts::PI * 100.0;
        assert!((area - expected).abs() / expected < 0.05, "area {area}");
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let mut solid = Canvas::new(100, 3, WHITE);
        solid.draw_line((0.0, 1.0), (99.0, 1.0), 1.0, Paint::solid(RED), LineStyle::Solid);
        let mut dashed = Canvas::new(100, 3, WHITE);
        dashed.draw_line((0.0, 1.0), (99.0, 1.0), 1.0, Paint::solid(RED), LineStyle::Dashed);

        let full = count_non_white(&solid);
        let partial = count_non_white(&dashed);
        assert_eq!(full, 100);
        assert!(partial > 50 && partial < full, "dashed covered {partial}");
    }

    #[test]
    fn cross_is_symmetric() {
        let mut canvas = Canvas::new(21, 21, WHITE);
        canvas.draw_cross(10.0, 10.0, 5.0, 1.0, Paint::solid(RED));
        assert_eq!(count_non_white(&canvas), 21);
        assert_eq!(canvas.pixel(10, 5)[1], 0);
        assert_eq!(canvas.pixel(10, 15)[1], 0);
        assert_eq!(canvas.pixel(5, 10)[1], 0);
        assert_eq!(canvas.pixel(15, 10)[1], 0);
    }

    #[test]
    fn stacked_translucent_paint_stays_opaque() {
        let mut canvas = Canvas::new(1, 1, WHITE);
        for _ in 0..5 {
            canvas.blend(0, 0, Paint::with_alpha(RED, 0.15));
        }
        assert_eq!(canvas.pixel(0, 0)[3], 255);
    }

    fn painted_per_column(canvas: &Canvas) -> Vec<usize> {
        (0..canvas.width())
            .map(|x| {
                (0..canvas.height())
                    .filter(|&y| canvas.pixel(x, y)[..3] != [255, 255, 255])
                    .count()
            })
            .collect()
    }

    #[test]
    fn solid_lines_have_no_holes() {
        for (from, to) in [((0.3, 2.7), (97.9, 40.1)), ((97.9, 40.1), (0.3, 2.7))] {
            let mut canvas = Canvas::new(100, 50, WHITE);
            canvas.draw_line(from, to, 1.0, Paint::solid(RED), LineStyle::Solid);
            let columns = painted_per_column(&canvas);
            assert!(columns[..=97].iter().all(|&n| n == 1), "{columns:?}");
            assert!(columns[98..].iter().all(|&n| n == 0));
        }

        let mut steep = Canvas::new(10, 100, WHITE);
        steep.draw_line((5.0, 0.0), (5.0, 99.0), 1.0, Paint::solid(RED), LineStyle::Solid);
        assert_eq!(count_non_white(&steep), 100);
        assert!((0..100).all(|y| steep.pixel(5, y)[1] == 0));
    }

    #[test]
    fn off_canvas_length_is_clipped_away() {
        let mut canvas = Canvas::new(50, 10, WHITE);
        canvas.draw_line((-1e12, 5.0), (1e12, 5.0), 1.0, Paint::solid(RED), LineStyle::Dashed);
        let painted = count_non_white(&canvas);
        assert!(painted > 0 && painted < 50);

        let mut outside = Canvas::new(50, 10, WHITE);
        outside.draw_line((0.0, -100.0), (50.0, -100.0), 3.0, Paint::solid(RED), LineStyle::Solid);
        outside.draw_line((f64::NAN, 1.0), (4.0, 1.0), 1.0, Paint::solid(RED), LineStyle::Solid);
        assert_eq!(count_non_white(&outside), 0);
    }

    #[test]
    fn clip_keeps_inside_segments_whole() {
        let bounds = (0.0, 0.0, 10.0, 10.0);
        assert_eq!(clip_segment((1.0, 1.0), (9.0, 2.0), bounds), Some(((1.0, 1.0), (9.0, 2.0))));
        let (start, end) = clip_segment((-10.0, 5.0), (20.0, 5.0), bounds).unwrap();
        assert_approx_eq!(start.0, 0.0, 1e-9);
        assert_approx_eq!(end.0, 10.0, 1e-9);
        assert_eq!((start.1, end.1), (5.0, 5.0));
        assert_eq!(clip_segment((-5.0, -5.0), (-1.0, 20.0), bounds), None);
    }
}
