use nalgebra::Vector3;

use crate::scene::{AxisLimits, Axes3D};
use crate::Position;

/// Fraction of the plot area the unit box spans along its shorter side.
const BOX_FILL: f64 = 0.85;

/// Pixel rectangle the axes occupy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Maps axes-relative coordinates (origin bottom-left) to pixels.
    pub fn relative(&self, at: (f64, f64)) -> (f64, f64) {
        (self.x + at.0 * self.width, self.y + (1.0 - at.1) * self.height)
    }
}

/// Orthographic projection of the axes box onto the plot area.
///
/// Each axis is first normalised to [-1, 1] by its current limits, so
/// zooming only has to change the limits.
#[derive(Clone, Debug)]
pub struct Projection {
    limits: AxisLimits,
    right: Vector3<f64>,
    up: Vector3<f64>,
    toward: Vector3<f64>,
    area: PlotArea,
    scale: f64,
}

impl Projection {
    pub fn new(axes: &Axes3D, area: PlotArea) -> Self {
        Projection {
            limits: axes.limits,
            right: axes.view.screen_right(),
            up: axes.view.screen_up(),
            toward: axes.view.toward_viewer(),
            area,
            scale: area.width.min(area.height) / 2.0 * BOX_FILL,
        }
    }

    pub fn area(&self) -> &PlotArea {
        &self.area
    }

    fn normalize(&self, p: &Position) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        for (i, (lo, hi)) in self.limits.axes().into_iter().enumerate() {
            let half = ((hi - lo) / 2.0).max(f64::EPSILON);
            n[i] = (p[i] - (lo + hi) / 2.0) / half;
        }
        n
    }

    /// Pixel coordinates of a data point; y grows downwards.
    pub fn project(&self, p: &Position) -> (f64, f64) {
        let n = self.normalize(p);
        let (cx, cy) = self.area.center();
        (cx + n.dot(&self.right) * self.scale, cy - n.dot(&self.up) * self.scale)
    }

    /// Larger values are nearer the viewer.
    pub fn depth(&self, p: &Position) -> f64 {
        self.normalize(p).dot(&self.toward)
    }

    /// Whether a data direction points away from the viewer.
    pub fn recedes(&self, direction: &Vector3<f64>) -> bool {
        direction.dot(&self.toward) < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewAngle;
    use assert_approx_eq::assert_approx_eq;

    fn axes() -> Axes3D {
        Axes3D {
            limits: AxisLimits::cube(150.0),
            labels: Default::default(),
            title: String::new(),
            view: ViewAngle::default(),
            grid_alpha: 0.3,
        }
    }

    fn area() -> PlotArea {
        PlotArea {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 200.0,
        }
    }

    #[test]
    fn east_left_north_up() {
        let projection = Projection::new(&axes(), area());
        let (cx, cy) = projection.project(&Position::zeros());
        assert_approx_eq!(cx, 100.0, 1e-9);
        assert_approx_eq!(cy, 100.0, 1e-9);

        let (ex, ey) = projection.project(&Position::new(100.0, 0.0, 0.0));
        assert!(ex < cx);
        assert_approx_eq!(ey, cy, 1e-9);

        let (nx, ny) = projection.project(&Position::new(0.0, 100.0, 0.0));
        assert!(ny < cy);
        assert_approx_eq!(nx, cx, 1e-9);
    }

    #[test]
    fn limit_maps_to_box_edge() {
        let projection = Projection::new(&axes(), area());
        let (x, _) = projection.project(&Position::new(-150.0, 0.0, 0.0));
        assert_approx_eq!(x, 100.0 + 100.0 * BOX_FILL, 1e-9);
    }

    #[test]
    fn earth_side_is_nearer() {
        let projection = Projection::new(&axes(), area());
        let near = projection.depth(&Position::new(0.0, 0.0, -100.0));
        let far = projection.depth(&Position::new(0.0, 0.0, 100.0));
        assert!(near > far);
        assert!(projection.recedes(&Vector3::z()));
    }

    #[test]
    fn zooming_in_spreads_points() {
        let mut zoomed = axes();
        zoomed.limits.scale(0.5);
        let p = Position::new(50.0, 0.0, 0.0);
        let before = Projection::new(&axes(), area()).project(&p).0;
        let after = Projection::new(&zoomed, area()).project(&p).0;
        assert!((after - 100.0).abs() > (before - 100.0).abs());
    }

    #[test]
    fn relative_origin_is_bottom_left() {
        let a = PlotArea {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(a.relative((0.0, 0.0)), (10.0, 70.0));
        assert_eq!(a.relative((0.5, 1.0)), (60.0, 20.0));
    }
}
