use serde::{Deserialize, Serialize};

use crate::config::ViewAngle;

/// Lower and upper bound of each axis, in kpc.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AxisLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

impl AxisLimits {
    pub fn cube(limit: f64) -> Self {
        AxisLimits {
            x: (-limit, limit),
            y: (-limit, limit),
            z: (-limit, limit),
        }
    }

    pub fn axis(&self, index: usize) -> (f64, f64) {
        match index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn axes(&self) -> [(f64, f64); 3] {
        [self.x, self.y, self.z]
    }

    /// Rescales every axis about its own midpoint.
    pub fn scale(&mut self, factor: f64) {
        for range in [&mut self.x, &mut self.y, &mut self.z] {
            let mid = (range.0 + range.1) / 2.0;
            let half = (range.1 - range.0) * factor / 2.0;
            *range = (mid - half, mid + half);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Maps a wheel delta to a direction; positive is away from the user.
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(ScrollDirection::Up)
        } else if delta < 0.0 {
            Some(ScrollDirection::Down)
        } else {
            None
        }
    }
}

/// Turns fractional wheel input into whole zoom notches. Trackpads report
/// many small pixel deltas per swipe; one notch needs a full wheel line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollAccumulator {
    pending: f64,
}

impl ScrollAccumulator {
    /// Pixel delta worth one wheel line
    pub const PIXELS_PER_LINE: f64 = 40.0;

    /// Adds a delta in wheel lines; returns the whole notches completed.
    pub fn lines(&mut self, delta: f64) -> Option<(ScrollDirection, u32)> {
        if !delta.is_finite() {
            return None;
        }
        self.pending += delta;
        let notches = self.pending.trunc();
        self.pending -= notches;
        ScrollDirection::from_delta(notches).map(|direction| (direction, notches.abs() as u32))
    }

    pub fn pixels(&mut self, delta: f64) -> Option<(ScrollDirection, u32)> {
        self.lines(delta / Self::PIXELS_PER_LINE)
    }
}

/// Scroll-wheel zoom: up zooms in, down zooms out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomHandler {
    pub scale: f64,
}

impl ZoomHandler {
    pub fn factor(&self, direction: ScrollDirection) -> f64 {
        match direction {
            ScrollDirection::Up => 1.0 / self.scale,
            ScrollDirection::Down => self.scale,
        }
    }

    pub fn apply(&self, limits: &mut AxisLimits, direction: ScrollDirection) {
        limits.scale(self.factor(direction));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axes3D {
    pub limits: AxisLimits,
    pub labels: [String; 3],
    pub title: String,
    pub view: ViewAngle,
    pub grid_alpha: f32,
}
