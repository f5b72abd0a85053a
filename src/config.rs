use std::collections::BTreeMap;
use std::str::FromStr;

use log::warn;
use nalgebra::Vector3;
use palette::Srgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{M65, M66, NGC_3628};
use crate::tail::TailParams;

pub const CENTER: &str = "center";
pub const EARTH: &str = "earth";
pub const TRIANGLE: &str = "triangle";

const FALLBACK_COLOR: Srgb<u8> = Srgb::new(0x80, 0x80, 0x80);

#[derive(Debug, Error, PartialEq)]
#[error("colour for {entity} is not a hex code: {value:?}")]
pub struct ColorError {
    pub entity: String,
    pub value: String,
}

/// Camera orientation in degrees, measured like a matplotlib 3D axes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewAngle {
    pub elevation: f64,
    pub azimuth: f64,
}

impl ViewAngle {
    /// Unit vector from the scene towards the viewer.
    pub fn toward_viewer(&self) -> Vector3<f64> {
        let (el, az) = (self.elevation.to_radians(), self.azimuth.to_radians());
        Vector3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin())
    }

    /// Data direction that appears to the right on screen.
    pub fn screen_right(&self) -> Vector3<f64> {
        let az = self.azimuth.to_radians();
        Vector3::new(-az.sin(), az.cos(), 0.0)
    }

    /// Data direction that appears upwards on screen.
    pub fn screen_up(&self) -> Vector3<f64> {
        self.toward_viewer().cross(&self.screen_right())
    }
}

impl Default for ViewAngle {
    /// Looking from Earth (-Z) with north up and east on the left.
    fn default() -> Self {
        ViewAngle {
            elevation: -90.0,
            azimuth: 90.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TailStyle {
    /// Galaxy the tail is drawn from
    pub anchor: String,
    #[serde(flatten)]
    pub params: TailParams,
    pub alpha: f32,
    pub color: String,
    /// Fixed RNG seed; `None` draws a fresh tail on every run
    pub seed: Option<u64>,
}

impl Default for TailStyle {
    fn default() -> Self {
        TailStyle {
            anchor: NGC_3628.to_string(),
            params: TailParams::default(),
            alpha: 0.2,
            color: "#888888".to_string(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObserverStyle {
    pub position: [f64; 3],
    /// Where the sight-lines converge
    pub sight_target: [f64; 3],
    /// Half-width of the square the sight-lines start from
    pub sight_spread: f64,
    pub label_offset: [f64; 3],
    pub marker_size: f64,
    pub alpha: f32,
}

impl Default for ObserverStyle {
    fn default() -> Self {
        ObserverStyle {
            position: [0.0, 0.0, -150.0],
            sight_target: [0.0, 0.0, 50.0],
            sight_spread: 30.0,
            label_offset: [0.0, -20.0, 0.0],
            marker_size: 200.0,
            alpha: 0.7,
        }
    }
}

/// Everything the renderer needs besides the data itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Figure size in inches
    pub figure_size: (f64, f64),
    /// Half-width of the initial axis cube in kpc
    pub axis_limit: f64,
    /// Marker areas in pt²
    pub galaxy_marker_size: f64,
    pub center_marker_size: f64,
    pub tail: TailStyle,
    pub observer: ObserverStyle,
    /// Hex colours keyed by galaxy name or by `center`, `earth`, `triangle`
    pub colors: BTreeMap<String, String>,
    pub zoom_scale: f64,
    pub view: ViewAngle,
    /// Resolution used for the interactive window
    pub display_dpi: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let colors = [
            (NGC_3628, "#2E8B57"),
            (M66, "#DC143C"),
            (M65, "#1E90FF"),
            (CENTER, "#FFD700"),
            (EARTH, "#FF8C00"),
            (TRIANGLE, "#9370DB"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        SceneConfig {
            figure_size: (12.0, 9.0),
            axis_limit: 150.0,
            galaxy_marker_size: 250.0,
            center_marker_size: 150.0,
            tail: TailStyle::default(),
            observer: ObserverStyle::default(),
            colors,
            zoom_scale: 1.2,
            view: ViewAngle::default(),
            display_dpi: 100.0,
        }
    }
}

impl SceneConfig {
    /// Colour for an entity. Unknown entities fall back to grey.
    pub fn color(&self, entity: &str) -> Result<Srgb<u8>, ColorError> {
        match self.colors.get(entity) {
            Some(hex) => parse_hex(entity, hex),
            None => {
                warn!("no colour configured for {entity}, using grey");
                Ok(FALLBACK_COLOR)
            }
        }
    }

    pub fn tail_color(&self) -> Result<Srgb<u8>, ColorError> {
        parse_hex("tail", &self.tail.color)
    }
}

fn parse_hex(entity: &str, hex: &str) -> Result<Srgb<u8>, ColorError> {
    Srgb::from_str(hex).map_err(|_| ColorError {
        entity: entity.to_string(),
        value: hex.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn default_view_puts_east_left_and_north_up() {
        let view = ViewAngle::default();
        let east = Vector3::new(1.0, 0.0, 0.0);
        let north = Vector3::new(0.0, 1.0, 0.0);
        let away = Vector3::new(0.0, 0.0, 1.0);

        assert_approx_eq!(view.screen_right().dot(&east), -1.0, 1e-12);
        assert_approx_eq!(view.screen_up().dot(&north), 1.0, 1e-12);
        // observer sits at -Z
        assert_approx_eq!(view.toward_viewer().dot(&away), -1.0, 1e-12);
    }

    #[test]
    fn colors_parse_from_hex() {
        let config = SceneConfig::default();
        assert_eq!(config.color(NGC_3628).unwrap(), Srgb::new(0x2E, 0x8B, 0x57));
        assert_eq!(config.tail_color().unwrap(), Srgb::new(0x88, 0x88, 0x88));
        assert_eq!(config.color("unknown").unwrap(), FALLBACK_COLOR);
    }

    #[test]
    fn malformed_color_is_reported() {
        let mut config = SceneConfig::default();
        config.colors.insert(CENTER.to_string(), "gold".to_string());
        let err = config.color(CENTER).unwrap_err();
        assert_eq!(err.value, "gold");
        assert_eq!(err.entity, CENTER);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r#"{"axis_limit": 200.0, "tail": {"points": 10, "seed": 7}}"#).unwrap();
        assert_eq!(config.axis_limit, 200.0);
        assert_eq!(config.tail.params.points, 10);
        assert_eq!(config.tail.params.length, 86.0);
        assert_eq!(config.tail.seed, Some(7));
        assert_eq!(config.zoom_scale, 1.2);
    }
}
