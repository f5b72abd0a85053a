//! Ordered draw layers for the Leo Triplet figure.
//!
//! A [`Figure`] is a list of layers that render back-to-front in list order,
//! plus the axes state that the zoom handler mutates.

pub mod axes;

use log::{debug, info};
use palette::Srgb;
use thiserror::Error;

use crate::config::{ColorError, SceneConfig, CENTER, EARTH, TRIANGLE};
use crate::coords::PositionTable;
use crate::tail::TailPointCloud;
use crate::{distance, Position};

pub use axes::{AxisLimits, Axes3D, ScrollAccumulator, ScrollDirection, ZoomHandler};

const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);

pub const TITLE: &str = "Leo Triplet Galaxy Group";
pub const AXIS_LABELS: [&str; 3] = [
    "ΔX (+east) [kpc]",
    "ΔY (+north) [kpc]",
    "ΔZ (+away from Earth) [kpc]",
];
pub const NOTE: &str = "Grey dots: Tidal Tail of NGC 3628 (approximated)\n\
    Positions are relative to triplet center\n\
    Position of the Earth is not real, only for orientation purposes";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub color: Srgb<u8>,
    pub alpha: f32,
}

impl Paint {
    pub fn solid(color: Srgb<u8>) -> Self {
        Paint { color, alpha: 1.0 }
    }

    pub fn with_alpha(color: Srgb<u8>, alpha: f32) -> Self {
        Paint { color, alpha }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Cross,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Padded background box behind a label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBox {
    /// Padding in points
    pub pad: f64,
    pub fill: Paint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub paint: Paint,
    /// Font size in points
    pub size: f64,
    pub bold: bool,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub background: Option<TextBox>,
}

impl Label {
    fn new(text: impl Into<String>, paint: Paint, size: f64) -> Self {
        Label {
            text: text.into(),
            paint,
            size,
            bold: false,
            h_align: HAlign::Left,
            v_align: VAlign::Bottom,
            background: None,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn aligned(mut self, h_align: HAlign, v_align: VAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    fn boxed(mut self, pad: f64, fill: Paint) -> Self {
        self.background = Some(TextBox { pad, fill });
        self
    }
}

/// One scatter point; `size` is the marker area in pt².
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPoint {
    pub at: Position,
    pub size: f64,
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Marker {
        at: Position,
        shape: MarkerShape,
        /// Marker area in pt²
        size: f64,
        paint: Paint,
        /// Edge paint and width in points
        edge: Option<(Paint, f64)>,
    },
    Segment {
        from: Position,
        to: Position,
        paint: Paint,
        width: f64,
        style: LineStyle,
    },
    Scatter {
        color: Srgb<u8>,
        points: Vec<ScatterPoint>,
    },
    Text {
        at: Position,
        label: Label,
    },
    /// Text placed in axes-relative coordinates (0..1, origin bottom-left).
    Overlay {
        at: (f64, f64),
        label: Label,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Galaxies,
    Center,
    Triangle,
    Tail,
    Observer,
    Note,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub primitives: Vec<Primitive>,
}

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Layer {
            kind,
            primitives: Vec::new(),
        }
    }
}

/// Triangle side between two galaxies.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub a: Position,
    pub b: Position,
    pub length: f64,
}

impl Edge {
    pub fn midpoint(&self) -> Position {
        (self.a + self.b) / 2.0
    }

    pub fn label(&self) -> String {
        format!("{:.0} kpc", self.length)
    }
}

/// Sides of the polygon joining the galaxies in table order, closing back
/// to the first one.
pub fn triangle_edges(positions: &PositionTable) -> Vec<Edge> {
    let entries: Vec<(&str, &Position)> = positions.iter().collect();
    if entries.len() < 2 {
        return Vec::new();
    }
    let pairs = if entries.len() == 2 { 1 } else { entries.len() };
    (0..pairs)
        .map(|i| {
            let (from, a) = entries[i];
            let (to, b) = entries[(i + 1) % entries.len()];
            Edge {
                from: from.to_string(),
                to: to.to_string(),
                a: *a,
                b: *b,
                length: distance(a, b),
            }
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Color(#[from] ColorError),
}

#[derive(Clone, Debug)]
pub struct Figure {
    /// Size in inches
    pub size: (f64, f64),
    pub axes: Axes3D,
    layers: Vec<Layer>,
    zoom: Option<ZoomHandler>,
}

impl Figure {
    pub fn new(size: (f64, f64), axes: Axes3D) -> Self {
        Figure {
            size,
            axes,
            layers: Vec::new(),
            zoom: None,
        }
    }

    /// Layers in drawing order, back to front.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn attach_zoom(&mut self, zoom: ZoomHandler) {
        self.zoom = Some(zoom);
    }

    pub fn zoom(&self) -> Option<&ZoomHandler> {
        self.zoom.as_ref()
    }

    /// Applies a scroll event. Returns whether the view changed.
    pub fn handle_scroll(&mut self, direction: ScrollDirection) -> bool {
        match self.zoom {
            Some(zoom) => {
                zoom.apply(&mut self.axes.limits, direction);
                debug!("zoom {:?}, limits now {:?}", direction, self.axes.limits);
                true
            }
            None => false,
        }
    }

    /// Pixel dimensions at the given resolution.
    pub fn pixel_size(&self, dpi: f64) -> (u32, u32) {
        let w = (self.size.0 * dpi).round().max(1.0) as u32;
        let h = (self.size.1 * dpi).round().max(1.0) as u32;
        (w, h)
    }
}

/// Builds the complete figure: data layers in draw order, axes and zoom.
pub fn render(
    config: &SceneConfig,
    positions: &PositionTable,
    tail: &TailPointCloud,
) -> Result<Figure, SceneError> {
    let axes = Axes3D {
        limits: AxisLimits::cube(config.axis_limit),
        labels: AXIS_LABELS.map(String::from),
        title: TITLE.to_string(),
        view: config.view,
        grid_alpha: 0.3,
    };
    let mut figure = Figure::new(config.figure_size, axes);

    figure.push_layer(galaxy_layer(config, positions)?);
    figure.push_layer(center_layer(config)?);
    figure.push_layer(triangle_layer(config, positions)?);
    figure.push_layer(tail_layer(config, tail)?);
    figure.push_layer(observer_layer(config)?);
    figure.push_layer(note_layer());
    figure.attach_zoom(ZoomHandler {
        scale: config.zoom_scale,
    });

    info!(
        "scene built: {} layers, {} tail points",
        figure.layers().len(),
        tail.len()
    );
    Ok(figure)
}

fn galaxy_layer(config: &SceneConfig, positions: &PositionTable) -> Result<Layer, SceneError> {
    let mut layer = Layer::new(LayerKind::Galaxies);
    for (name, pos) in positions.iter() {
        let color = config.color(name)?;
        layer.primitives.push(Primitive::Marker {
            at: *pos,
            shape: MarkerShape::Circle,
            size: config.galaxy_marker_size,
            paint: Paint::solid(color),
            edge: Some((Paint::solid(WHITE), 1.5)),
        });
        layer.primitives.push(Primitive::Text {
            at: *pos,
            label: Label::new(format!("  {name}"), Paint::solid(color), 11.0).bold(),
        });
    }
    Ok(layer)
}

fn center_layer(config: &SceneConfig) -> Result<Layer, SceneError> {
    let color = config.color(CENTER)?;
    let mut layer = Layer::new(LayerKind::Center);
    layer.primitives.push(Primitive::Marker {
        at: Position::zeros(),
        shape: MarkerShape::Cross,
        size: config.center_marker_size,
        paint: Paint::solid(color),
        edge: None,
    });
    layer.primitives.push(Primitive::Text {
        at: Position::new(0.0, 0.0, 5.0),
        label: Label::new("  Center", Paint::solid(color), 10.0),
    });
    Ok(layer)
}

fn triangle_layer(config: &SceneConfig, positions: &PositionTable) -> Result<Layer, SceneError> {
    let color = config.color(TRIANGLE)?;
    let mut layer = Layer::new(LayerKind::Triangle);
    for edge in triangle_edges(positions) {
        layer.primitives.push(Primitive::Segment {
            from: edge.a,
            to: edge.b,
            paint: Paint::with_alpha(color, 0.6),
            width: 1.5,
            style: LineStyle::Dashed,
        });
        layer.primitives.push(Primitive::Text {
            at: edge.midpoint(),
            label: Label::new(edge.label(), Paint::solid(color), 9.0)
                .aligned(HAlign::Center, VAlign::Center)
                .boxed(0.2 * 9.0, Paint::with_alpha(WHITE, 0.7)),
        });
    }
    Ok(layer)
}

/// Closer points are drawn larger and more opaque.
fn tail_layer(config: &SceneConfig, tail: &TailPointCloud) -> Result<Layer, SceneError> {
    let color = config.tail_color()?;
    let distances = tail.distances();
    let max = distances.iter().copied().fold(0.0_f64, f64::max);
    let alpha = config.tail.alpha;

    let points = tail
        .points()
        .iter()
        .zip(&distances)
        .map(|(p, d)| {
            let r = if max > 0.0 { d / max } else { 0.0 };
            ScatterPoint {
                at: *p,
                size: 4.0 - 3.0 * r,
                alpha: alpha * (1.0 - 0.5 * r as f32),
            }
        })
        .collect();

    let mut layer = Layer::new(LayerKind::Tail);
    layer.primitives.push(Primitive::Scatter { color, points });
    Ok(layer)
}

fn observer_layer(config: &SceneConfig) -> Result<Layer, SceneError> {
    let color = config.color(EARTH)?;
    let observer = &config.observer;
    let position = Position::from(observer.position);
    let target = Position::from(observer.sight_target);

    let mut layer = Layer::new(LayerKind::Observer);
    layer.primitives.push(Primitive::Marker {
        at: position,
        shape: MarkerShape::Circle,
        size: observer.marker_size,
        paint: Paint::with_alpha(color, observer.alpha),
        edge: None,
    });
    layer.primitives.push(Primitive::Text {
        at: position + Position::from(observer.label_offset),
        label: Label::new("EARTH", Paint::solid(color), 12.0)
            .bold()
            .aligned(HAlign::Center, VAlign::Top),
    });

    let s = observer.sight_spread;
    for (dx, dy) in [(-s, -s), (-s, s), (s, -s), (s, s)] {
        layer.primitives.push(Primitive::Segment {
            from: position + Position::new(dx, dy, 0.0),
            to: target,
            paint: Paint::with_alpha(color, 0.15),
            width: 1.0,
            style: LineStyle::Dotted,
        });
    }
    Ok(layer)
}

fn note_layer() -> Layer {
    let mut layer = Layer::new(LayerKind::Note);
    layer.primitives.push(Primitive::Overlay {
        at: (0.5, 1.0),
        label: Label::new(NOTE, Paint::solid(Srgb::new(0, 0, 0)), 9.0)
            .aligned(HAlign::Center, VAlign::Top)
            .boxed(0.5 * 9.0, Paint::with_alpha(WHITE, 0.9)),
    });
    layer
}
