use log::debug;
use nalgebra::{Unit, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, BetaError, Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Position;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("tail direction must be a non-zero finite vector")]
    Direction,
    #[error("tail width must be finite and non-negative, got {0}")]
    Width(f64),
    #[error("tail length must be finite and positive, got {0}")]
    Length(f64),
    #[error("invalid density profile: {0}")]
    Density(#[from] BetaError),
}

/// Shape of the synthetic tail. The curvature and width values are visual
/// tuning against the NOIRLab image of NGC 3628, not physical quantities.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TailParams {
    pub points: usize,
    /// kpc
    pub length: f64,
    /// Std-dev of the perpendicular scatter in kpc
    pub width: f64,
    pub direction: [f64; 3],
    /// Beta(a, b) shape for the position along the tail
    pub density: (f64, f64),
    /// Per-axis bend applied as a function of (t - 0.5); the third axis flares
    pub curvature: [f64; 3],
}

impl Default for TailParams {
    fn default() -> Self {
        TailParams {
            points: 2500,
            length: 86.0,
            width: 4.0,
            // east and north, slightly toward Earth
            direction: [1.0, 0.15, -0.1],
            density: (0.6, 1.8),
            curvature: [5.0, 8.0, 5.0],
        }
    }
}

impl TailParams {
    pub fn unit_direction(&self) -> Result<Unit<Vector3<f64>>, TailError> {
        let v = Vector3::from(self.direction);
        if !v.iter().all(|c| c.is_finite()) {
            return Err(TailError::Direction);
        }
        Unit::try_new(v, f64::EPSILON).ok_or(TailError::Direction)
    }
}

/// Generated tail points plus the galaxy they stream from.
#[derive(Clone, Debug)]
pub struct TailPointCloud {
    anchor: Position,
    direction: Unit<Vector3<f64>>,
    points: Vec<Position>,
}

impl TailPointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn anchor(&self) -> &Position {
        &self.anchor
    }

    pub fn direction(&self) -> &Unit<Vector3<f64>> {
        &self.direction
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Distance of every point from the anchor galaxy, in point order.
    pub fn distances(&self) -> Vec<f64> {
        self.points.iter().map(|p| (p - self.anchor).norm()).collect()
    }

    pub fn mean_offset(&self) -> Vector3<f64> {
        if self.points.is_empty() {
            return Vector3::zeros();
        }
        let total: Vector3<f64> = self.points.iter().map(|p| p - self.anchor).sum();
        total / self.points.len() as f64
    }
}

/// Samples the tail around `anchor`.
///
/// Positions along the tail follow Beta(0.6, 1.8) by default, which crowds
/// points near the galaxy. Gaussian scatter is kept perpendicular to the tail
/// axis before the curvature term is added.
pub fn generate_tail<R: Rng + ?Sized>(
    anchor: Position,
    params: &TailParams,
    rng: &mut R,
) -> Result<TailPointCloud, TailError> {
    if !params.length.is_finite() || params.length <= 0.0 {
        return Err(TailError::Length(params.length));
    }
    if !params.width.is_finite() || params.width < 0.0 {
        return Err(TailError::Width(params.width));
    }
    let unit = params.unit_direction()?;
    let along = unit.into_inner() * params.length;
    let density = Beta::new(params.density.0, params.density.1)?;
    let scatter = Normal::new(0.0, params.width).map_err(|_| TailError::Width(params.width))?;
    let [cx, cy, cz] = params.curvature;

    let points = (0..params.points)
        .map(|_| {
            let t: f64 = density.sample(rng);
            let base = anchor + along * t;

            let mut noise = Vector3::new(scatter.sample(rng), scatter.sample(rng), scatter.sample(rng));
            noise -= unit.into_inner() * noise.dot(&unit);

            let tc = t - 0.5;
            let curvature = Vector3::new(tc * cx, tc * cy, tc.abs() * cz);

            base + noise + curvature
        })
        .collect::<Vec<_>>();

    debug!("generated {} tail points from {:?}", points.len(), anchor.as_slice());
    Ok(TailPointCloud {
        anchor,
        direction: unit,
        points,
    })
}

/// Seeded generation for reproducible tails; `None` uses the thread RNG.
pub fn generate_tail_seeded(
    anchor: Position,
    params: &TailParams,
    seed: Option<u64>,
) -> Result<TailPointCloud, TailError> {
    match seed {
        Some(seed) => generate_tail(anchor, params, &mut StdRng::seed_from_u64(seed)),
        None => generate_tail(anchor, params, &mut rand::thread_rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> Position {
        Position::new(20.0, 68.0, 5.0)
    }

    #[test]
    fn point_count_matches_params() {
        let mut rng = StdRng::seed_from_u64(1);
        for points in [0, 1, 17, 2500] {
            let params = TailParams {
                points,
                ..TailParams::default()
            };
            let tail = generate_tail(anchor(), &params, &mut rng).unwrap();
            assert_eq!(tail.len(), points);
        }
    }

    #[test]
    fn mean_offset_follows_direction() {
        let params = TailParams::default();
        let tail = generate_tail_seeded(anchor(), &params, Some(42)).unwrap();
        let mean = tail.mean_offset();
        let cos = mean.normalize().dot(tail.direction());
        assert!(cos > 0.95, "mean offset {mean} diverges from tail axis (cos {cos})");
        assert!(mean.x > 0.0 && mean.y > 0.0);
    }

    #[test]
    fn far_points_sit_on_the_direction_side() {
        let params = TailParams::default();
        let tail = generate_tail_seeded(anchor(), &params, Some(3)).unwrap();
        let far: Vec<f64> = tail
            .points()
            .iter()
            .map(|p| (p - tail.anchor()).dot(tail.direction()))
            .filter(|along| *along > params.length * 0.5)
            .collect();
        assert!(!far.is_empty());
        let behind = tail
            .points()
            .iter()
            .filter(|p| (*p - tail.anchor()).dot(tail.direction()) < -params.length * 0.5)
            .count();
        assert_eq!(behind, 0);
    }

    #[test]
    fn seeded_tails_are_reproducible() {
        let params = TailParams {
            points: 200,
            ..TailParams::default()
        };
        let a = generate_tail_seeded(anchor(), &params, Some(9)).unwrap();
        let b = generate_tail_seeded(anchor(), &params, Some(9)).unwrap();
        let c = generate_tail_seeded(anchor(), &params, Some(10)).unwrap();
        assert_eq!(a.points(), b.points());
        assert_ne!(a.points(), c.points());
    }

    #[test]
    fn zero_width_keeps_points_on_the_curve() {
        let params = TailParams {
            points: 50,
            width: 0.0,
            curvature: [0.0, 0.0, 0.0],
            ..TailParams::default()
        };
        let tail = generate_tail_seeded(anchor(), &params, Some(5)).unwrap();
        for p in tail.points() {
            let offset = p - tail.anchor();
            let off_axis = offset - tail.direction().into_inner() * offset.dot(tail.direction());
            assert!(off_axis.norm() < 1e-9);
        }
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let bad_direction = TailParams {
            direction: [0.0, 0.0, 0.0],
            ..TailParams::default()
        };
        assert!(matches!(
            generate_tail(anchor(), &bad_direction, &mut rng),
            Err(TailError::Direction)
        ));

        let bad_width = TailParams {
            width: -1.0,
            ..TailParams::default()
        };
        assert!(matches!(
            generate_tail(anchor(), &bad_width, &mut rng),
            Err(TailError::Width(_))
        ));

        let bad_density = TailParams {
            density: (0.0, 1.8),
            ..TailParams::default()
        };
        assert!(matches!(
            generate_tail(anchor(), &bad_density, &mut rng),
            Err(TailError::Density(_))
        ));
    }
}
