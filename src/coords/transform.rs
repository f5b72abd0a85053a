use crate::catalog::{Catalog, DistanceScale};
use crate::{GalaxyRecord, Position};

/// Galaxy positions in catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionTable {
    entries: Vec<(String, Position)>,
}

impl PositionTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Position> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, pos)| pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.entries.iter().map(|(n, pos)| (n.as_str(), pos))
    }

    pub fn sum(&self) -> Position {
        self.entries.iter().map(|(_, pos)| pos).sum()
    }

    fn map(&self, f: impl Fn(&Position) -> Position) -> PositionTable {
        PositionTable {
            entries: self
                .entries
                .iter()
                .map(|(n, pos)| (n.clone(), f(pos)))
                .collect(),
        }
    }
}

/// Offset of `target` from `reference` in kpc.
///
/// RA differences are foreshortened by cos(dec) of the reference; the
/// line-of-sight axis is the velocity difference times a fixed scale.
pub fn offset_between(reference: &GalaxyRecord, target: &GalaxyRecord, scale: &DistanceScale) -> Position {
    let ra_offset_deg = target.ra_degrees() - reference.ra_degrees();
    let east = ra_offset_deg * scale.degree_to_length * reference.dec.to_radians().cos();
    let north = (target.dec - reference.dec) * scale.degree_to_length;
    let line_of_sight = (target.redshift_velocity - reference.redshift_velocity) * scale.velocity_to_length;
    Position::new(east, north, line_of_sight)
}

pub fn offsets_from_reference(catalog: &Catalog) -> PositionTable {
    let reference = catalog.reference();
    PositionTable {
        entries: catalog
            .galaxies()
            .iter()
            .map(|g| (g.name.clone(), offset_between(reference, g, catalog.scale())))
            .collect(),
    }
}

pub fn centroid(table: &PositionTable) -> Position {
    if table.is_empty() {
        return Position::zeros();
    }
    table.sum() / table.len() as f64
}

/// Positions relative to the group centroid; they always sum to zero.
pub fn centered_positions(catalog: &Catalog) -> PositionTable {
    let offsets = offsets_from_reference(catalog);
    let center = centroid(&offsets);
    offsets.map(|pos| pos - center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{M65, M66, NGC_3628};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn reference_offset_is_exactly_zero() {
        let offsets = offsets_from_reference(&Catalog::leo_triplet());
        assert_eq!(offsets.get(NGC_3628), Some(&Position::zeros()));
    }

    #[test]
    fn centered_positions_sum_to_zero() {
        let positions = centered_positions(&Catalog::leo_triplet());
        let sum = positions.sum();
        assert_eq!(positions.len(), 3);
        assert!(sum.norm() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn north_component_signs() {
        let positions = centered_positions(&Catalog::leo_triplet());
        assert!(positions.get(NGC_3628).unwrap().y > 0.0);
        assert!(positions.get(M66).unwrap().y < 0.0);
        assert!(positions.get(M65).unwrap().y < 0.0);
    }

    #[test]
    fn offsets_match_hand_computation() {
        let offsets = offsets_from_reference(&Catalog::leo_triplet());
        let m66 = offsets.get(M66).unwrap();
        let cos_dec = (13.0_f64 + 35.0 / 60.0 + 23.0 / 3600.0).to_radians().cos();
        assert_approx_eq!(m66.x, -2.0 / 3600.0 * 15.0 * 187.0 * cos_dec, 1e-9);
        assert_approx_eq!(m66.y, -(35.0 * 60.0 + 53.0) / 3600.0 * 187.0, 1e-9);
        assert_approx_eq!(m66.z, -11.6, 1e-9);
    }

    #[test]
    fn table_keeps_catalog_order() {
        let positions = centered_positions(&Catalog::leo_triplet());
        let names: Vec<&str> = positions.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![NGC_3628, M66, M65]);
    }
}
