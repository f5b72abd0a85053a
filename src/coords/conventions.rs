//! Sign-convention checks printed before anything is drawn.
//!
//! +X points east, +Y north and +Z away from Earth. With the default view the
//! observer sits at -Z, so east appears on the left and north appears up,
//! matching how the group looks on the sky.

use std::fmt;

use log::info;
use nalgebra::Vector3;

use crate::catalog::{Axis, Bearing, Catalog};
use crate::config::ViewAngle;
use crate::coords::PositionTable;
use crate::Position;

const RULE_WIDTH: usize = 80;

#[derive(Clone, Debug)]
pub struct BearingOutcome {
    pub bearing: Bearing,
    pub value: f64,
}

impl BearingOutcome {
    pub fn holds(&self) -> bool {
        self.bearing.sign.holds(self.value)
    }
}

#[derive(Clone, Debug)]
pub struct ConventionReport {
    pub positions: PositionTable,
    pub outcomes: Vec<BearingOutcome>,
    pub view: ViewAngle,
    pub tail_direction: Vector3<f64>,
}

impl ConventionReport {
    pub fn all_hold(&self) -> bool {
        self.outcomes.iter().all(BearingOutcome::holds)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BearingOutcome> {
        self.outcomes.iter().filter(|o| !o.holds())
    }

    /// Screen-side words ("UP"/"DOWN", "LEFT"/"RIGHT") for a position.
    pub fn appearance(&self, pos: &Position) -> (&'static str, &'static str) {
        let vertical = if pos.dot(&self.view.screen_up()) > 0.0 { "UP" } else { "DOWN" };
        let horizontal = if pos.dot(&self.view.screen_right()) > 0.0 { "RIGHT" } else { "LEFT" };
        (vertical, horizontal)
    }

    /// Closing checklist printed once the window is gone.
    pub fn summary(&self) -> Vec<String> {
        let east = Vector3::new(1.0, 0.0, 0.0);
        let (_, east_side) = self.appearance(&east);
        let (tail_v, tail_h) = self.appearance(&self.tail_direction);
        vec![
            "+X = EAST".to_string(),
            "+Y = NORTH".to_string(),
            format!(
                "View elevation {:.0}, azimuth {:.0}",
                self.view.elevation, self.view.azimuth
            ),
            format!("EAST appears on {east_side}"),
            format!(
                "Tidal tail: {}X ({}), {}Y ({})",
                sign_char(self.tail_direction.x),
                Axis::East.direction_word(self.tail_direction.x > 0.0),
                sign_char(self.tail_direction.y),
                Axis::North.direction_word(self.tail_direction.y > 0.0),
            ),
            format!("Tail appears {tail_v}-{tail_h}"),
            "Earth marker shows observer position at -Z".to_string(),
        ]
    }
}

fn sign_char(v: f64) -> char {
    if v > 0.0 {
        '+'
    } else {
        '-'
    }
}

/// Evaluates every catalog bearing against centroid-relative positions.
pub fn check_conventions(
    catalog: &Catalog,
    positions: &PositionTable,
    view: ViewAngle,
    tail_direction: Vector3<f64>,
) -> ConventionReport {
    let outcomes = catalog
        .bearings()
        .iter()
        .filter_map(|bearing| {
            positions.get(&bearing.galaxy).map(|pos| BearingOutcome {
                bearing: bearing.clone(),
                value: pos[bearing.axis.index()],
            })
        })
        .collect();
    ConventionReport {
        positions: positions.clone(),
        outcomes,
        view,
        tail_direction,
    }
}

/// Like [`check_conventions`], but a violated bearing aborts the run.
pub fn verify_conventions(
    catalog: &Catalog,
    positions: &PositionTable,
    view: ViewAngle,
    tail_direction: Vector3<f64>,
) -> ConventionReport {
    let report = check_conventions(catalog, positions, view, tail_direction);
    for outcome in &report.outcomes {
        assert!(outcome.holds(), "{} (got {:.2} kpc)", outcome.bearing, outcome.value);
    }
    info!("{} sign conventions verified", report.outcomes.len());
    report
}

impl fmt::Display for ConventionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{heavy}")?;
        writeln!(f, "SIGN CONVENTION VERIFICATION")?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "\nCOORDINATE SYSTEM:")?;
        writeln!(f, "  +X = EAST")?;
        writeln!(f, "  +Y = NORTH")?;
        writeln!(f, "  +Z = AWAY from Earth")?;

        let (_, east_side) = self.appearance(&Vector3::new(1.0, 0.0, 0.0));
        let (north_side, _) = self.appearance(&Vector3::new(0.0, 1.0, 0.0));
        writeln!(
            f,
            "\nVIEWING GEOMETRY (elevation {:.0}, azimuth {:.0}):",
            self.view.elevation, self.view.azimuth
        )?;
        writeln!(f, "  Observer at -Z looking toward +Z")?;
        writeln!(f, "  +X (EAST) appears {east_side}")?;
        writeln!(f, "  +Y (NORTH) appears {north_side}")?;

        writeln!(f, "\n{light}")?;
        writeln!(f, "GALAXY POSITIONS (relative to center):")?;
        writeln!(f, "{light}")?;

        for (name, pos) in self.positions.iter() {
            let (vertical, horizontal) = self.appearance(pos);
            writeln!(f, "\n{name}:")?;
            writeln!(
                f,
                "  True:      X={:6.1} kpc ({}), Y={:6.1} kpc ({}), Z={:6.1} kpc ({})",
                pos.x,
                Axis::East.direction_word(pos.x > 0.0),
                pos.y,
                Axis::North.direction_word(pos.y > 0.0),
                pos.z,
                Axis::LineOfSight.direction_word(pos.z > 0.0),
            )?;
            writeln!(f, "  Appears:   {vertical}, {horizontal}")?;
            for outcome in self.outcomes.iter().filter(|o| o.bearing.galaxy == name) {
                let mark = if outcome.holds() { '✓' } else { '✗' };
                let word = outcome
                    .bearing
                    .axis
                    .direction_word(outcome.bearing.sign.is_positive());
                writeln!(f, "  {mark} {name} is {word}")?;
            }
        }

        let d = self.tail_direction;
        let (tail_v, tail_h) = self.appearance(&d);
        writeln!(f, "\nTIDAL TAIL:")?;
        writeln!(f, "  Direction: [{:.2}, {:.2}, {:.2}]", d.x, d.y, d.z)?;
        writeln!(
            f,
            "  This means: {} ({}X), {} ({}Y)",
            Axis::East.direction_word(d.x > 0.0),
            sign_char(d.x),
            Axis::North.direction_word(d.y > 0.0),
            sign_char(d.y),
        )?;
        write!(f, "  Appears: {tail_v}-{tail_h} from the anchor galaxy")
    }
}
