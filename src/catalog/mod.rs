pub mod io;

use std::collections::{HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GalaxyRecord;

pub const NGC_3628: &str = "NGC 3628";
pub const M66: &str = "M66";
pub const M65: &str = "M65";

/// Shared copy of the built-in Leo Triplet data.
pub static LEO_TRIPLET: Lazy<Catalog> = Lazy::new(Catalog::leo_triplet);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("catalog has no galaxies")]
    Empty,
    #[error("galaxy {0:?} is listed more than once")]
    DuplicateGalaxy(String),
    #[error("reference galaxy {0:?} is not in the catalog")]
    UnknownReference(String),
    #[error("bearing refers to unknown galaxy {0:?}")]
    UnknownBearing(String),
}

/// Converts angular and velocity offsets into kpc at the group's distance.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DistanceScale {
    /// Distance to the group in kpc
    pub distance: f64,
    /// kpc per degree of sky at `distance`
    pub degree_to_length: f64,
    /// kpc per km/s of recession velocity difference
    pub velocity_to_length: f64,
}

impl Default for DistanceScale {
    fn default() -> Self {
        DistanceScale {
            distance: 10_700.0,
            degree_to_length: 187.0,
            velocity_to_length: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    East,
    North,
    LineOfSight,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::East => 0,
            Axis::North => 1,
            Axis::LineOfSight => 2,
        }
    }

    /// Compass word for a component with the given sign.
    pub fn direction_word(self, positive: bool) -> &'static str {
        match (self, positive) {
            (Axis::East, true) => "EAST",
            (Axis::East, false) => "WEST",
            (Axis::North, true) => "NORTH",
            (Axis::North, false) => "SOUTH",
            (Axis::LineOfSight, true) => "AWAY",
            (Axis::LineOfSight, false) => "TOWARD",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn holds(self, value: f64) -> bool {
        match self {
            Sign::Positive => value > 0.0,
            Sign::Negative => value < 0.0,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Sign::Positive)
    }
}

/// Expected sign of one centroid-relative component of one galaxy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bearing {
    pub galaxy: String,
    pub axis: Axis,
    pub sign: Sign,
}

impl Bearing {
    pub fn new(galaxy: impl Into<String>, axis: Axis, sign: Sign) -> Self {
        Bearing {
            galaxy: galaxy.into(),
            axis,
            sign,
        }
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = self.axis.direction_word(self.sign.is_positive());
        match self.axis {
            Axis::LineOfSight => write!(f, "{} should be {} from Earth relative to center", self.galaxy, word),
            _ => write!(f, "{} should be {} of center", self.galaxy, word),
        }
    }
}

/// Bibliographic source for the reference data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub source: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl Citation {
    fn new(source: &str, details: &[&str]) -> Self {
        Citation {
            source: source.to_string(),
            details: details.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Plain serde form of a [`Catalog`]; validated on conversion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogData {
    pub galaxies: Vec<GalaxyRecord>,
    #[serde(default)]
    pub scale: DistanceScale,
    pub reference: String,
    #[serde(default)]
    pub bearings: Vec<Bearing>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Ordered galaxy table plus the constants needed to place it in space.
///
/// The reference galaxy and every bearing are guaranteed to name a galaxy in
/// the table, so lookups through the catalog never fail once it exists.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "CatalogData", into = "CatalogData")]
pub struct Catalog {
    galaxies: Vec<GalaxyRecord>,
    scale: DistanceScale,
    reference: usize,
    bearings: Vec<Bearing>,
    citations: Vec<Citation>,
    name_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(
        galaxies: Vec<GalaxyRecord>,
        scale: DistanceScale,
        reference: &str,
    ) -> Result<Self, CatalogError> {
        Catalog::try_from(CatalogData {
            galaxies,
            scale,
            reference: reference.to_string(),
            bearings: Vec::new(),
            citations: Vec::new(),
        })
    }

    pub fn with_bearings(mut self, bearings: Vec<Bearing>) -> Result<Self, CatalogError> {
        if let Some(bad) = bearings.iter().find(|b| !self.name_index.contains_key(&b.galaxy)) {
            return Err(CatalogError::UnknownBearing(bad.galaxy.clone()));
        }
        self.bearings = bearings;
        Ok(self)
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// NGC 3628, M66 and M65 with NED coordinates, referenced to NGC 3628.
    pub fn leo_triplet() -> Self {
        let galaxies = vec![
            GalaxyRecord::from_sexagesimal(NGC_3628, (11.0, 20.0, 17.0), (13.0, 35.0, 23.0), 843.0),
            GalaxyRecord::from_sexagesimal(M66, (11.0, 20.0, 15.0), (12.0, 59.0, 30.0), 727.0),
            GalaxyRecord::from_sexagesimal(M65, (11.0, 18.0, 56.0), (13.0, 5.0, 32.0), 807.0),
        ];
        let bearings = vec![
            Bearing::new(NGC_3628, Axis::North, Sign::Positive),
            Bearing::new(M66, Axis::East, Sign::Positive),
            Bearing::new(M66, Axis::North, Sign::Negative),
            Bearing::new(M65, Axis::East, Sign::Negative),
            Bearing::new(M65, Axis::North, Sign::Negative),
        ];
        let mut catalog = Catalog {
            galaxies,
            scale: DistanceScale::default(),
            reference: 0,
            bearings,
            citations: leo_triplet_citations(),
            name_index: HashMap::new(),
        };
        catalog.rebuild_indices();
        catalog
    }

    pub fn len(&self) -> usize {
        self.galaxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.galaxies.is_empty()
    }

    pub fn galaxies(&self) -> &[GalaxyRecord] {
        &self.galaxies
    }

    pub fn scale(&self) -> &DistanceScale {
        &self.scale
    }

    pub fn bearings(&self) -> &[Bearing] {
        &self.bearings
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn reference(&self) -> &GalaxyRecord {
        &self.galaxies[self.reference]
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&GalaxyRecord> {
        self.index_of_name(name).map(|idx| &self.galaxies[idx])
    }

    fn rebuild_indices(&mut self) {
        self.name_index = self
            .galaxies
            .iter()
            .enumerate()
            .map(|(idx, galaxy)| (galaxy.name.clone(), idx))
            .collect();
    }
}

impl TryFrom<CatalogData> for Catalog {
    type Error = CatalogError;

    fn try_from(data: CatalogData) -> Result<Self, Self::Error> {
        if data.galaxies.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = data.galaxies.iter().find(|g| !seen.insert(g.name.as_str())) {
            return Err(CatalogError::DuplicateGalaxy(dup.name.clone()));
        }
        let mut catalog = Catalog {
            galaxies: data.galaxies,
            scale: data.scale,
            reference: 0,
            bearings: Vec::new(),
            citations: data.citations,
            name_index: HashMap::new(),
        };
        catalog.rebuild_indices();
        catalog.reference = catalog
            .index_of_name(&data.reference)
            .ok_or(CatalogError::UnknownReference(data.reference))?;
        catalog.with_bearings(data.bearings)
    }
}

impl From<Catalog> for CatalogData {
    fn from(catalog: Catalog) -> Self {
        let reference = catalog.reference().name.clone();
        CatalogData {
            galaxies: catalog.galaxies,
            scale: catalog.scale,
            reference,
            bearings: catalog.bearings,
            citations: catalog.citations,
        }
    }
}

fn leo_triplet_citations() -> Vec<Citation> {
    vec![
        Citation::new(
            "NASA/IPAC Extragalactic Database (NED). (2024).",
            &[
                "- NGC 3628: 11h20m17.0s, +13°35′23″, v=843±1 km/s",
                "- M66 (NGC 3627): 11h20m15.0s, +12°59′30″, v=727±3 km/s",
                "- M65 (NGC 3623): 11h18m56.0s, +13°05′32″, v=807±3 km/s",
                "Retrieved from https://ned.ipac.caltech.edu/",
            ],
        ),
        Citation::new(
            "NOIRLab/NSF. (2021). Galaxy NGC 3628 and its Tidal Tail.",
            &[
                "Image noao-ngc3628. Retrieved from",
                "https://noirlab.edu/public/images/noao-ngc3628/",
            ],
        ),
        Citation::new(
            "European Southern Observatory. (2010). VST Snaps a Galactic Do-Si-Do.",
            &["Eso1043fr. Retrieved from https://www.eso.org/public/news/eso1043/"],
        ),
        Citation::new(
            "Garcia, A. M. (1993). General study of group membership. II.",
            &[
                "Astronomy and Astrophysics Supplement Series, 100, 47-90.",
                "(LGG 231 - Leo Triplet group identification)",
            ],
        ),
        Citation::new(
            "Arp, H. (1966). Atlas of Peculiar Galaxies.",
            &["California Institute of Technology. (Arp 317)"],
        ),
        Citation::new(
            "Wikipedia contributors. (2024). NGC 3628. In Wikipedia.",
            &["Retrieved from https://en.wikipedia.org/wiki/NGC_3628"],
        ),
    ]
}
