pub mod conventions;
pub mod transform;

pub use conventions::{check_conventions, verify_conventions, ConventionReport};
pub use transform::{centered_positions, centroid, offsets_from_reference, PositionTable};
