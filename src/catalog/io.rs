use std::fs;
use std::path::Path;

use log::debug;

use super::{Catalog, CatalogError};

pub fn serialize_catalog(catalog: &Catalog) -> Result<Vec<u8>, CatalogError> {
    Ok(serde_json::to_vec_pretty(catalog)?)
}

/// Parses and validates a catalog; the name index is rebuilt on the way in.
pub fn deserialize_catalog(bytes: &[u8]) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_json::from_slice(bytes)?;
    debug!(
        "loaded catalog with {} galaxies, reference {}",
        catalog.len(),
        catalog.reference().name
    );
    Ok(catalog)
}

pub fn write_catalog_to_file<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<(), CatalogError> {
    let bytes = serialize_catalog(catalog)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let bytes = fs::read(path)?;
    deserialize_catalog(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{M65, NGC_3628};
    use crate::GalaxyRecord;

    #[test]
    fn json_keeps_records_and_index() {
        let original = Catalog::leo_triplet();
        let bytes = serialize_catalog(&original).unwrap();
        let restored = deserialize_catalog(&bytes).unwrap();

        assert_eq!(restored.galaxies(), original.galaxies());
        assert_eq!(restored.bearings(), original.bearings());
        assert_eq!(restored.reference().name, NGC_3628);
        assert_eq!(restored.index_of_name(M65), Some(2));
    }

    #[test]
    fn json_keeps_every_float_bit() {
        // sexagesimal conversions produce values whose last bit plain parsing loses
        let galaxies = vec![
            GalaxyRecord::new("A", 11.315555555555557, 13.589722222222223, 843.0),
            GalaxyRecord::new("B", 0.1 + 0.2, -12.991666666666667, 727.5),
        ];
        let catalog = Catalog::new(galaxies, Default::default(), "A").unwrap();
        let restored = deserialize_catalog(&serialize_catalog(&catalog).unwrap()).unwrap();
        for (after, before) in restored.galaxies().iter().zip(catalog.galaxies()) {
            assert_eq!(after.ra.to_bits(), before.ra.to_bits());
            assert_eq!(after.dec.to_bits(), before.dec.to_bits());
        }
    }

    #[test]
    fn reference_is_validated_on_load() {
        let json = br#"{
            "galaxies": [{"name": "A", "ra": 1.0, "dec": 2.0, "redshift_velocity": 3.0}],
            "reference": "nope"
        }"#;
        let err = deserialize_catalog(json).unwrap_err();
        assert!(matches!(err, CatalogError::Serialize(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn scale_defaults_when_omitted() {
        let json = br#"{
            "galaxies": [{"name": "A", "ra": 1.0, "dec": 2.0, "redshift_velocity": 3.0}],
            "reference": "A"
        }"#;
        let catalog = deserialize_catalog(json).unwrap();
        assert_eq!(catalog.scale().degree_to_length, 187.0);
        assert!(catalog.citations().is_empty());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        write_catalog_to_file(&Catalog::leo_triplet(), &path).unwrap();
        let restored = read_catalog_from_file(&path).unwrap();
        assert_eq!(restored.len(), 3);

        let missing = read_catalog_from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(CatalogError::Io(_))));
    }
}
