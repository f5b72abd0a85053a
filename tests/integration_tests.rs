use assert_approx_eq::assert_approx_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use leo_triplet::catalog::io::{read_catalog_from_file, write_catalog_to_file};
use leo_triplet::catalog::{Catalog, DistanceScale, LEO_TRIPLET, M65, M66, NGC_3628};
use leo_triplet::config::SceneConfig;
use leo_triplet::coords::{centered_positions, check_conventions, verify_conventions};
use leo_triplet::render::RenderError;
use leo_triplet::scene::{render, triangle_edges, LayerKind, Primitive, ScrollDirection};
use leo_triplet::tail::{generate_tail, TailParams};
use leo_triplet::GalaxyRecord;

#[test]
fn integration_end_to_end_leo_triplet() {
    let dir = tempfile::tempdir().unwrap();

    // Catalog survives a trip through JSON on disk
    let catalog_path = dir.path().join("leo.json");
    write_catalog_to_file(&LEO_TRIPLET, &catalog_path).unwrap();
    let catalog = read_catalog_from_file(&catalog_path).unwrap();
    assert_eq!(catalog.galaxies(), LEO_TRIPLET.galaxies());

    // Centred positions
    let positions = centered_positions(&catalog);
    let sum = positions.sum();
    assert_approx_eq!(sum.norm(), 0.0, 1e-9);
    assert!(positions.get(NGC_3628).unwrap().y > 0.0);
    assert!(positions.get(M66).unwrap().y < 0.0);
    assert!(positions.get(M65).unwrap().y < 0.0);

    // Conventions
    let config = SceneConfig::default();
    let direction = config.tail.params.unit_direction().unwrap().into_inner();
    let report = verify_conventions(&catalog, &positions, config.view, direction);
    assert!(report.all_hold());

    // Tail
    let params = TailParams {
        points: 500,
        ..config.tail.params.clone()
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let anchor = *positions.get(NGC_3628).unwrap();
    let tail = generate_tail(anchor, &params, &mut rng).unwrap();
    assert_eq!(tail.len(), 500);
    assert!(tail.mean_offset().normalize().dot(tail.direction()) > 0.9);

    // Scene
    let mut figure = render(&config, &positions, &tail).unwrap();
    for edge in triangle_edges(&positions) {
        let expected = (positions.get(&edge.from).unwrap() - positions.get(&edge.to).unwrap()).norm();
        assert_approx_eq!(edge.length, expected, 1e-12);
    }
    let original = figure.axes.limits;
    figure.handle_scroll(ScrollDirection::Down);
    figure.handle_scroll(ScrollDirection::Up);
    assert_approx_eq!(figure.axes.limits.x.0, original.x.0, 1e-9);
    assert_approx_eq!(figure.axes.limits.z.1, original.z.1, 1e-9);

    // Export
    let image_path = dir.path().join("leo_triplet.png");
    figure.export(&image_path, 25.0).unwrap();
    let metadata = std::fs::metadata(&image_path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn export_to_invalid_path_returns_export_error() {
    let positions = centered_positions(&Catalog::leo_triplet());
    let params = TailParams {
        points: 50,
        ..TailParams::default()
    };
    let tail = generate_tail(Default::default(), &params, &mut StdRng::seed_from_u64(1)).unwrap();
    let figure = render(&SceneConfig::default(), &positions, &tail).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("no").join("such").join("dir").join("out.png");
    let result = figure.export(&bad, 20.0);
    assert!(matches!(result, Err(RenderError::Export { .. })));
    assert!(!bad.exists());
}

#[test]
fn custom_catalog_flows_through_the_pipeline() {
    let galaxies = vec![
        GalaxyRecord::new("A", 10.0, 10.0, 800.0),
        GalaxyRecord::new("B", 10.03, 10.2, 900.0),
    ];
    let catalog = Catalog::new(galaxies, DistanceScale::default(), "A").unwrap();
    let positions = centered_positions(&catalog);
    assert_eq!(positions.len(), 2);

    // one side for two galaxies
    let edges = triangle_edges(&positions);
    assert_eq!(edges.len(), 1);

    // no bearings means nothing to check
    let report = check_conventions(&catalog, &positions, SceneConfig::default().view, nalgebra::Vector3::x());
    assert!(report.outcomes.is_empty());

    let tail = generate_tail(*positions.get("A").unwrap(), &TailParams::default(), &mut StdRng::seed_from_u64(3)).unwrap();
    let figure = render(&SceneConfig::default(), &positions, &tail).unwrap();
    let galaxies = figure.layer(LayerKind::Galaxies).unwrap();
    let markers = galaxies
        .primitives
        .iter()
        .filter(|p| matches!(p, Primitive::Marker { .. }))
        .count();
    assert_eq!(markers, 2);
}
