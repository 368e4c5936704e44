use std::path::Path;

use glam::IVec2;

use clearance::{ClearanceMap, Connectivity, FieldConfig, FieldError};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn loads_field_config_from_yaml() {
    let config = FieldConfig::load(fixture("field.yaml")).expect("config should load");

    assert_eq!(config.width, 64);
    assert_eq!(config.height, 48);
    assert_eq!(config.inflation_radius, 12.0);
    assert!((config.frame_budget().as_secs_f64() - 0.002).abs() < 1e-9);
    assert_eq!(config.connectivity, Connectivity::Four);
    assert_eq!(config.max_search_radius, 32);
    assert_eq!(config.obstacles.len(), 3);
    assert_eq!(config.obstacles[1].center(), IVec2::new(40, 30));
}

#[test]
fn map_loaded_from_yaml_contains_its_obstacles() {
    let map = ClearanceMap::load(fixture("field.yaml")).expect("map should load");
    assert_eq!(map.obstacle_count().unwrap(), 3);

    map.complete_inflation_now().unwrap();
    assert_eq!(map.distance_at(IVec2::new(10, 10)).unwrap(), 0.0);
    assert_eq!(map.distance_at(IVec2::new(63, 0)).unwrap(), 0.0);
    assert!(!map.can_place_object(IVec2::new(40, 30), 1.0).unwrap());
    assert!(map.can_place_object(IVec2::new(25, 20), 3.0).unwrap());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = FieldConfig::load(fixture("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, FieldError::Io(_)));
}

#[test]
fn malformed_yaml_is_rejected() {
    assert!(matches!(
        FieldConfig::from_yaml_str("width: [1, 2]\nheight: 3\n"),
        Err(FieldError::Yaml(_))
    ));
    assert!(matches!(
        FieldConfig::from_yaml_str("width: 8\nheight: 8\ninflation_radius: 2.0\nconnectivity: 6\n"),
        Err(FieldError::Yaml(_))
    ));
    assert!(matches!(
        FieldConfig::from_yaml_str("width: 8\nheight: 0\ninflation_radius: 2.0\n"),
        Err(FieldError::InvalidConfig(_))
    ));
}
