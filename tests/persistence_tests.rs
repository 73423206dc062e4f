use book_viewer::persistence::{
    parse_transform, serialize_transform, CameraStore, JsonFileStore, MemoryStore, SceneState,
};
use glam::{Mat4, Quat, Vec3};
use std::fs;

fn sample_transform() -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::ONE,
        Quat::from_rotation_x(-0.2) * Quat::from_rotation_y(0.9),
        Vec3::new(5.0, 2.0, 8.0),
    )
}

// ============================================================================
// JSON file store
// ============================================================================

#[test]
fn test_missing_file_means_no_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("camera_state.json"));
    assert!(store.get_camera_state().is_none());
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("camera_state.json"));

    let serialized = serialize_transform(&sample_transform());
    store.set_camera_state(&serialized).unwrap();

    let state = store.get_camera_state().unwrap();
    assert_eq!(state, SceneState::new(serialized));
    let restored = state.transform().unwrap().unwrap();
    assert!(restored.abs_diff_eq(sample_transform(), 1e-6));
}

#[test]
fn test_file_store_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    let store = JsonFileStore::new(&path);
    store.set_camera_state("[1]").unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["cameraPosition"], "[1]");
    assert!(json["savedAt"].is_string());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("camera_state.json"));
    store.set_camera_state("[1]").unwrap();
    store.set_camera_state("[2]").unwrap();

    assert_eq!(store.get_camera_state(), Some(SceneState::new("[2]")));
}

#[test]
fn test_corrupt_file_means_no_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(JsonFileStore::new(&path).get_camera_state().is_none());
}

#[test]
fn test_record_without_saved_at_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera_state.json");
    fs::write(&path, r#"{"cameraPosition": null}"#).unwrap();

    let state = JsonFileStore::new(&path).get_camera_state().unwrap();
    assert!(state.transform().is_none());
}

#[test]
fn test_unwritable_location_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();

    // A regular file cannot act as a parent directory
    let store = JsonFileStore::new(blocker.join("camera_state.json"));
    assert!(store.set_camera_state("[1]").is_err());
}

// ============================================================================
// Memory store & transform codec
// ============================================================================

#[test]
fn test_memory_store_starts_with_seed() {
    let store = MemoryStore::with_state("[0]");
    assert_eq!(store.raw().as_deref(), Some("[0]"));
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_serialized_transform_is_column_major() {
    let text = serialize_transform(&Mat4::from_translation(Vec3::new(7.0, 8.0, 9.0)));
    let values: Vec<f32> = serde_json::from_str(&text).unwrap();

    assert_eq!(values.len(), 16);
    assert_eq!(&values[12..15], &[7.0, 8.0, 9.0]);
    assert_eq!(parse_transform(&text).unwrap().w_axis.x, 7.0);
}
