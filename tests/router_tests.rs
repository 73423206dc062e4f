use book_viewer::router::{normalize, resolve, Router, View};

// ============================================================================
// Route table
// ============================================================================

#[test]
fn test_known_routes_resolve_to_views() {
    assert_eq!(resolve("/about"), ("/about".to_string(), View::About));
    assert_eq!(resolve("/scene"), ("/scene".to_string(), View::Scene));
    assert_eq!(resolve("/404"), ("/404".to_string(), View::NotFound));
}

#[test]
fn test_redirects_are_followed() {
    assert_eq!(resolve("/").1, View::Scene);
    assert_eq!(resolve("#/").1, View::Scene);
    assert_eq!(resolve("/scene/extra").1, View::NotFound);
    assert_eq!(resolve("").1, View::Scene);
}

#[test]
fn test_normalize_accepts_hash_and_relative_paths() {
    assert_eq!(normalize("#/about"), "/about");
    assert_eq!(normalize("about"), "/about");
    assert_eq!(normalize("  /scene "), "/scene");
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_router_starts_on_scene_by_default() {
    let router = Router::default();
    assert_eq!(router.path(), "/scene");
    assert_eq!(router.view(), View::Scene);
}

#[test]
fn test_navigate_reports_view_changes() {
    let mut router = Router::new("/about");

    assert!(router.navigate("/scene"));
    assert!(!router.navigate("/"));
    assert!(router.navigate("/missing"));
    assert_eq!(router.path(), "/404");
    assert!(!router.navigate("/also-missing"));
    assert!(router.navigate("#/about"));
    assert_eq!(router.view(), View::About);
}
