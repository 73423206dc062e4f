//! Static viewer configuration.
//!
//! Scene constants are fixed at build time; per-run settings come from the
//! command line and are collected into [`ViewerConfig`].

use glam::Vec3;
use std::path::PathBuf;

use crate::cli::Cli;

// === Asset & persistence ===

/// Must not require Draco compression: no decoder resource ships with the
/// viewer, and such assets fail with a message naming the extension
pub const DEFAULT_ASSET_PATH: &str = "assets/book.glb";
pub const DEFAULT_STATE_FILE: &str = "camera_state.json";

// === Camera ===

/// Vertical field of view in degrees
pub const CAMERA_FOV_DEGREES: f32 = 40.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 100.0;
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(5.0, 2.0, 8.0);
pub const CONTROLS_TARGET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Distance moved per arrow key release
pub const KEY_NUDGE_STEP: f32 = 5.0;

// === Controls ===

pub const DAMPING_FACTOR: f32 = 0.05;
pub const ROTATE_SPEED: f32 = 1.0;
pub const PAN_SPEED: f32 = 1.0;
pub const ZOOM_STEP: f32 = 0.95;

// === Model placement ===

pub const MODEL_OFFSET: Vec3 = Vec3::new(1.0, 1.0, 0.0);
pub const MODEL_SCALE: f32 = 0.01;

// === Loading indicator ===

/// Points subtracted from the reported percentage while the camera-state
/// lookup is still outstanding
pub const PROGRESS_HOLDBACK: f32 = 10.0;

// === Window ===

pub const INITIAL_WINDOW_WIDTH: u32 = 1280;
pub const INITIAL_WINDOW_HEIGHT: u32 = 800;
pub const WINDOW_TITLE: &str = "Book Viewer";

/// Where camera state is kept between sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    File(PathBuf),
    Memory,
}

/// Per-run settings
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub asset_path: PathBuf,
    pub store: StoreKind,
    pub initial_route: String,
    pub show_ui: bool,
}

impl From<Cli> for ViewerConfig {
    fn from(cli: Cli) -> Self {
        let store = if cli.no_persist {
            StoreKind::Memory
        } else {
            StoreKind::File(cli.state_file)
        };

        Self {
            asset_path: cli.asset,
            store,
            initial_route: cli.route,
            show_ui: !cli.no_ui,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from(DEFAULT_ASSET_PATH),
            store: StoreKind::File(PathBuf::from(DEFAULT_STATE_FILE)),
            initial_route: "/".to_string(),
            show_ui: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn no_persist_selects_memory_store() {
        let cli = Cli::parse_from(["book-viewer", "--no-persist"]);
        let config = ViewerConfig::from(cli);
        assert_eq!(config.store, StoreKind::Memory);
    }

    #[test]
    fn state_file_is_carried_over() {
        let cli = Cli::parse_from(["book-viewer", "--state-file", "/tmp/cam.json"]);
        let config = ViewerConfig::from(cli);
        assert_eq!(config.store, StoreKind::File(PathBuf::from("/tmp/cam.json")));
        assert!(config.show_ui);
    }
}
