use anyhow::Result;
use std::path::Path;

use super::surface::RenderSurface;
use crate::core::window::WindowDimensions;

/// Environment the scene controller runs in
///
/// Fetches are fire-and-forget: results come back later through the
/// controller's `on_*` methods.
pub trait SceneHost {
    type Surface: RenderSurface;

    /// Start reading the persisted camera state
    fn fetch_camera_state(&mut self);

    /// Persist a serialized camera transform
    fn store_camera_state(&mut self, serialized: &str) -> Result<()>;

    /// Start loading the scene asset at `path`
    fn fetch_asset(&mut self, path: &Path);

    /// Ask for one more frame callback
    fn request_frame(&mut self);

    /// Size of the drawing area, if it exists yet
    fn drawing_area(&self) -> Option<WindowDimensions>;

    /// Build a render surface bound to the drawing area
    fn create_surface(&mut self, area: WindowDimensions) -> Result<Self::Surface>;
}
