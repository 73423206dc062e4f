use anyhow::Result;
use glam::Mat4;

use crate::camera::Camera;
use crate::environment::Environment;
use crate::frame::FrameInfo;
use crate::model::SceneModel;

/// Everything needed to draw one frame
pub struct FrameView<'a> {
    pub camera: &'a Camera,
    /// World matrix per model node, indexed like `SceneModel::nodes`
    pub node_transforms: &'a [Mat4],
    pub frame: FrameInfo,
}

/// Drawing target bound to the host's drawing area
pub trait RenderSurface {
    /// Current size in physical pixels
    fn dimensions(&self) -> (u32, u32);

    /// Match a new drawing-area size
    fn resize(&mut self, width: u32, height: u32);

    /// Install the lighting backdrop
    fn set_environment(&mut self, environment: &Environment);

    /// Upload geometry for a freshly loaded model
    fn upload_model(&mut self, model: &SceneModel) -> Result<()>;

    /// Draw one frame
    fn render(&mut self, view: &FrameView<'_>) -> Result<()>;

    /// Free GPU resources; the surface draws nothing afterwards
    fn release(&mut self);
}
