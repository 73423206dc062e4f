pub mod controller;
pub mod gpu_context;
pub mod input_adapter;
pub mod surface_renderer;
pub mod window;

pub use controller::*;
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use surface_renderer::SurfaceRenderer;
pub use window::*;
