//! Scene view lifecycle: camera restore, asset loading, frame loop, teardown.

pub mod controller;
pub mod phase;
pub mod progress;

pub use controller::SceneController;
pub use phase::{ScenePhase, StartupJoin};
pub use progress::progress_percent;
