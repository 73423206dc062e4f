pub mod animation;
pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod environment;
pub mod frame;
pub mod loaders;
pub mod model;
pub mod persistence;
pub mod renderer;
pub mod router;
pub mod scene;
pub mod traits;
pub mod types;
pub mod ui;

pub use persistence::{CameraStore, JsonFileStore, MemoryStore, SceneState};
pub use scene::{SceneController, ScenePhase};
