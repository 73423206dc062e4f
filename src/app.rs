//! Winit-side plumbing for the scene controller.
//!
//! Persistence reads and asset loads run on short-lived threads. Their
//! results come back to the event loop as [`AppEvent`]s tagged with the
//! activation that asked for them, so completions for a scene that has
//! since been torn down are recognised and dropped.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;

use crate::config::StoreKind;
use crate::core::{GpuContext, WindowDimensions};
use crate::loaders::load_scene;
use crate::model::SceneModel;
use crate::persistence::{CameraStore, JsonFileStore, MemoryStore, SceneState};
use crate::renderer::GpuSceneSurface;
use crate::traits::SceneHost;

/// Store shared between the loop thread and background readers
pub type SharedStore = Arc<dyn CameraStore + Send + Sync>;

/// Completion posted back to the event loop
pub enum AppEvent {
    CameraState {
        activation: u64,
        state: Option<SceneState>,
    },
    AssetProgress {
        activation: u64,
        loaded: u64,
        total: u64,
    },
    AssetLoaded {
        activation: u64,
        model: Box<SceneModel>,
    },
    AssetFailed {
        activation: u64,
        error: String,
    },
}

impl AppEvent {
    /// Scene activation this event belongs to
    pub fn activation(&self) -> u64 {
        match self {
            AppEvent::CameraState { activation, .. }
            | AppEvent::AssetProgress { activation, .. }
            | AppEvent::AssetLoaded { activation, .. }
            | AppEvent::AssetFailed { activation, .. } => *activation,
        }
    }
}

pub fn open_store(kind: &StoreKind) -> SharedStore {
    match kind {
        StoreKind::File(path) => {
            log::info!("Camera state file: {:?}", path);
            Arc::new(JsonFileStore::new(path.clone()))
        }
        StoreKind::Memory => {
            log::info!("Camera state kept in memory only");
            Arc::new(MemoryStore::new())
        }
    }
}

/// [`SceneHost`] backed by a winit window and wgpu device
pub struct WinitHost {
    activation: u64,
    proxy: EventLoopProxy<AppEvent>,
    store: SharedStore,
    window: Arc<Window>,
    gpu: Arc<GpuContext>,
    format: wgpu::TextureFormat,
}

impl WinitHost {
    pub fn new(
        activation: u64,
        proxy: EventLoopProxy<AppEvent>,
        store: SharedStore,
        window: Arc<Window>,
        gpu: Arc<GpuContext>,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            activation,
            proxy,
            store,
            window,
            gpu,
            format,
        }
    }

    pub fn activation(&self) -> u64 {
        self.activation
    }
}

fn post(proxy: &EventLoopProxy<AppEvent>, event: AppEvent) {
    if proxy.send_event(event).is_err() {
        log::debug!("Event loop closed, dropping completion");
    }
}

/// Run `task` on a named thread; if the thread cannot start, post `fallback`
fn spawn_task(
    name: &str,
    proxy: &EventLoopProxy<AppEvent>,
    fallback: AppEvent,
    task: impl FnOnce() + Send + 'static,
) {
    if let Err(e) = std::thread::Builder::new().name(name.to_string()).spawn(task) {
        log::error!("Failed to start {} thread: {}", name, e);
        post(proxy, fallback);
    }
}

impl SceneHost for WinitHost {
    type Surface = GpuSceneSurface;

    fn fetch_camera_state(&mut self) {
        let activation = self.activation;
        let store = Arc::clone(&self.store);
        let proxy = self.proxy.clone();

        spawn_task(
            "camera-state",
            &self.proxy,
            AppEvent::CameraState {
                activation,
                state: None,
            },
            move || {
                let state = store.get_camera_state();
                post(&proxy, AppEvent::CameraState { activation, state });
            },
        );
    }

    fn store_camera_state(&mut self, serialized: &str) -> Result<()> {
        // Synchronous: teardown may be the last thing the process does
        self.store.set_camera_state(serialized)?;
        log::info!("Camera state saved");
        Ok(())
    }

    fn fetch_asset(&mut self, path: &Path) {
        let activation = self.activation;
        let path = path.to_path_buf();
        let proxy = self.proxy.clone();

        spawn_task(
            "asset-loader",
            &self.proxy,
            AppEvent::AssetFailed {
                activation,
                error: "could not start loader thread".to_string(),
            },
            move || {
                let result = load_scene(&path, |loaded, total| {
                    post(
                        &proxy,
                        AppEvent::AssetProgress {
                            activation,
                            loaded,
                            total,
                        },
                    );
                });
                let event = match result {
                    Ok(model) => AppEvent::AssetLoaded {
                        activation,
                        model: Box::new(model),
                    },
                    Err(e) => AppEvent::AssetFailed {
                        activation,
                        error: format!("{:#}", e),
                    },
                };
                post(&proxy, event);
            },
        );
    }

    fn request_frame(&mut self) {
        self.window.request_redraw();
    }

    fn drawing_area(&self) -> Option<WindowDimensions> {
        let area = WindowDimensions::from(self.window.inner_size());
        (!area.is_empty()).then_some(area)
    }

    fn create_surface(&mut self, area: WindowDimensions) -> Result<Self::Surface> {
        Ok(GpuSceneSurface::new(
            Arc::clone(&self.gpu),
            self.format,
            area.width,
            area.height,
        ))
    }
}
