use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use book_viewer::app::{open_store, AppEvent, SharedStore, WinitHost};
use book_viewer::cli::Cli;
use book_viewer::config::{ViewerConfig, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, WINDOW_TITLE};
use book_viewer::core::{GpuContext, SurfaceRenderer, WinitController};
use book_viewer::environment::Environment;
use book_viewer::frame::FrameIterator;
use book_viewer::router::{Router, View};
use book_viewer::scene::SceneController;
use book_viewer::ui::{Overlay, SceneStatus, UiAction};

/// Window, GPU, and compositor, created once the event loop is running
struct Display {
    window: Arc<Window>,
    gpu: Arc<GpuContext>,
    compositor: SurfaceRenderer,
}

struct App {
    config: ViewerConfig,
    store: SharedStore,
    proxy: EventLoopProxy<AppEvent>,
    router: Router,
    display: Option<Display>,
    scene: Option<SceneController<WinitHost>>,
    activation: u64,
    input: WinitController,
    frames: FrameIterator,
    background: wgpu::Color,
}

impl App {
    fn new(config: ViewerConfig, proxy: EventLoopProxy<AppEvent>) -> Self {
        let store = open_store(&config.store);
        let router = Router::new(&config.initial_route);
        Self {
            config,
            store,
            proxy,
            router,
            display: None,
            scene: None,
            activation: 0,
            input: WinitController::new(),
            frames: FrameIterator::new(),
            background: Environment::default().clear_color(),
        }
    }

    fn create_display(event_loop: &ActiveEventLoop) -> anyhow::Result<Display> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )?,
        );
        let (gpu, surface) = pollster::block_on(GpuContext::for_window(window.clone()))?;
        let gpu = Arc::new(gpu);
        let compositor = SurfaceRenderer::new(window.clone(), gpu.clone(), surface)?;

        Ok(Display {
            window,
            gpu,
            compositor,
        })
    }

    /// Build or tear down the scene to match the active route
    fn sync_view(&mut self) {
        if self.router.view() != View::Scene {
            // Dropping the controller persists the camera and frees the GPU side
            if self.scene.take().is_some() {
                log::info!("Scene view deactivated");
            }
        } else if self.scene.is_none() {
            let Some(display) = &self.display else {
                return;
            };

            self.activation += 1;
            let host = WinitHost::new(
                self.activation,
                self.proxy.clone(),
                Arc::clone(&self.store),
                display.window.clone(),
                display.gpu.clone(),
                display.compositor.format(),
            );
            let mut scene = SceneController::new(host, self.config.asset_path.clone());
            scene.mount();
            scene.on_surface_available();
            self.scene = Some(scene);
            log::info!("Scene view activated (#{})", self.activation);
        }

        self.request_redraw();
    }

    fn request_redraw(&self) {
        if let Some(display) = &self.display {
            display.window.request_redraw();
        }
    }

    fn navigate(&mut self, path: &str) {
        if self.router.navigate(path) {
            self.update_title();
            self.sync_view();
        }
    }

    fn update_title(&self) {
        if let Some(display) = &self.display {
            display
                .window
                .set_title(&format!("{} - {}", WINDOW_TITLE, self.router.view().title()));
        }
    }

    fn redraw(&mut self) {
        if let (Some(scene), Some(frame)) = (self.scene.as_mut(), self.frames.next()) {
            scene.frame(&frame);
        }

        let Some(display) = self.display.as_mut() else {
            return;
        };

        let scene_view = self.scene.as_ref().and_then(|s| s.surface()).and_then(|s| s.output_view());
        let overlay = Overlay {
            path: self.router.path(),
            view: self.router.view(),
            scene: self.scene.as_ref().map(|s| SceneStatus {
                phase: s.phase(),
                progress: s.progress(),
                error: s.last_error().map(str::to_string),
            }),
        };

        let mut actions = Vec::new();
        let show_ui = self.config.show_ui;
        let result = display.compositor.present(scene_view, self.background, |ctx| {
            if show_ui {
                actions = overlay.show(ctx);
            }
        });
        if let Err(e) = result {
            log::error!("Present failed: {:#}", e);
        }

        for action in actions {
            match action {
                UiAction::Navigate(path) => self.navigate(path),
                UiAction::Retry => {
                    if let Some(scene) = self.scene.as_mut() {
                        scene.retry();
                    }
                }
            }
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.display.is_some() {
            return;
        }

        match Self::create_display(event_loop) {
            Ok(display) => {
                self.display = Some(display);
                self.update_title();
            }
            Err(e) => {
                log::error!("Failed to initialize display: {:#}", e);
                event_loop.exit();
                return;
            }
        }

        self.sync_view();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if event.activation() != self.activation {
            log::debug!("Dropping completion for activation #{}", event.activation());
            return;
        }

        match event {
            AppEvent::CameraState { state, .. } => scene.on_camera_state(state),
            AppEvent::AssetProgress { loaded, total, .. } => scene.on_asset_progress(loaded, total),
            AppEvent::AssetLoaded { model, .. } => {
                scene.on_asset_loaded(*model);
                self.frames.reset_delta();
            }
            AppEvent::AssetFailed { error, .. } => scene.on_asset_failed(&error),
        }

        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let Some(display) = self.display.as_mut() {
            if display.compositor.handle_event(&event) {
                // A drag released over the overlay must still end
                if WinitController::ends_held_state(&event) {
                    self.input.process_event(&event);
                }
                display.window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.scene = None;
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::Resized(size) => {
                if let Some(display) = self.display.as_mut() {
                    display.compositor.resize(size.width, size.height);
                }
                if let (Some(intent), Some(scene)) =
                    (self.input.process_event(&event), self.scene.as_mut())
                {
                    scene.submit(intent);
                }
                self.request_redraw();
            }
            event => {
                if let Some(intent) = self.input.process_event(&event) {
                    if let Some(scene) = self.scene.as_mut() {
                        scene.submit(intent);
                    }
                    self.request_redraw();
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scene = None;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::from(Cli::parse());
    log::info!("Starting with {:?}", config);

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    let mut app = App::new(config, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    Ok(())
}
