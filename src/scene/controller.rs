use anyhow::Result;
use glam::Mat4;
use std::path::{Path, PathBuf};

use super::phase::{ScenePhase, StartupJoin};
use super::progress::progress_percent;
use crate::animation::AnimationMixer;
use crate::camera::Camera;
use crate::config::{CONTROLS_TARGET, DEFAULT_CAMERA_POSITION, MODEL_OFFSET, MODEL_SCALE};
use crate::controls::OrbitControls;
use crate::core::controller::Intent;
use crate::environment::Environment;
use crate::frame::{CancellationToken, FrameInfo, FrameTask};
use crate::model::{self, NodeTransform, SceneModel};
use crate::persistence::{serialize_transform, SceneState};
use crate::traits::{FrameView, RenderSurface, SceneHost};

/// Owns the scene view for one activation
///
/// All camera mutations go through this type: restored state, keyboard
/// nudges, pointer controls, and resizes arrive as calls or [`Intent`]s.
pub struct SceneController<H: SceneHost> {
    host: H,
    phase: ScenePhase,
    join: StartupJoin,
    pending_state: Option<SceneState>,
    asset_path: PathBuf,
    environment: Environment,
    camera: Option<Camera>,
    controls: Option<OrbitControls>,
    surface: Option<H::Surface>,
    model: Option<SceneModel>,
    mixer: Option<AnimationMixer>,
    pose: Vec<NodeTransform>,
    placement: Mat4,
    frame_task: FrameTask,
    progress: f32,
    last_error: Option<String>,
}

impl<H: SceneHost> SceneController<H> {
    pub fn new(host: H, asset_path: impl Into<PathBuf>) -> Self {
        Self {
            host,
            phase: ScenePhase::Uninitialized,
            join: StartupJoin::default(),
            pending_state: None,
            asset_path: asset_path.into(),
            environment: Environment::room(),
            camera: None,
            controls: None,
            surface: None,
            model: None,
            mixer: None,
            pose: Vec::new(),
            placement: model::placement(MODEL_OFFSET, MODEL_SCALE),
            frame_task: FrameTask::new(CancellationToken::new()),
            progress: 0.0,
            last_error: None,
        }
    }

    // === Accessors ===

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.controls.as_ref()
    }

    pub fn surface(&self) -> Option<&H::Surface> {
        self.surface.as_ref()
    }

    pub fn model(&self) -> Option<&SceneModel> {
        self.model.as_ref()
    }

    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn asset_path(&self) -> &Path {
        &self.asset_path
    }

    /// Loading-indicator value in percent
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_state_pending(&self) -> bool {
        self.join.state_pending()
    }

    pub fn frame_token(&self) -> CancellationToken {
        self.frame_task.token().clone()
    }

    // === Startup ===

    /// The view was mounted: start the camera-state lookup
    pub fn mount(&mut self) {
        if self.phase != ScenePhase::Uninitialized {
            return;
        }
        self.set_phase(ScenePhase::LoadingState);
        self.host.fetch_camera_state();
    }

    /// The camera-state lookup finished (with or without a value)
    pub fn on_camera_state(&mut self, state: Option<SceneState>) {
        match self.phase {
            ScenePhase::LoadingState => {
                self.pending_state = state;
                if self.join.mark_state_resolved() {
                    self.initialize();
                }
            }
            phase if self.camera.is_some() && phase != ScenePhase::Disposed => {
                // Late arrival: the camera already exists, so apply in place
                self.join.mark_state_resolved();
                if let Some(camera) = self.camera.as_mut() {
                    apply_state(camera, state.as_ref());
                }
            }
            phase => log::debug!("Dropping camera state in phase {}", phase.label()),
        }
    }

    /// The drawing area now exists
    pub fn on_surface_available(&mut self) {
        if self.phase != ScenePhase::LoadingState {
            return;
        }
        if self.join.mark_surface_ready() {
            self.initialize();
        }
    }

    fn initialize(&mut self) {
        self.set_phase(ScenePhase::InitializingSurface);

        let Some(area) = self.host.drawing_area() else {
            self.fail("drawing area disappeared before setup".to_string());
            return;
        };

        let mut surface = match self.host.create_surface(area) {
            Ok(surface) => surface,
            Err(e) => {
                self.fail(format!("Failed to create render surface: {:#}", e));
                return;
            }
        };
        surface.set_environment(&self.environment);

        let mut camera = Camera::new(DEFAULT_CAMERA_POSITION, area.aspect());
        camera.look_at(CONTROLS_TARGET);
        apply_state(&mut camera, self.pending_state.take().as_ref());

        self.camera = Some(camera);
        self.controls = Some(OrbitControls::new(CONTROLS_TARGET));
        self.surface = Some(surface);

        self.begin_asset_load();
    }

    // === Asset loading ===

    fn begin_asset_load(&mut self) {
        self.progress = 0.0;
        self.last_error = None;
        self.set_phase(ScenePhase::LoadingAsset);
        self.host.fetch_asset(&self.asset_path);
    }

    pub fn on_asset_progress(&mut self, loaded: u64, total: u64) {
        if self.phase != ScenePhase::LoadingAsset {
            return;
        }
        self.progress = progress_percent(loaded, total, self.join.state_pending());
        log::debug!("Asset progress: {:.0}%", self.progress);
    }

    pub fn on_asset_loaded(&mut self, model: SceneModel) {
        if self.phase != ScenePhase::LoadingAsset {
            log::debug!("Dropping loaded asset in phase {}", self.phase.label());
            return;
        }

        if let Some(surface) = self.surface.as_mut() {
            if let Err(e) = surface.upload_model(&model) {
                self.fail(format!("Failed to upload model: {:#}", e));
                return;
            }
        }

        self.pose = model.rest_pose();
        self.mixer = model.animations.first().cloned().map(AnimationMixer::new);
        self.model = Some(model);
        self.progress = 100.0;

        self.set_phase(ScenePhase::Running);
        self.schedule_frame();
    }

    pub fn on_asset_failed(&mut self, error: &str) {
        if self.phase != ScenePhase::LoadingAsset {
            return;
        }
        self.fail(format!("Failed to load scene asset: {}", error));
    }

    /// Try again after a failure
    pub fn retry(&mut self) {
        if self.phase != ScenePhase::Failed {
            return;
        }
        log::info!("Retrying scene setup");
        if self.surface.is_some() {
            self.begin_asset_load();
        } else {
            self.initialize();
        }
    }

    fn fail(&mut self, message: String) {
        log::error!("{}", message);
        self.last_error = Some(message);
        self.set_phase(ScenePhase::Failed);
    }

    // === Frame loop ===

    fn schedule_frame(&mut self) {
        if self.frame_task.try_schedule() {
            self.host.request_frame();
        }
    }

    /// One iteration of the frame loop
    pub fn frame(&mut self, info: &FrameInfo) {
        if !self.frame_task.begin_frame() || self.phase != ScenePhase::Running {
            return;
        }

        if let Some(mixer) = self.mixer.as_mut() {
            mixer.update(info.delta);
            mixer.apply(&mut self.pose);
        }

        if let (Some(controls), Some(camera)) = (self.controls.as_mut(), self.camera.as_mut()) {
            controls.update(camera);
        }

        if let Err(e) = self.render(info) {
            log::error!("Render error: {:#}", e);
        }

        self.schedule_frame();
    }

    fn render(&mut self, info: &FrameInfo) -> Result<()> {
        let (Some(surface), Some(camera), Some(model)) =
            (self.surface.as_mut(), self.camera.as_ref(), self.model.as_ref())
        else {
            return Ok(());
        };

        let node_transforms = model.world_transforms(&self.pose, self.placement);
        surface.render(&FrameView {
            camera,
            node_transforms: &node_transforms,
            frame: *info,
        })
    }

    // === Input ===

    /// Apply an input intent; ignored until the camera exists
    pub fn submit(&mut self, intent: Intent) {
        if let Intent::Retry = intent {
            self.retry();
            return;
        }
        if !self.phase.has_surface() {
            return;
        }
        if let Intent::Resize { width, height } = intent {
            self.resize(width, height);
            return;
        }

        let (Some(camera), Some(controls)) = (self.camera.as_mut(), self.controls.as_mut()) else {
            return;
        };
        let viewport_height = self
            .surface
            .as_ref()
            .map(|s| s.dimensions().1)
            .unwrap_or(1);

        match intent {
            Intent::Nudge { axis, amount } => {
                camera.nudge(axis, amount);
                controls.invalidate();
            }
            Intent::Orbit { dx, dy } => controls.rotate_by_pixels(dx, dy, viewport_height),
            Intent::Pan { dx, dy } => controls.pan_by_pixels(camera, dx, dy, viewport_height),
            Intent::Zoom { lines } => controls.zoom(lines),
            Intent::Resize { .. } | Intent::Retry => {}
        }
    }

    /// Recompute aspect from the drawing area and resize the surface to the window
    ///
    /// A minimized window (zero extent or no drawing area) keeps the previous
    /// aspect and surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.phase.has_surface() || width == 0 || height == 0 {
            return;
        }
        let Some(area) = self.host.drawing_area() else {
            return;
        };

        if let Some(camera) = self.camera.as_mut() {
            camera.aspect = area.aspect();
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    // === Teardown ===

    /// Persist the camera and release everything; later calls do nothing
    pub fn dispose(&mut self) {
        if self.phase == ScenePhase::Disposed {
            return;
        }

        self.frame_task.cancel();

        if let Some(camera) = self.camera.take() {
            let serialized = serialize_transform(&camera.matrix());
            if let Err(e) = self.host.store_camera_state(&serialized) {
                log::warn!("Failed to persist camera state: {:#}", e);
            }
        }

        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        self.controls = None;
        self.model = None;
        self.mixer = None;
        self.pose.clear();
        self.pending_state = None;

        self.set_phase(ScenePhase::Disposed);
    }

    fn set_phase(&mut self, phase: ScenePhase) {
        if self.phase != phase {
            log::info!("Scene: {} -> {}", self.phase.label(), phase.label());
            self.phase = phase;
        }
    }
}

impl<H: SceneHost> Drop for SceneController<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Restore a saved transform onto `camera`; returns true if one was applied
fn apply_state(camera: &mut Camera, state: Option<&SceneState>) -> bool {
    match state.and_then(SceneState::transform) {
        Some(Ok(matrix)) => {
            camera.set_matrix(&matrix);
            log::info!("Restored camera at {:?}", camera.position);
            true
        }
        Some(Err(e)) => {
            log::warn!("Ignoring saved camera state: {}", e);
            false
        }
        None => {
            log::debug!("No saved camera state, using default position");
            false
        }
    }
}
