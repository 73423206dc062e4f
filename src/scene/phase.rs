/// Lifecycle of one scene-view activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Uninitialized,
    /// Waiting for the camera-state lookup and the drawing area
    LoadingState,
    InitializingSurface,
    LoadingAsset,
    Running,
    /// Surface or asset setup failed; a retry is possible
    Failed,
    Disposed,
}

impl ScenePhase {
    /// Phases in which a camera and render surface exist
    pub fn has_surface(self) -> bool {
        matches!(
            self,
            ScenePhase::InitializingSurface
                | ScenePhase::LoadingAsset
                | ScenePhase::Running
                | ScenePhase::Failed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ScenePhase::Uninitialized => "uninitialized",
            ScenePhase::LoadingState => "loading state",
            ScenePhase::InitializingSurface => "initializing surface",
            ScenePhase::LoadingAsset => "loading asset",
            ScenePhase::Running => "running",
            ScenePhase::Failed => "failed",
            ScenePhase::Disposed => "disposed",
        }
    }
}

/// Join of the two startup completions: state lookup and drawing area
///
/// Each `mark_*` call returns true exactly once, for whichever completion
/// arrives second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupJoin {
    state_resolved: bool,
    surface_ready: bool,
}

impl StartupJoin {
    pub fn mark_state_resolved(&mut self) -> bool {
        let fires = !self.state_resolved && self.surface_ready;
        self.state_resolved = true;
        fires
    }

    pub fn mark_surface_ready(&mut self) -> bool {
        let fires = !self.surface_ready && self.state_resolved;
        self.surface_ready = true;
        fires
    }

    pub fn state_pending(&self) -> bool {
        !self.state_resolved
    }
}
