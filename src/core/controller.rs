use crate::camera::Axis;
use crate::config::KEY_NUDGE_STEP;

/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyR,
    MouseLeft,
    MouseRight,
}

/// Controller - handles button input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;
}

/// A requested change to the scene, applied by its owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Move the camera along one world axis
    Nudge { axis: Axis, amount: f32 },
    /// Orbit drag in pixels
    Orbit { dx: f32, dy: f32 },
    /// Pan drag in pixels
    Pan { dx: f32, dy: f32 },
    /// Wheel movement in lines, positive toward the target
    Zoom { lines: f32 },
    /// Host window changed size
    Resize { width: u32, height: u32 },
    /// Try the asset load again after a failure
    Retry,
}

impl Intent {
    /// Intent produced when `button` is released
    pub fn on_release(button: Button) -> Option<Intent> {
        let nudge = |axis, amount| Some(Intent::Nudge { axis, amount });
        match button {
            Button::ArrowRight => nudge(Axis::X, KEY_NUDGE_STEP),
            Button::ArrowLeft => nudge(Axis::X, -KEY_NUDGE_STEP),
            Button::ArrowUp => nudge(Axis::Y, KEY_NUDGE_STEP),
            Button::ArrowDown => nudge(Axis::Y, -KEY_NUDGE_STEP),
            Button::KeyR => Some(Intent::Retry),
            Button::MouseLeft | Button::MouseRight => None,
        }
    }
}
