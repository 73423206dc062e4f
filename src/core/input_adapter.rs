use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller, Intent};

/// Pixels per wheel "line" for touchpads that report pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Adapter that turns Winit events into scene intents
#[derive(Debug, Clone)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Current mouse position (relative to window)
    mouse_position: Option<(f32, f32)>,
}

impl WinitController {
    /// Create a new WinitController with no pressed keys
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            mouse_position: None,
        }
    }

    /// Process a Winit WindowEvent, returning the intent it maps to
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<Intent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(keycode) = event.physical_key else {
                    return None;
                };
                let button = Self::keycode_to_button(keycode)?;
                self.button_changed(button, event.state)
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = Self::mouse_button_to_button(*button)?;
                self.button_changed(button, *state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
                None
            }
            WindowEvent::Focused(false) => {
                self.release_all();
                None
            }
            WindowEvent::MouseWheel { delta, .. } => Self::wheel(*delta),
            WindowEvent::Resized(size) => Some(Intent::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    /// Record a press or release; releases of mapped keys produce intents
    pub fn button_changed(&mut self, button: Button, state: ElementState) -> Option<Intent> {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(button);
                None
            }
            ElementState::Released => {
                self.pressed_keys.remove(&button);
                Intent::on_release(button)
            }
        }
    }

    /// Forget every held button, ending any drag in progress
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    /// Events that end held state and must reach the adapter even when the
    /// overlay consumed them
    pub fn ends_held_state(event: &WindowEvent) -> bool {
        matches!(
            event,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } | WindowEvent::CursorLeft { .. }
                | WindowEvent::Focused(false)
        )
    }

    /// Track the pointer; a held mouse button turns movement into a drag
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<Intent> {
        let previous = self.mouse_position.replace((x, y))?;
        let (dx, dy) = (x - previous.0, y - previous.1);

        if self.is_down(Button::MouseLeft) {
            Some(Intent::Orbit { dx, dy })
        } else if self.is_down(Button::MouseRight) {
            Some(Intent::Pan { dx, dy })
        } else {
            None
        }
    }

    /// Get current mouse position (if available)
    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    fn wheel(delta: MouseScrollDelta) -> Option<Intent> {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        (lines != 0.0).then_some(Intent::Zoom { lines })
    }

    /// Map Winit KeyCode to Button
    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ArrowLeft => Some(Button::ArrowLeft),
            KeyCode::ArrowRight => Some(Button::ArrowRight),
            KeyCode::ArrowUp => Some(Button::ArrowUp),
            KeyCode::ArrowDown => Some(Button::ArrowDown),
            KeyCode::KeyR => Some(Button::KeyR),
            _ => None,
        }
    }

    /// Map Winit MouseButton to Button
    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Right => Some(Button::MouseRight),
            _ => None,
        }
    }
}

impl Default for WinitController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Axis;
    use winit::dpi::PhysicalPosition;

    // Note: KeyEvent cannot be constructed outside winit, so keyboard paths
    // are exercised through button_changed

    #[test]
    fn key_up_nudges_but_key_down_does_not() {
        let mut controller = WinitController::new();

        assert_eq!(
            controller.button_changed(Button::ArrowRight, ElementState::Pressed),
            None
        );
        assert!(controller.is_down(Button::ArrowRight));

        assert_eq!(
            controller.button_changed(Button::ArrowRight, ElementState::Released),
            Some(Intent::Nudge { axis: Axis::X, amount: 5.0 })
        );
        assert!(!controller.is_down(Button::ArrowRight));
    }

    #[test]
    fn left_drag_orbits_right_drag_pans() {
        let mut controller = WinitController::new();
        assert_eq!(controller.cursor_moved(10.0, 10.0), None);

        controller.button_changed(Button::MouseLeft, ElementState::Pressed);
        assert_eq!(
            controller.cursor_moved(15.0, 8.0),
            Some(Intent::Orbit { dx: 5.0, dy: -2.0 })
        );
        controller.button_changed(Button::MouseLeft, ElementState::Released);

        controller.button_changed(Button::MouseRight, ElementState::Pressed);
        assert_eq!(
            controller.cursor_moved(20.0, 8.0),
            Some(Intent::Pan { dx: 5.0, dy: 0.0 })
        );
    }

    #[test]
    fn hover_without_buttons_is_ignored() {
        let mut controller = WinitController::new();
        controller.cursor_moved(0.0, 0.0);
        assert_eq!(controller.cursor_moved(50.0, 50.0), None);
        assert_eq!(controller.mouse_position(), Some((50.0, 50.0)));
    }

    #[test]
    fn wheel_maps_to_zoom() {
        assert_eq!(
            WinitController::wheel(MouseScrollDelta::LineDelta(0.0, 2.0)),
            Some(Intent::Zoom { lines: 2.0 })
        );
        assert_eq!(
            WinitController::wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -80.0))),
            Some(Intent::Zoom { lines: -2.0 })
        );
        assert_eq!(WinitController::wheel(MouseScrollDelta::LineDelta(1.0, 0.0)), None);
    }

    #[test]
    fn resize_event_maps_to_intent() {
        let mut controller = WinitController::new();
        let event = WindowEvent::Resized(winit::dpi::PhysicalSize::new(1024, 512));
        assert_eq!(
            controller.process_event(&event),
            Some(Intent::Resize { width: 1024, height: 512 })
        );
    }

    #[test]
    fn test_default_controller() {
        let controller = WinitController::default();
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.mouse_position(), None);
    }

    #[test]
    fn losing_focus_ends_a_drag() {
        let mut controller = WinitController::new();
        controller.cursor_moved(0.0, 0.0);
        controller.button_changed(Button::MouseLeft, ElementState::Pressed);
        assert!(controller.cursor_moved(4.0, 0.0).is_some());

        assert_eq!(controller.process_event(&WindowEvent::Focused(false)), None);

        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.cursor_moved(8.0, 0.0), None);
    }

    #[test]
    fn release_clears_drag_even_without_matching_press() {
        let mut controller = WinitController::new();
        controller.cursor_moved(0.0, 0.0);
        controller.button_changed(Button::MouseRight, ElementState::Pressed);
        controller.button_changed(Button::MouseRight, ElementState::Released);
        controller.button_changed(Button::MouseRight, ElementState::Released);

        assert!(!controller.is_down(Button::MouseRight));
        assert_eq!(controller.cursor_moved(10.0, 10.0), None);
    }

    #[test]
    fn focus_loss_bypasses_overlay_capture() {
        assert!(WinitController::ends_held_state(&WindowEvent::Focused(false)));
        assert!(!WinitController::ends_held_state(&WindowEvent::Focused(true)));
        assert!(!WinitController::ends_held_state(&WindowEvent::Resized(
            winit::dpi::PhysicalSize::new(10, 10)
        )));
    }
}
