//! Damped orbit navigation around a target point.
//!
//! Input handlers accumulate rotate/pan/zoom deltas; [`OrbitControls::update`]
//! applies a fraction of them each frame and writes the camera. The camera is
//! only touched when something is pending, so a restored transform survives
//! until the user moves.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::camera::Camera;
use crate::config::{DAMPING_FACTOR, PAN_SPEED, ROTATE_SPEED, ZOOM_STEP};

const EPS: f32 = 1e-6;

/// Spherical coordinates around the Y axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    rotate_delta: (f32, f32),
    pan_offset: Vec3,
    scale: f32,
    needs_sync: bool,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: true,
            damping_factor: DAMPING_FACTOR,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            rotate_delta: (0.0, 0.0),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            needs_sync: false,
        }
    }

    /// Rotate around the target by a pointer drag of `dx`, `dy` pixels
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let h = viewport_height.max(1) as f32;
        self.rotate_left(TAU * dx / h * ROTATE_SPEED);
        self.rotate_up(TAU * dy / h * ROTATE_SPEED);
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.rotate_delta.0 -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.rotate_delta.1 -= angle;
    }

    /// Pan the target by a pointer drag, scaled so the point under the cursor follows it
    pub fn pan_by_pixels(&mut self, camera: &Camera, dx: f32, dy: f32, viewport_height: u32) {
        let h = viewport_height.max(1) as f32;
        let distance = (camera.position - self.target).length()
            * (camera.fov.to_radians() * 0.5).tan();

        let left = -camera.right() * (2.0 * dx * distance / h) * PAN_SPEED;
        let up = camera.up() * (2.0 * dy * distance / h) * PAN_SPEED;
        self.pan_offset += left + up;
    }

    /// Positive `lines` move toward the target
    pub fn zoom(&mut self, lines: f32) {
        if lines > 0.0 {
            self.scale *= ZOOM_STEP.powf(lines);
        } else if lines < 0.0 {
            self.scale /= ZOOM_STEP.powf(-lines);
        }
    }

    /// Re-aim the camera on the next update even without pending input
    pub fn invalidate(&mut self) {
        self.needs_sync = true;
    }

    pub fn has_pending_motion(&self) -> bool {
        self.needs_sync
            || self.rotate_delta.0.abs() > EPS
            || self.rotate_delta.1.abs() > EPS
            || self.pan_offset.length_squared() > EPS * EPS
            || (self.scale - 1.0).abs() > EPS
    }

    /// Apply pending motion to the camera; returns true if it moved
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if !self.has_pending_motion() {
            return false;
        }

        let mut spherical = Spherical::from_offset(camera.position - self.target);

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.rotate_delta.0 * factor;
        spherical.phi = (spherical.phi + self.rotate_delta.1 * factor).clamp(EPS, PI - EPS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.rotate_delta.0 *= 1.0 - self.damping_factor;
            self.rotate_delta.1 *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.rotate_delta = (0.0, 0.0);
            self.pan_offset = Vec3::ZERO;
        }
        if self.rotate_delta.0.abs() < EPS {
            self.rotate_delta.0 = 0.0;
        }
        if self.rotate_delta.1.abs() < EPS {
            self.rotate_delta.1 = 0.0;
        }
        if self.pan_offset.length_squared() < EPS * EPS {
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
        self.needs_sync = false;

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> Camera {
        let mut camera = Camera::new(position, 1.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vec3::new(3.0, 4.0, -2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(back.abs_diff_eq(offset, 1e-5));
    }

    #[test]
    fn idle_controls_leave_camera_untouched() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        camera.rotation = glam::Quat::from_rotation_z(0.3);
        let before = camera.clone();

        assert!(!controls.update(&mut camera));
        assert_eq!(camera, before);
    }

    #[test]
    fn damping_decays_rotation_geometrically() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.rotate_left(1.0);
        assert!(controls.update(&mut camera));
        let first = controls.rotate_delta.0;
        controls.update(&mut camera);
        let second = controls.rotate_delta.0;

        assert!((first - (-1.0 * (1.0 - DAMPING_FACTOR))).abs() < 1e-6);
        assert!((second / first - (1.0 - DAMPING_FACTOR)).abs() < 1e-5);
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = false;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.rotate_left(PI / 2.0);
        controls.update(&mut camera);

        assert!((camera.position.length() - 10.0).abs() < 1e-4);
        assert!(camera.position.abs_diff_eq(Vec3::new(-10.0, 0.0, 0.0), 1e-3));
        assert!(camera.forward().abs_diff_eq(Vec3::X, 1e-4));
    }

    #[test]
    fn zoom_in_moves_closer() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.zoom(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 10.0 * ZOOM_STEP).abs() < 1e-4);

        controls.zoom(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = false;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        controls.pan_by_pixels(&camera, 100.0, 0.0, 500);
        controls.update(&mut camera);

        // Dragging right slides the scene right, so the view moves left
        assert!(controls.target.x < 0.0);
        assert!((camera.position.x - controls.target.x).abs() < 1e-4);
        assert!((camera.position.z - 10.0).abs() < 1e-3);
    }

    #[test]
    fn invalidate_reaims_after_external_move() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));

        camera.position.x += 5.0;
        controls.invalidate();
        assert!(controls.update(&mut camera));

        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-4));
        assert!(!controls.has_pending_motion());
    }
}
