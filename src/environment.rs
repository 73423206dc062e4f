use glam::Vec3;

use crate::types::EnvironmentUniform;

/// Lighting backdrop: hemisphere ambient plus one key light
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub ambient_intensity: f32,
    /// Direction the key light travels (toward the scene)
    pub key_direction: Vec3,
    pub key_color: Vec3,
    pub key_intensity: f32,
    /// Clear color behind the model
    pub background: [f64; 4],
}

impl Environment {
    /// Soft indoor lighting, bright from above
    pub fn room() -> Self {
        Self {
            sky_color: Vec3::new(0.95, 0.95, 1.0),
            ground_color: Vec3::new(0.35, 0.33, 0.3),
            ambient_intensity: 0.8,
            key_direction: Vec3::new(-0.4, -1.0, -0.3).normalize(),
            key_color: Vec3::ONE,
            key_intensity: 0.9,
            background: [0.749, 0.894, 0.894, 1.0],
        }
    }

    pub fn to_uniform(&self) -> EnvironmentUniform {
        EnvironmentUniform {
            sky_color: self.sky_color.to_array(),
            intensity: self.ambient_intensity,
            ground_color: self.ground_color.to_array(),
            _pad1: 0.0,
            key_direction: self.key_direction.normalize_or_zero().to_array(),
            key_intensity: self.key_intensity,
            key_color: self.key_color.to_array(),
            _pad2: 0.0,
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.background;
        wgpu::Color { r, g, b, a }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::room()
    }
}
