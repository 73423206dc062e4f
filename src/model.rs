use glam::{Mat4, Quat, Vec3};

use crate::animation::AnimationClip;
use crate::types::Vertex;

/// Translation/rotation/scale of a single node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Node in the model hierarchy
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
}

/// Triangle list with its own vertices
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

/// Decoded scene asset: node hierarchy, meshes, and animation clips
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    pub nodes: Vec<ModelNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub animations: Vec<AnimationClip>,
}

impl SceneModel {
    /// Rest pose of every node, indexed like `nodes`
    pub fn rest_pose(&self) -> Vec<NodeTransform> {
        self.nodes.iter().map(|n| n.transform).collect()
    }

    /// World matrix of every node under `placement`, indexed like `nodes`
    pub fn world_transforms(&self, locals: &[NodeTransform], placement: Mat4) -> Vec<Mat4> {
        let mut world = vec![Mat4::IDENTITY; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> = self.roots.iter().map(|&r| (r, placement)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            let local = locals.get(index).copied().unwrap_or(node.transform);
            let global = parent * local.matrix();
            world[index] = global;
            stack.extend(node.children.iter().map(|&c| (c, global)));
        }

        world
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|m| &m.primitives)
            .map(|p| p.indices.len() / 3)
            .sum()
    }

    /// Draw list: every node that carries a mesh, as (node, mesh)
    pub fn mesh_instances(&self) -> Vec<(usize, usize)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.mesh.map(|m| (i, m)))
            .collect()
    }
}

/// Placement of the model root in the world
pub fn placement(offset: Vec3, scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), Quat::IDENTITY, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(translation: Vec3, children: Vec<usize>) -> ModelNode {
        ModelNode {
            name: None,
            transform: NodeTransform {
                translation,
                ..NodeTransform::IDENTITY
            },
            children,
            mesh: None,
        }
    }

    #[test]
    fn world_transforms_compose_parent_first() {
        let model = SceneModel {
            nodes: vec![
                node(Vec3::new(1.0, 0.0, 0.0), vec![1]),
                node(Vec3::new(0.0, 2.0, 0.0), vec![]),
            ],
            roots: vec![0],
            ..Default::default()
        };

        let world = model.world_transforms(&model.rest_pose(), placement(Vec3::ZERO, 2.0));

        assert!(world[0]
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
        assert!(world[1]
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(2.0, 4.0, 0.0), 1e-6));
    }

    #[test]
    fn placement_offsets_then_scales() {
        let m = placement(Vec3::new(1.0, 1.0, 0.0), 0.01);
        let p = m.transform_point3(Vec3::new(100.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn node_transform_matrix_round_trip() {
        let t = NodeTransform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_x(0.5),
            scale: Vec3::splat(2.0),
        };
        let back = NodeTransform::from_matrix(&t.matrix());
        assert!(back.translation.abs_diff_eq(t.translation, 1e-5));
        assert!(back.scale.abs_diff_eq(t.scale, 1e-5));
    }

    #[test]
    fn mesh_instances_lists_nodes_with_meshes() {
        let mut model = SceneModel {
            nodes: vec![node(Vec3::ZERO, vec![1]), node(Vec3::ZERO, vec![])],
            roots: vec![0],
            ..Default::default()
        };
        model.nodes[1].mesh = Some(0);
        assert_eq!(model.mesh_instances(), vec![(1, 0)]);
    }
}
