use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::model::{Mesh, ModelNode, NodeTransform, Primitive, SceneModel};
use crate::types::Vertex;

const READ_CHUNK: usize = 64 * 1024;

/// Draco mesh compression; no decoder is bundled
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Reads a file in chunks, reporting (bytes read, total bytes) after each one
pub fn read_with_progress(
    path: impl AsRef<Path>,
    mut on_progress: impl FnMut(u64, u64),
) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("Failed to open asset: {:?}", path))?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = file
            .read(&mut chunk)
            .with_context(|| format!("Failed to read asset: {:?}", path))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        on_progress(bytes.len() as u64, total.max(bytes.len() as u64));
    }

    Ok(bytes)
}

/// Loads a glTF/GLB file into a SceneModel, streaming progress
pub fn load_scene(
    path: impl AsRef<Path>,
    on_progress: impl FnMut(u64, u64),
) -> Result<SceneModel> {
    let path = path.as_ref();
    log::info!("Loading scene asset: {:?}", path);

    let bytes = read_with_progress(path, on_progress)?;
    decode_scene(&bytes, path.parent())
        .with_context(|| format!("Failed to decode scene asset: {:?}", path))
}

/// Decodes glTF/GLB bytes; `base` resolves external buffer URIs
pub fn decode_scene(bytes: &[u8], base: Option<&Path>) -> Result<SceneModel> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice_without_validation(bytes)?;
    if document.extensions_required().any(|ext| ext == DRACO_EXTENSION) {
        bail!(
            "Asset requires {}, which this viewer cannot decode; re-export it without Draco compression",
            DRACO_EXTENSION
        );
    }
    let document = gltf::Document::from_json(document.into_json())?;
    let buffers = gltf::import_buffers(&document, base, blob)?;

    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes, {} animations",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.animations().count()
    );

    let nodes = document.nodes().map(|node| read_node(&node)).collect();

    let roots: Vec<usize> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => bail!("Asset contains no scenes"),
    };

    let meshes = document
        .meshes()
        .map(|mesh| read_mesh(&mesh, &buffers))
        .collect::<Result<Vec<_>>>()?;

    let animations = document
        .animations()
        .map(|anim| read_animation(&anim, &buffers))
        .collect();

    let model = SceneModel {
        nodes,
        roots,
        meshes,
        animations,
    };

    log::info!(
        "Scene decoded: {} nodes, {} triangles, {} clips",
        model.nodes.len(),
        model.triangle_count(),
        model.animations.len()
    );
    Ok(model)
}

fn read_node(node: &gltf::Node) -> ModelNode {
    let transform = match node.transform() {
        gltf::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => NodeTransform {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        },
        gltf::scene::Transform::Matrix { matrix } => {
            NodeTransform::from_matrix(&Mat4::from_cols_array_2d(&matrix))
        }
    };

    ModelNode {
        name: node.name().map(str::to_string),
        transform,
        children: node.children().map(|c| c.index()).collect(),
        mesh: node.mesh().map(|m| m.index()),
    }
}

fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh> {
    let mut primitives = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping non-triangle primitive in mesh {:?}",
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            bail!("Index {} out of range for {} vertices", bad, positions.len());
        }

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => compute_normals(&positions, &indices),
        };

        let base_color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();
        let colors: Vec<[f32; 4]> = match reader.read_colors(0) {
            Some(colors) => colors
                .into_rgba_f32()
                .map(|c| [
                    c[0] * base_color[0],
                    c[1] * base_color[1],
                    c[2] * base_color[2],
                    c[3] * base_color[3],
                ])
                .collect(),
            None => vec![base_color; positions.len()],
        };

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Vertex::new(
                    *p,
                    normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    colors.get(i).copied().unwrap_or(base_color),
                )
            })
            .collect();

        primitives.push(Primitive { vertices, indices });
    }

    Ok(Mesh {
        name: mesh.name().map(str::to_string),
        primitives,
    })
}

/// Area-weighted vertex normals for meshes that ship without them
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

fn read_animation(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> AnimationClip {
    use gltf::animation::util::ReadOutputs;

    let mut channels = Vec::new();

    for channel in animation.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let sampler_mode = channel.sampler().interpolation();
        let cubic = sampler_mode == gltf::animation::Interpolation::CubicSpline;
        let interpolation = match sampler_mode {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            _ => Interpolation::Linear,
        };

        let values = match reader.read_outputs() {
            Some(ReadOutputs::Translations(t)) => {
                ChannelValues::Translation(keyframe_values(t.map(Vec3::from_array), cubic))
            }
            Some(ReadOutputs::Scales(s)) => {
                ChannelValues::Scale(keyframe_values(s.map(Vec3::from_array), cubic))
            }
            Some(ReadOutputs::Rotations(r)) => ChannelValues::Rotation(keyframe_values(
                r.into_f32().map(|q| Quat::from_array(q).normalize()),
                cubic,
            )),
            Some(ReadOutputs::MorphTargetWeights(_)) | None => continue,
        };

        channels.push(Channel {
            node: channel.target().node().index(),
            times,
            values,
            interpolation,
        });
    }

    AnimationClip::new(animation.name().unwrap_or("unnamed"), channels)
}

/// Cubic-spline samplers store (in-tangent, value, out-tangent) triples;
/// only the values are kept and played back linearly
fn keyframe_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}
