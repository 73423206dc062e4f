pub mod gltf;

pub use self::gltf::{decode_scene, load_scene, read_with_progress};
