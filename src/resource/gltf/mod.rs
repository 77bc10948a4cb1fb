use std::path::Path;

use anyhow::Result;

use crate::resource::gltf::asset::file::FileSystemGltfAsset;
use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::file::FileSystemGltfLoader;
use crate::resource::gltf::mesh::GltfMeshReader;
use crate::resource::mesh::MeshData;

pub mod asset;
pub mod loader;
mod mesh;

/// Flattens the default scene of a .gltf/.glb file into a single mesh.
pub fn load_mesh(path: &Path) -> Result<MeshData> {
    let asset = FileSystemGltfAsset::from_path(path)?;
    let scene = asset.default_scene()?;

    let mut gltf_loader = FileSystemGltfLoader::new(&asset);

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("<UNNAMED>")
        .to_string();

    GltfMeshReader::read(name, &scene, &mut gltf_loader)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_triangle_asset(directory: &Path) -> std::path::PathBuf {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bytes: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(directory.join("triangle.bin"), &bytes).unwrap();

        let json = r#"{
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0, "translation": [0.0, 0.0, -1.0] }],
            "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            }],
            "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
            "buffers": [{ "uri": "triangle.bin", "byteLength": 36 }]
        }"#;
        let path = directory.join("triangle.gltf");
        std::fs::write(&path, json).unwrap();

        path
    }

    #[test]
    fn loads_triangle_with_node_transform_applied() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_triangle_asset(temp_dir.path());

        let mesh = load_mesh(&path).unwrap();

        assert_eq!(mesh.name, "triangle");
        assert_eq!(mesh.primitives.len(), 1);
        assert_eq!(mesh.materials.len(), 1);

        let primitive = &mesh.primitives[0];
        assert_eq!(primitive.indices, vec![0, 1, 2]);
        assert_eq!(primitive.positions[1], [1.0, 0.0, -1.0]);
        assert_eq!(primitive.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.materials[0].base_color_factor, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_mesh(Path::new("does/not/exist.gltf")).is_err());
    }
}
