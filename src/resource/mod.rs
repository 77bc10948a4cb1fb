pub mod cubemap;
pub mod gltf;
pub mod mesh;
pub mod obj;
pub mod shape;
