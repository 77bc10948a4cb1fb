use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::resource::gltf::asset::GltfAsset;

pub struct FileSystemGltfAsset {
    gltf: gltf::Gltf,
    pub root: PathBuf,
}

impl FileSystemGltfAsset {
    pub fn from_path(gltf_path: &Path) -> Result<Self> {
        let absolute_path = gltf_path.canonicalize()?;

        if !absolute_path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("The given path is not a file: {}", gltf_path.display()),
            )
            .into());
        }

        let root = match absolute_path.parent() {
            Some(root) => root.to_path_buf(),
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!(
                        "Unable to find the parent directory of the given path: {}",
                        gltf_path.display()
                    ),
                )
                .into())
            }
        };

        let parsed_gltf = gltf::Gltf::open(&absolute_path)?;

        Ok(Self {
            gltf: parsed_gltf,
            root,
        })
    }

    /// Binary chunk of a .glb container.
    pub fn blob(&self) -> Option<&[u8]> {
        self.gltf.blob.as_deref()
    }
}

impl GltfAsset for FileSystemGltfAsset {
    fn gltf(&self) -> &gltf::Gltf {
        &self.gltf
    }
}
