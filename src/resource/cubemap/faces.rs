use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::data::cubemap::CubeMapFace;
use crate::error::Error;
use crate::resource::cubemap::CubeMapLoader;

const FALLBACK_FACE_COLOR: [u8; 4] = [128, 128, 128, 255];
const FACE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Cubemap assembled from six separate images, one per face.
pub struct ImageFacesCubeMapLoader {
    dimensions: (u32, u32),
    faces: Vec<Vec<u8>>,
}

impl ImageFacesCubeMapLoader {
    /// Loads the faces in +X, -X, +Y, -Y, +Z, -Z order. A face that cannot be read is replaced
    /// by a flat grey face; only a cubemap without any readable face is an error.
    pub fn from_paths(paths: &[PathBuf; 6]) -> Result<Self> {
        let mut images: Vec<Option<image::RgbaImage>> = Vec::with_capacity(6);

        for (face, path) in CubeMapFace::ALL.iter().zip(paths) {
            match image::open(path) {
                Ok(image) => {
                    log::debug!("Loaded cubemap face {} from {}", face.label(), path.display());
                    images.push(Some(image.to_rgba8()));
                }
                Err(err) => {
                    log::warn!(
                        "Unable to load cubemap face {} from {}: {err}",
                        face.label(),
                        path.display()
                    );
                    images.push(None);
                }
            }
        }

        let dimensions = match images.iter().flatten().next() {
            Some(image) => image.dimensions(),
            None => {
                return Err(Error::new(String::from(
                    "None of the cubemap face images could be loaded.",
                ))
                .into())
            }
        };

        if dimensions.0 != dimensions.1 || dimensions.0 == 0 {
            return Err(Error::new(format!(
                "Cubemap faces must be square, found {}x{}",
                dimensions.0, dimensions.1
            ))
            .into());
        }

        let faces = CubeMapFace::ALL
            .iter()
            .zip(images)
            .map(|(face, image)| match image {
                Some(image) if image.dimensions() == dimensions => image.into_raw(),
                Some(image) => {
                    log::warn!(
                        "Cubemap face {} is {:?} but the cubemap is {dimensions:?}, replacing it",
                        face.label(),
                        image.dimensions()
                    );
                    fallback_face(dimensions)
                }
                None => fallback_face(dimensions),
            })
            .collect();

        Ok(Self { dimensions, faces })
    }

    /// Looks up `right`, `left`, `top`, `bottom`, `front` and `back` images in a directory.
    pub fn from_directory(directory: &Path) -> Result<Self> {
        if !directory.is_dir() {
            return Err(Error::new(format!(
                "The given skybox path is not a directory: {}",
                directory.display()
            ))
            .into());
        }

        Self::from_paths(&face_paths_in_directory(directory))
    }
}

impl CubeMapLoader for ImageFacesCubeMapLoader {
    fn face_dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn load_face(&self, face: CubeMapFace) -> Result<&[u8]> {
        Ok(&self.faces[face.layer() as usize])
    }
}

/// Face image paths in layer order, preferring whichever known extension exists on disk.
pub fn face_paths_in_directory(directory: &Path) -> [PathBuf; 6] {
    CubeMapFace::ALL.map(|face| {
        FACE_EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{}.{extension}", face.file_stem())))
            .find(|path| path.is_file())
            .unwrap_or_else(|| directory.join(format!("{}.png", face.file_stem())))
    })
}

fn fallback_face(dimensions: (u32, u32)) -> Vec<u8> {
    FALLBACK_FACE_COLOR.repeat((dimensions.0 * dimensions.1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_face(directory: &Path, stem: &str, size: u32, color: [u8; 4]) {
        image::RgbaImage::from_pixel(size, size, image::Rgba(color))
            .save(directory.join(format!("{stem}.png")))
            .unwrap();
    }

    #[test]
    fn faces_load_in_layer_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let directory = temp_dir.path();
        for (index, face) in CubeMapFace::ALL.iter().enumerate() {
            write_face(directory, face.file_stem(), 4, [index as u8 * 10, 0, 0, 255]);
        }

        let loader = ImageFacesCubeMapLoader::from_directory(directory).unwrap();

        assert_eq!(loader.face_dimensions(), (4, 4));
        for face in CubeMapFace::ALL {
            let data = loader.load_face(face).unwrap();
            assert_eq!(data.len(), 4 * 4 * 4);
            assert_eq!(data[0], face.layer() as u8 * 10);
        }
    }

    #[test]
    fn missing_and_mismatched_faces_fall_back_to_grey() {
        let temp_dir = tempfile::tempdir().unwrap();
        let directory = temp_dir.path();
        write_face(directory, "right", 2, [255, 0, 0, 255]);
        write_face(directory, "top", 8, [0, 255, 0, 255]);

        let loader = ImageFacesCubeMapLoader::from_directory(directory).unwrap();

        assert_eq!(loader.face_dimensions(), (2, 2));
        assert_eq!(&loader.load_face(CubeMapFace::PositiveX).unwrap()[..4], &[255, 0, 0, 255]);
        assert_eq!(
            &loader.load_face(CubeMapFace::PositiveY).unwrap()[..4],
            &FALLBACK_FACE_COLOR
        );
        assert_eq!(
            loader.load_face(CubeMapFace::NegativeZ).unwrap().len(),
            2 * 2 * 4
        );
    }

    #[test]
    fn no_readable_face_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let directory = temp_dir.path();

        assert!(ImageFacesCubeMapLoader::from_directory(directory).is_err());
        assert!(ImageFacesCubeMapLoader::from_directory(&directory.join("missing")).is_err());
    }

    #[test]
    fn non_square_faces_are_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let directory = temp_dir.path();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 0, 255]))
            .save(directory.join("left.png"))
            .unwrap();

        assert!(ImageFacesCubeMapLoader::from_directory(directory).is_err());
    }
}
