use anyhow::Result;
use cgmath::InnerSpace;

use crate::data::cubemap::CubeMapFace;
use crate::resource::cubemap::CubeMapLoader;

/// Procedural sky used when no skybox images are available: a vertical gradient from the
/// ground colour through the horizon up to the zenith.
pub struct GradientCubeMapLoader {
    size: u32,
    faces: Vec<Vec<u8>>,
}

impl GradientCubeMapLoader {
    pub fn new(size: u32, zenith: [f32; 3], horizon: [f32; 3], ground: [f32; 3]) -> Self {
        let size = size.max(1);

        let faces = CubeMapFace::ALL
            .iter()
            .map(|face| {
                let mut data = Vec::with_capacity((size * size * 4) as usize);

                for row in 0..size {
                    for column in 0..size {
                        let s = (column as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                        let t = (row as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                        let elevation = face.texel_direction(s, t).normalize().y;

                        let color = if elevation >= 0.0 {
                            lerp(horizon, zenith, elevation.sqrt())
                        } else {
                            lerp(horizon, ground, (-elevation * 4.0).min(1.0))
                        };

                        data.extend(color.iter().map(|channel| to_unorm8(*channel)));
                        data.push(255);
                    }
                }

                data
            })
            .collect();

        Self { size, faces }
    }
}

impl Default for GradientCubeMapLoader {
    fn default() -> Self {
        Self::new(128, [0.18, 0.36, 0.75], [0.82, 0.88, 0.95], [0.28, 0.25, 0.22])
    }
}

impl CubeMapLoader for GradientCubeMapLoader {
    fn face_dimensions(&self) -> (u32, u32) {
        (self.size, self.size)
    }

    fn load_face(&self, face: CubeMapFace) -> Result<&[u8]> {
        Ok(&self.faces[face.layer() as usize])
    }
}

fn lerp(a: [f32; 3], b: [f32; 3], amount: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * amount,
        a[1] + (b[1] - a[1]) * amount,
        a[2] + (b[2] - a[2]) * amount,
    ]
}

fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZENITH: [f32; 3] = [0.0, 0.0, 1.0];
    const HORIZON: [f32; 3] = [1.0, 1.0, 1.0];
    const GROUND: [f32; 3] = [0.0, 0.0, 0.0];

    fn center_texel(loader: &GradientCubeMapLoader, face: CubeMapFace) -> [u8; 4] {
        let size = loader.face_dimensions().0 as usize;
        let data = loader.load_face(face).unwrap();
        let offset = ((size / 2) * size + size / 2) * 4;
        [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
    }

    #[test]
    fn faces_are_square_rgba() {
        let loader = GradientCubeMapLoader::new(8, ZENITH, HORIZON, GROUND);

        assert_eq!(loader.face_dimensions(), (8, 8));
        for face in CubeMapFace::ALL {
            assert_eq!(loader.load_face(face).unwrap().len(), 8 * 8 * 4);
        }
    }

    #[test]
    fn top_is_zenith_and_bottom_is_ground() {
        let loader = GradientCubeMapLoader::new(9, ZENITH, HORIZON, GROUND);

        let top = center_texel(&loader, CubeMapFace::PositiveY);
        let bottom = center_texel(&loader, CubeMapFace::NegativeY);

        assert!(top[2] == 255 && top[0] < 20);
        assert_eq!(bottom, [0, 0, 0, 255]);
    }

    #[test]
    fn side_faces_brighten_towards_the_top_rows() {
        let loader = GradientCubeMapLoader::new(16, ZENITH, HORIZON, GROUND);
        let data = loader.load_face(CubeMapFace::PositiveZ).unwrap();

        let first_row_red = data[8 * 4];
        let last_row_red = data[(15 * 16 + 8) * 4];

        // Upper rows tend towards the blue zenith, lower rows towards the black ground.
        assert!(first_row_red > last_row_red);
        assert!(data[8 * 4 + 2] > data[(15 * 16 + 8) * 4 + 2]);
    }
}
