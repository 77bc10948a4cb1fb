use crate::data::projection::PerspectiveProjection;

/// Cubemap faces in texture array layer order.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum CubeMapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeMapFace {
    pub const ALL: [CubeMapFace; 6] = [
        CubeMapFace::PositiveX,
        CubeMapFace::NegativeX,
        CubeMapFace::PositiveY,
        CubeMapFace::NegativeY,
        CubeMapFace::PositiveZ,
        CubeMapFace::NegativeZ,
    ];

    pub fn layer(&self) -> u32 {
        match self {
            CubeMapFace::PositiveX => 0,
            CubeMapFace::NegativeX => 1,
            CubeMapFace::PositiveY => 2,
            CubeMapFace::NegativeY => 3,
            CubeMapFace::PositiveZ => 4,
            CubeMapFace::NegativeZ => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CubeMapFace::PositiveX => "POSITIVE_X",
            CubeMapFace::NegativeX => "NEGATIVE_X",
            CubeMapFace::PositiveY => "POSITIVE_Y",
            CubeMapFace::NegativeY => "NEGATIVE_Y",
            CubeMapFace::PositiveZ => "POSITIVE_Z",
            CubeMapFace::NegativeZ => "NEGATIVE_Z",
        }
    }

    /// Conventional image file stem for the face of a skybox.
    pub fn file_stem(&self) -> &'static str {
        match self {
            CubeMapFace::PositiveX => "right",
            CubeMapFace::NegativeX => "left",
            CubeMapFace::PositiveY => "top",
            CubeMapFace::NegativeY => "bottom",
            CubeMapFace::PositiveZ => "front",
            CubeMapFace::NegativeZ => "back",
        }
    }

    pub fn direction(&self) -> cgmath::Vector3<f32> {
        match self {
            CubeMapFace::PositiveX => cgmath::Vector3::new(1.0, 0.0, 0.0),
            CubeMapFace::NegativeX => cgmath::Vector3::new(-1.0, 0.0, 0.0),
            CubeMapFace::PositiveY => cgmath::Vector3::new(0.0, 1.0, 0.0),
            CubeMapFace::NegativeY => cgmath::Vector3::new(0.0, -1.0, 0.0),
            CubeMapFace::PositiveZ => cgmath::Vector3::new(0.0, 0.0, 1.0),
            CubeMapFace::NegativeZ => cgmath::Vector3::new(0.0, 0.0, -1.0),
        }
    }

    pub fn up(&self) -> cgmath::Vector3<f32> {
        match self {
            CubeMapFace::PositiveY => cgmath::Vector3::new(0.0, 0.0, 1.0),
            CubeMapFace::NegativeY => cgmath::Vector3::new(0.0, 0.0, -1.0),
            _ => cgmath::Vector3::new(0.0, -1.0, 0.0),
        }
    }

    /// Rotation-only view matrix looking out of the cube center through this face.
    pub fn rotation_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_to_rh(cgmath::Point3::new(0.0, 0.0, 0.0), self.direction(), self.up())
    }

    pub fn view_matrix(&self, position: cgmath::Point3<f32>) -> cgmath::Matrix4<f32> {
        self.rotation_matrix()
            * cgmath::Matrix4::from_translation(cgmath::Vector3::new(
                -position.x,
                -position.y,
                -position.z,
            ))
    }

    /// Direction sampled through a texel of this face; `s` runs left to right and `t` top to
    /// bottom, both in [-1, 1].
    pub fn texel_direction(&self, s: f32, t: f32) -> cgmath::Vector3<f32> {
        match self {
            CubeMapFace::PositiveX => cgmath::Vector3::new(1.0, -t, -s),
            CubeMapFace::NegativeX => cgmath::Vector3::new(-1.0, -t, s),
            CubeMapFace::PositiveY => cgmath::Vector3::new(s, 1.0, t),
            CubeMapFace::NegativeY => cgmath::Vector3::new(s, -1.0, -t),
            CubeMapFace::PositiveZ => cgmath::Vector3::new(s, -t, 1.0),
            CubeMapFace::NegativeZ => cgmath::Vector3::new(-s, -t, -1.0),
        }
    }

    /// wgpu writes row 0 at the top of the framebuffer whereas the face up vectors above assume
    /// a bottom-up target, so face projections flip Y to land in cubemap sampling orientation.
    pub fn projection_matrix() -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_nonuniform_scale(1.0, -1.0, 1.0)
            * cgmath::Matrix4::from(PerspectiveProjection::cubemap_face())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(face: CubeMapFace, position: [f32; 3], point: [f32; 3]) -> cgmath::Vector3<f32> {
        let matrix = CubeMapFace::projection_matrix() * face.view_matrix(position.into());
        let clip = matrix * cgmath::Vector4::new(point[0], point[1], point[2], 1.0);
        cgmath::Vector3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    #[test]
    fn layers_follow_face_order() {
        let layers: Vec<u32> = CubeMapFace::ALL.iter().map(CubeMapFace::layer).collect();
        assert_eq!(layers, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn face_direction_projects_to_center() {
        for face in CubeMapFace::ALL {
            let target = face.direction() * 5.0;
            let ndc = project(face, [0.0, 0.0, 0.0], target.into());

            assert!(ndc.x.abs() < 1e-5, "{face:?}: {ndc:?}");
            assert!(ndc.y.abs() < 1e-5, "{face:?}: {ndc:?}");
            assert!(ndc.z > 0.0 && ndc.z < 1.0, "{face:?}: {ndc:?}");
        }
    }

    #[test]
    fn view_is_centered_on_the_given_position() {
        let ndc = project(CubeMapFace::NegativeZ, [3.0, 1.0, -2.0], [3.0, 1.0, -10.0]);

        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
    }

    #[test]
    fn positive_x_face_matches_cubemap_sampling_orientation() {
        // Sampling +X: the top rows hold +Y and the left columns hold +Z.
        let up = project(CubeMapFace::PositiveX, [0.0, 0.0, 0.0], [1.0, 0.5, 0.0]);
        let toward_z = project(CubeMapFace::PositiveX, [0.0, 0.0, 0.0], [1.0, 0.0, 0.5]);

        assert!(up.y > 0.0);
        assert!(toward_z.x < 0.0);
    }

    #[test]
    fn positive_y_face_matches_cubemap_sampling_orientation() {
        // Sampling +Y: the top rows hold -Z and the left columns hold -X.
        let toward_negative_z = project(CubeMapFace::PositiveY, [0.0, 0.0, 0.0], [0.0, 1.0, -0.5]);
        let toward_negative_x = project(CubeMapFace::PositiveY, [0.0, 0.0, 0.0], [-0.5, 1.0, 0.0]);

        assert!(toward_negative_z.y > 0.0);
        assert!(toward_negative_x.x < 0.0);
    }

    #[test]
    fn rendered_faces_agree_with_texel_directions() {
        for face in CubeMapFace::ALL {
            for (s, t) in [(-0.5, -0.5), (0.5, -0.25), (0.25, 0.75), (-0.75, 0.5)] {
                let ndc = project(face, [0.0, 0.0, 0.0], face.texel_direction(s, t).into());

                assert!((ndc.x - s).abs() < 1e-5, "{face:?} ({s}, {t}): {ndc:?}");
                assert!((ndc.y + t).abs() < 1e-5, "{face:?} ({s}, {t}): {ndc:?}");
            }
        }
    }
}
