#[derive(Copy, Clone, Debug)]
pub struct PerspectiveProjection {
    pub aspect_ratio: f32,
    pub fovy: cgmath::Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl PerspectiveProjection {
    /// Square 90 degree frustum covering exactly one cubemap face.
    pub fn cubemap_face() -> Self {
        Self {
            aspect_ratio: 1.0,
            fovy: cgmath::Deg(90.0).into(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl From<PerspectiveProjection> for cgmath::Matrix4<f32> {
    fn from(value: PerspectiveProjection) -> Self {
        OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(value.fovy, value.aspect_ratio, value.znear, value.zfar)
    }
}

/// Remaps OpenGL clip depth [-1, 1] to wgpu's [0, 1]. Arguments are column-major.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn project(matrix: cgmath::Matrix4<f32>, point: [f32; 3]) -> cgmath::Vector3<f32> {
        let clip = matrix * cgmath::Vector4::new(point[0], point[1], point[2], 1.0);
        cgmath::Vector3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    #[test]
    fn depth_range_is_zero_to_one() {
        let projection = PerspectiveProjection {
            aspect_ratio: 1.5,
            fovy: cgmath::Deg(45.0).into(),
            znear: 0.1,
            zfar: 100.0,
        };
        let matrix = cgmath::Matrix4::from(projection);

        assert!(project(matrix, [0.0, 0.0, -0.1]).z.abs() < 1e-5);
        assert!((project(matrix, [0.0, 0.0, -100.0]).z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn cubemap_face_frustum_edges_reach_ndc_bounds() {
        let matrix = cgmath::Matrix4::from(PerspectiveProjection::cubemap_face());

        let corner = project(matrix, [1.0, 1.0, -1.0]);
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn depth_remap_leaves_w_untouched() {
        let clip = OPENGL_TO_WGPU_MATRIX * cgmath::Vector4::new(0.3, -0.2, 0.8, 2.0);

        assert!((clip.x - 0.3).abs() < 1e-6);
        assert!((clip.y + 0.2).abs() < 1e-6);
        assert!((clip.z - 1.4).abs() < 1e-6);
        assert!((clip.w - 2.0).abs() < 1e-6);
    }

    #[test]
    fn near_plane_is_not_clipped() {
        let matrix = cgmath::Matrix4::from(PerspectiveProjection::cubemap_face());

        let near = project(matrix, [0.0, 0.0, -0.1]);
        let middle = project(matrix, [0.0, 0.0, -0.5]);
        assert!(near.z >= -1e-5 && near.z < 1e-5);
        assert!(middle.z > 0.0 && middle.z < 1.0);
    }
}
