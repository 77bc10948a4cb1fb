use cgmath::{InnerSpace, Matrix, SquareMatrix, Zero};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: cgmath::Vector3::zero(),
            rotation: cgmath::Quaternion::from_sv(1.0, cgmath::Vector3::zero()),
            scale: cgmath::Vector3 {
                x: 1.0,
                y: 1.0,
                z: 1.0,
            },
        }
    }
}

impl Transform {
    pub fn new(
        translation: cgmath::Vector3<f32>,
        rotation: cgmath::Quaternion<f32>,
        scale: cgmath::Vector3<f32>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Matrix used to transform normals, see [`normal_matrix`].
    pub fn normal_matrix(&self) -> cgmath::Matrix4<f32> {
        normal_matrix(&cgmath::Matrix4::from(*self))
    }
}

/// Rotation from Euler angles in degrees about X, Y and Z, using the convention of
/// [`cgmath::Euler`] so [`euler_degrees`] reads the same angles back.
pub fn rotation_from_euler_degrees(degrees: [f32; 3]) -> cgmath::Quaternion<f32> {
    cgmath::Quaternion::from(cgmath::Euler::new(
        cgmath::Deg(degrees[0]),
        cgmath::Deg(degrees[1]),
        cgmath::Deg(degrees[2]),
    ))
}

pub fn euler_degrees(rotation: cgmath::Quaternion<f32>) -> [f32; 3] {
    let euler = cgmath::Euler::from(rotation);

    [
        cgmath::Deg::from(euler.x).0,
        cgmath::Deg::from(euler.y).0,
        cgmath::Deg::from(euler.z).0,
    ]
}

/// Inverse transpose of the upper 3x3 block, padded to 4x4 so it can live in a uniform buffer
/// without std140 padding games.
pub fn normal_matrix(matrix: &cgmath::Matrix4<f32>) -> cgmath::Matrix4<f32> {
    let linear = cgmath::Matrix3::new(
        matrix.x.x, matrix.x.y, matrix.x.z, matrix.y.x, matrix.y.y, matrix.y.z, matrix.z.x,
        matrix.z.y, matrix.z.z,
    );

    let normal = match linear.invert() {
        Some(inverse) => inverse.transpose(),
        None => cgmath::Matrix3::identity(),
    };

    cgmath::Matrix4::from(normal)
}

impl From<Transform> for cgmath::Matrix4<f32> {
    fn from(value: Transform) -> Self {
        cgmath::Matrix4::from_translation(value.translation)
            * cgmath::Matrix4::from(value.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(value.scale.x, value.scale.y, value.scale.z)
    }
}

impl From<cgmath::Matrix4<f32>> for Transform {
    fn from(value: cgmath::Matrix4<f32>) -> Self {
        let translation = cgmath::Vector3::<f32>::new(value.w.x, value.w.y, value.w.z);

        let mut rotation_matrix = cgmath::Matrix3::<f32>::new(
            value.x.x, value.x.y, value.x.z, value.y.x, value.y.y, value.y.z, value.z.x, value.z.y,
            value.z.z,
        );

        let scale_x = rotation_matrix.x.magnitude();
        let scale_y = rotation_matrix.y.magnitude();
        let scale_z = rotation_matrix.z.magnitude();
        let scale = cgmath::Vector3::<f32>::new(scale_x, scale_y, scale_z);

        rotation_matrix.x *= 1.0 / scale_x;
        rotation_matrix.y *= 1.0 / scale_y;
        rotation_matrix.z *= 1.0 / scale_z;

        let rotation = cgmath::Quaternion::from(rotation_matrix);

        Self {
            translation,
            rotation,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Rotation3, Transform as _};

    use super::*;

    fn assert_close(a: cgmath::Vector3<f32>, b: cgmath::Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn default_transform_is_identity() {
        let matrix = cgmath::Matrix4::from(Transform::default());
        assert_eq!(matrix, cgmath::Matrix4::identity());
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let transform = Transform::new(
            cgmath::Vector3::new(1.0, 2.0, 3.0),
            cgmath::Quaternion::from_angle_y(cgmath::Deg(90.0)),
            cgmath::Vector3::new(2.0, 2.0, 2.0),
        );

        let point = cgmath::Matrix4::from(transform)
            .transform_point(cgmath::Point3::new(1.0, 0.0, 0.0));

        assert_close(
            cgmath::Vector3::new(point.x, point.y, point.z),
            cgmath::Vector3::new(1.0, 2.0, 1.0),
        );
    }

    #[test]
    fn decomposes_matrix_back_into_transform() {
        let transform = Transform::new(
            cgmath::Vector3::new(-1.0, 0.5, 4.0),
            cgmath::Quaternion::from_angle_x(cgmath::Deg(-90.0)),
            cgmath::Vector3::new(0.5, 0.5, 0.5),
        );

        let decomposed = Transform::from(cgmath::Matrix4::from(transform));

        assert_close(decomposed.translation, transform.translation);
        assert_close(decomposed.scale, transform.scale);
        assert!(decomposed.rotation.dot(transform.rotation).abs() > 0.9999);
    }

    #[test]
    fn euler_degrees_read_back_the_given_angles() {
        for degrees in [[20.0, 45.0, 10.0], [-30.0, 0.0, 120.0], [0.0, -75.0, 0.0]] {
            let read_back = euler_degrees(rotation_from_euler_degrees(degrees));

            for (actual, expected) in read_back.iter().zip(degrees.iter()) {
                assert!((actual - expected).abs() < 1e-3, "{read_back:?} != {degrees:?}");
            }
        }
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let transform = Transform::new(
            cgmath::Vector3::zero(),
            cgmath::Quaternion::from_sv(1.0, cgmath::Vector3::zero()),
            cgmath::Vector3::new(4.0, 1.0, 1.0),
        );

        let normal = transform
            .normal_matrix()
            .transform_vector(cgmath::Vector3::new(1.0, 1.0, 0.0));

        assert_close(normal, cgmath::Vector3::new(0.25, 1.0, 0.0));
    }
}
