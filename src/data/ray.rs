use cgmath::{EuclideanSpace, InnerSpace, SquareMatrix, Transform as _};

use crate::data::bounds::Aabb;

const EPSILON: f32 = 1e-7;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: cgmath::Point3<f32>,
    pub direction: cgmath::Vector3<f32>,
}

impl Ray {
    pub fn new(origin: cgmath::Point3<f32>, direction: cgmath::Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Casts a ray through a pixel of the viewport by unprojecting it onto the near and far
    /// planes of the given (wgpu depth convention) view-projection matrix.
    pub fn from_viewport(
        cursor: (f64, f64),
        viewport: (u32, u32),
        view_projection_matrix: cgmath::Matrix4<f32>,
    ) -> Option<Self> {
        if viewport.0 == 0 || viewport.1 == 0 {
            return None;
        }

        let inverse = view_projection_matrix.invert()?;

        let ndc_x = (2.0 * cursor.0 / viewport.0 as f64 - 1.0) as f32;
        let ndc_y = (1.0 - 2.0 * cursor.1 / viewport.1 as f64) as f32;

        let near = inverse.transform_point(cgmath::Point3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.transform_point(cgmath::Point3::new(ndc_x, ndc_y, 1.0));

        let direction = far - near;
        if direction.magnitude2() < EPSILON {
            return None;
        }

        Some(Ray::new(near, direction))
    }

    pub fn at(&self, distance: f32) -> cgmath::Point3<f32> {
        self.origin + self.direction * distance
    }

    /// Maps the ray into the space described by `matrix` (e.g. the inverse of a model matrix).
    /// The direction is left unnormalized so distances stay comparable with world space.
    pub fn transformed(&self, matrix: &cgmath::Matrix4<f32>) -> Ray {
        Ray {
            origin: matrix.transform_point(self.origin),
            direction: matrix.transform_vector(self.direction),
        }
    }

    /// Slab test; returns the entry distance, which is 0 when the origin lies inside the box.
    pub fn intersect_aabb(&self, bounds: &Aabb) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (min, max) = (bounds.min[axis], bounds.max[axis]);

            if direction.abs() < EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inverse_direction = 1.0 / direction;
            let mut t0 = (min - origin) * inverse_direction;
            let mut t1 = (max - origin) * inverse_direction;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        Some(t_min)
    }

    /// Möller–Trumbore, double sided.
    pub fn intersect_triangle(
        &self,
        a: cgmath::Point3<f32>,
        b: cgmath::Point3<f32>,
        c: cgmath::Point3<f32>,
    ) -> Option<f32> {
        let edge_1 = b - a;
        let edge_2 = c - a;

        let p = self.direction.cross(edge_2);
        let determinant = edge_1.dot(p);
        if determinant.abs() < EPSILON {
            return None;
        }

        let inverse_determinant = 1.0 / determinant;
        let s = self.origin - a;

        let u = s.dot(p) * inverse_determinant;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge_1);
        let v = self.direction.dot(q) * inverse_determinant;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge_2.dot(q) * inverse_determinant;
        (t > EPSILON).then_some(t)
    }

    pub fn intersect_plane(
        &self,
        point: cgmath::Point3<f32>,
        normal: cgmath::Vector3<f32>,
    ) -> Option<f32> {
        let denominator = normal.dot(self.direction);
        if denominator.abs() < EPSILON {
            return None;
        }

        let t = (point.to_vec() - self.origin.to_vec()).dot(normal) / denominator;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::projection::PerspectiveProjection;

    fn triangle() -> [cgmath::Point3<f32>; 3] {
        [
            cgmath::Point3::new(-1.0, -1.0, 0.0),
            cgmath::Point3::new(1.0, -1.0, 0.0),
            cgmath::Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn ray_hits_triangle_from_either_side() {
        let [a, b, c] = triangle();

        let front = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 5.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );
        let back = Ray::new(
            cgmath::Point3::new(0.0, 0.0, -3.0),
            cgmath::Vector3::new(0.0, 0.0, 1.0),
        );

        assert!((front.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);
        assert!((back.intersect_triangle(a, b, c).unwrap() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_triangle_outside_edges_or_behind() {
        let [a, b, c] = triangle();

        let outside = Ray::new(
            cgmath::Point3::new(2.0, 0.0, 5.0),
            cgmath::Vector3::new(0.0, 0.0, -1.0),
        );
        let behind = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 5.0),
            cgmath::Vector3::new(0.0, 0.0, 1.0),
        );
        let parallel = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 5.0),
            cgmath::Vector3::new(1.0, 0.0, 0.0),
        );

        assert!(outside.intersect_triangle(a, b, c).is_none());
        assert!(behind.intersect_triangle(a, b, c).is_none());
        assert!(parallel.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn slab_test_reports_entry_distance() {
        let bounds = Aabb {
            min: cgmath::Point3::new(-1.0, -1.0, -1.0),
            max: cgmath::Point3::new(1.0, 1.0, 1.0),
        };

        let hit = Ray::new(
            cgmath::Point3::new(-5.0, 0.0, 0.0),
            cgmath::Vector3::new(1.0, 0.0, 0.0),
        );
        let inside = Ray::new(
            cgmath::Point3::new(0.0, 0.0, 0.0),
            cgmath::Vector3::new(0.0, 1.0, 0.0),
        );
        let miss = Ray::new(
            cgmath::Point3::new(-5.0, 2.0, 0.0),
            cgmath::Vector3::new(1.0, 0.0, 0.0),
        );

        assert!((hit.intersect_aabb(&bounds).unwrap() - 4.0).abs() < 1e-5);
        assert_eq!(inside.intersect_aabb(&bounds), Some(0.0));
        assert!(miss.intersect_aabb(&bounds).is_none());
    }

    #[test]
    fn plane_intersection_ignores_planes_behind_the_ray() {
        let ray = Ray::new(
            cgmath::Point3::new(0.0, 2.0, 0.0),
            cgmath::Vector3::new(0.0, -1.0, 0.0),
        );

        let below = ray.intersect_plane(cgmath::Point3::new(5.0, 0.0, 5.0), cgmath::Vector3::unit_y());
        let above = ray.intersect_plane(cgmath::Point3::new(0.0, 3.0, 0.0), cgmath::Vector3::unit_y());

        assert!((below.unwrap() - 2.0).abs() < 1e-5);
        assert!(above.is_none());
    }

    #[test]
    fn viewport_center_ray_follows_camera_forward() {
        let projection = cgmath::Matrix4::from(PerspectiveProjection {
            aspect_ratio: 800.0 / 600.0,
            fovy: cgmath::Deg(45.0).into(),
            znear: 0.1,
            zfar: 100.0,
        });
        let view = cgmath::Matrix4::look_to_rh(
            cgmath::Point3::new(0.0, 0.0, 10.0),
            -cgmath::Vector3::unit_z(),
            cgmath::Vector3::unit_y(),
        );

        let ray = Ray::from_viewport((400.0, 300.0), (800, 600), projection * view).unwrap();

        assert!((ray.direction - -cgmath::Vector3::unit_z()).magnitude() < 1e-4);
        assert!((ray.origin.z - 9.9).abs() < 1e-3);
    }

    #[test]
    fn viewport_top_left_ray_points_up_and_left() {
        let projection = cgmath::Matrix4::from(PerspectiveProjection {
            aspect_ratio: 1.0,
            fovy: cgmath::Deg(90.0).into(),
            znear: 0.1,
            zfar: 100.0,
        });

        let ray = Ray::from_viewport((0.0, 0.0), (100, 100), projection).unwrap();

        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn empty_viewport_casts_no_ray() {
        assert!(Ray::from_viewport((0.0, 0.0), (0, 10), cgmath::Matrix4::identity()).is_none());
    }
}
