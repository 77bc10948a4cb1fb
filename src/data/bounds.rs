#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: cgmath::Point3<f32>,
    pub max: cgmath::Point3<f32>,
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;

        let mut bounds = Self {
            min: (*first).into(),
            max: (*first).into(),
        };

        for point in points {
            bounds.expand(point);
        }

        Some(bounds)
    }

    pub fn expand(&mut self, point: &[f32; 3]) {
        self.min.x = self.min.x.min(point[0]);
        self.min.y = self.min.y.min(point[1]);
        self.min.z = self.min.z.min(point[2]);
        self.max.x = self.max.x.max(point[0]);
        self.max.y = self.max.y.max(point[1]);
        self.max.z = self.max.z.max(point[2]);
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        let mut merged = *self;
        merged.expand(&other.min.into());
        merged.expand(&other.max.into());
        merged
    }
}
