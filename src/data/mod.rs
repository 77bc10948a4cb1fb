pub mod bounds;
pub mod cubemap;
pub mod projection;
pub mod ray;
pub mod transform;
