// Re-export glam for convenience
pub use glam::*;

// glint math types
mod aabb;
mod interval;
pub mod random;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::Vec3Ext;
