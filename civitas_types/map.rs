use serde::{Deserialize, Serialize};

use crate::common::CityId;

/// A point in world space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub const ZERO: Point3D = Point3D::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: &Point3D) -> Point3D {
        Point3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Lays city ids out row by row on a square grid, `world_size` cities wide.
    pub fn from_city_id(id: CityId, world_size: u32, spacing: f32) -> Point3D {
        let world_size = world_size.max(1);
        let column = id.0 % world_size;
        let row = id.0 / world_size;
        Point3D::new(column as f32 * spacing, 0.0, row as f32 * spacing)
    }
}
