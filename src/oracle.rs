use glam::Vec3;

/// Occupancy source queried once per cell while a [SpatialGrid](crate::spatial_grid::SpatialGrid)
/// is built. Returns [true] if the given world point is blocked.
pub trait ObstacleOracle {
    fn is_blocked(&self, point: Vec3) -> bool;
}

impl<F> ObstacleOracle for F
where
    F: Fn(Vec3) -> bool,
{
    fn is_blocked(&self, point: Vec3) -> bool {
        self(point)
    }
}

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from two opposite corners given in any order.
    pub fn new(a: Vec3, b: Vec3) -> Aabb {
        Aabb {
            min: a.min(b),
            max: a.max(b),
        }
    }
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Aabb {
        let half_extents = half_extents.abs();
        Aabb {
            min: center - half_extents,
            max: center + half_extents,
        }
    }
    /// Squared distance from the point to the closest point of the box, zero inside.
    pub fn distance_squared(&self, point: Vec3) -> f32 {
        point.distance_squared(point.clamp(self.min, self.max))
    }
}

/// A static set of box obstacles. A point is blocked when a sphere of radius `clearance` around
/// it overlaps any box, so cells are marked blocked as soon as an obstacle reaches into them.
#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    pub obstacles: Vec<Aabb>,
    pub clearance: f32,
}

impl ObstacleField {
    pub fn new(clearance: f32) -> ObstacleField {
        ObstacleField {
            obstacles: Vec::new(),
            clearance: clearance.max(0.0),
        }
    }
    pub fn with_obstacle(mut self, obstacle: Aabb) -> ObstacleField {
        self.obstacles.push(obstacle);
        self
    }
    pub fn add(&mut self, obstacle: Aabb) {
        self.obstacles.push(obstacle);
    }
}

impl ObstacleOracle for ObstacleField {
    fn is_blocked(&self, point: Vec3) -> bool {
        let reach = self.clearance * self.clearance;
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.distance_squared(point) <= reach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_oracles() {
        let oracle = |p: Vec3| p.x > 1.0;
        assert!(oracle.is_blocked(Vec3::new(2.0, 0.0, 0.0)));
        assert!(!oracle.is_blocked(Vec3::ZERO));
    }

    #[test]
    fn clearance_extends_obstacles() {
        let b = Aabb::new(Vec3::new(1.0, -1.0, 1.0), Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(b.min, Vec3::splat(-1.0));
        let tight = ObstacleField::new(0.0).with_obstacle(b);
        let loose = ObstacleField::new(0.6).with_obstacle(b);
        let p = Vec3::new(1.5, 0.0, 0.0);
        assert!(tight.is_blocked(Vec3::ZERO));
        assert!(!tight.is_blocked(p));
        assert!(loose.is_blocked(p));
        let mut field = ObstacleField::new(0.0);
        assert!(!field.is_blocked(p));
        field.add(Aabb::from_center(p, Vec3::splat(0.1)));
        assert!(field.is_blocked(p));
    }
}
