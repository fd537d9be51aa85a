use glam::{Vec2, Vec3};
use grid_planner::{Aabb, GridSettings, ObstacleField, PathPlanner, PlannerConfig, SpatialGrid};

// In this example a path is found on a 5x5 grid with shape
// .....
// .###.
// .#...
// .#.#.
// S...E
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have an 8-neighborhood and Euclidean costs.

fn main() {
    let obstacles = ObstacleField::new(0.0)
        .with_obstacle(Aabb::new(Vec3::new(-1.2, 0.0, 0.8), Vec3::new(1.2, 1.0, 1.2)))
        .with_obstacle(Aabb::new(Vec3::new(-1.2, 0.0, -1.2), Vec3::new(-0.8, 1.0, 1.2)))
        .with_obstacle(Aabb::new(Vec3::new(0.8, 0.0, -1.2), Vec3::new(1.2, 1.0, -0.8)));
    let settings = GridSettings::new(Vec2::new(5.0, 5.0), 0.5);
    let grid = SpatialGrid::build(settings, &obstacles).unwrap();
    println!("{}", grid);
    let start = Vec3::new(-2.0, 0.0, -2.0);
    let end = Vec3::new(2.0, 0.0, -2.0);
    let mut planner = PathPlanner::new(PlannerConfig::default());
    let path = planner.find_path(&grid, start, end).unwrap();
    println!("Path (cost {}):", path.cost());
    for step in &path {
        println!("{:?} at {}", step.index, step.world_position);
    }
}
