use glam::{Vec2, Vec3};
use grid_planner::{Connectivity, GridSettings, Metric, PathPlanner, PlannerConfig, SpatialGrid};

// Compares metric, connectivity and heuristic factor settings on a 30x30 room with a few
// blocks in it. A heuristic factor above 1 is Weighted A*: it expands fewer cells at the risk of
// a longer path; a factor of 0 turns the search into Dijkstra's algorithm. Euclidean distance
// with 8-way movement overestimates diagonal runs, so its paths are not always the cheapest.

fn main() {
    const N: f32 = 30.0;
    let blocks = [
        (Vec2::new(-7.0, -7.0), Vec2::new(1.0, 1.0)),
        (Vec2::new(-15.0, -12.0), Vec2::new(-9.0, -6.0)),
        (Vec2::new(-5.0, -15.0), Vec2::new(1.0, -9.0)),
    ];
    let oracle = |p: Vec3| {
        blocks
            .iter()
            .any(|(min, max)| p.x >= min.x && p.x <= max.x && p.z >= min.y && p.z <= max.y)
    };
    let grid = SpatialGrid::build(GridSettings::new(Vec2::splat(N), 0.5), &oracle).unwrap();
    println!("{}", grid);
    let start = Vec3::new(-13.5, 0.0, -13.5);
    let end = Vec3::new(12.5, 0.0, 12.5);
    for config in [
        PlannerConfig::new(Metric::Euclidean),
        PlannerConfig::new(Metric::Euclidean).with_connectivity(Connectivity::EightWay),
        PlannerConfig::new(Metric::Manhattan),
        PlannerConfig::new(Metric::Manhattan).with_heuristic_factor(0.0),
        PlannerConfig::new(Metric::Manhattan).with_heuristic_factor(1.3),
    ] {
        let mut planner = PathPlanner::new(config);
        match planner.find_path(&grid, start, end) {
            Ok(path) => println!(
                "{:?}/{:?} h x{}: {} cells, cost {}, {} expansions",
                config.metric,
                config.connectivity,
                config.heuristic_factor,
                path.len(),
                path.cost(),
                path.nodes_expanded()
            ),
            Err(e) => println!("{:?}/{:?}: {e}", config.metric, config.connectivity),
        }
    }
}
