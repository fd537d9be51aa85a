use glam::{Vec2, Vec3};
use grid_planner::{
    Aabb, FollowStep, FollowerSettings, GridSettings, Navigator, ObstacleField, PathFollower,
    PlannerConfig, Replan, SpatialGrid,
};

// A seeker chases a target that jumps to a new spot halfway through. The navigator only plans
// when the target lands in a different cell, and the follower pauses briefly at every waypoint.

fn main() {
    let wall = Aabb::from_center(Vec3::new(0.0, 0.5, 1.0), Vec3::new(0.4, 0.5, 3.0));
    let grid = SpatialGrid::build(
        GridSettings::new(Vec2::new(8.0, 8.0), 0.5),
        &ObstacleField::new(0.2).with_obstacle(wall),
    )
    .unwrap();
    println!("{}", grid);

    let settings = FollowerSettings {
        speed: 2.0,
        pause: 0.1,
    };
    let follower = PathFollower::new(Vec3::new(-3.5, 0.0, 3.5), settings).unwrap();
    let mut navigator = Navigator::new(PlannerConfig::default(), follower);
    let targets = [Vec3::new(3.5, 0.0, 3.5), Vec3::new(3.5, 0.0, -3.5)];

    const DT: f32 = 1.0 / 30.0;
    for (frame, target) in targets
        .iter()
        .flat_map(|t| std::iter::repeat(*t).take(150))
        .enumerate()
    {
        match navigator.request(&grid, target) {
            Ok(Replan::Started) => println!("frame {frame}: new route to {target}"),
            Ok(_) => {}
            Err(e) => println!("frame {frame}: holding position, {e}"),
        }
        match navigator.tick(DT) {
            FollowStep::Reached(waypoint) => println!("frame {frame}: reached {waypoint}"),
            FollowStep::Finished => println!("frame {frame}: arrived at {}", navigator.position()),
            _ => {}
        }
    }
}
