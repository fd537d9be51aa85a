//! # grid_planner
//!
//! A grid-based path planner. A [SpatialGrid] is laid over a world-space rectangle and its cells
//! are marked walkable or blocked by an [ObstacleOracle] once, at construction. The
//! [PathPlanner] runs [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) between the cells
//! nearest to two world positions, with 4-way or 8-way movement and a Euclidean or
//! diagonal-aware Manhattan metric. Connected components are pre-computed so that searches for
//! unreachable goals return immediately instead of flood-filling the grid.
//!
//! A [PathFollower] then moves a point along the resulting [Path] tick by tick, and a
//! [Navigator] ties both together for a mover that chases a target.
//!
//! ```
//! use glam::{Vec2, Vec3};
//! use grid_planner::{GridSettings, PathPlanner, PlannerConfig, SpatialGrid};
//!
//! let settings = GridSettings::new(Vec2::new(5.0, 5.0), 0.5);
//! let grid = SpatialGrid::build(settings, &|p: Vec3| p.x.abs() < 0.5 && p.z < 1.5).unwrap();
//! let mut planner = PathPlanner::new(PlannerConfig::default());
//! let path = planner
//!     .find_path(&grid, Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 0.0, -2.0))
//!     .unwrap();
//! assert!(path.cells().all(|p| grid.is_walkable(p)));
//! ```
mod astar;
pub mod error;
pub mod follower;
pub mod navigator;
pub mod oracle;
pub mod path;
pub mod planner;
pub mod spatial_grid;

pub use error::{FollowerError, GridError, SearchFailure};
pub use follower::{FollowStep, FollowerSettings, PathFollower};
pub use navigator::{Navigator, Replan};
pub use oracle::{Aabb, ObstacleField, ObstacleOracle};
pub use path::{Path, Waypoint};
pub use planner::metric::Metric;
pub use planner::{PathPlanner, PlannerConfig, SearchState};
pub use spatial_grid::{Cell, Color, Connectivity, GridSettings, SpatialGrid};

/// Cost of a straight step under [Metric::Manhattan].
pub const C: i32 = 10;
/// Cost of a diagonal step under [Metric::Manhattan].
pub const D: i32 = 14;

/// Inline capacity for neighbourhoods, enough for a full 8-neighbourhood.
pub const N_SMALLVEC_SIZE: usize = 8;
