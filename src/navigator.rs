use glam::Vec3;
use grid_util::point::Point;
use log::{debug, info};

use crate::error::SearchFailure;
use crate::follower::{FollowStep, PathFollower};
use crate::path::Path;
use crate::planner::{PathPlanner, PlannerConfig};
use crate::spatial_grid::SpatialGrid;

/// Outcome of a planning request made through a [Navigator].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Replan {
    /// The target still resolves to the cell of the current plan; nothing was searched.
    Unchanged,
    /// A search ran but produced the route already being followed.
    SameRoute,
    /// A new traversal was started.
    Started,
}

/// Couples a [PathPlanner] with a [PathFollower]. Searches run only when the target moves to a
/// different cell or a replan is requested explicitly, and the follower is restarted only when
/// the new route differs from the one it is on.
#[derive(Clone, Debug)]
pub struct Navigator {
    planner: PathPlanner,
    follower: PathFollower,
    goal: Option<Point>,
    path: Option<Path>,
}

impl Navigator {
    pub fn new(config: PlannerConfig, follower: PathFollower) -> Navigator {
        Navigator {
            planner: PathPlanner::new(config),
            follower,
            goal: None,
            path: None,
        }
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }
    pub fn position(&self) -> Vec3 {
        self.follower.position()
    }
    /// The most recent successful plan.
    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Plans towards `target` if it resolves to a different cell than the current goal.
    pub fn request(&mut self, grid: &SpatialGrid, target: Vec3) -> Result<Replan, SearchFailure> {
        let goal = grid.index_at(target).ok_or(SearchFailure::GridNotReady)?;
        if self.goal == Some(goal) {
            return Ok(Replan::Unchanged);
        }
        self.replan(grid, target)
    }

    /// Plans towards `target` from the mover's current position unconditionally. On failure
    /// the traversal is cancelled, the goal is forgotten and the mover holds its position, so
    /// the next [request](Self::request) searches again.
    pub fn replan(&mut self, grid: &SpatialGrid, target: Vec3) -> Result<Replan, SearchFailure> {
        let goal = grid.index_at(target).ok_or(SearchFailure::GridNotReady)?;
        let path = match self.planner.find_path(grid, self.follower.position(), target) {
            Ok(path) => path,
            Err(e) => {
                info!("Holding position at {}: {e}", self.follower.position());
                self.stop();
                return Err(e);
            }
        };
        self.goal = Some(goal);
        let remaining = self.follower.remaining().collect::<Vec<_>>();
        if self.follower.is_following() && path.world_positions().eq(remaining) {
            debug!("New plan matches the remaining route, keeping traversal");
            self.path = Some(path);
            return Ok(Replan::SameRoute);
        }
        self.follower.follow(&path);
        self.path = Some(path);
        Ok(Replan::Started)
    }

    /// Forgets the current goal and stops the mover.
    pub fn stop(&mut self) {
        self.goal = None;
        self.path = None;
        self.follower.cancel();
    }

    pub fn tick(&mut self, dt: f32) -> FollowStep {
        self.follower.tick(dt)
    }
}
