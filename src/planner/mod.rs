use glam::Vec3;
use grid_util::point::Point;
use log::{debug, error, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::astar::{astar, SearchOutcome};
use crate::error::SearchFailure;
use crate::path::{Path, Waypoint};
use crate::spatial_grid::{Connectivity, SpatialGrid};
use crate::N_SMALLVEC_SIZE;

pub mod metric;

use metric::Metric;

/// Search settings. Metric and connectivity are meant to be chosen together, see
/// [PlannerConfig::new].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    pub metric: Metric,
    pub connectivity: Connectivity,
    /// Scales the heuristic. 0.0 searches like Dijkstra, values above 1.0 trade optimality for
    /// fewer expansions.
    pub heuristic_factor: f32,
    /// Allows diagonal steps between two blocked orthogonal cells.
    pub allow_corner_cutting: bool,
    /// Upper bound on expanded cells per search.
    pub max_expansions: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig::new(Metric::default())
    }
}

impl PlannerConfig {
    /// Settings for `metric` with the connectivity it prices consistently.
    pub fn new(metric: Metric) -> PlannerConfig {
        PlannerConfig {
            metric,
            connectivity: metric.paired_connectivity(),
            heuristic_factor: 1.0,
            allow_corner_cutting: true,
            max_expansions: None,
        }
    }
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> PlannerConfig {
        self.connectivity = connectivity;
        self
    }
    pub fn with_heuristic_factor(mut self, heuristic_factor: f32) -> PlannerConfig {
        self.heuristic_factor = heuristic_factor;
        self
    }
    pub fn with_corner_cutting(mut self, allow_corner_cutting: bool) -> PlannerConfig {
        self.allow_corner_cutting = allow_corner_cutting;
        self
    }
    pub fn with_max_expansions(mut self, max_expansions: usize) -> PlannerConfig {
        self.max_expansions = Some(max_expansions);
        self
    }
}

/// Lifecycle of the most recent search: `Idle -> Searching -> {Found, NotFound}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Found,
    NotFound,
}

/// Runs A* over a [SpatialGrid]. The grid is only borrowed immutably; all cost bookkeeping is
/// allocated per call, so searches never see stale costs or parents from earlier runs.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    config: PlannerConfig,
    state: SearchState,
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> PathPlanner {
        if !config.metric.is_consistent_with(config.connectivity) {
            warn!(
                "{:?} metric is not paired with {:?} connectivity, paths may not be cheapest",
                config.metric, config.connectivity
            );
        }
        PathPlanner {
            config,
            state: SearchState::Idle,
        }
    }
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Cost of moving between two cells.
    pub fn cost(&self, p1: &Point, p2: &Point) -> i32 {
        self.config.metric.distance(p1, p2)
    }

    /// The metric distance times the heuristic factor.
    pub fn heuristic(&self, p1: &Point, p2: &Point) -> i32 {
        (self.cost(p1, p2) as f32 * self.config.heuristic_factor.max(0.0)) as i32
    }

    /// Sums the step costs along a sequence of adjacent cells.
    pub fn path_cost(&self, start: &Point, cells: impl IntoIterator<Item = Point>) -> i32 {
        let mut previous = *start;
        let mut total = 0;
        for p in cells {
            total += self.cost(&previous, &p);
            previous = p;
        }
        total
    }

    /// Resolves both world positions to their nearest cells and searches between them.
    pub fn find_path(
        &mut self,
        grid: &SpatialGrid,
        start: Vec3,
        goal: Vec3,
    ) -> Result<Path, SearchFailure> {
        self.state = SearchState::Searching;
        match (grid.index_at(start), grid.index_at(goal)) {
            (Some(start_ix), Some(goal_ix)) => self.find_path_between(grid, start_ix, goal_ix),
            _ => {
                error!("Start or goal cell is missing, ensure the grid is built");
                self.state = SearchState::NotFound;
                Err(SearchFailure::GridNotReady)
            }
        }
    }

    /// Searches between two cell indices. The returned path excludes the start cell and is
    /// empty if start and goal coincide.
    pub fn find_path_between(
        &mut self,
        grid: &SpatialGrid,
        start: Point,
        goal: Point,
    ) -> Result<Path, SearchFailure> {
        self.state = SearchState::Searching;
        let result = self.search(grid, start, goal);
        self.state = match result {
            Ok(_) => SearchState::Found,
            Err(_) => SearchState::NotFound,
        };
        result
    }

    fn successors(
        &self,
        grid: &SpatialGrid,
        node: &Point,
    ) -> SmallVec<[(Point, i32); N_SMALLVEC_SIZE]> {
        grid.neighborhood_points(node, self.config.connectivity)
            .into_iter()
            .filter(|p| grid.can_move_to(*p, *node, self.config.allow_corner_cutting))
            .map(|p| (p, self.cost(node, &p)))
            .collect()
    }

    fn search(&self, grid: &SpatialGrid, start: Point, goal: Point) -> Result<Path, SearchFailure> {
        if !grid.is_ready() || !grid.point_in_bounds(start) || !grid.point_in_bounds(goal) {
            error!("Cannot search from {start:?} to {goal:?}, grid is not ready");
            return Err(SearchFailure::GridNotReady);
        }
        if start == goal {
            return Ok(Path::default());
        }
        let no_path = SearchFailure::NoPathExists { start, goal };
        if !grid.is_walkable(goal) {
            info!("Goal {goal:?} is blocked");
            return Err(no_path);
        }
        // A blocked start may still step off its cell, so only walkable starts are pre-checked.
        let start_walkable = grid.is_walkable(start);
        if start_walkable && !grid.reachable(&start, &goal, self.config.connectivity) {
            info!("{goal:?} is not reachable from {start:?}");
            return Err(no_path);
        }
        info!("Searching from {start:?} to {goal:?}");

        let outcome = astar(
            &start,
            |node| self.successors(grid, node),
            |point| self.heuristic(point, &goal),
            |point| *point == goal,
            self.config.max_expansions,
        );
        match outcome {
            SearchOutcome::Found {
                path,
                cost,
                expanded,
            } => {
                let steps = path
                    .into_iter()
                    .skip(1)
                    .map(|p| {
                        grid.cell(p).map(|cell| Waypoint {
                            index: p,
                            world_position: cell.world_position,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| SearchFailure::GridNotReady)?;
                for step in &steps {
                    debug!("Path cell: ({}, {})", step.index.x, step.index.y);
                }
                info!(
                    "Found path of {} cells with cost {} after {} expansions",
                    steps.len(),
                    cost,
                    expanded
                );
                Ok(Path::new(steps, cost, expanded))
            }
            SearchOutcome::Exhausted { expanded } => {
                if start_walkable && self.config.allow_corner_cutting {
                    warn!("Reachable goal could not be pathed to, is reachable graph correct?");
                } else {
                    info!("Open set exhausted after {expanded} expansions");
                }
                Err(no_path)
            }
            SearchOutcome::BudgetExceeded { expanded } => {
                warn!("Search budget exhausted after {expanded} expansions");
                Err(SearchFailure::BudgetExhausted { limit: expanded })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::spatial_grid::GridSettings;

    use super::*;

    /// Builds a grid from rows given highest row first, `#` marking blocked cells.
    fn grid_from_rows(rows: &[&str]) -> SpatialGrid {
        let h = rows.len();
        let w = rows[0].len();
        let settings = GridSettings::new(Vec2::new(w as f32, h as f32), 0.5);
        let blocked = |p: Vec3| {
            let x = (p.x + w as f32 / 2.0).floor() as usize;
            let y = (p.z + h as f32 / 2.0).floor() as usize;
            rows[h - 1 - y].as_bytes()[x] == b'#'
        };
        SpatialGrid::build(settings, &blocked).unwrap()
    }

    /// Asserts that the case in which start and goal are equal is handled correctly.
    #[test]
    fn equal_start_goal() {
        for metric in [Metric::Euclidean, Metric::Manhattan] {
            let grid = grid_from_rows(&["."]);
            let mut planner = PathPlanner::new(PlannerConfig::new(metric));
            let start = Point::new(0, 0);
            let path = planner.find_path_between(&grid, start, start).unwrap();
            assert!(path.is_empty());
            assert_eq!(planner.state(), SearchState::Found);
        }
    }

    /// Asserts that the optimal solution around a single obstacle is found.
    #[test]
    fn solve_simple_problem() {
        let grid = grid_from_rows(&["...", ".#.", "..."]);
        for (connectivity, corner_cutting, expected) in [
            (Connectivity::FourWay, true, 4),
            (Connectivity::EightWay, true, 3),
            (Connectivity::EightWay, false, 4),
        ] {
            let config = PlannerConfig::new(Metric::Manhattan)
                .with_connectivity(connectivity)
                .with_corner_cutting(corner_cutting);
            let mut planner = PathPlanner::new(config);
            let path = planner
                .find_path_between(&grid, Point::new(0, 0), Point::new(2, 2))
                .unwrap();
            assert_eq!(path.len(), expected);
            assert_eq!(path.goal().unwrap().index, Point::new(2, 2));
            assert!(path.cells().all(|p| grid.is_walkable(p)));
        }
    }

    #[test]
    fn path_excludes_start_and_ends_at_goal() {
        let grid = grid_from_rows(&["....", "....", "...."]);
        let mut planner = PathPlanner::new(PlannerConfig::new(Metric::Manhattan));
        let start = Point::new(0, 0);
        let path = planner
            .find_path_between(&grid, start, Point::new(3, 0))
            .unwrap();
        assert_eq!(
            path.cells().collect::<Vec<_>>(),
            vec![Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)]
        );
        assert_eq!(path.cost(), 30);
        assert_eq!(planner.path_cost(&start, path.cells()), path.cost());
        let last = path.goal().unwrap();
        assert_eq!(last.world_position, Vec3::new(1.5, 0.0, -1.0));
    }

    #[test]
    fn blocked_goal_has_no_path() {
        let grid = grid_from_rows(&["..#", "...", "..."]);
        let mut planner = PathPlanner::default();
        let result = planner.find_path_between(&grid, Point::new(0, 0), Point::new(2, 2));
        assert_eq!(
            result,
            Err(SearchFailure::NoPathExists {
                start: Point::new(0, 0),
                goal: Point::new(2, 2)
            })
        );
        assert_eq!(planner.state(), SearchState::NotFound);
    }

    #[test]
    fn blocked_start_can_step_off() {
        let grid = grid_from_rows(&["...", "...", "#.."]);
        let mut planner = PathPlanner::new(PlannerConfig::new(Metric::Manhattan));
        let path = planner
            .find_path_between(&grid, Point::new(0, 0), Point::new(0, 2))
            .unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn unreachable_goal_is_rejected_up_front() {
        let grid = grid_from_rows(&["..#..", "..#..", "..#.."]);
        let mut planner = PathPlanner::new(PlannerConfig::new(Metric::Manhattan));
        let result = planner.find_path_between(&grid, Point::new(0, 1), Point::new(4, 1));
        assert!(matches!(result, Err(SearchFailure::NoPathExists { .. })));
    }

    #[test]
    fn corner_cutting_off_still_completes_search() {
        // The diagonal gap connects components under 8-way movement, but cannot be squeezed
        // through without corner cutting.
        let grid = grid_from_rows(&[".#", "#."]);
        let config = PlannerConfig::new(Metric::Manhattan).with_corner_cutting(false);
        let mut planner = PathPlanner::new(config);
        let result = planner.find_path_between(&grid, Point::new(0, 1), Point::new(1, 0));
        assert!(matches!(result, Err(SearchFailure::NoPathExists { .. })));
        let mut cutting = PathPlanner::new(PlannerConfig::new(Metric::Manhattan));
        let path = cutting
            .find_path_between(&grid, Point::new(0, 1), Point::new(1, 0))
            .unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn budget_limits_expansions() {
        let grid = grid_from_rows(&[".........."; 10]);
        let config = PlannerConfig::new(Metric::Manhattan).with_max_expansions(3);
        let mut planner = PathPlanner::new(config);
        let result = planner.find_path_between(&grid, Point::new(0, 0), Point::new(9, 9));
        assert_eq!(result, Err(SearchFailure::BudgetExhausted { limit: 3 }));
    }

    #[test]
    fn empty_grid_is_not_ready() {
        let grid = SpatialGrid::default();
        let mut planner = PathPlanner::default();
        assert_eq!(
            planner.find_path(&grid, Vec3::ZERO, Vec3::ONE),
            Err(SearchFailure::GridNotReady)
        );
        assert_eq!(planner.state(), SearchState::NotFound);
    }

    #[test]
    fn out_of_bounds_indices_are_not_ready() {
        let grid = grid_from_rows(&["..", ".."]);
        let mut planner = PathPlanner::default();
        assert_eq!(
            planner.find_path_between(&grid, Point::new(0, 0), Point::new(5, 0)),
            Err(SearchFailure::GridNotReady)
        );
    }

    #[test]
    fn heuristic_factor_scales_heuristic_only() {
        let config = PlannerConfig::new(Metric::Manhattan).with_heuristic_factor(0.0);
        let planner = PathPlanner::new(config);
        let a = Point::new(0, 0);
        let b = Point::new(3, 1);
        assert_eq!(planner.heuristic(&a, &b), 0);
        assert_eq!(planner.cost(&a, &b), 14 + 20);
    }
}
