//! Error types for grid construction, grid queries, searches and path following.

use grid_util::point::Point;
use thiserror::Error;

/// Errors raised by [SpatialGrid](crate::spatial_grid::SpatialGrid) construction and queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The settings describe a grid with a non-positive or non-finite extent. Fatal: no grid is
    /// produced.
    #[error("grid construction failed: {0}")]
    Construction(String),

    /// The grid holds no cells, typically because it was never built.
    #[error("grid is not initialized")]
    NotReady,

    /// Direct cell access with indices outside the grid. Nothing was mutated.
    #[error("invalid grid coordinates ({x}, {y})")]
    InvalidCoordinate { x: i32, y: i32 },
}

/// Negative outcomes of a search. These are expected results the caller must handle (for
/// instance by holding position), not exceptional conditions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// Start or goal did not resolve to a cell.
    #[error("start or goal does not resolve to a grid cell")]
    GridNotReady,

    /// The open set was exhausted without reaching the goal.
    #[error("no path exists from {start:?} to {goal:?}")]
    NoPathExists { start: Point, goal: Point },

    /// The configured expansion budget ran out before the goal was reached.
    #[error("search budget of {limit} expansions exhausted")]
    BudgetExhausted { limit: usize },
}

/// Invalid [FollowerSettings](crate::follower::FollowerSettings).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FollowerError {
    #[error("follower speed must be positive and finite, got {0}")]
    InvalidSpeed(f32),

    #[error("follower pause must be non-negative and finite, got {0}")]
    InvalidPause(f32),
}
