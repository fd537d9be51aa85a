use grid_util::point::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::spatial_grid::Connectivity;
use crate::{C, D};

/// Distance model used for both step costs and the heuristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Metric {
    /// Straight-line index distance rounded to an integer, so a diagonal step costs 1 like a
    /// straight one. Only admissible as a heuristic under 4-way movement.
    #[default]
    Euclidean,
    /// Diagonal-aware cost with [C] per straight and [D] per diagonal step.
    Manhattan,
}

impl Metric {
    /// Distance between two cell indices under this metric.
    pub fn distance(self, p1: &Point, p2: &Point) -> i32 {
        let delta_x = (p1.x - p2.x).abs();
        let delta_y = (p1.y - p2.y).abs();
        match self {
            Metric::Euclidean => {
                let squared =
                    (delta_x as i64 * delta_x as i64 + delta_y as i64 * delta_y as i64) as f64;
                squared.sqrt().round_ties_even() as i32
            }
            // Takes as many diagonal steps as possible before going straight.
            Metric::Manhattan => C * (delta_x + delta_y) + (D - 2 * C) * delta_x.min(delta_y),
        }
    }

    /// The connectivity under which this metric is an admissible heuristic for its own step
    /// costs, so searches return cheapest paths.
    pub fn paired_connectivity(self) -> Connectivity {
        match self {
            Metric::Euclidean => Connectivity::FourWay,
            Metric::Manhattan => Connectivity::EightWay,
        }
    }

    /// Whether searching with this metric under `connectivity` matches the paired
    /// connectivity. Rounded Euclidean distance overestimates diagonal runs under 8-way
    /// movement, e.g. 6 for four diagonal steps costing 4, so paths may not be cheapest. The
    /// Manhattan cost prices diagonal steps that 4-way movement never takes.
    pub fn is_consistent_with(self, connectivity: Connectivity) -> bool {
        self.paired_connectivity() == connectivity
    }
}
