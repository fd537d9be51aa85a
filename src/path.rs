use glam::Vec3;
use grid_util::point::Point;

/// A cell on a [Path].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub index: Point,
    pub world_position: Vec3,
}

/// Ordered cells from the start (excluded) to the goal (included), as produced by one
/// successful search. Each search yields a fresh path that supersedes the previous one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    steps: Vec<Waypoint>,
    cost: i32,
    expanded: usize,
}

impl Path {
    pub fn new(steps: Vec<Waypoint>, cost: i32, expanded: usize) -> Path {
        Path {
            steps,
            cost,
            expanded,
        }
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    /// Accumulated step cost under the metric the path was planned with.
    pub fn cost(&self) -> i32 {
        self.cost
    }
    /// Number of cells the search expanded to produce this path.
    pub fn nodes_expanded(&self) -> usize {
        self.expanded
    }
    pub fn steps(&self) -> &[Waypoint] {
        &self.steps
    }
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.steps.iter().map(|w| w.index)
    }
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.steps.iter().map(|w| w.world_position)
    }
    pub fn goal(&self) -> Option<&Waypoint> {
        self.steps.last()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
