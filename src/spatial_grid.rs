use crate::error::GridError;
use crate::oracle::ObstacleOracle;
use crate::N_SMALLVEC_SIZE;
use core::fmt;
use glam::{Vec2, Vec3};
use grid_util::point::Point;
use log::{debug, error, info};
use petgraph::unionfind::UnionFind;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Offsets in emission order: N, E, S, W with N pointing towards +y.
const FOUR_WAY: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
/// Offsets in emission order: N, NE, E, SE, S, SW, W, NW.
const EIGHT_WAY: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Neighbour topology used when enumerating adjacent cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Connectivity {
    /// Orthogonal steps only.
    FourWay,
    /// Orthogonal and diagonal steps.
    #[default]
    EightWay,
}

impl Connectivity {
    /// Unit offsets in the fixed order in which neighbours are emitted. The order matters for
    /// tie-breaking during search when costs are equal.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::FourWay => &FOUR_WAY,
            Connectivity::EightWay => &EIGHT_WAY,
        }
    }
}

/// RGBA presentation colour. Carried on each cell for overlays, ignored by search.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 0.92, 0.016);

    /// Default colour of walkable cells.
    pub const WALKABLE: Color = Color::WHITE;
    /// Default colour of blocked cells.
    pub const BLOCKED: Color = Color::RED;
    /// Colour overlays use for cells on a path.
    pub const PATH: Color = Color::YELLOW;

    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b, a: 1.0 }
    }
}

/// One element of a [SpatialGrid]. Everything except the colour is fixed at construction;
/// search bookkeeping lives in the planner, not on the cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub walkable: bool,
    pub world_position: Vec3,
    pub index: Point,
    pub color: Color,
}

impl Cell {
    pub fn grid_x(&self) -> i32 {
        self.index.x
    }
    pub fn grid_y(&self) -> i32 {
        self.index.y
    }
}

/// World-space description of a grid. The grid is centred on `anchor` and spans
/// `world_size.x` along world X and `world_size.y` along world Z.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridSettings {
    pub world_size: Vec2,
    pub node_radius: f32,
    pub anchor: Vec3,
}

impl Default for GridSettings {
    fn default() -> GridSettings {
        GridSettings {
            world_size: Vec2::new(10.0, 10.0),
            node_radius: 0.5,
            anchor: Vec3::ZERO,
        }
    }
}

impl GridSettings {
    pub fn new(world_size: Vec2, node_radius: f32) -> GridSettings {
        GridSettings {
            world_size,
            node_radius,
            anchor: Vec3::ZERO,
        }
    }
    pub fn with_anchor(mut self, anchor: Vec3) -> GridSettings {
        self.anchor = anchor;
        self
    }
    pub fn node_diameter(&self) -> f32 {
        self.node_radius * 2.0
    }
    /// Number of cells along each axis, `round(world_size / diameter)`.
    pub fn dimensions(&self) -> Result<(usize, usize), GridError> {
        if !(self.node_radius.is_finite() && self.node_radius > 0.0) {
            return Err(GridError::Construction(format!(
                "node radius must be positive and finite, got {}",
                self.node_radius
            )));
        }
        let diameter = self.node_diameter();
        let size_x = (self.world_size.x / diameter).round_ties_even();
        let size_y = (self.world_size.y / diameter).round_ties_even();
        if !(size_x.is_finite() && size_y.is_finite()) || size_x < 1.0 || size_y < 1.0 {
            return Err(GridError::Construction(format!(
                "computed grid size {size_x}x{size_y} is invalid, check world size and node radius"
            )));
        }
        Ok((size_x as usize, size_y as usize))
    }
}

/// [SpatialGrid] owns a fixed arena of [Cell]s laid out over a world-space rectangle. Cells are
/// addressed by [Point] indices; walkability is sampled once from an [ObstacleOracle] at
/// construction. Connected components of walkable cells are computed up front for both
/// connectivities so unreachable goals can be rejected without searching.
///
/// The [Default] grid is empty and answers every query as not ready.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    settings: GridSettings,
    size_x: usize,
    size_y: usize,
    cells: Vec<Cell>,
    components_four: UnionFind<usize>,
    components_eight: UnionFind<usize>,
}

impl Default for SpatialGrid {
    fn default() -> SpatialGrid {
        SpatialGrid {
            settings: GridSettings::default(),
            size_x: 0,
            size_y: 0,
            cells: Vec::new(),
            components_four: UnionFind::new(0),
            components_eight: UnionFind::new(0),
        }
    }
}

impl SpatialGrid {
    /// Samples the oracle at every cell centre and builds the grid. Fails without producing a
    /// grid if the settings yield non-positive dimensions.
    pub fn build<O>(settings: GridSettings, oracle: &O) -> Result<SpatialGrid, GridError>
    where
        O: ObstacleOracle + ?Sized,
    {
        let (size_x, size_y) = settings.dimensions().inspect_err(|e| error!("{e}"))?;
        let diameter = settings.node_diameter();
        let radius = settings.node_radius;
        let bottom_left = settings.anchor
            - Vec3::X * settings.world_size.x / 2.0
            - Vec3::Z * settings.world_size.y / 2.0;

        let mut cells = Vec::with_capacity(size_x * size_y);
        for y in 0..size_y {
            for x in 0..size_x {
                let world_position = bottom_left
                    + Vec3::X * (x as f32 * diameter + radius)
                    + Vec3::Z * (y as f32 * diameter + radius);
                let walkable = !oracle.is_blocked(world_position);
                cells.push(Cell {
                    walkable,
                    world_position,
                    index: Point::new(x as i32, y as i32),
                    color: if walkable {
                        Color::WALKABLE
                    } else {
                        Color::BLOCKED
                    },
                });
            }
        }
        let mut grid = SpatialGrid {
            settings,
            size_x,
            size_y,
            cells,
            components_four: UnionFind::new(0),
            components_eight: UnionFind::new(0),
        };
        grid.generate_components();
        info!(
            "Built {}x{} grid with {} blocked cells",
            size_x,
            size_y,
            grid.cells.iter().filter(|c| !c.walkable).count()
        );
        Ok(grid)
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }
    pub fn size_x(&self) -> usize {
        self.size_x
    }
    pub fn size_y(&self) -> usize {
        self.size_y
    }
    pub fn is_ready(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size_x && (y as usize) < self.size_y
    }
    pub fn point_in_bounds(&self, point: Point) -> bool {
        self.in_bounds(point.x, point.y)
    }
    fn get_ix(&self, x: i32, y: i32) -> usize {
        y as usize * self.size_x + x as usize
    }
    pub(crate) fn get_ix_point(&self, point: &Point) -> usize {
        self.get_ix(point.x, point.y)
    }

    /// Bounds-checked cell access.
    pub fn cell(&self, index: Point) -> Result<&Cell, GridError> {
        if !self.is_ready() {
            return Err(GridError::NotReady);
        }
        if !self.point_in_bounds(index) {
            return Err(GridError::InvalidCoordinate {
                x: index.x,
                y: index.y,
            });
        }
        Ok(&self.cells[self.get_ix_point(&index)])
    }

    /// [true] only for in-bounds walkable cells.
    pub fn is_walkable(&self, index: Point) -> bool {
        self.point_in_bounds(index) && self.cells[self.get_ix_point(&index)].walkable
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Index of the cell nearest to a world position. Positions outside the grid clamp to the
    /// boundary, so this is a nearest-cell lookup rather than a containment test.
    ///
    /// The position is taken relative to [GridSettings::anchor], i.e. each axis maps through
    /// `clamp01((coord - anchor + size / 2) / size)`. For a grid anchored at the origin this is
    /// the plain `clamp01((coord + size / 2) / size)`; for any other anchor the plain formula
    /// would resolve positions as if the grid sat at the origin.
    pub fn index_at(&self, world_position: Vec3) -> Option<Point> {
        if !self.is_ready() {
            error!("Grid is not initialized, cannot resolve {world_position}");
            return None;
        }
        let size = self.settings.world_size;
        let local = world_position - self.settings.anchor;
        let percent_x = ((local.x + size.x / 2.0) / size.x).clamp(0.0, 1.0);
        let percent_y = ((local.z + size.y / 2.0) / size.y).clamp(0.0, 1.0);
        let x = ((self.size_x - 1) as f32 * percent_x).round_ties_even() as i32;
        let y = ((self.size_y - 1) as f32 * percent_y).round_ties_even() as i32;
        debug!("Resolved {world_position} to cell ({x}, {y})");
        Some(Point::new(x, y))
    }

    /// The cell nearest to a world position, see [index_at](Self::index_at).
    pub fn cell_at(&self, world_position: Vec3) -> Option<&Cell> {
        self.index_at(world_position)
            .map(|p| &self.cells[self.get_ix_point(&p)])
    }

    /// The cell whose centre is closest to `world_position` by straight-line distance. Unlike
    /// [cell_at](Self::cell_at) this scans every cell and accounts for all three axes.
    pub fn closest_cell(&self, world_position: Vec3) -> Option<&Cell> {
        self.cells.iter().min_by(|a, b| {
            a.world_position
                .distance_squared(world_position)
                .total_cmp(&b.world_position.distance_squared(world_position))
        })
    }

    /// In-bounds neighbours of `index` in the fixed order given by [Connectivity::offsets]. Does
    /// not look at walkability.
    pub fn neighbors(
        &self,
        index: Point,
        connectivity: Connectivity,
    ) -> Result<SmallVec<[Point; N_SMALLVEC_SIZE]>, GridError> {
        self.cell(index)?;
        Ok(self.neighborhood_points(&index, connectivity))
    }

    pub(crate) fn neighborhood_points(
        &self,
        point: &Point,
        connectivity: Connectivity,
    ) -> SmallVec<[Point; N_SMALLVEC_SIZE]> {
        connectivity
            .offsets()
            .iter()
            .map(|&(dx, dy)| Point::new(point.x + dx, point.y + dy))
            .filter(|p| self.point_in_bounds(*p))
            .collect()
    }

    /// Checks whether a step between two adjacent cells is allowed. A diagonal step squeezing
    /// past a blocked orthogonal cell is only allowed with corner cutting.
    pub(crate) fn can_move_to(&self, pos: Point, start: Point, allow_corner_cutting: bool) -> bool {
        if !self.is_walkable(pos) {
            return false;
        }
        if allow_corner_cutting || pos.x == start.x || pos.y == start.y {
            return true;
        }
        self.is_walkable(Point::new(start.x, pos.y)) && self.is_walkable(Point::new(pos.x, start.y))
    }

    /// Writes a presentation colour. Out-of-range indices are reported and leave the grid
    /// untouched.
    pub fn set_color(&mut self, x: i32, y: i32, color: Color) -> Result<(), GridError> {
        if !self.in_bounds(x, y) {
            let e = GridError::InvalidCoordinate { x, y };
            error!("{e}");
            return Err(e);
        }
        let ix = self.get_ix(x, y);
        self.cells[ix].color = color;
        Ok(())
    }

    /// Checks if two cells are walkable and in the same component under `connectivity`.
    pub fn reachable(&self, start: &Point, goal: &Point, connectivity: Connectivity) -> bool {
        if !self.is_walkable(*start) || !self.is_walkable(*goal) {
            return false;
        }
        let components = match connectivity {
            Connectivity::FourWay => &self.components_four,
            Connectivity::EightWay => &self.components_eight,
        };
        components.equiv(self.get_ix_point(start), self.get_ix_point(goal))
    }

    /// Links walkable neighbours into components. Only forward offsets are visited since union
    /// is symmetric.
    fn generate_components(&mut self) {
        let n = self.cells.len();
        let mut four = UnionFind::new(n);
        let mut eight = UnionFind::new(n);
        for cell in self.cells.iter().filter(|c| c.walkable) {
            let point = cell.index;
            let parent_ix = self.get_ix_point(&point);
            for (dx, dy) in [(0, 1), (1, 0), (1, 1), (1, -1)] {
                let p = Point::new(point.x + dx, point.y + dy);
                if !self.is_walkable(p) {
                    continue;
                }
                let ix = self.get_ix_point(&p);
                if dx == 0 || dy == 0 {
                    four.union(parent_ix, ix);
                }
                eight.union(parent_ix, ix);
            }
        }
        self.components_four = four;
        self.components_eight = eight;
    }
}

impl fmt::Display for SpatialGrid {
    /// Prints the occupancy with the highest row first, `#` for blocked and `.` for walkable.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in (0..self.size_y as i32).rev() {
            let row = (0..self.size_x as i32)
                .map(|x| {
                    if self.cells[self.get_ix(x, y)].walkable {
                        '.'
                    } else {
                        '#'
                    }
                })
                .collect::<String>();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
