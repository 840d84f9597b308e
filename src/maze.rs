//! Randomised growth of a braided maze over the 4D torus.
//!
//! Cells, not edges, become walls: a cell where two growth fronts meet is a
//! wall candidate, and a fraction of those are reopened to create loops.

use crate::grid::{Direction, Grid4, GridCoord, GridSize};
use crate::rotation::{OrientationFrame, Turn};
use crate::unordered_list::UnorderedList;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// One in `BRAID_ODDS` collision cells is reopened.
pub const BRAID_ODDS: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallColor {
    Red,
    Green,
    Blue,
    Magenta,
    Yellow,
    Cyan,
}

impl WallColor {
    pub const PALETTE: [WallColor; 6] = [
        WallColor::Red,
        WallColor::Green,
        WallColor::Blue,
        WallColor::Magenta,
        WallColor::Yellow,
        WallColor::Cyan,
    ];

    pub fn rgb(self) -> [f32; 3] {
        match self {
            WallColor::Red => [1.0, 0.0, 0.0],
            WallColor::Green => [0.0, 1.0, 0.0],
            WallColor::Blue => [0.0, 0.0, 1.0],
            WallColor::Magenta => [1.0, 0.0, 1.0],
            WallColor::Yellow => [1.0, 0.92, 0.016],
            WallColor::Cyan => [0.0, 1.0, 1.0],
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            WallColor::Red => "red",
            WallColor::Green => "green",
            WallColor::Blue => "blue",
            WallColor::Magenta => "magenta",
            WallColor::Yellow => "yellow",
            WallColor::Cyan => "cyan",
        }
    }
}

impl fmt::Display for WallColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellState {
    Unseen,
    Frontier,
    Carved,
    Collision,
}

/// Total map from cell to wall color; `None` is open space.
#[derive(Clone, Debug, PartialEq)]
pub struct WallMap {
    cells: Grid4<Option<WallColor>>,
}

impl WallMap {
    pub fn from_cells(cells: Grid4<Option<WallColor>>) -> Self {
        Self { cells }
    }

    pub fn size(&self) -> GridSize {
        self.cells.size()
    }

    /// Wraps `coord` first, so lattice coordinates are accepted.
    pub fn color(&self, coord: GridCoord) -> Option<WallColor> {
        *self.cells.get(coord)
    }

    pub fn is_wall(&self, coord: GridCoord) -> bool {
        self.color(coord).is_some()
    }

    pub fn is_passable(&self, coord: GridCoord) -> bool {
        self.color(coord).is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, Option<WallColor>)> + '_ {
        self.cells.iter().map(|(coord, color)| (coord, *color))
    }

    pub fn passable_count(&self) -> usize {
        self.iter().filter(|(_, color)| color.is_none()).count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMaze {
    pub walls: WallMap,
    pub start_position: GridCoord,
    pub start_frame: OrientationFrame,
}

/// Runs the full generation pipeline. Deterministic for a given rng state.
pub fn generate<R: Rng + ?Sized>(size: GridSize, rng: &mut R) -> GeneratedMaze {
    let (states, origin) = grow(size, rng);
    let walls = finalize(&states, rng);
    let start_position = pick_start_position(&walls, origin, rng);
    let start_frame = pick_start_frame(rng);
    GeneratedMaze {
        walls,
        start_position,
        start_frame,
    }
}

fn grow<R: Rng + ?Sized>(size: GridSize, rng: &mut R) -> (Grid4<CellState>, GridCoord) {
    let mut states = Grid4::filled(size, CellState::Unseen);
    let origin = GridCoord(std::array::from_fn(|axis| rng.gen_range(0..size.extent(axis))));
    states.set(origin, CellState::Frontier);

    let mut worklist = UnorderedList::with_capacity(size.cell_count());
    worklist.push(origin);
    while let Some(cell) = worklist.pop_random(rng) {
        if *states.get(cell) != CellState::Frontier {
            continue;
        }
        states.set(cell, CellState::Carved);
        let neighbors = Direction::ALL.map(|direction| size.neighbor(cell, direction));
        for (i, &neighbor) in neighbors.iter().enumerate() {
            // Both steps along an axis of extent 2 land on the same cell.
            if neighbors[..i].contains(&neighbor) {
                continue;
            }
            match *states.get(neighbor) {
                CellState::Unseen => {
                    states.set(neighbor, CellState::Frontier);
                    worklist.push(neighbor);
                }
                CellState::Frontier => states.set(neighbor, CellState::Collision),
                CellState::Carved | CellState::Collision => {}
            }
        }
    }
    (states, origin)
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> WallColor {
    WallColor::PALETTE[rng.gen_range(0..WallColor::PALETTE.len())]
}

/// Braids and colors in one pass; each collision cell draws its braid roll,
/// then its color if it stays a wall.
///
/// A cell growth never reached (collision cells can enclose one on small
/// grids) is walled in, so only carved cells and reopened collisions are open.
fn finalize<R: Rng + ?Sized>(states: &Grid4<CellState>, rng: &mut R) -> WallMap {
    let cells = states.map(|_, state| match state {
        CellState::Collision if rng.gen_range(0..BRAID_ODDS) != 0 => Some(random_color(rng)),
        CellState::Collision | CellState::Carved => None,
        CellState::Unseen | CellState::Frontier => Some(random_color(rng)),
    });
    WallMap::from_cells(cells)
}

/// Reservoir-samples one passable cell. `fallback` must be passable.
fn pick_start_position<R: Rng + ?Sized>(
    walls: &WallMap,
    fallback: GridCoord,
    rng: &mut R,
) -> GridCoord {
    let mut chosen = fallback;
    let mut seen = 0u32;
    for (coord, color) in walls.iter() {
        if color.is_some() {
            continue;
        }
        seen += 1;
        if rng.gen_range(0..seen) == 0 {
            chosen = coord;
        }
    }
    chosen
}

fn pick_start_frame<R: Rng + ?Sized>(rng: &mut R) -> OrientationFrame {
    let mut turns: Vec<Turn> = Turn::ALL.iter().flat_map(|&turn| [turn, turn]).collect();
    turns.shuffle(rng);
    turns
        .into_iter()
        .fold(OrientationFrame::AXIS_ALIGNED, OrientationFrame::turned)
}
