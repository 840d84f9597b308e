//! Which cells need live geometry, and which of their faces are exposed.
//!
//! Everything here works in lattice coordinates so the neighbourhood drawn
//! around the observer stays contiguous across the torus seam; wall lookups
//! wrap through [`WallMap`].

use crate::grid::{Direction, DirectionSet, GridCoord};
use crate::maze::{WallColor, WallMap};
use crate::navigation::{NavigationKey, NavigationState};
use crate::rotation::OrientationFrame;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Cap on how far a corridor seen through an open forward cell is extended.
pub const MAX_CORRIDOR_DEPTH: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Simple,
    #[default]
    Advanced,
}

impl RenderMode {
    pub fn toggled(self) -> RenderMode {
        match self {
            RenderMode::Simple => RenderMode::Advanced,
            RenderMode::Advanced => RenderMode::Simple,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Simple => f.write_str("simple"),
            RenderMode::Advanced => f.write_str("advanced"),
        }
    }
}

/// Direction `d` is open iff the neighbour at `coord + d` is passable.
pub fn open_faces(coord: GridCoord, walls: &WallMap) -> DirectionSet {
    Direction::ALL
        .into_iter()
        .filter(|direction| walls.is_passable(coord + direction.unit()))
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleCellSet {
    cells: HashMap<GridCoord, DirectionSet>,
}

impl VisibleCellSet {
    fn from_coords(coords: HashSet<GridCoord>, walls: &WallMap) -> Self {
        Self {
            cells: coords
                .into_iter()
                .map(|coord| (coord, open_faces(coord, walls)))
                .collect(),
        }
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn open_faces(&self, coord: GridCoord) -> Option<DirectionSet> {
        self.cells.get(&coord).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, DirectionSet)> + '_ {
        self.cells.iter().map(|(coord, open)| (*coord, *open))
    }

    pub fn union(mut self, other: VisibleCellSet) -> VisibleCellSet {
        self.cells.extend(other.cells);
        self
    }
}

pub fn compute_visible(
    position: GridCoord,
    frame: &OrientationFrame,
    walls: &WallMap,
    mode: RenderMode,
) -> VisibleCellSet {
    let mut coords = HashSet::new();
    match mode {
        RenderMode::Simple => collect_simple(position, frame, &mut coords),
        RenderMode::Advanced => collect_advanced(position, frame, walls, 0, &mut coords),
    }
    VisibleCellSet::from_coords(coords, walls)
}

/// Union of the sets seen from the current and pending poses, so nothing
/// pops in or out while a transition is animating.
pub fn compute_renderable(
    navigation: &NavigationState,
    walls: &WallMap,
    mode: RenderMode,
) -> VisibleCellSet {
    let current = compute_visible(
        navigation.lattice_position(),
        &navigation.frame(),
        walls,
        mode,
    );
    if navigation.lattice_position() == navigation.pending_lattice_position()
        && navigation.frame() == navigation.pending_frame()
    {
        return current;
    }
    let pending = compute_visible(
        navigation.pending_lattice_position(),
        &navigation.pending_frame(),
        walls,
        mode,
    );
    current.union(pending)
}

fn collect_simple(position: GridCoord, frame: &OrientationFrame, out: &mut HashSet<GridCoord>) {
    for direction in frame.side_directions() {
        out.insert(position + direction.unit());
    }
    out.insert(position + frame.forward.unit());
}

fn collect_advanced(
    position: GridCoord,
    frame: &OrientationFrame,
    walls: &WallMap,
    depth: usize,
    out: &mut HashSet<GridCoord>,
) {
    collect_simple(position, frame, out);
    let forward = frame.forward.unit();
    let sides = frame.side_directions();
    for side in sides {
        let opening = position + side.unit();
        if walls.is_wall(opening) {
            continue;
        }
        out.insert(opening + side.unit());
        out.insert(opening + forward);
        for across in sides.iter().filter(|other| other.axis() != side.axis()) {
            out.insert(opening + across.unit());
        }
    }
    let ahead = position + forward;
    if depth < MAX_CORRIDOR_DEPTH && walls.is_passable(ahead) {
        collect_advanced(ahead, frame, walls, depth + 1, out);
    }
}

/// A wall cell that currently owns render geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetainedCell {
    pub lattice: GridCoord,
    pub coord: GridCoord,
    pub color: WallColor,
    pub open: DirectionSet,
    /// Seconds since spawn; drives the fade-in.
    pub age: f32,
}

impl RetainedCell {
    pub fn fade(&self) -> f32 {
        self.age.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellEffect {
    Spawn { lattice: GridCoord, color: WallColor },
    Despawn { lattice: GridCoord },
}

/// Retained cells keyed by lattice coordinate.
#[derive(Clone, Debug, Default)]
pub struct CellCache {
    cells: HashMap<GridCoord, RetainedCell>,
}

impl CellCache {
    /// Diffs `desired` against what is retained. Passable cells never get geometry.
    pub fn reconcile(&mut self, desired: &VisibleCellSet, walls: &WallMap) -> Vec<CellEffect> {
        let mut despawned: Vec<GridCoord> = self
            .cells
            .keys()
            .copied()
            .filter(|lattice| !desired.contains(*lattice))
            .collect();
        despawned.sort_unstable();
        for lattice in &despawned {
            self.cells.remove(lattice);
        }

        let mut spawned = Vec::new();
        for (lattice, open) in desired.iter() {
            let Some(color) = walls.color(lattice) else {
                continue;
            };
            match self.cells.get_mut(&lattice) {
                Some(cell) => cell.open = open,
                None => {
                    self.cells.insert(
                        lattice,
                        RetainedCell {
                            lattice,
                            coord: walls.size().wrap(lattice),
                            color,
                            open,
                            age: 0.0,
                        },
                    );
                    spawned.push((lattice, color));
                }
            }
        }
        spawned.sort_unstable_by_key(|(lattice, _)| *lattice);

        despawned
            .into_iter()
            .map(|lattice| CellEffect::Despawn { lattice })
            .chain(
                spawned
                    .into_iter()
                    .map(|(lattice, color)| CellEffect::Spawn { lattice, color }),
            )
            .collect()
    }

    pub fn advance(&mut self, dt: f32) {
        for cell in self.cells.values_mut() {
            cell.age += dt;
        }
    }

    pub fn get(&self, lattice: GridCoord) -> Option<&RetainedCell> {
        self.cells.get(&lattice)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sorted by lattice coordinate so frame output is stable.
    pub fn cells(&self) -> Vec<&RetainedCell> {
        let mut cells: Vec<&RetainedCell> = self.cells.values().collect();
        cells.sort_unstable_by_key(|cell| cell.lattice);
        cells
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Owns the render policy and the retained cells, and refreshes them only
/// when the navigation pose changed.
#[derive(Clone, Debug, Default)]
pub struct VisibilityResolver {
    mode: RenderMode,
    cache: CellCache,
    last_key: Option<NavigationKey>,
}

impl VisibilityResolver {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            cache: CellCache::default(),
            last_key: None,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            self.mode = mode;
            self.last_key = None;
        }
    }

    pub fn toggle_mode(&mut self) -> RenderMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn refresh(&mut self, navigation: &NavigationState, walls: &WallMap) -> Vec<CellEffect> {
        let key = navigation.key();
        if self.last_key == Some(key) {
            return Vec::new();
        }
        self.last_key = Some(key);
        let desired = compute_renderable(navigation, walls, self.mode);
        let effects = self.cache.reconcile(&desired, walls);
        log::debug!(
            "visibility refresh: {} visible, {} retained, {} effects",
            desired.len(),
            self.cache.len(),
            effects.len()
        );
        effects
    }

    pub fn advance(&mut self, dt: f32) {
        self.cache.advance(dt);
    }

    pub fn cache(&self) -> &CellCache {
        &self.cache
    }
}
