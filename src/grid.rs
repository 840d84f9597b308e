//! Toroidal 4D grid addressing.
//!
//! `GridCoord` doubles as a wrapped maze coordinate and as an unwrapped
//! lattice coordinate (the universal cover of the torus). Anything that looks
//! up a cell goes through [`GridSize::wrap`], so both forms address the same
//! cell.

use cgmath::Vector4;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

pub const DIMENSIONS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord(pub [i32; DIMENSIONS]);

impl GridCoord {
    pub const ZERO: Self = Self([0; DIMENSIONS]);
    pub const ONE: Self = Self([1; DIMENSIONS]);

    pub const fn new(x: i32, y: i32, z: i32, w: i32) -> Self {
        Self([x, y, z, w])
    }

    pub fn add_mod(self, other: GridCoord, size: GridSize) -> GridCoord {
        size.wrap(self + other)
    }

    pub fn to_vector(self) -> Vector4<f32> {
        Vector4::new(
            self.0[0] as f32,
            self.0[1] as f32,
            self.0[2] as f32,
            self.0[3] as f32,
        )
    }
}

impl Add for GridCoord {
    type Output = GridCoord;

    fn add(self, rhs: GridCoord) -> Self::Output {
        Self(std::array::from_fn(|axis| self.0[axis] + rhs.0[axis]))
    }
}

impl Sub for GridCoord {
    type Output = GridCoord;

    fn sub(self, rhs: GridCoord) -> Self::Output {
        Self(std::array::from_fn(|axis| self.0[axis] - rhs.0[axis]))
    }
}

impl Neg for GridCoord {
    type Output = GridCoord;

    fn neg(self) -> Self::Output {
        self * -1
    }
}

impl Mul<i32> for GridCoord {
    type Output = GridCoord;

    fn mul(self, rhs: i32) -> Self::Output {
        Self(self.0.map(|v| v * rhs))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z, w] = self.0;
        write!(f, "({x};{y};{z};{w})")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridSizeError {
    NonPositiveExtent { axis: usize, extent: i32 },
}

impl fmt::Display for GridSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveExtent { axis, extent } => {
                write!(f, "grid extent on axis {axis} must be positive, got {extent}")
            }
        }
    }
}

impl std::error::Error for GridSizeError {}

/// Per-axis extents of the torus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    extents: [i32; DIMENSIONS],
}

impl GridSize {
    pub const REFERENCE: GridSize = GridSize { extents: [5; DIMENSIONS] };

    pub fn new(extents: [i32; DIMENSIONS]) -> Result<Self, GridSizeError> {
        for (axis, &extent) in extents.iter().enumerate() {
            if extent <= 0 {
                return Err(GridSizeError::NonPositiveExtent { axis, extent });
            }
        }
        Ok(Self { extents })
    }

    pub fn extent(&self, axis: usize) -> i32 {
        self.extents[axis]
    }

    pub fn cell_count(&self) -> usize {
        self.extents.iter().map(|&e| e as usize).product()
    }

    pub fn wrap(&self, coord: GridCoord) -> GridCoord {
        GridCoord(std::array::from_fn(|axis| {
            coord.0[axis].rem_euclid(self.extents[axis])
        }))
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        (0..DIMENSIONS).all(|axis| coord.0[axis] >= 0 && coord.0[axis] < self.extents[axis])
    }

    pub fn neighbor(&self, coord: GridCoord, direction: Direction) -> GridCoord {
        coord.add_mod(direction.unit(), *self)
    }

    /// Linear index with x outermost and w innermost.
    pub fn index_of(&self, coord: GridCoord) -> usize {
        let [x, y, z, w] = self.wrap(coord).0.map(|v| v as usize);
        let [_, sy, sz, sw] = self.extents.map(|e| e as usize);
        ((x * sy + y) * sz + z) * sw + w
    }

    pub fn coord_of(&self, index: usize) -> GridCoord {
        let [_, sy, sz, sw] = self.extents.map(|e| e as usize);
        let w = index % sw;
        let z = (index / sw) % sz;
        let y = (index / (sw * sz)) % sy;
        let x = index / (sw * sz * sy);
        GridCoord::new(x as i32, y as i32, z as i32, w as i32)
    }

    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.cell_count()).map(move |index| self.coord_of(index))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// One of the 8 axis-aligned unit steps, ordered `+X, -X, +Y, -Y, +Z, -Z, +W, -W`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
    PosW,
    NegW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
        Direction::PosW,
        Direction::NegW,
    ];

    pub fn from_axis(axis: usize, positive: bool) -> Direction {
        Self::ALL[axis * 2 + usize::from(!positive)]
    }

    /// The direction of a single toroidal step from `from` to `to`, if they are adjacent.
    pub fn between(size: GridSize, from: GridCoord, to: GridCoord) -> Option<Direction> {
        let to = size.wrap(to);
        Self::ALL
            .into_iter()
            .find(|&direction| size.neighbor(from, direction) == to)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn axis(self) -> usize {
        self.index() / 2
    }

    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn sign(self) -> i32 {
        if self.is_positive() {
            1
        } else {
            -1
        }
    }

    pub fn opposite(self) -> Direction {
        Self::from_axis(self.axis(), !self.is_positive())
    }

    pub fn unit(self) -> GridCoord {
        let mut unit = GridCoord::ZERO;
        unit.0[self.axis()] = self.sign();
        unit
    }

    pub fn to_vector(self) -> Vector4<f32> {
        self.unit().to_vector()
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::PosX => "+X",
            Direction::NegX => "-X",
            Direction::PosY => "+Y",
            Direction::NegY => "-Y",
            Direction::PosZ => "+Z",
            Direction::NegZ => "-Z",
            Direction::PosW => "+W",
            Direction::NegW => "-W",
        }
    }
}

impl Neg for Direction {
    type Output = Direction;

    fn neg(self) -> Self::Output {
        self.opposite()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset over [`Direction`], bit `i` for `Direction::ALL[i]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);
    pub const FULL: DirectionSet = DirectionSet(u8::MAX);

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.index());
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&direction| self.contains(direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Dense storage for one value per cell of a [`GridSize`].
#[derive(Clone, Debug, PartialEq)]
pub struct Grid4<T> {
    size: GridSize,
    cells: Vec<T>,
}

impl<T> Grid4<T> {
    pub fn from_fn(size: GridSize, mut f: impl FnMut(GridCoord) -> T) -> Self {
        let cells = size.coords().map(|coord| f(coord)).collect();
        Self { size, cells }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn get(&self, coord: GridCoord) -> &T {
        &self.cells[self.size.index_of(coord)]
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> &mut T {
        let index = self.size.index_of(coord);
        &mut self.cells[index]
    }

    pub fn set(&mut self, coord: GridCoord, value: T) {
        *self.get_mut(coord) = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, value)| (self.size.coord_of(index), value))
    }

    pub fn map<U>(&self, mut f: impl FnMut(GridCoord, &T) -> U) -> Grid4<U> {
        Grid4 {
            size: self.size,
            cells: self.iter().map(|(coord, value)| f(coord, value)).collect(),
        }
    }
}

impl<T: Clone> Grid4<T> {
    pub fn filled(size: GridSize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size.cell_count()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_handles_negative_and_overflowing_components() {
        let size = GridSize::REFERENCE;
        assert_eq!(size.wrap(GridCoord::new(-1, 5, 7, -6)), GridCoord::new(4, 0, 2, 4));
        assert_eq!(
            GridCoord::new(4, 0, 0, 0).add_mod(Direction::PosX.unit(), size),
            GridCoord::ZERO
        );
        assert_eq!(
            GridCoord::ZERO.add_mod(-Direction::PosW.unit(), size),
            GridCoord::new(0, 0, 0, 4)
        );
    }

    #[test]
    fn size_rejects_non_positive_extents() {
        assert_eq!(
            GridSize::new([5, 0, 5, 5]),
            Err(GridSizeError::NonPositiveExtent { axis: 1, extent: 0 })
        );
        assert!(GridSize::new([2, 3, 4, 5]).is_ok());
    }

    #[test]
    fn index_round_trips_in_x_major_order() {
        let size = GridSize::new([2, 3, 4, 5]).unwrap();
        let coords: Vec<GridCoord> = size.coords().collect();
        assert_eq!(coords.len(), 120);
        assert_eq!(coords[0], GridCoord::ZERO);
        assert_eq!(coords[1], GridCoord::new(0, 0, 0, 1));
        assert_eq!(coords[119], GridCoord::new(1, 2, 3, 4));
        for (index, coord) in coords.iter().enumerate() {
            assert_eq!(size.index_of(*coord), index);
        }
    }

    #[test]
    fn directions_pair_up_per_axis() {
        let names: Vec<&str> = Direction::ALL.iter().map(|d| d.name()).collect();
        assert_eq!(names, ["+X", "-X", "+Y", "-Y", "+Z", "-Z", "+W", "-W"]);
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.unit() + direction.opposite().unit(), GridCoord::ZERO);
            assert_eq!(Direction::from_axis(direction.axis(), direction.is_positive()), direction);
        }
    }

    #[test]
    fn between_finds_steps_across_the_seam() {
        let size = GridSize::REFERENCE;
        assert_eq!(
            Direction::between(size, GridCoord::new(0, 0, 0, 0), GridCoord::new(0, 0, 4, 0)),
            Some(Direction::NegZ)
        );
        assert_eq!(
            Direction::between(size, GridCoord::new(0, 0, 0, 0), GridCoord::new(1, 1, 0, 0)),
            None
        );
    }

    #[test]
    fn direction_set_tracks_membership() {
        let mut set: DirectionSet = [Direction::PosX, Direction::NegW].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Direction::NegW));
        set.remove(Direction::NegW);
        assert!(!set.contains(Direction::NegW));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Direction::PosX]);
    }
}
