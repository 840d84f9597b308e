//! Breadth-first searches over the passable cells of a [`WallMap`].

use crate::grid::{Direction, Grid4, GridCoord};
use crate::maze::WallMap;
use rand::Rng;
use std::collections::VecDeque;

/// Hop cap for target selection.
pub const MAX_TARGET_DISTANCE: u32 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSelection {
    pub target: GridCoord,
    pub distance: u32,
}

/// Picks uniformly among the cells at the largest distance reached from
/// `start`, searching at most `max_distance` hops out. The reservoir resets
/// whenever a new maximum distance is reached.
pub fn select_target<R: Rng + ?Sized>(
    start: GridCoord,
    walls: &WallMap,
    max_distance: u32,
    rng: &mut R,
) -> TargetSelection {
    let size = walls.size();
    let start = size.wrap(start);
    let mut visited = Grid4::filled(size, false);
    visited.set(start, true);
    let mut queue = VecDeque::from([(start, 0u32)]);

    let mut best = TargetSelection {
        target: start,
        distance: 0,
    };
    let mut candidates = 1u32;

    while let Some((cell, distance)) = queue.pop_front() {
        if distance > best.distance {
            best = TargetSelection {
                target: cell,
                distance,
            };
            candidates = 1;
        } else if distance == best.distance && cell != start {
            candidates += 1;
            if rng.gen_range(0..candidates) == 0 {
                best.target = cell;
            }
        }
        if distance >= max_distance {
            continue;
        }
        for direction in Direction::ALL {
            let next = size.neighbor(cell, direction);
            if walls.is_passable(next) && !*visited.get(next) {
                visited.set(next, true);
                queue.push_back((next, distance + 1));
            }
        }
    }
    best
}

/// Shortest passable path from `from` to `to`, both ends included, in
/// wrapped coordinates. `None` if `to` can't be reached.
pub fn find_solution(from: GridCoord, to: GridCoord, walls: &WallMap) -> Option<Vec<GridCoord>> {
    let size = walls.size();
    let from = size.wrap(from);
    let to = size.wrap(to);
    if walls.is_wall(from) || walls.is_wall(to) {
        return None;
    }

    let mut previous: Grid4<Option<GridCoord>> = Grid4::filled(size, None);
    previous.set(from, Some(from));
    let mut queue = VecDeque::from([from]);
    while let Some(cell) = queue.pop_front() {
        if cell == to {
            break;
        }
        for direction in Direction::ALL {
            let next = size.neighbor(cell, direction);
            if walls.is_passable(next) && previous.get(next).is_none() {
                previous.set(next, Some(cell));
                queue.push_back(next);
            }
        }
    }

    if previous.get(to).is_none() {
        return None;
    }
    let mut path = vec![to];
    let mut cell = to;
    while cell != from {
        cell = (*previous.get(cell))?;
        path.push(cell);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use crate::maze::{generate, WallColor};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solid_except(open: &[GridCoord]) -> WallMap {
        let mut cells = Grid4::filled(GridSize::REFERENCE, Some(WallColor::Yellow));
        for &coord in open {
            cells.set(coord, None);
        }
        WallMap::from_cells(cells)
    }

    #[test]
    fn single_open_cell_targets_itself() {
        let walls = solid_except(&[GridCoord::new(2, 2, 2, 2)]);
        let mut rng = StdRng::seed_from_u64(0);
        let selection = select_target(GridCoord::new(2, 2, 2, 2), &walls, MAX_TARGET_DISTANCE, &mut rng);
        assert_eq!(
            selection,
            TargetSelection {
                target: GridCoord::new(2, 2, 2, 2),
                distance: 0
            }
        );
    }

    #[test]
    fn corridor_targets_its_far_end() {
        let corridor: Vec<GridCoord> = (0..4).map(|x| GridCoord::new(x, 0, 0, 0)).collect();
        let walls = solid_except(&corridor);
        let mut rng = StdRng::seed_from_u64(1);
        let selection = select_target(GridCoord::ZERO, &walls, MAX_TARGET_DISTANCE, &mut rng);
        assert_eq!(selection.target, GridCoord::new(3, 0, 0, 0));
        assert_eq!(selection.distance, 3);
    }

    #[test]
    fn target_distance_respects_cap() {
        let corridor: Vec<GridCoord> = (0..4).map(|x| GridCoord::new(x, 0, 0, 0)).collect();
        let walls = solid_except(&corridor);
        let mut rng = StdRng::seed_from_u64(1);
        let selection = select_target(GridCoord::ZERO, &walls, 2, &mut rng);
        assert_eq!(selection.target, GridCoord::new(2, 0, 0, 0));
        assert_eq!(selection.distance, 2);
    }

    #[test]
    fn ties_are_broken_among_equidistant_cells() {
        let walls = solid_except(&[
            GridCoord::new(0, 0, 0, 0),
            GridCoord::new(1, 0, 0, 0),
            GridCoord::new(4, 0, 0, 0),
        ]);
        let mut seen = std::collections::HashSet::new();
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select_target(GridCoord::ZERO, &walls, MAX_TARGET_DISTANCE, &mut rng);
            assert_eq!(selection.distance, 1);
            seen.insert(selection.target);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn solution_wraps_across_the_seam() {
        let walls = solid_except(&[
            GridCoord::new(0, 0, 0, 0),
            GridCoord::new(0, 0, 0, 4),
            GridCoord::new(0, 0, 0, 3),
        ]);
        let path = find_solution(GridCoord::ZERO, GridCoord::new(0, 0, 0, 3), &walls);
        assert_eq!(
            path,
            Some(vec![
                GridCoord::new(0, 0, 0, 0),
                GridCoord::new(0, 0, 0, 4),
                GridCoord::new(0, 0, 0, 3),
            ])
        );
    }

    #[test]
    fn unreachable_target_has_no_solution() {
        let walls = solid_except(&[GridCoord::new(0, 0, 0, 0), GridCoord::new(2, 2, 2, 2)]);
        assert_eq!(find_solution(GridCoord::ZERO, GridCoord::new(2, 2, 2, 2), &walls), None);
        assert_eq!(
            find_solution(GridCoord::ZERO, GridCoord::ZERO, &walls),
            Some(vec![GridCoord::ZERO])
        );
    }

    #[test]
    fn solutions_on_generated_mazes_are_shortest_and_adjacent() {
        for seed in 0..6 {
            let maze = generate(GridSize::REFERENCE, &mut StdRng::seed_from_u64(seed));
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let selection = select_target(maze.start_position, &maze.walls, MAX_TARGET_DISTANCE, &mut rng);
            assert!(selection.distance <= MAX_TARGET_DISTANCE);
            assert!(maze.walls.is_passable(selection.target));

            let path = find_solution(maze.start_position, selection.target, &maze.walls)
                .expect("target is reachable");
            assert_eq!(path.len() as u32, selection.distance + 1);
            for pair in path.windows(2) {
                assert!(Direction::between(GridSize::REFERENCE, pair[0], pair[1]).is_some());
                assert!(maze.walls.is_passable(pair[1]));
            }
        }
    }
}
