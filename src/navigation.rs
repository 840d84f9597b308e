//! Queued, animated movement through the maze.
//!
//! The state holds a settled `current` pose and a `pending` pose. While
//! `progress < 1` the displayed pose is interpolated between the two; once it
//! reaches 1 the pending pose is committed and at most one queued command is
//! applied to the pending fields.

use crate::grid::{GridCoord, GridSize};
use crate::maze::WallMap;
use crate::rotation::{OrientationFrame, Turn, ViewFrame};
use cgmath::{Vector4, VectorSpace};
use std::collections::VecDeque;

/// Transitions per second with an empty queue.
pub const BASE_SPEED: f32 = 4.0;
pub const MAX_SPEED: f32 = 16.0;
/// Bound on how fast the animation speed itself may change, per second.
pub const MAX_ACCELERATION: f32 = 24.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Turn(Turn),
    MoveForward,
}

/// Snapshot of everything the visible set depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NavigationKey {
    pub lattice: GridCoord,
    pub frame: OrientationFrame,
    pub pending_lattice: GridCoord,
    pub pending_frame: OrientationFrame,
}

#[derive(Clone, Debug)]
pub struct NavigationState {
    size: GridSize,
    lattice: GridCoord,
    frame: OrientationFrame,
    pending_lattice: GridCoord,
    pending_frame: OrientationFrame,
    progress: f32,
    speed: f32,
    queue: VecDeque<Command>,
}

impl NavigationState {
    pub fn new(size: GridSize, position: GridCoord, frame: OrientationFrame) -> Self {
        let position = size.wrap(position);
        Self {
            size,
            lattice: position,
            frame,
            pending_lattice: position,
            pending_frame: frame,
            progress: 1.0,
            speed: BASE_SPEED,
            queue: VecDeque::new(),
        }
    }

    /// Always accepted; validation happens when the command is applied.
    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn tick(&mut self, dt: f32, walls: &WallMap) {
        if self.progress < 1.0 {
            self.update_speed(dt);
            self.progress = (self.progress + self.speed * dt).min(1.0);
        }
        if self.progress >= 1.0 {
            self.commit();
            if let Some(command) = self.queue.pop_front() {
                self.apply(command, walls);
            }
        }
    }

    fn update_speed(&mut self, dt: f32) {
        let target = (BASE_SPEED * (1 + self.queue.len()) as f32).min(MAX_SPEED);
        let max_step = MAX_ACCELERATION * dt;
        self.speed += (target - self.speed).clamp(-max_step, max_step);
    }

    fn commit(&mut self) {
        self.progress = 1.0;
        self.lattice = self.pending_lattice;
        self.frame = self.pending_frame;
    }

    fn apply(&mut self, command: Command, walls: &WallMap) {
        match command {
            Command::Turn(turn) => {
                self.pending_frame = self.frame.turned(turn);
                self.progress = 0.0;
                log::debug!("turn {} -> view {}", turn.name(), self.pending_frame);
            }
            Command::MoveForward => {
                let destination = self.lattice + self.frame.forward.unit();
                if walls.is_wall(destination) {
                    log::debug!(
                        "move {} blocked by wall at {}",
                        self.frame.forward,
                        self.size.wrap(destination)
                    );
                    return;
                }
                self.pending_lattice = destination;
                self.progress = 0.0;
                log::debug!("move {} -> {}", self.frame.forward, self.size.wrap(destination));
            }
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn position(&self) -> GridCoord {
        self.size.wrap(self.lattice)
    }

    pub fn pending_position(&self) -> GridCoord {
        self.size.wrap(self.pending_lattice)
    }

    /// Unwrapped position; stays continuous across the torus seam.
    pub fn lattice_position(&self) -> GridCoord {
        self.lattice
    }

    pub fn pending_lattice_position(&self) -> GridCoord {
        self.pending_lattice
    }

    pub fn frame(&self) -> OrientationFrame {
        self.frame
    }

    pub fn pending_frame(&self) -> OrientationFrame {
        self.pending_frame
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_transitioning(&self) -> bool {
        self.progress < 1.0
    }

    pub fn is_idle(&self) -> bool {
        self.progress >= 1.0
            && self.queue.is_empty()
            && self.lattice == self.pending_lattice
            && self.frame == self.pending_frame
    }

    pub fn key(&self) -> NavigationKey {
        NavigationKey {
            lattice: self.lattice,
            frame: self.frame,
            pending_lattice: self.pending_lattice,
            pending_frame: self.pending_frame,
        }
    }

    pub fn view_frame(&self) -> ViewFrame {
        ViewFrame::blend(&self.frame, &self.pending_frame, self.progress)
    }

    pub fn view_position(&self) -> Vector4<f32> {
        self.lattice
            .to_vector()
            .lerp(self.pending_lattice.to_vector(), self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Grid4};
    use crate::maze::WallColor;

    const DT: f32 = 1.0 / 60.0;

    fn open_walls() -> WallMap {
        WallMap::from_cells(Grid4::filled(GridSize::REFERENCE, None))
    }

    fn walls_with(blocked: &[GridCoord]) -> WallMap {
        let mut cells = Grid4::filled(GridSize::REFERENCE, None);
        for &coord in blocked {
            cells.set(coord, Some(WallColor::Blue));
        }
        WallMap::from_cells(cells)
    }

    fn settle(nav: &mut NavigationState, walls: &WallMap) {
        for _ in 0..10_000 {
            if nav.is_idle() {
                return;
            }
            nav.tick(DT, walls);
        }
        panic!("navigation never settled");
    }

    #[test]
    fn new_state_is_idle() {
        let nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        assert!(nav.is_idle());
        assert_eq!(nav.progress(), 1.0);
    }

    #[test]
    fn move_forward_commits_once() {
        let walls = open_walls();
        let mut nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        nav.enqueue(Command::MoveForward);
        nav.tick(DT, &walls);
        assert!(nav.is_transitioning());
        assert_eq!(nav.position(), GridCoord::ZERO);
        assert_eq!(nav.pending_position(), GridCoord::new(0, 0, 0, 1));
        settle(&mut nav, &walls);
        assert_eq!(nav.position(), GridCoord::new(0, 0, 0, 1));
    }

    #[test]
    fn move_into_wall_is_dropped() {
        let walls = walls_with(&[GridCoord::new(0, 0, 0, 1)]);
        let mut nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        nav.enqueue(Command::MoveForward);
        nav.tick(DT, &walls);
        assert_eq!(nav.position(), GridCoord::ZERO);
        assert_eq!(nav.pending_position(), GridCoord::ZERO);
        assert_eq!(nav.progress(), 1.0);
        assert!(nav.is_idle());
    }

    #[test]
    fn blocked_move_mid_queue_keeps_progress() {
        let walls = walls_with(&[GridCoord::new(0, 0, 0, 1)]);
        let mut nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        nav.enqueue(Command::Turn(Turn::Up));
        nav.tick(DT, &walls);
        settle(&mut nav, &walls);
        nav.enqueue(Command::Turn(Turn::Down));
        nav.enqueue(Command::MoveForward);
        settle(&mut nav, &walls);
        assert_eq!(nav.frame(), OrientationFrame::AXIS_ALIGNED);
        assert_eq!(nav.position(), GridCoord::ZERO);
    }

    #[test]
    fn move_across_seam_glides_one_cell() {
        let walls = open_walls();
        let mut nav = NavigationState::new(
            GridSize::REFERENCE,
            GridCoord::new(0, 0, 0, 4),
            OrientationFrame::AXIS_ALIGNED,
        );
        nav.enqueue(Command::MoveForward);
        nav.tick(DT, &walls);
        nav.tick(DT, &walls);
        let shown = nav.view_position();
        assert!(shown.w > 4.0 && shown.w < 5.0);
        settle(&mut nav, &walls);
        assert_eq!(nav.position(), GridCoord::ZERO);
        assert_eq!(nav.lattice_position(), GridCoord::new(0, 0, 0, 5));
    }

    #[test]
    fn one_command_dequeued_per_settled_tick() {
        let walls = open_walls();
        let mut nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        for _ in 0..3 {
            nav.enqueue(Command::Turn(Turn::Ana));
        }
        nav.tick(DT, &walls);
        assert_eq!(nav.queue_len(), 2);
        assert_eq!(nav.frame(), OrientationFrame::AXIS_ALIGNED);
        assert_eq!(nav.pending_frame(), OrientationFrame::AXIS_ALIGNED.turned(Turn::Ana));
        settle(&mut nav, &walls);
        let expected = (0..3).fold(OrientationFrame::AXIS_ALIGNED, |f, _| f.turned(Turn::Ana));
        assert_eq!(nav.frame(), expected);
    }

    #[test]
    fn queued_bursts_speed_up_within_bounds() {
        let walls = open_walls();
        let mut nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        for _ in 0..20 {
            nav.enqueue(Command::Turn(Turn::Right));
        }
        let mut previous = nav.speed();
        let mut fastest = previous;
        for _ in 0..120 {
            nav.tick(DT, &walls);
            let speed = nav.speed();
            assert!(speed <= MAX_SPEED);
            assert!((speed - previous).abs() <= MAX_ACCELERATION * DT + 1e-4);
            fastest = fastest.max(speed);
            previous = speed;
        }
        assert!(fastest > BASE_SPEED * 2.0);
    }

    #[test]
    fn move_uses_turned_forward() {
        let walls = open_walls();
        let mut nav = NavigationState::new(GridSize::REFERENCE, GridCoord::ZERO, OrientationFrame::AXIS_ALIGNED);
        nav.enqueue(Command::Turn(Turn::Right));
        nav.enqueue(Command::MoveForward);
        settle(&mut nav, &walls);
        assert_eq!(nav.frame().forward, Direction::NegX);
        assert_eq!(nav.position(), GridCoord::new(4, 0, 0, 0));
    }
}
