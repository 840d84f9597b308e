//! One playable maze: generation, input gating, submission and the automated
//! walks (forced solve playback and post-solve wandering).

use crate::grid::{Direction, GridCoord, GridSize};
use crate::hypercube::CellGeometry;
use crate::maze::{generate, GeneratedMaze, WallMap};
use crate::navigation::{Command, NavigationState};
use crate::pathfinding::{find_solution, select_target, TargetSelection, MAX_TARGET_DISTANCE};
use crate::rotation::Turn;
use crate::settings::PersistedSettings;
use crate::visibility::{CellEffect, RenderMode, VisibilityResolver};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Chance that an idle wander step moves rather than turns, when it can.
const WANDER_MOVE_PROBABILITY: f64 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PuzzleId(pub u32);

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzleConfig {
    pub size: GridSize,
    pub max_target_distance: u32,
    pub render_mode: RenderMode,
    pub wobble_enabled: bool,
    pub post_solve_wander_enabled: bool,
}

impl PuzzleConfig {
    pub fn with_defaults() -> Self {
        Self {
            size: GridSize::REFERENCE,
            max_target_distance: MAX_TARGET_DISTANCE,
            render_mode: RenderMode::Advanced,
            wobble_enabled: true,
            post_solve_wander_enabled: true,
        }
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl From<&PersistedSettings> for PuzzleConfig {
    fn from(settings: &PersistedSettings) -> Self {
        Self {
            render_mode: settings.render_mode(),
            wobble_enabled: settings.wobble_enabled,
            post_solve_wander_enabled: settings.post_solve_wander_enabled,
            ..Self::with_defaults()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzlePhase {
    Dormant,
    Active,
    Solved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Pass,
    Strike { strikes: u32 },
}

/// Shared stop flag for a forced solve. Cancelling keeps whatever moves were
/// already applied.
#[derive(Clone, Debug)]
pub struct SolveHandle {
    cancelled: Arc<AtomicBool>,
}

impl SolveHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct ForcedSolve {
    handle: SolveHandle,
    /// Remaining cells to step through; resolved on the first idle tick so
    /// that commands already in flight settle first.
    path: Option<VecDeque<GridCoord>>,
    commands: VecDeque<Command>,
}

pub struct MazePuzzle {
    id: PuzzleId,
    config: PuzzleConfig,
    rng: StdRng,
    walls: WallMap,
    navigation: NavigationState,
    visibility: VisibilityResolver,
    phase: PuzzlePhase,
    target: Option<TargetSelection>,
    strikes: u32,
    forced: Option<ForcedSolve>,
    queued_effects: Vec<CellEffect>,
}

/// 1-based start position and the whole start frame as `(right;up;ana;forward)`.
fn start_summary(maze: &GeneratedMaze) -> String {
    format!(
        "Start position: {}, view {}",
        maze.start_position + GridCoord::ONE,
        maze.start_frame
    )
}

impl MazePuzzle {
    pub fn generate(id: PuzzleId, seed: u64, config: PuzzleConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let maze = generate(config.size, &mut rng);
        log::info!("[4D Maze {}] {}", id, start_summary(&maze));
        let navigation = NavigationState::new(config.size, maze.start_position, maze.start_frame);
        let mut visibility = VisibilityResolver::new(config.render_mode);
        let queued_effects = visibility.refresh(&navigation, &maze.walls);
        Self {
            id,
            config,
            rng,
            walls: maze.walls,
            navigation,
            visibility,
            phase: PuzzlePhase::Dormant,
            target: None,
            strikes: 0,
            forced: None,
            queued_effects,
        }
    }

    /// Picks the target and makes the puzzle interactive. No-op once active.
    pub fn activate(&mut self) -> Option<TargetSelection> {
        if self.phase != PuzzlePhase::Dormant {
            return self.target;
        }
        let selection = select_target(
            self.navigation.position(),
            &self.walls,
            self.config.max_target_distance,
            &mut self.rng,
        );
        log::info!(
            "[4D Maze {}] Target: {} ({} steps away)",
            self.id,
            selection.target + GridCoord::ONE,
            selection.distance
        );
        self.target = Some(selection);
        self.phase = PuzzlePhase::Active;
        self.target
    }

    /// Queues a player command. Returns whether it was accepted.
    pub fn press(&mut self, command: Command) -> bool {
        if self.phase != PuzzlePhase::Active || self.forced.is_some() {
            return false;
        }
        self.navigation.enqueue(command);
        true
    }

    pub fn toggle_render_mode(&mut self) -> RenderMode {
        let mode = self.visibility.toggle_mode();
        log::info!("[4D Maze {}] Render mode: {}", self.id, mode);
        let effects = self.visibility.refresh(&self.navigation, &self.walls);
        self.queued_effects.extend(effects);
        mode
    }

    /// `None` unless active and idle.
    pub fn submit(&mut self) -> Option<SubmitOutcome> {
        if self.phase != PuzzlePhase::Active || !self.navigation.is_idle() {
            return None;
        }
        let target = self.target?.target;
        let position = self.navigation.position();
        let outcome = if position == target {
            self.phase = PuzzlePhase::Solved;
            self.forced = None;
            log::info!("[4D Maze {}] Submitted at {}. Module solved.", self.id, position + GridCoord::ONE);
            SubmitOutcome::Pass
        } else {
            self.strikes += 1;
            log::info!(
                "[4D Maze {}] Submitted at {}, expected {}. Strike!",
                self.id,
                position + GridCoord::ONE,
                target + GridCoord::ONE
            );
            SubmitOutcome::Strike {
                strikes: self.strikes,
            }
        };
        Some(outcome)
    }

    /// Starts walking to the target and submitting. Activates a dormant
    /// puzzle first. `None` once solved.
    pub fn start_forced_solve(&mut self) -> Option<SolveHandle> {
        if self.phase == PuzzlePhase::Solved {
            return None;
        }
        if let Some(forced) = &self.forced {
            return Some(forced.handle.clone());
        }
        self.activate();
        let handle = SolveHandle {
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        self.forced = Some(ForcedSolve {
            handle: handle.clone(),
            path: None,
            commands: VecDeque::new(),
        });
        log::info!("[4D Maze {}] Force solving", self.id);
        Some(handle)
    }

    pub fn tick(&mut self, dt: f32) -> Vec<CellEffect> {
        if self.navigation.is_idle() {
            if self.forced.is_some() {
                self.feed_forced_solve();
            } else if self.phase == PuzzlePhase::Solved && self.config.post_solve_wander_enabled {
                self.wander_step();
            }
        }
        self.navigation.tick(dt, &self.walls);

        let mut effects = std::mem::take(&mut self.queued_effects);
        effects.extend(self.visibility.refresh(&self.navigation, &self.walls));
        self.visibility.advance(dt);
        effects
    }

    fn feed_forced_solve(&mut self) {
        let Some(target) = self.target.map(|selection| selection.target) else {
            self.forced = None;
            return;
        };
        let Some(forced) = self.forced.as_mut() else {
            return;
        };
        if forced.handle.is_cancelled() {
            log::info!("[4D Maze {}] Forced solve cancelled at {}", self.id, self.navigation.position() + GridCoord::ONE);
            self.forced = None;
            return;
        }

        if forced.path.is_none() {
            match find_solution(self.navigation.position(), target, &self.walls) {
                Some(path) => {
                    let mut path = VecDeque::from(path);
                    path.pop_front();
                    forced.path = Some(path);
                }
                None => {
                    log::warn!("[4D Maze {}] No path to target; forced solve abandoned", self.id);
                    self.forced = None;
                    return;
                }
            }
        }

        if forced.commands.is_empty() {
            let next = forced.path.as_mut().and_then(VecDeque::pop_front);
            match next {
                Some(next) => {
                    let here = self.navigation.position();
                    let Some(direction) = Direction::between(self.walls.size(), here, next) else {
                        log::warn!("[4D Maze {}] Solution step {} -> {} is not adjacent", self.id, here, next);
                        self.forced = None;
                        return;
                    };
                    forced.commands.extend(
                        self.navigation
                            .frame()
                            .turns_to_face(direction)
                            .into_iter()
                            .map(Command::Turn),
                    );
                    forced.commands.push_back(Command::MoveForward);
                }
                None => {
                    self.forced = None;
                    self.submit();
                    return;
                }
            }
        }

        if let Some(command) = forced.commands.pop_front() {
            self.navigation.enqueue(command);
        }
    }

    fn wander_step(&mut self) {
        let frame = self.navigation.frame();
        let ahead = self.navigation.lattice_position() + frame.forward.unit();
        let command = if self.walls.is_passable(ahead) && self.rng.gen_bool(WANDER_MOVE_PROBABILITY) {
            Command::MoveForward
        } else {
            Command::Turn(Turn::ALL[self.rng.gen_range(0..Turn::ALL.len())])
        };
        self.navigation.enqueue(command);
    }

    /// Geometry for every retained cell, seen from the displayed pose.
    pub fn frame_geometry(&self) -> Vec<CellGeometry> {
        let observer = self.navigation.view_position();
        let frame = self.navigation.view_frame();
        self.visibility
            .cache()
            .cells()
            .into_iter()
            .map(|cell| CellGeometry::build(cell, observer, &frame))
            .collect()
    }

    pub fn id(&self) -> PuzzleId {
        self.id
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn walls(&self) -> &WallMap {
        &self.walls
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn visibility(&self) -> &VisibilityResolver {
        &self.visibility
    }

    pub fn phase(&self) -> PuzzlePhase {
        self.phase
    }

    pub fn target(&self) -> Option<TargetSelection> {
        self.target
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn is_force_solving(&self) -> bool {
        self.forced.is_some()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.visibility.mode()
    }

    pub fn wobble_enabled(&self) -> bool {
        self.config.wobble_enabled
    }
}

/// Owns every puzzle instance and hands out their ids.
#[derive(Default)]
pub struct PuzzleRegistry {
    puzzles: Vec<MazePuzzle>,
}

impl PuzzleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, seed: u64, config: PuzzleConfig) -> PuzzleId {
        let id = PuzzleId(self.puzzles.len() as u32 + 1);
        self.puzzles.push(MazePuzzle::generate(id, seed, config));
        id
    }

    pub fn get(&self, id: PuzzleId) -> Option<&MazePuzzle> {
        self.puzzles.get((id.0 as usize).checked_sub(1)?)
    }

    pub fn get_mut(&mut self, id: PuzzleId) -> Option<&mut MazePuzzle> {
        self.puzzles.get_mut((id.0 as usize).checked_sub(1)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MazePuzzle> {
        self.puzzles.iter()
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn tick_all(&mut self, dt: f32) -> Vec<(PuzzleId, Vec<CellEffect>)> {
        self.puzzles
            .iter_mut()
            .map(|puzzle| (puzzle.id(), puzzle.tick(dt)))
            .collect()
    }
}
