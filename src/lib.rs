pub mod grid;
pub mod hypercube;
pub mod maze;
pub mod navigation;
pub mod pathfinding;
pub mod projection;
pub mod puzzle;
pub mod rotation;
pub mod settings;
pub mod unordered_list;
pub mod visibility;


pub use grid::{Direction, DirectionSet, Grid4, GridCoord, GridSize, GridSizeError};
pub use hypercube::{CellGeometry, HyperCell, ProjectedEdge, ProjectedNode};
pub use maze::{generate, GeneratedMaze, WallColor, WallMap};
pub use navigation::{Command, NavigationState};
pub use pathfinding::{find_solution, select_target, TargetSelection};
pub use projection::{project, Projection};
pub use puzzle::{
    MazePuzzle, PuzzleConfig, PuzzleId, PuzzlePhase, PuzzleRegistry, SolveHandle, SubmitOutcome,
};
pub use rotation::{OrientationFrame, Turn, ViewFrame};
pub use settings::{load_settings, save_settings, PersistedSettings, SettingsError};
pub use visibility::{CellEffect, RenderMode, VisibilityResolver, VisibleCellSet};
