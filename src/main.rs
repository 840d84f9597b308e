use clap::{Parser, ValueEnum};
use four_dim_maze::navigation::Command;
use four_dim_maze::puzzle::{MazePuzzle, PuzzleConfig, PuzzlePhase, PuzzleRegistry};
use four_dim_maze::rotation::Turn;
use four_dim_maze::settings::{load_settings, save_settings, settings_file_path};
use four_dim_maze::GridCoord;
use std::path::PathBuf;
use web_time::Instant;

const TICK_SECONDS: f32 = 1.0 / 60.0;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CommandArg {
    Right,
    Left,
    Up,
    Down,
    Ana,
    Kata,
    Forward,
    Toggle,
    Submit,
}

impl CommandArg {
    fn to_command(self) -> Option<Command> {
        match self {
            CommandArg::Right => Some(Command::Turn(Turn::Right)),
            CommandArg::Left => Some(Command::Turn(Turn::Left)),
            CommandArg::Up => Some(Command::Turn(Turn::Up)),
            CommandArg::Down => Some(Command::Turn(Turn::Down)),
            CommandArg::Ana => Some(Command::Turn(Turn::Ana)),
            CommandArg::Kata => Some(Command::Turn(Turn::Kata)),
            CommandArg::Forward => Some(Command::MoveForward),
            CommandArg::Toggle | CommandArg::Submit => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Headless driver for the 4D toroidal maze")]
struct Args {
    /// Maze seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Start in the simple (local cross) render mode
    #[arg(long)]
    simple: bool,

    /// Commands to play, in order
    #[arg(long = "command", value_enum)]
    commands: Vec<CommandArg>,

    /// Upper bound on simulated ticks per phase
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u32,

    /// Walk to the target and submit automatically after the commands
    #[arg(long)]
    forced_solve: bool,

    /// Settings file; defaults to the platform config directory
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings back before running
    #[arg(long)]
    save_settings: bool,
}

fn run_until_idle(puzzle: &mut MazePuzzle, max_ticks: u32) -> u32 {
    let mut ticks = 0;
    while ticks < max_ticks {
        puzzle.tick(TICK_SECONDS);
        ticks += 1;
        if puzzle.navigation().is_idle() {
            break;
        }
    }
    ticks
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let settings_path = args.settings.clone().unwrap_or_else(settings_file_path);
    let mut settings = load_settings(&settings_path).unwrap_or_default();
    if args.simple {
        settings.advanced_render_mode = false;
    }
    if args.save_settings {
        match save_settings(&settings_path, &settings) {
            Ok(()) => log::info!("Saved settings to {}", settings_path.display()),
            Err(error) => log::error!("Failed to save settings {}: {}", settings_path.display(), error),
        }
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut registry = PuzzleRegistry::new();
    let generation_start = Instant::now();
    let id = registry.spawn(seed, PuzzleConfig::from(&settings));
    log::info!("Generated maze {} (seed {}) in {:?}", id, seed, generation_start.elapsed());

    let Some(puzzle) = registry.get_mut(id) else {
        log::error!("Puzzle {} vanished from the registry", id);
        return;
    };
    puzzle.activate();

    let simulation_start = Instant::now();
    let mut ticks = 0u32;
    for arg in &args.commands {
        match arg.to_command() {
            Some(command) => {
                if puzzle.press(command) {
                    ticks += run_until_idle(puzzle, args.max_ticks);
                }
            }
            None => match arg {
                CommandArg::Toggle => {
                    puzzle.toggle_render_mode();
                }
                _ => {
                    ticks += run_until_idle(puzzle, args.max_ticks);
                    if let Some(outcome) = puzzle.submit() {
                        println!("submit: {outcome:?}");
                    }
                }
            },
        }
    }

    if args.forced_solve {
        if puzzle.start_forced_solve().is_some() {
            let mut solve_ticks = 0;
            while puzzle.phase() != PuzzlePhase::Solved && solve_ticks < args.max_ticks {
                puzzle.tick(TICK_SECONDS);
                solve_ticks += 1;
            }
            ticks += solve_ticks;
        }
    }

    let geometry = puzzle.frame_geometry();
    let node_bytes: usize = geometry.iter().map(|cell| cell.node_bytes().len()).sum();
    let edge_bytes: usize = geometry.iter().map(|cell| cell.edge_bytes().len()).sum();
    let target = puzzle
        .target()
        .map(|selection| (selection.target + GridCoord::ONE).to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("maze {id}: seed {seed}, {ticks} ticks in {:?}", simulation_start.elapsed());
    println!(
        "position {} facing {}, target {}, phase {:?}, strikes {}",
        puzzle.navigation().position() + GridCoord::ONE,
        puzzle.navigation().frame().forward,
        target,
        puzzle.phase(),
        puzzle.strikes()
    );
    println!(
        "render mode {}, {} cells drawn ({} node bytes, {} edge bytes), wobble {}",
        puzzle.render_mode(),
        geometry.iter().filter(|cell| cell.is_drawn()).count(),
        node_bytes,
        edge_bytes,
        if puzzle.wobble_enabled() { "on" } else { "off" }
    );
}
