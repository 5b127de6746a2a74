//! Screen state machine and per-frame orchestration
//!
//! ```text
//! Menu --SelectManual/SelectAutopilot--> Running --crash--> GameOver
//!   ^                                                        |  |
//!   +------------------------- ToMenu -----------------------+  |
//!                              Running <------- Restart --------+
//! ```
//! `Quit` is honoured from any screen, always between ticks.

use crate::render::{self, DrawList};
use crate::sim::{self, ControlMode, FrameTime, GameState, TickInput};
use crate::tuning::Tuning;
use crate::ui::{ControllerPanel, PointerState};

/// Discrete user commands (key presses mapped by the frontend)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectManual,
    SelectAutopilot,
    Restart,
    ToMenu,
    Quit,
}

/// Everything the frontend samples once per frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub commands: Vec<Command>,
    /// Flap key currently held
    pub flap_held: bool,
    pub pointer: PointerState,
}

/// Whether the frontend should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Top-level screens
#[derive(Debug, Clone)]
pub enum Screen {
    Menu,
    Running(Box<GameState>),
    GameOver { score: u32, mode: ControlMode },
}

impl Screen {
    /// Key bindings for the current screen
    pub fn command_for_key(&self, key: char) -> Option<Command> {
        match (self, key.to_ascii_lowercase()) {
            (Screen::Menu, 'm') => Some(Command::SelectManual),
            (Screen::Menu, 'p') => Some(Command::SelectAutopilot),
            (Screen::GameOver { .. }, 'r') => Some(Command::Restart),
            (Screen::GameOver { .. }, 'm') => Some(Command::ToMenu),
            (Screen::GameOver { .. }, 'q') => Some(Command::Quit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Running(_) => "running",
            Screen::GameOver { .. } => "game over",
        }
    }
}

/// The whole game session
#[derive(Debug)]
pub struct App {
    tuning: Tuning,
    panel: ControllerPanel,
    screen: Screen,
    seed: u64,
    runs_started: u64,
}

impl App {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let panel = ControllerPanel::new(&tuning);
        Self {
            tuning,
            panel,
            screen: Screen::Menu,
            seed,
            runs_started: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// The active run, if any
    pub fn run(&self) -> Option<&GameState> {
        match &self.screen {
            Screen::Running(state) => Some(state.as_ref()),
            _ => None,
        }
    }

    pub fn run_mut(&mut self) -> Option<&mut GameState> {
        match &mut self.screen {
            Screen::Running(state) => Some(state.as_mut()),
            _ => None,
        }
    }

    /// Process one frame: commands, slider input, then one simulation tick
    pub fn frame(&mut self, input: &FrameInput, frame: FrameTime) -> Flow {
        for &command in &input.commands {
            if self.handle(command, frame.now_ms) == Flow::Quit {
                return Flow::Quit;
            }
        }

        let Screen::Running(state) = &mut self.screen else {
            return Flow::Continue;
        };

        if state.mode == ControlMode::Autopilot {
            self.panel.apply(&input.pointer, &mut state.controller, &self.tuning);
        }

        let tick_input = TickInput {
            flap_held: input.flap_held,
        };
        let outcome = sim::tick(state, &tick_input, frame, &self.tuning);
        if outcome.crash.is_some() {
            self.finish_run();
        }
        Flow::Continue
    }

    /// Apply a command if it is valid on the current screen
    pub fn handle(&mut self, command: Command, now_ms: u64) -> Flow {
        match (&self.screen, command) {
            (_, Command::Quit) => {
                log::info!("Quit from {}", self.screen.name());
                return Flow::Quit;
            }
            (Screen::Menu, Command::SelectManual) => self.start_run(ControlMode::Manual, now_ms),
            (Screen::Menu, Command::SelectAutopilot) => {
                self.start_run(ControlMode::Autopilot, now_ms)
            }
            (Screen::GameOver { .. }, Command::Restart) => self.restart(now_ms),
            (Screen::GameOver { .. }, Command::ToMenu) => self.return_to_menu(),
            (screen, command) => {
                log::trace!("Ignoring {:?} on {}", command, screen.name());
            }
        }
        Flow::Continue
    }

    /// Begin a brand-new run in `mode`
    pub fn start_run(&mut self, mode: ControlMode, now_ms: u64) {
        let seed = self.next_seed();
        let state = GameState::new(seed, mode, &self.tuning, now_ms);
        self.screen = Screen::Running(Box::new(state));
    }

    /// Running -> GameOver, keeping only the final score and mode
    pub fn finish_run(&mut self) {
        let Screen::Running(state) = &self.screen else {
            return;
        };
        let (score, mode) = (state.score, state.mode);
        log::info!("Game over: score {score}");
        self.screen = Screen::GameOver { score, mode };
    }

    /// GameOver -> Running in the same mode with all state reset
    pub fn restart(&mut self, now_ms: u64) {
        if let Screen::GameOver { mode, .. } = self.screen {
            self.start_run(mode, now_ms);
        }
    }

    /// GameOver -> Menu
    pub fn return_to_menu(&mut self) {
        if matches!(self.screen, Screen::GameOver { .. }) {
            log::info!("Back to menu");
            self.screen = Screen::Menu;
        }
    }

    /// Draw data for the current screen
    pub fn draw(&self) -> DrawList {
        match &self.screen {
            Screen::Menu => render::menu_scene(),
            Screen::Running(state) => render::run_scene(state, &self.panel, &self.tuning),
            Screen::GameOver { score, .. } => render::game_over_scene(*score),
        }
    }

    fn next_seed(&mut self) -> u64 {
        let seed = self
            .seed
            .wrapping_add(self.runs_started.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.runs_started += 1;
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn frame(now_ms: u64) -> FrameTime {
        FrameTime {
            now_ms,
            dt: 1.0 / 60.0,
        }
    }

    fn commands(commands: &[Command]) -> FrameInput {
        FrameInput {
            commands: commands.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_bindings_depend_on_screen() {
        assert_eq!(Screen::Menu.command_for_key('m'), Some(Command::SelectManual));
        assert_eq!(Screen::Menu.command_for_key('P'), Some(Command::SelectAutopilot));
        assert_eq!(Screen::Menu.command_for_key('r'), None);

        let over = Screen::GameOver {
            score: 1,
            mode: ControlMode::Manual,
        };
        assert_eq!(over.command_for_key('m'), Some(Command::ToMenu));
        assert_eq!(over.command_for_key('r'), Some(Command::Restart));
        assert_eq!(over.command_for_key('q'), Some(Command::Quit));
    }

    #[test]
    fn test_menu_to_running() {
        let mut app = App::new(Tuning::default(), 1);
        assert!(matches!(app.screen(), Screen::Menu));

        app.frame(&commands(&[Command::SelectAutopilot]), frame(500));
        let run = app.run().expect("running");
        assert_eq!(run.mode, ControlMode::Autopilot);
        assert_eq!(run.started_ms, 500);
        // The same frame already ticked once
        assert_eq!(run.time_ticks, 1);
    }

    #[test]
    fn test_invalid_commands_ignored() {
        let mut app = App::new(Tuning::default(), 1);
        app.frame(&commands(&[Command::Restart, Command::ToMenu]), frame(0));
        assert!(matches!(app.screen(), Screen::Menu));

        app.frame(&commands(&[Command::SelectManual]), frame(0));
        app.frame(&commands(&[Command::SelectAutopilot, Command::Restart]), frame(16));
        assert_eq!(app.run().map(|r| r.mode), Some(ControlMode::Manual));
    }

    #[test]
    fn test_quit_from_any_screen() {
        let mut app = App::new(Tuning::default(), 1);
        assert_eq!(app.frame(&commands(&[Command::Quit]), frame(0)), Flow::Quit);

        app.frame(&commands(&[Command::SelectManual]), frame(0));
        let ticks = app.run().unwrap().time_ticks;
        assert_eq!(app.frame(&commands(&[Command::Quit]), frame(16)), Flow::Quit);
        // Quit lands between ticks
        assert_eq!(app.run().unwrap().time_ticks, ticks);
    }

    #[test]
    fn test_crash_goes_to_game_over() {
        let mut app = App::new(Tuning::default(), 1);
        app.start_run(ControlMode::Manual, 0);
        app.run_mut().unwrap().score = 3;
        app.run_mut().unwrap().bird.y = -5.0;

        app.frame(&FrameInput::default(), frame(16));
        assert!(matches!(
            app.screen(),
            Screen::GameOver {
                score: 3,
                mode: ControlMode::Manual
            }
        ));
        assert!(app.draw().texts().any(|t| t == "Final Score: 3"));
    }

    #[test]
    fn test_sliders_only_in_autopilot() {
        let tuning = Tuning::default();
        let pointer = PointerState {
            pos: Vec2::new(95.0, 585.0),
            left_down: true,
        };
        let input = FrameInput {
            pointer,
            ..Default::default()
        };

        let mut app = App::new(tuning.clone(), 1);
        app.start_run(ControlMode::Manual, 0);
        app.frame(&input, frame(16));
        assert_eq!(app.run().unwrap().controller.kc, tuning.kc_default);

        let mut app = App::new(tuning, 1);
        app.start_run(ControlMode::Autopilot, 0);
        app.frame(&input, frame(16));
        assert!((app.run().unwrap().controller.kc - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_restart_uses_new_seed() {
        let mut app = App::new(Tuning::default(), 10);
        app.start_run(ControlMode::Manual, 0);
        let first = app.run().unwrap().seed;
        app.finish_run();
        app.restart(100);
        let second = app.run().unwrap().seed;
        assert_ne!(first, second);
    }
}
