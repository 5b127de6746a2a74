//! Flappy Autopilot entry point
//!
//! Parses the command line, loads tuning and then either runs the terminal
//! frontend or a headless autopilot simulation that prints a JSON summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use flappy_autopilot::Tuning;
use flappy_autopilot::consts::TICKS_PER_SECOND;
use flappy_autopilot::sim::{Clock, ControlMode, GameState, ManualClock, TickInput, tick};

#[derive(Parser, Debug)]
#[command(about = "Side-scrolling pipe dodger with a tunable P-controller autopilot", version)]
struct Args {
    /// JSON file overriding world constants
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Seed for pipe gaps (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Target frame rate for the terminal frontend
    #[arg(long, default_value_t = TICKS_PER_SECOND)]
    fps: u32,
    /// Skip the menu and start in this mode (manual | autopilot)
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ControlMode>,
    /// Simulate without a terminal and print a JSON summary
    #[arg(long)]
    headless: bool,
    /// Maximum ticks for a headless run
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// Controller gain for a headless run
    #[arg(long)]
    kc: Option<f32>,
    /// Setpoint percentage for a headless run
    #[arg(long)]
    sp: Option<f32>,
}

fn parse_mode(s: &str) -> Result<ControlMode, String> {
    ControlMode::from_str(s)
        .ok_or_else(|| format!("unknown mode '{s}' (expected manual or autopilot)"))
}

/// Result of a headless run
#[derive(Debug, Serialize)]
struct HeadlessSummary {
    seed: u64,
    mode: &'static str,
    kc: f32,
    sp: f32,
    ticks: u64,
    score: u32,
    crashed: bool,
    pipes_alive: usize,
}

fn run_headless(tuning: &Tuning, args: &Args, seed: u64) -> HeadlessSummary {
    let mode = args.mode.unwrap_or(ControlMode::Autopilot);
    let mut clock = ManualClock::per_second(args.fps);
    let mut state = GameState::new(seed, mode, tuning, clock.ticks_elapsed_ms());
    if let Some(kc) = args.kc {
        state.controller.set_kc(kc, tuning);
    }
    if let Some(sp) = args.sp {
        state.controller.set_sp(sp, tuning);
    }

    let input = TickInput::default();
    while state.is_running() && state.time_ticks < args.ticks {
        let frame = clock.tick();
        tick(&mut state, &input, frame, tuning);
    }

    HeadlessSummary {
        seed,
        mode: mode.as_str(),
        kc: state.controller.kc,
        sp: state.controller.sp,
        ticks: state.time_ticks,
        score: state.score,
        crashed: !state.is_running(),
        pipes_alive: state.field.len(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    if args.headless {
        let summary = run_headless(&tuning, &args, seed);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    log::info!("Flappy Autopilot starting (seed {seed})");
    terminal_game::run(tuning, seed, args.fps, args.mode)
}

mod terminal_game {
    use std::io::{self, Write};
    use std::time::{Duration, Instant};

    use anyhow::Result;
    use crossterm::event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    };
    use crossterm::style::{self, Attribute, Color as CColor};
    use crossterm::{cursor, execute, queue, terminal};
    use glam::Vec2;

    use flappy_autopilot::app::{App, Command, Flow, FrameInput};
    use flappy_autopilot::render::{DrawCmd, DrawList, Rgb, Sprite, TextSize};
    use flappy_autopilot::sim::{Aabb, Clock, ControlMode, FrameClock};
    use flappy_autopilot::ui::PointerState;
    use flappy_autopilot::Tuning;

    const LETTERBOX: Rgb = Rgb(0, 0, 0);
    const BIRD_BODY: Rgb = Rgb(245, 200, 66);
    const BIRD_EYE: Rgb = Rgb(255, 255, 255);
    const BIRD_BEAK: Rgb = Rgb(225, 75, 35);

    /// How long a key press counts as held when the terminal never reports
    /// key releases
    const FLAP_HOLD: Duration = Duration::from_millis(150);
    /// Repeated presses of the same command key closer than this are
    /// auto-repeat, not new presses
    const REPEAT_GAP: Duration = Duration::from_millis(600);

    fn color(c: Rgb) -> CColor {
        CColor::Rgb {
            r: c.0,
            g: c.1,
            b: c.2,
        }
    }

    /// Puts the terminal into game mode and restores it on drop
    struct TerminalGuard {
        keyboard_enhanced: bool,
    }

    impl TerminalGuard {
        fn enter() -> io::Result<Self> {
            terminal::enable_raw_mode()?;
            let mut out = io::stdout();
            execute!(
                out,
                terminal::EnterAlternateScreen,
                cursor::Hide,
                terminal::DisableLineWrap,
                EnableMouseCapture,
            )?;

            let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
            if keyboard_enhanced {
                execute!(
                    out,
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
            }
            log::debug!("Terminal ready (key release events: {keyboard_enhanced})");
            Ok(Self { keyboard_enhanced })
        }
    }

    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let mut out = io::stdout();
            if self.keyboard_enhanced {
                let _ = execute!(out, PopKeyboardEnhancementFlags);
            }
            let _ = execute!(
                out,
                DisableMouseCapture,
                style::ResetColor,
                terminal::EnableLineWrap,
                cursor::Show,
                terminal::LeaveAlternateScreen,
            );
            let _ = terminal::disable_raw_mode();
        }
    }

    /// Uniform world -> pixel mapping, centred in the buffer
    #[derive(Debug, Clone, Copy)]
    pub(super) struct Viewport {
        scale: f32,
        offset: Vec2,
        world: Vec2,
    }

    impl Viewport {
        pub(super) fn fit(pixel_w: usize, pixel_h: usize, world: Vec2) -> Self {
            let scale = (pixel_w as f32 / world.x).min(pixel_h as f32 / world.y);
            let offset = Vec2::new(
                (pixel_w as f32 - world.x * scale) / 2.0,
                (pixel_h as f32 - world.y * scale) / 2.0,
            );
            Self {
                scale,
                offset,
                world,
            }
        }

        pub(super) fn to_px(&self, p: Vec2) -> (i32, i32) {
            let q = self.offset + p * self.scale;
            (q.x.round() as i32, q.y.round() as i32)
        }

        /// World position under the centre of a terminal cell
        pub(super) fn to_world(&self, col: u16, row: u16) -> Vec2 {
            let px = Vec2::new(col as f32 + 0.5, row as f32 * 2.0 + 1.0);
            (px - self.offset) / self.scale
        }

        fn world_rect(&self) -> Aabb {
            Aabb::new(Vec2::ZERO, self.world)
        }
    }

    struct TextOverlay {
        col: u16,
        row: u16,
        text: String,
        color: Rgb,
        bold: bool,
    }

    /// Pixel buffer drawn with half blocks: two pixels per terminal cell
    struct PixelBuf {
        w: usize,
        h: usize,
        px: Vec<Rgb>,
        texts: Vec<TextOverlay>,
    }

    impl PixelBuf {
        fn new(cols: u16, rows: u16) -> Self {
            let (w, h) = (cols as usize, rows as usize * 2);
            Self {
                w,
                h,
                px: vec![LETTERBOX; w * h],
                texts: Vec::new(),
            }
        }

        fn resize(&mut self, cols: u16, rows: u16) {
            self.w = cols as usize;
            self.h = rows as usize * 2;
            self.px.resize(self.w * self.h, LETTERBOX);
        }

        fn set(&mut self, x: i32, y: i32, c: Rgb) {
            if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
                self.px[y as usize * self.w + x as usize] = c;
            }
        }

        fn get(&self, x: usize, y: usize) -> Rgb {
            self.px[y * self.w + x]
        }

        fn fill_world_rect(&mut self, rect: Aabb, view: &Viewport, c: Rgb) {
            let clip = view.world_rect();
            let min = rect.min.max(clip.min);
            let max = rect.max.min(clip.max);
            if min.x >= max.x || min.y >= max.y {
                return;
            }
            let (x0, y0) = view.to_px(min);
            let (x1, y1) = view.to_px(max);
            for y in y0..y1.max(y0 + 1) {
                for x in x0..x1.max(x0 + 1) {
                    self.set(x, y, c);
                }
            }
        }

        fn line(&mut self, from: Vec2, to: Vec2, view: &Viewport, c: Rgb) {
            let (x0, y0) = view.to_px(from);
            let (x1, y1) = view.to_px(to);
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let x = x0 as f32 + (x1 - x0) as f32 * t;
                let y = y0 as f32 + (y1 - y0) as f32 * t;
                self.set(x.round() as i32, y.round() as i32, c);
            }
        }

        fn circle(&mut self, center: Vec2, radius: f32, view: &Viewport, c: Rgb) {
            let (cx, cy) = view.to_px(center);
            let r = (radius * view.scale).round().max(1.0) as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy <= r * r {
                        self.set(cx + dx, cy + dy, c);
                    }
                }
            }
        }

        fn bird(&mut self, rect: Aabb, view: &Viewport) {
            self.fill_world_rect(rect, view, BIRD_BODY);
            let w = rect.width();
            let h = rect.height();
            let feature = Vec2::new(w * 0.2, h * 0.2);
            let eye = Aabb::new(rect.min + Vec2::new(w * 0.6, h * 0.2), feature);
            self.fill_world_rect(eye, view, BIRD_EYE);
            let beak = Aabb::new(rect.min + Vec2::new(w * 0.8, h * 0.5), feature);
            self.fill_world_rect(beak, view, BIRD_BEAK);
        }

        /// Rasterise a frame's draw list
        fn draw(&mut self, list: &DrawList, view: &Viewport) {
            self.px.fill(LETTERBOX);
            self.texts.clear();

            for cmd in list.iter() {
                match cmd {
                    DrawCmd::Fill(c) => self.fill_world_rect(view.world_rect(), view, *c),
                    DrawCmd::Rect { rect, color } => self.fill_world_rect(*rect, view, *color),
                    DrawCmd::Sprite {
                        sprite: Sprite::Bird,
                        rect,
                    } => self.bird(*rect, view),
                    DrawCmd::Line { from, to, color } => self.line(*from, *to, view, *color),
                    DrawCmd::Circle {
                        center,
                        radius,
                        color,
                    } => self.circle(*center, *radius, view, *color),
                    DrawCmd::Text {
                        pos,
                        text,
                        size,
                        color,
                    } => {
                        let (x, y) = view.to_px(*pos);
                        self.texts.push(TextOverlay {
                            col: x.max(0) as u16,
                            row: (y.max(0) / 2) as u16,
                            text: text.clone(),
                            color: *color,
                            bold: *size == TextSize::Large,
                        });
                    }
                }
            }
        }

        fn render(&self, out: &mut impl Write) -> io::Result<()> {
            queue!(out, cursor::MoveTo(0, 0))?;
            let rows = self.h / 2;
            let mut prev: Option<(Rgb, Rgb)> = None;

            for row in 0..rows {
                for col in 0..self.w {
                    let top = self.get(col, row * 2);
                    let bot = self.get(col, row * 2 + 1);
                    if prev != Some((top, bot)) {
                        queue!(
                            out,
                            style::SetForegroundColor(color(top)),
                            style::SetBackgroundColor(color(bot))
                        )?;
                        prev = Some((top, bot));
                    }
                    queue!(out, style::Print('\u{2580}'))?;
                }
                if row + 1 < rows {
                    queue!(out, style::ResetColor, style::Print("\r\n"))?;
                    prev = None;
                }
            }

            for overlay in &self.texts {
                let row = overlay.row as usize;
                let col = overlay.col as usize;
                if row >= rows || col >= self.w {
                    continue;
                }
                let visible: String = overlay.text.chars().take(self.w - col).collect();
                let bg = self.get(col, row * 2 + 1);
                queue!(
                    out,
                    cursor::MoveTo(overlay.col, overlay.row),
                    style::SetForegroundColor(color(overlay.color)),
                    style::SetBackgroundColor(color(bg)),
                )?;
                if overlay.bold {
                    queue!(out, style::SetAttribute(Attribute::Bold))?;
                }
                queue!(out, style::Print(visible), style::SetAttribute(Attribute::Reset))?;
            }

            queue!(out, style::ResetColor)?;
            out.flush()
        }
    }

    /// Turns key events into a held/not-held flap signal
    #[derive(Debug)]
    pub(super) struct FlapKey {
        reports_release: bool,
        down: bool,
        held_until: Option<Instant>,
    }

    impl FlapKey {
        pub(super) fn new(reports_release: bool) -> Self {
            Self {
                reports_release,
                down: false,
                held_until: None,
            }
        }

        pub(super) fn on_event(&mut self, kind: KeyEventKind, now: Instant) {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if self.reports_release {
                        self.down = true;
                    } else {
                        self.held_until = Some(now + FLAP_HOLD);
                    }
                }
                KeyEventKind::Release => self.down = false,
            }
        }

        pub(super) fn is_held(&self, now: Instant) -> bool {
            self.down || self.held_until.is_some_and(|until| now < until)
        }
    }

    fn is_flap_key(code: KeyCode) -> bool {
        matches!(code, KeyCode::Char(' ') | KeyCode::Up)
    }

    /// Lets only the initial key-down of a command key through
    ///
    /// Terminals with event types report `Repeat` and `Release`; without them
    /// a held key arrives as a stream of presses, so a press of the key that
    /// was last seen less than [`REPEAT_GAP`] ago is dropped as well.
    #[derive(Debug, Default)]
    pub(super) struct CommandKeys {
        last: Option<(KeyCode, Instant)>,
    }

    impl CommandKeys {
        pub(super) fn accept(&mut self, key: &KeyEvent, now: Instant) -> bool {
            match key.kind {
                KeyEventKind::Release => {
                    if matches!(self.last, Some((code, _)) if code == key.code) {
                        self.last = None;
                    }
                    false
                }
                KeyEventKind::Repeat => {
                    self.last = Some((key.code, now));
                    false
                }
                KeyEventKind::Press => {
                    let repeat = matches!(
                        self.last,
                        Some((code, seen)) if code == key.code && now < seen + REPEAT_GAP
                    );
                    self.last = Some((key.code, now));
                    !repeat
                }
            }
        }
    }

    pub(super) fn key_command(
        app: &App,
        keys: &mut CommandKeys,
        key: &KeyEvent,
        now: Instant,
    ) -> Option<Command> {
        if !keys.accept(key, now) {
            return None;
        }
        match key.code {
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char(c) => app.screen().command_for_key(c),
            _ => None,
        }
    }

    fn on_mouse(mouse: &MouseEvent, view: &Viewport, pointer: &mut PointerState) {
        pointer.pos = view.to_world(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                pointer.left_down = true;
            }
            MouseEventKind::Up(MouseButton::Left) => pointer.left_down = false,
            _ => {}
        }
    }

    pub fn run(tuning: Tuning, seed: u64, fps: u32, mode: Option<ControlMode>) -> Result<()> {
        let guard = TerminalGuard::enter()?;
        let mut out = io::stdout();
        let mut app = App::new(tuning, seed);
        let world = Vec2::new(app.tuning().world_width, app.tuning().world_height);

        let (cols, rows) = terminal::size()?;
        let mut buf = PixelBuf::new(cols, rows);
        let mut view = Viewport::fit(buf.w, buf.h, world);

        let mut clock = FrameClock::new(fps);
        if let Some(mode) = mode {
            app.start_run(mode, clock.ticks_elapsed_ms());
        }

        let mut flap = FlapKey::new(guard.keyboard_enhanced);
        let mut keys = CommandKeys::default();
        let mut pointer = PointerState::default();

        loop {
            let frame = clock.tick();
            let mut commands = Vec::new();

            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) => {
                        if is_flap_key(key.code) {
                            flap.on_event(key.kind, Instant::now());
                        } else if let Some(command) =
                            key_command(&app, &mut keys, &key, Instant::now())
                        {
                            commands.push(command);
                        }
                    }
                    Event::Mouse(mouse) => on_mouse(&mouse, &view, &mut pointer),
                    Event::Resize(c, r) => {
                        buf.resize(c, r);
                        view = Viewport::fit(buf.w, buf.h, world);
                    }
                    _ => {}
                }
            }

            let input = FrameInput {
                commands,
                flap_held: flap.is_held(Instant::now()),
                pointer,
            };
            if app.frame(&input, frame) == Flow::Quit {
                break;
            }

            buf.draw(&app.draw(), &view);
            buf.render(&mut out)?;
        }

        drop(guard);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::terminal_game::{CommandKeys, FlapKey, Viewport, key_command};
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use flappy_autopilot::sim::FrameTime;
    use flappy_autopilot::{App, Command, FrameInput, Screen};
    use glam::Vec2;
    use std::time::{Duration, Instant};

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["flappy-autopilot"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(args(&["--mode", "autopilot"]).mode, Some(ControlMode::Autopilot));
        assert_eq!(args(&["--mode", "m"]).mode, Some(ControlMode::Manual));
        assert!(Args::try_parse_from(["flappy-autopilot", "--mode", "hover"]).is_err());
        assert_eq!(args(&[]).fps, 60);
    }

    #[test]
    fn test_headless_manual_falls_to_floor() {
        let tuning = Tuning::default();
        let summary = run_headless(&tuning, &args(&["--headless", "--mode", "manual"]), 1);
        assert!(summary.crashed);
        assert_eq!(summary.score, 0);
        assert!(summary.ticks < 60);
    }

    #[test]
    fn test_headless_respects_tick_limit_and_gains() {
        let tuning = Tuning::default();
        let summary = run_headless(
            &tuning,
            &args(&["--headless", "--ticks", "10", "--kc", "5.0", "--sp", "50"]),
            1,
        );
        assert!(summary.ticks <= 10);
        assert_eq!(summary.kc, tuning.kc_max);
        assert_eq!(summary.sp, 50.0);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "autopilot");
    }

    #[test]
    fn test_viewport_round_trip() {
        // 80x48 pixels: height limited, scale 0.08
        let view = Viewport::fit(80, 48, Vec2::new(400.0, 600.0));
        assert_eq!(view.to_px(Vec2::ZERO), (24, 0));
        assert_eq!(view.to_px(Vec2::new(400.0, 600.0)), (56, 48));

        let (x, y) = view.to_px(Vec2::new(200.0, 300.0));
        let back = view.to_world(x as u16, (y / 2) as u16);
        assert!((back.x - 200.0).abs() < 13.0);
        assert!((back.y - 300.0).abs() < 26.0);
    }

    #[test]
    fn test_flap_hold_window_without_release_events() {
        let now = Instant::now();
        let mut key = FlapKey::new(false);
        assert!(!key.is_held(now));
        key.on_event(KeyEventKind::Press, now);
        assert!(key.is_held(now + Duration::from_millis(100)));
        assert!(!key.is_held(now + Duration::from_millis(200)));
    }

    #[test]
    fn test_flap_release_events() {
        let now = Instant::now();
        let mut key = FlapKey::new(true);
        key.on_event(KeyEventKind::Press, now);
        assert!(key.is_held(now + Duration::from_secs(5)));
        key.on_event(KeyEventKind::Release, now);
        assert!(!key.is_held(now));
    }

    fn key(c: char, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, kind)
    }

    #[test]
    fn test_command_keys_ignore_repeats() {
        let now = Instant::now();
        let mut keys = CommandKeys::default();
        assert!(keys.accept(&key('m', KeyEventKind::Press), now));
        assert!(!keys.accept(&key('m', KeyEventKind::Repeat), now));
        // Auto-repeat delivered as presses
        assert!(!keys.accept(&key('m', KeyEventKind::Press), now + Duration::from_millis(500)));
        assert!(!keys.accept(&key('m', KeyEventKind::Press), now + Duration::from_millis(530)));
        // A different key is a fresh press
        assert!(keys.accept(&key('r', KeyEventKind::Press), now + Duration::from_millis(540)));
    }

    #[test]
    fn test_command_keys_release_allows_next_press() {
        let now = Instant::now();
        let mut keys = CommandKeys::default();
        assert!(keys.accept(&key('m', KeyEventKind::Press), now));
        assert!(!keys.accept(&key('m', KeyEventKind::Release), now));
        assert!(keys.accept(&key('m', KeyEventKind::Press), now + Duration::from_millis(50)));
        // Well after the last press without any release
        assert!(keys.accept(&key('m', KeyEventKind::Press), now + Duration::from_secs(2)));
    }

    #[test]
    fn test_held_menu_key_does_not_start_a_run() {
        let mut app = App::new(Tuning::default(), 1);
        app.start_run(ControlMode::Manual, 0);
        app.run_mut().unwrap().bird.y = -5.0;
        let frame = FrameTime {
            now_ms: 16,
            dt: 1.0 / 60.0,
        };
        app.frame(&FrameInput::default(), frame);
        assert!(matches!(app.screen(), Screen::GameOver { .. }));

        let now = Instant::now();
        let mut keys = CommandKeys::default();
        let first = key_command(&app, &mut keys, &key('m', KeyEventKind::Press), now);
        assert_eq!(first, Some(Command::ToMenu));
        app.handle(Command::ToMenu, 32);
        assert!(matches!(app.screen(), Screen::Menu));

        // On the menu 'm' would select manual mode, but these are the held key
        let held = [
            key('m', KeyEventKind::Repeat),
            key('m', KeyEventKind::Press),
        ];
        for event in &held {
            let later = now + Duration::from_millis(100);
            assert_eq!(key_command(&app, &mut keys, event, later), None);
        }
    }
}
