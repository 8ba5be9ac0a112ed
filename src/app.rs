//! App: terminal init, main loop, tick and input dispatch.

use crate::game::{GameState, TickOutcome};
use crate::input::{Action, PointerTracker, classify_swipe, key_to_action};
use crate::theme::Theme;
use crate::ui::ScreenLayout;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

pub struct App {
    theme: Theme,
    state: GameState,
    autostart: bool,
    frame_interval: Duration,
    pointer: PointerTracker,
    /// Layout of the last drawn frame; pointer events are resolved against it.
    layout: ScreenLayout,
    /// TachyonFX fade for the game-over board (created when the game ends).
    game_over_fade: Option<Effect>,
    game_over_fade_time: Option<Instant>,
    quit: bool,
}

impl App {
    pub fn new(args: &Args, config: &GameConfig, theme: Theme) -> Self {
        let rate = if args.frame_rate.is_finite() && args.frame_rate > 0.0 {
            args.frame_rate
        } else {
            30.0
        };
        Self {
            theme,
            state: GameState::new(config),
            autostart: args.autostart,
            frame_interval: Duration::from_secs_f64(1.0 / rate),
            pointer: PointerTracker::default(),
            layout: ScreenLayout::new(Rect::default()),
            game_over_fade: None,
            game_over_fade_time: None,
            quit: false,
        }
    }

    /// Lifecycle and movement commands. Movement outside Running is dropped by the engine.
    fn apply_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.quit = true,
            Action::Start => self.state.start(now),
            Action::Pause => self.state.toggle_pause(now),
            Action::Restart => self.state.restart(now),
            Action::MoveLeft => self.state.move_left(),
            Action::MoveRight => self.state.move_right(),
            Action::Rotate => self.state.rotate(),
            Action::SoftDrop => self.state.soft_drop(),
            Action::None => {}
        }
    }

    /// Press/release pairs: a click on a button fires it, anything that began on the board is a swipe.
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer.press(mouse.column, mouse.row),
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(((x0, y0), (dx, dy))) = self.pointer.release(mouse.column, mouse.row)
                else {
                    return;
                };
                let pressed = self.layout.button_at(x0, y0);
                let action = if let Some(button) = pressed {
                    if self.layout.button_at(mouse.column, mouse.row) == pressed {
                        button.action()
                    } else {
                        Action::None
                    }
                } else if self.layout.on_board(x0, y0) {
                    classify_swipe(dx, dy)
                } else {
                    Action::None
                };
                self.apply_action(action, now);
            }
            _ => {}
        }
    }

    fn handle_event(&mut self, ev: Event, now: Instant) {
        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.apply_action(key_to_action(key), now);
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            _ => {}
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        if self.autostart {
            self.state.start(Instant::now());
        }
        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        if let Some(score) = result.as_ref().ok().copied().flatten() {
            println!("Final score: {score}");
        }
        result.map(|_| ())
    }

    /// Returns the final score of the last finished game, if any.
    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<Option<u32>> {
        let mut final_score = None;
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                self.layout = ScreenLayout::new(f.area());
                crate::ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    &mut self.game_over_fade,
                    &mut self.game_over_fade_time,
                    now,
                );
            })?;

            // Wake for whichever comes first: the next frame or the next gravity step.
            let until_frame = self.frame_interval.saturating_sub(now.elapsed());
            let timeout = self
                .state
                .until_tick(Instant::now())
                .map_or(until_frame, |t| t.min(until_frame));

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let ev = event::read()?;
                    self.handle_event(ev, Instant::now());
                    if self.quit {
                        return Ok(final_score);
                    }
                }
            }

            if let Some(TickOutcome::GameOver { final_score: score }) =
                self.state.poll_tick(Instant::now())
            {
                final_score = Some(score);
            }
        }
    }
}
