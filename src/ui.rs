//! Layout and drawing: playfield, next preview, stats, control buttons, pause and game over.

use crate::board::{COLUMNS, ROWS};
use crate::game::{GameState, Phase};
use crate::input::Action;
use crate::piece::Piece;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal columns per board cell (cells are roughly square that way).
pub const BLOCK_WIDTH: u16 = 2;
/// Glyphs for one block: the stroke is drawn in the foreground, the fill in the background.
const BLOCK_GLYPHS: [&str; 2] = ["▏", "▕"];

const SIDEBAR_WIDTH: u16 = 24;
const NEXT_BOX_HEIGHT: u16 = 6;
const STATS_BOX_HEIGHT: u16 = 6;
const CONTROLS_BOX_HEIGHT: u16 = 6;

/// Duration of the board fade when the game ends.
const GAME_OVER_FADE_MS: u32 = 600;

/// Clickable sidebar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Start,
    Pause,
    Restart,
    Left,
    Rotate,
    Down,
    Right,
}

impl Button {
    const LIFECYCLE: [Self; 3] = [Self::Start, Self::Pause, Self::Restart];
    const MOVEMENT: [Self; 4] = [Self::Left, Self::Rotate, Self::Down, Self::Right];

    pub fn action(self) -> Action {
        match self {
            Self::Start => Action::Start,
            Self::Pause => Action::Pause,
            Self::Restart => Action::Restart,
            Self::Left => Action::MoveLeft,
            Self::Rotate => Action::Rotate,
            Self::Down => Action::SoftDrop,
            Self::Right => Action::MoveRight,
        }
    }

    fn label(self, phase: Phase) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Pause if phase == Phase::Paused => "Resume",
            Self::Pause => "Pause",
            Self::Restart => "Restart",
            Self::Left => "←",
            Self::Rotate => "↻",
            Self::Down => "↓",
            Self::Right => "→",
        }
    }

    fn enabled(self, phase: Phase) -> bool {
        match self {
            Self::Start => matches!(phase, Phase::Idle | Phase::GameOver),
            Self::Pause => matches!(phase, Phase::Running | Phase::Paused),
            Self::Restart => true,
            Self::Left | Self::Rotate | Self::Down | Self::Right => phase == Phase::Running,
        }
    }
}

/// Where everything goes for a given terminal area. Shared by drawing and pointer hit tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Playfield including its border.
    pub playfield: Rect,
    /// Board cells only.
    pub board: Rect,
    pub next: Rect,
    pub stats: Rect,
    pub controls: Rect,
    pub buttons: Vec<(Button, Rect)>,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let pw = COLUMNS as u16 * BLOCK_WIDTH + 2;
        let ph = ROWS as u16 + 2;
        let total_w = pw + SIDEBAR_WIDTH;
        let outer = Rect {
            x: area.x + area.width.saturating_sub(total_w) / 2,
            y: area.y + area.height.saturating_sub(ph) / 2,
            width: total_w,
            height: ph,
        }
        .intersection(area);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
            .split(outer);
        let playfield = cols[0];
        let board = Block::default().borders(Borders::ALL).inner(playfield);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NEXT_BOX_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(STATS_BOX_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(CONTROLS_BOX_HEIGHT),
            ])
            .split(cols[1]);
        let (next, stats, controls) = (side[0], side[2], side[4]);

        let buttons = control_buttons(controls);
        Self {
            playfield,
            board,
            next,
            stats,
            controls,
            buttons,
        }
    }

    pub fn button_at(&self, column: u16, row: u16) -> Option<Button> {
        let pos = Position::new(column, row);
        self.buttons
            .iter()
            .find(|(_, r)| r.contains(pos))
            .map(|(b, _)| *b)
    }

    pub fn on_board(&self, column: u16, row: u16) -> bool {
        self.board.contains(Position::new(column, row))
    }
}

/// Lifecycle row in thirds, movement row in quarters, under a one-line title.
fn control_buttons(controls: Rect) -> Vec<(Button, Rect)> {
    let inner = Block::default().borders(Borders::ALL).inner(controls);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let thirds = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(rows[1]);
    let quarters = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[3]);
    Button::LIFECYCLE
        .into_iter()
        .zip(thirds.iter().copied())
        .chain(Button::MOVEMENT.into_iter().zip(quarters.iter().copied()))
        .collect()
}

/// Draw the whole screen. While the game is over, fades the board with TachyonFX and keeps it
/// greyed once the fade is done; `fade` / `fade_time` are reset when a new game starts.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    fade: &mut Option<Effect>,
    fade_time: &mut Option<Instant>,
    now: Instant,
) {
    let layout = ScreenLayout::new(frame.area());
    let phase = state.phase();
    if phase != Phase::GameOver {
        *fade = None;
        *fade_time = None;
    }
    let greyed = phase == Phase::GameOver && fade.as_ref().is_some_and(Effect::done);

    draw_playfield(frame, state, theme, &layout, greyed);
    draw_next(frame, state, theme, layout.next);
    draw_stats(frame, state, theme, layout.stats);
    draw_controls(frame, phase, theme, &layout);

    match phase {
        Phase::Idle => draw_message(
            frame,
            theme,
            layout.playfield,
            " Blockfall ",
            &[" S / Enter — Start ", " Q — Quit "],
            theme.title,
        ),
        Phase::Paused => draw_message(
            frame,
            theme,
            layout.playfield,
            " Paused ",
            &[" P — Resume    Q — Quit "],
            Color::Yellow,
        ),
        Phase::GameOver => {
            if !greyed {
                apply_game_over_fade(frame, theme, layout.board, fade, fade_time, now);
            }
            let score = format!(" Final score: {} ", state.score);
            draw_message(
                frame,
                theme,
                layout.playfield,
                " Game Over ",
                &[score.as_str(), "", " R — Restart    Q — Quit "],
                Color::Red,
            );
        }
        Phase::Running => {}
    }
}

fn apply_game_over_fade(
    frame: &mut Frame,
    theme: &Theme,
    board: Rect,
    fade: &mut Option<Effect>,
    fade_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = fade_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *fade_time = Some(now);

    let effect = fade.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board)
    });
    frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
}

/// Paint one board cell; clipped to `clip`.
fn paint_block(buf: &mut Buffer, clip: Rect, x: u16, y: u16, fill: Color, stroke: Color) {
    for (i, glyph) in BLOCK_GLYPHS.iter().enumerate() {
        let pos = Position::new(x + i as u16, y);
        if !clip.contains(pos) {
            continue;
        }
        if let Some(cell) = buf.cell_mut(pos) {
            cell.set_symbol(glyph).set_style(Style::default().fg(stroke).bg(fill));
        }
    }
}

fn draw_playfield(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    layout: &ScreenLayout,
    greyed: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockfall ", theme.title));
    block.render(layout.playfield, frame.buffer_mut());

    let board = layout.board;
    let buf = frame.buffer_mut();
    for y in board.top()..board.bottom() {
        for x in board.left()..board.right() {
            if let Some(cell) = buf.cell_mut(Position::new(x, y)) {
                cell.set_symbol(" ").set_style(Style::default().bg(theme.bg));
            }
        }
    }

    for (col, row, kind) in state.render_cells() {
        let fill = if greyed {
            theme.inactive_fg
        } else {
            theme.piece_color(kind)
        };
        let x = board.x + col as u16 * BLOCK_WIDTH;
        let y = board.y + row as u16;
        paint_block(buf, board, x, y, fill, theme.stroke);
    }
}

fn sidebar_box<'a>(theme: &Theme, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

/// Next piece at preview scale: one solid 2-column block per cell, centred in the box.
fn draw_next(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let block = sidebar_box(theme, " Next ");
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    if let Some(piece) = state.next_piece() {
        draw_preview(frame.buffer_mut(), inner, piece, theme.piece_color(piece.kind));
    }
}

fn draw_preview(buf: &mut Buffer, area: Rect, piece: &Piece, color: Color) {
    let w = piece.shape.width() as u16 * BLOCK_WIDTH;
    let h = piece.shape.height() as u16;
    let off_x = area.width.saturating_sub(w) / 2;
    let off_y = area.height.saturating_sub(h) / 2;
    for (dx, dy) in piece.shape.occupied() {
        let r = Rect {
            x: area.x + off_x + dx as u16 * BLOCK_WIDTH,
            y: area.y + off_y + dy as u16,
            width: BLOCK_WIDTH,
            height: 1,
        }
        .intersection(area);
        Paragraph::new("██")
            .style(Style::default().fg(color).bg(color))
            .render(r, buf);
    }
}

fn draw_stats(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let block = sidebar_box(theme, " Stats ");
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let status = match state.phase() {
        Phase::Idle => "Ready",
        Phase::Running => "Playing",
        Phase::Paused => "Paused",
        Phase::GameOver => "Game over",
    };
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let lines = vec![
        row("Score: ", state.score.to_string()),
        row("Lines: ", state.lines_cleared.to_string()),
        row("Drop:  ", format!("{} ms", state.tick_interval().as_millis())),
        row("State: ", status.to_string()),
    ];
    Paragraph::new(ratatui::text::Text::from(lines)).render(inner, frame.buffer_mut());
}

fn draw_controls(frame: &mut Frame, phase: Phase, theme: &Theme, layout: &ScreenLayout) {
    let block = sidebar_box(theme, " Controls ");
    block.render(layout.controls, frame.buffer_mut());

    for &(button, rect) in &layout.buttons {
        let style = if button.enabled(phase) {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.inactive_fg).bg(theme.bg)
        };
        let inset = Rect {
            x: rect.x,
            y: rect.y,
            width: rect.width.saturating_sub(1),
            height: rect.height,
        };
        Paragraph::new(button.label(phase))
            .alignment(Alignment::Center)
            .style(style)
            .render(inset, frame.buffer_mut());
    }
}

/// Centred popup over the playfield.
fn draw_message(
    frame: &mut Frame,
    theme: &Theme,
    over: Rect,
    title: &str,
    body: &[&str],
    title_bg: Color,
) {
    let popup_w = 26u16;
    let popup_h = body.len() as u16 + 4;
    let popup = Rect {
        x: over.x + over.width.saturating_sub(popup_w) / 2,
        y: over.y + over.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    }
    .intersection(frame.area());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Black).bg(title_bg),
        )),
    ];
    lines.extend(
        body.iter()
            .map(|s| Line::from(Span::styled(s.to_string(), Style::default().fg(theme.main_fg)))),
    );
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        );
    p.render(popup, frame.buffer_mut());
}
