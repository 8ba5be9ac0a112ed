//! Game state: board, falling piece, next piece, score, phase and the gravity tick.

use crate::board::{Board, Cell, COLUMNS, ROWS};
use crate::collision::collides;
use crate::piece::{Catalog, Piece, TetrominoKind};
use crate::ticker::Ticker;
use std::time::{Duration, Instant};

/// Points per cleared row.
pub const POINTS_PER_ROW: u32 = 10;

/// Lifecycle phase. GameOver stays until `start` or `restart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Result of one gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened.
    Skipped,
    Fell,
    Locked { rows_cleared: u32 },
    GameOver { final_score: u32 },
}

/// Everything the engine mutates. One instance per session, owned by the app.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    piece: Option<Piece>,
    next: Option<Piece>,
    catalog: Catalog,
    pub score: u32,
    pub lines_cleared: u32,
    phase: Phase,
    ticker: Ticker,
}

impl GameState {
    pub fn new(config: &crate::GameConfig) -> Self {
        Self::with_catalog(
            Catalog::random(config.seed),
            Duration::from_millis(config.tick_ms),
        )
    }

    pub fn with_catalog(catalog: Catalog, tick_interval: Duration) -> Self {
        Self {
            board: Board::new(),
            piece: None,
            next: None,
            catalog,
            score: 0,
            lines_cleared: 0,
            phase: Phase::Idle,
            ticker: Ticker::new(tick_interval),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    #[inline]
    pub fn next_piece(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Time until the next gravity step, if one is scheduled.
    pub fn until_tick(&self, now: Instant) -> Option<Duration> {
        self.ticker.until_due(now)
    }

    /// Idle/GameOver -> Running with a fresh board. No-op otherwise.
    pub fn start(&mut self, now: Instant) {
        if !matches!(self.phase, Phase::Idle | Phase::GameOver) {
            return;
        }
        self.ticker.cancel();
        self.score = 0;
        self.lines_cleared = 0;
        self.board.reset();
        self.piece = None;
        self.next = None;
        self.phase = Phase::Running;
        if self.spawn_next() {
            self.ticker.arm(now);
        }
    }

    /// Running <-> Paused. Resuming waits a full interval before the next step.
    pub fn toggle_pause(&mut self, now: Instant) {
        match self.phase {
            Phase::Running => {
                self.ticker.cancel();
                self.phase = Phase::Paused;
            }
            Phase::Paused => {
                self.phase = Phase::Running;
                self.ticker.arm(now);
            }
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Abandons whatever is in progress and starts over.
    pub fn restart(&mut self, now: Instant) {
        self.ticker.cancel();
        self.phase = Phase::Idle;
        self.start(now);
    }

    pub fn move_left(&mut self) {
        self.try_shift(-1, 0);
    }

    pub fn move_right(&mut self) {
        self.try_shift(1, 0);
    }

    /// One row down if free. Never locks; gravity does that.
    pub fn soft_drop(&mut self) {
        self.try_shift(0, 1);
    }

    /// Clockwise turn in place. No kicks: a blocked turn is dropped.
    pub fn rotate(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(ref mut piece) = self.piece {
            let turned = piece.rotated_shape();
            if !collides(&self.board, piece, 0, 0, Some(&turned)) {
                piece.shape = turned;
            }
        }
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(ref mut piece) = self.piece else {
            return false;
        };
        if collides(&self.board, piece, dx, dy, None) {
            return false;
        }
        piece.x += dx;
        piece.y += dy;
        true
    }

    /// Runs a gravity step if the tick timer is due.
    pub fn poll_tick(&mut self, now: Instant) -> Option<TickOutcome> {
        if self.phase != Phase::Running || !self.ticker.poll(now) {
            return None;
        }
        Some(self.tick())
    }

    /// One gravity step: fall a row, or lock when blocked.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Skipped;
        }
        if self.try_shift(0, 1) {
            return TickOutcome::Fell;
        }
        self.lock_piece()
    }

    fn lock_piece(&mut self) -> TickOutcome {
        let Some(piece) = self.piece.take() else {
            return TickOutcome::Skipped;
        };
        for (x, y) in piece.cells() {
            // Rows above the board have nowhere to go.
            if y >= 0 {
                self.board.set(y as usize, x as usize, Cell::Filled(piece.kind));
            }
        }

        let rows_cleared = self.board.clear_completed_rows();
        self.lines_cleared += rows_cleared;
        self.score += POINTS_PER_ROW * rows_cleared;

        if self.spawn_next() {
            TickOutcome::Locked { rows_cleared }
        } else {
            TickOutcome::GameOver {
                final_score: self.score,
            }
        }
    }

    /// Moves the buffered piece into play and refills the buffer.
    /// Returns false (and ends the game) if the new piece has no room.
    fn spawn_next(&mut self) -> bool {
        let piece = match self.next.take() {
            Some(p) => p,
            None => self.catalog.random_piece(),
        };
        self.next = Some(self.catalog.random_piece());

        if collides(&self.board, &piece, 0, 0, None) {
            self.end_game();
            return false;
        }
        self.piece = Some(piece);
        true
    }

    fn end_game(&mut self) {
        self.ticker.cancel();
        self.piece = None;
        self.phase = Phase::GameOver;
    }

    /// Every cell to paint: locked board content, then the falling piece (visible rows only).
    pub fn render_cells(&self) -> Vec<(usize, usize, TetrominoKind)> {
        let mut cells: Vec<_> = self.board.filled_cells().collect();
        if let Some(ref piece) = self.piece {
            cells.extend(
                piece
                    .cells()
                    .filter(|&(x, y)| y >= 0 && (x as usize) < COLUMNS && (y as usize) < ROWS)
                    .map(|(x, y)| (x as usize, y as usize, piece.kind)),
            );
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::tests::catalog_of;
    use crate::piece::TetrominoKind::{I, O, T};

    const TICK: Duration = Duration::from_millis(1000);

    fn game_with(kinds: &[TetrominoKind]) -> GameState {
        GameState::with_catalog(catalog_of(kinds), TICK)
    }

    fn running(kinds: &[TetrominoKind]) -> (GameState, Instant) {
        let mut g = game_with(kinds);
        let t0 = Instant::now();
        g.start(t0);
        (g, t0)
    }

    fn fill_row_except(g: &mut GameState, row: usize, gap: &[usize]) {
        for x in (0..COLUMNS).filter(|x| !gap.contains(x)) {
            g.board.set(row, x, Cell::Filled(T));
        }
    }

    /// Stacks the board up to row 1 (no full rows) so the next spawn has no room.
    fn bury(g: &mut GameState) {
        for y in 1..ROWS {
            fill_row_except(g, y, &[0]);
        }
    }

    #[test]
    fn test_new_game_is_idle_and_ignores_input() {
        let mut g = game_with(&[T]);
        assert_eq!(g.phase(), Phase::Idle);
        g.move_left();
        g.rotate();
        assert_eq!(g.tick(), TickOutcome::Skipped);
        assert!(g.piece().is_none());
        assert!(g.render_cells().is_empty());
    }

    #[test]
    fn test_start_spawns_current_and_next() {
        let (g, t0) = running(&[I, O, T]);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.piece().map(|p| p.kind), Some(I));
        assert_eq!(g.next_piece().map(|p| p.kind), Some(O));
        assert_eq!(g.until_tick(t0), Some(TICK));
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let (mut g, t0) = running(&[I, O, T]);
        g.move_left();
        let before = g.piece().cloned();
        g.start(t0);
        assert_eq!(g.piece().cloned(), before);
        assert_eq!(g.next_piece().map(|p| p.kind), Some(O));
    }

    #[test]
    fn test_start_resets_score_and_board() {
        let mut g = game_with(&[O]);
        g.score = 90;
        g.board.set(ROWS - 1, 0, Cell::Filled(T));
        g.start(Instant::now());
        assert_eq!(g.score, 0);
        assert_eq!(g.board, Board::new());
    }

    #[test]
    fn test_moves_commit_when_free() {
        let (mut g, _) = running(&[T]);
        let x0 = g.piece().map(|p| p.x).unwrap();
        g.move_left();
        assert_eq!(g.piece().unwrap().x, x0 - 1);
        g.move_right();
        g.move_right();
        assert_eq!(g.piece().unwrap().x, x0 + 1);
        g.soft_drop();
        assert_eq!(g.piece().unwrap().y, 1);
    }

    #[test]
    fn test_move_into_wall_is_noop() {
        let (mut g, _) = running(&[I]);
        for _ in 0..20 {
            g.move_left();
        }
        assert_eq!(g.piece().unwrap().x, 0);
        for _ in 0..20 {
            g.move_right();
        }
        assert_eq!(g.piece().unwrap().x, COLUMNS as i32 - 4);
    }

    #[test]
    fn test_soft_drop_at_floor_does_not_lock() {
        let (mut g, _) = running(&[O, T]);
        for _ in 0..40 {
            g.soft_drop();
        }
        let p = g.piece().unwrap();
        assert_eq!((p.kind, p.y), (O, ROWS as i32 - 2));
        assert_eq!(g.board.filled_cells().count(), 0);
    }

    #[test]
    fn test_piece_falls_from_row_five_on_empty_board() {
        let (mut g, _) = running(&[T]);
        for _ in 0..5 {
            g.soft_drop();
        }
        assert_eq!(g.piece().unwrap().y, 5);
        assert_eq!(g.tick(), TickOutcome::Fell);
        assert_eq!(g.piece().unwrap().y, 6);
    }

    #[test]
    fn test_rotation_commits_when_free() {
        let (mut g, _) = running(&[T]);
        g.soft_drop();
        g.rotate();
        let p = g.piece().unwrap();
        assert_eq!((p.shape.width(), p.shape.height()), (2, 3));
    }

    #[test]
    fn test_blocked_rotation_keeps_shape() {
        let (mut g, _) = running(&[I]);
        for _ in 0..30 {
            g.soft_drop();
        }
        let before = g.piece().cloned();
        g.rotate();
        assert_eq!(g.piece().cloned(), before);
    }

    #[test]
    fn test_rotation_near_top_is_allowed() {
        // An upright I at y=0 reaches row 3; nothing above the board blocks it.
        let (mut g, _) = running(&[I]);
        g.rotate();
        assert_eq!(g.piece().unwrap().shape.height(), 4);
    }

    #[test]
    fn test_o_rotation_keeps_cells() {
        let (mut g, _) = running(&[O]);
        let before: Vec<_> = g.piece().unwrap().cells().collect();
        g.rotate();
        let after: Vec<_> = g.piece().unwrap().cells().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_i_piece_locks_on_bottom_row() {
        let (mut g, _) = running(&[I, O]);
        while g.piece().unwrap().y < ROWS as i32 - 1 {
            g.soft_drop();
        }
        assert_eq!(g.tick(), TickOutcome::Locked { rows_cleared: 0 });
        let bottom: Vec<bool> = (0..COLUMNS).map(|x| g.board.is_occupied(ROWS - 1, x)).collect();
        let expected: Vec<bool> = (0..COLUMNS).map(|x| (3..7).contains(&x)).collect();
        assert_eq!(bottom, expected);
        assert_eq!(g.score, 0);
        assert_eq!(g.piece().map(|p| p.kind), Some(O));
    }

    #[test]
    fn test_locked_cells_keep_piece_kind() {
        let (mut g, _) = running(&[T, O]);
        while g.tick() == TickOutcome::Fell {}
        assert!(g.board.filled_cells().all(|(_, _, k)| k == T));
        assert_eq!(g.board.filled_cells().count(), 4);
    }

    #[test]
    fn test_two_row_clear_scores_twenty() {
        let (mut g, _) = running(&[O, T]);
        fill_row_except(&mut g, ROWS - 1, &[0, 1]);
        fill_row_except(&mut g, ROWS - 2, &[0, 1]);
        for _ in 0..5 {
            g.move_left();
        }
        while g.tick() == TickOutcome::Fell {}
        assert_eq!(g.score, 20);
        assert_eq!(g.lines_cleared, 2);
        assert_eq!(g.board.filled_cells().count(), 0);
    }

    #[test]
    fn test_tick_reports_rows_cleared() {
        let (mut g, _) = running(&[I, T]);
        fill_row_except(&mut g, ROWS - 1, &[3, 4, 5, 6]);
        let mut outcome = g.tick();
        while outcome == TickOutcome::Fell {
            outcome = g.tick();
        }
        assert_eq!(outcome, TickOutcome::Locked { rows_cleared: 1 });
        assert_eq!(g.score, POINTS_PER_ROW);
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let (mut g, _) = running(&[O, O]);
        bury(&mut g);
        g.score = 30;
        assert_eq!(g.tick(), TickOutcome::GameOver { final_score: 30 });
        assert_eq!(g.phase(), Phase::GameOver);
        assert!(g.piece().is_none());
        assert_eq!(g.until_tick(Instant::now()), None);
    }

    #[test]
    fn test_game_over_ignores_ticks_and_input() {
        let (mut g, t0) = running(&[O, O]);
        bury(&mut g);
        assert!(matches!(g.tick(), TickOutcome::GameOver { .. }));
        let board = g.board.clone();
        assert_eq!(g.tick(), TickOutcome::Skipped);
        assert_eq!(g.poll_tick(t0 + TICK * 5), None);
        g.move_left();
        g.soft_drop();
        g.rotate();
        g.toggle_pause(t0);
        assert_eq!(g.phase(), Phase::GameOver);
        assert_eq!(g.board, board);
    }

    #[test]
    fn test_start_after_game_over() {
        let (mut g, t0) = running(&[O, O]);
        bury(&mut g);
        g.tick();
        g.start(t0);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.board, Board::new());
        assert!(g.piece().is_some());
    }

    #[test]
    fn test_pause_blocks_input_and_ticks() {
        let (mut g, t0) = running(&[T]);
        g.toggle_pause(t0);
        assert_eq!(g.phase(), Phase::Paused);
        let before = g.piece().cloned();
        g.move_left();
        g.rotate();
        g.soft_drop();
        assert_eq!(g.tick(), TickOutcome::Skipped);
        assert_eq!(g.poll_tick(t0 + TICK * 3), None);
        assert_eq!(g.piece().cloned(), before);
    }

    #[test]
    fn test_resume_waits_full_interval() {
        let (mut g, t0) = running(&[T]);
        let half = TICK / 2;
        g.toggle_pause(t0 + half);
        g.toggle_pause(t0 + TICK * 2);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.poll_tick(t0 + TICK * 2 + half), None);
        assert_eq!(g.poll_tick(t0 + TICK * 3), Some(TickOutcome::Fell));
    }

    #[test]
    fn test_poll_tick_fires_on_interval() {
        let (mut g, t0) = running(&[T]);
        assert_eq!(g.poll_tick(t0 + TICK / 2), None);
        assert_eq!(g.poll_tick(t0 + TICK), Some(TickOutcome::Fell));
        assert_eq!(g.piece().unwrap().y, 1);
    }

    #[test]
    fn test_restart_from_any_phase() {
        let (mut g, t0) = running(&[T, I, O, O, O]);
        g.soft_drop();
        g.restart(t0);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.piece().map(|p| (p.kind, p.y)), Some((O, 0)));

        g.toggle_pause(t0);
        g.restart(t0);
        assert_eq!(g.phase(), Phase::Running);

        let mut idle = game_with(&[T]);
        idle.restart(t0);
        assert_eq!(idle.phase(), Phase::Running);
    }

    #[test]
    fn test_start_while_paused_is_noop() {
        let (mut g, t0) = running(&[T]);
        g.toggle_pause(t0);
        g.start(t0);
        assert_eq!(g.phase(), Phase::Paused);
    }

    #[test]
    fn test_render_cells_include_piece_and_board() {
        let (mut g, _) = running(&[O]);
        g.board.set(ROWS - 1, 0, Cell::Filled(T));
        let cells = g.render_cells();
        assert_eq!(cells.len(), 5);
        assert!(cells.contains(&(0, ROWS - 1, T)));
        assert!(cells.contains(&(4, 0, O)));
        assert!(cells.contains(&(5, 1, O)));
    }
}
