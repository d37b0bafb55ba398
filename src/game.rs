use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::piece::{PaletteColor, Piece, Position};

// ============================================================================
// Configuration
// ============================================================================

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

// Timing
pub const FALL_INTERVAL: Duration = Duration::from_millis(500);
pub const MOVE_DELAY: Duration = Duration::from_millis(150);
pub const MOVE_INTERVAL: Duration = Duration::from_millis(50);

// Scoring
pub const SCORE_PER_LINE: u32 = 100;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Filled(PaletteColor),
}

pub type Grid = Vec<Vec<CellState>>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    pub fn delta(&self) -> (i16, i16) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    PieceSpawned,
    LinesCleared(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

// ============================================================================
// Piece Source Trait
// ============================================================================

pub trait PieceSource {
    fn next_piece(&mut self) -> Piece;
}

/// Uniformly random shapes and colors from a seedable generator.
pub struct RandomPieceSource {
    rng: StdRng,
}

impl RandomPieceSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PieceSource for RandomPieceSource {
    fn next_piece(&mut self) -> Piece {
        Piece::random(&mut self.rng)
    }
}

pub struct SequencePieceSource {
    pieces: Vec<Piece>,
    index: usize,
}

impl SequencePieceSource {
    pub fn new(pieces: Vec<Piece>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceSource for SequencePieceSource {
    fn next_piece(&mut self) -> Piece {
        let piece = self.pieces[self.index % self.pieces.len()].clone();
        self.index += 1;
        piece
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Grid,
    pub current_piece: Option<Piece>,
    pub next_piece: Piece,
    pub score: u32,
    pub lines_cleared: u32,
    pub state: GameState,
    fall_timer: Duration,
    piece_source: Box<dyn PieceSource>,
    events: Vec<GameEvent>,
}

fn on_board(cell: Position) -> bool {
    (0..GRID_WIDTH as i16).contains(&cell.x) && (0..GRID_HEIGHT as i16).contains(&cell.y)
}

fn empty_grid() -> Grid {
    vec![vec![CellState::Empty; GRID_WIDTH]; GRID_HEIGHT]
}

// ============================================================================
// Game Logic
// ============================================================================

impl Game {
    pub fn new() -> Self {
        Self::with_source(Box::new(RandomPieceSource::from_entropy()))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_source(Box::new(RandomPieceSource::seeded(seed)))
    }

    /// A fresh game with an empty grid. The first piece spawns once the fall
    /// clock first expires.
    pub fn with_source(mut source: Box<dyn PieceSource>) -> Self {
        let next_piece = source.next_piece();

        Self {
            grid: empty_grid(),
            current_piece: None,
            next_piece,
            score: 0,
            lines_cleared: 0,
            state: GameState::Playing,
            fall_timer: Duration::ZERO,
            piece_source: source,
            events: Vec::new(),
        }
    }

    pub fn with_grid(grid: Grid, current_piece: Piece) -> Self {
        let mut game = Self::new();
        game.grid = grid;
        game.current_piece = Some(current_piece);
        game
    }

    /// Throws away all progress and starts over with the same piece source.
    pub fn restart(self) -> Self {
        let mut game = Self::with_source(self.piece_source);
        game.events.push(GameEvent::GameRestarted);
        game
    }

    /// True if `piece` shifted by (dx, dy) would leave the board sideways,
    /// pass the floor, or overlap a settled cell. Rows above the board only
    /// collide with the walls.
    pub fn check_collision(&self, piece: &Piece, dx: i16, dy: i16) -> bool {
        piece.occupied_cells().into_iter().any(|cell| {
            let x = cell.x + dx;
            let y = cell.y + dy;
            if x < 0 || x >= GRID_WIDTH as i16 || y >= GRID_HEIGHT as i16 {
                return true;
            }
            y >= 0 && self.grid[y as usize][x as usize] != CellState::Empty
        })
    }

    pub fn try_move(&mut self, direction: Direction) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let Some(piece) = &self.current_piece else {
            return false;
        };
        let (dx, dy) = direction.delta();
        if self.check_collision(piece, dx, dy) {
            return false;
        }

        if let Some(piece) = self.current_piece.as_mut() {
            match direction {
                Direction::Left => piece.move_left(),
                Direction::Right => piece.move_right(),
                Direction::Down => piece.move_down(),
            }
        }
        self.events.push(GameEvent::PieceMoved);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(Direction::Right)
    }

    /// One row down. Never locks; an obstructed piece waits for the fall clock.
    pub fn soft_drop_step(&mut self) -> bool {
        self.try_move(Direction::Down)
    }

    /// Rotates clockwise in place. A rotation that does not fit is undone by
    /// three more turns; there are no wall kicks.
    pub fn rotate(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let Some(mut piece) = self.current_piece.take() else {
            return false;
        };

        piece.rotate();
        let fits = !self.check_collision(&piece, 0, 0);
        if !fits {
            for _ in 0..3 {
                piece.rotate();
            }
        }
        self.current_piece = Some(piece);

        if fits {
            self.events.push(GameEvent::PieceRotated);
        }
        fits
    }

    pub fn hard_drop(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(mut piece) = self.current_piece.take() else {
            return;
        };
        while !self.check_collision(&piece, 0, 1) {
            piece.move_down();
        }
        self.current_piece = Some(piece);
        self.lock_piece();
    }

    /// Copies the active piece into the grid, discards it and clears any
    /// completed rows. Cells above the board are dropped. Returns the number
    /// of rows cleared.
    pub fn lock_piece(&mut self) -> u32 {
        let Some(piece) = self.current_piece.take() else {
            return 0;
        };
        for cell in piece.occupied_cells() {
            if on_board(cell) {
                self.grid[cell.y as usize][cell.x as usize] = CellState::Filled(piece.color);
            }
        }
        self.events.push(GameEvent::PieceLocked);
        self.clear_lines()
    }

    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared_count = 0;
        let mut y = GRID_HEIGHT;

        // Bottom to top; after a removal the row above drops into `y - 1`,
        // so the same index is scanned again.
        while y > 0 {
            if self.is_row_complete(y - 1) {
                self.grid.remove(y - 1);
                self.grid.insert(0, vec![CellState::Empty; GRID_WIDTH]);
                cleared_count += 1;
            } else {
                y -= 1;
            }
        }

        if cleared_count > 0 {
            self.score += cleared_count * SCORE_PER_LINE;
            self.lines_cleared += cleared_count;
            self.events.push(GameEvent::LinesCleared(cleared_count));
        }

        cleared_count
    }

    /// Promotes the preview piece, centered over the board, and draws a new
    /// preview. A spawn that overlaps the stack ends the game.
    pub fn spawn_next(&mut self) {
        let fresh = self.piece_source.next_piece();
        let mut piece = std::mem::replace(&mut self.next_piece, fresh);
        piece.position.x = (GRID_WIDTH / 2) as i16 - (piece.width() / 2) as i16;

        let blocked = self.check_collision(&piece, 0, 0);
        self.current_piece = Some(piece);
        self.events.push(GameEvent::PieceSpawned);

        if blocked {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    /// Advances the fall clock. Each time it expires the active piece falls
    /// one row, locks if it cannot, or a new piece spawns if none is active.
    pub fn tick(&mut self, dt: Duration) {
        if self.state != GameState::Playing {
            return;
        }

        self.fall_timer += dt;
        if self.fall_timer < FALL_INTERVAL {
            return;
        }

        let landed = self
            .current_piece
            .as_ref()
            .map(|piece| self.check_collision(piece, 0, 1));
        match landed {
            Some(false) => {
                if let Some(piece) = self.current_piece.as_mut() {
                    piece.move_down();
                }
            }
            Some(true) => {
                self.lock_piece();
            }
            None => self.spawn_next(),
        }
        self.fall_timer = Duration::ZERO;
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => {
                self.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Playing;
                self.events.push(GameEvent::Unpaused);
            }
            GameState::GameOver => {}
        }
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Grid {
        let mut visual_grid = self.grid.clone();

        if self.state == GameState::GameOver {
            return visual_grid;
        }
        if let Some(piece) = &self.current_piece {
            for cell in piece.occupied_cells() {
                if on_board(cell) {
                    visual_grid[cell.y as usize][cell.x as usize] = CellState::Filled(piece.color);
                }
            }
        }

        visual_grid
    }

    /// Cells of the active piece, empty if there is none.
    pub fn current_cells(&self) -> Vec<Position> {
        self.current_piece
            .as_ref()
            .map(Piece::occupied_cells)
            .unwrap_or_default()
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        self.grid.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.grid[y].iter().all(|cell| *cell != CellState::Empty)
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.grid[y].iter().filter(|cell| **cell != CellState::Empty).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn total_filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| **cell != CellState::Empty).count()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::piece::PaletteColor;

    pub fn empty_grid() -> Grid {
        super::empty_grid()
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..GRID_WIDTH {
            grid[y][x] = CellState::Filled(PaletteColor::Blue);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..GRID_WIDTH {
            if x != gap_x {
                grid[y][x] = CellState::Filled(PaletteColor::Blue);
            }
        }
    }
}
