//! Property tests for the board invariants.
//!
//! Invariants covered:
//! - `check_collision` agrees with a direct reading of walls, floor and stack.
//! - Four clockwise rotations are the identity for every template.
//! - Clearing keeps the grid shape, removes exactly the full rows, keeps the
//!   remaining rows in order and scores 100 per row.
//! - A hard drop on an empty grid rests the lowest cell on the bottom row.

use proptest::prelude::*;

use tetrix::game::{
    test_helpers::*, CellState, Game, Grid, GRID_HEIGHT, GRID_WIDTH, SCORE_PER_LINE,
};
use tetrix::piece::{PaletteColor, Piece, ShapeType};

fn shape() -> impl Strategy<Value = ShapeType> {
    prop::sample::select(ShapeType::ALL.to_vec())
}

fn grid_from(bits: &[bool]) -> Grid {
    bits.chunks(GRID_WIDTH)
        .map(|row| {
            row.iter()
                .map(|&filled| {
                    if filled {
                        CellState::Filled(PaletteColor::Green)
                    } else {
                        CellState::Empty
                    }
                })
                .collect()
        })
        .collect()
}

fn rotated(shape: ShapeType, turns: usize, x: i16, y: i16) -> Piece {
    let mut piece = Piece::new_at(shape, PaletteColor::Red, x, y);
    for _ in 0..turns {
        piece.rotate();
    }
    piece
}

proptest! {
    #[test]
    fn collision_matches_board_contents(
        shape in shape(),
        turns in 0usize..4,
        x in -4i16..12,
        y in -5i16..22,
        dx in -1i16..=1,
        dy in 0i16..=1,
        bits in prop::collection::vec(any::<bool>(), GRID_WIDTH * GRID_HEIGHT),
    ) {
        let grid = grid_from(&bits);
        let piece = rotated(shape, turns, x, y);
        let game = Game::with_grid(grid.clone(), piece.clone());

        let expected = piece.occupied_cells().iter().any(|cell| {
            let (cx, cy) = (cell.x + dx, cell.y + dy);
            cx < 0
                || cx >= GRID_WIDTH as i16
                || cy >= GRID_HEIGHT as i16
                || (cy >= 0 && grid[cy as usize][cx as usize] != CellState::Empty)
        });

        prop_assert_eq!(game.check_collision(&piece, dx, dy), expected);
    }

    #[test]
    fn four_rotations_are_identity(shape in shape(), turns in 0usize..4) {
        let piece = rotated(shape, turns, 0, 0);
        let mut spun = piece.clone();
        for _ in 0..4 {
            spun.rotate();
        }
        prop_assert_eq!(spun, piece);
    }

    #[test]
    fn clearing_removes_exactly_the_full_rows(
        full in prop::collection::vec(any::<bool>(), GRID_HEIGHT),
        bits in prop::collection::vec(any::<bool>(), GRID_WIDTH * GRID_HEIGHT),
        gaps in prop::collection::vec(0usize..GRID_WIDTH, GRID_HEIGHT),
    ) {
        let mut grid = grid_from(&bits);
        for y in 0..GRID_HEIGHT {
            if full[y] {
                fill_row(&mut grid, y);
            } else {
                grid[y][gaps[y]] = CellState::Empty;
            }
        }
        let survivors: Vec<_> = grid
            .iter()
            .zip(&full)
            .filter(|&(_, &is_full)| !is_full)
            .map(|(row, _)| row.clone())
            .collect();
        let full_count = full.iter().filter(|&&f| f).count();

        let mut game = Game::with_grid(grid, Piece::with_color(ShapeType::OShape, PaletteColor::Red));
        let cleared = game.clear_lines();

        prop_assert_eq!(cleared as usize, full_count);
        prop_assert_eq!(game.score, cleared * SCORE_PER_LINE);
        prop_assert_eq!(game.grid.len(), GRID_HEIGHT);
        prop_assert!(game.grid.iter().all(|row| row.len() == GRID_WIDTH));
        prop_assert!(game.grid[..full_count]
            .iter()
            .all(|row| row.iter().all(|cell| *cell == CellState::Empty)));
        prop_assert_eq!(&game.grid[full_count..], survivors.as_slice());
    }

    #[test]
    fn hard_drop_rests_on_bottom_row(
        shape in shape(),
        turns in 0usize..4,
        column in any::<u16>(),
    ) {
        let probe = rotated(shape, turns, 0, 0);
        let x = (column as usize % (GRID_WIDTH - probe.width() + 1)) as i16;
        let piece = rotated(shape, turns, x, 0);
        let expected: Vec<_> = piece.occupied_cells();
        let lowest = expected.iter().map(|cell| cell.y).max().unwrap_or(0);
        let drop = GRID_HEIGHT as i16 - 1 - lowest;

        let mut game = Game::with_grid(empty_grid(), piece);
        game.hard_drop();

        prop_assert!(game.current_piece.is_none());
        prop_assert_eq!(game.total_filled_cells(), expected.len());
        for cell in expected {
            let landed = game.cell(cell.x as usize, (cell.y + drop) as usize);
            prop_assert_eq!(landed, Some(CellState::Filled(PaletteColor::Red)));
        }
    }
}
