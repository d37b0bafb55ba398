use std::fmt;
use std::str::FromStr;

use rand::Rng;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PieceError {
    #[error("invalid shape `{0}`")]
    InvalidShape(String),
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShapeType {
    LShape,
    JShape,
    SShape,
    ZShape,
    OShape,
    IShape,
    Cross,
    Diamond,
    UShape,
    Plus,
    HShape,
    Line3,
}

// Shape templates, one row per string, `#` marks an occupied cell.
const L_SHAPE: &[&str] = &["#..", "#..", "##."];
const J_SHAPE: &[&str] = &["..#", "..#", ".##"];
const S_SHAPE: &[&str] = &[".##", "##.", "..."];
const Z_SHAPE: &[&str] = &["##.", ".##", "..."];
const O_SHAPE: &[&str] = &["##", "##"];
const I_SHAPE: &[&str] = &["....", "####", "....", "...."];
const CROSS: &[&str] = &[".#.", "###", ".#."];
const DIAMOND: &[&str] = &[".#.", "###", "#.#"];
const U_SHAPE: &[&str] = &["#.#", "###"];
const PLUS: &[&str] = &[".#.", "###", ".#."];
const H_SHAPE: &[&str] = &["#.#", "###", "#.#"];
const LINE_3: &[&str] = &["###"];

impl ShapeType {
    pub const ALL: [ShapeType; 12] = [
        ShapeType::LShape,
        ShapeType::JShape,
        ShapeType::SShape,
        ShapeType::ZShape,
        ShapeType::OShape,
        ShapeType::IShape,
        ShapeType::Cross,
        ShapeType::Diamond,
        ShapeType::UShape,
        ShapeType::Plus,
        ShapeType::HShape,
        ShapeType::Line3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::LShape => "L_Shape",
            ShapeType::JShape => "J_Shape",
            ShapeType::SShape => "S_Shape",
            ShapeType::ZShape => "Z_Shape",
            ShapeType::OShape => "O_Shape",
            ShapeType::IShape => "I_Shape",
            ShapeType::Cross => "Cross",
            ShapeType::Diamond => "Diamond",
            ShapeType::UShape => "U_Shape",
            ShapeType::Plus => "Plus",
            ShapeType::HShape => "H_Shape",
            ShapeType::Line3 => "Line_3",
        }
    }

    /// The unrotated template, shared by every piece of this shape.
    pub fn template(&self) -> &'static [&'static str] {
        match self {
            ShapeType::LShape => L_SHAPE,
            ShapeType::JShape => J_SHAPE,
            ShapeType::SShape => S_SHAPE,
            ShapeType::ZShape => Z_SHAPE,
            ShapeType::OShape => O_SHAPE,
            ShapeType::IShape => I_SHAPE,
            ShapeType::Cross => CROSS,
            ShapeType::Diamond => DIAMOND,
            ShapeType::UShape => U_SHAPE,
            ShapeType::Plus => PLUS,
            ShapeType::HShape => H_SHAPE,
            ShapeType::Line3 => LINE_3,
        }
    }

    /// The template expanded into a boolean matrix.
    pub fn matrix(&self) -> Vec<Vec<bool>> {
        self.template()
            .iter()
            .map(|row| row.bytes().map(|b| b == b'#').collect())
            .collect()
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeType {
    type Err = PieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| PieceError::InvalidShape(s.to_string()))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PaletteColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Orange,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 7] = [
        PaletteColor::Red,
        PaletteColor::Green,
        PaletteColor::Blue,
        PaletteColor::Yellow,
        PaletteColor::Magenta,
        PaletteColor::Cyan,
        PaletteColor::Orange,
    ];

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            PaletteColor::Red => (255, 0, 0),
            PaletteColor::Green => (0, 255, 0),
            PaletteColor::Blue => (0, 0, 255),
            PaletteColor::Yellow => (255, 255, 0),
            PaletteColor::Magenta => (255, 0, 255),
            PaletteColor::Cyan => (0, 255, 255),
            PaletteColor::Orange => (255, 128, 0),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ============================================================================
// Piece
// ============================================================================

/// A falling polyomino. Movement and rotation are unconditional; the board
/// validates every change with a collision check before applying it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub shape_type: ShapeType,
    pub color: PaletteColor,
    pub position: Position,
    cells: Vec<Vec<bool>>,
}

impl Piece {
    pub fn new(shape_type: ShapeType) -> Self {
        Self::with_color(shape_type, PaletteColor::random(&mut rand::thread_rng()))
    }

    pub fn with_color(shape_type: ShapeType, color: PaletteColor) -> Self {
        Self {
            shape_type,
            color,
            position: Position { x: 0, y: 0 },
            cells: shape_type.matrix(),
        }
    }

    pub fn new_at(shape_type: ShapeType, color: PaletteColor, x: i16, y: i16) -> Self {
        let mut piece = Self::with_color(shape_type, color);
        piece.position = Position { x, y };
        piece
    }

    pub fn from_name(name: &str) -> Result<Self, PieceError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let shape_type = ShapeType::random(rng);
        Self::with_color(shape_type, PaletteColor::random(rng))
    }

    /// Current rotation of the shape, row-major.
    pub fn matrix(&self) -> &[Vec<bool>] {
        &self.cells
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Rotates 90° clockwise: cell (i, j) of an R×C matrix lands at (j, R-1-i).
    pub fn rotate(&mut self) {
        let rows = self.height();
        let cols = self.width();
        let mut rotated = vec![vec![false; rows]; cols];
        for (i, row) in self.cells.iter().enumerate() {
            for (j, &filled) in row.iter().enumerate() {
                rotated[j][rows - 1 - i] = filled;
            }
        }
        self.cells = rotated;
    }

    pub fn move_left(&mut self) {
        self.position.x -= 1;
    }

    pub fn move_right(&mut self) {
        self.position.x += 1;
    }

    pub fn move_down(&mut self) {
        self.position.y += 1;
    }

    /// Absolute grid coordinates of every occupied cell.
    pub fn occupied_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &filled)| filled)
                    .map(move |(j, _)| (i, j))
            })
            .map(|(i, j)| Position {
                x: self.position.x + j as i16,
                y: self.position.y + i as i16,
            })
            .collect()
    }
}
