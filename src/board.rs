//! Grid geometry and the cell-occupancy matrix.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. `y` grows downward, so row 0 is the top edge.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Squared Euclidean distance. Orders cells exactly like the true
    /// distance without leaving integer arithmetic.
    pub const fn distance_sq(self, other: Vector) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Opaque enemy identifier. Issued in increasing order, never reused
/// within a session.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece-{}", self.0)
    }
}

/// A player seat. Player 2 only exists in duo sessions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "Player1")]
    One,
    #[serde(rename = "Player2")]
    Two,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    /// The stable label written into board cells.
    pub const fn label(self) -> &'static str {
        match self {
            Slot::One => "Player1",
            Slot::Two => "Player2",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content of one board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Player(Slot),
    Piece(PieceId),
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text used in snapshots: empty string, a player label, or a piece id.
    pub fn label(self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Player(slot) => slot.label().to_string(),
            Cell::Piece(id) => id.to_string(),
        }
    }
}

/// The set of non-empty cells, as consumed by the rule table.
pub type Occupied = HashSet<Vector>;

/// Square occupancy matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: i32,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(size: i32) -> Self {
        debug_assert!(size > 0, "board size must be positive");
        let side = usize::try_from(size).unwrap_or(0);
        Self {
            size,
            cells: vec![Cell::Empty; side * side],
        }
    }

    pub const fn size(&self) -> i32 {
        self.size
    }

    fn idx(&self, v: Vector) -> Option<usize> {
        if !is_valid_cell(v, self.size) {
            return None;
        }
        usize::try_from(v.y * self.size + v.x).ok()
    }

    /// Cell content, or `None` when `v` is off the board.
    pub fn get(&self, v: Vector) -> Option<Cell> {
        self.idx(v).map(|i| self.cells[i])
    }

    pub fn set(&mut self, v: Vector, cell: Cell) {
        debug_assert!(is_valid_cell(v, self.size), "write outside board at {v}");
        if let Some(i) = self.idx(v) {
            self.cells[i] = cell;
        }
    }

    /// Clear `from` and write `cell` into `to`. Moving onto the same cell is
    /// a no-op.
    pub fn relocate(&mut self, from: Vector, to: Vector, cell: Cell) {
        if from == to {
            return;
        }
        self.set(from, Cell::Empty);
        self.set(to, cell);
    }

    /// Every non-empty cell, players included.
    pub fn occupied_cells(&self) -> Occupied {
        self.iter()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(v, _)| v)
            .collect()
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Vector, Cell)> + '_ {
        let size = self.size;
        self.cells.iter().enumerate().map(move |(i, &cell)| {
            let i = i32::try_from(i).unwrap_or(i32::MAX);
            (Vector::new(i % size, i / size), cell)
        })
    }

    /// Row-major labels, one inner vector per row.
    pub fn labels(&self) -> Vec<Vec<String>> {
        let side = usize::try_from(self.size).unwrap_or(0);
        self.cells
            .chunks(side.max(1))
            .map(|row| row.iter().map(|c| c.label()).collect())
            .collect()
    }
}

/// True when `v` lies inside a `size`×`size` board.
#[inline]
pub const fn is_valid_cell(v: Vector, size: i32) -> bool {
    v.x >= 0 && v.x < size && v.y >= 0 && v.y < size
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.get(Vector::new(x, y)) {
                    Some(Cell::Player(Slot::One)) => '1',
                    Some(Cell::Player(Slot::Two)) => '2',
                    Some(Cell::Piece(_)) => 'e',
                    Some(Cell::Empty) | None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
