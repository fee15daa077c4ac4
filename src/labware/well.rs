use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row letters of a 96-well plate, top to bottom.
pub const ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Number of columns on a 96-well plate.
pub const COLUMNS: u8 = 12;

/// Address of a single well on a 96-well plate (`A1` .. `H12`).
///
/// Ordering is row-major (`A1 < A2 < .. < A12 < B1`), matching the order in
/// which a sample count walks a plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WellName {
    /// Zero-based row index (0 = `A`).
    row: u8,
    /// One-based column number (1..=12).
    column: u8,
}

impl WellName {
    /// Top-left well.
    pub const A1: WellName = WellName { row: 0, column: 1 };

    /// Build a well from a zero-based row index and a one-based column.
    pub fn new(row: u8, column: u8) -> Option<Self> {
        if (row as usize) < ROWS.len() && (1..=COLUMNS).contains(&column) {
            Some(Self { row, column })
        } else {
            None
        }
    }

    /// Row letter (`A`..`H`).
    pub fn row_letter(&self) -> char {
        ROWS[self.row as usize]
    }

    /// Zero-based row index.
    pub fn row(&self) -> u8 {
        self.row
    }

    /// One-based column number.
    pub fn column(&self) -> u8 {
        self.column
    }

    /// Position in row-major order (A1 = 0, H12 = 95).
    pub fn row_major_index(&self) -> usize {
        self.row as usize * COLUMNS as usize + (self.column as usize - 1)
    }

    /// All 96 wells in row-major order.
    pub fn row_major() -> impl Iterator<Item = WellName> {
        (0..ROWS.len() as u8).flat_map(|row| (1..=COLUMNS).map(move |column| WellName { row, column }))
    }

    /// The first `count` wells in row-major order.
    ///
    /// A count of 12 yields `A1..A12`, 30 yields `A1..C6`.
    pub fn first_n(count: usize) -> impl Iterator<Item = WellName> {
        Self::row_major().take(count)
    }

    /// The top well (row `A`) of a plate column, used to address a column
    /// with a multi-channel tool. `index` is zero-based.
    pub fn column_head(index: usize) -> Option<Self> {
        u8::try_from(index + 1).ok().and_then(|column| Self::new(0, column))
    }
}

impl fmt::Display for WellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

impl FromStr for WellName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| "empty well name".to_string())?
            .to_ascii_uppercase();
        let row = ROWS
            .iter()
            .position(|r| *r == letter)
            .ok_or_else(|| format!("invalid well row in '{}'", s))?;
        let column: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| format!("invalid well column in '{}'", s))?;

        WellName::new(row as u8, column).ok_or_else(|| format!("well '{}' is not on a 96-well plate", s))
    }
}

impl TryFrom<String> for WellName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WellName> for String {
    fn from(well: WellName) -> Self {
        well.to_string()
    }
}
