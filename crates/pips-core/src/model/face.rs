use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Number of sides on the die.
pub const SIDES: u8 = 6;

/// The up-facing side of a six-sided die.
///
/// Always in `1..=6`; construct with [`Face::new`] or by parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Face(u8);

impl Face {
    pub const ONE: Self = Self(1);

    /// Validate a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`FaceError::OutOfRange`] if `value` is not in `1..=6`.
    pub const fn new(value: u8) -> Result<Self, FaceError> {
        if value >= 1 && value <= SIDES {
            Ok(Self(value))
        } else {
            Err(FaceError::OutOfRange(value))
        }
    }

    /// Draw a uniformly random face.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(1..=SIDES))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Pip positions for this face.
    #[must_use]
    pub const fn pips(self) -> &'static [Pip] {
        pips_for(self.0)
    }

    #[must_use]
    pub const fn tier(self) -> Tier {
        match self.0 {
            5.. => Tier::High,
            3..=4 => Tier::Mid,
            _ => Tier::Low,
        }
    }
}

impl Default for Face {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<Face> for u8 {
    fn from(face: Face) -> Self {
        face.0
    }
}

impl TryFrom<u8> for Face {
    type Error = FaceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Face {
    type Err = FaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u8>()
            .map_err(|_| FaceError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

/// Errors from constructing a [`Face`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaceError {
    #[error("face value {0} is out of range (expected 1-6)")]
    OutOfRange(u8),

    #[error("invalid face value: '{0}'")]
    NotANumber(String),
}

/// Display band of a face value, used to colour history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

/// A named pip position on the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pip {
    TopLeft,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomRight,
}

impl Pip {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Center => "center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// `(row, col)` of this pip on a 3x3 grid.
    #[must_use]
    pub const fn cell(self) -> (usize, usize) {
        match self {
            Self::TopLeft => (0, 0),
            Self::TopRight => (0, 2),
            Self::MiddleLeft => (1, 0),
            Self::Center => (1, 1),
            Self::MiddleRight => (1, 2),
            Self::BottomLeft => (2, 0),
            Self::BottomRight => (2, 2),
        }
    }
}

impl fmt::Display for Pip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ONE: &[Pip] = &[Pip::Center];
const TWO: &[Pip] = &[Pip::TopLeft, Pip::BottomRight];
const THREE: &[Pip] = &[Pip::TopLeft, Pip::Center, Pip::BottomRight];
const FOUR: &[Pip] = &[
    Pip::TopLeft,
    Pip::TopRight,
    Pip::BottomLeft,
    Pip::BottomRight,
];
const FIVE: &[Pip] = &[
    Pip::TopLeft,
    Pip::TopRight,
    Pip::Center,
    Pip::BottomLeft,
    Pip::BottomRight,
];
const SIX: &[Pip] = &[
    Pip::TopLeft,
    Pip::TopRight,
    Pip::MiddleLeft,
    Pip::MiddleRight,
    Pip::BottomLeft,
    Pip::BottomRight,
];

/// Pip layout for a raw face value.
///
/// Values outside `1..=6` have no pips.
#[must_use]
pub const fn pips_for(value: u8) -> &'static [Pip] {
    match value {
        1 => ONE,
        2 => TWO,
        3 => THREE,
        4 => FOUR,
        5 => FIVE,
        6 => SIX,
        _ => &[],
    }
}

/// Glyph drawn for a pip in [`render_grid`].
pub const PIP_GLYPH: char = '●';

/// Render a raw face value as three rows of a 3x3 grid.
///
/// Cells are separated by a single space, so each row is five characters.
#[must_use]
pub fn render_grid(value: u8) -> [String; 3] {
    let mut cells = [[' '; 3]; 3];
    for pip in pips_for(value) {
        let (row, col) = pip.cell();
        cells[row][col] = PIP_GLYPH;
    }
    cells.map(|row| {
        let mut line = String::with_capacity(5 * PIP_GLYPH.len_utf8());
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push(*cell);
        }
        line
    })
}
