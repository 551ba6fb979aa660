/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// Represents the side a player or piece belongs to.
///
/// Red always moves first, and therefore [`Color`] defaults to [`Color::Red`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    Red,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with Red.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::Red, Self::Black]
    }

    #[inline(always)]
    pub const fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    #[inline(always)]
    pub const fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }

    /// Returns `1` for Red and `-1` for Black.
    ///
    /// Red advances towards higher ranks, so this is also the direction of "forward" for each side.
    ///
    /// # Example
    /// ```
    /// # use pao::Color;
    /// assert_eq!(Color::Red.negation_multiplier(), 1);
    /// assert_eq!(Color::Black.negation_multiplier(), -1);
    /// ```
    #[inline(always)]
    pub const fn negation_multiplier(&self) -> i8 {
        match self {
            Self::Red => 1,
            Self::Black => -1,
        }
    }

    /// Returns this [`Color`]'s opposite.
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Parses the side-to-move field of a FEN string.
    ///
    /// Both `w` and `r` denote Red, `b` denotes Black.
    ///
    /// # Example
    /// ```
    /// # use pao::Color;
    /// assert_eq!(Color::from_uci('w').unwrap(), Color::Red);
    /// assert_eq!(Color::from_uci('r').unwrap(), Color::Red);
    /// assert_eq!(Color::from_uci('b').unwrap(), Color::Black);
    /// assert!(Color::from_uci('x').is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(color: char) -> Result<Self> {
        match color {
            'w' | 'W' | 'r' | 'R' => Ok(Self::Red),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Color must be either 'w', 'r', or 'b'. Got {color:?}"),
        }
    }

    /// Red pieces are written in uppercase, Black pieces in lowercase.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        if c.is_ascii_uppercase() {
            Self::Red
        } else {
            Self::Black
        }
    }

    /// The character written in the side-to-move field of a FEN string.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::Red => 'w',
            Self::Black => 'b',
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Black => "Black",
        }
    }
}

impl Neg for Color {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl<T> Index<Color> for [T; Color::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Color> for [T; Color::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents the kind (or "role") that a xiangqi piece can be.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceKind {
    /// Number of piece variants.
    pub const COUNT: usize = 7;

    /// An array of all piece kinds, starting with the General.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::General,
            Self::Advisor,
            Self::Elephant,
            Self::Horse,
            Self::Chariot,
            Self::Cannon,
            Self::Soldier,
        ]
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The most pieces of this kind a single side may have on the board.
    #[inline(always)]
    pub const fn max_count(&self) -> u8 {
        match self {
            Self::General => 1,
            Self::Soldier => 5,
            _ => 2,
        }
    }

    /// Material value of this kind of piece.
    ///
    /// # Example
    /// ```
    /// # use pao::PieceKind;
    /// assert_eq!(PieceKind::Chariot.value(), 900);
    /// assert_eq!(PieceKind::Soldier.value(), 100);
    /// ```
    #[inline(always)]
    pub const fn value(&self) -> i32 {
        match self {
            Self::General => 10_000,
            Self::Advisor => 200,
            Self::Elephant => 200,
            Self::Horse => 400,
            Self::Chariot => 900,
            Self::Cannon => 450,
            Self::Soldier => 100,
        }
    }

    /// Parses a FEN piece letter, ignoring case.
    ///
    /// Both the `b`/`n` letters and the `e`/`h` letters are accepted for the Elephant and Horse.
    #[inline(always)]
    pub fn from_uci(kind: char) -> Result<Self> {
        match kind.to_ascii_lowercase() {
            'k' => Ok(Self::General),
            'a' => Ok(Self::Advisor),
            'b' | 'e' => Ok(Self::Elephant),
            'n' | 'h' => Ok(Self::Horse),
            'r' => Ok(Self::Chariot),
            'c' => Ok(Self::Cannon),
            'p' => Ok(Self::Soldier),
            _ => bail!("Invalid char for PieceKind: Got {kind:?}"),
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Advisor => "advisor",
            Self::Elephant => "elephant",
            Self::Horse => "horse",
            Self::Chariot => "chariot",
            Self::Cannon => "cannon",
            Self::Soldier => "soldier",
        }
    }

    /// Lowercase FEN letter for this kind.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::General => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'b',
            Self::Horse => 'n',
            Self::Chariot => 'r',
            Self::Cannon => 'c',
            Self::Soldier => 'p',
        }
    }
}

impl FromStr for PieceKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_uci(c),
            _ => Self::all()
                .into_iter()
                .find(|kind| kind.name().eq_ignore_ascii_case(s))
                .ok_or_else(|| anyhow::anyhow!("Invalid PieceKind: Got {s:?}")),
        }
    }
}

impl<T> Index<PieceKind> for [T; PieceKind::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: PieceKind) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<PieceKind> for [T; PieceKind::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: PieceKind) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents a xiangqi piece on the board.
///
/// Internally encoded using the following bit pattern:
/// ```text
///     0000 0 000
///       |  |  |
///       |  |  +- Represents the PieceKind.
///       |  +- Represents the Color.
///       +- Unused.
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    pub const RED_GENERAL: Self = Self::new(Color::Red, PieceKind::General);
    pub const BLACK_GENERAL: Self = Self::new(Color::Black, PieceKind::General);

    /// Mask for the color bit.
    const COLOR_MASK: u8 = 0b0000_1000;
    /// Start index of color bit.
    const COLOR_BITS: u8 = 3;

    /// Creates a new [`Piece`] from the given [`Color`] and [`PieceKind`].
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self((color as u8) << Self::COLOR_BITS | kind as u8)
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        if self.0 & Self::COLOR_MASK == 0 {
            Color::Red
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        PieceKind::all()[(self.0 & !Self::COLOR_MASK) as usize]
    }

    #[inline(always)]
    pub const fn is_general(&self) -> bool {
        matches!(self.kind(), PieceKind::General)
    }

    #[inline(always)]
    pub const fn parts(&self) -> (Color, PieceKind) {
        (self.color(), self.kind())
    }

    /// Parses a FEN piece letter: uppercase is Red, lowercase is Black.
    ///
    /// # Example
    /// ```
    /// # use pao::{Color, Piece, PieceKind};
    /// let horse = Piece::from_uci('N').unwrap();
    /// assert_eq!(horse, Piece::new(Color::Red, PieceKind::Horse));
    ///
    /// let cannon = Piece::from_uci('c').unwrap();
    /// assert_eq!(cannon, Piece::new(Color::Black, PieceKind::Cannon));
    /// ```
    #[inline(always)]
    pub fn from_uci(piece: char) -> Result<Self> {
        let kind = PieceKind::from_uci(piece)?;
        Ok(Self::new(Color::from_case(piece), kind))
    }

    /// FEN letter for this piece.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind().char();
        match self.color() {
            Color::Red => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Human-readable name, such as `"Red chariot"`.
    #[inline(always)]
    pub fn name(&self) -> String {
        format!("{} {}", self.color().name(), self.kind().name())
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_uci(c),
            _ => bail!("Piece must be a single FEN letter. Got {s:?}"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_parts_survive_packing() {
        for color in Color::all() {
            for kind in PieceKind::all() {
                let piece = Piece::new(color, kind);
                assert_eq!(piece.parts(), (color, kind), "{piece:?}");
                assert_eq!(Piece::from_uci(piece.char()).unwrap(), piece);
            }
        }
    }

    #[test]
    fn test_alternate_letters() {
        assert_eq!(PieceKind::from_uci('E').unwrap(), PieceKind::Elephant);
        assert_eq!(PieceKind::from_uci('h').unwrap(), PieceKind::Horse);
        assert_eq!("cannon".parse::<PieceKind>().unwrap(), PieceKind::Cannon);
        assert!(PieceKind::from_uci('q').is_err());
        assert!("KK".parse::<Piece>().is_err());
    }

    #[test]
    fn test_opponent() {
        assert_eq!(-Color::Red, Color::Black);
        assert_eq!(Color::Black.opponent(), Color::Red);
    }
}
