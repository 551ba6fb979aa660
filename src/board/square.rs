/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use crate::Color;

/// Represents a single intersection on a `9x10` xiangqi board.
///
/// Squares are numbered with least-significant file mapping, so `square = file + rank * 9`.
/// Red sits at the bottom of the board (ranks `0` through `4`) and Black sits at the top:
/// ```text
/// 9| 81 82 83 84 85 86 87 88 89
/// 8| 72 73 74 75 76 77 78 79 80
/// 7| 63 64 65 66 67 68 69 70 71
/// 6| 54 55 56 57 58 59 60 61 62
/// 5| 45 46 47 48 49 50 51 52 53
///  ~~~~~~~~~~~~~ river ~~~~~~~~~~~~
/// 4| 36 37 38 39 40 41 42 43 44
/// 3| 27 28 29 30 31 32 33 34 35
/// 2| 18 19 20 21 22 23 24 25 26
/// 1|  9 10 11 12 13 14 15 16 17
/// 0|  0  1  2  3  4  5  6  7  8
///  +---------------------------
///     a  b  c  d  e  f  g  h  i
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

impl Square {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 89;
    pub const COUNT: usize = File::COUNT * Rank::COUNT;

    /// Returns an iterator over all available squares, starting at `a0` and ending at `i9`.
    ///
    /// # Example
    /// ```
    /// # use pao::{Square, File, Rank};
    /// let mut iter = Square::iter();
    /// assert_eq!(iter.len(), 90);
    /// assert_eq!(iter.next().unwrap(), Square::new(File::A, Rank::ZERO));
    /// assert_eq!(iter.last().unwrap(), Square::new(File::I, Rank::NINE));
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Creates a new [`Square`] from the provided [`File`] and [`Rank`].
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(file.0 + rank.0 * File::COUNT as u8)
    }

    /// Creates a new [`Square`] from the provided index value.
    ///
    /// The provided `index` must be `[0, 89]` or else an error is returned.
    ///
    /// # Example
    /// ```
    /// # use pao::Square;
    /// assert_eq!(Square::from_index(40).unwrap().to_uci(), "e4");
    /// assert!(Square::from_index(90).is_err());
    /// ```
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index > Self::MAX as usize {
            bail!(
                "Invalid index for Square: Must be between [{}, {}]. Got {index}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(index as u8))
    }

    /// Creates a new [`Square`] from the provided index value, without error checking.
    ///
    /// # Panics
    ///
    /// If `index` is greater than `89` and debug assertions are enabled.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT, "Index must be between [0,90)");
        Self(index as u8)
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 % File::COUNT as u8)
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 / File::COUNT as u8)
    }

    /// Obtain the inner value as a `usize`, for indexing.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Mirrors this square across the river, keeping its file.
    ///
    /// # Example
    /// ```
    /// # use pao::Square;
    /// assert_eq!(Square::from_uci("e0").unwrap().flipped_rank(), Square::from_uci("e9").unwrap());
    /// ```
    #[inline(always)]
    pub const fn flipped_rank(self) -> Self {
        Self::new(self.file(), self.rank().flipped())
    }

    /// If `color` is Black, mirrors this square across the river. Otherwise, returns `self`.
    ///
    /// Useful for tables written from Red's point of view.
    #[inline(always)]
    pub const fn rank_relative_to(self, color: Color) -> Self {
        match color {
            Color::Red => self,
            Color::Black => self.flipped_rank(),
        }
    }

    /// Attempt to offset this [`Square`] by the file and rank offsets.
    ///
    /// Returns [`None`] if the result would leave the board.
    ///
    /// # Example
    /// ```
    /// # use pao::Square;
    /// let e4 = Square::from_uci("e4").unwrap();
    /// assert_eq!(e4.offset(1, 2), Some(Square::from_uci("f6").unwrap()));
    /// assert_eq!(e4.offset(-5, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let Some(file) = self.file().offset(file_delta) else {
            return None;
        };

        let Some(rank) = self.rank().offset(rank_delta) else {
            return None;
        };

        Some(Self::new(file, rank))
    }

    /// Moves this square `n` ranks towards the opponent of `color`, if possible.
    ///
    /// # Example
    /// ```
    /// # use pao::{Color, Square};
    /// let c3 = Square::from_uci("c3").unwrap();
    /// assert_eq!(c3.forward_by(Color::Red, 1), Some(Square::from_uci("c4").unwrap()));
    /// assert_eq!(c3.forward_by(Color::Black, 1), Some(Square::from_uci("c2").unwrap()));
    /// ```
    #[inline(always)]
    pub const fn forward_by(&self, color: Color, n: i8) -> Option<Self> {
        self.offset(0, n * color.negation_multiplier())
    }

    /// Returns `true` if this square lies inside the palace of `color`.
    ///
    /// Both palaces span files `d` through `f`. Red's covers ranks `0` through `2`, Black's ranks `7` through `9`.
    ///
    /// # Example
    /// ```
    /// # use pao::{Color, Square};
    /// assert!(Square::from_uci("e1").unwrap().is_in_palace(Color::Red));
    /// assert!(!Square::from_uci("c1").unwrap().is_in_palace(Color::Red));
    /// assert!(Square::from_uci("d9").unwrap().is_in_palace(Color::Black));
    /// ```
    #[inline(always)]
    pub const fn is_in_palace(&self, color: Color) -> bool {
        let file = self.file().0;
        let rank = self.rank().relative_to(color).0;
        file >= File::D.0 && file <= File::F.0 && rank <= Rank::TWO.0
    }

    /// Returns `true` if this square lies on `color`'s side of the river.
    #[inline(always)]
    pub const fn is_on_side_of(&self, color: Color) -> bool {
        self.rank().relative_to(color).0 <= Rank::FOUR.0
    }

    /// Returns `true` if a piece of `color` standing here has crossed the river.
    #[inline(always)]
    pub const fn has_crossed_river(&self, color: Color) -> bool {
        !self.is_on_side_of(color)
    }

    /// Creates a [`Square`] from a string in ICCS notation, such as `e4`.
    ///
    /// # Example
    /// ```
    /// # use pao::{File, Rank, Square};
    /// let h2 = Square::from_uci("h2");
    /// assert_eq!(h2.unwrap(), Square::new(File::H, Rank::TWO));
    ///
    /// assert!(Square::from_uci("j0").is_err());
    /// assert!(Square::from_uci("a10").is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid Square string: String must contain exactly 2 characters. Got {square:?}")
        };

        Ok(Self::new(File::from_char(file)?, Rank::from_char(rank)?))
    }

    /// Converts this [`Square`] to a string in ICCS notation.
    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    /// Wrapper for [`Square::from_uci`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_uci(value)
    }
}

impl TryFrom<usize> for Square {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    /// A [`Square`] can be used to index into an array of 90 elements.
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_uci().fmt(f)
    }
}

impl fmt::Debug for Square {
    /// Displays the ICCS notation as well as the internal decimal value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_uci(), self.0)
    }
}

/// Represents one of ten ranks on a xiangqi board, counted upwards from Red's back rank.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

impl Rank {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);
    pub const FOUR: Self = Self(4);
    pub const FIVE: Self = Self(5);
    pub const SIX: Self = Self(6);
    pub const SEVEN: Self = Self(7);
    pub const EIGHT: Self = Self(8);
    pub const NINE: Self = Self(9);

    pub const MIN: u8 = 0;
    pub const MAX: u8 = 9;
    pub const COUNT: usize = 10;

    /// Returns an iterator over all ranks, in ascending order.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Construct a new [`Rank`] from the provided value.
    #[inline(always)]
    pub fn new(rank: u8) -> Result<Self> {
        if rank > Self::MAX {
            bail!(
                "Invalid int for Rank: Must be between [{}, {}]. Got {rank}",
                Self::MIN,
                Self::MAX
            );
        }

        Ok(Self(rank))
    }

    #[inline(always)]
    pub fn from_char(rank: char) -> Result<Self> {
        let Some(rank_int) = rank.to_digit(10) else {
            bail!("Invalid char for Rank: Must be between [0, 9]. Got {rank:?}");
        };

        Self::new(rank_int as u8)
    }

    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'0') as char
    }

    /// Offset this [`Rank`] by `delta`, returning [`None`] if that leaves the board.
    #[inline(always)]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        let rank = self.0 as i8 + delta;
        if rank < Self::MIN as i8 || rank > Self::MAX as i8 {
            None
        } else {
            Some(Self(rank as u8))
        }
    }

    /// Mirrors this rank across the river.
    #[inline(always)]
    pub const fn flipped(self) -> Self {
        Self(Self::MAX - self.0)
    }

    /// Returns this rank as counted from `color`'s back rank.
    #[inline(always)]
    pub const fn relative_to(self, color: Color) -> Self {
        match color {
            Color::Red => self,
            Color::Black => self.flipped(),
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::from_char(value)
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

/// Represents one of nine files on a xiangqi board, lettered `a` through `i` from Red's left.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);
    pub const I: Self = Self(8);

    pub const MIN: u8 = 0;
    pub const MAX: u8 = 8;
    pub const COUNT: usize = 9;

    /// Returns an iterator over all files, from `a` to `i`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Construct a new [`File`] from the provided value.
    #[inline(always)]
    pub fn new(file: u8) -> Result<Self> {
        if file > Self::MAX {
            bail!(
                "Invalid int for File: Must be between [{}, {}]. Got {file}",
                Self::MIN,
                Self::MAX
            );
        }

        Ok(Self(file))
    }

    #[inline(always)]
    pub fn from_char(file: char) -> Result<Self> {
        if !file.is_ascii_alphabetic() {
            bail!("Invalid char for File: Must be between [a, i]. Got {file:?}");
        }

        // Subtract the ASCII value for `a` to zero the number
        let file_int = file.to_ascii_lowercase() as u8 - b'a';

        if file_int > Self::MAX {
            bail!("Invalid char for File: Must be between [a, i]. Got {file:?}");
        }

        Ok(Self(file_int))
    }

    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'a') as char
    }

    /// Offset this [`File`] by `delta`, returning [`None`] if that leaves the board.
    #[inline(always)]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        let file = self.0 as i8 + delta;
        if file < Self::MIN as i8 || file > Self::MAX as i8 {
            None
        } else {
            Some(Self(file as u8))
        }
    }

    /// Returns `true` if this file is one of the two outermost files (`a` or `i`).
    #[inline(always)]
    pub const fn is_edge(&self) -> bool {
        self.0 == Self::MIN || self.0 == Self::MAX
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::from_char(value)
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squares() {
        // The four corners
        assert_eq!(Square::new(File::A, Rank::ZERO).to_string(), "a0");
        assert_eq!(Square::new(File::I, Rank::ZERO).to_string(), "i0");
        assert_eq!(Square::new(File::A, Rank::NINE).to_string(), "a9");
        assert_eq!(Square::new(File::I, Rank::NINE).to_string(), "i9");

        // And the Red general's home
        let e0 = Square::new(File::E, Rank::ZERO);
        assert_eq!(e0.index(), 4);
        assert_eq!(e0.file(), File::E);
        assert_eq!(e0.rank(), Rank::ZERO);
    }

    #[test]
    fn test_parsing() {
        assert_eq!(Rank::try_from('0').unwrap(), Rank::ZERO);
        assert_eq!(Rank::try_from('9').unwrap(), Rank::NINE);
        assert_eq!(File::try_from('a').unwrap(), File::A);
        assert_eq!(File::try_from('I').unwrap(), File::I);

        assert!(File::try_from('j').is_err());
        assert!(File::try_from('3').is_err());
        assert!(Rank::try_from('x').is_err());
        assert!(Rank::try_from(10u8).is_err());

        assert_eq!(Square::try_from("e4").unwrap().index(), 40);
        assert_eq!(Square::try_from(89usize).unwrap().to_uci(), "i9");

        assert!(Square::try_from("e").is_err());
        assert!(Square::try_from("e10").is_err());
        assert!(Square::try_from("").is_err());
        assert!(Square::try_from(90usize).is_err());
    }

    #[test]
    fn test_offsets_stay_on_board() {
        let a0 = Square::new(File::A, Rank::ZERO);
        assert_eq!(a0.offset(-1, 0), None);
        assert_eq!(a0.offset(0, -1), None);
        assert_eq!(a0.offset(8, 9), Some(Square::new(File::I, Rank::NINE)));
        assert_eq!(a0.offset(9, 0), None);

        let i9 = Square::new(File::I, Rank::NINE);
        assert_eq!(i9.forward_by(Color::Red, 1), None);
        assert_eq!(
            i9.forward_by(Color::Black, 1),
            Some(Square::new(File::I, Rank::EIGHT))
        );
    }

    #[test]
    fn test_palaces() {
        let red_palace = Square::iter()
            .filter(|sq| sq.is_in_palace(Color::Red))
            .collect::<Vec<_>>();
        assert_eq!(red_palace.len(), 9);
        assert!(red_palace
            .iter()
            .all(|sq| sq.rank() <= Rank::TWO && sq.file() >= File::D && sq.file() <= File::F));

        let black_palace = Square::iter()
            .filter(|sq| sq.is_in_palace(Color::Black))
            .collect::<Vec<_>>();
        assert_eq!(black_palace.len(), 9);
        assert!(black_palace.iter().all(|sq| sq.rank() >= Rank::SEVEN));
    }

    #[test]
    fn test_river() {
        for sq in Square::iter() {
            assert_ne!(sq.is_on_side_of(Color::Red), sq.is_on_side_of(Color::Black));
            assert_eq!(sq.has_crossed_river(Color::Red), sq.rank() >= Rank::FIVE);
        }
    }

    #[test]
    fn test_indexing() {
        let mut board = [0; Square::COUNT];
        board[Square::new(File::D, Rank::FIVE)] = u8::MAX;
        assert_eq!(board[48], u8::MAX);
    }
}
