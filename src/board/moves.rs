/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, Result};

use super::{Position, Square};

/// Upper bound on the number of moves available to one side.
///
/// With the standard piece limits, a side has at most 34 chariot moves, 34 cannon moves,
/// 16 horse moves, 15 soldier moves, 8 advisor moves, 8 elephant moves, and 5 general moves.
pub const MAX_NUM_MOVES: usize = 128;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// Represents a move made on a xiangqi board.
///
/// A move is just its two squares plus a flag recording whether the destination was occupied when the move was generated.
///
/// Internally encoded using the following bit pattern:
/// ```text
///     0 0 0000000 0000000
///       |    |       |
///       |    |       +- Source square of the move.
///       |    +- Target square of the move.
///       +- Capture flag.
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    /// Mask for the source ("from") bits.
    const SRC_MASK: u16 = 0b0000_0000_0111_1111;
    /// Mask for the destination ("to") bits.
    const DST_MASK: u16 = 0b0011_1111_1000_0000;
    /// Start index of destination bits.
    const DST_BITS: u16 = 7;
    /// Set if the move lands on an enemy piece.
    const FLAG_CAPTURE: u16 = 1 << 14;

    /// Creates a new quiet [`Move`] between the given [`Square`]s.
    ///
    /// # Example
    /// ```
    /// # use pao::{Move, Square};
    /// let h2e2 = Move::new(Square::from_uci("h2").unwrap(), Square::from_uci("e2").unwrap());
    /// assert_eq!(h2e2.to_string(), "h2e2");
    /// ```
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self((to.0 as u16) << Self::DST_BITS | from.0 as u16)
    }

    /// Creates a new [`Move`] that removes the piece standing on `to`.
    #[inline(always)]
    pub const fn capture(from: Square, to: Square) -> Self {
        Self(Self::new(from, to).0 | Self::FLAG_CAPTURE)
    }

    /// Creates an "illegal" [`Move`], representing moving a piece to and from `a0`.
    #[inline(always)]
    pub const fn illegal() -> Self {
        Self(0)
    }

    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square((self.0 & Self::SRC_MASK) as u8)
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square(((self.0 & Self::DST_MASK) >> Self::DST_BITS) as u8)
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.0 & Self::FLAG_CAPTURE != 0
    }

    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        !self.is_capture()
    }

    /// Creates a [`Move`] from a string in ICCS notation, such as `h2e2`, reading the capture flag from `position`.
    ///
    /// This only checks that a piece stands on the source square.
    /// Whether the move is legal is up to [`crate::Game::is_legal`].
    ///
    /// # Example
    /// ```
    /// # use pao::{Move, Position};
    /// let position = Position::default();
    /// let mv = Move::from_uci(&position, "h2h9").unwrap();
    /// assert!(mv.is_capture());
    ///
    /// assert!(Move::from_uci(&position, "e4e5").is_err());
    /// assert!(Move::from_uci(&position, "e0").is_err());
    /// ```
    pub fn from_uci(position: &Position, uci: &str) -> Result<Self> {
        let from = uci.get(0..2).ok_or(anyhow!(
            "Move str must contain a `from` square. Got {uci:?}"
        ))?;
        let to = uci
            .get(2..)
            .filter(|to| !to.is_empty())
            .ok_or(anyhow!("Move str must contain a `to` square. Got {uci:?}"))?;

        let from = Square::from_uci(from)?;
        let to = Square::from_uci(to)?;

        if position.piece_at(from).is_none() {
            return Err(anyhow!(
                "No piece found at {from} when parsing {uci:?} on position {}",
                position.to_fen()
            ));
        }

        if position.piece_at(to).is_some() {
            Ok(Self::capture(from, to))
        } else {
            Ok(Self::new(from, to))
        }
    }

    /// Converts this [`Move`] to a string in ICCS notation.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.from(), self.to())
    }
}

impl fmt::Display for Move {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())
    }
}

impl fmt::Debug for Move {
    /// Also displays whether this move is a capture.
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_capture() { "capture" } else { "quiet" };
        write!(f, "{self} ({kind})")
    }
}

impl Default for Move {
    /// A "default" move is an illegal move. See [`Move::illegal`]
    #[inline(always)]
    fn default() -> Self {
        Self::illegal()
    }
}

impl<T: AsRef<str>> PartialEq<T> for Move {
    #[inline(always)]
    fn eq(&self, other: &T) -> bool {
        self.to_uci().eq(other.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_parts() {
        let from = Square::from_uci("a0").unwrap();
        let to = Square::from_uci("i9").unwrap();

        let quiet = Move::new(from, to);
        assert_eq!(quiet.from(), from);
        assert_eq!(quiet.to(), to);
        assert!(quiet.is_quiet());

        let capture = Move::capture(from, to);
        assert_eq!(capture.from(), from);
        assert_eq!(capture.to(), to);
        assert!(capture.is_capture());
        assert_ne!(quiet, capture);
    }

    #[test]
    fn test_move_compares_with_strings() {
        let mv = Move::new(Square::from_uci("b0").unwrap(), Square::from_uci("c2").unwrap());
        assert_eq!(mv, "b0c2");
        assert_eq!(format!("{mv:?}"), "b0c2 (quiet)");
    }
}
