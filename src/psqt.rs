/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, File, Piece, PieceKind, Rank, Square};

// Tables are written from Red's point of view, Black's back rank (9) on the first row.
// Material is added in `Psqt::new`.

#[rustfmt::skip]
const GENERAL: Psqt = Psqt::new(PieceKind::General, [
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
]);

#[rustfmt::skip]
const ADVISOR: Psqt = Psqt::new(PieceKind::Advisor, [
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
]);

#[rustfmt::skip]
const ELEPHANT: Psqt = Psqt::new(PieceKind::Elephant, [
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0,
]);

// Centre files, away from both back ranks
#[rustfmt::skip]
const HORSE: Psqt = Psqt::new(PieceKind::Horse, [
    0, 0,  0,  0,  0,  0,  0, 0, 0,
    0, 0,  0,  0,  0,  0,  0, 0, 0,
    0, 0, 20, 20, 20, 20, 20, 0, 0,
    0, 0, 20, 20, 20, 20, 20, 0, 0,
    0, 0, 20, 20, 20, 20, 20, 0, 0,
    0, 0, 20, 20, 20, 20, 20, 0, 0,
    0, 0, 20, 20, 20, 20, 20, 0, 0,
    0, 0, 20, 20, 20, 20, 20, 0, 0,
    0, 0,  0,  0,  0,  0,  0, 0, 0,
    0, 0,  0,  0,  0,  0,  0, 0, 0,
]);

// Off the edge files
#[rustfmt::skip]
const CHARIOT: Psqt = Psqt::new(PieceKind::Chariot, [
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
]);

#[rustfmt::skip]
const CANNON: Psqt = Psqt::new(PieceKind::Cannon, [
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
    0, 15, 15, 15, 15, 15, 15, 15, 0,
]);

// Across the river, and better still in the centre
#[rustfmt::skip]
const SOLDIER: Psqt = Psqt::new(PieceKind::Soldier, [
    30, 30, 40, 40, 40, 40, 40, 30, 30,
    30, 30, 40, 40, 40, 40, 40, 30, 30,
    30, 30, 40, 40, 40, 40, 40, 30, 30,
    30, 30, 40, 40, 40, 40, 40, 30, 30,
    30, 30, 40, 40, 40, 40, 40, 30, 30,
     0,  0, 10, 10, 10, 10, 10,  0,  0,
     0,  0, 10, 10, 10, 10, 10,  0,  0,
     0,  0, 10, 10, 10, 10, 10,  0,  0,
     0,  0, 10, 10, 10, 10, 10,  0,  0,
     0,  0, 10, 10, 10, 10, 10,  0,  0,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
///
/// Each entry holds the material value of the piece plus its positional bonus on that square.
#[derive(Debug)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Fetch the value of `piece` standing on `square`, from the perspective of `piece`'s own side.
    ///
    /// # Example
    /// ```
    /// # use pao::{Piece, Psqt, Square};
    /// let red = Psqt::eval("P".parse().unwrap(), Square::from_uci("e5").unwrap());
    /// let black = Psqt::eval("p".parse().unwrap(), Square::from_uci("e4").unwrap());
    /// assert_eq!(red, 140);
    /// assert_eq!(red, black);
    /// ```
    #[inline(always)]
    pub fn eval(piece: Piece, square: Square) -> i32 {
        Self::get_table_for(piece.kind()).get_relative(square, piece.color())
    }

    /// Fetch the Piece-Square Table for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_table_for<'a>(kind: PieceKind) -> &'a Self {
        match kind {
            PieceKind::General => &GENERAL,
            PieceKind::Advisor => &ADVISOR,
            PieceKind::Elephant => &ELEPHANT,
            PieceKind::Horse => &HORSE,
            PieceKind::Chariot => &CHARIOT,
            PieceKind::Cannon => &CANNON,
            PieceKind::Soldier => &SOLDIER,
        }
    }

    /// Creates a new [`Psqt`] for the provided [`PieceKind`] and array of values.
    const fn new(kind: PieceKind, psqt: [i32; Square::COUNT]) -> Self {
        let mut flipped = psqt;

        let mut i = 0;
        while i < psqt.len() {
            let file = i % File::COUNT;
            let rank = i / File::COUNT;

            // Rows are written top-down, but squares count up from Red's back rank
            let row = Rank::COUNT - 1 - rank;
            flipped[i] = psqt[row * File::COUNT + file] + kind.value();
            i += 1;
        }

        Self(flipped)
    }

    /// Get the value of this PSQT at the provided square.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `color`.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        self.get(square.rank_relative_to(color))
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it in the same way it is written in the code (Red's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Black
        } else {
            Color::Red
        };

        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let value = self.get_relative(Square::new(file, rank), color);
                write!(f, "{value:5} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "------")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file:>5} ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_uci(s).unwrap()
    }

    #[test]
    fn test_eval_is_correct_for_colors() {
        for square in Square::iter() {
            for kind in PieceKind::all() {
                let red = Psqt::eval(Piece::new(Color::Red, kind), square);
                let black = Psqt::eval(
                    Piece::new(Color::Black, kind),
                    square.rank_relative_to(Color::Black),
                );

                assert_eq!(
                    red,
                    black,
                    "{} on {square}: {red} (red) != {black} (black)",
                    kind.name()
                );
            }
        }
    }

    #[test]
    fn test_soldier_bonuses() {
        let soldier = Piece::new(Color::Red, PieceKind::Soldier);

        // Home side, edge file
        assert_eq!(Psqt::eval(soldier, sq("a3")), 100);
        // Home side, centre file
        assert_eq!(Psqt::eval(soldier, sq("e4")), 110);
        // Across the river, edge file
        assert_eq!(Psqt::eval(soldier, sq("i5")), 130);
        // Across the river, centre file
        assert_eq!(Psqt::eval(soldier, sq("g9")), 140);
    }

    #[test]
    fn test_piece_bonuses() {
        let red = |kind| Piece::new(Color::Red, kind);

        assert_eq!(Psqt::eval(red(PieceKind::Chariot), sq("a0")), 900);
        assert_eq!(Psqt::eval(red(PieceKind::Chariot), sq("b0")), 915);
        assert_eq!(Psqt::eval(red(PieceKind::Cannon), sq("h2")), 465);
        assert_eq!(Psqt::eval(red(PieceKind::Cannon), sq("i2")), 450);

        assert_eq!(Psqt::eval(red(PieceKind::Horse), sq("b0")), 400);
        assert_eq!(Psqt::eval(red(PieceKind::Horse), sq("c2")), 420);
        assert_eq!(Psqt::eval(red(PieceKind::Horse), sq("g7")), 420);
        assert_eq!(Psqt::eval(red(PieceKind::Horse), sq("e8")), 400);

        assert_eq!(Psqt::eval(red(PieceKind::General), sq("e0")), 10_000);
        assert_eq!(Psqt::eval(red(PieceKind::Advisor), sq("e1")), 200);
        assert_eq!(Psqt::eval(red(PieceKind::Elephant), sq("e2")), 200);
    }
}
