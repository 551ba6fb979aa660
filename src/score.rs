/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::UciScore;

use crate::MAX_DEPTH;

/// A numerical representation of the evaluation of a position / move, in hundredths of a soldier.
///
/// A soldier is worth `100`, a chariot `900`.
/// This value is internally capped at [`Self::INF`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest possible score ever achievable.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of mate in the current position.
    pub const MATE: Self = Self(Self::INF.0 - 1);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Lowest possible score for mate.
    ///
    /// This is only obtainable if mate is possible in [`MAX_DEPTH`] moves.
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - MAX_DEPTH as i32);

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub fn is_mate(&self) -> bool {
        self.abs() >= Self::LOWEST_MATE
    }

    /// Converts this [`Score`] into a [`UciScore`],
    /// determining whether it is a centipawns score or a mate score.
    ///
    /// Used when sending the `info score` message.
    #[inline(always)]
    pub fn into_uci(self) -> UciScore {
        if self.is_mate() {
            UciScore::mate(self.moves_to_mate())
        } else {
            UciScore::cp(self.0)
        }
    }

    /// Returns the number of plies (half moves) this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Returns the number of moves (full moves) this score is from mate.
    #[inline(always)]
    pub const fn moves_to_mate(&self) -> i32 {
        let plies = self.plies_to_mate();

        // Winning mates count the move we are about to play
        let relative_to_side = if self.0 > 0 { plies + 1 } else { -plies };

        relative_to_side / 2
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// "Normalizes" a score so that it can be printed as a float.
    ///
    /// A score of `450` (one cannon) normalizes to `4.5`.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl From<Score> for UciScore {
    #[inline(always)]
    fn from(value: Score) -> Self {
        value.into_uci()
    }
}

/// Implements an arithmetic operator (and its assigning form) for `Score` against both `Score` and plain `i32`.
macro_rules! impl_score_ops {
    ($($op:ident::$fn:ident, $op_assign:ident::$fn_assign:ident;)*) => {$(
        impl std::ops::$op for Score {
            type Output = Self;
            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self {
                Self(std::ops::$op::$fn(self.0, rhs.0))
            }
        }

        impl std::ops::$op<i32> for Score {
            type Output = Self;
            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self {
                Self(std::ops::$op::$fn(self.0, rhs))
            }
        }

        impl std::ops::$op_assign for Score {
            #[inline(always)]
            fn $fn_assign(&mut self, rhs: Self) {
                std::ops::$op_assign::$fn_assign(&mut self.0, rhs.0);
            }
        }

        impl std::ops::$op_assign<i32> for Score {
            #[inline(always)]
            fn $fn_assign(&mut self, rhs: i32) {
                std::ops::$op_assign::$fn_assign(&mut self.0, rhs);
            }
        }
    )*};
}

impl_score_ops! {
    Add::add, AddAssign::add_assign;
    Sub::sub, SubAssign::sub_assign;
    Mul::mul, MulAssign::mul_assign;
}

impl std::ops::Neg for Score {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "Score({}, {} plies to mate)", self.0, self.plies_to_mate())
        } else {
            write!(f, "Score({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_distances() {
        // Side to move mates on its next move
        let mate_in_one = Score::MATE - 1;
        assert!(mate_in_one.is_mate());
        assert_eq!(mate_in_one.plies_to_mate(), 1);
        assert_eq!(mate_in_one.moves_to_mate(), 1);

        // Side to move is mated after it moves and the opponent replies
        let mated_in_one = -Score::MATE + 2;
        assert!(mated_in_one.is_mate());
        assert_eq!(mated_in_one.plies_to_mate(), 2);
        assert_eq!(mated_in_one.moves_to_mate(), -1);

        // Already mated
        assert_eq!((-Score::MATE).moves_to_mate(), 0);
    }

    #[test]
    fn test_material_is_never_mate() {
        // Every piece on the board for one side and none for the other
        let all_material = Score(10_000 + 2 * (900 + 450 + 400 + 200 + 200) + 5 * 100);
        assert!(!all_material.is_mate());
        assert!(!(-all_material).is_mate());
        assert_eq!(Score(450).normalize(), 4.5);
    }
}
