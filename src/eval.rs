/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, File, Game, Psqt, Rank, Score, Square};

/// Encapsulates the logic of scoring a xiangqi position.
///
/// A position is worth the sum of material and positional bonuses of one side's pieces,
/// minus the same sum for the other side.
/// During a negamax search, positions must be evaluated from the side-to-move's perspective.
/// That is, if it is Black's turn, a "good" evaluation for Black will be a positive number.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// The game whose position to evaluate.
    game: &'a Game,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for `game`.
    #[inline(always)]
    pub fn new(game: &'a Game) -> Self {
        Self { game }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// A positive/high number is good for the side-to-move, while a negative number is better for the opponent.
    /// A score of 0 is considered equal.
    ///
    /// # Example
    /// ```
    /// # use pao::{Evaluator, Game, Score};
    /// assert_eq!(Evaluator::new(&Game::default()).eval(), Score::DRAW);
    ///
    /// // Red has an extra chariot
    /// let game = Game::from_fen("3k5/9/9/9/9/9/9/9/9/R3K4 b").unwrap();
    /// assert_eq!(Evaluator::new(&game).eval(), Score(-900));
    /// ```
    #[inline(always)]
    pub fn eval(self) -> Score {
        self.eval_for(self.game.side_to_move())
    }

    /// Evaluate this position from `color`'s perspective.
    pub fn eval_for(&self, color: Color) -> Score {
        self.game
            .board()
            .iter()
            .fold(Score::DRAW, |score, (square, piece)| {
                let value = Psqt::eval(piece, square);
                if piece.color() == color {
                    score + value
                } else {
                    score - value
                }
            })
    }

    /// Fetches the value for the piece on the specified square, if one exists.
    ///
    /// Positive for Red, negative for Black. Only used when printing the evaluator.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<Score> {
        self.game.piece_at(square).map(|piece| {
            Score(Psqt::eval(piece, square)) * piece.color().negation_multiplier() as i32
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.game.side_to_move();

        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-------+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            for file in File::iter() {
                let piece = self.game.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.char()).unwrap_or(' ');
                write!(f, "   {piece_char}   |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            for file in File::iter() {
                let score = match self.value_at(Square::new(file, rank)) {
                    Some(val) if val > Score::DRAW => format!("+{}", val.normalize()),
                    Some(val) => format!("{}", val.normalize()),
                    None => String::new(),
                };
                write!(f, "{score:^7}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-------+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "       {file}")?;
        }

        let score = self.eval_for(color);
        let winning_side = if score > Score::DRAW {
            Some(color)
        } else if score < Score::DRAW {
            Some(color.opponent())
        } else {
            None
        };

        writeln!(f, "\n")?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_balanced() {
        let game = Game::default();
        let eval = Evaluator::new(&game);
        assert_eq!(eval.eval_for(Color::Red), Score::DRAW);
        assert_eq!(eval.eval_for(Color::Black), Score::DRAW);
    }

    #[test]
    fn test_eval_is_symmetric() {
        let fens = [
            "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKAB1R w",
            "3k5/9/9/4P4/9/9/9/9/9/4K4 w",
            "2bak4/4a4/4b4/9/9/2C6/9/9/9/3K5 b",
        ];

        for fen in fens {
            let game = Game::from_fen(fen).unwrap();
            let eval = Evaluator::new(&game);
            assert_eq!(
                eval.eval_for(Color::Red),
                -eval.eval_for(Color::Black),
                "Evaluation of {fen:?} is not zero-sum"
            );
        }
    }

    #[test]
    fn test_crossed_soldier_is_worth_more() {
        // Red soldier in the centre, across the river
        let game = Game::from_fen("3k5/9/9/4P4/9/9/9/9/9/4K4 w").unwrap();
        assert_eq!(Evaluator::new(&game).eval(), Score(140));

        // Same soldier before crossing
        let game = Game::from_fen("3k5/9/9/9/9/9/4P4/9/9/4K4 w").unwrap();
        assert_eq!(Evaluator::new(&game).eval(), Score(110));
    }

    #[test]
    fn test_missing_general_is_decisive() {
        let game = Game::from_fen("9/9/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert_eq!(Evaluator::new(&game).eval(), Score(-10_000));
    }

    #[test]
    fn test_pretty_display() {
        let game = Game::default();
        let display = Evaluator::new(&game).to_string();
        assert!(display.contains("+9"), "Red chariot should display as +9:\n{display}");
        assert!(display.ends_with("Score: 0"));
    }
}
