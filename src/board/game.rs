/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{bail, Result};

use super::{
    generate_pseudo_legal, generate_pseudo_legal_from, is_in_check, perft, Color, File, Move,
    MoveList, Piece, Position, Rank, Square,
};

/// How a finished game was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeReason {
    /// The loser was in check with no legal moves.
    Checkmate,

    /// The loser was not in check, but had no legal moves.
    Stalemate,

    /// The loser's general is no longer on the board.
    GeneralCaptured,
}

/// The result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outcome {
    pub winner: Color,
    pub reason: OutcomeReason,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            OutcomeReason::Checkmate => "checkmate",
            OutcomeReason::Stalemate => "stalemate",
            OutcomeReason::GeneralCaptured => "capture of the general",
        };
        write!(f, "{} wins by {reason}", self.winner.name())
    }
}

/// A game of xiangqi.
///
/// This type encapsulates a [`Position`] and caches whether the side-to-move's general is in check.
/// It is the primary type for working with a game, and is suitable for use in engines.
///
/// The basic methods you're probably looking for are [`Game::from_fen`], [`Game::make_move`], and [`Game::get_legal_moves`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Game {
    /// The current [`Position`] of the game.
    position: Position,

    /// Whether the side-to-move's general is attacked.
    in_check: bool,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`].
    #[inline(always)]
    pub fn new(position: Position) -> Self {
        let in_check = is_in_check(position.board(), position.side_to_move());
        Self { position, in_check }
    }

    /// Creates a new [`Game`] from the provided FEN string.
    #[inline(always)]
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Position::from_fen(fen)?))
    }

    /// Copies `self` and returns a [`Game`] after having applied the provided [`Move`].
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// Applies the provided [`Move`], returning the captured piece, if any. No enforcement of legality.
    #[inline(always)]
    pub fn make_move(&mut self, mv: Move) -> Option<Piece> {
        let captured = self.position.make_move(mv);
        self.in_check = is_in_check(self.position.board(), self.position.side_to_move());
        captured
    }

    /// Applies the move if it is legal for the side to move. If it is not legal, returns an `Err` explaining why.
    pub fn make_move_checked(&mut self, mv: Move) -> Result<Option<Piece>> {
        if let Some(outcome) = self.outcome() {
            bail!("Cannot play {mv}: the game is over ({outcome})");
        }

        let Some(piece) = self.piece_at(mv.from()) else {
            bail!("Cannot play {mv}: there is no piece on {}", mv.from());
        };

        if piece.color() != self.side_to_move() {
            bail!(
                "Cannot play {mv}: it is {}'s turn, not {}'s",
                self.side_to_move().name(),
                piece.color().name()
            );
        }

        if !self.is_legal(mv) {
            bail!("Cannot play {mv}: it is not a legal move for the {}", piece.name());
        }

        Ok(self.make_move(mv))
    }

    /// Converts the provided string to a [`Move`] and applies it if it is legal.
    ///
    /// # Example
    /// ```
    /// # use pao::Game;
    /// let mut game = Game::default();
    /// assert!(game.make_move_uci("h2e2").is_ok());
    /// // Red cannot move twice in a row
    /// assert!(game.make_move_uci("a0a1").is_err());
    /// ```
    #[inline(always)]
    pub fn make_move_uci(&mut self, mv_str: &str) -> Result<Option<Piece>> {
        let mv = Move::from_uci(self, mv_str)?;
        self.make_move_checked(mv)
    }

    /// Passes the turn to the other side without moving a piece.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.position.toggle_side_to_move();
        self.in_check = is_in_check(self.position.board(), self.position.side_to_move());
    }

    /// Fetch the internal [`Position`] of this [`Game`].
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Returns `true` if the side-to-move is currently in check.
    #[inline(always)]
    pub const fn is_in_check(&self) -> bool {
        self.in_check
    }

    /// Returns `true` if `color`'s general is currently attacked.
    #[inline(always)]
    pub fn is_side_in_check(&self, color: Color) -> bool {
        is_in_check(self.position.board(), color)
    }

    /// Returns `true` if the side-to-move is in check and has no legal moves.
    ///
    /// # Example
    /// ```
    /// # use pao::Game;
    /// // Not in check, so not checkmate
    /// let game = Game::from_fen("3k5/R8/9/9/9/9/9/9/9/R3K4 b").unwrap();
    /// assert!(!game.is_checkmate());
    ///
    /// // One chariot checks along the back rank, the other covers the rank below
    /// let game = Game::from_fen("3k4R/R8/9/9/9/9/9/9/9/4K4 b").unwrap();
    /// assert!(game.is_checkmate());
    /// ```
    #[inline(always)]
    pub fn is_checkmate(&self) -> bool {
        self.in_check && !self.has_legal_moves()
    }

    /// Returns `true` if the side-to-move is not in check but has no legal moves.
    #[inline(always)]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check && !self.has_legal_moves()
    }

    /// Returns the [`Outcome`] of this game, or [`None`] if it is still being played.
    ///
    /// A side loses when its general has been captured, or when it has no legal moves,
    /// whether it is in check (checkmate) or not (stalemate).
    pub fn outcome(&self) -> Option<Outcome> {
        let stm = self.side_to_move();

        if self.general(stm).is_none() {
            return Some(Outcome {
                winner: stm.opponent(),
                reason: OutcomeReason::GeneralCaptured,
            });
        }

        if self.general(stm.opponent()).is_none() {
            return Some(Outcome {
                winner: stm,
                reason: OutcomeReason::GeneralCaptured,
            });
        }

        if self.has_legal_moves() {
            return None;
        }

        let reason = if self.in_check {
            OutcomeReason::Checkmate
        } else {
            OutcomeReason::Stalemate
        };

        Some(Outcome {
            winner: stm.opponent(),
            reason,
        })
    }

    /// Returns `true` if the game has ended.
    #[inline(always)]
    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Checks if playing the provided [`Move`] is legal on the current position.
    ///
    /// A move is legal if it is pseudo-legal for a piece of the side-to-move
    /// and does not leave that side's general in check.
    pub fn is_legal(&self, mv: Move) -> bool {
        let Some(piece) = self.piece_at(mv.from()) else {
            return false;
        };

        if piece.color() != self.side_to_move() {
            return false;
        }

        let mut moves = MoveList::new();
        generate_pseudo_legal_from(self.position.board(), mv.from(), piece, &mut moves);

        moves.contains(&mv) && self.is_safe(mv)
    }

    /// Generate all legal moves from the current position.
    ///
    /// # Example
    /// ```
    /// # use pao::Game;
    /// let game = Game::default();
    /// assert_eq!(game.get_legal_moves().len(), 44);
    /// ```
    pub fn get_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        generate_pseudo_legal(self.position.board(), self.side_to_move(), &mut moves);
        moves.retain(|mv| self.is_safe(*mv));
        moves
    }

    /// Generate the legal moves of the piece on `square`.
    ///
    /// Empty if `square` is empty or holds a piece that is not the side-to-move's.
    pub fn get_legal_moves_from(&self, square: Square) -> MoveList {
        let mut moves = MoveList::new();

        if let Some(piece) = self
            .piece_at(square)
            .filter(|piece| piece.color() == self.side_to_move())
        {
            generate_pseudo_legal_from(self.position.board(), square, piece, &mut moves);
            moves.retain(|mv| self.is_safe(*mv));
        }

        moves
    }

    /// Returns `true` if the side-to-move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        let board = self.position.board();
        board.pieces(self.side_to_move()).any(|(square, piece)| {
            let mut moves = MoveList::new();
            generate_pseudo_legal_from(board, square, piece, &mut moves);
            moves.into_iter().any(|mv| self.is_safe(mv))
        })
    }

    /// Recursively make all legal moves available until the supplied depth is reached, returning the total number of positions reachable.
    ///
    /// This is just a convenience method.
    /// See [`perft()`] for more.
    #[inline(always)]
    pub fn perft(&self, depth: usize) -> u64 {
        perft(self, depth)
    }

    /// Simulates `mv` and returns `true` if the mover's general is not in check afterwards.
    #[inline(always)]
    fn is_safe(&self, mv: Move) -> bool {
        let color = self.side_to_move();
        let after = self.position.with_move_made(mv);
        !is_in_check(after.board(), color)
    }
}

impl Deref for Game {
    type Target = Position;
    /// A [`Game`] immutably dereferences to a [`Position`], for simplicity.
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    /// Wrapper for [`Game::from_fen`]
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Game {
    /// Standard starting position for xiangqi.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let piece = self.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.char()).unwrap_or('.');
                write!(f, " {piece_char}")?;
            }

            if rank == Rank::NINE {
                write!(f, "        FEN: {}", self.position)?;
            } else if rank == Rank::EIGHT {
                write!(f, "       Turn: {}", self.side_to_move().name())?;
            } else if rank == Rank::SEVEN {
                write!(f, "   In check: {}", self.in_check)?;
            } else if rank == Rank::SIX {
                match self.outcome() {
                    Some(outcome) => write!(f, "     Status: {outcome}")?,
                    None => write!(f, "     Status: in progress")?,
                }
            }
            writeln!(f)?;

            if rank == Rank::FIVE {
                writeln!(f, " |~~~~~~~~~~~~~~~~~~")?;
            }
        }
        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file} ")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}\nIn check: {}", self.position, self.in_check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays a short, deterministic sequence of legal moves, returning every game visited.
    fn playout(fen: &str, plies: usize) -> Vec<Game> {
        let mut game = Game::from_fen(fen).unwrap();
        let mut visited = vec![game];

        for ply in 0..plies {
            let moves = game.get_legal_moves();
            if moves.is_empty() {
                break;
            }
            // Prefer captures so that the board thins out
            let mv = moves
                .iter()
                .copied()
                .find(|mv| mv.is_capture())
                .unwrap_or(moves[(ply * 7) % moves.len()]);
            game.make_move(mv);
            visited.push(game);
        }

        visited
    }

    #[test]
    fn test_legal_moves_never_leave_general_in_check() {
        for game in playout(crate::FEN_STARTPOS, 60) {
            let color = game.side_to_move();
            for mv in game.get_legal_moves() {
                let after = game.with_move_made(mv);
                assert!(
                    !after.is_side_in_check(color),
                    "{mv} leaves {} in check on {}",
                    color.name(),
                    game.to_fen()
                );
            }
        }
    }

    #[test]
    fn test_checkmate_iff_in_check_without_moves() {
        for game in playout(crate::FEN_STARTPOS, 80) {
            assert_eq!(
                game.is_checkmate(),
                game.is_in_check() && game.get_legal_moves().is_empty(),
                "{}",
                game.to_fen()
            );
        }
    }

    #[test]
    fn test_pinned_piece_cannot_expose_flying_general() {
        // The Red chariot on e4 is the only piece between the two generals
        let game = Game::from_fen("4k4/9/9/9/9/4R4/9/9/9/4K4 w").unwrap();
        let moves = game.get_legal_moves_from(Square::from_uci("e4").unwrap());
        assert!(moves.iter().all(|mv| mv.to().file() == File::E));
        assert!(!game.is_legal(Move::from_uci(&game, "e4d4").unwrap()));
    }

    #[test]
    fn test_in_check_must_resolve() {
        // Black chariot on e5 checks the Red general
        let game = Game::from_fen("3k5/9/9/9/4r4/9/9/9/9/4K4 w").unwrap();
        assert!(game.is_in_check());
        let moves = game.get_legal_moves();
        assert!(!moves.is_empty());
        for mv in moves {
            assert!(!game.with_move_made(mv).is_side_in_check(Color::Red));
        }
    }

    #[test]
    fn test_smothered_checkmate() {
        // Horse mate: the Black general is boxed in by its own advisors and the chariot covers e8
        let game = Game::from_fen("3aka3/R8/3N5/9/9/9/9/9/9/3K5 b").unwrap();
        assert!(game.is_in_check());
        assert!(game.is_checkmate());
        assert_eq!(
            game.outcome(),
            Some(Outcome {
                winner: Color::Red,
                reason: OutcomeReason::Checkmate
            })
        );
    }

    #[test]
    fn test_stalemate_loses() {
        // Black general on d9 is not in check, but the chariot on e8 covers both e9 and d8
        let game = Game::from_fen("3k5/4R4/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert!(!game.is_in_check());
        assert!(game.is_stalemate());
        assert_eq!(
            game.outcome(),
            Some(Outcome {
                winner: Color::Red,
                reason: OutcomeReason::Stalemate
            })
        );
    }

    #[test]
    fn test_missing_general_ends_the_game() {
        let game = Game::from_fen("9/9/9/9/9/9/9/9/9/R3K4 b").unwrap();
        assert_eq!(
            game.outcome().map(|o| o.reason),
            Some(OutcomeReason::GeneralCaptured)
        );
        assert_eq!(game.outcome().map(|o| o.winner), Some(Color::Red));
    }

    #[test]
    fn test_wrong_side_cannot_move() {
        let mut game = Game::default();
        assert!(game.make_move_uci("b9c7").is_err());
        assert!(game.make_move_uci("e4e5").is_err());
        assert!(game.make_move_uci("b0c2").is_ok());
        assert!(game.make_move_uci("b9c7").is_ok());
    }
}
