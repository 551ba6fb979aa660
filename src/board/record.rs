/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::Result;

use super::{Game, Move, MoveList, Outcome, Piece, Square};

/// A move that was played, with everything needed to take it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    /// The move itself.
    pub mv: Move,

    /// The piece that moved.
    pub piece: Piece,

    /// The piece that was removed from the board, if any.
    pub captured: Option<Piece>,

    /// Whether the move put the opponent in check.
    pub gave_check: bool,

    /// Halfmove counter before the move was made.
    halfmove: u16,
}

impl fmt::Display for MoveRecord {
    /// Displays the move in ICCS notation, suffixed with `+` if it gave check.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mv)?;
        if self.gave_check {
            write!(f, "+")?;
        }
        Ok(())
    }
}

/// A game in progress, along with the history of moves that led to it.
///
/// Every move played through [`GameRecord::play`] is checked for legality,
/// and can be taken back with [`GameRecord::undo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// The game as it stood before any recorded moves.
    start: Game,

    /// The game as it stands now.
    current: Game,

    /// Every move played since `start`, oldest first.
    history: Vec<MoveRecord>,
}

impl GameRecord {
    /// Starts a new record from `game`.
    #[inline(always)]
    pub fn new(game: Game) -> Self {
        Self {
            start: game,
            current: game,
            history: Vec::new(),
        }
    }

    /// Starts a new record from the provided FEN string.
    #[inline(always)]
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Game::from_fen(fen)?))
    }

    /// The game as it stands now.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.current
    }

    /// The game as it stood before any recorded moves.
    #[inline(always)]
    pub const fn start(&self) -> &Game {
        &self.start
    }

    /// All moves played so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// The most recently played move, if any.
    #[inline(always)]
    pub fn last(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Returns `true` if the side to move is in check.
    ///
    /// Mirrors the check flag of the last played move.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.current.is_in_check()
    }

    /// Plays `mv` for the side to move.
    ///
    /// Fails without changing anything if the game is already over or `mv` is not legal.
    ///
    /// # Example
    /// ```
    /// # use pao::{GameRecord, Move};
    /// let mut record = GameRecord::default();
    /// let mv = Move::from_uci(record.game(), "h2e2").unwrap();
    /// let played = record.play(mv).unwrap();
    /// assert_eq!(played.captured, None);
    /// assert_eq!(record.history().len(), 1);
    ///
    /// // It is Black's turn now
    /// let mv = Move::from_uci(record.game(), "b2b9").unwrap();
    /// assert!(record.play(mv).is_err());
    /// ```
    pub fn play(&mut self, mv: Move) -> Result<MoveRecord> {
        let halfmove = self.current.halfmove();
        let mut next = self.current;
        let captured = next.make_move_checked(mv)?;

        // Validated above, so the piece is on the destination now
        let Some(piece) = next.piece_at(mv.to()) else {
            anyhow::bail!("No piece arrived on {} after playing {mv}", mv.to());
        };

        let record = MoveRecord {
            mv,
            piece,
            captured,
            gave_check: next.is_in_check(),
            halfmove,
        };

        self.current = next;
        self.history.push(record);

        Ok(record)
    }

    /// Parses `mv_str` in ICCS notation and plays it. See [`GameRecord::play`].
    #[inline(always)]
    pub fn play_uci(&mut self, mv_str: &str) -> Result<MoveRecord> {
        let mv = Move::from_uci(&self.current, mv_str)?;
        self.play(mv)
    }

    /// Takes back the most recent move, restoring the moved piece, any captured piece, and the turn.
    ///
    /// Returns the record of the move taken back, or [`None`] if no moves have been played.
    ///
    /// # Example
    /// ```
    /// # use pao::GameRecord;
    /// let mut record = GameRecord::default();
    /// let before = *record.game();
    /// record.play_uci("h2h9").unwrap();
    /// assert!(record.undo().is_some());
    /// assert_eq!(*record.game(), before);
    /// assert!(record.undo().is_none());
    /// ```
    pub fn undo(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;

        let mut position = *self.current.position();
        position.unmake_move(record.mv, record.captured, record.halfmove);
        self.current = Game::new(position);

        Some(record)
    }

    /// Returns to the starting position and clears the history.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = self.start;
        self.history.clear();
    }

    /// Alias for [`Game::outcome`] on the current game.
    #[inline(always)]
    pub fn outcome(&self) -> Option<Outcome> {
        self.current.outcome()
    }

    /// Returns `true` if the piece on `square` may be picked up: it belongs to the side to move and the game is not over.
    #[inline(always)]
    pub fn selectable(&self, square: Square) -> bool {
        !self.legal_destinations(square).is_empty()
    }

    /// The legal moves of the piece on `square`.
    ///
    /// Empty if the square is empty, holds an opposing piece, or the game is over.
    pub fn legal_destinations(&self, square: Square) -> MoveList {
        if self.outcome().is_some() {
            return MoveList::new();
        }
        self.current.get_legal_moves_from(square)
    }

    /// Every move played so far, in ICCS notation, separated by spaces.
    pub fn moves_string(&self) -> String {
        self.history
            .iter()
            .map(|record| record.mv.to_uci())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for GameRecord {
    /// A new record from the standard starting position.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Game::default())
    }
}

impl fmt::Display for GameRecord {
    /// Displays the current game followed by the numbered move list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.current)?;

        let mut fullmove = self.start.fullmove();
        let mut color = self.start.side_to_move();
        let mut line = String::new();

        for (i, record) in self.history.iter().enumerate() {
            if color.is_red() || i == 0 {
                if !line.is_empty() {
                    writeln!(f, "{}", line.trim_end())?;
                }
                let dots = if color.is_red() { "." } else { "..." };
                line = format!("{fullmove}{dots} ");
            }

            line += &format!("{record} ");

            if color.is_black() {
                fullmove += 1;
            }
            color = color.opponent();
        }

        if !line.is_empty() {
            write!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PieceKind};

    #[test]
    fn test_play_records_capture_and_check() {
        let mut record = GameRecord::from_fen("3k2r2/9/9/9/9/9/9/9/9/4K1R2 w").unwrap();

        // Chariot takes chariot and lands on the general's rank
        let played = record.play_uci("g0g9").unwrap();
        assert_eq!(played.captured, Some(Piece::new(Color::Black, PieceKind::Chariot)));
        assert_eq!(played.piece, Piece::new(Color::Red, PieceKind::Chariot));
        assert!(played.gave_check);
        assert!(record.is_in_check());
        assert_eq!(played.to_string(), "g0g9+");
    }

    #[test]
    fn test_undo_restores_captured_piece_and_turn() {
        let mut record = GameRecord::default();
        let start = *record.game();

        record.play_uci("h2h9").unwrap();
        let captured = record.last().and_then(|r| r.captured);
        assert_eq!(captured, Some(Piece::new(Color::Black, PieceKind::Horse)));

        record.play_uci("i9h9").unwrap();
        assert_eq!(record.history().len(), 2);

        let undone = record.undo().unwrap();
        assert_eq!(undone.mv, "i9h9");
        assert_eq!(
            record.game().piece_at(Square::from_uci("h9").unwrap()),
            Some(Piece::new(Color::Red, PieceKind::Cannon))
        );
        assert_eq!(record.game().side_to_move(), Color::Black);

        record.undo().unwrap();
        assert_eq!(*record.game(), start);
        assert!(record.undo().is_none());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut record = GameRecord::default();
        record.play_uci("b0c2").unwrap();
        record.play_uci("b9c7").unwrap();
        record.reset();
        assert!(record.history().is_empty());
        assert_eq!(*record.game(), Game::default());
    }

    #[test]
    fn test_no_moves_after_the_game_ends() {
        // Black is mated
        let mut record = GameRecord::from_fen("3k4R/R8/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert!(record.outcome().is_some());
        assert!(record.legal_destinations(Square::from_uci("d9").unwrap()).is_empty());
        assert!(!record.selectable(Square::from_uci("d9").unwrap()));
        assert!(record.play_uci("d9d8").is_err());
    }

    #[test]
    fn test_selecting_opponent_piece_yields_nothing() {
        let record = GameRecord::default();
        assert!(!record.selectable(Square::from_uci("b9").unwrap()));
        assert!(!record.selectable(Square::from_uci("e5").unwrap()));
        assert!(record.selectable(Square::from_uci("b0").unwrap()));
        assert_eq!(record.legal_destinations(Square::from_uci("b0").unwrap()).len(), 2);
    }

    #[test]
    fn test_move_list_display() {
        let mut record = GameRecord::default();
        record.play_uci("h2e2").unwrap();
        record.play_uci("h9g7").unwrap();
        record.play_uci("h0g2").unwrap();
        assert_eq!(record.moves_string(), "h2e2 h9g7 h0g2");
        assert!(record.to_string().ends_with("1. h2e2 h9g7\n2. h0g2"));
    }
}
