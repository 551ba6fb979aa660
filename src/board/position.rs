/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::{Color, File, Move, Piece, PieceKind, Rank, Square};

/// Back rank of both sides, from file `a` to file `i`.
const BACK_RANK: [PieceKind; File::COUNT] = [
    PieceKind::Chariot,
    PieceKind::Horse,
    PieceKind::Elephant,
    PieceKind::Advisor,
    PieceKind::General,
    PieceKind::Advisor,
    PieceKind::Elephant,
    PieceKind::Horse,
    PieceKind::Chariot,
];

/// Represents the current state of the game, including move counters.
///
/// Analogous to a [FEN string](https://www.chessprogramming.org/Forsyth-Edwards_Notation).
///
/// The fields between the side-to-move and the move counters are always `-` in xiangqi,
/// and are only kept so that FENs from other tools can be parsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Placements of all live pieces.
    board: Board,

    /// The color of the player whose turn it is to move.
    side_to_move: Color,

    /// Number of plies since the last capture. Used for reporting only.
    halfmove: u16,

    /// Number of full moves. Starts at 1 and increases after Black moves.
    fullmove: u16,
}

impl Position {
    /// Creates a new, empty [`Position`] with Red to move.
    ///
    /// For the standard starting position, use [`Position::default`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            board: Board::new(),
            side_to_move: Color::Red,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// Only the placements are required. A missing side-to-move defaults to Red.
    ///
    /// # Example
    /// ```
    /// # use pao::{Position, FEN_STARTPOS};
    /// let position = Position::from_fen(FEN_STARTPOS).unwrap();
    /// assert_eq!(position, Position::default());
    ///
    /// // Two Red generals
    /// assert!(Position::from_fen("4k4/9/9/9/9/9/9/9/3K5/4K4 w").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut pos = Self::new();
        let mut split = fen.split_ascii_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;
        pos.board = Board::from_fen(placements)?;

        let active_color = split.next().unwrap_or("w");
        let mut chars = active_color.chars();
        pos.side_to_move = match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_uci(c)?,
            _ => bail!("FEN side to move must be a single char. Got {active_color:?}"),
        };

        // The two placeholder fields (`- -`) carry no information
        let _ = split.next();
        let _ = split.next();

        let halfmove = split.next().unwrap_or("0");
        pos.halfmove = halfmove.parse().or(Err(anyhow!(
            "FEN string must have valid halfmove counter. Got {halfmove:?}"
        )))?;

        let fullmove = split.next().unwrap_or("1");
        pos.fullmove = fullmove.parse().or(Err(anyhow!(
            "FEN string must have valid fullmove counter. Got {fullmove:?}"
        )))?;

        Ok(pos)
    }

    /// Generates a FEN string from this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use pao::{Position, FEN_STARTPOS};
    /// assert_eq!(Position::default().to_fen(), FEN_STARTPOS);
    /// ```
    #[inline(always)]
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> u16 {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> u16 {
        self.fullmove
    }

    /// Alias for [`Board::piece_at`].
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    /// Alias for [`Board::general`].
    #[inline(always)]
    pub fn general(&self, color: Color) -> Option<Square> {
        self.board.general(color)
    }

    /// Passes the turn to the other side without moving a piece.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Applies `mv` to this position and passes the turn, returning the piece that was captured, if any.
    ///
    /// No legality checks are performed. If `mv.from()` is empty, only the turn passes.
    pub fn make_move(&mut self, mv: Move) -> Option<Piece> {
        let (from, to) = (mv.from(), mv.to());

        let captured = if let Some(piece) = self.board.take(from) {
            let captured = self.board.take(to);
            self.board.place(piece, to);
            captured
        } else {
            None
        };

        if captured.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove = self.halfmove.saturating_add(1);
        }

        if self.side_to_move.is_black() {
            self.fullmove = self.fullmove.saturating_add(1);
        }

        self.toggle_side_to_move();

        captured
    }

    /// Copy-make analog of [`Position::make_move`].
    #[inline(always)]
    pub fn with_move_made(mut self, mv: Move) -> Self {
        self.make_move(mv);
        self
    }

    /// Reverts `mv`, which must have been the last move made on this position.
    ///
    /// `captured` and `halfmove` are the captured piece and halfmove counter from before the move.
    pub fn unmake_move(&mut self, mv: Move, captured: Option<Piece>, halfmove: u16) {
        let (from, to) = (mv.from(), mv.to());

        if let Some(piece) = self.board.take(to) {
            self.board.place(piece, from);
        }
        if let Some(captured) = captured {
            self.board.place(captured, to);
        }

        self.toggle_side_to_move();
        if self.side_to_move.is_black() {
            self.fullmove = self.fullmove.saturating_sub(1).max(1);
        }
        self.halfmove = halfmove;
    }
}

impl Default for Position {
    /// The standard starting position, with Red to move.
    #[inline(always)]
    fn default() -> Self {
        Self {
            board: Board::default(),
            ..Self::new()
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - - {} {}",
            self.board.to_fen(),
            self.side_to_move,
            self.halfmove,
            self.fullmove
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        writeln!(f)?;
        writeln!(f, "FEN: {self}")?;
        write!(f, "Side to move: {}", self.side_to_move.name())
    }
}

/// The placements of all live pieces, stored as a flat array of 90 optional pieces.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mailbox: [Option<Piece>; Square::COUNT],
}

impl Board {
    /// Creates an empty [`Board`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
        }
    }

    /// Parses the placement field of a FEN string.
    ///
    /// Ranks are listed from Black's back rank (`9`) down to Red's (`0`).
    /// Each side may have at most one general, which must stand inside its palace,
    /// and no more pieces of a kind than a full set holds.
    pub fn from_fen(placements: &str) -> Result<Self> {
        let mut board = Self::new();

        if placements.matches('/').count() != Rank::COUNT - 1 {
            bail!(
                "FEN must have piece placements for all {} ranks. Got {placements:?}",
                Rank::COUNT
            );
        }

        let mut counts = [[0u8; PieceKind::COUNT]; Color::COUNT];

        // Reverse so that Red's pieces are at the "bottom" of the board
        for (rank, placements) in placements.split('/').rev().enumerate() {
            let rank = Rank(rank as u8);
            let mut file = 0;

            for piece_char in placements.chars() {
                if let Some(empty) = piece_char.to_digit(10) {
                    file += empty as u8;
                    if file > File::COUNT as u8 {
                        bail!("Rank {rank} of FEN placements has more than {} files", File::COUNT);
                    }
                    continue;
                }

                let piece = Piece::from_uci(piece_char).map_err(|_| {
                    anyhow!("FEN placements must contain piece chars or digits. Got {piece_char:?}")
                })?;

                if file >= File::COUNT as u8 {
                    bail!("Rank {rank} of FEN placements has more than {} files", File::COUNT);
                }

                let square = Square::new(File(file), rank);
                let (color, kind) = piece.parts();

                counts[color][kind] += 1;
                if counts[color][kind] > kind.max_count() {
                    bail!(
                        "{} cannot have more than {} {}(s)",
                        color.name(),
                        kind.max_count(),
                        kind.name()
                    );
                }

                if piece.is_general() && !square.is_in_palace(color) {
                    bail!("{} general on {square} is outside its palace", color.name());
                }

                board.place(piece, square);
                file += 1;
            }

            if file != File::COUNT as u8 {
                bail!(
                    "Rank {rank} of FEN placements must span exactly {} files. Got {file}",
                    File::COUNT
                );
            }
        }

        Ok(board)
    }

    /// Generates the placement field of a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placements = Vec::with_capacity(Rank::COUNT);

        for rank in Rank::iter().rev() {
            let mut line = String::with_capacity(File::COUNT);
            let mut empty_spaces = 0;

            for file in File::iter() {
                if let Some(piece) = self.piece_at(Square::new(file, rank)) {
                    if empty_spaces != 0 {
                        line += &empty_spaces.to_string();
                        empty_spaces = 0;
                    }
                    line.push(piece.char());
                } else {
                    empty_spaces += 1;
                }
            }

            if empty_spaces != 0 {
                line += &empty_spaces.to_string();
            }

            placements.push(line);
        }

        placements.join("/")
    }

    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    /// Returns `true` if there is a piece at the given [`Square`].
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.mailbox[square.index()].is_some()
    }

    /// Places `piece` on `square`, replacing whatever stood there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.mailbox[square] = Some(piece);
    }

    /// Removes and returns the piece on `square`, if there is one.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.mailbox[square].take()
    }

    /// Iterates over every occupied square and the piece on it.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over the pieces belonging to `color`.
    #[inline(always)]
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter(move |(_, piece)| piece.color() == color)
    }

    /// Locates `color`'s general, if it is still on the board.
    #[inline(always)]
    pub fn general(&self, color: Color) -> Option<Square> {
        let general = Piece::new(color, PieceKind::General);
        Square::iter().find(|&square| self.piece_at(square) == Some(general))
    }

    /// Number of pieces on the board.
    #[inline(always)]
    pub fn population(&self) -> usize {
        self.mailbox.iter().flatten().count()
    }
}

impl Default for Board {
    /// The standard starting placements.
    fn default() -> Self {
        let mut board = Self::new();

        for color in Color::all() {
            let back = Rank::ZERO.relative_to(color);
            let cannons = Rank::TWO.relative_to(color);
            let soldiers = Rank::THREE.relative_to(color);

            for (file, kind) in File::iter().zip(BACK_RANK) {
                board.place(Piece::new(color, kind), Square::new(file, back));
            }

            for file in [File::B, File::H] {
                board.place(
                    Piece::new(color, PieceKind::Cannon),
                    Square::new(file, cannons),
                );
            }

            for file in [File::A, File::C, File::E, File::G, File::I] {
                board.place(
                    Piece::new(color, PieceKind::Soldier),
                    Square::new(file, soldiers),
                );
            }
        }

        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;

            for file in File::iter() {
                let occupant = self
                    .piece_at(Square::new(file, rank))
                    .map(|p| p.char())
                    .unwrap_or('.');
                write!(f, "{occupant} ")?;
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

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    #[test]
    fn test_startpos_fen_round_trip() {
        let position = Position::from_fen(FEN_STARTPOS).unwrap();
        assert_eq!(position.to_fen(), FEN_STARTPOS);
        assert_eq!(position, Position::default());
        assert_eq!(position.board().population(), 32);
    }

    #[test]
    fn test_alternate_side_letter() {
        let fen = "4k4/9/9/9/9/9/9/9/9/4K4 r - - 0 1";
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.side_to_move(), Color::Red);
        assert_eq!(position.to_fen(), "4k4/9/9/9/9/9/9/9/9/4K4 w - - 0 1");
    }

    #[test]
    fn test_invalid_fens() {
        // Too few ranks
        assert!(Position::from_fen("4k4/9/9/9/9/9/9/9/4K4 w").is_err());
        // Rank too long
        assert!(Position::from_fen("4k5/9/9/9/9/9/9/9/9/4K4 w").is_err());
        // Rank too short
        assert!(Position::from_fen("4k3/9/9/9/9/9/9/9/9/4K4 w").is_err());
        // Empty-square counts summing far past the board's width
        let wide = format!("4k4/{}4/9/9/9/9/9/9/9/4K4 w", "9".repeat(29));
        assert!(Position::from_fen(&wide).is_err());
        assert!(Position::from_fen("4k4/55/9/9/9/9/9/9/9/4K4 w").is_err());
        // General outside of the palace
        assert!(Position::from_fen("k8/9/9/9/9/9/9/9/9/4K4 w").is_err());
        // Two Black generals
        assert!(Position::from_fen("3kk4/9/9/9/9/9/9/9/9/4K4 w").is_err());
        // Three chariots
        assert!(Position::from_fen("4k4/9/9/9/9/9/9/9/RRR6/4K4 w").is_err());
        // Bad side to move
        assert!(Position::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 x").is_err());
        // Bad piece letter
        assert!(Position::from_fen("4k4/9/9/9/9/9/9/9/4Q4/4K4 w").is_err());
    }

    #[test]
    fn test_missing_general_is_allowed() {
        let position = Position::from_fen("9/9/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert_eq!(position.general(Color::Black), None);
        assert_eq!(position.general(Color::Red), Square::from_uci("e0").ok());
    }

    #[test]
    fn test_make_and_unmake_move() {
        let original = Position::default();
        let mut position = original;

        // Cannon takes the horse on h9
        let mv = Move::from_uci(&position, "h2h9").unwrap();
        let halfmove = position.halfmove();
        let captured = position.make_move(mv);

        assert_eq!(captured, Some(Piece::from_uci('n').unwrap()));
        assert_eq!(position.side_to_move(), Color::Black);
        assert_eq!(
            position.piece_at(mv.to()),
            Some(Piece::from_uci('C').unwrap())
        );
        assert_eq!(position.piece_at(mv.from()), None);

        position.unmake_move(mv, captured, halfmove);
        assert_eq!(position, original);
    }

    #[test]
    fn test_fullmove_counter() {
        let mut position = Position::default();
        position.make_move(Move::from_uci(&position, "b2e2").unwrap());
        assert_eq!(position.fullmove(), 1);
        position.make_move(Move::from_uci(&position, "b9c7").unwrap());
        assert_eq!(position.fullmove(), 2);
        assert_eq!(position.halfmove(), 2);
    }
}
