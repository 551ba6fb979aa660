/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// A game of xiangqi, with check and outcome detection.
mod game;

/// Pseudo-legal move generation and attack detection.
mod movegen;

/// The [`Move`] type and move lists.
mod moves;

/// Performance testing of move generation.
mod perft;

/// Colors, piece kinds, and pieces.
mod piece;

/// Board representation and FEN parsing.
mod position;

/// A game along with its move history.
mod record;

/// Squares, ranks, and files.
mod square;

pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use record::*;
pub use square::*;
