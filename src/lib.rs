/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Xiangqi rules: squares, pieces, positions, move generation, and game records.
mod board;

/// Commands accepted by the engine, parsed with `clap`.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of xiangqi positions.
mod eval;

/// Piece-square tables.
mod psqt;

/// Scores and mate distances.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Tunable search parameters.
mod tune;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use utils::*;
