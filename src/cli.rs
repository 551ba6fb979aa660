/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;
use uci_parser::UciCommand;

use crate::{Difficulty, Square};

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Run a benchmark with the provided parameters.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<u8>,
    },

    /// Change how strongly the engine plays, or display the current difficulty.
    ///
    /// Equivalent to `setoption name Difficulty value <level>`.
    #[command(alias = "level")]
    Difficulty {
        /// easy, medium, or hard (or 1, 2, 3).
        level: Option<Difficulty>,
    },

    /// Print a visual representation of the current board state, followed by the moves played so far.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece will be printed.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    Exit {
        /// If set, the engine will await the completion of any search threads before exiting.
        #[arg(short, long, default_value = "false")]
        cleanup: bool,
    },

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Flips the side-to-move. Equivalent to passing.
    ///
    /// This clears the move history.
    Flip,

    /// Print every move played since the current position was set up.
    History,

    /// Play the provided move, if it is legal.
    #[command(aliases = ["makemove", "mv"])]
    Move { mv_string: String },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be printed using their debug formatter, which displays whether they capture.
        #[arg(short, long, default_value = "false")]
        debug: bool,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are generated piece by piece, from a0 to i9.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Display the current value of the specified option.
    Option {
        name: Vec<String>, // This is a vector in order to support multi-word options
    },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Search the current position at the current difficulty and play the move found.
    #[command(alias = "ai")]
    Play,

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Print whose turn it is, whether they are in check, and how the game ended, if it has.
    Status,

    /// Take back the last move played.
    #[command(alias = "takeback")]
    Undo,

    /// Wrapper over UCI commands sent to the engine.
    #[command(skip)]
    Uci { cmd: UciCommand },

    /// Await the current search, blocking until it completes.
    ///
    /// This is primarily used when executing searches on startup,
    /// to await their results before doing something else.
    Wait,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse the string as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_commands() {
        assert!(matches!("d".parse(), Ok(EngineCommand::Display)));
        assert!(matches!("undo".parse(), Ok(EngineCommand::Undo)));
        assert!(matches!(
            "perft 3".parse(),
            Ok(EngineCommand::Perft { depth: 3 })
        ));
        assert!(matches!(
            "bench --depth 2".parse(),
            Ok(EngineCommand::Bench {
                depth: Some(2),
                pretty: false
            })
        ));
    }

    #[test]
    fn test_parse_arguments() {
        let Ok(EngineCommand::Move { mv_string }) = "move h2e2".parse() else {
            panic!("Failed to parse `move h2e2`");
        };
        assert_eq!(mv_string, "h2e2");

        let Ok(EngineCommand::Moves { square, .. }) = "moves b0".parse() else {
            panic!("Failed to parse `moves b0`");
        };
        assert_eq!(square, Some(Square::from_uci("b0").unwrap()));

        let Ok(EngineCommand::Difficulty { level }) = "difficulty medium".parse() else {
            panic!("Failed to parse `difficulty medium`");
        };
        assert_eq!(level, Some(Difficulty::Medium));

        let Ok(EngineCommand::Difficulty { level }) = "difficulty 1".parse() else {
            panic!("Failed to parse `difficulty 1`");
        };
        assert_eq!(level, Some(Difficulty::Easy));
    }

    #[test]
    fn test_falls_back_to_uci() {
        assert!(matches!(
            "isready".parse(),
            Ok(EngineCommand::Uci {
                cmd: UciCommand::IsReady
            })
        ));
        assert!("definitely not a command".parse::<EngineCommand>().is_err());
    }
}
