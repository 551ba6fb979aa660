/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// FEN string for the standard starting position.
pub const FEN_STARTPOS: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1";

/// Positions searched by the `bench` command.
///
/// A mix of openings, middlegames with exposed generals, and sparse endgames.
pub const BENCHMARK_FENS: [&str; 12] = [
    FEN_STARTPOS,
    "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR b - - 1 1",
    "r1bakabnr/9/1cn4c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C1N2/9/RNBAKAB1R w - - 3 3",
    "r1bakab1r/9/1cn3nc1/p1p1p1p1p/9/9/P1P1P1P1P/1CN1C1N2/9/R1BAKAB1R w - - 5 4",
    "2bakab2/9/2n1c1n2/p1p1p1p1p/9/2P6/P3P1P1P/2N1C1N2/9/2BAKAB2 w - - 0 12",
    "3akab2/9/4b4/p3p3p/2p3p2/9/P1P1P1P1P/4B4/4A4/3AK1B2 b - - 0 20",
    "4k4/4a4/4ba3/4c4/9/2C6/9/4B4/4A4/3AK4 w - - 0 30",
    "3k5/4a4/4b4/9/2r6/9/9/4B4/4A4/3AKR3 w - - 0 40",
    "3k5/9/9/9/4P4/9/9/9/9/5K3 w - - 0 50",
    "4k4/9/4P4/9/9/9/9/9/9/3K5 w - - 0 55",
    "3k5/9/9/9/9/9/9/9/4h4/4K4 b - - 0 60",
    "3ak4/4a4/9/9/9/9/9/9/9/R3K4 w - - 0 70",
];

/// Marker trait for how much a search should print while it runs.
///
/// Used as a generic parameter so that disabled logging costs nothing at runtime.
pub trait LogLevel {
    /// Print `info` lines and the final `bestmove`.
    const INFO: bool;

    /// Also print diagnostic `info string` lines.
    const DEBUG: bool;
}

/// Print nothing. Used by `bench` and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogNone;
impl LogLevel for LogNone {
    const INFO: bool = false;
    const DEBUG: bool = false;
}

/// Print standard UCI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogInfo;
impl LogLevel for LogInfo {
    const INFO: bool = true;
    const DEBUG: bool = false;
}

/// Print standard UCI output along with diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogDebug;
impl LogLevel for LogDebug {
    const INFO: bool = true;
    const DEBUG: bool = true;
}
