/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use pao::{perft, perft_generic, Game, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let position = Game::from_fen(fen).unwrap();
    let res = perft_generic::<false, false>(&position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
}

#[test]
fn test_startpos_perft() {
    test_perft_fen_nodes(1, FEN_STARTPOS, 44);
    test_perft_fen_nodes(2, FEN_STARTPOS, 1_920);
    test_perft_fen_nodes(3, FEN_STARTPOS, 79_666);
}

#[test]
fn test_bulk_counting_agrees() {
    let game = Game::default();
    assert_eq!(perft(&game, 3), 79_666);
}

#[test]
#[ignore = "slow in debug builds"]
fn test_startpos_perft_4() {
    test_perft_fen_nodes(4, FEN_STARTPOS, 3_290_240);
}

#[test]
fn test_generals_may_not_face() {
    // Red's general may not step onto Black's general's file
    test_perft_fen_nodes(1, "3k5/9/9/9/9/9/9/9/9/4K4 w - - 0 1", 2);
}

#[test]
fn test_finished_game_has_no_children() {
    test_perft_fen_nodes(1, "3k4R/R8/9/9/9/9/9/9/9/4K4 b - - 0 1", 0);
    test_perft_fen_nodes(2, "3k5/4R4/9/9/9/9/9/9/9/4K4 b - - 0 1", 0);
}
