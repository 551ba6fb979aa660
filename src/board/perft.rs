/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Game;

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// # Example
/// ```
/// # use pao::{perft, Game};
/// assert_eq!(perft(&Game::default(), 1), 44);
/// ```
#[inline(always)]
pub fn perft(game: &Game, depth: usize) -> u64 {
    if depth == 1 {
        return game.get_legal_moves().len() as u64;
    } else if depth == 0 {
        return 1;
    }

    game.get_legal_moves().into_iter().fold(0, |nodes, mv| {
        nodes + perft(&game.with_move_made(mv), depth - 1)
    })
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each move available at the root node.
///
/// Uses bulk counting. See [`perft`].
#[inline(always)]
pub fn splitperft(game: &Game, depth: usize) -> u64 {
    perft_generic::<true, true>(game, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(game: &Game, depth: usize) -> u64 {
    if BULK && !SPLIT && depth == 1 {
        return game.get_legal_moves().len() as u64;
    } else if depth == 0 {
        return 1;
    }

    game.get_legal_moves().into_iter().fold(0, |nodes, mv| {
        let new_nodes = perft_generic::<BULK, false>(&game.with_move_made(mv), depth - 1);

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes + new_nodes
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_counting_matches_full_expansion() {
        let game = Game::default();
        for depth in 0..=2 {
            assert_eq!(
                perft_generic::<true, false>(&game, depth),
                perft_generic::<false, false>(&game, depth),
                "Mismatch at depth {depth}"
            );
        }
    }

    #[test]
    fn test_finished_game_has_no_children() {
        let game = Game::from_fen("3k4R/R8/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert_eq!(perft(&game, 1), 0);
        assert_eq!(perft(&game, 3), 0);
    }
}
