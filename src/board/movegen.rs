/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Color, Move, MoveList, Piece, PieceKind, Square};

/// Single steps along a file or rank, as `(file, rank)` deltas.
const ORTHOGONALS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Single diagonal steps, as `(file, rank)` deltas.
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Every horse jump, as `(leg, destination)` deltas relative to the horse.
///
/// The leg is the orthogonally adjacent square the horse steps over, which must be empty.
const HORSE_JUMPS: [((i8, i8), (i8, i8)); 8] = [
    ((0, 1), (1, 2)),
    ((0, 1), (-1, 2)),
    ((0, -1), (1, -2)),
    ((0, -1), (-1, -2)),
    ((1, 0), (2, 1)),
    ((1, 0), (2, -1)),
    ((-1, 0), (-2, 1)),
    ((-1, 0), (-2, -1)),
];

/// Generates every pseudo-legal move available to the pieces of `color`.
///
/// Pseudo-legal moves follow each piece's movement rules but may leave the mover's own general in check.
pub fn generate_pseudo_legal(board: &Board, color: Color, moves: &mut MoveList) {
    for (from, piece) in board.pieces(color) {
        generate_pseudo_legal_from(board, from, piece, moves);
    }
}

/// Generates the pseudo-legal moves of `piece`, standing on `from`.
pub fn generate_pseudo_legal_from(board: &Board, from: Square, piece: Piece, moves: &mut MoveList) {
    let color = piece.color();

    match piece.kind() {
        PieceKind::Chariot => {
            for (df, dr) in ORTHOGONALS {
                let mut next = from.offset(df, dr);
                while let Some(to) = next {
                    let blocked = board.has(to);
                    push_unless_friendly(board, from, to, color, moves);
                    if blocked {
                        break;
                    }
                    next = to.offset(df, dr);
                }
            }
        }

        PieceKind::Cannon => {
            for (df, dr) in ORTHOGONALS {
                let mut next = from.offset(df, dr);
                let mut screened = false;

                while let Some(to) = next {
                    match (board.piece_at(to), screened) {
                        // Slide onto empty squares until the screen
                        (None, false) => moves.push(Move::new(from, to)),
                        (Some(_), false) => screened = true,
                        (None, true) => {}
                        // First piece beyond the screen ends the ray
                        (Some(target), true) => {
                            if target.color() != color {
                                moves.push(Move::capture(from, to));
                            }
                            break;
                        }
                    }
                    next = to.offset(df, dr);
                }
            }
        }

        PieceKind::Horse => {
            for ((leg_df, leg_dr), (df, dr)) in HORSE_JUMPS {
                let Some(leg) = from.offset(leg_df, leg_dr) else {
                    continue;
                };
                if board.has(leg) {
                    continue;
                }
                if let Some(to) = from.offset(df, dr) {
                    push_unless_friendly(board, from, to, color, moves);
                }
            }
        }

        PieceKind::Advisor => {
            for (df, dr) in DIAGONALS {
                if let Some(to) = from.offset(df, dr).filter(|to| to.is_in_palace(color)) {
                    push_unless_friendly(board, from, to, color, moves);
                }
            }
        }

        PieceKind::Elephant => {
            for (df, dr) in DIAGONALS {
                let Some(eye) = from.offset(df, dr) else {
                    continue;
                };
                if board.has(eye) {
                    continue;
                }
                if let Some(to) = from
                    .offset(df * 2, dr * 2)
                    .filter(|to| to.is_on_side_of(color))
                {
                    push_unless_friendly(board, from, to, color, moves);
                }
            }
        }

        PieceKind::Soldier => {
            if let Some(to) = from.forward_by(color, 1) {
                push_unless_friendly(board, from, to, color, moves);
            }

            if from.has_crossed_river(color) {
                for df in [-1, 1] {
                    if let Some(to) = from.offset(df, 0) {
                        push_unless_friendly(board, from, to, color, moves);
                    }
                }
            }
        }

        PieceKind::General => {
            for (df, dr) in ORTHOGONALS {
                if let Some(to) = from.offset(df, dr).filter(|to| to.is_in_palace(color)) {
                    push_unless_friendly(board, from, to, color, moves);
                }
            }

            // Flying general: the opposing general is capturable across an open file
            if let Some((to, target)) = first_piece_along(board, from, 0, color.negation_multiplier()) {
                if target == Piece::new(color.opponent(), PieceKind::General) {
                    moves.push(Move::capture(from, to));
                }
            }
        }
    }
}

/// Returns `true` if any piece of `attacker` could capture an enemy piece standing on `target`.
///
/// This ignores whether such a move would expose the attacker's own general, so it never recurses.
/// The flying general only counts when `target` holds the opposing general.
pub fn is_attacked_by(board: &Board, target: Square, attacker: Color) -> bool {
    let is_attacker = |square: Square, kind: PieceKind| {
        board.piece_at(square) == Some(Piece::new(attacker, kind))
    };

    // Chariots, cannons, and generals along files and ranks
    let enemy_general = Piece::new(attacker.opponent(), PieceKind::General);
    for (df, dr) in ORTHOGONALS {
        let Some((screen, first)) = first_piece_along(board, target, df, dr) else {
            continue;
        };

        if first.color() == attacker {
            match first.kind() {
                PieceKind::Chariot => return true,
                PieceKind::General => {
                    let adjacent = target.offset(df, dr) == Some(screen);
                    if adjacent && target.is_in_palace(attacker) {
                        return true;
                    }
                    if df == 0 && board.piece_at(target) == Some(enemy_general) {
                        return true;
                    }
                }
                _ => {}
            }
        }

        if let Some((_, second)) = first_piece_along(board, screen, df, dr) {
            if second == Piece::new(attacker, PieceKind::Cannon) {
                return true;
            }
        }
    }

    // Horses whose leg is free
    for ((leg_df, leg_dr), (df, dr)) in HORSE_JUMPS {
        let Some(horse) = target.offset(-df, -dr) else {
            continue;
        };
        if is_attacker(horse, PieceKind::Horse)
            && horse
                .offset(leg_df, leg_dr)
                .is_some_and(|leg| !board.has(leg))
        {
            return true;
        }
    }

    // Soldiers advancing onto the target, or stepping sideways once across the river
    if target
        .forward_by(attacker, -1)
        .is_some_and(|sq| is_attacker(sq, PieceKind::Soldier))
    {
        return true;
    }
    for df in [-1, 1] {
        if target.offset(df, 0).is_some_and(|sq| {
            sq.has_crossed_river(attacker) && is_attacker(sq, PieceKind::Soldier)
        }) {
            return true;
        }
    }

    // Advisors inside their palace
    if target.is_in_palace(attacker) {
        for (df, dr) in DIAGONALS {
            if target
                .offset(df, dr)
                .is_some_and(|sq| is_attacker(sq, PieceKind::Advisor))
            {
                return true;
            }
        }
    }

    // Elephants on their own side of the river, with a free eye
    if target.is_on_side_of(attacker) {
        for (df, dr) in DIAGONALS {
            let (Some(eye), Some(elephant)) =
                (target.offset(df, dr), target.offset(df * 2, dr * 2))
            else {
                continue;
            };
            if !board.has(eye) && is_attacker(elephant, PieceKind::Elephant) {
                return true;
            }
        }
    }

    false
}

/// Returns `true` if `color`'s general is attacked.
///
/// A side without a general on the board is never in check.
#[inline(always)]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .general(color)
        .is_some_and(|general| is_attacked_by(board, general, color.opponent()))
}

/// Walks from `from` (exclusive) by `(df, dr)` until a piece is found, returning its square and the piece.
#[inline(always)]
fn first_piece_along(board: &Board, from: Square, df: i8, dr: i8) -> Option<(Square, Piece)> {
    let mut next = from.offset(df, dr);
    while let Some(square) = next {
        if let Some(piece) = board.piece_at(square) {
            return Some((square, piece));
        }
        next = square.offset(df, dr);
    }
    None
}

/// Pushes a move from `from` to `to`, flagged as a capture if `to` holds an enemy piece.
///
/// Nothing is pushed if `to` holds a piece of `color`.
#[inline(always)]
fn push_unless_friendly(board: &Board, from: Square, to: Square, color: Color, moves: &mut MoveList) {
    match board.piece_at(to) {
        None => moves.push(Move::new(from, to)),
        Some(target) if target.color() != color => moves.push(Move::capture(from, to)),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn board(fen: &str) -> Board {
        *Position::from_fen(fen).unwrap().board()
    }

    fn destinations(board: &Board, square: &str) -> Vec<String> {
        let from = Square::from_uci(square).unwrap();
        let piece = board.piece_at(from).unwrap();
        let mut moves = MoveList::new();
        generate_pseudo_legal_from(board, from, piece, &mut moves);
        let mut dests = moves.iter().map(|mv| mv.to().to_uci()).collect::<Vec<_>>();
        dests.sort();
        dests
    }

    #[test]
    fn test_chariot_slides_and_captures_first_enemy() {
        let board = board("4k4/9/9/9/4p4/9/9/9/9/R3K4 w");
        let dests = destinations(&board, "a0");
        // Up the a-file and right until blocked by the general
        assert_eq!(
            dests,
            ["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "b0", "c0", "d0"]
        );

        let board = self::board("4k4/9/9/9/p8/9/9/9/9/R3K4 w");
        let dests = destinations(&board, "a0");
        assert!(dests.contains(&String::from("a5")));
        assert!(!dests.contains(&String::from("a6")));
    }

    #[test]
    fn test_cannon_needs_exactly_one_screen() {
        // No screen: no capture
        let board = board("4k4/9/9/9/4r4/9/9/9/9/4K4 w");
        let mut moves = MoveList::new();
        let board_with_cannon = {
            let mut b = board;
            b.place(Piece::from_uci('C').unwrap(), Square::from_uci("a5").unwrap());
            b
        };
        generate_pseudo_legal_from(
            &board_with_cannon,
            Square::from_uci("a5").unwrap(),
            Piece::from_uci('C').unwrap(),
            &mut moves,
        );
        assert!(moves.iter().all(|mv| mv.is_quiet()));
        assert!(!moves.iter().any(|mv| mv.to() == Square::from_uci("e5").unwrap()));

        // One screen: capture
        let board = self::board("4k4/9/9/9/C1P1r4/9/9/9/9/4K4 w");
        let dests = destinations(&board, "a5");
        assert!(dests.contains(&String::from("e5")));
        assert!(!dests.contains(&String::from("d5")));
        assert!(dests.contains(&String::from("b5")));

        // Two screens: no capture
        let board = self::board("4k4/9/9/9/C1PP1r3/9/9/9/9/4K4 w");
        let dests = destinations(&board, "a5");
        assert!(!dests.contains(&String::from("f5")));
        assert!(!dests.contains(&String::from("d5")));
    }

    #[test]
    fn test_horse_leg_blocking() {
        let board = board("4k4/9/9/9/9/9/9/9/4N4/4K4 w");
        let dests = destinations(&board, "e1");
        assert_eq!(dests, ["c0", "c2", "d3", "f3", "g0", "g2"]);

        // Block the upper leg
        let board = self::board("4k4/9/9/9/9/9/9/4P4/4N4/4K4 w");
        let dests = destinations(&board, "e1");
        assert_eq!(dests, ["c0", "c2", "g0", "g2"]);
    }

    #[test]
    fn test_elephant_stays_home_and_respects_eye() {
        let board = board("4k4/9/9/9/9/9/9/9/9/2B1K4 w");
        assert_eq!(destinations(&board, "c0"), ["a2", "e2"]);

        let board = self::board("4k4/9/9/9/9/2B6/9/9/9/4K4 w");
        // c4 may not cross to a6 or e6
        assert_eq!(destinations(&board, "c4"), ["a2", "e2"]);

        let board = self::board("4k4/9/9/9/9/9/9/9/3P5/2B1K4 w");
        assert_eq!(destinations(&board, "c0"), ["a2"]);
    }

    #[test]
    fn test_advisor_and_general_stay_in_palace() {
        let board = board("4k4/9/9/9/4p4/9/9/9/9/3AK4 w");
        assert_eq!(destinations(&board, "d0"), ["e1"]);
        assert_eq!(destinations(&board, "e0"), ["e1", "f0"]);
    }

    #[test]
    fn test_soldier_moves() {
        let board = board("4k4/9/9/9/9/9/4P4/9/9/4K4 w");
        assert_eq!(destinations(&board, "e3"), ["e4"]);

        let board = self::board("4k4/9/9/4P4/9/9/9/9/9/4K4 w");
        assert_eq!(destinations(&board, "e6"), ["d6", "e7", "f6"]);

        let board = self::board("4k4/9/9/9/9/4p4/9/9/9/4K4 b");
        assert_eq!(destinations(&board, "e4"), ["d4", "e3", "f4"]);
    }

    #[test]
    fn test_flying_general() {
        let board = board("4k4/9/9/9/9/9/9/9/9/4K4 w");
        assert!(destinations(&board, "e0").contains(&String::from("e9")));
        assert!(is_in_check(&board, Color::Red));
        assert!(is_in_check(&board, Color::Black));

        let board = self::board("4k4/9/9/9/4P4/9/9/9/9/4K4 w");
        assert!(!destinations(&board, "e0").contains(&String::from("e9")));
        assert!(!is_in_check(&board, Color::Red));
    }

    #[test]
    fn test_no_general_is_never_in_check() {
        let board = board("9/9/9/9/9/9/9/9/9/R3K4 w");
        assert!(!is_in_check(&board, Color::Black));
    }

    /// `is_attacked_by` must agree with whether any pseudo-legal move captures on the square.
    fn assert_attacks_match_movegen(board: &Board) {
        for attacker in Color::all() {
            let mut moves = MoveList::new();
            generate_pseudo_legal(board, attacker, &mut moves);

            for target in Square::iter() {
                if !board.piece_at(target).is_some_and(|p| p.color() != attacker) {
                    continue;
                }

                let by_movegen = moves.iter().any(|mv| mv.to() == target);
                let by_scan = is_attacked_by(board, target, attacker);
                assert_eq!(
                    by_movegen,
                    by_scan,
                    "{} attacks on {target} disagree for {}",
                    attacker.name(),
                    board.to_fen()
                );
            }
        }
    }

    #[test]
    fn test_attack_scan_matches_movegen() {
        for fen in [
            crate::FEN_STARTPOS,
            "4k4/9/9/9/9/9/9/9/9/4K4 w",
            "2bakab2/9/2n1c1n2/p1p1C1p1p/4r4/2P3P2/P3P3P/1C2B1N2/4A4/R1B1KA3 b",
            "3k5/4P4/4a4/9/2c6/9/9/4C4/9/3AK4 w",
            "4ka3/4a4/4b4/3N5/2p6/6R2/4c4/9/3p5/3K1A3 w",
        ] {
            assert_attacks_match_movegen(&board(fen));
        }
    }
}
