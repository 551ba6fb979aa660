/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    marker::PhantomData,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::{bail, Result};
use arrayvec::ArrayVec;
use clap::{builder::PossibleValue, ValueEnum};
use rand::{rngs::StdRng, Rng, SeedableRng};
use uci_parser::{UciInfo, UciResponse, UciSearchOptions};

use crate::{tune, Evaluator, Game, LogLevel, Move, Score, MAX_NUM_MOVES};

/// Maximum depth that can be searched
pub const MAX_DEPTH: u8 = u8::MAX / 2;

/// How strongly the engine plays.
///
/// Only [`Difficulty::Hard`] searches for the best move.
/// The easier levels score every root move with a shallow search and pick one of the best few at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    /// Scores each move one ply deep, then picks among the top 5.
    Easy,

    /// Scores each move two plies deep, then picks among the top 3.
    Medium,

    /// Full alpha-beta search, three plies deep unless told otherwise.
    #[default]
    Hard,
}

impl Difficulty {
    /// All difficulty levels, from easiest to hardest.
    #[inline(always)]
    pub const fn all() -> [Self; 3] {
        [Self::Easy, Self::Medium, Self::Hard]
    }

    /// Depth of the search used by this difficulty when no other limit is given.
    #[inline(always)]
    pub const fn depth(&self) -> u8 {
        match self {
            Self::Easy => tune::easy_depth!(),
            Self::Medium => tune::medium_depth!(),
            Self::Hard => tune::hard_depth!(),
        }
    }

    /// Number of best root moves to choose from at random.
    #[inline(always)]
    pub const fn candidates(&self) -> usize {
        match self {
            Self::Easy => tune::easy_candidates!(),
            Self::Medium => tune::medium_candidates!(),
            Self::Hard => 1,
        }
    }

    /// Numeric level of this difficulty, `1` (easy) through `3` (hard).
    #[inline(always)]
    pub const fn level(&self) -> u8 {
        *self as u8 + 1
    }

    /// Lowercase name of this difficulty.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;
    /// Parses either the name of a difficulty (any case) or its numeric level.
    ///
    /// # Example
    /// ```
    /// # use pao::Difficulty;
    /// assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
    /// assert_eq!("1".parse::<Difficulty>().unwrap(), Difficulty::Easy);
    /// assert!("impossible".parse::<Difficulty>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(Self::Easy),
            "medium" | "2" => Ok(Self::Medium),
            "hard" | "3" => Ok(Self::Hard),
            _ => bail!("Difficulty must be easy, medium, hard, or 1-3. Got {s:?}"),
        }
    }
}

impl ValueEnum for Difficulty {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Easy, Self::Medium, Self::Hard]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let level = match self {
            Self::Easy => "1",
            Self::Medium => "2",
            Self::Hard => "3",
        };
        Some(PossibleValue::new(self.name()).alias(level))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents the best sequence of moves found during a search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalVariation(ArrayVec<Move, { MAX_DEPTH as usize }>);

impl PrincipalVariation {
    /// An empty PV.
    const EMPTY: Self = Self(ArrayVec::new_const());

    /// The moves of this PV, starting from the root.
    #[inline(always)]
    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    /// clears the moves of `self`.
    #[inline(always)]
    fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the contents of `self` with `mv` followed by the contents of `other`.
    #[inline(always)]
    fn extend(&mut self, mv: Move, other: &Self) {
        self.clear();
        self.0.push(mv);
        let room = self.0.remaining_capacity();
        self.0.extend(other.0.iter().copied().take(room));
    }
}

impl Default for PrincipalVariation {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Bounds within an alpha-beta search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchBounds {
    /// Lower bound. We are guaranteed a score that is AT LEAST `alpha`.
    alpha: Score,

    /// Upper bound. Our opponent is guaranteed a score that is AT MOST `beta`.
    beta: Score,
}

impl SearchBounds {
    /// The widest possible window.
    const FULL: Self = Self::new(Score(-Score::INF.0), Score::INF);

    #[inline(always)]
    const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// The window as seen from the opponent's side.
    #[inline(always)]
    fn negated(self) -> Self {
        Self::new(-self.beta, -self.alpha)
    }
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    ///
    /// Always one of the legal moves of the searched position, or [`None`] if it had none.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made.
    pub score: Score,

    /// The depth of the search that produced this result.
    pub depth: u8,

    /// Principal variation during this search.
    pub pv: PrincipalVariation,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
            pv: PrincipalVariation::EMPTY,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: u8,

    /// Node allowance.
    ///
    /// If the search exceeds this many nodes, it will exit as quickly as possible.
    pub max_nodes: u64,

    /// Start time of the search.
    pub starttime: Instant,

    /// Soft limit on search time.
    ///
    /// During iterative deepening, if a search concludes and this timeout is exceeded,
    /// the entire search will exit, since there probably isn't enough time remaining
    /// to conduct a search at a deeper depth.
    pub soft_timeout: Duration,

    /// Hard limit on search time.
    ///
    /// During *any* point in the search, if this limit is exceeded, the search will cancel.
    pub hard_timeout: Duration,

    /// How strongly to play.
    pub difficulty: Difficulty,

    /// Seed for choosing between equally-ranked moves at the easier difficulties.
    pub seed: u64,
}

impl SearchConfig {
    /// Constructs a new [`SearchConfig`] from the provided UCI options and game.
    ///
    /// The [`Game`] is used to determine side to move when computing the soft/hard timeouts.
    /// If no depth, node, or time limit is supplied, the search stops at [`Difficulty::depth`].
    pub fn new(options: UciSearchOptions, game: &Game, difficulty: Difficulty, seed: u64) -> Self {
        let mut config = Self {
            difficulty,
            seed,
            ..Default::default()
        };
        let mut limited = false;

        if let Some(depth) = options.depth {
            config.max_depth = (depth as usize).clamp(1, MAX_DEPTH as usize) as u8;
            limited = true;
        }

        if let Some(nodes) = options.nodes {
            config.max_nodes = nodes as u64;
            limited = true;
        }

        // If `movetime` was supplied, search that long.
        if let Some(movetime) = options.movetime {
            config.hard_timeout = movetime;
            config.soft_timeout = movetime;
            limited = true;
        } else {
            // Red is sent as "white" by UCI front-ends
            let (time, inc) = if game.side_to_move().is_red() {
                (options.wtime, options.winc)
            } else {
                (options.btime, options.binc)
            };

            // Only calculate timeouts if a time was provided
            if let Some(time) = time {
                let inc = inc.unwrap_or(Duration::ZERO) / tune::time_inc_divisor!();

                config.soft_timeout = time / tune::soft_timeout_divisor!() + inc;
                config.hard_timeout = time / tune::hard_timeout_divisor!() + inc;
                limited = true;
            }
        }

        if !limited {
            config.max_depth = difficulty.depth();
        }

        config
    }
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] will permit an "infinite" search at [`Difficulty::Hard`].
    ///
    /// The word "infinite" is quoted here because the actual defaults are the `::MAX` values for each field.
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_nodes: u64::MAX,
            starttime: Instant::now(),
            soft_timeout: Duration::MAX,
            hard_timeout: Duration::MAX,
            difficulty: Difficulty::default(),
            seed: 0,
        }
    }
}

/// Executes a search on a game.
///
/// The `Log` parameter decides how much UCI output is printed while searching.
pub struct Search<Log> {
    /// Number of nodes searched so far.
    nodes: u64,

    /// An atomic flag to determine if the search should be cancelled at any time.
    ///
    /// If this is ever `false`, the search must exit as soon as possible.
    is_searching: Arc<AtomicBool>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Source of randomness for the easier difficulties.
    rng: StdRng,

    /// Marker for the level of logging to print.
    log: PhantomData<Log>,
}

impl<Log: LogLevel> Search<Log> {
    /// Construct a new [`Search`] instance to execute.
    #[inline(always)]
    pub fn new(is_searching: Arc<AtomicBool>, config: SearchConfig) -> Self {
        Self {
            nodes: 0,
            is_searching,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            log: PhantomData,
        }
    }

    /// Start the search on the supplied [`Game`], returning a [`SearchResult`].
    ///
    /// This is the entrypoint of the search. It prints UCI info while searching,
    /// and concludes by sending the `bestmove` message.
    pub fn start(mut self, game: &Game) -> SearchResult {
        if Log::DEBUG {
            self.send_string(format!(
                "Starting {} search on {:?}",
                self.config.difficulty,
                game.to_fen()
            ));

            let soft = self.config.soft_timeout.as_millis();
            let hard = self.config.hard_timeout.as_millis();
            let nodes = self.config.max_nodes;
            let depth = self.config.max_depth;

            if soft < Duration::MAX.as_millis() {
                self.send_string(format!("Soft timeout := {soft}ms"));
            }
            if hard < Duration::MAX.as_millis() {
                self.send_string(format!("Hard timeout := {hard}ms"));
            }
            if nodes < u64::MAX {
                self.send_string(format!("Max nodes := {nodes} nodes"));
            }
            if depth < MAX_DEPTH {
                self.send_string(format!("Max depth := {depth}"));
            }
        }

        let res = match self.config.difficulty {
            Difficulty::Hard => self.iterative_deepening(game),
            Difficulty::Medium | Difficulty::Easy => self.pick_among_best(game),
        };

        // Search has ended; send bestmove
        if Log::INFO {
            self.send_response(UciResponse::BestMove {
                bestmove: res.bestmove,
                ponder: None,
            });
        }

        // Search has concluded, alert other thread(s) that we are no longer searching
        self.is_searching.store(false, Ordering::Relaxed);

        res
    }

    /// Sends a [`UciResponse`] to `stdout`.
    #[inline(always)]
    fn send_response<T: fmt::Display>(&self, response: UciResponse<T>) {
        println!("{response}");
    }

    /// Sends a [`UciInfo`] to `stdout`.
    #[inline(always)]
    fn send_info(&self, info: UciInfo) {
        self.send_response(UciResponse::<String>::info(info));
    }

    /// Sends UCI info about the conclusion of a search iteration.
    #[inline(always)]
    fn send_end_of_search_info(&self, result: &SearchResult) {
        let elapsed = self.config.starttime.elapsed();

        self.send_info(
            UciInfo::new()
                .depth(result.depth)
                .nodes(self.nodes)
                .score(result.score)
                .nps((self.nodes as f32 / elapsed.as_secs_f32()).trunc())
                .time(elapsed.as_millis())
                .pv(result.pv.moves().iter().map(|mv| mv.to_string())),
        );
    }

    /// Helper to send a [`UciInfo`] containing only a `string` message to `stdout`.
    #[inline(always)]
    fn send_string<T: fmt::Display>(&self, string: T) {
        self.send_response(UciResponse::info_string(string));
    }

    /// Returns `true` if any limit of the search has been exceeded or the search was stopped externally.
    #[inline(always)]
    fn search_cancelled(&self) -> bool {
        self.config.starttime.elapsed() >= self.config.hard_timeout
            || !self.is_searching.load(Ordering::Relaxed)
            || self.nodes >= self.config.max_nodes
    }

    /// The result for a position where the side to move cannot play: a loss.
    #[inline(always)]
    fn lost_result(&self) -> SearchResult {
        SearchResult {
            nodes: self.nodes,
            score: -Score::MATE,
            ..Default::default()
        }
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) (ID) on the Search's position.
    ///
    /// Searches at depth 1, then 2, and so on, until the maximum depth is reached or the soft timeout passes.
    /// If an iteration is cancelled partway, the result of the last completed iteration is returned.
    fn iterative_deepening(&mut self, game: &Game) -> SearchResult {
        let moves = game.get_legal_moves();
        if moves.is_empty() || game.general(game.side_to_move()).is_none() {
            return self.lost_result();
        }

        // Initialize `bestmove` to the first move available
        let mut result = SearchResult {
            bestmove: moves.first().copied(),
            ..Default::default()
        };

        let mut depth = 1;
        while self.config.starttime.elapsed() < self.config.soft_timeout
            && self.is_searching.load(Ordering::Relaxed)
            && depth <= self.config.max_depth
        {
            let mut pv = PrincipalVariation::default();
            let score = self.negamax(game, depth, 0, SearchBounds::FULL, &mut pv);

            // A cancelled iteration cannot be trusted, so fall back to the previous one
            if self.search_cancelled() {
                if Log::DEBUG {
                    self.send_string(format!(
                        "Search cancelled during depth {depth}. Falling back to depth {}",
                        result.depth
                    ));
                }
                break;
            }

            result.score = score;
            result.depth = depth;
            if let Some(&mv) = pv.0.first() {
                result.bestmove = Some(mv);
            }
            result.pv = pv;

            if Log::INFO {
                self.send_end_of_search_info(&result);
            }

            depth += 1;
        }

        result.nodes = self.nodes;
        result
    }

    /// Scores every root move with a shallow search, then picks one of the best few at random.
    ///
    /// Ties keep the order in which moves were generated.
    fn pick_among_best(&mut self, game: &Game) -> SearchResult {
        let moves = game.get_legal_moves();
        if moves.is_empty() || game.general(game.side_to_move()).is_none() {
            return self.lost_result();
        }

        let difficulty = self.config.difficulty;
        let depth = difficulty.depth().min(self.config.max_depth).max(1);

        let mut scored = ArrayVec::<(Move, Score), MAX_NUM_MOVES>::new();
        for mv in moves.iter().copied() {
            let mut pv = PrincipalVariation::default();
            let child = game.with_move_made(mv);
            let score = -self.negamax(&child, depth - 1, 1, SearchBounds::FULL, &mut pv);

            if self.search_cancelled() {
                break;
            }
            scored.push((mv, score));
        }

        // Cancelled before a single move was scored; any legal move will do
        if scored.is_empty() {
            return SearchResult {
                nodes: self.nodes,
                bestmove: moves.first().copied(),
                ..Default::default()
            };
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        let candidates = difficulty.candidates().min(scored.len());
        let (mv, score) = scored[self.rng.random_range(0..candidates)];

        let mut pv = PrincipalVariation::default();
        pv.0.push(mv);

        let result = SearchResult {
            nodes: self.nodes,
            bestmove: Some(mv),
            score,
            depth,
            pv,
        };

        if Log::DEBUG {
            let top = scored[..candidates]
                .iter()
                .map(|(mv, score)| format!("{mv} ({score})"))
                .collect::<Vec<_>>()
                .join(", ");
            self.send_string(format!("Picked {mv} from {top}"));
        }

        if Log::INFO {
            self.send_end_of_search_info(&result);
        }

        result
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm with alpha-beta pruning in a fail-soft framework.
    /// A side with no legal moves, or no general, has lost, and earlier losses score worse.
    fn negamax(
        &mut self,
        game: &Game,
        depth: u8,
        ply: i32,
        mut bounds: SearchBounds,
        pv: &mut PrincipalVariation,
    ) -> Score {
        pv.clear();
        self.nodes += 1;

        // The result will be discarded anyway
        if ply > 0 && self.search_cancelled() {
            return Score::DRAW;
        }

        if game.general(game.side_to_move()).is_none() {
            return -Score::MATE + ply;
        }

        if depth == 0 {
            return Evaluator::new(game).eval();
        }

        let moves = game.get_legal_moves();

        // Checkmate and stalemate are both losses
        if moves.is_empty() {
            return -Score::MATE + ply;
        }

        let mut local_pv = PrincipalVariation::default();
        let mut best = -Score::INF;

        for mv in moves {
            let new_game = game.with_move_made(mv);
            let score = -self.negamax(&new_game, depth - 1, ply + 1, bounds.negated(), &mut local_pv);

            if score > best {
                best = score;
            }

            if score > bounds.alpha {
                bounds.alpha = score;
                pv.extend(mv, &local_pv);
            }

            if score >= bounds.beta {
                break;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogNone;

    fn run_search(fen: &str, config: SearchConfig) -> SearchResult {
        let is_searching = Arc::new(AtomicBool::new(true));
        let game = Game::from_fen(fen).unwrap();
        Search::<LogNone>::new(is_searching, config).start(&game)
    }

    fn hard(depth: u8) -> SearchConfig {
        SearchConfig {
            max_depth: depth,
            ..Default::default()
        }
    }

    #[test]
    fn test_red_mate_in_1() {
        let fen = "3k5/R8/9/9/9/9/9/9/9/4K3R w";
        let res = run_search(fen, hard(2));

        assert!(res.score.is_mate(), "Expected mate on {fen:?}. Result: {res:#?}");
        assert_eq!(res.score.moves_to_mate(), 1);

        let game = Game::from_fen(fen).unwrap();
        let after = game.with_move_made(res.bestmove.unwrap());
        assert!(after.is_checkmate(), "{} does not mate:\n{after}", res.bestmove.unwrap());
    }

    #[test]
    fn test_already_mated() {
        let res = run_search("3k4R/R8/9/9/9/9/9/9/9/4K4 b", hard(3));
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -Score::MATE);
        assert_eq!(res.score.moves_to_mate(), 0);
    }

    #[test]
    fn test_stalemate_is_a_loss() {
        let res = run_search("3k5/4R4/9/9/9/9/9/9/9/4K4 b", hard(3));
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -Score::MATE);
    }

    #[test]
    fn test_takes_hanging_chariot() {
        let res = run_search("4k4/9/9/9/4r4/9/9/4R4/9/3K5 w", hard(2));
        assert_eq!(res.bestmove.unwrap(), "e2e5");
        assert!(res.score > Score(800));
    }

    #[test]
    fn test_every_difficulty_returns_a_legal_move() {
        let fens = [
            crate::FEN_STARTPOS,
            "3k5/4a4/4b4/9/2r6/9/9/4B4/4A4/3AKR3 w",
            "3k5/9/9/9/9/9/9/9/4r4/4K4 w",
        ];

        for fen in fens {
            let game = Game::from_fen(fen).unwrap();
            for difficulty in Difficulty::all() {
                let config = SearchConfig {
                    max_depth: difficulty.depth(),
                    difficulty,
                    seed: 1234,
                    ..Default::default()
                };
                let res = run_search(fen, config);
                let mv = res.bestmove.unwrap();
                assert!(
                    game.get_legal_moves().contains(&mv),
                    "{difficulty} search on {fen:?} returned illegal move {mv}"
                );
            }
        }
    }

    #[test]
    fn test_easy_search_is_reproducible() {
        let config = SearchConfig {
            difficulty: Difficulty::Easy,
            seed: 99,
            ..Default::default()
        };

        let first = run_search(crate::FEN_STARTPOS, config);
        let second = run_search(crate::FEN_STARTPOS, config);
        assert_eq!(first.bestmove, second.bestmove);
    }

    #[test]
    fn test_node_limit_still_yields_a_move() {
        let config = SearchConfig {
            max_nodes: 1,
            ..Default::default()
        };
        let res = run_search(crate::FEN_STARTPOS, config);
        assert!(res.bestmove.is_some());

        let config = SearchConfig {
            max_nodes: 1,
            difficulty: Difficulty::Medium,
            ..Default::default()
        };
        let res = run_search(crate::FEN_STARTPOS, config);
        assert!(res.bestmove.is_some());
    }
}
