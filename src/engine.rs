/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, bail, Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use uci_parser::{UciCommand, UciOption, UciParseError, UciResponse};

use crate::{
    perft, splitperft, Difficulty, EngineCommand, Evaluator, Game, GameRecord, LogDebug, LogInfo,
    LogLevel, LogNone, Search, SearchConfig, SearchResult, Square, BENCHMARK_FENS,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: u8 = 4;

/// The Pao xiangqi engine.
#[derive(Debug)]
pub struct Engine {
    /// The game being played, along with every move made since it was set up.
    ///
    /// Updated when a move is played or the engine receives `position ... moves [move list]`.
    record: GameRecord,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Atomic flag to determine whether a search is currently running
    is_searching: Arc<AtomicBool>,

    /// Handle to the currently-running search thread, if one exists.
    search_thread: Option<JoinHandle<SearchResult>>,

    /// How strongly the engine plays.
    difficulty: Difficulty,

    /// The value of the `Seed` option.
    seed: u64,

    /// Source of the per-search seeds used when picking among candidate moves.
    rng: StdRng,

    /// Whether to display extra information during execution.
    debug: bool,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    #[inline(always)]
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            record: GameRecord::default(),
            sender,
            receiver,
            is_searching: Arc::default(),
            search_thread: None,
            difficulty: Difficulty::default(),
            seed: 0,
            rng: StdRng::seed_from_u64(0),
            debug: false,
        }
    }

    /// Returns a string of the engine's name and current version.
    #[inline(always)]
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    #[inline(always)]
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ")
    }

    /// The game currently being played.
    #[inline(always)]
    pub const fn record(&self) -> &GameRecord {
        &self.record
    }

    /// The current difficulty.
    #[inline(always)]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    ///
    /// Fails only if the engine's event loop has already exited.
    #[inline(always)]
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|err| anyhow!("Failed to send {:?} to the engine", err.0))
    }

    /// Entrypoint of the engine.
    ///
    /// This function first spawns a new thread that handles user input from `stdin`.
    /// It then loops on commands received by the engine, executing them in the order received.
    pub fn run(&mut self) {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err:#}");
            }
        });

        // Execute commands as they are received
        while let Ok(cmd) = self.receiver.recv() {
            if let EngineCommand::Exit { cleanup } = cmd {
                // If requested, await the completion of any ongoing search threads
                if cleanup {
                    self.stop_search();
                }
                break;
            }

            // Bad input never stops the engine
            if let Err(e) = self.handle_command(cmd) {
                eprintln!("Error: {e:#}");
            }
        }
    }

    /// Execute a single [`EngineCommand`].
    ///
    /// [`EngineCommand::Exit`] is handled by the event loop in [`Engine::run`] and is ignored here.
    pub fn handle_command(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty)?,

            EngineCommand::Difficulty { level } => {
                if let Some(level) = level {
                    self.difficulty = level;
                    if self.debug {
                        Self::send_string(format!("Difficulty set to {level}"));
                    }
                } else {
                    println!("Current difficulty: {}", self.difficulty);
                }
            }

            EngineCommand::Display => println!("{}", self.record),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit { .. } => {}

            EngineCommand::Fen => println!("{}", self.record.game().to_fen()),

            EngineCommand::Flip => {
                let mut game = *self.record.game();
                game.toggle_side_to_move();
                self.record = GameRecord::new(game);
            }

            EngineCommand::History => {
                if self.record.history().is_empty() {
                    println!("(none)");
                } else {
                    println!("{}", self.record.moves_string());
                }
            }

            EngineCommand::Move { mv_string } => {
                let played = self.record.play_uci(&mv_string)?;
                if self.debug {
                    Self::send_string(format!("Played {played}"));
                }
            }

            EngineCommand::Moves {
                square,
                debug,
                sort,
            } => self.moves(square, debug, sort),

            EngineCommand::Option { name } => {
                let name = name.join(" ");
                if let Some(value) = self.get_option(&name) {
                    println!("Option {name:?} := {value}");
                } else {
                    println!("{} has no option {name:?}", self.name());
                }
            }

            EngineCommand::Perft { depth } => println!("{}", perft(self.record.game(), depth)),

            EngineCommand::Play => self.play()?,

            EngineCommand::Splitperft { depth } => {
                println!("{}", splitperft(self.record.game(), depth))
            }

            EngineCommand::Status => self.status(),

            EngineCommand::Undo => match self.record.undo() {
                Some(undone) => println!("Took back {undone}"),
                None => println!("No moves to take back"),
            },

            // UCI protocol states to continue execution if an error occurs
            EngineCommand::Uci { cmd } => self.handle_uci_command(cmd)?,

            EngineCommand::Wait => _ = self.stop_search(),
        }

        Ok(())
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            Debug(status) => self.debug = status,

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            SetOption { name, value } => self.set_option(&name, value)?,

            Register { name: _, code: _ } => println!("{} requires no registration", self.name()),

            UciNewGame => self.new_game(),

            Go(options) => {
                if let Some(depth) = options.perft {
                    println!("{}", splitperft(self.record.game(), depth as usize));
                    return Ok(());
                }

                let game = *self.record.game();
                let config = SearchConfig::new(options, &game, self.difficulty, self.rng.random());
                let handle = if self.debug {
                    self.start_search::<LogDebug>(game, config)
                } else {
                    self.start_search::<LogInfo>(game, config)
                };

                if handle.is_some() {
                    self.search_thread = handle;
                }
            }

            Position { fen, moves } => self.record = Self::position(fen, moves)?,

            Stop => self.set_is_searching(false),

            Quit => self.send_command(EngineCommand::Exit { cleanup: false })?,

            _ => bail!("{} does not support UCI command {uci:?}", self.name()),
        }

        Ok(())
    }

    /// Execute the `bench` command, running a benchmark of a fixed search on a series of positions and displaying the results.
    fn bench(&mut self, depth: Option<u8>, pretty: bool) -> Result<()> {
        // Set up the benchmarking config
        let config = SearchConfig {
            max_depth: depth.unwrap_or(BENCH_DEPTH),
            ..Default::default()
        };

        let benches = BENCHMARK_FENS;
        let mut nodes = 0;

        // Padding for printing FENs
        let width = benches.iter().map(|fen| fen.len()).max().unwrap_or_default();

        println!(
            "Running fixed-depth search (d={}) on {} positions",
            config.max_depth,
            benches.len()
        );

        for (i, fen) in benches.into_iter().enumerate() {
            print!("{:>2}/{:>2}: {fen:<width$} := ", i + 1, benches.len());
            // flush stdout so the node count will appear on the same line after search concludes
            io::stdout().lock().flush()?;

            let game = Game::from_fen(fen)?;
            self.search_thread = self.start_search::<LogNone>(game, config);

            let res = self
                .stop_search()
                .with_context(|| format!("Search did not finish while running benchmarks on fen {fen}"))?;
            nodes += res.nodes;
            println!("{}", res.nodes);
        }

        let elapsed = config.starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let k_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            println!();
            println!("+-- Benchmark Complete --+");
            println!("| time (ms)  {ms:<12}|");
            println!("|     nodes  {nodes:<12}|");
            println!("|       nps  {nps:<12}|");
            println!("|      Knps  {k_nps:<12.2}|");
            println!("+------------------------+");
        } else {
            println!("{nodes} nodes / {elapsed:?} := {nps} nps");
        }

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(self.record.game());
        if pretty {
            println!("{evaluator}");
        } else {
            println!("{}", evaluator.eval());
        }
    }

    /// Executes the `moves` command, displaying all available moves on the board, or for the given square.
    fn moves(&self, square: Option<Square>, debug: bool, sort: bool) {
        let moves = if let Some(square) = square {
            self.record.legal_destinations(square)
        } else {
            self.record.game().get_legal_moves()
        };

        if moves.is_empty() {
            println!("(none)");
            return;
        }

        let mut strings = moves
            .iter()
            .map(|mv| {
                if debug {
                    format!("{mv:?}")
                } else {
                    mv.to_string()
                }
            })
            .collect::<Vec<_>>();

        if sort {
            strings.sort();
        }

        println!("{}", strings.join(", "));
    }

    /// Executes the `status` command.
    fn status(&self) {
        if let Some(outcome) = self.record.outcome() {
            println!("{outcome}");
            return;
        }

        let side = self.record.game().side_to_move().name();
        if self.record.is_in_check() {
            println!("{side} to move, in check");
        } else {
            println!("{side} to move");
        }
    }

    /// Executes the `play` command, searching the current position at the current difficulty and playing the result.
    fn play(&mut self) -> Result<()> {
        let game = *self.record.game();
        if let Some(outcome) = game.outcome() {
            bail!("Cannot play a move: {outcome}");
        }

        let config = SearchConfig {
            max_depth: self.difficulty.depth(),
            difficulty: self.difficulty,
            seed: self.rng.random(),
            ..Default::default()
        };

        let Some(handle) = self.start_search::<LogNone>(game, config) else {
            bail!("Cannot play a move while a search is running");
        };
        self.search_thread = Some(handle);

        let res = self
            .stop_search()
            .context("Search thread did not return a result")?;
        let Some(mv) = res.bestmove else {
            bail!("Search found no move for {}", game.side_to_move().name());
        };

        let played = self.record.play(mv)?;
        println!("{played}");
        if let Some(outcome) = self.record.outcome() {
            println!("{outcome}");
        }

        Ok(())
    }

    /// Resets the engine's internal game state.
    ///
    /// Cancels any ongoing searches, ignoring their results.
    #[inline(always)]
    fn new_game(&mut self) {
        self.set_is_searching(false);
        self.record = GameRecord::default();
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    ///
    /// Fails on the first illegal move, leaving the engine's current game untouched.
    fn position<T: AsRef<str>>(
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<GameRecord> {
        let mut record = if let Some(fen) = fen {
            GameRecord::from_fen(fen.as_ref())?
        } else {
            GameRecord::default()
        };

        for mv_str in moves {
            record.play_uci(mv_str.as_ref())?;
        }

        Ok(record)
    }

    /// Sets the search flag to signal that the engine is starting/stopping a search.
    #[inline(always)]
    fn set_is_searching(&mut self, status: bool) {
        self.is_searching.store(status, Ordering::Relaxed);
    }

    /// Returns `true` if the engine is currently executing a searching.
    #[inline(always)]
    fn is_searching(&self) -> bool {
        self.is_searching.load(Ordering::Relaxed)
    }

    /// Starts a search on `game`, given the parameters in `config`.
    fn start_search<Log: LogLevel + 'static>(
        &mut self,
        game: Game,
        config: SearchConfig,
    ) -> Option<JoinHandle<SearchResult>> {
        // Cannot start a search if one is already running
        if self.is_searching() {
            Self::send_string("A search is already running");
            return None;
        }
        self.set_is_searching(true);

        let is_searching = Arc::clone(&self.is_searching);
        let handle =
            thread::spawn(move || Search::<Log>::new(is_searching, config).start(&game));

        Some(handle)
    }

    /// Awaits the current search thread, blocking until it finishes and returning its result.
    fn stop_search(&mut self) -> Option<SearchResult> {
        let handle = self.search_thread.take()?;

        let id = handle.thread().id();
        let Ok(res) = handle.join() else {
            Self::send_string(format!("Failed to join on thread {id:?}"));
            self.set_is_searching(false);
            return None;
        };

        self.set_is_searching(false);

        Some(res)
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors, and lists all UCI options.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());

        for opt in self.options() {
            println!("{}", UciResponse::Option(opt));
        }

        println!("{}", UciResponse::<&str>::UciOk)
    }

    /// Convenience function to return an iterator over all UCI options this engine supports.
    fn options(&self) -> impl Iterator<Item = UciOption> {
        [
            UciOption::spin(
                "Difficulty",
                Difficulty::default().level() as i32,
                Difficulty::Easy.level() as i32,
                Difficulty::Hard.level() as i32,
            ),
            UciOption::spin("Seed", 0, 0, i32::MAX),
            UciOption::spin("Threads", 1, 1, 1),
        ]
        .into_iter()
    }

    /// Handles the `setoption` command, setting option `name` to `value`.
    ///
    /// Will return an error if `name` isn't a valid option or `value` is not a valid value for that option.
    fn set_option(&mut self, name: &str, value: Option<String>) -> Result<()> {
        match name {
            "Difficulty" => {
                let Some(value) = value.as_ref() else {
                    bail!("usage: setoption name {name} value <1-3 | easy | medium | hard>");
                };

                self.difficulty = value.parse()?;
            }

            "Seed" => {
                let Some(value) = value.as_ref() else {
                    bail!("usage: setoption name {name} value <value>");
                };

                let Ok(seed) = value.parse() else {
                    bail!("expected non-negative integer. got {value:?}");
                };

                self.seed = seed;
                self.rng = StdRng::seed_from_u64(seed);
            }

            "Threads" => bail!("{} currently supports only 1 thread", self.name()),

            _ => {
                if let Some(value) = value.as_ref() {
                    bail!("Unrecognized option {name:?} with value {value:?}")
                } else {
                    bail!("Unrecognized option {name:?}")
                }
            }
        }

        if self.debug {
            let info = if let Some(value) = value.as_ref() {
                format!("Option {name} set to {value}")
            } else {
                format!("Option {name} toggled")
            };
            Self::send_string(info);
        }

        Ok(())
    }

    /// Returns the current value of the option `name`, if it exists on this engine.
    fn get_option(&self, name: &str) -> Option<String> {
        let value = match name {
            "Difficulty" => format!("{} ({})", self.difficulty.level(), self.difficulty),

            "Seed" => format!("{}", self.seed),

            "Threads" => String::from("1"),

            _ => return None,
        };

        Some(value)
    }

    /// Helper to send a [`UciInfo`](uci_parser::UciInfo) containing only a `string` message to `stdout`.
    #[inline(always)]
    fn send_string<T: fmt::Display>(info: T) {
        println!("{}", UciResponse::info_string(info));
    }
}

impl Default for Engine {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing UCI commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit { cleanup: false })
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();

        if buf.is_empty() {
            continue;
        }

        // UCI commands take priority, since that's the primary use case of the engine
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(UciParseError::UnrecognizedCommand { cmd: _ }) => match buf.parse() {
                Ok(cmd) => sender
                    .send(cmd)
                    .context("Failed to send command to engine")?,

                Err(err) => err.print()?,
            },

            // If it was a UCI command, print a usage message.
            Err(uci_err) => eprintln!("{uci_err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uci(engine: &mut Engine, cmd: &str) -> Result<()> {
        let cmd = UciCommand::new(cmd).unwrap();
        engine.handle_command(EngineCommand::Uci { cmd })
    }

    fn command(engine: &mut Engine, cmd: &str) -> Result<()> {
        engine.handle_command(cmd.parse().unwrap())
    }

    #[test]
    fn test_position_with_moves() {
        let mut engine = Engine::new();
        uci(&mut engine, "position startpos moves h2e2 h9g7").unwrap();

        assert_eq!(engine.record().history().len(), 2);
        assert_eq!(
            engine.record().game().to_fen(),
            "rnbakab1r/9/1c4nc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR w - - 2 2"
        );
    }

    #[test]
    fn test_illegal_position_is_rejected() {
        let mut engine = Engine::new();
        command(&mut engine, "move h2e2").unwrap();

        // Horse cannot jump two files
        assert!(uci(&mut engine, "position startpos moves b0e2").is_err());

        // Previous game is kept
        assert_eq!(engine.record().history().len(), 1);
    }

    #[test]
    fn test_move_and_undo() {
        let mut engine = Engine::new();
        command(&mut engine, "move h2e2").unwrap();
        assert!(command(&mut engine, "move a0a5").is_err());
        assert_eq!(engine.record().history().len(), 1);

        command(&mut engine, "undo").unwrap();
        assert_eq!(*engine.record().game(), Game::default());
    }

    #[test]
    fn test_new_game_returns_to_startpos() {
        let mut engine = Engine::new();
        uci(&mut engine, "position fen 3k5/9/9/9/9/9/9/9/9/R3K4 w - - 0 1 moves a0a5").unwrap();

        uci(&mut engine, "ucinewgame").unwrap();
        assert_eq!(*engine.record().game(), Game::default());
        assert!(engine.record().history().is_empty());
    }

    #[test]
    fn test_seed_makes_play_reproducible() {
        let play_with_seed = || {
            let mut engine = Engine::new();
            command(&mut engine, "difficulty easy").unwrap();
            uci(&mut engine, "setoption name Seed value 7").unwrap();
            for _ in 0..4 {
                command(&mut engine, "play").unwrap();
            }
            engine.record().moves_string()
        };

        assert_eq!(play_with_seed(), play_with_seed());
    }

    #[test]
    fn test_set_options() {
        let mut engine = Engine::new();

        uci(&mut engine, "setoption name Difficulty value 1").unwrap();
        assert_eq!(engine.difficulty(), Difficulty::Easy);

        uci(&mut engine, "setoption name Difficulty value medium").unwrap();
        assert_eq!(engine.difficulty(), Difficulty::Medium);
        assert_eq!(engine.get_option("Difficulty").as_deref(), Some("2 (medium)"));

        assert!(uci(&mut engine, "setoption name Difficulty value 7").is_err());
        assert!(uci(&mut engine, "setoption name Seed value lots").is_err());
        assert!(uci(&mut engine, "setoption name Hash value 16").is_err());

        uci(&mut engine, "setoption name Seed value 42").unwrap();
        assert_eq!(engine.get_option("Seed").as_deref(), Some("42"));
    }

    #[test]
    fn test_play_makes_a_legal_move() {
        let mut engine = Engine::new();
        command(&mut engine, "difficulty easy").unwrap();

        let before = *engine.record().game();
        command(&mut engine, "play").unwrap();

        let played = engine.record().last().unwrap().mv;
        assert!(before.is_legal(played));
        assert_eq!(engine.record().game().side_to_move(), before.side_to_move().opponent());
    }

    #[test]
    fn test_play_refuses_finished_games() {
        let mut engine = Engine::new();
        uci(&mut engine, "position fen 3k4R/R8/9/9/9/9/9/9/9/4K4 b - - 0 1").unwrap();
        assert!(command(&mut engine, "play").is_err());
    }

    #[test]
    fn test_flip_clears_history() {
        let mut engine = Engine::new();
        command(&mut engine, "move h2e2").unwrap();
        command(&mut engine, "flip").unwrap();

        assert!(engine.record().history().is_empty());
        assert_eq!(engine.record().game().side_to_move(), crate::Color::Red);
    }
}
