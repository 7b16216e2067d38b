use log::{debug, info};
use std::io::{self, BufRead, Write};
use strum::{EnumString, IntoEnumIterator};

use super::{Driver, DriverError};
use crate::{
    game::{GameEngine, GuessOutcome, GuessRank, HintStrength, Phase},
    projection::Point3,
};

const HELP: &str = "Type a word to guess it.
  ?  or :hint     weak hint
  ?? or :strong   strong hint
  :reset          new word
  :where          show where your guesses sit around the target
  :quit           leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum Command {
    #[strum(serialize = "?", serialize = ":hint")]
    Hint,
    #[strum(serialize = "??", serialize = ":strong")]
    StrongHint,
    #[strum(serialize = ":reset")]
    Reset,
    #[strum(serialize = ":where")]
    Where,
    #[strum(serialize = ":help")]
    Help,
    #[strum(serialize = ":quit", serialize = ":q")]
    Quit,
}

/// A guess that landed in the vocabulary, for the history list.
#[derive(Debug, Clone)]
struct GuessedWord {
    /// Guess count when it was made.
    number: usize,
    word: String,
    rank: usize,
    position: Option<Point3>,
}

/// A line-based driver reading guesses and commands from a terminal.
pub struct TerminalDriver {
    engine: GameEngine,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    /// Found guesses this round, oldest first.
    history: Vec<GuessedWord>,
}

impl TerminalDriver {
    /// Construct a driver with custom input and output streams.
    pub fn with_io(engine: GameEngine, input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        TerminalDriver {
            engine,
            input,
            output,
            history: Vec::new(),
        }
    }

    fn reset(&mut self) -> Result<(), DriverError> {
        self.engine.reset()?;
        self.history.clear();
        writeln!(self.output, "Game reset. Make a new guess!")?;
        Ok(())
    }

    /// Handle one line of input. Returns false once the player wants to leave.
    fn handle_line(&mut self, line: &str) -> Result<bool, DriverError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(true);
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => return Ok(false),
            Ok(Command::Help) => writeln!(self.output, "{}", HELP)?,
            Ok(Command::Reset) => self.reset()?,
            Ok(Command::Where) => self.show_positions()?,
            Ok(command @ (Command::Hint | Command::StrongHint)) => {
                if self.refuse_after_win()? {
                    return Ok(true);
                }
                let strength = if command == Command::Hint {
                    HintStrength::Weak
                } else {
                    HintStrength::Strong
                };
                let outcome = self.engine.hint(strength)?;
                self.report(&outcome)?;
            }
            Err(_) if line.starts_with(':') => {
                writeln!(self.output, "Unknown command {:?}. Try :help", line)?;
            }
            Err(_) => {
                if self.refuse_after_win()? {
                    return Ok(true);
                }
                let outcome = self.engine.guess(line)?;
                self.report(&outcome)?;
            }
        }
        Ok(true)
    }

    /// Once the word is found, guessing is disabled until the next reset.
    fn refuse_after_win(&mut self) -> Result<bool, DriverError> {
        if self.engine.phase() == Phase::Won {
            writeln!(
                self.output,
                "You already found the word. Type :reset to play again."
            )?;
            return Ok(true);
        }
        Ok(false)
    }

    fn report(&mut self, outcome: &GuessOutcome) -> Result<(), DriverError> {
        debug!("{}", serde_json::to_string(outcome)?);
        writeln!(self.output, "{}", outcome.message)?;

        if let (GuessRank::Found(rank), Some(state)) = (outcome.rank, self.engine.state()) {
            let word = if outcome.won {
                state.target.clone()
            } else {
                match state.ranking.get(rank) {
                    Some(entry) => entry.word.clone(),
                    None => return Ok(()),
                }
            };
            self.history.push(GuessedWord {
                number: outcome.guesses,
                position: self.engine.projection(&word),
                word,
                rank,
            });
        }
        Ok(())
    }

    fn show_positions(&mut self) -> Result<(), DriverError> {
        match self.engine.target_projection() {
            Some(target) => writeln!(self.output, "Target      {}", target)?,
            None => writeln!(self.output, "No game in progress")?,
        }
        for guess in &self.history {
            let position = guess
                .position
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".into());
            writeln!(
                self.output,
                "{:>3} {:<12} rank {:<6} {}",
                guess.number, guess.word, guess.rank, position
            )?;
        }
        Ok(())
    }
}

impl Driver for TerminalDriver {
    fn new(engine: GameEngine) -> Result<Self, DriverError> {
        Ok(TerminalDriver::with_io(
            engine,
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        ))
    }

    fn play(&mut self) -> Result<(), DriverError> {
        self.reset()?;
        let hints = HintStrength::iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()
            .join("/");
        writeln!(
            self.output,
            "Guess the secret word out of {} words. Hints: {}. Type :help for commands.",
            self.engine.vocabulary().len(),
            hints
        )?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 || !self.handle_line(&line)? {
                break;
            }
        }
        info!("Leaving game");
        Ok(())
    }
}
