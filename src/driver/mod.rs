use thiserror::Error;

use crate::game::{GameEngine, GameError};

pub mod terminal;

/// Defines a front end that a person can use to play the game.
pub trait Driver {
    /// Construct a new instance of the driver around the given engine.
    fn new(engine: GameEngine) -> Result<Self, DriverError>
    where
        Self: Sized;

    /// Play until the player quits.
    fn play(&mut self) -> Result<(), DriverError>;
}

/// Failure modes for drivers.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("game error")]
    Game(#[from] GameError),
    #[error("terminal i/o error")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize outcome")]
    Serialization(#[from] serde_json::Error),
}
