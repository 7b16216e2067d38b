use serde::Serialize;
use strum::{Display, EnumIter};

use crate::{embedding::Embedding, ranking::RankedList};

/// Where the game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    /// No round has been started yet.
    Idle,
    InProgress,
    /// The target has been guessed. Stays here until the next reset.
    Won,
}

/// Rank reported for a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuessRank {
    /// The word isn't in the vocabulary.
    NotFound,
    Found(usize),
}

/// How much a hint gives away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum HintStrength {
    Weak,
    Strong,
}

impl HintStrength {
    /// Fraction of the current best rank to jump to.
    pub fn fraction(&self) -> f64 {
        match self {
            HintStrength::Weak => 0.9,
            HintStrength::Strong => 0.3,
        }
    }
}

/// State of a single round. Replaced wholesale on every reset.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The word to guess.
    pub target: String,
    pub target_embedding: Embedding,
    /// The vocabulary ordered by distance to the target.
    pub ranking: RankedList,
    /// Closest word guessed so far.
    pub best_word: Option<String>,
    /// Rank of `best_word`, or the worst possible rank before any guess is found.
    pub best_rank: usize,
    /// Similarity of `best_word`.
    pub best_similarity: f32,
    /// Guesses made this round, including hints and words not in the vocabulary.
    pub guesses: usize,
    /// Rank of the most recent guess.
    pub current_rank: Option<GuessRank>,
    pub won: bool,
}

impl GameState {
    pub fn new(target: String, target_embedding: Embedding, ranking: RankedList) -> Self {
        GameState {
            best_rank: ranking.len().saturating_sub(1),
            target,
            target_embedding,
            ranking,
            best_word: None,
            best_similarity: 0.0,
            guesses: 0,
            current_rank: None,
            won: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.won {
            Phase::Won
        } else {
            Phase::InProgress
        }
    }
}

/// What the player is told after a guess or hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessOutcome {
    pub message: String,
    pub rank: GuessRank,
    /// Similarity of the guessed word, if it was found.
    pub similarity: Option<f32>,
    pub best_word: Option<String>,
    pub best_rank: usize,
    pub guesses: usize,
    pub won: bool,
}

impl GuessOutcome {
    pub(super) fn won(word: &str, state: &GameState) -> Self {
        GuessOutcome::from_state(
            format!(
                "Word '{}'. Word found!!! Number of guesses: {}\nPress reset to reset the game with a new word.",
                word, state.guesses
            ),
            GuessRank::Found(0),
            Some(1.0),
            state,
        )
    }

    pub(super) fn not_found(word: &str, state: &GameState) -> Self {
        GuessOutcome::from_state(
            format!("Word '{}' not found in vocabulary", word),
            GuessRank::NotFound,
            None,
            state,
        )
    }

    pub(super) fn ranked(word: &str, rank: usize, similarity: f32, state: &GameState) -> Self {
        GuessOutcome::from_state(
            format!(
                "Word '{}'. Rank: {}. Best word so far: '{}' at rank {}. Guesses so far: {}",
                word,
                rank,
                state.best_word.as_deref().unwrap_or_default(),
                state.best_rank,
                state.guesses
            ),
            GuessRank::Found(rank),
            Some(similarity),
            state,
        )
    }

    fn from_state(
        message: String,
        rank: GuessRank,
        similarity: Option<f32>,
        state: &GameState,
    ) -> Self {
        GuessOutcome {
            message,
            rank,
            similarity,
            best_word: state.best_word.clone(),
            best_rank: state.best_rank,
            guesses: state.guesses,
            won: state.won,
        }
    }
}
