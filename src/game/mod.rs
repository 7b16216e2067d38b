use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::Range;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

pub use state::{GameState, GuessOutcome, GuessRank, HintStrength, Phase};

use crate::{
    embedding::{EmbeddingError, EmbeddingMatrix, EmbeddingProvider},
    projection::{Point3, Projector},
    ranking::{self, DistanceMetric, Metric},
    vocabulary::Vocabulary,
};

mod state;
#[cfg(test)]
mod tests;

/// Failure modes for the game engine.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no round in progress, reset the game first")]
    NotStarted,
    #[error("target sample window {0:?} is empty for this vocabulary")]
    EmptySampleWindow(Range<usize>),
    #[error("no word in sample window {0:?} is long enough to be a target")]
    NoEligibleTarget(Range<usize>),
    #[error("target {0:?} is not in the vocabulary")]
    UnknownTarget(String),
    #[error("no word at rank {0}")]
    RankOutOfRange(usize),
    #[error("embedding error")]
    Embedding(#[from] EmbeddingError),
}

/// Knobs for a game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Vocabulary indices targets are drawn from (end exclusive). Clamped to the vocabulary.
    pub sample_window: Range<usize>,
    /// Targets must be longer than this many characters.
    pub min_target_length: usize,
    /// Seed for target selection. Random if unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            sample_window: 200..10000,
            min_target_length: 3,
            seed: None,
        }
    }
}

/// Runs rounds of the game: picks a target, ranks the vocabulary against it, and scores
/// guesses and hints.
pub struct GameEngine<M: DistanceMetric = Metric> {
    vocabulary: Vocabulary,
    embeddings: EmbeddingMatrix,
    provider: Box<dyn EmbeddingProvider>,
    /// Already fit over `embeddings`.
    projector: Box<dyn Projector>,
    metric: M,
    config: GameConfig,
    rng: StdRng,
    /// `None` until the first reset.
    state: Option<GameState>,
}

impl<M: DistanceMetric> GameEngine<M> {
    pub fn new(
        vocabulary: Vocabulary,
        embeddings: EmbeddingMatrix,
        provider: Box<dyn EmbeddingProvider>,
        projector: Box<dyn Projector>,
        metric: M,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        if embeddings.len() != vocabulary.len() {
            return Err(EmbeddingError::DimensionMismatch {
                rows: embeddings.len(),
                expected: vocabulary.len(),
            }
            .into());
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(GameEngine {
            vocabulary,
            embeddings,
            provider,
            projector,
            metric,
            config,
            rng,
            state: None,
        })
    }

    /// Start a new round with a randomly chosen target.
    pub fn reset(&mut self) -> Result<(), GameError> {
        let target = self.sample_target()?;
        self.start_round(&target)
    }

    /// Start a new round with the given target.
    pub fn start_round(&mut self, target: &str) -> Result<(), GameError> {
        if self.vocabulary.position(target).is_none() {
            return Err(GameError::UnknownTarget(target.to_owned()));
        }
        let target_embedding = self.provider.encode(target)?;
        if target_embedding.len() != self.embeddings.dimensions() {
            return Err(EmbeddingError::TargetDimension {
                got: target_embedding.len(),
                expected: self.embeddings.dimensions(),
            }
            .into());
        }
        let ranking = ranking::rank(
            &target_embedding,
            &self.embeddings,
            &self.vocabulary,
            &self.metric,
        );
        info!("New round started over {} words", ranking.len());
        debug!("Target is {:?}", target);
        self.state = Some(GameState::new(
            target.to_owned(),
            target_embedding,
            ranking,
        ));
        Ok(())
    }

    /// Score a guess.
    ///
    /// Once the round is won further guesses change nothing, not even the guess count.
    pub fn guess(&mut self, word: &str) -> Result<GuessOutcome, GameError> {
        let state = self.state.as_mut().ok_or(GameError::NotStarted)?;
        if state.won {
            let state = &*state;
            return Ok(GuessOutcome::won(&state.target, state));
        }

        state.guesses += 1;

        if word == state.target {
            state.won = true;
            state.current_rank = Some(GuessRank::Found(0));
            info!("Target found after {} guesses", state.guesses);
            return Ok(GuessOutcome::won(word, state));
        }

        let rank = match state.ranking.rank_of(word) {
            Some(rank) => rank,
            None => {
                debug!("Guess {:?} is not in the vocabulary", word);
                state.current_rank = Some(GuessRank::NotFound);
                return Ok(GuessOutcome::not_found(word, state));
            }
        };
        state.current_rank = Some(GuessRank::Found(rank));
        let similarity = state.ranking.similarity(rank).unwrap_or_default();
        // The first found guess always becomes the best, even at the worst rank
        if state.best_word.is_none() || rank < state.best_rank {
            state.best_word = Some(word.to_owned());
            state.best_rank = rank;
            state.best_similarity = similarity;
        }
        debug!(
            "Guess {:?} at rank {} (similarity {:.2})",
            word, rank, similarity
        );
        Ok(GuessOutcome::ranked(word, rank, similarity, state))
    }

    /// Guess the word at a fraction of the current best rank. Counts as a guess.
    ///
    /// Before any guess has been found this lands near the far end of the ranking.
    pub fn hint(&mut self, strength: HintStrength) -> Result<GuessOutcome, GameError> {
        let state = self.state.as_ref().ok_or(GameError::NotStarted)?;
        let rank = (state.best_rank as f64 * strength.fraction()) as usize;
        // best_rank never exceeds the last rank
        let word = match state.ranking.get(rank) {
            Some(entry) => entry.word.clone(),
            None => return Err(GameError::RankOutOfRange(rank)),
        };
        debug!("{} hint: rank {} ({:?})", strength, rank, word);
        self.guess(&word)
    }

    pub fn phase(&self) -> Phase {
        self.state
            .as_ref()
            .map(GameState::phase)
            .unwrap_or(Phase::Idle)
    }

    /// The current round, if one has been started.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Display position of the current target.
    pub fn target_projection(&self) -> Option<Point3> {
        let state = self.state.as_ref()?;
        self.projector.transform(&state.target_embedding)
    }

    /// Display position of a vocabulary word.
    pub fn projection(&self, word: &str) -> Option<Point3> {
        let row = self.embeddings.row(self.vocabulary.position(word)?)?;
        self.projector.transform(row)
    }

    /// Uniformly pick a target from the sample window, retrying until one is long enough.
    fn sample_target(&mut self) -> Result<String, GameError> {
        let n = self.vocabulary.len();
        let window = self.config.sample_window.start.min(n)..self.config.sample_window.end.min(n);
        if window.is_empty() {
            return Err(GameError::EmptySampleWindow(
                self.config.sample_window.clone(),
            ));
        }
        let min_length = self.config.min_target_length;
        let is_eligible = |word: &str| word.graphemes(true).count() > min_length;
        if !window
            .clone()
            .filter_map(|i| self.vocabulary.get(i))
            .any(is_eligible)
        {
            return Err(GameError::NoEligibleTarget(window));
        }

        loop {
            let index = self.rng.gen_range(window.clone());
            if let Some(word) = self.vocabulary.get(index) {
                if is_eligible(word) {
                    return Ok(word.to_owned());
                }
                debug!("Rejected target sample {:?}, too short", word);
            }
        }
    }
}
