use super::{GameConfig, GameEngine, GameError, GuessRank, HintStrength, Phase};
use crate::{
    embedding::{tests::TableProvider, EmbeddingError, EmbeddingMatrix},
    projection::PcaProjector,
    ranking::Metric,
    vocabulary::Vocabulary,
};
use unicode_segmentation::UnicodeSegmentation;

const GREEK: [(&str, &[f32]); 4] = [
    ("alpha", &[3.0, 0.0]),
    ("beta", &[2.0, 0.0]),
    ("gamma", &[0.0, 0.0]),
    ("delta", &[1.0, 0.0]),
];

const ANIMALS: [(&str, &[f32]); 12] = [
    ("ox", &[0.0, 0.0, 1.0]),
    ("cat", &[1.0, 0.4, 0.0]),
    ("bird", &[2.0, 0.1, 0.3]),
    ("horse", &[3.0, 1.5, 0.0]),
    ("tiger", &[1.2, 4.0, 0.2]),
    ("eel", &[5.0, 0.0, 2.0]),
    ("eagle", &[0.1, 6.0, 1.0]),
    ("shark", &[7.0, 2.0, 0.5]),
    ("whale", &[8.0, 0.3, 3.0]),
    ("emu", &[0.0, 9.0, 0.0]),
    ("otter", &[4.0, 4.0, 4.0]),
    ("lion", &[2.5, 2.5, 0.1]),
];

fn engine_with(entries: &[(&str, &[f32])], metric: Metric, config: GameConfig) -> GameEngine {
    let vocabulary =
        Vocabulary::from_words(entries.iter().map(|(w, _)| w.to_string()).collect()).unwrap();
    let matrix = EmbeddingMatrix::new(entries.iter().map(|(_, e)| e.to_vec()).collect()).unwrap();
    let projector = PcaProjector::fitted(&matrix).unwrap();
    GameEngine::new(
        vocabulary,
        matrix,
        Box::new(TableProvider::new(entries)),
        Box::new(projector),
        metric,
        config,
    )
    .unwrap()
}

fn seeded(seed: u64) -> GameConfig {
    GameConfig {
        sample_window: 0..100,
        seed: Some(seed),
        ..GameConfig::default()
    }
}

fn greek() -> GameEngine {
    let mut engine = engine_with(&GREEK, Metric::Euclidean, seeded(0));
    engine.start_round("gamma").unwrap();
    engine
}

#[test]
fn end_to_end() {
    let mut engine = greek();
    assert_eq!(engine.phase(), Phase::InProgress);

    let outcome = engine.guess("alpha").unwrap();
    assert_eq!(outcome.rank, GuessRank::Found(3));
    assert_eq!(outcome.best_word.as_deref(), Some("alpha"));
    assert_eq!(outcome.best_rank, 3);
    assert_eq!(outcome.similarity, Some(0.0));
    assert!(!outcome.won);

    let outcome = engine.guess("delta").unwrap();
    assert_eq!(outcome.rank, GuessRank::Found(1));
    assert_eq!(outcome.best_word.as_deref(), Some("delta"));
    assert_eq!(outcome.best_rank, 1);
    assert_eq!(outcome.similarity, Some(0.67));
    assert_eq!(
        outcome.message,
        "Word 'delta'. Rank: 1. Best word so far: 'delta' at rank 1. Guesses so far: 2"
    );

    let outcome = engine.guess("gamma").unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.guesses, 3);
    assert_eq!(outcome.rank, GuessRank::Found(0));
    assert_eq!(
        outcome.message,
        "Word 'gamma'. Word found!!! Number of guesses: 3\nPress reset to reset the game with a new word."
    );
    assert_eq!(engine.phase(), Phase::Won);
}

#[test]
fn nothing_before_first_reset() {
    let mut engine = engine_with(&GREEK, Metric::Euclidean, seeded(0));
    assert_eq!(engine.phase(), Phase::Idle);
    assert!(engine.state().is_none());
    assert!(matches!(engine.guess("alpha"), Err(GameError::NotStarted)));
    assert!(matches!(
        engine.hint(HintStrength::Weak),
        Err(GameError::NotStarted)
    ));
    assert_eq!(engine.target_projection(), None);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn unknown_word_only_counts_as_a_guess() {
    let mut engine = greek();
    engine.guess("beta").unwrap();

    let outcome = engine.guess("omega").unwrap();
    assert_eq!(outcome.rank, GuessRank::NotFound);
    assert_eq!(outcome.message, "Word 'omega' not found in vocabulary");
    assert_eq!(outcome.similarity, None);
    assert_eq!(outcome.guesses, 2);

    let state = engine.state().unwrap();
    assert_eq!(state.best_word.as_deref(), Some("beta"));
    assert_eq!(state.best_rank, 2);
    assert_eq!(state.best_similarity, 0.33);
    assert_eq!(state.current_rank, Some(GuessRank::NotFound));

    // Case sensitive
    assert_eq!(engine.guess("Beta").unwrap().rank, GuessRank::NotFound);
    assert!(!engine.guess("GAMMA").unwrap().won);
}

#[test]
fn first_found_guess_becomes_best() {
    let mut engine = greek();
    engine.guess("omega").unwrap();

    // alpha is the furthest word, the same rank best_rank starts at
    let outcome = engine.guess("alpha").unwrap();
    assert_eq!(outcome.rank, GuessRank::Found(3));
    assert_eq!(outcome.best_word.as_deref(), Some("alpha"));
    assert_eq!(outcome.best_rank, 3);
    assert_eq!(
        outcome.message,
        "Word 'alpha'. Rank: 3. Best word so far: 'alpha' at rank 3. Guesses so far: 2"
    );
    assert_eq!(engine.state().unwrap().best_similarity, 0.0);
}

#[test]
fn best_rank_never_regresses() {
    let mut engine = greek();
    engine.guess("delta").unwrap();

    let outcome = engine.guess("alpha").unwrap();
    assert_eq!(outcome.rank, GuessRank::Found(3));
    assert_eq!(outcome.best_word.as_deref(), Some("delta"));
    assert_eq!(outcome.best_rank, 1);
    assert_eq!(
        outcome.message,
        "Word 'alpha'. Rank: 3. Best word so far: 'delta' at rank 1. Guesses so far: 2"
    );

    let state = engine.state().unwrap();
    assert_eq!(state.current_rank, Some(GuessRank::Found(3)));
    assert_eq!(state.best_similarity, 0.67);

    // Repeating the best word doesn't change anything either
    engine.guess("delta").unwrap();
    assert_eq!(engine.state().unwrap().best_rank, 1);
    assert_eq!(engine.state().unwrap().guesses, 3);
}

#[test]
fn best_rank_is_monotonic_over_random_guesses() {
    let mut engine = engine_with(&ANIMALS, Metric::Euclidean, seeded(7));
    engine.reset().unwrap();
    let words = ANIMALS.iter().map(|(w, _)| *w).collect::<Vec<_>>();

    let mut previous = engine.state().unwrap().best_rank;
    for word in words.iter().rev().chain(["nope"].iter()).chain(words.iter()) {
        if engine.phase() == Phase::Won {
            break;
        }
        let outcome = engine.guess(word).unwrap();
        assert!(outcome.best_rank <= previous);
        if let Some(similarity) = outcome.similarity {
            assert!((0.0..=1.0).contains(&similarity));
            assert_eq!((similarity * 100.0).round() / 100.0, similarity);
        }
        previous = outcome.best_rank;
    }
}

#[test]
fn target_always_wins() {
    let mut engine = greek();
    engine.guess("nope").unwrap();
    engine.guess("alpha").unwrap();
    engine.hint(HintStrength::Weak).unwrap();
    let outcome = engine.guess("gamma").unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.guesses, 4);

    // Even as the very first guess
    let mut engine = greek();
    let outcome = engine.guess("gamma").unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.guesses, 1);
    assert_eq!(outcome.best_word, None);
    assert_eq!(engine.state().unwrap().current_rank, Some(GuessRank::Found(0)));
}

#[test]
fn guesses_after_winning_are_ignored() {
    let mut engine = greek();
    engine.guess("delta").unwrap();
    let won = engine.guess("gamma").unwrap();

    let again = engine.guess("alpha").unwrap();
    assert_eq!(again, won);
    assert_eq!(engine.state().unwrap().guesses, 2);
    assert_eq!(engine.state().unwrap().best_word.as_deref(), Some("delta"));

    let hint = engine.hint(HintStrength::Strong).unwrap();
    assert_eq!(hint, won);
    assert_eq!(engine.phase(), Phase::Won);
}

#[test]
fn hints() {
    let mut engine = greek();

    // No progress yet: 0.9 * 3 lands near the far end
    let outcome = engine.hint(HintStrength::Weak).unwrap();
    assert_eq!(outcome.rank, GuessRank::Found(2));
    assert_eq!(outcome.best_word.as_deref(), Some("beta"));
    assert_eq!(outcome.guesses, 1);

    // 0.9 * 2
    let outcome = engine.hint(HintStrength::Weak).unwrap();
    assert_eq!(outcome.rank, GuessRank::Found(1));
    assert_eq!(outcome.best_word.as_deref(), Some("delta"));
    assert_eq!(outcome.guesses, 2);

    // 0.3 * 1 truncates to the target itself
    let outcome = engine.hint(HintStrength::Strong).unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.guesses, 3);
}

#[test]
fn strong_hint_from_the_start() {
    let mut engine = engine_with(&ANIMALS, Metric::Euclidean, seeded(1));
    engine.start_round("otter").unwrap();
    let n = ANIMALS.len();

    let outcome = engine.hint(HintStrength::Strong).unwrap();
    let expected = ((n - 1) as f64 * 0.3) as usize;
    assert_eq!(outcome.rank, GuessRank::Found(expected));
    let state = engine.state().unwrap();
    assert_eq!(
        state.best_word.as_deref(),
        Some(state.ranking.get(expected).unwrap().word.as_str())
    );
}

#[test]
fn reset_starts_a_fresh_round() {
    let mut engine = engine_with(&ANIMALS, Metric::Euclidean, seeded(42));
    let n = ANIMALS.len();

    for _ in 0..50 {
        engine.reset().unwrap();
        let state = engine.state().unwrap();
        assert_eq!(state.guesses, 0);
        assert_eq!(state.best_rank, n - 1);
        assert_eq!(state.best_word, None);
        assert_eq!(state.best_similarity, 0.0);
        assert_eq!(state.current_rank, None);
        assert!(!state.won);
        assert!(state.target.graphemes(true).count() > 3);

        assert_eq!(state.ranking.len(), n);
        assert_eq!(state.ranking.rank_of(&state.target), Some(0));
        assert_eq!(state.ranking.get(0).unwrap().distance, 0.0);
        let mut ranks = ANIMALS
            .iter()
            .map(|(w, _)| state.ranking.rank_of(w).unwrap())
            .collect::<Vec<_>>();
        ranks.sort();
        assert_eq!(ranks, (0..n).collect::<Vec<_>>());

        // Play a bit so the next reset has something to clear
        let target = state.target.clone();
        engine.guess("cat").unwrap();
        engine.guess(&target).unwrap();
        assert_eq!(engine.phase(), Phase::Won);
    }
}

#[test]
fn sampling_respects_window() {
    // Indices 2..5 hold "bird", "horse" and "tiger"
    let config = GameConfig {
        sample_window: 2..5,
        seed: Some(3),
        ..GameConfig::default()
    };
    let mut engine = engine_with(&ANIMALS, Metric::Euclidean, config);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..100 {
        engine.reset().unwrap();
        seen.insert(engine.state().unwrap().target.clone());
    }
    let mut seen = seen.into_iter().collect::<Vec<_>>();
    seen.sort();
    assert_eq!(seen, ["bird", "horse", "tiger"]);
}

#[test]
fn sampling_is_reproducible_with_a_seed() {
    let targets = |seed| {
        let mut engine = engine_with(&ANIMALS, Metric::Euclidean, seeded(seed));
        (0..10)
            .map(|_| {
                engine.reset().unwrap();
                engine.state().unwrap().target.clone()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(targets(9), targets(9));
}

#[test]
fn bad_sample_windows() {
    let config = GameConfig {
        sample_window: 200..10000,
        ..GameConfig::default()
    };
    let mut engine = engine_with(&ANIMALS, Metric::Euclidean, config);
    assert!(matches!(
        engine.reset(),
        Err(GameError::EmptySampleWindow(_))
    ));
    assert_eq!(engine.phase(), Phase::Idle);

    // "ox" and "cat" are too short
    let config = GameConfig {
        sample_window: 0..2,
        ..GameConfig::default()
    };
    let mut engine = engine_with(&ANIMALS, Metric::Euclidean, config);
    assert!(matches!(
        engine.reset(),
        Err(GameError::NoEligibleTarget(_))
    ));
}

#[test]
fn unknown_target() {
    let mut engine = greek();
    assert!(matches!(
        engine.start_round("omega"),
        Err(GameError::UnknownTarget(_))
    ));
    // The running round is untouched
    assert_eq!(engine.state().unwrap().target, "gamma");
}

#[test]
fn mismatched_embeddings() {
    let vocabulary = Vocabulary::from_words(vec!["alpha".into(), "beta".into()]).unwrap();
    let matrix = EmbeddingMatrix::new(vec![vec![0.0, 1.0]]).unwrap();
    let projector = PcaProjector::fitted(&matrix).unwrap();
    let result = GameEngine::new(
        vocabulary,
        matrix,
        Box::new(TableProvider::default()),
        Box::new(projector),
        Metric::Euclidean,
        GameConfig::default(),
    );
    assert!(matches!(
        result,
        Err(GameError::Embedding(EmbeddingError::DimensionMismatch {
            rows: 1,
            expected: 2
        }))
    ));
}

#[test]
fn target_dimension_must_match() {
    let vocabulary = Vocabulary::from_words(vec!["alpha".into(), "beta".into()]).unwrap();
    let matrix = EmbeddingMatrix::new(vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 2.0]]).unwrap();
    let projector = PcaProjector::fitted(&matrix).unwrap();
    // The table is empty, so the provider falls back to two dimensional vectors
    let mut engine = GameEngine::new(
        vocabulary,
        matrix,
        Box::new(TableProvider::default()),
        Box::new(projector),
        Metric::Euclidean,
        GameConfig::default(),
    )
    .unwrap();
    assert!(matches!(
        engine.start_round("alpha"),
        Err(GameError::Embedding(EmbeddingError::TargetDimension {
            got: 2,
            expected: 3
        }))
    ));
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn cosine_metric() {
    let mut engine = engine_with(&ANIMALS, Metric::Cosine, seeded(5));
    engine.start_round("horse").unwrap();
    let state = engine.state().unwrap();
    assert_eq!(state.ranking.rank_of("horse"), Some(0));
    assert_eq!(state.ranking.get(0).unwrap().distance, 0.0);
    assert!(state.ranking.max_distance() <= 2.0);

    let outcome = engine.guess("emu").unwrap();
    assert!(matches!(outcome.rank, GuessRank::Found(r) if r > 0));
}

#[test]
fn projections() {
    let mut engine = greek();
    let target = engine.target_projection().unwrap();
    assert_eq!(Some(target), engine.projection("gamma"));
    assert!(engine.projection("alpha").is_some());
    assert_eq!(engine.projection("omega"), None);

    // Projection is fixed across rounds
    let alpha = engine.projection("alpha");
    engine.start_round("beta").unwrap();
    assert_eq!(engine.projection("alpha"), alpha);
}
