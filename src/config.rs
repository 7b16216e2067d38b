use lazy_regex::regex_captures;
use std::{ops::Range, path::PathBuf};
use thiserror::Error;

use crate::{game::GameConfig, ranking::Metric};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: unknown metric {value:?}")]
    Metric {
        var: &'static str,
        value: String,
        source: serde_plain::Error,
    },
    #[error("{var}: expected a range like 200..10000, got {value:?}")]
    Window { var: &'static str, value: String },
    #[error("{var}: expected true or false, got {value:?}")]
    Flag { var: &'static str, value: String },
    #[error("{var}: expected a number, got {value:?}")]
    Number { var: &'static str, value: String },
}

/// Process-wide settings. Every field can be overridden by an environment variable.
#[derive(Debug, Clone)]
pub struct Config {
    /// `GUESS_VOCABULARY`
    pub vocabulary_path: PathBuf,
    /// `GUESS_EMBEDDING_CACHE`
    pub embedding_cache_path: PathBuf,
    /// `GUESS_REBUILD_EMBEDDINGS`: embed the vocabulary even if a cache exists.
    pub rebuild_embeddings: bool,
    /// `GUESS_EMBED_URL`
    pub embed_url: String,
    /// `GUESS_EMBED_MODEL`
    pub embed_model: String,
    /// `GUESS_METRIC`: `euclidean` or `cosine`.
    pub metric: Metric,
    /// `GUESS_SAMPLE_WINDOW` and `GUESS_SEED`.
    pub game: GameConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vocabulary_path: "vocabulary.txt".into(),
            embedding_cache_path: "embedding_list.txt".into(),
            rebuild_embeddings: false,
            embed_url: "http://localhost:11434".into(),
            embed_model: "mxbai-embed-large".into(),
            metric: Metric::default(),
            game: GameConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from defaults, overridden by whatever `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(path) = lookup("GUESS_VOCABULARY") {
            config.vocabulary_path = path.into();
        }
        if let Some(path) = lookup("GUESS_EMBEDDING_CACHE") {
            config.embedding_cache_path = path.into();
        }
        if let Some(value) = lookup("GUESS_REBUILD_EMBEDDINGS") {
            config.rebuild_embeddings = parse_flag(&value).ok_or_else(|| ConfigError::Flag {
                var: "GUESS_REBUILD_EMBEDDINGS",
                value: value.clone(),
            })?;
        }
        if let Some(url) = lookup("GUESS_EMBED_URL") {
            config.embed_url = url;
        }
        if let Some(model) = lookup("GUESS_EMBED_MODEL") {
            config.embed_model = model;
        }
        if let Some(value) = lookup("GUESS_METRIC") {
            config.metric =
                serde_plain::from_str::<Metric>(value.trim()).map_err(|source| {
                    ConfigError::Metric {
                        var: "GUESS_METRIC",
                        value: value.clone(),
                        source,
                    }
                })?;
        }
        if let Some(value) = lookup("GUESS_SAMPLE_WINDOW") {
            config.game.sample_window =
                parse_window(&value).ok_or_else(|| ConfigError::Window {
                    var: "GUESS_SAMPLE_WINDOW",
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup("GUESS_SEED") {
            let seed = value.trim().parse::<u64>().map_err(|_| ConfigError::Number {
                var: "GUESS_SEED",
                value: value.clone(),
            })?;
            config.game.seed = Some(seed);
        }
        Ok(config)
    }
}

/// Parse a boolean switch, ignoring case.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `start..end`.
fn parse_window(value: &str) -> Option<Range<usize>> {
    let (_, start, end) = regex_captures!(r"^\s*(\d+)\s*\.\.\s*(\d+)\s*$", value)?;
    Some(start.parse().ok()?..end.parse().ok()?)
}
