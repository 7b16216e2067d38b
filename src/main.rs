use driver::{terminal::TerminalDriver, Driver};
use log::{error, info};

use config::Config;
use embedding::OllamaProvider;
use game::GameEngine;
use projection::PcaProjector;
use vocabulary::Vocabulary;

mod config;
mod driver;
mod embedding;
mod game;
mod projection;
mod ranking;
mod vocabulary;

/// Load the vocabulary and embeddings, fit the projection and build the engine.
fn start() -> Result<GameEngine, Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let vocabulary = Vocabulary::load(&config.vocabulary_path)?;
    let provider = OllamaProvider::new(config.embed_url.clone(), config.embed_model.clone());
    let embeddings = embedding::load_or_build(
        &config.embedding_cache_path,
        &vocabulary,
        &provider,
        config.rebuild_embeddings,
    )?;
    let projector = PcaProjector::fitted(&embeddings)?;
    info!(
        "Ready: {} words, {} dimensions, {} distance",
        vocabulary.len(),
        embeddings.dimensions(),
        config.metric
    );
    Ok(GameEngine::new(
        vocabulary,
        embeddings,
        Box::new(provider),
        Box::new(projector),
        config.metric,
        config.game,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::try_init().unwrap_or(());

    let engine = match start() {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to start: {}", e);
            return Err(e);
        }
    };

    let mut driver = TerminalDriver::new(engine)?;
    if let Err(e) = driver.play() {
        error!("An error occurred: {:?}", e);
        return Err(e.into());
    }
    Ok(())
}
