use cached::proc_macro::cached;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{Embedding, EmbeddingError, EmbeddingProvider};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}

/// Embeds words with a model served over an Ollama-compatible `/api/embed` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    /// Base URL of the server, e.g. `http://localhost:11434`.
    pub url: String,
    /// Name of the embedding model.
    pub model: String,
}

impl OllamaProvider {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        OllamaProvider {
            url: url.into(),
            model: model.into(),
        }
    }
}

impl EmbeddingProvider for OllamaProvider {
    fn encode(&self, word: &str) -> Result<Embedding, EmbeddingError> {
        encode_word(self.url.clone(), self.model.clone(), word.to_owned())
    }

    fn encode_batch(&self, words: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        request_embeddings(&self.url, &self.model, words)
    }
}

/// Embed a single word. Results are kept for the life of the process, so a word that comes up
/// as the target again doesn't cost another request.
#[cached(result = true)]
fn encode_word(url: String, model: String, word: String) -> Result<Embedding, EmbeddingError> {
    request_embeddings(&url, &model, &[word.as_str()])?
        .pop()
        .ok_or(EmbeddingError::BatchSize {
            got: 0,
            expected: 1,
        })
}

fn request_embeddings(
    url: &str,
    model: &str,
    words: &[&str],
) -> Result<Vec<Embedding>, EmbeddingError> {
    debug!("Requesting embeddings for {} words from {}", words.len(), url);
    let body = serde_json::to_string(&EmbedRequest {
        model,
        input: words,
    })?;
    let response = reqwest::blocking::Client::new()
        .post(format!("{}/api/embed", url.trim_end_matches('/')))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()?
        .error_for_status()?
        .text()?;
    let response = serde_json::from_str::<EmbedResponse>(&response)?;
    if response.embeddings.len() != words.len() {
        return Err(EmbeddingError::BatchSize {
            got: response.embeddings.len(),
            expected: words.len(),
        });
    }
    Ok(response.embeddings)
}
