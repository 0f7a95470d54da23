use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::analyzer::TextAnalyzer;
use crate::error::EmbedError;

/// Turns texts into fixed-dimension vectors, one per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Cosine similarity in [-1, 1]. Zero for mismatched lengths, empty input or a
/// zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    let similarity = dot / denom;
    if denom == 0.0 || !similarity.is_finite() {
        0.0
    } else {
        similarity.clamp(-1.0, 1.0)
    }
}

/// In-process embedder: analyzed terms hashed into `dims` buckets, then
/// L2-normalised. Deterministic across runs.
pub struct HashingEmbedder {
    dims: usize,
    analyzer: TextAnalyzer,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims: dims.max(1),
            analyzer: TextAnalyzer::for_embedding(),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in self.analyzer.analyze(text) {
            let bucket = (fnv1a(token.term.as_bytes()) % self.dims as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// Hosted feature-extraction endpoint (sentence-transformers style): takes a
/// list of inputs, answers with a list of vectors.
pub struct RemoteEmbedder {
    client: Client,
    url: String,
    api_token: String,
}

impl RemoteEmbedder {
    pub fn new(client: Client, url: &str, api_token: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_token: api_token.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let req = FeatureExtractionRequest {
            inputs: texts,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&req)
            .send()
            .await
            .map_err(EmbedError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(EmbedError::Transport)?;
        if !status.is_success() {
            return Err(EmbedError::Status { status, body });
        }

        let vectors: Vec<Vec<f32>> =
            serde_json::from_str(&body).map_err(|e| EmbedError::Decode(e.to_string()))?;
        if vectors.len() != texts.len() {
            return Err(EmbedError::Count {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}
