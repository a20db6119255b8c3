use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::{validate_stream, Segment};
use crate::sources::{DiarizeOptions, DiarizeSource, SecondaryDiarization};

/// Configuration for the diarization service client
#[derive(Debug, Clone)]
pub struct DiarizerConfig {
    /// Base URL of the diarization service (DIARIZER_URL env var)
    pub base_url: String,
    /// HuggingFace token forwarded to the service for gated pyannote
    /// weights (HUGGINGFACE_TOKEN env var)
    pub hf_token: Option<String>,
}

impl DiarizerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("DIARIZER_URL").context("DIARIZER_URL environment variable not set")?;
        let hf_token = std::env::var("HUGGINGFACE_TOKEN").ok();

        Ok(Self { base_url, hf_token })
    }
}

/// Secondary source: a pyannote-backed diarization service. Trusted for
/// speaker identity; its segments carry the service's own SPEAKER_NN tags
/// and little or no text.
pub struct DiarizerClient {
    client: Client,
    config: DiarizerConfig,
}

impl DiarizerClient {
    pub fn new(config: DiarizerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl DiarizeSource for DiarizerClient {
    async fn diarize(
        &self,
        audio: &Path,
        options: &DiarizeOptions,
    ) -> Result<SecondaryDiarization> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("Failed to read audio file: {:?}", audio))?;
        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));
        if let Some(num_speakers) = options.num_speakers {
            form = form.text("num_speakers", num_speakers.to_string());
        }
        if let Some(language) = &options.language {
            form = form.text("language", language.clone());
        }

        let url = format!("{}/diarize", self.config.base_url);
        debug!("Diarizing {:?} via {}", audio, url);

        let mut request = self.client.post(&url).multipart(form);
        if let Some(token) = &self.config.hf_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to diarization service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Diarization service error: {} - {}", status, body);
        }

        let response: DiarizerResponse = response
            .json()
            .await
            .context("Failed to parse diarization service response")?;

        // The service reports failures in-band as {"error": "..."}
        if let Some(error) = response.error {
            anyhow::bail!("Diarization failed: {}", error);
        }

        let segments: Vec<Segment> = response
            .segments
            .into_iter()
            .map(|s| Segment {
                start: s.start,
                end: s.end,
                text: String::new(),
                speaker: Some(s.speaker),
                confidence: None,
            })
            .collect();
        validate_stream(&segments).context("Diarization service returned malformed segments")?;

        let duration = stream_duration(&segments);

        Ok(SecondaryDiarization {
            segments,
            duration,
            language: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DiarizerResponse {
    #[serde(default)]
    segments: Vec<DiarizerSegment>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiarizerSegment {
    start: f64,
    end: f64,
    speaker: String,
}

/// Latest end time across the stream. The service does not guarantee
/// response order, so the last element's end is not usable as a duration.
fn stream_duration(segments: &[Segment]) -> Option<f64> {
    segments.iter().map(|s| s.end).max_by(f64::total_cmp)
}
