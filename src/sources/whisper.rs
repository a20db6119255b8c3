use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::{validate_stream, Segment};
use crate::sources::{PrimaryTranscription, TranscribeOptions, TranscribeSource};

/// Configuration for the OpenAI-compatible transcription client
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// API key (from OPENAI_API_KEY env var)
    pub api_key: String,
    /// Base URL of the API (OPENAI_BASE_URL env var, default api.openai.com)
    pub base_url: String,
    /// Model to use (e.g., "whisper-1")
    pub model: String,
}

impl WhisperConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());

        Ok(Self {
            api_key,
            base_url,
            model: "whisper-1".to_string(),
        })
    }
}

/// Primary source: Whisper-style speech-to-text over HTTP. Trusted for text
/// accuracy; its segments carry no speaker tags.
pub struct WhisperClient {
    client: Client,
    config: WhisperConfig,
}

impl WhisperClient {
    pub fn new(config: WhisperConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TranscribeSource for WhisperClient {
    async fn transcribe(
        &self,
        audio: &Path,
        options: &TranscribeOptions,
    ) -> Result<PrimaryTranscription> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("Failed to read audio file: {:?}", audio))?;
        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name))
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        if let Some(language) = &options.language {
            form = form.text("language", language.clone());
        }

        let url = format!("{}/v1/audio/transcriptions", self.config.base_url);
        debug!("Transcribing {:?} via {}", audio, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to transcription API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Transcription API error: {} - {}", status, body);
        }

        let response: VerboseTranscription = response
            .json()
            .await
            .context("Failed to parse transcription API response")?;

        let segments: Vec<Segment> = response
            .segments
            .into_iter()
            .map(|s| Segment {
                start: s.start,
                end: s.end,
                text: s.text.trim().to_string(),
                speaker: None,
                confidence: None,
            })
            .collect();
        validate_stream(&segments).context("Transcription API returned malformed segments")?;

        Ok(PrimaryTranscription {
            text: response.text,
            segments,
            duration: response.duration,
            language: response.language,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
}
