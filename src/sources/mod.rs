pub mod diarizer;
pub mod whisper;

pub use diarizer::{DiarizerClient, DiarizerConfig};
pub use whisper::{WhisperClient, WhisperConfig};

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Segment;

/// Options forwarded to the primary (text-accurate) engine
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    pub language: Option<String>,
}

/// Options forwarded to the secondary (speaker-accurate) engine
#[derive(Debug, Clone, Default)]
pub struct DiarizeOptions {
    /// Known speaker count, helps the engine's clustering
    pub num_speakers: Option<usize>,
    pub language: Option<String>,
}

/// What the primary engine hands back: reliable text, unreliable or absent
/// speaker identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryTranscription {
    pub text: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}

/// What the secondary engine hands back: reliable speaker tags in its own
/// numbering, possibly coarser text boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryDiarization {
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Primary transcription collaborator. Implementations own any transport
/// concerns; the pipeline only sees this contract.
#[async_trait]
pub trait TranscribeSource: Send + Sync {
    async fn transcribe(
        &self,
        audio: &Path,
        options: &TranscribeOptions,
    ) -> Result<PrimaryTranscription>;
}

/// Secondary diarization collaborator
#[async_trait]
pub trait DiarizeSource: Send + Sync {
    async fn diarize(&self, audio: &Path, options: &DiarizeOptions)
        -> Result<SecondaryDiarization>;
}
