use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::PipelineError;
use crate::models::{validate_stream, StructuredTranscript, TranscriptMetadata};
use crate::sources::{
    DiarizeOptions, DiarizeSource, PrimaryTranscription, SecondaryDiarization, TranscribeOptions,
    TranscribeSource,
};
use crate::stages::{align, canonicalize, coalesce, reduce_speakers, DEFAULT_MAX_GAP};

/// Options for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Language hint forwarded to both engines
    pub language: Option<String>,
    /// Known speaker count forwarded to the diarization engine
    pub num_speakers: Option<usize>,
    /// Upper bound on distinct speakers after reduction; None skips the
    /// reducer entirely
    pub target_speaker_count: Option<usize>,
    /// Coalescing gap in seconds
    pub max_gap: f64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            language: None,
            num_speakers: None,
            target_speaker_count: None,
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

/// Drives the two transcription engines and the transform chain.
///
/// Each run is a pure function of the two engine results plus options; the
/// pipeline holds no state between invocations.
pub struct ReconcilePipeline {
    primary: Arc<dyn TranscribeSource>,
    secondary: Arc<dyn DiarizeSource>,
}

impl ReconcilePipeline {
    pub fn new(primary: Arc<dyn TranscribeSource>, secondary: Arc<dyn DiarizeSource>) -> Self {
        Self { primary, secondary }
    }

    /// Run both engines concurrently, then reconcile their outputs.
    ///
    /// The two calls are joined, not raced: both must succeed, and either
    /// failure fails the whole run. No degraded single-source mode.
    pub async fn reconcile(
        &self,
        audio: &Path,
        options: &ReconcileOptions,
    ) -> Result<StructuredTranscript, PipelineError> {
        validate_target(options.target_speaker_count)?;

        let transcribe_options = TranscribeOptions {
            language: options.language.clone(),
        };
        let diarize_options = DiarizeOptions {
            num_speakers: options.num_speakers,
            language: options.language.clone(),
        };

        info!("Running transcription and diarization concurrently");
        let (primary, secondary) = tokio::try_join!(
            self.primary.transcribe(audio, &transcribe_options),
            self.secondary.diarize(audio, &diarize_options),
        )?;

        merge_sources(&primary, &secondary, options)
    }
}

/// Reconcile already-fetched engine outputs: Aligner, optional Reducer,
/// Coalescer, Canonicalizer. This is the synchronous half of `reconcile`,
/// also used by the offline CLI path.
pub fn merge_sources(
    primary: &PrimaryTranscription,
    secondary: &SecondaryDiarization,
    options: &ReconcileOptions,
) -> Result<StructuredTranscript, PipelineError> {
    validate_target(options.target_speaker_count)?;
    validate_stream(&primary.segments)?;
    validate_stream(&secondary.segments)?;

    info!(
        "Reconciling {} primary segments with {} diarized segments",
        primary.segments.len(),
        secondary.segments.len()
    );

    let aligned = align(&primary.segments, &secondary.segments);

    let reduced = match options.target_speaker_count {
        Some(target) => reduce_speakers(&aligned, target),
        None => aligned,
    };

    let merged = coalesce(&reduced, options.max_gap);
    let (segments, speaker_count) = canonicalize(&merged);

    info!(
        "Reconciled into {} segments across {} speakers",
        segments.len(),
        speaker_count
    );

    Ok(StructuredTranscript {
        transcript_id: uuid::Uuid::new_v4().to_string(),
        // Primary is trusted for text fidelity; the full transcript is its
        // raw text, not a reconstruction from segments.
        text: primary.text.clone(),
        segments,
        metadata: TranscriptMetadata {
            speaker_count: Some(speaker_count),
            duration: primary.duration.or(secondary.duration),
            language: primary.language.clone().or_else(|| secondary.language.clone()),
            created_at: Utc::now(),
        },
    })
}

/// Re-run Reducer, Coalescer and Canonicalizer over an existing transcript
/// with a new target, without touching either engine. This is the path for
/// interactively lowering the detected speaker count after the fact.
pub fn rereduce(
    transcript: &StructuredTranscript,
    target: usize,
) -> Result<StructuredTranscript, PipelineError> {
    validate_target(Some(target))?;
    validate_stream(&transcript.segments)?;

    let reduced = reduce_speakers(&transcript.segments, target);
    let merged = coalesce(&reduced, DEFAULT_MAX_GAP);
    let (segments, speaker_count) = canonicalize(&merged);

    info!(
        "Re-reduced transcript {} to {} speakers",
        transcript.transcript_id, speaker_count
    );

    Ok(StructuredTranscript {
        transcript_id: transcript.transcript_id.clone(),
        text: transcript.text.clone(),
        segments,
        metadata: TranscriptMetadata {
            speaker_count: Some(speaker_count),
            created_at: Utc::now(),
            ..transcript.metadata.clone()
        },
    })
}

fn validate_target(target: Option<usize>) -> Result<(), PipelineError> {
    match target {
        Some(0) => Err(PipelineError::InvalidTarget(0)),
        _ => Ok(()),
    }
}
