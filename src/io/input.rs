use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{validate_stream, StructuredTranscript};
use crate::sources::{PrimaryTranscription, SecondaryDiarization};

/// Parse a saved primary engine output (JSON) from a file
pub fn parse_primary_file(path: &Path) -> Result<PrimaryTranscription> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    let transcription: PrimaryTranscription =
        serde_json::from_str(&content).context("Failed to parse primary transcription JSON")?;
    validate_stream(&transcription.segments)
        .with_context(|| format!("Malformed primary segments in {:?}", path))?;
    Ok(transcription)
}

/// Parse a saved diarization engine output (JSON) from a file
pub fn parse_secondary_file(path: &Path) -> Result<SecondaryDiarization> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    let diarization: SecondaryDiarization =
        serde_json::from_str(&content).context("Failed to parse diarization JSON")?;
    validate_stream(&diarization.segments)
        .with_context(|| format!("Malformed diarized segments in {:?}", path))?;
    Ok(diarization)
}

/// Parse a previously written reconciled transcript from a file
pub fn parse_transcript_file(path: &Path) -> Result<StructuredTranscript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    let transcript: StructuredTranscript =
        serde_json::from_str(&content).context("Failed to parse transcript JSON")?;
    validate_stream(&transcript.segments)
        .with_context(|| format!("Malformed transcript segments in {:?}", path))?;
    Ok(transcript)
}
