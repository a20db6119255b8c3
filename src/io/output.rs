use std::path::Path;

use anyhow::{Context, Result};

use crate::models::StructuredTranscript;

/// Write a reconciled transcript as pretty-printed JSON
pub fn write_transcript(transcript: &StructuredTranscript, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(transcript)
        .context("Failed to serialize transcript")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::io::parse_transcript_file;
    use crate::models::{Segment, TranscriptMetadata};

    #[test]
    fn test_write_then_parse() {
        let transcript = StructuredTranscript {
            transcript_id: "t-1".to_string(),
            text: "Hi there".to_string(),
            segments: vec![Segment::new(0.0, 4.0, "Hi there").with_speaker("Speaker 1")],
            metadata: TranscriptMetadata {
                speaker_count: Some(1),
                duration: Some(4.0),
                language: Some("en".to_string()),
                created_at: Utc::now(),
            },
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        write_transcript(&transcript, &path).unwrap();

        let parsed = parse_transcript_file(&path).unwrap();
        assert_eq!(parsed, transcript);
    }
}
