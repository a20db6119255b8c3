use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One timestamped utterance span from an engine or a pipeline stage.
///
/// Segments are immutable once received; every stage copies rather than
/// mutates. Within any stream produced by the pipeline, `start` is
/// non-decreasing and `end >= start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Utterance text - never rewritten, only joined on coalescing
    #[serde(default)]
    pub text: String,
    /// Speaker tag in the producing engine's own numbering, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Engine confidence (0-1), if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            speaker: None,
            confidence: None,
        }
    }

    /// Same segment with a different speaker tag
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Duration of this segment in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Length of the time intersection between two segments, zero if disjoint
    pub fn overlap(&self, other: &Segment) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }
}

/// Reconciled transcript handed to the orchestrator's caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTranscript {
    /// Unique identifier for this reconciliation run
    pub transcript_id: String,
    /// Full raw text from the primary engine (not reconstructed from segments)
    pub text: String,
    /// Speaker-labeled, time-ordered segments
    pub segments: Vec<Segment>,
    pub metadata: TranscriptMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Distinct canonical speakers in `segments`
    pub speaker_count: Option<usize>,
    /// Audio duration in seconds, if either engine reported it
    pub duration: Option<f64>,
    /// Detected or requested language, if either engine reported it
    pub language: Option<String>,
    /// When the reconciliation ran
    pub created_at: DateTime<Utc>,
}

/// Sort a working copy time-ascending. Stages call this on entry instead of
/// trusting caller discipline; the sort is stable so equal starts keep
/// stream order.
pub fn sort_by_start(segments: &mut [Segment]) {
    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
}

/// Validate segment invariants at the boundary. The transform stages assume
/// well-formed input and never re-check mid-algorithm.
pub fn validate_stream(segments: &[Segment]) -> Result<(), PipelineError> {
    for (index, seg) in segments.iter().enumerate() {
        if !seg.start.is_finite() || !seg.end.is_finite() {
            return Err(PipelineError::MalformedSegment {
                index,
                reason: "non-finite timestamp".to_string(),
            });
        }
        if seg.start < 0.0 {
            return Err(PipelineError::MalformedSegment {
                index,
                reason: format!("negative start {}", seg.start),
            });
        }
        if seg.end < seg.start {
            return Err(PipelineError::MalformedSegment {
                index,
                reason: format!("end {} before start {}", seg.end, seg.start),
            });
        }
        if let Some(conf) = seg.confidence {
            if !(0.0..=1.0).contains(&conf) {
                return Err(PipelineError::MalformedSegment {
                    index,
                    reason: format!("confidence {} outside [0, 1]", conf),
                });
            }
        }
    }
    Ok(())
}

/// Distinct non-null speaker tags, in first-appearance order
pub fn distinct_speakers(segments: &[Segment]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for seg in segments {
        if let Some(speaker) = &seg.speaker {
            if !seen.iter().any(|s| s == speaker) {
                seen.push(speaker.clone());
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Segment::new(0.0, 5.0, "a");
        let b = Segment::new(4.0, 10.0, "b");
        assert!((a.overlap(&b) - 1.0).abs() < 1e-9);
        assert!((b.overlap(&a) - 1.0).abs() < 1e-9);

        let c = Segment::new(6.0, 8.0, "c");
        assert_eq!(a.overlap(&c), 0.0);
    }

    #[test]
    fn test_duration_never_negative() {
        assert_eq!(Segment::new(2.0, 2.0, "empty").duration(), 0.0);
        assert!((Segment::new(1.0, 3.5, "span").duration() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_inverted_times() {
        let segments = vec![Segment::new(5.0, 2.0, "bad")];
        let err = validate_stream(&segments).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedSegment { index: 0, .. }
        ));
    }

    #[test]
    fn test_validate_rejects_negative_start() {
        let segments = vec![
            Segment::new(0.0, 1.0, "ok"),
            Segment::new(-0.5, 1.0, "bad"),
        ];
        let err = validate_stream(&segments).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedSegment { index: 1, .. }
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let mut seg = Segment::new(0.0, 1.0, "ok");
        seg.confidence = Some(1.5);
        assert!(validate_stream(&[seg]).is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_stream() {
        let mut seg = Segment::new(0.0, 1.0, "ok").with_speaker("A");
        seg.confidence = Some(0.9);
        assert!(validate_stream(&[seg, Segment::new(1.0, 1.0, "point")]).is_ok());
        assert!(validate_stream(&[]).is_ok());
    }

    #[test]
    fn test_distinct_speakers_first_appearance_order() {
        let segments = vec![
            Segment::new(0.0, 1.0, "").with_speaker("B"),
            Segment::new(1.0, 2.0, "").with_speaker("A"),
            Segment::new(2.0, 3.0, "").with_speaker("B"),
            Segment::new(3.0, 4.0, ""),
        ];
        assert_eq!(distinct_speakers(&segments), vec!["B", "A"]);
    }

    #[test]
    fn test_sort_by_start_is_stable() {
        let mut segments = vec![
            Segment::new(1.0, 2.0, "second"),
            Segment::new(0.0, 1.0, "first"),
            Segment::new(1.0, 3.0, "third"),
        ];
        sort_by_start(&mut segments);
        assert_eq!(segments[0].text, "first");
        assert_eq!(segments[1].text, "second");
        assert_eq!(segments[2].text, "third");
    }

    #[test]
    fn test_segment_json_round_trip() {
        let mut seg = Segment::new(0.5, 2.25, "hello").with_speaker("SPEAKER_00");
        seg.confidence = Some(0.87);

        let json = serde_json::to_string(&seg).unwrap();
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seg);

        // Optional fields may be absent entirely in engine output
        let sparse: Segment = serde_json::from_str(r#"{"start":0.0,"end":1.0}"#).unwrap();
        assert_eq!(sparse.text, "");
        assert!(sparse.speaker.is_none());
        assert!(sparse.confidence.is_none());
    }
}
