use crate::models::{sort_by_start, Segment};

/// Canonical tag for the `n`-th distinct speaker, 1-based
pub fn canonical_label(n: usize) -> String {
    format!("Speaker {}", n)
}

/// Rewrite arbitrary engine speaker tags into contiguous `Speaker 1..=k`
/// numbering by first temporal appearance, returning the rewritten stream
/// and `k`.
///
/// The mapping is an explicit insertion-ordered table, never inferred from
/// the tag text. Untagged segments form one implicit group keyed like any
/// other first appearance, so every output segment carries a label.
/// Canonicalizing an already canonical contiguous stream is a no-op.
pub fn canonicalize(segments: &[Segment]) -> (Vec<Segment>, usize) {
    let mut segments: Vec<Segment> = segments.to_vec();
    sort_by_start(&mut segments);

    // Insertion-ordered mapping: raw tag (None = untagged group) -> label
    let mut table: Vec<(Option<String>, String)> = Vec::new();

    let output = segments
        .into_iter()
        .map(|mut seg| {
            let label = match table.iter().find(|(raw, _)| *raw == seg.speaker) {
                Some((_, label)) => label.clone(),
                None => {
                    let label = canonical_label(table.len() + 1);
                    table.push((seg.speaker.clone(), label.clone()));
                    label
                }
            };
            seg.speaker = Some(label);
            seg
        })
        .collect();

    (output, table.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(start: f64, speaker: &str) -> Segment {
        Segment::new(start, start + 1.0, "word").with_speaker(speaker)
    }

    #[test]
    fn test_labels_follow_first_appearance() {
        let segments = vec![
            tagged(0.0, "A"),
            tagged(1.0, "B"),
            tagged(2.0, "A"),
        ];

        let (canonical, count) = canonicalize(&segments);

        let speakers: Vec<_> = canonical.iter().map(|s| s.speaker.as_deref()).collect();
        assert_eq!(
            speakers,
            vec![Some("Speaker 1"), Some("Speaker 2"), Some("Speaker 1")]
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn test_arbitrary_engine_tags() {
        let segments = vec![
            tagged(0.0, "SPEAKER_03"),
            tagged(1.0, "SPEAKER_00"),
            tagged(2.0, "SPEAKER_03"),
            tagged(3.0, "guest-voice"),
        ];

        let (canonical, count) = canonicalize(&segments);

        assert_eq!(count, 3);
        assert_eq!(canonical[0].speaker.as_deref(), Some("Speaker 1"));
        assert_eq!(canonical[1].speaker.as_deref(), Some("Speaker 2"));
        assert_eq!(canonical[2].speaker.as_deref(), Some("Speaker 1"));
        assert_eq!(canonical[3].speaker.as_deref(), Some("Speaker 3"));
    }

    #[test]
    fn test_labels_are_contiguous() {
        let segments = vec![
            tagged(0.0, "x"),
            tagged(1.0, "y"),
            tagged(2.0, "z"),
            tagged(3.0, "y"),
        ];

        let (canonical, count) = canonicalize(&segments);

        let mut labels: Vec<String> = canonical
            .iter()
            .filter_map(|s| s.speaker.clone())
            .collect();
        labels.sort();
        labels.dedup();
        let expected: Vec<String> = (1..=count).map(canonical_label).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_idempotent() {
        let segments = vec![tagged(0.0, "B"), tagged(1.0, "A"), tagged(2.0, "B")];

        let (once, count_once) = canonicalize(&segments);
        let (twice, count_twice) = canonicalize(&once);

        assert_eq!(once, twice);
        assert_eq!(count_once, count_twice);
    }

    #[test]
    fn test_untagged_segments_form_one_group() {
        let segments = vec![
            Segment::new(0.0, 1.0, "a"),
            Segment::new(1.0, 2.0, "b"),
        ];

        let (canonical, count) = canonicalize(&segments);

        assert_eq!(count, 1);
        assert!(canonical
            .iter()
            .all(|s| s.speaker.as_deref() == Some("Speaker 1")));
    }

    #[test]
    fn test_empty_input() {
        let (canonical, count) = canonicalize(&[]);
        assert!(canonical.is_empty());
        assert_eq!(count, 0);
    }
}
