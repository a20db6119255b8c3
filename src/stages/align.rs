use tracing::debug;

use crate::models::{sort_by_start, Segment};
use crate::stages::canonical::canonical_label;

/// Attribute speaker identity from a speaker-accurate secondary stream onto
/// a text-accurate primary stream by temporal overlap.
///
/// Every primary segment takes the speaker of the secondary segment it
/// overlaps the most. Ties go to the earlier candidate in secondary stream
/// order. Primaries with no overlapping candidate fall back, in order, to:
/// the previous output segment's speaker, the next overlap-attributed
/// primary's speaker, the first speaker tag anywhere in the secondary
/// stream, and finally the "Speaker 1" literal when the secondary carries
/// no tags at all.
///
/// The output has the same length, order, times and text as `primary`;
/// only `speaker` is written. If either stream is empty the other is
/// returned unchanged.
pub fn align(primary: &[Segment], secondary: &[Segment]) -> Vec<Segment> {
    if primary.is_empty() {
        return secondary.to_vec();
    }
    if secondary.is_empty() {
        return primary.to_vec();
    }

    let mut primary: Vec<Segment> = primary.to_vec();
    sort_by_start(&mut primary);
    let mut secondary: Vec<Segment> = secondary.to_vec();
    sort_by_start(&mut secondary);

    // First pass: highest-overlap candidate per primary segment. Strict
    // greater-than keeps the earliest candidate on exact ties.
    let overlap_assigned: Vec<Option<String>> = primary
        .iter()
        .map(|p| {
            let mut best: Option<&str> = None;
            let mut best_overlap = 0.0f64;
            for s in &secondary {
                let Some(speaker) = &s.speaker else { continue };
                let overlap = p.overlap(s);
                if overlap > best_overlap {
                    best_overlap = overlap;
                    best = Some(speaker);
                }
            }
            best.map(str::to_string)
        })
        .collect();

    let first_secondary_speaker = secondary.iter().find_map(|s| s.speaker.clone());

    let mut output: Vec<Segment> = Vec::with_capacity(primary.len());
    let mut unattributed = 0usize;

    for (i, p) in primary.iter().enumerate() {
        let speaker = match &overlap_assigned[i] {
            Some(speaker) => speaker.clone(),
            None => {
                unattributed += 1;
                previous_speaker(&output)
                    .or_else(|| next_attributed(&overlap_assigned, i))
                    .or_else(|| first_secondary_speaker.clone())
                    .unwrap_or_else(|| canonical_label(1))
            }
        };

        let mut seg = p.clone();
        seg.speaker = Some(speaker);
        output.push(seg);
    }

    if unattributed > 0 {
        debug!(
            "Aligner: {} of {} primary segments had no overlapping candidate",
            unattributed,
            output.len()
        );
    }

    output
}

fn previous_speaker(output: &[Segment]) -> Option<String> {
    output.last().and_then(|seg| seg.speaker.clone())
}

fn next_attributed(overlap_assigned: &[Option<String>], from: usize) -> Option<String> {
    overlap_assigned[from + 1..]
        .iter()
        .find_map(|speaker| speaker.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diarized(start: f64, end: f64, speaker: &str) -> Segment {
        Segment::new(start, end, "").with_speaker(speaker)
    }

    #[test]
    fn test_align_by_dominant_overlap() {
        // Overlaps are 4.8s, 4.7s and 5.0s, each uniquely maximal.
        let primary = vec![
            Segment::new(0.0, 5.0, "Hello there"),
            Segment::new(5.0, 10.0, "How are you"),
            Segment::new(10.0, 15.0, "I am fine thanks"),
        ];
        let secondary = vec![
            diarized(0.0, 4.8, "A"),
            diarized(4.9, 9.7, "B"),
            diarized(9.8, 15.0, "A"),
        ];

        let aligned = align(&primary, &secondary);

        let speakers: Vec<_> = aligned.iter().map(|s| s.speaker.as_deref()).collect();
        assert_eq!(speakers, vec![Some("A"), Some("B"), Some("A")]);

        // Primary text and times are untouched
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0].text, "Hello there");
        assert_eq!(aligned[2].end, 15.0);
    }

    #[test]
    fn test_empty_streams_pass_through() {
        let primary = vec![Segment::new(0.0, 1.0, "hi")];
        let secondary = vec![diarized(0.0, 1.0, "A")];

        assert_eq!(align(&[], &secondary), secondary);
        assert_eq!(align(&primary, &[]), primary);
        assert!(align(&[], &[]).is_empty());
    }

    #[test]
    fn test_tie_goes_to_earlier_secondary_segment() {
        let primary = vec![Segment::new(0.0, 4.0, "split evenly")];
        let secondary = vec![diarized(0.0, 2.0, "A"), diarized(2.0, 4.0, "B")];

        let aligned = align(&primary, &secondary);
        assert_eq!(aligned[0].speaker.as_deref(), Some("A"));
    }

    #[test]
    fn test_no_overlap_falls_back_to_previous_output() {
        let primary = vec![
            Segment::new(0.0, 2.0, "covered"),
            Segment::new(10.0, 12.0, "orphan"),
        ];
        let secondary = vec![diarized(0.0, 2.0, "A")];

        let aligned = align(&primary, &secondary);
        assert_eq!(aligned[1].speaker.as_deref(), Some("A"));
    }

    #[test]
    fn test_no_overlap_falls_forward_to_next_attributed() {
        let primary = vec![
            Segment::new(0.0, 2.0, "orphan"),
            Segment::new(10.0, 12.0, "covered"),
        ];
        let secondary = vec![diarized(10.0, 12.0, "B")];

        let aligned = align(&primary, &secondary);
        assert_eq!(aligned[0].speaker.as_deref(), Some("B"));
        assert_eq!(aligned[1].speaker.as_deref(), Some("B"));
    }

    #[test]
    fn test_no_overlap_falls_back_to_first_secondary_tag() {
        // The only tagged secondary segment never overlaps anything and is
        // not adjacent to any attributed output.
        let primary = vec![Segment::new(0.0, 1.0, "orphan")];
        let secondary = vec![diarized(50.0, 51.0, "C")];

        let aligned = align(&primary, &secondary);
        assert_eq!(aligned[0].speaker.as_deref(), Some("C"));
    }

    #[test]
    fn test_untagged_secondary_yields_speaker_one() {
        let primary = vec![Segment::new(0.0, 1.0, "hi")];
        let secondary = vec![Segment::new(0.0, 1.0, "")];

        let aligned = align(&primary, &secondary);
        assert_eq!(aligned[0].speaker.as_deref(), Some("Speaker 1"));
    }

    #[test]
    fn test_untagged_candidates_are_skipped() {
        let primary = vec![Segment::new(0.0, 4.0, "hi")];
        let secondary = vec![
            Segment::new(0.0, 3.9, ""),
            diarized(3.0, 4.0, "B"),
        ];

        let aligned = align(&primary, &secondary);
        assert_eq!(aligned[0].speaker.as_deref(), Some("B"));
    }

    #[test]
    fn test_output_stays_sorted() {
        let primary = vec![
            Segment::new(5.0, 6.0, "later"),
            Segment::new(0.0, 1.0, "earlier"),
        ];
        let secondary = vec![diarized(0.0, 6.0, "A")];

        let aligned = align(&primary, &secondary);
        assert!(aligned.windows(2).all(|w| w[0].start <= w[1].start));
    }
}
