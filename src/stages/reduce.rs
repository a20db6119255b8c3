use tracing::debug;

use crate::models::Segment;

/// Merge over-segmented speakers until at most `target` distinct tags remain.
///
/// Speakers are ranked by segment count (ties broken by first appearance);
/// the top `target` tags are kept and every other tag is relabeled to the
/// least frequent kept tag. Relabeling is the only change: segment count,
/// order, times and text are untouched, and untagged segments pass through.
/// When the stream already has `target` or fewer distinct speakers the
/// input is returned unchanged.
///
/// Precondition: `target >= 1`, enforced at the pipeline boundary.
pub fn reduce_speakers(segments: &[Segment], target: usize) -> Vec<Segment> {
    let frequencies = speaker_frequencies(segments);

    if frequencies.len() <= target {
        return segments.to_vec();
    }

    // Stable sort by count descending keeps first-appearance order on ties.
    let mut ranked = frequencies;
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let kept = &ranked[..target];
    // Everything outside the kept set folds into the least frequent survivor.
    let retain_target = kept[target - 1].0.clone();

    debug!(
        "Reducer: folding {} speakers into '{}', keeping {}",
        ranked.len() - target,
        retain_target,
        target
    );

    segments
        .iter()
        .map(|seg| {
            let mut out = seg.clone();
            if let Some(speaker) = &seg.speaker {
                if !kept.iter().any(|(tag, _)| tag == speaker) {
                    out.speaker = Some(retain_target.clone());
                }
            }
            out
        })
        .collect()
}

/// Segment count per speaker tag, in first-appearance order
fn speaker_frequencies(segments: &[Segment]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for seg in segments {
        let Some(speaker) = &seg.speaker else { continue };
        match counts.iter_mut().find(|(tag, _)| tag == speaker) {
            Some((_, count)) => *count += 1,
            None => counts.push((speaker.clone(), 1)),
        }
    }
    counts
}
