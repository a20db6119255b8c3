use crate::models::{sort_by_start, Segment};

/// Maximum silence in seconds between two same-speaker segments for them to
/// be merged into one.
pub const DEFAULT_MAX_GAP: f64 = 0.5;

/// Merge temporally adjacent segments that share a speaker.
///
/// Walks the stream with an accumulator; a segment folds into the
/// accumulator when its speaker matches and the gap to the accumulator's
/// end is under `max_gap`. Merged text is space-joined in order, the end
/// time extends, and the accumulator's confidence is kept. No text is
/// dropped or duplicated and the overall time span is preserved.
pub fn coalesce(segments: &[Segment], max_gap: f64) -> Vec<Segment> {
    let mut segments: Vec<Segment> = segments.to_vec();
    sort_by_start(&mut segments);

    let mut iter = segments.into_iter();
    let Some(mut acc) = iter.next() else {
        return Vec::new();
    };

    let mut output = Vec::new();
    for seg in iter {
        if seg.speaker == acc.speaker && seg.start - acc.end < max_gap {
            acc.text.push(' ');
            acc.text.push_str(&seg.text);
            acc.end = seg.end;
        } else {
            output.push(acc);
            acc = seg;
        }
    }
    output.push(acc);

    output
}
