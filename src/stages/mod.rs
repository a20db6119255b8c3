pub mod align;
pub mod canonical;
pub mod coalesce;
pub mod reduce;

pub use align::align;
pub use canonical::{canonical_label, canonicalize};
pub use coalesce::{coalesce, DEFAULT_MAX_GAP};
pub use reduce::reduce_speakers;
