pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod stages;

pub use error::PipelineError;
pub use io::{parse_primary_file, parse_secondary_file, parse_transcript_file, write_transcript};
pub use models::{Segment, StructuredTranscript, TranscriptMetadata};
pub use pipeline::{merge_sources, rereduce, ReconcileOptions, ReconcilePipeline};
pub use sources::{
    DiarizerClient, DiarizerConfig, DiarizeSource, PrimaryTranscription, SecondaryDiarization,
    TranscribeSource, WhisperClient, WhisperConfig,
};
pub use stages::{align, canonicalize, coalesce, reduce_speakers, DEFAULT_MAX_GAP};
