pub mod input;
pub mod output;

pub use input::{parse_primary_file, parse_secondary_file, parse_transcript_file};
pub use output::write_transcript;
