use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crosstalk::{
    merge_sources, parse_primary_file, parse_secondary_file, parse_transcript_file, rereduce,
    write_transcript, DiarizerClient, DiarizerConfig, ReconcileOptions, ReconcilePipeline,
    WhisperClient, WhisperConfig, DEFAULT_MAX_GAP,
};

#[derive(Parser)]
#[command(name = "crosstalk")]
#[command(author, version, about = "Hybrid transcription reconciliation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe and diarize an audio file, then reconcile the two results
    Reconcile {
        /// Audio file to process
        #[arg(short, long)]
        audio: PathBuf,

        /// Output file for the reconciled transcript (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Language hint forwarded to both engines
        #[arg(long)]
        language: Option<String>,

        /// Known number of speakers, forwarded to the diarization engine
        #[arg(long)]
        num_speakers: Option<usize>,

        /// Merge least frequent speakers until at most this many remain
        #[arg(long)]
        target_speakers: Option<usize>,

        /// Maximum silence in seconds between same-speaker segments to merge
        #[arg(long, default_value_t = DEFAULT_MAX_GAP)]
        max_gap: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Reconcile saved engine outputs without calling either service
    Merge {
        /// Saved primary transcription (JSON)
        #[arg(short, long)]
        primary: PathBuf,

        /// Saved diarization result (JSON)
        #[arg(short, long)]
        secondary: PathBuf,

        /// Output file for the reconciled transcript (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Merge least frequent speakers until at most this many remain
        #[arg(long)]
        target_speakers: Option<usize>,

        /// Maximum silence in seconds between same-speaker segments to merge
        #[arg(long, default_value_t = DEFAULT_MAX_GAP)]
        max_gap: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Lower the speaker count of an existing reconciled transcript
    Reduce {
        /// Previously written transcript (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Target number of distinct speakers
        #[arg(short, long)]
        target: usize,

        /// Output file (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Reconcile {
            audio,
            output,
            language,
            num_speakers,
            target_speakers,
            max_gap,
            verbose,
        } => {
            setup_logging(verbose);
            let options = ReconcileOptions {
                language,
                num_speakers,
                target_speaker_count: target_speakers,
                max_gap,
            };
            run_reconcile(audio, output, options).await
        }
        Commands::Merge {
            primary,
            secondary,
            output,
            target_speakers,
            max_gap,
            verbose,
        } => {
            setup_logging(verbose);
            let options = ReconcileOptions {
                target_speaker_count: target_speakers,
                max_gap,
                ..Default::default()
            };
            run_merge(primary, secondary, output, options)
        }
        Commands::Reduce {
            input,
            target,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            run_reduce(input, target, output)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_reconcile(
    audio: PathBuf,
    output: PathBuf,
    options: ReconcileOptions,
) -> Result<()> {
    let whisper = WhisperClient::new(WhisperConfig::from_env()?);
    let diarizer = DiarizerClient::new(DiarizerConfig::from_env()?);
    let pipeline = ReconcilePipeline::new(Arc::new(whisper), Arc::new(diarizer));

    info!("Reconciling {:?}", audio);
    let transcript = pipeline
        .reconcile(&audio, &options)
        .await
        .context("Reconciliation failed")?;

    report(&transcript);
    write_transcript(&transcript, &output)?;
    info!("Output written to {:?}", output);
    Ok(())
}

fn run_merge(
    primary: PathBuf,
    secondary: PathBuf,
    output: PathBuf,
    options: ReconcileOptions,
) -> Result<()> {
    let primary = parse_primary_file(&primary).context("Failed to parse primary input")?;
    let secondary = parse_secondary_file(&secondary).context("Failed to parse secondary input")?;

    let transcript =
        merge_sources(&primary, &secondary, &options).context("Reconciliation failed")?;

    report(&transcript);
    write_transcript(&transcript, &output)?;
    info!("Output written to {:?}", output);
    Ok(())
}

fn run_reduce(input: PathBuf, target: usize, output: PathBuf) -> Result<()> {
    let transcript = parse_transcript_file(&input).context("Failed to parse input transcript")?;

    info!(
        "Reducing transcript {} from {:?} to at most {} speakers",
        transcript.transcript_id, transcript.metadata.speaker_count, target
    );
    let reduced = rereduce(&transcript, target).context("Reduction failed")?;

    report(&reduced);
    write_transcript(&reduced, &output)?;
    info!("Output written to {:?}", output);
    Ok(())
}

fn report(transcript: &crosstalk::StructuredTranscript) {
    info!(
        "Transcript {}: {} segments, {} speakers, duration {:?}",
        transcript.transcript_id,
        transcript.segments.len(),
        transcript.metadata.speaker_count.unwrap_or(0),
        transcript.metadata.duration
    );
}
