//! Cloze QA batch preparation CLI.
//!
//! Builds the preparation pipeline over a dataset directory and previews
//! what the training loop would consume: vocabulary layout and the shapes
//! of the first prepared batches.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use clozeprep_core::{PreparedBatch, StreamConfig, Vocabulary, build_stream};

/// CLI arguments
#[derive(Parser)]
#[command(name = "clozeprep")]
#[command(about = "Prepare cloze-style QA batches for training")]
#[command(version)]
struct Cli {
    /// Pipeline configuration file (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed for example shuffling and entity anonymization
    #[arg(short, long, global = true, default_value_t = 42)]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the first batches of a prepared stream
    Inspect {
        /// Directory of question files
        data_dir: PathBuf,

        /// Newline-delimited vocabulary word list
        vocab: PathBuf,

        /// Number of batches to print
        #[arg(short = 'n', long, default_value_t = 3)]
        batches: usize,
    },
    /// Summarize the vocabulary a word list would produce
    Vocab {
        /// Newline-delimited vocabulary word list
        vocab: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect {
            data_dir,
            vocab,
            batches,
        } => inspect(&config, &data_dir, &vocab, cli.seed, batches),
        Commands::Vocab { vocab } => summarize_vocab(&config, &vocab),
    }
}

/// Loads the configuration from `path`, or falls back to the defaults.
/// Either way the result is validated before any subcommand runs.
fn load_config(path: Option<&Path>) -> Result<StreamConfig> {
    let config = match path {
        Some(path) => StreamConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StreamConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn inspect(
    config: &StreamConfig,
    data_dir: &Path,
    vocab_file: &Path,
    seed: u64,
    limit: usize,
) -> Result<()> {
    let vocab = Vocabulary::from_word_file(vocab_file, config.n_entities, config.needs_sep_token())?;
    info!(
        vocab_size = vocab.len(),
        n_entities = config.n_entities,
        seed,
        "vocabulary loaded"
    );

    let stream = build_stream(&vocab, data_dir, config, seed)?;
    let mut total = 0usize;
    for (i, batch) in stream.take(limit).enumerate() {
        let batch = batch.with_context(|| format!("preparing batch {i}"))?;
        total += batch.len();
        match &batch {
            PreparedBatch::Split(b) => println!(
                "batch {i}: {} examples | context {}x{} | question {}x{} | candidates {}x{}",
                b.len(),
                b.context.rows(),
                b.context.width(),
                b.question.rows(),
                b.question.width(),
                b.candidates.rows(),
                b.candidates.width(),
            ),
            PreparedBatch::Joined(b) => println!(
                "batch {i}: {} examples | sequence {}x{} | candidates {}x{}",
                b.len(),
                b.sequence.rows(),
                b.sequence.width(),
                b.candidates.rows(),
                b.candidates.width(),
            ),
        }
    }
    info!(total_examples = total, "preview complete");
    Ok(())
}

fn summarize_vocab(config: &StreamConfig, vocab_file: &Path) -> Result<()> {
    let vocab = Vocabulary::from_word_file(vocab_file, config.n_entities, config.needs_sep_token())?;

    println!("vocab size:      {}", vocab.len());
    println!("entity tokens:   {}", vocab.n_entities());
    println!("<UNK> id:        {}", vocab.unk_id());
    println!("@placeholder id: {}", vocab.placeholder_id());
    match vocab.sep_id() {
        Some(id) => println!("<SEP> id:        {id}"),
        None => println!("<SEP>:           not configured"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_load_and_validate() {
        let config = load_config(None).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, StreamConfig::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_entities": 9, "batch_size": 4}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.n_entities, 9);
        assert_eq!(config.batch_size, 4);
    }

    #[test]
    fn invalid_config_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sort_batch_count": 0}}"#).unwrap();
        assert!(load_config(Some(file.path())).is_err());

        assert!(load_config(Some(Path::new("/nonexistent/config.json"))).is_err());
    }
}
