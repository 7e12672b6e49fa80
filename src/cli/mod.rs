// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `build-corpus` — segments raw pairs into a corpus dir
//   2. `inspect`      — prints a corpus' sizes and batch layout
//   3. `train`        — trains the seq2seq model on a corpus
//   4. `encode`       — prints the IDs of a piece of text
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildCorpusArgs, Commands, EncodeArgs, InspectArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-pipeline",
    version = "0.1.0",
    about = "Build a seq2seq corpus from paired text, then train an LSTM encoder-decoder on it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::BuildCorpus(args) => run_build_corpus(args),
            Commands::Inspect(args)     => run_inspect(args),
            Commands::Train(args)       => run_train(args),
            Commands::Encode(args)      => run_encode(args),
        }
    }
}

fn run_build_corpus(args: BuildCorpusArgs) -> Result<()> {
    use crate::application::build_corpus_use_case::BuildCorpusUseCase;

    let output_dir = args.output_dir.clone();
    let meta = BuildCorpusUseCase::new(args.into()).execute()?;

    println!("Corpus written to '{output_dir}'");
    println!("  examples:           {}", meta.example_count);
    println!("  dict size:          {}", meta.dict_size);
    println!("  feature max length: {}", meta.feature_max_length);
    println!("  label max length:   {}", meta.label_max_length);
    println!("  row size:           {}", meta.row_size);
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(args.into()).execute()?;

    println!("examples:        {} (corpus.json: {})", report.loaded_examples, report.meta.example_count);
    println!("dict size:       {}", report.meta.dict_size);
    println!("row size:        {}", report.row_size);
    println!("label policy:    {:?}", report.meta.label_length_policy);
    println!("batches:         {}", report.total_batches);
    println!("macro-batches:   {}", report.total_macro_batches);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus in: {}", args.corpus_dir);

    let checkpoint_dir = args.checkpoint_dir.clone();
    let summary = TrainUseCase::new(args.into()).execute()?;

    match summary.last_mean_loss {
        Some(loss) => println!(
            "Training complete: {} epochs, {} batches, last mean loss {:.4}. Backup in '{}'.",
            summary.epochs, summary.batches, loss, checkpoint_dir,
        ),
        None => println!("Nothing left to train. Backup in '{checkpoint_dir}'."),
    }
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    use crate::application::encode_use_case::EncodeUseCase;

    let use_case = EncodeUseCase::new(
        &args.corpus_dir,
        args.segmenter.into(),
        args.tokenizer.as_deref(),
    )?;
    let ids = use_case.encode(&args.text)?;

    let joined: Vec<String> = ids.iter().map(u32::to_string).collect();
    println!("{}", joined.join(","));
    println!("{}", use_case.decode(&ids).join(" "));
    Ok(())
}
