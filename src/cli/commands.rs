// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their configurable flags:
//
//   build-corpus — raw pairs → ID files + vocabulary
//   inspect      — sizes and batch layout of a built corpus
//   train        — train the encoder-decoder on a built corpus
//   encode       — map text to IDs through a built vocabulary
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    build_corpus_use_case::BuildCorpusConfig,
    segmentation::SegmenterKind,
    train_use_case::TrainConfig,
};
use crate::domain::corpus::LabelLengthPolicy;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment raw (text, label) pairs and write a corpus directory
    BuildCorpus(BuildCorpusArgs),

    /// Load a corpus the way `train` would and print its layout
    Inspect(InspectArgs),

    /// Train the seq2seq model on a corpus directory
    Train(TrainArgs),

    /// Encode text into vocabulary IDs
    Encode(EncodeArgs),
}

// ─── Value enums ──────────────────────────────────────────────────────────────
// clap-facing mirrors of the application enums, so the
// application layer never depends on clap.

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SegmenterArg {
    /// Split on Unicode whitespace
    Whitespace,
    /// One token per non-whitespace character
    Char,
    /// Pretrained HuggingFace tokenizer (needs --tokenizer)
    HuggingFace,
}

impl From<SegmenterArg> for SegmenterKind {
    fn from(a: SegmenterArg) -> Self {
        match a {
            SegmenterArg::Whitespace  => SegmenterKind::Whitespace,
            SegmenterArg::Char        => SegmenterKind::Char,
            SegmenterArg::HuggingFace => SegmenterKind::HuggingFace,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LabelPolicyArg {
    /// Track the longest label on its own
    OwnMaximum,
    /// Compare label lengths with the feature maximum, as old corpora did
    LegacyFeatureThreshold,
}

impl From<LabelPolicyArg> for LabelLengthPolicy {
    fn from(a: LabelPolicyArg) -> Self {
        match a {
            LabelPolicyArg::OwnMaximum             => LabelLengthPolicy::OwnMaximum,
            LabelPolicyArg::LegacyFeatureThreshold => LabelLengthPolicy::LegacyFeatureThreshold,
        }
    }
}

// ─── build-corpus ─────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct BuildCorpusArgs {
    /// Delimited text file with one (text, label) pair per line
    #[arg(long)]
    pub source: String,

    /// Directory to write features.csv, labels.csv, vocabulary.json, corpus.json
    #[arg(long, default_value = "corpus")]
    pub output_dir: String,

    /// Column separator of the source file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Zero-based column holding the input text
    #[arg(long, default_value_t = 0)]
    pub feature_column: usize,

    /// Zero-based column holding the target text
    #[arg(long, default_value_t = 1)]
    pub label_column: usize,

    #[arg(long, value_enum, default_value_t = SegmenterArg::Whitespace)]
    pub segmenter: SegmenterArg,

    /// tokenizer.json for --segmenter hugging-face
    #[arg(long)]
    pub tokenizer: Option<String>,

    #[arg(long, value_enum, default_value_t = LabelPolicyArg::OwnMaximum)]
    pub label_policy: LabelPolicyArg,

    /// Blank lines written before the first row of each ID file
    #[arg(long, default_value_t = 0)]
    pub header_rows: usize,

    /// Existing vocabulary.json to extend instead of starting fresh
    #[arg(long)]
    pub base_vocabulary: Option<String>,
}

impl From<BuildCorpusArgs> for BuildCorpusConfig {
    fn from(a: BuildCorpusArgs) -> Self {
        BuildCorpusConfig {
            source_path:         a.source,
            output_dir:          a.output_dir,
            delimiter:           a.delimiter,
            feature_column:      a.feature_column,
            label_column:        a.label_column,
            segmenter:           a.segmenter.into(),
            tokenizer_path:      a.tokenizer,
            label_length_policy: a.label_policy.into(),
            header_rows:         a.header_rows,
            base_vocabulary:     a.base_vocabulary,
        }
    }
}

// ─── inspect ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long, default_value = "corpus")]
    pub corpus_dir: String,

    #[arg(long, default_value_t = 200)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 2)]
    pub batches_per_macrobatch: usize,

    /// Override the tensor width recorded in corpus.json
    #[arg(long)]
    pub row_size: Option<usize>,

    /// Override the header rows recorded in corpus.json
    #[arg(long)]
    pub skip_rows: Option<usize>,
}

impl From<InspectArgs> for TrainConfig {
    fn from(a: InspectArgs) -> Self {
        TrainConfig {
            corpus_dir:             a.corpus_dir,
            batch_size:             a.batch_size,
            batches_per_macrobatch: a.batches_per_macrobatch,
            row_size:               a.row_size,
            skip_rows:              a.skip_rows,
            ..TrainConfig::default()
        }
    }
}

// ─── train ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory written by build-corpus
    #[arg(long, default_value = "corpus")]
    pub corpus_dir: String,

    /// Directory for the model backup, training state and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Examples per batch
    #[arg(long, default_value_t = 200)]
    pub batch_size: usize,

    /// Batches fitted before the next checkpoint opportunity
    #[arg(long, default_value_t = 2)]
    pub batches_per_macrobatch: usize,

    /// Override the tensor width recorded in corpus.json
    #[arg(long)]
    pub row_size: Option<usize>,

    /// Override the header rows recorded in corpus.json
    #[arg(long)]
    pub skip_rows: Option<usize>,

    /// Batch the first epoch starts from
    #[arg(long, default_value_t = 0)]
    pub start_batch: usize,

    #[arg(long, default_value_t = 599)]
    pub epochs: usize,

    /// RMSProp learning rate
    #[arg(long, default_value_t = 5e-2)]
    pub lr: f64,

    #[arg(long, default_value_t = 256)]
    pub embedding_dim: usize,

    /// Width of both LSTM layers
    #[arg(long, default_value_t = 1024)]
    pub hidden_size: usize,

    /// L2 norm gradients are clipped to
    #[arg(long, default_value_t = 1.0)]
    pub grad_clip_norm: f32,

    /// Wall-clock seconds between backups
    #[arg(long, default_value_t = 100)]
    pub checkpoint_interval_secs: u64,

    /// Batches built ahead of the model (0 = no producer thread)
    #[arg(long, default_value_t = 2)]
    pub prefetch_depth: usize,

    /// Continue from the backup in --checkpoint-dir
    #[arg(long)]
    pub resume: bool,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_dir:               a.corpus_dir,
            checkpoint_dir:           a.checkpoint_dir,
            batch_size:               a.batch_size,
            batches_per_macrobatch:   a.batches_per_macrobatch,
            row_size:                 a.row_size,
            skip_rows:                a.skip_rows,
            start_batch:              a.start_batch,
            epochs:                   a.epochs,
            learning_rate:            a.lr,
            embedding_dim:            a.embedding_dim,
            hidden_size:              a.hidden_size,
            grad_clip_norm:           a.grad_clip_norm,
            checkpoint_interval_secs: a.checkpoint_interval_secs,
            prefetch_depth:           a.prefetch_depth,
            resume:                   a.resume,
        }
    }
}

// ─── encode ───────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Text to encode
    #[arg(long)]
    pub text: String,

    #[arg(long, default_value = "corpus")]
    pub corpus_dir: String,

    /// Must match the segmenter the corpus was built with
    #[arg(long, value_enum, default_value_t = SegmenterArg::Whitespace)]
    pub segmenter: SegmenterArg,

    #[arg(long)]
    pub tokenizer: Option<String>,
}
