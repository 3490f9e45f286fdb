// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `init`, `predict` and `stats` and all
// their configurable flags.
//
// clap's derive macros generate help text, missing-argument
// errors and string → number conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use dna_phenotype::application::scaffold_use_case::ScaffoldConfig;
use dna_phenotype::data::tokenizer::{DEFAULT_K, DEFAULT_MAX_KMERS};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a vocabulary from a sequence corpus and write an
    /// initialised checkpoint bundle
    Init(InitArgs),

    /// Predict phenotypes for a sequence or a sequence file
    Predict(PredictArgs),

    /// Print base composition and GC statistics
    Stats(StatsArgs),
}

/// Compute device for the model
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendChoice {
    /// NdArray on the CPU
    Cpu,
    /// Wgpu on the default GPU adapter
    Gpu,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Sequence file or directory (FASTA or plain text)
    #[arg(long, default_value = "data/sequences")]
    pub corpus: String,

    /// Directory to write the checkpoint bundle to
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Phenotype labels in class-id order
    #[arg(long, value_delimiter = ',', default_value = "HEALTHY,SICKLECELLAEMIA")]
    pub phenotypes: Vec<String>,

    /// k-mer length
    #[arg(long, default_value_t = DEFAULT_K)]
    pub k: usize,

    /// Also count the reverse complement of every k-mer window
    #[arg(long)]
    pub reverse_complement: bool,

    /// Maximum number of k-mers kept in the vocabulary
    #[arg(long, default_value_t = DEFAULT_MAX_KMERS)]
    pub max_kmers: usize,

    /// Hidden width; must be divisible by --heads
    #[arg(long, default_value_t = 256)]
    pub dim: usize,

    /// Number of transformer blocks
    #[arg(long, default_value_t = 6)]
    pub depth: usize,

    #[arg(long, default_value_t = 8)]
    pub heads: usize,

    /// Maximum tokens per sequence
    #[arg(long, default_value_t = 1024)]
    pub max_len: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    pub backend: BackendChoice,
}

/// Layer 1 → Layer 2 boundary: the use case never sees clap types.
impl From<InitArgs> for ScaffoldConfig {
    fn from(a: InitArgs) -> Self {
        ScaffoldConfig {
            corpus_path:                a.corpus,
            checkpoint_dir:             a.checkpoint_dir,
            phenotypes:                 a.phenotypes,
            k:                          a.k,
            include_reverse_complement: a.reverse_complement,
            max_kmers:                  a.max_kmers,
            dim:                        a.dim,
            depth:                      a.depth,
            heads:                      a.heads,
            max_len:                    a.max_len,
            dropout:                    a.dropout,
        }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["sequence", "input"])))]
pub struct PredictArgs {
    /// Raw DNA sequence
    #[arg(long)]
    pub sequence: Option<String>,

    /// Sequence file or directory
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory holding the checkpoint bundle
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    pub backend: BackendChoice,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["sequence", "input"])))]
pub struct StatsArgs {
    /// Raw DNA sequence
    #[arg(long)]
    pub sequence: Option<String>,

    /// Sequence file or directory
    #[arg(long)]
    pub input: Option<PathBuf>,
}
