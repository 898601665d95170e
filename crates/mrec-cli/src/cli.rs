use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mrec",
    about = "Schema-driven Merkle records: encode, verify, and inspect",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with engine settings (hash function, block size limit)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered record kinds
    Kinds,
    /// Encode a JSON document into a record block
    Encode(EncodeArgs),
    /// Decode and verify a record block
    Decode(BlockArgs),
    /// Resolve a path within a record block
    Resolve(ResolveArgs),
    /// List the paths of a record block
    Tree(TreeArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    #[arg(long)]
    pub kind: String,
    #[arg(long, default_value = "1")]
    pub schema_version: u64,
    /// JSON input; `-` or absent reads stdin
    pub input: Option<PathBuf>,
    /// Write the raw block here instead of printing it as hex
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct BlockArgs {
    #[arg(long)]
    pub kind: String,
    /// Expected content identifier of the block
    #[arg(long)]
    pub cid: String,
    /// Raw block file
    pub block: PathBuf,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub block: BlockArgs,
    /// Slash-separated path, e.g. `stakeholders/0/stakeholder`
    pub path: String,
}

#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub block: BlockArgs,
    /// Only list paths at most this many segments deep
    #[arg(long)]
    pub depth: Option<u32>,
}
