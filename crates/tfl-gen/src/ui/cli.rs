use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "tfl-gen")]
#[command(author, version, about = "Generates typed Rust models and clients from the TfL OpenAPI documents")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Inspect a directory of OpenAPI documents
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate models, clients and endpoint configs
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Directory holding one OpenAPI JSON document per API
  #[arg(short, long, value_name = "DIR")]
  pub input: PathBuf,

  /// Directory the generated modules are written to
  #[arg(short, long, value_name = "DIR")]
  pub output: PathBuf,

  /// Rename policy JSON replacing the built-in one
  #[arg(short, long, value_name = "FILE")]
  pub policy: Option<PathBuf>,

  /// Base URL the generated clients talk to
  #[arg(long, value_name = "URL")]
  pub base_url: Option<String>,

  /// Upper bound on schema deduplication passes
  #[arg(long, value_name = "N")]
  pub max_dedup_passes: Option<usize>,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every operation across the documents
  Operations {
    /// Directory holding the OpenAPI JSON documents
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,
  },
  /// List the models the pipeline resolves, with their kinds
  Models {
    /// Directory holding the OpenAPI JSON documents
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// Rename policy JSON replacing the built-in one
    #[arg(short, long, value_name = "FILE")]
    policy: Option<PathBuf>,
  },
}
