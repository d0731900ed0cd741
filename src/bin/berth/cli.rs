//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use berth::core::{Language, PlatformKey};
use berth::util::shell::ColorChoice;

/// Berth - compiler toolchain detection for C, C++ and Fortran builds
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe for a compiler and record the toolchain environment
    Configure(ConfigureArgs),

    /// List the candidate compilers for a language and platform
    Candidates(CandidatesArgs),

    /// Show the recorded toolchain environment
    Env(EnvArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Language to configure (c, c++, fortran)
    #[arg(short, long, default_value = "c")]
    pub lang: Language,

    /// Candidates to try instead of the platform defaults (comma or space separated)
    #[arg(long, value_name = "LIST")]
    pub check_compiler: Option<String>,

    /// Platform whose candidate table is used (defaults to the host)
    #[arg(long)]
    pub platform: Option<PlatformKey>,

    /// Ignore the recorded environment and start from scratch
    #[arg(long)]
    pub fresh: bool,

    /// Do not write the environment to .berth/env.json
    #[arg(long)]
    pub no_save: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CandidatesArgs {
    /// Language to list candidates for
    #[arg(short, long, default_value = "c")]
    pub lang: Language,

    /// Platform to list candidates for (defaults to the host)
    #[arg(long)]
    pub platform: Option<PlatformKey>,

    /// List the table for every platform
    #[arg(long, conflicts_with = "platform")]
    pub all: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Only show this key
    pub key: Option<String>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
