//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Self-documenting target trees: list, document and inspect build targets
#[derive(Parser, Debug)]
#[command(name = "helptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Targets file (default: targets_file from config)
    #[arg(short = 'f', long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the help text (default command)
    Doc {
        /// List unannotated leaves too
        #[arg(short, long)]
        all: bool,
        /// Prefix every listed path, e.g. packages.x86_64-linux
        #[arg(long)]
        base_path: Option<String>,
        /// Omit the header
        #[arg(long)]
        raw: bool,
    },

    /// List documented paths, one per line
    List {
        /// List unannotated leaves too
        #[arg(short, long)]
        all: bool,
    },

    /// Show a value as a tree (default: the whole tree)
    Show {
        /// Dotted attribute path
        path: Option<String>,
    },

    /// Print the value at a dotted path
    Get {
        /// Dotted attribute path; quote segments containing dots: a."b.c"
        path: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
