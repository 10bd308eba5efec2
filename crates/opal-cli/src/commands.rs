use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "opal")]
#[command(about = "Keeps a markdown vault in sync with bookmarks and starred repositories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index, fix changed notes, sync external records and validate
    Run {
        /// Vault directory; overrides the configured vault_path
        vault: Option<String>,
    },
    /// Hash every note and refresh stored frontmatter
    Index { vault: Option<String> },
    /// List notes whose content changed since they were last processed
    Changed { vault: Option<String> },
    /// Fix changed notes and mark them processed
    Fix { vault: Option<String> },
    /// Write notes for records not yet present in the vault
    Sync {
        /// Restrict to one record kind; both kinds run when omitted
        #[arg(long, value_enum)]
        only: Option<SyncKind>,
        vault: Option<String>,
    },
    /// Report missing files and duplicate content
    Validate { vault: Option<String> },
    /// Print configuration values
    PrintConfig { vault: Option<String> },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SyncKind {
    Bookmarks,
    Stars,
}

impl Commands {
    pub fn vault(&self) -> Option<&str> {
        match self {
            Commands::Run { vault }
            | Commands::Index { vault }
            | Commands::Changed { vault }
            | Commands::Fix { vault }
            | Commands::Sync { vault, .. }
            | Commands::Validate { vault }
            | Commands::PrintConfig { vault } => vault.as_deref(),
        }
    }
}
