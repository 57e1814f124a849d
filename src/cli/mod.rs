//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "importpick",
    version,
    about = "Find an import statement for a symbol and insert it into a file",
    long_about = "importpick searches a JavaScript/TypeScript project for existing import statements, \
                  streams them (deduplicated and ranked) into a fuzzy selector, and inserts the chosen \
                  line at the top of the target file's import block."
)]
pub struct Cli {
    /// Config file path (defaults to ~/.config/importpick/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick an import and insert it into a file
    Add {
        /// Target file, optionally suffixed with :row:col to use the symbol there
        target: String,

        /// Symbol or module to search for (overrides the position)
        #[arg(short, long)]
        keyword: Option<String>,

        /// Selector prompt (defaults to "<keyword>> " or the configured prompt)
        #[arg(short, long)]
        prompt: Option<String>,

        /// Project root to search (defaults to the nearest marker directory)
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Show where the import would go without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the identifier at a file position
    Symbol {
        /// Position as path:row:col (1-indexed)
        target: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::parse_from([
            "importpick",
            "add",
            "src/app.ts:3:9",
            "--dry-run",
            "-k",
            "Foo",
        ]);
        match cli.command {
            Commands::Add {
                target,
                keyword,
                dry_run,
                ..
            } => {
                assert_eq!(target, "src/app.ts:3:9");
                assert_eq!(keyword.as_deref(), Some("Foo"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
