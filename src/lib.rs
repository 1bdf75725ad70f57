//! docs-translate: clone, normalise and machine-translate a versioned
//! markdown documentation tree, staging the result in git.
//!
//! The normalisation pipeline in [`normalize`] is pure and reusable; the
//! surrounding modules are orchestration over the git CLI and a
//! chat-completion translation provider.

pub mod config;
pub mod docs;
pub mod git;
pub mod load_config;
pub mod normalize;
pub mod synchronise;
pub mod translate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use load_config::load_config;
use std::path::PathBuf;
use synchronise::synchronise;
use translate::OpenAiTranslator;

/// CLI for docs-translate: keep a translated docs tree in sync with
/// upstream.
#[derive(Parser)]
#[clap(
    name = "docs-translate",
    version,
    about = "Clone, normalise and machine-translate a versioned markdown documentation tree"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh all branch snapshots and translate changed documents
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Repository root holding the versioned docs tree (default: cwd)
        #[clap(long)]
        repo_root: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, repo_root } => {
            let config = load_config(config)?;
            let repo_root = match repo_root {
                Some(root) => root,
                None => std::env::current_dir()?,
            };
            let translator = OpenAiTranslator::from_env(&config.translation)?;

            println!("Synchronise starting...");
            match synchronise(&repo_root, &config, &translator).await {
                Ok(report) => {
                    println!("Synchronise complete.\nReport:");
                    println!("{report:#?}");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Synchronisation failed: {e:#}");
                    Err(e)
                }
            }
        }
    }
}
