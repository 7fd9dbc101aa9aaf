//! CLI module for Svar.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - retrieval-augmented question answering
///
/// Ingest pasted text, PDFs, and YouTube captions into a vector index and
/// ask grounded questions over HTTP or from the command line. The name
/// "Svar" comes from the Norwegian/Scandinavian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Listen port
        #[arg(long, env = "SVAR_PORT")]
        port: Option<u16>,
    },

    /// Ask a question against the shared index
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        chunks: Option<usize>,
    },
}
