//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai::ensure_api_key;
use crate::orchestrator::Orchestrator;
use crate::rag::RagEngine;
use anyhow::Result;

/// Run the ask command against the shared collection.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    chunks: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = ensure_api_key() {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.rag.model = model;
    }
    if let Some(chunks) = chunks {
        settings.rag.max_context_chunks = chunks;
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    let gateway = orchestrator.gateway();
    let handle = gateway.connect(&settings.vector_store.collection);
    let engine = RagEngine::new(gateway, settings.rag.clone());

    let spinner = Output::spinner("Searching the index...");

    match engine.answer(&handle, question).await {
        Ok(answer) => {
            spinner.finish_and_clear();

            println!("\n{}\n", answer.text);

            if !answer.sources.is_empty() {
                Output::header("Sources");
                for source in &answer.sources {
                    Output::source(&source.source, &source.snippet);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
