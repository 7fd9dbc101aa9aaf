//! Prompt context assembly from retrieved chunks.

use crate::vector_store::ScoredChunk;
use tracing::warn;

/// Format retrieved chunks into labeled context blocks.
///
/// Each chunk becomes `Doc <i> (source: <source>)` followed by its content
/// truncated to `chunk_char_cap` characters, blocks joined by blank lines.
/// Assembly stops once `max_total_chars` is reached so the prompt stays
/// within the model's input limit regardless of k or chunk size.
pub fn format_context(
    chunks: &[ScoredChunk],
    chunk_char_cap: usize,
    max_total_chars: usize,
) -> String {
    let mut blocks = Vec::new();
    let mut total = 0usize;

    for (i, chunk) in chunks.iter().enumerate() {
        let content = truncate_chars(&chunk.content, chunk_char_cap);
        let block = format!("Doc {} (source: {})\n{}", i + 1, chunk.source, content);

        let block_len = block.chars().count();
        if total + block_len > max_total_chars && !blocks.is_empty() {
            warn!(
                "context budget reached, dropping {} of {} retrieved chunks",
                chunks.len() - i,
                chunks.len()
            );
            break;
        }
        total += block_len;
        blocks.push(block);
    }

    blocks.join("\n\n")
}

/// Leading excerpt of a chunk for source citations.
pub fn snippet(content: &str, max_chars: usize) -> String {
    truncate_chars(content, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
