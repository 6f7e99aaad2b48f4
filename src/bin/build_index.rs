//! Corpus index builder.
//!
//! Reads a plain-text corpus file, splits it into overlapping chunks,
//! embeds every chunk through the configured provider, and writes the
//! index artifacts that the assistant loads at startup.
//!
//! ```text
//! build_index <corpus.txt>
//! ```

use anyhow::{bail, Context};

use mentora_backend::core::config::{AppConfig, AppPaths};
use mentora_backend::index::{Chunk, VectorIndex};
use mentora_backend::llm::OpenAiProvider;
use mentora_backend::logging;

const CHUNK_SIZE: usize = 500;
const CHUNK_OVERLAP: usize = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = AppPaths::new();
    logging::init(&paths);

    let Some(corpus_path) = std::env::args().nth(1) else {
        bail!("usage: build_index <corpus.txt>");
    };

    let config = AppConfig::load(&paths)?;
    let provider = OpenAiProvider::new(&config);

    let text = std::fs::read_to_string(&corpus_path)
        .with_context(|| format!("failed to read {}", corpus_path))?;
    let chunks = split_corpus(&text, CHUNK_SIZE, CHUNK_OVERLAP);
    if chunks.is_empty() {
        bail!("{} contains no text to index", corpus_path);
    }
    tracing::info!("embedding {} chunks from {}", chunks.len(), corpus_path);

    let index = VectorIndex::build(&chunks, &provider).await?;
    index.save(&paths.index_dir)?;

    println!(
        "indexed {} chunks (dimension {}) into {}",
        index.len(),
        index.dimension(),
        paths.index_dir.display()
    );
    Ok(())
}

/// Split text into overlapping character windows, preferring to cut at a
/// sentence boundary near the end of each window.
fn split_corpus(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();

        let piece = if end < chars.len() {
            cut_at_sentence_boundary(&window)
        } else {
            window
        };
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(Chunk {
                id: chunks.len() as u32,
                text: piece.to_string(),
            });
        }

        start += step;
    }
    chunks
}

/// Look for a sentence ending in the last fifth of the window; keep the
/// window as-is when there is none.
fn cut_at_sentence_boundary(window: &str) -> String {
    let endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];
    let search_start = window
        .char_indices()
        .nth(window.chars().count() * 4 / 5)
        .map(|(i, _)| i)
        .unwrap_or(0);

    for ending in endings {
        if let Some(pos) = window[search_start..].rfind(ending) {
            let cut = search_start + pos + ending.len();
            return window[..cut].to_string();
        }
    }
    window.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_sequentially_numbered_and_bounded() {
        let text = "One sentence here. ".repeat(100);
        let chunks = split_corpus(&text, 200, 20);

        assert!(!chunks.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, i as u32);
            assert!(chunk.text.chars().count() <= 200);
        }
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_corpus("just a note", 500, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "just a note");
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(split_corpus("   \n", 500, 50).is_empty());
    }

    #[test]
    fn windows_prefer_sentence_boundaries() {
        let text = format!("{}{}", "word ".repeat(30), "End of sentence. More trailing text here");
        let cut = cut_at_sentence_boundary(&text);
        assert!(cut.ends_with("End of sentence. "));
    }
}
