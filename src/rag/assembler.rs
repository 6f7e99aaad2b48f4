//! Context assembly: retrieval plus extraction, fused under a budget.

use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::extract::{self, UploadedDocument};
use crate::index::VectorIndex;
use crate::llm::Embedder;

/// Tuning knobs for context assembly.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Number of corpus chunks retrieved per question.
    pub top_k: usize,
    /// Character budget for the fused context.
    pub max_context_chars: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            top_k: 3,
            max_context_chars: 12_000,
        }
    }
}

impl From<&AppConfig> for AssemblerConfig {
    fn from(config: &AppConfig) -> Self {
        AssemblerConfig {
            top_k: config.top_k,
            max_context_chars: config.max_context_chars,
        }
    }
}

/// The fused context for one query, with provenance for history and
/// prompt framing. Rebuilt from scratch on every query; never cached.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub text: String,
    pub retrieved_chunks: usize,
    pub document_name: Option<String>,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Orchestrates retrieval and extraction into one bounded context string.
pub struct ContextAssembler {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    config: AssemblerConfig,
}

impl ContextAssembler {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        config: AssemblerConfig,
    ) -> Self {
        ContextAssembler {
            index,
            embedder,
            config,
        }
    }

    /// Assemble context for a question and an optional uploaded document.
    ///
    /// Infallible: embedding failure degrades to document-only context,
    /// and extraction failure is already a placeholder string.
    pub async fn assemble(
        &self,
        question: &str,
        doc: Option<&UploadedDocument>,
    ) -> AssembledContext {
        let document_name = doc.map(|d| d.name.clone());

        let doc_text = match doc {
            Some(doc) => {
                let doc = doc.clone();
                match tokio::task::spawn_blocking(move || extract::extract(&doc)).await {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!("extraction task failed: {}", err);
                        format!(
                            "[could not read {}: extraction task failed]",
                            document_name.as_deref().unwrap_or("document")
                        )
                    }
                }
            }
            None => String::new(),
        };

        let (corpus_text, retrieved_chunks) = self.retrieve(question).await;

        let text = fuse(&corpus_text, &doc_text, self.config.max_context_chars);
        AssembledContext {
            text,
            retrieved_chunks,
            document_name,
        }
    }

    async fn retrieve(&self, question: &str) -> (String, usize) {
        if self.index.is_empty() {
            return (String::new(), 0);
        }

        let query = match self.embedder.embed(question).await {
            Ok(vector) => vector,
            Err(err) => {
                tracing::warn!("question embedding failed, answering without retrieval: {}", err);
                return (String::new(), 0);
            }
        };

        match self.index.search(&query, self.config.top_k) {
            Ok(hits) => {
                let count = hits.len();
                let joined = hits
                    .into_iter()
                    .map(|hit| hit.text)
                    .collect::<Vec<_>>()
                    .join("\n");
                (joined, count)
            }
            Err(err) => {
                tracing::warn!("index lookup failed, answering without retrieval: {}", err);
                (String::new(), 0)
            }
        }
    }
}

/// Concatenate corpus text and document text, corpus first, within the
/// character budget. The corpus is allocated budget first; the document
/// gets whatever space remains. Retrieved chunks already went through
/// relevance ranking, a raw document dump did not.
fn fuse(corpus: &str, doc: &str, max_chars: usize) -> String {
    let corpus = truncate_chars(corpus.trim(), max_chars);

    let mut remaining = max_chars.saturating_sub(corpus.chars().count());
    if !corpus.is_empty() && remaining > 0 {
        // Space for the separator between the two parts.
        remaining = remaining.saturating_sub(2);
    }
    let doc = truncate_chars(doc.trim(), remaining);

    match (corpus.is_empty(), doc.is_empty()) {
        (true, true) => String::new(),
        (false, true) => corpus.to_string(),
        (true, false) => doc.to_string(),
        (false, false) => format!("{}\n\n{}", corpus, doc),
    }
}

/// Char-boundary-safe prefix of at most `max_chars` characters.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].trim_end(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::test_support::StubEmbedder;
    use ndarray::Array2;

    fn index_with(texts: &[&str], rows: Vec<Vec<f32>>) -> Arc<VectorIndex> {
        let dim = rows.first().map_or(0, |r| r.len());
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Arc::new(VectorIndex::new(
            Array2::from_shape_vec((rows.len(), dim), flat).unwrap(),
            texts.iter().map(|t| t.to_string()).collect(),
        ))
    }

    fn assembler(index: Arc<VectorIndex>, embedder: StubEmbedder) -> ContextAssembler {
        ContextAssembler::new(index, Arc::new(embedder), AssemblerConfig::default())
    }

    #[tokio::test]
    async fn no_matches_and_no_document_yields_empty_context() {
        let assembler = assembler(
            Arc::new(VectorIndex::empty()),
            StubEmbedder::by_length(2),
        );
        let context = assembler.assemble("what is photosynthesis?", None).await;
        assert!(context.is_empty());
        assert_eq!(context.retrieved_chunks, 0);
        assert!(context.document_name.is_none());
    }

    #[tokio::test]
    async fn retrieval_orders_chunks_closest_first() {
        let index = index_with(
            &["far chunk", "near chunk"],
            vec![vec![10.0, 0.0], vec![1.0, 0.0]],
        );
        let embedder = StubEmbedder::with_mapping(2, &[("q", &[0.0, 0.0])]);
        let context = assembler(index, embedder).assemble("q", None).await;

        assert_eq!(context.retrieved_chunks, 2);
        assert_eq!(context.text, "near chunk\nfar chunk");
    }

    #[tokio::test]
    async fn embedding_failure_degrades_to_document_only_context() {
        let index = index_with(&["corpus chunk"], vec![vec![1.0]]);
        let assembler = assembler(index, StubEmbedder::failing());

        let doc = UploadedDocument::from_bytes("notes.txt", b"my lecture notes".to_vec());
        let context = assembler.assemble("q", Some(&doc)).await;

        assert_eq!(context.text, "my lecture notes");
        assert_eq!(context.retrieved_chunks, 0);
        assert_eq!(context.document_name.as_deref(), Some("notes.txt"));
    }

    #[tokio::test]
    async fn corpus_comes_before_document_text() {
        let index = index_with(&["indexed fact"], vec![vec![0.0]]);
        let embedder = StubEmbedder::with_mapping(1, &[("q", &[0.0])]);
        let doc = UploadedDocument::from_bytes("extra.txt", b"uploaded detail".to_vec());

        let context = assembler(index, embedder).assemble("q", Some(&doc)).await;
        assert_eq!(context.text, "indexed fact\n\nuploaded detail");
    }

    #[test]
    fn fuse_gives_corpus_the_budget_first() {
        // Corpus alone exceeds the budget: document is dropped entirely.
        let fused = fuse("abcdefghij", "doc", 5);
        assert_eq!(fused, "abcde");

        // Corpus fits: document is truncated to the remaining space.
        let fused = fuse("abc", "0123456789", 9);
        assert_eq!(fused, "abc\n\n0123");
    }

    #[test]
    fn fuse_of_two_empties_is_empty() {
        assert_eq!(fuse("  ", "\n", 100), "");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "héllo wörld";
        let cut = truncate_chars(s, 4);
        assert_eq!(cut, "héll");
    }
}
