use async_trait::async_trait;

use crate::core::errors::{EmbedError, GenerationError};

/// Maps a text string to a fixed-dimension vector. Deterministic for a
/// given model configuration and free of side effects; failure aborts
/// only the retrieval step of a query.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// provider name (e.g. "openai") for logs
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Opaque text-generation capability: prompt in, answer text out.
#[async_trait]
pub trait Generator: Send + Sync {
    /// provider name for logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

#[cfg(test)]
pub mod test_support {
    //! Deterministic in-process providers for pipeline tests.

    use std::collections::HashMap;

    use super::*;

    pub struct StubEmbedder {
        dimension: usize,
        mapping: HashMap<String, Vec<f32>>,
        fail: bool,
    }

    impl StubEmbedder {
        /// Embeds any text to `[len, len, ...]` of the given dimension.
        pub fn by_length(dimension: usize) -> Self {
            StubEmbedder {
                dimension,
                mapping: HashMap::new(),
                fail: false,
            }
        }

        /// Embeds the listed texts to the given vectors; anything else
        /// falls back to the length rule.
        pub fn with_mapping(dimension: usize, pairs: &[(&str, &[f32])]) -> Self {
            let mapping = pairs
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                .collect();
            StubEmbedder {
                dimension,
                mapping,
                fail: false,
            }
        }

        pub fn failing() -> Self {
            StubEmbedder {
                dimension: 0,
                mapping: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn name(&self) -> &str {
            "stub-embedder"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            if self.fail {
                return Err(EmbedError::Provider("stub embedder is down".to_string()));
            }
            if let Some(vector) = self.mapping.get(text) {
                return Ok(vector.clone());
            }
            Ok(vec![text.len() as f32; self.dimension])
        }
    }

    pub struct StubGenerator {
        reply: Option<String>,
        echo: bool,
    }

    impl StubGenerator {
        pub fn fixed(reply: impl Into<String>) -> Self {
            StubGenerator {
                reply: Some(reply.into()),
                echo: false,
            }
        }

        /// Returns the prompt as the answer, so tests can inspect the
        /// framing the orchestrator produced.
        pub fn echo() -> Self {
            StubGenerator {
                reply: None,
                echo: true,
            }
        }

        pub fn failing() -> Self {
            StubGenerator {
                reply: None,
                echo: false,
            }
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        fn name(&self) -> &str {
            "stub-generator"
        }

        async fn generate(
            &self,
            prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, GenerationError> {
            if self.echo {
                return Ok(prompt.to_string());
            }
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(GenerationError::Provider(
                    "stub generator is down".to_string(),
                )),
            }
        }
    }
}
