//! Vector similarity index over the reference corpus.
//!
//! The index is built once (see `build_index`), persisted as a vector
//! matrix plus a parallel ordered text store, and loaded read-only at
//! process start. Search is an exact brute-force L2 scan: corpus sizes
//! here are thousands of chunks, not millions, and exact distances keep
//! the ranking contract simple.

mod persist;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::core::errors::IndexError;
use crate::llm::provider::Embedder;

/// One indexed unit of corpus text. The id doubles as the chunk's
/// position in the text store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: u32,
    pub text: String,
}

/// A retrieved chunk with its distance to the query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: u32,
    pub text: String,
    pub distance: f32,
}

/// Immutable nearest-neighbor index: an `N x D` matrix of embeddings and
/// the parallel chunk texts.
pub struct VectorIndex {
    vectors: Array2<f32>,
    texts: Vec<String>,
}

impl VectorIndex {
    pub fn new(vectors: Array2<f32>, texts: Vec<String>) -> Self {
        if vectors.nrows() != texts.len() {
            tracing::warn!(
                "index has {} vectors but {} texts; out-of-range hits will be dropped",
                vectors.nrows(),
                texts.len()
            );
        }
        VectorIndex { vectors, texts }
    }

    pub fn empty() -> Self {
        VectorIndex {
            vectors: Array2::zeros((0, 0)),
            texts: Vec::new(),
        }
    }

    /// Embed every chunk and assemble the index. Construction-time only;
    /// per-query code never calls this.
    pub async fn build(chunks: &[Chunk], embedder: &dyn Embedder) -> Result<Self, IndexError> {
        let mut flat: Vec<f32> = Vec::new();
        let mut texts = Vec::with_capacity(chunks.len());
        let mut dimension: Option<usize> = None;

        for chunk in chunks {
            let vector = embedder.embed(&chunk.text).await.map_err(|e| {
                IndexError::Build(format!("embedding chunk {} failed: {}", chunk.id, e))
            })?;

            match dimension {
                None => {
                    if vector.is_empty() {
                        return Err(IndexError::Build(format!(
                            "chunk {} embedded to an empty vector",
                            chunk.id
                        )));
                    }
                    dimension = Some(vector.len());
                }
                Some(d) if d != vector.len() => {
                    return Err(IndexError::Build(format!(
                        "chunk {} embedded to dimension {}, expected {}",
                        chunk.id,
                        vector.len(),
                        d
                    )));
                }
                Some(_) => {}
            }

            flat.extend_from_slice(&vector);
            texts.push(chunk.text.clone());
        }

        let dimension = dimension.unwrap_or(0);
        let vectors = Array2::from_shape_vec((chunks.len(), dimension), flat)
            .map_err(|e| IndexError::Build(e.to_string()))?;
        Ok(VectorIndex::new(vectors, texts))
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// Nearest neighbors of `query` by Euclidean distance, closest first,
    /// ties broken by ascending id, at most `k` hits.
    ///
    /// An empty index and `k = 0` both yield an empty result. A query of
    /// the wrong dimensionality is rejected outright rather than being
    /// allowed to produce garbage distances.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                got: query.len(),
            });
        }

        let query = ArrayView1::from(query);
        let mut scored: Vec<(u32, f32)> = (0..self.vectors.nrows())
            .map(|i| {
                let diff = &self.vectors.row(i) - &query;
                (i as u32, diff.dot(&diff).sqrt())
            })
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let hits = scored
            .into_iter()
            .filter_map(|(id, distance)| match self.texts.get(id as usize) {
                Some(text) => Some(SearchHit {
                    id,
                    text: text.clone(),
                    distance,
                }),
                None => {
                    // Index/text-store desynchronization; should not
                    // happen in a healthy index.
                    tracing::warn!("index position {} has no chunk text, dropping hit", id);
                    None
                }
            })
            .take(k)
            .collect();

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn index_from(rows: Vec<Vec<f32>>, texts: Vec<&str>) -> VectorIndex {
        let dim = rows.first().map_or(0, |r| r.len());
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        VectorIndex::new(
            Array2::from_shape_vec((rows.len(), dim), flat).unwrap(),
            texts.into_iter().map(str::to_string).collect(),
        )
    }

    #[test]
    fn search_ranks_by_distance_with_known_scenario() {
        // Chunks at distances [0.1, 0.9, 0.5, 0.3, 0.7] from the origin.
        let index = index_from(
            vec![vec![0.1], vec![0.9], vec![0.5], vec![0.3], vec![0.7]],
            vec!["c0", "c1", "c2", "c3", "c4"],
        );
        let hits = index.search(&[0.0], 3).unwrap();
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 3, 2]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = index_from(vec![vec![1.0, 0.0], vec![0.0, 1.0]], vec!["a", "b"]);
        let hits = index.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn k_zero_returns_nothing() {
        let index = index_from(vec![vec![1.0]], vec!["a"]);
        assert!(index.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::empty();
        assert!(index.search(&[1.0, 2.0], 3).unwrap().is_empty());
    }

    #[test]
    fn wrong_dimensionality_is_rejected() {
        let index = index_from(vec![vec![1.0, 0.0]], vec!["a"]);
        let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn equal_distances_break_ties_by_ascending_id() {
        let index = index_from(
            vec![vec![1.0], vec![-1.0], vec![1.0]],
            vec!["a", "b", "c"],
        );
        let hits = index.search(&[0.0], 3).unwrap();
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn dangling_positions_are_skipped_not_fatal() {
        // Three vectors but only two texts: position 2 is dangling.
        let index = VectorIndex::new(
            array![[0.0_f32], [1.0], [0.1]],
            vec!["a".to_string(), "b".to_string()],
        );
        let hits = index.search(&[0.0], 3).unwrap();
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[tokio::test]
    async fn build_embeds_chunks_in_order() {
        use crate::llm::provider::test_support::StubEmbedder;

        let chunks = vec![
            Chunk {
                id: 0,
                text: "alpha".into(),
            },
            Chunk {
                id: 1,
                text: "beta".into(),
            },
        ];
        let embedder = StubEmbedder::by_length(3);
        let index = VectorIndex::build(&chunks, &embedder).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 3);
    }
}
