//! Index persistence: `vectors.bin` plus `chunks.jsonl`.
//!
//! `vectors.bin` is a little-endian f32 matrix behind a small header
//! (magic, dimension, row count). `chunks.jsonl` is the ordered text
//! store, one JSON chunk per line; line `i` is the text for vector row
//! `i`. The pair is written together by the index builder and loaded
//! together at process start.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use ndarray::Array2;

use super::{Chunk, VectorIndex};
use crate::core::errors::IndexError;

const MAGIC: &[u8; 4] = b"MVI1";
const VECTORS_FILE: &str = "vectors.bin";
const CHUNKS_FILE: &str = "chunks.jsonl";

impl VectorIndex {
    pub fn save(&self, dir: &Path) -> Result<(), IndexError> {
        fs::create_dir_all(dir)?;

        let mut blob = Vec::with_capacity(12 + self.len() * self.dimension() * 4);
        blob.extend_from_slice(MAGIC);
        blob.extend_from_slice(&(self.dimension() as u32).to_le_bytes());
        blob.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for value in self.vectors.iter() {
            blob.extend_from_slice(&value.to_le_bytes());
        }
        fs::write(dir.join(VECTORS_FILE), blob)?;

        let mut out = fs::File::create(dir.join(CHUNKS_FILE))?;
        for (id, text) in self.texts.iter().enumerate() {
            let chunk = Chunk {
                id: id as u32,
                text: text.clone(),
            };
            let line = serde_json::to_string(&chunk)
                .map_err(|e| IndexError::Persist(e.to_string()))?;
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self, IndexError> {
        let blob = fs::read(dir.join(VECTORS_FILE))?;
        if blob.len() < 12 || &blob[0..4] != MAGIC {
            return Err(IndexError::Persist(format!(
                "{} is not a vector index artifact",
                dir.join(VECTORS_FILE).display()
            )));
        }

        let dimension = u32::from_le_bytes([blob[4], blob[5], blob[6], blob[7]]) as usize;
        let count = u32::from_le_bytes([blob[8], blob[9], blob[10], blob[11]]) as usize;

        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_add(12))
            .ok_or_else(|| IndexError::Persist("vector header overflows".to_string()))?;
        if blob.len() != expected {
            return Err(IndexError::Persist(format!(
                "vector payload is {} bytes, header implies {}",
                blob.len(),
                expected
            )));
        }

        let values: Vec<f32> = blob[12..]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let vectors = Array2::from_shape_vec((count, dimension), values)
            .map_err(|e| IndexError::Persist(e.to_string()))?;

        let reader = BufReader::new(fs::File::open(dir.join(CHUNKS_FILE))?);
        let mut texts = Vec::with_capacity(count);
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let chunk: Chunk = serde_json::from_str(&line).map_err(|e| {
                IndexError::Persist(format!("chunk line {}: {}", line_no + 1, e))
            })?;
            if chunk.id as usize != texts.len() {
                tracing::warn!(
                    "chunk store line {} carries id {}, expected {}",
                    line_no + 1,
                    chunk.id,
                    texts.len()
                );
            }
            texts.push(chunk.text);
        }

        if texts.len() != count {
            tracing::warn!(
                "loaded {} chunk texts for {} vectors; out-of-range hits will be dropped",
                texts.len(),
                count
            );
        }

        Ok(VectorIndex::new(vectors, texts))
    }

    /// Load the index if its artifacts exist, otherwise start with an
    /// empty index (retrieval simply returns nothing).
    pub fn load_or_empty(dir: &Path) -> Result<Self, IndexError> {
        if dir.join(VECTORS_FILE).exists() && dir.join(CHUNKS_FILE).exists() {
            VectorIndex::load(dir)
        } else {
            tracing::info!("no index artifacts under {}, starting empty", dir.display());
            Ok(VectorIndex::empty())
        }
    }
}
