//! The emitted chunk record.

use serde::{Deserialize, Serialize};

/// One retrieval-sized passage. Serialized as-is into the output JSON
/// array; the embedding side consumes `title + " - " + text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based position in the output sequence.
    pub index: u32,
    /// Breadcrumb title, components joined by newlines.
    pub title: String,
    /// Body text; may embed markdown table fragments and list markers.
    pub text: String,
    /// 1-based page number at the start of the originating context.
    pub page: u32,
    /// `true` unless another chunk continues the same unit.
    pub end: bool,
}

/// Summary of one chunking run.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkStats {
    pub chunk_count: usize,
    pub word_count: usize,
    pub page_count: u32,
    /// RFC3339 timestamp of the run.
    pub processed_at: String,
}

impl ChunkStats {
    pub fn collect(chunks: &[Chunk]) -> ChunkStats {
        ChunkStats {
            chunk_count: chunks.len(),
            word_count: chunks
                .iter()
                .map(|chunk| crate::text::word_count(&chunk.text))
                .sum(),
            page_count: chunks.iter().map(|chunk| chunk.page).max().unwrap_or(0),
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
