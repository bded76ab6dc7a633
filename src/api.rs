//! Chunking API.
//!
//! Pure entry points over the pipeline: configuration in, chunk records
//! out. No CLI handling, no process exits; the binary in `src/bin` is a
//! thin shell over these functions.

use std::error::Error;
use std::fmt;
use std::path::Path;

use crate::chunk::Chunk;
use crate::container::ContainerError;
use crate::process;

/// Chunking configuration.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Soft word budget per chunk.
    pub chunk_size: usize,
    /// Overrides the document's own title when set.
    pub document_title: Option<String>,
    /// Fold Vietnamese diacritics in chunk titles.
    pub fold_accents: bool,
}

impl Default for ChunkConfig {
    fn default() -> ChunkConfig {
        ChunkConfig {
            chunk_size: 200,
            document_title: None,
            fold_accents: false,
        }
    }
}

/// Output serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Errors surfaced to callers. Everything below the container level
/// recovers locally instead.
#[derive(Debug)]
pub enum ChunkError {
    Container(ContainerError),
    Serialization(String),
    Io(std::io::Error),
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::Container(err) => write!(f, "Container error: {}", err),
            ChunkError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ChunkError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for ChunkError {}

impl From<ContainerError> for ChunkError {
    fn from(err: ContainerError) -> Self {
        ChunkError::Container(err)
    }
}

impl From<std::io::Error> for ChunkError {
    fn from(err: std::io::Error) -> Self {
        ChunkError::Io(err)
    }
}

/// Chunk one document.
pub fn chunk_file<P: AsRef<Path>>(path: P, config: &ChunkConfig) -> Result<Vec<Chunk>, ChunkError> {
    process::process_full(path, config).map_err(ChunkError::from)
}

/// Serialize a chunk sequence to its output JSON array.
pub fn render_chunks(chunks: &[Chunk], format: OutputFormat) -> Result<String, ChunkError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(chunks),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(chunks),
    };
    rendered.map_err(|err| ChunkError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_contract() {
        let config = ChunkConfig::default();
        assert_eq!(config.chunk_size, 200);
        assert!(config.document_title.is_none());
        assert!(!config.fold_accents);
    }

    #[test]
    fn format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "json-pretty".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonPretty
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn empty_sequences_render_as_an_empty_array() {
        assert_eq!(render_chunks(&[], OutputFormat::Json).unwrap(), "[]");
    }

    #[test]
    fn missing_documents_surface_container_errors() {
        let result = chunk_file("/nonexistent/file.docx", &ChunkConfig::default());
        assert!(matches!(result, Err(ChunkError::Container(_))));
    }
}
