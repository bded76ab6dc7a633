//! docchunk: a structural chunker for DOCX documents.
//!
//! Ingests a packaged word-processing document and emits an ordered
//! sequence of retrieval-friendly passages, each carrying a breadcrumb
//! title, a bounded text body, a page number, and a continuation flag.
//! The document's logical outline (headings, multi-level lists, tables)
//! is reconstructed from the flat paragraph-and-table stream and then
//! re-segmented under a soft word budget.
//!
//! # Pipeline
//!
//! Processing is a five-stage pipeline, orchestrated by [`process`]:
//!
//! 1. [`container`] opens the zip package and streams body elements.
//! 2. [`numbering`] indexes the numbering definitions and renders list
//!    markers.
//! 3. [`fontsize`] synthesises heading levels from run font sizes when
//!    the document has no heading styles.
//! 4. [`outline`] is the state machine that grows the context tree.
//! 5. [`emitter`] flattens contexts into the final chunk sequence.
//!
//! # Usage
//!
//! ```rust,ignore
//! use docchunk::{chunk_file, render_chunks, ChunkConfig, OutputFormat};
//!
//! let chunks = chunk_file("handbook.docx", &ChunkConfig::default())?;
//! let json = render_chunks(&chunks, OutputFormat::JsonPretty)?;
//! ```

pub mod api;
pub mod chunk;
pub mod container;
pub mod emitter;
pub mod fontsize;
pub mod numbering;
pub mod outline;
pub mod process;
pub mod text;
pub mod title;

pub use api::{chunk_file, render_chunks, ChunkConfig, ChunkError, OutputFormat};
pub use chunk::{Chunk, ChunkStats};
pub use container::{Container, ContainerError, Element};
