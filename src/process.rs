//! Top-level pipeline orchestration.
//!
//! The chunker runs five stages over one document:
//! Stage 1 (container read) → Stage 2 (numbering index) → Stage 3 (font
//! probe) → Stage 4 (outline build) → Stage 5 (chunk emission).
//!
//! Each stage has its own function so tests and tools can stop anywhere;
//! [`process_full`] chains them. One call processes one document on one
//! thread; nothing here is shared or retained across documents.

use std::path::Path;

use tracing::{debug, warn};

use crate::api::ChunkConfig;
use crate::chunk::Chunk;
use crate::container::{Container, ContainerError, Element};
use crate::emitter::Emitter;
use crate::fontsize::FontProbe;
use crate::numbering::NumberingIndex;
use crate::outline::{Outline, OutlineBuilder};

/// Stage 1 + 2: open the container and build the numbering index.
///
/// A missing numbering part yields an empty index; a malformed one is
/// logged and degraded to empty. Only container-level failures are fatal.
pub fn open_container<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<Element>, NumberingIndex), ContainerError> {
    let container = Container::open(path)?;
    let index = match container.numbering_xml() {
        Some(xml) => match NumberingIndex::parse(xml) {
            Ok(index) => index,
            Err(err) => {
                warn!(error = %err, "degrading malformed numbering part to an empty index");
                NumberingIndex::empty()
            }
        },
        None => NumberingIndex::empty(),
    };
    Ok((container.into_elements(), index))
}

/// Stage 3: probe font sizes and the document title.
pub fn probe_fonts(elements: &[Element]) -> FontProbe {
    FontProbe::probe(elements)
}

/// Stage 4: walk the element stream into the closed outline.
pub fn build_outline(
    elements: &[Element],
    index: &NumberingIndex,
    probe: &FontProbe,
    title: String,
    chunk_size: usize,
) -> Outline {
    let mut builder = OutlineBuilder::new(index, probe, title, chunk_size);
    for element in elements {
        builder.push(element);
    }
    builder.finish()
}

/// Stage 5: flatten the outline into the chunk sequence.
pub fn emit_chunks(outline: &Outline, chunk_size: usize, fold_accents: bool) -> Vec<Chunk> {
    Emitter::new(chunk_size, fold_accents).emit(outline)
}

/// Run the whole pipeline over one document.
///
/// The effective document title is the configured override, else the
/// document's `title`-styled paragraph, else the file stem.
pub fn process_full<P: AsRef<Path>>(
    path: P,
    config: &ChunkConfig,
) -> Result<Vec<Chunk>, ContainerError> {
    let path = path.as_ref();
    let (elements, index) = open_container(path)?;
    let probe = probe_fonts(&elements);

    let title = config
        .document_title
        .clone()
        .or_else(|| probe.title().map(str::to_string))
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    debug!(
        elements = elements.len(),
        structured = probe.is_structured(),
        numbering = !index.is_empty(),
        "chunking document"
    );

    let outline = build_outline(&elements, &index, &probe, title, config.chunk_size);
    Ok(emit_chunks(&outline, config.chunk_size, config.fold_accents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Paragraph, Run};

    fn paragraph(style: &str, text: &str) -> Element {
        Element::Paragraph(Paragraph {
            style: style.to_string(),
            text: text.to_string(),
            runs: vec![Run {
                text: text.to_string(),
                size: None,
            }],
            numbering: None,
            page_break: false,
        })
    }

    #[test]
    fn stages_compose_without_a_container() {
        let elements = vec![
            paragraph("heading 1", "Overview"),
            paragraph("normal", "Hello world, this is onboarding."),
        ];
        let index = NumberingIndex::empty();
        let probe = probe_fonts(&elements);
        let outline = build_outline(&elements, &index, &probe, "Doc".to_string(), 200);
        let chunks = emit_chunks(&outline, 200, false);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Overview");
    }

    #[test]
    fn open_container_surfaces_missing_files() {
        let result = open_container("/nonexistent/file.docx");
        assert!(matches!(result, Err(ContainerError::Io(_))));
    }
}
