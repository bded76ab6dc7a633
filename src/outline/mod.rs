//! Outline reconstruction.
//!
//! The builder walks the flat element stream and recovers the document's
//! logical structure: headings with breadcrumb titles, multi-level list
//! trees with rendered markers, and absorbed tables. The result is a flat
//! list of closed [`Context`]s in document order, ready for the chunk
//! emitter.

pub mod builder;
pub mod context;
pub mod table;

pub use builder::OutlineBuilder;
pub use context::{Context, Outline, UNGRADED};
pub use table::render_table;
