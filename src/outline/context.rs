//! Outline nodes.
//!
//! A [`Context`] is one node of the reconstructed outline: a heading, a
//! list container, or a list item, with accumulated body text and ordered
//! children. Contexts are mutated only while they are the open tip of the
//! builder (or reachable through the anchor map); once closed they are
//! immutable inputs to the chunk emitter. Ancestry is never stored on the
//! node itself.

use crate::numbering::NumericKind;

/// Level sentinel for the implicit root and for ungraded list paragraphs.
pub const UNGRADED: i32 = 999;

#[derive(Debug, Clone)]
pub struct Context {
    pub id: u64,
    pub level: i32,
    pub is_heading: bool,
    pub is_list: bool,
    pub is_table: bool,
    /// Breadcrumb components joined by the reserved separator.
    pub title: String,
    pub body_text: String,
    /// 1-based page at creation time.
    pub page_number: u32,
    /// Set when a multi-cell table was absorbed; such a context must not be
    /// split across chunks.
    pub keep_full: bool,
    pub list_item_id: Option<String>,
    pub numeric_kind: Option<NumericKind>,
    pub important: bool,
    pub nested: Vec<Context>,
}

impl Context {
    pub fn new(id: u64, level: i32, is_heading: bool, page_number: u32) -> Context {
        Context {
            id,
            level,
            is_heading,
            is_list: false,
            is_table: false,
            title: String::new(),
            body_text: String::new(),
            page_number,
            keep_full: false,
            list_item_id: None,
            numeric_kind: None,
            important: false,
            nested: Vec::new(),
        }
    }

    /// The deepest last descendant, following last-child edges; `self` when
    /// there are no children.
    pub fn last_leaf(&self) -> &Context {
        match self.nested.last() {
            Some(last) => last.last_leaf(),
            None => self,
        }
    }

    pub fn last_leaf_mut(&mut self) -> &mut Context {
        if self.nested.is_empty() {
            return self;
        }
        let index = self.nested.len() - 1;
        self.nested[index].last_leaf_mut()
    }

    /// Attach `item` as a sibling of the node identified by `anchor_id`,
    /// i.e. push it onto the children of whichever node contains the
    /// anchor. Returns the item back when the anchor is not in this
    /// subtree.
    pub fn attach_sibling_of(&mut self, anchor_id: u64, item: Context) -> Result<(), Context> {
        if self.nested.iter().any(|child| child.id == anchor_id) {
            self.nested.push(item);
            return Ok(());
        }
        let mut item = item;
        for child in self.nested.iter_mut() {
            match child.attach_sibling_of(anchor_id, item) {
                Ok(()) => return Ok(()),
                Err(returned) => item = returned,
            }
        }
        Err(item)
    }
}

/// The closed outline: document title plus the flat, document-ordered list
/// of closed contexts, each owning its list-item tree.
#[derive(Debug)]
pub struct Outline {
    pub title: String,
    pub contexts: Vec<Context>,
}
