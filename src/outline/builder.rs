//! The outline state machine.
//!
//! Walks the body element stream once, classifying each paragraph as
//! heading, list item, or plain text, and growing the closed-context list
//! that the chunk emitter consumes. The open spine of heading titles, the
//! one-element text lag ("pending"), the process-wide list counters, and
//! the page cursor all live here and die with the builder.

use std::collections::HashMap;

use tracing::warn;

use super::context::{Context, Outline, UNGRADED};
use super::table::render_table;
use crate::container::{Element, Paragraph, Table};
use crate::fontsize::FontProbe;
use crate::numbering::marker::{self, ListCounter};
use crate::numbering::NumberingIndex;
use crate::text::word_count;
use crate::title::distinct_title;

/// Open heading on the spine: its level and accumulated breadcrumb.
#[derive(Debug)]
struct SpineEntry {
    level: i32,
    title: String,
}

/// Text whose destination is still undecided: it may append to the current
/// body, or become the preceding body text of a list that opens next.
#[derive(Debug)]
struct Pending {
    text: String,
    title: String,
}

pub struct OutlineBuilder<'a> {
    index: &'a NumberingIndex,
    probe: &'a FontProbe,
    chunk_size: usize,
    title: String,
    closed: Vec<Context>,
    current: Option<Context>,
    pending: Option<Pending>,
    spine: Vec<SpineEntry>,
    counter: ListCounter,
    /// list id → id of the first item seen for it.
    anchors: HashMap<String, u64>,
    page: u32,
    next_id: u64,
}

impl<'a> OutlineBuilder<'a> {
    pub fn new(
        index: &'a NumberingIndex,
        probe: &'a FontProbe,
        title: String,
        chunk_size: usize,
    ) -> OutlineBuilder<'a> {
        OutlineBuilder {
            index,
            probe,
            chunk_size,
            title,
            closed: Vec::new(),
            current: None,
            pending: None,
            spine: Vec::new(),
            counter: ListCounter::new(),
            anchors: HashMap::new(),
            page: 1,
            next_id: 0,
        }
    }

    /// Process one element. Classification failures are logged and the
    /// element is skipped; the walk continues.
    pub fn push(&mut self, element: &Element) {
        match element {
            Element::Paragraph(paragraph) => {
                if paragraph.page_break {
                    self.page += 1;
                }
                if let Err(reason) = self.paragraph(paragraph) {
                    warn!(%reason, "skipping unclassifiable paragraph");
                }
            }
            Element::Table(table) => self.table(table),
        }
    }

    /// Close the walk and return the outline.
    pub fn finish(mut self) -> Outline {
        // Push the queued text through, then close whatever is still open.
        self.append_body_or_break("", false);
        self.pending = None;
        self.close_current();

        let mut contexts = Vec::new();
        for mut context in std::mem::take(&mut self.closed) {
            let body = context.body_text.trim().to_string();
            if body.is_empty() && context.nested.is_empty() {
                continue;
            }
            context.body_text = body;
            contexts.push(context);
        }
        Outline {
            title: self.title,
            contexts,
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) -> Result<(), String> {
        let text = paragraph.text.trim();
        if text.is_empty() {
            return Ok(());
        }
        if paragraph.style == "title" {
            // Already captured by the font probe.
            return Ok(());
        }
        if !self.probe.is_structured() {
            self.font_paragraph(paragraph, text);
            return Ok(());
        }
        if paragraph.style.starts_with("heading") {
            let digits: String = paragraph
                .style
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            let level: i32 = digits
                .parse()
                .map_err(|_| format!("heading style without a level: {:?}", paragraph.style))?;
            self.heading(level, text);
            return Ok(());
        }
        if paragraph.numbering.is_some() || paragraph.style.starts_with("list") {
            self.list_item(paragraph, text);
            return Ok(());
        }
        self.plain(text);
        Ok(())
    }

    /// Styleless documents: the probe's font levels decide what reads as a
    /// heading; everything else is body text. List classification is off.
    fn font_paragraph(&mut self, paragraph: &Paragraph, text: &str) {
        let level = self.probe.level_of(paragraph.font_size());
        if self.probe.is_heading_level(level) {
            self.heading(level as i32, text);
        } else {
            self.append_body_or_break(text, false);
        }
    }

    fn heading(&mut self, level: i32, text: &str) {
        self.open_context(level, text, true);
        if let Some(context) = self.current.as_mut() {
            context.body_text = text.to_string();
        }
    }

    fn plain(&mut self, text: &str) {
        // A context that already holds list children is done accumulating:
        // move to a fresh sibling at the same level before appending.
        let has_list_children = self
            .current
            .as_ref()
            .map_or(false, |c| !c.nested.is_empty());
        if has_list_children {
            let (level, title, is_heading) = self
                .current
                .as_ref()
                .map(|c| (c.level, c.title.clone(), c.is_heading))
                .unwrap_or((UNGRADED, String::new(), false));
            self.flush_pending_into_current();
            self.close_current();
            let mut sibling = self.new_context(level, is_heading);
            sibling.title = title;
            self.current = Some(sibling);
        }
        self.append_body_or_break(text, false);
    }

    fn table(&mut self, table: &Table) {
        let rendered = render_table(table);
        if table.is_single_cell() {
            if !rendered.trim().is_empty() {
                self.append_body_or_break(&rendered, false);
            }
            return;
        }
        self.append_body_or_break(&rendered, true);
        if let Some(context) = self.current.as_mut() {
            context.keep_full = true;
        }
    }

    fn list_item(&mut self, paragraph: &Paragraph, text: &str) {
        let style = paragraph.style.as_str();
        let numbering = paragraph.numbering.as_ref();

        let level = self.effective_level(style, numbering.map(|n| n.ilvl));

        let info = numbering
            .map(|n| marker::resolve_item(self.index, &mut self.counter, &n.num_id, n.ilvl));
        let body = match info.as_ref().and_then(|i| i.marker.as_deref()) {
            Some(marker) => format!("{} {}", marker, text),
            None => text.to_string(),
        };

        let mut item = self.new_context(level, false);
        item.is_list = true;
        item.title = self
            .current
            .as_ref()
            .map(|c| c.title.clone())
            .unwrap_or_default();
        item.body_text = body;
        item.list_item_id = info.as_ref().map(|i| i.list_id.clone());
        item.numeric_kind = info.as_ref().and_then(|i| i.kind);
        item.important = info.as_ref().map_or(false, |i| i.important);

        let item_id = item.id;
        let anchor_key = item.list_item_id.clone();

        self.place_item(item);

        if let Some(key) = anchor_key {
            self.anchors.entry(key).or_insert(item_id);
        }
    }

    /// Effective outline level of a list paragraph: `list N` styles name it
    /// directly, `list paragraph` defers to the numbering reference, other
    /// `list` styles nest one below the current context, and anything left
    /// is ungraded.
    fn effective_level(&self, style: &str, ilvl: Option<u32>) -> i32 {
        if style.starts_with("list") {
            let digits: String = style.chars().filter(|c| c.is_ascii_digit()).collect();
            if let Ok(level) = digits.parse::<i32>() {
                return level;
            }
            if style == "list paragraph" || style == "listparagraph" {
                return ilvl.map(|l| l as i32).unwrap_or(UNGRADED);
            }
            return self.current.as_ref().map_or(0, |c| c.level + 1);
        }
        ilvl.map(|l| l as i32).unwrap_or(UNGRADED)
    }

    fn place_item(&mut self, mut item: Context) {
        let level = item.level;
        // No context open yet: the item starts an ungraded root.
        if self.current.is_none() {
            let mut root = self.new_context(UNGRADED, true);
            root.title = self.title.clone();
            item.title = root.title.clone();
            root.nested.push(item);
            self.current = Some(root);
            return;
        }

        // First list child of the open context: the pending text becomes
        // the preceding body of a fresh list container.
        let has_children = self
            .current
            .as_ref()
            .map_or(false, |c| !c.nested.is_empty());
        if !has_children {
            let (prev_title, prev_text) = match self.pending.take() {
                Some(pending) => (pending.title, pending.text),
                None => (
                    self.current
                        .as_ref()
                        .map(|c| c.title.clone())
                        .unwrap_or_default(),
                    String::new(),
                ),
            };
            let container_level = if level == UNGRADED { UNGRADED } else { level - 1 };
            self.open_context(container_level, &prev_title, false);
            if let Some(container) = self.current.as_mut() {
                container.body_text = prev_text.trim().to_string();
                item.title = container.title.clone();
                container.nested.push(item);
            }
            return;
        }

        let (is_lower, kind_changed) = match self.current.as_ref() {
            Some(current) => {
                let leaf = current.last_leaf();
                (
                    level > leaf.level,
                    level == leaf.level && leaf.numeric_kind != item.numeric_kind,
                )
            }
            None => (false, false),
        };
        let id_is_new = item
            .list_item_id
            .as_ref()
            .map_or(true, |id| !self.anchors.contains_key(id));

        // Deeper level, an unseen list id, or a numeric-kind change at the
        // same level: start a fresh nesting under the last leaf.
        if is_lower || id_is_new || kind_changed {
            if let Some(current) = self.current.as_mut() {
                current.last_leaf_mut().nested.push(item);
            }
            return;
        }

        // Important items of an anchored list rejoin the container that
        // holds their first sibling, even across intervening nestings.
        let anchor = if item.important {
            item.list_item_id
                .as_ref()
                .and_then(|id| self.anchors.get(id))
                .copied()
        } else {
            None
        };
        if let Some(anchor_id) = anchor {
            // Closed contexts are immutable; an anchor that has already
            // been closed falls back to a plain sibling here.
            if let Some(current) = self.current.as_mut() {
                match current.attach_sibling_of(anchor_id, item) {
                    Ok(()) => return,
                    Err(returned) => item = returned,
                }
                current.nested.push(item);
            }
            return;
        }

        if item.important {
            if let Some(current) = self.current.as_mut() {
                current.nested.push(item);
            }
            return;
        }

        // Unimportant items ride under whichever direct child they follow.
        if let Some(current) = self.current.as_mut() {
            match current.nested.last_mut() {
                Some(last) => last.nested.push(item),
                None => current.nested.push(item),
            }
        }
    }

    /// Close the current context and open a new one. Headings maintain the
    /// spine and extend the parent breadcrumb; other contexts inherit the
    /// spine tip's title.
    fn open_context(&mut self, level: i32, text: &str, is_heading: bool) {
        self.flush_pending_into_current();
        self.close_current();

        let title = if is_heading {
            while self.spine.last().map_or(false, |entry| entry.level >= level) {
                self.spine.pop();
            }
            let parent = self
                .spine
                .last()
                .map(|entry| entry.title.clone())
                .unwrap_or_else(|| self.title.clone());
            let title = distinct_title(&[parent.as_str(), text]);
            self.spine.push(SpineEntry {
                level,
                title: title.clone(),
            });
            title
        } else {
            let parent = self
                .spine
                .last()
                .map(|entry| entry.title.clone())
                .unwrap_or_else(|| self.title.clone());
            distinct_title(&[parent.as_str(), text])
        };

        let mut context = self.new_context(level, is_heading);
        context.title = title;
        self.current = Some(context);
    }

    /// Append text to the current body through the one-element lag,
    /// breaking into a continuation context when the soft word budget
    /// would be exceeded.
    fn append_body_or_break(&mut self, text: &str, is_table: bool) {
        let queued = {
            let title = self
                .current
                .as_ref()
                .map(|c| c.title.clone())
                .unwrap_or_else(|| self.title.clone());
            let previous = self.pending.take();
            self.pending = Some(Pending {
                text: text.to_string(),
                title,
            });
            previous.map(|p| p.text).unwrap_or_default()
        };

        if self.current.is_none() {
            let mut context = self.new_context(UNGRADED, true);
            context.is_table = is_table;
            self.current = Some(context);
        }

        // A real heading never accumulates body text beyond its own text;
        // what follows it lands in a fresh non-heading child with the same
        // title.
        let needs_child = self
            .current
            .as_ref()
            .map_or(false, |c| c.is_heading && c.level != UNGRADED);
        if needs_child {
            let title = self
                .current
                .as_ref()
                .map(|c| c.title.clone())
                .unwrap_or_default();
            self.close_current();
            let mut child = self.new_context(UNGRADED, false);
            child.title = title;
            child.is_table = is_table;
            self.current = Some(child);
        }

        let queued = queued.trim();
        if queued.is_empty() {
            return;
        }

        let over_budget = self.current.as_ref().map_or(false, |c| {
            word_count(&c.body_text) + word_count(queued) > self.chunk_size
        });
        if over_budget {
            let (level, title, is_heading) = self
                .current
                .as_ref()
                .map(|c| (c.level, c.title.clone(), c.is_heading))
                .unwrap_or((UNGRADED, String::new(), false));
            self.close_current();
            // The continuation does not inherit keep_full.
            let mut continuation = self.new_context(level, is_heading);
            continuation.title = title;
            continuation.is_table = is_table;
            self.current = Some(continuation);
        }

        if let Some(context) = self.current.as_mut() {
            context.body_text = if context.body_text.is_empty() {
                queued.to_string()
            } else {
                format!("{}\n{}", context.body_text.trim_end(), queued)
            };
        }
    }

    fn flush_pending_into_current(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let text = pending.text.trim().to_string();
        if text.is_empty() {
            return;
        }
        if self.current.is_none() {
            let mut context = self.new_context(UNGRADED, false);
            context.title = pending.title;
            context.body_text = text;
            self.current = Some(context);
            return;
        }
        let over_budget = self.current.as_ref().map_or(false, |c| {
            word_count(&c.body_text) + word_count(&text) > self.chunk_size
        });
        if over_budget {
            let (level, title, is_heading) = self
                .current
                .as_ref()
                .map(|c| (c.level, c.title.clone(), c.is_heading))
                .unwrap_or((UNGRADED, String::new(), false));
            self.close_current();
            let mut continuation = self.new_context(level, is_heading);
            continuation.title = title;
            continuation.body_text = text;
            self.current = Some(continuation);
            return;
        }
        if let Some(context) = self.current.as_mut() {
            context.body_text = if context.body_text.is_empty() {
                text
            } else {
                format!("{}\n{}", context.body_text, text)
            };
        }
    }

    fn close_current(&mut self) {
        if let Some(context) = self.current.take() {
            self.closed.push(context);
        }
    }

    fn new_context(&mut self, level: i32, is_heading: bool) -> Context {
        self.next_id += 1;
        Context::new(self.next_id, level, is_heading, self.page)
    }
}
