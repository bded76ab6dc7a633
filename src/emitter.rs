//! Chunk emitter.
//!
//! Flattens the closed outline into the final chunk sequence. Plain bodies
//! emit one chunk each; list trees are merged recursively into "packs"
//! under the soft word budget, with the first sub-pack of a nested run
//! fused into the running pack and later sub-packs promoted to standalone
//! chunks titled by their last sentence. Standalone headings never emit;
//! they feed the running breadcrumb stack instead.

use std::collections::BTreeMap;

use regex::Regex;

use crate::chunk::Chunk;
use crate::outline::{Context, Outline, UNGRADED};
use crate::text::{fold_vietnamese, word_count};
use crate::title::{beautify_title, TITLE_SEPARATOR};

/// A chunk under construction: text, the page of its first piece, and an
/// optional title extension picked up while merging nested lists.
#[derive(Debug, Clone)]
struct Draft {
    title: Option<String>,
    text: String,
    page: u32,
}

pub struct Emitter {
    chunk_size: usize,
    fold_accents: bool,
    sentence_re: Regex,
}

impl Emitter {
    pub fn new(chunk_size: usize, fold_accents: bool) -> Emitter {
        Emitter {
            chunk_size,
            fold_accents,
            sentence_re: Regex::new(r"[.?!]").unwrap(),
        }
    }

    /// Emit the chunk sequence for a closed outline.
    pub fn emit(&self, outline: &Outline) -> Vec<Chunk> {
        let mut level_titles: BTreeMap<i32, String> = BTreeMap::new();
        let mut standalone: Option<i32> = None;
        // Draft plus originating context id and its keep_full flag.
        let mut staged: Vec<(Draft, u64, bool)> = Vec::new();

        for context in &outline.contexts {
            let base_title = if context.title.is_empty() {
                outline.title.clone()
            } else {
                context.title.clone()
            };

            if context.nested.is_empty() {
                if context.is_heading && context.level != UNGRADED {
                    // Standalone heading: no chunk, only breadcrumb state.
                    level_titles.retain(|level, _| *level <= context.level);
                    level_titles.insert(context.level, context.body_text.clone());
                    standalone = Some(context.level);
                    continue;
                }
                if !context.body_text.is_empty() {
                    let title = breadcrumb(standalone, &level_titles).unwrap_or(base_title);
                    staged.push((
                        Draft {
                            title: Some(title),
                            text: context.body_text.clone(),
                            page: context.page_number,
                        },
                        context.id,
                        context.keep_full,
                    ));
                }
                continue;
            }

            let merged = self.merge_node(context);
            if merged.is_empty() {
                continue;
            }
            let root_title = breadcrumb(standalone, &level_titles).unwrap_or(base_title);
            let body = context.body_text.trim();

            if context.nested.len() == 1 {
                // A list with exactly one child collapses into its
                // parent's chunk.
                let mut packs: Vec<Draft> = Vec::new();
                if !body.is_empty() {
                    packs.push(Draft {
                        title: None,
                        text: body.to_string(),
                        page: context.page_number,
                    });
                }
                for draft in merged {
                    self.pack_into(&mut packs, &draft.text, draft.page);
                }
                for draft in packs {
                    staged.push((
                        Draft {
                            title: Some(root_title.clone()),
                            ..draft
                        },
                        context.id,
                        context.keep_full,
                    ));
                }
            } else {
                if !body.is_empty() {
                    staged.push((
                        Draft {
                            title: Some(root_title.clone()),
                            text: body.to_string(),
                            page: context.page_number,
                        },
                        context.id,
                        context.keep_full,
                    ));
                }
                for draft in merged {
                    let title = match &draft.title {
                        Some(extension) => format!("{}\n{}", root_title, extension),
                        None => root_title.clone(),
                    };
                    staged.push((
                        Draft {
                            title: Some(title),
                            text: draft.text,
                            page: draft.page,
                        },
                        context.id,
                        context.keep_full,
                    ));
                }
            }
        }

        self.finalize(outline, staged)
    }

    fn finalize(&self, outline: &Outline, staged: Vec<(Draft, u64, bool)>) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut origins: Vec<u64> = Vec::new();
        let mut keeps: Vec<bool> = Vec::new();

        for (draft, origin, keep_full) in staged {
            let text = draft.text.trim().to_string();
            if text.chars().count() < 5 {
                continue;
            }
            let raw_title = draft
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| outline.title.clone());
            let mut title = beautify_title(&raw_title);
            if self.fold_accents {
                title = fold_vietnamese(&title);
            }
            chunks.push(Chunk {
                index: chunks.len() as u32 + 1,
                title,
                text,
                page: draft.page,
                end: true,
            });
            origins.push(origin);
            keeps.push(keep_full);
        }

        // A keep_full context that still produced several chunks marks all
        // but its last fragment as continued.
        for i in 0..chunks.len() {
            if keeps[i] && origins[i + 1..].contains(&origins[i]) {
                chunks[i].end = false;
            }
        }
        chunks
    }

    /// Merge a node's children into budget-packed drafts.
    fn merge_node(&self, node: &Context) -> Vec<Draft> {
        let single = node.nested.len() == 1;
        let mut out: Vec<Draft> = Vec::new();
        let mut prev_nested = false;

        for item in &node.nested {
            let content = item.body_text.trim();

            if !content.is_empty() {
                if prev_nested {
                    // A piece right after a nested run seals the pack.
                    out.push(Draft {
                        title: None,
                        text: content.to_string(),
                        page: item.page_number,
                    });
                } else {
                    self.pack_into(&mut out, content, item.page_number);
                }
            }

            if item.nested.is_empty() {
                prev_nested = false;
                continue;
            }

            let mut sub = self.merge_node(item);
            if !sub.is_empty() {
                if single {
                    for draft in sub {
                        self.pack_into(&mut out, &draft.text, draft.page);
                    }
                } else {
                    // The first sub-pack fuses with the running pack;
                    // later ones stand alone, titled by their last
                    // sentence.
                    let first = sub.remove(0);
                    self.pack_into(&mut out, &first.text, first.page);
                    for draft in sub {
                        let title = self.last_sentence(&draft.text);
                        out.push(Draft {
                            title,
                            text: draft.text,
                            page: draft.page,
                        });
                    }
                }
            }
            prev_nested = true;
        }
        out
    }

    /// Append a piece to the last pack, or seal it and start a new one
    /// when the word budget would be exceeded. Empty pieces are skipped.
    fn pack_into(&self, out: &mut Vec<Draft>, text: &str, page: u32) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let needs_new = out.last().map_or(true, |last| {
            word_count(&last.text) + word_count(text) > self.chunk_size
        });
        if needs_new {
            out.push(Draft {
                title: None,
                text: text.to_string(),
                page,
            });
            return;
        }
        if let Some(last) = out.last_mut() {
            if last.text.trim().is_empty() {
                last.text = text.to_string();
                last.page = page;
            } else {
                last.text = format!("{}\n{}", last.text.trim(), text);
            }
        }
    }

    fn last_sentence(&self, text: &str) -> Option<String> {
        self.sentence_re
            .split(text)
            .filter(|sentence| !sentence.trim().is_empty())
            .last()
            .map(|sentence| sentence.trim().to_string())
    }
}

fn breadcrumb(standalone: Option<i32>, level_titles: &BTreeMap<i32, String>) -> Option<String> {
    let upto = standalone?;
    let parts: Vec<&str> = level_titles
        .range(..=upto)
        .map(|(_, title)| title.as_str())
        .collect();
    Some(parts.join(TITLE_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(id: u64, level: i32, is_heading: bool, body: &str) -> Context {
        let mut context = Context::new(id, level, is_heading, 1);
        context.body_text = body.to_string();
        context
    }

    fn item(id: u64, level: i32, body: &str) -> Context {
        let mut item = Context::new(id, level, false, 1);
        item.is_list = true;
        item.body_text = body.to_string();
        item
    }

    fn outline(contexts: Vec<Context>) -> Outline {
        Outline {
            title: "Handbook".to_string(),
            contexts,
        }
    }

    #[test]
    fn body_under_a_heading_uses_the_breadcrumb_title() {
        let heading = context(1, 1, true, "Overview");
        let mut body = context(2, UNGRADED, false, "Hello world, this is onboarding.");
        body.title = "Overview".to_string();
        let chunks = Emitter::new(200, false).emit(&outline(vec![heading, body]));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Overview");
        assert_eq!(chunks[0].text, "Hello world, this is onboarding.");
        assert_eq!(chunks[0].index, 1);
        assert!(chunks[0].end);
    }

    #[test]
    fn standalone_headings_emit_nothing() {
        let heading = context(1, 1, true, "Overview");
        let chunks = Emitter::new(200, false).emit(&outline(vec![heading]));
        assert!(chunks.is_empty());
    }

    #[test]
    fn nested_breadcrumbs_join_level_titles() {
        let h1 = context(1, 1, true, "Policies");
        let h2 = context(2, 2, true, "Leave");
        let body = context(3, UNGRADED, false, "Take your leave yearly.");
        let chunks = Emitter::new(200, false).emit(&outline(vec![h1, h2, body]));
        assert_eq!(chunks[0].title, "Policies\nLeave");
    }

    #[test]
    fn later_heading_purges_deeper_levels() {
        let h1 = context(1, 1, true, "Policies");
        let h2 = context(2, 2, true, "Leave");
        let first = context(3, UNGRADED, false, "Leave body text.");
        let h1b = context(4, 1, true, "Equipment");
        let second = context(5, UNGRADED, false, "Laptop policy text.");
        let chunks = Emitter::new(200, false).emit(&outline(vec![h1, h2, first, h1b, second]));
        assert_eq!(chunks[1].title, "Equipment");
    }

    #[test]
    fn list_children_merge_under_the_budget() {
        let mut container = context(1, 0, false, "");
        container.title = "Benefits".to_string();
        container.nested.push(item(2, 0, "1 Health"));
        let mut leave = item(3, 0, "2 Leave");
        leave.nested.push(item(4, 1, "a Annual"));
        leave.nested.push(item(5, 1, "b Sick"));
        container.nested.push(leave);

        let chunks = Emitter::new(200, false).emit(&outline(vec![container]));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "1 Health\n2 Leave\na Annual\nb Sick");
        assert_eq!(chunks[0].title, "Benefits");
    }

    #[test]
    fn oversized_lists_split_into_contiguous_chunks() {
        let mut container = context(1, 0, false, "");
        container.title = "Policy".to_string();
        for i in 0..20 {
            let words = format!("{} {}", i + 1, "word ".repeat(20).trim());
            container.nested.push(item(i + 2, 0, &words));
        }
        let chunks = Emitter::new(200, false).emit(&outline(vec![container]));
        assert!(chunks.len() > 1);
        for (position, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index as usize, position + 1);
            assert!(word_count(&chunk.text) <= 200);
            assert_eq!(chunk.title, "Policy");
        }
    }

    #[test]
    fn single_child_collapses_into_the_parent_chunk() {
        let mut container = context(1, 0, false, "Intro line.");
        container.title = "Steps".to_string();
        container.nested.push(item(2, 0, "1 Only step"));
        let chunks = Emitter::new(200, false).emit(&outline(vec![container]));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Intro line.\n1 Only step");
    }

    #[test]
    fn later_subpacks_extend_titles_with_their_last_sentence() {
        let mut container = context(1, 0, false, "");
        container.title = "Guide".to_string();
        container.nested.push(item(2, 0, "1 First"));
        let mut deep = item(3, 0, "2 Second");
        deep.nested
            .push(item(4, 1, &format!("Long intro. {}", "word ".repeat(8).trim())));
        deep.nested
            .push(item(5, 1, &format!("{} Final verdict", "word ".repeat(8).trim())));
        container.nested.push(deep);

        let chunks = Emitter::new(10, false).emit(&outline(vec![container]));
        assert!(chunks.len() >= 2);
        let last = chunks.last().unwrap();
        assert!(last.title.starts_with("Guide"));
        assert!(last.title.contains("Final verdict"));
    }

    #[test]
    fn short_chunks_are_dropped_and_indices_stay_dense() {
        let a = context(1, UNGRADED, false, "A full sentence of text.");
        let b = context(2, UNGRADED, false, "ok");
        let c = context(3, UNGRADED, false, "Another full sentence.");
        let chunks = Emitter::new(200, false).emit(&outline(vec![a, b, c]));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].index, 1);
        assert_eq!(chunks[1].index, 2);
    }

    #[test]
    fn empty_titles_fall_back_to_the_document_title() {
        let body = context(1, UNGRADED, false, "Some body text here.");
        let chunks = Emitter::new(200, false).emit(&outline(vec![body]));
        assert_eq!(chunks[0].title, "Handbook");
    }

    #[test]
    fn titles_are_beautified() {
        let mut body = context(1, UNGRADED, false, "Some body text here.");
        body.title = "Policies#|#Leave#|#Policies".to_string();
        let chunks = Emitter::new(200, false).emit(&outline(vec![body]));
        assert_eq!(chunks[0].title, "Policies\nLeave");
    }

    #[test]
    fn keep_full_contexts_mark_continuations() {
        let mut table_context = context(1, UNGRADED, false, "");
        table_context.keep_full = true;
        table_context.nested.push(item(
            2,
            0,
            &format!("first fragment {}", "word ".repeat(10).trim()),
        ));
        table_context.nested.push(item(
            3,
            0,
            &format!("second fragment {}", "word ".repeat(10).trim()),
        ));
        let chunks = Emitter::new(10, false).emit(&outline(vec![table_context]));
        assert_eq!(chunks.len(), 2);
        assert!(!chunks[0].end);
        assert!(chunks[1].end);
    }

    #[test]
    fn single_fragment_keep_full_stays_terminal() {
        let mut table_context = context(1, UNGRADED, false, "|a|b|\n|---|---|\n|c|d|");
        table_context.keep_full = true;
        let chunks = Emitter::new(200, false).emit(&outline(vec![table_context]));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].end);
    }

    #[test]
    fn accent_folding_applies_to_titles_only() {
        let mut body = context(1, UNGRADED, false, "Nội dung hướng dẫn chi tiết.");
        body.title = "Đào tạo".to_string();
        let chunks = Emitter::new(200, true).emit(&outline(vec![body]));
        assert_eq!(chunks[0].title, "Dao tao");
        assert_eq!(chunks[0].text, "Nội dung hướng dẫn chi tiết.");
    }

    #[test]
    fn pages_follow_the_first_piece_of_each_pack() {
        let mut container = context(1, 0, false, "");
        container.title = "Log".to_string();
        let mut early = item(2, 0, &format!("early {}", "word ".repeat(9).trim()));
        early.page_number = 2;
        let mut late = item(3, 0, &format!("late {}", "word ".repeat(9).trim()));
        late.page_number = 3;
        container.nested.push(early);
        container.nested.push(late);
        let chunks = Emitter::new(10, false).emit(&outline(vec![container]));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, 2);
        assert_eq!(chunks[1].page, 3);
    }
}
