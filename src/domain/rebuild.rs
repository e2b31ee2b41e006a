//! Section rebuilder.
//!
//! Reorders the children of one parent element:
//!
//! ```text
//! collect   classify every element child, bind its comment, compute its key
//! detach    take every child away from the parent (items, comments, whitespace)
//! reattach  leave-in-place items in document order, then each non-empty group:
//!           banner once, items by ascending key, each behind its bound comment
//! sweep     free detached nodes that were not reattached
//! ```
//!
//! Keys are computed before anything is detached, so a failing key leaves the
//! document exactly as it was.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::domain::binder::bind;
use crate::domain::classify::Placement;
use crate::domain::document::{Document, NodeId};
use crate::domain::error::DomainResult;
use crate::domain::pass::PassConfig;

/// Why a pass left a section alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentReason {
    ParentNotFound,
    NoChildren,
    NoItems,
}

impl fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsentReason::ParentNotFound => f.write_str("element not found"),
            AbsentReason::NoChildren => f.write_str("element has no children"),
            AbsentReason::NoItems => f.write_str("element has no items"),
        }
    }
}

/// Result of running one pass over one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    /// Nothing to do; the document is untouched.
    Absent(AbsentReason),
    Rebuilt {
        /// Items placed into sorted groups
        sorted: usize,
        /// Items left in original order
        kept: usize,
    },
}

impl SectionOutcome {
    /// Number of reordered items, zero for a no-op.
    pub fn sorted(&self) -> usize {
        match self {
            SectionOutcome::Absent(_) => 0,
            SectionOutcome::Rebuilt { sorted, .. } => *sorted,
        }
    }
}

/// An item together with the comment that documents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedItem {
    pub node: NodeId,
    pub comment: Option<NodeId>,
    pub key: String,
}

#[derive(Debug, Default)]
struct Collected {
    kept: Vec<DecoratedItem>,
    groups: Vec<BTreeMap<String, DecoratedItem>>,
}

/// Locate the pass's parent and rebuild it.
pub fn rebuild_pass(document: &mut Document, pass: &PassConfig) -> DomainResult<SectionOutcome> {
    match document.locate(&pass.parent) {
        Some(parent) => rebuild(document, parent, pass),
        None => Ok(SectionOutcome::Absent(AbsentReason::ParentNotFound)),
    }
}

/// Rebuild the children of `parent` according to `pass`.
pub fn rebuild(
    document: &mut Document,
    parent: NodeId,
    pass: &PassConfig,
) -> DomainResult<SectionOutcome> {
    if document.children(parent).is_empty() {
        return Ok(SectionOutcome::Absent(AbsentReason::NoChildren));
    }
    let items = match &pass.item_tag {
        Some(tag) => document.count_children_by_tag(parent, tag),
        None => document.child_elements(parent).count(),
    };
    if items == 0 {
        return Ok(SectionOutcome::Absent(AbsentReason::NoItems));
    }

    let collected = collect(document, parent, pass)?;
    let kept = collected.kept.len();

    let detached = document.detach_children(parent)?;
    let sorted = reattach(document, parent, pass, collected)?;

    let mut swept = 0;
    for id in detached {
        if document.parent(id).is_none() {
            document.remove_subtree(id);
            swept += 1;
        }
    }
    debug!(pass = %pass.kind, sorted, kept, swept, "rebuilt section");

    Ok(SectionOutcome::Rebuilt { sorted, kept })
}

fn collect(document: &Document, parent: NodeId, pass: &PassConfig) -> DomainResult<Collected> {
    let mut collected = Collected {
        kept: Vec::new(),
        groups: vec![BTreeMap::new(); pass.groups.len()],
    };

    for item in document.child_elements(parent) {
        let tag = document.tag_name(item).unwrap_or_default();
        let comment = bind(document, item);
        match pass.classifier.classify(tag) {
            Placement::LeaveInPlace => {
                debug!(pass = %pass.kind, item = tag, "leaving in place");
                collected.kept.push(DecoratedItem {
                    node: item,
                    comment,
                    key: tag.to_string(),
                });
            }
            Placement::Group(index) => {
                let key = pass.key.key(document, item)?;
                let Some(group) = collected.groups.get_mut(index) else {
                    warn!(
                        pass = %pass.kind,
                        item = tag,
                        index,
                        "rule points at unknown group, leaving in place"
                    );
                    collected.kept.push(DecoratedItem { node: item, comment, key });
                    continue;
                };
                let decorated = DecoratedItem {
                    node: item,
                    comment,
                    key: key.clone(),
                };
                match group.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(decorated);
                    }
                    Entry::Occupied(mut slot) => {
                        warn!(
                            pass = %pass.kind,
                            key = %slot.key(),
                            "duplicate key, later entry replaces earlier one"
                        );
                        slot.insert(decorated);
                    }
                }
            }
        }
    }
    Ok(collected)
}

fn reattach(
    document: &mut Document,
    parent: NodeId,
    pass: &PassConfig,
    collected: Collected,
) -> DomainResult<usize> {
    for item in &collected.kept {
        attach_decorated(document, parent, item, None)?;
    }

    let mut sorted = 0;
    for (index, group) in collected.groups.into_iter().enumerate() {
        if group.is_empty() {
            continue;
        }
        let banner = pass.banner(index);
        if let Some(text) = banner {
            let comment = document.create_comment(text);
            document.append_child(Some(parent), comment)?;
        }
        sorted += group.len();
        for item in group.values() {
            attach_decorated(document, parent, item, banner)?;
        }
    }
    Ok(sorted)
}

fn attach_decorated(
    document: &mut Document,
    parent: NodeId,
    item: &DecoratedItem,
    banner: Option<&str>,
) -> DomainResult<()> {
    if let Some(comment) = item.comment {
        // a stale copy of the banner just emitted
        let repeats_banner = match (banner, document.comment_text(comment)) {
            (Some(banner), Some(text)) => text.trim() == banner.trim(),
            _ => false,
        };
        if !repeats_banner {
            document.append_child(Some(parent), comment)?;
        }
    }
    document.append_child(Some(parent), item.node)
}
