//! Prompt fragments: units of renderable content with budget attributes.
//!
//! A fragment carries either leaf content parts or nested child fragments,
//! plus the attributes the budget allocator works with: priority (higher is
//! kept longer under pressure), an optional growth weight over leftover
//! budget, an optional size cap, and an atomic marker for blocks that cache
//! breakpoints must not split.

use serde::{Deserialize, Serialize};

use stanza_common::{estimate_tokens, truncate_to_tokens};
use stanza_protocol::{ContentPart, Role};

/// Estimated token cost of an image part.
pub const IMAGE_TOKEN_COST: usize = 512;

/// The seam-relevant block a fragment renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Static system instruction text.
    Instructions,
    /// Environment/workspace snapshot. Cache seam follows this block.
    GlobalContext,
    /// Prior conversation turns.
    History,
    /// Edited-file event summary.
    EditedFiles,
    /// The current user request. Cache seam follows this block.
    UserMessage,
    /// Tool output for the current turn.
    ToolResult,
    /// Trailing reminder text.
    Reminder,
}

/// Fragment content: leaf parts or nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentContent {
    Parts(Vec<ContentPart>),
    Group(Vec<Fragment>),
}

/// A single piece of renderable prompt content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: BlockKind,
    pub role: Role,
    /// Higher priority survives longer under budget pressure.
    pub priority: i32,
    /// Relative share of leftover budget. `None` means fixed-size.
    pub grow_factor: Option<f64>,
    /// Tokens a growable fragment consumes up front, before leftover
    /// distribution. Ignored for fixed-size fragments.
    pub reserve: usize,
    /// Hard cap in tokens, enforced regardless of available headroom.
    pub size_limit: Option<usize>,
    /// Produced by size-limited grouping; breakpoints may not land inside.
    pub atomic: bool,
    pub content: FragmentContent,
}

impl Fragment {
    /// Create a leaf fragment from a single text part.
    pub fn text(kind: BlockKind, role: Role, priority: i32, text: impl Into<String>) -> Self {
        Self::parts(kind, role, priority, vec![ContentPart::text(text)])
    }

    /// Create a leaf fragment from parts.
    pub fn parts(kind: BlockKind, role: Role, priority: i32, parts: Vec<ContentPart>) -> Self {
        Self {
            kind,
            role,
            priority,
            grow_factor: None,
            reserve: 0,
            size_limit: None,
            atomic: false,
            content: FragmentContent::Parts(parts),
        }
    }

    /// Create a group fragment from child fragments.
    pub fn group(kind: BlockKind, role: Role, priority: i32, children: Vec<Fragment>) -> Self {
        Self {
            kind,
            role,
            priority,
            grow_factor: None,
            reserve: 0,
            size_limit: None,
            atomic: false,
            content: FragmentContent::Group(children),
        }
    }

    /// Let this fragment absorb leftover budget with the given weight.
    pub fn with_grow(mut self, factor: f64) -> Self {
        self.grow_factor = Some(factor);
        self
    }

    /// Reserve tokens up front for a growable fragment.
    pub fn with_reserve(mut self, tokens: usize) -> Self {
        self.reserve = tokens;
        self
    }

    /// Cap this fragment's size.
    pub fn with_size_limit(mut self, tokens: usize) -> Self {
        self.size_limit = Some(tokens);
        self
    }

    /// Mark this fragment as an unsplittable chunk.
    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    /// Whether this fragment absorbs leftover budget.
    pub fn is_growable(&self) -> bool {
        matches!(self.grow_factor, Some(f) if f > 0.0)
    }

    /// Uncapped content size in tokens.
    fn content_size(&self) -> usize {
        match &self.content {
            FragmentContent::Parts(parts) => parts.iter().map(part_tokens).sum(),
            FragmentContent::Group(children) => children.iter().map(Fragment::full_size).sum(),
        }
    }

    /// Size this fragment renders at when given unlimited headroom:
    /// content size capped by `size_limit`.
    pub fn full_size(&self) -> usize {
        let size = self.content_size();
        match self.size_limit {
            Some(limit) => size.min(limit),
            None => size,
        }
    }

    /// Minimum tokens this fragment consumes if it survives: full size for
    /// fixed fragments, the reserve for growable ones.
    pub fn required_size(&self) -> usize {
        if self.is_growable() {
            self.reserve.min(self.full_size())
        } else {
            self.full_size()
        }
    }

    /// Render this fragment's content into parts within a token allotment.
    ///
    /// Leaf parts are kept in order until the allotment runs out; the
    /// overflowing text part is truncated with an ellipsis, later non-empty
    /// parts are dropped. Group children are dropped in ascending priority
    /// order until the survivors fit, then each survivor renders fully.
    pub fn resolve(&self, allotment: usize) -> Vec<ContentPart> {
        let allotment = match self.size_limit {
            Some(limit) => allotment.min(limit),
            None => allotment,
        };

        match &self.content {
            FragmentContent::Parts(parts) => resolve_parts(parts, allotment),
            FragmentContent::Group(children) => {
                let sizes: Vec<(i32, usize)> = children
                    .iter()
                    .map(|c| (c.priority, c.full_size()))
                    .collect();
                let alive = keep_within_budget(&sizes, allotment);

                children
                    .iter()
                    .zip(alive)
                    .filter(|(_, alive)| *alive)
                    .flat_map(|(child, _)| child.resolve(child.full_size()))
                    .collect()
            }
        }
    }
}

/// Estimated token cost of a content part. Breakpoint markers are free.
pub fn part_tokens(part: &ContentPart) -> usize {
    match part {
        ContentPart::Text { text } => estimate_tokens(text),
        ContentPart::Image { .. } => IMAGE_TOKEN_COST,
        ContentPart::CacheBreakpoint => 0,
    }
}

fn resolve_parts(parts: &[ContentPart], allotment: usize) -> Vec<ContentPart> {
    let total: usize = parts.iter().map(part_tokens).sum();
    if total <= allotment {
        return parts.to_vec();
    }

    let mut remaining = allotment;
    let mut out = Vec::new();
    for part in parts {
        let cost = part_tokens(part);
        if cost <= remaining {
            out.push(part.clone());
            remaining -= cost;
        } else if let ContentPart::Text { text } = part {
            if remaining > 0 {
                out.push(ContentPart::text(truncate_to_tokens(text, remaining)));
                remaining = 0;
            }
        }
        // Oversized images are dropped outright.
    }
    out
}

/// Decide which entries `(priority, size)` survive a budget: entries are
/// dropped in ascending priority order (later-declared first among ties)
/// until the total fits. Returns a keep-flag per entry.
pub(crate) fn keep_within_budget(entries: &[(i32, usize)], budget: usize) -> Vec<bool> {
    let mut alive = vec![true; entries.len()];
    let mut total: usize = entries.iter().map(|(_, size)| size).sum();

    while total > budget {
        let victim = entries
            .iter()
            .enumerate()
            .filter(|(i, _)| alive[*i])
            .min_by_key(|(i, (priority, _))| (*priority, std::cmp::Reverse(*i)))
            .map(|(i, _)| i);

        match victim {
            Some(i) => {
                alive[i] = false;
                total -= entries[i].1;
            }
            None => break,
        }
    }

    alive
}
