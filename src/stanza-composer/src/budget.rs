//! The budget allocator.
//!
//! Given a token budget and a declaration-ordered fragment list, decides
//! which fragments are included, truncated, or dropped. Dropping is silent:
//! the budget is advisory about content, not a hard failure.

use tracing::debug;

use stanza_protocol::{ContentPart, Role};

use crate::fragment::{BlockKind, Fragment, keep_within_budget, part_tokens};

/// One rendered fragment, ready for message assembly.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    pub kind: BlockKind,
    pub role: Role,
    pub parts: Vec<ContentPart>,
    pub atomic: bool,
    pub tokens: usize,
}

/// The result of one allocation pass.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Rendered blocks in declaration order.
    pub blocks: Vec<RenderedBlock>,
    /// Estimated tokens across all blocks.
    pub tokens_used: usize,
    /// Fragments dropped to fit the budget.
    pub dropped: usize,
}

/// Allocate a token budget across fragments.
///
/// Fixed fragments consume their full (capped) size; growable fragments
/// consume their reserve, then absorb leftover budget in proportion to
/// their grow factor. Under pressure, fragments are dropped strictly in
/// ascending priority order — a higher-priority fragment is never dropped
/// while a lower-priority one survives. Ties break by declaration order.
pub fn allocate(fragments: &[Fragment], budget: usize) -> AllocationOutcome {
    let mins: Vec<usize> = fragments.iter().map(Fragment::required_size).collect();
    let fulls: Vec<usize> = fragments.iter().map(Fragment::full_size).collect();

    let entries: Vec<(i32, usize)> = fragments
        .iter()
        .zip(&mins)
        .map(|(f, min)| (f.priority, *min))
        .collect();
    let alive = keep_within_budget(&entries, budget);

    let dropped = alive.iter().filter(|kept| !**kept).count();
    if dropped > 0 {
        debug!(dropped, budget, "dropped fragments to fit budget");
    }

    let consumed: usize = mins
        .iter()
        .zip(&alive)
        .filter(|(_, kept)| **kept)
        .map(|(min, _)| min)
        .sum();
    let leftover = budget.saturating_sub(consumed);
    let extra = distribute_leftover(fragments, &mins, &fulls, &alive, leftover);

    let mut blocks = Vec::new();
    let mut tokens_used = 0;
    for (i, fragment) in fragments.iter().enumerate() {
        if !alive[i] {
            continue;
        }
        let allotment = mins[i] + extra[i];
        let parts = fragment.resolve(allotment);
        if parts.is_empty() {
            // Absence is silent; an empty block never reaches assembly.
            continue;
        }
        let tokens: usize = parts.iter().map(part_tokens).sum();
        tokens_used += tokens;
        blocks.push(RenderedBlock {
            kind: fragment.kind,
            role: fragment.role,
            parts,
            atomic: fragment.atomic,
            tokens,
        });
    }

    AllocationOutcome {
        blocks,
        tokens_used,
        dropped,
    }
}

/// Water-fill leftover budget across surviving growable fragments.
///
/// Each active fragment is offered a share proportional to its grow factor;
/// fragments whose remaining need fits their share are satisfied exactly and
/// release the surplus back to the pool. The final pass floors shares and
/// hands out the integer remainder one token at a time in declaration order,
/// so the distribution is deterministic.
fn distribute_leftover(
    fragments: &[Fragment],
    mins: &[usize],
    fulls: &[usize],
    alive: &[bool],
    leftover: usize,
) -> Vec<usize> {
    let mut extra = vec![0usize; fragments.len()];
    let mut pool = leftover;

    let mut active: Vec<usize> = fragments
        .iter()
        .enumerate()
        .filter(|(i, f)| alive[*i] && f.is_growable() && fulls[*i] > mins[*i])
        .map(|(i, _)| i)
        .collect();

    while pool > 0 && !active.is_empty() {
        let total_weight: f64 = active
            .iter()
            .map(|&i| fragments[i].grow_factor.unwrap_or(0.0))
            .sum();
        if total_weight <= 0.0 {
            break;
        }

        let share = |i: usize| -> usize {
            let weight = fragments[i].grow_factor.unwrap_or(0.0);
            ((pool as f64) * weight / total_weight).floor() as usize
        };

        let satisfied: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&i| fulls[i] - mins[i] <= share(i))
            .collect();

        if satisfied.is_empty() {
            // No fragment can be satisfied in full: hand out floored shares,
            // then the remainder one token at a time in declaration order.
            let mut assigned = 0;
            for &i in &active {
                let give = share(i).min(fulls[i] - mins[i]);
                extra[i] += give;
                assigned += give;
            }
            let mut remainder = pool - assigned;
            for &i in &active {
                if remainder == 0 {
                    break;
                }
                let need = fulls[i] - mins[i] - extra[i];
                let give = need.min(remainder);
                extra[i] += give;
                remainder -= give;
            }
            break;
        }

        for &i in &satisfied {
            let need = fulls[i] - mins[i];
            extra[i] = need;
            pool -= need;
        }
        active.retain(|i| !satisfied.contains(i));
    }

    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::BlockKind;
    use stanza_common::estimate_tokens;

    fn fixed(priority: i32, tokens: usize) -> Fragment {
        Fragment::text(
            BlockKind::History,
            Role::User,
            priority,
            "x".repeat(tokens * 4),
        )
    }

    fn growable(priority: i32, tokens: usize, factor: f64) -> Fragment {
        fixed(priority, tokens).with_grow(factor)
    }

    fn block_text(block: &RenderedBlock) -> String {
        block
            .parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_everything_fits_renders_fully() {
        let fragments = vec![fixed(10, 20), fixed(5, 20), growable(1, 30, 1.0)];
        let outcome = allocate(&fragments, 1000);

        assert_eq!(outcome.blocks.len(), 3);
        assert_eq!(outcome.dropped, 0);
        // Growable fragment renders its full content when the pool allows.
        assert_eq!(estimate_tokens(&block_text(&outcome.blocks[2])), 30);
    }

    #[test]
    fn test_drops_ascending_priority() {
        let fragments = vec![fixed(3, 40), fixed(1, 40), fixed(2, 40)];
        let outcome = allocate(&fragments, 90);

        // Priority 1 dropped first; 3 and 2 survive in declaration order.
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.blocks.len(), 2);
        assert_eq!(outcome.blocks[0].tokens, 40);
        assert_eq!(outcome.blocks[1].tokens, 40);
        assert_eq!(outcome.tokens_used, 80);
    }

    #[test]
    fn test_higher_priority_never_dropped_before_lower() {
        let fragments = vec![fixed(1, 60), fixed(2, 60), fixed(3, 60)];
        let outcome = allocate(&fragments, 60);

        // Only the priority-3 fragment fits.
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].tokens, 60);
    }

    #[test]
    fn test_grow_distribution_proportional() {
        // Two growables with factors 3 and 1 over a pool of 40.
        let fragments = vec![
            growable(5, 100, 3.0).with_reserve(0),
            growable(5, 100, 1.0).with_reserve(0),
        ];
        let outcome = allocate(&fragments, 40);

        let first = estimate_tokens(&block_text(&outcome.blocks[0]));
        let second = estimate_tokens(&block_text(&outcome.blocks[1]));

        assert!(first >= 29 && first <= 31, "first got {first}");
        assert!(second >= 9 && second <= 11, "second got {second}");
    }

    #[test]
    fn test_grow_surplus_released_to_others() {
        // First growable only needs 5 tokens; the rest flows to the second.
        let fragments = vec![
            growable(5, 5, 1.0),
            growable(5, 100, 1.0),
        ];
        let outcome = allocate(&fragments, 60);

        let first = estimate_tokens(&block_text(&outcome.blocks[0]));
        let second = estimate_tokens(&block_text(&outcome.blocks[1]));

        assert_eq!(first, 5);
        assert!(second >= 54, "second got {second}");
    }

    #[test]
    fn test_size_limit_enforced_with_headroom() {
        let fragments = vec![fixed(5, 100).with_size_limit(25)];
        let outcome = allocate(&fragments, 10_000);

        assert_eq!(outcome.blocks.len(), 1);
        assert!(outcome.blocks[0].tokens <= 25);
    }

    #[test]
    fn test_reserve_consumed_before_leftover() {
        let fragments = vec![fixed(10, 50), growable(1, 100, 1.0).with_reserve(30)];
        let outcome = allocate(&fragments, 80);

        // Fixed takes 50, growable's reserve takes 30, pool is empty.
        let grown = estimate_tokens(&block_text(&outcome.blocks[1]));
        assert_eq!(grown, 30);
    }

    #[test]
    fn test_empty_resolution_produces_no_block() {
        // A growable group with zero allotment disappears entirely.
        let group = Fragment::group(
            BlockKind::History,
            Role::User,
            1,
            vec![fixed(1, 50)],
        )
        .with_grow(1.0);
        let fragments = vec![fixed(10, 100), group];
        let outcome = allocate(&fragments, 100);

        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].kind, BlockKind::History);
    }
}
