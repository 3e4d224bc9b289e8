//! Arc nesting levels.
//!
//! Each token's primary arc spans the closed interval between its render
//! position and its governor's. An arc sits one level above the tallest arc
//! whose governor lies strictly between its endpoints. Arcs that only share
//! an endpoint with it (siblings under one governor) do not lift it.
//!
//! An inner governor strictly inside the span means the inner arc cannot
//! share both endpoints with it, so every recursive call works on a smaller
//! window and depth is bounded by the sentence length on any input.

use std::collections::HashMap;

use arbor_protocol::{Head, TokenId, Tree};

/// Closed interval of render positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: usize,
    end: usize,
}

impl Window {
    fn spanning(a: usize, b: usize) -> Self {
        Self { start: a.min(b), end: a.max(b) }
    }

    fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    /// Inside the open interval, endpoints excluded.
    fn surrounds(&self, position: usize) -> bool {
        self.start < position && position < self.end
    }

    fn width(&self) -> usize {
        self.end - self.start
    }

    fn strictly_inside(&self, outer: &Window) -> bool {
        outer.contains(self.start) && outer.contains(self.end) && self != outer
    }
}

/// Render position of each token's governor; `None` for root, unassigned,
/// or governors that are not rendered.
pub fn governor_positions(order: &[TokenId], tree: &Tree) -> Vec<Option<usize>> {
    let positions: HashMap<TokenId, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    order
        .iter()
        .map(|id| match tree.get(id).map(|t| t.head) {
            Some(Head::Token(governor)) => positions.get(&governor).copied(),
            _ => None,
        })
        .collect()
}

/// One level per render position.
pub fn assign_levels(governors: &[Option<usize>]) -> Vec<u32> {
    let mut memo: Vec<Option<u32>> = vec![None; governors.len()];
    let everything = Window { start: 0, end: governors.len() };

    for index in 0..governors.len() {
        level_within(&mut memo, governors, index, everything);
    }

    memo.into_iter().map(|level| level.unwrap_or(0)).collect()
}

fn is_mutual(governors: &[Option<usize>], k: usize) -> bool {
    governors[k]
        .and_then(|g| governors.get(g).copied().flatten())
        .is_some_and(|back| back == k)
}

fn level_within(memo: &mut [Option<u32>], governors: &[Option<usize>], index: usize, window: Window) -> u32 {
    if let Some(level) = memo[index] {
        return level;
    }

    let Some(governor) = governors[index] else {
        memo[index] = Some(0);
        return 0;
    };
    if !window.contains(governor) {
        return 0;
    }

    let span = Window::spanning(index, governor);
    if span.width() == 1 {
        memo[index] = Some(1);
        return 1;
    }

    let mut deepest = 0;
    for k in span.start..=span.end {
        if k == index || is_mutual(governors, k) {
            continue;
        }
        let Some(k_governor) = governors[k] else { continue };
        if span.surrounds(k_governor) {
            debug_assert!(Window::spanning(k, k_governor).strictly_inside(&span));
            deepest = deepest.max(level_within(memo, governors, k, span));
        }
    }

    let level = deepest + 1;
    memo[index] = Some(level);
    level
}
