#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;

use arbor_protocol::{Direction, TokenId, Tree};

/// Orders items for left-to-right drawing.
///
/// `items` is the logical order, each with its `rtl` override (`Some(true)` = yes,
/// `Some(false)` = no, `None` = unset). The result is a permutation of the input ids.
pub fn visual_order<I: Copy>(items: &[(I, Option<bool>)], direction: Direction) -> Vec<I> {
    match direction {
        Direction::LeftToRight => ltr_order(items),
        Direction::RightToLeft => rtl_order(items),
    }
}

// A run of right-to-left tokens is collected back to front and flushed
// by the first token that is not itself right-to-left.
fn ltr_order<I: Copy>(items: &[(I, Option<bool>)]) -> Vec<I> {
    let mut order = Vec::with_capacity(items.len());
    let mut run: Vec<I> = Vec::new();

    for &(id, rtl) in items {
        run.push(id);
        if rtl != Some(true) {
            order.extend(run.drain(..).rev());
        }
    }
    order.extend(run.into_iter().rev());
    order
}

// Mirror case: runs keep their internal order and each flushed run lands in
// front of everything flushed so far. Runs are gathered first and emitted in
// reverse so the whole pass stays linear.
fn rtl_order<I: Copy>(items: &[(I, Option<bool>)]) -> Vec<I> {
    let mut runs: Vec<Vec<I>> = Vec::new();
    let mut run: Vec<I> = Vec::new();

    for &(id, rtl) in items {
        run.push(id);
        if rtl != Some(false) {
            runs.push(core::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs.into_iter().rev().flatten().collect()
}

/// Render order of a tree's tokens.
pub fn render_order(tree: &Tree, with_empty: bool, with_groups: bool) -> Vec<TokenId> {
    let items: Vec<(TokenId, Option<bool>)> = tree
        .tokens_in_order(with_empty, with_groups)
        .map(|token| (token.id, token.rtl_override()))
        .collect();
    visual_order(&items, tree.direction())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_protocol::Token;
    use proptest::prelude::*;

    fn plain(n: u32) -> Vec<(u32, Option<bool>)> {
        (1..=n).map(|i| (i, None)).collect()
    }

    #[test]
    fn test_identity_without_overrides() {
        assert_eq!(visual_order(&plain(5), Direction::LeftToRight), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rtl_sentence_is_mirrored() {
        assert_eq!(visual_order(&plain(4), Direction::RightToLeft), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_rtl_run_inside_ltr_sentence() {
        // 1 LTR, 2-3 RTL, 4 LTR: the run "2 3 4" ends at 4 and is drawn back to front
        let items = [(1, None), (2, Some(true)), (3, Some(true)), (4, None)];
        assert_eq!(visual_order(&items, Direction::LeftToRight), vec![1, 4, 3, 2]);
    }

    #[test]
    fn test_trailing_rtl_run() {
        let items = [(1, None), (2, Some(true)), (3, Some(true))];
        assert_eq!(visual_order(&items, Direction::LeftToRight), vec![1, 3, 2]);
    }

    #[test]
    fn test_ltr_run_inside_rtl_sentence() {
        // Latin words "2 3" embedded in an RTL sentence keep their reading order
        let items = [(1, None), (2, Some(false)), (3, Some(false)), (4, None)];
        assert_eq!(visual_order(&items, Direction::RightToLeft), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_empty_input() {
        let items: [(u32, Option<bool>); 0] = [];
        assert!(visual_order(&items, Direction::LeftToRight).is_empty());
        assert!(visual_order(&items, Direction::RightToLeft).is_empty());
    }

    #[test]
    fn test_render_order_filters_virtual_tokens() {
        let tree = Tree::from_tokens([
            Token::new("1-2".parse().unwrap(), "du"),
            Token::new(TokenId::Word(1), "de"),
            Token::new(TokenId::Word(2), "le"),
            Token::new(TokenId::Empty(2, 1), "_"),
        ]);
        assert_eq!(render_order(&tree, false, false), vec![TokenId::Word(1), TokenId::Word(2)]);
        assert_eq!(
            render_order(&tree, true, true),
            vec![TokenId::Group(1, 2), TokenId::Word(1), TokenId::Word(2), TokenId::Empty(2, 1)]
        );
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::LeftToRight), Just(Direction::RightToLeft)]
    }

    proptest! {
        #[test]
        fn test_output_is_permutation(
            overrides in proptest::collection::vec(proptest::option::of(any::<bool>()), 0..40),
            direction in direction_strategy(),
        ) {
            let items: Vec<(usize, Option<bool>)> = overrides.iter().copied().enumerate().collect();
            let mut order = visual_order(&items, direction);
            prop_assert_eq!(order.len(), items.len());
            order.sort_unstable();
            prop_assert_eq!(order, (0..items.len()).collect::<Vec<_>>());
        }

        #[test]
        fn test_deterministic(
            overrides in proptest::collection::vec(proptest::option::of(any::<bool>()), 0..20),
            direction in direction_strategy(),
        ) {
            let items: Vec<(usize, Option<bool>)> = overrides.iter().copied().enumerate().collect();
            prop_assert_eq!(visual_order(&items, direction), visual_order(&items, direction));
        }
    }
}
