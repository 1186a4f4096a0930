use arrayvec::ArrayVec;
use cozy_chess::{Board, Color};

use crate::encoding::{
    active_features, feature_index, king_side, network_variant, MAX_ACTIVE_FEATURES,
};
use crate::network::Network;
use crate::stack::EvalStack;
use crate::stats;

/// Evaluate the node at `index`, maintaining both perspective accumulators
/// incrementally along the way. Returns centipawns from the side to move.
pub fn evaluate_node(network: &Network, stack: &mut EvalStack, index: usize) -> i32 {
    if let Some(score) = stack.node(index).context.score {
        return score;
    }

    let refresh_cost = stack.node(index).board.occupied().len() as usize;

    for perspective in [Color::White, Color::Black] {
        resolve_accumulator(network, stack, index, perspective, refresh_cost);
    }

    let node = stack.node(index);
    let stm = node.board.side_to_move();
    let own = &node.context.accumulators[stm as usize];
    let their = &node.context.accumulators[!stm as usize];
    let score = network.run(own, their, network_variant(&node.board));

    stack.node_mut(index).context.score = Some(score);
    score
}

/// Stateless evaluation of a bare position, bypassing all incremental state.
pub fn evaluate_board(network: &Network, board: &Board) -> i32 {
    let stm = board.side_to_move();

    let mut own = [0u16; MAX_ACTIVE_FEATURES];
    let own_count = active_features(board, stm, &mut own);

    let mut their = [0u16; MAX_ACTIVE_FEATURES];
    let their_count = active_features(board, !stm, &mut their);

    network.run_features(&own[..own_count], &their[..their_count], network_variant(board))
}

/// Bring the accumulator for `perspective` at `index` up to date, choosing
/// between reusing an ancestor state and a full refresh.
fn resolve_accumulator(
    network: &Network,
    stack: &mut EvalStack,
    index: usize,
    perspective: Color,
    refresh_cost: usize,
) {
    let side = perspective as usize;
    let target_king_side = king_side(&stack.node(index).board, perspective);

    // Walk toward the root looking for the nearest accumulator worth
    // updating from. Give up when replaying the dirty pieces would cost
    // more than a refresh, or when the king crossed the file boundary and
    // the feature frames no longer match.
    let mut update_cost = 0;
    let mut prev_accum = None;
    let mut cursor = Some(index);
    while let Some(i) = cursor {
        let node = stack.node(i);

        update_cost += node.context.dirty_pieces.len();
        if update_cost > refresh_cost {
            break;
        }
        if king_side(&node.board, perspective) != target_king_side {
            break;
        }
        if !node.context.accumulator_dirty[side] {
            prev_accum = Some(i);
            break;
        }

        cursor = node.parent;
    }

    if prev_accum == Some(index) {
        // Accumulator is already up to date.
        return;
    }

    let parent = stack.node(index).parent;
    match (parent, prev_accum) {
        // Two-stage update: bring the parent up to date first, so sibling
        // nodes can reuse its accumulator instead of repeating the walk.
        (Some(p), Some(prev))
            if p != prev && stack.node(p).context.accumulator_dirty[side] =>
        {
            update_accumulator(network, stack, Some(prev), p, perspective);
            update_accumulator(network, stack, Some(p), index, perspective);
        }
        _ => update_accumulator(network, stack, prev_accum, index, perspective),
    }
}

/// Compute `target`'s accumulator from `prev`'s (incremental), or from the
/// position itself when no usable ancestor exists (refresh).
fn update_accumulator(
    network: &Network,
    stack: &mut EvalStack,
    prev: Option<usize>,
    target: usize,
    perspective: Color,
) {
    let side = perspective as usize;
    debug_assert!(prev != Some(target));
    debug_assert!(stack.node(target).context.accumulator_dirty[side]);

    match prev {
        Some(prev) => {
            debug_assert!(!stack.node(prev).context.accumulator_dirty[side]);

            let mut added: ArrayVec<u16, MAX_ACTIVE_FEATURES> = ArrayVec::new();
            let mut removed: ArrayVec<u16, MAX_ACTIVE_FEATURES> = ArrayVec::new();

            // Collect the dirty pieces of every edge between prev and
            // target. Indices are resolved in the target node's frame: the
            // ancestor walk already rejected any king-side change, so every
            // node on this path shares the target's flip.
            {
                let target_board = &stack.node(target).board;
                let mut i = target;
                while i != prev {
                    let node = stack.node(i);
                    for dirty in &node.context.dirty_pieces {
                        if let Some(to) = dirty.to {
                            added.push(feature_index(
                                dirty.piece,
                                dirty.color,
                                to,
                                target_board,
                                perspective,
                            ));
                        }
                        if let Some(from) = dirty.from {
                            removed.push(feature_index(
                                dirty.piece,
                                dirty.color,
                                from,
                                target_board,
                                perspective,
                            ));
                        }
                    }
                    i = node.parent.expect("prev must be an ancestor of target");
                }
            }

            cancel_pairs(&mut added, &mut removed);

            stats::count_update();

            let (prev_node, target_node) = stack.pair_mut(prev, target);
            if added.is_empty() && removed.is_empty() {
                target_node.context.accumulators[side] =
                    prev_node.context.accumulators[side].clone();
            } else {
                target_node.context.accumulators[side].update(
                    &prev_node.context.accumulators[side],
                    network.accumulator_weights(),
                    &added,
                    &removed,
                );
            }
        }
        None => {
            stats::count_refresh();

            let mut features = [0u16; MAX_ACTIVE_FEATURES];
            let count = active_features(&stack.node(target).board, perspective, &mut features);
            stack.node_mut(target).context.accumulators[side].refresh(
                network.accumulator_weights(),
                network.accumulator_biases(),
                &features[..count],
            );
        }
    }

    stack.node_mut(target).context.accumulator_dirty[side] = false;
}

/// Remove index pairs present in both lists; adding and removing the same
/// feature cancels exactly. Quadratic on purpose: both lists are tiny and
/// a hash set's constant factor would dominate.
fn cancel_pairs(
    added: &mut ArrayVec<u16, MAX_ACTIVE_FEATURES>,
    removed: &mut ArrayVec<u16, MAX_ACTIVE_FEATURES>,
) {
    let mut i = 0;
    'added: while i < added.len() {
        let mut j = 0;
        while j < removed.len() {
            if added[i] == removed[j] {
                added.swap_remove(i);
                removed.swap_remove(j);
                continue 'added;
            }
            j += 1;
        }
        i += 1;
    }
}
