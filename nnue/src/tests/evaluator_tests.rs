use cozy_chess::{Board, Move, Square};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::test_network;
use crate::context::dirty_pieces_for_move;
use crate::evaluator::{evaluate_board, evaluate_node};
use crate::stack::EvalStack;

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

/// Apply `mv` on top of `parent`, recording the dirty pieces the way the
/// search does when it walks into a child node.
fn push_move(stack: &mut EvalStack, parent: usize, mv: Move) -> usize {
    let parent_board = stack.node(parent).board.clone();
    let dirty = dirty_pieces_for_move(&parent_board, mv);
    let mut board = parent_board;
    board.play(mv);
    stack.push_child(parent, board, &dirty)
}

#[test]
fn incremental_matches_refresh_over_e2e4() {
    let network = test_network(1);
    let mut stack = EvalStack::new();
    let root = stack.push_root(Board::default());
    evaluate_node(&network, &mut stack, root);

    let child = push_move(
        &mut stack,
        root,
        Move {
            from: Square::E2,
            to: Square::E4,
            promotion: None,
        },
    );

    let incremental = evaluate_node(&network, &mut stack, child);
    let reference = evaluate_board(&network, &stack.node(child).board);
    assert_eq!(incremental, reference);
}

#[test]
fn capture_update_matches_refresh() {
    // White knight on c4 takes the black pawn on e5: one add, two removes,
    // nothing cancels.
    let network = test_network(2);
    let board: Board = "rnbqkb1r/pppp1ppp/5n2/4p3/2N5/8/PPPPPPPP/R1BQKBNR w KQkq - 2 3"
        .parse()
        .unwrap();

    let mut stack = EvalStack::new();
    let root = stack.push_root(board);
    evaluate_node(&network, &mut stack, root);

    let child = push_move(
        &mut stack,
        root,
        Move {
            from: Square::C4,
            to: Square::E5,
            promotion: None,
        },
    );

    let incremental = evaluate_node(&network, &mut stack, child);
    let reference = evaluate_board(&network, &stack.node(child).board);
    assert_eq!(incremental, reference);
}

#[test]
fn king_crossing_the_file_boundary_stays_consistent() {
    // Kd1-e1 flips the file transform for White; the evaluator must not
    // reuse the pre-move accumulator for that perspective.
    let network = test_network(3);
    let board: Board = "4k3/8/8/8/8/8/8/3K4 w - - 0 1".parse().unwrap();

    let mut stack = EvalStack::new();
    let root = stack.push_root(board);
    evaluate_node(&network, &mut stack, root);

    let child = push_move(
        &mut stack,
        root,
        Move {
            from: Square::D1,
            to: Square::E1,
            promotion: None,
        },
    );

    let incremental = evaluate_node(&network, &mut stack, child);
    let reference = evaluate_board(&network, &stack.node(child).board);
    assert_eq!(incremental, reference);
}

#[test]
fn score_is_cached_per_node() {
    let network = test_network(4);
    let mut stack = EvalStack::new();
    let root = stack.push_root(Board::default());

    let first = evaluate_node(&network, &mut stack, root);
    assert_eq!(stack.node(root).context.score, Some(first));
    let second = evaluate_node(&network, &mut stack, root);
    assert_eq!(first, second);
}

#[test]
fn siblings_share_parent_work() {
    let network = test_network(5);
    let mut stack = EvalStack::new();
    let root = stack.push_root(Board::default());
    evaluate_node(&network, &mut stack, root);

    // Walk one move deep without evaluating, then evaluate two siblings.
    let middle = push_move(
        &mut stack,
        root,
        Move {
            from: Square::E2,
            to: Square::E4,
            promotion: None,
        },
    );

    let replies = legal_moves(&stack.node(middle).board);
    let first = push_move(&mut stack, middle, replies[0]);
    let second = push_move(&mut stack, middle, replies[1]);

    let score = evaluate_node(&network, &mut stack, first);
    assert_eq!(score, evaluate_board(&network, &stack.node(first).board));

    // The two-stage update resolved the shared parent on the way.
    assert!(!stack.node(middle).context.accumulator_dirty[0]);
    assert!(!stack.node(middle).context.accumulator_dirty[1]);

    let score = evaluate_node(&network, &mut stack, second);
    assert_eq!(score, evaluate_board(&network, &stack.node(second).board));
}

#[test]
fn random_game_replay_matches_stateless() {
    let network = test_network(7);
    let mut rng = StdRng::seed_from_u64(42);

    for game in 0..3u64 {
        let mut stack = EvalStack::new();
        let mut node = stack.push_root(Board::default());
        evaluate_node(&network, &mut stack, node);

        for ply in 0..120 {
            let board = stack.node(node).board.clone();
            let moves = legal_moves(&board);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            node = push_move(&mut stack, node, mv);

            let incremental = evaluate_node(&network, &mut stack, node);
            let reference = evaluate_board(&network, &stack.node(node).board);
            assert_eq!(incremental, reference, "game {} ply {}", game, ply);
        }
    }
}

#[test]
fn sparse_evaluation_walks_multiple_edges() {
    // Evaluating only every fourth node forces the ancestor walk to replay
    // several edges' worth of dirty pieces in one update.
    let network = test_network(8);
    let mut rng = StdRng::seed_from_u64(99);

    let mut stack = EvalStack::new();
    let mut node = stack.push_root(Board::default());
    evaluate_node(&network, &mut stack, node);

    for ply in 1..=80 {
        let board = stack.node(node).board.clone();
        let moves = legal_moves(&board);
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        node = push_move(&mut stack, node, mv);

        if ply % 4 == 0 {
            let incremental = evaluate_node(&network, &mut stack, node);
            let reference = evaluate_board(&network, &stack.node(node).board);
            assert_eq!(incremental, reference, "ply {}", ply);
        }
    }
}

#[cfg(feature = "accumulator-stats")]
#[test]
fn stats_count_refreshes_and_updates() {
    use crate::stats::accumulator_stats;

    let network = test_network(9);
    let mut stack = EvalStack::new();
    let root = stack.push_root(Board::default());

    let (updates_before, refreshes_before) = accumulator_stats();
    evaluate_node(&network, &mut stack, root);
    let child = push_move(
        &mut stack,
        root,
        Move {
            from: Square::G1,
            to: Square::F3,
            promotion: None,
        },
    );
    evaluate_node(&network, &mut stack, child);
    let (updates_after, refreshes_after) = accumulator_stats();

    // A fresh root costs two refreshes; the child reuses them with updates.
    assert!(refreshes_after >= refreshes_before + 2);
    assert!(updates_after >= updates_before + 2);
}
