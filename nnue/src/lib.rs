#![feature(portable_simd)]

pub mod context;
pub mod encoding;
pub mod evaluator;
pub mod network;
pub mod stack;
pub mod stats;

pub use context::{dirty_pieces_for_move, DirtyPiece, NodeContext};
pub use evaluator::{evaluate_board, evaluate_node};
pub use network::{Accumulator, Network};
pub use stack::EvalStack;

#[cfg(test)]
mod tests;
