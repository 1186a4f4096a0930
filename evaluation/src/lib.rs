pub mod scores;
pub mod traditional;
pub mod wdl;

pub use traditional::evaluate_board;
