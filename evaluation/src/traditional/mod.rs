mod evaluation;
mod pst;
mod values;

pub use evaluation::evaluate_board;
