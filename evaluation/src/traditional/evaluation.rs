use cozy_chess::{Board, Color, Piece};

use crate::traditional::pst::pst_value;
use crate::traditional::values::{piece_value, BISHOP_PAIR_BONUS, TEMPO_BONUS};

// Return final evaluation in centipawns (positive = good for White).
pub fn evaluate_board(board: &Board) -> i16 {
    let phase = game_phase(board);

    let mut score = 0i16;
    score += evaluate_side(board, Color::White, phase);
    score -= evaluate_side(board, Color::Black, phase);

    score += match board.side_to_move() {
        Color::White => TEMPO_BONUS,
        Color::Black => -TEMPO_BONUS,
    };

    score
}

fn evaluate_side(board: &Board, color: Color, phase: f32) -> i16 {
    let mut cp = 0i16;

    for piece in Piece::ALL {
        let mask = board.colored_pieces(color, piece);
        cp += piece_value(piece, phase) * mask.len() as i16;
        for sq in mask {
            cp += pst_value(piece, color, sq);
        }
    }

    if board.colored_pieces(color, Piece::Bishop).len() >= 2 {
        cp += BISHOP_PAIR_BONUS;
    }

    cp
}

fn game_phase(board: &Board) -> f32 {
    let knights = board.pieces(Piece::Knight).len();
    let bishops = board.pieces(Piece::Bishop).len();
    let rooks = board.pieces(Piece::Rook).len();
    let queens = board.pieces(Piece::Queen).len();

    let score = knights + bishops + 2 * rooks + 4 * queens;

    (score.min(24) as f32) / 24.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_balanced_up_to_tempo() {
        let board = Board::default();
        assert_eq!(evaluate_board(&board), TEMPO_BONUS);
    }

    #[test]
    fn extra_queen_dominates() {
        // White queen vs bare kings.
        let board: Board = "4k3/8/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        assert!(evaluate_board(&board) > 800);
    }

    #[test]
    fn symmetry_under_color_swap() {
        // Mirrored position: Black up a rook instead of White.
        let white_up: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let black_up: Board = "r3k3/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
        assert_eq!(evaluate_board(&white_up), -evaluate_board(&black_up));
    }
}
