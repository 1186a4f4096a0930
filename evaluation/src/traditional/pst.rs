use cozy_chess::{Color, Piece, Square};

/// Look up the piece-square bonus for a piece of `color` on `square`.
/// Tables are written from White's point of view; Black squares are rank-mirrored.
#[inline(always)]
pub fn pst_value(piece: Piece, color: Color, square: Square) -> i16 {
    let idx = match color {
        Color::White => square as usize,
        Color::Black => square as usize ^ 56,
    };
    match piece {
        Piece::Pawn => PAWN_PST[idx],
        Piece::Knight => KNIGHT_PST[idx],
        Piece::Bishop => BISHOP_PST[idx],
        Piece::Rook => ROOK_PST[idx],
        Piece::Queen => QUEEN_PST[idx],
        Piece::King => KING_PST[idx],
    }
}

// - Encourages pushing central pawns, discourages leaving them at home
const PAWN_PST: [i16; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, // RANK 1: a1..h1
    5, 10, 10, -20, -20, 10, 10, 5, // RANK 2
    5, -5, -10, 0, 0, -10, -5, 5, // RANK 3
    0, 0, 0, 20, 20, 0, 0, 0, // RANK 4
    5, 5, 10, 25, 25, 10, 5, 5, // RANK 5
    10, 10, 20, 30, 30, 20, 10, 10, // RANK 6
    50, 50, 50, 50, 50, 50, 50, 50, // RANK 7
    0, 0, 0, 0, 0, 0, 0, 0, // RANK 8
];

// - Mild center preference, rim penalty
const KNIGHT_PST: [i16; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, // RANK 1: a1..h1
    -40, -20, 0, 5, 5, 0, -20, -40, // RANK 2
    -30, 5, 10, 15, 15, 10, 5, -30, // RANK 3
    -30, 0, 15, 20, 20, 15, 0, -30, // RANK 4
    -30, 5, 15, 20, 20, 15, 5, -30, // RANK 5
    -30, 0, 10, 15, 15, 10, 0, -30, // RANK 6
    -40, -20, 0, 0, 0, 0, -20, -40, // RANK 7
    -50, -40, -30, -30, -30, -30, -40, -50, // RANK 8
];

// - Long-diagonal bonuses, corner penalty
const BISHOP_PST: [i16; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20, // RANK 1: a1..h1
    -10, 5, 0, 0, 0, 0, 5, -10, // RANK 2
    -10, 10, 10, 10, 10, 10, 10, -10, // RANK 3
    -10, 0, 10, 10, 10, 10, 0, -10, // RANK 4
    -10, 5, 5, 10, 10, 5, 5, -10, // RANK 5
    -10, 0, 5, 10, 10, 5, 0, -10, // RANK 6
    -10, 0, 0, 0, 0, 0, 0, -10, // RANK 7
    -20, -10, -10, -10, -10, -10, -10, -20, // RANK 8
];

// - Seventh-rank and central-file preference
const ROOK_PST: [i16; 64] = [
    0, 0, 0, 5, 5, 0, 0, 0, // RANK 1: a1..h1
    -5, 0, 0, 0, 0, 0, 0, -5, // RANK 2
    -5, 0, 0, 0, 0, 0, 0, -5, // RANK 3
    -5, 0, 0, 0, 0, 0, 0, -5, // RANK 4
    -5, 0, 0, 0, 0, 0, 0, -5, // RANK 5
    -5, 0, 0, 0, 0, 0, 0, -5, // RANK 6
    5, 10, 10, 10, 10, 10, 10, 5, // RANK 7
    0, 0, 0, 0, 0, 0, 0, 0, // RANK 8
];

// - Mild center bonus
const QUEEN_PST: [i16; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20, // RANK 1: a1..h1
    -10, 0, 5, 0, 0, 0, 0, -10, // RANK 2
    -10, 5, 5, 5, 5, 5, 0, -10, // RANK 3
    0, 0, 5, 5, 5, 5, 0, -5, // RANK 4
    -5, 0, 5, 5, 5, 5, 0, -5, // RANK 5
    -10, 0, 5, 5, 5, 5, 0, -10, // RANK 6
    -10, 0, 0, 0, 0, 0, 0, -10, // RANK 7
    -20, -10, -10, -5, -5, -10, -10, -20, // RANK 8
];

// - Rewards castled shelter squares, penalises wandering forward
const KING_PST: [i16; 64] = [
    20, 30, 10, 0, 0, 10, 30, 20, // RANK 1: a1..h1
    20, 20, 0, 0, 0, 0, 20, 20, // RANK 2
    -10, -20, -20, -20, -20, -20, -20, -10, // RANK 3
    -20, -30, -30, -40, -40, -30, -30, -20, // RANK 4
    -30, -40, -40, -50, -50, -40, -40, -30, // RANK 5
    -30, -40, -40, -50, -50, -40, -40, -30, // RANK 6
    -30, -40, -40, -50, -50, -40, -40, -30, // RANK 7
    -30, -40, -40, -50, -50, -40, -40, -30, // RANK 8
];
