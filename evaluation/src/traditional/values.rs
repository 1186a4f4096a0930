use cozy_chess::Piece;

/// Piece values for middlegame (mg) and endgame (eg), interpolated by game phase.
///
/// <https://www.chessprogramming.org/Tapered_Eval>
#[derive(Debug, Clone, Copy)]
pub struct PieceValues {
    pub pawn_value_mg: f32,
    pub pawn_value_eg: f32,
    pub knight_value_mg: f32,
    pub knight_value_eg: f32,
    pub bishop_value_mg: f32,
    pub bishop_value_eg: f32,
    pub rook_value_mg: f32,
    pub rook_value_eg: f32,
    pub queen_value_mg: f32,
    pub queen_value_eg: f32,
}

pub const PIECE_VALUES: PieceValues = PieceValues {
    pawn_value_mg: 82.0,
    pawn_value_eg: 94.0,
    knight_value_mg: 337.0,
    knight_value_eg: 281.0,
    bishop_value_mg: 365.0,
    bishop_value_eg: 297.0,
    rook_value_mg: 477.0,
    rook_value_eg: 512.0,
    queen_value_mg: 1025.0,
    queen_value_eg: 936.0,
};

pub const BISHOP_PAIR_BONUS: i16 = 30;
pub const TEMPO_BONUS: i16 = 12;

/// Returns the interpolated piece value based on game phase (1.0 = opening, 0.0 = endgame).
pub fn piece_value(piece: Piece, phase: f32) -> i16 {
    let (mg, eg) = match piece {
        Piece::Pawn => (PIECE_VALUES.pawn_value_mg, PIECE_VALUES.pawn_value_eg),
        Piece::Knight => (PIECE_VALUES.knight_value_mg, PIECE_VALUES.knight_value_eg),
        Piece::Bishop => (PIECE_VALUES.bishop_value_mg, PIECE_VALUES.bishop_value_eg),
        Piece::Rook => (PIECE_VALUES.rook_value_mg, PIECE_VALUES.rook_value_eg),
        Piece::Queen => (PIECE_VALUES.queen_value_mg, PIECE_VALUES.queen_value_eg),
        Piece::King => return 0, // Cut early for king
    };
    ((mg * phase) + (eg * (1.0 - phase))).round() as i16
}
