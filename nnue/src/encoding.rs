use cozy_chess::{Board, Color, Piece, Square};

// Sparse input layout, per perspective:
// own pawns/knights/bishops/rooks/queens (5 x 64), own king (32-slot
// subspace), opponent pawns/knights/bishops/rooks/queens (5 x 64),
// opponent king (64). The perspective side's king is file-normalised to
// files a-d, which is what makes the 32-slot subspace sufficient.

/// Slots reserved for the perspective side's king after file normalisation.
pub const OWN_KING_SLOTS: usize = 32;

/// Total width of the sparse input space.
pub const NUM_FEATURES: usize = 10 * Square::NUM + OWN_KING_SLOTS + Square::NUM; // 736

/// Upper bound on simultaneously active features (one per piece on the board).
pub const MAX_ACTIVE_FEATURES: usize = 64;

/// Sub-network variants: queen presence x 8 piece-count buckets.
pub const NUM_VARIANTS: usize = 16;
const PIECE_COUNT_BUCKETS: u32 = 8;

/// Non-king piece types, in feature-layout order.
const PIECE_TYPES: [Piece; 5] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
];

const RANK_FLIP: usize = 0b111000;
const FILE_FLIP: usize = 0b000111;

/// Square transform for a perspective: flip ranks when encoding for Black,
/// flip files when the perspective side's king sits on files e-h. Both
/// flips are XORs on the 6-bit square index and may combine.
#[inline(always)]
fn flip_mask(board: &Board, perspective: Color) -> usize {
    let mut flip = 0;
    if perspective == Color::Black {
        flip |= RANK_FLIP;
    }
    if board.king(perspective).file() as usize >= 4 {
        flip |= FILE_FLIP;
    }
    flip
}

/// Index into the 32-slot own-king subspace; the square must already be
/// file-normalised to files a-d.
#[inline(always)]
fn own_king_slot(square_idx: usize) -> usize {
    debug_assert!(square_idx % 8 < 4);
    4 * (square_idx / 8) + square_idx % 8
}

/// Write the active feature indices of `board` seen from `perspective`.
/// Returns the number of indices written (one per piece, at most 32).
pub fn active_features(
    board: &Board,
    perspective: Color,
    out: &mut [u16; MAX_ACTIVE_FEATURES],
) -> usize {
    let flip = flip_mask(board, perspective);
    let mut count = 0;
    let mut base = 0;

    for side in [perspective, !perspective] {
        for piece in PIECE_TYPES {
            for sq in board.colored_pieces(side, piece) {
                out[count] = (base + (sq as usize ^ flip)) as u16;
                count += 1;
            }
            base += Square::NUM;
        }

        let king = board.king(side) as usize ^ flip;
        if side == perspective {
            out[count] = (base + own_king_slot(king)) as u16;
            base += OWN_KING_SLOTS;
        } else {
            out[count] = (base + king) as u16;
            base += Square::NUM;
        }
        count += 1;
    }

    debug_assert_eq!(base, NUM_FEATURES);
    count
}

/// Feature index of a single piece, exactly as `active_features` would
/// emit it for the same board and perspective. This is the contract that
/// keeps incremental updates and full refreshes interchangeable.
pub fn feature_index(
    piece: Piece,
    piece_color: Color,
    square: Square,
    board: &Board,
    perspective: Color,
) -> u16 {
    let sq = square as usize ^ flip_mask(board, perspective);

    let mut index = if piece == Piece::King && piece_color == perspective {
        5 * Square::NUM + own_king_slot(sq)
    } else {
        piece as usize * Square::NUM + sq
    };

    // Opponent pieces occupy the second half of the layout.
    if piece_color != perspective {
        index += 5 * Square::NUM + OWN_KING_SLOTS;
    }

    debug_assert!(index < NUM_FEATURES);
    index as u16
}

/// Select one of the 16 sub-networks from queen presence and the number of
/// non-king pieces.
pub fn network_variant(board: &Board) -> u32 {
    let non_king_pieces = board.occupied().len() - 2;
    let piece_count_bucket = (non_king_pieces / 4).min(PIECE_COUNT_BUCKETS - 1);
    let queen_bucket = u32::from(!board.pieces(Piece::Queen).is_empty());
    queen_bucket * PIECE_COUNT_BUCKETS + piece_count_bucket
}

/// True if `perspective`'s king is on files a-d. Crossing this boundary
/// flips the file transform, so incremental state from the other side of
/// it cannot be reused.
#[inline(always)]
pub fn king_side(board: &Board, perspective: Color) -> bool {
    (board.king(perspective).file() as usize) < 4
}

/// Split a king square into its board half (true = files a-d) and its
/// 32-slot subspace index after file normalisation. The trainer uses this
/// to select positions for a particular king bucket.
pub fn king_side_and_bucket(king: Square) -> (bool, u32) {
    let mut sq = king as usize;
    let left_side = sq % 8 < 4;
    if !left_side {
        sq ^= FILE_FLIP;
    }
    (left_side, own_king_slot(sq) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_feature_count() {
        let board = Board::default();
        let mut features = [0u16; MAX_ACTIVE_FEATURES];
        let count = active_features(&board, Color::White, &mut features);
        assert_eq!(count, 32);
    }

    #[test]
    fn start_position_white_king_index() {
        // The white king on e1 gets file-flipped to d1, so its subspace
        // slot is 4 * 0 + 3 = 3, written after the five own piece planes.
        let board = Board::default();
        let mut features = [0u16; MAX_ACTIVE_FEATURES];
        let count = active_features(&board, Color::White, &mut features);
        let expected = (5 * Square::NUM + 3) as u16;
        assert!(features[..count].contains(&expected));
        assert_eq!(
            feature_index(Piece::King, Color::White, Square::E1, &board, Color::White),
            expected
        );
    }

    #[test]
    fn features_are_deterministic_and_in_bounds() {
        let board: Board = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4"
            .parse()
            .unwrap();
        for perspective in [Color::White, Color::Black] {
            let mut a = [0u16; MAX_ACTIVE_FEATURES];
            let mut b = [0u16; MAX_ACTIVE_FEATURES];
            let count_a = active_features(&board, perspective, &mut a);
            let count_b = active_features(&board, perspective, &mut b);
            assert_eq!(count_a, count_b);
            assert_eq!(a[..count_a], b[..count_b]);
            for &idx in &a[..count_a] {
                assert!((idx as usize) < NUM_FEATURES);
            }
        }
    }

    #[test]
    fn start_position_is_perspective_symmetric() {
        // The initial position looks identical from both sides, so both
        // perspectives must produce the same feature multiset.
        let board = Board::default();
        let mut white = [0u16; MAX_ACTIVE_FEATURES];
        let mut black = [0u16; MAX_ACTIVE_FEATURES];
        let count_white = active_features(&board, Color::White, &mut white);
        let count_black = active_features(&board, Color::Black, &mut black);

        let mut white: Vec<u16> = white[..count_white].to_vec();
        let mut black: Vec<u16> = black[..count_black].to_vec();
        white.sort_unstable();
        black.sort_unstable();
        assert_eq!(white, black);
    }

    #[test]
    fn feature_index_matches_active_features() {
        let board: Board = "2kr3r/ppp2ppp/2n1b3/3q4/3P4/2N2N2/PP3PPP/R2QR1K1 w - - 0 14"
            .parse()
            .unwrap();
        for perspective in [Color::White, Color::Black] {
            let mut features = [0u16; MAX_ACTIVE_FEATURES];
            let count = active_features(&board, perspective, &mut features);
            let features = &features[..count];

            for sq in board.occupied() {
                let piece = board.piece_on(sq).unwrap();
                let color = board.color_on(sq).unwrap();
                let idx = feature_index(piece, color, sq, &board, perspective);
                assert!(
                    features.contains(&idx),
                    "{:?} {:?} on {} missing from feature list",
                    color,
                    piece,
                    sq
                );
            }

            // An absent piece must not map onto an active feature.
            let ghost = feature_index(Piece::Pawn, Color::White, Square::E5, &board, perspective);
            assert!(!features.contains(&ghost));
        }
    }

    #[test]
    fn feature_indices_are_disjoint_per_piece() {
        let board = Board::default();
        let mut seen = std::collections::HashSet::new();
        for sq in board.occupied() {
            let piece = board.piece_on(sq).unwrap();
            let color = board.color_on(sq).unwrap();
            let idx = feature_index(piece, color, sq, &board, Color::White);
            assert!(seen.insert(idx), "duplicate index {}", idx);
        }
    }

    #[test]
    fn variant_bucket_range_and_start_position() {
        let board = Board::default();
        // 30 non-king pieces with queens on the board: top bucket of the
        // queen half.
        assert_eq!(network_variant(&board), 15);

        let kings_only: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(network_variant(&kings_only), 0);

        let queen_endgame: Board = "4k3/8/8/8/8/8/4Q3/4K3 b - - 0 1".parse().unwrap();
        assert_eq!(network_variant(&queen_endgame), 8);

        for board in [&Board::default(), &kings_only, &queen_endgame] {
            assert!(network_variant(board) < NUM_VARIANTS as u32);
        }
    }

    #[test]
    fn king_side_tracks_the_file_boundary() {
        let board: Board = "4k3/8/8/8/8/8/8/3K4 w - - 0 1".parse().unwrap();
        assert!(king_side(&board, Color::White));
        assert!(!king_side(&board, Color::Black));
    }

    #[test]
    fn king_bucket_mirrors_across_the_boundary() {
        let (left, bucket_left) = king_side_and_bucket(Square::C1);
        let (right, bucket_right) = king_side_and_bucket(Square::F1);
        assert!(left);
        assert!(!right);
        // c1 and f1 are file mirrors, so they share a bucket.
        assert_eq!(bucket_left, bucket_right);
        assert!(bucket_left < OWN_KING_SLOTS as u32);
    }
}
