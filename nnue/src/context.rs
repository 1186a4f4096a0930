use arrayvec::ArrayVec;
use cozy_chess::{Board, Color, File, Move, Piece, Square};

use crate::network::Accumulator;

/// Most board changes a single move can produce (capture-promotion).
pub const MAX_DIRTY_PIECES: usize = 3;

/// A board delta between a parent and child search node.
/// `from == None` is an addition, `to == None` a removal, both set a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyPiece {
    pub piece: Piece,
    pub color: Color,
    pub from: Option<Square>,
    pub to: Option<Square>,
}

impl DirtyPiece {
    pub fn moved(piece: Piece, color: Color, from: Square, to: Square) -> Self {
        Self {
            piece,
            color,
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn added(piece: Piece, color: Color, to: Square) -> Self {
        Self {
            piece,
            color,
            from: None,
            to: Some(to),
        }
    }

    pub fn removed(piece: Piece, color: Color, from: Square) -> Self {
        Self {
            piece,
            color,
            from: Some(from),
            to: None,
        }
    }
}

/// Incremental evaluation state owned by a single search node.
pub struct NodeContext {
    /// One accumulator per perspective, indexed by `Color as usize`.
    pub accumulators: [Accumulator; 2],
    /// True while the matching accumulator has not been computed for this node.
    pub accumulator_dirty: [bool; 2],
    /// Board delta from the parent node to this one.
    pub dirty_pieces: ArrayVec<DirtyPiece, MAX_DIRTY_PIECES>,
    /// Cached network output, once this node has been evaluated.
    pub score: Option<i32>,
}

impl NodeContext {
    pub fn new() -> Self {
        Self {
            accumulators: [Accumulator::zeroed(), Accumulator::zeroed()],
            accumulator_dirty: [true; 2],
            dirty_pieces: ArrayVec::new(),
            score: None,
        }
    }
}

impl Default for NodeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the dirty-piece list for a legal move on `board`.
///
/// Castling arrives in king-takes-rook encoding; en passant removes a pawn
/// that sits on neither endpoint of the move.
pub fn dirty_pieces_for_move(board: &Board, mv: Move) -> ArrayVec<DirtyPiece, MAX_DIRTY_PIECES> {
    let mut dirty = ArrayVec::new();
    let color = board.side_to_move();
    let piece = board.piece_on(mv.from).expect("move must start on a piece");

    if piece == Piece::King && board.color_on(mv.to) == Some(color) {
        let rank = mv.from.rank();
        let (king_file, rook_file) = if (mv.to.file() as usize) > (mv.from.file() as usize) {
            (File::G, File::F)
        } else {
            (File::C, File::D)
        };
        dirty.push(DirtyPiece::moved(
            Piece::King,
            color,
            mv.from,
            Square::new(king_file, rank),
        ));
        dirty.push(DirtyPiece::moved(
            Piece::Rook,
            color,
            mv.to,
            Square::new(rook_file, rank),
        ));
        return dirty;
    }

    if let Some(victim) = board.piece_on(mv.to) {
        dirty.push(DirtyPiece::removed(victim, !color, mv.to));
    } else if piece == Piece::Pawn && mv.from.file() != mv.to.file() {
        // En passant: the captured pawn stands beside the destination.
        let victim_sq = Square::new(mv.to.file(), mv.from.rank());
        dirty.push(DirtyPiece::removed(Piece::Pawn, !color, victim_sq));
    }

    match mv.promotion {
        Some(promoted) => {
            dirty.push(DirtyPiece::removed(Piece::Pawn, color, mv.from));
            dirty.push(DirtyPiece::added(promoted, color, mv.to));
        }
        None => dirty.push(DirtyPiece::moved(piece, color, mv.from, mv.to)),
    }

    dirty
}
