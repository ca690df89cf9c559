//! Zobrist hashing keys.
//!
//! All keys are generated at compile time from a fixed xorshift64 stream,
//! so hashes are deterministic across runs and builds. Key classes:
//! one per (piece, square), one for the side to move, one per castling
//! rights mask, one per en passant file.

use crate::board::Board;
use crate::color::Color;
use crate::piece::Piece;

const SEED: u64 = 0x4c55_4345_4e41_2138; // "LUCENA!8"

/// Xorshift64 step: returns (value, next state).
const fn xorshift64(mut state: u64) -> (u64, u64) {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state, state)
}

const fn advance(mut state: u64, steps: usize) -> u64 {
    let mut i = 0;
    while i < steps {
        let (_, next) = xorshift64(state);
        state = next;
        i += 1;
    }
    state
}

/// Keys per (piece, square), indexed `[Piece::index()][Square::index()]`.
pub(crate) static PIECE_SQUARE: [[u64; 64]; 12] = {
    let mut table = [[0u64; 64]; 12];
    let mut state = SEED;
    let mut piece = 0;
    while piece < 12 {
        let mut sq = 0;
        while sq < 64 {
            let (val, next) = xorshift64(state);
            table[piece][sq] = val;
            state = next;
            sq += 1;
        }
        piece += 1;
    }
    table
};

/// Key XORed in when Black is to move.
pub(crate) static SIDE_TO_MOVE: u64 = {
    let state = advance(SEED, 12 * 64);
    let (val, _) = xorshift64(state);
    val
};

/// Keys per castling-rights mask, indexed by `CastleRights::bits()`.
pub(crate) static CASTLING: [u64; 16] = {
    let mut table = [0u64; 16];
    let mut state = advance(SEED, 12 * 64 + 1);
    let mut i = 0;
    while i < 16 {
        let (val, next) = xorshift64(state);
        table[i] = val;
        state = next;
        i += 1;
    }
    table
};

/// Keys per en passant file.
pub(crate) static EN_PASSANT_FILE: [u64; 8] = {
    let mut table = [0u64; 8];
    let mut state = advance(SEED, 12 * 64 + 1 + 16);
    let mut i = 0;
    while i < 8 {
        let (val, next) = xorshift64(state);
        table[i] = val;
        state = next;
        i += 1;
    }
    table
};

/// Hash a position from scratch.
///
/// Used when loading a position; all play maintains the hash incrementally
/// and tests cross-check against this.
pub fn hash_from_scratch(board: &Board) -> u64 {
    let mut hash = 0u64;

    for piece in Piece::all() {
        for sq in board.pieces(piece.kind()) & board.side(piece.color()) {
            hash ^= PIECE_SQUARE[piece.index()][sq.index()];
        }
    }

    if board.side_to_move() == Color::Black {
        hash ^= SIDE_TO_MOVE;
    }

    hash ^= CASTLING[board.castling().bits() as usize];

    if let Some(ep) = board.en_passant() {
        hash ^= EN_PASSANT_FILE[ep.file().index()];
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn starting_position_hash_is_stable() {
        let board = Board::starting_position();
        assert_ne!(board.hash(), 0);
        assert_eq!(board.hash(), hash_from_scratch(&board));
    }

    #[test]
    fn keys_do_not_collide() {
        let mut keys: Vec<u64> = PIECE_SQUARE.iter().flatten().copied().collect();
        keys.push(SIDE_TO_MOVE);
        keys.extend_from_slice(&CASTLING);
        keys.extend_from_slice(&EN_PASSANT_FILE);
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total, "duplicate zobrist keys");
    }

    #[test]
    fn side_to_move_changes_hash() {
        let white: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let black: Board = "4k3/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
        assert_ne!(white.hash(), black.hash());
        assert_eq!(white.hash() ^ SIDE_TO_MOVE, black.hash());
    }
}
