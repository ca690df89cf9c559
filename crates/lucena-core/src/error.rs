//! Error types for position loading and validation.

use thiserror::Error;

/// A FEN string that could not be turned into a valid position.
///
/// Parsing is strict: a malformed FEN surfaces here instead of silently
/// producing a wrong board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 FEN fields, found {found}")]
    WrongFieldCount { found: usize },
    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount { found: usize },
    #[error("rank {rank} describes {squares} squares, expected 8")]
    BadRankLength { rank: usize, squares: usize },
    #[error("invalid piece character '{character}'")]
    InvalidPiece { character: char },
    #[error("invalid active color \"{found}\"")]
    InvalidColor { found: String },
    #[error("invalid castling character '{character}'")]
    InvalidCastling { character: char },
    #[error("invalid en passant square \"{found}\"")]
    InvalidEnPassant { found: String },
    #[error("invalid {field} \"{found}\"")]
    InvalidCounter { field: &'static str, found: String },
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),
}

/// Structural inconsistencies in a board position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount { color: &'static str, count: u32 },
    #[error("pawns found on a back rank")]
    PawnsOnBackRank,
    #[error("piece bitboards overlap")]
    OverlappingPieces,
    #[error("side bitboards overlap")]
    OverlappingSides,
    #[error("occupied bitboard disagrees with side bitboards")]
    InconsistentOccupied,
    #[error("mailbox disagrees with piece bitboards at {square}")]
    InconsistentMailbox { square: String },
}

#[cfg(test)]
mod tests {
    use super::{BoardError, FenError};

    #[test]
    fn display_messages() {
        let err = FenError::WrongFieldCount { found: 4 };
        assert_eq!(err.to_string(), "expected 6 FEN fields, found 4");
        assert_eq!(
            BoardError::PawnsOnBackRank.to_string(),
            "pawns found on a back rank"
        );
    }

    #[test]
    fn board_error_converts() {
        let err: FenError = BoardError::OverlappingPieces.into();
        assert!(matches!(err, FenError::InvalidBoard(_)));
    }
}
