//! The chess position: piece placement, game state, and the per-ply
//! history arena that makes unmake O(1).

use std::fmt;

use crate::bitboard::Bitboard;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::error::BoardError;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// Longest supported game in plies. Sizes the history arena.
pub const MAX_GAME_PLIES: usize = 1024;

/// Per-ply snapshot of everything a move destroys.
///
/// Written by `do_move` into `history[ply]` before the move is applied;
/// `undo_move` restores from it without recomputing anything. `hash` is
/// the position hash *before* the move, which doubles as the repetition
/// record for draw detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryEntry {
    pub castling: CastleRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub captured: Option<PieceKind>,
    pub hash: u64,
}

/// A complete, mutable chess position.
///
/// The per-kind/per-side bitboards and the 64-square mailbox are kept in
/// lock-step: a square holds piece P exactly when P's bitboard has that
/// bit set. The Zobrist hash is maintained incrementally through every
/// mutation and always equals [`zobrist::hash_from_scratch`].
#[derive(Clone)]
pub struct Board {
    pieces: [Bitboard; PieceKind::COUNT],
    sides: [Bitboard; Color::COUNT],
    occupied: Bitboard,
    mailbox: [Option<Piece>; Square::COUNT],
    side_to_move: Color,
    castling: CastleRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    hash: u64,
    ply: usize,
    history: Box<[HistoryEntry; MAX_GAME_PLIES]>,
}

impl Board {
    /// The standard starting position.
    pub fn starting_position() -> Board {
        crate::fen::STARTING_FEN
            .parse()
            .expect("starting FEN is valid")
    }

    /// Assemble a board from parsed FEN components.
    pub(crate) fn from_raw(
        pieces: [Bitboard; PieceKind::COUNT],
        sides: [Bitboard; Color::COUNT],
        side_to_move: Color,
        castling: CastleRights,
        en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Board {
        let mut mailbox = [None; Square::COUNT];
        for piece in Piece::all() {
            for sq in pieces[piece.kind().index()] & sides[piece.color().index()] {
                mailbox[sq.index()] = Some(piece);
            }
        }

        let mut board = Board {
            pieces,
            sides,
            occupied: sides[Color::White.index()] | sides[Color::Black.index()],
            mailbox,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            ply: 0,
            history: Box::new([HistoryEntry::default(); MAX_GAME_PLIES]),
        };
        board.hash = zobrist::hash_from_scratch(&board);
        board
    }

    // --- Read access ---

    /// The piece kind on `sq`, if any. O(1) via the mailbox.
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<PieceKind> {
        self.mailbox[sq.index()].map(Piece::kind)
    }

    /// The colored piece on `sq`, if any.
    #[inline]
    pub fn colored_piece_on(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    /// The color of the piece on `sq`, if any.
    #[inline]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.mailbox[sq.index()].map(Piece::color)
    }

    /// Bitboard of the given piece kind, both colors.
    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    /// Bitboard of all pieces of one side.
    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    /// Bitboard of every occupied square.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// The king square of `color`.
    ///
    /// # Panics
    ///
    /// Panics if that side has no king, which `validate` rules out.
    pub fn king_square(&self, color: Color) -> Square {
        (self.pieces[PieceKind::King.index()] & self.sides[color.index()])
            .lsb()
            .expect("each side has a king")
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Incrementally maintained Zobrist hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Plies played since this board was loaded.
    #[inline]
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// How many earlier plies held exactly this position.
    ///
    /// A return of 2 means the current position is its own third
    /// occurrence (threefold repetition).
    pub fn repetitions(&self) -> u32 {
        let mut count = 0;
        for entry in &self.history[..self.ply] {
            if entry.hash == self.hash {
                count += 1;
            }
        }
        count
    }

    // --- Mutation primitives (used by make/unmake and FEN loading) ---

    /// Place `piece` on the empty square `sq`, maintaining bitboards,
    /// mailbox, and hash.
    #[inline]
    pub(crate) fn add_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        let bb = sq.bitboard();
        self.pieces[piece.kind().index()] |= bb;
        self.sides[piece.color().index()] |= bb;
        self.occupied |= bb;
        self.mailbox[sq.index()] = Some(piece);
        self.hash ^= zobrist::PIECE_SQUARE[piece.index()][sq.index()];
    }

    /// Remove `piece` from `sq`, maintaining bitboards, mailbox, and hash.
    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert_eq!(self.mailbox[sq.index()], Some(piece));
        let bb = sq.bitboard();
        self.pieces[piece.kind().index()] ^= bb;
        self.sides[piece.color().index()] ^= bb;
        self.occupied ^= bb;
        self.mailbox[sq.index()] = None;
        self.hash ^= zobrist::PIECE_SQUARE[piece.index()][sq.index()];
    }

    #[inline]
    pub(crate) fn set_en_passant(&mut self, sq: Option<Square>) {
        if let Some(old) = self.en_passant {
            self.hash ^= zobrist::EN_PASSANT_FILE[old.file().index()];
        }
        if let Some(new) = sq {
            self.hash ^= zobrist::EN_PASSANT_FILE[new.file().index()];
        }
        self.en_passant = sq;
    }

    #[inline]
    pub(crate) fn set_castling(&mut self, rights: CastleRights) {
        self.hash ^= zobrist::CASTLING[self.castling.bits() as usize];
        self.hash ^= zobrist::CASTLING[rights.bits() as usize];
        self.castling = rights;
    }

    #[inline]
    pub(crate) fn flip_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.flip();
        self.hash ^= zobrist::SIDE_TO_MOVE;
    }

    #[inline]
    pub(crate) fn set_halfmove_clock(&mut self, clock: u16) {
        self.halfmove_clock = clock;
    }

    #[inline]
    pub(crate) fn set_fullmove_number(&mut self, number: u16) {
        self.fullmove_number = number;
    }

    /// Restore scalar state from a history entry (unmake path). The hash
    /// and en passant square are restored directly, without re-keying.
    #[inline]
    pub(crate) fn restore_state(&mut self, entry: &HistoryEntry) {
        self.castling = entry.castling;
        self.en_passant = entry.en_passant;
        self.halfmove_clock = entry.halfmove_clock;
        self.fullmove_number = entry.fullmove_number;
        self.hash = entry.hash;
    }

    #[inline]
    pub(crate) fn push_history(&mut self, entry: HistoryEntry) {
        assert!(self.ply < MAX_GAME_PLIES, "game exceeded {MAX_GAME_PLIES} plies");
        self.history[self.ply] = entry;
        self.ply += 1;
    }

    #[inline]
    pub(crate) fn pop_history(&mut self) -> HistoryEntry {
        debug_assert!(self.ply > 0, "unmake with no move made");
        self.ply -= 1;
        self.history[self.ply]
    }

    // --- Validation ---

    /// Structural integrity checks. Run after FEN parsing so the search
    /// never sees a half-formed position.
    pub fn validate(&self) -> Result<(), BoardError> {
        for color in Color::ALL {
            let kings = (self.pieces[PieceKind::King.index()] & self.sides[color.index()]).count();
            if kings != 1 {
                let name = match color {
                    Color::White => "white",
                    Color::Black => "black",
                };
                return Err(BoardError::InvalidKingCount { color: name, count: kings });
            }
        }

        let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
        if (self.pieces[PieceKind::Pawn.index()] & back_ranks).is_nonempty() {
            return Err(BoardError::PawnsOnBackRank);
        }

        for i in 0..PieceKind::COUNT {
            for j in (i + 1)..PieceKind::COUNT {
                if (self.pieces[i] & self.pieces[j]).is_nonempty() {
                    return Err(BoardError::OverlappingPieces);
                }
            }
        }

        if (self.sides[0] & self.sides[1]).is_nonempty() {
            return Err(BoardError::OverlappingSides);
        }

        if self.occupied != self.sides[0] | self.sides[1] {
            return Err(BoardError::InconsistentOccupied);
        }

        for sq in Square::all() {
            let from_bitboards = Piece::all().find(|p| {
                (self.pieces[p.kind().index()] & self.sides[p.color().index()]).contains(sq)
            });
            if from_bitboards != self.mailbox[sq.index()] {
                return Err(BoardError::InconsistentMailbox {
                    square: sq.to_string(),
                });
            }
        }

        Ok(())
    }

    /// An 8x8 grid printer for diagnostics.
    pub fn pretty(&self) -> PrettyBoard<'_> {
        PrettyBoard(self)
    }
}

/// Two boards are equal when every observable field matches, including the
/// live portion of the history arena (slots past `ply` are scratch space).
impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.pieces == other.pieces
            && self.sides == other.sides
            && self.occupied == other.occupied
            && self.mailbox == other.mailbox
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.hash == other.hash
            && self.ply == other.ply
            && self.history[..self.ply] == other.history[..other.ply]
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\"{self}\")")
    }
}

/// Wrapper printing the board as an 8x8 grid.
pub struct PrettyBoard<'a>(&'a Board);

impl fmt::Display for PrettyBoard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            write!(f, "{}  ", rank + 1)?;
            for file in 0u8..8 {
                let sq = Square::from_index(rank * 8 + file).unwrap();
                let c = self.0.colored_piece_on(sq).map_or('.', Piece::fen_char);
                if file < 7 {
                    write!(f, "{c} ")?;
                } else {
                    write!(f, "{c}")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
