//! In-place move execution and reversal.
//!
//! `do_move` snapshots the destroyed state into the board's history arena
//! and applies the move incrementally; `undo_move` walks the pieces back
//! and restores the snapshot. The pair is an exact round-trip for every
//! observable field, hash included.

use crate::board::{Board, HistoryEntry};
use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castling::CastleRights;
use crate::chess_move::{Move, MoveKind};
use crate::color::Color;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;

/// Castling rights lost when a move touches a square, indexed by square.
///
/// Covers both directions at once: a king or rook leaving home revokes its
/// own rights, and any piece landing on a rook's home square revokes the
/// opponent's (the rook must have been captured).
const RIGHTS_REVOKED: [CastleRights; 64] = {
    let mut table = [CastleRights::NONE; 64];
    table[Square::E1.index()] = CastleRights::WHITE_BOTH;
    table[Square::A1.index()] = CastleRights::WHITE_QUEEN;
    table[Square::H1.index()] = CastleRights::WHITE_KING;
    table[Square::E8.index()] = CastleRights::BLACK_BOTH;
    table[Square::A8.index()] = CastleRights::BLACK_QUEEN;
    table[Square::H8.index()] = CastleRights::BLACK_KING;
    table
};

/// The square of the pawn captured en passant: one rank behind the
/// capture destination, from the mover's point of view.
#[inline]
fn ep_victim_square(dst: Square, mover: Color) -> Square {
    let idx = match mover {
        Color::White => dst.index() - 8,
        Color::Black => dst.index() + 8,
    };
    Square::from_index(idx as u8).expect("en passant victim on the board")
}

/// Rook source and destination for a castle, keyed by the king's destination.
#[inline]
fn castle_rook_squares(king_dst: Square) -> (Square, Square) {
    match king_dst.index() {
        6 => (Square::H1, Square::F1),
        2 => (Square::A1, Square::D1),
        62 => (Square::H8, Square::F8),
        58 => (Square::A8, Square::D8),
        _ => unreachable!("castle destination is G1/C1/G8/C8"),
    }
}

impl Board {
    /// Apply a legal move in place.
    pub fn do_move(&mut self, mv: Move) {
        let us = self.side_to_move();
        let them = us.flip();
        let src = mv.source();
        let dst = mv.dest();
        let moving = self
            .colored_piece_on(src)
            .expect("move source square is occupied");

        let captured = match mv.kind() {
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            MoveKind::Castling => None,
            _ => self.piece_on(dst),
        };

        self.push_history(HistoryEntry {
            castling: self.castling(),
            en_passant: self.en_passant(),
            halfmove_clock: self.halfmove_clock(),
            fullmove_number: self.fullmove_number(),
            captured,
            hash: self.hash(),
        });

        self.set_en_passant(None);

        match mv.kind() {
            MoveKind::Normal => {
                if let Some(kind) = captured {
                    self.remove_piece(dst, Piece::new(kind, them));
                }
                self.remove_piece(src, moving);
                self.add_piece(dst, moving);

                // A double push exposes the skipped square to en passant.
                if moving.kind() == PieceKind::Pawn && src.index().abs_diff(dst.index()) == 16 {
                    let skipped = (src.index() + dst.index()) / 2;
                    self.set_en_passant(Square::from_index(skipped as u8));
                }
            }
            MoveKind::Promotion => {
                if let Some(kind) = captured {
                    self.remove_piece(dst, Piece::new(kind, them));
                }
                self.remove_piece(src, moving);
                self.add_piece(dst, Piece::new(mv.promotion_piece().piece_kind(), us));
            }
            MoveKind::EnPassant => {
                self.remove_piece(src, moving);
                self.add_piece(dst, moving);
                self.remove_piece(ep_victim_square(dst, us), Piece::new(PieceKind::Pawn, them));
            }
            MoveKind::Castling => {
                self.remove_piece(src, moving);
                self.add_piece(dst, moving);
                let (rook_src, rook_dst) = castle_rook_squares(dst);
                let rook = Piece::new(PieceKind::Rook, us);
                self.remove_piece(rook_src, rook);
                self.add_piece(rook_dst, rook);
            }
        }

        let rights = self
            .castling()
            .remove(RIGHTS_REVOKED[src.index()])
            .remove(RIGHTS_REVOKED[dst.index()]);
        self.set_castling(rights);

        if moving.kind() == PieceKind::Pawn || captured.is_some() {
            self.set_halfmove_clock(0);
        } else {
            self.set_halfmove_clock(self.halfmove_clock() + 1);
        }

        if us == Color::Black {
            self.set_fullmove_number(self.fullmove_number() + 1);
        }

        self.flip_side_to_move();
    }

    /// Reverse the most recent `do_move(mv)`.
    pub fn undo_move(&mut self, mv: Move) {
        let entry = self.pop_history();
        let us = self.side_to_move().flip();
        let them = self.side_to_move();
        let src = mv.source();
        let dst = mv.dest();

        match mv.kind() {
            MoveKind::Normal => {
                let moving = self
                    .colored_piece_on(dst)
                    .expect("unmake destination is occupied");
                self.remove_piece(dst, moving);
                self.add_piece(src, moving);
                if let Some(kind) = entry.captured {
                    self.add_piece(dst, Piece::new(kind, them));
                }
            }
            MoveKind::Promotion => {
                let promoted = self
                    .colored_piece_on(dst)
                    .expect("unmake destination is occupied");
                self.remove_piece(dst, promoted);
                self.add_piece(src, Piece::new(PieceKind::Pawn, us));
                if let Some(kind) = entry.captured {
                    self.add_piece(dst, Piece::new(kind, them));
                }
            }
            MoveKind::EnPassant => {
                let pawn = Piece::new(PieceKind::Pawn, us);
                self.remove_piece(dst, pawn);
                self.add_piece(src, pawn);
                self.add_piece(ep_victim_square(dst, us), Piece::new(PieceKind::Pawn, them));
            }
            MoveKind::Castling => {
                let king = Piece::new(PieceKind::King, us);
                self.remove_piece(dst, king);
                self.add_piece(src, king);
                let (rook_src, rook_dst) = castle_rook_squares(dst);
                let rook = Piece::new(PieceKind::Rook, us);
                self.remove_piece(rook_dst, rook);
                self.add_piece(rook_src, rook);
            }
        }

        self.flip_side_to_move();
        self.restore_state(&entry);
    }

    /// Pass the turn: flip the side to move without moving a piece.
    /// Used by null-move pruning.
    pub fn do_null_move(&mut self) {
        self.push_history(HistoryEntry {
            castling: self.castling(),
            en_passant: self.en_passant(),
            halfmove_clock: self.halfmove_clock(),
            fullmove_number: self.fullmove_number(),
            captured: None,
            hash: self.hash(),
        });
        self.set_en_passant(None);
        self.set_halfmove_clock(self.halfmove_clock() + 1);
        self.flip_side_to_move();
    }

    /// Reverse the most recent `do_null_move`.
    pub fn undo_null_move(&mut self) {
        let entry = self.pop_history();
        self.flip_side_to_move();
        self.restore_state(&entry);
    }

    /// Is `sq` attacked by any piece of `by`, with sliding rays cast over
    /// `occupied`? Reverse-attack lookup: patterns are cast *from* the
    /// target square and intersected with the attacker's pieces.
    pub fn is_square_attacked_with_occ(
        &self,
        sq: Square,
        by: Color,
        occupied: Bitboard,
    ) -> bool {
        let them = self.side(by);

        if (knight_attacks(sq) & them & self.pieces(PieceKind::Knight)).is_nonempty() {
            return true;
        }
        if (king_attacks(sq) & them & self.pieces(PieceKind::King)).is_nonempty() {
            return true;
        }
        // A pawn of `by` attacks sq iff a pawn of the other color on sq
        // would attack the pawn's square.
        if (pawn_attacks(by.flip(), sq) & them & self.pieces(PieceKind::Pawn)).is_nonempty() {
            return true;
        }
        let rook_like = (self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen)) & them;
        if (rook_attacks(sq, occupied) & rook_like).is_nonempty() {
            return true;
        }
        let bishop_like = (self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen)) & them;
        (bishop_attacks(sq, occupied) & bishop_like).is_nonempty()
    }

    /// Is `sq` attacked by any piece of `by` on the current occupancy?
    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_square_attacked_with_occ(sq, by, self.occupied())
    }

    /// Is the side to move in check?
    #[inline]
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move();
        self.is_square_attacked(self.king_square(us), us.flip())
    }
}
