//! FEN parsing and printing.

use std::fmt;
use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::PieceKind;
use crate::square::{File, Rank, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount { found: fields.len() });
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }

        let mut pieces = [Bitboard::EMPTY; PieceKind::COUNT];
        let mut sides = [Bitboard::EMPTY; Color::COUNT];

        for (row, rank_str) in ranks.iter().enumerate() {
            // FEN lists rank 8 first.
            let rank = Rank::from_index(7 - row as u8).unwrap();
            let mut file_idx: u8 = 0;

            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::InvalidPiece { character: c });
                    }
                    file_idx += skip as u8;
                } else {
                    let kind = PieceKind::from_fen_char(c)
                        .ok_or(FenError::InvalidPiece { character: c })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let file = File::from_index(file_idx).ok_or(FenError::BadRankLength {
                        rank: 8 - row,
                        squares: file_idx as usize + 1,
                    })?;
                    let bb = Square::new(rank, file).bitboard();
                    pieces[kind.index()] |= bb;
                    sides[color.index()] |= bb;
                    file_idx += 1;
                }
            }

            if file_idx != 8 {
                return Err(FenError::BadRankLength {
                    rank: 8 - row,
                    squares: file_idx as usize,
                });
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidColor {
                    found: other.to_string(),
                });
            }
        };

        let castling = CastleRights::from_fen(fields[2])?;

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(Square::from_algebraic(fields[3]).ok_or_else(|| {
                FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                }
            })?)
        };

        let halfmove_clock = fields[4].parse::<u16>().map_err(|_| FenError::InvalidCounter {
            field: "halfmove clock",
            found: fields[4].to_string(),
        })?;
        let fullmove_number = fields[5].parse::<u16>().map_err(|_| FenError::InvalidCounter {
            field: "fullmove number",
            found: fields[5].to_string(),
        })?;

        let board = Board::from_raw(
            pieces,
            sides,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        );
        board.validate()?;
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            let mut empty = 0;
            for file in 0u8..8 {
                let sq = Square::from_index(rank * 8 + file).unwrap();
                match self.colored_piece_on(sq) {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > 0 {
                write!(f, "/")?;
            }
        }

        write!(f, " {}", self.side_to_move())?;
        write!(f, " {}", self.castling())?;
        match self.en_passant() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}
