use crate::error::MoveError;
use crate::nnue::FeatureDelta;
use crate::types::{Color, Piece, Square};

use super::{Board, Move, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q};

/// Everything needed to take a move back.
#[derive(Clone, Debug)]
pub struct UnmakeInfo {
    pub(crate) mv: Move,
    pub(crate) moved: (Color, Piece),
    pub(crate) captured: Option<(Square, Color, Piece)>,
    pub(crate) castle_rook: Option<(Square, Square)>,
    pub(crate) previous_en_passant_target: Option<Square>,
    pub(crate) previous_castling_rights: u8,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_fullmove_number: u32,
}

/// Castling right lost when a piece leaves or lands on `sq`
fn castling_mask(sq: Square) -> u8 {
    match sq.index() {
        0 => CASTLE_WHITE_Q,
        4 => CASTLE_WHITE_K | CASTLE_WHITE_Q,
        7 => CASTLE_WHITE_K,
        56 => CASTLE_BLACK_Q,
        60 => CASTLE_BLACK_K | CASTLE_BLACK_Q,
        63 => CASTLE_BLACK_K,
        _ => 0,
    }
}

impl Board {
    /// Play a move and report which input features it changed.
    ///
    /// Moves are not checked for legality. Castling is recognized as a king
    /// moving two files from its home square with its own rook in place, en
    /// passant as a pawn stepping diagonally onto the en passant target.
    pub fn make_move(&mut self, mv: Move) -> Result<(FeatureDelta, UnmakeInfo), MoveError> {
        let (from, to) = (mv.from(), mv.to());
        let (color, piece) = self.squares[from.index()].ok_or(MoveError::EmptyOrigin { square: from })?;

        let is_en_passant = piece == Piece::Pawn
            && Some(to) == self.en_passant_target
            && from.file() != to.file()
            && self.squares[to.index()].is_none();
        let captured_on = if is_en_passant {
            to.offset(-color.pawn_push())
        } else {
            Some(to)
        };
        let captured = captured_on.and_then(|sq| self.squares[sq.index()].map(|(c, p)| (sq, c, p)));
        if let Some((sq, _, Piece::King)) = captured {
            return Err(MoveError::KingCapture { square: sq });
        }

        let mut info = UnmakeInfo {
            mv,
            moved: (color, piece),
            captured,
            castle_rook: None,
            previous_en_passant_target: self.en_passant_target,
            previous_castling_rights: self.castling_rights,
            previous_halfmove_clock: self.halfmove_clock,
            previous_fullmove_number: self.fullmove_number,
        };
        let mut delta = FeatureDelta::new();

        delta.remove(color, piece, from);
        if let Some((sq, c, p)) = captured {
            self.squares[sq.index()] = None;
            delta.remove(c, p, sq);
        }

        let placed = mv.promotion().unwrap_or(piece);
        self.squares[from.index()] = None;
        self.squares[to.index()] = Some((color, placed));
        delta.add(color, placed, to);

        let back_rank = color.back_rank();
        let is_castle = piece == Piece::King
            && captured.is_none()
            && from.rank() == back_rank
            && to.rank() == back_rank
            && from.file() == 4
            && from.file().abs_diff(to.file()) == 2;
        if is_castle {
            let (rook_file, rook_target_file) = if to.file() > from.file() { (7, 5) } else { (0, 3) };
            let rook_from = Square::new(back_rank, rook_file);
            let rook_to = Square::new(back_rank, rook_target_file);
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                if self.squares[rook_from.index()] == Some((color, Piece::Rook)) && self.squares[rook_to.index()].is_none() {
                    self.squares[rook_from.index()] = None;
                    self.squares[rook_to.index()] = Some((color, Piece::Rook));
                    delta
                        .remove(color, Piece::Rook, rook_from)
                        .add(color, Piece::Rook, rook_to);
                    info.castle_rook = Some((rook_from, rook_to));
                }
            }
        }

        self.en_passant_target = if piece == Piece::Pawn && from.index().abs_diff(to.index()) == 16 {
            from.offset(color.pawn_push())
        } else {
            None
        };
        self.castling_rights &= !(castling_mask(from) | castling_mask(to));
        if piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.white_to_move = !self.white_to_move;

        Ok((delta, info))
    }

    /// Take back a move played with [`Board::make_move`].
    pub fn unmake_move(&mut self, info: UnmakeInfo) {
        let (from, to) = (info.mv.from(), info.mv.to());

        self.squares[to.index()] = None;
        self.squares[from.index()] = Some(info.moved);
        if let Some((sq, color, piece)) = info.captured {
            self.squares[sq.index()] = Some((color, piece));
        }
        if let Some((rook_from, rook_to)) = info.castle_rook {
            self.squares[rook_from.index()] = self.squares[rook_to.index()].take();
        }

        self.en_passant_target = info.previous_en_passant_target;
        self.castling_rights = info.previous_castling_rights;
        self.halfmove_clock = info.previous_halfmove_clock;
        self.fullmove_number = info.previous_fullmove_number;
        self.white_to_move = !self.white_to_move;
    }
}
