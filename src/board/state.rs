use crate::types::{Color, Piece, Square};

use super::BoardView;

pub(crate) const CASTLE_WHITE_K: u8 = 1;
pub(crate) const CASTLE_WHITE_Q: u8 = 2;
pub(crate) const CASTLE_BLACK_K: u8 = 4;
pub(crate) const CASTLE_BLACK_Q: u8 = 8;

/// Mailbox board: one optional piece per square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub(crate) squares: [Option<(Color, Piece)>; 64],
    pub(crate) white_to_move: bool,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) castling_rights: u8, // bitmask
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Board {
    /// The standard starting position
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in (0u8..).zip(back_rank) {
            board.put(file, Color::White, piece);
            board.put(56 + file, Color::Black, piece);
            board.put(8 + file, Color::White, Piece::Pawn);
            board.put(48 + file, Color::Black, Piece::Pawn);
        }

        board.castling_rights = CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;
        board
    }

    /// A board with no pieces, white to move
    #[must_use]
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
            white_to_move: true,
            en_passant_target: None,
            castling_rights: 0,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    fn put(&mut self, idx: u8, color: Color, piece: Piece) {
        self.squares[usize::from(idx)] = Some((color, piece));
    }

    pub fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        self.squares[sq.index()] = Some((color, piece));
    }

    /// Clear a square, returning what stood on it
    pub fn remove_piece(&mut self, sq: Square) -> Option<(Color, Piece)> {
        self.squares[sq.index()].take()
    }

    pub fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }

    pub fn set_white_to_move(&mut self, white_to_move: bool) {
        self.white_to_move = white_to_move;
    }

    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl BoardView for Board {
    #[inline]
    fn piece_on(&self, sq: Square) -> Option<(Color, Piece)> {
        self.squares[sq.index()]
    }

    #[inline]
    fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    #[inline]
    fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }
}
