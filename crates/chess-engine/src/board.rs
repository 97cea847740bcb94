//! In-place board representation with make/unmake move execution.
//!
//! Unlike a clone-per-move position, [`Board`] mutates in place and pairs
//! every `make_move` with an [`Undo`] record pushed onto a fixed-capacity
//! stack. `unmake_move` pops that record and restores the prior state
//! exactly, including the Zobrist hash.

use chess_core::{Color, Kind, Move, MoveFlag, PieceType, Square};

use crate::fen::{FenError, FenParser};
use crate::zobrist::ZOBRIST;
use crate::Bitboard;

/// Maximum game length (in plies) the undo stack supports.
pub const MAX_PLY: usize = 1024;

/// Castling-rights bit for white kingside.
pub const CASTLE_WK: u8 = 0b0001;
/// Castling-rights bit for white queenside.
pub const CASTLE_WQ: u8 = 0b0010;
/// Castling-rights bit for black kingside.
pub const CASTLE_BK: u8 = 0b0100;
/// Castling-rights bit for black queenside.
pub const CASTLE_BQ: u8 = 0b1000;

/// Exact-inverse record for one `make_move`, consumed by the paired `unmake_move`.
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    mov: Move,
    captured: PieceType,
    en_passant: Option<Square>,
    castling: u8,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

/// A mutable chess position: 12 piece bitboards, 3 occupancy bitboards, and
/// the side-to-move/castling/en-passant/clock/hash state needed to make and
/// unmake moves without reallocating.
#[derive(Clone)]
pub struct Board {
    pieces: [Bitboard; 12],
    occupancy: [Bitboard; 3],
    side_to_move: Color,
    castling: u8,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
    undo_stack: Vec<Undo>,
}

/// Index into `occupancy` for "both colors".
const BOTH: usize = 2;

impl Board {
    /// Creates an empty board (no pieces, white to move, no castling rights).
    pub fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 12],
            occupancy: [Bitboard::EMPTY; 3],
            side_to_move: Color::White,
            castling: 0,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            undo_stack: Vec::with_capacity(MAX_PLY),
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("STARTPOS is valid")
    }

    /// Clears the board back to the empty state, preserving undo-stack capacity.
    pub fn clear(&mut self) {
        self.pieces = [Bitboard::EMPTY; 12];
        self.occupancy = [Bitboard::EMPTY; 3];
        self.side_to_move = Color::White;
        self.castling = 0;
        self.en_passant = None;
        self.halfmove_clock = 0;
        self.fullmove_number = 1;
        self.undo_stack.clear();
        self.hash = self.recompute_hash();
    }

    /// Places a piece on a square, updating occupancy and hash. The square
    /// must be empty; overlapping placements corrupt the occupancy invariant.
    pub fn set_piece(&mut self, sq: Square, piece: PieceType) {
        debug_assert!(self.piece_at(sq).is_none());
        self.pieces[piece.index()].set(sq);
        let color = piece.color().expect("set_piece requires a real piece");
        self.occupancy[color.index()].set(sq);
        self.occupancy[BOTH].set(sq);
        self.hash ^= ZOBRIST.piece_key(piece.kind().unwrap(), color, sq);
    }

    /// Removes whatever piece (if any) occupies a square.
    fn remove_piece(&mut self, sq: Square) -> PieceType {
        let piece = self.piece_at(sq);
        if let Some(piece) = piece {
            let color = piece.color().unwrap();
            self.pieces[piece.index()].clear(sq);
            self.occupancy[color.index()].clear(sq);
            self.occupancy[BOTH].clear(sq);
            self.hash ^= ZOBRIST.piece_key(piece.kind().unwrap(), color, sq);
        }
        piece.unwrap_or(PieceType::None)
    }

    /// Returns the piece occupying a square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<PieceType> {
        for &piece in &PieceType::ALL {
            if self.pieces[piece.index()].contains(sq) {
                return Some(piece);
            }
        }
        None
    }

    /// Returns the bitboard for a single piece type.
    #[inline]
    pub fn pieces(&self, piece: PieceType) -> Bitboard {
        self.pieces[piece.index()]
    }

    /// Returns the bitboard of all pieces of a kind and color.
    #[inline]
    pub fn pieces_of(&self, kind: Kind, color: Color) -> Bitboard {
        self.pieces[PieceType::new(kind, color).index()]
    }

    /// Returns a bitboard of every square occupied by `color`.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// Returns a bitboard of every occupied square.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[BOTH]
    }

    /// Returns the king's square for the given color.
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces_of(Kind::King, color)
            .lsb()
            .and_then(Square::from_index)
            .expect("board invariant: exactly one king per side")
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Recomputes the Zobrist hash from scratch, for invariant checking
    /// against the incrementally maintained `hash` field.
    pub fn recompute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for &piece in &PieceType::ALL {
            let mut bb = self.pieces[piece.index()];
            while let Some(sq) = bb.pop_lsb() {
                hash ^= ZOBRIST.piece_key(piece.kind().unwrap(), piece.color().unwrap(), sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move;
        }
        for (i, bit) in [CASTLE_WK, CASTLE_WQ, CASTLE_BK, CASTLE_BQ].iter().enumerate() {
            if self.castling & bit != 0 {
                hash ^= ZOBRIST.castling_key(i);
            }
        }
        if let Some(sq) = self.en_passant {
            hash ^= ZOBRIST.en_passant_key(sq.file().index() as usize);
        }
        hash
    }

    /// Debug-only check of the invariants listed in the data model: single
    /// king per side, consistent aggregate occupancy, pairwise-disjoint
    /// piece bitboards, and a hash matching a from-scratch recomputation.
    pub fn debug_check_invariants(&self) {
        debug_assert_eq!(self.pieces_of(Kind::King, Color::White).count(), 1);
        debug_assert_eq!(self.pieces_of(Kind::King, Color::Black).count(), 1);
        debug_assert_eq!(
            self.occupancy[BOTH].0,
            self.occupancy[Color::White.index()].0 | self.occupancy[Color::Black.index()].0
        );
        for i in 0..12 {
            for j in (i + 1)..12 {
                debug_assert_eq!((self.pieces[i] & self.pieces[j]).0, 0);
            }
        }
        debug_assert_eq!(self.hash, self.recompute_hash());
    }

    /// Parses a board from a FEN string. Kept crate-internal: the public
    /// surface exposes `clear`/`set_piece` for manual setup, not a save/load
    /// API; FEN strings remain a convenient way to seed test positions.
    pub(crate) fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        let mut board = Board::empty();

        for (rank_idx, rank_str) in parsed.piece_placement.split('/').enumerate() {
            let row = rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as u8;
                } else if let Some(piece) = PieceType::from_fen_char(c) {
                    let sq = Square::from_index(row * 8 + file).expect("within board");
                    board.set_piece(sq, piece);
                    file += 1;
                }
            }
        }

        board.side_to_move = match parsed.active_color {
            'w' => Color::White,
            'b' => Color::Black,
            _ => unreachable!("FEN parser validated this"),
        };

        let mut castling = 0u8;
        for c in parsed.castling.chars() {
            castling |= match c {
                'K' => CASTLE_WK,
                'Q' => CASTLE_WQ,
                'k' => CASTLE_BK,
                'q' => CASTLE_BQ,
                _ => 0,
            };
        }
        board.castling = castling;

        board.en_passant = if parsed.en_passant == "-" {
            None
        } else {
            Square::from_algebraic(&parsed.en_passant)
        };

        board.halfmove_clock = parsed.halfmove_clock;
        board.fullmove_number = parsed.fullmove_number;
        board.hash = board.recompute_hash();

        Ok(board)
    }

    /// Serializes the board to a FEN string. Crate-internal test scaffolding
    /// (see `from_fen`).
    pub(crate) fn to_fen(&self) -> String {
        let mut fen = String::new();

        for row in 0..8u8 {
            let mut empty_count = 0u8;
            for file in 0..8u8 {
                let sq = Square::from_index(row * 8 + file).expect("within board");
                match self.piece_at(sq) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row < 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling == 0 {
            fen.push('-');
        } else {
            if self.castling & CASTLE_WK != 0 {
                fen.push('K');
            }
            if self.castling & CASTLE_WQ != 0 {
                fen.push('Q');
            }
            if self.castling & CASTLE_BK != 0 {
                fen.push('k');
            }
            if self.castling & CASTLE_BQ != 0 {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    /// Applies a move in place and pushes its undo record onto the internal
    /// stack. The move is assumed legal in the current position; calling
    /// this with an illegal move leaves the board in an undefined state.
    pub fn make_move(&mut self, mov: Move) {
        let from = mov.from();
        let to = mov.to();
        let flag = mov.flag();
        let color = self.side_to_move;

        let prior_en_passant = self.en_passant;
        let prior_castling = self.castling;
        let prior_halfmove = self.halfmove_clock;
        let prior_fullmove = self.fullmove_number;
        let prior_hash = self.hash;

        let moving = self
            .piece_at(from)
            .expect("make_move requires a piece at the source square");
        let moving_kind = moving.kind().unwrap();

        let mut captured = PieceType::None;

        if flag.is_castling() {
            self.remove_piece(from);
            self.set_piece(to, moving);
            let (rook_from, rook_to) = castling_rook_squares(color, flag);
            let rook = self.remove_piece(rook_from);
            self.set_piece(rook_to, rook);
        } else if flag == MoveFlag::EnPassant {
            self.remove_piece(from);
            let captured_sq = en_passant_captured_square(color, to);
            captured = self.remove_piece(captured_sq);
            self.set_piece(to, moving);
        } else {
            if flag.is_capture() {
                captured = self.remove_piece(to);
            }
            self.remove_piece(from);
            match flag.promotion_piece() {
                Some(promo_kind) => self.set_piece(to, PieceType::new(promo_kind, color)),
                None => self.set_piece(to, moving),
            }
        }

        // Castling rights: king moves clear both rights for that side; rook
        // moves or captures from a home square clear that side+wing only.
        // The hash delta is applied by XORing out the old rights' keys and
        // XORing in the new rights' keys, rather than recomputing from
        // scratch, per the incremental-update contract.
        self.hash ^= castling_hash_contribution(self.castling);
        if moving_kind == Kind::King {
            self.castling &= !home_rights_mask(color);
        }
        self.castling &= !rook_square_right(from);
        self.castling &= !rook_square_right(to);
        self.hash ^= castling_hash_contribution(self.castling);

        self.hash ^= en_passant_hash_contribution(self.en_passant);
        self.en_passant = if flag == MoveFlag::DoublePush {
            Some(double_push_target(color, to))
        } else {
            None
        };
        self.hash ^= en_passant_hash_contribution(self.en_passant);

        let is_pawn_move = moving_kind == Kind::Pawn;
        if is_pawn_move || flag.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if color == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = color.opposite();
        self.hash ^= ZOBRIST.black_to_move;

        self.undo_stack.push(Undo {
            mov,
            captured,
            en_passant: prior_en_passant,
            castling: prior_castling,
            halfmove_clock: prior_halfmove,
            fullmove_number: prior_fullmove,
            hash: prior_hash,
        });
    }

    /// Reverses the most recent `make_move`, restoring the exact prior
    /// state. Panics if there is no move to undo.
    pub fn unmake_move(&mut self) {
        let undo = self.undo_stack.pop().expect("unmake_move with empty history");
        let mov = undo.mov;
        let from = mov.from();
        let to = mov.to();
        let flag = mov.flag();

        self.side_to_move = self.side_to_move.opposite();
        let color = self.side_to_move;

        if flag.is_castling() {
            let king = self.remove_piece(to);
            self.set_piece(from, king);
            let (rook_from, rook_to) = castling_rook_squares(color, flag);
            let rook = self.remove_piece(rook_to);
            self.set_piece(rook_from, rook);
        } else if flag == MoveFlag::EnPassant {
            let pawn = self.remove_piece(to);
            self.set_piece(from, pawn);
            let captured_sq = en_passant_captured_square(color, to);
            self.set_piece(captured_sq, undo.captured);
        } else {
            let moved = self.remove_piece(to);
            let restored = match flag.promotion_piece() {
                Some(_) => PieceType::new(Kind::Pawn, color),
                None => moved,
            };
            self.set_piece(from, restored);
            if flag.is_capture() {
                self.set_piece(to, undo.captured);
            }
        }

        self.en_passant = undo.en_passant;
        self.castling = undo.castling;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.hash = undo.hash;
    }

    /// Number of moves made but not yet unmade.
    pub fn ply(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the last `n` Zobrist hashes on the undo stack plus the
    /// current hash, most recent first — used for repetition detection.
    pub fn hash_history(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(self.hash).chain(self.undo_stack.iter().rev().map(|u| u.hash))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Destination of a double pawn push's en-passant target: the square the
/// pawn transited, one step behind its landing square.
fn double_push_target(color: Color, to: Square) -> Square {
    let idx = to.index();
    let transited = match color {
        Color::White => idx + 8,
        Color::Black => idx - 8,
    };
    Square::from_index(transited).expect("double push target is on-board")
}

/// Square of the pawn captured by an en-passant move, given the destination
/// square of the capturing pawn. Under this crate's a8=0/h1=63 indexing,
/// "north" (toward rank 8) decreases the index, so a white en-passant
/// capture's victim sits *below* the destination in index terms (`to+8`)
/// and a black capture's victim sits *above* it (`to-8`) — the reverse of
/// the relationship under an a1=0 indexing.
fn en_passant_captured_square(color: Color, to: Square) -> Square {
    let idx = to.index();
    let captured = match color {
        Color::White => idx + 8,
        Color::Black => idx - 8,
    };
    Square::from_index(captured).expect("en passant victim is on-board")
}

/// Source/destination squares for a castling rook, by side and flag.
fn castling_rook_squares(color: Color, flag: MoveFlag) -> (Square, Square) {
    match (color, flag) {
        (Color::White, MoveFlag::CastleKingside) => (Square::H1, Square::F1),
        (Color::White, MoveFlag::CastleQueenside) => (Square::A1, Square::D1),
        (Color::Black, MoveFlag::CastleKingside) => (Square::H8, Square::F8),
        (Color::Black, MoveFlag::CastleQueenside) => (Square::A8, Square::D8),
        _ => unreachable!("castling_rook_squares called on a non-castling flag"),
    }
}

/// Both castling-rights bits belonging to one side.
fn home_rights_mask(color: Color) -> u8 {
    match color {
        Color::White => CASTLE_WK | CASTLE_WQ,
        Color::Black => CASTLE_BK | CASTLE_BQ,
    }
}

/// The castling right (if any) forfeited when a piece leaves or arrives on
/// a rook's home square — used for both the moving rook and a captured one.
fn rook_square_right(sq: Square) -> u8 {
    match sq {
        Square::A1 => CASTLE_WQ,
        Square::H1 => CASTLE_WK,
        Square::A8 => CASTLE_BQ,
        Square::H8 => CASTLE_BK,
        _ => 0,
    }
}

/// XOR-combination of the Zobrist keys for whichever castling rights are set.
fn castling_hash_contribution(castling: u8) -> u64 {
    let mut hash = 0u64;
    for (i, bit) in [CASTLE_WK, CASTLE_WQ, CASTLE_BK, CASTLE_BQ].iter().enumerate() {
        if castling & bit != 0 {
            hash ^= ZOBRIST.castling_key(i);
        }
    }
    hash
}

/// Zobrist key for the current en-passant file, or 0 if none is set.
fn en_passant_hash_contribution(en_passant: Option<Square>) -> u64 {
    match en_passant {
        Some(sq) => ZOBRIST.en_passant_key(sq.file().index() as usize),
        None => 0,
    }
}
