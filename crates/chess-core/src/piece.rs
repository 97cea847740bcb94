//! Chess piece representation.

use crate::Color;

/// The six kinds of chess piece, independent of color.
///
/// Used wherever color doesn't matter: piece-square table lookups, material
/// values, FEN character casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Kind {
    /// All kinds in order.
    pub const ALL: [Kind; 6] = [
        Kind::Pawn,
        Kind::Knight,
        Kind::Bishop,
        Kind::Rook,
        Kind::Queen,
        Kind::King,
    ];

    /// Returns the index of this kind (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true if this kind slides (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Kind::Bishop | Kind::Rook | Kind::Queen)
    }

    const fn from_fen_char_lower(c: char) -> Option<Self> {
        match c {
            'p' => Some(Kind::Pawn),
            'n' => Some(Kind::Knight),
            'b' => Some(Kind::Bishop),
            'r' => Some(Kind::Rook),
            'q' => Some(Kind::Queen),
            'k' => Some(Kind::King),
            _ => None,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Pawn => "Pawn",
            Kind::Knight => "Knight",
            Kind::Bishop => "Bishop",
            Kind::Rook => "Rook",
            Kind::Queen => "Queen",
            Kind::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// The 12 fully-colored piece types that can occupy a board square, plus a
/// `None` sentinel for "no piece here".
///
/// Ordering matches the board's `pieces` bitboard array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    WKing = 0,
    WQueen = 1,
    WPawn = 2,
    WKnight = 3,
    WBishop = 4,
    WRook = 5,
    BKing = 6,
    BQueen = 7,
    BPawn = 8,
    BKnight = 9,
    BBishop = 10,
    BRook = 11,
    None = 12,
}

impl PieceType {
    /// The 12 real (non-`None`) piece types in bitboard-array order.
    pub const ALL: [PieceType; 12] = [
        PieceType::WKing,
        PieceType::WQueen,
        PieceType::WPawn,
        PieceType::WKnight,
        PieceType::WBishop,
        PieceType::WRook,
        PieceType::BKing,
        PieceType::BQueen,
        PieceType::BPawn,
        PieceType::BKnight,
        PieceType::BBishop,
        PieceType::BRook,
    ];

    /// Builds a `PieceType` from a color-agnostic kind and a color.
    #[inline]
    pub const fn new(kind: Kind, color: Color) -> Self {
        match (color, kind) {
            (Color::White, Kind::King) => PieceType::WKing,
            (Color::White, Kind::Queen) => PieceType::WQueen,
            (Color::White, Kind::Pawn) => PieceType::WPawn,
            (Color::White, Kind::Knight) => PieceType::WKnight,
            (Color::White, Kind::Bishop) => PieceType::WBishop,
            (Color::White, Kind::Rook) => PieceType::WRook,
            (Color::Black, Kind::King) => PieceType::BKing,
            (Color::Black, Kind::Queen) => PieceType::BQueen,
            (Color::Black, Kind::Pawn) => PieceType::BPawn,
            (Color::Black, Kind::Knight) => PieceType::BKnight,
            (Color::Black, Kind::Bishop) => PieceType::BBishop,
            (Color::Black, Kind::Rook) => PieceType::BRook,
        }
    }

    /// Returns the bitboard-array index (0-11). Panics on `None`.
    #[inline]
    pub const fn index(self) -> usize {
        debug_assert!(!matches!(self, PieceType::None));
        self as usize
    }

    /// Returns the color-agnostic kind, or `None` if this is the `None` sentinel.
    #[inline]
    pub const fn kind(self) -> Option<Kind> {
        match self {
            PieceType::WKing | PieceType::BKing => Some(Kind::King),
            PieceType::WQueen | PieceType::BQueen => Some(Kind::Queen),
            PieceType::WPawn | PieceType::BPawn => Some(Kind::Pawn),
            PieceType::WKnight | PieceType::BKnight => Some(Kind::Knight),
            PieceType::WBishop | PieceType::BBishop => Some(Kind::Bishop),
            PieceType::WRook | PieceType::BRook => Some(Kind::Rook),
            PieceType::None => None,
        }
    }

    /// Returns the color, or `None` if this is the `None` sentinel.
    #[inline]
    pub const fn color(self) -> Option<Color> {
        match self {
            PieceType::WKing
            | PieceType::WQueen
            | PieceType::WPawn
            | PieceType::WKnight
            | PieceType::WBishop
            | PieceType::WRook => Some(Color::White),
            PieceType::BKing
            | PieceType::BQueen
            | PieceType::BPawn
            | PieceType::BKnight
            | PieceType::BBishop
            | PieceType::BRook => Some(Color::Black),
            PieceType::None => None,
        }
    }

    /// Returns true if this piece is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self.kind(), Some(k) if k.is_slider())
    }

    /// Returns the FEN character for this piece type.
    pub const fn to_fen_char(self) -> char {
        let Some(kind) = self.kind() else {
            return '.';
        };
        let c = match kind {
            Kind::Pawn => 'p',
            Kind::Knight => 'n',
            Kind::Bishop => 'b',
            Kind::Rook => 'r',
            Kind::Queen => 'q',
            Kind::King => 'k',
        };
        match self.color() {
            Some(Color::White) => c.to_ascii_uppercase(),
            _ => c,
        }
    }

    /// Parses a FEN character into a piece type.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Kind::from_fen_char_lower(c.to_ascii_lowercase()) {
            Some(kind) => Some(PieceType::new(kind, color)),
            None => None,
        }
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.color(), self.kind()) {
            (Some(color), Some(kind)) => write!(f, "{} {}", color, kind),
            _ => write!(f, "None"),
        }
    }
}
