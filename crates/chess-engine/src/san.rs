//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1"

use crate::movegen::generate_legal_moves;
use crate::Board;
use chess_core::{File, Kind, Move, MoveFlag, Rank, Square};
use std::fmt;

/// Error type for SAN parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    /// The SAN string is empty.
    Empty,
    /// The SAN string has invalid format.
    InvalidFormat(String),
    /// No legal move matches the SAN.
    NoMatchingMove(String),
    /// Multiple legal moves match the SAN (ambiguous).
    AmbiguousMove(String),
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty SAN string"),
            SanError::InvalidFormat(s) => write!(f, "invalid SAN format: {}", s),
            SanError::NoMatchingMove(s) => write!(f, "no legal move matches: {}", s),
            SanError::AmbiguousMove(s) => write!(f, "ambiguous move: {}", s),
        }
    }
}

impl std::error::Error for SanError {}

/// Converts a move to SAN notation given the current position.
///
/// The board must be in the state BEFORE the move is made, and the move
/// must be legal in that position.
pub fn move_to_san(board: &mut Board, m: Move) -> String {
    let mut san = String::new();

    if m.flag() == MoveFlag::CastleKingside {
        san.push_str("O-O");
        return add_check_suffix(board, m, san);
    }
    if m.flag() == MoveFlag::CastleQueenside {
        san.push_str("O-O-O");
        return add_check_suffix(board, m, san);
    }

    let from = m.from();
    let to = m.to();
    let kind = board
        .piece_at(from)
        .expect("move has no piece at from square")
        .kind()
        .unwrap();

    if kind != Kind::Pawn {
        san.push(kind_to_san_char(kind));
        san.push_str(&get_disambiguation(board, m, kind));
    }

    let is_capture = board.piece_at(to).is_some() || m.flag() == MoveFlag::EnPassant;
    if is_capture {
        if kind == Kind::Pawn {
            san.push(file_to_char(from.file()));
        }
        san.push('x');
    }

    san.push(file_to_char(to.file()));
    san.push(rank_to_char(to.rank()));

    if m.flag().is_promotion() {
        san.push('=');
        san.push(kind_to_san_char(
            m.flag().promotion_piece().expect("promotion flag without piece"),
        ));
    }

    add_check_suffix(board, m, san)
}

/// Parses a SAN string and returns the corresponding legal move.
pub fn san_to_move(board: &mut Board, san: &str) -> Result<Move, SanError> {
    let san = san.trim();
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    let san = san.trim_end_matches('#').trim_end_matches('+');

    if san == "O-O" || san == "0-0" {
        return find_castling_move(board, true);
    }
    if san == "O-O-O" || san == "0-0-0" {
        return find_castling_move(board, false);
    }

    let parsed = parse_san_components(san)?;
    find_matching_move(board, &parsed)
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    kind: Kind,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to_square: Square,
    promotion: Option<Kind>,
    #[allow(dead_code)]
    is_capture: bool,
}

fn parse_san_components(san: &str) -> Result<ParsedSan, SanError> {
    let chars: Vec<char> = san.chars().collect();
    if chars.is_empty() {
        return Err(SanError::Empty);
    }

    let mut idx = 0;

    let kind = if chars[0].is_uppercase() && chars[0] != 'O' {
        let p = san_char_to_kind(chars[0]).ok_or_else(|| {
            SanError::InvalidFormat(format!("invalid piece character: {}", chars[0]))
        })?;
        idx += 1;
        p
    } else {
        Kind::Pawn
    };

    let remaining: String = chars[idx..].iter().collect();

    let (remaining, is_capture) = if remaining.contains('x') {
        (remaining.replace('x', ""), true)
    } else {
        (remaining, false)
    };

    let (remaining, promotion) = if remaining.contains('=') {
        let parts: Vec<&str> = remaining.split('=').collect();
        if parts.len() != 2 || parts[1].len() != 1 {
            return Err(SanError::InvalidFormat(format!("invalid promotion: {}", san)));
        }
        let promo_kind = san_char_to_kind(parts[1].chars().next().unwrap()).ok_or_else(|| {
            SanError::InvalidFormat(format!("invalid promotion piece: {}", parts[1]))
        })?;
        (parts[0].to_string(), Some(promo_kind))
    } else {
        (remaining, None)
    };

    let chars: Vec<char> = remaining.chars().collect();

    if chars.len() < 2 {
        return Err(SanError::InvalidFormat(format!("too short: {}", san)));
    }

    let to_file = char_to_file(chars[chars.len() - 2])
        .ok_or_else(|| SanError::InvalidFormat(format!("invalid file: {}", san)))?;
    let to_rank = char_to_rank(chars[chars.len() - 1])
        .ok_or_else(|| SanError::InvalidFormat(format!("invalid rank: {}", san)))?;
    let to_square = Square::new(to_file, to_rank);

    let disambig: String = chars[..chars.len() - 2].iter().collect();
    let (from_file, from_rank) = parse_disambiguation(&disambig)?;

    Ok(ParsedSan {
        kind,
        from_file,
        from_rank,
        to_square,
        promotion,
        is_capture,
    })
}

fn parse_disambiguation(s: &str) -> Result<(Option<File>, Option<Rank>), SanError> {
    let chars: Vec<char> = s.chars().collect();

    match chars.len() {
        0 => Ok((None, None)),
        1 => {
            if let Some(f) = char_to_file(chars[0]) {
                Ok((Some(f), None))
            } else if let Some(r) = char_to_rank(chars[0]) {
                Ok((None, Some(r)))
            } else {
                Err(SanError::InvalidFormat(format!("invalid disambiguation: {}", s)))
            }
        }
        2 => {
            let file = char_to_file(chars[0]).ok_or_else(|| {
                SanError::InvalidFormat(format!("invalid disambiguation file: {}", s))
            })?;
            let rank = char_to_rank(chars[1]).ok_or_else(|| {
                SanError::InvalidFormat(format!("invalid disambiguation rank: {}", s))
            })?;
            Ok((Some(file), Some(rank)))
        }
        _ => Err(SanError::InvalidFormat(format!("disambiguation too long: {}", s))),
    }
}

fn find_castling_move(board: &mut Board, kingside: bool) -> Result<Move, SanError> {
    let moves = generate_legal_moves(board);
    let flag = if kingside {
        MoveFlag::CastleKingside
    } else {
        MoveFlag::CastleQueenside
    };

    for m in moves.as_slice() {
        if m.flag() == flag {
            return Ok(*m);
        }
    }

    let name = if kingside { "O-O" } else { "O-O-O" };
    Err(SanError::NoMatchingMove(name.to_string()))
}

fn find_matching_move(board: &mut Board, parsed: &ParsedSan) -> Result<Move, SanError> {
    let moves = generate_legal_moves(board);
    let mut matching: Vec<Move> = Vec::new();

    for m in moves.as_slice() {
        if m.to() != parsed.to_square {
            continue;
        }

        match board.piece_at(m.from()).and_then(|p| p.kind()) {
            Some(kind) if kind == parsed.kind => {}
            _ => continue,
        }

        if let Some(file) = parsed.from_file {
            if m.from().file() != file {
                continue;
            }
        }
        if let Some(rank) = parsed.from_rank {
            if m.from().rank() != rank {
                continue;
            }
        }

        if let Some(promo) = parsed.promotion {
            if !m.flag().is_promotion() || m.flag().promotion_piece() != Some(promo) {
                continue;
            }
        } else if m.flag().is_promotion() {
            continue;
        }

        matching.push(*m);
    }

    match matching.len() {
        0 => Err(SanError::NoMatchingMove(format!("{:?}", parsed))),
        1 => Ok(matching[0]),
        _ => Err(SanError::AmbiguousMove(format!("multiple moves match: {:?}", parsed))),
    }
}

fn get_disambiguation(board: &mut Board, m: Move, kind: Kind) -> String {
    let moves = generate_legal_moves(board);
    let to = m.to();
    let from = m.from();

    let mut same_dest: Vec<Move> = Vec::new();
    for other in moves.as_slice() {
        if other.to() != to {
            continue;
        }
        if board.piece_at(other.from()).and_then(|p| p.kind()) == Some(kind) {
            same_dest.push(*other);
        }
    }

    if same_dest.len() <= 1 {
        return String::new();
    }

    let same_file = same_dest.iter().filter(|o| o.from().file() == from.file()).count();
    if same_file == 1 {
        return file_to_char(from.file()).to_string();
    }

    let same_rank = same_dest.iter().filter(|o| o.from().rank() == from.rank()).count();
    if same_rank == 1 {
        return rank_to_char(from.rank()).to_string();
    }

    format!("{}{}", file_to_char(from.file()), rank_to_char(from.rank()))
}

fn add_check_suffix(board: &mut Board, m: Move, mut san: String) -> String {
    board.make_move(m);
    let in_check = crate::movegen::is_king_attacked(board, board.side_to_move());
    if in_check {
        let moves = generate_legal_moves(board);
        san.push(if moves.is_empty() { '#' } else { '+' });
    }
    board.unmake_move();
    san
}

fn kind_to_san_char(kind: Kind) -> char {
    match kind {
        Kind::Pawn => 'P',
        Kind::Knight => 'N',
        Kind::Bishop => 'B',
        Kind::Rook => 'R',
        Kind::Queen => 'Q',
        Kind::King => 'K',
    }
}

fn san_char_to_kind(c: char) -> Option<Kind> {
    match c {
        'N' => Some(Kind::Knight),
        'B' => Some(Kind::Bishop),
        'R' => Some(Kind::Rook),
        'Q' => Some(Kind::Queen),
        'K' => Some(Kind::King),
        'P' => Some(Kind::Pawn),
        _ => None,
    }
}

fn file_to_char(file: File) -> char {
    (b'a' + file.index() as u8) as char
}

fn rank_to_char(rank: Rank) -> char {
    (b'1' + rank.index() as u8) as char
}

fn char_to_file(c: char) -> Option<File> {
    match c {
        'a' => Some(File::A),
        'b' => Some(File::B),
        'c' => Some(File::C),
        'd' => Some(File::D),
        'e' => Some(File::E),
        'f' => Some(File::F),
        'g' => Some(File::G),
        'h' => Some(File::H),
        _ => None,
    }
}

fn char_to_rank(c: char) -> Option<Rank> {
    match c {
        '1' => Some(Rank::R1),
        '2' => Some(Rank::R2),
        '3' => Some(Rank::R3),
        '4' => Some(Rank::R4),
        '5' => Some(Rank::R5),
        '6' => Some(Rank::R6),
        '7' => Some(Rank::R7),
        '8' => Some(Rank::R8),
        _ => None,
    }
}
