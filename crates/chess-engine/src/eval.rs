//! Static position evaluation.
//!
//! Returns a signed centipawn score from the perspective of the side to
//! move: positive favours the mover, negative favours the opponent.

use crate::movegen::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::{Bitboard, Board};
use chess_core::{Color, File, Kind, Rank, Square};

/// Material value in centipawns. King is excluded (infinite value, never traded).
pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

/// Returns the material value of a piece kind, or 0 for the king.
pub fn piece_value(kind: Kind) -> i32 {
    match kind {
        Kind::Pawn => PAWN_VALUE,
        Kind::Knight => KNIGHT_VALUE,
        Kind::Bishop => BISHOP_VALUE,
        Kind::Rook => ROOK_VALUE,
        Kind::Queen => QUEEN_VALUE,
        Kind::King => 0,
    }
}

/// Coarse phase of the game, used to select piece-square tables and weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Determines the game phase from total non-king material on the board.
pub fn game_phase(board: &Board) -> GamePhase {
    let mut total = 0i32;
    for color in [Color::White, Color::Black] {
        for kind in [Kind::Pawn, Kind::Knight, Kind::Bishop, Kind::Rook, Kind::Queen] {
            total += piece_value(kind) * board.pieces_of(kind, color).count() as i32;
        }
    }
    if total >= 7800 {
        GamePhase::Opening
    } else if total <= 2500 {
        GamePhase::Endgame
    } else {
        GamePhase::Middlegame
    }
}

/// Weights applied to each evaluation component, scaled by game phase.
///
/// Defaults match the teacher's own tuning; callers may override for
/// experimentation without touching the scoring logic itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationWeights {
    pub material: f32,
    pub positional: f32,
    pub king_safety: f32,
    pub mobility: f32,
    pub tactical: f32,
    pub structural: f32,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        EvaluationWeights {
            material: 1.0,
            positional: 0.3,
            king_safety: 0.8,
            mobility: 0.2,
            tactical: 0.6,
            structural: 0.4,
        }
    }
}

impl EvaluationWeights {
    /// Returns the weights used for a given game phase.
    ///
    /// King safety matters less, and king activity more, once material thins out.
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Endgame => EvaluationWeights {
                king_safety: 0.3,
                mobility: 0.3,
                ..EvaluationWeights::default()
            },
            _ => EvaluationWeights::default(),
        }
    }
}

/// Component breakdown of a position evaluation, for diagnostics.
///
/// All components are from White's perspective; [`EvaluationBreakdown::total`]
/// flips sign for Black to move, matching [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationBreakdown {
    pub material: i32,
    pub positional: i32,
    pub king_safety: i32,
    pub mobility: i32,
    pub tactical: i32,
    pub structural: i32,
}

impl EvaluationBreakdown {
    /// Sum of all weighted components, from White's perspective.
    pub fn white_total(&self) -> i32 {
        self.material + self.positional + self.king_safety + self.mobility + self.tactical + self.structural
    }

    /// Total from the perspective of `side_to_move`.
    pub fn total(&self, side_to_move: Color) -> i32 {
        match side_to_move {
            Color::White => self.white_total(),
            Color::Black => -self.white_total(),
        }
    }
}

/// Evaluates `board` from the perspective of the side to move.
pub fn evaluate(board: &Board) -> i32 {
    evaluate_detailed(board, &EvaluationWeights::for_phase(game_phase(board))).total(board.side_to_move())
}

/// Evaluates `board`, returning the weighted component breakdown.
pub fn evaluate_detailed(board: &Board, weights: &EvaluationWeights) -> EvaluationBreakdown {
    let phase = game_phase(board);
    let material = material_score(board);
    let positional = positional_score(board, phase);
    let king_safety = king_safety_score(board, phase);
    let mobility = mobility_score(board);
    let structural = pawn_structure_score(board);
    let tactical = tactical_score(board);

    EvaluationBreakdown {
        material: scale(material, weights.material),
        positional: scale(positional, weights.positional),
        king_safety: scale(king_safety, weights.king_safety),
        mobility: scale(mobility, weights.mobility),
        tactical: scale(tactical, weights.tactical),
        structural: scale(structural, weights.structural),
    }
}

fn scale(value: i32, weight: f32) -> i32 {
    (value as f32 * weight).round() as i32
}

fn material_score(board: &Board) -> i32 {
    let mut score = 0;
    for kind in [Kind::Pawn, Kind::Knight, Kind::Bishop, Kind::Rook, Kind::Queen] {
        let value = piece_value(kind);
        score += value * board.pieces_of(kind, Color::White).count() as i32;
        score -= value * board.pieces_of(kind, Color::Black).count() as i32;
    }
    score
}

/// Mirrors a square's PST index for Black: the PST is authored from White's
/// point of view, so Black looks up the rank-flipped square.
fn pst_index(sq: Square, color: Color) -> usize {
    match color {
        Color::White => sq.index() as usize,
        Color::Black => 63 - sq.index() as usize,
    }
}

fn positional_score(board: &Board, phase: GamePhase) -> i32 {
    let mut score = 0;
    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        for sq in board.pieces_of(Kind::Pawn, color) {
            score += sign * pst(&PAWN_PST, &PAWN_PST_ENDGAME, phase, pst_index(sq, color));
        }
        for sq in board.pieces_of(Kind::Knight, color) {
            score += sign * pst(&KNIGHT_PST, &KNIGHT_PST_ENDGAME, phase, pst_index(sq, color));
        }
        for sq in board.pieces_of(Kind::Bishop, color) {
            score += sign * BISHOP_PST[pst_index(sq, color)];
        }
        for sq in board.pieces_of(Kind::Rook, color) {
            score += sign * ROOK_PST[pst_index(sq, color)];
        }
        for sq in board.pieces_of(Kind::Queen, color) {
            score += sign * QUEEN_PST[pst_index(sq, color)];
        }
        for sq in board.pieces_of(Kind::King, color) {
            score += sign * pst(&KING_MIDDLEGAME_PST, &KING_ENDGAME_PST, phase, pst_index(sq, color));
        }
    }
    score
}

fn pst(middlegame: &[i32; 64], endgame: &[i32; 64], phase: GamePhase, index: usize) -> i32 {
    match phase {
        GamePhase::Endgame => endgame[index],
        _ => middlegame[index],
    }
}

/// Mobility: difference in pseudo-legal attack-square counts, scaled down.
///
/// Counted directly from attack tables rather than full move generation so
/// it stays cheap enough to run at every node, and so it can be computed for
/// the side not to move without a turn flip.
fn mobility_score(board: &Board) -> i32 {
    (mobility_for(board, Color::White) - mobility_for(board, Color::Black)) / 10
}

fn mobility_for(board: &Board, color: Color) -> i32 {
    let own = board.occupied_by(color);
    let occ = board.occupied();
    let mut count = 0i32;

    for sq in board.pieces_of(Kind::Knight, color) {
        count += (knight_attacks(sq) & !own).count() as i32;
    }
    for sq in board.pieces_of(Kind::Bishop, color) {
        count += (bishop_attacks(sq, occ) & !own).count() as i32;
    }
    for sq in board.pieces_of(Kind::Rook, color) {
        count += (rook_attacks(sq, occ) & !own).count() as i32;
    }
    for sq in board.pieces_of(Kind::Queen, color) {
        count += ((bishop_attacks(sq, occ) | rook_attacks(sq, occ)) & !own).count() as i32;
    }
    count
}

/// King safety: penalise enemy attacks near the home king, reward them near
/// the enemy king. In the endgame, reward central king activity instead.
fn king_safety_score(board: &Board, phase: GamePhase) -> i32 {
    if phase == GamePhase::Endgame {
        return king_activity(board, Color::White) - king_activity(board, Color::Black);
    }

    king_shield_score(board, Color::White) - king_shield_score(board, Color::Black)
}

fn king_shield_score(board: &Board, color: Color) -> i32 {
    let king_sq = board.king_square(color);
    let zone = king_attacks(king_sq) | Bitboard::from_square(king_sq);
    let enemy = color.opposite();

    let mut attackers = 0i32;
    for sq in zone {
        if crate::movegen::is_square_attacked(board, sq, enemy) {
            attackers += 1;
        }
    }
    -attackers * 10
}

fn king_activity(board: &Board, color: Color) -> i32 {
    let king_sq = board.king_square(color);
    let file_dist = (king_sq.file().index() as i32 - 3).unsigned_abs() as i32;
    let rank_dist = (king_sq.rank().index() as i32 - 3).unsigned_abs() as i32;
    let centrality = 6 - (file_dist + rank_dist);
    centrality * 5
}

fn file_mask(file: File) -> Bitboard {
    Bitboard(Bitboard::FILE_A.0 << file.index())
}

fn rank_mask(rank: Rank) -> Bitboard {
    Bitboard(0xFFu64 << ((7 - rank.index()) * 8))
}

fn adjacent_files_mask(file: File) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    if file.index() > 0 {
        mask |= file_mask(File::from_index(file.index() - 1).unwrap());
    }
    if file.index() < 7 {
        mask |= file_mask(File::from_index(file.index() + 1).unwrap());
    }
    mask
}

/// Pawn structure: passed/isolated/doubled/chained/supported pawns and wing majorities.
fn pawn_structure_score(board: &Board) -> i32 {
    pawn_structure_for(board, Color::White) - pawn_structure_for(board, Color::Black)
}

fn pawn_structure_for(board: &Board, color: Color) -> i32 {
    let own_pawns = board.pieces_of(Kind::Pawn, color);
    let enemy_pawns = board.pieces_of(Kind::Pawn, color.opposite());
    let mut score = 0;

    for sq in own_pawns {
        let file = sq.file();
        let own_file_count = (own_pawns & file_mask(file)).count();
        let own_on_file_excluding = own_file_count.saturating_sub(1);
        if own_on_file_excluding > 0 {
            score -= 15 * own_on_file_excluding as i32; // doubled
        }

        let adjacent = adjacent_files_mask(file);
        if (own_pawns & adjacent).is_empty() {
            score -= 15; // isolated
        } else if is_supported(board, sq, color) {
            score += 5; // supported by a neighbouring pawn
        }

        if has_pawn_chain_partner(board, sq, color) {
            score += 5;
        }

        if is_passed(sq, color, enemy_pawns, file, adjacent) {
            let advancement = match color {
                Color::White => sq.rank().index() as i32,
                Color::Black => 7 - sq.rank().index() as i32,
            };
            score += 10 + advancement * 10;
        }
    }

    score + pawn_majority_bonus(own_pawns, enemy_pawns)
}

fn is_supported(board: &Board, sq: Square, color: Color) -> bool {
    let own_pawns = board.pieces_of(Kind::Pawn, color);
    (pawn_attacks(sq, color.opposite()) & own_pawns).is_not_empty()
}

fn has_pawn_chain_partner(board: &Board, sq: Square, color: Color) -> bool {
    let own_pawns = board.pieces_of(Kind::Pawn, color);
    let behind = match color {
        Color::White => Bitboard::from_square(sq).south_east() | Bitboard::from_square(sq).south_west(),
        Color::Black => Bitboard::from_square(sq).north_east() | Bitboard::from_square(sq).north_west(),
    };
    (behind & own_pawns).is_not_empty()
}

fn is_passed(sq: Square, color: Color, enemy_pawns: Bitboard, file: File, adjacent: Bitboard) -> bool {
    let span_files = file_mask(file) | adjacent;
    let rank_idx = sq.rank().index();
    let mut ahead = Bitboard::EMPTY;
    for rank in Rank::ALL {
        let ahead_for_color = match color {
            Color::White => rank.index() > rank_idx,
            Color::Black => rank.index() < rank_idx,
        };
        if ahead_for_color {
            ahead |= rank_mask(rank);
        }
    }
    (enemy_pawns & span_files & ahead).is_empty()
}

fn pawn_majority_bonus(own_pawns: Bitboard, enemy_pawns: Bitboard) -> i32 {
    let queenside = file_mask(File::A) | file_mask(File::B) | file_mask(File::C) | file_mask(File::D);
    let kingside = file_mask(File::E) | file_mask(File::F) | file_mask(File::G) | file_mask(File::H);

    let mut bonus = 0;
    if (own_pawns & queenside).count() > (enemy_pawns & queenside).count() {
        bonus += 10;
    }
    if (own_pawns & kingside).count() > (enemy_pawns & kingside).count() {
        bonus += 10;
    }
    bonus
}

/// Lightweight tactical scan: knight forks on two-or-more valuable targets,
/// and simple pins of an enemy piece against its king on a single ray.
fn tactical_score(board: &Board) -> i32 {
    tactical_for(board, Color::White) - tactical_for(board, Color::Black)
}

fn tactical_for(board: &Board, color: Color) -> i32 {
    let enemy = color.opposite();
    let enemy_occ = board.occupied_by(enemy);
    let mut score = 0;

    for sq in board.pieces_of(Kind::Knight, color) {
        let hits = knight_attacks(sq) & enemy_occ;
        let valuable = hits
            .into_iter()
            .filter(|&s| {
                board
                    .piece_at(s)
                    .and_then(|p| p.kind())
                    .map(|k| piece_value(k) >= BISHOP_VALUE)
                    .unwrap_or(false)
            })
            .count();
        if valuable >= 2 {
            score += 40;
        }
    }

    score += pin_score(board, color);
    score
}

fn pin_score(board: &Board, color: Color) -> i32 {
    let enemy = color.opposite();
    let king_sq = board.king_square(enemy);
    let occ = board.occupied();
    let mut score = 0;

    for sq in board.pieces_of(Kind::Bishop, color) {
        if is_pinning(sq, king_sq, occ, board, enemy) {
            score += 20;
        }
    }
    for sq in board.pieces_of(Kind::Rook, color) {
        if is_pinning(sq, king_sq, occ, board, enemy) {
            score += 20;
        }
    }
    for sq in board.pieces_of(Kind::Queen, color) {
        if is_pinning(sq, king_sq, occ, board, enemy) {
            score += 25;
        }
    }
    score
}

/// True if exactly one enemy piece sits between `attacker` and `king_sq` on
/// a straight ray, i.e. it is pinned.
fn is_pinning(attacker: Square, king_sq: Square, occ: Bitboard, board: &Board, enemy: Color) -> bool {
    let Some(step) = ray_step(attacker, king_sq) else {
        return false;
    };

    let mut current = attacker.index() as i32;
    let king_index = king_sq.index() as i32;
    let mut blockers = 0;
    let mut blocker_is_enemy_nonking = true;

    loop {
        current += step;
        if !(0..64).contains(&current) {
            return false;
        }
        if current == king_index {
            break;
        }
        let sq = Square::from_index(current as u8).unwrap();
        if (occ & Bitboard::from_square(sq)).is_not_empty() {
            blockers += 1;
            if blockers > 1 {
                return false;
            }
            let owner = board.piece_at(sq).and_then(|p| p.color());
            blocker_is_enemy_nonking = owner == Some(enemy);
        }
    }

    blockers == 1 && blocker_is_enemy_nonking
}

/// Returns the constant step between two squares if they share a rank,
/// file, or diagonal, else `None`.
fn ray_step(from: Square, to: Square) -> Option<i32> {
    let (ff, fr) = (from.file().index() as i32, from.rank().index() as i32);
    let (tf, tr) = (to.file().index() as i32, to.rank().index() as i32);
    let (df, dr) = (tf - ff, tr - fr);

    if df == 0 && dr == 0 {
        return None;
    }
    if df != 0 && dr != 0 && df.abs() != dr.abs() {
        return None;
    }

    // Index step mirrors board rank/file deltas under this crate's
    // rank-major, top-down (rank 8 = row 0) indexing.
    let file_step = df.signum();
    let rank_step = -dr.signum();
    Some(rank_step * 8 + file_step)
}

const PAWN_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 50, 50, 50, 50, 50, 50, 50, 50, 10, 10, 20, 30, 30, 20, 10, 10, 5, 5,
    10, 25, 25, 10, 5, 5, 0, 0, 0, 20, 20, 0, 0, 0, 5, -5, -10, 0, 0, -10, -5, 5, 5, 10, 10, -20,
    -20, 10, 10, 5, 0, 0, 0, 0, 0, 0, 0, 0,
];

const PAWN_PST_ENDGAME: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 80, 80, 80, 80, 80, 80, 80, 80, 50, 50, 50, 50, 50, 50, 50, 50, 30,
    30, 30, 30, 30, 30, 30, 30, 20, 20, 20, 20, 20, 20, 20, 20, 10, 10, 10, 10, 10, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 10, 0, 0, 0, 0, 0, 0, 0, 0,
];

const KNIGHT_PST: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 0, 0, 0, -20, -40, -30, 0, 10, 15, 15, 10,
    0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 5, 10, 15, 15, 10,
    5, -30, -40, -20, 0, 5, 5, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
];

const KNIGHT_PST_ENDGAME: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 0, 0, 0, -20, -40, -30, 0, 10, 15, 15,
    10, 0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 0, 10, 15,
    15, 10, 0, -30, -40, -20, 0, 0, 0, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
];

const BISHOP_PST: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 10, 10, 5, 0,
    -10, -10, 5, 5, 10, 10, 5, 5, -10, -10, 0, 10, 10, 10, 10, 0, -10, -10, 10, 10, 10, 10, 10, 10,
    -10, -10, 5, 0, 0, 0, 0, 5, -10, -20, -10, -10, -10, -10, -10, -10, -20,
];

const ROOK_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 5, 10, 10, 10, 10, 10, 10, 5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0,
    0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, 0, 0,
    0, 5, 5, 0, 0, 0,
];

const QUEEN_PST: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 5, 5, 5, 0, -10,
    -5, 0, 5, 5, 5, 5, 0, -5, 0, 0, 5, 5, 5, 5, 0, -5, -10, 5, 5, 5, 5, 5, 0, -10, -10, 0, 5, 0, 0,
    0, 0, -10, -20, -10, -10, -5, -5, -10, -10, -20,
];

const KING_MIDDLEGAME_PST: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40,
    -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -20, -30, -30, -40, -40, -30,
    -30, -20, -10, -20, -20, -20, -20, -20, -20, -10, 20, 20, 0, 0, 0, 0, 20, 20, 20, 30, 10, 0, 0,
    10, 30, 20,
];

const KING_ENDGAME_PST: [i32; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50, -30, -20, -10, 0, 0, -10, -20, -30, -30, -10, 20, 30,
    30, 20, -10, -30, -30, -10, 30, 40, 40, 30, -10, -30, -30, -10, 30, 40, 40, 30, -10, -30, -30,
    -10, 20, 30, 30, 20, -10, -30, -30, -30, 0, 0, 0, 0, -30, -30, -50, -30, -30, -30, -30, -30,
    -30, -50,
];
