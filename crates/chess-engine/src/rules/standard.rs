//! Standard chess rules implementation.

use super::{repetition_count, DrawReason, GameResult, RuleSet};
use crate::movegen::{generate_legal_moves, is_king_attacked};
use crate::{Bitboard, Board};
use chess_core::{Color, Kind};

/// Standard chess rules (FIDE).
///
/// This is the default rule set implementing standard chess rules:
/// - Standard piece movement
/// - Castling (kingside and queenside)
/// - En passant
/// - Pawn promotion
/// - Check, checkmate, and stalemate detection
/// - Fifty/seventy-five move rules and threefold/fivefold repetition
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Board {
        Board::startpos()
    }

    fn generate_moves(&self, board: &mut Board) -> chess_core::MoveList {
        generate_legal_moves(board)
    }

    fn is_check(&self, board: &Board) -> bool {
        is_king_attacked(board, board.side_to_move())
    }

    fn is_insufficient_material(&self, board: &Board) -> bool {
        let white_pawns = board.pieces_of(Kind::Pawn, Color::White).count();
        let black_pawns = board.pieces_of(Kind::Pawn, Color::Black).count();
        let white_rooks = board.pieces_of(Kind::Rook, Color::White).count();
        let black_rooks = board.pieces_of(Kind::Rook, Color::Black).count();
        let white_queens = board.pieces_of(Kind::Queen, Color::White).count();
        let black_queens = board.pieces_of(Kind::Queen, Color::Black).count();

        if white_pawns > 0
            || black_pawns > 0
            || white_rooks > 0
            || black_rooks > 0
            || white_queens > 0
            || black_queens > 0
        {
            return false;
        }

        let white_knights = board.pieces_of(Kind::Knight, Color::White).count();
        let black_knights = board.pieces_of(Kind::Knight, Color::Black).count();
        let white_bishops = board.pieces_of(Kind::Bishop, Color::White);
        let black_bishops = board.pieces_of(Kind::Bishop, Color::Black);
        let white_bishop_count = white_bishops.count();
        let black_bishop_count = black_bishops.count();

        // K vs K
        if white_knights == 0
            && black_knights == 0
            && white_bishop_count == 0
            && black_bishop_count == 0
        {
            return true;
        }

        // K+N vs K or K vs K+N
        if white_bishop_count == 0
            && black_bishop_count == 0
            && ((white_knights == 1 && black_knights == 0)
                || (white_knights == 0 && black_knights == 1))
        {
            return true;
        }

        // K+B vs K or K vs K+B
        if white_knights == 0 && black_knights == 0 {
            if (white_bishop_count == 1 && black_bishop_count == 0)
                || (white_bishop_count == 0 && black_bishop_count == 1)
            {
                return true;
            }

            // K+B vs K+B with bishops on the same colour
            if white_bishop_count == 1 && black_bishop_count == 1 {
                let white_on_light = (white_bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
                let black_on_light = (black_bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
                if white_on_light == black_on_light {
                    return true;
                }
            }
        }

        false
    }

    fn game_result(&self, board: &mut Board) -> Option<GameResult> {
        if board.halfmove_clock() >= 150 {
            return Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule));
        }

        if repetition_count(board) >= 5 {
            return Some(GameResult::Draw(DrawReason::FivefoldRepetition));
        }

        if self.is_insufficient_material(board) {
            return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
        }

        let moves = self.generate_moves(board);
        if moves.is_empty() {
            return Some(if self.is_check(board) {
                match board.side_to_move() {
                    Color::White => GameResult::BlackWins,
                    Color::Black => GameResult::WhiteWins,
                }
            } else {
                GameResult::Draw(DrawReason::Stalemate)
            });
        }

        None
    }

    fn claim_draw(&self, board: &Board) -> Option<DrawReason> {
        if board.halfmove_clock() >= 100 {
            return Some(DrawReason::FiftyMoveRule);
        }
        if repetition_count(board) >= 3 {
            return Some(DrawReason::ThreefoldRepetition);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position() {
        let board = StandardChess.initial_position();
        assert_eq!(board.to_fen(), crate::fen::FenParser::STARTPOS);
    }

    #[test]
    fn starting_moves() {
        let mut board = StandardChess.initial_position();
        let moves = StandardChess.generate_moves(&mut board);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn not_in_check_startpos() {
        let board = StandardChess.initial_position();
        assert!(!StandardChess.is_check(&board));
    }

    #[test]
    fn no_game_result_startpos() {
        let mut board = StandardChess.initial_position();
        assert!(StandardChess.game_result(&mut board).is_none());
    }

    #[test]
    fn checkmate_fools_mate() {
        let mut board =
            Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert!(StandardChess.is_check(&board));
        assert_eq!(
            StandardChess.game_result(&mut board),
            Some(GameResult::BlackWins)
        );
    }

    #[test]
    fn stalemate() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!StandardChess.is_check(&board));
        let moves = StandardChess.generate_moves(&mut board);
        assert!(moves.is_empty());
        assert_eq!(
            StandardChess.game_result(&mut board),
            Some(GameResult::Draw(DrawReason::Stalemate))
        );
    }

    #[test]
    fn seventy_five_move_rule() {
        let mut board = Board::from_fen("8/8/8/8/8/8/8/4K2k w - - 150 1").unwrap();
        assert_eq!(
            StandardChess.game_result(&mut board),
            Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule))
        );
    }

    #[test]
    fn insufficient_material_k_vs_k() {
        let mut board = Board::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert!(StandardChess.is_insufficient_material(&board));
        assert_eq!(
            StandardChess.game_result(&mut board),
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        );
    }

    #[test]
    fn insufficient_material_k_n_vs_k() {
        let board = Board::from_fen("8/8/8/8/8/8/8/4KN1k w - - 0 1").unwrap();
        assert!(StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn insufficient_material_k_b_vs_k() {
        let board = Board::from_fen("8/8/8/8/8/8/8/4KB1k w - - 0 1").unwrap();
        assert!(StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn insufficient_material_k_b_vs_k_b_same_color() {
        let board = Board::from_fen("8/8/8/8/8/8/b7/4KB1k w - - 0 1").unwrap();
        assert!(StandardChess.is_insufficient_material(&board));

        let board = Board::from_fen("8/8/8/8/8/8/1b6/2B1K2k w - - 0 1").unwrap();
        assert!(StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn sufficient_material_k_b_vs_k_b_opposite_color() {
        let board = Board::from_fen("8/8/8/8/8/8/1b6/4KB1k w - - 0 1").unwrap();
        assert!(!StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn sufficient_material_with_pawn() {
        let board = Board::from_fen("8/8/8/8/8/8/4P3/4K2k w - - 0 1").unwrap();
        assert!(!StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn sufficient_material_with_rook() {
        let board = Board::from_fen("8/8/8/8/8/8/8/4KR1k w - - 0 1").unwrap();
        assert!(!StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn sufficient_material_k_n_n_vs_k() {
        let board = Board::from_fen("8/8/8/8/8/8/8/3NKN1k w - - 0 1").unwrap();
        assert!(!StandardChess.is_insufficient_material(&board));
    }

    #[test]
    fn is_legal_move() {
        let mut board = StandardChess.initial_position();
        let e2 = chess_core::Square::new(chess_core::File::E, chess_core::Rank::R2);
        let e4 = chess_core::Square::new(chess_core::File::E, chess_core::Rank::R4);
        let legal_move = chess_core::Move::new(e2, e4, chess_core::MoveFlag::DoublePush);
        assert!(StandardChess.is_legal(&mut board, legal_move));

        let e5 = chess_core::Square::new(chess_core::File::E, chess_core::Rank::R5);
        let illegal_move = chess_core::Move::normal(e2, e5);
        assert!(!StandardChess.is_legal(&mut board, illegal_move));
    }

    #[test]
    fn threefold_repetition_claimable() {
        use chess_core::{File, Move, MoveFlag, Rank, Square};
        let mut board = StandardChess.initial_position();
        let f3 = Square::new(File::F, Rank::R3);
        let f6 = Square::new(File::F, Rank::R6);
        for _ in 0..2 {
            board.make_move(Move::new(Square::G1, f3, MoveFlag::Quiet));
            board.make_move(Move::new(Square::G8, f6, MoveFlag::Quiet));
            board.make_move(Move::new(f3, Square::G1, MoveFlag::Quiet));
            board.make_move(Move::new(f6, Square::G8, MoveFlag::Quiet));
        }
        assert_eq!(
            StandardChess.claim_draw(&board),
            Some(DrawReason::ThreefoldRepetition)
        );
    }
}
