//! End-to-end scenarios played through [`GameController`] from the standard
//! starting position, using only its public API.

use chess_core::{File, Kind, PieceType, Rank, Square};
use chess_engine::rules::DrawReason;
use chess_game::controller::EndGameState;
use chess_game::{GameConfiguration, GameController};

fn sq(file: File, rank: Rank) -> Square {
    Square::new(file, rank)
}

/// Plays a sequence of `(from, to, promotion)` moves through the controller,
/// looking each one up via `find_move` so the exact flag (capture, en
/// passant, castling, promotion) is resolved by the legal move generator
/// rather than guessed by the test.
fn play(controller: &mut GameController, moves: &[(Square, Square, Option<Kind>)]) {
    for &(from, to, promotion) in moves {
        let mov = controller
            .find_move(from, to, promotion)
            .unwrap_or_else(|| panic!("no legal move {:?} -> {:?} (promotion {:?})", from, to, promotion));
        controller
            .execute_move(mov, false)
            .unwrap_or_else(|e| panic!("move {:?} -> {:?} rejected: {:?}", from, to, e));
    }
}

fn new_game() -> GameController {
    let mut controller = GameController::new();
    controller.initialize_game(GameConfiguration::default());
    controller
}

use File::*;
use Rank::*;

#[test]
fn scholars_mate_delivers_checkmate() {
    let mut controller = new_game();
    play(
        &mut controller,
        &[
            (sq(E, R2), sq(E, R4), None),
            (sq(E, R7), sq(E, R5), None),
            (sq(D, R1), sq(H, R5), None),
            (sq(B, R8), sq(C, R6), None),
            (sq(F, R1), sq(C, R4), None),
            (sq(G, R8), sq(F, R6), None),
            (sq(H, R5), sq(F, R7), None),
        ],
    );
    assert_eq!(controller.check_end_game(), EndGameState::Checkmate);
}

#[test]
fn en_passant_capture_removes_the_passed_pawn() {
    let mut controller = new_game();
    play(
        &mut controller,
        &[
            (sq(E, R2), sq(E, R4), None),
            (sq(A, R7), sq(A, R6), None),
            (sq(E, R4), sq(E, R5), None),
            (sq(D, R7), sq(D, R5), None),
            (sq(E, R5), sq(D, R6), None),
        ],
    );
    assert_eq!(controller.board().piece_at(sq(D, R5)), None);
    assert_eq!(
        controller.board().piece_at(sq(D, R6)),
        Some(PieceType::WPawn)
    );
    assert_eq!(controller.board().piece_at(sq(E, R5)), None);
}

#[test]
fn castling_is_illegal_while_the_transit_square_is_attacked() {
    let mut controller = new_game();
    play(
        &mut controller,
        &[
            (sq(E, R2), sq(E, R4), None),
            (sq(E, R7), sq(E, R5), None),
            (sq(G, R1), sq(F, R3), None),
            (sq(B, R8), sq(C, R6), None),
            (sq(F, R1), sq(C, R4), None),
            (sq(G, R8), sq(F, R6), None),
            (sq(B, R1), sq(C, R3), None),
            (sq(F, R6), sq(G, R4), None),
            (sq(H, R2), sq(H, R3), None),
            (sq(G, R4), sq(E, R3), None),
        ],
    );

    assert!(!controller.is_promotion_move(sq(E, R1), sq(G, R1)));
    let king_moves = controller.legal_moves_from_square(sq(E, R1));
    assert!(
        !king_moves.iter().any(|m| m.flag() == chess_core::MoveFlag::CastleKingside),
        "O-O should be illegal with f1 attacked by the knight on e3"
    );
}

#[test]
fn pawn_promotes_to_queen_via_capture() {
    let mut controller = new_game();
    play(
        &mut controller,
        &[
            (sq(B, R2), sq(B, R4), None),
            (sq(G, R8), sq(F, R6), None),
            (sq(B, R4), sq(B, R5), None),
            (sq(F, R6), sq(G, R8), None),
            (sq(B, R5), sq(B, R6), None),
            (sq(G, R8), sq(F, R6), None),
            (sq(B, R6), sq(A, R7), None),
            (sq(F, R6), sq(G, R8), None),
            (sq(A, R7), sq(B, R8), Some(Kind::Queen)),
        ],
    );
    assert_eq!(
        controller.board().piece_at(sq(B, R8)),
        Some(PieceType::WQueen)
    );
    assert_eq!(controller.board().piece_at(sq(A, R7)), None);
}

#[test]
fn threefold_repetition_becomes_claimable() {
    let mut controller = new_game();
    play(
        &mut controller,
        &[
            (sq(G, R1), sq(F, R3), None),
            (sq(G, R8), sq(F, R6), None),
            (sq(F, R3), sq(G, R1), None),
            (sq(F, R6), sq(G, R8), None),
            (sq(G, R1), sq(F, R3), None),
            (sq(G, R8), sq(F, R6), None),
            (sq(F, R3), sq(G, R1), None),
            (sq(F, R6), sq(G, R8), None),
        ],
    );
    assert_eq!(controller.check_end_game(), EndGameState::OnGoing);
    assert_eq!(controller.claim_draw(), Some(DrawReason::ThreefoldRepetition));
}
