//! Game controller: a narrow façade hiding engine internals from a front-end.
//!
//! [`GameController`] owns the board, the move history, and the CPU search's
//! transposition table. It has no knowledge of UI state or an event loop —
//! that coordination lives in [`crate::state_machine::StateMachine`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess_core::{Color, Kind, Move, Square};
use chess_engine::movegen::generate_legal_moves;
use chess_engine::rules::{DrawReason, GameResult, RuleSet};
use chess_engine::{Board, SearchLimits, SearchResult, Searcher, StandardChess};

use crate::config::{GameConfiguration, GameMode};
use crate::error::GameError;
use crate::selection::select_weighted;

/// Outcome of [`GameController::check_end_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndGameState {
    OnGoing,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

/// A background CPU search in progress, owned by whoever dispatched it
/// (normally [`crate::state_machine::StateMachine`]) so it can be cancelled.
pub struct CpuSearchHandle {
    stop: Arc<AtomicBool>,
    board: Board,
    limits: SearchLimits,
    randomisation: (usize, f64),
    seed: u64,
}

impl CpuSearchHandle {
    /// Cooperatively cancels the search this handle was created for.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Returns a clone of the cancellation flag, so a caller can cancel this
    /// search from outside after handing `self` off to a worker task.
    pub fn stop_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Runs the search to completion (or cancellation) and applies the
    /// difficulty's randomised selection. Blocking; callers dispatch this
    /// onto a worker (e.g. `tokio::task::spawn_blocking`) rather than calling
    /// it on the state-machine thread.
    pub fn run(mut self) -> Option<Move> {
        let mut searcher = Searcher::new(self.limits, Arc::clone(&self.stop));
        let (k, factor) = self.randomisation;
        if k <= 1 {
            let result: SearchResult = searcher.search(&mut self.board);
            return result.best_move;
        }
        let candidates = searcher.search_top_k(&mut self.board, k);
        select_weighted(&candidates, factor, self.seed)
    }
}

/// Per-square cache of legal moves for the current position, built lazily.
struct LegalMoveCache {
    by_square: HashMap<Square, Vec<Move>>,
}

impl LegalMoveCache {
    fn build(board: &mut Board) -> Self {
        let moves = generate_legal_moves(board);
        let mut by_square: HashMap<Square, Vec<Move>> = HashMap::new();
        for &m in moves.as_slice() {
            by_square.entry(m.from()).or_default().push(m);
        }
        LegalMoveCache { by_square }
    }
}

/// Thin façade over [`Board`], move history, and the CPU searcher.
///
/// All mutation happens through `execute_move`/`undo_last_move`/`reset_game`;
/// nothing here performs I/O. A single `GameController` is meant to be owned
/// by a [`crate::state_machine::StateMachine`] for the lifetime of one game.
pub struct GameController {
    board: Board,
    rules: StandardChess,
    config: Option<GameConfiguration>,
    history: Vec<Move>,
    legal_moves: Option<LegalMoveCache>,
    next_cpu_seed: u64,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl GameController {
    /// Creates a controller with no game configured yet. Most operations
    /// return [`GameError::NotInitialized`] until `initialize_game` runs.
    pub fn new() -> Self {
        GameController {
            board: Board::startpos(),
            rules: StandardChess,
            config: None,
            history: Vec::new(),
            legal_moves: None,
            next_cpu_seed: 0x2545F4914F6CDD1D,
        }
    }

    /// Sets up the starting position under the given configuration.
    /// Idempotent: calling it again starts a fresh game under the new config.
    pub fn initialize_game(&mut self, config: GameConfiguration) {
        self.board = self.rules.initial_position();
        self.config = Some(config);
        self.history.clear();
        self.legal_moves = None;
        tracing::info!(mode = ?config.mode, local_side = ?config.local_player_side, "game initialized");
    }

    /// Clears board, history, and cached legal moves, keeping the current
    /// configuration (mirroring `initialize_game` without re-specifying it).
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        let config = self.config.ok_or(GameError::NotInitialized)?;
        self.initialize_game(config);
        Ok(())
    }

    fn require_config(&self) -> Result<GameConfiguration, GameError> {
        self.config.ok_or(GameError::NotInitialized)
    }

    fn ensure_legal_moves_cached(&mut self) {
        if self.legal_moves.is_none() {
            self.legal_moves = Some(LegalMoveCache::build(&mut self.board));
        }
    }

    fn invalidate_legal_moves(&mut self) {
        self.legal_moves = None;
    }

    /// Returns the legal moves whose origin is `square`, computing and
    /// caching the full legal move set for the position on first call.
    pub fn legal_moves_from_square(&mut self, square: Square) -> Vec<Move> {
        self.ensure_legal_moves_cached();
        self.legal_moves
            .as_ref()
            .and_then(|c| c.by_square.get(&square))
            .cloned()
            .unwrap_or_default()
    }

    /// Applies `mov`, recording it in history and invalidating the legal
    /// move cache. `from_remote` is recorded only for the caller's own
    /// bookkeeping (e.g. to suppress echoing a remote move back out); the
    /// board does not distinguish move origin.
    pub fn execute_move(&mut self, mov: Move, from_remote: bool) -> Result<(), GameError> {
        self.require_config()?;
        self.ensure_legal_moves_cached();
        let legal = self
            .legal_moves
            .as_ref()
            .map(|c| {
                c.by_square
                    .get(&mov.from())
                    .is_some_and(|moves| moves.contains(&mov))
            })
            .unwrap_or(false);
        if !legal {
            return Err(GameError::IllegalMove(mov.to_uci()));
        }

        self.board.make_move(mov);
        self.history.push(mov);
        self.invalidate_legal_moves();
        tracing::debug!(mov = %mov, from_remote, "move executed");
        Ok(())
    }

    /// Pops the last executed move and restores the prior position exactly.
    pub fn undo_last_move(&mut self) -> Result<(), GameError> {
        self.require_config()?;
        if self.history.is_empty() {
            return Err(GameError::NoHistory);
        }
        self.board.unmake_move();
        self.history.pop();
        self.invalidate_legal_moves();
        Ok(())
    }

    /// Returns true iff a legal move with these endpoints (any promotion
    /// piece) exists — i.e. playing `from -> to` requires a promotion choice.
    pub fn is_promotion_move(&mut self, from: Square, to: Square) -> bool {
        self.legal_moves_from_square(from)
            .iter()
            .any(|m| m.to() == to && m.flag().is_promotion())
    }

    /// Finds the unique legal move matching `from`, `to`, and (for
    /// promotions) the chosen promotion piece kind.
    pub fn find_move(&mut self, from: Square, to: Square, promotion: Option<Kind>) -> Option<Move> {
        self.legal_moves_from_square(from)
            .into_iter()
            .find(|m| m.to() == to && m.flag().promotion_piece() == promotion)
    }

    /// Returns the game-ending state of the current position, if any.
    pub fn check_end_game(&mut self) -> EndGameState {
        match self.rules.game_result(&mut self.board) {
            None => EndGameState::OnGoing,
            Some(GameResult::WhiteWins) | Some(GameResult::BlackWins) => EndGameState::Checkmate,
            Some(GameResult::Draw(DrawReason::Stalemate)) => EndGameState::Stalemate,
            Some(GameResult::Draw(reason)) => EndGameState::Draw(reason),
        }
    }

    /// Claims a draw by the fifty-move rule or threefold repetition, if
    /// either is currently available. Unlike `check_end_game`'s automatic
    /// conditions, these require the side to move to opt in.
    pub fn claim_draw(&mut self) -> Option<DrawReason> {
        self.rules.claim_draw(&self.board)
    }

    /// The side whose move it currently is.
    pub fn current_side(&self) -> Color {
        self.board.side_to_move()
    }

    /// Whether the configured local player is on move. In `LocalCoop`, both
    /// sides are local, so this is always true.
    pub fn is_local_player_turn(&self) -> bool {
        match self.config {
            Some(GameConfiguration {
                mode: GameMode::LocalCoop,
                ..
            }) => true,
            Some(config) => self.current_side() == config.local_player_side,
            None => false,
        }
    }

    /// Flips which side is considered the local player. Used when a hot-seat
    /// or rematch flow swaps colors without restarting the whole game.
    pub fn switch_turns(&mut self) -> Result<(), GameError> {
        let mut config = self.require_config()?;
        config.local_player_side = config.local_player_side.opposite();
        self.config = Some(config);
        Ok(())
    }

    /// Whether the engine (not a local or remote human) is on move.
    pub fn is_cpu_turn(&self) -> bool {
        matches!(
            self.config,
            Some(GameConfiguration {
                mode: GameMode::VsCPU,
                ..
            })
        ) && !self.is_local_player_turn()
    }

    /// Builds a handle for a background CPU search over the current
    /// position, using the configured difficulty's depth/time budget and
    /// randomisation spread. The handle clones the board, so the live
    /// position is never touched by the search worker.
    pub fn spawn_cpu_search(&mut self) -> Result<CpuSearchHandle, GameError> {
        let config = self.require_config()?;
        let seed = self.next_cpu_seed;
        self.next_cpu_seed = self.next_cpu_seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        Ok(CpuSearchHandle {
            stop: Arc::new(AtomicBool::new(false)),
            board: self.board.clone(),
            limits: config.cpu_difficulty.search_limits(),
            randomisation: config.cpu_difficulty.randomisation(),
            seed,
        })
    }

    /// The move history, oldest first.
    pub fn move_history(&self) -> &[Move] {
        &self.history
    }

    /// Read-only access to the current board, for SAN formatting or display.
    pub fn board(&self) -> &Board {
        &self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CpuDifficulty;
    use chess_core::{File, MoveFlag, PieceType, Rank};

    fn vs_cpu_config() -> GameConfiguration {
        GameConfiguration {
            mode: GameMode::VsCPU,
            local_player_side: Color::White,
            cpu_difficulty: CpuDifficulty::Easy,
        }
    }

    /// White pawn one step from promoting, kings clear of the action.
    fn promotion_board() -> Board {
        let mut board = Board::empty();
        board.set_piece(
            Square::new(File::A, Rank::R7),
            PieceType::new(Kind::Pawn, Color::White),
        );
        board.set_piece(
            Square::new(File::H, Rank::R1),
            PieceType::new(Kind::King, Color::White),
        );
        board.set_piece(
            Square::new(File::H, Rank::R8),
            PieceType::new(Kind::King, Color::Black),
        );
        board
    }

    /// Smothered mate: White king boxed in by its own pieces, checked by a
    /// knight that nothing can capture or block. White to move.
    fn checkmated_board() -> Board {
        let mut board = Board::empty();
        board.set_piece(
            Square::new(File::H, Rank::R1),
            PieceType::new(Kind::King, Color::White),
        );
        board.set_piece(
            Square::new(File::G, Rank::R1),
            PieceType::new(Kind::Rook, Color::White),
        );
        board.set_piece(
            Square::new(File::G, Rank::R2),
            PieceType::new(Kind::Pawn, Color::White),
        );
        board.set_piece(
            Square::new(File::H, Rank::R2),
            PieceType::new(Kind::Pawn, Color::White),
        );
        board.set_piece(
            Square::new(File::G, Rank::R3),
            PieceType::new(Kind::Knight, Color::Black),
        );
        board.set_piece(
            Square::new(File::A, Rank::R8),
            PieceType::new(Kind::King, Color::Black),
        );
        board
    }

    /// Textbook stalemate: White king boxed into the corner with no check.
    /// White to move.
    fn stalemate_board() -> Board {
        let mut board = Board::empty();
        board.set_piece(
            Square::new(File::A, Rank::R1),
            PieceType::new(Kind::King, Color::White),
        );
        board.set_piece(
            Square::new(File::C, Rank::R2),
            PieceType::new(Kind::King, Color::Black),
        );
        board.set_piece(
            Square::new(File::B, Rank::R3),
            PieceType::new(Kind::Queen, Color::Black),
        );
        board
    }

    #[test]
    fn uninitialized_controller_rejects_moves() {
        let mut controller = GameController::new();
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        let mov = Move::new(e2, e4, MoveFlag::DoublePush);
        assert_eq!(
            controller.execute_move(mov, false),
            Err(GameError::NotInitialized)
        );
    }

    #[test]
    fn initialize_then_execute_move() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        let mov = Move::new(e2, e4, MoveFlag::DoublePush);
        assert!(controller.execute_move(mov, false).is_ok());
        assert_eq!(controller.current_side(), Color::Black);
    }

    #[test]
    fn illegal_move_is_rejected_and_state_unchanged() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        let e2 = Square::new(File::E, Rank::R2);
        let e5 = Square::new(File::E, Rank::R5);
        let mov = Move::normal(e2, e5);
        let before = controller.board().hash();
        assert!(controller.execute_move(mov, false).is_err());
        assert_eq!(controller.board().hash(), before);
    }

    #[test]
    fn undo_restores_position_and_history() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        controller
            .execute_move(Move::new(e2, e4, MoveFlag::DoublePush), false)
            .unwrap();
        assert_eq!(controller.move_history().len(), 1);
        controller.undo_last_move().unwrap();
        assert!(controller.move_history().is_empty());
        assert_eq!(controller.current_side(), Color::White);
    }

    #[test]
    fn double_undo_fails_second_call() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        controller
            .execute_move(Move::new(e2, e4, MoveFlag::DoublePush), false)
            .unwrap();
        controller.undo_last_move().unwrap();
        assert_eq!(controller.undo_last_move(), Err(GameError::NoHistory));
    }

    #[test]
    fn legal_moves_from_square_matches_startpos() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        let e2 = Square::new(File::E, Rank::R2);
        let moves = controller.legal_moves_from_square(e2);
        assert_eq!(moves.len(), 2); // e3 and e4
    }

    #[test]
    fn promotion_square_offers_four_moves() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        controller.board = promotion_board();
        let a7 = Square::new(File::A, Rank::R7);
        let a8 = Square::new(File::A, Rank::R8);
        assert!(controller.is_promotion_move(a7, a8));
        let moves = controller.legal_moves_from_square(a7);
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn find_move_matches_promotion_piece() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        controller.board = promotion_board();
        let a7 = Square::new(File::A, Rank::R7);
        let a8 = Square::new(File::A, Rank::R8);
        let found = controller.find_move(a7, a8, Some(Kind::Queen));
        assert_eq!(found.unwrap().flag(), MoveFlag::PromoteQueen);
    }

    #[test]
    fn checkmate_is_detected() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        controller.board = checkmated_board();
        assert_eq!(controller.check_end_game(), EndGameState::Checkmate);
    }

    #[test]
    fn stalemate_is_detected() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration::default());
        controller.board = stalemate_board();
        assert_eq!(controller.check_end_game(), EndGameState::Stalemate);
    }

    #[test]
    fn local_coop_always_local_turn() {
        let mut controller = GameController::new();
        controller.initialize_game(GameConfiguration {
            mode: GameMode::LocalCoop,
            ..GameConfiguration::default()
        });
        assert!(controller.is_local_player_turn());
        assert!(!controller.is_cpu_turn());
    }

    #[test]
    fn vs_cpu_turn_tracking() {
        let mut controller = GameController::new();
        controller.initialize_game(vs_cpu_config());
        assert!(controller.is_local_player_turn());
        assert!(!controller.is_cpu_turn());

        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        controller
            .execute_move(Move::new(e2, e4, MoveFlag::DoublePush), false)
            .unwrap();
        assert!(!controller.is_local_player_turn());
        assert!(controller.is_cpu_turn());
    }

    #[test]
    fn switch_turns_flips_local_side() {
        let mut controller = GameController::new();
        controller.initialize_game(vs_cpu_config());
        assert!(controller.is_local_player_turn());
        controller.switch_turns().unwrap();
        assert!(!controller.is_local_player_turn());
    }

    #[test]
    fn cpu_search_finds_a_move_without_mutating_live_board() {
        let mut controller = GameController::new();
        controller.initialize_game(vs_cpu_config());
        let before = controller.board().hash();
        let handle = controller.spawn_cpu_search().unwrap();
        let best = handle.run();
        assert!(best.is_some());
        assert_eq!(controller.board().hash(), before);
    }

    #[test]
    fn reset_clears_history_but_keeps_config() {
        let mut controller = GameController::new();
        controller.initialize_game(vs_cpu_config());
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        controller
            .execute_move(Move::new(e2, e4, MoveFlag::DoublePush), false)
            .unwrap();
        controller.reset_game().unwrap();
        assert!(controller.move_history().is_empty());
        assert!(!controller.is_cpu_turn());
    }
}
