//! Event-driven game coordinator.
//!
//! [`StateMachine`] owns no board state itself — it drives a
//! [`GameController`] in response to events pulled off a `tokio::sync::mpsc`
//! queue and reports outcomes to a single [`GameObserver`]. Producers may
//! post events from any thread; the machine's `run` loop processes them on
//! whichever task polls it, one at a time, in the order posted.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chess_core::{Color, Kind, Move, Square};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::GameConfiguration;
use crate::controller::{EndGameState, GameController};
use crate::error::GameError;

/// State-machine states, per the transition table this module implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Init,
    WaitingForInput,
    WaitingForTarget,
    PawnPromotion,
    WaitingForRemote,
    WaitingForCPU,
    GameOver,
}

/// Front-end-oriented projection of [`GameState`], reported to observers
/// instead of the raw state so embedding UIs don't need to know the
/// internal transition names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendPhase {
    Initializing,
    PlayerTurn,
    OpponentTurn,
    PromotionDialog,
    GameEnded,
}

impl From<GameState> for FrontendPhase {
    fn from(state: GameState) -> Self {
        match state {
            GameState::Init => FrontendPhase::Initializing,
            GameState::WaitingForInput | GameState::WaitingForTarget => FrontendPhase::PlayerTurn,
            GameState::PawnPromotion => FrontendPhase::PromotionDialog,
            GameState::WaitingForRemote | GameState::WaitingForCPU => FrontendPhase::OpponentTurn,
            GameState::GameOver => FrontendPhase::GameEnded,
        }
    }
}

/// Events posted to the state machine's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    SquareSelected(Square),
    PromotionChosen(Kind),
    RemoteMoveReceived(Move),
    CPUMoveCalculated(Move),
    UndoRequested,
    GameStart(GameConfiguration),
    GameReset,
}

/// Synchronous observation sink. The state machine owns one by value and
/// invokes its methods in-line on the thread running `run`; implementations
/// must not block for long, since they stall event processing.
pub trait GameObserver: Send {
    fn on_game_state_changed(&mut self, phase: FrontendPhase) {
        let _ = phase;
    }

    fn on_legal_moves_available(&mut self, from: Square, moves: &[Move]) {
        let _ = (from, moves);
    }

    fn on_move_executed(&mut self, mov: Move, from_remote: bool) {
        let _ = (mov, from_remote);
    }

    fn on_move_undone(&mut self) {}

    fn on_promotion_required(&mut self, from: Square, to: Square) {
        let _ = (from, to);
    }

    fn on_game_ended(&mut self, state: EndGameState, winner: Option<Color>) {
        let _ = (state, winner);
    }

    fn on_board_state_changed(&mut self) {}
}

/// Handle for posting events into a running [`StateMachine`] from any
/// thread. Cloning and sending are both cheap; the receiver side lives with
/// the machine's `run` loop.
#[derive(Clone)]
pub struct EventSender(mpsc::UnboundedSender<GameEvent>);

impl EventSender {
    /// Posts an event. Fails only if the state machine's `run` loop has
    /// already exited (e.g. its `StateMachine` was dropped).
    pub fn post(&self, event: GameEvent) -> Result<(), GameEvent> {
        self.0.send(event).map_err(|e| e.0)
    }
}

struct PendingSelection {
    from: Square,
}

struct PendingPromotion {
    from: Square,
    to: Square,
}

/// Tracks a CPU search dispatched to a blocking worker, so it can be
/// cancelled from `GameReset`.
struct CpuTask {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Drives a [`GameController`] through the event-driven turn cycle described
/// in the module docs, reporting transitions to a [`GameObserver`].
pub struct StateMachine {
    controller: GameController,
    observer: Option<Box<dyn GameObserver>>,
    state: GameState,
    events: mpsc::UnboundedReceiver<GameEvent>,
    sender: mpsc::UnboundedSender<GameEvent>,
    selection: Option<PendingSelection>,
    promotion: Option<PendingPromotion>,
    cpu_task: Option<CpuTask>,
}

impl StateMachine {
    /// Creates a state machine in `Init`, with no game configured yet.
    pub fn new(observer: Option<Box<dyn GameObserver>>) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        StateMachine {
            controller: GameController::new(),
            observer,
            state: GameState::Init,
            events,
            sender,
            selection: None,
            promotion: None,
            cpu_task: None,
        }
    }

    /// Returns a cloneable handle producers can use to post events.
    pub fn event_sender(&self) -> EventSender {
        EventSender(self.sender.clone())
    }

    /// The current state-machine state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Read-only access to the underlying controller, e.g. for rendering.
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    fn set_state(&mut self, state: GameState) {
        self.state = state;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_game_state_changed(state.into());
        }
    }

    fn abort_cpu_task(&mut self) {
        if let Some(task) = self.cpu_task.take() {
            task.stop.store(true, std::sync::atomic::Ordering::Relaxed);
            task.handle.abort();
        }
    }

    /// Consumes events until the channel closes (every [`EventSender`] and
    /// this machine's own sender have been dropped). Intended to run as a
    /// single long-lived task owning this state machine.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle_event(event).await;
        }
    }

    /// Processes exactly one event, for callers that want to drive the loop
    /// manually (e.g. in tests) instead of via [`run`](Self::run).
    pub async fn step(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    async fn handle_event(&mut self, event: GameEvent) {
        if matches!(event, GameEvent::GameReset) {
            self.abort_cpu_task();
            self.controller = GameController::new();
            self.selection = None;
            self.promotion = None;
            self.set_state(GameState::Init);
            return;
        }

        match (self.state, event) {
            (GameState::Init, GameEvent::GameStart(config)) => {
                self.controller.initialize_game(config);
                self.advance_turn().await;
            }
            (GameState::WaitingForInput, GameEvent::SquareSelected(sq)) => {
                self.select_square(sq);
            }
            (GameState::WaitingForInput, GameEvent::UndoRequested) => {
                self.undo();
            }
            (GameState::WaitingForTarget, GameEvent::SquareSelected(sq)) => {
                self.handle_target_selection(sq).await;
            }
            (GameState::PawnPromotion, GameEvent::PromotionChosen(piece)) => {
                self.complete_promotion(piece).await;
            }
            (GameState::WaitingForRemote, GameEvent::RemoteMoveReceived(mov)) => {
                self.apply_move(mov, true).await;
            }
            (GameState::WaitingForCPU, GameEvent::CPUMoveCalculated(mov)) => {
                self.cpu_task = None;
                self.apply_move(mov, false).await;
            }
            _ => {
                tracing::debug!(state = ?self.state, "ignored event not valid in current state");
            }
        }
    }

    fn select_square(&mut self, sq: Square) {
        let moves = self.controller.legal_moves_from_square(sq);
        if moves.is_empty() {
            return;
        }
        self.selection = Some(PendingSelection { from: sq });
        if let Some(observer) = self.observer.as_mut() {
            observer.on_legal_moves_available(sq, &moves);
        }
        self.set_state(GameState::WaitingForTarget);
    }

    async fn handle_target_selection(&mut self, sq: Square) {
        let from = match self.selection.as_ref() {
            Some(pending) => pending.from,
            None => {
                self.set_state(GameState::WaitingForInput);
                return;
            }
        };

        if sq == from {
            self.selection = None;
            self.set_state(GameState::WaitingForInput);
            return;
        }

        let moves_from_target = self.controller.legal_moves_from_square(sq);
        if !moves_from_target.is_empty() {
            self.select_square(sq);
            return;
        }

        if self.controller.is_promotion_move(from, sq) {
            self.promotion = Some(PendingPromotion { from, to: sq });
            self.selection = None;
            self.set_state(GameState::PawnPromotion);
            if let Some(observer) = self.observer.as_mut() {
                observer.on_promotion_required(from, sq);
            }
            return;
        }

        match self.controller.find_move(from, sq, None) {
            Some(mov) => {
                self.selection = None;
                self.apply_move(mov, false).await;
            }
            None => {
                self.selection = None;
                self.set_state(GameState::WaitingForInput);
            }
        }
    }

    async fn complete_promotion(&mut self, piece: Kind) {
        let pending = match self.promotion.take() {
            Some(p) => p,
            None => {
                self.set_state(GameState::WaitingForInput);
                return;
            }
        };
        match self.controller.find_move(pending.from, pending.to, Some(piece)) {
            Some(mov) => self.apply_move(mov, false).await,
            None => self.set_state(GameState::WaitingForInput),
        }
    }

    fn undo(&mut self) {
        match self.controller.undo_last_move() {
            Ok(()) => {
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_move_undone();
                    observer.on_board_state_changed();
                }
            }
            Err(GameError::NoHistory) => {}
            Err(_) => {}
        }
    }

    async fn apply_move(&mut self, mov: Move, from_remote: bool) {
        match self.controller.execute_move(mov, from_remote) {
            Ok(()) => {
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_move_executed(mov, from_remote);
                    observer.on_board_state_changed();
                }
                self.advance_turn().await;
            }
            Err(_) => {
                // Illegal move attempt: discard the intent, stay on the board.
                self.selection = None;
                self.promotion = None;
                self.set_state(GameState::WaitingForInput);
            }
        }
    }

    async fn advance_turn(&mut self) {
        let end_state = self.controller.check_end_game();
        if !matches!(end_state, EndGameState::OnGoing) {
            let winner = match end_state {
                EndGameState::Checkmate => Some(self.controller.current_side().opposite()),
                _ => None,
            };
            if let Some(observer) = self.observer.as_mut() {
                observer.on_game_ended(end_state, winner);
            }
            self.set_state(GameState::GameOver);
            return;
        }

        if self.controller.is_cpu_turn() {
            self.set_state(GameState::WaitingForCPU);
            self.dispatch_cpu_search();
        } else if !self.controller.is_local_player_turn() {
            self.set_state(GameState::WaitingForRemote);
        } else {
            self.set_state(GameState::WaitingForInput);
        }
    }

    fn dispatch_cpu_search(&mut self) {
        let handle = match self.controller.spawn_cpu_search() {
            Ok(handle) => handle,
            Err(_) => return,
        };
        let stop = handle.stop_token();
        let sender = self.sender.clone();
        let join = tokio::task::spawn_blocking(move || {
            if let Some(mov) = handle.run() {
                let _ = sender.send(GameEvent::CPUMoveCalculated(mov));
            }
        });
        self.cpu_task = Some(CpuTask { stop, handle: join });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CpuDifficulty, GameMode};
    use chess_core::{File, Rank};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        phases: Arc<Mutex<Vec<FrontendPhase>>>,
        moves_executed: Arc<Mutex<Vec<Move>>>,
        ended: Arc<Mutex<Option<(EndGameState, Option<Color>)>>>,
    }

    impl GameObserver for RecordingObserver {
        fn on_game_state_changed(&mut self, phase: FrontendPhase) {
            self.phases.lock().unwrap().push(phase);
        }

        fn on_move_executed(&mut self, mov: Move, _from_remote: bool) {
            self.moves_executed.lock().unwrap().push(mov);
        }

        fn on_game_ended(&mut self, state: EndGameState, winner: Option<Color>) {
            *self.ended.lock().unwrap() = Some((state, winner));
        }
    }

    fn e2e4() -> Move {
        Move::normal(Square::new(File::E, Rank::R2), Square::new(File::E, Rank::R4))
    }

    #[tokio::test]
    async fn game_start_moves_local_coop_to_waiting_for_input() {
        let mut machine = StateMachine::new(None);
        machine
            .handle_event(GameEvent::GameStart(GameConfiguration::default()))
            .await;
        assert_eq!(machine.state(), GameState::WaitingForInput);
    }

    #[tokio::test]
    async fn selecting_a_pawn_then_its_target_executes_the_move() {
        let mut machine = StateMachine::new(None);
        machine
            .handle_event(GameEvent::GameStart(GameConfiguration::default()))
            .await;

        let e2 = Square::new(File::E, Rank::R2);
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        assert_eq!(machine.state(), GameState::WaitingForTarget);

        let e4 = Square::new(File::E, Rank::R4);
        machine.handle_event(GameEvent::SquareSelected(e4)).await;
        assert_eq!(machine.state(), GameState::WaitingForInput);
        assert_eq!(machine.controller().move_history(), &[e2e4()]);
    }

    #[tokio::test]
    async fn reselecting_source_square_clears_intent() {
        let mut machine = StateMachine::new(None);
        machine
            .handle_event(GameEvent::GameStart(GameConfiguration::default()))
            .await;
        let e2 = Square::new(File::E, Rank::R2);
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        assert_eq!(machine.state(), GameState::WaitingForInput);
        assert!(machine.controller().move_history().is_empty());
    }

    #[tokio::test]
    async fn undo_requested_in_waiting_for_input_reverts_last_move() {
        let mut machine = StateMachine::new(None);
        machine
            .handle_event(GameEvent::GameStart(GameConfiguration::default()))
            .await;
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        machine.handle_event(GameEvent::SquareSelected(e4)).await;
        assert_eq!(machine.controller().move_history().len(), 1);

        machine.handle_event(GameEvent::UndoRequested).await;
        assert!(machine.controller().move_history().is_empty());
        assert_eq!(machine.state(), GameState::WaitingForInput);
    }

    #[tokio::test]
    async fn game_reset_returns_to_init_from_any_state() {
        let mut machine = StateMachine::new(None);
        machine
            .handle_event(GameEvent::GameStart(GameConfiguration::default()))
            .await;
        let e2 = Square::new(File::E, Rank::R2);
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        assert_eq!(machine.state(), GameState::WaitingForTarget);

        machine.handle_event(GameEvent::GameReset).await;
        assert_eq!(machine.state(), GameState::Init);
        assert!(machine.controller().move_history().is_empty());
    }

    #[tokio::test]
    async fn vs_cpu_after_local_move_enters_waiting_for_cpu() {
        let mut machine = StateMachine::new(None);
        machine
            .handle_event(GameEvent::GameStart(GameConfiguration {
                mode: GameMode::VsCPU,
                local_player_side: Color::White,
                cpu_difficulty: CpuDifficulty::Random,
            }))
            .await;
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        machine.handle_event(GameEvent::SquareSelected(e4)).await;
        assert_eq!(machine.state(), GameState::WaitingForCPU);
        assert!(machine.cpu_task.is_some());
    }

    #[tokio::test]
    async fn observer_receives_state_changes_and_move_events() {
        let observer = RecordingObserver::default();
        let phases = Arc::clone(&observer.phases);
        let moves = Arc::clone(&observer.moves_executed);
        let mut machine = StateMachine::new(Some(Box::new(observer)));

        machine
            .handle_event(GameEvent::GameStart(GameConfiguration::default()))
            .await;
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        machine.handle_event(GameEvent::SquareSelected(e2)).await;
        machine.handle_event(GameEvent::SquareSelected(e4)).await;

        assert!(phases.lock().unwrap().contains(&FrontendPhase::PlayerTurn));
        assert_eq!(moves.lock().unwrap().as_slice(), &[e2e4()]);
    }

    #[tokio::test]
    async fn event_sender_posts_into_running_loop() {
        let mut machine = StateMachine::new(None);
        let sender = machine.event_sender();
        sender
            .post(GameEvent::GameStart(GameConfiguration::default()))
            .unwrap();
        assert!(machine.step().await);
        assert_eq!(machine.state(), GameState::WaitingForInput);
    }
}
