//! Alpha-beta search with iterative deepening, a transposition table, and
//! cooperative cancellation.

use crate::eval::evaluate;
use crate::movegen::{generate_capture_moves, generate_legal_moves, is_king_attacked};
use crate::Board;
use chess_core::{Move, MoveList};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Score magnitude assigned to a delivered checkmate, before the
/// ply-from-root adjustment that makes the engine prefer faster mates.
const CHECKMATE_SCORE: i32 = 100_000;

/// Budget governing a single search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: u32,
    pub max_time: Duration,
    pub tt_capacity: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: 6,
            max_time: Duration::from_secs(1),
            tt_capacity: 1_000_000,
        }
    }
}

/// Outcome of a completed (or cancelled) search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeType {
    Exact,
    Alpha,
    Beta,
}

#[derive(Debug, Clone, Copy)]
struct TranspositionEntry {
    hash: u64,
    depth: u32,
    score: i32,
    node_type: NodeType,
    best_move: Option<Move>,
}

/// Fixed-capacity hash table keyed by Zobrist hash modulo capacity.
///
/// Replacement policy: an empty slot or a differing hash (a true collision)
/// is always overwritten; a matching hash is only overwritten by a search
/// that went at least as deep, so a shallow re-probe never evicts a deeper
/// result.
struct TranspositionTable {
    slots: Vec<Option<TranspositionEntry>>,
}

impl TranspositionTable {
    fn new(capacity: usize) -> Self {
        TranspositionTable {
            slots: vec![None; capacity.max(1)],
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) % self.slots.len()
    }

    fn probe(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.slots[self.index(hash)]
            .as_ref()
            .filter(|e| e.hash == hash)
    }

    fn store(&mut self, entry: TranspositionEntry) {
        let idx = self.index(entry.hash);
        let replace = match &self.slots[idx] {
            None => true,
            Some(existing) => existing.hash != entry.hash || entry.depth >= existing.depth,
        };
        if replace {
            self.slots[idx] = Some(entry);
        }
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

/// Negamax alpha-beta searcher with quiescence, move ordering, and a
/// transposition table. Holds its own node counter and clock, so a fresh
/// [`Searcher`] should be built per search (the transposition table may be
/// reused across searches via [`Searcher::reuse_table`]).
pub struct Searcher {
    nodes: u64,
    start_time: Instant,
    limits: SearchLimits,
    stop: Arc<AtomicBool>,
    tt: TranspositionTable,
}

impl Searcher {
    /// Creates a searcher with a fresh transposition table.
    pub fn new(limits: SearchLimits, stop: Arc<AtomicBool>) -> Self {
        let tt = TranspositionTable::new(limits.tt_capacity);
        Searcher {
            nodes: 0,
            start_time: Instant::now(),
            limits,
            stop,
            tt,
        }
    }

    /// Replaces this searcher's transposition table with one carried over
    /// from a previous search, so entries survive between moves.
    pub fn reuse_table(&mut self, mut other: Searcher) {
        std::mem::swap(&mut self.tt, &mut other.tt);
    }

    /// Clears the transposition table (called on game reset).
    pub fn clear_table(&mut self) {
        self.tt.clear();
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.start_time.elapsed() > self.limits.max_time
    }

    fn check_time(&mut self) -> bool {
        if self.nodes % 4096 == 0 && self.should_stop() {
            self.stop.store(true, Ordering::Relaxed);
        }
        self.stop.load(Ordering::Relaxed)
    }

    /// Runs iterative deepening up to `limits.max_depth`, returning the best
    /// move found before the time budget or cancellation token fires.
    pub fn search(&mut self, board: &mut Board) -> SearchResult {
        self.nodes = 0;
        self.start_time = Instant::now();

        let root_moves = generate_legal_moves(board);
        if root_moves.is_empty() {
            return SearchResult {
                best_move: None,
                score: 0,
                depth: 0,
                nodes: 0,
            };
        }

        let mut result = SearchResult {
            best_move: Some(root_moves[0]),
            score: evaluate(board),
            depth: 0,
            nodes: 0,
        };

        for depth in 1..=self.limits.max_depth {
            let iteration = self.search_root(board, &root_moves, depth);
            if self.stop.load(Ordering::Relaxed) && iteration.best_move.is_none() {
                break;
            }
            if let Some(best_move) = iteration.best_move {
                result = SearchResult {
                    best_move: Some(best_move),
                    score: iteration.score,
                    depth,
                    nodes: self.nodes,
                };
                tracing::debug!(
                    depth,
                    score = iteration.score,
                    nodes = self.nodes,
                    elapsed_ms = self.start_time.elapsed().as_millis() as u64,
                    best_move = %best_move,
                    "iterative deepening step"
                );
            }
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
        }

        result
    }

    /// Scores every legal root move at the searcher's configured depth and
    /// returns up to `k` of them, best first. Used by difficulty-weighted
    /// move selection rather than by the main search loop: unlike
    /// [`Self::search`], every candidate is searched with a full window so
    /// the scores are comparable against each other, not just against alpha.
    pub fn search_top_k(&mut self, board: &mut Board, k: usize) -> Vec<(Move, i32)> {
        self.nodes = 0;
        self.start_time = Instant::now();

        let root_moves = generate_legal_moves(board);
        if root_moves.is_empty() {
            return Vec::new();
        }

        let hash_move = self.tt.probe(board.hash()).and_then(|e| e.best_move);
        let ordered = order_moves(board, &root_moves, hash_move);
        let window = CHECKMATE_SCORE + 1;
        let depth = self.limits.max_depth.saturating_sub(1);

        let mut scored = Vec::with_capacity(ordered.len());
        for m in ordered {
            board.make_move(m);
            let score = -self.alpha_beta(board, depth, 1, -window, window);
            board.unmake_move();
            scored.push((m, score));
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
        }

        scored.sort_by_key(|&(_, s)| -s);
        scored.truncate(k.max(1));
        scored
    }

    fn search_root(&mut self, board: &mut Board, root_moves: &MoveList, depth: u32) -> SearchResult {
        let hash_move = self.tt.probe(board.hash()).and_then(|e| e.best_move);
        let ordered = order_moves(board, root_moves, hash_move);

        let mut alpha = -CHECKMATE_SCORE - 1;
        let beta = CHECKMATE_SCORE + 1;
        let mut best_move = None;
        let mut best_score = alpha;

        for m in ordered {
            board.make_move(m);
            let score = -self.alpha_beta(board, depth - 1, 1, -beta, -alpha);
            board.unmake_move();

            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            if score > best_score || best_move.is_none() {
                best_score = score;
                best_move = Some(m);
            }
            if score > alpha {
                alpha = score;
            }
        }

        if let Some(m) = best_move {
            self.tt.store(TranspositionEntry {
                hash: board.hash(),
                depth,
                score: best_score,
                node_type: NodeType::Exact,
                best_move: Some(m),
            });
        }

        SearchResult {
            best_move,
            score: best_score,
            depth,
            nodes: self.nodes,
        }
    }

    fn alpha_beta(&mut self, board: &mut Board, depth: u32, ply: u32, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        if self.check_time() {
            return evaluate(board);
        }

        let original_alpha = alpha;
        let hash = board.hash();
        let hash_move = if let Some(entry) = self.tt.probe(hash) {
            if entry.depth >= depth {
                match entry.node_type {
                    NodeType::Exact => return entry.score,
                    NodeType::Alpha if entry.score <= alpha => return alpha,
                    NodeType::Beta if entry.score >= beta => return beta,
                    _ => {}
                }
            }
            entry.best_move
        } else {
            None
        };

        if depth == 0 {
            return self.quiescence(board, alpha, beta);
        }

        let moves = generate_legal_moves(board);
        if moves.is_empty() {
            return if is_king_attacked(board, board.side_to_move()) {
                -CHECKMATE_SCORE + ply as i32
            } else {
                0
            };
        }

        let ordered = order_moves(board, &moves, hash_move);
        let mut best_score = -CHECKMATE_SCORE - 1;
        let mut best_move = ordered[0];

        for m in ordered {
            board.make_move(m);
            let score = -self.alpha_beta(board, depth - 1, ply + 1, -beta, -alpha);
            board.unmake_move();

            if score > best_score {
                best_score = score;
                best_move = m;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        let node_type = if best_score <= original_alpha {
            NodeType::Alpha
        } else if best_score >= beta {
            NodeType::Beta
        } else {
            NodeType::Exact
        };
        self.tt.store(TranspositionEntry {
            hash,
            depth,
            score: best_score,
            node_type,
            best_move: Some(best_move),
        });

        best_score
    }

    /// Extends search through capture sequences to avoid the horizon effect.
    fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        if self.check_time() {
            return evaluate(board);
        }

        let stand_pat = evaluate(board);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let captures = generate_capture_moves(board);
        let ordered = order_captures(board, &captures);

        for m in ordered {
            board.make_move(m);
            let score = -self.quiescence(board, -beta, -alpha);
            board.unmake_move();

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// Orders moves for search: hash move first, then captures by MVV-LVA, then
/// moves that deliver check, then the remaining quiet moves.
fn order_moves(board: &mut Board, moves: &MoveList, hash_move: Option<Move>) -> Vec<Move> {
    let mut hash_tier = Vec::new();
    let mut captures = Vec::new();
    let mut checks = Vec::new();
    let mut quiet = Vec::new();

    for &m in moves.as_slice() {
        if Some(m) == hash_move {
            hash_tier.push(m);
        } else if m.flag().is_capture() {
            captures.push(m);
        } else {
            board.make_move(m);
            let gives_check = is_king_attacked(board, board.side_to_move());
            board.unmake_move();
            if gives_check {
                checks.push(m);
            } else {
                quiet.push(m);
            }
        }
    }

    captures.sort_by_key(|&m| -mvv_lva_score(board, m));

    hash_tier
        .into_iter()
        .chain(captures)
        .chain(checks)
        .chain(quiet)
        .collect()
}

fn order_captures(board: &Board, moves: &MoveList) -> Vec<Move> {
    let mut captures: Vec<Move> = moves.as_slice().to_vec();
    captures.sort_by_key(|&m| -mvv_lva_score(board, m));
    captures
}

/// Most-valuable-victim-minus-least-valuable-attacker capture ordering score.
fn mvv_lva_score(board: &Board, m: Move) -> i32 {
    use crate::eval::piece_value;

    let victim_value = if m.flag() == chess_core::MoveFlag::EnPassant {
        piece_value(chess_core::Kind::Pawn)
    } else {
        board
            .piece_at(m.to())
            .and_then(|p| p.kind())
            .map(piece_value)
            .unwrap_or(0)
    };
    let attacker_value = board
        .piece_at(m.from())
        .and_then(|p| p.kind())
        .map(piece_value)
        .unwrap_or(0);

    victim_value * 10 - attacker_value
}
