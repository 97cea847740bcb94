//! Difficulty-weighted move selection, applied outside the search itself.
//!
//! The search engine is deterministic; weaker difficulty levels are produced
//! by scoring several root moves and sampling among them rather than always
//! playing the top-scored one. Sampling uses a caller-supplied seed, so a
//! given seed reproduces the same choice for the same candidate list.

use chess_core::Move;

/// Seeded xorshift64 generator, the same construction
/// [`chess_engine`]'s Zobrist keys use, reused here at runtime rather than
/// at compile time since each selection draws a fresh value from caller state.
struct Xorshift64(u64);

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Xorshift64(if seed == 0 { 0x9E3779B97F4A7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Returns a pseudo-random value in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Picks one move from a list of `(move, score)` candidates sorted best-first,
/// weighting each by `exp(-delta * randomisation_factor)` where `delta` is
/// the score gap to the best candidate. A factor of `f64::INFINITY` always
/// picks the best move (every other weight collapses to zero).
///
/// Returns `None` if `candidates` is empty.
pub fn select_weighted(candidates: &[(Move, i32)], randomisation_factor: f64, seed: u64) -> Option<Move> {
    let (&(best_move, best_score), rest) = candidates.split_first()?;
    if rest.is_empty() || randomisation_factor.is_infinite() {
        return Some(best_move);
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|&(_, score)| {
            let delta = (best_score - score) as f64;
            (-delta * randomisation_factor).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Some(best_move);
    }

    let mut rng = Xorshift64::new(seed);
    let mut draw = rng.next_f64() * total;
    for (&(m, _), weight) in candidates.iter().zip(weights.iter()) {
        if draw < *weight {
            return Some(m);
        }
        draw -= weight;
    }
    Some(best_move)
}
