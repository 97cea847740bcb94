//! Game configuration types passed into [`crate::controller::GameController::initialize_game`].

use chess_core::Color;
use chess_engine::SearchLimits;
use std::time::Duration;

/// How a game's two sides are controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Both sides are played on this device, taking turns on one board.
    LocalCoop,
    /// One side is the local player, the other is the engine.
    VsCPU,
    /// One side is the local player, the other is a remote peer.
    Multiplayer,
}

/// Engine strength presets. Maps to a search depth and to whether move
/// selection is randomised among near-equal candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuDifficulty {
    /// Shallow search, heavily randomised move choice.
    Random,
    /// Shallow search, some randomisation among top candidates.
    Easy,
    /// Moderate search depth, little randomisation.
    Medium,
    /// Full search depth, deterministic best move.
    Hard,
}

impl CpuDifficulty {
    /// Search limits to run for this difficulty.
    pub fn search_limits(self) -> SearchLimits {
        let defaults = SearchLimits::default();
        let max_depth = match self {
            CpuDifficulty::Random => 2,
            CpuDifficulty::Easy => 3,
            CpuDifficulty::Medium => 5,
            CpuDifficulty::Hard => defaults.max_depth,
        };
        let max_time = match self {
            CpuDifficulty::Random | CpuDifficulty::Easy => Duration::from_millis(200),
            CpuDifficulty::Medium => Duration::from_millis(500),
            CpuDifficulty::Hard => defaults.max_time,
        };
        SearchLimits {
            max_depth,
            max_time,
            ..defaults
        }
    }

    /// Number of top-scored root moves offered to the randomised selector,
    /// and the `randomisationFactor` controlling how sharply it favours the
    /// best move. `Hard` disables randomisation entirely (a single candidate).
    pub fn randomisation(self) -> (usize, f64) {
        match self {
            CpuDifficulty::Random => (8, 0.01),
            CpuDifficulty::Easy => (5, 0.03),
            CpuDifficulty::Medium => (3, 0.08),
            CpuDifficulty::Hard => (1, f64::INFINITY),
        }
    }
}

/// Configuration for a single game, supplied to `initialize_game`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfiguration {
    pub mode: GameMode,
    pub local_player_side: Color,
    pub cpu_difficulty: CpuDifficulty,
}

impl Default for GameConfiguration {
    fn default() -> Self {
        GameConfiguration {
            mode: GameMode::LocalCoop,
            local_player_side: Color::White,
            cpu_difficulty: CpuDifficulty::Medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_local_coop() {
        let config = GameConfiguration::default();
        assert_eq!(config.mode, GameMode::LocalCoop);
        assert_eq!(config.local_player_side, Color::White);
    }

    #[test]
    fn hard_difficulty_disables_randomisation_spread() {
        let (k, _) = CpuDifficulty::Hard.randomisation();
        assert_eq!(k, 1);
    }

    #[test]
    fn difficulty_depths_increase_with_strength() {
        assert!(
            CpuDifficulty::Random.search_limits().max_depth
                <= CpuDifficulty::Easy.search_limits().max_depth
        );
        assert!(
            CpuDifficulty::Easy.search_limits().max_depth
                <= CpuDifficulty::Medium.search_limits().max_depth
        );
        assert!(
            CpuDifficulty::Medium.search_limits().max_depth
                <= CpuDifficulty::Hard.search_limits().max_depth
        );
    }
}
