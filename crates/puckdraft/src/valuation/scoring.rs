// Fantasy points model over season box-score lines.

use serde::{Deserialize, Serialize};

use crate::draft::pick::DraftPlayer;

/// Points awarded per unit of each stat, from `[scoring]` in strategy.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub goals: f64,
    pub assists: f64,
    pub plus_minus: f64,
    pub penalty_minutes: f64,
    pub power_play_points: f64,
    pub shots: f64,
    pub hits: f64,
    pub blocks: f64,
    pub wins: f64,
    pub saves: f64,
    pub goals_against: f64,
    pub shutouts: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            goals: 2.0,
            assists: 1.0,
            plus_minus: 0.5,
            penalty_minutes: 0.0,
            power_play_points: 0.5,
            shots: 0.1,
            hits: 0.1,
            blocks: 0.5,
            wins: 4.0,
            saves: 0.2,
            goals_against: -1.0,
            shutouts: 3.0,
        }
    }
}

/// Season fantasy points for a player.
///
/// Goalies are scored on the goalie columns only, everyone else on the
/// skater columns.
pub fn fantasy_points(player: &DraftPlayer, weights: &ScoringWeights) -> f64 {
    let s = &player.stats;
    if player.is_goalie() {
        return s.wins as f64 * weights.wins
            + s.saves as f64 * weights.saves
            + s.goals_against as f64 * weights.goals_against
            + s.shutouts as f64 * weights.shutouts;
    }

    s.goals as f64 * weights.goals
        + s.assists as f64 * weights.assists
        + s.plus_minus as f64 * weights.plus_minus
        + s.penalty_minutes as f64 * weights.penalty_minutes
        + s.power_play_points as f64 * weights.power_play_points
        + s.shots as f64 * weights.shots
        + s.hits as f64 * weights.hits
        + s.blocks as f64 * weights.blocks
}

/// Fantasy points per game played, or 0.0 with no games.
pub fn points_per_game(player: &DraftPlayer, weights: &ScoringWeights) -> f64 {
    match player.stats.games_played {
        0 => 0.0,
        gp => fantasy_points(player, weights) / gp as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::SkaterStats;

    fn skater() -> DraftPlayer {
        let mut p = DraftPlayer::new("8478402", "Connor McDavid", "EDM", "C", 1.2);
        p.stats = SkaterStats {
            games_played: 80,
            goals: 40,
            assists: 90,
            points: 130,
            plus_minus: 20,
            penalty_minutes: 30,
            power_play_points: 40,
            shots: 300,
            hits: 40,
            blocks: 20,
            ..SkaterStats::default()
        };
        p
    }

    #[test]
    fn skater_points_use_skater_columns() {
        let pts = fantasy_points(&skater(), &ScoringWeights::default());
        // 80 + 90 + 10 + 0 + 20 + 30 + 4 + 10
        assert!((pts - 244.0).abs() < 1e-9);
    }

    #[test]
    fn goalie_points_ignore_skater_columns() {
        let mut g = DraftPlayer::new("8476945", "Connor Hellebuyck", "WPG", "G", 20.0);
        g.stats = SkaterStats {
            games_played: 60,
            wins: 40,
            saves: 1500,
            goals_against: 130,
            shutouts: 5,
            goals: 1,
            ..SkaterStats::default()
        };
        let pts = fantasy_points(&g, &ScoringWeights::default());
        // 160 + 300 - 130 + 15
        assert!((pts - 345.0).abs() < 1e-9);
    }

    #[test]
    fn points_per_game_handles_no_games() {
        let weights = ScoringWeights::default();
        assert!((points_per_game(&skater(), &weights) - 3.05).abs() < 1e-9);
        let rookie = DraftPlayer::new("1", "Rookie", "SJS", "C", 150.0);
        assert_eq!(points_per_game(&rookie, &weights), 0.0);
    }
}
