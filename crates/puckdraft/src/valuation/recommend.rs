// Pick suggestions for the human team.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cpu::{score, CpuStrategy};
use crate::draft::pick::{DraftPlayer, Position};
use crate::draft::roster::{RosterConfig, TeamRoster};

/// Why a player is being suggested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationReason {
    /// Fills an unfilled primary position.
    CriticalNeed(Position),
    /// ADP within 10 picks after the current pick.
    NearAdp,
    /// ADP within 20 picks after the current pick.
    ModerateValue,
    /// Has an open slot, though not a critical one.
    OpenSlot(Position),
    BestAvailable,
}

impl RecommendationReason {
    /// Human-readable justification shown next to the suggestion.
    pub fn describe(&self) -> String {
        match self {
            RecommendationReason::CriticalNeed(pos) => format!("Fills critical need at {pos}"),
            RecommendationReason::NearAdp => "Great value near ADP".to_string(),
            RecommendationReason::ModerateValue => "Solid value for this pick".to_string(),
            RecommendationReason::OpenSlot(pos) => format!("Fills open {pos} slot"),
            RecommendationReason::BestAvailable => "Best available".to_string(),
        }
    }
}

/// A suggested player with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub player: Arc<DraftPlayer>,
    pub score: f64,
    pub reason: RecommendationReason,
}

fn reason_for(
    player: &DraftPlayer,
    roster: &TeamRoster,
    config: &RosterConfig,
    current_pick: usize,
) -> RecommendationReason {
    if let Some(pos) = roster
        .critical_needs(config)
        .into_iter()
        .find(|&pos| player.holds(pos))
    {
        return RecommendationReason::CriticalNeed(pos);
    }

    let pick = current_pick as f64;
    if player.adp <= pick + 10.0 {
        return RecommendationReason::NearAdp;
    }
    if player.adp <= pick + 20.0 {
        return RecommendationReason::ModerateValue;
    }

    match roster.slot_for(player, config) {
        Some(pos) if pos != Position::Bench => RecommendationReason::OpenSlot(pos),
        _ => RecommendationReason::BestAvailable,
    }
}

/// Score every available player the user's roster has room for and return
/// the top `count`, best first.
pub fn recommend<R: Rng>(
    available: &[Arc<DraftPlayer>],
    roster: &TeamRoster,
    config: &RosterConfig,
    current_pick: usize,
    strategy: &CpuStrategy,
    count: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    let mut scored: Vec<(f64, &Arc<DraftPlayer>)> = available
        .iter()
        .filter(|p| roster.has_slot_for(p, config))
        .map(|p| (score(p, roster, config, current_pick, strategy, rng), p))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(count)
        .map(|(score, player)| Recommendation {
            reason: reason_for(player, roster, config, current_pick),
            player: Arc::clone(player),
            score,
        })
        .collect()
}
