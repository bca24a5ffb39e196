// CPU opponent pick logic.
//
// Each candidate gets a weighted blend of four signals: how close its ADP is
// to the current pick, how badly the roster needs its positions, a static
// ADP-based quality proxy, and a random jitter so repeated simulations do
// not play out identically. Position multipliers then nudge goalies later
// and premium skaters earlier.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::draft::pick::{DraftPlayer, Position, PRIMARY_POSITIONS};
use crate::draft::roster::{RosterConfig, TeamRoster};

// ---------------------------------------------------------------------------
// Strategy knobs
// ---------------------------------------------------------------------------

/// Weights of the four scoring signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuWeights {
    pub adp: f64,
    pub need: f64,
    pub value: f64,
    pub randomness: f64,
}

impl Default for CpuWeights {
    fn default() -> Self {
        CpuWeights {
            adp: 0.50,
            need: 0.30,
            value: 0.15,
            randomness: 0.05,
        }
    }
}

/// Tunable CPU drafting behaviour, loaded from `[cpu]` in strategy.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuStrategy {
    #[serde(flatten)]
    pub weights: CpuWeights,
    /// Goalies are discounted before this overall pick.
    pub goalie_delay_before_pick: usize,
    pub goalie_penalty: f64,
    /// Centers and defensemen are boosted before this overall pick.
    pub premium_before_pick: usize,
    pub center_boost: f64,
    pub defense_boost: f64,
    /// Share of a team's picks after which critical needs restrict the pool.
    pub late_draft_fraction: f64,
    /// Delay before a CPU team makes its selection.
    pub cpu_delay_ms: u64,
    /// How many suggestions to show the user.
    pub recommendation_count: usize,
}

impl Default for CpuStrategy {
    fn default() -> Self {
        CpuStrategy {
            weights: CpuWeights::default(),
            goalie_delay_before_pick: 50,
            goalie_penalty: 0.4,
            premium_before_pick: 30,
            center_boost: 1.1,
            defense_boost: 1.05,
            late_draft_fraction: 0.5,
            cpu_delay_ms: 1500,
            recommendation_count: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// `max(0, 100 - 2 * |adp - pick|)`.
pub fn adp_proximity(player: &DraftPlayer, current_pick: usize) -> f64 {
    (100.0 - 2.0 * (player.adp - current_pick as f64).abs()).max(0.0)
}

/// Largest single need contribution among the slots the player can fill.
///
/// Primary positions count 20 per open slot, the forward flex 15 and UTIL 5.
/// Contributions are not summed across positions.
pub fn positional_need(player: &DraftPlayer, roster: &TeamRoster, config: &RosterConfig) -> f64 {
    let mut best = 0.0_f64;

    for &pos in &PRIMARY_POSITIONS {
        if player.holds(pos) {
            best = best.max(roster.remaining(pos, config) as f64 * 20.0);
        }
    }
    if player.is_forward() {
        best = best.max(roster.remaining(Position::Forward, config) as f64 * 15.0);
    }
    best.max(roster.remaining(Position::Utility, config) as f64 * 5.0)
}

/// `max(0, 200 - adp)`.
pub fn raw_value(player: &DraftPlayer) -> f64 {
    (200.0 - player.adp).max(0.0)
}

/// Whether the team must spend its remaining picks on goalies to fill its
/// goalie slots.
fn goalie_need_is_urgent(roster: &TeamRoster, config: &RosterConfig) -> bool {
    let open = roster.remaining(Position::Goalie, config);
    open > 0 && open >= roster.picks_remaining(config)
}

/// Score a single candidate for a CPU team.
pub fn score<R: Rng>(
    player: &DraftPlayer,
    roster: &TeamRoster,
    config: &RosterConfig,
    current_pick: usize,
    strategy: &CpuStrategy,
    rng: &mut R,
) -> f64 {
    let w = &strategy.weights;
    let jitter = if w.randomness > 0.0 {
        rng.random_range(0.0..100.0)
    } else {
        0.0
    };

    let mut total = adp_proximity(player, current_pick) * w.adp
        + positional_need(player, roster, config) * w.need
        + raw_value(player) * w.value
        + jitter * w.randomness;

    if player.is_goalie()
        && current_pick < strategy.goalie_delay_before_pick
        && !goalie_need_is_urgent(roster, config)
    {
        total *= strategy.goalie_penalty;
    }

    if current_pick < strategy.premium_before_pick {
        if player.holds(Position::Center) {
            total *= strategy.center_boost;
        } else if player.holds(Position::Defense) {
            total *= strategy.defense_boost;
        }
    }

    total
}

/// Whether the player holds any of the given positions.
fn fills_any(player: &DraftPlayer, needs: &[Position]) -> bool {
    needs.iter().any(|&pos| player.holds(pos))
}

/// Keep only candidates that still have an open slot, unless none do.
fn with_open_slot<'a>(
    candidates: &'a [Arc<DraftPlayer>],
    roster: &TeamRoster,
    config: &RosterConfig,
) -> Vec<&'a Arc<DraftPlayer>> {
    let fits: Vec<_> = candidates
        .iter()
        .filter(|p| roster.has_slot_for(p, config))
        .collect();
    if fits.is_empty() {
        candidates.iter().collect()
    } else {
        fits
    }
}

/// Fraction of this team's roster already drafted.
fn draft_progress(roster: &TeamRoster, config: &RosterConfig) -> f64 {
    match config.total() {
        0 => 1.0,
        total => roster.picks.len() as f64 / total as f64,
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Choose the best candidate for a CPU team.
///
/// Once the team is past `late_draft_fraction` of its picks, candidates are
/// narrowed to players that fill an unfilled primary position (when any
/// exist). Returns `None` only for an empty candidate list.
pub fn select_best<R: Rng>(
    candidates: &[Arc<DraftPlayer>],
    roster: &TeamRoster,
    config: &RosterConfig,
    current_pick: usize,
    strategy: &CpuStrategy,
    rng: &mut R,
) -> Option<Arc<DraftPlayer>> {
    let mut pool = with_open_slot(candidates, roster, config);

    let needs = roster.critical_needs(config);
    if !needs.is_empty() && draft_progress(roster, config) > strategy.late_draft_fraction {
        let needed: Vec<_> = pool
            .iter()
            .copied()
            .filter(|p| fills_any(p, &needs))
            .collect();
        if !needed.is_empty() {
            pool = needed;
        }
    }

    let mut scored: Vec<(f64, &Arc<DraftPlayer>)> = pool
        .into_iter()
        .map(|p| (score(p, roster, config, current_pick, strategy, rng), p))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let (best_score, best) = scored.into_iter().next()?;
    debug!(
        "{} selects {} ({}) at pick {} with score {:.1}",
        roster.name, best.name, best.raw_positions, current_pick, best_score
    );
    Some(Arc::clone(best))
}

/// Timer-expiry policy: lowest ADP among players filling a critical need,
/// or lowest ADP overall when the roster has none.
pub fn auto_pick_choice(
    available: &[Arc<DraftPlayer>],
    roster: &TeamRoster,
    config: &RosterConfig,
) -> Option<Arc<DraftPlayer>> {
    let pool = with_open_slot(available, roster, config);
    let needs = roster.critical_needs(config);

    if !needs.is_empty() {
        let pick = lowest_adp(pool.iter().copied().filter(|p| fills_any(p, &needs)));
        if pick.is_some() {
            return pick;
        }
    }
    lowest_adp(pool.into_iter())
}

fn lowest_adp<'a>(players: impl Iterator<Item = &'a Arc<DraftPlayer>>) -> Option<Arc<DraftPlayer>> {
    players
        .min_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(Ordering::Equal))
        .cloned()
}
