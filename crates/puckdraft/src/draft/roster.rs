// Roster construction and slot assignment.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pick::{DraftPlayer, Position, PRIMARY_POSITIONS};
use super::state::{DraftError, MAX_ROUNDS};

/// Raised when a pick has nowhere to go on the team's roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no open roster slot on team {team_idx} for player {player_id}")]
pub struct RosterFull {
    pub team_idx: usize,
    pub player_id: String,
}

// ---------------------------------------------------------------------------
// RosterConfig
// ---------------------------------------------------------------------------

/// Slot capacity per position. Positions absent from the map have zero slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    capacities: HashMap<Position, usize>,
}

impl RosterConfig {
    pub fn new(entries: &[(Position, usize)]) -> Self {
        RosterConfig {
            capacities: entries.iter().copied().collect(),
        }
    }

    /// Build from the `[league.roster]` table, e.g. `{"C": 2, "D": 4, "BN": 2}`.
    ///
    /// Each position may hold at most `MAX_ROUNDS` slots, so totals cannot
    /// overflow.
    pub fn from_map(roster: &HashMap<String, usize>) -> Result<Self, DraftError> {
        let mut capacities: HashMap<Position, usize> = HashMap::new();
        for (key, &count) in roster {
            let pos = Position::from_str_pos(key).ok_or_else(|| DraftError::InvalidSettings {
                field: format!("roster.{key}"),
                message: "unknown roster position".into(),
            })?;
            let slots = capacities.entry(pos).or_insert(0);
            *slots = slots.saturating_add(count);
            if *slots > MAX_ROUNDS {
                return Err(DraftError::InvalidSettings {
                    field: format!("roster.{key}"),
                    message: format!("at most {MAX_ROUNDS} slots allowed, got {}", *slots),
                });
            }
        }
        Ok(RosterConfig { capacities })
    }

    pub fn capacity(&self, pos: Position) -> usize {
        self.capacities.get(&pos).copied().unwrap_or(0)
    }

    /// Total slots per team, which is also the number of draft rounds.
    pub fn total(&self) -> usize {
        self.capacities
            .values()
            .fold(0usize, |acc, &n| acc.saturating_add(n))
    }
}

// ---------------------------------------------------------------------------
// TeamRoster
// ---------------------------------------------------------------------------

/// One drafting team and the players it has taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team_idx: usize,
    pub name: String,
    pub is_human: bool,
    /// Drafted players in pick order.
    pub picks: Vec<Arc<DraftPlayer>>,
    /// Slot each entry of `picks` occupies.
    pub slots: Vec<Position>,
    filled: HashMap<Position, usize>,
}

impl TeamRoster {
    pub fn new(team_idx: usize, name: &str, is_human: bool) -> Self {
        TeamRoster {
            team_idx,
            name: name.to_string(),
            is_human,
            picks: Vec::new(),
            slots: Vec::new(),
            filled: HashMap::new(),
        }
    }

    pub fn filled(&self, pos: Position) -> usize {
        self.filled.get(&pos).copied().unwrap_or(0)
    }

    /// Sum of filled counts across all positions.
    pub fn total_filled(&self) -> usize {
        self.filled.values().sum()
    }

    /// Open slots left at `pos`.
    pub fn remaining(&self, pos: Position, config: &RosterConfig) -> usize {
        config.capacity(pos).saturating_sub(self.filled(pos))
    }

    pub fn has_capacity(&self, pos: Position, config: &RosterConfig) -> bool {
        self.filled(pos) < config.capacity(pos)
    }

    /// Picks this team still has to make.
    pub fn picks_remaining(&self, config: &RosterConfig) -> usize {
        config.total().saturating_sub(self.picks.len())
    }

    /// Primary positions with configured slots that are not yet filled.
    pub fn critical_needs(&self, config: &RosterConfig) -> Vec<Position> {
        PRIMARY_POSITIONS
            .iter()
            .copied()
            .filter(|&pos| config.capacity(pos) > 0 && self.has_capacity(pos, config))
            .collect()
    }

    pub fn has_critical_positional_needs(&self, config: &RosterConfig) -> bool {
        !self.critical_needs(config).is_empty()
    }

    /// Slots `player` could occupy right now: eligible and not at capacity.
    pub fn eligible_positions(&self, player: &DraftPlayer, config: &RosterConfig) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|&pos| player.can_fill(pos) && self.has_capacity(pos, config))
            .collect()
    }

    /// Whether the player has at least one open slot on this roster.
    pub fn has_slot_for(&self, player: &DraftPlayer, config: &RosterConfig) -> bool {
        Position::ALL
            .iter()
            .any(|&pos| player.can_fill(pos) && self.has_capacity(pos, config))
    }

    /// Pick the slot a player would occupy, without mutating the roster.
    ///
    /// Slot assignment priority:
    /// 1. A primary position the player holds, checked C, LW, RW, D, G
    /// 2. The forward-flex slot, for any C/LW/RW
    /// 3. UTIL
    /// 4. Bench
    pub fn slot_for(&self, player: &DraftPlayer, config: &RosterConfig) -> Option<Position> {
        let primary = PRIMARY_POSITIONS
            .iter()
            .copied()
            .find(|&pos| player.holds(pos) && self.has_capacity(pos, config));
        if primary.is_some() {
            return primary;
        }

        if player.is_forward() && self.has_capacity(Position::Forward, config) {
            return Some(Position::Forward);
        }

        [Position::Utility, Position::Bench]
            .into_iter()
            .find(|&pos| self.has_capacity(pos, config))
    }

    /// Assign `player` to a slot, incrementing exactly one filled count.
    pub fn assign(&mut self, player: &DraftPlayer, config: &RosterConfig) -> Result<Position, RosterFull> {
        let pos = self.slot_for(player, config).ok_or_else(|| RosterFull {
            team_idx: self.team_idx,
            player_id: player.id.clone(),
        })?;
        *self.filled.entry(pos).or_insert(0) += 1;
        Ok(pos)
    }

    /// Assign a slot and append the player to the pick list.
    ///
    /// The player is appended even when no slot is open so the pick list
    /// keeps matching the draft order; the error is returned to the caller.
    pub fn add_pick(&mut self, player: Arc<DraftPlayer>, config: &RosterConfig) -> Result<Position, RosterFull> {
        let result = self.assign(&player, config);
        self.slots.push(*result.as_ref().unwrap_or(&Position::Bench));
        self.picks.push(player);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_roster_config() -> RosterConfig {
        RosterConfig::new(&[
            (Position::Center, 2),
            (Position::LeftWing, 2),
            (Position::RightWing, 2),
            (Position::Defense, 4),
            (Position::Goalie, 2),
            (Position::Forward, 1),
            (Position::Utility, 1),
            (Position::Bench, 2),
        ])
    }

    fn player(id: &str, positions: &str) -> DraftPlayer {
        DraftPlayer::new(id, id, "TST", positions, 10.0)
    }

    #[test]
    fn config_total_is_round_count() {
        assert_eq!(test_roster_config().total(), 16);
    }

    #[test]
    fn config_from_map_accepts_aliases_and_rejects_unknown() {
        let mut map = HashMap::new();
        map.insert("C".to_string(), 2);
        map.insert("BE".to_string(), 1);
        map.insert("BN".to_string(), 1);
        let config = RosterConfig::from_map(&map).unwrap();
        assert_eq!(config.capacity(Position::Center), 2);
        assert_eq!(config.capacity(Position::Bench), 2);
        assert_eq!(config.capacity(Position::Goalie), 0);

        map.insert("SS".to_string(), 1);
        let err = RosterConfig::from_map(&map).unwrap_err();
        assert!(matches!(err, DraftError::InvalidSettings { .. }));
    }

    #[test]
    fn config_from_map_rejects_oversized_capacity() {
        let huge = usize::MAX / 2 + 1;
        let map: HashMap<String, usize> =
            [("C".to_string(), huge), ("D".to_string(), huge)].into_iter().collect();
        match RosterConfig::from_map(&map) {
            Err(DraftError::InvalidSettings { field, .. }) => {
                assert!(field == "roster.C" || field == "roster.D", "field {field}");
            }
            other => panic!("expected InvalidSettings, got {other:?}"),
        }

        // Aliases for the same slot are summed before the limit applies.
        let map: HashMap<String, usize> =
            [("BN".to_string(), MAX_ROUNDS), ("BE".to_string(), 1)].into_iter().collect();
        assert!(RosterConfig::from_map(&map).is_err());
    }

    #[test]
    fn config_total_saturates() {
        let config = RosterConfig::new(&[(Position::Center, usize::MAX), (Position::Defense, 2)]);
        assert_eq!(config.total(), usize::MAX);
    }

    #[test]
    fn center_goes_to_center_slot_first() {
        let config = test_roster_config();
        let mut roster = TeamRoster::new(0, "Team 1", false);
        assert_eq!(roster.assign(&player("a", "C"), &config), Ok(Position::Center));
        assert_eq!(roster.assign(&player("b", "C"), &config), Ok(Position::Center));
        assert_eq!(roster.filled(Position::Center), 2);
        assert_eq!(roster.filled(Position::Forward), 0);
    }

    #[test]
    fn dual_eligible_player_takes_open_wing_before_flex() {
        let config = test_roster_config();
        let mut roster = TeamRoster::new(0, "Team 1", false);
        roster.assign(&player("a", "C"), &config).unwrap();
        roster.assign(&player("b", "C"), &config).unwrap();
        assert_eq!(
            roster.assign(&player("c", "C/LW"), &config),
            Ok(Position::LeftWing)
        );
    }

    #[test]
    fn forward_overflows_to_flex_then_util_then_bench() {
        let config = test_roster_config();
        let mut roster = TeamRoster::new(0, "Team 1", false);
        for id in ["a", "b"] {
            assert_eq!(roster.assign(&player(id, "RW"), &config), Ok(Position::RightWing));
        }
        assert_eq!(roster.assign(&player("c", "RW"), &config), Ok(Position::Forward));
        assert_eq!(roster.assign(&player("d", "RW"), &config), Ok(Position::Utility));
        assert_eq!(roster.assign(&player("e", "RW"), &config), Ok(Position::Bench));
        assert_eq!(roster.assign(&player("f", "RW"), &config), Ok(Position::Bench));
        assert_eq!(
            roster.assign(&player("g", "RW"), &config),
            Err(RosterFull { team_idx: 0, player_id: "g".into() })
        );
    }

    #[test]
    fn defenseman_skips_forward_flex() {
        let config = RosterConfig::new(&[
            (Position::Defense, 1),
            (Position::Forward, 1),
            (Position::Utility, 1),
        ]);
        let mut roster = TeamRoster::new(0, "Team 1", false);
        assert_eq!(roster.assign(&player("a", "D"), &config), Ok(Position::Defense));
        assert_eq!(roster.assign(&player("b", "D"), &config), Ok(Position::Utility));
        assert!(roster.assign(&player("c", "D"), &config).is_err());
        assert_eq!(roster.filled(Position::Forward), 0);
    }

    #[test]
    fn each_assignment_adds_exactly_one() {
        let config = test_roster_config();
        let mut roster = TeamRoster::new(0, "Team 1", false);
        let positions = ["C", "LW/RW", "D", "G", "C/RW", "D", "G", "LW"];
        for (i, pos) in positions.iter().enumerate() {
            roster.assign(&player(&i.to_string(), pos), &config).unwrap();
            assert_eq!(roster.total_filled(), i + 1);
        }
        for pos in Position::ALL {
            assert!(roster.filled(pos) <= config.capacity(pos));
        }
    }

    #[test]
    fn critical_needs_ignore_zero_capacity_and_flex() {
        let config = RosterConfig::new(&[
            (Position::Center, 1),
            (Position::Defense, 1),
            (Position::Forward, 1),
        ]);
        let mut roster = TeamRoster::new(0, "Team 1", false);
        assert_eq!(
            roster.critical_needs(&config),
            vec![Position::Center, Position::Defense]
        );
        roster.assign(&player("a", "C"), &config).unwrap();
        roster.assign(&player("b", "D"), &config).unwrap();
        assert!(!roster.has_critical_positional_needs(&config));
        // F is still open but is never a critical need.
        assert!(roster.has_capacity(Position::Forward, &config));
    }

    #[test]
    fn eligible_positions_respects_capacity() {
        let config = RosterConfig::new(&[(Position::Center, 1), (Position::Utility, 1)]);
        let mut roster = TeamRoster::new(0, "Team 1", false);
        let center = player("a", "C");
        assert_eq!(
            roster.eligible_positions(&center, &config),
            vec![Position::Center, Position::Utility]
        );
        roster.assign(&center, &config).unwrap();
        assert_eq!(roster.eligible_positions(&center, &config), vec![Position::Utility]);
        assert!(!roster.has_slot_for(&player("g", "G"), &RosterConfig::new(&[(Position::Center, 1)])));
    }

    #[test]
    fn add_pick_keeps_pick_list_and_slots_aligned() {
        let config = RosterConfig::new(&[(Position::Center, 1)]);
        let mut roster = TeamRoster::new(3, "Team 4", true);
        assert_eq!(
            roster.add_pick(Arc::new(player("a", "C")), &config),
            Ok(Position::Center)
        );
        assert!(roster.add_pick(Arc::new(player("b", "C")), &config).is_err());
        assert_eq!(roster.picks.len(), 2);
        assert_eq!(roster.slots.len(), 2);
        assert_eq!(roster.total_filled(), 1);
    }
}
