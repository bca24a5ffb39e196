// Message types exchanged between the app loop and the presentation layer.
//
// Commands flow in as `UserCommand`; the app answers with `UiUpdate`s that
// carry a self-contained `DraftSnapshot`, so a front end never needs to
// reach into `DraftState` directly.

use serde::Serialize;

use crate::draft::pick::{DraftPick, DraftPlayer, Position};
use crate::draft::state::{DraftPhase, DraftState, DraftTab};
use crate::valuation::recommend::Recommendation;
use crate::valuation::scoring::{fantasy_points, ScoringWeights};

// ---------------------------------------------------------------------------
// Commands and updates
// ---------------------------------------------------------------------------

/// Requests from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// (Re)build the league from the loaded config and player pool.
    InitializeLeague,
    StartDraft,
    MakePick { player_id: String },
    ChangeTab(DraftTab),
    ResetDraft,
    Quit,
}

/// Pushed to the presentation layer after every state change.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<DraftSnapshot>),
    /// One-line status message, e.g. a rejected command.
    Notice(String),
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An available or drafted player as shown in lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    pub id: String,
    pub name: String,
    pub team: String,
    pub positions: String,
    pub adp: f64,
    pub fantasy_points: f64,
}

impl PlayerRow {
    fn from_player(player: &DraftPlayer, scoring: &ScoringWeights) -> Self {
        PlayerRow {
            id: player.id.clone(),
            name: player.name.clone(),
            team: player.team.clone(),
            positions: player.raw_positions.clone(),
            adp: player.adp,
            fantasy_points: fantasy_points(player, scoring),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickSummary {
    pub pick_number: usize,
    pub round: usize,
    pub pick_in_round: usize,
    pub team_idx: usize,
    pub team_name: String,
    pub is_user_pick: bool,
    pub player: Option<PlayerRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub slot: Position,
    pub player: PlayerRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team_idx: usize,
    pub name: String,
    pub is_human: bool,
    pub roster: Vec<RosterEntry>,
    /// Primary positions with open slots.
    pub needs: Vec<Position>,
    pub picks_remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub player: PlayerRow,
    pub score: f64,
    pub reason: String,
}

/// Everything a front end needs to render the current draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSnapshot {
    pub initialized: bool,
    pub phase: DraftPhase,
    pub tab: DraftTab,
    pub num_teams: usize,
    pub num_rounds: usize,
    pub total_picks: usize,
    pub picks_made: usize,
    /// The slot on the clock, if the draft is not complete.
    pub on_the_clock: Option<PickSummary>,
    pub is_user_turn: bool,
    pub timer_remaining: u32,
    pub timer_active: bool,
    /// Available players, best ADP first.
    pub available: Vec<PlayerRow>,
    /// Filled slots in pick order.
    pub board: Vec<PickSummary>,
    pub teams: Vec<TeamSummary>,
    pub recommendations: Vec<RecommendationRow>,
}

impl DraftSnapshot {
    pub fn build(
        state: &DraftState,
        scoring: &ScoringWeights,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let pick_summary = |pick: &DraftPick| PickSummary {
            pick_number: pick.pick_number,
            round: pick.round,
            pick_in_round: pick.pick_in_round,
            team_idx: pick.team_idx,
            team_name: state
                .teams
                .get(pick.team_idx)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            is_user_pick: pick.is_user_pick,
            player: pick
                .player
                .as_deref()
                .map(|p| PlayerRow::from_player(p, scoring)),
        };

        let mut available: Vec<PlayerRow> = state
            .available
            .iter()
            .map(|p| PlayerRow::from_player(p, scoring))
            .collect();
        available.sort_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(std::cmp::Ordering::Equal));

        let teams = match state.settings.as_ref() {
            Some(settings) => state
                .teams
                .iter()
                .map(|team| TeamSummary {
                    team_idx: team.team_idx,
                    name: team.name.clone(),
                    is_human: team.is_human,
                    roster: team
                        .slots
                        .iter()
                        .zip(&team.picks)
                        .map(|(&slot, player)| RosterEntry {
                            slot,
                            player: PlayerRow::from_player(player, scoring),
                        })
                        .collect(),
                    needs: team.critical_needs(&settings.roster),
                    picks_remaining: team.picks_remaining(&settings.roster),
                })
                .collect(),
            None => Vec::new(),
        };

        DraftSnapshot {
            initialized: state.settings.is_some(),
            phase: state.phase(),
            tab: state.tab,
            num_teams: state.teams.len(),
            num_rounds: state.settings.as_ref().map_or(0, |s| s.num_rounds()),
            total_picks: state.draft_order.len(),
            picks_made: state.completed_picks().count(),
            on_the_clock: if state.is_draft_complete() {
                None
            } else {
                state.current_pick().map(pick_summary)
            },
            is_user_turn: state.is_user_turn(),
            timer_remaining: state.timer_remaining,
            timer_active: state.timer_active,
            available,
            board: state.completed_picks().map(pick_summary).collect(),
            teams,
            recommendations: recommendations
                .into_iter()
                .map(|rec| RecommendationRow {
                    player: PlayerRow::from_player(&rec.player, scoring),
                    score: rec.score,
                    reason: rec.reason.describe(),
                })
                .collect(),
        }
    }

    pub fn user_team(&self) -> Option<&TeamSummary> {
        self.teams.iter().find(|t| t.is_human)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::roster::RosterConfig;
    use crate::draft::state::LeagueSettings;
    use crate::valuation::cpu::CpuStrategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> DraftState {
        let settings = LeagueSettings {
            num_teams: 2,
            user_position: 2,
            roster: RosterConfig::new(&[(Position::Center, 1), (Position::Goalie, 1)]),
            pick_timer_secs: 45,
            team_names: vec!["Oilers Fan".into()],
            strategy: CpuStrategy::default(),
        };
        let players = vec![
            DraftPlayer::new("g1", "Goalie One", "WPG", "G", 12.0),
            DraftPlayer::new("c1", "Center One", "EDM", "C", 1.0),
            DraftPlayer::new("c2", "Center Two", "TOR", "C", 4.0),
            DraftPlayer::new("g2", "Goalie Two", "NYR", "G", 20.0),
        ];
        let mut state = DraftState::new();
        state.initialize(settings, players).unwrap();
        state
    }

    #[test]
    fn snapshot_before_initialize_is_empty() {
        let snap = DraftSnapshot::build(&DraftState::new(), &ScoringWeights::default(), vec![]);
        assert!(!snap.initialized);
        assert_eq!(snap.phase, DraftPhase::NotStarted);
        assert!(snap.on_the_clock.is_none());
        assert!(snap.teams.is_empty());
        assert!(snap.available.is_empty());
    }

    #[test]
    fn snapshot_reflects_picks_and_rosters() {
        let mut state = state();
        state.start();
        state.make_pick("c1");

        let snap = DraftSnapshot::build(&state, &ScoringWeights::default(), vec![]);
        assert_eq!(snap.picks_made, 1);
        assert_eq!(snap.total_picks, 4);
        assert_eq!(snap.num_rounds, 2);
        assert_eq!(snap.board.len(), 1);
        assert_eq!(snap.board[0].team_name, "Oilers Fan");
        assert_eq!(snap.board[0].player.as_ref().unwrap().id, "c1");

        let clock = snap.on_the_clock.as_ref().unwrap();
        assert_eq!(clock.pick_number, 2);
        assert!(clock.is_user_pick);
        assert!(snap.is_user_turn);
        assert!(snap.timer_active);
        assert_eq!(snap.timer_remaining, 45);

        let ids: Vec<&str> = snap.available.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "g1", "g2"]);

        assert_eq!(snap.teams[0].roster[0].slot, Position::Center);
        assert_eq!(snap.teams[0].needs, vec![Position::Goalie]);
        let mine = snap.user_team().unwrap();
        assert_eq!(mine.name, "My Team");
        assert_eq!(mine.picks_remaining, 2);
    }

    #[test]
    fn snapshot_carries_recommendations_and_serializes() {
        let mut state = state();
        state.start();
        state.make_pick("c1");
        let mut rng = StdRng::seed_from_u64(3);
        let recs = state.recommendations(&mut rng);
        let snap = DraftSnapshot::build(&state, &ScoringWeights::default(), recs);
        assert_eq!(snap.recommendations.len(), 3);
        assert!(!snap.recommendations[0].reason.is_empty());

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "InProgress");
        assert_eq!(json["tab"], "Available");
        assert_eq!(json["board"][0]["player"]["name"], "Center One");
    }
}
